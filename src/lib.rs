//! # gridset
//!
//! Responsive image width planning for column grid layouts. Given the column
//! classes an image sits in and a few policy knobs, gridset computes exactly
//! which pixel widths to request from a resize endpoint at every breakpoint
//! and device pixel ratio, so a `<picture>` fills its column without ever
//! over- or under-serving pixels.
//!
//! # Architecture: Forward Pipeline
//!
//! Every image flows through the same stages, each a pure function of the
//! previous stage's output:
//!
//! ```text
//! 1. Columns     "col-6 col-md-4"  →  column fractions
//! 2. Grid        fractions + table →  activation width → target width
//! 3. Ratio       grid + crop box   →  oversampled grid
//! 4. Resolution  grid + caps       →  activation width → {factor → width}
//! 5. LQIP        resolution dict   →  placeholder choice
//! ```
//!
//! The engine never touches pixels or produces markup. Its outputs are
//! widths; turning them into URLs and `srcset` strings is the job of a
//! [`srcset::FileNameResolver`], and turning those into HTML is left to the
//! caller.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`breakpoints`] | Stock and custom breakpoint tables |
//! | [`columns`] | Column class parsing and cache signatures |
//! | [`grid`] | Grid resolution: fractions → target pixel widths |
//! | [`ratio`] | Ratio specs, crop oversampling, ratio box geometry |
//! | [`resolution`] | Device-pixel-ratio expansion with hard caps |
//! | [`lqip`] | Placeholder selection |
//! | [`cache`] | Session-scoped grid memoization |
//! | [`plan`] | Image requests, the pure `resolve` entry point, and `Planner` sessions |
//! | [`srcset`] | URL resolution and per-breakpoint candidate lists |
//! | [`static_widths`] | Width selection for pre-rendered image sets |
//! | [`config`] | `config.toml` loading, validation, and merging |
//! | [`imaging`] | Source dimension probing and dimension math |
//! | [`output`] | CLI output formatting |
//! | [`error`] | Plan-level error type |
//!
//! # Design Decisions
//!
//! ## Widths Are Signed
//!
//! A gutter wider than its column fraction yields a zero or negative width.
//! That is a layout mistake, but not one the planner can fix, so it passes
//! the degenerate width through and lets the resize endpoint reject it.
//!
//! ## Never Upscale
//!
//! Variants wider than the source (or a tighter configured cap) are dropped
//! rather than clamped, so every requested width carries real detail. If
//! that leaves the smallest breakpoint with nothing, a single 1x entry at
//! the cap is synthesized so there is always something to serve.
//!
//! ## Requests Are Values
//!
//! A [`plan::ImageRequest`] is built once and never mutated by planning.
//! Options left unset fall back to [`config::LayoutConfig`] defaults at
//! resolve time, so consecutive images in one session cannot leak settings
//! into each other. Only the grid cache is shared, and it is keyed on every
//! input that shapes a grid.

pub mod breakpoints;
pub mod cache;
pub mod columns;
pub mod config;
pub mod error;
pub mod grid;
pub mod imaging;
pub mod lqip;
pub mod output;
pub mod plan;
pub mod ratio;
pub mod resolution;
pub mod srcset;
pub mod static_widths;

#[cfg(test)]
pub(crate) mod test_helpers;
