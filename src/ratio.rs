//! Forced aspect ratios and crop oversampling.
//!
//! A ratio puts the image in a fixed-proportion box. Without cropping the
//! image is *contained* (letterboxed inside the box) and is never shown
//! larger than its column, so the requested widths stand. With cropping the
//! image *covers* the box and only part of it stays visible; the visible
//! part must still carry a full column's worth of pixels, so every grid
//! size is scaled up by [`oversample_percent`].
//!
//! Ratios are height over width throughout: `"16:9"` is `0.5625`.

use crate::grid::Grid;
use crate::imaging::{Dimensions, aspect_ratio, oversample_percent};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ratios closer than this are treated as equal.
const RATIO_EPSILON: f64 = 1e-5;

/// Requested box proportions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRatio", into = "RawRatio")]
pub enum RatioSpec {
    /// The source image's own ratio.
    Natural,
    /// Explicit height/width ratio.
    Fixed(f64),
    /// `W:H` proportions.
    Aspect { width: u32, height: u32 },
}

impl RatioSpec {
    /// Height/width ratio this spec resolves to for a given source.
    pub fn resolve(&self, source: Dimensions) -> f64 {
        match *self {
            Self::Natural => aspect_ratio(source),
            Self::Fixed(ratio) => ratio,
            Self::Aspect { width, height } => f64::from(height) / f64::from(width),
        }
    }
}

impl FromStr for RatioSpec {
    type Err = String;

    /// Accepts `"16:9"`, `"16/9"`, a bare positive number, or `"natural"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("natural") || s == "true" {
            return Ok(Self::Natural);
        }
        if let Some((w, h)) = s.split_once(':').or_else(|| s.split_once('/')) {
            let width = w.trim().parse::<u32>().map_err(|_| invalid(s))?;
            let height = h.trim().parse::<u32>().map_err(|_| invalid(s))?;
            if width == 0 || height == 0 {
                return Err(format!("ratio '{s}' must not contain zero"));
            }
            return Ok(Self::Aspect { width, height });
        }
        let ratio = s.parse::<f64>().map_err(|_| invalid(s))?;
        fixed(ratio)
    }
}

fn invalid(s: &str) -> String {
    format!("invalid ratio '{s}' (expected W:H, W/H, a number, or natural)")
}

fn fixed(ratio: f64) -> Result<RatioSpec, String> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(RatioSpec::Fixed(ratio))
    } else {
        Err(format!("ratio must be a positive number, got {ratio}"))
    }
}

impl fmt::Display for RatioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Natural => write!(f, "natural"),
            Self::Fixed(ratio) => write!(f, "{ratio}"),
            Self::Aspect { width, height } => write!(f, "{width}:{height}"),
        }
    }
}

/// Config-file shape: `true`, a number, or a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawRatio {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl TryFrom<RawRatio> for RatioSpec {
    type Error = String;

    fn try_from(raw: RawRatio) -> Result<Self, Self::Error> {
        match raw {
            RawRatio::Flag(true) => Ok(Self::Natural),
            RawRatio::Flag(false) => Err("ratio = false is not a ratio; omit the key instead".into()),
            RawRatio::Number(ratio) => fixed(ratio),
            RawRatio::Text(text) => text.parse(),
        }
    }
}

impl From<RatioSpec> for RawRatio {
    fn from(spec: RatioSpec) -> Self {
        match spec {
            RatioSpec::Natural => Self::Flag(true),
            RatioSpec::Fixed(ratio) => Self::Number(ratio),
            aspect @ RatioSpec::Aspect { .. } => Self::Text(aspect.to_string()),
        }
    }
}

/// Structural wrapper the markup layer needs around the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperKind {
    /// No ratio box.
    None,
    /// Ratio box with the image letterboxed inside.
    Contain,
    /// Ratio box that crops the image to fill it.
    Crop,
}

pub fn wrapper_kind(ratio: Option<&RatioSpec>, crop: bool, source: Dimensions) -> WrapperKind {
    match ratio {
        None => WrapperKind::None,
        Some(spec) if crop && !same_ratio(spec.resolve(source), aspect_ratio(source)) => WrapperKind::Crop,
        Some(_) => WrapperKind::Contain,
    }
}

/// `padding-bottom` percentage of the ratio box, to three decimals.
pub fn padding_percent(ratio: Option<&RatioSpec>, source: Dimensions) -> Option<f64> {
    ratio.map(|spec| (spec.resolve(source) * 100_000.0).round() / 1000.0)
}

/// Inflate grid sizes so a cropped image still fills its box.
///
/// Only a crop with a ratio differing from the source changes anything;
/// the input grid is never modified.
pub fn adjust_grid(grid: &Grid, ratio: Option<&RatioSpec>, crop: bool, source: Dimensions) -> Grid {
    let Some(spec) = ratio else {
        return grid.clone();
    };
    if !crop {
        return grid.clone();
    }
    let source_ratio = aspect_ratio(source);
    let container_ratio = spec.resolve(source);
    if same_ratio(source_ratio, container_ratio) {
        return grid.clone();
    }
    let percent = oversample_percent(source_ratio, container_ratio);
    if percent <= 100.0 {
        return grid.clone();
    }
    log::debug!(
        "oversampling grid to {percent:.1}% for {spec} crop of {}x{} source",
        source.width,
        source.height
    );
    let scale = percent / 100.0;
    grid.map_sizes(|px| (px as f64 * scale).round() as i64)
}

fn same_ratio(a: f64, b: f64) -> bool {
    (a - b).abs() < RATIO_EPSILON
}
