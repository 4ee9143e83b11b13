//! Source image inspection: header probing plus dimension math.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Reproportion** | [`reproportion`] |
//! | **Crop oversampling** | [`oversample_percent`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Probe**: [`ImageProbe`] trait + [`RustProbe`]

mod calculations;
pub mod probe;

pub use calculations::{Orientation, aspect_ratio, oversample_percent, reproportion};
pub use probe::{Dimensions, ImageProbe, ProbeError, RustProbe};
