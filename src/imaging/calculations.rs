//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::probe::Dimensions;
use serde::Serialize;

/// Which way an image leans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn of(source: Dimensions) -> Self {
        match source.width.cmp(&source.height) {
            std::cmp::Ordering::Greater => Self::Landscape,
            std::cmp::Ordering::Less => Self::Portrait,
            std::cmp::Ordering::Equal => Self::Square,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Square => "square",
        }
    }
}

/// Height over width, the ratio convention used throughout the crate.
pub fn aspect_ratio(source: Dimensions) -> f64 {
    f64::from(source.height) / f64::from(source.width)
}

/// Fill in a missing target dimension from the source's aspect ratio.
///
/// - Width only: height follows proportionally.
/// - Height only: width follows proportionally.
/// - Both: the dimension with the smaller scale against the source is the
///   master and the other is recomputed from it, so neither axis asks for
///   more than the box allows.
///
/// Returns `None` when nothing can be inferred: no dimension given, or both
/// given as zero.
///
/// # Examples
/// ```
/// # use gridset::imaging::{Dimensions, reproportion};
/// let src = Dimensions { width: 1600, height: 900 };
/// assert_eq!(reproportion(src, Some(800), None), Some((800, 450)));
/// assert_eq!(reproportion(src, None, Some(300)), Some((533, 300)));
/// // 800 wide would need 450 tall, but the box is only 300 tall
/// assert_eq!(reproportion(src, Some(800), Some(300)), Some((533, 300)));
/// ```
pub fn reproportion(source: Dimensions, width: Option<i64>, height: Option<i64>) -> Option<(i64, i64)> {
    let src_w = f64::from(source.width);
    let src_h = f64::from(source.height);
    let from_width = |w: i64| (w, (w as f64 * src_h / src_w).round() as i64);
    let from_height = |h: i64| ((h as f64 * src_w / src_h).round() as i64, h);

    match (width, height) {
        (Some(w), None) => Some(from_width(w)),
        (None, Some(h)) => Some(from_height(h)),
        (Some(0), Some(0)) | (None, None) => None,
        (Some(w), Some(h)) => {
            let scale_w = w as f64 / src_w;
            let scale_h = h as f64 / src_h;
            if scale_w <= scale_h {
                Some(from_width(w))
            } else {
                Some(from_height(h))
            }
        }
    }
}

/// Percentage of the box size a cropped image must be resampled at.
///
/// When the crop box is relatively taller than the source
/// (`source_ratio < container_ratio`), only a horizontal slice of the source
/// survives the crop and the source has to be requested wider. Values at or
/// below 100 mean no oversampling is needed.
///
/// ```
/// # use gridset::imaging::oversample_percent;
/// // 2:1 landscape into a square box needs twice the pixels
/// assert_eq!(oversample_percent(0.5, 1.0), 200.0);
/// ```
pub fn oversample_percent(source_ratio: f64, container_ratio: f64) -> f64 {
    if source_ratio < container_ratio {
        10_000.0 / (source_ratio * 100.0)
    } else {
        source_ratio * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    // =========================================================================
    // Orientation
    // =========================================================================

    #[test]
    fn orientation_from_dimensions() {
        assert_eq!(Orientation::of(dims(800, 600)), Orientation::Landscape);
        assert_eq!(Orientation::of(dims(600, 800)), Orientation::Portrait);
        assert_eq!(Orientation::of(dims(500, 500)), Orientation::Square);
        assert_eq!(Orientation::Portrait.as_str(), "portrait");
    }

    #[test]
    fn aspect_ratio_is_height_over_width() {
        assert_eq!(aspect_ratio(dims(1600, 800)), 0.5);
        assert_eq!(aspect_ratio(dims(400, 600)), 1.5);
    }

    // =========================================================================
    // reproportion
    // =========================================================================

    #[test]
    fn width_only_derives_height() {
        assert_eq!(reproportion(dims(2000, 1500), Some(1000), None), Some((1000, 750)));
    }

    #[test]
    fn height_only_derives_width() {
        assert_eq!(reproportion(dims(1500, 2000), None, Some(1000)), Some((750, 1000)));
    }

    #[test]
    fn both_given_width_is_master_when_narrower() {
        // 400/1600 = 0.25 < 400/900
        assert_eq!(reproportion(dims(1600, 900), Some(400), Some(400)), Some((400, 225)));
    }

    #[test]
    fn both_given_height_is_master_when_shorter() {
        // 800/1600 = 0.5 > 300/900
        assert_eq!(reproportion(dims(1600, 900), Some(800), Some(300)), Some((533, 300)));
    }

    #[test]
    fn nothing_to_infer_from() {
        assert_eq!(reproportion(dims(100, 100), None, None), None);
        assert_eq!(reproportion(dims(100, 100), Some(0), Some(0)), None);
    }

    #[test]
    fn zero_width_alone_passes_through() {
        assert_eq!(reproportion(dims(100, 50), Some(0), None), Some((0, 0)));
    }

    // =========================================================================
    // oversample_percent
    // =========================================================================

    #[test]
    fn landscape_source_into_square_box() {
        assert_eq!(oversample_percent(0.5, 1.0), 200.0);
    }

    #[test]
    fn taller_source_uses_its_own_ratio() {
        assert_eq!(oversample_percent(1.5, 1.0), 150.0);
    }

    #[test]
    fn wide_source_into_wider_box_needs_nothing() {
        assert!(oversample_percent(0.5, 0.25) <= 100.0);
    }
}
