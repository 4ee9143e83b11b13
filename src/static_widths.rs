//! Width selection for images pre-rendered at fixed sizes.
//!
//! When there is no resize endpoint, only the widths that already exist on
//! disk can be served. Each entry's width is multiplied by every factor from
//! 1 up to the maximum, and the result is matched against the available
//! widths: an exact hit if there is one, otherwise the next size up.
//! Factors nothing is big enough for are left out.
//!
//! ```text
//! available: 400, 800, 1000, 1600    max 2x, step 0.5
//!
//!   400 @ 1.0x → 400   exact
//!   400 @ 1.5x → 800   600 rounds up
//!   400 @ 2.0x → 800   exact
//!  1000 @ 1.5x → 1600  1500 rounds up
//!  1000 @ 2.0x → none
//! ```

use crate::error::PlanError;
use crate::resolution::step_count;
use crate::srcset::media_query;
use serde::Serialize;

/// A pre-rendered width and the media `min-width` it serves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticEntry {
    pub media: u32,
    pub width: u32,
}

impl StaticEntry {
    /// Entries whose media width equals the image width.
    pub fn from_widths(widths: &[u32]) -> Vec<Self> {
        widths.iter().map(|&width| Self { media: width, width }).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StaticVariant {
    pub factor: f64,
    pub width: u32,
}

/// The variants for one `<source>`, 1x first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticSource {
    pub media: String,
    pub variants: Vec<StaticVariant>,
}

/// Pick a served width per entry and factor.
pub fn select_widths(entries: &[StaticEntry], max_factor: f64, step: f64) -> Result<Vec<StaticSource>, PlanError> {
    if entries.is_empty() {
        return Err(PlanError::configuration("no widths given"));
    }
    if !max_factor.is_finite() || max_factor < 1.0 {
        return Err(PlanError::configuration(format!(
            "invalid max resolution factor {max_factor} (must be at least 1)"
        )));
    }
    let steps = step_count(max_factor, step)?;
    let factors: Vec<f64> = (0..=steps)
        .map(|k| ((1.0 + f64::from(k) * step) * 1e6).round() / 1e6)
        .collect();

    Ok(entries
        .iter()
        .map(|entry| StaticSource {
            media: media_query(entry.media),
            variants: factors
                .iter()
                .filter_map(|&factor| {
                    served_width(entries, f64::from(entry.width) * factor).map(|width| StaticVariant { factor, width })
                })
                .collect(),
        })
        .collect())
}

/// The smallest available width, used for the plain `<img src>`.
pub fn smallest_width(entries: &[StaticEntry]) -> Option<u32> {
    entries.iter().map(|e| e.width).min()
}

fn served_width(entries: &[StaticEntry], target: f64) -> Option<u32> {
    entries
        .iter()
        .map(|e| e.width)
        .filter(|&w| f64::from(w) >= target)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(source: &StaticSource) -> Vec<(f64, u32)> {
        source.variants.iter().map(|v| (v.factor, v.width)).collect()
    }

    #[test]
    fn exact_and_rounded_up() {
        let entries = StaticEntry::from_widths(&[400, 800, 1000, 1600]);
        let sources = select_widths(&entries, 2.0, 0.5).unwrap();

        assert_eq!(sources[0].media, "(min-width:400px)");
        assert_eq!(widths(&sources[0]), vec![(1.0, 400), (1.5, 800), (2.0, 800)]);
        assert_eq!(widths(&sources[2]), vec![(1.0, 1000), (1.5, 1600)]);
        assert_eq!(widths(&sources[3]), vec![(1.0, 1600)]);
    }

    #[test]
    fn explicit_media_widths() {
        let entries = [
            StaticEntry { media: 992, width: 600 },
            StaticEntry { media: 0, width: 300 },
        ];
        let sources = select_widths(&entries, 2.0, 1.0).unwrap();
        assert_eq!(sources[0].media, "(min-width:992px)");
        assert_eq!(widths(&sources[0]), vec![(1.0, 600)]);
        assert_eq!(widths(&sources[1]), vec![(1.0, 300), (2.0, 600)]);
    }

    #[test]
    fn single_factor_when_max_is_one() {
        let entries = StaticEntry::from_widths(&[200, 400]);
        let sources = select_widths(&entries, 1.0, 0.5).unwrap();
        assert!(sources.iter().all(|s| s.variants.len() == 1));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(select_widths(&[], 2.0, 0.5), Err(PlanError::Configuration(_))));
        let entries = StaticEntry::from_widths(&[200]);
        assert!(select_widths(&entries, 0.5, 0.5).is_err());
        assert!(select_widths(&entries, 2.0, 0.0).is_err());
    }

    #[test]
    fn rejects_runaway_schedule() {
        let entries = StaticEntry::from_widths(&[200, 400]);
        assert!(matches!(select_widths(&entries, 2.0, 1e-10), Err(PlanError::Configuration(_))));
        assert!(matches!(select_widths(&entries, 1e9, 0.5), Err(PlanError::Configuration(_))));
    }

    #[test]
    fn smallest_for_img_src() {
        assert_eq!(smallest_width(&StaticEntry::from_widths(&[800, 400, 1200])), Some(400));
        assert_eq!(smallest_width(&[]), None);
    }
}
