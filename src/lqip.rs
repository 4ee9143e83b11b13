//! Low-quality image placeholder selection.
//!
//! The placeholder is what the `<img src>` points at before (or instead of)
//! the full `srcset` kicking in. It is either one of the widths the plan
//! already requests, so it costs no extra resize, or inline data that costs
//! no request at all.

use crate::imaging::Dimensions;
use crate::resolution::ResolutionDict;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transparent 1x1 GIF.
pub const PIXEL_DATA_URI: &str = "data:image/gif;base64,R0lGODlhAQABAAAAACH5BAEKAAEALAAAAAABAAEAAAICTAEAOw==";

/// Which placeholder to use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawLqip", into = "RawLqip")]
pub enum LqipPolicy {
    /// The smallest width anywhere in the resolution dict.
    #[default]
    Smallest,
    /// Transparent pixel, no network request.
    Pixel,
    /// A specific resized width.
    Width(u32),
    /// Solid `#hex` rectangle in the source's proportions.
    Color(String),
    /// Some other file, used verbatim.
    File(String),
}

impl FromStr for LqipPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s {
            "" | "xs" | "smallest" => Self::Smallest,
            "pixel" => Self::Pixel,
            _ if s.starts_with('#') => {
                let hex = &s[1..];
                if !matches!(hex.len(), 3 | 4 | 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(format!("invalid placeholder color '{s}'"));
                }
                Self::Color(s.to_string())
            }
            _ => match s.parse::<u32>() {
                Ok(0) => return Err("placeholder width must be positive".into()),
                Ok(px) => Self::Width(px),
                Err(_) => Self::File(s.to_string()),
            },
        })
    }
}

impl fmt::Display for LqipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smallest => write!(f, "xs"),
            Self::Pixel => write!(f, "pixel"),
            Self::Width(px) => write!(f, "{px}"),
            Self::Color(hex) => write!(f, "{hex}"),
            Self::File(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawLqip {
    Width(u32),
    Text(String),
}

impl TryFrom<RawLqip> for LqipPolicy {
    type Error = String;

    fn try_from(raw: RawLqip) -> Result<Self, Self::Error> {
        match raw {
            RawLqip::Width(0) => Err("placeholder width must be positive".into()),
            RawLqip::Width(px) => Ok(Self::Width(px)),
            RawLqip::Text(text) => text.parse(),
        }
    }
}

impl From<LqipPolicy> for RawLqip {
    fn from(policy: LqipPolicy) -> Self {
        match policy {
            LqipPolicy::Width(px) => Self::Width(px),
            other => Self::Text(other.to_string()),
        }
    }
}

/// The resolved placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum LqipChoice {
    /// Resize the source to this width.
    Width(i64),
    /// A `data:` URI to inline.
    Inline(String),
    /// A separate file reference.
    File(String),
}

/// Pick the placeholder for a plan. `fallback_width` covers an empty dict.
pub fn select(dict: &ResolutionDict, policy: &LqipPolicy, source: Dimensions, fallback_width: i64) -> LqipChoice {
    match policy {
        LqipPolicy::Smallest => LqipChoice::Width(dict.smallest_width().unwrap_or(fallback_width)),
        LqipPolicy::Pixel => LqipChoice::Inline(PIXEL_DATA_URI.to_string()),
        LqipPolicy::Width(px) => LqipChoice::Width(i64::from(*px)),
        LqipPolicy::Color(hex) => LqipChoice::Inline(svg_rect(hex, source)),
        LqipPolicy::File(name) => LqipChoice::File(name.clone()),
    }
}

/// Base64 SVG data URI of a solid rectangle with the source's proportions.
pub fn svg_rect(color: &str, source: Dimensions) -> String {
    let (w, h) = (source.width, source.height);
    let svg = format!(
        r#"<svg preserveAspectRatio="none" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg"><rect width="{w}" height="{h}" fill="{color}" /></svg>"#
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, GridEntry};
    use crate::resolution::{ResolutionPolicy, expand};

    fn source() -> Dimensions {
        Dimensions { width: 1200, height: 800 }
    }

    fn dict() -> ResolutionDict {
        let grid = Grid::from_entries([
            GridEntry { activation: 992, width: 480, height: None },
            GridEntry { activation: 0, width: 270, height: None },
        ]);
        expand(&grid, source(), &ResolutionPolicy::default()).unwrap()
    }

    // =========================================================================
    // Policy parsing
    // =========================================================================

    #[test]
    fn parse_keywords() {
        assert_eq!("xs".parse::<LqipPolicy>(), Ok(LqipPolicy::Smallest));
        assert_eq!("".parse::<LqipPolicy>(), Ok(LqipPolicy::Smallest));
        assert_eq!("pixel".parse::<LqipPolicy>(), Ok(LqipPolicy::Pixel));
    }

    #[test]
    fn parse_width_color_file() {
        assert_eq!("64".parse::<LqipPolicy>(), Ok(LqipPolicy::Width(64)));
        assert_eq!("#eee".parse::<LqipPolicy>(), Ok(LqipPolicy::Color("#eee".into())));
        assert_eq!(
            "blur/hero.jpg".parse::<LqipPolicy>(),
            Ok(LqipPolicy::File("blur/hero.jpg".into()))
        );
    }

    #[test]
    fn parse_rejects_bad_color_and_zero() {
        assert!("#zzzzzz".parse::<LqipPolicy>().is_err());
        assert!("#12345".parse::<LqipPolicy>().is_err());
        assert!("0".parse::<LqipPolicy>().is_err());
    }

    #[test]
    fn deserialize_number_or_string() {
        #[derive(Deserialize)]
        struct Holder {
            lqip: LqipPolicy,
        }
        let parse = |s: &str| toml::from_str::<Holder>(s).map(|h| h.lqip);
        assert_eq!(parse("lqip = 32").unwrap(), LqipPolicy::Width(32));
        assert_eq!(parse("lqip = \"pixel\"").unwrap(), LqipPolicy::Pixel);
        assert!(parse("lqip = 0").is_err());
    }

    // =========================================================================
    // Selection
    // =========================================================================

    #[test]
    fn smallest_is_min_across_all_factors() {
        assert_eq!(select(&dict(), &LqipPolicy::Smallest, source(), 540), LqipChoice::Width(270));
    }

    #[test]
    fn smallest_on_empty_dict_uses_fallback() {
        let empty = ResolutionDict::default();
        assert_eq!(select(&empty, &LqipPolicy::Smallest, source(), 540), LqipChoice::Width(540));
    }

    #[test]
    fn pixel_is_inline_gif() {
        assert_eq!(
            select(&dict(), &LqipPolicy::Pixel, source(), 540),
            LqipChoice::Inline(PIXEL_DATA_URI.into())
        );
    }

    #[test]
    fn explicit_width_and_file_pass_through() {
        assert_eq!(select(&dict(), &LqipPolicy::Width(40), source(), 540), LqipChoice::Width(40));
        assert_eq!(
            select(&dict(), &LqipPolicy::File("lq.jpg".into()), source(), 540),
            LqipChoice::File("lq.jpg".into())
        );
    }

    #[test]
    fn color_keeps_source_proportions() {
        let LqipChoice::Inline(uri) = select(&dict(), &LqipPolicy::Color("#336699".into()), source(), 540) else {
            panic!("expected inline data");
        };
        let encoded = uri.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains(r#"viewBox="0 0 1200 800""#));
        assert!(svg.contains(r##"fill="#336699""##));
    }
}
