//! Resolution expansion: one target width → every device-pixel-ratio variant.
//!
//! For each grid entry the factors `max, max - step, …, 1` are tried in
//! turn. A variant survives only if it stays within the source's native
//! width (or a tighter pixel cap) and, when a height cap is set, within that
//! too. Surviving variants come out biggest first.
//!
//! ```text
//! grid 992 → 480, source 1200px wide, max 2x, step 0.5
//!
//!   2.0x → 960    kept
//!   1.5x → 720    kept
//!   1.0x → 480    kept
//!
//! grid 1200 → 760, same source
//!
//!   2.0x → 1520   too wide
//!   1.5x → 1140   kept
//!   1.0x → 760    kept
//! ```
//!
//! If even the 1x variant of the zero breakpoint is rejected, a single
//! `1x → max width` entry is synthesized there so there is always something
//! to serve.

use crate::error::PlanError;
use crate::grid::Grid;
use crate::imaging::{Dimensions, reproportion};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest factor schedule a policy may ask for.
pub const MAX_FACTOR_STEPS: u32 = 100;
use std::str::FromStr;

/// Numeric hires values up to this are factors, above it pixel widths.
pub const FACTOR_LIMIT: f64 = 10.0;

/// Horizontal cap on generated widths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHires", into = "RawHires")]
pub enum HiresX {
    /// Never exceed the source width.
    MatchSource,
    /// Override the maximum resolution factor.
    Factor(f64),
    /// Never exceed this many pixels (nor the source width).
    Pixels(u32),
}

impl HiresX {
    pub fn from_number(value: f64) -> Result<Self, String> {
        if !value.is_finite() || value <= 0.0 {
            return Err(format!("hires must be positive, got {value}"));
        }
        if value <= FACTOR_LIMIT {
            Ok(Self::Factor(value))
        } else {
            whole_pixels(value).map(Self::Pixels)
        }
    }
}

/// Vertical cap on generated variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHires", into = "RawHires")]
pub enum HiresY {
    MatchSource,
    Pixels(u32),
}

const SOURCE_KEYWORD: &str = "source";

fn whole_pixels(value: f64) -> Result<u32, String> {
    if value.fract() != 0.0 || value < 1.0 || value > f64::from(u32::MAX) {
        return Err(format!("pixel size must be a positive whole number, got {value}"));
    }
    Ok(value as u32)
}

/// Config-file shape: `"source"` or a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawHires {
    Number(f64),
    Text(String),
}

impl TryFrom<RawHires> for HiresX {
    type Error = String;

    fn try_from(raw: RawHires) -> Result<Self, Self::Error> {
        match raw {
            RawHires::Number(value) => Self::from_number(value),
            RawHires::Text(text) => text.parse(),
        }
    }
}

impl From<HiresX> for RawHires {
    fn from(hires: HiresX) -> Self {
        match hires {
            HiresX::MatchSource => Self::Text(SOURCE_KEYWORD.into()),
            HiresX::Factor(factor) => Self::Number(factor),
            HiresX::Pixels(px) => Self::Number(f64::from(px)),
        }
    }
}

impl TryFrom<RawHires> for HiresY {
    type Error = String;

    fn try_from(raw: RawHires) -> Result<Self, Self::Error> {
        match raw {
            RawHires::Number(value) => whole_pixels(value).map(Self::Pixels),
            RawHires::Text(text) => text.parse(),
        }
    }
}

impl From<HiresY> for RawHires {
    fn from(hires: HiresY) -> Self {
        match hires {
            HiresY::MatchSource => Self::Text(SOURCE_KEYWORD.into()),
            HiresY::Pixels(px) => Self::Number(f64::from(px)),
        }
    }
}

impl FromStr for HiresX {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == SOURCE_KEYWORD {
            return Ok(Self::MatchSource);
        }
        let value = s
            .parse::<f64>()
            .map_err(|_| format!("invalid hires '{s}' (expected \"source\" or a number)"))?;
        Self::from_number(value)
    }
}

impl FromStr for HiresY {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == SOURCE_KEYWORD {
            return Ok(Self::MatchSource);
        }
        s.parse::<u32>()
            .ok()
            .filter(|px| *px > 0)
            .map(Self::Pixels)
            .ok_or_else(|| format!("invalid hires height '{s}' (expected \"source\" or whole pixels)"))
    }
}

/// How far to push resolution variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionPolicy {
    pub max_factor: f64,
    pub step: f64,
    pub hires_x: HiresX,
    pub hires_y: Option<HiresY>,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            max_factor: 2.0,
            step: 0.5,
            hires_x: HiresX::MatchSource,
            hires_y: None,
        }
    }
}

impl ResolutionPolicy {
    /// Effective factor cap and pixel width cap for a source.
    pub fn limits(&self, source: Dimensions) -> Result<(f64, i64), PlanError> {
        let src_w = i64::from(source.width);
        let (max_factor, max_width) = match self.hires_x {
            HiresX::MatchSource => (self.max_factor, src_w),
            HiresX::Factor(factor) => (factor, src_w.min((src_w as f64 * factor).floor() as i64)),
            HiresX::Pixels(px) => (self.max_factor, src_w.min(i64::from(px))),
        };
        if !max_factor.is_finite() || max_factor < 1.0 {
            return Err(PlanError::configuration(format!(
                "invalid max resolution factor {max_factor} (must be at least 1)"
            )));
        }
        Ok((max_factor, max_width))
    }

    /// Height cap for a source, if any.
    pub fn max_height(&self, source: Dimensions) -> Option<i64> {
        self.hires_y.map(|cap| match cap {
            HiresY::MatchSource => i64::from(source.height),
            HiresY::Pixels(px) => i64::from(px),
        })
    }

    /// Factors to try, biggest first, always ending at 1.
    pub fn factors(&self, max_factor: f64) -> Result<Vec<f64>, PlanError> {
        let steps = step_count(max_factor, self.step)?;
        let mut factors: Vec<f64> = (0..=steps)
            .map(|k| round_factor(max_factor - f64::from(k) * self.step))
            .collect();
        if factors.last().is_some_and(|f| *f > 1.0) {
            factors.push(1.0);
        }
        Ok(factors)
    }
}

/// Number of whole steps from 1 up to `max_factor`, capped at
/// [`MAX_FACTOR_STEPS`].
pub fn step_count(max_factor: f64, step: f64) -> Result<u32, PlanError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(PlanError::configuration(format!(
            "invalid resolution step {step} (must be positive)"
        )));
    }
    let steps = ((max_factor - 1.0) / step + 1e-9).floor().max(0.0);
    if !steps.is_finite() || steps > f64::from(MAX_FACTOR_STEPS) {
        return Err(PlanError::configuration(format!(
            "resolution step {step} is too fine for max factor {max_factor} (at most {MAX_FACTOR_STEPS} steps)"
        )));
    }
    Ok(steps as u32)
}

fn round_factor(factor: f64) -> f64 {
    (factor * 1e6).round() / 1e6
}

/// One resolution variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Variant {
    pub factor: f64,
    pub width: i64,
}

/// Variants for one breakpoint, biggest factor first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionSet {
    pub activation: u32,
    pub variants: Vec<Variant>,
}

impl ResolutionSet {
    /// Width of the `factor` variant, if it survived.
    pub fn width_at(&self, factor: f64) -> Option<i64> {
        self.variants
            .iter()
            .find(|v| (v.factor - factor).abs() < 1e-9)
            .map(|v| v.width)
    }

    /// The largest variant, i.e. the never-upscale default.
    pub fn largest(&self) -> Option<&Variant> {
        self.variants.first()
    }
}

/// Ordered mapping of activation width → resolution variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolutionDict {
    sets: Vec<ResolutionSet>,
}

impl ResolutionDict {
    pub fn iter(&self) -> impl Iterator<Item = &ResolutionSet> {
        self.sets.iter()
    }

    pub fn get(&self, activation: u32) -> Option<&ResolutionSet> {
        self.sets.iter().find(|s| s.activation == activation)
    }

    pub fn keys(&self) -> Vec<u32> {
        self.sets.iter().map(|s| s.activation).collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Smallest width across every breakpoint and factor.
    pub fn smallest_width(&self) -> Option<i64> {
        self.sets
            .iter()
            .flat_map(|s| s.variants.iter().map(|v| v.width))
            .min()
    }
}

impl fmt::Display for ResolutionDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}:", set.activation)?;
            for v in &set.variants {
                write!(f, " {}x={}", v.factor, v.width)?;
            }
        }
        Ok(())
    }
}

/// Expand every grid entry into its resolution variants.
pub fn expand(grid: &Grid, source: Dimensions, policy: &ResolutionPolicy) -> Result<ResolutionDict, PlanError> {
    let (max_factor, max_width) = policy.limits(source)?;
    let max_height = policy.max_height(source);
    let factors = policy.factors(max_factor)?;

    let mut sets = Vec::with_capacity(grid.len());
    for entry in grid.iter() {
        let mut variants = Vec::with_capacity(factors.len());
        for &factor in &factors {
            let width = (entry.width as f64 * factor).floor() as i64;
            let height = entry.height.map(|h| (h as f64 * factor).floor() as i64);
            let (hires_w, hires_h) = reproportion(source, Some(width), height).ok_or_else(|| {
                PlanError::configuration(format!(
                    "cannot size the {}px breakpoint: target width and height are both zero",
                    entry.activation
                ))
            })?;
            if hires_w > max_width || max_height.is_some_and(|cap| hires_h > cap) {
                continue;
            }
            variants.push(Variant {
                factor,
                width: hires_w,
            });
        }
        if !variants.is_empty() {
            sets.push(ResolutionSet {
                activation: entry.activation,
                variants,
            });
        }
    }

    if !sets.iter().any(|s| s.activation == 0) {
        log::debug!("no variant fits the zero breakpoint; falling back to {max_width}px");
        sets.push(ResolutionSet {
            activation: 0,
            variants: vec![Variant {
                factor: 1.0,
                width: max_width,
            }],
        });
    }

    Ok(ResolutionDict { sets })
}
