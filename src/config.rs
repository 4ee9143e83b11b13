//! Layout configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are overridden by whatever the user's file specifies; everything the
//! planner falls back to when a request leaves an option unset lives here.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [grid]
//! version = 5               # Breakpoint table: 4 (sm..xl) or 5 (sm..xxl)
//! columns = 12              # Grid column count
//! gutter = 0                # Pixels subtracted from each side of a column
//! # container_max_height = 600
//!
//! [images]
//! max_resolution = 2.0      # Highest device-pixel-ratio variant
//! resolution_step = 0.5     # Step between variants
//! hires_x = "source"        # "source", a factor (<= 10), or a pixel cap
//! # hires_y = "source"      # "source" or a pixel cap; absent = no limit
//! # ratio = "16:9"          # true (natural), a number, or "W:H"
//! crop = false
//! lqip = "xs"               # "xs", "pixel", a width, "#hex", or a file
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Custom Breakpoints
//!
//! A `[[grid.breakpoints]]` list replaces the versioned table entirely:
//!
//! ```toml
//! [[grid.breakpoints]]
//! name = "wide"
//! container = 1400
//! activation = 1500
//!
//! [[grid.breakpoints]]
//! name = "narrow"
//! container = 600
//! activation = 640
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::breakpoints::{Breakpoint, BreakpointTable, LayoutVersion};
use crate::grid::GridLayout;
use crate::lqip::LqipPolicy;
use crate::ratio::RatioSpec;
use crate::resolution::{HiresX, HiresY, ResolutionPolicy, step_count};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Layout configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Column grid and breakpoint table.
    pub grid: GridConfig,
    /// Default resolution, ratio, and placeholder policy.
    pub images: ImagesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl LayoutConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns == 0 {
            return Err(ConfigError::Validation(
                "grid.columns must be at least 1".into(),
            ));
        }
        if let Some(entries) = &self.grid.breakpoints {
            BreakpointTable::new(entries.clone())
                .map_err(|e| ConfigError::Validation(format!("grid.breakpoints: {e}")))?;
        }
        if !self.images.max_resolution.is_finite() || self.images.max_resolution < 1.0 {
            return Err(ConfigError::Validation(
                "images.max_resolution must be at least 1".into(),
            ));
        }
        if !self.images.resolution_step.is_finite() || self.images.resolution_step <= 0.0 {
            return Err(ConfigError::Validation(
                "images.resolution_step must be positive".into(),
            ));
        }
        step_count(self.images.max_resolution, self.images.resolution_step)
            .map_err(|e| ConfigError::Validation(format!("images.resolution_step: {e}")))?;
        if matches!(self.images.hires_x, HiresX::Factor(factor) if factor < 1.0) {
            return Err(ConfigError::Validation(
                "images.hires_x factor must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The active breakpoint table: the custom list if given, else the
    /// stock table for `grid.version`.
    pub fn breakpoint_table(&self) -> Result<BreakpointTable, ConfigError> {
        match &self.grid.breakpoints {
            Some(entries) => BreakpointTable::new(entries.clone())
                .map_err(|e| ConfigError::Validation(format!("grid.breakpoints: {e}"))),
            None => Ok(BreakpointTable::stock(self.grid.version)),
        }
    }

    pub fn grid_layout(&self) -> GridLayout {
        GridLayout {
            grid_columns: self.grid.columns,
            gutter: self.grid.gutter,
            container_max_height: self.grid.container_max_height,
        }
    }

    pub fn resolution_policy(&self) -> ResolutionPolicy {
        ResolutionPolicy {
            max_factor: self.images.max_resolution,
            step: self.images.resolution_step,
            hires_x: self.images.hires_x,
            hires_y: self.images.hires_y,
        }
    }
}

/// Grid layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Stock breakpoint table to use.
    pub version: LayoutVersion,
    /// Number of grid columns.
    pub columns: u32,
    /// Pixels subtracted from each side of a column.
    pub gutter: u32,
    /// Optional fixed container height in pixels.
    pub container_max_height: Option<u32>,
    /// Custom table replacing the versioned one.
    pub breakpoints: Option<Vec<Breakpoint>>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            version: LayoutVersion::V5,
            columns: 12,
            gutter: 0,
            container_max_height: None,
            breakpoints: None,
        }
    }
}

/// Per-image defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Highest device-pixel-ratio factor to generate.
    pub max_resolution: f64,
    /// Decrement between factors.
    pub resolution_step: f64,
    /// Width cap: source width, factor override, or pixels.
    pub hires_x: HiresX,
    /// Height cap, if any.
    pub hires_y: Option<HiresY>,
    /// Forced box ratio, if any.
    pub ratio: Option<RatioSpec>,
    /// Crop into the ratio box instead of containing.
    pub crop: bool,
    /// Placeholder policy.
    pub lqip: LqipPolicy,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_resolution: 2.0,
            resolution_step: 0.5,
            hires_x: HiresX::MatchSource,
            hires_y: None,
            ratio: None,
            crop: false,
            lqip: LqipPolicy::Smallest,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel planning workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(LayoutConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<LayoutConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: LayoutConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<LayoutConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gridset Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Column grid
# ---------------------------------------------------------------------------
[grid]
# Stock breakpoint table.
#   4 -> sm 540/576, md 720/768, lg 960/992, xl 1140/1200
#   5 -> as 4, plus xxl 1320/1400
version = 5

# Number of columns a full-width row is divided into.
columns = 12

# Pixels subtracted from each side of a column.
gutter = 0

# Fixed container height in pixels. When set, variants are sized against
# both width and height.
# container_max_height = 600

# Custom breakpoints replace the versioned table. Entries must be listed
# largest first; "xs" is reserved for the implicit smallest breakpoint.
# [[grid.breakpoints]]
# name = "wide"
# container = 1400
# activation = 1500

# ---------------------------------------------------------------------------
# Image defaults (each can be overridden per request)
# ---------------------------------------------------------------------------
[images]
# Highest device-pixel-ratio variant to generate.
max_resolution = 2.0

# Step between variants: 2.0, 1.5, 1.0 for the defaults.
resolution_step = 0.5

# Width cap for variants.
#   "source" -> never wider than the source
#   <= 10    -> overrides max_resolution
#   > 10     -> hard pixel cap
hires_x = "source"

# Height cap for variants: "source" or whole pixels. Absent means no limit.
# hires_y = "source"

# Forced box ratio: true for the source's own ratio, a height/width number,
# or "W:H" / "W/H". Absent means no ratio box.
# ratio = "16:9"

# Crop into the ratio box instead of letterboxing inside it.
crop = false

# Placeholder source.
#   "xs"     -> smallest width already requested
#   "pixel"  -> inline transparent pixel
#   64       -> a specific width
#   "#ddd"   -> inline solid color in the source's proportions
#   anything else is used verbatim as a file reference
lqip = "xs"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel planning workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
