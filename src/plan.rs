//! Planning: one image request → everything the markup layer needs.
//!
//! ```text
//! ImageRequest ──► column classes ──► GridCache ──► Grid
//!                                                   │
//!                     ratio + crop ──► adjust_grid ─┤
//!                                                   ▼
//!             hires caps + factors ──► expand ──► ResolutionDict ──► LQIP
//! ```
//!
//! [`resolve`] is the single pure entry point: known source dimensions in,
//! [`ResponsivePlan`] out, with a caller-owned [`GridCache`]. [`Planner`]
//! wraps it in a session that also owns the cache, the active breakpoint
//! table, and an [`ImageProbe`] for requests that don't carry their size.
//!
//! Requests are immutable values. Every option left unset falls back to the
//! configured default at resolve time, so nothing leaks between requests
//! planned in the same session.

use crate::breakpoints::BreakpointTable;
use crate::cache::{CacheStats, GridCache};
use crate::config::{ConfigError, ImagesConfig, LayoutConfig};
use crate::error::PlanError;
use crate::grid::{Grid, GridLayout};
use crate::imaging::{Dimensions, ImageProbe, Orientation, ProbeError, RustProbe};
use crate::lqip::{self, LqipChoice, LqipPolicy, PIXEL_DATA_URI};
use crate::ratio::{self, RatioSpec, WrapperKind};
use crate::resolution::{self, HiresX, HiresY, ResolutionDict, ResolutionPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Alt text for the substitute shown when a source can't be read.
pub const MISSING_ALT: &str = "Missing image";

/// Per-image options. Unset fields use the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageRequest {
    /// Source file; probed for its size unless `size` is given.
    pub file: PathBuf,
    pub size: Option<Dimensions>,
    /// Class list holding the column tokens.
    pub cols: String,
    pub ratio: Option<RatioSpec>,
    pub crop: Option<bool>,
    pub hires_x: Option<HiresX>,
    pub hires_y: Option<HiresY>,
    pub max_resolution: Option<f64>,
    pub resolution_step: Option<f64>,
    pub lqip: Option<LqipPolicy>,
}

impl ImageRequest {
    pub fn builder(file: impl Into<PathBuf>) -> ImageRequestBuilder {
        ImageRequestBuilder {
            request: ImageRequest {
                file: file.into(),
                ..Self::default()
            },
        }
    }

    /// Parse a JSON option map. Unknown option names are rejected.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        serde_json::from_str(json).map_err(|e| PlanError::configuration(format!("invalid image options: {e}")))
    }
}

/// Accumulates an [`ImageRequest`].
#[derive(Debug, Clone)]
pub struct ImageRequestBuilder {
    request: ImageRequest,
}

impl ImageRequestBuilder {
    /// Known source size; skips probing.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.request.size = Some(Dimensions { width, height });
        self
    }

    pub fn cols(mut self, classes: &str) -> Self {
        self.request.cols = classes.to_string();
        self
    }

    pub fn ratio(mut self, ratio: RatioSpec) -> Self {
        self.request.ratio = Some(ratio);
        self
    }

    pub fn crop(mut self, crop: bool) -> Self {
        self.request.crop = Some(crop);
        self
    }

    pub fn hires_x(mut self, hires: HiresX) -> Self {
        self.request.hires_x = Some(hires);
        self
    }

    pub fn hires_y(mut self, hires: HiresY) -> Self {
        self.request.hires_y = Some(hires);
        self
    }

    pub fn max_resolution(mut self, factor: f64) -> Self {
        self.request.max_resolution = Some(factor);
        self
    }

    pub fn resolution_step(mut self, step: f64) -> Self {
        self.request.resolution_step = Some(step);
        self
    }

    pub fn lqip(mut self, policy: LqipPolicy) -> Self {
        self.request.lqip = Some(policy);
        self
    }

    pub fn build(self) -> ImageRequest {
        self.request
    }
}

/// Everything a plan needs besides the request itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub table: BreakpointTable,
    pub layout: GridLayout,
    pub images: ImagesConfig,
}

impl Settings {
    pub fn from_config(config: &LayoutConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            table: config.breakpoint_table()?,
            layout: config.grid_layout(),
            images: config.images.clone(),
        })
    }

    fn resolution_policy(&self, request: &ImageRequest) -> ResolutionPolicy {
        ResolutionPolicy {
            max_factor: request.max_resolution.unwrap_or(self.images.max_resolution),
            step: request.resolution_step.unwrap_or(self.images.resolution_step),
            hires_x: request.hires_x.unwrap_or(self.images.hires_x),
            hires_y: request.hires_y.or(self.images.hires_y),
        }
    }
}

/// The computed descriptor set for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsivePlan {
    pub source: Dimensions,
    pub orientation: Orientation,
    /// Target sizes after crop oversampling.
    pub grid: Grid,
    pub resolutions: ResolutionDict,
    pub lqip: LqipChoice,
    pub wrapper: WrapperKind,
    /// `padding-bottom` of the ratio box, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_percent: Option<f64>,
}

impl ResponsivePlan {
    /// Width of the default `<img>`: the biggest 1x variant at the zero
    /// breakpoint.
    pub fn default_width(&self) -> Option<i64> {
        self.resolutions
            .get(0)
            .and_then(|set| set.width_at(1.0).or_else(|| set.largest().map(|v| v.width)))
    }
}

/// Substitute for an image whose source could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fallback {
    pub src: String,
    pub alt: String,
    /// Why the source was unavailable.
    pub cause: String,
}

impl Fallback {
    fn for_error(err: &ProbeError) -> Self {
        Self {
            src: PIXEL_DATA_URI.to_string(),
            alt: MISSING_ALT.to_string(),
            cause: err.to_string(),
        }
    }
}

/// Result of [`Planner::plan_or_fallback`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum PlanOutcome {
    Ready(ResponsivePlan),
    Fallback(Fallback),
}

/// Compute a plan from known source dimensions.
pub fn resolve(
    request: &ImageRequest,
    source: Dimensions,
    settings: &Settings,
    cache: &mut GridCache,
) -> Result<ResponsivePlan, PlanError> {
    let source = Dimensions::new(source.width, source.height).ok_or_else(|| {
        PlanError::configuration(format!(
            "source size {}x{} must be positive",
            source.width, source.height
        ))
    })?;
    let ratio = request.ratio.or(settings.images.ratio);
    let crop = request.crop.unwrap_or(settings.images.crop);
    let lqip_policy = request.lqip.as_ref().unwrap_or(&settings.images.lqip);

    let grid = cache.grid_for(&request.cols, &settings.table, &settings.layout);
    let grid = ratio::adjust_grid(&grid, ratio.as_ref(), crop, source);
    let resolutions = resolution::expand(&grid, source, &settings.resolution_policy(request))?;
    let lqip = lqip::select(&resolutions, lqip_policy, source, i64::from(source.width));

    Ok(ResponsivePlan {
        source,
        orientation: Orientation::of(source),
        grid,
        resolutions,
        lqip,
        wrapper: ratio::wrapper_kind(ratio.as_ref(), crop, source),
        padding_percent: ratio::padding_percent(ratio.as_ref(), source),
    })
}

/// A planning session: settings, grid cache, and probe.
///
/// Construct one per request/response cycle (or per worker thread); the
/// cache is not meant to be shared between concurrent renders.
pub struct Planner<P: ImageProbe = RustProbe> {
    settings: Settings,
    cache: GridCache,
    probe: P,
}

impl Planner<RustProbe> {
    /// Session reading source sizes from disk.
    pub fn from_config(config: &LayoutConfig) -> Result<Self, ConfigError> {
        Self::with_probe(config, RustProbe::new())
    }
}

impl<P: ImageProbe> Planner<P> {
    pub fn with_probe(config: &LayoutConfig, probe: P) -> Result<Self, ConfigError> {
        Ok(Self::with_settings(Settings::from_config(config)?, probe))
    }

    pub fn with_settings(settings: Settings, probe: P) -> Self {
        Self {
            settings,
            cache: GridCache::new(),
            probe,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Source dimensions: the request's own, or probed from the file.
    pub fn source_size(&self, request: &ImageRequest) -> Result<Dimensions, PlanError> {
        match request.size {
            Some(size) => Ok(size),
            None => Ok(self.probe.identify(&request.file)?),
        }
    }

    pub fn plan(&mut self, request: &ImageRequest) -> Result<ResponsivePlan, PlanError> {
        let source = self.source_size(request)?;
        resolve(request, source, &self.settings, &mut self.cache)
    }

    /// Like [`plan`](Self::plan), but an unreadable source yields a
    /// [`Fallback`] instead of an error. Configuration errors still fail.
    pub fn plan_or_fallback(&mut self, request: &ImageRequest) -> Result<PlanOutcome, PlanError> {
        match self.plan(request) {
            Ok(plan) => Ok(PlanOutcome::Ready(plan)),
            Err(PlanError::SourceUnavailable(err)) => {
                log::warn!("{err}; rendering placeholder for {}", display_name(&request.file));
                Ok(PlanOutcome::Fallback(Fallback::for_error(&err)))
            }
            Err(err) => Err(err),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
