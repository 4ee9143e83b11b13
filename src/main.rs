use clap::{Parser, Subcommand};
use gridset::cache::CacheStats;
use gridset::config;
use gridset::error::PlanError;
use gridset::imaging::{Dimensions, RustProbe};
use gridset::lqip::LqipPolicy;
use gridset::output;
use gridset::plan::{ImageRequest, PlanOutcome, Planner, Settings};
use gridset::ratio::RatioSpec;
use gridset::resolution::{HiresX, HiresY};
use gridset::srcset::{ResizeEndpoint, SourceSet, srcset};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "gridset")]
#[command(about = "Plan responsive image widths for column grid layouts")]
#[command(long_about = "\
Plan responsive image widths for column grid layouts

Given the column classes an image sits in, gridset works out the pixel width
the image occupies at every breakpoint, then every device-pixel-ratio variant
worth requesting from a resize endpoint, without ever upscaling the source.

Column classes:

  col            full width everywhere
  col-6          6/12 everywhere
  col-md-4       4/12 from md up
  col-lg         full width from lg up

Breakpoints (container / min-width):

  v4   sm 540/576   md 720/768   lg 960/992   xl 1140/1200
  v5   as v4, plus  xxl 1320/1400

Run 'gridset gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan widths and srcset candidates for source images
    Plan(PlanArgs),
    /// Validate config.toml without planning anything
    CheckConfig,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct PlanArgs {
    /// Source images
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Column classes, e.g. "col-12 col-md-6"
    #[arg(long, default_value = "")]
    cols: String,

    /// Source size as WxH instead of reading image headers
    #[arg(long, value_parser = parse_size)]
    size: Option<Dimensions>,

    /// Box ratio: W:H, W/H, a height/width number, or "natural"
    #[arg(long)]
    ratio: Option<RatioSpec>,

    /// Crop into the ratio box instead of letterboxing
    #[arg(long)]
    crop: bool,

    /// Width cap: "source", a factor (<= 10), or pixels
    #[arg(long)]
    hires: Option<HiresX>,

    /// Height cap: "source" or pixels
    #[arg(long)]
    hires_y: Option<HiresY>,

    /// Placeholder: xs, pixel, a width, #hex, or a file
    #[arg(long)]
    lqip: Option<LqipPolicy>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Base URL of the resize endpoint
    #[arg(long)]
    base_url: Option<url::Url>,
}

impl PlanArgs {
    fn request_for(&self, file: &Path) -> ImageRequest {
        let mut builder = ImageRequest::builder(file).cols(&self.cols);
        if let Some(size) = self.size {
            builder = builder.size(size.width, size.height);
        }
        if let Some(ratio) = self.ratio {
            builder = builder.ratio(ratio);
        }
        if self.crop {
            builder = builder.crop(true);
        }
        if let Some(hires) = self.hires {
            builder = builder.hires_x(hires);
        }
        if let Some(hires) = self.hires_y {
            builder = builder.hires_y(hires);
        }
        if let Some(lqip) = &self.lqip {
            builder = builder.lqip(lqip.clone());
        }
        builder.build()
    }

    fn endpoint(&self) -> ResizeEndpoint {
        self.base_url
            .as_ref()
            .map(ResizeEndpoint::from_url)
            .unwrap_or_default()
    }
}

fn parse_size(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{s}' (expected WxH)"))?;
    let width = w.trim().parse().map_err(|_| format!("invalid width in '{s}'"))?;
    let height = h.trim().parse().map_err(|_| format!("invalid height in '{s}'"))?;
    Dimensions::new(width, height).ok_or_else(|| format!("size '{s}' must be positive"))
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    file: String,
    result: &'a PlanOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources: Option<Vec<SourceSet>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Plan(args) => {
            let layout = config::load_config(&cli.config)?;
            init_thread_pool(&layout.processing);
            let settings = Settings::from_config(&layout)?;
            let endpoint = args.endpoint();

            let requests: Vec<ImageRequest> = args.files.iter().map(|f| args.request_for(f)).collect();
            let results: Vec<(Result<PlanOutcome, PlanError>, CacheStats)> = requests
                .par_iter()
                .map_init(
                    || Planner::with_settings(settings.clone(), RustProbe::new()),
                    |planner, request| {
                        let before = planner.cache_stats();
                        let outcome = planner.plan_or_fallback(request);
                        (outcome, planner.cache_stats().since(before))
                    },
                )
                .collect();

            let mut stats = CacheStats::default();
            let mut failures = 0;
            let mut missing = 0;
            let mut entries = Vec::new();
            for (index, (request, (outcome, delta))) in requests.iter().zip(&results).enumerate() {
                stats.absorb(*delta);
                let file = request.file.display().to_string();
                match outcome {
                    Ok(outcome) => {
                        if matches!(outcome, PlanOutcome::Fallback(_)) {
                            missing += 1;
                        }
                        if args.json {
                            let sources = match outcome {
                                PlanOutcome::Ready(plan) => Some(srcset(plan, &file, &endpoint)),
                                PlanOutcome::Fallback(_) => None,
                            };
                            entries.push(JsonEntry {
                                file,
                                result: outcome,
                                sources,
                            });
                        } else {
                            output::print_outcome(index + 1, &file, outcome, &endpoint);
                        }
                    }
                    Err(err) => {
                        failures += 1;
                        eprintln!("{file}: {err}");
                    }
                }
            }

            if args.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!();
                println!("{}", output::format_summary(results.len() - failures - missing, missing, stats));
            }
            if failures > 0 {
                return Err(format!("{failures} of {} images could not be planned", results.len()).into());
            }
        }
        Command::CheckConfig => {
            let layout = config::load_config(&cli.config)?;
            let settings = Settings::from_config(&layout)?;
            let table_name = match layout.grid.breakpoints {
                Some(_) => "custom".to_string(),
                None => layout.grid.version.to_string(),
            };
            println!(
                "==> Config is valid: {} table ({} breakpoints), {} columns, gutter {}px",
                table_name,
                settings.table.len(),
                settings.layout.grid_columns,
                settings.layout.gutter
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
