//! CLI output formatting for planned images.
//!
//! # Output Format
//!
//! ```text
//! 001 hero.jpg (4000x3000, landscape)
//!     (min-width:1200px) 570px
//!         /resize?f=hero.jpg&w=1140 2x
//!         /resize?f=hero.jpg&w=855 1.5x
//!         /resize?f=hero.jpg&w=570
//!     (min-width:0px) 540px
//!         ...
//!     Placeholder: /resize?f=hero.jpg&w=540
//!     Ratio box: crop, 56.25%
//! 002 gone.jpg
//!     Missing image: Image not found: gone.jpg
//!
//! Planned 1 image, 1 missing (grid cache: 1 cached, 1 computed)
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::cache::CacheStats;
use crate::plan::{Fallback, PlanOutcome, ResponsivePlan};
use crate::ratio::WrapperKind;
use crate::srcset::{FileNameResolver, lqip_src, srcset};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a successful plan: header, one block per `<source>`, then the
/// placeholder and ratio box.
pub fn format_plan(index: usize, file: &str, plan: &ResponsivePlan, resolver: &dyn FileNameResolver) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} ({}x{}, {})",
        format_index(index),
        file,
        plan.source.width,
        plan.source.height,
        plan.orientation.as_str()
    )];

    for (source, set) in srcset(plan, file, resolver).iter().zip(plan.resolutions.iter()) {
        match plan.grid.get(set.activation) {
            Some(entry) => lines.push(format!("{}{} {}px", indent(1), source.media, entry.width)),
            None => lines.push(format!("{}{} (fallback)", indent(1), source.media)),
        }
        for candidate in &source.candidates {
            lines.push(format!("{}{}", indent(2), candidate));
        }
    }

    lines.push(format!("{}Placeholder: {}", indent(1), truncate(&lqip_src(plan, file, resolver), 72)));
    if let Some(percent) = plan.padding_percent {
        let kind = match plan.wrapper {
            WrapperKind::Crop => "crop",
            WrapperKind::Contain | WrapperKind::None => "contain",
        };
        lines.push(format!("{}Ratio box: {}, {}%", indent(1), kind, percent));
    }
    lines
}

/// Format a missing-source substitute.
pub fn format_fallback(index: usize, file: &str, fallback: &Fallback) -> Vec<String> {
    vec![
        format!("{} {}", format_index(index), file),
        format!("{}{}: {}", indent(1), fallback.alt, fallback.cause),
    ]
}

pub fn format_outcome(index: usize, file: &str, outcome: &PlanOutcome, resolver: &dyn FileNameResolver) -> Vec<String> {
    match outcome {
        PlanOutcome::Ready(plan) => format_plan(index, file, plan, resolver),
        PlanOutcome::Fallback(fallback) => format_fallback(index, file, fallback),
    }
}

pub fn print_outcome(index: usize, file: &str, outcome: &PlanOutcome, resolver: &dyn FileNameResolver) {
    for line in format_outcome(index, file, outcome, resolver) {
        println!("{}", line);
    }
}

/// One-line run summary.
pub fn format_summary(planned: usize, missing: usize, stats: CacheStats) -> String {
    let noun = if planned == 1 { "image" } else { "images" };
    if missing > 0 {
        format!("Planned {planned} {noun}, {missing} missing (grid cache: {stats})")
    } else {
        format!("Planned {planned} {noun} (grid cache: {stats})")
    }
}

/// Shorten long inline data for display.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::GridCache;
    use crate::imaging::Dimensions;
    use crate::lqip::LqipPolicy;
    use crate::plan::{ImageRequest, resolve};
    use crate::ratio::RatioSpec;
    use crate::srcset::ResizeEndpoint;
    use crate::test_helpers::v4_settings;

    fn plan(request: &ImageRequest) -> ResponsivePlan {
        resolve(request, Dimensions { width: 4000, height: 3000 }, &v4_settings(), &mut GridCache::new()).unwrap()
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn plan_header_and_sources() {
        let request = ImageRequest::builder("hero.jpg").cols("col-lg-6").build();
        let lines = format_plan(1, "hero.jpg", &plan(&request), &ResizeEndpoint::default());

        assert_eq!(lines[0], "001 hero.jpg (4000x3000, landscape)");
        assert_eq!(lines[1], "    (min-width:1200px) 570px");
        assert_eq!(lines[2], "        /resize?f=hero.jpg&w=1140 2x");
        assert!(lines.contains(&"    (min-width:992px) 480px".to_string()));
        assert_eq!(lines.last().unwrap(), "    Placeholder: /resize?f=hero.jpg&w=480");
    }

    #[test]
    fn plan_with_ratio_box() {
        let request = ImageRequest::builder("a.jpg")
            .cols("col")
            .ratio(RatioSpec::Aspect { width: 16, height: 9 })
            .build();
        let lines = format_plan(3, "a.jpg", &plan(&request), &ResizeEndpoint::default());
        assert_eq!(lines.last().unwrap(), "    Ratio box: contain, 56.25%");
    }

    #[test]
    fn inline_placeholder_is_truncated() {
        let request = ImageRequest::builder("a.jpg").lqip(LqipPolicy::Color("#123456".into())).build();
        let lines = format_plan(1, "a.jpg", &plan(&request), &ResizeEndpoint::default());
        let placeholder = lines.iter().find(|l| l.contains("Placeholder")).unwrap();
        assert!(placeholder.ends_with("..."));
        assert!(placeholder.contains("data:image/svg+xml;base64,"));
    }

    #[test]
    fn fallback_lines() {
        let fallback = Fallback {
            src: String::new(),
            alt: "Missing image".into(),
            cause: "Image not found: gone.jpg".into(),
        };
        assert_eq!(
            format_fallback(2, "gone.jpg", &fallback),
            vec!["002 gone.jpg", "    Missing image: Image not found: gone.jpg"]
        );
    }

    #[test]
    fn summary_variants() {
        let stats = CacheStats { hits: 1, misses: 1 };
        assert_eq!(format_summary(1, 0, stats), "Planned 1 image (grid cache: 1 cached, 1 computed)");
        assert_eq!(
            format_summary(3, 1, CacheStats { hits: 0, misses: 3 }),
            "Planned 3 images, 1 missing (grid cache: 3 computed)"
        );
    }
}
