//! Turning planned widths into `srcset` candidates.
//!
//! The planner only ever produces widths. A [`FileNameResolver`] maps each
//! `(name, extension, width)` to a URL; [`ResizeEndpoint`] is the stock one,
//! pointing at an on-the-fly resize handler:
//!
//! ```text
//! https://example.com/resize?f=photos%2Fhero.jpg&w=960
//! ```
//!
//! [`srcset`] walks a plan's resolution dict in breakpoint order and yields
//! one [`SourceSet`] per `<source>` element the markup layer will emit.

use crate::lqip::LqipChoice;
use crate::plan::ResponsivePlan;
use serde::Serialize;
use std::fmt;
use url::{Url, form_urlencoded};

/// Maps a logical file and width to a URL.
pub trait FileNameResolver {
    fn file_name(&self, name: &str, ext: &str, width: i64) -> String;
}

impl<F> FileNameResolver for F
where
    F: Fn(&str, &str, i64) -> String,
{
    fn file_name(&self, name: &str, ext: &str, width: i64) -> String {
        self(name, ext, width)
    }
}

/// `{base}resize?f=<name.ext>&w=<width>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeEndpoint {
    base: String,
}

impl ResizeEndpoint {
    /// `base` gets a trailing slash if it lacks one.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    pub fn from_url(url: &Url) -> Self {
        Self::new(url.as_str())
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Default for ResizeEndpoint {
    fn default() -> Self {
        Self::new("/")
    }
}

impl FileNameResolver for ResizeEndpoint {
    fn file_name(&self, name: &str, ext: &str, width: i64) -> String {
        let file = if ext.is_empty() {
            name.to_string()
        } else {
            format!("{name}.{ext}")
        };
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("f", &file)
            .append_pair("w", &width.to_string())
            .finish();
        format!("{}resize?{query}", self.base)
    }
}

/// One `srcset` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub url: String,
    pub factor: f64,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factor > 1.0 {
            write!(f, "{} {}x", self.url, self.factor)
        } else {
            write!(f, "{}", self.url)
        }
    }
}

/// Candidates for one `<source>` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSet {
    pub media: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime: Option<&'static str>,
    pub candidates: Vec<Candidate>,
}

impl SourceSet {
    /// The comma-joined `srcset` attribute value.
    pub fn srcset_attr(&self) -> String {
        self.candidates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `(min-width:Npx)`
pub fn media_query(activation: u32) -> String {
    format!("(min-width:{activation}px)")
}

/// Split `photos/hero.jpg` into `("photos/hero", "jpg")`.
pub fn split_ext(file: &str) -> (&str, &str) {
    match file.rsplit_once('.') {
        Some((name, ext)) if !name.is_empty() && !ext.contains('/') => (name, ext),
        _ => (file, ""),
    }
}

fn mime_for(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "webp" => Some("image/webp"),
        "jp2" => Some("image/jp2"),
        _ => None,
    }
}

/// Per-breakpoint candidate lists, biggest media query first.
///
/// Factors that resolve to an already-seen URL don't add a new entry; the
/// existing entry keeps its place and takes the lower factor.
pub fn srcset(plan: &ResponsivePlan, file: &str, resolver: &dyn FileNameResolver) -> Vec<SourceSet> {
    let (name, ext) = split_ext(file);
    plan.resolutions
        .iter()
        .map(|set| {
            let mut candidates: Vec<Candidate> = Vec::with_capacity(set.variants.len());
            for variant in &set.variants {
                let url = resolver.file_name(name, ext, variant.width);
                match candidates.iter_mut().find(|c| c.url == url) {
                    Some(existing) => existing.factor = variant.factor,
                    None => candidates.push(Candidate {
                        url,
                        factor: variant.factor,
                    }),
                }
            }
            SourceSet {
                media: media_query(set.activation),
                mime: mime_for(ext),
                candidates,
            }
        })
        .collect()
}

/// The `src` for the placeholder `<img>`.
pub fn lqip_src(plan: &ResponsivePlan, file: &str, resolver: &dyn FileNameResolver) -> String {
    match &plan.lqip {
        LqipChoice::Width(width) => {
            let (name, ext) = split_ext(file);
            resolver.file_name(name, ext, *width)
        }
        LqipChoice::Inline(data) => data.clone(),
        LqipChoice::File(other) => other.clone(),
    }
}

/// Device-pixel-ratio media query list for a factor, optionally and-ed with
/// another query. Factor 1 yields just the other query.
pub fn resolution_media(factor: f64, other: Option<&str>) -> String {
    if factor <= 1.0 {
        return other.unwrap_or_default().to_string();
    }
    let dpi = factor * 96.0;
    let parts = [
        format!("-webkit-min-device-pixel-ratio: {factor}"),
        format!("min--moz-device-pixel-ratio: {factor}"),
        format!("-o-min-device-pixel-ratio: {factor}/1"),
        format!("min-device-pixel-ratio: {factor}"),
        format!("min-resolution: {dpi}dpi"),
        format!("min-resolution: {factor}dppx"),
    ];
    let suffix = other.map(|media| format!(" and {media}")).unwrap_or_default();
    parts
        .iter()
        .map(|part| format!("({part}){suffix}"))
        .collect::<Vec<_>>()
        .join(", ")
}
