//! Breakpoint tables.
//!
//! A breakpoint pairs a *container width* (the fixed width of `.container`
//! at that screen size) with an *activation width* (the `min-width` of the
//! media query that switches the layout on). Tables are ordered largest to
//! smallest, and both widths strictly decrease down the table.
//!
//! Two stock tables exist, selected by [`LayoutVersion`]:
//!
//! ```text
//!          v4                      v5
//! name   container  media     container  media
//! xxl        -        -          1320     1400
//! xl       1140     1200         1140     1200
//! lg        960      992          960      992
//! md        720      768          720      768
//! sm        540      576          540      576
//! ```
//!
//! Screens narrower than the smallest activation width fall through to the
//! implicit zero breakpoint, which has no entry in the table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used for the implicit, unscoped breakpoint below the smallest entry.
pub const XS: &str = "xs";

/// One row of a breakpoint table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Breakpoint {
    pub name: String,
    /// Container width in pixels.
    pub container: u32,
    /// Media-query `min-width` in pixels.
    pub activation: u32,
}

impl Breakpoint {
    pub fn new(name: &str, container: u32, activation: u32) -> Self {
        Self {
            name: name.to_string(),
            container,
            activation,
        }
    }
}

/// Which stock breakpoint table to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LayoutVersion {
    /// Legacy four-breakpoint layout (sm..xl).
    V4,
    /// Current five-breakpoint layout (sm..xxl).
    V5,
}

impl TryFrom<u8> for LayoutVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::V4),
            5 => Ok(Self::V5),
            other => Err(format!("unsupported layout version {other} (expected 4 or 5)")),
        }
    }
}

impl From<LayoutVersion> for u8 {
    fn from(version: LayoutVersion) -> Self {
        match version {
            LayoutVersion::V4 => 4,
            LayoutVersion::V5 => 5,
        }
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", u8::from(*self))
    }
}

/// An ordered breakpoint table, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BreakpointTable {
    entries: Vec<Breakpoint>,
}

impl BreakpointTable {
    /// Build a table, rejecting empty or out-of-order input.
    ///
    /// Entries must be strictly descending in both container and activation
    /// width, names must be unique, and no entry may reuse the reserved `xs`
    /// name or activate at zero (that slot belongs to the implicit breakpoint).
    pub fn new(entries: Vec<Breakpoint>) -> Result<Self, String> {
        if entries.is_empty() {
            return Err("breakpoint table must not be empty".into());
        }
        for bp in &entries {
            if bp.name == XS {
                return Err(format!("breakpoint name '{XS}' is reserved"));
            }
            if bp.activation == 0 {
                return Err(format!(
                    "breakpoint '{}' must activate above 0px",
                    bp.name
                ));
            }
        }
        for pair in entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.container <= b.container || a.activation <= b.activation {
                return Err(format!(
                    "breakpoints must be strictly descending: '{}' ({}px/{}px) before '{}' ({}px/{}px)",
                    a.name, a.container, a.activation, b.name, b.container, b.activation
                ));
            }
            if entries.iter().filter(|bp| bp.name == a.name).count() > 1 {
                return Err(format!("duplicate breakpoint name '{}'", a.name));
            }
        }
        Ok(Self { entries })
    }

    /// The stock table for a layout version.
    pub fn stock(version: LayoutVersion) -> Self {
        let mut entries = Vec::with_capacity(5);
        if version == LayoutVersion::V5 {
            entries.push(Breakpoint::new("xxl", 1320, 1400));
        }
        entries.extend([
            Breakpoint::new("xl", 1140, 1200),
            Breakpoint::new("lg", 960, 992),
            Breakpoint::new("md", 720, 768),
            Breakpoint::new("sm", 540, 576),
        ]);
        Self { entries }
    }

    /// Entries, largest first.
    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Breakpoint> {
        self.entries.iter().find(|bp| bp.name == name)
    }

    /// Container width for a breakpoint name. `xs` maps to 0.
    pub fn container(&self, name: &str) -> Option<u32> {
        if name == XS {
            return Some(0);
        }
        self.get(name).map(|bp| bp.container)
    }

    /// The narrowest container width in the table.
    pub fn smallest_container(&self) -> u32 {
        self.entries.last().map_or(0, |bp| bp.container)
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self::stock(LayoutVersion::V5)
    }
}
