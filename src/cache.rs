//! Grid memoization for repeated layouts.
//!
//! A page usually renders many images into the same column structure (a
//! gallery row, a card deck). Resolving the grid is cheap but not free, and
//! its inputs repeat exactly, so a [`GridCache`] remembers each grid it has
//! built.
//!
//! # Scope
//!
//! A cache belongs to one session: one [`Planner`](crate::plan::Planner), or
//! one worker thread in the CLI. It is a plain value with `&mut` access, never
//! a global, so layouts from one request cannot bleed into another.
//!
//! # Keys
//!
//! The key is the normalized [`column_signature`] plus every other input that
//! shapes the grid: the breakpoint table, the column count, the gutter, and
//! the container height. Two class lists that differ only in non-column
//! classes or token order share an entry; changing any size-affecting option
//! misses.

use crate::breakpoints::BreakpointTable;
use crate::columns::{column_signature, parse_columns};
use crate::grid::{Grid, GridLayout, resolve_grid};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GridKey {
    signature: String,
    table: BreakpointTable,
    layout: GridLayout,
}

/// Session-scoped cache of resolved grids.
#[derive(Debug, Default)]
pub struct GridCache {
    grids: HashMap<GridKey, Grid>,
    stats: CacheStats,
}

impl GridCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The grid for a class list, resolving it on first sight.
    pub fn grid_for(&mut self, classes: &str, table: &BreakpointTable, layout: &GridLayout) -> Grid {
        let key = GridKey {
            signature: column_signature(classes, layout.grid_columns),
            table: table.clone(),
            layout: *layout,
        };
        if let Some(grid) = self.grids.get(&key) {
            self.stats.hit();
            log::debug!("grid cache hit for '{}'", key.signature);
            return grid.clone();
        }
        self.stats.miss();
        log::debug!("grid cache miss for '{}'", key.signature);
        let grid = resolve_grid(&parse_columns(&key.signature, layout.grid_columns), table, layout);
        self.grids.insert(key, grid.clone());
        grid
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Forget every grid; statistics are kept.
    pub fn clear(&mut self) {
        self.grids.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Hit/miss counters for a [`GridCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }

    /// Fold another session's counters into this one.
    pub fn absorb(&mut self, other: CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
    }

    /// Counts recorded since an earlier snapshot of the same cache.
    pub fn since(&self, earlier: CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits.saturating_sub(earlier.hits),
            misses: self.misses.saturating_sub(earlier.misses),
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(f, "{} cached, {} computed", self.hits, self.misses)
        } else {
            write!(f, "{} computed", self.misses)
        }
    }
}
