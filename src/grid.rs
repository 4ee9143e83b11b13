//! Grid resolution: column fractions → target pixel width per breakpoint.
//!
//! The result is a [`Grid`], keyed by media-query activation width and
//! ordered biggest first, which is the order `<source media>` elements must
//! be emitted in. The last key is always `0`, the implicit breakpoint that
//! catches every screen narrower than the table.
//!
//! ```text
//! "col-10 col-md-6 col-xl-2", v4 table, 12 columns, no gutter
//!
//!   1200 → 190   ceil(1140 * 2/12)
//!    992 → 480   ceil( 960 * 6/12)
//!    768 → 360   ceil( 720 * 6/12)
//!    576 → 450   ceil( 540 * 10/12)
//!      0 → 450   ceil( 540 * 10/12)
//! ```
//!
//! Widths are signed: a gutter wider than its column fraction produces a
//! zero or negative width, which is passed through untouched for the resize
//! endpoint to reject.

use crate::breakpoints::BreakpointTable;
use crate::columns::{ColumnFraction, ColumnSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Target size at one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridEntry {
    /// Media-query `min-width`, `0` for the implicit breakpoint.
    pub activation: u32,
    pub width: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
}

/// Ordered mapping of activation width → target size, biggest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Grid {
    entries: Vec<GridEntry>,
}

impl Grid {
    /// Build from arbitrary entries; sorts descending and keeps the last
    /// value seen for a repeated key.
    pub fn from_entries(entries: impl IntoIterator<Item = GridEntry>) -> Self {
        let map: BTreeMap<u32, GridEntry> = entries.into_iter().map(|e| (e.activation, e)).collect();
        Self {
            entries: map.into_values().rev().collect(),
        }
    }

    pub fn entries(&self) -> &[GridEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridEntry> {
        self.entries.iter()
    }

    pub fn get(&self, activation: u32) -> Option<&GridEntry> {
        self.entries.iter().find(|e| e.activation == activation)
    }

    /// Activation widths, biggest first.
    pub fn keys(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.activation).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy with every width and height passed through `f`.
    pub fn map_sizes(&self, f: impl Fn(i64) -> i64) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| GridEntry {
                    activation: e.activation,
                    width: f(e.width),
                    height: e.height.map(&f),
                })
                .collect(),
        }
    }
}

/// Layout parameters that shape a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridLayout {
    pub grid_columns: u32,
    /// Spacing subtracted from each side of a column, in pixels.
    pub gutter: u32,
    /// When set, every entry is paired with this target height.
    pub container_max_height: Option<u32>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            grid_columns: 12,
            gutter: 0,
            container_max_height: None,
        }
    }
}

impl GridLayout {
    fn column_width(&self, container: u32, numerator: u32) -> i64 {
        let span = (u64::from(container) * u64::from(numerator)).div_ceil(u64::from(self.grid_columns));
        span as i64 - self.gutter_px()
    }

    fn gutter_px(&self) -> i64 {
        2 * i64::from(self.gutter)
    }
}

/// Resolve column fractions against a breakpoint table.
pub fn resolve_grid(columns: &ColumnSet, table: &BreakpointTable, layout: &GridLayout) -> Grid {
    let mut widths: BTreeMap<u32, i64> = BTreeMap::new();
    let smallest = table.smallest_container();

    if columns.is_empty() {
        for bp in table.iter() {
            widths.insert(bp.activation, i64::from(bp.container) - layout.gutter_px());
        }
        widths.insert(0, i64::from(smallest) - layout.gutter_px());
    } else {
        let ordered = order_by_scope(columns, table);
        for bp in table.iter() {
            for (scope_width, fraction) in &ordered {
                if fraction.is_unscoped() || *scope_width <= bp.container {
                    let width = layout.column_width(bp.container, fraction.numerator);
                    widths.insert(bp.activation, width);
                }
            }
        }
        if !widths.contains_key(&0) {
            let zero = match ordered.iter().rev().find(|(_, f)| f.is_unscoped()) {
                Some((_, fraction)) => layout.column_width(smallest, fraction.numerator),
                None => i64::from(smallest) - layout.gutter_px(),
            };
            widths.insert(0, zero);
        }
    }

    let height = layout.container_max_height.map(i64::from);
    Grid::from_entries(widths.into_iter().map(|(activation, width)| GridEntry {
        activation,
        width,
        height,
    }))
}

/// Pair each fraction with its scope's container width, smallest scope first,
/// so wider scopes overwrite narrower ones when applied in order. Fractions
/// naming a breakpoint the table lacks are dropped.
fn order_by_scope<'a>(columns: &'a ColumnSet, table: &BreakpointTable) -> Vec<(u32, &'a ColumnFraction)> {
    let mut ordered: Vec<(u32, &ColumnFraction)> = columns
        .iter()
        .filter_map(|fraction| match table.container(&fraction.breakpoint) {
            Some(width) => Some((width, fraction)),
            None => {
                log::debug!(
                    "ignoring column fraction {}/{} for unknown breakpoint '{}'",
                    fraction.numerator,
                    fraction.breakpoint,
                    fraction.breakpoint
                );
                None
            }
        })
        .collect();
    ordered.sort_by_key(|(width, fraction)| (*width, fraction.numerator));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::{Breakpoint, LayoutVersion};
    use crate::columns::parse_columns;

    fn v4() -> BreakpointTable {
        BreakpointTable::stock(LayoutVersion::V4)
    }

    fn widths(grid: &Grid) -> Vec<(u32, i64)> {
        grid.iter().map(|e| (e.activation, e.width)).collect()
    }

    fn grid_for(classes: &str, table: &BreakpointTable, layout: &GridLayout) -> Grid {
        resolve_grid(&parse_columns(classes, layout.grid_columns), table, layout)
    }

    // =========================================================================
    // Column arithmetic
    // =========================================================================

    #[test]
    fn mixed_scopes_resolve_per_breakpoint() {
        let grid = grid_for("col-10 col-md-6 col-xl-2", &v4(), &GridLayout::default());
        assert_eq!(
            widths(&grid),
            vec![(1200, 190), (992, 480), (768, 360), (576, 450), (0, 450)]
        );
    }

    #[test]
    fn single_breakpoint_half_column() {
        let table = BreakpointTable::new(vec![Breakpoint::new("lg", 960, 992)]).unwrap();
        let grid = grid_for("col-lg-6", &table, &GridLayout::default());
        assert_eq!(grid.get(992).unwrap().width, 480);
    }

    #[test]
    fn scoped_fraction_does_not_reach_smaller_breakpoints() {
        let grid = grid_for("col-lg-4", &v4(), &GridLayout::default());
        // Only xl and lg get an entry, plus the zero fallback at full width.
        assert_eq!(widths(&grid), vec![(1200, 380), (992, 320), (0, 540)]);
    }

    #[test]
    fn unscoped_fraction_sets_zero_entry() {
        let grid = grid_for("col-6", &v4(), &GridLayout::default());
        assert_eq!(grid.get(0).unwrap().width, 270);
    }

    #[test]
    fn rounds_up_partial_pixels() {
        let grid = grid_for("col-7", &v4(), &GridLayout::default());
        // 1140 * 7 / 12 = 665, 540 * 7 / 12 = 315
        assert_eq!(grid.get(1200).unwrap().width, 665);
        assert_eq!(grid.get(0).unwrap().width, 315);
        let grid = grid_for("col-1", &v4(), &GridLayout::default());
        // 1140 / 12 = 95, 720 / 12 = 60
        assert_eq!(grid.get(768).unwrap().width, 60);
        let table = BreakpointTable::new(vec![Breakpoint::new("sm", 545, 576)]).unwrap();
        // 545 * 6 / 12 = 272.5 → 273
        assert_eq!(grid_for("col-6", &table, &GridLayout::default()).get(576).unwrap().width, 273);
    }

    #[test]
    fn unknown_breakpoint_fraction_is_skipped() {
        let grid = grid_for("col-xxl-3 col-md-6", &v4(), &GridLayout::default());
        assert_eq!(grid.get(1200).unwrap().width, 570);
    }

    // =========================================================================
    // No columns
    // =========================================================================

    #[test]
    fn no_columns_is_full_container() {
        let table = BreakpointTable::new(vec![Breakpoint::new("sm", 540, 576)]).unwrap();
        let grid = resolve_grid(&ColumnSet::new(), &table, &GridLayout::default());
        assert_eq!(widths(&grid), vec![(576, 540), (0, 540)]);
    }

    #[test]
    fn no_columns_subtracts_gutter() {
        let layout = GridLayout {
            gutter: 15,
            ..GridLayout::default()
        };
        let grid = resolve_grid(&ColumnSet::new(), &v4(), &layout);
        assert_eq!(grid.get(1200).unwrap().width, 1110);
        assert_eq!(grid.get(0).unwrap().width, 510);
    }

    // =========================================================================
    // Gutter, height, ordering
    // =========================================================================

    #[test]
    fn gutter_subtracted_twice() {
        let layout = GridLayout {
            gutter: 15,
            ..GridLayout::default()
        };
        let grid = grid_for("col-md-6", &v4(), &layout);
        assert_eq!(grid.get(768).unwrap().width, 360 - 30);
    }

    #[test]
    fn oversized_gutter_goes_negative() {
        let layout = GridLayout {
            gutter: 40,
            ..GridLayout::default()
        };
        let grid = grid_for("col-1", &v4(), &layout);
        // ceil(540 / 12) = 45, minus 80
        assert_eq!(grid.get(0).unwrap().width, -35);
    }

    #[test]
    fn max_height_pairs_every_entry() {
        let layout = GridLayout {
            container_max_height: Some(400),
            ..GridLayout::default()
        };
        let grid = grid_for("col-md-6", &v4(), &layout);
        assert!(grid.iter().all(|e| e.height == Some(400)));
    }

    #[test]
    fn keys_descend_and_end_at_zero() {
        for classes in ["", "col", "col-sm-12 col-lg-3", "col-8 col-xl-4"] {
            let grid = grid_for(classes, &BreakpointTable::default(), &GridLayout::default());
            let keys = grid.keys();
            assert!(keys.windows(2).all(|w| w[0] > w[1]), "{classes}: {keys:?}");
            assert_eq!(keys.last(), Some(&0));
        }
    }

    #[test]
    fn from_entries_last_write_wins() {
        let grid = Grid::from_entries([
            GridEntry { activation: 10, width: 1, height: None },
            GridEntry { activation: 20, width: 2, height: None },
            GridEntry { activation: 10, width: 3, height: None },
        ]);
        assert_eq!(widths(&grid), vec![(20, 2), (10, 3)]);
    }

    #[test]
    fn map_sizes_touches_width_and_height() {
        let grid = Grid::from_entries([GridEntry { activation: 0, width: 10, height: Some(5) }]);
        let doubled = grid.map_sizes(|v| v * 2);
        assert_eq!(doubled.get(0), Some(&GridEntry { activation: 0, width: 20, height: Some(10) }));
        assert_eq!(grid.get(0).unwrap().width, 10);
    }
}
