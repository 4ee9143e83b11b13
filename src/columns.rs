//! Column class parsing.
//!
//! Turns a free-form class list such as `"card col-6 col-md-4 shadow"` into
//! the set of column fractions it declares. Parsing is total: anything that
//! is not a column token is somebody else's CSS class and is skipped.
//!
//! Recognised tokens, for a 12-column grid:
//!
//! | Token | Fraction |
//! |---|---|
//! | `col` | `12/12` unscoped |
//! | `col-6` | `6/12` unscoped |
//! | `col-xs-6` | `6/12` unscoped |
//! | `col-md` | `12/12` from `md` up |
//! | `col-md-4` | `4/12` from `md` up |
//!
//! Unscoped fractions use the [`XS`] scope and apply at every width.

use crate::breakpoints::XS;
use std::collections::BTreeSet;

/// A column span scoped to a breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnFraction {
    /// Columns spanned, `1..=grid_columns`.
    pub numerator: u32,
    /// Breakpoint name, or [`XS`] when unscoped.
    pub breakpoint: String,
}

impl ColumnFraction {
    pub fn new(numerator: u32, breakpoint: &str) -> Self {
        Self {
            numerator,
            breakpoint: breakpoint.to_string(),
        }
    }

    pub fn is_unscoped(&self) -> bool {
        self.breakpoint == XS
    }
}

/// Deduplicated column fractions parsed from one class list.
pub type ColumnSet = BTreeSet<ColumnFraction>;

/// Parse a whitespace-separated class list.
pub fn parse_columns(classes: &str, grid_columns: u32) -> ColumnSet {
    parse_column_tokens(classes.split_whitespace(), grid_columns)
}

/// Parse an already-split token list.
pub fn parse_column_tokens<'a, I>(tokens: I, grid_columns: u32) -> ColumnSet
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .filter_map(|token| parse_token(token, grid_columns))
        .collect()
}

/// Parse a single token, or `None` if it is not a usable column class.
pub fn parse_token(token: &str, grid_columns: u32) -> Option<ColumnFraction> {
    let mut parts = token.split('-');
    if parts.next()? != "col" {
        return None;
    }
    let rest: Vec<&str> = parts.collect();
    let (breakpoint, numerator) = match rest.as_slice() {
        [] => (XS, grid_columns),
        [single] => match single.parse::<u32>() {
            Ok(n) => (XS, n),
            Err(_) if is_breakpoint_name(single) => (*single, grid_columns),
            Err(_) => return None,
        },
        [name, number] if is_breakpoint_name(name) => (*name, number.parse::<u32>().ok()?),
        _ => return None,
    };
    if numerator == 0 || numerator > grid_columns {
        return None;
    }
    Some(ColumnFraction::new(numerator, breakpoint))
}

fn is_breakpoint_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic())
}

/// Normalized cache signature for a class list.
///
/// Only column tokens take part, deduplicated and sorted, so
/// `"shadow col-md-6 col-6 col-6"` and `"col-6 col-md-6"` share a signature.
pub fn column_signature(classes: &str, grid_columns: u32) -> String {
    let tokens: BTreeSet<&str> = classes
        .split_whitespace()
        .filter(|token| parse_token(token, grid_columns).is_some())
        .collect();
    tokens.into_iter().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fractions(set: &ColumnSet) -> Vec<(u32, &str)> {
        set.iter()
            .map(|f| (f.numerator, f.breakpoint.as_str()))
            .collect()
    }

    // =========================================================================
    // parse_token
    // =========================================================================

    #[test]
    fn scoped_token() {
        assert_eq!(parse_token("col-md-6", 12), Some(ColumnFraction::new(6, "md")));
    }

    #[test]
    fn bare_col_fills_grid() {
        assert_eq!(parse_token("col", 12), Some(ColumnFraction::new(12, XS)));
    }

    #[test]
    fn bare_breakpoint_fills_grid() {
        assert_eq!(parse_token("col-lg", 12), Some(ColumnFraction::new(12, "lg")));
    }

    #[test]
    fn number_without_breakpoint_is_unscoped() {
        assert_eq!(parse_token("col-4", 12), Some(ColumnFraction::new(4, XS)));
        assert_eq!(parse_token("col-xs-4", 12), Some(ColumnFraction::new(4, XS)));
    }

    #[test]
    fn non_column_classes_ignored() {
        assert_eq!(parse_token("img-fluid", 12), None);
        assert_eq!(parse_token("column-6", 12), None);
        assert_eq!(parse_token("col-md-6-extra", 12), None);
        assert_eq!(parse_token("col-md-x", 12), None);
        assert_eq!(parse_token("col-", 12), None);
    }

    #[test]
    fn numerator_bounds() {
        assert_eq!(parse_token("col-0", 12), None);
        assert_eq!(parse_token("col-md-13", 12), None);
        assert_eq!(parse_token("col-md-16", 16), Some(ColumnFraction::new(16, "md")));
    }

    // =========================================================================
    // parse_columns
    // =========================================================================

    #[test]
    fn mixed_class_list() {
        let set = parse_columns("card col-6 col-md-4 shadow", 12);
        assert_eq!(fractions(&set), vec![(4, "md"), (6, XS)]);
    }

    #[test]
    fn duplicates_collapse() {
        let set = parse_columns("col-md-6 col-md-6  col-md-6", 12);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_input_is_empty_set() {
        assert!(parse_columns("", 12).is_empty());
        assert!(parse_columns("   ", 12).is_empty());
        assert!(parse_columns("text-center", 12).is_empty());
    }

    #[test]
    fn token_list_input() {
        let set = parse_column_tokens(["col-lg-3", "col"], 12);
        assert_eq!(fractions(&set), vec![(3, "lg"), (12, XS)]);
    }

    // =========================================================================
    // column_signature
    // =========================================================================

    #[test]
    fn signature_is_order_and_noise_insensitive() {
        assert_eq!(
            column_signature("shadow col-md-6 col-6 col-6", 12),
            column_signature("col-6 col-md-6", 12)
        );
        assert_eq!(column_signature("col-md-6 col-6", 12), "col-6 col-md-6");
    }

    #[test]
    fn signature_of_nothing_is_empty() {
        assert_eq!(column_signature("rounded", 12), "");
    }
}
