//! Shared test utilities for the gridset test suite.
//!
//! Provides synthetic source images for the header probe and the stock
//! settings most unit tests plan against.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("a.png");
//! write_test_png(&path, 200, 150);
//!
//! let settings = v4_settings();
//! ```

use std::path::Path;

use crate::breakpoints::{BreakpointTable, LayoutVersion};
use crate::plan::Settings;

// =========================================================================
// Fixture images
// =========================================================================

/// Write a small gradient PNG of the given size.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Settings
// =========================================================================

/// Stock settings on the four-breakpoint table (sm 540 .. xl 1140).
pub fn v4_settings() -> Settings {
    Settings {
        table: BreakpointTable::stock(LayoutVersion::V4),
        ..Settings::default()
    }
}
