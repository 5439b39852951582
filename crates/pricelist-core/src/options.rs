//! Tunable extraction policy.
//!
//! The sufficiency threshold and the geometric clustering tolerances are
//! policy, not algorithm: representative vendor documents disagree about
//! them, so they are configuration with conservative defaults rather than
//! constants.

use serde::{Deserialize, Serialize};

/// Policy parameters shared by the strategies, the selector and the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Raster resolution for the OCR fallback, in dots per inch. Higher
    /// values sharpen small print at the cost of memory and recognition
    /// time.
    pub render_dpi: f32,

    /// Recognition confidence floor (0.0–1.0); OCR tokens below it are
    /// discarded before clustering.
    pub min_token_confidence: f32,

    /// Row tolerance band as a fraction of the median token height: tokens
    /// whose vertical centers sit within this distance of a row's running
    /// center merge into that row. Tokens whose boxes overlap vertically
    /// merge regardless of the band.
    pub row_band_factor: f32,

    /// Column tolerance band as a fraction of the median token height:
    /// cell start positions closer than this collapse into one column.
    pub column_band_factor: f32,

    /// Minimum row count (header included) for a grid to count as a table.
    pub min_table_rows: usize,

    /// Minimum column count for a grid to count as a table.
    pub min_table_cols: usize,

    /// Sufficiency threshold: fraction of a column's populated data cells
    /// that must look like currency for the table to count as costed.
    pub cost_column_min_ratio: f64,

    /// Unit costs above this are treated as misreads and dropped.
    pub max_cost: f64,

    /// Fraction of the page width an empty vertical gutter must span before
    /// the strategy splits side-by-side tables apart.
    pub gutter_split_ratio: f32,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            render_dpi: 400.0,
            min_token_confidence: 0.3,
            row_band_factor: 0.6,
            column_band_factor: 1.5,
            min_table_rows: 2,
            min_table_cols: 2,
            cost_column_min_ratio: 0.5,
            max_cost: 1000.0,
            gutter_split_ratio: 0.12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let opts = ExtractionOptions::default();
        assert!(opts.render_dpi >= 72.0);
        assert!((0.0..=1.0).contains(&opts.min_token_confidence));
        assert!(opts.min_table_rows >= 2 && opts.min_table_cols >= 2);
        assert!((0.0..=1.0).contains(&opts.cost_column_min_ratio));
    }
}
