//! Geometric clustering of positioned text into tabular grids.
//!
//! Both strategies produce the same intermediate: text spans with bounding
//! boxes. This module turns a page's spans into a grid by grouping them
//! into rows (vertical tolerance band, noise-tolerant) and columns
//! (1-D clustering of start positions), with an optional split at a wide
//! vertical gutter for price sheets laid out as two side-by-side tables.
//!
//! All tolerances are expressed relative to the median span height, so the
//! same code serves text-layer coordinates (points) and OCR raster
//! coordinates (pixels) unchanged.

use pricelist_core::ExtractionOptions;

use crate::capabilities::TextCell;

/// Fraction of the smaller box height that must overlap vertically for two
/// spans to merge into one row regardless of the center-distance band.
const OVERLAP_MERGE_FRACTION: f32 = 0.5;

/// Median bounding-box height of a set of cells; zero for an empty set.
#[must_use]
pub fn median_height(cells: &[TextCell]) -> f32 {
    if cells.is_empty() {
        return 0.0;
    }
    let mut heights: Vec<f32> = cells.iter().map(|c| c.bbox.height).collect();
    heights.sort_by(f32::total_cmp);
    heights[heights.len() / 2]
}

/// Group cells into rows.
///
/// Cells are walked top to bottom; a cell joins the current row when its
/// vertical center sits within `band` of the row's anchor center, or when
/// its box overlaps the row's running extent by at least half the smaller
/// height. The overlap rule is what makes the grouping tolerate OCR jitter:
/// slightly misaligned tokens still share a row as long as their boxes
/// genuinely intersect vertically.
///
/// Each returned row is sorted left to right.
#[must_use]
pub fn group_rows(mut cells: Vec<TextCell>, band: f32) -> Vec<Vec<TextCell>> {
    if cells.is_empty() {
        return Vec::new();
    }

    cells.sort_by(|a, b| {
        a.bbox
            .center_y()
            .total_cmp(&b.bbox.center_y())
            .then(a.bbox.left.total_cmp(&b.bbox.left))
    });

    let mut rows: Vec<Vec<TextCell>> = Vec::new();
    let mut current: Vec<TextCell> = Vec::new();
    let mut anchor_y = 0.0f32;
    let mut row_top = 0.0f32;
    let mut row_bottom = 0.0f32;

    for cell in cells {
        if current.is_empty() {
            anchor_y = cell.bbox.center_y();
            row_top = cell.bbox.top;
            row_bottom = cell.bbox.bottom();
            current.push(cell);
            continue;
        }

        let center_close = (cell.bbox.center_y() - anchor_y).abs() <= band;
        let overlap = (row_bottom.min(cell.bbox.bottom()) - row_top.max(cell.bbox.top)).max(0.0);
        let overlap_enough =
            overlap >= OVERLAP_MERGE_FRACTION * cell.bbox.height.min(row_bottom - row_top);

        if center_close || overlap_enough {
            row_top = row_top.min(cell.bbox.top);
            row_bottom = row_bottom.max(cell.bbox.bottom());
            current.push(cell);
        } else {
            current.sort_by(|a, b| a.bbox.left.total_cmp(&b.bbox.left));
            rows.push(std::mem::take(&mut current));
            anchor_y = cell.bbox.center_y();
            row_top = cell.bbox.top;
            row_bottom = cell.bbox.bottom();
            current.push(cell);
        }
    }
    if !current.is_empty() {
        current.sort_by(|a, b| a.bbox.left.total_cmp(&b.bbox.left));
        rows.push(current);
    }
    rows
}

/// Cluster the start positions of all cells into column bands.
///
/// Returns the mean start position of each band, in left-to-right order.
/// Start positions closer than `tolerance` collapse into one band.
#[must_use]
pub fn column_bands(rows: &[Vec<TextCell>], tolerance: f32) -> Vec<f32> {
    let mut lefts: Vec<f32> = rows
        .iter()
        .flat_map(|row| row.iter().map(|c| c.bbox.left))
        .collect();
    if lefts.is_empty() {
        return Vec::new();
    }
    lefts.sort_by(f32::total_cmp);

    let mut bands: Vec<f32> = Vec::new();
    let mut sum = lefts[0];
    let mut count = 1usize;
    let mut last = lefts[0];

    for &left in &lefts[1..] {
        if left - last <= tolerance {
            sum += left;
            count += 1;
        } else {
            #[allow(clippy::cast_precision_loss)]
            bands.push(sum / count as f32);
            sum = left;
            count = 1;
        }
        last = left;
    }
    #[allow(clippy::cast_precision_loss)]
    bands.push(sum / count as f32);
    bands
}

/// Nearest band index for a start position.
fn nearest_band(bands: &[f32], left: f32) -> usize {
    let mut best = 0usize;
    let mut best_distance = f32::INFINITY;
    for (idx, &band) in bands.iter().enumerate() {
        let distance = (left - band).abs();
        if distance < best_distance {
            best = idx;
            best_distance = distance;
        }
    }
    best
}

/// Materialize rows and bands into a text grid. Cells landing in the same
/// band on the same row are joined with a space, left to right; bands with
/// no cell in a row become empty strings.
#[must_use]
pub fn build_grid(rows: &[Vec<TextCell>], bands: &[f32]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let mut grid_row = vec![String::new(); bands.len()];
            for cell in row {
                let column = &mut grid_row[nearest_band(bands, cell.bbox.left)];
                if !column.is_empty() {
                    column.push(' ');
                }
                column.push_str(cell.text.trim());
            }
            grid_row
        })
        .collect()
}

/// Split a page's cells at a wide vertical gutter.
///
/// Price sheets are commonly laid out as two independent tables side by
/// side; clustering them as one grid interleaves unrelated columns. When
/// the largest horizontal gap in the cells' x-coverage spans at least
/// `gutter_split_ratio` of the page width, the cells split into a left and
/// a right group. Otherwise the original group is returned unchanged.
#[must_use]
pub fn split_at_gutter(
    cells: Vec<TextCell>,
    page_width: f32,
    min_gap_ratio: f32,
) -> Vec<Vec<TextCell>> {
    if cells.len() < 4 || page_width <= 0.0 {
        return vec![cells];
    }

    // Merge the cells' x-extents into covered intervals.
    let mut intervals: Vec<(f32, f32)> = cells
        .iter()
        .map(|c| (c.bbox.left, c.bbox.right()))
        .collect();
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f32, f32)> = vec![intervals[0]];
    for (start, end) in intervals.into_iter().skip(1) {
        let last = merged
            .last_mut()
            .expect("merged intervals start non-empty");
        if start <= last.1 {
            last.1 = last.1.max(end);
        } else {
            merged.push((start, end));
        }
    }

    // Largest gap between covered intervals.
    let mut gap_start = 0.0f32;
    let mut gap_width = 0.0f32;
    for pair in merged.windows(2) {
        let width = pair[1].0 - pair[0].1;
        if width > gap_width {
            gap_width = width;
            gap_start = pair[0].1;
        }
    }

    if gap_width < min_gap_ratio * page_width {
        return vec![cells];
    }

    let split_x = gap_start + gap_width / 2.0;
    let (left, right): (Vec<TextCell>, Vec<TextCell>) = cells
        .into_iter()
        .partition(|c| c.bbox.center_x() < split_x);
    if left.is_empty() || right.is_empty() {
        return vec![left.into_iter().chain(right).collect()];
    }
    vec![left, right]
}

/// Cluster one region's cells into a text grid.
///
/// Returns `None` when the region does not form a stable table: fewer rows
/// or column bands than the configured minimum, or too few rows with more
/// than one populated column.
#[must_use]
pub fn cluster_region(cells: &[TextCell], options: &ExtractionOptions) -> Option<Vec<Vec<String>>> {
    if cells.is_empty() {
        return None;
    }

    let height = median_height(cells);
    if height <= 0.0 {
        return None;
    }

    let rows = group_rows(cells.to_vec(), height * options.row_band_factor);
    if rows.len() < options.min_table_rows {
        return None;
    }

    let bands = column_bands(&rows, height * options.column_band_factor);
    if bands.len() < options.min_table_cols {
        return None;
    }

    let grid = build_grid(&rows, &bands);
    let multi_cell_rows = grid
        .iter()
        .filter(|row| row.iter().filter(|cell| !cell.is_empty()).count() >= 2)
        .count();
    if multi_cell_rows < options.min_table_rows {
        return None;
    }

    Some(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricelist_core::BoundingBox;

    fn cell(text: &str, left: f32, top: f32) -> TextCell {
        TextCell::new(text, BoundingBox::new(left, top, 36.0, 10.0))
    }

    fn options() -> ExtractionOptions {
        ExtractionOptions::default()
    }

    #[test]
    fn clusters_a_clean_grid() {
        let cells = vec![
            cell("SKU", 10.0, 10.0),
            cell("Description", 100.0, 10.0),
            cell("Price", 250.0, 10.0),
            cell("A100", 10.0, 30.0),
            cell("Widget", 100.0, 30.0),
            cell("$12.50", 250.0, 30.0),
            cell("A200", 10.0, 50.0),
            cell("Gadget", 100.0, 50.0),
            cell("$7.25", 250.0, 50.0),
        ];

        let grid = cluster_region(&cells, &options()).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], ["SKU", "Description", "Price"]);
        assert_eq!(grid[1], ["A100", "Widget", "$12.50"]);
        assert_eq!(grid[2], ["A200", "Gadget", "$7.25"]);
    }

    #[test]
    fn tolerates_vertical_jitter_within_the_band() {
        // OCR noise: tokens of one physical row sit a few pixels apart.
        let cells = vec![
            cell("A100", 10.0, 30.0),
            cell("Widget", 100.0, 33.5),
            cell("$12.50", 250.0, 27.0),
            cell("A200", 10.0, 60.0),
            cell("Gadget", 100.0, 61.0),
            cell("$7.25", 250.0, 59.0),
        ];

        let grid = cluster_region(&cells, &options()).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0], ["A100", "Widget", "$12.50"]);
        assert_eq!(grid[1], ["A200", "Gadget", "$7.25"]);
    }

    #[test]
    fn missing_cells_become_empty_strings() {
        let cells = vec![
            cell("A100", 10.0, 30.0),
            cell("Widget", 100.0, 30.0),
            cell("$12.50", 250.0, 30.0),
            cell("A200", 10.0, 50.0),
            cell("$7.25", 250.0, 50.0),
        ];

        let grid = cluster_region(&cells, &options()).unwrap();
        assert_eq!(grid[1], ["A200", "", "$7.25"]);
    }

    #[test]
    fn multi_token_cells_join_with_spaces() {
        let cells = vec![
            cell("A100", 10.0, 30.0),
            cell("Chicken", 100.0, 30.0),
            cell("Breast", 140.0, 30.0),
            cell("$4.15", 250.0, 30.0),
            cell("A200", 10.0, 50.0),
            cell("Thighs", 100.0, 50.0),
            cell("$2.85", 250.0, 50.0),
        ];

        let grid = cluster_region(&cells, &options()).unwrap();
        assert_eq!(grid[0][1], "Chicken Breast");
    }

    #[test]
    fn single_column_text_is_not_a_table() {
        let cells = vec![
            cell("Terms", 10.0, 10.0),
            cell("and", 10.0, 30.0),
            cell("conditions", 10.0, 50.0),
        ];
        assert!(cluster_region(&cells, &options()).is_none());
    }

    #[test]
    fn single_row_is_not_a_table() {
        let cells = vec![cell("A100", 10.0, 30.0), cell("$1.00", 250.0, 30.0)];
        assert!(cluster_region(&cells, &options()).is_none());
    }

    #[test]
    fn wide_gutter_splits_side_by_side_tables() {
        let mut cells = Vec::new();
        for (row, y) in [30.0f32, 50.0, 70.0].iter().enumerate() {
            cells.push(cell(&format!("L{row}"), 10.0, *y));
            cells.push(cell(&format!("$1.{row}0"), 60.0, *y));
            cells.push(cell(&format!("R{row}"), 400.0, *y));
            cells.push(cell(&format!("$2.{row}0"), 450.0, *y));
        }

        let groups = split_at_gutter(cells, 612.0, 0.12);
        assert_eq!(groups.len(), 2);
        assert!(groups[0].iter().all(|c| c.bbox.left < 200.0));
        assert!(groups[1].iter().all(|c| c.bbox.left > 200.0));
    }

    #[test]
    fn narrow_gaps_do_not_split() {
        let cells = vec![
            cell("A", 10.0, 30.0),
            cell("B", 60.0, 30.0),
            cell("C", 110.0, 30.0),
            cell("D", 160.0, 30.0),
        ];
        let groups = split_at_gutter(cells, 612.0, 0.12);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn clustering_is_deterministic() {
        let cells = vec![
            cell("A100", 10.0, 30.0),
            cell("Widget", 100.0, 31.0),
            cell("$12.50", 250.0, 29.0),
            cell("A200", 10.0, 50.0),
            cell("Gadget", 100.0, 50.0),
            cell("$7.25", 250.0, 50.0),
        ];
        let first = cluster_region(&cells, &options());
        let second = cluster_region(&cells, &options());
        assert_eq!(first, second);
    }
}
