//! Record parser for pricelist-rs
//!
//! Maps [`RawTable`]s into typed [`ProductRecord`]s. Column identification
//! runs as two pure, independently testable passes: header-vocabulary
//! matching over the first rows, then positional heuristics when no header
//! is confidently identified. Rows that cannot produce a complete record
//! (unparseable cost, empty id or description, profile violations) are
//! dropped and counted — never emitted with guessed values.

pub mod profile;

pub use profile::{IdPolicy, ParserProfile, ProfileRegistry};

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use pricelist_core::money::{is_currency_token, parse_money};
use pricelist_core::{ExtractionOptions, ProductRecord, RawTable};

/// Column role assignment for a raw table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    /// Column holding the product id.
    pub product_id: usize,
    /// Column holding the description.
    pub description: usize,
    /// Column holding the unit cost.
    pub cost: usize,
}

/// Outcome of parsing one or more tables of a single document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedTable {
    /// Valid records, in table and row order.
    pub records: Vec<ProductRecord>,
    /// Rows dropped because a field could not be resolved.
    pub rows_skipped: usize,
}

static ID_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(id|sku|code|item\s*(#|no\.?|number)|product\s*(id|code|#))\s*$")
        .expect("static regex")
});

static DESCRIPTION_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(description|desc\.?|item|name|product(\s*name)?)\s*$")
        .expect("static regex")
});

static COST_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(price|cost|amount|rate|unit\s*(price|cost)|price\s*ea\.?)\s*$")
        .expect("static regex")
});

/// Identify columns from a header row.
///
/// Scans the first two rows for cells matching the known header
/// vocabularies. A row counts as a header when at least two of the three
/// roles match distinct columns; a missing third role is assigned to the
/// first unclaimed column. Returns the roles and the index of the first
/// data row, or `None` when no row qualifies.
#[must_use]
pub fn match_header(rows: &[Vec<String>]) -> Option<(ColumnRoles, usize)> {
    for (row_index, row) in rows.iter().enumerate().take(2) {
        if row.len() < 3 {
            continue;
        }

        let find = |re: &Regex, taken: &[Option<usize>]| -> Option<usize> {
            row.iter()
                .enumerate()
                .find(|(idx, cell)| !taken.contains(&Some(*idx)) && re.is_match(cell))
                .map(|(idx, _)| idx)
        };

        let product_id = find(&ID_HEADER_RE, &[]);
        let cost = find(&COST_HEADER_RE, &[product_id]);
        let description = find(&DESCRIPTION_HEADER_RE, &[product_id, cost]);

        let mut roles = [product_id, description, cost];
        let matched = roles.iter().flatten().count();
        if matched < 2 {
            continue;
        }

        // Assign the missing role (at most one, given the >= 2 gate) to the
        // first unclaimed column.
        let unclaimed = (0..row.len()).find(|idx| !roles.contains(&Some(*idx)));
        for role in &mut roles {
            if role.is_none() {
                *role = unclaimed;
            }
        }

        if let [Some(product_id), Some(description), Some(cost)] = roles {
            return Some((
                ColumnRoles {
                    product_id,
                    description,
                    cost,
                },
                row_index + 1,
            ));
        }
    }
    None
}

/// Per-column statistics backing positional inference.
#[derive(Debug, Default, Clone, Copy)]
struct ColumnStats {
    populated: usize,
    currency: usize,
    compact_alnum: usize,
    total_len: usize,
}

impl ColumnStats {
    #[allow(clippy::cast_precision_loss)]
    fn currency_ratio(&self) -> f64 {
        if self.populated == 0 {
            0.0
        } else {
            self.currency as f64 / self.populated as f64
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn compact_ratio(&self) -> f64 {
        if self.populated == 0 {
            0.0
        } else {
            self.compact_alnum as f64 / self.populated as f64
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean_len(&self) -> f64 {
        if self.populated == 0 {
            f64::INFINITY
        } else {
            self.total_len as f64 / self.populated as f64
        }
    }
}

/// Identify columns positionally, without a header.
///
/// The cost column is the one whose populated cells most consistently look
/// like currency (ties go right, where price lists put the cost). Among the
/// remaining columns the product id is the one with the highest share of
/// compact alphanumeric cells and the lowest mean length; the description
/// is the remaining column with the longest text. Returns `None` for tables
/// with fewer than three columns or no column clearing the currency ratio
/// floor.
#[must_use]
pub fn infer_columns(rows: &[Vec<String>], cost_column_min_ratio: f64) -> Option<ColumnRoles> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns < 3 {
        return None;
    }

    let mut stats = vec![ColumnStats::default(); columns];
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                continue;
            }
            let column = &mut stats[idx];
            column.populated += 1;
            column.total_len += trimmed.chars().count();
            if is_currency_token(trimmed) {
                column.currency += 1;
            }
            if !trimmed.chars().any(char::is_whitespace)
                && trimmed.chars().any(char::is_alphanumeric)
            {
                column.compact_alnum += 1;
            }
        }
    }

    let cost = stats
        .iter()
        .enumerate()
        .filter(|(_, s)| s.populated > 0 && s.currency_ratio() >= cost_column_min_ratio)
        .max_by(|(ai, a), (bi, b)| {
            a.currency_ratio()
                .total_cmp(&b.currency_ratio())
                .then(ai.cmp(bi))
        })
        .map(|(idx, _)| idx)?;

    let product_id = stats
        .iter()
        .enumerate()
        .filter(|(idx, s)| *idx != cost && s.populated > 0)
        .max_by(|(ai, a), (bi, b)| {
            a.compact_ratio()
                .total_cmp(&b.compact_ratio())
                .then(b.mean_len().total_cmp(&a.mean_len()))
                .then(bi.cmp(ai))
        })
        .map(|(idx, _)| idx)?;

    let description = stats
        .iter()
        .enumerate()
        .filter(|(idx, s)| *idx != cost && *idx != product_id && s.populated > 0)
        .max_by(|(ai, a), (bi, b)| a.mean_len().total_cmp(&b.mean_len()).then(bi.cmp(ai)))
        .map(|(idx, _)| idx)?;

    Some(ColumnRoles {
        product_id,
        description,
        cost,
    })
}

/// Parses raw tables into product records under a vendor profile.
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    options: ExtractionOptions,
    profile: ParserProfile,
}

impl RecordParser {
    /// Parser with the generic vendor profile.
    #[must_use]
    pub fn new(options: ExtractionOptions) -> Self {
        Self {
            options,
            profile: ParserProfile::default(),
        }
    }

    /// Parser with an explicit vendor profile.
    #[must_use]
    pub fn with_profile(options: ExtractionOptions, profile: ParserProfile) -> Self {
        Self {
            options,
            profile,
        }
    }

    /// Parse one table.
    #[must_use]
    pub fn parse_table(&self, table: &RawTable) -> ParsedTable {
        let mut seen = HashSet::new();
        let mut parsed = ParsedTable::default();
        self.parse_into(table, &mut seen, &mut parsed);
        parsed
    }

    /// Parse all of a document's tables, de-duplicating product ids across
    /// them (first occurrence wins, matching document-then-row order).
    #[must_use]
    pub fn parse_tables(&self, tables: &[RawTable]) -> ParsedTable {
        let mut seen = HashSet::new();
        let mut parsed = ParsedTable::default();
        for table in tables {
            self.parse_into(table, &mut seen, &mut parsed);
        }
        parsed
    }

    fn parse_into(&self, table: &RawTable, seen: &mut HashSet<String>, out: &mut ParsedTable) {
        if table.rows.is_empty() {
            return;
        }

        let (roles, data_start) = match match_header(&table.rows) {
            Some(found) => found,
            None => match infer_columns(&table.rows, self.options.cost_column_min_ratio) {
                Some(roles) => (roles, 0),
                None => {
                    // No resolvable column layout: every row is a counted
                    // skip rather than a guessed record.
                    out.rows_skipped += table.rows.len();
                    return;
                }
            },
        };

        for row in &table.rows[data_start..] {
            match self.parse_row(row, roles) {
                Some(record) => {
                    if seen.insert(record.product_id.clone()) {
                        out.records.push(record);
                    } else {
                        log::debug!("duplicate product id {}, keeping first", record.product_id);
                    }
                }
                None => out.rows_skipped += 1,
            }
        }
    }

    fn parse_row(&self, row: &[String], roles: ColumnRoles) -> Option<ProductRecord> {
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("").trim();

        let product_id = cell(roles.product_id);
        let description = cell(roles.description);
        let cost_cell = cell(roles.cost);
        if product_id.is_empty() || description.is_empty() {
            return None;
        }

        if self.profile.requires_currency_symbol && !cost_cell.contains(['$', '€', '£']) {
            return None;
        }
        let cost = parse_money(cost_cell)?;
        if cost > self.options.max_cost {
            log::debug!("cost {cost} above ceiling, dropping row");
            return None;
        }

        if !self.profile.valid_product_id(product_id) || !self.profile.valid_description(description)
        {
            return None;
        }

        Some(ProductRecord::new(product_id, description, cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricelist_core::Provenance;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            rows.iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
            Provenance::TextLayer,
            0,
        )
    }

    fn parser() -> RecordParser {
        RecordParser::new(ExtractionOptions::default())
    }

    #[test]
    fn header_row_round_trip() {
        let parsed = parser().parse_table(&table(&[
            &["SKU", "Description", "Price"],
            &["A100", "Widget", "$12.50"],
        ]));

        assert_eq!(parsed.rows_skipped, 0);
        assert_eq!(
            parsed.records,
            vec![ProductRecord::new("A100", "Widget", 12.50)]
        );
    }

    #[test]
    fn header_matching_is_case_insensitive_and_order_free() {
        let parsed = parser().parse_table(&table(&[
            &["PRICE", "ITEM #", "NAME"],
            &["$3.10", "778", "Lamb Shank"],
        ]));

        assert_eq!(
            parsed.records,
            vec![ProductRecord::new("778", "Lamb Shank", 3.10)]
        );
    }

    #[test]
    fn two_matched_roles_infer_the_third() {
        // "Product" reads as a description header; only SKU and Price match
        // cleanly, the remaining column gets the leftover role.
        let parsed = parser().parse_table(&table(&[
            &["SKU", "Origin", "Price"],
            &["A100", "Coastal Farm", "$2.20"],
        ]));

        assert_eq!(
            parsed.records,
            vec![ProductRecord::new("A100", "Coastal Farm", 2.20)]
        );
    }

    #[test]
    fn headerless_tables_fall_back_to_positional_inference() {
        let parsed = parser().parse_table(&table(&[
            &["A100", "Pork Shoulder", "$4.15"],
            &["A200", "Beef Brisket", "$6.75"],
        ]));

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].product_id, "A100");
        assert_eq!(parsed.records[1].cost, 6.75);
    }

    #[test]
    fn positional_inference_prefers_the_rightmost_currency_column() {
        // Bare numeric ids look like currency too; on a ratio tie the cost
        // must land on the rightmost column.
        let roles = infer_columns(
            &[
                vec!["123456".into(), "Pork Shoulder".into(), "4.15".into()],
                vec!["4401".into(), "Beef Brisket".into(), "6.75".into()],
            ],
            0.5,
        )
        .unwrap();
        assert_eq!(roles.cost, 2);
        assert_eq!(roles.product_id, 0);
        assert_eq!(roles.description, 1);
    }

    #[test]
    fn unparseable_cost_is_a_counted_skip() {
        let parsed = parser().parse_table(&table(&[
            &["SKU", "Description", "Price"],
            &["A100", "Widget", "N/A"],
            &["A200", "Gadget", "$7.25"],
        ]));

        assert_eq!(parsed.rows_skipped, 1);
        assert_eq!(
            parsed.records,
            vec![ProductRecord::new("A200", "Gadget", 7.25)]
        );
    }

    #[test]
    fn empty_id_or_description_is_a_counted_skip() {
        let parsed = parser().parse_table(&table(&[
            &["SKU", "Description", "Price"],
            &["", "Widget", "$1.00"],
            &["A200", "   ", "$2.00"],
            &["A300", "Gasket", "$3.00"],
        ]));

        assert_eq!(parsed.rows_skipped, 2);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].product_id, "A300");
    }

    #[test]
    fn costs_above_the_ceiling_are_dropped() {
        let parsed = parser().parse_table(&table(&[
            &["SKU", "Description", "Price"],
            &["A100", "Widget", "$1250.00"],
        ]));

        assert_eq!(parsed.rows_skipped, 1);
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn duplicate_ids_keep_the_first_record_across_tables() {
        let first = table(&[
            &["SKU", "Description", "Price"],
            &["A100", "Widget", "$1.00"],
        ]);
        let second = table(&[
            &["SKU", "Description", "Price"],
            &["A100", "Widget again", "$9.99"],
            &["A200", "Gadget", "$2.00"],
        ]);

        let parsed = parser().parse_tables(&[first, second]);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].cost, 1.00);
    }

    #[test]
    fn ragged_rows_are_padded_not_panicked() {
        let parsed = parser().parse_table(&table(&[
            &["SKU", "Description", "Price"],
            &["A100", "Widget"],
            &["A200", "Gadget", "$2.00"],
        ]));

        assert_eq!(parsed.rows_skipped, 1);
        assert_eq!(parsed.records.len(), 1);
    }

    #[test]
    fn unresolvable_layout_skips_every_row() {
        let parsed = parser().parse_table(&table(&[
            &["Widget", "Gadget"],
            &["Trinket", "Bauble"],
        ]));

        assert!(parsed.records.is_empty());
        assert_eq!(parsed.rows_skipped, 2);
    }

    #[test]
    fn profile_rules_apply_per_row() {
        let profile = ParserProfile {
            id_policy: IdPolicy::Numeric { max_len: 6 },
            requires_currency_symbol: true,
            ..ParserProfile::default()
        };
        let parser = RecordParser::with_profile(ExtractionOptions::default(), profile);

        let parsed = parser.parse_table(&table(&[
            &["SKU", "Description", "Price"],
            &["123456", "Chuck Roll", "$5.10"],
            &["A-99", "Flank Steak", "$6.20"],
            &["2231", "Skirt Steak", "7.40"],
        ]));

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].product_id, "123456");
        assert_eq!(parsed.rows_skipped, 2);
    }

    #[test]
    fn parsing_is_idempotent() {
        let input = table(&[
            &["SKU", "Description", "Price"],
            &["A100", "Widget", "$12.50"],
            &["A200", "Gadget", "N/A"],
        ]);
        assert_eq!(parser().parse_table(&input), parser().parse_table(&input));
    }
}
