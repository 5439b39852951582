//! Strategy selection with an explicit sufficiency test.
//!
//! Strategies are tried in registration order; the first one whose output
//! passes the sufficiency test wins. OCR is registered after the text layer
//! because rasterization plus recognition costs orders of magnitude more
//! than reading embedded text, so it must only run when the cheap path
//! comes back empty-handed.

use pricelist_core::money::is_currency_token;
use pricelist_core::{ExtractError, ExtractionOptions, Provenance, RawTable, Result};

/// One table-extraction strategy.
pub trait TableStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Provenance tag this strategy stamps on its tables.
    fn provenance(&self) -> Provenance;

    /// Produce zero or more candidate tables from PDF bytes. An empty
    /// vector is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// [`ExtractError::CorruptDocument`] when the bytes cannot be opened,
    /// [`ExtractError::CapabilityUnavailable`] when a required collaborator
    /// is missing.
    fn extract_tables(&self, bytes: &[u8]) -> Result<Vec<RawTable>>;
}

/// Ordered strategy list sharing one acceptance test.
pub struct StrategySelector {
    strategies: Vec<Box<dyn TableStrategy>>,
    options: ExtractionOptions,
}

impl StrategySelector {
    /// Create a selector trying `strategies` in order.
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn TableStrategy>>, options: ExtractionOptions) -> Self {
        Self {
            strategies,
            options,
        }
    }

    /// Extract the document's tables with the cheapest sufficient strategy.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::CapabilityUnavailable`] as soon as any strategy
    ///   reports it; the batch cannot proceed without the capability.
    /// - [`ExtractError::CorruptDocument`] when no strategy could open the
    ///   bytes at all.
    /// - [`ExtractError::NoExtractableTable`] when strategies ran but none
    ///   produced a table passing the sufficiency test.
    pub fn select(&self, bytes: &[u8]) -> Result<Vec<RawTable>> {
        let mut any_ran = false;
        let mut corrupt_message: Option<String> = None;

        for strategy in &self.strategies {
            match strategy.extract_tables(bytes) {
                Ok(tables) => {
                    any_ran = true;
                    let total = tables.len();
                    let sufficient: Vec<RawTable> = tables
                        .into_iter()
                        .filter(|t| table_is_sufficient(t, &self.options))
                        .collect();
                    if sufficient.is_empty() {
                        log::debug!(
                            "{}: {total} candidate table(s), none sufficient; falling back",
                            strategy.name()
                        );
                    } else {
                        log::debug!(
                            "{}: accepted {} of {total} candidate table(s)",
                            strategy.name(),
                            sufficient.len()
                        );
                        return Ok(sufficient);
                    }
                }
                Err(err @ ExtractError::CapabilityUnavailable(_)) => return Err(err),
                Err(ExtractError::CorruptDocument(message)) => {
                    log::debug!("{}: cannot open document: {message}", strategy.name());
                    corrupt_message.get_or_insert(message);
                }
                Err(_) => {
                    any_ran = true;
                }
            }
        }

        if any_ran {
            Err(ExtractError::NoExtractableTable)
        } else {
            Err(ExtractError::CorruptDocument(corrupt_message.unwrap_or_else(
                || "no strategy could open the document".to_string(),
            )))
        }
    }
}

/// Sufficiency test: the table is big enough and some column plausibly
/// holds costs.
#[must_use]
pub fn table_is_sufficient(table: &RawTable, options: &ExtractionOptions) -> bool {
    table.rows.len() >= options.min_table_rows
        && table.column_count() >= options.min_table_cols
        && plausible_cost_column(table, options.cost_column_min_ratio).is_some()
}

/// Index of the column whose populated data cells most consistently look
/// like currency, provided that ratio clears `min_ratio`. The first row is
/// excluded since it is usually a header. Ties go to the rightmost column,
/// where price lists conventionally put the cost.
#[must_use]
pub fn plausible_cost_column(table: &RawTable, min_ratio: f64) -> Option<usize> {
    let columns = table.column_count();
    let mut best: Option<(usize, f64)> = None;

    for column in 0..columns {
        let mut populated = 0usize;
        let mut currency = 0usize;
        for row in table.rows.iter().skip(1) {
            let Some(cell) = row.get(column) else {
                continue;
            };
            if cell.trim().is_empty() {
                continue;
            }
            populated += 1;
            if is_currency_token(cell) {
                currency += 1;
            }
        }
        if populated == 0 || currency == 0 {
            continue;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = currency as f64 / populated as f64;
        if ratio >= min_ratio && best.map_or(true, |(_, best_ratio)| ratio >= best_ratio) {
            best = Some((column, ratio));
        }
    }

    best.map(|(column, _)| column)
}
