//! Ledger domain models.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::Error;
use crate::utils::time_utils::{month_bounds, year_bounds};

/// Expense category of a ledger entry.
///
/// Ordered so that summaries iterate in a stable, human-friendly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Maintenance,
    Repair,
    Upgrade,
    Fuel,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Maintenance,
        Category::Repair,
        Category::Upgrade,
        Category::Fuel,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Maintenance => "maintenance",
            Category::Repair => "repair",
            Category::Upgrade => "upgrade",
            Category::Fuel => "fuel",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record source a ledger entry was derived from.
///
/// Declaration order is the concatenation order used by aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Cost,
    Maintenance,
    Repair,
    Upgrade,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Cost => "cost",
            SourceKind::Maintenance => "maintenance",
            SourceKind::Repair => "repair",
            SourceKind::Upgrade => "upgrade",
        }
    }

    /// Category assigned to every entry of a derived source.
    ///
    /// Returns `None` for direct costs, which carry their own category.
    pub fn fixed_category(&self) -> Option<Category> {
        match self {
            SourceKind::Cost => None,
            SourceKind::Maintenance => Some(Category::Maintenance),
            SourceKind::Repair => Some(Category::Repair),
            SourceKind::Upgrade => Some(Category::Upgrade),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized, read-only row of the merged cost view.
///
/// `id` is only unique together with `source`; use [`LedgerEntry::key`]
/// when keying entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub category: Category,
    pub equipment_id: String,
    pub source: SourceKind,
}

impl LedgerEntry {
    /// Identity of the entry across all sources.
    pub fn key(&self) -> (SourceKind, &str) {
        (self.source, self.id.as_str())
    }
}

/// Ordering of the ledger by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Inclusive calendar range. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Reporting period offered by the cost screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The calendar month containing today.
    #[default]
    Monthly,
    /// The calendar year containing today.
    Yearly,
    /// No date restriction.
    All,
}

impl Period {
    /// Resolves the period against `today`. `All` has no range.
    pub fn date_range(&self, today: NaiveDate) -> Option<DateRange> {
        match self {
            Period::Monthly => {
                let (from, to) = month_bounds(today);
                Some(DateRange::between(from, to))
            }
            Period::Yearly => {
                let (from, to) = year_bounds(today);
                Some(DateRange::between(from, to))
            }
            Period::All => None,
        }
    }
}

/// Predicates applied by [`crate::ledger::filter`]. Omitted predicates match everything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerFilter {
    pub category: Option<Category>,
    pub equipment_id: Option<String>,
    pub date_range: Option<DateRange>,
}

impl LedgerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_equipment(mut self, equipment_id: impl Into<String>) -> Self {
        self.equipment_id = Some(equipment_id.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Restricts the filter to `period` as seen from `today`.
    pub fn with_period(mut self, period: Period, today: NaiveDate) -> Self {
        self.date_range = period.date_range(today);
        self
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        self.category.map_or(true, |c| entry.category == c)
            && self
                .equipment_id
                .as_deref()
                .map_or(true, |id| entry.equipment_id == id)
            && self.date_range.map_or(true, |r| r.contains(entry.date))
    }
}

/// Totals over a ledger slice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub total: Decimal,
    /// Only categories that occur in the input are present.
    pub by_category: BTreeMap<Category, Decimal>,
}

impl CostSummary {
    /// Subtotal for `category`, zero when absent.
    pub fn category_total(&self, category: Category) -> Decimal {
        self.by_category
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Copy with every amount rounded to display precision.
    pub fn rounded(&self) -> CostSummary {
        CostSummary {
            total: self.total.round_dp(DISPLAY_DECIMAL_PRECISION),
            by_category: self
                .by_category
                .iter()
                .map(|(category, amount)| (*category, amount.round_dp(DISPLAY_DECIMAL_PRECISION)))
                .collect(),
        }
    }
}

/// Per-equipment totals shown on equipment cards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentCostSummary {
    pub equipment_id: String,
    pub total: Decimal,
    pub entry_count: usize,
    pub maintenance_count: usize,
}

/// What the aggregator currently serves to presentation code.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    /// Last successfully aggregated ledger, date descending.
    pub entries: Arc<Vec<LedgerEntry>>,
    /// Error of the most recent refresh, cleared by the next successful one.
    pub last_error: Option<Error>,
    /// When `entries` was last rebuilt.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Incremented every time `entries` is replaced.
    pub revision: u64,
}

impl LedgerState {
    /// True when the ledger is being served from before a failed refresh.
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}
