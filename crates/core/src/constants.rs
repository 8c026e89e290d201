/// Prefix for client-generated ids of records that are waiting for store confirmation.
pub const DEFAULT_TEMP_ID_PREFIX: &str = "tmp-";

/// Number of entries shown in the "recent expenses" view.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Decimal places used when rounding displayed totals.
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;
