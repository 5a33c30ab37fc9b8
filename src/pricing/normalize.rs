//! Unit-of-measure normalization.
//!
//! The retail catalog prices meters in whatever granularity the service
//! bills in ("per 100 TB", "per 10K transactions", ...). Callers multiply
//! the unit price directly by a raw quantity, so prices are rescaled here
//! to the base unit that quantity is expressed in (GB, hour, transaction,
//! unit). This is a closed rule table over free-text SKU names, not a
//! parser; unknown units pass through unchanged.

/// Rewrite rules, evaluated in order; first match wins.
/// The divisor converts the catalog granularity to the base unit.
const UNIT_RULES: &[(&str, f64)] = &[
    ("100 tb", 102_400.0), // 100 TB = 102400 GB
    ("1 tb", 1_024.0),
    ("per gb", 1.0),
    ("1 gb", 1.0),
    ("per 10k transactions", 10_000.0),
    ("per hour", 1.0),
    ("per 100 units", 100.0),
];

/// Rescale a unit price to a per-base-unit rate based on the SKU name
pub fn normalize(unit_price: f64, sku_name: &str) -> f64 {
    let sku = sku_name.to_lowercase();

    for (needle, divisor) in UNIT_RULES {
        if sku.contains(needle) {
            return unit_price / divisor;
        }
    }

    unit_price
}
