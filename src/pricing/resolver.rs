use crate::pricing::client::MeterPriceSource;
use crate::pricing::models::{InputRow, PriceRecord, ResolvedRow};
use crate::pricing::normalize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Progress event emitted after each processed row.
/// `index` is the 1-based count of completed rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.index as f64 / self.total as f64 * 100.0
        }
    }
}

/// Drives lookup and normalization over a batch of input rows.
///
/// Lookups are memoized per meter id for the lifetime of the resolver,
/// negative results included, so a meter id appearing in many rows costs
/// at most one round of region queries. A configurable pause after each
/// row throttles the outbound request rate.
pub struct BatchResolver<S> {
    source: S,
    regions: Vec<String>,
    row_delay: Duration,
    cache: HashMap<String, Option<PriceRecord>>,
}

impl<S: MeterPriceSource> BatchResolver<S> {
    pub fn new(source: S, regions: Vec<String>, row_delay: Duration) -> Self {
        Self {
            source,
            regions,
            row_delay,
            cache: HashMap::new(),
        }
    }

    /// Resolve every input row, in order, into exactly one `ResolvedRow`.
    ///
    /// A meter that no region can price yields a row with all computed
    /// fields `None`; it never fails the batch. `on_progress` fires once
    /// per row with a monotonically increasing count.
    pub async fn resolve(
        &mut self,
        rows: &[InputRow],
        mut on_progress: impl FnMut(Progress),
    ) -> Vec<ResolvedRow> {
        let total = rows.len();
        let mut resolved = Vec::with_capacity(total);

        for (i, row) in rows.iter().enumerate() {
            let meter_id = row.meter_id.trim();

            let record = match self.cache.get(meter_id) {
                Some(cached) => {
                    debug!(meter_id = %meter_id, "cache hit");
                    cached.clone()
                }
                None => {
                    let looked_up = self.source.lookup(meter_id, &self.regions).await;
                    self.cache.insert(meter_id.to_string(), looked_up.clone());
                    looked_up
                }
            };

            match record {
                Some(record) => {
                    let unit_cost = normalize::normalize(record.unit_price, &record.sku_name);
                    let final_cost = unit_cost * row.quantity;

                    resolved.push(ResolvedRow {
                        meter_id: meter_id.to_string(),
                        quantity: row.quantity,
                        unit_cost: Some(round_to(unit_cost, 6)),
                        final_cost: Some(round_to(final_cost, 4)),
                        sku_name: Some(record.sku_name),
                        service_name: Some(record.service_name),
                        region: Some(record.arm_region_name),
                        currency: Some(record.currency_code),
                    });
                }
                None => {
                    warn!(meter_id = %meter_id, "no price found in any region");
                    resolved.push(ResolvedRow::missing(meter_id, row.quantity));
                }
            }

            on_progress(Progress {
                index: i + 1,
                total,
            });

            if !self.row_delay.is_zero() {
                tokio::time::sleep(self.row_delay).await;
            }
        }

        resolved
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub price source answering from a fixed table, counting lookups
    struct StubSource {
        prices: HashMap<String, PriceRecord>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(prices: Vec<(&str, PriceRecord)>) -> Self {
            Self {
                prices: prices
                    .into_iter()
                    .map(|(id, record)| (id.to_string(), record))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MeterPriceSource for StubSource {
        async fn lookup(&self, meter_id: &str, _regions: &[String]) -> Option<PriceRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prices.get(meter_id).cloned()
        }
    }

    fn storage_record(unit_price: f64) -> PriceRecord {
        PriceRecord {
            unit_price,
            sku_name: "Per GB".to_string(),
            service_name: "Storage".to_string(),
            arm_region_name: "brazilsouth".to_string(),
            currency_code: "USD".to_string(),
        }
    }

    fn regions() -> Vec<String> {
        vec!["brazilsouth".to_string(), "eastus2".to_string()]
    }

    fn rows(entries: &[(&str, f64)]) -> Vec<InputRow> {
        entries
            .iter()
            .map(|(id, qty)| InputRow {
                meter_id: id.to_string(),
                quantity: *qty,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_one_output_row_per_input_row_in_order() {
        let source = StubSource::new(vec![("meterA", storage_record(2.0))]);
        let mut resolver = BatchResolver::new(source, regions(), Duration::ZERO);

        let input = rows(&[("meterA", 1.0), ("meterB", 2.0), ("meterA", 3.0)]);
        let resolved = resolver.resolve(&input, |_| {}).await;

        assert_eq!(resolved.len(), input.len());
        assert_eq!(resolved[0].meter_id, "meterA");
        assert_eq!(resolved[1].meter_id, "meterB");
        assert_eq!(resolved[2].meter_id, "meterA");
    }

    #[tokio::test]
    async fn test_lookup_memoized_per_distinct_meter() {
        let source = StubSource::new(vec![("meterA", storage_record(2.0))]);
        let mut resolver = BatchResolver::new(source, regions(), Duration::ZERO);

        let input = rows(&[
            ("meterA", 1.0),
            ("meterA", 2.0),
            ("meterA", 3.0),
            ("meterB", 1.0),
            ("meterB", 2.0),
        ]);
        resolver.resolve(&input, |_| {}).await;

        // one lookup per distinct meter id, negative result included
        assert_eq!(resolver.source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_meter_id_trimmed_before_cache_and_lookup() {
        let source = StubSource::new(vec![("meterA", storage_record(2.0))]);
        let mut resolver = BatchResolver::new(source, regions(), Duration::ZERO);

        let input = rows(&[("  meterA  ", 1.0), ("meterA", 2.0)]);
        let resolved = resolver.resolve(&input, |_| {}).await;

        assert_eq!(resolver.source.call_count(), 1);
        assert_eq!(resolved[0].final_cost, Some(2.0));
        assert_eq!(resolved[1].final_cost, Some(4.0));
    }

    #[tokio::test]
    async fn test_unpriced_meter_yields_null_fields_without_halting() {
        let source = StubSource::new(vec![]);
        let mut resolver = BatchResolver::new(source, regions(), Duration::ZERO);

        let input = rows(&[("unknown", 5.0), ("unknown2", 1.0)]);
        let resolved = resolver.resolve(&input, |_| {}).await;

        assert_eq!(resolved.len(), 2);
        for row in &resolved {
            assert_eq!(row.unit_cost, None);
            assert_eq!(row.final_cost, None);
            assert_eq!(row.sku_name, None);
            assert_eq!(row.service_name, None);
            assert_eq!(row.region, None);
            assert_eq!(row.currency, None);
        }
    }

    #[tokio::test]
    async fn test_end_to_end_batch_scenario() {
        let source = StubSource::new(vec![("meterA", storage_record(2.0))]);
        let mut resolver = BatchResolver::new(source, regions(), Duration::ZERO);

        let input = rows(&[("meterA", 10.0), ("meterA", 5.0), ("meterB", 1.0)]);
        let resolved = resolver.resolve(&input, |_| {}).await;

        assert_eq!(resolved[0].final_cost, Some(20.0));
        assert_eq!(resolved[0].unit_cost, Some(2.0));
        assert_eq!(resolved[0].sku_name.as_deref(), Some("Per GB"));
        assert_eq!(resolved[0].service_name.as_deref(), Some("Storage"));
        assert_eq!(resolved[0].region.as_deref(), Some("brazilsouth"));
        assert_eq!(resolved[0].currency.as_deref(), Some("USD"));

        assert_eq!(resolved[1].final_cost, Some(10.0));
        assert_eq!(resolved[2].final_cost, None);

        assert_eq!(resolver.source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_normalized_price_feeds_final_cost() {
        let record = PriceRecord {
            unit_price: 5.0,
            sku_name: "per 10K Transactions".to_string(),
            service_name: "Blob Operations".to_string(),
            arm_region_name: "eastus2".to_string(),
            currency_code: "USD".to_string(),
        };
        let source = StubSource::new(vec![("meterT", record)]);
        let mut resolver = BatchResolver::new(source, regions(), Duration::ZERO);

        let resolved = resolver.resolve(&rows(&[("meterT", 20_000.0)]), |_| {}).await;

        assert_eq!(resolved[0].unit_cost, Some(0.0005));
        assert_eq!(resolved[0].final_cost, Some(10.0));
    }

    #[tokio::test]
    async fn test_rounding_of_recorded_values() {
        let record = PriceRecord {
            unit_price: 1.0,
            sku_name: "1 TB Block".to_string(),
            service_name: "Storage".to_string(),
            arm_region_name: "eastus2".to_string(),
            currency_code: "USD".to_string(),
        };
        let source = StubSource::new(vec![("meterR", record)]);
        let mut resolver = BatchResolver::new(source, regions(), Duration::ZERO);

        let resolved = resolver.resolve(&rows(&[("meterR", 3.0)]), |_| {}).await;

        // 1/1024 = 0.0009765625 -> 0.000977 at 6 places;
        // final cost rounds the unrounded product: 3/1024 -> 0.0029
        assert_eq!(resolved[0].unit_cost, Some(0.000977));
        assert_eq!(resolved[0].final_cost, Some(0.0029));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_complete() {
        let source = StubSource::new(vec![("meterA", storage_record(2.0))]);
        let mut resolver = BatchResolver::new(source, regions(), Duration::ZERO);

        let input = rows(&[("meterA", 1.0), ("meterB", 2.0), ("meterA", 3.0)]);
        let mut events = Vec::new();
        resolver.resolve(&input, |p| events.push(p)).await;

        assert_eq!(events.len(), 3);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.index, i + 1);
            assert_eq!(event.total, 3);
        }
        let full: Vec<_> = events.iter().filter(|p| p.percent() >= 100.0).collect();
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].index, 3);
    }

    #[tokio::test]
    async fn test_empty_batch_emits_no_progress() {
        let source = StubSource::new(vec![]);
        let mut resolver = BatchResolver::new(source, regions(), Duration::ZERO);

        let mut events = Vec::new();
        let resolved = resolver.resolve(&[], |p| events.push(p)).await;

        assert!(resolved.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.0009765625, 6), 0.000977);
        assert_eq!(round_to(1.23456789, 4), 1.2346);
        assert_eq!(round_to(2.0, 6), 2.0);
    }
}
