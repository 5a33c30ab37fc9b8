use crate::error::AppError;
use crate::pricing::models::{PriceRecord, RetailPriceResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Source of meter prices. The batch resolver only depends on this trait,
/// so runs can be driven by a stub source in tests.
#[async_trait]
pub trait MeterPriceSource {
    /// Resolve a meter id against an ordered region preference list.
    /// Returns `None` when no region yields a price.
    async fn lookup(&self, meter_id: &str, regions: &[String]) -> Option<PriceRecord>;
}

/// Client for the Azure Retail Prices API
pub struct RetailPriceClient {
    http: Client,
    base_url: String,
}

impl RetailPriceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { http, base_url })
    }

    /// One filtered catalog query for a (meter, region) pair
    async fn query_region(
        &self,
        meter_id: &str,
        region: &str,
    ) -> Result<RetailPriceResponse, AppError> {
        let filter = build_filter(meter_id, region);

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("$filter", filter.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream { status, message });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MeterPriceSource for RetailPriceClient {
    /// Regions are tried in order; the first transport-successful response
    /// with a non-empty `Items` array wins and `Items[0]` is taken as
    /// authoritative, even when several catalog entries are active for the
    /// same meter and region. Transport failures, non-success statuses,
    /// malformed bodies, and empty result sets all count as "no data for
    /// this region" and the next region is tried.
    async fn lookup(&self, meter_id: &str, regions: &[String]) -> Option<PriceRecord> {
        for region in regions {
            match self.query_region(meter_id, region).await {
                Ok(body) => {
                    if let Some(item) = body.items.into_iter().next() {
                        debug!(meter_id = %meter_id, region = %region, "price found");
                        return Some(item.into());
                    }
                    debug!(meter_id = %meter_id, region = %region, "no items for region");
                }
                Err(e) => {
                    debug!(
                        meter_id = %meter_id,
                        region = %region,
                        error = %e,
                        "region query failed, trying next"
                    );
                }
            }
        }

        None
    }
}

/// OData filter for a (meter, region) pair
fn build_filter(meter_id: &str, region: &str) -> String {
    format!(
        "meterId eq '{}' and armRegionName eq '{}'",
        meter_id, region
    )
}
