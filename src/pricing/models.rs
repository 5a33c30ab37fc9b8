use serde::{Deserialize, Serialize};

/// Price information for a single billing meter, as resolved from the
/// retail catalog for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub unit_price: f64,
    pub sku_name: String,
    pub service_name: String,
    pub arm_region_name: String,
    pub currency_code: String,
}

/// One input line: a meter id and the quantity to price
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    pub meter_id: String,
    pub quantity: f64,
}

/// An input row plus its computed columns. All computed fields are `None`
/// when no region yielded a price for the meter.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    pub meter_id: String,
    pub quantity: f64,
    pub unit_cost: Option<f64>,
    pub final_cost: Option<f64>,
    pub sku_name: Option<String>,
    pub service_name: Option<String>,
    pub region: Option<String>,
    pub currency: Option<String>,
}

impl ResolvedRow {
    /// Row whose meter could not be priced in any region
    pub fn missing(meter_id: impl Into<String>, quantity: f64) -> Self {
        Self {
            meter_id: meter_id.into(),
            quantity,
            unit_cost: None,
            final_cost: None,
            sku_name: None,
            service_name: None,
            region: None,
            currency: None,
        }
    }
}

/// Response body of the retail prices endpoint
#[derive(Debug, Deserialize)]
pub struct RetailPriceResponse {
    #[serde(rename = "Items", default)]
    pub items: Vec<RetailPriceItem>,
}

/// Individual catalog entry. Fields the upstream omits fall back to
/// zero/empty, currency to USD.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailPriceItem {
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub sku_name: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub arm_region_name: String,
    #[serde(default = "default_currency")]
    pub currency_code: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl From<RetailPriceItem> for PriceRecord {
    fn from(item: RetailPriceItem) -> Self {
        Self {
            unit_price: item.unit_price,
            sku_name: item.sku_name,
            service_name: item.service_name,
            arm_region_name: item.arm_region_name,
            currency_code: item.currency_code,
        }
    }
}
