pub mod client;
pub mod models;
pub mod normalize;
pub mod resolver;

pub use client::{MeterPriceSource, RetailPriceClient};
pub use models::{InputRow, PriceRecord, ResolvedRow};
pub use resolver::{BatchResolver, Progress};
