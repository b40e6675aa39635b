//! Price Sources
//!
//! A price source is anything that can report the latest price of one asset
//! against the quote currency (an aggregator contract, a DEX TWAP, a static
//! value from configuration). Sources report in their own native precision;
//! [`crate::PriceFeed`] normalizes them.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracrafter_core::Timestamp;

/// Latest reading reported by a price source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceReading {
    /// Raw price as reported, `decimals` digits after the point.
    /// Signed because aggregator answers are signed; non-positive values are rejected.
    pub value: i128,
    pub decimals: u8,
    pub description: String,
    /// When the source last updated. `None` for sources that never go stale.
    pub updated_at: Option<Timestamp>,
}

/// Failure reported by the source itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

/// External price source collaborator
pub trait PriceSource: Send + Sync {
    fn latest_price(&self) -> Result<PriceReading, SourceError>;

    /// Native precision of this source
    fn decimals(&self) -> u8;

    /// Pair description, e.g. "BTC / USD"
    fn description(&self) -> String;
}

/// Source that always reports the same price
#[derive(Debug, Clone)]
pub struct FixedPriceSource {
    value: i128,
    decimals: u8,
    description: String,
}

impl FixedPriceSource {
    pub fn new(value: i128, decimals: u8, description: impl Into<String>) -> Self {
        Self {
            value,
            decimals,
            description: description.into(),
        }
    }
}

impl PriceSource for FixedPriceSource {
    fn latest_price(&self) -> Result<PriceReading, SourceError> {
        Ok(PriceReading {
            value: self.value,
            decimals: self.decimals,
            description: self.description.clone(),
            updated_at: None,
        })
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// Source whose price is pushed by its owner.
///
/// Clones share the same reading, so a handle kept outside the feed can move
/// the price after registration.
#[derive(Debug, Clone)]
pub struct ManualPriceSource {
    reading: Arc<Mutex<PriceReading>>,
}

impl ManualPriceSource {
    pub fn new(
        value: i128,
        decimals: u8,
        description: impl Into<String>,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            reading: Arc::new(Mutex::new(PriceReading {
                value,
                decimals,
                description: description.into(),
                updated_at: Some(updated_at),
            })),
        }
    }

    /// Publish a new price
    pub fn set_price(&self, value: i128, updated_at: Timestamp) {
        let mut reading = self.reading.lock().unwrap_or_else(PoisonError::into_inner);
        reading.value = value;
        reading.updated_at = Some(updated_at);
    }

    fn snapshot(&self) -> PriceReading {
        self.reading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PriceSource for ManualPriceSource {
    fn latest_price(&self) -> Result<PriceReading, SourceError> {
        Ok(self.snapshot())
    }

    fn decimals(&self) -> u8 {
        self.snapshot().decimals
    }

    fn description(&self) -> String {
        self.snapshot().description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_source_never_stale() {
        let source = FixedPriceSource::new(99_945_970, 8, "USDC / USD");
        let reading = source.latest_price().unwrap();
        assert_eq!(reading.value, 99_945_970);
        assert_eq!(reading.updated_at, None);
        assert_eq!(source.decimals(), 8);
        assert_eq!(source.description(), "USDC / USD");
    }

    #[test]
    fn test_manual_source_clones_share_price() {
        let source = ManualPriceSource::new(9_000_000_000_000, 8, "BTC / USD", 100);
        let handle = source.clone();
        handle.set_price(4_500_000_000_000, 200);

        let reading = source.latest_price().unwrap();
        assert_eq!(reading.value, 4_500_000_000_000);
        assert_eq!(reading.updated_at, Some(200));
    }
}
