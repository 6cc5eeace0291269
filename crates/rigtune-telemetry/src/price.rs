//! Spot price feeds

use std::time::Duration;

use async_trait::async_trait;
use rigtune_common::SourceError;
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Source of spot prices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Current price of `asset` in `currency`
    async fn price(&self, asset: &str, currency: &str) -> Result<f64, SourceError>;
}

/// CoinGecko simple-price client
///
/// Queries `<base_url>?ids=<asset>&vs_currencies=<currency>` and expects
/// `{"<asset>": {"<currency>": <price>}}`.
pub struct CoinGeckoPriceFeed {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoPriceFeed {
    /// Create a client whose requests give up after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::price(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoPriceFeed {
    #[instrument(skip(self))]
    async fn price(&self, asset: &str, currency: &str) -> Result<f64, SourceError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("ids", asset), ("vs_currencies", currency)])
            .send()
            .await
            .map_err(|e| {
                warn!("Price request failed: {}", e);
                SourceError::price(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::price(format!("HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::price(format!("malformed response: {}", e)))?;

        let price = parse_simple_price(&body, asset, currency)?;
        debug!(asset, currency, price, "Fetched spot price");
        Ok(price)
    }
}

/// Extract `body[asset][currency]` as a positive price
pub fn parse_simple_price(body: &Value, asset: &str, currency: &str) -> Result<f64, SourceError> {
    let price = body
        .get(asset)
        .and_then(|quotes| quotes.get(currency))
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            SourceError::price(format!("malformed response: no {}/{} quote", asset, currency))
        })?;

    if !(price.is_finite() && price > 0.0) {
        return Err(SourceError::price(format!("malformed response: price {}", price)));
    }
    Ok(price)
}

/// Constant price, for offline runs and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedPriceFeed {
    price: f64,
}

impl FixedPriceFeed {
    pub fn new(price: f64) -> Self {
        Self { price }
    }
}

#[async_trait]
impl PriceFeed for FixedPriceFeed {
    async fn price(&self, _asset: &str, _currency: &str) -> Result<f64, SourceError> {
        Ok(self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigtune_common::SourceComponent;
    use serde_json::json;

    #[test]
    fn test_parse_simple_price() {
        let body = json!({ "bitcoin": { "usd": 64250.5 } });
        let price = parse_simple_price(&body, "bitcoin", "usd").unwrap();
        assert_eq!(price, 64250.5);
    }

    #[test]
    fn test_parse_integer_price() {
        let body = json!({ "bitcoin": { "usd": 64000 } });
        assert_eq!(parse_simple_price(&body, "bitcoin", "usd").unwrap(), 64000.0);
    }

    #[test]
    fn test_parse_missing_currency() {
        let body = json!({ "bitcoin": { "eur": 59000.0 } });
        let err = parse_simple_price(&body, "bitcoin", "usd").unwrap_err();
        assert_eq!(err.component(), SourceComponent::Price);
        assert!(err.to_string().contains("bitcoin/usd"));
    }

    #[test]
    fn test_parse_non_numeric_and_negative() {
        let body = json!({ "bitcoin": { "usd": "64000" } });
        assert!(parse_simple_price(&body, "bitcoin", "usd").is_err());

        let body = json!({ "bitcoin": { "usd": -1.0 } });
        assert!(parse_simple_price(&body, "bitcoin", "usd").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let feed =
            CoinGeckoPriceFeed::new("http://127.0.0.1:9/price", Duration::from_millis(500)).unwrap();
        let err = feed.price("bitcoin", "usd").await.unwrap_err();
        assert_eq!(err.component(), SourceComponent::Price);
    }

    #[tokio::test]
    async fn test_fixed_feed() {
        let feed = FixedPriceFeed::new(42.0);
        assert_eq!(feed.price("anything", "usd").await.unwrap(), 42.0);
    }
}
