//! Sample source: reader + price feed under explicit deadlines

use std::time::Duration;

use async_trait::async_trait;
use rigtune_common::{Sample, SourceComponent, SourceError};
use tracing::{debug, info, instrument};

use crate::{PriceFeed, SourceSettings, TelemetryReader};

/// Produces one complete sample per call, or nothing
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn sample(&mut self) -> Result<Sample, SourceError>;
}

/// Sample source backed by a rig reader and a price feed
pub struct RigSampleSource {
    reader: Box<dyn TelemetryReader>,
    price_feed: Box<dyn PriceFeed>,
    asset: String,
    currency: String,
    telemetry_timeout: Duration,
    price_timeout: Duration,
}

impl RigSampleSource {
    pub fn new(
        reader: Box<dyn TelemetryReader>,
        price_feed: Box<dyn PriceFeed>,
        settings: &SourceSettings,
    ) -> Self {
        Self {
            reader,
            price_feed,
            asset: settings.asset.clone(),
            currency: settings.currency.clone(),
            telemetry_timeout: Duration::from_millis(settings.telemetry_timeout_ms),
            price_timeout: Duration::from_millis(settings.price_timeout_ms),
        }
    }
}

#[async_trait]
impl SampleSource for RigSampleSource {
    #[instrument(skip(self), fields(asset = %self.asset))]
    async fn sample(&mut self) -> Result<Sample, SourceError> {
        let reading = tokio::time::timeout(self.telemetry_timeout, self.reader.read())
            .await
            .map_err(|_| {
                SourceError::timeout(
                    SourceComponent::Telemetry,
                    self.telemetry_timeout.as_millis() as u64,
                )
            })??;
        reading.validate()?;

        let price = tokio::time::timeout(
            self.price_timeout,
            self.price_feed.price(&self.asset, &self.currency),
        )
        .await
        .map_err(|_| {
            SourceError::timeout(SourceComponent::Price, self.price_timeout.as_millis() as u64)
        })??;
        if !(price.is_finite() && price > 0.0) {
            return Err(SourceError::price(format!("malformed quote: {}", price)));
        }

        let sample = Sample::new(
            reading.hashrate,
            reading.power_usage,
            reading.temperature,
            reading.accepted_shares,
            reading.rejected_shares,
            price,
        )
        .with_local_blocks(reading.local_block_count);

        info!(
            timestamp = %sample.timestamp,
            hashrate_mhs = %format!("{:.2}", sample.hashrate),
            power_w = %format!("{:.2}", sample.power_usage),
            temp_c = %format!("{:.2}", sample.temperature),
            profitability_btc_day = %format!("{:.6}", sample.profitability),
            "Gathered new sample"
        );
        debug!(
            accepted = sample.accepted_shares,
            rejected = sample.rejected_shares,
            blocks = sample.local_block_count,
            price = sample.price,
            "Share counts"
        );

        Ok(sample)
    }
}
