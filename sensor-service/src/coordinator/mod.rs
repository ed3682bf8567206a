use std::{future::Future, time::Duration};

use portal_client::{AccountInfo, PortalClient, UsageSnapshot};
use serde::Serialize;
use time::OffsetDateTime;
use tokio::time::MissedTickBehavior;

use crate::sensors::{self, SensorBoard};

/// The portal operations the coordinator drives.
///
/// None of these fail: the client reports problems as `false`/`None` and the
/// coordinator turns those into [`UpdateFailed`].
#[async_trait::async_trait]
pub trait PortalApi: Send {
    async fn login(&mut self) -> bool;
    async fn get_account_info(&mut self) -> Option<AccountInfo>;
    async fn get_usage_data(&mut self) -> Option<UsageSnapshot>;
    fn cached_account_info(&self) -> Option<AccountInfo>;
    async fn close(&mut self);
}

#[async_trait::async_trait]
impl PortalApi for PortalClient {
    async fn login(&mut self) -> bool {
        PortalClient::login(self).await
    }

    async fn get_account_info(&mut self) -> Option<AccountInfo> {
        PortalClient::get_account_info(self).await
    }

    async fn get_usage_data(&mut self) -> Option<UsageSnapshot> {
        PortalClient::get_usage_data(self).await
    }

    fn cached_account_info(&self) -> Option<AccountInfo> {
        self.account_info().cloned()
    }

    async fn close(&mut self) {
        PortalClient::close(self);
    }
}

/// Result of one successful refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorData {
    pub account_info: AccountInfo,
    pub usage_data: UsageSnapshot,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    #[error("failed to log in to the water portal")]
    Login,
    #[error("failed to get account information")]
    AccountInfo,
    #[error("failed to get usage data from the account summary page")]
    UsageData,
}

/// A refresh cycle that produced no data.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("error communicating with the water portal: {cause}")]
pub struct UpdateFailed {
    #[source]
    pub cause: FailureCause,
}

impl From<FailureCause> for UpdateFailed {
    fn from(cause: FailureCause) -> Self {
        Self { cause }
    }
}

/// Polls the portal on a fixed interval and publishes sensor states.
///
/// One refresh runs at a time. The last successful data is kept when a later
/// refresh fails; only availability changes.
pub struct Coordinator<A> {
    api: A,
    update_interval: Duration,
    data: Option<CoordinatorData>,
    last_update_success: bool,
    board: SensorBoard,
}

impl<A: PortalApi> Coordinator<A> {
    pub fn new(api: A, update_interval: Duration, board: SensorBoard) -> Self {
        Self {
            api,
            update_interval,
            data: None,
            last_update_success: false,
            board,
        }
    }

    pub fn data(&self) -> Option<&CoordinatorData> {
        self.data.as_ref()
    }

    pub fn last_update_success(&self) -> bool {
        self.last_update_success
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch a fresh `{account_info, usage_data}` record.
    ///
    /// Logs in every cycle; account info is fetched only while the client has
    /// none cached.
    pub async fn refresh(&mut self) -> Result<CoordinatorData, UpdateFailed> {
        if !self.api.login().await {
            return Err(FailureCause::Login.into());
        }

        let account_info = match self.api.cached_account_info() {
            Some(info) => info,
            None => self
                .api
                .get_account_info()
                .await
                .ok_or(FailureCause::AccountInfo)?,
        };

        let usage_data = self
            .api
            .get_usage_data()
            .await
            .ok_or(FailureCause::UsageData)?;

        Ok(CoordinatorData {
            account_info,
            usage_data,
        })
    }

    /// Run one refresh, record the outcome and publish sensor states.
    pub async fn async_refresh(&mut self) -> Result<(), UpdateFailed> {
        metrics::counter!("portal_refresh_total").increment(1);

        let result = self.refresh().await;
        match &result {
            Ok(data) => {
                record_usage_metrics(data);
                tracing::info!(
                    account = %data.account_info.account_number,
                    current_usage = data.usage_data.current_usage,
                    daily_usage = data.usage_data.daily_usage,
                    readings = data.usage_data.raw_data.len(),
                    "water usage refreshed"
                );
                self.data = Some(data.clone());
                self.last_update_success = true;
            }
            Err(e) => {
                metrics::counter!("portal_refresh_failed_total").increment(1);
                tracing::warn!(error = %e, "water usage refresh failed");
                self.last_update_success = false;
            }
        }

        let states = sensors::sensor_states(
            self.data.as_ref(),
            self.last_update_success,
            OffsetDateTime::now_utc(),
        );
        self.board.publish(states).await;

        result.map(|_| ())
    }

    /// Refresh on every tick until `shutdown` resolves, then close the
    /// session. The first refresh happens immediately.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    // Failures are logged and reflected in sensor availability.
                    let _ = self.async_refresh().await;
                }
            }
        }

        self.shutdown().await;
    }

    pub async fn shutdown(&mut self) {
        self.api.close().await;
        tracing::info!("water portal session closed");
    }
}

fn record_usage_metrics(data: &CoordinatorData) {
    let account = data.account_info.account_number.clone();
    let usage = &data.usage_data;

    metrics::gauge!("water_current_usage_gallons", "account" => account.clone()).set(usage.current_usage);
    metrics::gauge!("water_daily_usage_gallons", "account" => account.clone()).set(usage.daily_usage);
    metrics::gauge!("water_usage_reading_count", "account" => account).set(usage.raw_data.len() as f64);
}
