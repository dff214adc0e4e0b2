//! Token recovery after a 401
//!
//! One recovery per failed call: read the refresh token, exchange it, persist
//! the new pair. When single-flight is enabled, recoveries are serialized and
//! a caller that finds the tokens already rotated by someone else reuses them
//! instead of calling the endpoint again.

use tokio::sync::Mutex;
use tracing::{debug, info};

use crm_auth::{Session, TokenRefresher};

use crate::metrics::{self as client_metrics, outcome};

/// Why a recovery did not produce usable tokens.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RecoveryFailure {
    #[error("no refresh token stored")]
    NoRefreshToken,

    #[error("session storage failed during recovery: {0}")]
    Storage(crm_auth::Error),

    #[error("refresh endpoint failed: {0}")]
    Refresh(crm_auth::Error),
}

pub(crate) struct RefreshGate {
    single_flight: Option<Mutex<()>>,
}

impl RefreshGate {
    pub(crate) fn new(single_flight: bool) -> Self {
        Self {
            single_flight: single_flight.then(|| Mutex::new(())),
        }
    }

    /// Make fresh tokens available in `session`.
    ///
    /// `sent_token` is the access token the failed request carried.
    pub(crate) async fn recover(
        &self,
        session: &Session,
        refresher: &dyn TokenRefresher,
        sent_token: Option<&str>,
    ) -> Result<(), RecoveryFailure> {
        let _guard = match &self.single_flight {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let result = self.recover_locked(session, refresher, sent_token).await;
        if result.is_err() {
            let label = match &result {
                Err(RecoveryFailure::NoRefreshToken) => outcome::NO_REFRESH_TOKEN,
                _ => outcome::FAILED,
            };
            client_metrics::record_refresh(label);
        }
        result
    }

    async fn recover_locked(
        &self,
        session: &Session,
        refresher: &dyn TokenRefresher,
        sent_token: Option<&str>,
    ) -> Result<(), RecoveryFailure> {
        if self.single_flight.is_some() {
            let current = session
                .access_token()
                .await
                .map_err(RecoveryFailure::Storage)?;
            if let Some(current) = current {
                if Some(current.as_str()) != sent_token {
                    debug!("tokens already rotated by a concurrent refresh");
                    client_metrics::record_refresh(outcome::SHARED);
                    return Ok(());
                }
            }
        }

        let refresh = session
            .refresh_token()
            .await
            .map_err(RecoveryFailure::Storage)?
            .ok_or(RecoveryFailure::NoRefreshToken)?;

        let pair = refresher
            .refresh(&refresh)
            .await
            .map_err(RecoveryFailure::Refresh)?;

        session
            .set_tokens(&pair)
            .await
            .map_err(RecoveryFailure::Storage)?;

        info!("access token refreshed");
        client_metrics::record_refresh(outcome::SUCCESS);
        Ok(())
    }
}
