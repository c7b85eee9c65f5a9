//! RelayClient - media relay control-plane adapter
//!
//! ## Responsibilities
//!
//! - Translate registry intents into relay path-management calls
//! - Basic auth on every request
//! - Map HTTP statuses to relay errors
//!
//! Targets the MediaMTX v3 path-config API: paths are created with
//! `POST /v3/config/paths/add/{name}` (create-or-replace by name) and
//! removed with `DELETE /v3/config/paths/delete/{name}`.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Relay path-management interface
///
/// The registry talks to the relay through this trait so tests can run
/// against a fake without a relay process.
#[async_trait]
pub trait PathManager: Send + Sync {
    /// Create a relay path named `id` sourcing from `source_url`
    async fn register(&self, id: &str, source_url: &str) -> Result<()>;

    /// Delete the relay path named `id`; already-absent is success
    async fn unregister(&self, id: &str) -> Result<()>;
}

/// RelayClient instance
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    pass: String,
}

impl RelayClient {
    /// Create a new RelayClient
    pub fn new(base_url: String, user: String, pass: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::RelayUnreachable(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            user,
            pass,
        })
    }
}

#[async_trait]
impl PathManager for RelayClient {
    async fn register(&self, id: &str, source_url: &str) -> Result<()> {
        let url = format!(
            "{}/v3/config/paths/add/{}",
            self.base_url,
            urlencoding::encode(id)
        );

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.pass))
            .json(&json!({
                "source": source_url,
                "sourceOnDemand": false,
            }))
            .send()
            .await
            .map_err(|e| Error::RelayUnreachable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(id = id, "relay path registered");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::RelayRejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn unregister(&self, id: &str) -> Result<()> {
        let url = format!(
            "{}/v3/config/paths/delete/{}",
            self.base_url,
            urlencoding::encode(id)
        );

        let resp = self
            .client
            .delete(&url)
            .basic_auth(&self.user, Some(&self.pass))
            .send()
            .await
            .map_err(|e| Error::RelayUnreachable(e.to_string()))?;

        let status = resp.status();
        // 404 means the path is already gone, which is the end state we want
        if status.is_success() || status.as_u16() == 404 {
            tracing::debug!(id = id, status = %status, "relay path deleted");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::RelayRejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Counting/failing fake relay for registry and handler tests

    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Fake PathManager with call counters and switchable failures
    #[derive(Default)]
    pub struct FakeRelay {
        pub register_calls: AtomicUsize,
        pub unregister_calls: AtomicUsize,
        pub fail_register: AtomicBool,
        pub fail_unregister: AtomicBool,
    }

    impl FakeRelay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_fail_register(&self, fail: bool) {
            self.fail_register.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_unregister(&self, fail: bool) {
            self.fail_unregister.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PathManager for FakeRelay {
        async fn register(&self, _id: &str, _source_url: &str) -> Result<()> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_register.load(Ordering::SeqCst) {
                return Err(Error::RelayRejected {
                    status: 400,
                    body: "invalid source".to_string(),
                });
            }
            Ok(())
        }

        async fn unregister(&self, _id: &str) -> Result<()> {
            self.unregister_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_unregister.load(Ordering::SeqCst) {
                return Err(Error::RelayUnreachable(
                    "connection refused".to_string(),
                ));
            }
            Ok(())
        }
    }
}
