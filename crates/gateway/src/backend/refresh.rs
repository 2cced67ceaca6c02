//! Single-flight token refresh
//!
//! When several requests of one session hit a 401 together, only one of them
//! calls the refresh endpoint. The others wait for and reuse its result.

use std::future::Future;

use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::broadcast;

/// Tokens issued by the backend refresh endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(alias = "access_token")]
    pub access_token: String,
    /// Absent when the backend does not rotate refresh tokens
    #[serde(default, alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

/// Shared refresh outcome; the error carries a printable reason
pub type RefreshResult = Result<TokenPair, String>;

/// Result of trying to acquire a refresh slot.
enum RefreshSlot {
    /// No refresh in flight for this token; the caller performs it.
    Leader(broadcast::Sender<RefreshResult>),
    /// Another caller is refreshing; wait for its result.
    Follower(broadcast::Receiver<RefreshResult>),
}

/// Coalesces concurrent refreshes keyed by refresh token
#[derive(Default)]
pub struct RefreshGuard {
    in_flight: DashMap<String, broadcast::Sender<RefreshResult>>,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically become leader or follower for this refresh token
    fn acquire(&self, refresh_token: &str) -> RefreshSlot {
        use dashmap::mapref::entry::Entry;

        match self.in_flight.entry(refresh_token.to_string()) {
            Entry::Occupied(entry) => RefreshSlot::Follower(entry.get().subscribe()),
            Entry::Vacant(entry) => {
                let (tx, _rx) = broadcast::channel(1);
                entry.insert(tx.clone());
                RefreshSlot::Leader(tx)
            }
        }
    }

    /// Run `refresh` unless a refresh for the same token is already in flight
    ///
    /// Followers share the leader's result. If the leader is dropped before
    /// finishing, a waiting follower takes over as the new leader.
    pub async fn run<F, Fut>(&self, refresh_token: &str, refresh: F) -> RefreshResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshResult>,
    {
        let mut refresh = Some(refresh);

        loop {
            match self.acquire(refresh_token) {
                RefreshSlot::Follower(mut receiver) => match receiver.recv().await {
                    Ok(result) => return result,
                    Err(_) => {
                        tracing::debug!("Refresh leader went away, retrying as leader");
                        continue;
                    }
                },
                RefreshSlot::Leader(sender) => {
                    let slot = SlotRelease {
                        guard: self,
                        key: refresh_token,
                    };

                    let Some(refresh) = refresh.take() else {
                        return Err("refresh already attempted".to_string());
                    };
                    let result = refresh().await;

                    // No receivers is fine
                    let _ = sender.send(result.clone());
                    drop(slot);
                    return result;
                }
            }
        }
    }

    /// Number of refreshes currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Frees the refresh slot when the leader finishes or is cancelled
struct SlotRelease<'a> {
    guard: &'a RefreshGuard,
    key: &'a str,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.remove(self.key);
    }
}
