//! Lifecycle of a single remote-collection fetch.
//!
//! ```text
//!            trigger()                 on_response / on_failure
//!  Idle ──────────────► Loading ───────────────────────────────► Success
//!                          ▲                                  ├─► Empty
//!                          │  trigger() (any time)            └─► Failed
//!                          └───────────────────────────────────────┘
//! ```
//!
//! Every trigger publishes `Loading` for a fresh [`RequestId`] before the
//! request is spawned. Outcomes are published only if they belong to the
//! latest request and that request is still loading, so a slow, superseded
//! request can never overwrite a newer result.

use payloads::{Item, ProductPage};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::Instrument;

use crate::error::{LoadError, TransportError};
use crate::source::{DataSource, RawResponse};
use crate::state::{LoadState, Loaded, RequestId, Snapshot};

/// What to publish when the request itself cannot complete.
#[derive(Debug, Clone)]
pub enum FallbackPolicy<T = Item> {
    /// Surface the transport error as `Failed`.
    Disabled,
    /// Publish this page instead, marked as degraded. Status and parse
    /// errors still fail.
    Substitute(ProductPage<T>),
}

impl<T> Default for FallbackPolicy<T> {
    fn default() -> Self {
        Self::Disabled
    }
}

#[derive(Debug, Clone)]
pub struct LoaderOptions<T = Item> {
    /// Bounded wait per request. `None` waits as long as the source does.
    pub timeout: Option<Duration>,
    pub fallback: FallbackPolicy<T>,
}

impl<T> Default for LoaderOptions<T> {
    fn default() -> Self {
        Self {
            timeout: None,
            fallback: FallbackPolicy::Disabled,
        }
    }
}

/// Owns the fetch lifecycle and publishes its [`LoadState`].
///
/// Cloning is cheap; clones share the same state. `trigger` spawns onto the
/// current tokio runtime and panics outside of one.
pub struct ResourceLoader<S, T = Item> {
    inner: Arc<Inner<S, T>>,
}

struct Inner<S, T> {
    source: S,
    state: watch::Sender<Snapshot<T>>,
    options: LoaderOptions<T>,
}

impl<S, T> Clone for ResourceLoader<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, T> ResourceLoader<S, T>
where
    S: DataSource,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(source: S, options: LoaderOptions<T>) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            inner: Arc::new(Inner {
                source,
                state,
                options,
            }),
        }
    }

    /// Start a new fetch, superseding any request still in flight.
    ///
    /// `Loading` is visible to readers by the time this returns.
    pub fn trigger(&self) -> RequestId {
        let mut request = RequestId::default();
        self.inner.state.send_modify(|snapshot| {
            request = snapshot.request.next();
            *snapshot = Snapshot {
                request,
                state: LoadState::Loading,
            };
        });
        tracing::debug!(%request, "published loading");

        let loader = self.clone();
        tokio::spawn(
            async move { loader.dispatch(request).await }
                .instrument(tracing::info_span!("fetch", %request)),
        );
        request
    }

    async fn dispatch(&self, request: RequestId) {
        let fetch = self.inner.source.fetch(request);
        let outcome = match self.inner.options.timeout {
            Some(limit) => time::timeout(limit, fetch)
                .await
                .unwrap_or(Err(TransportError::Timeout(limit))),
            None => fetch.await,
        };

        match outcome {
            Ok(raw) => self.on_response(request, raw),
            Err(e) => self.on_failure(request, e),
        };
    }

    /// Validate and decode a completed response for `request`.
    ///
    /// Returns whether a new state was published.
    pub fn on_response(&self, request: RequestId, raw: RawResponse) -> bool {
        if !raw.status.is_success() {
            let error = LoadError::Status {
                status: raw.status,
                body: raw.body,
            };
            tracing::warn!(%request, "{error}");
            return self.publish(request, LoadState::Failed(error));
        }

        match serde_json::from_str::<ProductPage<T>>(&raw.body) {
            Ok(page) => {
                let total = page.total();
                self.on_parsed(request, page.items, total)
            }
            Err(e) => {
                let error = LoadError::Parse(e.to_string());
                tracing::warn!(%request, "{error}");
                self.publish(request, LoadState::Failed(error))
            }
        }
    }

    /// Publish a decoded collection for `request`.
    pub fn on_parsed(
        &self,
        request: RequestId,
        items: Vec<T>,
        total: u64,
    ) -> bool {
        let state = if items.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Success(Loaded {
                items,
                total,
                degraded: None,
            })
        };
        self.publish(request, state)
    }

    /// The request could not complete.
    pub fn on_failure(&self, request: RequestId, err: TransportError) -> bool {
        tracing::warn!(%request, "request failed: {err}");
        let state = match &self.inner.options.fallback {
            FallbackPolicy::Disabled => LoadState::Failed(err.into()),
            FallbackPolicy::Substitute(page) if page.items.is_empty() => {
                LoadState::Empty
            }
            FallbackPolicy::Substitute(page) => LoadState::Success(Loaded {
                items: page.items.clone(),
                total: page.total(),
                degraded: Some(err.into()),
            }),
        };
        self.publish(request, state)
    }

    /// The state readers currently see.
    pub fn current_state(&self) -> LoadState<T> {
        self.inner.state.borrow().state.clone()
    }

    pub fn latest_request(&self) -> RequestId {
        self.inner.state.borrow().request
    }

    pub fn subscribe(&self) -> StateWatcher<T> {
        StateWatcher {
            receiver: self.inner.state.subscribe(),
        }
    }

    /// Re-trigger every `period` until the returned handle is aborted. The
    /// first re-trigger happens one period from now.
    pub fn refresh_every(&self, period: Duration) -> JoinHandle<()> {
        let loader = self.clone();
        tokio::spawn(async move {
            let mut interval =
                time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                loader.trigger();
            }
        })
    }

    /// Replace the state, but only if `request` is the latest dispatch and
    /// has not already settled. The check and the write share one critical
    /// section so a concurrent trigger cannot slip in between.
    fn publish(&self, request: RequestId, state: LoadState<T>) -> bool {
        let name = state.name();
        let published = self.inner.state.send_if_modified(|snapshot| {
            if snapshot.request != request || !snapshot.state.is_loading() {
                return false;
            }
            snapshot.state = state;
            true
        });

        if published {
            tracing::debug!(%request, state = name, "published");
        } else {
            tracing::debug!(
                %request,
                latest = %self.latest_request(),
                "discarded superseded result"
            );
        }
        published
    }
}

/// Read handle on a loader's state.
///
/// Backed by a watch channel: a slow reader sees the latest snapshot, not
/// every intermediate one.
pub struct StateWatcher<T = Item> {
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Clone> StateWatcher<T> {
    pub fn current(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the loader and all its
    /// in-flight requests are gone.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the current snapshot is terminal. Returns immediately if
    /// it already is.
    pub async fn settled(&mut self) -> Option<Snapshot<T>> {
        let snapshot = self
            .receiver
            .wait_for(|snapshot| snapshot.state.is_terminal())
            .await
            .ok()?;
        Some(snapshot.clone())
    }
}
