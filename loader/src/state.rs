//! The published state of a collection fetch.

use derive_more::Display;
use payloads::Item;

use crate::error::LoadError;

/// Sequence number assigned to a request when it is dispatched.
///
/// Numbers increase monotonically per loader; `RequestId(0)` means nothing
/// has been dispatched yet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display,
)]
#[display("#{_0}")]
pub struct RequestId(pub u64);

impl RequestId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Where a fetch currently stands. Exactly one variant is active at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T = Item> {
    /// No request has been issued yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The source returned at least one item.
    Success(Loaded<T>),
    /// The source answered successfully with zero items.
    Empty,
    /// The request failed; the error's `Display` is the description to show.
    Failed(LoadError),
}

/// Payload of a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T = Item> {
    pub items: Vec<T>,
    pub total: u64,
    /// Set when the items are substitute data standing in for a failed
    /// request.
    pub degraded: Option<LoadError>,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> LoadState<T> {
    /// Success, Empty and Failed are terminal: nothing further happens
    /// until the next trigger.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Empty | Self::Failed(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn loaded(&self) -> Option<&Loaded<T>> {
        match self {
            Self::Success(loaded) => Some(loaded),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Short lowercase label, used as a structured logging field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Empty => "empty",
            Self::Failed(_) => "failed",
        }
    }
}

/// The value published to readers: a state together with the request it
/// belongs to. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T = Item> {
    pub request: RequestId,
    pub state: LoadState<T>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            request: RequestId::default(),
            state: LoadState::Idle,
        }
    }
}
