//! Shared canvas store.
//!
//! One [`CanvasStore`] is shared by every connected session. Sessions
//! mutate pixels through it, take consistent snapshots from it, and
//! subscribe to its change broadcast to learn when other sessions paint.

pub mod snapshot;
pub mod store;

pub use snapshot::Snapshot;
pub use store::{CanvasStore, Subscription};
