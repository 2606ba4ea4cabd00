//! Canvas state and change notification.

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use mural_core::error::{MuralError, Result};

use crate::snapshot;

/// Capacity of the change broadcast. Notifications carry no payload and
/// snapshots are full-state, so a lagged subscriber loses nothing; it
/// coalesces the missed ticks into one.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// The shared pixel grid, safe under unbounded concurrent callers.
///
/// `set` and `snapshot` are serialized through an `RwLock`, so a snapshot
/// never observes a torn write. Every successful `set` notifies all
/// active [`Subscription`]s.
pub struct CanvasStore {
    width: u32,
    height: u32,
    pixels: RwLock<Vec<u32>>,
    changed: broadcast::Sender<()>,
}

impl CanvasStore {
    pub fn new(width: u32, height: u32) -> Self {
        let (changed, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            width,
            height,
            pixels: RwLock::new(vec![0; width as usize * height as usize]),
            changed,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Apply one pixel write and notify subscribers.
    ///
    /// Out-of-bounds writes fail without touching the grid or notifying.
    pub async fn set(&self, x: u32, y: u32, color: u32) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(MuralError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        {
            let mut pixels = self.pixels.write().await;
            pixels[(y * self.width + x) as usize] = color;
        }

        // No receivers just means nobody is connected
        let _ = self.changed.send(());
        debug!(x, y, color, "pixel written");
        Ok(())
    }

    pub async fn get(&self, x: u32, y: u32) -> Result<u32> {
        if x >= self.width || y >= self.height {
            return Err(MuralError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let pixels = self.pixels.read().await;
        Ok(pixels[(y * self.width + x) as usize])
    }

    /// Serialize the full canvas at the time of the call.
    pub async fn snapshot(&self) -> Vec<u8> {
        let pixels = self.pixels.read().await;
        snapshot::encode(self.width, self.height, &pixels)
    }

    /// Register for change notifications. The returned subscription is
    /// woken from whatever context performed the write; callers must
    /// marshal any reaction onto their own execution context.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: Some(self.changed.subscribe()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.changed.receiver_count()
    }
}

/// A session's registration with the canvas change broadcast.
///
/// Disposal is explicit and idempotent; a disposed subscription never
/// reports another change.
pub struct Subscription {
    rx: Option<broadcast::Receiver<()>>,
}

impl Subscription {
    /// Wait for the next canvas change. Returns `false` once the
    /// subscription is disposed or the store is gone.
    pub async fn changed(&mut self) -> bool {
        let Some(rx) = self.rx.as_mut() else {
            return false;
        };
        match rx.recv().await {
            Ok(()) => true,
            // Missed ticks collapse into "something changed"
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "change subscription lagged");
                true
            }
            Err(broadcast::error::RecvError::Closed) => {
                self.rx = None;
                false
            }
        }
    }

    pub fn dispose(&mut self) {
        self.rx = None;
    }

    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = CanvasStore::new(8, 8);
        store.set(3, 4, 7).await.unwrap();
        assert_eq!(store.get(3, 4).await.unwrap(), 7);
        assert_eq!(store.get(4, 3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_out_of_bounds() {
        let store = CanvasStore::new(4, 4);
        assert!(matches!(
            store.set(4, 0, 1).await,
            Err(MuralError::OutOfBounds { .. })
        ));
        assert!(matches!(
            store.set(0, 4, 1).await,
            Err(MuralError::OutOfBounds { .. })
        ));
    }

    #[tokio::test]
    async fn test_snapshot_reflects_writes() {
        let store = CanvasStore::new(4, 2);
        store.set(1, 1, 42).await.unwrap();
        let snap = crate::snapshot::decode(&store.snapshot().await).unwrap();
        assert_eq!(snap.width, 4);
        assert_eq!(snap.height, 2);
        assert_eq!(snap.pixel(1, 1), Some(42));
        assert_eq!(snap.pixel(0, 0), Some(0));
    }

    #[tokio::test]
    async fn test_subscriber_notified_on_set() {
        let store = CanvasStore::new(4, 4);
        let mut sub = store.subscribe();
        store.set(0, 0, 1).await.unwrap();
        assert!(sub.changed().await);
    }

    #[tokio::test]
    async fn test_out_of_bounds_does_not_notify() {
        let store = CanvasStore::new(4, 4);
        let mut sub = store.subscribe();
        store.set(9, 9, 1).await.unwrap_err();
        let woken = tokio::time::timeout(Duration::from_millis(50), sub.changed()).await;
        assert!(woken.is_err(), "rejected write must not notify");
    }

    #[tokio::test]
    async fn test_fan_out_to_all_subscribers() {
        let store = CanvasStore::new(4, 4);
        let mut a = store.subscribe();
        let mut b = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);
        store.set(2, 2, 5).await.unwrap();
        assert!(a.changed().await);
        assert!(b.changed().await);
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent() {
        let store = CanvasStore::new(4, 4);
        let mut sub = store.subscribe();
        assert!(sub.is_active());
        sub.dispose();
        sub.dispose();
        assert!(!sub.is_active());
        assert_eq!(store.subscriber_count(), 0);
        store.set(0, 0, 1).await.unwrap();
        assert!(!sub.changed().await);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_still_sees_change() {
        let store = CanvasStore::new(4, 4);
        let mut sub = store.subscribe();
        // Overflow the change channel without draining
        for i in 0..(CHANGE_CHANNEL_CAPACITY as u32 + 8) {
            store.set(i % 4, 0, i).await.unwrap();
        }
        assert!(sub.changed().await);
    }

    #[tokio::test]
    async fn test_changed_false_after_store_dropped() {
        let store = CanvasStore::new(4, 4);
        let mut sub = store.subscribe();
        drop(store);
        assert!(!sub.changed().await);
        assert!(!sub.is_active());
    }
}
