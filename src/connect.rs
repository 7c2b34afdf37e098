//! Connect-once handles for process-wide collaborators.
//!
//! The backing store and cache clients are created once at startup and
//! shared by reference afterwards. `SharedHandle` makes "connect" idempotent:
//! the first call runs the connector, every later call reuses its result.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

#[derive(Debug)]
pub struct SharedHandle<T> {
    name: &'static str,
    cell: OnceCell<Arc<T>>,
}

impl<T> SharedHandle<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cell: OnceCell::new(),
        }
    }

    /// Returns the connected handle, running `connect` only if no earlier
    /// call succeeded. Concurrent callers wait for the one in-flight connect.
    /// A failed connect leaves the handle empty so a later call can retry.
    pub async fn get_or_connect<F, Fut, E>(&self, connect: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let handle = self
            .cell
            .get_or_try_init(|| async {
                let client = connect().await?;
                info!("Connected {}", self.name);
                Ok::<_, E>(Arc::new(client))
            })
            .await?;
        Ok(handle.clone())
    }

    /// The handle, if already connected.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_connects_once_then_reuses() {
        let handle: SharedHandle<String> = SharedHandle::new("test client");
        let counter = AtomicU32::new(0);
        let connects = &counter;

        let connect = move || async move {
            connects.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>("client".to_string())
        };

        let first = handle.get_or_connect(connect).await.unwrap();
        let second = handle.get_or_connect(connect).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(handle.is_connected());
    }

    #[tokio::test]
    async fn test_failed_connect_can_be_retried() {
        let handle: SharedHandle<u32> = SharedHandle::new("flaky client");

        let err = handle
            .get_or_connect(|| async { Err::<u32, _>("refused") })
            .await
            .unwrap_err();
        assert_eq!(err, "refused");
        assert!(handle.get().is_none());

        let value = handle
            .get_or_connect(|| async { Ok::<_, &str>(7) })
            .await
            .unwrap();
        assert_eq!(*value, 7);
        assert_eq!(handle.get().map(|v| *v), Some(7));
    }
}
