use log::debug;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    /// Accept only finite, strictly positive dimensions.
    pub fn checked(width: f64, height: f64) -> Result<Self, String> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(format!("INVALID_SURFACE: {width}x{height}"));
        }
        Ok(Self { width, height })
    }
}

/// Collapses bursts of resize events into one callback carrying the last size,
/// fired once no new event arrived for `quiet`.
pub struct ResizeDebouncer {
    tx: mpsc::UnboundedSender<SurfaceSize>,
    handle: JoinHandle<()>,
}

impl ResizeDebouncer {
    pub fn spawn<F>(quiet: Duration, on_settled: F) -> Self
    where
        F: Fn(SurfaceSize) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<SurfaceSize>();

        let handle = tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                let mut latest = first;
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(size) => latest = size,
                            None => break,
                        },
                        _ = tokio::time::sleep(quiet) => break,
                    }
                }
                debug!("surface settled at {}x{}", latest.width, latest.height);
                on_settled(latest);
            }
        });

        Self { tx, handle }
    }

    pub fn notify(&self, width: f64, height: f64) {
        let _ = self.tx.send(SurfaceSize { width, height });
    }
}

impl Drop for ResizeDebouncer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
