use crate::{Error, Rasterizer, RenderTarget, Result};
use image::RgbaImage;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Rasterize(RenderTarget, f32, oneshot::Sender<Result<RgbaImage>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly handle to a rasterizer living on a dedicated thread.
///
/// The worker thread builds and owns the backend (which need not be `Send`)
/// and executes commands sent from async tasks, one at a time.
#[derive(Clone)]
pub struct RasterHandle {
    cmd_tx: Sender<Command>,
}

impl RasterHandle {
    /// Spawn the worker and build the rasterizer on it with `factory`.
    ///
    /// Fails with the factory's error when the backend cannot be started.
    pub async fn spawn<F>(factory: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Box<dyn Rasterizer>> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        thread::spawn(move || {
            let mut rasterizer = match factory() {
                Ok(r) => r,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Rasterize(target, scale, resp) => {
                        let res = rasterizer.rasterize(&target, scale);
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let res = rasterizer.close();
                        let _ = resp.send(res);
                        return;
                    }
                }
            }
        });

        match init_rx.await {
            Ok(Ok(())) => Ok(Self { cmd_tx }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::WorkerError("worker exited during startup".into())),
        }
    }

    /// Rasterize `target` on the worker thread.
    pub async fn rasterize(&self, target: RenderTarget, scale: f32) -> Result<RgbaImage> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Rasterize(target, scale, tx))
            .map_err(|_| Error::WorkerError("worker has shut down".into()))?;
        rx.await
            .map_err(|_| Error::WorkerError("worker dropped the request".into()))?
    }

    /// Close the backend and stop the worker.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Close(tx))
            .map_err(|_| Error::WorkerError("worker has shut down".into()))?;
        rx.await
            .map_err(|_| Error::WorkerError("worker dropped the request".into()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    struct Solid;

    impl Rasterizer for Solid {
        fn rasterize(&mut self, _target: &RenderTarget, scale: f32) -> Result<RgbaImage> {
            let side = (10.0 * scale) as u32;
            Ok(RgbaImage::from_pixel(side, side, Rgba([1, 2, 3, 255])))
        }
    }

    fn target() -> RenderTarget {
        RenderTarget {
            document: "<div id=t></div>".into(),
            selector: "#t".into(),
        }
    }

    #[tokio::test]
    async fn rasterizes_on_worker_thread() {
        let handle = RasterHandle::spawn(|| Ok(Box::new(Solid) as Box<dyn Rasterizer>))
            .await
            .unwrap();
        let img = handle.rasterize(target(), 2.0).await.unwrap();
        assert_eq!(img.dimensions(), (20, 20));
        handle.close().await.unwrap();
    }

    #[tokio::test]
    async fn startup_failure_is_reported() {
        let res = RasterHandle::spawn(|| Err(Error::BackendUnavailable("no chrome".into()))).await;
        assert!(matches!(res, Err(Error::BackendUnavailable(_))));
    }

    #[tokio::test]
    async fn closed_worker_rejects_commands() {
        let handle = RasterHandle::spawn(|| Ok(Box::new(Solid) as Box<dyn Rasterizer>))
            .await
            .unwrap();
        let other = handle.clone();
        handle.close().await.unwrap();
        assert!(matches!(
            other.rasterize(target(), 1.0).await,
            Err(Error::WorkerError(_))
        ));
    }
}
