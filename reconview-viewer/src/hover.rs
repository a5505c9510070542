//! Hover previews that cycle through a scene's input views

use reconview_io::Thumbnail;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Starts hover sessions with a fixed frame period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverCycler {
    interval: Duration,
}

impl HoverCycler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Begin hovering over a thumbnail showing `frames`.
    ///
    /// `resting` is what the thumbnail shows once the pointer leaves. With
    /// fewer than two frames no timer is started. Must be called from within
    /// a Tokio runtime.
    pub fn enter(&self, frames: &[Thumbnail], resting: impl Into<PathBuf>) -> HoverSession {
        let frames: Vec<PathBuf> = frames.iter().map(|f| f.path.clone()).collect();
        let (tx, rx) = watch::channel(0usize);

        let timer = (frames.len() > 1).then(|| {
            let period = self.interval;
            let len = frames.len();
            tokio::spawn(async move {
                let mut ticks = interval_at(Instant::now() + period, period);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut index = 0;
                loop {
                    ticks.tick().await;
                    index = (index + 1) % len;
                    if tx.send(index).is_err() {
                        break;
                    }
                }
            })
        });

        HoverSession {
            frames,
            resting: resting.into(),
            current: rx,
            timer,
        }
    }
}

impl Default for HoverCycler {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

/// An active hover over one thumbnail; dropping it stops the cycling
#[derive(Debug)]
pub struct HoverSession {
    frames: Vec<PathBuf>,
    resting: PathBuf,
    current: watch::Receiver<usize>,
    timer: Option<JoinHandle<()>>,
}

impl HoverSession {
    pub fn is_cycling(&self) -> bool {
        self.timer.is_some()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index into the loaded frames of the one currently shown
    pub fn current_index(&self) -> usize {
        *self.current.borrow()
    }

    /// Path of the frame currently shown
    pub fn current(&self) -> &Path {
        self.frames
            .get(self.current_index())
            .map(PathBuf::as_path)
            .unwrap_or(&self.resting)
    }

    /// Stop cycling and return the path the thumbnail rests on
    pub fn leave(mut self) -> PathBuf {
        self.stop();
        std::mem::take(&mut self.resting)
    }

    fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for HoverSession {
    fn drop(&mut self) {
        self.stop();
    }
}
