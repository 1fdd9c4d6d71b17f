//! Staggered reveal of an item sequence.
//!
//! A reveal walks the input from last to first, prepending one item to the
//! visible list per step and sleeping a fixed delay between steps, so the
//! surface sees `[C]`, `[B, C]`, `[A, B, C]` for an input of `[A, B, C]`.
//! Every step checks the cancellation flag under the state lock before it
//! touches the visible list, so a cancelled reveal never mutates again even if
//! its timer was already in flight.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(1000);

/// Whatever renders the visible items.
pub trait RevealSurface<T>: Send + Sync {
    fn render(&self, visible: &[T]);

    fn set_loading(&self, _loading: bool) {}
}

struct RevealState<T> {
    visible: Vec<T>,
    cancelled: bool,
    completed: bool,
    timer: Option<AbortHandle>,
}

/// Handle to one reveal sequence.
pub struct RevealHandle<T> {
    state: Arc<Mutex<RevealState<T>>>,
}

impl<T> Clone for RevealHandle<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> RevealHandle<T> {
    fn completed(visible: Vec<T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RevealState {
                visible,
                cancelled: false,
                completed: true,
                timer: None,
            })),
        }
    }

    /// Stops the sequence; the visible list stays frozen at whatever was revealed.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if state.cancelled || state.completed {
            return;
        }
        state.cancelled = true;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        debug!(revealed = state.visible.len(), "reveal: cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// True once every item was revealed without cancellation.
    pub fn is_complete(&self) -> bool {
        self.state.lock().completed
    }

    pub fn revealed(&self) -> usize {
        self.state.lock().visible.len()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.state.lock().timer.is_some()
    }
}

impl<T: Clone> RevealHandle<T> {
    pub fn visible(&self) -> Vec<T> {
        self.state.lock().visible.clone()
    }
}

/// Clears the surface and starts revealing `items` on the current tokio runtime.
pub fn start_reveal<T>(
    items: Vec<T>,
    delay: Duration,
    surface: Arc<dyn RevealSurface<T>>,
) -> RevealHandle<T>
where
    T: Send + 'static,
{
    surface.render(&[]);

    if items.is_empty() {
        return RevealHandle::completed(Vec::new());
    }

    let handle = RevealHandle {
        state: Arc::new(Mutex::new(RevealState {
            visible: Vec::with_capacity(items.len()),
            cancelled: false,
            completed: false,
            timer: None,
        })),
    };

    let task = tokio::spawn(run_reveal(
        items,
        delay,
        surface,
        Arc::clone(&handle.state),
    ));

    let mut state = handle.state.lock();
    if !state.completed && !state.cancelled {
        state.timer = Some(task.abort_handle());
    }
    drop(state);

    handle
}

async fn run_reveal<T>(
    items: Vec<T>,
    delay: Duration,
    surface: Arc<dyn RevealSurface<T>>,
    state: Arc<Mutex<RevealState<T>>>,
) {
    let total = items.len();
    for (step, item) in items.into_iter().rev().enumerate() {
        {
            let mut guard = state.lock();
            if guard.cancelled {
                return;
            }
            guard.visible.insert(0, item);
            surface.render(&guard.visible);
        }

        if step + 1 < total {
            tokio::time::sleep(delay).await;
        }
    }

    let mut guard = state.lock();
    if !guard.cancelled {
        guard.completed = true;
        debug!(total, "reveal: completed");
    }
    guard.timer = None;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    Incremental,
    Batch,
}

/// Owns at most one live reveal and decides between staggered and batch display.
pub struct RevealController<T> {
    surface: Arc<dyn RevealSurface<T>>,
    delay: Duration,
    current: Option<RevealHandle<T>>,
    revealed_once: bool,
}

impl<T> RevealController<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(surface: Arc<dyn RevealSurface<T>>, delay: Duration) -> Self {
        Self {
            surface,
            delay,
            current: None,
            revealed_once: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn surface(&self) -> &Arc<dyn RevealSurface<T>> {
        &self.surface
    }

    /// Whether a non-empty sequence has been fully shown since the last reset.
    pub fn has_revealed_once(&self) -> bool {
        self.revealed_once
            || self
                .current
                .as_ref()
                .is_some_and(|handle| handle.is_complete() && handle.revealed() > 0)
    }

    /// Cancels any live sequence, then reveals `items` one per delay.
    pub fn start_reveal(&mut self, items: Vec<T>) -> RevealHandle<T> {
        self.retire_current();
        let handle = start_reveal(items, self.delay, Arc::clone(&self.surface));
        self.current = Some(handle.clone());
        handle
    }

    /// Cancels any live sequence and shows every item at once.
    pub fn show_all(&mut self, items: Vec<T>) {
        self.retire_current();
        self.surface.render(&items);
        if !items.is_empty() {
            self.revealed_once = true;
        }
        self.current = Some(RevealHandle::completed(items));
    }

    /// Staggered the first time a screen session shows data, batch afterwards.
    pub fn present(&mut self, items: Vec<T>) -> PresentMode {
        if self.has_revealed_once() {
            self.show_all(items);
            PresentMode::Batch
        } else {
            self.start_reveal(items);
            PresentMode::Incremental
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = &self.current {
            handle.cancel();
        }
    }

    /// Forgets earlier reveals so the next `present` animates again.
    pub fn reset(&mut self) {
        self.cancel();
        self.current = None;
        self.revealed_once = false;
    }

    pub fn visible(&self) -> Vec<T> {
        self.current
            .as_ref()
            .map(RevealHandle::visible)
            .unwrap_or_default()
    }

    pub fn is_revealing(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|handle| !handle.is_complete() && !handle.is_cancelled())
    }

    fn retire_current(&mut self) {
        if let Some(previous) = self.current.take() {
            if previous.is_complete() && previous.revealed() > 0 {
                self.revealed_once = true;
            }
            previous.cancel();
        }
    }
}

impl<T> Drop for RevealController<T> {
    fn drop(&mut self) {
        if let Some(handle) = &self.current {
            handle.cancel();
        }
    }
}

#[cfg(test)]
#[path = "tests/reveal_tests.rs"]
mod tests;
