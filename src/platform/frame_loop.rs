//! Explicitly started/stopped recurring frame tasks
//!
//! A `FrameLoop` re-arms itself through a [`FrameScheduler`] after every
//! step until the step returns `ControlFlow::Break`, `stop()` is called, or
//! the loop is dropped. Stopping cancels the pending frame, so no step runs
//! after `stop()` returns.

use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};

/// One-shot frame callback, given the frame timestamp (ms)
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Something that can run a callback on the next frame
pub trait FrameScheduler {
    /// Schedule `callback`; returns a handle, or `None` if scheduling failed
    fn request_frame(&self, callback: FrameCallback) -> Option<i32>;
    fn cancel_frame(&self, handle: i32);
}

type Step = Box<dyn FnMut(f64) -> ControlFlow<()>>;

struct LoopInner<S: FrameScheduler> {
    name: &'static str,
    scheduler: S,
    step: RefCell<Step>,
    running: Cell<bool>,
    pending: Cell<Option<i32>>,
    /// Bumped on every start/stop so stale callbacks do nothing
    generation: Cell<u64>,
}

impl<S: FrameScheduler + 'static> LoopInner<S> {
    fn schedule(self: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let generation = self.generation.get();
        let handle = self.scheduler.request_frame(Box::new(move |time| {
            if let Some(inner) = weak.upgrade() {
                inner.run_frame(generation, time);
            }
        }));
        if handle.is_none() {
            log::warn!("{} loop: could not schedule frame, stopping", self.name);
            self.running.set(false);
        }
        self.pending.set(handle);
    }

    fn run_frame(self: &Rc<Self>, generation: u64, time: f64) {
        if !self.running.get() || generation != self.generation.get() {
            return;
        }
        self.pending.set(None);

        let flow = match self.step.try_borrow_mut() {
            Ok(mut step) => step(time),
            Err(_) => {
                log::error!("{} loop: step re-entered", self.name);
                ControlFlow::Break(())
            }
        };

        match flow {
            ControlFlow::Continue(()) if self.running.get() && generation == self.generation.get() => {
                self.schedule()
            }
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(()) => {
                if generation == self.generation.get() {
                    log::debug!("{} loop finished", self.name);
                    self.running.set(false);
                }
            }
        }
    }

    fn stop(&self) {
        if !self.running.replace(false) {
            return;
        }
        self.generation.set(self.generation.get() + 1);
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        log::debug!("{} loop stopped", self.name);
    }
}

/// Cancellable recurring task driven by a [`FrameScheduler`]
pub struct FrameLoop<S: FrameScheduler + 'static> {
    inner: Rc<LoopInner<S>>,
}

impl<S: FrameScheduler + 'static> FrameLoop<S> {
    pub fn new(
        name: &'static str,
        scheduler: S,
        step: impl FnMut(f64) -> ControlFlow<()> + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(LoopInner {
                name,
                scheduler,
                step: RefCell::new(Box::new(step)),
                running: Cell::new(false),
                pending: Cell::new(None),
                generation: Cell::new(0),
            }),
        }
    }

    /// Arm the loop; a no-op while already running
    pub fn start(&self) {
        if self.inner.running.replace(true) {
            return;
        }
        self.inner.generation.set(self.inner.generation.get() + 1);
        log::debug!("{} loop started", self.inner.name);
        self.inner.schedule();
    }

    /// Cancel the pending frame; no step runs after this returns
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }
}

impl<S: FrameScheduler + 'static> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

/// Scheduler whose frames fire only when told to
///
/// Used by tests and the native headless runner.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Vec<(i32, FrameCallback)>>>,
    next_handle: Rc<Cell<i32>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run every callback queued before this call; returns how many ran
    pub fn fire(&self, time: f64) -> usize {
        let due: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = due.len();
        for (_, callback) in due {
            callback(time);
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Option<i32> {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        self.queue.borrow_mut().push((handle, callback));
        Some(handle)
    }

    fn cancel_frame(&self, handle: i32) {
        self.queue.borrow_mut().retain(|(h, _)| *h != handle);
    }
}

/// `requestAnimationFrame` / `cancelAnimationFrame`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationFrameScheduler;

#[cfg(target_arch = "wasm32")]
impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Option<i32> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::closure::Closure;

        let window = web_sys::window()?;
        let closure = Closure::once_into_js(move |time: f64| callback(time));
        window
            .request_animation_frame(closure.unchecked_ref())
            .ok()
    }

    fn cancel_frame(&self, handle: i32) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_loop(
        scheduler: &ManualScheduler,
        limit: Option<u32>,
    ) -> (FrameLoop<ManualScheduler>, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let frame_loop = FrameLoop::new("test", scheduler.clone(), move |_time| {
            seen.set(seen.get() + 1);
            match limit {
                Some(limit) if seen.get() >= limit => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        });
        (frame_loop, count)
    }

    #[test]
    fn test_loop_rearms_each_frame() {
        let scheduler = ManualScheduler::new();
        let (frame_loop, count) = counting_loop(&scheduler, None);
        assert_eq!(scheduler.pending(), 0);

        frame_loop.start();
        frame_loop.start();
        assert_eq!(scheduler.pending(), 1);

        for frame in 0..5 {
            scheduler.fire(frame as f64 * 16.0);
        }
        assert_eq!(count.get(), 5);
        assert!(frame_loop.is_running());
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let scheduler = ManualScheduler::new();
        let (frame_loop, count) = counting_loop(&scheduler, None);
        frame_loop.start();
        scheduler.fire(0.0);
        frame_loop.stop();
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.fire(16.0), 0);
        assert_eq!(count.get(), 1);
        assert!(!frame_loop.is_running());
    }

    #[test]
    fn test_break_ends_loop_and_restart_works() {
        let scheduler = ManualScheduler::new();
        let (frame_loop, count) = counting_loop(&scheduler, Some(3));
        frame_loop.start();
        for _ in 0..10 {
            scheduler.fire(0.0);
        }
        assert_eq!(count.get(), 3);
        assert!(!frame_loop.is_running());

        frame_loop.start();
        scheduler.fire(0.0);
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn test_drop_stops_loop() {
        let scheduler = ManualScheduler::new();
        let (frame_loop, count) = counting_loop(&scheduler, None);
        frame_loop.start();
        drop(frame_loop);
        assert_eq!(scheduler.fire(0.0), 0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_independent_loops() {
        let scheduler = ManualScheduler::new();
        let (game, game_count) = counting_loop(&scheduler, None);
        let (face, face_count) = counting_loop(&scheduler, None);
        game.start();
        face.start();
        scheduler.fire(0.0);

        game.stop();
        scheduler.fire(16.0);
        scheduler.fire(32.0);
        assert_eq!(game_count.get(), 1);
        assert_eq!(face_count.get(), 3);
        assert!(face.is_running());
    }

    #[test]
    fn test_stale_callback_after_restart_is_ignored() {
        let scheduler = ManualScheduler::new();
        let (frame_loop, count) = counting_loop(&scheduler, None);
        frame_loop.start();
        frame_loop.stop();
        frame_loop.start();
        // Only the fresh request is queued
        assert_eq!(scheduler.pending(), 1);
        scheduler.fire(0.0);
        assert_eq!(count.get(), 1);
    }
}
