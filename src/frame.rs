//! Loop flags shared between event dispatch and rendering
//!
//! `should_exit` is an atomic; `draw_next_frame` sits behind a mutex with a
//! condvar so a render thread can sleep until the compositor's frame callback
//! fires. A configure that arrives on the dispatch thread is parked in
//! `pending_size` until the render thread, which owns the native window,
//! applies it.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Exit and frame-ready flags for one window
#[derive(Debug, Default)]
pub struct FrameSignal {
    should_exit: AtomicBool,
    draw_next_frame: Mutex<bool>,
    frame_ready: Condvar,
    pending_size: Mutex<Option<(i32, i32)>>,
}

impl FrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every loop watching this signal to stop
    pub fn request_exit(&self) {
        self.should_exit.store(true, Ordering::Release);
        // Wake a render thread parked in `wait_frame`
        let _guard = self.draw_next_frame.lock();
        self.frame_ready.notify_all();
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit.load(Ordering::Acquire)
    }

    /// Mark that the compositor is ready for another frame
    pub fn notify_frame(&self) {
        let mut ready = self.draw_next_frame.lock();
        *ready = true;
        self.frame_ready.notify_one();
    }

    /// Consume a pending frame notification without blocking
    pub fn take_frame(&self) -> bool {
        std::mem::take(&mut *self.draw_next_frame.lock())
    }

    /// Hand a new window size to the render thread and wake it.
    ///
    /// Only the latest size is kept.
    pub fn request_resize(&self, width: i32, height: i32) {
        *self.pending_size.lock() = Some((width, height));
        self.notify_frame();
    }

    /// Consume the size recorded by [`request_resize`](Self::request_resize)
    pub fn take_resize(&self) -> Option<(i32, i32)> {
        self.pending_size.lock().take()
    }

    /// Block until a frame notification arrives, exit is requested, or
    /// `timeout` elapses. Returns `true` only when a frame was consumed.
    pub fn wait_frame(&self, timeout: Duration) -> bool {
        let mut ready = self.draw_next_frame.lock();
        if !*ready && !self.should_exit() {
            let _ = self.frame_ready.wait_for(&mut ready, timeout);
        }
        std::mem::take(&mut *ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn frame_notification_is_consumed_once() {
        let signal = FrameSignal::new();
        assert!(!signal.take_frame());
        signal.notify_frame();
        assert!(signal.take_frame());
        assert!(!signal.take_frame());
    }

    #[test]
    fn repeated_notifications_collapse() {
        let signal = FrameSignal::new();
        signal.notify_frame();
        signal.notify_frame();
        assert!(signal.wait_frame(Duration::from_millis(1)));
        assert!(!signal.take_frame());
    }

    #[test]
    fn wait_times_out_without_notification() {
        let signal = FrameSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_frame(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn notify_from_other_thread_wakes_waiter() {
        let signal = Arc::new(FrameSignal::new());
        let notifier = Arc::clone(&signal);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            notifier.notify_frame();
        });
        assert!(signal.wait_frame(Duration::from_secs(5)));
        handle.join().unwrap();
    }

    #[test]
    fn resize_is_handed_over_once_and_latest_wins() {
        let signal = FrameSignal::new();
        assert_eq!(signal.take_resize(), None);
        signal.request_resize(640, 480);
        signal.request_resize(800, 600);
        assert_eq!(signal.take_resize(), Some((800, 600)));
        assert_eq!(signal.take_resize(), None);
    }

    #[test]
    fn resize_from_dispatch_thread_wakes_renderer() {
        let signal = Arc::new(FrameSignal::new());
        let dispatcher = Arc::clone(&signal);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            dispatcher.request_resize(1024, 768);
        });
        assert!(signal.wait_frame(Duration::from_secs(5)));
        assert_eq!(signal.take_resize(), Some((1024, 768)));
        handle.join().unwrap();
    }

    #[test]
    fn exit_wakes_waiter_without_frame() {
        let signal = Arc::new(FrameSignal::new());
        let closer = Arc::clone(&signal);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            closer.request_exit();
        });
        let start = Instant::now();
        assert!(!signal.wait_frame(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(signal.should_exit());
        handle.join().unwrap();
    }
}
