//! Animation-frame scheduling.
//!
//! The host owns the real frame clock (a window's redraw loop, a browser's
//! animation frame, a test). The simulation only asks for "call me on the
//! next frame" and may take that request back.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Identifies one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Requests and cancels per-frame callbacks.
pub trait FrameScheduler {
    /// Ask for one callback on the next frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
}

/// A scheduler driven by hand: frames only "happen" when the host calls
/// [`take_due`](ManualScheduler::take_due).
///
/// Clones share one queue, so a host can keep a clone while the
/// simulation owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Queue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every pending request, oldest first.
    pub fn take_due(&self) -> Vec<FrameHandle> {
        self.queue.borrow_mut().pending.drain(..).collect()
    }

    /// Number of outstanding requests.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.queue.borrow().pending.contains(&handle)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut queue = self.queue.borrow_mut();
        // Handle 0 is never issued.
        queue.next_id += 1;
        let handle = FrameHandle(queue.next_id);
        queue.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.queue.borrow_mut().pending.retain(|h| *h != handle);
    }
}
