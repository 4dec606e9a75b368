//! Status tracking.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering::Relaxed},
    Mutex,
};

pub struct Status {
    pub reports: Reports,
    pub frames: Frames,
    pub(crate) cancel: Cancel,
}

#[derive(Default)]
pub struct Reports {
    symbolicating: AtomicUsize,
    complete: AtomicUsize,
    total: AtomicUsize,
}

#[derive(Default)]
pub struct Frames {
    expanded: AtomicUsize,
    total: AtomicUsize,
}

#[derive(Default)]
pub(crate) struct Cancel {
    cancelled: AtomicBool,
    on_cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Status {
    pub(crate) fn new() -> Self {
        Status {
            reports: Default::default(),
            frames: Default::default(),
            cancel: Default::default(),
        }
    }

    /// Cancel execution.
    pub fn cancel(&self) {
        self.cancel.cancelled.store(true, Relaxed);
        if let Ok(mut guard) = self.cancel.on_cancel.lock() {
            if let Some(f) = guard.take() {
                f();
            }
        }
    }

    /// Return whether execution has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Reports {
    pub(crate) fn inc_symbolicating(&self) {
        self.symbolicating.fetch_add(1, Relaxed);
    }

    pub(crate) fn dec_symbolicating(&self) {
        self.symbolicating.fetch_sub(1, Relaxed);
    }

    pub fn symbolicating_count(&self) -> usize {
        self.symbolicating.load(Relaxed)
    }

    pub(crate) fn inc_complete(&self) {
        self.complete.fetch_add(1, Relaxed);
    }

    pub fn complete_count(&self) -> usize {
        self.complete.load(Relaxed)
    }

    pub(crate) fn set_total(&self, val: usize) {
        self.total.store(val, Relaxed)
    }

    pub fn total_count(&self) -> usize {
        self.total.load(Relaxed)
    }

    pub fn done(&self) -> bool {
        self.complete_count() == self.total_count()
    }
}

impl Frames {
    pub(crate) fn add(&self, input: usize, output: usize) {
        self.total.fetch_add(input, Relaxed);
        self.expanded.fetch_add(output, Relaxed);
    }

    /// Raw input frames walked so far.
    pub fn total_count(&self) -> usize {
        self.total.load(Relaxed)
    }

    /// Logical output frames produced, including inline expansions.
    pub fn expanded_count(&self) -> usize {
        self.expanded.load(Relaxed)
    }
}

impl Cancel {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Relaxed)
    }

    pub fn on_cancel<F: FnOnce() + Send + 'static>(&self, f: F) {
        if let Ok(mut guard) = self.on_cancel.lock() {
            if self.is_cancelled() {
                drop(guard);
                f();
            } else {
                *guard = Some(Box::new(f));
            }
        }
    }
}
