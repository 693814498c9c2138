use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::loader::WordSource;

/// A request to build one compressed dictionary.
#[derive(Clone)]
pub(crate) struct LoadJob {
    pub(crate) source: Arc<dyn WordSource>,
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl LoadJob {
    pub(crate) fn name(&self) -> &str {
        self.source.name()
    }

    fn is(&self, other: &LoadJob) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

#[derive(Default)]
struct QueueState {
    running: bool,
    pending: VecDeque<LoadJob>,
    in_flight: Option<LoadJob>,
    // blocking loads waiting for the running slot
    waiting: Vec<LoadJob>,
}

/// Serializes dictionary builds: at most one runs, the rest wait in
/// submission order.
///
/// Every job carries the generation it was submitted in. Cancelling bumps
/// the generation, so a build that finishes afterwards is recognisably
/// stale and must be thrown away.
pub(crate) struct LoadQueue {
    state: Mutex<QueueState>,
    idle: Condvar,
    busy: AtomicBool,
    generation: AtomicU64,
}

impl LoadQueue {
    pub(crate) fn new() -> LoadQueue {
        LoadQueue {
            state: Mutex::new(QueueState::default()),
            idle: Condvar::new(),
            busy: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn job(&self, source: Arc<dyn WordSource>) -> LoadJob {
        LoadJob {
            source,
            generation: self.generation.load(Ordering::SeqCst),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hands the job back when the caller now owns the single running slot
    /// and must build it; otherwise the job is queued.
    pub(crate) fn submit(&self, job: LoadJob) -> Option<LoadJob> {
        let mut state = self.state.lock();

        if state.running {
            log::debug!("Queuing load for: {}", job.name());
            state.pending.push_back(job);
            return None;
        }

        state.running = true;
        state.in_flight = Some(job.clone());
        self.busy.store(true, Ordering::SeqCst);
        Some(job)
    }

    /// Blocks until the running slot is free, then claims it for `job`,
    /// which the caller builds itself. Gives up with `None` if the job is
    /// cancelled while waiting.
    pub(crate) fn acquire(&self, job: LoadJob) -> Option<LoadJob> {
        let mut state = self.state.lock();
        state.waiting.push(job.clone());

        while state.running && self.is_current(&job) {
            log::debug!("Waiting for running load before: {}", job.name());
            self.idle.wait(&mut state);
        }

        state.waiting.retain(|w| !w.is(&job));

        if !self.is_current(&job) {
            return None;
        }

        state.running = true;
        state.in_flight = Some(job.clone());
        self.busy.store(true, Ordering::SeqCst);
        Some(job)
    }

    /// Called by the runner after each build: the next job, or `None` once
    /// the queue is drained and the running slot released.
    pub(crate) fn next(&self) -> Option<LoadJob> {
        let mut state = self.state.lock();

        match state.pending.pop_front() {
            Some(job) => {
                state.in_flight = Some(job.clone());
                Some(job)
            }
            None => {
                state.running = false;
                state.in_flight = None;
                self.busy.store(false, Ordering::SeqCst);
                self.idle.notify_all();
                None
            }
        }
    }

    #[inline(always)]
    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub(crate) fn is_current(&self, job: &LoadJob) -> bool {
        !job.cancelled.load(Ordering::SeqCst)
            && job.generation == self.generation.load(Ordering::SeqCst)
    }

    /// True when a live (not cancelled) job for `name` is waiting or running.
    pub(crate) fn is_queued(&self, name: &str) -> bool {
        let state = self.state.lock();
        state
            .in_flight
            .iter()
            .chain(state.pending.iter())
            .chain(state.waiting.iter())
            .any(|job| job.name() == name && self.is_current(job))
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Drops queued jobs for `name` and marks running or blocked ones as
    /// cancelled.
    pub(crate) fn cancel(&self, name: &str) -> bool {
        let mut state = self.state.lock();
        let before = state.pending.len();
        state.pending.retain(|job| job.name() != name);
        let mut found = before != state.pending.len();

        for job in state.in_flight.iter().chain(state.waiting.iter()) {
            if job.name() == name && self.is_current(job) {
                job.cancelled.store(true, Ordering::SeqCst);
                found = true;
            }
        }

        self.idle.notify_all();
        found
    }

    /// Abandons every waiting and running job.
    pub(crate) fn cancel_all(&self) {
        let mut state = self.state.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);

        if !state.pending.is_empty() {
            log::debug!("Dropping {} queued loads", state.pending.len());
        }
        state.pending.clear();

        for job in state.in_flight.iter().chain(state.waiting.iter()) {
            job.cancelled.store(true, Ordering::SeqCst);
        }

        self.idle.notify_all();
    }

    /// Blocks until no build is running or `timeout` elapses. Returns
    /// whether the queue is idle.
    pub(crate) fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        while state.running {
            if self.idle.wait_until(&mut state, deadline).timed_out() {
                return !state.running;
            }
        }

        true
    }
}
