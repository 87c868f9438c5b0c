use std::collections::{HashMap, VecDeque};
use std::sync::{mpsc, Arc, Mutex};

use pipeline_logging::pipeline_debug;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::task::{StageTask, StageWork};
use crate::{PhotoId, PipelineEvent, Stage};

/// A suspendable FIFO work queue for one pipeline stage, executed by a
/// fixed pool of workers.
///
/// Suspension stops workers from claiming new tasks; tasks already
/// running are unaffected. Cancellation flags a task's token: pending
/// tasks drain through a worker and report `Cancelled` without doing
/// their work. Every submitted task reports exactly one `StageFinished`
/// event.
pub struct StageQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    stage: Stage,
    state: Mutex<QueueState>,
    wake: Notify,
}

struct QueueState {
    pending: VecDeque<StageTask>,
    tokens: HashMap<PhotoId, TrackedToken>,
    next_seq: u64,
    suspended: bool,
}

/// Token of the newest submission for a photo. The sequence number keeps
/// an older task's completion from releasing a newer registration.
struct TrackedToken {
    seq: u64,
    token: CancellationToken,
}

impl StageQueue {
    /// Spawns `width` workers on the current tokio runtime.
    pub fn spawn(stage: Stage, width: usize, events: mpsc::Sender<PipelineEvent>) -> Self {
        let inner = Arc::new(QueueInner {
            stage,
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                tokens: HashMap::new(),
                next_seq: 1,
                suspended: false,
            }),
            wake: Notify::new(),
        });
        for _ in 0..width.max(1) {
            let inner = Arc::clone(&inner);
            let events = events.clone();
            tokio::spawn(worker_loop(inner, events));
        }
        Self { inner }
    }

    /// Queues work for the photo. An earlier task for the same photo that
    /// is still owned by the queue was cancelled before resubmission and
    /// reports on its own; its registration is superseded here.
    pub fn submit(&self, id: PhotoId, work: StageWork) {
        let token = CancellationToken::new();
        {
            let mut state = self.inner.lock_state();
            let seq = state.next_seq;
            state.next_seq += 1;
            if let Some(previous) = state.tokens.insert(
                id,
                TrackedToken {
                    seq,
                    token: token.clone(),
                },
            ) {
                previous.token.cancel();
            }
            state
                .pending
                .push_back(StageTask::new(id, self.inner.stage, seq, token, work));
        }
        self.inner.wake.notify_one();
    }

    /// Flags the photo's current task. Unknown ids are a logged no-op.
    pub fn cancel(&self, id: PhotoId) {
        let state = self.inner.lock_state();
        match state.tokens.get(&id) {
            Some(tracked) => tracked.token.cancel(),
            None => pipeline_debug!("no {} task to cancel for photo {id}", self.inner.stage),
        }
    }

    /// Parks or releases the worker pool. Tasks submitted while suspended
    /// queue up and run in submission order once released.
    pub fn set_suspended(&self, suspended: bool) {
        {
            let mut state = self.inner.lock_state();
            state.suspended = suspended;
        }
        if !suspended {
            self.inner.wake.notify_waiters();
        }
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock_state().pending.len()
    }
}

impl QueueInner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn claim_next(&self) -> Option<StageTask> {
        let mut state = self.lock_state();
        if state.suspended {
            return None;
        }
        state.pending.pop_front()
    }

    /// Drops the task's token registration unless a newer submission for
    /// the same photo has taken it over.
    fn release(&self, id: PhotoId, seq: u64) {
        let mut state = self.lock_state();
        if state
            .tokens
            .get(&id)
            .is_some_and(|tracked| tracked.seq == seq)
        {
            state.tokens.remove(&id);
        }
    }
}

async fn worker_loop(inner: Arc<QueueInner>, events: mpsc::Sender<PipelineEvent>) {
    loop {
        let notified = inner.wake.notified();
        tokio::pin!(notified);
        // Arm the waiter before checking the queue so a submit or resume
        // between the check and the await is not lost.
        notified.as_mut().enable();

        match inner.claim_next() {
            Some(task) => {
                let id = task.id();
                let stage = task.stage();
                let seq = task.seq();
                let outcome = task.run().await;
                inner.release(id, seq);
                let _ = events.send(PipelineEvent::StageFinished { id, stage, outcome });
            }
            None => notified.await,
        }
    }
}
