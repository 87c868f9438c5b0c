use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::{PhotoId, Stage, StageError, TaskOutcome};

/// Work payload executed by a stage queue worker.
pub type StageWork = BoxFuture<'static, Result<Vec<u8>, StageError>>;

/// One unit of pipeline work with its cooperative cancellation flag.
///
/// The flag is checked at the task's two boundaries: a task flagged
/// before it starts never touches the network or CPU, and a result that
/// lands after the flag was raised is discarded.
pub(crate) struct StageTask {
    id: PhotoId,
    stage: Stage,
    seq: u64,
    token: CancellationToken,
    work: StageWork,
}

impl StageTask {
    pub(crate) fn new(
        id: PhotoId,
        stage: Stage,
        seq: u64,
        token: CancellationToken,
        work: StageWork,
    ) -> Self {
        Self {
            id,
            stage,
            seq,
            token,
            work,
        }
    }

    pub(crate) fn id(&self) -> PhotoId {
        self.id
    }

    pub(crate) fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) async fn run(self) -> TaskOutcome {
        if self.token.is_cancelled() {
            return TaskOutcome::Cancelled;
        }
        let result = self.work.await;
        if self.token.is_cancelled() {
            return TaskOutcome::Cancelled;
        }
        match result {
            Ok(bytes) => TaskOutcome::Completed(bytes),
            Err(error) => TaskOutcome::Failed(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::FailureKind;

    fn task(token: CancellationToken, work: StageWork) -> StageTask {
        StageTask::new(1, Stage::Download, 1, token, work)
    }

    #[tokio::test]
    async fn cancelled_before_start_never_runs_the_work() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let token = CancellationToken::new();
        token.cancel();

        let outcome = task(
            token,
            Box::pin(async move {
                flag.store(true, Ordering::SeqCst);
                Ok(Vec::new())
            }),
        )
        .run()
        .await;

        assert_eq!(outcome, TaskOutcome::Cancelled);
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancellation_during_the_work_discards_the_result() {
        let token = CancellationToken::new();
        let mid_work = token.clone();

        let outcome = task(
            token,
            Box::pin(async move {
                mid_work.cancel();
                Ok(vec![1, 2, 3])
            }),
        )
        .run()
        .await;

        assert_eq!(outcome, TaskOutcome::Cancelled);
    }

    #[tokio::test]
    async fn completed_work_reports_its_bytes() {
        let outcome = task(CancellationToken::new(), Box::pin(async { Ok(vec![9, 9]) }))
            .run()
            .await;

        assert_eq!(outcome, TaskOutcome::Completed(vec![9, 9]));
    }

    #[tokio::test]
    async fn failed_work_reports_the_error() {
        let outcome = task(
            CancellationToken::new(),
            Box::pin(async { Err(StageError::new(FailureKind::Network, "connection reset")) }),
        )
        .run()
        .await;

        match outcome {
            TaskOutcome::Failed(error) => assert_eq!(error.kind, FailureKind::Network),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
