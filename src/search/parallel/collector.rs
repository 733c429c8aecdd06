//! Waiting for every launched worker and recording how each one ended.

use crate::search::parallel::channel::{ExitClassification, HandleId};
use crate::search::parallel::launcher::{WorkerHandle, WorkerRuntime};
use crate::search::partition::{IndexRange, WorkerAssignment};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Terminal state of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOutcome {
    pub worker_id: usize,
    pub range: IndexRange,
    pub exit: ExitClassification,
}

/// A worker that never started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchFailure {
    pub worker_id: usize,
    pub range: IndexRange,
    pub reason: String,
}

/// How every worker of a run ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionReport {
    outcomes: Vec<WorkerOutcome>,
    launch_failures: Vec<LaunchFailure>,
}

impl CompletionReport {
    pub fn record_exit(&mut self, assignment: WorkerAssignment, exit: ExitClassification) {
        self.outcomes.push(WorkerOutcome {
            worker_id: assignment.worker_id,
            range: assignment.range,
            exit,
        });
    }

    pub fn record_launch_failure(&mut self, assignment: WorkerAssignment, reason: String) {
        self.launch_failures.push(LaunchFailure {
            worker_id: assignment.worker_id,
            range: assignment.range,
            reason,
        });
    }

    /// Collected workers, ordered by worker id.
    pub fn outcomes(&self) -> &[WorkerOutcome] {
        &self.outcomes
    }

    pub fn launch_failures(&self) -> &[LaunchFailure] {
        &self.launch_failures
    }

    pub fn outcome(&self, worker_id: usize) -> Option<&WorkerOutcome> {
        self.outcomes.iter().find(|o| o.worker_id == worker_id)
    }

    /// True when every worker started and exited with status 0, which means
    /// the whole search space was scanned.
    pub fn all_succeeded(&self) -> bool {
        self.launch_failures.is_empty() && self.outcomes.iter().all(|o| o.exit.is_success())
    }

    /// Ids of workers that did not start or did not finish normally.
    pub fn failed_workers(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .outcomes
            .iter()
            .filter(|o| !o.exit.is_success())
            .map(|o| o.worker_id)
            .chain(self.launch_failures.iter().map(|f| f.worker_id))
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.exit.is_success()).count()
    }

    /// Candidates owned by workers that finished normally.
    pub fn candidates_covered(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| o.exit.is_success())
            .map(|o| o.range.len())
            .sum()
    }

    fn finalize(mut self) -> Self {
        self.outcomes.sort_by_key(|o| o.worker_id);
        self.launch_failures.sort_by_key(|f| f.worker_id);
        self
    }
}

/// Wait for every handle in `handles` to terminate.
pub fn collect_all<R: WorkerRuntime + ?Sized>(
    runtime: &mut R,
    handles: &[WorkerHandle],
) -> CompletionReport {
    collect_all_with(runtime, handles, CompletionReport::default(), |_| {})
}

/// Wait for every handle in `handles` to terminate, adding each exit to
/// `report` and passing it to `on_exit` in completion order.
///
/// Exactly one wait is made per handle. Exits are matched back to workers
/// through their handle, so completion order does not matter. An event for a
/// handle that was not launched here, or that was already collected, still
/// uses up its wait and is otherwise ignored. Handles left uncollected once
/// the waits are spent, or once the runtime has nothing outstanding, are
/// recorded as lost.
pub fn collect_all_with<R, F>(
    runtime: &mut R,
    handles: &[WorkerHandle],
    mut report: CompletionReport,
    mut on_exit: F,
) -> CompletionReport
where
    R: WorkerRuntime + ?Sized,
    F: FnMut(&WorkerOutcome),
{
    let mut pending: HashMap<HandleId, WorkerAssignment> = handles
        .iter()
        .map(|h| (h.id(), *h.assignment()))
        .collect();
    let mut waits = 0usize;

    while waits < handles.len() {
        let Some(event) = runtime.wait_any() else {
            warn!(
                remaining = pending.len(),
                "runtime reports no outstanding workers"
            );
            break;
        };
        waits += 1;

        match pending.remove(&event.handle) {
            Some(assignment) => {
                debug!(
                    worker_id = assignment.worker_id,
                    handle = event.handle,
                    exit = %event.exit,
                    "worker collected"
                );
                report.record_exit(assignment, event.exit);
                if let Some(outcome) = report.outcomes.last() {
                    on_exit(outcome);
                }
            }
            None => warn!(
                handle = event.handle,
                "exit event for a handle outside the pending set, ignoring"
            ),
        }
    }

    if !pending.is_empty() {
        warn!(remaining = pending.len(), "marking uncollected workers as lost");
        let mut lost: Vec<WorkerAssignment> = pending.into_values().collect();
        lost.sort_by_key(|a| a.worker_id);
        for assignment in lost {
            report.record_exit(
                assignment,
                ExitClassification::AbnormalTermination("lost".to_string()),
            );
            if let Some(outcome) = report.outcomes.last() {
                on_exit(outcome);
            }
        }
    }

    debug!(waits, launched = handles.len(), "collection finished");
    report.finalize()
}
