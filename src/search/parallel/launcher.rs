//! Starting workers.
//!
//! A [`WorkerRuntime`] starts one worker per [`WorkerJob`] and later reports
//! each worker's terminal state through [`WorkerRuntime::wait_any`]. Two
//! runtimes are provided: [`ProcessRuntime`] runs the `search-worker`
//! executable, [`ThreadRuntime`] runs the same scan loop on threads.

use crate::error::LaunchError;
use crate::search::parallel::channel::{
    exit_channel, ExitClassification, ExitEvent, ExitReceiver, ExitSender, HandleId,
};
use crate::search::partition::WorkerAssignment;
use crate::search::worker::{scan_range, WorkerJob};
use crossbeam_channel::bounded;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use tracing::{debug, error};

/// A launched worker. Tied to exactly one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerHandle {
    id: HandleId,
    pid: Option<u32>,
    assignment: WorkerAssignment,
}

impl WorkerHandle {
    pub fn new(id: HandleId, assignment: WorkerAssignment) -> Self {
        Self {
            id,
            pid: None,
            assignment,
        }
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    /// OS process id, for workers that run as processes.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn worker_id(&self) -> usize {
        self.assignment.worker_id
    }

    pub fn assignment(&self) -> &WorkerAssignment {
        &self.assignment
    }
}

/// Something that can run workers concurrently.
pub trait WorkerRuntime {
    /// Start a worker for `job` without waiting for it.
    fn launch(&mut self, job: &WorkerJob) -> Result<WorkerHandle, LaunchError>;

    /// Block until some launched worker terminates.
    ///
    /// Returns `None` once no launched worker is left outstanding.
    fn wait_any(&mut self) -> Option<ExitEvent>;
}

/// Runs each worker as a separate OS process.
///
/// Every child is owned by a supervising thread that waits on it, so a
/// terminated worker is reaped as soon as it exits. Handles are numbered by
/// the runtime rather than by PID because an early reaped PID can be reused
/// by a later launch.
pub struct ProcessRuntime {
    program: PathBuf,
    events_tx: ExitSender,
    events_rx: ExitReceiver,
    next_handle: HandleId,
    outstanding: usize,
}

impl ProcessRuntime {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let (events_tx, events_rx) = exit_channel();
        Self {
            program: program.into(),
            events_tx,
            events_rx,
            next_handle: 1,
            outstanding: 0,
        }
    }

    fn command(&self, job: &WorkerJob) -> Command {
        let range = job.assignment.range;
        let mut cmd = Command::new(&self.program);
        cmd.arg("--result-file")
            .arg(&job.result_path)
            .arg("--claim-check-interval")
            .arg(job.claim_check_interval.to_string())
            .arg("--")
            .arg(job.assignment.worker_id.to_string())
            .arg(range.start.to_string())
            .arg(range.end.to_string())
            .arg(job.candidate_length.to_string())
            .arg(&job.alphabet)
            .arg(job.target.as_str())
            .stdin(Stdio::null());
        cmd
    }
}

impl WorkerRuntime for ProcessRuntime {
    fn launch(&mut self, job: &WorkerJob) -> Result<WorkerHandle, LaunchError> {
        let worker_id = job.assignment.worker_id;
        let handle = self.next_handle;

        // The supervisor is started first so a failed thread spawn never
        // leaves a child behind without anyone to reap it.
        let (child_tx, child_rx) = bounded::<Child>(1);
        let events = self.events_tx.clone();
        thread::Builder::new()
            .name(format!("supervise-worker-{}", worker_id))
            .spawn(move || {
                let Ok(mut child) = child_rx.recv() else {
                    return;
                };
                let exit = match child.wait() {
                    Ok(status) => ExitClassification::from_status(status),
                    Err(e) => ExitClassification::AbnormalTermination(format!("wait failed: {}", e)),
                };
                let _ = events.send(ExitEvent { handle, exit });
            })
            .map_err(|source| LaunchError::Supervisor { worker_id, source })?;

        let child = self
            .command(job)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                worker_id,
                program: self.program.clone(),
                source,
            })?;
        let pid = child.id();

        if let Err(returned) = child_tx.send(child) {
            let mut child = returned.into_inner();
            let _ = child.kill();
            let _ = child.wait();
            return Err(LaunchError::Supervisor {
                worker_id,
                source: io::Error::new(io::ErrorKind::Other, "supervising thread exited early"),
            });
        }

        self.next_handle += 1;
        self.outstanding += 1;
        debug!(worker_id, pid, "worker process started");
        Ok(WorkerHandle::new(handle, job.assignment).with_pid(pid))
    }

    fn wait_any(&mut self) -> Option<ExitEvent> {
        if self.outstanding == 0 {
            return None;
        }
        let event = self.events_rx.recv().ok()?;
        self.outstanding -= 1;
        Some(event)
    }
}

/// Runs each worker on its own thread inside the current process.
///
/// A worker that returns an error is reported as exit code 1; a worker that
/// panics is reported as an abnormal termination.
pub struct ThreadRuntime {
    events_tx: ExitSender,
    events_rx: ExitReceiver,
    next_handle: HandleId,
    outstanding: usize,
}

impl Default for ThreadRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadRuntime {
    pub fn new() -> Self {
        let (events_tx, events_rx) = exit_channel();
        Self {
            events_tx,
            events_rx,
            next_handle: 1,
            outstanding: 0,
        }
    }
}

impl WorkerRuntime for ThreadRuntime {
    fn launch(&mut self, job: &WorkerJob) -> Result<WorkerHandle, LaunchError> {
        let worker_id = job.assignment.worker_id;
        let handle = self.next_handle;
        let assignment = job.assignment;
        let events = self.events_tx.clone();
        let job = job.clone();

        thread::Builder::new()
            .name(format!("worker-{}", worker_id))
            .spawn(move || {
                let exit = match panic::catch_unwind(AssertUnwindSafe(|| scan_range(&job))) {
                    Ok(Ok(summary)) => {
                        debug!(
                            worker_id,
                            checked = summary.candidates_checked,
                            found = summary.found.is_some(),
                            "worker thread finished"
                        );
                        ExitClassification::NormalSuccess
                    }
                    Ok(Err(e)) => {
                        error!(worker_id, error = %e, "worker thread failed");
                        ExitClassification::NormalFailure(1)
                    }
                    Err(payload) => ExitClassification::AbnormalTermination(panic_message(payload)),
                };
                let _ = events.send(ExitEvent { handle, exit });
            })
            .map_err(|source| LaunchError::Supervisor { worker_id, source })?;

        self.next_handle += 1;
        self.outstanding += 1;
        Ok(WorkerHandle::new(handle, assignment))
    }

    fn wait_any(&mut self) -> Option<ExitEvent> {
        if self.outstanding == 0 {
            return None;
        }
        let event = self.events_rx.recv().ok()?;
        self.outstanding -= 1;
        Some(event)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic".to_string()
    }
}
