//! Exit notifications from worker runtimes to the collector.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fmt;
use std::process::ExitStatus;

/// Identifier a runtime assigns to each worker it launches.
pub type HandleId = u64;

/// How a worker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitClassification {
    /// Exited with status 0.
    NormalSuccess,
    /// Exited with a nonzero status.
    NormalFailure(i32),
    /// Killed, crashed, or ended in a way that carries no exit status.
    AbnormalTermination(String),
}

impl ExitClassification {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => ExitClassification::NormalSuccess,
            Some(code) => ExitClassification::NormalFailure(code),
            None => ExitClassification::AbnormalTermination(describe_signal(status)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitClassification::NormalSuccess)
    }
}

impl fmt::Display for ExitClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitClassification::NormalSuccess => write!(f, "finished normally"),
            ExitClassification::NormalFailure(code) => write!(f, "failed with exit code {}", code),
            ExitClassification::AbnormalTermination(cause) => {
                write!(f, "terminated abnormally ({})", cause)
            }
        }
    }
}

#[cfg(unix)]
fn describe_signal(status: ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match (status.signal(), status.stopped_signal()) {
        (Some(sig), _) if status.core_dumped() => format!("signal {}, core dumped", sig),
        (Some(sig), _) => format!("signal {}", sig),
        (None, Some(sig)) => format!("stopped by signal {}", sig),
        (None, None) => format!("unrecognised status {:?}", status),
    }
}

#[cfg(not(unix))]
fn describe_signal(status: ExitStatus) -> String {
    format!("unrecognised status {:?}", status)
}

/// Terminal state of one launched worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitEvent {
    pub handle: HandleId,
    pub exit: ExitClassification,
}

/// Sending half, cloned into every supervising thread.
pub type ExitSender = Sender<ExitEvent>;
/// Receiving half, owned by the runtime and drained by the collector.
pub type ExitReceiver = Receiver<ExitEvent>;

/// Create the exit channel. Unbounded so supervisors never block on send.
pub fn exit_channel() -> (ExitSender, ExitReceiver) {
    unbounded()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_events_arrive_in_send_order() {
        let (tx, rx) = exit_channel();
        let workers: Vec<ExitSender> = (0..3).map(|_| tx.clone()).collect();

        for (i, sender) in workers.iter().enumerate().rev() {
            sender
                .send(ExitEvent {
                    handle: i as HandleId,
                    exit: ExitClassification::NormalSuccess,
                })
                .unwrap();
        }

        let handles: Vec<HandleId> = rx.try_iter().map(|e| e.handle).collect();
        assert_eq!(handles, vec![2, 1, 0]);
    }

    #[test]
    fn test_classification_display() {
        assert_eq!(
            ExitClassification::NormalFailure(3).to_string(),
            "failed with exit code 3"
        );
        assert!(ExitClassification::NormalSuccess.is_success());
        assert!(!ExitClassification::AbnormalTermination("signal 9".into()).is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_real_statuses() {
        use std::os::unix::process::ExitStatusExt;

        // Raw wait statuses: exit code in the high byte, signal in the low bits
        assert_eq!(
            ExitClassification::from_status(ExitStatus::from_raw(0)),
            ExitClassification::NormalSuccess
        );
        assert_eq!(
            ExitClassification::from_status(ExitStatus::from_raw(2 << 8)),
            ExitClassification::NormalFailure(2)
        );
        assert_eq!(
            ExitClassification::from_status(ExitStatus::from_raw(9)),
            ExitClassification::AbnormalTermination("signal 9".to_string())
        );
    }
}
