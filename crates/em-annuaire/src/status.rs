use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Neutral,
    Success,
    Error,
}

/// A human-readable progress message emitted at each search milestone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Status {
    pub message: String,
    pub severity: Severity,
}

impl Status {
    pub fn neutral(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Neutral,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Receiver of status updates.
pub trait StatusSink: Send + Sync {
    fn emit(&self, status: Status);
}

impl StatusSink for UnboundedSender<Status> {
    fn emit(&self, status: Status) {
        // the receiving side going away just means nobody is watching anymore
        let _ = self.send(status);
    }
}

/// Writes status updates to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn emit(&self, status: Status) {
        match status.severity {
            Severity::Error => error!(status = %status.message),
            _ => info!(status = %status.message),
        }
    }
}
