//! Failure reporting and user-facing notices.
//!
//! Every failure in every flow goes through a [`Reporter`], including the
//! ones that are not shown to the user as a notice.

use std::fmt;

use tracing::error;

use crate::error::ClientError;

/// Which flow a failure or notice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    CreateMapping,
    ListMappings,
    FetchScheduler,
    ToggleScheduler,
    ForwardWebhook,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flow::CreateMapping => "create_mapping",
            Flow::ListMappings => "list_mappings",
            Flow::FetchScheduler => "fetch_scheduler",
            Flow::ToggleScheduler => "toggle_scheduler",
            Flow::ForwardWebhook => "forward_webhook",
        })
    }
}

/// Single reporting interface for failed requests.
pub trait Reporter {
    fn failure(&self, flow: Flow, error: &ClientError);
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn failure(&self, flow: Flow, e: &ClientError) {
        error!(flow = %flow, error = %e, "Request failed.");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Short-lived message shown after a request settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub flow: Flow,
    pub message: &'static str,
}

impl Notice {
    pub fn success(flow: Flow, message: &'static str) -> Self {
        Self {
            kind: NoticeKind::Success,
            flow,
            message,
        }
    }

    pub fn error(flow: Flow, message: &'static str) -> Self {
        Self {
            kind: NoticeKind::Error,
            flow,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}
