//! Scheduler flag toggle.
//!
//! The controller mirrors one remote boolean. A toggle sends the negation of
//! the last known state and then adopts whatever the server answers, even if
//! that differs from what was asked for.
//!
//! Requests are not serialized: every click is one request. Each request is
//! tagged with a number from a [`RequestSequence`], and a response is only
//! applied when its number is higher than anything applied before, so a slow
//! response can never overwrite the result of a later click.

use tracing::debug;

use crate::api::MapperApi;
use crate::error::ClientError;
use crate::model::SchedulerFlag;
use crate::report::{Flow, Notice, Reporter};

pub const LABEL_ENABLED: &str = "Enabled";
pub const LABEL_DISABLED: &str = "Disabled";
pub const STATUS_UNAVAILABLE: &str = "Scheduler status unavailable";
pub const TOGGLE_FAILED: &str = "Failed to update scheduler.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagState {
    Enabled,
    Disabled,
}

impl FlagState {
    pub fn label(&self) -> &'static str {
        match self {
            FlagState::Enabled => LABEL_ENABLED,
            FlagState::Disabled => LABEL_DISABLED,
        }
    }
}

impl From<bool> for FlagState {
    fn from(enabled: bool) -> Self {
        if enabled {
            FlagState::Enabled
        } else {
            FlagState::Disabled
        }
    }
}

/// Monotonic request counter. The first number handed out is 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSequence {
    last: u64,
}

impl RequestSequence {
    pub fn next(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}

/// A toggle about to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleRequest {
    pub seq: u64,
    pub task_name: String,
    /// Desired value: the negation of the state known when it was built.
    pub enabled: bool,
}

/// What happened to a settled response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Applied,
    /// A newer response was already applied; this one was dropped.
    Stale,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagController {
    flag: SchedulerFlag,
    sequence: RequestSequence,
    applied: u64,
    last_error: Option<String>,
    notice: Option<Notice>,
}

impl FlagController {
    /// Start in the default state: disabled, nothing fetched yet.
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            flag: SchedulerFlag::disabled(task_name),
            sequence: RequestSequence::default(),
            applied: 0,
            last_error: None,
            notice: None,
        }
    }

    pub fn flag(&self) -> &SchedulerFlag {
        &self.flag
    }

    pub fn state(&self) -> FlagState {
        self.flag.enabled.into()
    }

    pub fn label(&self) -> &'static str {
        self.state().label()
    }

    /// Whether any server response has been applied yet.
    pub fn is_synced(&self) -> bool {
        self.applied > 0
    }

    /// Why the initial fetch failed, until a later response succeeds.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Allocate the sequence number for a fetch from the internal counter.
    pub fn begin_fetch(&mut self) -> u64 {
        self.sequence.next()
    }

    /// Build the next toggle using the internal counter.
    pub fn begin_toggle(&mut self) -> ToggleRequest {
        let seq = self.sequence.next();
        self.toggle_request(seq)
    }

    /// Build a toggle with a sequence number from an external counter.
    ///
    /// UIs that keep the controller in immutable state hold their own
    /// [`RequestSequence`] and call this instead of [`Self::begin_toggle`].
    pub fn toggle_request(&self, seq: u64) -> ToggleRequest {
        ToggleRequest {
            seq,
            task_name: self.flag.task_name.clone(),
            enabled: !self.flag.enabled,
        }
    }

    /// Apply the settled fetch with sequence number `seq`.
    ///
    /// A failure leaves the flag at its current value. It is reported and
    /// kept as [`Self::last_error`] but does not raise a notice.
    pub fn settle_fetch(
        &mut self,
        seq: u64,
        result: Result<SchedulerFlag, ClientError>,
        reporter: &dyn Reporter,
    ) -> Settled {
        match result {
            Ok(flag) => self.apply(seq, flag),
            Err(e) => {
                reporter.failure(Flow::FetchScheduler, &e);
                if seq > self.applied {
                    self.last_error = Some(e.to_string());
                }
                Settled::Failed
            }
        }
    }

    /// Apply the settled toggle with sequence number `seq`.
    ///
    /// The server's answer replaces local state verbatim. A failure is always
    /// reported, but only raises a notice if no newer response was applied.
    pub fn settle_toggle(
        &mut self,
        seq: u64,
        result: Result<SchedulerFlag, ClientError>,
        reporter: &dyn Reporter,
    ) -> Settled {
        match result {
            Ok(flag) => self.apply(seq, flag),
            Err(e) => {
                reporter.failure(Flow::ToggleScheduler, &e);
                if seq > self.applied {
                    self.notice = Some(Notice::error(Flow::ToggleScheduler, TOGGLE_FAILED));
                }
                Settled::Failed
            }
        }
    }

    fn apply(&mut self, seq: u64, flag: SchedulerFlag) -> Settled {
        if seq <= self.applied {
            debug!(seq, applied = self.applied, "Dropping stale scheduler response.");
            return Settled::Stale;
        }
        self.applied = seq;
        self.flag = flag;
        self.last_error = None;
        Settled::Applied
    }

    /// Fetch the flag and fold the response in.
    pub async fn fetch<A>(&mut self, api: &A, reporter: &dyn Reporter) -> Settled
    where
        A: MapperApi + ?Sized,
    {
        let seq = self.begin_fetch();
        let result = api.get_scheduler(&self.flag.task_name).await;
        self.settle_fetch(seq, result, reporter)
    }

    /// Send one toggle and fold the response in.
    pub async fn toggle<A>(&mut self, api: &A, reporter: &dyn Reporter) -> (ToggleRequest, Settled)
    where
        A: MapperApi + ?Sized,
    {
        let request = self.begin_toggle();
        let result = api
            .set_scheduler(&request.task_name, request.enabled)
            .await;
        let settled = self.settle_toggle(request.seq, result, reporter);
        (request, settled)
    }
}
