//! Handle for one remote task.

use crate::error::Result;
use crate::session::Session;
use crate::signing::{Clock, SystemClock};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Priority, TaskRecord, TaskStatus, TaskUpdate};

/// A task returned by [`Session::next_task`].
///
/// Every lifecycle method is a single delegated call on the session that
/// produced the handle; the handle itself holds no credentials or state beyond
/// the record it was listed with.
pub struct Task<'a, T = UreqTransport, C = SystemClock> {
    record: TaskRecord,
    session: &'a Session<T, C>,
}

impl<'a, T: Transport, C: Clock> Task<'a, T, C> {
    pub(crate) fn new(record: TaskRecord, session: &'a Session<T, C>) -> Self {
        Self { record, session }
    }

    pub fn id(&self) -> u64 {
        self.record.id
    }

    /// The record as listed; not refreshed after mutations.
    pub fn record(&self) -> &TaskRecord {
        &self.record
    }

    /// Assign the task to the session user and mark it in progress.
    pub fn start(&self) -> Result<()> {
        self.session.update_task(
            self.id(),
            &TaskUpdate {
                assigned_to_id: Some(self.session.user_id()),
                status: Some(TaskStatus::InProgress),
                ..TaskUpdate::default()
            },
        )
    }

    pub fn complete(&self) -> Result<()> {
        self.session.update_task(
            self.id(),
            &TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..TaskUpdate::default()
            },
        )
    }

    pub fn comment(&self, text: &str) -> Result<()> {
        self.session.comment_task(self.id(), text)
    }

    /// Flag the task as failed by raising it to high priority, then attach
    /// `comment` if one is given and non-empty.
    ///
    /// The comment is only sent once the priority update has succeeded.
    pub fn fail(&self, comment: Option<&str>) -> Result<()> {
        self.session.update_task(
            self.id(),
            &TaskUpdate {
                priority: Some(Priority::High),
                ..TaskUpdate::default()
            },
        )?;
        match comment {
            Some(text) if !text.is_empty() => self.comment(text),
            _ => Ok(()),
        }
    }
}
