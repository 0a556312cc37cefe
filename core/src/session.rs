//! The stateful side of the client: an authenticated session that performs
//! the HTTP round-trips.
//!
//! # Design
//! `Session` wraps a stateless `FreedcampClient` together with a `Transport`
//! and a `Clock`. The user id is resolved once in the constructor; a session
//! that exists is always authenticated. Pagination is exposed two ways:
//! `scan` takes the starting cursor explicitly and returns where it stopped,
//! while `next_task` threads the session's own cursor through `scan`.

use std::cell::Cell;

use tracing::{debug, info, warn};

use crate::client::{find_in_page, FreedcampClient};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::signing::{Clock, SystemClock};
use crate::task::Task;
use crate::transport::{Transport, UreqTransport};
use crate::types::{PageCursor, TaskRecord, TaskUpdate};

/// Result of scanning the task listing for a list name.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// `cursor` is the offset of the page the match was on.
    Found {
        record: TaskRecord,
        cursor: PageCursor,
    },
    /// No page matched; `cursor` is the offset of the last page requested.
    Exhausted { cursor: PageCursor },
}

pub struct Session<T = UreqTransport, C = SystemClock> {
    client: FreedcampClient,
    transport: T,
    clock: C,
    user_id: u64,
    cursor: Cell<PageCursor>,
}

impl Session {
    /// Connect over HTTP using the system clock.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new(), SystemClock)
    }
}

impl<T: Transport, C: Clock> Session<T, C> {
    /// Resolve the authenticated user and build the session.
    ///
    /// Fails with `ApiError::Config` before any request if the configuration
    /// is unusable, and with `ApiError::Authentication` if the service rejects
    /// the credentials.
    pub fn with_transport(config: ClientConfig, transport: T, clock: C) -> Result<Self> {
        config.validate()?;
        let client = FreedcampClient::new(&config);
        let request = client.build_current_session(clock.unix_timestamp())?;
        let user_id = client
            .parse_current_session(transport.execute(&request)?)
            .inspect_err(|e| warn!(error = %e, "could not resolve current user"))?;
        info!(user_id, project_id = client.project_id(), "session established");

        Ok(Self {
            client,
            transport,
            clock,
            user_id,
            cursor: Cell::new(PageCursor::start()),
        })
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    /// Where the next `next_task` call starts scanning.
    pub fn cursor(&self) -> PageCursor {
        self.cursor.get()
    }

    /// Page through the listing from `start` until a task in `list_name`
    /// turns up or the server reports no more pages.
    pub fn scan(&self, list_name: &str, start: PageCursor) -> Result<ScanOutcome> {
        let page_size = self.client.page_size();
        let mut cursor = start;
        loop {
            debug!(list_name, offset = cursor.offset(), "requesting task page");
            let request = self
                .client
                .build_list_tasks(cursor, self.clock.unix_timestamp())?;
            let page = self.client.parse_list_tasks(self.round_trip(&request)?)?;
            let has_more = page.has_more;
            debug!(
                offset = cursor.offset(),
                count = page.tasks.len(),
                has_more,
                "received task page"
            );

            if let Some(record) = find_in_page(page.tasks, list_name) {
                info!(task_id = record.id, list_name, offset = cursor.offset(), "found task");
                return Ok(ScanOutcome::Found { record, cursor });
            }
            if !has_more {
                debug!(list_name, offset = cursor.offset(), "no task in list");
                return Ok(ScanOutcome::Exhausted { cursor });
            }
            let next = cursor.advance(page_size);
            if next <= cursor {
                return Err(ApiError::Config(format!(
                    "listing offset cannot advance past {}",
                    cursor.offset()
                )));
            }
            cursor = next;
        }
    }

    /// Next task in `list_name`, continuing from the session's cursor.
    ///
    /// The cursor is left on the page where the scan stopped. It is not moved
    /// past a match, so asking again returns the same task until its list
    /// changes remotely.
    pub fn next_task(&self, list_name: &str) -> Result<Option<Task<'_, T, C>>> {
        match self.scan(list_name, self.cursor.get())? {
            ScanOutcome::Found { record, cursor } => {
                self.cursor.set(cursor);
                Ok(Some(Task::new(record, self)))
            }
            ScanOutcome::Exhausted { cursor } => {
                self.cursor.set(cursor);
                Ok(None)
            }
        }
    }

    pub fn update_task(&self, task_id: u64, update: &TaskUpdate) -> Result<()> {
        let request = self
            .client
            .build_update_task(task_id, update, self.clock.unix_timestamp())?;
        self.client
            .parse_update_task(self.round_trip(&request)?)
            .inspect_err(|e| warn!(task_id, error = %e, "task update rejected"))?;
        info!(task_id, ?update, "task updated");
        Ok(())
    }

    pub fn comment_task(&self, task_id: u64, comment: &str) -> Result<()> {
        let request = self
            .client
            .build_comment_task(task_id, comment, self.clock.unix_timestamp())?;
        self.client
            .parse_comment_task(self.round_trip(&request)?)
            .inspect_err(|e| warn!(task_id, error = %e, "comment rejected"))?;
        info!(task_id, "comment added");
        Ok(())
    }

    fn round_trip(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.transport.execute(request)
    }
}
