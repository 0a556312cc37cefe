//! Blocking client for the Freedcamp task API.
//!
//! # Overview
//! Finds the next task in a named task list and drives it through its
//! lifecycle: start, complete, fail, comment. Every request is signed with an
//! HMAC-SHA1 of the API key and the current timestamp.
//!
//! # Design
//! - `FreedcampClient` is stateless: `build_*` produces a signed
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`. No I/O.
//! - `Session` owns a client, a `Transport` and a `Clock`, resolves the user
//!   id once, and runs the paginated scan.
//! - `Task` borrows the session and delegates every mutation to it.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//!
//! ```no_run
//! use freedcamp_core::{ClientConfig, Session};
//!
//! let session = Session::connect(ClientConfig::from_env()?)?;
//! if let Some(task) = session.next_task("Ready")? {
//!     task.start()?;
//!     task.complete()?;
//! }
//! # Ok::<(), freedcamp_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod signing;
pub mod task;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::FreedcampClient;
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{ScanOutcome, Session};
pub use signing::{sign, Clock, Credentials, Signature, SystemClock};
pub use task::Task;
pub use transport::{Transport, UreqTransport};
pub use types::{
    CommentPayload, PageCursor, Priority, TaskPage, TaskRecord, TaskStatus, TaskUpdate,
};
