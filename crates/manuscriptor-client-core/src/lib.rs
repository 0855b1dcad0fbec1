//! Client core for the manuscriptor web shell.
//!
//! Everything here is target independent: the browser shell supplies a
//! [`request::Transport`] and a [`dispatch::ResponseHandler`] and the rest is
//! plain data in, plain data out.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod request;
pub mod session;
pub mod view;

pub use config::{BootstrapConfig, ShellConfig, websocket_url};
pub use dispatch::{DispatchOutcome, Diagnostic, Dispatcher, ResponseHandler};
pub use error::{ClientError, Result};
pub use protocol::{
    BatchSummary, FetchRequest, FetchTarget, FilterDescriptor, RequestEnvelope, RequestKind,
    ResponseEnvelope, ResponseKind, ScriptSummary, StatsMap,
};
pub use request::{RequestBuilder, ShellClient, Transport};
pub use session::{ClientSession, DEFAULT_CLIENT_ID_LENGTH, ID_ALPHABET, make_id};
pub use view::{ListTarget, ListView, ViewRow, toggle_glyph};
