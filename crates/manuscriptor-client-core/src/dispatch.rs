//! Routing of inbound frames to the list renderers.
//!
//! Each frame is handled on its own: the message type alone decides what
//! happens, there is no pending-request table to match replies against.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::protocol::{
    BatchSummary, FilterDescriptor, ListItem, ResponseEnvelope, ResponseKind, ScriptSummary,
    StatsMap, decode_filters, decode_items, decode_stats,
};
use crate::view::{ListTarget, ListView};

/// Something worth logging about a frame that did not (or could not) update
/// a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Valid frame of a type the page has no view for yet.
    Received {
        kind: ResponseKind,
        envelope: ResponseEnvelope,
    },
    ServerError { error: Option<String> },
    UnknownMessage { message_type: String },
    MalformedEnvelope { error: String },
    MalformedPayload { kind: ResponseKind, error: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received { kind, envelope } => {
                write!(f, "{} {:?}", kind.as_str(), envelope)
            }
            Self::ServerError { error } => {
                write!(f, "SERVER ERROR {}", error.as_deref().unwrap_or("(no detail)"))
            }
            Self::UnknownMessage { message_type } => {
                write!(f, "unknown message from server: {message_type}")
            }
            Self::MalformedEnvelope { error } => write!(f, "malformed frame: {error}"),
            Self::MalformedPayload { kind, error } => {
                write!(f, "malformed {} payload: {error}", kind.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Rendered(ListTarget),
    Logged,
    Ignored,
}

/// Receiver of dispatch results. Implementors only need `render` and
/// `diagnostic`; the per-list updates build the view and hand it to `render`.
pub trait ResponseHandler {
    fn render(&mut self, view: ListView);

    fn diagnostic(&mut self, diagnostic: &Diagnostic);

    fn update_stats(&mut self, stats: &StatsMap) {
        self.render(ListView::stats(stats));
    }

    fn update_filters(&mut self, filters: &[FilterDescriptor]) {
        self.render(ListView::filters(filters));
    }

    fn update_batches(&mut self, batches: &[ListItem<BatchSummary>]) {
        self.render(ListView::batches(batches));
    }

    fn update_scripts(&mut self, scripts: &[ListItem<ScriptSummary>]) {
        self.render(ListView::scripts(scripts));
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher;

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Handles one raw frame. Never fails: bad input becomes a diagnostic so
    /// the next frame is still processed.
    pub fn dispatch<H: ResponseHandler + ?Sized>(
        &self,
        raw: &str,
        handler: &mut H,
    ) -> DispatchOutcome {
        let envelope = match ResponseEnvelope::from_wire(raw) {
            Ok(envelope) => envelope,
            Err(error) => {
                return report(
                    handler,
                    Diagnostic::MalformedEnvelope {
                        error: error.to_string(),
                    },
                );
            }
        };
        let Some(kind) = envelope.kind() else {
            return report(
                handler,
                Diagnostic::UnknownMessage {
                    message_type: envelope.message_type,
                },
            );
        };
        if kind == ResponseKind::KeepAlive {
            return DispatchOutcome::Ignored;
        }
        debug!(message_type = kind.as_str(), "dispatching response");

        match kind {
            ResponseKind::DbStats => render_payload(kind, &envelope, handler, |payload, handler| {
                handler.update_stats(&decode_stats(payload)?);
                Ok(ListTarget::Stats)
            }),
            ResponseKind::Filters => render_payload(kind, &envelope, handler, |payload, handler| {
                handler.update_filters(&decode_filters(payload)?);
                Ok(ListTarget::Filters)
            }),
            ResponseKind::Batches => render_payload(kind, &envelope, handler, |payload, handler| {
                let batches: Vec<ListItem<BatchSummary>> = decode_items(payload)?;
                handler.update_batches(&batches);
                Ok(ListTarget::Batches)
            }),
            ResponseKind::Scripts => render_payload(kind, &envelope, handler, |payload, handler| {
                let scripts: Vec<ListItem<ScriptSummary>> = decode_items(payload)?;
                handler.update_scripts(&scripts);
                Ok(ListTarget::Scripts)
            }),
            ResponseKind::FetchedScript | ResponseKind::FetchedBatch | ResponseKind::BlockedSents => {
                report(handler, Diagnostic::Received { kind, envelope })
            }
            ResponseKind::ServerError => report(
                handler,
                Diagnostic::ServerError {
                    error: envelope.error().map(str::to_string),
                },
            ),
            ResponseKind::KeepAlive => DispatchOutcome::Ignored,
        }
    }
}

fn render_payload<H, F>(
    kind: ResponseKind,
    envelope: &ResponseEnvelope,
    handler: &mut H,
    apply: F,
) -> DispatchOutcome
where
    H: ResponseHandler + ?Sized,
    F: FnOnce(&str, &mut H) -> Result<ListTarget>,
{
    let result = envelope
        .payload()
        .ok_or_else(|| ClientError::MissingPayload(kind.as_str().to_string()))
        .and_then(|payload| apply(payload, handler));
    match result {
        Ok(target) => DispatchOutcome::Rendered(target),
        Err(error) => report(
            handler,
            Diagnostic::MalformedPayload {
                kind,
                error: error.to_string(),
            },
        ),
    }
}

fn report<H: ResponseHandler + ?Sized>(
    handler: &mut H,
    diagnostic: Diagnostic,
) -> DispatchOutcome {
    match &diagnostic {
        Diagnostic::Received { .. } => info!("{diagnostic}"),
        _ => warn!("{diagnostic}"),
    }
    handler.diagnostic(&diagnostic);
    DispatchOutcome::Logged
}
