use std::fmt::Display;

use tracing::debug;

use crate::config::BootstrapConfig;
use crate::error::{ClientError, Result};
use crate::protocol::{FetchRequest, FetchTarget, RequestEnvelope, RequestKind, encode_payload};
use crate::session::ClientSession;

/// Outgoing half of the connection. Sends are fire-and-forget: nothing waits
/// for or matches a reply.
pub trait Transport {
    type Error: Display;

    fn send_text(&self, frame: String) -> std::result::Result<(), Self::Error>;
}

/// Builds request envelopes tagged with one session's id.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    session: &'a ClientSession,
}

impl<'a> RequestBuilder<'a> {
    #[must_use]
    pub fn new(session: &'a ClientSession) -> Self {
        Self { session }
    }

    fn bare(&self, kind: RequestKind) -> RequestEnvelope {
        RequestEnvelope {
            client_id: self.session.id().to_string(),
            message_type: kind,
            payload: None,
        }
    }

    fn with_payload(&self, kind: RequestKind, payload: String) -> RequestEnvelope {
        RequestEnvelope {
            payload: Some(payload),
            ..self.bare(kind)
        }
    }

    #[must_use]
    pub fn list_filters(&self) -> RequestEnvelope {
        self.bare(RequestKind::ListFilters)
    }

    #[must_use]
    pub fn list_batches(&self) -> RequestEnvelope {
        self.bare(RequestKind::ListBatches)
    }

    #[must_use]
    pub fn list_scripts(&self) -> RequestEnvelope {
        self.bare(RequestKind::ListScripts)
    }

    #[must_use]
    pub fn load_stats(&self) -> RequestEnvelope {
        self.bare(RequestKind::GetStats)
    }

    pub fn fetch_batch(
        &self,
        name: &str,
        page_size: u32,
        page_number: u32,
    ) -> Result<RequestEnvelope> {
        let payload = encode_payload(&FetchRequest {
            name: name.to_string(),
            target: FetchTarget::Batch,
            page_size,
            page_number,
        })?;
        Ok(self.with_payload(RequestKind::FetchBatch, payload))
    }

    pub fn fetch_script(
        &self,
        name: &str,
        page_size: u32,
        page_number: u32,
    ) -> Result<RequestEnvelope> {
        let payload = encode_payload(&FetchRequest {
            name: name.to_string(),
            target: FetchTarget::Script,
            page_size,
            page_number,
        })?;
        Ok(self.with_payload(RequestKind::FetchScript, payload))
    }

    pub fn block_sents(&self, ids: &[i64]) -> Result<RequestEnvelope> {
        let payload = encode_payload(ids)?;
        Ok(self.with_payload(RequestKind::BlockSents, payload))
    }
}

/// Session plus connection: the seven request operations the page uses.
#[derive(Debug)]
pub struct ShellClient<T> {
    session: ClientSession,
    transport: T,
}

impl<T: Transport> ShellClient<T> {
    pub fn new(session: ClientSession, transport: T) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn requests(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.session)
    }

    pub fn send(&self, envelope: &RequestEnvelope) -> Result<()> {
        let frame = envelope.to_wire()?;
        debug!(message_type = envelope.message_type.as_str(), "sending request");
        self.transport
            .send_text(frame)
            .map_err(|error| ClientError::Transport(error.to_string()))
    }

    pub fn list_filters(&self) -> Result<()> {
        self.send(&self.requests().list_filters())
    }

    pub fn list_batches(&self) -> Result<()> {
        self.send(&self.requests().list_batches())
    }

    pub fn list_scripts(&self) -> Result<()> {
        self.send(&self.requests().list_scripts())
    }

    pub fn load_stats(&self) -> Result<()> {
        self.send(&self.requests().load_stats())
    }

    pub fn fetch_batch(&self, name: &str, page_size: u32, page_number: u32) -> Result<()> {
        self.send(&self.requests().fetch_batch(name, page_size, page_number)?)
    }

    pub fn fetch_script(&self, name: &str, page_size: u32, page_number: u32) -> Result<()> {
        self.send(&self.requests().fetch_script(name, page_size, page_number)?)
    }

    pub fn block_sents(&self, ids: &[i64]) -> Result<()> {
        self.send(&self.requests().block_sents(ids)?)
    }

    /// Initial request set, in page order: filters, batches, scripts, then the
    /// example batch and script fetches.
    pub fn bootstrap(&self, config: &BootstrapConfig) -> Result<()> {
        self.list_filters()?;
        self.list_batches()?;
        self.list_scripts()?;
        if config.fetch_examples {
            self.fetch_batch(&config.example_batch, config.page_size, config.page_number)?;
            self.fetch_script(&config.example_script, config.page_size, config.page_number)?;
        }
        Ok(())
    }
}
