use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ConnectionPhase {
    Booting,
    Connecting,
    Open,
    Closed,
    Error,
}

/// Snapshot exposed to the page through `shell_diagnostics_json`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ShellDiagnostics {
    pub(crate) phase: ConnectionPhase,
    pub(crate) client_id: Option<String>,
    pub(crate) socket_url: Option<String>,
    pub(crate) frames_sent: u64,
    pub(crate) frames_received: u64,
    pub(crate) renders: u64,
    pub(crate) last_error: Option<String>,
}

impl Default for ShellDiagnostics {
    fn default() -> Self {
        Self {
            phase: ConnectionPhase::Booting,
            client_id: None,
            socket_url: None,
            frames_sent: 0,
            frames_received: 0,
            renders: 0,
            last_error: None,
        }
    }
}

#[cfg_attr(test, allow(dead_code))]
impl ShellDiagnostics {
    pub(crate) fn set_phase(&mut self, phase: ConnectionPhase) {
        self.phase = phase;
        if phase != ConnectionPhase::Error {
            self.last_error = None;
        }
    }

    pub(crate) fn record_error(&mut self, error: &str) {
        self.phase = ConnectionPhase::Error;
        self.last_error = Some(error.to_string());
    }

    /// Records where a socket ended up once it stopped connecting. Returns
    /// whether it is open; a refused socket also stops connecting, closed.
    pub(crate) fn record_settled(&mut self, open: bool) -> bool {
        if open {
            self.set_phase(ConnectionPhase::Open);
        } else {
            self.record_error("websocket failed to open");
        }
        open
    }

    /// End of the connection. An earlier error stays visible.
    pub(crate) fn record_closed(&mut self) {
        if self.phase != ConnectionPhase::Error {
            self.set_phase(ConnectionPhase::Closed);
        }
    }

    pub(crate) fn record_sent(&mut self) {
        self.frames_sent = self.frames_sent.saturating_add(1);
    }

    pub(crate) fn record_received(&mut self) {
        self.frames_received = self.frames_received.saturating_add(1);
    }

    pub(crate) fn record_render(&mut self) {
        self.renders = self.renders.saturating_add(1);
    }

    pub(crate) fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            "{\"phase\":\"error\",\"detail\":\"diagnostics serialization failed\"}".to_string()
        })
    }
}

/// Whether boot has to wait for the `load` event, given `document.readyState`.
#[cfg_attr(test, allow(dead_code))]
pub(crate) fn boot_waits_for_load(ready_state: &str) -> bool {
    ready_state != "complete"
}

/// Event handlers owned by the rows currently mounted in each list. A list's
/// handlers are released only together with its rows.
pub(crate) struct MountedHandlers<K, H> {
    by_list: HashMap<K, Vec<H>>,
}

impl<K, H> Default for MountedHandlers<K, H> {
    fn default() -> Self {
        Self {
            by_list: HashMap::new(),
        }
    }
}

#[cfg_attr(test, allow(dead_code))]
impl<K: Eq + Hash, H> MountedHandlers<K, H> {
    /// Installs the handlers of freshly mounted rows, dropping the previous ones.
    pub(crate) fn replace(&mut self, list: K, handlers: Vec<H>) {
        self.by_list.insert(list, handlers);
    }

    /// Drops a list's handlers after its rows were removed.
    pub(crate) fn clear(&mut self, list: &K) {
        self.by_list.remove(list);
    }

    pub(crate) fn count(&self, list: &K) -> usize {
        self.by_list.get(list).map_or(0, Vec::len)
    }
}
