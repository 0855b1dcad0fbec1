use super::*;

/// Client-side transport: frames queue on an unbounded channel that the
/// writer task drains into the socket once it is open.
pub(super) struct ChannelTransport {
    sender: UnboundedSender<String>,
}

impl ChannelTransport {
    pub(super) fn new(sender: UnboundedSender<String>) -> Self {
        Self { sender }
    }

    /// Refuses further frames; the writer stops once the queue drains.
    pub(super) fn close(&self) {
        self.sender.close_channel();
    }
}

impl Transport for ChannelTransport {
    type Error = String;

    fn send_text(&self, frame: String) -> Result<(), Self::Error> {
        self.sender
            .unbounded_send(frame)
            .map_err(|_| "connection is closed".to_string())
    }
}

pub(super) fn build_socket_url(config: &ShellConfig, client_id: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    let location = window.location();
    let protocol = location
        .protocol()
        .map_err(|_| "browser protocol is unavailable".to_string())?;
    let host = location
        .host()
        .map_err(|_| "browser host is unavailable".to_string())?;
    websocket_url(&protocol, &host, &config.socket_path_prefix, client_id)
        .map_err(|error| error.to_string())
}

pub(super) fn websocket_text(message: WsMessage) -> Result<String, String> {
    match message {
        WsMessage::Text(text) => Ok(text),
        WsMessage::Bytes(bytes) => String::from_utf8(bytes)
            .map_err(|error| format!("invalid websocket frame encoding: {error}")),
    }
}

/// Opens the single connection for this page. Losing it ends the session's
/// live updates; nothing reconnects.
pub(super) fn open_connection(
    url: &str,
    client: SharedClient,
    outgoing: UnboundedReceiver<String>,
    bootstrap: BootstrapConfig,
) -> Result<(), String> {
    update_diagnostics(|state| state.set_phase(ConnectionPhase::Connecting));
    let socket =
        WebSocket::open(url).map_err(|error| format!("failed to open websocket: {error}"))?;
    spawn_local(run_connection(socket, outgoing, client, bootstrap));
    Ok(())
}

async fn run_connection(
    mut socket: WebSocket,
    outgoing: UnboundedReceiver<String>,
    client: SharedClient,
    bootstrap: BootstrapConfig,
) {
    // Ready only means the socket stopped connecting; the state says whether
    // it actually opened.
    let ready = poll_fn(|cx| socket.poll_ready_unpin(cx)).await;
    let open = ready.is_ok() && matches!(socket.state(), State::Open);
    let mut settled = false;
    update_diagnostics(|state| settled = state.record_settled(open));
    if !settled {
        match ready {
            Err(error) => error!(%error, "websocket failed to open"),
            Ok(()) => error!("websocket failed to open"),
        }
        client.transport().close();
        return;
    }
    info!(client_id = client.session().id(), "websocket open");

    let (sink, stream) = socket.split();
    spawn_local(run_reader(stream, Rc::clone(&client)));
    run_writer(sink, outgoing, client, bootstrap).await;
}

async fn run_writer(
    mut sink: SplitSink<WebSocket, WsMessage>,
    mut outgoing: UnboundedReceiver<String>,
    client: SharedClient,
    bootstrap: BootstrapConfig,
) {
    if let Err(error) = client.bootstrap(&bootstrap) {
        warn!(%error, "bootstrap requests were not queued");
    }

    while let Some(frame) = outgoing.next().await {
        if let Err(error) = sink.send(WsMessage::Text(frame)).await {
            let message = format!("websocket send failed: {error}");
            warn!("{message}");
            update_diagnostics(|state| state.record_error(&message));
            break;
        }
        update_diagnostics(|state| state.record_sent());
    }
    outgoing.close();
}

async fn run_reader(mut stream: SplitStream<WebSocket>, client: SharedClient) {
    let dispatcher = Dispatcher::new();
    let mut renderer = DomRenderer;
    while let Some(message) = stream.next().await {
        let raw = match message {
            Ok(message) => websocket_text(message),
            Err(error) => Err(error.to_string()),
        };
        match raw {
            Ok(raw) => {
                update_diagnostics(|state| state.record_received());
                let outcome = dispatcher.dispatch(&raw, &mut renderer);
                debug!(?outcome, "frame handled");
            }
            Err(error) => warn!(%error, "websocket receive failed"),
        }
    }
    info!("websocket closed; list views will no longer update");
    client.transport().close();
    update_diagnostics(|state| state.record_closed());
}
