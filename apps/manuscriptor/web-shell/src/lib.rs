#![allow(clippy::needless_pass_by_value)]
#![cfg_attr(test, allow(clippy::expect_used))]

#[cfg(target_arch = "wasm32")]
mod wasm_constants;
#[cfg(any(target_arch = "wasm32", test))]
mod wasm_state;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
    use futures::future::poll_fn;
    use futures::stream::{SplitSink, SplitStream};
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::{Message as WsMessage, State, futures::WebSocket};
    use manuscriptor_client_core::view::{DETAIL_COLSPAN, TOGGLE_TITLE};
    use manuscriptor_client_core::{
        BootstrapConfig, ClientSession, Diagnostic, Dispatcher, ListTarget, ListView,
        ResponseHandler, ShellClient, ShellConfig, Transport, ViewRow, toggle_glyph,
        websocket_url,
    };
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use tracing::{debug, error, info, warn};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Document, Element, HtmlElement};

    use crate::wasm_constants::*;
    use crate::wasm_state::{
        ConnectionPhase, MountedHandlers, ShellDiagnostics, boot_waits_for_load,
    };

    mod dom;
    mod lifecycle;
    mod network;

    use dom::*;
    use lifecycle::*;
    use network::*;

    type SharedClient = Rc<ShellClient<ChannelTransport>>;

    thread_local! {
        static CLIENT: RefCell<Option<SharedClient>> = const { RefCell::new(None) };
        static DIAGNOSTICS: RefCell<ShellDiagnostics> = RefCell::new(ShellDiagnostics::default());
        static RELOAD_STATS_CLICK_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static BOOT_ON_LOAD_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static ROW_TOGGLE_HANDLERS: RefCell<MountedHandlers<ListTarget, Closure<dyn FnMut(web_sys::Event)>>> = RefCell::new(MountedHandlers::default());
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        let search = current_search();
        init_logging(&ShellConfig::from_query(&search).log_filter);
        // Parsed again now that rejected parameters can be logged.
        let config = ShellConfig::from_query(&search);
        if let Err(error) = schedule_boot(config) {
            error!(%error, "manuscriptor shell failed to start");
            update_diagnostics(|state| state.record_error(&error));
        }
    }

    #[wasm_bindgen]
    pub fn shell_diagnostics_json() -> String {
        DIAGNOSTICS.with(|state| state.borrow().to_json())
    }

    fn run_boot(config: ShellConfig) {
        if let Err(error) = boot(config) {
            error!(%error, "manuscriptor shell failed to start");
            update_diagnostics(|state| state.record_error(&error));
        }
    }

    fn boot(config: ShellConfig) -> Result<(), String> {
        let mut rng = SmallRng::seed_from_u64(page_load_seed());
        let session = ClientSession::generate(&mut rng, config.client_id_length);
        let url = build_socket_url(&config, session.id())?;
        info!(client_id = session.id(), %url, "starting manuscriptor shell");
        update_diagnostics(|state| {
            state.client_id = Some(session.id().to_string());
            state.socket_url = Some(url.clone());
        });

        let (sender, receiver) = unbounded();
        let client = Rc::new(ShellClient::new(session, ChannelTransport::new(sender)));
        CLIENT.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&client)));

        open_connection(&url, client, receiver, config.bootstrap)?;
        if let Err(error) = install_reload_stats_handler() {
            warn!(%error, "stats reload button not wired");
        }
        Ok(())
    }

    fn update_diagnostics(update: impl FnOnce(&mut ShellDiagnostics)) {
        DIAGNOSTICS.with(|state| update(&mut state.borrow_mut()));
    }

    fn with_client(action: impl FnOnce(&ShellClient<ChannelTransport>)) {
        let client = CLIENT.with(|slot| slot.borrow().clone());
        match client {
            Some(client) => action(&client),
            None => warn!("no connection yet; request dropped"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::shell_diagnostics_json;

#[cfg(not(target_arch = "wasm32"))]
pub fn shell_diagnostics_json() -> String {
    "{\"phase\":\"native\",\"detail\":\"shell diagnostics only available on wasm\"}".to_string()
}
