use super::*;

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

pub(super) fn current_search() -> String {
    web_sys::window()
        .and_then(|window| window.location().search().ok())
        .unwrap_or_default()
}

pub(super) fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ConsoleMakeWriter)
        .without_time()
        .with_target(false)
        .try_init();
    if result.is_err() {
        web_sys::console::warn_1(&"tracing subscriber already installed".into());
    }
}

/// Boots now if the page has finished loading, otherwise on its `load` event
/// so the list containers exist before the first response arrives.
pub(super) fn schedule_boot(config: ShellConfig) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    let ready_state = window
        .document()
        .and_then(|document| {
            js_sys::Reflect::get(&document, &JsValue::from_str("readyState")).ok()
        })
        .and_then(|state| state.as_string())
        .unwrap_or_default();
    if !boot_waits_for_load(&ready_state) {
        run_boot(config);
        return Ok(());
    }

    BOOT_ON_LOAD_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let mut pending = Some(config);
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            if let Some(config) = pending.take() {
                run_boot(config);
            }
        }));
        window
            .add_event_listener_with_callback("load", callback.as_ref().unchecked_ref())
            .map_err(|_| "failed to bind page load handler".to_string())?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

/// Seed for the page's id generator. Mixes `Math.random` with the clock so
/// two tabs opened in the same millisecond still diverge.
pub(super) fn page_load_seed() -> u64 {
    let random = (js_sys::Math::random() * ID_SEED_SCALE) as u64;
    let now = js_sys::Date::now() as u64;
    (random << 32) ^ now
}

pub(super) fn install_reload_stats_handler() -> Result<(), String> {
    let document = web_document()?;
    let button = document
        .get_element_by_id(RELOAD_STATS_ID)
        .ok_or_else(|| format!("missing #{RELOAD_STATS_ID} element"))?;
    RELOAD_STATS_CLICK_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            with_client(|client| {
                if let Err(error) = client.load_stats() {
                    warn!(%error, "stats reload was not sent");
                }
            });
        }));
        button
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
            .map_err(|_| "failed to bind reload stats handler".to_string())?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event and hands it to the console method matching
/// its level when dropped.
struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buffer: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer);
        let line = JsValue::from_str(line.trim_end());
        if self.level == Level::ERROR {
            web_sys::console::error_1(&line);
        } else if self.level == Level::WARN {
            web_sys::console::warn_1(&line);
        } else if self.level == Level::INFO {
            web_sys::console::log_1(&line);
        } else {
            web_sys::console::debug_1(&line);
        }
    }
}
