//! Browser bindings
//!
//! DOM-backed implementations of the render surfaces, console logging, and
//! the page entry point. The host document provides the container and the
//! button; nothing here creates them.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use tracing::{error, info, Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlButtonElement, Window};

use crate::api::ApiClient;
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::render::{MetricsSurface, NodeBlock, Notifier, TriggerControl, NODE_BLOCK_CLASS};
use crate::schedule::{IntervalTicker, RefreshHandle};
use crate::summary::FleetSummary;

/// Errors that abort dashboard startup
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("no window or document available")]
    NoDocument,

    #[error("element #{0} not found")]
    MissingElement(String),

    #[error("element #{0} is not a button")]
    NotAButton(String),

    #[error("DOM error: {0}")]
    Dom(String),
}

impl From<JsValue> for InitError {
    fn from(value: JsValue) -> Self {
        InitError::Dom(js_error_text(&value))
    }
}

fn js_error_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

// ============================================================================
// Surfaces
// ============================================================================

/// Renders node blocks into a host-provided container element
pub struct DomSurface {
    document: Document,
    container: Element,
    summary: Option<Element>,
}

impl DomSurface {
    pub fn new(document: Document, container: Element, summary: Option<Element>) -> Self {
        Self {
            document,
            container,
            summary,
        }
    }

    fn build_block(&self, block: &NodeBlock) -> Result<Element, JsValue> {
        let node = self.document.create_element("div")?;
        node.set_class_name(NODE_BLOCK_CLASS);

        let heading = self.document.create_element("h3")?;
        heading.set_text_content(Some(&block.heading));
        node.append_child(&heading)?;

        for line in &block.lines {
            let p = self.document.create_element("p")?;
            p.set_text_content(Some(line));
            node.append_child(&p)?;
        }
        Ok(node)
    }

    fn fill_summary(&self, target: &Element, summary: &FleetSummary) -> Result<(), JsValue> {
        target.set_inner_html("");

        let headline = self.document.create_element("p")?;
        headline.set_class_name("summary-headline");
        headline.set_text_content(Some(&summary.headline()));
        target.append_child(&headline)?;

        for (class, label, nodes) in [
            ("summary-high-load", "High load", &summary.high_load_nodes),
            ("summary-underutilized", "Underutilized", &summary.underutilized_nodes),
        ] {
            if nodes.is_empty() {
                continue;
            }
            let p = self.document.create_element("p")?;
            p.set_class_name(class);
            p.set_text_content(Some(&format!("{label}: {}", nodes.join(", "))));
            target.append_child(&p)?;
        }
        Ok(())
    }
}

impl MetricsSurface for DomSurface {
    fn replace(&self, blocks: &[NodeBlock]) {
        self.container.set_inner_html("");
        for block in blocks {
            let appended = self
                .build_block(block)
                .and_then(|node| self.container.append_child(&node).map(|_| ()));
            if let Err(e) = appended {
                error!(error = %js_error_text(&e), "failed to render node block");
            }
        }
    }

    fn show_summary(&self, summary: &FleetSummary) {
        if let Some(target) = &self.summary {
            if let Err(e) = self.fill_summary(target, summary) {
                error!(error = %js_error_text(&e), "failed to render summary");
            }
        }
    }
}

/// Enables and disables the optimize button
pub struct ButtonControl {
    button: HtmlButtonElement,
}

impl TriggerControl for ButtonControl {
    fn set_enabled(&self, enabled: bool) {
        self.button.set_disabled(!enabled);
    }
}

/// `window.alert` notifications
pub struct AlertNotifier {
    window: Window,
}

impl Notifier for AlertNotifier {
    fn notify(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            error!(error = %js_error_text(&e), "alert failed");
        }
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Buffers one formatted event and writes it to the console on drop
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = JsValue::from_str(text.trim_end());
        match self.level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }
}

/// `MakeWriter` routing events to the matching console method
#[derive(Debug, Default, Clone, Copy)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

fn init_tracing(level: Level) {
    let result = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .try_init();
    if result.is_err() {
        web_sys::console::warn_1(&"tracing subscriber already installed".into());
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// A mounted dashboard; dropping it stops the refresh task and unwires the button
struct Mounted {
    _dashboard: Rc<Dashboard>,
    _refresh: RefreshHandle,
    button: HtmlButtonElement,
    on_click: Closure<dyn FnMut()>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        let _ = self
            .button
            .remove_event_listener_with_callback("click", self.on_click.as_ref().unchecked_ref());
    }
}

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

/// Start the dashboard once the DOM is ready
pub fn start() {
    console_error_panic_hook::set_once();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        web_sys::console::error_1(&"nodepulse: no document available".into());
        return;
    };

    if document.ready_state() == "loading" {
        let on_ready = Closure::once(initialize);
        if let Err(e) = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
        {
            web_sys::console::error_1(&e);
            return;
        }
        on_ready.forget();
    } else {
        initialize();
    }
}

/// Stop refreshing and unwire the optimize button
#[wasm_bindgen(js_name = stopDashboard)]
pub fn stop() {
    if MOUNTED.with(|m| m.borrow_mut().take()).is_some() {
        info!("dashboard stopped");
    }
}

fn initialize() {
    let config = DashboardConfig::load();
    init_tracing(config.log_level);
    info!(
        api_url = %config.api_url,
        refresh_secs = config.refresh_interval.as_secs(),
        version = config.version.as_deref().unwrap_or("unknown"),
        "initializing dashboard"
    );

    match mount(&config) {
        Ok(mounted) => MOUNTED.with(|m| *m.borrow_mut() = Some(mounted)),
        Err(e) => error!(error = %e, "dashboard initialization failed"),
    }
}

fn mount(config: &DashboardConfig) -> Result<Mounted, InitError> {
    let window = web_sys::window().ok_or(InitError::NoDocument)?;
    let document = window.document().ok_or(InitError::NoDocument)?;

    let container = document
        .get_element_by_id(&config.metrics_container_id)
        .ok_or_else(|| InitError::MissingElement(config.metrics_container_id.clone()))?;
    let button = document
        .get_element_by_id(&config.optimize_button_id)
        .ok_or_else(|| InitError::MissingElement(config.optimize_button_id.clone()))?
        .dyn_into::<HtmlButtonElement>()
        .map_err(|_| InitError::NotAButton(config.optimize_button_id.clone()))?;
    let summary = document.get_element_by_id(&config.summary_container_id);

    let dashboard = Rc::new(Dashboard::new(
        Rc::new(ApiClient::from_config(config)),
        Rc::new(DomSurface::new(document, container, summary)),
        Rc::new(ButtonControl {
            button: button.clone(),
        }),
        Rc::new(AlertNotifier { window }),
    )
    .with_thresholds(config.thresholds));

    let clicked = Rc::clone(&dashboard);
    let on_click = Closure::<dyn FnMut()>::new(move || {
        let dashboard = Rc::clone(&clicked);
        spawn_local(async move {
            dashboard.trigger_optimization().await;
        });
    });
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;

    let (task, refresh) = dashboard.start(&IntervalTicker, config.refresh_interval);
    spawn_local(task);

    Ok(Mounted {
        _dashboard: dashboard,
        _refresh: refresh,
        button,
        on_click,
    })
}
