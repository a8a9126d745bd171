//! Pure-Rust engine backend: fetches pages over HTTP, paints a schematic
//! rendition of them, and runs inline scripts with Boa so pages can still
//! produce console output.
//!
//! Loads are staged cooperatively: each `poll` advances one step (document,
//! then linked stylesheets one at a time, then inline scripts one at a time,
//! then finalize), with synthetic monotonic progress across the stages.

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::error::{Error, Result};
use crate::rendering::{layout, raster, Frame};
use crate::{ConsoleMessage, LoadState, PageEngine, PageEvent, ShellConfig, Viewport};

// Progress a load reports as it crosses stage boundaries
const PROGRESS_COMMITTED: f64 = 0.1;
const PROGRESS_STYLES_DONE: f64 = 0.6;
const PROGRESS_SCRIPTS_DONE: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadStage {
    FetchDocument,
    FetchStyles,
    RunScripts,
    Finalize,
}

/// Where the navigation lands in history once it commits
#[derive(Debug, Clone, Copy)]
enum HistoryTarget {
    /// New entry; forward history is truncated
    Push,
    /// Back/forward navigation to an existing entry
    Index(usize),
}

struct PendingLoad {
    uri: String,
    target: HistoryTarget,
    stage: LoadStage,
    // Remaining work, drained one item per poll; totals kept for progress
    stylesheets: Vec<String>,
    scripts: Vec<String>,
    total_styles: usize,
    total_scripts: usize,
}

impl PendingLoad {
    fn new(uri: String, target: HistoryTarget) -> Self {
        Self {
            uri,
            target,
            stage: LoadStage::FetchDocument,
            stylesheets: Vec::new(),
            scripts: Vec::new(),
            total_styles: 0,
            total_scripts: 0,
        }
    }
}

/// HTTP-backed page engine
pub struct HttpEngine {
    client: Client,
    config: ShellConfig,
    history: Vec<String>,
    index: Option<usize>,
    last_html: Option<String>,
    styles: Vec<String>,
    state: LoadState,
    progress: f64,
    pending: Option<PendingLoad>,
}

impl HttpEngine {
    /// Stylesheets fetched for the current document (inline and linked)
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    fn fetch(&self, uri: &str) -> Result<(String, String)> {
        let resp = self
            .client
            .get(uri)
            .header("User-Agent", self.config.user_agent.clone())
            .send()
            .map_err(|e| Error::Load(format!("failed to fetch {}: {}", uri, e)))?;

        // Redirects are followed; record the final URI like an engine would
        let final_uri = resp.url().to_string();
        let body = resp
            .text()
            .map_err(|e| Error::Load(format!("failed to read body of {}: {}", uri, e)))?;
        Ok((final_uri, body))
    }

    /// Bump progress monotonically within the current load cycle.
    fn advance_progress(&mut self, to: f64) {
        if to > self.progress {
            self.progress = to;
        }
    }

    fn commit_history(&mut self, uri: String, target: HistoryTarget) {
        match target {
            HistoryTarget::Push => {
                if let Some(i) = self.index {
                    self.history.truncate(i + 1);
                }
                self.history.push(uri);
                self.index = Some(self.history.len() - 1);
            }
            HistoryTarget::Index(i) => {
                self.index = Some(i);
            }
        }
    }

    fn step_fetch_document(&mut self, mut pending: PendingLoad, events: &mut Vec<PageEvent>) {
        let (final_uri, body) = match self.fetch(&pending.uri) {
            Ok(r) => r,
            Err(e) => {
                warn!("load of {} failed: {}", pending.uri, e);
                self.state = LoadState::Idle;
                self.progress = 1.0;
                return;
            }
        };

        // Collect remaining work from the document before committing
        let document = Html::parse_document(&body);
        self.styles.clear();
        let style_sel = Selector::parse("style").unwrap();
        for node in document.select(&style_sel) {
            let text = node.text().collect::<String>();
            if !text.trim().is_empty() {
                self.styles.push(text);
            }
        }
        let link_sel = Selector::parse("link[rel=\"stylesheet\"]").unwrap();
        for node in document.select(&link_sel) {
            if let Some(href) = node.value().attr("href") {
                let css_uri = match url::Url::parse(&final_uri) {
                    Ok(base) => base
                        .join(href)
                        .map(|u| u.to_string())
                        .unwrap_or_else(|_| href.to_string()),
                    Err(_) => href.to_string(),
                };
                pending.stylesheets.push(css_uri);
            }
        }
        let script_sel = Selector::parse("script").unwrap();
        for node in document.select(&script_sel) {
            if node.value().attr("src").is_some() {
                continue;
            }
            let code = node.text().collect::<String>();
            if !code.trim().is_empty() {
                pending.scripts.push(code);
            }
        }
        // drain from the front in document order
        pending.stylesheets.reverse();
        pending.scripts.reverse();
        pending.total_styles = pending.stylesheets.len();
        pending.total_scripts = pending.scripts.len();

        self.commit_history(final_uri.clone(), pending.target);
        self.last_html = Some(body);
        self.state = LoadState::Committed;
        self.advance_progress(PROGRESS_COMMITTED);
        events.push(PageEvent::LoadCommitted);

        pending.uri = final_uri;
        pending.stage = LoadStage::FetchStyles;
        self.pending = Some(pending);
    }

    fn step_fetch_styles(&mut self, mut pending: PendingLoad) {
        if let Some(css_uri) = pending.stylesheets.pop() {
            match self.fetch(&css_uri) {
                Ok((_, css)) => {
                    if !css.trim().is_empty() {
                        self.styles.push(css);
                    }
                }
                Err(e) => debug!("stylesheet {} skipped: {}", css_uri, e),
            }
            let done = pending.total_styles - pending.stylesheets.len();
            let span = PROGRESS_STYLES_DONE - PROGRESS_COMMITTED;
            self.advance_progress(
                PROGRESS_COMMITTED + span * done as f64 / pending.total_styles as f64,
            );
        }
        if pending.stylesheets.is_empty() {
            self.advance_progress(PROGRESS_STYLES_DONE);
            pending.stage = LoadStage::RunScripts;
        }
        self.pending = Some(pending);
    }

    fn step_run_scripts(&mut self, mut pending: PendingLoad, events: &mut Vec<PageEvent>) {
        if let Some(code) = pending.scripts.pop() {
            for message in run_inline_script(&code, &pending.uri) {
                events.push(PageEvent::Console(message));
            }
            let done = pending.total_scripts - pending.scripts.len();
            let span = PROGRESS_SCRIPTS_DONE - PROGRESS_STYLES_DONE;
            self.advance_progress(
                PROGRESS_STYLES_DONE + span * done as f64 / pending.total_scripts as f64,
            );
        }
        if pending.scripts.is_empty() {
            self.advance_progress(PROGRESS_SCRIPTS_DONE);
            pending.stage = LoadStage::Finalize;
        }
        self.pending = Some(pending);
    }
}

impl PageEngine for HttpEngine {
    fn new(config: &ShellConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Initialization(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
            history: Vec::new(),
            index: None,
            last_html: None,
            styles: Vec::new(),
            state: LoadState::Idle,
            progress: 0.0,
            pending: None,
        })
    }

    fn load(&mut self, uri: &str) -> Result<()> {
        // A new navigation supersedes whatever was in flight
        self.pending = Some(PendingLoad::new(uri.to_string(), HistoryTarget::Push));
        self.state = LoadState::Idle;
        self.progress = 0.0;
        Ok(())
    }

    fn stop(&mut self) {
        if self.pending.take().is_some() {
            debug!("in-flight load stopped");
        }
        if self.state == LoadState::Committed {
            self.state = LoadState::Idle;
        }
        // A stopped load reports full progress so an active poller terminates
        self.progress = 1.0;
    }

    fn go_back(&mut self) {
        if let Some(i) = self.index.filter(|i| *i > 0) {
            let uri = self.history[i - 1].clone();
            self.pending = Some(PendingLoad::new(uri, HistoryTarget::Index(i - 1)));
            self.state = LoadState::Idle;
            self.progress = 0.0;
        }
    }

    fn go_forward(&mut self) {
        if let Some(i) = self.index.filter(|i| i + 1 < self.history.len()) {
            let uri = self.history[i + 1].clone();
            self.pending = Some(PendingLoad::new(uri, HistoryTarget::Index(i + 1)));
            self.state = LoadState::Idle;
            self.progress = 0.0;
        }
    }

    fn can_go_back(&self) -> bool {
        self.index.map_or(false, |i| i > 0)
    }

    fn can_go_forward(&self) -> bool {
        self.index.map_or(false, |i| i + 1 < self.history.len())
    }

    fn current_uri(&self) -> Option<&str> {
        self.index.map(|i| self.history[i].as_str())
    }

    fn load_progress(&self) -> f64 {
        self.progress
    }

    fn load_state(&self) -> LoadState {
        self.state
    }

    fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    fn paint(&self) -> Result<Frame> {
        let viewport = self.config.viewport;
        let Some(html) = &self.last_html else {
            return Ok(Frame::blank(viewport.width, viewport.height));
        };
        let document = Html::parse_document(html);
        let blocks = layout::layout_document(&document, viewport);
        let commands = layout::paint_blocks(&blocks);
        Ok(raster::rasterize(&commands, viewport.width, viewport.height))
    }

    fn poll(&mut self) -> Vec<PageEvent> {
        let mut events = Vec::new();
        let Some(pending) = self.pending.take() else {
            return events;
        };
        match pending.stage {
            LoadStage::FetchDocument => self.step_fetch_document(pending, &mut events),
            LoadStage::FetchStyles => self.step_fetch_styles(pending),
            LoadStage::RunScripts => self.step_run_scripts(pending, &mut events),
            LoadStage::Finalize => {
                self.progress = 1.0;
                self.state = LoadState::Finished;
                events.push(PageEvent::LoadFinished);
            }
        }
        events
    }
}

/// Run one inline script in a fresh Boa context and collect its console
/// output. `console.log`/`warn`/`error` buffer into an array the harness
/// drains after evaluation; an uncaught exception is reported as a console
/// message too, the way a browser engine would.
fn run_inline_script(code: &str, source_uri: &str) -> Vec<ConsoleMessage> {
    const HARNESS: &str = "var __console = [];\n\
        var console = {\n\
          log: function (m) { __console.push(String(m)); },\n\
          warn: function (m) { __console.push(String(m)); },\n\
          error: function (m) { __console.push(String(m)); }\n\
        };\n";

    let mut ctx = boa_engine::Context::default();
    ctx.runtime_limits_mut().set_loop_iteration_limit(1_000_000);
    ctx.runtime_limits_mut().set_recursion_limit(1024);

    let mut messages = Vec::new();
    let wrapped = format!("{}\n{}", HARNESS, code);
    if let Err(e) = ctx.eval(boa_engine::Source::from_bytes(wrapped.as_bytes())) {
        messages.push(ConsoleMessage {
            text: format!("Uncaught {}", e),
            line: None,
            source_id: Some(source_uri.to_string()),
        });
    }
    if let Ok(buffered) = ctx.eval(boa_engine::Source::from_bytes(
        "__console.join('\\n')".as_bytes(),
    )) {
        let text = buffered
            .to_string(&mut ctx)
            .map(|s| s.to_std_string_escaped())
            .unwrap_or_default();
        if !text.is_empty() {
            for line in text.split('\n') {
                messages.push(ConsoleMessage {
                    text: line.to_string(),
                    line: None,
                    source_id: Some(source_uri.to_string()),
                });
            }
        }
    }
    messages
}
