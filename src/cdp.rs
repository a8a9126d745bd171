//! Chrome DevTools Protocol backend (uses the `headless_chrome` crate)
//!
//! Launches a headless Chrome instance and adapts one tab to the
//! [`PageEngine`] trait: real rendering, screenshots via `Page.captureScreenshot`,
//! and console messages forwarded through an exposed page binding. History is
//! kept adapter-side since every navigation goes through `navigate_to`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::rendering::Frame;
use crate::{ConsoleMessage, LoadState, PageEngine, PageEvent, ShellConfig, Viewport};

const CONSOLE_BINDING: &str = "__webshot_console";

/// Hook installed after navigation so page console calls reach the binding
const CONSOLE_HOOK: &str = r#"(function () {
    if (window.__webshot_hooked) return;
    window.__webshot_hooked = true;
    ['log', 'warn', 'error'].forEach(function (level) {
        var orig = console[level];
        console[level] = function () {
            try {
                window.__webshot_console(JSON.stringify({
                    args: Array.prototype.slice.call(arguments).map(String)
                }));
            } catch (e) {}
            return orig.apply(console, arguments);
        };
    });
})()"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavStage {
    Navigate,
    Settle,
}

struct PendingNav {
    uri: String,
    target: Option<usize>,
    stage: NavStage,
}

/// CDP-based page engine
pub struct CdpEngine {
    browser: Browser,
    tab: Arc<Tab>,
    config: ShellConfig,
    history: Vec<String>,
    index: Option<usize>,
    state: LoadState,
    progress: f64,
    pending: Option<PendingNav>,
    console_queue: Arc<Mutex<VecDeque<ConsoleMessage>>>,
}

impl CdpEngine {
    fn schedule(&mut self, uri: String, target: Option<usize>) {
        self.pending = Some(PendingNav {
            uri,
            target,
            stage: NavStage::Navigate,
        });
        self.state = LoadState::Idle;
        self.progress = 0.0;
    }

    /// Shut down the tab and the browser child process.
    pub fn close(self) {
        drop(self.tab);
        drop(self.browser);
    }

    fn commit_history(&mut self, uri: String, target: Option<usize>) {
        match target {
            None => {
                if let Some(i) = self.index {
                    self.history.truncate(i + 1);
                }
                self.history.push(uri);
                self.index = Some(self.history.len() - 1);
            }
            Some(i) => self.index = Some(i),
        }
    }
}

impl PageEngine for CdpEngine {
    fn new(config: &ShellConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::Initialization(format!("failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Initialization(format!("failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Initialization(format!("failed to create tab: {}", e)))?;

        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| Error::Initialization(format!("failed to set user agent: {}", e)))?;

        let console_queue: Arc<Mutex<VecDeque<ConsoleMessage>>> =
            Arc::new(Mutex::new(VecDeque::new()));
        let queue = console_queue.clone();
        tab.expose_function(
            CONSOLE_BINDING,
            Arc::new(move |payload: serde_json::Value| {
                let msg = if payload.is_string() {
                    serde_json::from_str::<serde_json::Value>(payload.as_str().unwrap_or(""))
                        .unwrap_or(payload.clone())
                } else {
                    payload
                };
                let text = match msg.get("args") {
                    Some(args) if args.is_array() => args
                        .as_array()
                        .unwrap()
                        .iter()
                        .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
                        .collect::<Vec<_>>()
                        .join(" "),
                    Some(args) => args.to_string(),
                    None => String::new(),
                };
                if let Ok(mut q) = queue.lock() {
                    q.push_back(ConsoleMessage {
                        text,
                        line: None,
                        source_id: None,
                    });
                }
            }),
        )
        .map_err(|e| Error::Initialization(format!("failed to expose console binding: {}", e)))?;

        Ok(Self {
            browser,
            tab,
            config: config.clone(),
            history: Vec::new(),
            index: None,
            state: LoadState::Idle,
            progress: 0.0,
            pending: None,
            console_queue,
        })
    }

    fn load(&mut self, uri: &str) -> Result<()> {
        self.schedule(uri.to_string(), None);
        Ok(())
    }

    fn stop(&mut self) {
        self.pending = None;
        if let Err(e) = self.tab.evaluate("window.stop()", false) {
            debug!("window.stop() failed: {}", e);
        }
        if self.state == LoadState::Committed {
            self.state = LoadState::Idle;
        }
        // A stopped load reports full progress so an active poller terminates
        self.progress = 1.0;
    }

    fn go_back(&mut self) {
        if let Some(i) = self.index.filter(|i| *i > 0) {
            self.schedule(self.history[i - 1].clone(), Some(i - 1));
        }
    }

    fn go_forward(&mut self) {
        if let Some(i) = self.index.filter(|i| i + 1 < self.history.len()) {
            self.schedule(self.history[i + 1].clone(), Some(i + 1));
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
        let png = self
            .tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::Render(format!("screenshot failed: {}", e)))?;
        let image = image::load_from_memory(&png)
            .map_err(|e| Error::Render(format!("failed to decode screenshot: {}", e)))?;
        Ok(Frame::from_image(image.to_rgba8()))
    }

    fn poll(&mut self) -> Vec<PageEvent> {
        let mut events = Vec::new();

        if let Some(mut pending) = self.pending.take() {
            match pending.stage {
                NavStage::Navigate => match self.tab.navigate_to(&pending.uri) {
                    Ok(_) => {
                        self.commit_history(pending.uri.clone(), pending.target);
                        self.state = LoadState::Committed;
                        self.progress = 0.5;
                        events.push(PageEvent::LoadCommitted);
                        pending.stage = NavStage::Settle;
                        self.pending = Some(pending);
                    }
                    Err(e) => {
                        warn!("navigation to {} failed: {}", pending.uri, e);
                        self.state = LoadState::Idle;
                        self.progress = 1.0;
                    }
                },
                NavStage::Settle => match self.tab.wait_until_navigated() {
                    Ok(_) => {
                        if let Err(e) = self.tab.evaluate(CONSOLE_HOOK, false) {
                            debug!("console hook install failed: {}", e);
                        }
                        self.state = LoadState::Finished;
                        self.progress = 1.0;
                        events.push(PageEvent::LoadFinished);
                    }
                    Err(e) => {
                        warn!("navigation to {} did not settle: {}", pending.uri, e);
                        self.state = LoadState::Idle;
                        self.progress = 1.0;
                    }
                },
            }
        }

        if let Ok(mut queue) = self.console_queue.lock() {
            while let Some(message) = queue.pop_front() {
                events.push(PageEvent::Console(message));
            }
        }

        events
    }
}
