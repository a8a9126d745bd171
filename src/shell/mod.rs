//! The shell proper: one state struct owning the engine and frontend, with a
//! typed handler per widget/engine event and a cooperative event loop.

pub mod frontend;
pub mod navigation;
pub mod progress;

pub use frontend::{Frontend, UserAction};

use std::thread;
use std::time::{Duration, Instant};

use log::warn;

use crate::error::Result;
use crate::{capture, LoadState, PageEngine, PageEvent, ShellConfig, SnapshotRequest};
use navigation::normalize_address;
use progress::ProgressPoller;

/// Idle sleep between cooperative iterations of [`Shell::run`]
const RUN_TICK: Duration = Duration::from_millis(10);

/// Application state: engine, frontend, and the in-flight progress poll.
pub struct Shell<E: PageEngine, F: Frontend> {
    config: ShellConfig,
    engine: E,
    frontend: F,
    poller: ProgressPoller,
}

impl<E: PageEngine, F: Frontend> Shell<E, F> {
    pub fn new(config: ShellConfig, engine: E, frontend: F) -> Self {
        let poller = ProgressPoller::new(Duration::from_millis(config.poll_interval_ms));
        Self {
            config,
            engine,
            frontend,
            poller,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Drive the event loop until the frontend reports quit.
    pub fn run(&mut self) -> Result<()> {
        if let Some(homepage) = self.config.homepage.clone() {
            self.on_address_activate(&homepage);
        }
        while self.step(Instant::now())? {
            thread::sleep(RUN_TICK);
        }
        Ok(())
    }

    /// One cooperative iteration: a pending user action, then engine work,
    /// then the progress poll. Returns false once the user quits.
    pub fn step(&mut self, now: Instant) -> Result<bool> {
        if let Some(action) = self.frontend.poll_action() {
            match action {
                UserAction::Quit => return Ok(false),
                UserAction::Navigate(text) => self.on_address_activate(&text),
                UserAction::Back => self.on_back(),
                UserAction::Forward => self.on_forward(),
                UserAction::Snapshot => self.on_snapshot(),
            }
        }

        for event in self.engine.poll() {
            self.dispatch(event, now);
        }

        if self.poller.fire(now) {
            let progress = self.engine.load_progress();
            self.frontend.set_progress(progress);
            if progress >= 1.0 {
                self.poller.cancel();
            }
        }

        Ok(true)
    }

    fn dispatch(&mut self, event: PageEvent, now: Instant) {
        match event {
            PageEvent::LoadCommitted => self.on_load_committed(now),
            PageEvent::LoadFinished => self.on_load_finished(),
            PageEvent::Console(_) => self.on_console_message(),
        }
    }

    /// Address bar activated: coerce the text to a URI and navigate.
    fn on_address_activate(&mut self, text: &str) {
        let uri = normalize_address(text);
        if let Err(e) = self.engine.load(&uri) {
            warn!("navigation to {} refused: {}", uri, e);
            self.frontend.notify_error(&format!("Cannot load {}: {}", uri, e));
        }
    }

    fn on_back(&mut self) {
        if self.engine.can_go_back() {
            self.engine.go_back();
        }
    }

    fn on_forward(&mut self) {
        if self.engine.can_go_forward() {
            self.engine.go_forward();
        }
    }

    /// Navigation committed: the engine's URI is now authoritative, and the
    /// progress poll begins.
    fn on_load_committed(&mut self, now: Instant) {
        if let Some(uri) = self.engine.current_uri() {
            let uri = uri.to_string();
            self.frontend.set_address(&uri);
        }
        self.poller.start(now);
    }

    /// Navigation finished: recompute history-control enablement.
    fn on_load_finished(&mut self) {
        // A finished event arriving after a stop is stale; the abort wins.
        if self.engine.load_state() != LoadState::Finished {
            return;
        }
        self.frontend
            .set_history_controls(self.engine.can_go_back(), self.engine.can_go_forward());
    }

    /// Console output from the page aborts an in-flight load outright.
    /// Message content is neither inspected nor stored.
    fn on_console_message(&mut self) {
        if self.engine.load_state() == LoadState::Committed {
            warn!("page wrote to its console mid-load; stopping the load");
            self.engine.stop();
        }
    }

    /// Snapshot control clicked: run the two-stage modal flow and capture.
    fn on_snapshot(&mut self) {
        let Some(request) = self.snapshot_flow() else {
            return;
        };
        let frame = match self.engine.paint() {
            Ok(frame) => frame,
            Err(e) => {
                self.frontend.notify_error(&format!("Cannot render page: {}", e));
                return;
            }
        };
        if let Err(e) = capture::write_snapshot(
            &frame,
            &request.path,
            request.width,
            request.height,
            self.config.scale_policy,
        ) {
            self.frontend
                .notify_error(&format!("Cannot save snapshot to {}: {}", request.path.display(), e));
        }
    }

    /// Dimension prompt then destination prompt; either cancellation aborts
    /// the whole flow with no side effects. Dimensions are clamped to
    /// [live viewport, max_snapshot_dim].
    fn snapshot_flow(&mut self) -> Option<SnapshotRequest> {
        let live = self.engine.viewport();
        let (width, height) = self.frontend.prompt_dimensions(live)?;
        // The live dimension wins if the viewport itself exceeds the cap.
        let max = self.config.max_snapshot_dim;
        let width = width.clamp(live.width, max.max(live.width));
        let height = height.clamp(live.height, max.max(live.height));
        let path = self.frontend.prompt_save_path()?;
        Some(SnapshotRequest {
            path,
            width,
            height,
        })
    }
}
