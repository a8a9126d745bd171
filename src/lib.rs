//! webshot: a minimal browser shell with arbitrary-resolution page capture
//!
//! The shell composes three collaborator roles behind trait seams: a page
//! engine (navigation, history, live-viewport rendering), a frontend
//! (address bar, history controls, modal prompts), and a raster pipeline
//! (scaling and PNG encoding). Its one differentiating feature is
//! [`capture::write_snapshot`]: rasterizing the live viewport at an output
//! resolution independent of the on-screen size.
//!
//! # Features
//!
//! - **http** (default): pure-Rust backend that fetches pages over HTTP and
//!   paints a schematic rendition of them
//! - **cdp**: Chrome DevTools Protocol backend with real page rendering
//!
//! # Example
//!
//! ```no_run
//! use webshot::{PageEngine, ShellConfig, Viewport};
//!
//! # fn main() -> webshot::Result<()> {
//! let config = ShellConfig {
//!     viewport: Viewport { width: 800, height: 600 },
//!     ..Default::default()
//! };
//!
//! let mut engine = webshot::new_engine(&config)?;
//! engine.load("http://example.com")?;
//! while engine.load_state() != webshot::LoadState::Finished {
//!     engine.poll();
//! }
//! let frame = engine.paint()?;
//! webshot::capture::write_snapshot(&frame, "shot.png", 1600, 1200, Default::default())?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod capture;
pub mod rendering;
pub mod shell;
pub mod term;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "cdp")]
pub mod cdp;

pub use capture::ScalePolicy;
pub use rendering::Frame;
pub use shell::Shell;

/// Configuration for the shell and its engine backend
///
/// Defaults follow the classic shell: an 800x600 viewport, a 100ms progress
/// poll, and snapshot dimensions capped at 10000 pixels per axis.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Page loaded on startup, if any
    pub homepage: Option<String>,
    /// Live viewport dimensions
    pub viewport: Viewport,
    /// User agent string sent with requests
    pub user_agent: String,
    /// Timeout for page loads in milliseconds
    pub timeout_ms: u64,
    /// Interval between progress polls in milliseconds
    pub poll_interval_ms: u64,
    /// Upper bound for requested snapshot dimensions
    pub max_snapshot_dim: u32,
    /// How capture maps the live viewport onto the output surface
    pub scale_policy: ScalePolicy,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            homepage: None,
            viewport: Viewport::default(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) webshot/0.1".to_string(),
            timeout_ms: 30000,
            poll_interval_ms: 100,
            max_snapshot_dim: 10000,
            scale_policy: ScalePolicy::default(),
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Load-lifecycle state of the engine's current navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No navigation in flight
    Idle,
    /// Navigation started; the document is being fetched and processed
    Committed,
    /// Navigation complete
    Finished,
}

/// Console message emitted by the page
#[derive(Debug, Clone)]
pub struct ConsoleMessage {
    /// Textual content of the message
    pub text: String,
    /// Line number in the originating script, if known
    pub line: Option<u32>,
    /// Identifier of the originating source, if known
    pub source_id: Option<String>,
}

/// Typed engine events drained through [`PageEngine::poll`]
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// A navigation started and the address is now authoritative
    LoadCommitted,
    /// The current navigation completed
    LoadFinished,
    /// The page wrote to its console
    Console(ConsoleMessage),
}

/// An ephemeral capture request produced by the snapshot dialog flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Core trait for page engine backends
///
/// Engines are cooperative: `load` only begins a navigation, and the work is
/// advanced by repeated `poll` calls on the event-loop thread. `poll` returns
/// the typed events produced by that slice of work.
pub trait PageEngine {
    /// Create a new engine instance with the given configuration
    fn new(config: &ShellConfig) -> Result<Self>
    where
        Self: Sized;

    /// Begin navigating to a URI, truncating forward history
    fn load(&mut self, uri: &str) -> Result<()>;

    /// Abort the in-flight load, if any
    ///
    /// After a stop no further committed/finished events are observed for
    /// that navigation, and reported progress snaps to 1.0 so an active
    /// progress poller terminates.
    fn stop(&mut self);

    /// Navigate one entry back in history; no-op when there is none
    fn go_back(&mut self);

    /// Navigate one entry forward in history; no-op when there is none
    fn go_forward(&mut self);

    /// Whether history is available behind the current entry
    fn can_go_back(&self) -> bool;

    /// Whether history is available ahead of the current entry
    fn can_go_forward(&self) -> bool;

    /// The URI of the current history entry, if any
    fn current_uri(&self) -> Option<&str>;

    /// Fractional progress of the current load cycle, in [0, 1]
    fn load_progress(&self) -> f64;

    /// Load-lifecycle state of the current navigation
    fn load_state(&self) -> LoadState;

    /// Live viewport dimensions
    fn viewport(&self) -> Viewport;

    /// Rasterize the live viewport into an RGBA frame
    fn paint(&self) -> Result<Frame>;

    /// Advance in-flight work one step and drain pending events
    fn poll(&mut self) -> Vec<PageEvent>;
}

/// Create a new engine instance with the default backend
///
/// Prefers the pure-Rust HTTP backend when the `http` feature is enabled
/// (default); falls back to the CDP backend otherwise.
#[cfg(feature = "http")]
pub fn new_engine(config: &ShellConfig) -> Result<impl PageEngine> {
    http::HttpEngine::new(config)
}

#[cfg(all(not(feature = "http"), feature = "cdp"))]
pub fn new_engine(config: &ShellConfig) -> Result<impl PageEngine> {
    cdp::CdpEngine::new(config)
}
