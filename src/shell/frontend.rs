//! The toolkit seam: everything the shell needs from a user interface.
//!
//! A frontend owns the window, address bar, history controls, and modal
//! prompts. The shell drives it through this trait so handlers stay
//! statically checkable and testable with a scripted implementation.

use std::path::PathBuf;

use crate::Viewport;

/// User-initiated actions delivered to the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Address bar activated with free-text input
    Navigate(String),
    /// Back control clicked
    Back,
    /// Forward control clicked
    Forward,
    /// Snapshot control clicked
    Snapshot,
    /// Window closed
    Quit,
}

/// Frontend surface consumed by the shell
pub trait Frontend {
    /// Next pending user action, if any. Must not block.
    fn poll_action(&mut self) -> Option<UserAction>;

    /// Mirror the engine's current URI in the address bar
    fn set_address(&mut self, uri: &str);

    /// Reflect load progress, in [0, 1]
    fn set_progress(&mut self, fraction: f64);

    /// Enable or disable the back/forward controls
    fn set_history_controls(&mut self, back: bool, forward: bool);

    /// Modal dimension entry for a snapshot, pre-populated with the live
    /// viewport as the lower bound. `None` means cancelled.
    fn prompt_dimensions(&mut self, min: Viewport) -> Option<(u32, u32)>;

    /// Modal destination chooser for a snapshot. `None` means cancelled.
    fn prompt_save_path(&mut self) -> Option<PathBuf>;

    /// Surface a recoverable error to the user
    fn notify_error(&mut self, message: &str);
}
