//! Line-oriented terminal frontend.
//!
//! Stdin is drained by a reader thread into a channel so `poll_action` never
//! blocks the event loop; modal prompts consume lines from the same channel,
//! which nests them inside the step that opened them the way a modal dialog
//! nests inside the toolkit loop.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::error;

use crate::shell::{Frontend, UserAction};
use crate::Viewport;

pub struct TerminalFrontend {
    lines: Receiver<String>,
    reader_alive: bool,
    last_percent: i32,
}

impl TerminalFrontend {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(l) => {
                        if tx.send(l).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
        println!("webshot: <uri> | back | forward | shot | quit");
        Self {
            lines: rx,
            reader_alive: true,
            last_percent: -1,
        }
    }

    /// Block on the next input line; used by the modal prompts.
    fn read_line(&mut self) -> Option<String> {
        self.lines.recv().ok()
    }

    fn parse(line: &str) -> Option<UserAction> {
        let line = line.trim();
        match line {
            "" => None,
            "back" => Some(UserAction::Back),
            "forward" => Some(UserAction::Forward),
            "shot" | "snapshot" => Some(UserAction::Snapshot),
            "quit" | "exit" => Some(UserAction::Quit),
            _ => {
                let rest = line.strip_prefix("open ").unwrap_or(line);
                Some(UserAction::Navigate(rest.to_string()))
            }
        }
    }
}

impl Default for TerminalFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for TerminalFrontend {
    fn poll_action(&mut self) -> Option<UserAction> {
        match self.lines.try_recv() {
            Ok(line) => Self::parse(&line),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                // stdin closed; treat it like the window being closed once
                if self.reader_alive {
                    self.reader_alive = false;
                    Some(UserAction::Quit)
                } else {
                    None
                }
            }
        }
    }

    fn set_address(&mut self, uri: &str) {
        println!("-> {}", uri);
        self.last_percent = -1;
    }

    fn set_progress(&mut self, fraction: f64) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as i32;
        if percent != self.last_percent {
            self.last_percent = percent;
            println!("   loading {:3}%", percent);
        }
    }

    fn set_history_controls(&mut self, back: bool, forward: bool) {
        println!(
            "   [{}] back  [{}] forward",
            if back { "x" } else { " " },
            if forward { "x" } else { " " }
        );
    }

    fn prompt_dimensions(&mut self, min: Viewport) -> Option<(u32, u32)> {
        println!(
            "snapshot size as WIDTH HEIGHT (min {}x{}, empty cancels):",
            min.width, min.height
        );
        let line = self.read_line()?;
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let mut parts = line.split(|c| c == ' ' || c == 'x').filter(|s| !s.is_empty());
        let width = parts.next()?.parse().ok()?;
        let height = parts.next()?.parse().ok()?;
        Some((width, height))
    }

    fn prompt_save_path(&mut self) -> Option<PathBuf> {
        println!("save to (empty cancels):");
        let line = self.read_line()?;
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(PathBuf::from(line))
    }

    fn notify_error(&mut self, message: &str) {
        error!("{}", message);
        eprintln!("error: {}", message);
    }
}
