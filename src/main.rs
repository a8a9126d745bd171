use clap::Parser;

use webshot::term::TerminalFrontend;
use webshot::{ScalePolicy, Shell, ShellConfig, Viewport};

/// A minimal browser shell that captures pages at arbitrary output resolutions
#[derive(Parser, Debug)]
#[command(name = "webshot", version, about)]
struct Cli {
    /// Page to open on startup
    url: Option<String>,

    /// Live viewport width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Live viewport height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Progress poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_interval_ms: u64,

    /// Reproduce the historic uniform scale policy (crops or letterboxes
    /// instead of stretching per axis)
    #[arg(long)]
    legacy_scale: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = ShellConfig {
        homepage: cli.url,
        viewport: Viewport {
            width: cli.width,
            height: cli.height,
        },
        poll_interval_ms: cli.poll_interval_ms,
        scale_policy: if cli.legacy_scale {
            ScalePolicy::UniformLegacy
        } else {
            ScalePolicy::PerAxis
        },
        ..Default::default()
    };

    let engine = match webshot::new_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("webshot: {}", e);
            std::process::exit(1);
        }
    };

    let frontend = TerminalFrontend::new();
    let mut shell = Shell::new(config, engine, frontend);
    if let Err(e) = shell.run() {
        eprintln!("webshot: {}", e);
        std::process::exit(1);
    }
}
