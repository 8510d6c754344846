use std::sync::Arc;
use std::thread;

use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use scrollshot::capture::{CaptureStatus, Region, SessionEvent, SessionManager, SessionOutcome};
use scrollshot::config::{Config, ScrollMode};
use scrollshot::input::NavigationKey;
use scrollshot::notification;
use scrollshot::overlay::{LogPresenter, UiContext};
use scrollshot::selection::{AreaSelector, SlurpSelector, accept_selection, parse_geometry};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SCROLLSHOT_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "scrollshot")]
#[command(
    version = VERSION,
    about = "Multi-shot region capture with automatic scrolling for Wayland desktops"
)]
struct Cli {
    /// Number of shots to take (1-1000)
    #[arg(long, short = 'n', value_name = "N")]
    count: Option<u32>,

    /// Countdown before each shot, in seconds (0-30)
    #[arg(long, short = 'd', value_name = "SECONDS")]
    delay: Option<u32>,

    /// How to advance content between shots
    #[arg(long, value_enum, value_name = "MODE")]
    scroll: Option<ScrollMode>,

    /// Wheel distance in pixels for `--scroll wheel`
    #[arg(long, value_name = "PIXELS")]
    scroll_amount: Option<u32>,

    /// Key pressed for `--scroll key`
    #[arg(long, value_enum, value_name = "KEY")]
    scroll_key: Option<NavigationKey>,

    /// Directory for saved shots
    #[arg(long, short = 'o', value_name = "DIR")]
    output_dir: Option<String>,

    /// Capture this region ("x,y wxh") instead of picking one with slurp
    #[arg(long, short = 'r', value_name = "GEOMETRY")]
    region: Option<String>,

    /// Write scrollshot-debug.log into the output directory
    #[arg(long, action = ArgAction::SetTrue)]
    debug_log: bool,

    /// Do not show a desktop notification when done
    #[arg(long, action = ArgAction::SetTrue)]
    no_notify: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(count) = self.count {
            config.capture.shot_count = count;
        }
        if let Some(delay) = self.delay {
            config.capture.delay_seconds = delay;
        }
        if let Some(mode) = self.scroll {
            config.scroll.mode = mode;
        }
        if let Some(amount) = self.scroll_amount {
            config.scroll.amount = amount;
        }
        if let Some(key) = self.scroll_key {
            config.scroll.key = key;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if self.debug_log {
            config.debug.log_file = true;
        }
        if self.no_notify {
            config.notifications.enabled = false;
        }
        config.validate_and_clamp();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    cli.apply(&mut config);

    let region = match cli.region.as_deref() {
        Some(geometry) => {
            let region = parse_geometry(geometry)?;
            match accept_selection(region) {
                Some(region) => Some(region),
                None => {
                    println!("No selection (region must be at least 10x10); nothing captured.");
                    return Ok(());
                }
            }
        }
        None => None,
    };

    // Check for Wayland environment
    if std::env::var("WAYLAND_DISPLAY").is_err() {
        log::error!("WAYLAND_DISPLAY not set - this application requires Wayland.");
        log::error!("Please run on a Wayland compositor (Hyprland, Sway, etc.).");
        return Err(anyhow!(
            "WAYLAND_DISPLAY not set - this application requires Wayland"
        ));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(config, region))
}

async fn run(config: Config, region: Option<Region>) -> anyhow::Result<()> {
    let region = match region {
        Some(region) => region,
        None => match SlurpSelector::default().select().await? {
            Some(region) => region,
            None => {
                println!("No selection; nothing captured.");
                return Ok(());
            }
        },
    };

    let overlay = Arc::new(UiContext::spawn(LogPresenter::new).context("Failed to start overlay")?);
    let manager = SessionManager::new(&tokio::runtime::Handle::current(), overlay);
    let settings = config.session_settings();
    let output_dir = settings.output.directory.clone();

    // Registered before the session starts; signals received meanwhile stay pending.
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handler")?;
    let signals_handle = signals.handle();

    let mut handle = match manager.start_session(settings, region) {
        Ok(handle) => handle,
        Err(e) => {
            signals_handle.close();
            return Err(e.into());
        }
    };
    let cancel = handle.cancel_flag();
    thread::spawn(move || {
        for sig in signals.forever() {
            log::info!("Received signal {} - cancelling session", sig);
            cancel.cancel();
        }
    });

    println!("Capturing {} into {}", region, output_dir.display());

    let mut outcome = None;
    while let Some(event) = handle.next_event().await {
        match event {
            SessionEvent::Progress { current, total } => {
                println!("{}", CaptureStatus::Capturing { current, total });
            }
            SessionEvent::Countdown { shot, remaining } => {
                log::debug!("Shot {} in {}s", shot, remaining);
            }
            SessionEvent::ShotSaved { path, .. } => {
                println!("  {}", path.display());
            }
            SessionEvent::ShotSkipped { shot, reason } => {
                eprintln!("  shot {} skipped: {}", shot, reason);
            }
            SessionEvent::Finished(finished) => {
                println!("{}", finished.status_text());
                outcome = Some(finished);
            }
        }
    }
    signals_handle.close();

    let outcome = outcome.context("Session ended without an outcome")?;
    if config.notifications.enabled {
        notification::notify_outcome(&outcome).await;
    }

    match outcome {
        SessionOutcome::Failed(reason) => Err(anyhow!("Capture failed: {}", reason)),
        SessionOutcome::Success { .. } | SessionOutcome::Cancelled { .. } => Ok(()),
    }
}
