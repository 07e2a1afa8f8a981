//! `oled-widgetd` entrypoint: loads a config, starts the supervisor, and
//! drains the tick loop on Ctrl-C. A real transport backend plugs into
//! [`oled_compositor::FrameSink`] in place of [`LoggingSink`] below.

use anyhow::Context;
use clap::Parser;
use oled_compositor::{FrameSink, SinkError};
use oled_primitives::Frame;
use oled_runtime::{BackendRegistry, Supervisor};
use oled_widgets::registry::WidgetRegistry;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// Default display size used only when generating a brand-new config
/// (spec.md §7, scenario S1); an existing config's own `display` wins.
const DEFAULT_DISPLAY_WIDTH: u32 = 128;
const DEFAULT_DISPLAY_HEIGHT: u32 = 40;

#[derive(Parser, Debug)]
#[command(name = "oled-widgetd", version, about = "OLED widget compositor daemon")]
struct Args {
    /// Path to the widget configuration file (created with a default
    /// single-clock layout if it does not exist).
    config: PathBuf,
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

fn configure_logging(level: &str) -> anyhow::Result<WorkerGuard> {
    let log_dir = Path::new(".");
    let file_appender = tracing_appender::rolling::never(log_dir, "oled-widgetd.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_writer(nb_writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    Ok(guard)
}

/// Counts frames so the process has an observable heartbeat without a real
/// display attached. Kept alongside [`NullSink`], which is what tests use.
#[derive(Default)]
struct LoggingSink {
    frames_sent: u64,
}

impl FrameSink for LoggingSink {
    fn send(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.frames_sent += 1;
        if self.frames_sent % 50 == 0 {
            tracing::debug!(
                target: "bin.sink",
                frames_sent = self.frames_sent,
                width = frame.width(),
                height = frame.height(),
                "frame produced"
            );
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = configure_logging(&args.log_level)?;
    info!(target: "bin.startup", config = %args.config.display(), "starting");

    let widget_types = WidgetRegistry::with_builtin_types();
    let backends = BackendRegistry::with_builtin_backends();
    let config = oled_config::load_or_create_default(
        &args.config,
        DEFAULT_DISPLAY_WIDTH,
        DEFAULT_DISPLAY_HEIGHT,
        &widget_types,
        &backends,
    )
    .context("failed to load configuration")?;

    let mut supervisor = Supervisor::new();
    supervisor.start(config, Box::new(|| Box::new(LoggingSink::default())))?;

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!(target: "bin.shutdown", "received shutdown signal, draining current tick");
    supervisor.stop().await?;
    Ok(())
}
