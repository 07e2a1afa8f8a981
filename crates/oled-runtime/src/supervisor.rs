//! The tick-loop supervisor (spec.md §4.9, §4.11, §5): owns the single
//! compositor task, accepts reload requests, and drains/drops widgets in
//! reverse z-order on shutdown.

use crate::error::RuntimeError;
use oled_compositor::{Compositor, FrameSink};
use oled_config::Config;
use oled_widgets::registry::WidgetRegistry;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Builds a fresh [`FrameSink`] for a (re)build of the compositor. A
/// factory rather than a single boxed sink so reload can hand the new
/// compositor its own sink instance without reaching back into the old one.
pub type SinkFactory = Box<dyn Fn() -> Box<dyn FrameSink> + Send>;

enum Command {
    Reload(Box<Config>),
    Shutdown,
}

/// Start/stop/reload/switch-profile lifecycle around one [`Compositor`]
/// running on its own tokio task. Only one compositor is ever live; a
/// reload swaps it out atomically at the next tick-loop iteration rather
/// than mid-tick (spec.md §4.11's "atomic at a tick boundary" rule).
#[derive(Default)]
pub struct Supervisor {
    command_tx: Option<mpsc::Sender<Command>>,
    join_handle: Option<JoinHandle<()>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.join_handle.is_some()
    }

    /// Builds the initial compositor from `config` and spawns the tick-loop
    /// task. Fails if already running.
    pub fn start(&mut self, config: Config, sink_factory: SinkFactory) -> Result<(), RuntimeError> {
        if self.is_running() {
            return Err(RuntimeError::AlreadyRunning);
        }
        let compositor = build_compositor(&config, sink_factory())?;
        let tick_period = Duration::from_millis(config.refresh_rate_ms as u64);
        let (tx, rx) = mpsc::channel(8);
        self.command_tx = Some(tx);
        self.join_handle = Some(tokio::spawn(run_loop(compositor, tick_period, sink_factory, rx)));
        Ok(())
    }

    /// Requests the running compositor be rebuilt from `config` at the next
    /// tick boundary.
    pub async fn reload(&self, config: Config) -> Result<(), RuntimeError> {
        let tx = self.command_tx.as_ref().ok_or(RuntimeError::NotRunning)?;
        tx.send(Command::Reload(Box::new(config))).await.map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Convenience wrapper: resolves a profile's config and reloads onto
    /// it, persisting the switch as the new active profile.
    pub async fn switch_profile(
        &self,
        manager: &crate::profile::ProfileManager,
        profile: &oled_config::Profile,
        widget_types: &dyn oled_config::TypeRegistry,
        backends: &dyn oled_config::TypeRegistry,
        display_width: u32,
        display_height: u32,
    ) -> Result<(), RuntimeError> {
        let config = manager.load_config(profile, widget_types, backends, display_width, display_height)?;
        manager.switch_to(profile)?;
        self.reload(config).await
    }

    /// Signals shutdown and waits for the tick-loop task to drain its
    /// current tick and drop its widgets.
    pub async fn stop(&mut self) -> Result<(), RuntimeError> {
        let tx = self.command_tx.take().ok_or(RuntimeError::NotRunning)?;
        let _ = tx.send(Command::Shutdown).await;
        drop(tx);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
        Ok(())
    }
}

fn build_compositor(config: &Config, sink: Box<dyn FrameSink>) -> Result<Compositor, RuntimeError> {
    let registry = WidgetRegistry::with_builtin_types();
    let mut widgets = Vec::with_capacity(config.widgets.len());
    for widget_cfg in &config.widgets {
        widgets.push(registry.build(widget_cfg)?);
    }
    Ok(Compositor::new(config.display.width, config.display.height, config.display.background, widgets, sink))
}

async fn run_loop(mut compositor: Compositor, tick_period: Duration, sink_factory: SinkFactory, mut rx: mpsc::Receiver<Command>) {
    let mut ticker = tokio::time::interval(tick_period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                compositor.tick(Instant::now());
            }
            cmd = rx.recv() => {
                match cmd {
                    Some(Command::Reload(config)) => {
                        match build_compositor(&config, sink_factory()) {
                            Ok(new_compositor) => {
                                let old = std::mem::replace(&mut compositor, new_compositor);
                                old.shutdown();
                                ticker = tokio::time::interval(Duration::from_millis(config.refresh_rate_ms as u64));
                                info!(target: "runtime.supervisor", widgets = config.widgets.len(), "reloaded config");
                            }
                            Err(e) => warn!(target: "runtime.supervisor", error = %e, "reload rejected, keeping current compositor"),
                        }
                    }
                    Some(Command::Shutdown) | None => break,
                }
            }
        }
    }
    compositor.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use oled_compositor::NullSink;
    use oled_config::default_single_clock;

    fn null_factory() -> SinkFactory {
        Box::new(|| Box::new(NullSink::default()))
    }

    #[tokio::test]
    async fn start_then_stop_round_trips() {
        let mut supervisor = Supervisor::new();
        let config = default_single_clock(64, 32);
        supervisor.start(config, null_factory()).unwrap();
        assert!(supervisor.is_running());
        supervisor.stop().await.unwrap();
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let mut supervisor = Supervisor::new();
        supervisor.start(default_single_clock(64, 32), null_factory()).unwrap();
        let err = supervisor.start(default_single_clock(64, 32), null_factory()).unwrap_err();
        assert!(matches!(err, RuntimeError::AlreadyRunning));
        supervisor.stop().await.unwrap();
    }

    #[tokio::test]
    async fn reload_before_start_is_rejected() {
        let supervisor = Supervisor::new();
        let err = supervisor.reload(default_single_clock(64, 32)).await.unwrap_err();
        assert!(matches!(err, RuntimeError::NotRunning));
    }

    #[tokio::test]
    async fn reload_while_running_succeeds() {
        let mut supervisor = Supervisor::new();
        supervisor.start(default_single_clock(64, 32), null_factory()).unwrap();
        supervisor.reload(default_single_clock(64, 32)).await.unwrap();
        supervisor.stop().await.unwrap();
    }
}
