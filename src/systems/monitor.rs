//! Cooperative background monitors.
//!
//! A [`PeriodicMonitor`] runs a tick closure on its own named thread until
//! its stop channel is closed. Closing happens exactly once: the owner drops
//! the only sender, every later `recv` on the thread sees the disconnect.
//! [`PeriodicMonitor::shutdown`] then joins the thread, so teardown is only
//! complete once the worker has exited.
//!
//! Workers talk to the render thread only through
//! [`CommandSender::send_update`] and the event bus.

use crate::components::command::{Command, TypeTag};
use crate::components::payload::{Payload, StorageLocation};
use crate::systems::queue::CommandSender;
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use log::{error, info};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

pub struct PeriodicMonitor {
    name: String,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

fn stopped(stop: &Receiver<()>) -> bool {
    matches!(stop.try_recv(), Err(TryRecvError::Disconnected))
}

impl PeriodicMonitor {
    /// Spawn a thread calling `tick` now and then every `period`.
    pub fn spawn<F>(name: impl Into<String>, period: Duration, mut tick: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let thread_name = name.clone();
        let handle = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                info!("[{}] monitor started", thread_name);
                loop {
                    if stopped(&stop_rx) {
                        break;
                    }
                    tick();
                    select! {
                        recv(stop_rx) -> _ => break,
                        default(period) => {}
                    }
                }
                info!("[{}] monitor stopped", thread_name);
            })?;
        Ok(PeriodicMonitor {
            name,
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the thread and wait for it to exit. Idempotent.
    pub fn shutdown(&mut self) {
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("[{}] monitor thread panicked", self.name);
            }
        }
    }
}

impl Drop for PeriodicMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Source of detected storage locations (drives, volumes, mounts).
pub trait DriveProbe: Send + 'static {
    fn detect(&mut self) -> Vec<StorageLocation>;
}

impl<F> DriveProbe for F
where
    F: FnMut() -> Vec<StorageLocation> + Send + 'static,
{
    fn detect(&mut self) -> Vec<StorageLocation> {
        self()
    }
}

/// Spawn a monitor that polls `probe` and delivers the full list to one
/// entity as a `SetLocations` command on every tick.
pub fn spawn_drive_monitor(
    mut probe: impl DriveProbe,
    target: CommandSender,
    period: Duration,
) -> std::io::Result<PeriodicMonitor> {
    let name = format!("drive-monitor-{}", target.owner().0);
    PeriodicMonitor::spawn(name, period, move || {
        let locations = probe.detect();
        target.send_update(Command::new(
            TypeTag::SetLocations,
            Payload::Locations(Arc::new(locations)),
        ));
    })
}
