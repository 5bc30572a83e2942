//! Async driver for an [`OverlayController`]
//!
//! The controller itself is synchronous and clock-free. This task owns it,
//! feeds it pointer input from a channel, sleeps until the next pending
//! transition falls due, and waits on the readiness gate before any of that.

use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::readiness::{ReadinessGate, ReadinessProbe};
use crate::registry::{ElementId, RegionRegistry};

use super::controller::{OverlayController, OverlaySnapshot, PointerEvent};

/// Parked timer horizon when nothing is pending
const IDLE_HORIZON: std::time::Duration = std::time::Duration::from_secs(3600);

/// Commands sent to a running overlay task
#[derive(Debug)]
pub enum OverlayCommand {
    Pointer(PointerEvent),
    /// Report controller state for the listed elements
    Snapshot {
        elements: Vec<ElementId>,
        reply: oneshot::Sender<OverlaySnapshot>,
    },
    Shutdown,
}

/// Handle to a running overlay task
pub struct OverlayHandle<R> {
    pub tx: mpsc::Sender<OverlayCommand>,
    pub handle: JoinHandle<Option<R>>,
}

impl<R> OverlayHandle<R> {
    /// Queue a pointer event. Returns `false` if the task has stopped.
    pub async fn pointer(&self, event: PointerEvent) -> bool {
        self.tx.send(OverlayCommand::Pointer(event)).await.is_ok()
    }

    pub async fn snapshot(&self, elements: Vec<ElementId>) -> Option<OverlaySnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(OverlayCommand::Snapshot { elements, reply })
            .await
            .ok()?;
        rx.await.ok()
    }

    /// Stop the task and take back the registry (if it ever became ready)
    pub async fn shutdown(self) -> Option<R> {
        let _ = self.tx.send(OverlayCommand::Shutdown).await;
        match self.handle.await {
            Ok(registry) => registry,
            Err(e) => {
                tracing::error!(error = %e, "Overlay task failed");
                None
            }
        }
    }
}

/// Spawn the overlay task on the current tokio runtime
pub fn spawn_overlay<R, P>(
    controller: OverlayController<R>,
    gate: ReadinessGate,
    probe: P,
) -> OverlayHandle<R>
where
    R: RegionRegistry + Send + 'static,
    P: ReadinessProbe<Output = R> + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<OverlayCommand>(32);
    let handle = tokio::spawn(run(controller, gate, probe, rx));
    OverlayHandle { tx, handle }
}

async fn run<R, P>(
    mut controller: OverlayController<R>,
    gate: ReadinessGate,
    mut probe: P,
    mut rx: mpsc::Receiver<OverlayCommand>,
) -> Option<R>
where
    R: RegionRegistry,
    P: ReadinessProbe<Output = R>,
{
    {
        let wait = gate.wait(&mut probe);
        tokio::pin!(wait);

        loop {
            tokio::select! {
                biased;

                result = &mut wait => {
                    match result {
                        Ok(registry) => controller.on_ready(registry, now()),
                        Err(e) => controller.on_ready_failed(&e),
                    }
                    break;
                }
                cmd = rx.recv() => {
                    if !dispatch(&mut controller, cmd) {
                        return controller.teardown();
                    }
                }
            }
        }
    }

    loop {
        let deadline = controller.next_deadline();
        let wake = deadline.map_or_else(
            || tokio::time::Instant::now() + IDLE_HORIZON,
            tokio::time::Instant::from_std,
        );

        tokio::select! {
            _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                let fired = controller.tick(now());
                tracing::trace!(fired, "Transitions fired");
            }
            cmd = rx.recv() => {
                if !dispatch(&mut controller, cmd) {
                    break;
                }
            }
        }
    }

    controller.teardown()
}

/// Apply one command. Returns `false` when the task should stop.
fn dispatch<R: RegionRegistry>(controller: &mut OverlayController<R>, command: Option<OverlayCommand>) -> bool {
    let Some(command) = command else {
        tracing::debug!("Overlay channel closed");
        return false;
    };

    // Anything already due settles before new input lands
    controller.tick(now());

    match command {
        OverlayCommand::Pointer(event) => {
            controller.handle_pointer(event, now());
        }
        OverlayCommand::Snapshot { elements, reply } => {
            let _ = reply.send(controller.snapshot(&elements));
        }
        OverlayCommand::Shutdown => return false,
    }
    true
}

/// Runtime clock, so paused-time tests drive the scheduler too
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
