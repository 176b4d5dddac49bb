//! # Kiosk Runtime
//!
//! The single event loop that serializes every state change of a kiosk.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         KioskRuntime::run                               │
//! │                                                                         │
//! │   KioskHandle::dispatch ──► command_rx ──┐                              │
//! │                                          │                              │
//! │   ScheduledTask / IdleMonitor ─► internal_rx ──► select! ──► controller │
//! │                                          │                      │       │
//! │   KioskHandle::shutdown ──► shutdown_rx ─┘                      ▼       │
//! │                                                   watch::Sender<Snapshot>│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Collaborator calls and timers run concurrently, but their results only
//! touch the session once they come back through this loop.

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::controller::ScreenController;
use crate::error::{GuardViolation, KioskError, KioskResult};
use crate::events::{Handled, InternalEvent, KioskEvent};
use crate::state::KioskSnapshot;

struct Command {
    event: KioskEvent,
    reply: oneshot::Sender<Result<Handled, GuardViolation>>,
}

/// Runs the screen controller.
pub struct KioskRuntime {
    controller: ScreenController,

    /// Results of work the controller started.
    internal_rx: mpsc::UnboundedReceiver<InternalEvent>,

    /// Shopper input from handles.
    command_rx: mpsc::Receiver<Command>,

    /// Latest snapshot for observers.
    snapshot_tx: watch::Sender<KioskSnapshot>,

    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for driving a running kiosk.
#[derive(Clone)]
pub struct KioskHandle {
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<KioskSnapshot>,
    shutdown_tx: mpsc::Sender<()>,
}

impl KioskHandle {
    /// Sends shopper input and waits until it has been applied or rejected.
    pub async fn dispatch(&self, event: KioskEvent) -> KioskResult<Handled> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(Command { event, reply })
            .await
            .map_err(|_| KioskError::ChannelClosed)?;

        let handled = response.await.map_err(|_| KioskError::ChannelClosed)??;
        Ok(handled)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> KioskSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<KioskSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> KioskResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| KioskError::ChannelClosed)
    }
}

impl KioskRuntime {
    /// Creates a runtime around a controller and returns a handle.
    pub fn new(
        controller: ScreenController,
        internal_rx: mpsc::UnboundedReceiver<InternalEvent>,
    ) -> (Self, KioskHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

        let runtime = KioskRuntime {
            controller,
            internal_rx,
            command_rx,
            snapshot_tx,
            shutdown_rx,
        };
        let handle = KioskHandle {
            command_tx,
            snapshot_rx,
            shutdown_tx,
        };

        (runtime, handle)
    }

    /// Runs the event loop until shutdown or until every handle is dropped.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(
            kiosk_session_id = %self.controller.store().kiosk_session_id(),
            "Kiosk runtime starting"
        );

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(Command { event, reply }) = command else {
                        debug!("All kiosk handles dropped");
                        break;
                    };
                    let result = self.controller.handle(event);
                    self.publish();
                    let _ = reply.send(result);
                }

                Some(event) = self.internal_rx.recv() => {
                    if self.controller.handle_internal(event) != Handled::Stale {
                        self.publish();
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Kiosk runtime shutting down");
                    break;
                }
            }
        }

        info!("Kiosk runtime stopped");
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.controller.snapshot());
    }
}
