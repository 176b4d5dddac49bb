//! # Scheduled Tasks
//!
//! Every timer and in-flight collaborator call the controller starts is a
//! [`ScheduledTask`]. The controller keeps the task in a slot; replacing or
//! clearing the slot aborts the task, so a reset can never leave an orphaned
//! timer firing into the next session.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::events::InternalEvent;

/// A spawned task that is aborted when dropped.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawns `work` on the runtime.
    pub fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        ScheduledTask {
            handle: tokio::spawn(work),
        }
    }

    /// Sends `event` to the controller once `delay` has elapsed.
    pub fn after(delay: Duration, events: UnboundedSender<InternalEvent>, event: InternalEvent) -> Self {
        Self::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(event = event.name(), "Scheduled event firing");
            // The controller being gone just means the kiosk is shutting down.
            let _ = events.send(event);
        })
    }

    /// Cancels the task. Same as dropping it.
    pub fn cancel(self) {}
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
