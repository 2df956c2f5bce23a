//! Post-commit domain event emission.
//!
//! Delivery is the external notifier's concern; this side only forwards
//! each committed transition's event to a configured webhook. Emission is
//! fire-and-forget through a channel so a slow or failing endpoint can
//! never hold a transition's transaction.

use tokio::sync::mpsc;
use tracing::{info, warn};

use bursar_core::audit::DomainEvent;
use bursar_shared::config::NotifierConfig;

/// Queues domain events for the external notifier.
pub struct Notifier {
    tx: mpsc::UnboundedSender<DomainEvent>,
}

impl Notifier {
    /// Creates the notifier and spawns its forwarding task.
    #[must_use]
    pub fn new(config: NotifierConfig) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<DomainEvent>();
        tokio::spawn(async move {
            let client = reqwest::Client::new();
            while let Some(event) = rx.recv().await {
                match config.webhook_url.as_deref() {
                    Some(url) => {
                        if let Err(e) = client.post(url).json(&event).send().await {
                            warn!(
                                request_id = %event.request_id,
                                action = %event.action,
                                error = %e,
                                "failed to forward domain event"
                            );
                        }
                    }
                    None => {
                        info!(
                            request_id = %event.request_id,
                            actor_id = %event.actor_id,
                            action = %event.action,
                            cursor = %event.resulting_cursor,
                            "domain event (no webhook configured)"
                        );
                    }
                }
            }
        });
        Self { tx }
    }

    /// Queues an event; never blocks and never fails the caller.
    pub fn emit(&self, event: DomainEvent) {
        let _ = self.tx.send(event);
    }
}
