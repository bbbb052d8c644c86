use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Domain events emitted by the services after a successful write.
///
/// The processor task consumes these for audit logging; the enum is the
/// single integration point if a consumer ever needs to fan them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Registry events
    CustomerCreated(Uuid),
    CustomerUpdated(Uuid),
    CustomerRemoved(Uuid),

    // Offer events
    OfferCreated(Uuid),
    OfferUpdated(Uuid),
    OfferRemoved(Uuid),

    // Article events
    ArticleCreated(Uuid),
    ArticleUpdated(Uuid),
    ArticleRemoved(Uuid),

    // Production order events
    OrderCreated(Uuid),
    OrderUpdated(Uuid),
    OrderRemoved(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Shop-floor events
    ProductionLogged {
        order_id: Uuid,
        employee_id: Uuid,
        quantity: i32,
    },
    PortalSessionOpened(Uuid),
    PortalSessionClosed(Uuid),

    // Employee events
    EmployeeCreated(Uuid),
    EmployeeUpdated(Uuid),
    EmployeePortalToggled {
        employee_id: Uuid,
        enabled: bool,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes events from the channel until every sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");

    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(
                    order_id = %order_id,
                    old_status = %old_status,
                    new_status = %new_status,
                    "Order status changed"
                );
            }
            Event::ProductionLogged {
                order_id,
                employee_id,
                quantity,
            } => {
                info!(
                    order_id = %order_id,
                    employee_id = %employee_id,
                    quantity = quantity,
                    "Production quantity logged"
                );
            }
            other => {
                debug!(event = ?other, "Domain event");
            }
        }
    }

    warn!("Event channel closed; processor stopping");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event_to_receiver() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let id = Uuid::new_v4();
        sender.send(Event::OrderCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(received)) => assert_eq!(received, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        assert!(sender.send(Event::CustomerCreated(Uuid::new_v4())).await.is_err());
    }
}
