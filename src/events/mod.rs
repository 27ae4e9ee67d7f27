use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

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

    /// Sends an event, logging instead of failing when the channel is closed.
    /// Events are emitted after commit, so a lost event never rolls back data.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "domain event dropped");
        }
    }
}

/// Domain events emitted by the services once their transaction has committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    TenantRegistered {
        tenant_id: Uuid,
        admin_user_id: Uuid,
    },
    SeedStockChanged {
        tenant_id: Uuid,
        cultivar_id: Uuid,
        old_stock: Decimal,
        new_stock: Decimal,
        reason: String,
    },
    SeedStockLow {
        tenant_id: Uuid,
        cultivar_id: Uuid,
        stock: Decimal,
        minimum: Decimal,
    },
    InputStockChanged {
        tenant_id: Uuid,
        product_id: Uuid,
        farm_id: Uuid,
        new_quantity: Decimal,
        reason: String,
    },
    SaleRecorded {
        tenant_id: Uuid,
        sale_id: Uuid,
        quantity: Decimal,
        total_value: Decimal,
    },
    SaleReverted {
        tenant_id: Uuid,
        sale_id: Uuid,
    },
    SaleContractCompleted {
        tenant_id: Uuid,
        contract_id: Uuid,
    },
    SaleContractReopened {
        tenant_id: Uuid,
        contract_id: Uuid,
    },
    SaleContractCancelled {
        tenant_id: Uuid,
        contract_id: Uuid,
    },
    PurchaseOrderCompleted {
        tenant_id: Uuid,
        order_id: Uuid,
    },
    PurchaseOrderCancelled {
        tenant_id: Uuid,
        order_id: Uuid,
    },
    ReceivablePaid {
        tenant_id: Uuid,
        receivable_id: Uuid,
        amount: Decimal,
    },
    PayablePaid {
        tenant_id: Uuid,
        payable_id: Uuid,
        amount: Decimal,
    },
    FuelSupplied {
        tenant_id: Uuid,
        tank_id: Uuid,
        liters: Decimal,
        stock_liters: Decimal,
    },
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            Event::TenantRegistered { tenant_id, .. }
            | Event::SeedStockChanged { tenant_id, .. }
            | Event::SeedStockLow { tenant_id, .. }
            | Event::InputStockChanged { tenant_id, .. }
            | Event::SaleRecorded { tenant_id, .. }
            | Event::SaleReverted { tenant_id, .. }
            | Event::SaleContractCompleted { tenant_id, .. }
            | Event::SaleContractReopened { tenant_id, .. }
            | Event::SaleContractCancelled { tenant_id, .. }
            | Event::PurchaseOrderCompleted { tenant_id, .. }
            | Event::PurchaseOrderCancelled { tenant_id, .. }
            | Event::ReceivablePaid { tenant_id, .. }
            | Event::PayablePaid { tenant_id, .. }
            | Event::FuelSupplied { tenant_id, .. } => Some(*tenant_id),
            Event::Generic { .. } => None,
        }
    }
}

/// Consumes the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::SeedStockLow {
                tenant_id,
                cultivar_id,
                stock,
                minimum,
            } => {
                warn!(
                    tenant_id = %tenant_id,
                    cultivar_id = %cultivar_id,
                    stock = %stock,
                    minimum = %minimum,
                    "seed stock below minimum"
                );
            }
            Event::SeedStockChanged {
                cultivar_id,
                old_stock,
                new_stock,
                reason,
                ..
            } => {
                info!(
                    cultivar_id = %cultivar_id,
                    old_stock = %old_stock,
                    new_stock = %new_stock,
                    reason = %reason,
                    "seed stock changed"
                );
            }
            other => {
                info!(tenant_id = ?other.tenant_id(), event = ?other, "domain event");
            }
        }
    }

    info!("Event channel closed, stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let tenant_id = Uuid::new_v4();
        sender
            .send(Event::SaleReverted {
                tenant_id,
                sale_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.tenant_id(), Some(tenant_id));
    }

    #[tokio::test]
    async fn send_or_log_survives_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        sender.send_or_log(Event::with_data("lost".into())).await;
        assert!(sender.send(Event::with_data("lost".into())).await.is_err());
    }

    #[tokio::test]
    async fn process_events_stops_when_senders_drop() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Event::with_data("hello".into())).await.unwrap();
        drop(tx);
        process_events(rx).await;
    }
}
