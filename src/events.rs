use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Domain events emitted by the services after their transaction commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    StockReceived {
        product_id: i64,
        total_bottles: i32,
    },
    LorryLoaded {
        loading_id: i64,
        lorry_id: i64,
        line_count: usize,
    },
    LoadingCancelled {
        loading_id: i64,
        lorry_id: i64,
    },
    LorryUnloaded {
        unloading_id: i64,
        lorry_id: i64,
        line_count: usize,
    },
    UnloadingCancelled {
        unloading_id: i64,
        lorry_id: i64,
    },
    DailySalesReconciled {
        lorry_id: i64,
        sales_date: NaiveDate,
        units_sold: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Processes events from the channel until every sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");

    while let Some(event) = receiver.recv().await {
        match event {
            Event::StockReceived {
                product_id,
                total_bottles,
            } => {
                info!(product_id, total_bottles, "Stock received into ledger");
            }
            Event::LorryLoaded {
                loading_id,
                lorry_id,
                line_count,
            } => {
                info!(loading_id, lorry_id, line_count, "Lorry loaded");
            }
            Event::LoadingCancelled {
                loading_id,
                lorry_id,
            } => {
                info!(loading_id, lorry_id, "Loading transaction cancelled; stock returned");
            }
            Event::LorryUnloaded {
                unloading_id,
                lorry_id,
                line_count,
            } => {
                info!(unloading_id, lorry_id, line_count, "Lorry unloaded");
            }
            Event::UnloadingCancelled {
                unloading_id,
                lorry_id,
            } => {
                info!(unloading_id, lorry_id, "Unloading transaction cancelled");
            }
            Event::DailySalesReconciled {
                lorry_id,
                sales_date,
                units_sold,
            } => {
                info!(lorry_id, %sales_date, units_sold, "Daily sales reconciled");
            }
        }
    }

    warn!("Event processing loop has ended");
}
