//! Concurrency-safe order bookkeeping: status tracking, the bounded
//! pending-cancel queue and the rejection reconciliation point.

use std::collections::HashMap;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::core::errors::GatewayError;
use crate::core::messages::RspInfo;
use crate::core::types::{OrderIdentity, OrderState};

/// Capacity of the pending-cancel queue. A full queue means cancellations
/// are lagging submissions; further submissions wait for cancel drain.
pub const PENDING_CANCEL_CAPACITY: usize = 100;

/// Tracks every order identity seen by this gateway.
///
/// Status entries grow monotonically and are never removed; the per-identity
/// history records each observed transition so both a `Canceled` and a later
/// `AllTraded` stay visible even though last-write-wins determines the
/// current state.
pub struct OrderTracker {
    statuses: Mutex<HashMap<OrderIdentity, Vec<OrderState>>>,
    rejections: Mutex<HashMap<(String, String), RspInfo>>,
    cancel_tx: mpsc::Sender<OrderIdentity>,
    cancel_rx: Mutex<mpsc::Receiver<OrderIdentity>>,
}

impl Default for OrderTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderTracker {
    pub fn new() -> Self {
        let (cancel_tx, cancel_rx) = mpsc::channel(PENDING_CANCEL_CAPACITY);
        Self {
            statuses: Mutex::new(HashMap::new()),
            rejections: Mutex::new(HashMap::new()),
            cancel_tx,
            cancel_rx: Mutex::new(cancel_rx),
        }
    }

    /// Record a status observation, returning the previous current state.
    /// `Unknown` is invalid at this layer and must be filtered before
    /// calling.
    pub async fn record_status(
        &self,
        identity: OrderIdentity,
        state: OrderState,
    ) -> Option<OrderState> {
        let mut statuses = self.statuses.lock().await;
        let history = statuses.entry(identity).or_default();
        let previous = history.last().copied();
        if let Some(prev) = previous {
            if prev.is_terminal() {
                warn!(
                    order_id = %identity,
                    previous = %prev,
                    next = %state,
                    "status update after terminal state"
                );
            }
        }
        history.push(state);
        previous
    }

    /// Last-known state for one identity.
    pub async fn last_status(&self, identity: &OrderIdentity) -> Option<OrderState> {
        let statuses = self.statuses.lock().await;
        statuses.get(identity).and_then(|h| h.last().copied())
    }

    /// Every observed transition for one identity, oldest first.
    pub async fn history(&self, identity: &OrderIdentity) -> Vec<OrderState> {
        let statuses = self.statuses.lock().await;
        statuses.get(identity).cloned().unwrap_or_default()
    }

    /// Read-only snapshot of all tracked identities and their last-known
    /// state.
    pub async fn summary(&self) -> Vec<(OrderIdentity, OrderState)> {
        let statuses = self.statuses.lock().await;
        statuses
            .iter()
            .filter_map(|(identity, history)| history.last().map(|s| (*identity, *s)))
            .collect()
    }

    /// Enqueue an identity as eligible for cancellation. Waits when the
    /// queue is at capacity - the gateway's only backpressure point.
    pub async fn enqueue_cancel(&self, identity: OrderIdentity) -> Result<(), GatewayError> {
        self.cancel_tx
            .send(identity)
            .await
            .map_err(|_| GatewayError::ChannelClosed("pending-cancel queue".to_string()))
    }

    /// Dequeue the oldest pending identity, waiting for one if the queue is
    /// empty.
    pub async fn dequeue_cancel(&self) -> Result<OrderIdentity, GatewayError> {
        let mut rx = self.cancel_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| GatewayError::ChannelClosed("pending-cancel queue".to_string()))
    }

    /// Non-blocking dequeue; `None` when no identity is pending.
    pub async fn try_dequeue_cancel(&self) -> Option<OrderIdentity> {
        let mut rx = self.cancel_rx.lock().await;
        rx.try_recv().ok()
    }

    /// Record a rejection from either rejection channel. Keyed by the only
    /// fields both channels share; last write wins when both arrive.
    pub async fn record_rejection(&self, instrument_id: &str, order_ref: &str, error: RspInfo) {
        let mut rejections = self.rejections.lock().await;
        rejections.insert((instrument_id.to_string(), order_ref.to_string()), error);
    }

    /// The reconciled rejection for a submission, if any channel reported
    /// one.
    pub async fn rejection_for(&self, instrument_id: &str, order_ref: &str) -> Option<RspInfo> {
        let rejections = self.rejections.lock().await;
        rejections
            .get(&(instrument_id.to_string(), order_ref.to_string()))
            .cloned()
    }
}
