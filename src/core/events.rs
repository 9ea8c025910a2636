//! Inbound handler contracts.
//!
//! The callback dispatcher lives outside this crate; these traits define
//! what it must deliver. Within one stream (trading or market data) the
//! dispatcher invokes handlers strictly sequentially, but handlers may run
//! concurrently with outbound operations, so implementations use interior
//! mutability throughout.

use async_trait::async_trait;

use crate::core::messages::{
    LoginResponse, MarketDataTick, OrderInsertEcho, OrderUpdate, RspInfo, TradeNotification,
};
use crate::core::types::DisconnectReason;

/// Events delivered on the trading stream.
#[async_trait]
pub trait TradingEvents: Send + Sync {
    /// The transport established (or re-established) the front connection.
    async fn on_connected(&self);

    /// The transport lost the front connection. It will reconnect on its
    /// own; session identity is stale from this point.
    async fn on_disconnected(&self, reason: DisconnectReason);

    async fn on_authenticate_response(&self, error: RspInfo, request_id: i32, is_last: bool);

    async fn on_login_response(
        &self,
        payload: Option<LoginResponse>,
        error: RspInfo,
        request_id: i32,
        is_last: bool,
    );

    async fn on_logout_response(&self, user_id: String);

    async fn on_settlement_response(&self, error: RspInfo, request_id: i32, is_last: bool);

    /// Correlated order-insert rejection (field validation and the like).
    /// Not invoked for accepted orders in practice, but a zero error code
    /// must be tolerated.
    async fn on_order_insert_response(
        &self,
        payload: Option<OrderInsertEcho>,
        error: RspInfo,
        request_id: i32,
        is_last: bool,
    );

    /// Uncorrelated order-insert rejection. May arrive instead of, before,
    /// after, or in addition to the correlated response for one submission.
    async fn on_order_insert_error(&self, payload: Option<OrderInsertEcho>, error: RspInfo);

    /// Private-stream order status notification.
    async fn on_order_update(&self, update: OrderUpdate);

    /// Private-stream fill notification.
    async fn on_trade(&self, trade: TradeNotification);

    /// Correlated order-action (cancel) rejection.
    async fn on_order_action_response(&self, error: RspInfo, request_id: i32, is_last: bool);
}

/// Events delivered on the market data stream.
#[async_trait]
pub trait MarketDataEvents: Send + Sync {
    async fn on_connected(&self);

    async fn on_disconnected(&self, reason: DisconnectReason);

    async fn on_login_response(&self, error: RspInfo, request_id: i32, is_last: bool);

    /// General request-error notification, not tied to a message kind.
    async fn on_request_error(&self, error: RspInfo, request_id: i32, is_last: bool);

    async fn on_subscription_response(
        &self,
        instrument_id: String,
        error: RspInfo,
        request_id: i32,
        is_last: bool,
    );

    async fn on_market_data_tick(&self, tick: MarketDataTick);
}
