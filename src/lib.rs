//! Futures exchange gateway over a CTP-style front protocol.
//!
//! Two session gateways share one establishment state machine:
//! [`TraderGateway`](crate::gateway::trader::TraderGateway) drives the full
//! connect / authenticate / login / settlement-confirm ladder and manages
//! the order lifecycle; [`MarketDataGateway`](crate::gateway::market_data::MarketDataGateway)
//! skips authentication and settlement and manages tick subscriptions.
//!
//! The transport (connection handling, encoding, reconnection) sits behind
//! [`FrontTransport`](crate::core::transport::FrontTransport); inbound events are
//! delivered through the [`TradingEvents`](crate::core::events::TradingEvents) and
//! [`MarketDataEvents`](crate::core::events::MarketDataEvents) traits, which both
//! gateways implement.

pub mod core;
pub mod gateway;
pub mod utils;

pub use crate::core::config::{ConfigError, ConnectConfig};
pub use crate::core::errors::GatewayError;
pub use crate::core::events::{MarketDataEvents, TradingEvents};
pub use crate::core::messages::{
    LoginResponse, MarketDataTick, OrderInsertEcho, OrderUpdate, OutboundRequest, RspInfo,
    TradeNotification,
};
pub use crate::core::transport::FrontTransport;
pub use crate::core::types::{
    DisconnectReason, OffsetFlag, OrderDirection, OrderIdentity, OrderState, SessionState,
};
pub use crate::gateway::market_data::MarketDataGateway;
pub use crate::gateway::trader::TraderGateway;
