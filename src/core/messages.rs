//! Typed request and response records exchanged with the front.
//!
//! The wire protocol moves opaque keyed records; each message kind gets an
//! immutable struct here with the contract fields the gateway relies on.
//! Serde renames follow the front's field naming so serialized records line
//! up with what appears in transport-level logs.

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::core::types::OrderState;

/// Business-level response information attached to every correlated response.
///
/// A code of zero means success; anything else is a domain error the caller
/// decides how to handle. The gateway never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RspInfo {
    #[serde(rename = "ErrorID")]
    pub code: i32,
    #[serde(rename = "ErrorMsg")]
    pub message: String,
}

impl RspInfo {
    pub fn ok() -> Self {
        Self {
            code: 0,
            message: String::new(),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Client authentication request, sent before login when an auth code is
/// configured.
#[derive(Debug, Clone)]
pub struct AuthenticateRequest {
    pub broker_id: String,
    pub user_id: String,
    pub auth_code: Secret<String>,
    pub app_id: String,
    pub request_id: i32,
}

impl AuthenticateRequest {
    pub fn auth_code(&self) -> &str {
        self.auth_code.expose_secret()
    }
}

/// User login request. Shared by the trading and market data sessions; the
/// market front currently ignores the password but requires matching broker
/// and user ids when identity checking is enabled.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub broker_id: String,
    pub user_id: String,
    pub password: Secret<String>,
    pub user_product_info: String,
    pub request_id: i32,
}

impl LoginRequest {
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Successful login payload. The front and session ids captured here are the
/// only valid source for building order identities until the next disconnect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "FrontID")]
    pub front_id: i32,
    #[serde(rename = "SessionID")]
    pub session_id: i32,
    #[serde(rename = "TradingDay", default)]
    pub trading_day: String,
    #[serde(rename = "LoginTime", default)]
    pub login_time: String,
}

/// Settlement confirmation request, issued once per session after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfirmRequest {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "InvestorID")]
    pub investor_id: String,
    #[serde(rename = "RequestID")]
    pub request_id: i32,
}

/// Order insertion request. Built once, never mutated after transmission.
///
/// Everything below `stop_price` is the fixed limit-order profile: limit
/// price type, good-for-day, any-volume, immediate trigger, speculation
/// hedge, not a force close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInsertRequest {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "InvestorID")]
    pub investor_id: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    #[serde(rename = "ExchangeID")]
    pub exchange_id: String,
    #[serde(rename = "OrderRef")]
    pub order_ref: String,
    #[serde(rename = "Direction")]
    pub direction: char,
    #[serde(rename = "CombOffsetFlag")]
    pub comb_offset_flag: char,
    #[serde(rename = "LimitPrice", with = "rust_decimal::serde::str")]
    pub limit_price: Decimal,
    #[serde(rename = "StopPrice", with = "rust_decimal::serde::str")]
    pub stop_price: Decimal,
    #[serde(rename = "VolumeTotalOriginal")]
    pub volume_total_original: u32,
    #[serde(rename = "MinVolume")]
    pub min_volume: u32,
    #[serde(rename = "RequestID")]
    pub request_id: i32,
    #[serde(rename = "OrderPriceType")]
    pub order_price_type: char,
    #[serde(rename = "TimeCondition")]
    pub time_condition: char,
    #[serde(rename = "VolumeCondition")]
    pub volume_condition: char,
    #[serde(rename = "ContingentCondition")]
    pub contingent_condition: char,
    #[serde(rename = "CombHedgeFlag")]
    pub comb_hedge_flag: char,
    #[serde(rename = "ForceCloseReason")]
    pub force_close_reason: char,
    #[serde(rename = "IsAutoSuspend")]
    pub is_auto_suspend: i32,
    #[serde(rename = "IsSwapOrder")]
    pub is_swap_order: i32,
}

/// The identifying slice of an order insertion echoed back on both rejection
/// channels. The order ref plus instrument is the only correlation available
/// on the uncorrelated channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInsertEcho {
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    #[serde(rename = "OrderRef")]
    pub order_ref: String,
}

/// Order action (cancellation) request. The front/session/order-ref triple
/// comes from the identity being cancelled, not the current session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderActionRequest {
    #[serde(rename = "BrokerID")]
    pub broker_id: String,
    #[serde(rename = "InvestorID")]
    pub investor_id: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    #[serde(rename = "ExchangeID")]
    pub exchange_id: String,
    #[serde(rename = "OrderRef")]
    pub order_ref: String,
    #[serde(rename = "FrontID")]
    pub front_id: i32,
    #[serde(rename = "SessionID")]
    pub session_id: i32,
    #[serde(rename = "ActionFlag")]
    pub action_flag: char,
    #[serde(rename = "RequestID")]
    pub request_id: i32,
}

/// Market data subscription request. Not correlated by request id on the
/// wire; the response carries the instrument instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
}

/// Private-stream order status notification. The embedded front/session ids
/// are authoritative for identity reconstruction - they may belong to an
/// earlier login session than the current one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    #[serde(rename = "FrontID")]
    pub front_id: i32,
    #[serde(rename = "SessionID")]
    pub session_id: i32,
    #[serde(rename = "OrderRef")]
    pub order_ref: i32,
    #[serde(rename = "OrderStatus")]
    pub status: OrderState,
    #[serde(rename = "StatusMsg", default)]
    pub status_message: String,
}

/// Private-stream fill notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeNotification {
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    #[serde(rename = "TradeID")]
    pub trade_id: String,
    #[serde(rename = "OrderSysID")]
    pub order_sys_id: Option<String>,
    #[serde(rename = "Price", with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(rename = "Volume")]
    pub volume: u32,
    #[serde(rename = "TradeDate", default)]
    pub trade_date: String,
    #[serde(rename = "TradeTime", default)]
    pub trade_time: String,
}

/// Depth market data tick. Ticks without an update time are malformed and
/// are dropped at the gateway boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataTick {
    #[serde(rename = "InstrumentID")]
    pub instrument_id: String,
    #[serde(rename = "LastPrice", with = "rust_decimal::serde::str")]
    pub last_price: Decimal,
    #[serde(rename = "Volume")]
    pub volume: i64,
    #[serde(rename = "UpdateTime")]
    pub update_time: Option<String>,
    #[serde(rename = "UpdateMillisec", default)]
    pub update_millisec: i32,
    #[serde(rename = "BidPrice1", default, with = "rust_decimal::serde::str_option")]
    pub bid_price1: Option<Decimal>,
    #[serde(rename = "BidVolume1", default)]
    pub bid_volume1: i32,
    #[serde(rename = "AskPrice1", default, with = "rust_decimal::serde::str_option")]
    pub ask_price1: Option<Decimal>,
    #[serde(rename = "AskVolume1", default)]
    pub ask_volume1: i32,
}

impl MarketDataTick {
    /// True when the tick carries a usable update time.
    pub fn has_update_time(&self) -> bool {
        self.update_time.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// One outbound request as handed to the transport.
#[derive(Debug, Clone)]
pub enum OutboundRequest {
    Authenticate(AuthenticateRequest),
    Login(LoginRequest),
    SettlementConfirm(SettlementConfirmRequest),
    OrderInsert(OrderInsertRequest),
    OrderAction(OrderActionRequest),
    Subscribe(SubscribeRequest),
}

impl OutboundRequest {
    /// Operation name for logging and error context.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Authenticate(_) => "authenticate",
            Self::Login(_) => "login",
            Self::SettlementConfirm(_) => "settlement-confirm",
            Self::OrderInsert(_) => "order-insert",
            Self::OrderAction(_) => "order-action",
            Self::Subscribe(_) => "subscribe",
        }
    }

    /// The correlation id, where the message kind carries one.
    pub fn request_id(&self) -> Option<i32> {
        match self {
            Self::Authenticate(r) => Some(r.request_id),
            Self::Login(r) => Some(r.request_id),
            Self::SettlementConfirm(r) => Some(r.request_id),
            Self::OrderInsert(r) => Some(r.request_id),
            Self::OrderAction(r) => Some(r.request_id),
            Self::Subscribe(_) => None,
        }
    }
}

/// Result of handing a request to the transport.
///
/// Admission reflects local and network acceptance only; exchange-side
/// rejection arrives later through the response channels.
pub fn describe_admission(code: i32) -> &'static str {
    match code {
        0 => "accepted",
        -1 => "network connection failure",
        -2 => "unprocessed request quota exceeded",
        -3 => "per-second request quota exceeded",
        _ => "unknown admission failure",
    }
}
