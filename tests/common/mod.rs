#![allow(dead_code)]

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ctpgate::core::messages::{LoginResponse, MarketDataTick, OutboundRequest, RspInfo};
use ctpgate::core::transport::FrontTransport;
use ctpgate::core::types::OrderIdentity;
use ctpgate::{ConnectConfig, GatewayError, TraderGateway, TradingEvents};

/// In-memory transport that records every request and answers with a
/// configurable admission code.
#[derive(Clone)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
    registered: Arc<Mutex<Vec<String>>>,
    admission: Arc<AtomicI32>,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            registered: Arc::new(Mutex::new(Vec::new())),
            admission: Arc::new(AtomicI32::new(0)),
        }
    }

    /// Admission code returned by every subsequent `send`.
    pub fn set_admission(&self, code: i32) {
        self.admission.store(code, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<OutboundRequest> {
        self.requests.lock().await.clone()
    }

    /// Operation names of every sent request, in order.
    pub async fn operations(&self) -> Vec<&'static str> {
        self.requests
            .lock()
            .await
            .iter()
            .map(OutboundRequest::operation)
            .collect()
    }

    pub async fn registered_addresses(&self) -> Vec<String> {
        self.registered.lock().await.clone()
    }
}

#[async_trait]
impl FrontTransport for RecordingTransport {
    async fn register_front(&self, address: &str) {
        self.registered.lock().await.push(address.to_string());
    }

    async fn init(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn send(&self, request: OutboundRequest) -> i32 {
        self.requests.lock().await.push(request);
        self.admission.load(Ordering::SeqCst)
    }
}

/// SimNow-shaped configuration with the authenticate path enabled.
pub fn simnow_config() -> ConnectConfig {
    ConnectConfig::new(
        "182.254.243.31:30001".to_string(),
        "9999".to_string(),
        "123456".to_string(),
        "password".to_string(),
    )
    .auth_code("0000000000000000".to_string())
    .app_id("simnow_client_test".to_string())
}

/// Configuration without an auth code, selecting the direct-login path.
pub fn no_auth_config() -> ConnectConfig {
    ConnectConfig::new(
        "182.254.243.31:30011".to_string(),
        "9999".to_string(),
        "123456".to_string(),
        "password".to_string(),
    )
}

pub fn login_response(front_id: i32, session_id: i32) -> LoginResponse {
    LoginResponse {
        front_id,
        session_id,
        trading_day: "20260826".to_string(),
        login_time: "21:00:00".to_string(),
    }
}

pub fn tick(instrument_id: &str, update_time: Option<&str>) -> MarketDataTick {
    MarketDataTick {
        instrument_id: instrument_id.to_string(),
        last_price: rust_decimal::Decimal::from(1286),
        volume: 10,
        update_time: update_time.map(ToString::to_string),
        update_millisec: 500,
        bid_price1: None,
        bid_volume1: 0,
        ask_price1: None,
        ask_volume1: 0,
    }
}

pub fn identity(front_id: i32, session_id: i32, order_ref: i32) -> OrderIdentity {
    OrderIdentity::new(front_id, session_id, order_ref)
}

/// Walk the trading gateway through the full establishment ladder to
/// `Ready`, delivering the event stream a healthy front would produce.
pub async fn establish_trading(
    gateway: &TraderGateway<RecordingTransport>,
    front_id: i32,
    session_id: i32,
) {
    gateway.on_connected().await;
    gateway
        .on_authenticate_response(RspInfo::ok(), 1, true)
        .await;
    gateway
        .on_login_response(Some(login_response(front_id, session_id)), RspInfo::ok(), 2, true)
        .await;
    gateway.on_settlement_response(RspInfo::ok(), 3, true).await;
}
