//! Market data session gateway: login sequencing, subscription management
//! and tick delivery.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::core::config::ConnectConfig;
use crate::core::errors::GatewayError;
use crate::core::events::MarketDataEvents;
use crate::core::messages::{
    describe_admission, LoginRequest, MarketDataTick, OutboundRequest, RspInfo, SubscribeRequest,
};
use crate::core::transport::FrontTransport;
use crate::core::types::{DisconnectReason, SessionState};
use crate::gateway::session::Session;

/// Buffered ticks before the consumer applies backpressure to delivery.
const TICK_CHANNEL_CAPACITY: usize = 1024;

/// Market data session gateway.
///
/// Walks a shorter establishment ladder than the trading session - no
/// authentication and no settlement step, login lands directly in `Ready`.
/// Subscriptions are remembered across reconnects and replayed after every
/// successful login.
pub struct MarketDataGateway<T: FrontTransport> {
    transport: T,
    config: ConnectConfig,
    session: Mutex<Session>,
    subscriptions: Mutex<HashSet<String>>,
    trading_day: Mutex<Option<String>>,
    tick_tx: mpsc::Sender<MarketDataTick>,
    tick_rx: Mutex<Option<mpsc::Receiver<MarketDataTick>>>,
}

impl<T: FrontTransport> MarketDataGateway<T> {
    pub fn new(transport: T, config: ConnectConfig) -> Self {
        let (tick_tx, tick_rx) = mpsc::channel(TICK_CHANNEL_CAPACITY);
        Self {
            transport,
            config,
            session: Mutex::new(Session::new()),
            subscriptions: Mutex::new(HashSet::new()),
            trading_day: Mutex::new(None),
            tick_tx,
            tick_rx: Mutex::new(Some(tick_rx)),
        }
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Trading day recorded at the most recent successful login, `None`
    /// before the first one.
    pub async fn trading_day(&self) -> Option<String> {
        self.trading_day.lock().await.clone()
    }

    /// Take the tick receiver. Yields `Some` exactly once; the gateway keeps
    /// the sending half and forwards every accepted tick into it.
    pub async fn tick_stream(&self) -> Option<mpsc::Receiver<MarketDataTick>> {
        let mut rx = self.tick_rx.lock().await;
        rx.take()
    }

    /// Register the front address and start the transport. A repeated call
    /// on a live connection re-drives login instead.
    #[instrument(skip(self), fields(address = %self.config.front_address))]
    pub async fn connect(&self) -> Result<(), GatewayError> {
        self.config.validate()?;

        let started = {
            let mut session = self.session.lock().await;
            session.begin_connect()
        };
        if !started {
            info!("already connected, re-driving login");
            return self.login().await;
        }

        let address = self.config.prepared_address();
        self.transport.register_front(&address).await;
        self.transport.init().await?;
        info!(%address, "market data front registered");
        Ok(())
    }

    /// Send the login request unless already logged in. The market front
    /// accepts the same credential record as the trading front.
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<(), GatewayError> {
        let request = {
            let mut session = self.session.lock().await;
            if session.state() == SessionState::Disconnected {
                return Err(GatewayError::NotConnected);
            }
            if !session.begin_login() {
                return Ok(());
            }
            LoginRequest {
                broker_id: self.config.broker_id.clone(),
                user_id: self.config.user_id.clone(),
                password: self.config.password.clone(),
                user_product_info: self.config.user_product_info.clone(),
                request_id: session.next_request_id(),
            }
        };

        let request_id = request.request_id;
        let code = self.transport.send(OutboundRequest::Login(request)).await;
        if code != 0 {
            error!(code, detail = describe_admission(code), "login request not admitted");
            return Err(GatewayError::TransportRejected {
                operation: "login",
                code,
            });
        }
        debug!(request_id, "market data login request sent");
        Ok(())
    }

    /// Subscribe to one instrument's tick stream.
    ///
    /// Membership is optimistic and monotonic: the instrument joins the
    /// subscription set immediately and is never removed, even when the
    /// front later rejects it. Before login the request is deferred and
    /// replayed once the session is ready. A repeated subscription is a
    /// no-op and sends nothing.
    #[instrument(skip(self), fields(instrument = %instrument_id))]
    pub async fn subscribe(&self, instrument_id: &str) -> Result<(), GatewayError> {
        {
            let mut subscriptions = self.subscriptions.lock().await;
            if !subscriptions.insert(instrument_id.to_string()) {
                debug!("already subscribed, skipping");
                return Ok(());
            }
        }

        {
            let session = self.session.lock().await;
            if session.state() != SessionState::Ready {
                info!(state = %session.state(), "not logged in, subscription deferred until login");
                return Ok(());
            }
        }

        self.send_subscribe(instrument_id).await
    }

    /// Snapshot of the current subscription set.
    pub async fn subscriptions(&self) -> Vec<String> {
        let subscriptions = self.subscriptions.lock().await;
        let mut list: Vec<String> = subscriptions.iter().cloned().collect();
        list.sort();
        list
    }

    async fn send_subscribe(&self, instrument_id: &str) -> Result<(), GatewayError> {
        let code = self
            .transport
            .send(OutboundRequest::Subscribe(SubscribeRequest {
                instrument_id: instrument_id.to_string(),
            }))
            .await;
        if code != 0 {
            error!(
                instrument = %instrument_id,
                code,
                detail = describe_admission(code),
                "subscription request not admitted"
            );
            return Err(GatewayError::TransportRejected {
                operation: "subscribe",
                code,
            });
        }
        debug!(instrument = %instrument_id, "subscription request sent");
        Ok(())
    }

    /// Replay every remembered subscription, used after a relogin.
    async fn resubscribe_all(&self) {
        let instruments = self.subscriptions().await;
        for instrument_id in instruments {
            if let Err(e) = self.send_subscribe(&instrument_id).await {
                error!(instrument = %instrument_id, error = %e, "resubscription failed");
            }
        }
    }
}

#[async_trait]
impl<T: FrontTransport> MarketDataEvents for MarketDataGateway<T> {
    async fn on_connected(&self) {
        info!("market data front connected");
        {
            let mut session = self.session.lock().await;
            session.on_connected();
        }
        if let Err(e) = self.login().await {
            error!(error = %e, "market data login failed after connect");
        }
    }

    async fn on_disconnected(&self, reason: DisconnectReason) {
        error!(%reason, "market data front disconnected");
        let mut session = self.session.lock().await;
        session.on_disconnected(reason);
    }

    async fn on_login_response(&self, error: RspInfo, request_id: i32, _is_last: bool) {
        if !error.is_ok() {
            error!(
                request_id,
                code = error.code,
                message = %error.message,
                "market data login failed"
            );
            let mut session = self.session.lock().await;
            session.login_failed();
            return;
        }

        {
            let mut session = self.session.lock().await;
            // The market front does not assign front/session ids.
            session.mark_ready();
        }

        let trading_day = chrono::Local::now().format("%Y%m%d").to_string();
        info!(trading_day = %trading_day, "market data login succeeded");
        {
            let mut recorded = self.trading_day.lock().await;
            *recorded = Some(trading_day);
        }

        self.resubscribe_all().await;
    }

    async fn on_request_error(&self, error: RspInfo, request_id: i32, _is_last: bool) {
        if !error.is_ok() {
            error!(
                request_id,
                code = error.code,
                message = %error.message,
                "market data request error"
            );
        }
    }

    async fn on_subscription_response(
        &self,
        instrument_id: String,
        error: RspInfo,
        _request_id: i32,
        _is_last: bool,
    ) {
        // Observational only: the subscription set never shrinks.
        if error.is_ok() {
            info!(instrument = %instrument_id, "subscription confirmed");
        } else {
            error!(
                instrument = %instrument_id,
                code = error.code,
                message = %error.message,
                "subscription rejected"
            );
        }
    }

    async fn on_market_data_tick(&self, tick: MarketDataTick) {
        if !tick.has_update_time() {
            warn!(instrument = %tick.instrument_id, "tick without update time, dropping");
            return;
        }

        debug!(
            instrument = %tick.instrument_id,
            last_price = %tick.last_price,
            volume = tick.volume,
            update_time = %tick.update_time.as_deref().unwrap_or_default(),
            "tick received"
        );

        if let Err(e) = self.tick_tx.send(tick).await {
            warn!(instrument = %e.0.instrument_id, "tick consumer gone, dropping tick");
        }
    }
}
