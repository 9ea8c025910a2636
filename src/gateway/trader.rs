//! Trading session gateway: establishment sequencing and the order
//! lifecycle.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::core::config::ConnectConfig;
use crate::core::errors::GatewayError;
use crate::core::events::TradingEvents;
use crate::core::messages::{
    describe_admission, AuthenticateRequest, LoginRequest, LoginResponse, OrderActionRequest,
    OrderInsertEcho, OrderInsertRequest, OrderUpdate, OutboundRequest, RspInfo,
    SettlementConfirmRequest, TradeNotification,
};
use crate::core::transport::FrontTransport;
use crate::core::types::{DisconnectReason, OrderDirection, OrderIdentity, OrderState, SessionState};
use crate::gateway::conversions::{
    direction_to_wire, offset_flag_to_wire, ACTION_FLAG_DELETE, CONTINGENT_IMMEDIATELY,
    FORCE_CLOSE_NOT_FORCED, HEDGE_FLAG_SPECULATION, ORDER_PRICE_TYPE_LIMIT, TIME_CONDITION_GFD,
    VOLUME_CONDITION_ANY,
};
use crate::gateway::orders::OrderTracker;
use crate::gateway::session::Session;

/// Error code the front uses for "client not authorized".
const ERROR_NOT_AUTHORIZED: i32 = 63;

/// Helper to surface a business rejection with full order context
#[cold]
#[inline(never)]
fn report_order_rejection(order_id: &str, instrument_id: &str, error: &RspInfo) {
    error!(
        order_id = %order_id,
        instrument = %instrument_id,
        code = error.code,
        message = %error.message,
        "order submission rejected"
    );
}

/// Trading session gateway.
///
/// Drives connect / authenticate / login / settlement-confirm sequencing,
/// submits and cancels orders and tracks their status. Inbound events arrive
/// through the [`TradingEvents`] implementation; outbound operations may be
/// called concurrently with event delivery.
pub struct TraderGateway<T: FrontTransport> {
    transport: T,
    config: ConnectConfig,
    session: Mutex<Session>,
    orders: OrderTracker,
    symbol_map: Mutex<HashMap<String, String>>,
}

impl<T: FrontTransport> TraderGateway<T> {
    pub fn new(transport: T, config: ConnectConfig) -> Self {
        Self {
            transport,
            config,
            session: Mutex::new(Session::new()),
            orders: OrderTracker::new(),
            symbol_map: Mutex::new(HashMap::new()),
        }
    }

    /// Register the exchange an instrument trades on. Orders for
    /// unregistered instruments fail fast.
    pub async fn register_instrument(&self, symbol: impl Into<String>, exchange: impl Into<String>) {
        let mut map = self.symbol_map.lock().await;
        map.insert(symbol.into(), exchange.into());
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Register the front address and start the transport. The connected
    /// outcome arrives later via `on_connected`; a repeated call on a live
    /// connection re-drives authentication instead.
    #[instrument(skip(self), fields(address = %self.config.front_address))]
    pub async fn connect(&self) -> Result<(), GatewayError> {
        self.config.validate()?;

        let started = {
            let mut session = self.session.lock().await;
            session.begin_connect()
        };
        if !started {
            info!("already connected, re-driving authentication");
            return self.ensure_login().await;
        }

        let address = self.config.prepared_address();
        self.transport.register_front(&address).await;
        self.transport.init().await?;
        info!(%address, "trading front registered");
        Ok(())
    }

    /// Send the authentication request unless this connection already
    /// authenticated.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<(), GatewayError> {
        let Some(auth_code) = self.config.auth_code.clone() else {
            // No auth code configured; login directly.
            return self.login().await;
        };

        let request = {
            let mut session = self.session.lock().await;
            if session.state() == SessionState::Disconnected {
                return Err(GatewayError::NotConnected);
            }
            if !session.begin_authenticate() {
                return Ok(());
            }
            AuthenticateRequest {
                broker_id: self.config.broker_id.clone(),
                user_id: self.config.user_id.clone(),
                auth_code,
                app_id: self.config.app_id.clone(),
                request_id: session.next_request_id(),
            }
        };

        let request_id = request.request_id;
        let code = self
            .transport
            .send(OutboundRequest::Authenticate(request))
            .await;
        if code != 0 {
            error!(code, detail = describe_admission(code), "authenticate request not admitted");
            return Err(GatewayError::TransportRejected {
                operation: "authenticate",
                code,
            });
        }
        debug!(request_id, "authenticate request sent");
        Ok(())
    }

    /// Send the login request unless already logged in.
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
        debug!(request_id, "login request sent");
        Ok(())
    }

    /// Submit a limit order.
    ///
    /// The returned identity is built from the live front/session ids and a
    /// freshly incremented order ref, and is enqueued as eligible for
    /// cancellation. A nonzero transport admission code is reported but does
    /// not suppress the identity: exchange-side rejection arrives later on
    /// its own channels, and local bookkeeping must already be in place.
    #[instrument(skip(self), fields(symbol = %symbol, direction = %direction, %price, volume))]
    pub async fn submit(
        &self,
        symbol: &str,
        direction: OrderDirection,
        price: Decimal,
        volume: u32,
    ) -> Result<OrderIdentity, GatewayError> {
        let exchange_id = self.exchange_for(symbol).await?;

        let (request, identity) = {
            let mut session = self.session.lock().await;
            if session.state() != SessionState::Ready {
                return Err(GatewayError::NotReady {
                    state: session.state(),
                });
            }
            let order_ref = session.next_order_ref();
            let request_id = session.next_request_id();
            // Ready implies a live identity.
            let identity = session
                .order_identity(order_ref)
                .ok_or(GatewayError::NotConnected)?;
            let request = OrderInsertRequest {
                broker_id: self.config.broker_id.clone(),
                investor_id: self.config.user_id.clone(),
                user_id: self.config.user_id.clone(),
                instrument_id: symbol.to_string(),
                exchange_id,
                order_ref: order_ref.to_string(),
                direction: direction_to_wire(direction),
                comb_offset_flag: offset_flag_to_wire(direction.offset_flag()),
                limit_price: price,
                stop_price: Decimal::ZERO,
                volume_total_original: volume,
                min_volume: 1,
                request_id,
                order_price_type: ORDER_PRICE_TYPE_LIMIT,
                time_condition: TIME_CONDITION_GFD,
                volume_condition: VOLUME_CONDITION_ANY,
                contingent_condition: CONTINGENT_IMMEDIATELY,
                comb_hedge_flag: HEDGE_FLAG_SPECULATION,
                force_close_reason: FORCE_CLOSE_NOT_FORCED,
                is_auto_suspend: 0,
                is_swap_order: 0,
            };
            (request, identity)
        };

        let code = self
            .transport
            .send(OutboundRequest::OrderInsert(request))
            .await;
        if code == 0 {
            info!(order_id = %identity, "order submitted");
        } else {
            // Admission only reflects local/network acceptance; the order
            // may still have left the process, so bookkeeping proceeds.
            error!(
                order_id = %identity,
                code,
                detail = describe_admission(code),
                "order insert not admitted"
            );
        }

        self.orders.enqueue_cancel(identity).await?;
        Ok(identity)
    }

    /// Cancel the oldest pending order.
    ///
    /// Deliberately FIFO-only: the dequeued identity is not cross-checked
    /// against `symbol`, which only fills the action record's instrument and
    /// exchange fields. Waits when no identity is pending. The cancellation
    /// outcome arrives asynchronously via `on_order_action_response`.
    #[instrument(skip(self), fields(symbol = %symbol))]
    pub async fn cancel(&self, symbol: &str) -> Result<OrderIdentity, GatewayError> {
        let exchange_id = self.exchange_for(symbol).await?;
        let identity = self.orders.dequeue_cancel().await?;

        let request = {
            let mut session = self.session.lock().await;
            OrderActionRequest {
                broker_id: self.config.broker_id.clone(),
                investor_id: self.config.user_id.clone(),
                user_id: self.config.user_id.clone(),
                instrument_id: symbol.to_string(),
                exchange_id,
                order_ref: identity.order_ref.to_string(),
                front_id: identity.front_id,
                session_id: identity.session_id,
                action_flag: ACTION_FLAG_DELETE,
                request_id: session.next_request_id(),
            }
        };

        let code = self
            .transport
            .send(OutboundRequest::OrderAction(request))
            .await;
        if code == 0 {
            info!(order_id = %identity, "cancel requested");
        } else {
            error!(
                order_id = %identity,
                code,
                detail = describe_admission(code),
                "order action not admitted"
            );
        }
        Ok(identity)
    }

    /// Read-only snapshot of every tracked identity and its last-known
    /// state.
    pub async fn status_summary(&self) -> Vec<(OrderIdentity, OrderState)> {
        self.orders.summary().await
    }

    /// Every observed status transition for one identity, oldest first.
    pub async fn status_history(&self, identity: &OrderIdentity) -> Vec<OrderState> {
        self.orders.history(identity).await
    }

    /// The reconciled rejection for a submission, from whichever rejection
    /// channel reported one.
    pub async fn rejection_for(&self, instrument_id: &str, order_ref: &str) -> Option<RspInfo> {
        self.orders.rejection_for(instrument_id, order_ref).await
    }

    async fn exchange_for(&self, symbol: &str) -> Result<String, GatewayError> {
        let map = self.symbol_map.lock().await;
        map.get(symbol)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownInstrument(symbol.to_string()))
    }

    /// Drive the right establishment step for the configured credential
    /// shape.
    async fn ensure_login(&self) -> Result<(), GatewayError> {
        if self.config.has_auth_code() {
            self.authenticate().await
        } else {
            self.login().await
        }
    }

    async fn send_settlement_confirm(&self) -> Result<(), GatewayError> {
        let request = {
            let mut session = self.session.lock().await;
            session.begin_settlement();
            SettlementConfirmRequest {
                broker_id: self.config.broker_id.clone(),
                investor_id: self.config.user_id.clone(),
                request_id: session.next_request_id(),
            }
        };
        let code = self
            .transport
            .send(OutboundRequest::SettlementConfirm(request))
            .await;
        if code != 0 {
            error!(
                code,
                detail = describe_admission(code),
                "settlement confirm not admitted"
            );
            return Err(GatewayError::TransportRejected {
                operation: "settlement-confirm",
                code,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<T: FrontTransport> TradingEvents for TraderGateway<T> {
    async fn on_connected(&self) {
        info!("trading front connected");
        {
            let mut session = self.session.lock().await;
            session.on_connected();
        }
        if let Err(e) = self.ensure_login().await {
            error!(error = %e, "establishment step failed after connect");
        }
    }

    async fn on_disconnected(&self, reason: DisconnectReason) {
        error!(%reason, "trading front disconnected");
        let mut session = self.session.lock().await;
        session.on_disconnected(reason);
    }

    async fn on_authenticate_response(&self, error: RspInfo, request_id: i32, _is_last: bool) {
        if error.is_ok() {
            info!(request_id, "authentication succeeded");
            if let Err(e) = self.login().await {
                error!(error = %e, "login after authentication failed");
            }
            return;
        }

        {
            let mut session = self.session.lock().await;
            session.authenticate_failed();
        }
        if error.code == ERROR_NOT_AUTHORIZED {
            error!(
                code = error.code,
                message = %error.message,
                "client not authorized; caller may retry authenticate"
            );
        } else {
            error!(
                code = error.code,
                message = %error.message,
                "authentication failed"
            );
        }
    }

    async fn on_login_response(
        &self,
        payload: Option<LoginResponse>,
        error: RspInfo,
        request_id: i32,
        _is_last: bool,
    ) {
        if !error.is_ok() {
            error!(
                request_id,
                code = error.code,
                message = %error.message,
                "trading login failed"
            );
            let mut session = self.session.lock().await;
            session.login_failed();
            return;
        }

        let Some(login) = payload else {
            warn!(request_id, "login response without payload, treating as failed");
            let mut session = self.session.lock().await;
            session.login_failed();
            return;
        };

        {
            let mut session = self.session.lock().await;
            session.login_succeeded(login.front_id, login.session_id);
        }
        info!(
            front_id = login.front_id,
            session_id = login.session_id,
            trading_day = %login.trading_day,
            "trading login succeeded"
        );

        if let Err(e) = self.send_settlement_confirm().await {
            error!(error = %e, "settlement confirmation request failed");
        }
    }

    async fn on_logout_response(&self, user_id: String) {
        info!(user_id = %user_id, "trading account logged out");
    }

    async fn on_settlement_response(&self, error: RspInfo, request_id: i32, is_last: bool) {
        if !error.is_ok() {
            error!(
                request_id,
                code = error.code,
                message = %error.message,
                "settlement confirmation failed"
            );
            let mut session = self.session.lock().await;
            session.settlement_failed(self.config.reset_login_on_settlement_error);
            return;
        }

        // Only the final delivery with a zero code enables trading.
        if is_last {
            let confirmed = {
                let mut session = self.session.lock().await;
                session.settlement_confirmed()
            };
            if confirmed {
                info!("settlement confirmed, session ready for trading");
            }
        }
    }

    async fn on_order_insert_response(
        &self,
        payload: Option<OrderInsertEcho>,
        error: RspInfo,
        request_id: i32,
        _is_last: bool,
    ) {
        if error.is_ok() {
            return;
        }

        let Some(echo) = payload else {
            error!(
                request_id,
                code = error.code,
                message = %error.message,
                "order insert rejected with incomplete payload"
            );
            return;
        };

        // Response-channel rejection: the identity is rebuilt against the
        // current session view, matching how the submission was keyed.
        let order_id = {
            let session = self.session.lock().await;
            session
                .identity()
                .map(|id| format!("{}_{}_{}", id.front_id, id.session_id, echo.order_ref))
                .unwrap_or_else(|| format!("?_?_{}", echo.order_ref))
        };
        report_order_rejection(&order_id, &echo.instrument_id, &error);
        self.orders
            .record_rejection(&echo.instrument_id, &echo.order_ref, error)
            .await;
    }

    async fn on_order_insert_error(&self, payload: Option<OrderInsertEcho>, error: RspInfo) {
        if error.is_ok() {
            return;
        }

        let Some(echo) = payload else {
            error!(
                code = error.code,
                message = %error.message,
                "order insert error notification with incomplete payload"
            );
            return;
        };

        // Uncorrelated channel: only instrument and order ref identify the
        // submission.
        error!(
            instrument = %echo.instrument_id,
            order_ref = %echo.order_ref,
            code = error.code,
            message = %error.message,
            "order insert error notification"
        );
        self.orders
            .record_rejection(&echo.instrument_id, &echo.order_ref, error)
            .await;
    }

    async fn on_order_update(&self, update: OrderUpdate) {
        if update.status == OrderState::Unknown {
            warn!(
                instrument = %update.instrument_id,
                order_ref = update.order_ref,
                "unsupported order status, ignoring update"
            );
            return;
        }

        // The ids embedded in the notification are authoritative - they may
        // belong to a previous login session.
        let identity =
            OrderIdentity::new(update.front_id, update.session_id, update.order_ref);
        let previous = self.orders.record_status(identity, update.status).await;

        info!(
            order_id = %identity,
            instrument = %update.instrument_id,
            previous = %previous.map_or_else(|| "new".to_string(), |s| s.to_string()),
            status = %update.status,
            "order status update"
        );
    }

    async fn on_trade(&self, trade: TradeNotification) {
        let Some(order_sys_id) = trade.order_sys_id.as_deref() else {
            warn!(
                instrument = %trade.instrument_id,
                trade_id = %trade.trade_id,
                "trade notification missing order system id"
            );
            return;
        };

        info!(
            instrument = %trade.instrument_id,
            trade_id = %trade.trade_id,
            order_sys_id = %order_sys_id,
            price = %trade.price,
            volume = trade.volume,
            trade_date = %trade.trade_date,
            trade_time = %trade.trade_time,
            "trade filled"
        );
    }

    async fn on_order_action_response(&self, error: RspInfo, request_id: i32, _is_last: bool) {
        if !error.is_ok() {
            error!(
                request_id,
                code = error.code,
                message = %error.message,
                "order cancellation rejected"
            );
        }
    }
}
