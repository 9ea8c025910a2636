mod common;

use common::{establish_trading, no_auth_config, simnow_config, RecordingTransport};
use ctpgate::core::messages::RspInfo;
use ctpgate::{
    ConnectConfig, DisconnectReason, GatewayError, SessionState, TraderGateway, TradingEvents,
};

#[tokio::test]
async fn full_establishment_ladder_reaches_ready() {
    let transport = RecordingTransport::new();
    let gateway = TraderGateway::new(transport.clone(), simnow_config());

    gateway.connect().await.unwrap();
    assert_eq!(gateway.session_state().await, SessionState::Connecting);
    assert_eq!(
        transport.registered_addresses().await,
        vec!["tcp://182.254.243.31:30001".to_string()]
    );

    gateway.on_connected().await;
    assert_eq!(gateway.session_state().await, SessionState::Authenticating);

    gateway
        .on_authenticate_response(RspInfo::ok(), 1, true)
        .await;
    assert_eq!(gateway.session_state().await, SessionState::AwaitingLogin);

    gateway
        .on_login_response(Some(common::login_response(10, 2000)), RspInfo::ok(), 2, true)
        .await;
    assert_eq!(gateway.session_state().await, SessionState::SettlementPending);

    gateway.on_settlement_response(RspInfo::ok(), 3, true).await;
    assert_eq!(gateway.session_state().await, SessionState::Ready);

    assert_eq!(
        transport.operations().await,
        vec!["authenticate", "login", "settlement-confirm"]
    );
}

#[tokio::test]
async fn missing_auth_code_selects_direct_login() {
    let transport = RecordingTransport::new();
    let gateway = TraderGateway::new(transport.clone(), no_auth_config());

    gateway.connect().await.unwrap();
    gateway.on_connected().await;

    assert_eq!(gateway.session_state().await, SessionState::AwaitingLogin);
    assert_eq!(transport.operations().await, vec!["login"]);
}

#[tokio::test]
async fn not_authorized_returns_to_connected_for_retry() {
    let transport = RecordingTransport::new();
    let gateway = TraderGateway::new(transport.clone(), simnow_config());

    gateway.connect().await.unwrap();
    gateway.on_connected().await;
    gateway
        .on_authenticate_response(RspInfo::error(63, "CTP:不合法的登录"), 1, true)
        .await;

    assert_eq!(gateway.session_state().await, SessionState::Connected);

    // Caller-driven retry sends a fresh authenticate request.
    gateway.authenticate().await.unwrap();
    assert_eq!(
        transport.operations().await,
        vec!["authenticate", "authenticate"]
    );
}

#[tokio::test]
async fn settlement_confirms_only_on_final_successful_delivery() {
    let transport = RecordingTransport::new();
    let gateway = TraderGateway::new(transport, simnow_config());

    gateway.connect().await.unwrap();
    gateway.on_connected().await;
    gateway
        .on_authenticate_response(RspInfo::ok(), 1, true)
        .await;
    gateway
        .on_login_response(Some(common::login_response(10, 2000)), RspInfo::ok(), 2, true)
        .await;

    // Partial delivery does not enable trading.
    gateway.on_settlement_response(RspInfo::ok(), 3, false).await;
    assert_eq!(gateway.session_state().await, SessionState::SettlementPending);

    gateway.on_settlement_response(RspInfo::ok(), 3, true).await;
    assert_eq!(gateway.session_state().await, SessionState::Ready);
}

#[tokio::test]
async fn settlement_failure_keeps_login_by_default() {
    let transport = RecordingTransport::new();
    let gateway = TraderGateway::new(transport, simnow_config());

    gateway.connect().await.unwrap();
    gateway.on_connected().await;
    gateway
        .on_authenticate_response(RspInfo::ok(), 1, true)
        .await;
    gateway
        .on_login_response(Some(common::login_response(10, 2000)), RspInfo::ok(), 2, true)
        .await;
    gateway
        .on_settlement_response(RspInfo::error(90, "settlement unavailable"), 3, true)
        .await;

    assert_eq!(gateway.session_state().await, SessionState::SettlementPending);
}

#[tokio::test]
async fn settlement_failure_demotes_when_configured() {
    let transport = RecordingTransport::new();
    let config = simnow_config().reset_login_on_settlement_error(true);
    let gateway = TraderGateway::new(transport, config);

    gateway.connect().await.unwrap();
    gateway.on_connected().await;
    gateway
        .on_authenticate_response(RspInfo::ok(), 1, true)
        .await;
    gateway
        .on_login_response(Some(common::login_response(10, 2000)), RspInfo::ok(), 2, true)
        .await;
    gateway
        .on_settlement_response(RspInfo::error(90, "settlement unavailable"), 3, true)
        .await;

    assert_eq!(gateway.session_state().await, SessionState::Connected);
}

#[tokio::test]
async fn login_failure_returns_to_connected() {
    let transport = RecordingTransport::new();
    let gateway = TraderGateway::new(transport, simnow_config());

    gateway.connect().await.unwrap();
    gateway.on_connected().await;
    gateway
        .on_authenticate_response(RspInfo::ok(), 1, true)
        .await;
    gateway
        .on_login_response(None, RspInfo::error(3, "incorrect password"), 2, true)
        .await;

    assert_eq!(gateway.session_state().await, SessionState::Connected);
}

#[tokio::test]
async fn disconnect_from_ready_drops_to_disconnected() {
    let transport = RecordingTransport::new();
    let gateway = TraderGateway::new(transport, simnow_config());

    gateway.connect().await.unwrap();
    establish_trading(&gateway, 10, 2000).await;
    assert_eq!(gateway.session_state().await, SessionState::Ready);

    gateway
        .on_disconnected(DisconnectReason::from_code(0x1001))
        .await;
    assert_eq!(gateway.session_state().await, SessionState::Disconnected);
}

#[tokio::test]
async fn reconnect_rewalks_the_full_ladder() {
    let transport = RecordingTransport::new();
    let gateway = TraderGateway::new(transport.clone(), simnow_config());

    gateway.connect().await.unwrap();
    establish_trading(&gateway, 10, 2000).await;
    gateway
        .on_disconnected(DisconnectReason::HeartbeatReceiveTimeout)
        .await;

    // The transport reconnects on its own and reports connected again.
    establish_trading(&gateway, 11, 3000).await;
    assert_eq!(gateway.session_state().await, SessionState::Ready);

    assert_eq!(
        transport.operations().await,
        vec![
            "authenticate",
            "login",
            "settlement-confirm",
            "authenticate",
            "login",
            "settlement-confirm"
        ]
    );
}

#[tokio::test]
async fn connect_rejects_incomplete_configuration() {
    let transport = RecordingTransport::new();
    let config = ConnectConfig::new(
        String::new(),
        "9999".to_string(),
        "123456".to_string(),
        "password".to_string(),
    );
    let gateway = TraderGateway::new(transport.clone(), config);

    let err = gateway.connect().await.unwrap_err();
    assert!(matches!(err, GatewayError::Config(_)));
    assert!(transport.registered_addresses().await.is_empty());
}
