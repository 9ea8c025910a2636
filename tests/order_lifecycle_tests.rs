mod common;

use common::{establish_trading, identity, simnow_config, RecordingTransport};
use ctpgate::core::messages::{OrderInsertEcho, OrderUpdate, OutboundRequest, RspInfo};
use ctpgate::{
    DisconnectReason, GatewayError, OrderDirection, OrderState, TraderGateway, TradingEvents,
};
use rust_decimal::Decimal;

async fn ready_gateway(
    transport: &RecordingTransport,
) -> TraderGateway<RecordingTransport> {
    let gateway = TraderGateway::new(transport.clone(), simnow_config());
    gateway.connect().await.unwrap();
    establish_trading(&gateway, 10, 2000).await;
    gateway.register_instrument("SA601", "CZCE").await;
    gateway
}

#[tokio::test]
async fn submit_builds_identity_from_live_session() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    let id = gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap();
    assert_eq!(id.to_string(), "10_2000_1");

    let sent = transport.sent().await;
    let Some(OutboundRequest::OrderInsert(request)) = sent.last() else {
        panic!("expected an order insert request, got {:?}", sent.last());
    };
    assert_eq!(request.instrument_id, "SA601");
    assert_eq!(request.exchange_id, "CZCE");
    assert_eq!(request.order_ref, "1");
    assert_eq!(request.direction, '0');
    assert_eq!(request.comb_offset_flag, '0');
    assert_eq!(request.limit_price, Decimal::from(1286));
    assert_eq!(request.volume_total_original, 1);
    assert_eq!(request.min_volume, 1);
}

#[tokio::test]
async fn order_refs_and_request_ids_are_monotonic() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    let first = gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap();
    let second = gateway
        .submit("SA601", OrderDirection::SellClose, Decimal::from(1290), 2)
        .await
        .unwrap();

    assert_eq!(first.order_ref, 1);
    assert_eq!(second.order_ref, 2);

    let request_ids: Vec<i32> = transport
        .sent()
        .await
        .iter()
        .filter_map(OutboundRequest::request_id)
        .collect();
    let mut sorted = request_ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(request_ids, sorted, "request ids must be strictly increasing");
}

#[tokio::test]
async fn submit_requires_ready_session() {
    let transport = RecordingTransport::new();
    let gateway = TraderGateway::new(transport.clone(), simnow_config());
    gateway.register_instrument("SA601", "CZCE").await;

    let err = gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotReady { .. }));
    assert!(transport.sent().await.is_empty());
}

#[tokio::test]
async fn submit_fails_fast_on_unregistered_instrument() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    let err = gateway
        .submit("rb2610", OrderDirection::BuyOpen, Decimal::from(3000), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::UnknownInstrument(ref s) if s == "rb2610"));

    // The failure happens before any counter is consumed.
    let id = gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap();
    assert_eq!(id.order_ref, 1);
}

#[tokio::test]
async fn submit_after_disconnect_is_rejected() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    gateway
        .on_disconnected(DisconnectReason::from_code(0x1001))
        .await;

    let err = gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotReady { .. }));
}

#[tokio::test]
async fn rejected_admission_still_yields_a_tracked_identity() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    transport.set_admission(-2);
    let id = gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap();
    assert_eq!(id.to_string(), "10_2000_1");

    // The identity is still eligible for cancellation.
    transport.set_admission(0);
    let canceled = gateway.cancel("SA601").await.unwrap();
    assert_eq!(canceled, id);
}

#[tokio::test]
async fn cancel_dequeues_oldest_pending_order() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap();
    gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1287), 1)
        .await
        .unwrap();

    let first = gateway.cancel("SA601").await.unwrap();
    assert_eq!(first, identity(10, 2000, 1));

    let sent = transport.sent().await;
    let Some(OutboundRequest::OrderAction(action)) = sent.last() else {
        panic!("expected an order action request, got {:?}", sent.last());
    };
    assert_eq!(action.order_ref, "1");
    assert_eq!(action.front_id, 10);
    assert_eq!(action.session_id, 2000);
    assert_eq!(action.action_flag, '0');
    assert_eq!(action.instrument_id, "SA601");
    assert_eq!(action.exchange_id, "CZCE");

    let second = gateway.cancel("SA601").await.unwrap();
    assert_eq!(second, identity(10, 2000, 2));
}

#[tokio::test]
async fn cancel_targets_the_original_session_after_reconnect() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap();

    gateway
        .on_disconnected(DisconnectReason::NetworkReadFailure)
        .await;
    establish_trading(&gateway, 11, 3000).await;

    // New submissions carry the new session pair and a never-reused ref.
    let fresh = gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap();
    assert_eq!(fresh, identity(11, 3000, 2));

    // The queued cancellation still addresses the pre-disconnect order.
    let canceled = gateway.cancel("SA601").await.unwrap();
    assert_eq!(canceled, identity(10, 2000, 1));
}

#[tokio::test]
async fn rejections_reconcile_from_either_channel() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    gateway
        .submit("SA601", OrderDirection::BuyOpen, Decimal::from(1286), 1)
        .await
        .unwrap();

    let echo = OrderInsertEcho {
        instrument_id: "SA601".to_string(),
        order_ref: "1".to_string(),
    };

    // The uncorrelated channel arrives first.
    gateway
        .on_order_insert_error(Some(echo.clone()), RspInfo::error(16, "找不到该合约"))
        .await;
    let rejection = gateway.rejection_for("SA601", "1").await.unwrap();
    assert_eq!(rejection.code, 16);

    // A later correlated response overwrites it.
    gateway
        .on_order_insert_response(Some(echo), RspInfo::error(22, "资金不足"), 4, true)
        .await;
    let rejection = gateway.rejection_for("SA601", "1").await.unwrap();
    assert_eq!(rejection.code, 22);

    // Unrelated submissions stay clean.
    assert!(gateway.rejection_for("SA601", "2").await.is_none());
}

#[tokio::test]
async fn status_updates_accumulate_per_identity() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    let update = |status: OrderState| OrderUpdate {
        instrument_id: "SA601".to_string(),
        front_id: 10,
        session_id: 2000,
        order_ref: 1,
        status,
        status_message: String::new(),
    };

    gateway.on_order_update(update(OrderState::NoTradeQueueing)).await;
    gateway.on_order_update(update(OrderState::Canceled)).await;

    let id = identity(10, 2000, 1);
    assert_eq!(
        gateway.status_history(&id).await,
        vec![OrderState::NoTradeQueueing, OrderState::Canceled]
    );
    assert_eq!(
        gateway.status_summary().await,
        vec![(id, OrderState::Canceled)]
    );
}

#[tokio::test]
async fn unknown_status_updates_are_ignored() {
    let transport = RecordingTransport::new();
    let gateway = ready_gateway(&transport).await;

    gateway
        .on_order_update(OrderUpdate {
            instrument_id: "SA601".to_string(),
            front_id: 10,
            session_id: 2000,
            order_ref: 1,
            status: OrderState::Unknown,
            status_message: String::new(),
        })
        .await;

    assert!(gateway.status_summary().await.is_empty());
}
