//! Wire character constants and pure conversions for the front protocol.

use crate::core::types::{OffsetFlag, OrderDirection, OrderState};

// Direction
pub const DIRECTION_BUY: char = '0';
pub const DIRECTION_SELL: char = '1';

// Offset flags
pub const OFFSET_OPEN: char = '0';
pub const OFFSET_CLOSE: char = '1';
pub const OFFSET_CLOSE_TODAY: char = '3';

// Fixed limit-order profile
pub const ORDER_PRICE_TYPE_LIMIT: char = '2';
pub const TIME_CONDITION_GFD: char = '3';
pub const VOLUME_CONDITION_ANY: char = '1';
pub const CONTINGENT_IMMEDIATELY: char = '1';
pub const HEDGE_FLAG_SPECULATION: char = '1';
pub const FORCE_CLOSE_NOT_FORCED: char = '0';

// Order actions
pub const ACTION_FLAG_DELETE: char = '0';

/// Wire side character for a direction.
pub fn direction_to_wire(direction: OrderDirection) -> char {
    if direction.is_buy() {
        DIRECTION_BUY
    } else {
        DIRECTION_SELL
    }
}

/// Wire offset-flag character.
pub fn offset_flag_to_wire(flag: OffsetFlag) -> char {
    match flag {
        OffsetFlag::Open => OFFSET_OPEN,
        OffsetFlag::Close => OFFSET_CLOSE,
        OffsetFlag::CloseToday => OFFSET_CLOSE_TODAY,
    }
}

/// Order status from its wire character. Unrecognized characters map to
/// `Unknown`, which the order tracker treats as invalid.
///
/// Nothing in this crate decodes wire records; dispatcher implementations
/// use this when building the [`OrderUpdate`](crate::core::messages::OrderUpdate)
/// they deliver to [`TradingEvents::on_order_update`](crate::core::events::TradingEvents::on_order_update).
pub fn order_state_from_wire(status: char) -> OrderState {
    match status {
        '0' => OrderState::AllTraded,
        '1' => OrderState::PartTradedQueueing,
        '2' => OrderState::PartTradedNotQueueing,
        '3' => OrderState::NoTradeQueueing,
        '4' => OrderState::NoTradeNotQueueing,
        '5' => OrderState::Canceled,
        _ => OrderState::Unknown,
    }
}
