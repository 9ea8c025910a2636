use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::GatewayError;

/// Session establishment states for one front connection.
///
/// Replaces the usual pile of `connect_status`/`login_status`/`auth_status`
/// booleans with a single tagged state, so a disconnect cannot leave a stale
/// "logged in" flag behind. The trading session walks the full ladder; the
/// market data session skips `Authenticating` and `SettlementPending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Authenticating,
    AwaitingLogin,
    LoggedIn,
    SettlementPending,
    Ready,
}

impl SessionState {
    /// True once a successful login response has been processed and not yet
    /// invalidated by a disconnect.
    pub fn is_logged_in(self) -> bool {
        matches!(self, Self::LoggedIn | Self::SettlementPending | Self::Ready)
    }

    /// True once authentication has completed for this connection.
    pub fn is_authenticated(self) -> bool {
        matches!(
            self,
            Self::AwaitingLogin | Self::LoggedIn | Self::SettlementPending | Self::Ready
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Authenticating => "Authenticating",
            Self::AwaitingLogin => "AwaitingLogin",
            Self::LoggedIn => "LoggedIn",
            Self::SettlementPending => "SettlementPending",
            Self::Ready => "Ready",
        };
        write!(f, "{}", name)
    }
}

/// Order direction combined with the position offset it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderDirection {
    BuyOpen,
    BuyClose,
    SellOpen,
    SellClose,
    BuyCloseToday,
    SellCloseToday,
}

impl OrderDirection {
    pub fn is_buy(self) -> bool {
        matches!(self, Self::BuyOpen | Self::BuyClose | Self::BuyCloseToday)
    }

    pub fn offset_flag(self) -> OffsetFlag {
        match self {
            Self::BuyOpen | Self::SellOpen => OffsetFlag::Open,
            Self::BuyClose | Self::SellClose => OffsetFlag::Close,
            Self::BuyCloseToday | Self::SellCloseToday => OffsetFlag::CloseToday,
        }
    }
}

impl FromStr for OrderDirection {
    type Err = GatewayError;

    /// Parses the conventional `BUY_OPEN` style names. An unrecognized name
    /// fails here, before any counter is touched or request built.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY_OPEN" => Ok(Self::BuyOpen),
            "BUY_CLOSE" => Ok(Self::BuyClose),
            "SELL_OPEN" => Ok(Self::SellOpen),
            "SELL_CLOSE" => Ok(Self::SellClose),
            "BUY_CLOSE_TODAY" => Ok(Self::BuyCloseToday),
            "SELL_CLOSE_TODAY" => Ok(Self::SellCloseToday),
            other => Err(GatewayError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BuyOpen => "BUY_OPEN",
            Self::BuyClose => "BUY_CLOSE",
            Self::SellOpen => "SELL_OPEN",
            Self::SellClose => "SELL_CLOSE",
            Self::BuyCloseToday => "BUY_CLOSE_TODAY",
            Self::SellCloseToday => "SELL_CLOSE_TODAY",
        };
        write!(f, "{}", name)
    }
}

/// Whether an order opens a new position or closes an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OffsetFlag {
    Open,
    Close,
    CloseToday,
}

/// Exchange-reported order status.
///
/// `AllTraded` and `Canceled` are terminal; nothing further is expected for
/// an order once either has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    Unknown,
    AllTraded,
    PartTradedQueueing,
    PartTradedNotQueueing,
    NoTradeQueueing,
    NoTradeNotQueueing,
    Canceled,
}

impl OrderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::AllTraded | Self::Canceled)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "Unknown",
            Self::AllTraded => "AllTraded",
            Self::PartTradedQueueing => "PartTradedQueueing",
            Self::PartTradedNotQueueing => "PartTradedNotQueueing",
            Self::NoTradeQueueing => "NoTradeQueueing",
            Self::NoTradeNotQueueing => "NoTradeNotQueueing",
            Self::Canceled => "Canceled",
        };
        write!(f, "{}", name)
    }
}

/// Composite order key: `(front_id, session_id, order_ref)`.
///
/// Only unique within one login session. The front and session ids change on
/// every reconnect, so an identity must never be built from a stale pair;
/// identities arriving inside notifications carry their own embedded pair and
/// are authoritative as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderIdentity {
    pub front_id: i32,
    pub session_id: i32,
    pub order_ref: i32,
}

impl OrderIdentity {
    pub fn new(front_id: i32, session_id: i32, order_ref: i32) -> Self {
        Self {
            front_id,
            session_id,
            order_ref,
        }
    }
}

impl fmt::Display for OrderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.front_id, self.session_id, self.order_ref)
    }
}

/// Why the transport dropped the front connection.
///
/// The raw codes come from the transport layer; the transport reconnects on
/// its own afterwards, the gateway only has to re-run establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisconnectReason {
    NetworkReadFailure,
    NetworkWriteFailure,
    HeartbeatReceiveTimeout,
    HeartbeatSendFailure,
    MalformedMessage,
    Unknown(i32),
}

impl DisconnectReason {
    pub fn from_code(code: i32) -> Self {
        match code {
            0x1001 => Self::NetworkReadFailure,
            0x1002 => Self::NetworkWriteFailure,
            0x2001 => Self::HeartbeatReceiveTimeout,
            0x2002 => Self::HeartbeatSendFailure,
            0x2003 => Self::MalformedMessage,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::NetworkReadFailure => 0x1001,
            Self::NetworkWriteFailure => 0x1002,
            Self::HeartbeatReceiveTimeout => 0x2001,
            Self::HeartbeatSendFailure => 0x2002,
            Self::MalformedMessage => 0x2003,
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkReadFailure => write!(f, "network read failure (0x1001)"),
            Self::NetworkWriteFailure => write!(f, "network write failure (0x1002)"),
            Self::HeartbeatReceiveTimeout => write!(f, "heartbeat receive timeout (0x2001)"),
            Self::HeartbeatSendFailure => write!(f, "heartbeat send failure (0x2002)"),
            Self::MalformedMessage => write!(f, "malformed message (0x2003)"),
            Self::Unknown(code) => write!(f, "unknown reason ({:#x})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parsing_round_trips() {
        for name in [
            "BUY_OPEN",
            "BUY_CLOSE",
            "SELL_OPEN",
            "SELL_CLOSE",
            "BUY_CLOSE_TODAY",
            "SELL_CLOSE_TODAY",
        ] {
            let direction: OrderDirection = name.parse().unwrap();
            assert_eq!(direction.to_string(), name);
        }
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let err = "BUY_HOLD".parse::<OrderDirection>().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidDirection(ref name) if name == "BUY_HOLD"));
    }

    #[test]
    fn terminal_states() {
        assert!(OrderState::AllTraded.is_terminal());
        assert!(OrderState::Canceled.is_terminal());
        assert!(!OrderState::NoTradeQueueing.is_terminal());
        assert!(!OrderState::Unknown.is_terminal());
    }

    #[test]
    fn identity_display_matches_wire_convention() {
        let identity = OrderIdentity::new(10, 2000, 1);
        assert_eq!(identity.to_string(), "10_2000_1");
    }

    #[test]
    fn disconnect_reason_codes() {
        assert_eq!(
            DisconnectReason::from_code(0x1001),
            DisconnectReason::NetworkReadFailure
        );
        assert_eq!(
            DisconnectReason::from_code(0x2001),
            DisconnectReason::HeartbeatReceiveTimeout
        );
        assert_eq!(
            DisconnectReason::from_code(0x9999),
            DisconnectReason::Unknown(0x9999)
        );
        assert_eq!(DisconnectReason::from_code(0x2003).code(), 0x2003);
    }
}
