use thiserror::Error;

use crate::core::types::SessionState;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),

    #[error("Unsupported order direction: {0}")]
    InvalidDirection(String),

    #[error("No exchange registered for instrument: {0}")]
    UnknownInstrument(String),

    #[error("Session not ready (state: {state})")]
    NotReady { state: SessionState },

    #[error("Transport not connected")]
    NotConnected,

    #[error("Transport rejected {operation} request with code {code}")]
    TransportRejected { operation: &'static str, code: i32 },

    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}
