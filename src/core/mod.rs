pub mod config;
pub mod errors;
pub mod events;
pub mod messages;
pub mod transport;
pub mod types;
