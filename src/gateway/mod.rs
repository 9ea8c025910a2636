pub mod conversions;
pub mod market_data;
pub mod orders;
pub mod session;
pub mod trader;
