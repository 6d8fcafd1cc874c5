//! GRVT backend: snake_case envelope wire shapes, API-key header plus EVM
//! signature on writes.

mod adapter;
mod gateway;
mod messages;

pub use adapter::GrvtAdapter;
pub use gateway::{GrvtCredentials, GrvtGateway, GrvtGatewayOptions};
