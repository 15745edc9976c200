//! Scheme link decoders, one module per URI scheme.

mod common;
pub mod socks;
pub mod ss;
pub mod ssr;
pub mod trojan;
pub mod vmess;

pub use common::explode;
