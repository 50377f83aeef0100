pub mod fallback;
pub mod proxy;
pub mod server;
pub mod shape;

pub use proxy::{router, ProxyState};
