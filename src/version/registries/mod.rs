//! Registry implementations for fetching module versions

pub mod go_proxy;

pub use go_proxy::GoProxyRegistry;
