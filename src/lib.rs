//! Pick the newest Go module version that is compatible with the local Go toolchain.
//!
//! - [`config`]: paths, defaults and the optional settings file
//! - [`logging`]: tracing subscriber setup
//! - [`toolchain`]: local Go version detection
//! - [`version`]: listing, probing, caching and selection
//! - [`install`]: hand-off to `go get`

pub mod config;
pub mod install;
pub mod logging;
pub mod toolchain;
pub mod version;
