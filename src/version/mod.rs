//! Version resolution layer
//!
//! Finds the newest version of a Go module whose `go` directive is satisfied
//! by the local toolchain.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Resolver   │────▶│   Prober    │────▶│VersionSource│
//! │ (select)    │     │ (bounded)   │     │ (go proxy)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │    Cache    │     │   Semver    │
//! │   (JSON)    │     │ (go compat) │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: JSON-backed record of previously selected versions
//! - [`descriptor`]: `go` directive scanning for `go.mod` documents
//! - [`error`]: Error types for cache, registry and resolution failures
//! - [`filter`]: Stable-version filtering of registry listings
//! - [`prober`]: Bounded-parallel compatibility checks
//! - [`registries`]: Concrete registry implementations (Go proxy)
//! - [`resolver`]: Orchestration and the selection rule
//! - [`semver`]: Version parsing, ordering and toolchain comparison
//! - [`source`]: VersionSource trait for registry access

pub mod cache;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod prober;
pub mod registries;
pub mod resolver;
pub mod semver;
pub mod source;
