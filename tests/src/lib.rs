//! # Connector Messaging Test Suite
//!
//! Cross-component flows: the outbound pipeline of one connector talking to
//! the inbound dispatcher of another.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── fixtures.rs   # Identities, tokens, handlers, loopback transport
//! │   ├── flows.rs      # Pipeline -> dispatcher over loopback
//! │   └── http.rs       # Same flows over real HTTP (axum + reqwest)
//! └── benches/
//!     └── codec_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ids-tests
//! cargo bench -p ids-tests
//! ```

pub mod integration;
