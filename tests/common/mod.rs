//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{FakeUpstream, TestClient, TestServer};
//!
//! #[tokio::test]
//! async fn test_list_websets() {
//!     let upstream = FakeUpstream::spawn().await;
//!     let server = TestServer::spawn(&upstream).await;
//!     let client = TestClient::initialized(server.base_url.clone()).await;
//!
//!     let result = client.call_tool("list_websets", serde_json::json!({})).await;
//!     assert!(!result.is_error);
//! }
//! ```

#![allow(dead_code)]

mod client;
mod constants;
mod fake_upstream;
mod server;

// Public API - this is what tests import
pub use client::{TestClient, ToolOutcome};
pub use constants::*;
pub use fake_upstream::{FakeUpstream, RecordedRequest};
pub use server::{ServerOptions, TestServer};
