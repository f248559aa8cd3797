//! Shared constants for end-to-end tests
//!
//! When test data or timeouts change, update only this file.

// ============================================================================
// Upstream
// ============================================================================

/// API key configured on test servers
pub const TEST_API_KEY: &str = "test-exa-key";

/// Path prefix of the fake Websets API, mirroring the real base URL
pub const UPSTREAM_PREFIX: &str = "/websets";

/// A base URL nothing listens on
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1/websets";

// ============================================================================
// MCP
// ============================================================================

pub const MCP_PATH: &str = "/message";

pub const PROTOCOL_VERSION: &str = "2025-06-18";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Upstream timeout configured on test servers (seconds)
pub const UPSTREAM_TIMEOUT_SECS: u64 = 5;

/// Session header name, matching the server's
pub const SESSION_HEADER: &str = "mcp-session-id";
