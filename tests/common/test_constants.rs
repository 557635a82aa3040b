//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared helpers under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust,ignore
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Volume identifier used across scenarios.
pub const VOLUME_ID: &str = "2aa1d1c2-5f0c-4e8f-8e0d-111111111111";

/// Project identifier used across scenarios.
pub const PROJECT_ID: &str = "0c4e8f8e0d1111112aa1d1c25f0c4e8f";

/// Token presented by the test caller.
pub const AUTH_TOKEN: &str = "gAAAAAB-test-token";
