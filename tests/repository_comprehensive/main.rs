//! Repository Comprehensive Test Suite
//!
//! End-to-end tests of the repository over the in-memory backend, through the
//! public `vessel` API only.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Typed API** (new, set, get, query, delete round trips)
//! - **Tier 2: Event Pipeline** (redirects, handled writes, notifications)
//! - **Tier 3: Property-Based** (batch limit, count additivity)
//! - **Tier 4: Concurrency** (shared repository across threads)
//! - **Tier 5: Configuration** (`vessel.toml` loading)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test repository_comprehensive
//!
//! # Only the property-based tier
//! cargo test --test repository_comprehensive property
//! ```

mod test_utils;

// Tier 1: Typed API
mod typed_api_tests;

// Tier 2: Event Pipeline
mod event_pipeline_tests;

// Tier 3: Property-Based
mod property_tests;


// Tier 5: Configuration
mod config_tests;
