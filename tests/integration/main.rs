//! Integration tests for AutoSiteFix
//!
//! These tests use wiremock to serve a small site and an in-process browser
//! that loads pages over HTTP, exercising discovery and the full audit
//! pipeline end-to-end without a real browser.

mod audit_tests;
mod discovery_tests;
mod support;
