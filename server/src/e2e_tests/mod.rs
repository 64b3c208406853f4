//! End-to-end tests at the HTTP request/response level.
//!
//! Each test file covers a specific scenario, driving the full router with
//! a fresh in-memory store and a manual clock.

#![cfg(test)]

mod helpers;

mod test_auth_flow;
mod test_dashboard;
mod test_protected_routes;
mod test_services;
