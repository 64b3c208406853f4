// Life of a request:
// 1. JSON request comes in over HTTP
// 2. Public routes (health, register, login) go straight to their handler
// 3. Protected routes run the interceptor pipeline first:
//     - Extract the bearer token (missing -> 401)
//     - Verify signature and expiry (invalid -> 403)
//     - Attach the caller's Identity to the request
// 4. The handler reads the account id from the Identity, never from the body
// 5. The data store answers, scoped to that account
//
// System components:
//  - Token issuer / verifier (shared secret, injected clock)
//  - Interceptor pipeline
//  - Data store (external collaborator, in-memory implementation)

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod store;
pub mod time;

mod e2e_tests;

pub use api::{AppState, router};
