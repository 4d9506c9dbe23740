//! HTTP middleware stack for the memorial site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, signed cookie, in-memory store)
//! 5. CSP nonce (generate per-request nonce for the inline bootstrap script)
//! 6. Security headers (CSP, COEP, client hints, etc.)
//! 7. Rate limiting (governor, on POST routes only)

pub mod auth;
pub mod csp;
pub mod layout;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAuth, Viewer, clear_current_user, fresh_user, set_current_user};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use layout::LayoutHints;
pub use rate_limit::{auth_rate_limiter, submission_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
