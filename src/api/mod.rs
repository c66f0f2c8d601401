//! HTTP surface
//!
//! - `server` - router, CORS, tracing and graceful shutdown
//! - `handlers` - page, form posts and the JSON state endpoint
//! - `page` - server-rendered HTML for the single transfer page
//! - `types` - request forms and JSON responses

pub mod handlers;
pub mod page;
pub mod server;
pub mod types;
