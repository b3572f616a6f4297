//! Gateway namespace: HTTP and stdio entrypoints.

mod http;
mod stdio;

pub use http::{
    CacheClearedResponse, CacheQuery, CachedVerdictResponse, ErrorResponse, FactCheckRequest,
    GatewayHealthResponse, GatewayState, ImageCheckRequest, error_status, router, run_http,
};
pub use stdio::{run_stdio, run_stdio_with_io};
