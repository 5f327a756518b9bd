pub mod auth;
pub mod rate_limit;
pub mod security_headers;

pub use rate_limit::{RateLimiter, SlidingWindow};
pub use security_headers::SecurityHeaders;
