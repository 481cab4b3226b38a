// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service discovery and health checks. Nothing here reads user data.
pub mod health;
pub mod root;

pub use health::health;
pub use root::root;
