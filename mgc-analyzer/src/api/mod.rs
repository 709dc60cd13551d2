//! HTTP API handlers for mgc-analyzer

pub mod analyze;
pub mod debug;
pub mod health;
pub mod upload;

pub use analyze::analyze_routes;
pub use debug::debug_routes;
pub use health::health_routes;
