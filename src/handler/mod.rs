//! Request handler module
//!
//! Responsible for request routing dispatch and the two endpoint handlers:
//! the health check and the fan-out/fan-in work simulation.

pub mod fanout;
pub mod health;
pub mod router;

// Re-export main entry point
pub use router::{handle_request, RouteTable};
