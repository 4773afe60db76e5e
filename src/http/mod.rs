//! HTTP protocol layer module
//!
//! Response construction, decoupled from the handlers that decide what to send.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_500_response, build_health_response, build_text_response,
};
