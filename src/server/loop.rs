// Server loop module
// Accepts connections until the process exits

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::error::ServerError;
use crate::logger;

/// Accept connections forever, serving each one in its own task.
///
/// Accept errors (for example descriptor exhaustion) are logged and the loop
/// keeps going; only a listener that cannot report its address fails.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    let local_addr = listener.local_addr()?;
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(stream, peer_addr, &state, &active_connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection on {local_addr}: {e}"));
            }
        }
    }
}
