// Listener module
// Creates the TCP listener with socket options applied before bind

use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

use crate::error::ServerError;

/// Create a `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` is always set so a restarted process can bind while old
/// connections sit in `TIME_WAIT`. `SO_REUSEPORT` is only set on request;
/// without it a port held by another live listener is a bind error.
///
/// Must be called from within a Tokio runtime.
pub fn create_listener(addr: SocketAddr, reuse_port: bool) -> Result<TcpListener, ServerError> {
    bind_socket(addr, reuse_port).map_err(|source| ServerError::Bind { addr, source })
}

fn bind_socket(addr: SocketAddr, reuse_port: bool) -> std::io::Result<TcpListener> {
    // Create socket with appropriate domain (IPv4 or IPv6)
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    if reuse_port {
        enable_reuse_port(&socket)?;
    }

    socket.set_reuse_address(true)?;

    // Set non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;

    // Start listening with a backlog queue size of 128
    socket.listen(128)?;

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(unix)]
fn enable_reuse_port(socket: &Socket) -> std::io::Result<()> {
    socket.set_reuse_port(true)
}

#[cfg(not(unix))]
fn enable_reuse_port(_socket: &Socket) -> std::io::Result<()> {
    Ok(())
}
