//! Server accept loop

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::listener::create_listener;
use crate::config::AppState;
use crate::logger;

/// A bound server, ready to accept connections
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Bind the listening socket.
    ///
    /// Fails if the address is in use or not available on this host.
    pub fn bind(addr: SocketAddr, state: AppState) -> std::io::Result<Self> {
        Ok(Self {
            listener: create_listener(addr)?,
            state: Arc::new(state),
        })
    }

    /// Address actually bound, useful when port 0 was requested
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// Accept errors are logged and the loop keeps going. On shutdown the
    /// listening socket is closed; connections already being served run on
    /// until their tasks finish or the runtime stops.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        let Self { listener, state } = self;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                        Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                    }
                }
                () = &mut shutdown => break,
            }
        }
    }
}
