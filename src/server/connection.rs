//! Per-connection handling

use hyper::body::Body as _;
use hyper::Version;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::codec::{self, ReadOutcome, RequestBody};
use crate::config::AppState;
use crate::error::ServeError;
use crate::handler;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Serve an accepted connection on its own task.
pub fn accept_connection(mut stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    let state = Arc::clone(state);

    tokio::spawn(async move {
        if let Err(err) = serve_connection(&mut stream, peer_addr, &state).await {
            logger::log_connection_error(&err);
        }
    });
}

/// Answer requests on one connection, in the order they arrive
///
/// Runs until the client closes the connection, asks for it to be closed,
/// or a response carries `Connection: close` (every error page does). A
/// request head that cannot be parsed gets a 400 page, finalized like any
/// other response, and ends the connection.
pub async fn serve_connection<S>(io: &mut S, peer_addr: SocketAddr, state: &AppState) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        let req = match codec::read_request(io, &mut buf).await? {
            ReadOutcome::Request(req) => req,
            ReadOutcome::Closed => break,
            ReadOutcome::Malformed(reason) => {
                let err = ServeError::BadRequest(reason);
                logger::log_bad_request(&peer_addr, &err.message());
                let response = handler::finalize_response(state, http::build_error_response(&err, false));
                let (bytes, _) = codec::encode_response(response, false, Version::HTTP_11).await;
                io.write_all(&bytes).await?;
                break;
            }
        };

        let entry = state
            .access_log
            .then(|| AccessLogEntry::from_request(&req, peer_addr));

        let response = handler::serve(&req, state).await;
        let status = response.status().as_u16();
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);

        let (bytes, keep_alive) =
            codec::encode_response(response, codec::wants_keep_alive(&req), req.version()).await;
        io.write_all(&bytes).await?;

        if let Some(mut entry) = entry {
            entry.status = status;
            entry.body_bytes = body_bytes;
            logger::log_access(&entry);
        }

        if !keep_alive {
            break;
        }
        match codec::request_body(&req) {
            RequestBody::Empty => {}
            RequestBody::Length(len) => codec::discard_body(io, &mut buf, len).await?,
            RequestBody::Unframed => break,
        }
    }

    io.flush().await?;
    // The peer may already be gone
    let _ = io.shutdown().await;
    Ok(())
}
