// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP server and connection handling.

use std::sync::Arc;

use rk_core::ReplicationPacket;
use rk_daemon::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use rk_engine::EngineError;
use tokio::net::TcpStream;
use tracing::{debug, error, warn};

use crate::lifecycle::ServerContext;

/// Handle a single client connection
pub async fn handle_connection(
    context: &Arc<ServerContext>,
    stream: TcpStream,
) -> Result<(), ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    let response = if writes_to_disk(&request) {
        // Writes block on fsync; keep them off the async workers
        let context = Arc::clone(context);
        tokio::task::spawn_blocking(move || handle_request(&context, request))
            .await
            .unwrap_or_else(|e| Response::Error {
                message: format!("request task failed: {}", e),
            })
    } else {
        handle_request(context, request)
    };

    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    // Signal only after the client has its answer
    if response == Response::ShuttingDown {
        context.request_shutdown();
    }

    Ok(())
}

fn writes_to_disk(request: &Request) -> bool {
    matches!(
        request,
        Request::Put { .. } | Request::Delete { .. } | Request::Replicate { .. }
    )
}

/// Handle a single request and return a response
pub fn handle_request(context: &ServerContext, request: Request) -> Response {
    let node = &context.node;
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Get { key } => Response::Value {
            value: node.get(&key),
        },

        Request::Put { key, value } => match node.put(key, value) {
            Ok(index) => Response::Written { index },
            Err(e) => engine_error(e),
        },

        Request::Delete { key } => match node.delete(key) {
            Ok(index) => Response::Written { index },
            Err(e) => engine_error(e),
        },

        Request::Replicate { payload } => {
            let decoded = match ReplicationPacket::from_payload(&payload) {
                Ok(decoded) => decoded,
                Err(e) => {
                    return Response::Error {
                        message: e.to_string(),
                    }
                }
            };
            if decoded.skipped > 0 {
                warn!(
                    from_index = decoded.packet.from_index,
                    skipped = decoded.skipped,
                    "skipped undecodable records in replication packet"
                );
            }
            match node.receive_replication(&decoded.packet) {
                Ok(last_applied) => Response::Replicated { last_applied },
                Err(e) => engine_error(e),
            }
        }

        Request::Delta { from } => match node.replication_delta(from) {
            Ok(entries) => {
                let start = entries
                    .first()
                    .map(|e| e.index)
                    .unwrap_or_else(|| u64::try_from(from).unwrap_or(0));
                let ops = entries.into_iter().map(|e| e.op).collect();
                Response::Delta {
                    payload: ReplicationPacket::new(start, ops).to_payload(),
                }
            }
            Err(e) => engine_error(e),
        },

        Request::Progress => {
            let progress = node.progress();
            Response::Progress {
                last_applied: progress.last_applied,
                commit_index: progress.commit_index,
            }
        }

        Request::Status => {
            let progress = node.progress();
            Response::Status {
                name: context.name.clone(),
                role: node.role(),
                last_applied: progress.last_applied,
                commit_index: progress.commit_index,
                keys: node.key_count(),
                uptime_secs: context.start_time.elapsed().as_secs(),
                peers: node.peers(),
            }
        }

        Request::Shutdown => Response::ShuttingDown,
    }
}

fn engine_error(e: EngineError) -> Response {
    match e {
        EngineError::NotLeader { leader } => Response::NotLeader { leader },
        EngineError::NotFollower => Response::NotFollower,
        EngineError::OutOfSync { expected, received } => {
            Response::OutOfSync { expected, received }
        }
        e @ EngineError::Wal(_) => {
            error!("storage failure: {}", e);
            Response::Error {
                message: e.to_string(),
            }
        }
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
