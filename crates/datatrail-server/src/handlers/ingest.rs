//! Upload endpoint: the per-request ingestion state machine.
//!
//! One request walks `READ_INPUT → AUTHENTICATE → COMMIT → 200 OK`, with
//! failure exits mapped by [`IngestError::status`]. The body is read
//! before the credential round trip so a short upload is rejected without
//! spending an auth call on it, and nothing is written to the log until
//! both steps have passed.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use datatrail_storage::{IndexRecord, LogIdentity};
use futures::StreamExt;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{IngestError, Result};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub username: String,
    pub password: String,
    /// Optional namespace; becomes a directory prefix for the file pair.
    pub course: Option<String>,
}

/// `POST /upload?username=..&password=..[&course=..]`
///
/// Emits one operational log line per handled request with the resulting
/// status and the caller's address; failures log the reason, and short
/// input additionally logs the exact byte deficit.
pub async fn upload(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let declared = declared_length(&headers);

    match handle_upload(&state, &params, declared, body).await {
        Ok(record) => {
            info!(
                status = 200,
                addr = %addr.ip(),
                username = %params.username,
                offset = record.offset,
                length = record.length,
                "upload committed"
            );
            StatusCode::OK.into_response()
        }
        Err(err) => {
            let status = err.status();
            match &err {
                IngestError::ShortInput { .. } => warn!(
                    status = status.as_u16(),
                    addr = %addr.ip(),
                    username = %params.username,
                    deficit = err.deficit(),
                    "input was {} bytes shorter than declared",
                    err.deficit()
                ),
                other => warn!(
                    status = status.as_u16(),
                    addr = %addr.ip(),
                    username = %params.username,
                    error = %other,
                    "upload rejected"
                ),
            }
            status.into_response()
        }
    }
}

async fn handle_upload(
    state: &AppState,
    params: &UploadParams,
    declared: Option<u64>,
    body: Body,
) -> Result<IndexRecord> {
    // READ_INPUT
    let payload = read_body(body, declared).await?;

    // AUTHENTICATE
    if !state.auth.check(&params.username, &params.password).await {
        return Err(IngestError::Unauthorized);
    }

    // COMMIT. The append takes a blocking advisory file lock, so it runs
    // off the async worker threads.
    let identity = LogIdentity::new(&params.username, params.course.clone())?;
    let log = state.log.clone();
    let record = tokio::task::spawn_blocking(move || log.append(&identity, &payload))
        .await
        .map_err(|e| IngestError::Internal(e.to_string()))??;

    Ok(record)
}

/// Declared input length, when the client provided one.
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Read the request body.
///
/// With a declared length L, exactly the first L bytes are accepted and
/// any surplus is discarded unread; a stream that ends or errors before L
/// bytes fails with `ShortInput` carrying the deficit. Without a declared
/// length the stream is read to its natural end.
async fn read_body(body: Body, declared: Option<u64>) -> Result<Bytes> {
    let mut stream = body.into_data_stream();
    let mut buf = BytesMut::new();

    match declared {
        Some(expected) => {
            while (buf.len() as u64) < expected {
                match stream.next().await {
                    Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
                    Some(Err(_)) | None => {
                        return Err(IngestError::ShortInput {
                            expected,
                            actual: buf.len() as u64,
                        })
                    }
                }
            }
            buf.truncate(expected as usize);
        }
        None => {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| IngestError::Internal(e.to_string()))?;
                buf.extend_from_slice(&chunk);
            }
        }
    }

    Ok(buf.freeze())
}
