//! HTTP transport for streaming uploads.

use crate::model::{TransportError, UploadRequest};
use crate::stream::{ChunkStream, Transport};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info};

/// Multipart field the backend reads the invoice from.
pub const FILE_FIELD: &str = "file";

/// Posts the invoice as multipart form data and exposes the response body
/// as a chunk stream.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn open(&self, request: UploadRequest) -> Result<ChunkStream, TransportError> {
        let (endpoint, form) = multipart_upload(request).map_err(|e| TransportError::Connect {
            endpoint: String::new(),
            reason: e.to_string(),
        })?;

        info!(endpoint = %endpoint, "Opening analysis stream");

        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Connect {
                endpoint: endpoint.clone(),
                reason: describe_send_error(&e),
            })?;

        let status = response.status();
        debug!(endpoint = %endpoint, status = %status, "Analysis stream response");

        if !status.is_success() {
            let detail = super::error_detail(response).await;
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk.map_err(|e| TransportError::Interrupted {
                    reason: e.to_string(),
                })
            })
            .boxed())
    }
}

/// Build the multipart body for an upload, returning the target endpoint with it.
pub(crate) fn multipart_upload(request: UploadRequest) -> Result<(String, Form), reqwest::Error> {
    let (endpoint, file_name, mime_type, payload) = request.into_parts();
    let length = payload.len() as u64;
    let part = Part::stream_with_length(payload, length)
        .file_name(file_name)
        .mime_str(mime_type)?;
    Ok((endpoint, Form::new().part(FILE_FIELD, part)))
}

pub(crate) fn describe_send_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}
