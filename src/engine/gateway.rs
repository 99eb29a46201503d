//! The boundary to the query-execution service.
//!
//! Everything behind [ExecutionGateway] is somebody else's code; we hand over
//! a [QueryRequest] and get rows or an error back. The HTTP implementation
//! talks to the same endpoint the dashboard always called.
use async_trait::async_trait;
use log::{debug, info};

use crate::engine::normalize::QueryRequest;
use crate::engine::rows::Row;
use crate::error::{ErrorKind, InternalError};
use crate::Error;

/// Where the execution service lives when nobody configured anything else.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

/// The one operation the service exposes.
pub const EXECUTE_PATH: &str = "product/get-result-filtered";

#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    async fn execute(&self, request: QueryRequest) -> Result<Vec<Row>, Error>;
}

/// POSTs requests as JSON to `<base-url>/product/get-result-filtered`.
///
/// No retries here: a non-success status is reported as-is and retrying, if
/// anyone wants it, belongs to whoever drives the gateway.
pub struct HttpGateway {
    execute_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Self {
        let execute_url = format!("{}/{}", base_url.trim_end_matches('/'), EXECUTE_PATH);

        HttpGateway { execute_url }
    }
}

#[async_trait]
impl ExecutionGateway for HttpGateway {
    async fn execute(&self, request: QueryRequest) -> Result<Vec<Row>, Error> {
        let url = self.execute_url.clone();
        let body = serde_json::to_string(&request)?;

        info!("Submitting query to {url}");
        debug!("Request body: {body}");

        // ureq blocks, so the call gets its own blocking thread and the
        // runtime stays free for whatever the user does next.
        tokio::task::spawn_blocking(move || post_json(&url, &body))
            .await
            .map_err(|join_error| InternalError(format!("Gateway task died: {join_error}")))?
    }
}

fn post_json(url: &str, body: &str) -> Result<Vec<Row>, Error> {
    let response = ureq::post(url)
        .set("Content-Type", "application/json")
        .send_string(body);

    match response {
        Ok(response) => {
            let rows: Vec<Row> = serde_json::from_str(&response.into_string()?)?;

            info!("Received {} rows", rows.len());
            Ok(rows)
        }
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();

            Err(ErrorKind::RequestFailed { status, body }.into())
        }
        Err(ureq::Error::Transport(transport)) => {
            Err(ErrorKind::TransportError(transport.to_string()).into())
        }
    }
}
