//! Host protocol handling
//!
//! The launcher UI talks to this process with JSON-RPC 2.0, one object per
//! line on stdin, one response per line on stdout. Queries run concurrently
//! so a newer keystroke can supersede an older one; responses are written in
//! completion order and matched by `id`.

use crate::coordinator::Stream;
use crate::config::Settings;
use crate::error::AppError;
use crate::github::SearchOptions;
use crate::launcher::{perform_action, ActionOutcome, Launcher};
use crate::results::{context_menu, ContextAction, ResultEntry};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader as AsyncBufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// JSON-RPC 2.0 request
#[derive(Debug, Deserialize)]
pub struct HostRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize)]
pub struct HostResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<HostError>,
}

#[derive(Debug, Serialize)]
pub struct HostError {
    pub code: String,
    pub message: String,
}

impl HostResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: &str, message: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(HostError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }

    fn from_app_error(id: Option<Value>, err: &AppError) -> Self {
        Self::error(id, err.error_code(), &err.message())
    }
}

#[derive(Debug, Deserialize)]
struct QueryParams {
    search: String,
    #[serde(default)]
    delayed: bool,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActionsParams {
    url: String,
}

#[derive(Debug, Deserialize)]
struct OpenParams {
    url: String,
    #[serde(default)]
    action: Option<ContextAction>,
}

#[derive(Debug, Deserialize)]
struct CancelParams {
    stream: Stream,
}

pub fn parse_request(json: &str) -> Result<HostRequest> {
    Ok(serde_json::from_str(json)?)
}

pub fn serialize_response(response: &HostResponse) -> Result<String> {
    Ok(serde_json::to_string(response)?)
}

/// Serve the host protocol on stdio until stdin closes
pub async fn handle_stdio(launcher: Arc<Launcher>) -> Result<()> {
    info!("Starting ghrepo host on stdio");

    let (tx, mut rx) = mpsc::unbounded_channel::<HostResponse>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = rx.recv().await {
            let response_json = serialize_response(&response)?;
            debug!("Sending response: {}", response_json);
            stdout.write_all(response_json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let stdin = tokio::io::stdin();
    let mut reader = AsyncBufReader::new(stdin).lines();

    while let Some(line) = reader.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("Received request: {}", line);

        let request = match parse_request(&line) {
            Ok(request) => request,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let _ = tx.send(HostResponse::error(
                    None,
                    "parse_error",
                    &format!("Invalid JSON: {}", e),
                ));
                continue;
            }
        };

        if request.method == "query" {
            // Queries wait on the network; everything else is answered in order
            let launcher = launcher.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(handle_request(&launcher, request).await);
            });
        } else {
            let _ = tx.send(handle_request(&launcher, request).await);
        }
    }

    info!("stdin closed, shutting down");
    drop(tx);
    writer.await??;
    Ok(())
}

/// Handle a single host request
pub async fn handle_request(launcher: &Launcher, request: HostRequest) -> HostResponse {
    let id = request.id.clone();
    let outcome = match request.method.as_str() {
        "initialize" => Ok(handle_initialize(launcher)),
        "query" => match params::<QueryParams>(request.params) {
            Ok(params) => Ok(handle_query(launcher, params).await),
            Err(e) => Err(e),
        },
        "actions" => params::<ActionsParams>(request.params)
            .map(|p| json!({ "actions": context_menu(&p.url) })),
        "open" => params::<OpenParams>(request.params).and_then(handle_open),
        "settings" => params::<Settings>(request.params).map(|settings| {
            let accounts = settings.accounts.len();
            launcher.update_settings(settings);
            json!({ "accounts": accounts })
        }),
        "cancel" => params::<CancelParams>(request.params).map(|p| {
            launcher.cancel(p.stream);
            json!({ "cancelled": p.stream })
        }),
        _ => {
            return HostResponse::error(
                id,
                "method_not_found",
                &format!("Method '{}' not found", request.method),
            )
        }
    };

    match outcome {
        Ok(result) => HostResponse::success(id, result),
        Err(e) => HostResponse::from_app_error(id, &e),
    }
}

fn params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, AppError> {
    serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| AppError::InvalidInput(format!("Invalid parameters: {}", e)))
}

fn handle_initialize(launcher: &Launcher) -> Value {
    let settings = launcher.settings();
    json!({
        "serverInfo": {
            "name": "ghrepo",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "capabilities": {
            "methods": ["query", "actions", "open", "settings", "cancel"]
        },
        "webUrl": settings.web_url(),
    })
}

async fn handle_query(launcher: &Launcher, params: QueryParams) -> Value {
    let results = if params.delayed {
        let options = SearchOptions {
            language: params.language,
        };
        launcher.query_delayed(&params.search, &options).await
    } else {
        launcher.query(&params.search).await
    };

    match results {
        Some(results) => json!({ "results": results }),
        None => json!({ "superseded": true, "results": Vec::<ResultEntry>::new() }),
    }
}

fn handle_open(params: OpenParams) -> Result<Value, AppError> {
    let action = params.action.unwrap_or(ContextAction::Open);
    Ok(match perform_action(action, &params.url)? {
        ActionOutcome::Opened(url) => json!({ "opened": url }),
        ActionOutcome::CopyToClipboard(url) => json!({ "copy": url }),
    })
}
