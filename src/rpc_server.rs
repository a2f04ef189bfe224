//! Reader RPC Server: JSON-RPC over stdin/stdout for an embedding host.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.toggle", "params":{}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Usage: `epubreader-rpc <book.json> [query]`. The session database lives in
//! `EPUBREADER_DATA_DIR`, else the platform data directory.

use std::path::PathBuf;

use epubreader::app::{LaunchOptions, ReaderApp};
use epubreader::platform;
use epubreader::rpc_handler::handle_method;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn data_dir() -> PathBuf {
    match std::env::var("EPUBREADER_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => platform::get_data_dir(),
    }
}

async fn respond(stdout: &mut tokio::io::Stdout, response: Value) -> std::io::Result<()> {
    let mut line = response.to_string();
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("epubreader=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let fixture = args.next().ok_or("usage: epubreader-rpc <book.json> [query]")?;
    let query = args.next().unwrap_or_default();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("sessions.db");
    let launch = LaunchOptions {
        query,
        ..LaunchOptions::default()
    };
    let app = Mutex::new(ReaderApp::open(
        &fixture,
        &db_path.to_string_lossy(),
        launch,
    )?);

    let mut stdout = tokio::io::stdout();
    respond(
        &mut stdout,
        json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}),
    )
    .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable request");
                respond(&mut stdout, json!({"id": null, "error": format!("parse error: {}", e)})).await?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                tracing::debug!(method, error = %err, "request failed");
                json!({"id": id, "error": err.to_string()})
            }
        };
        respond(&mut stdout, response).await?;
    }

    tracing::info!("stdin closed; shutting down");
    Ok(())
}
