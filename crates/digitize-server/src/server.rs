// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP upload server.
//
// A Tokio accept loop hands each connection to its own task. Every connection
// carries exactly one request and is closed after the response.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use digitize_core::RequestId;
use digitize_core::error::{DigitizeError, Result};
use digitize_ocr::OcrService;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::handlers::{AppState, dispatch};
use crate::http::{HttpResponse, read_request, write_response};

/// Ceiling on a whole request body. Ten 10 MiB images plus multipart
/// overhead fit below it.
pub const MAX_REQUEST_BYTES: usize = 60 * 1024 * 1024;

/// A client has this long to deliver its complete request.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Stopped,
    Running,
}

/// The Digitize HTTP service.
pub struct DigitizeServer<O> {
    state: Arc<AppState<O>>,
    status: ServerStatus,
    /// Notification handle used to signal a graceful shutdown.
    shutdown_signal: Arc<Notify>,
    task_handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
    active_connections: Arc<AtomicU32>,
}

impl<O: OcrService + 'static> DigitizeServer<O> {
    pub fn new(state: AppState<O>) -> Self {
        Self {
            state: Arc::new(state),
            status: ServerStatus::Stopped,
            shutdown_signal: Arc::new(Notify::new()),
            task_handle: None,
            local_addr: None,
            active_connections: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn status(&self) -> ServerStatus {
        self.status
    }

    /// Address actually bound, once running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn active_connections(&self) -> u32 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Bind `bind_addr` and start accepting connections in a background task.
    pub async fn start(&mut self, bind_addr: &str) -> Result<SocketAddr> {
        if let (ServerStatus::Running, Some(addr)) = (self.status, self.local_addr) {
            debug!(%addr, "server already running");
            return Ok(addr);
        }

        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| DigitizeError::Server(format!("bind {bind_addr}: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| DigitizeError::Server(format!("local address: {e}")))?;

        info!(%addr, "Digitize server listening");

        let shutdown = Arc::clone(&self.shutdown_signal);
        let state = Arc::clone(&self.state);
        let connections = Arc::clone(&self.active_connections);
        self.task_handle = Some(tokio::spawn(async move {
            accept_loop(listener, shutdown, state, connections).await;
        }));

        self.local_addr = Some(addr);
        self.status = ServerStatus::Running;
        Ok(addr)
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    /// Requests already being handled run to completion.
    pub async fn stop(&mut self) -> Result<()> {
        if self.status != ServerStatus::Running {
            return Ok(());
        }

        info!(addr = ?self.local_addr, "stopping Digitize server");
        self.shutdown_signal.notify_one();

        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| DigitizeError::Server(format!("task join: {e}")))?;
        }

        self.status = ServerStatus::Stopped;
        self.local_addr = None;
        info!("Digitize server stopped");
        Ok(())
    }
}

async fn accept_loop<O: OcrService + 'static>(
    listener: TcpListener,
    shutdown: Arc<Notify>,
    state: Arc<AppState<O>>,
    connections: Arc<AtomicU32>,
) {
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                debug!("accept loop received shutdown signal");
                break;
            }

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer)) => {
                        let state = Arc::clone(&state);
                        let connections = Arc::clone(&connections);
                        tokio::spawn(async move {
                            connections.fetch_add(1, Ordering::Relaxed);
                            if let Err(e) = handle_connection(stream, peer, &state).await {
                                warn!(%peer, error = %e, "connection handler error");
                            }
                            connections.fetch_sub(1, Ordering::Relaxed);
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                    }
                }
            }
        }
    }
}

async fn handle_connection<O: OcrService>(
    mut stream: TcpStream,
    peer: SocketAddr,
    state: &AppState<O>,
) -> Result<()> {
    let request_id = RequestId::new();
    let started = Instant::now();

    let read = tokio::time::timeout(READ_TIMEOUT, read_request(&mut stream, MAX_REQUEST_BYTES))
        .await
        .unwrap_or_else(|_| {
            Err(DigitizeError::MalformedUpload(
                "timed out waiting for the request".into(),
            ))
        });

    let (response, method, path) = match read {
        Ok(Some(request)) => {
            debug!(%request_id, %peer, method = %request.method, target = %request.target, "request received");
            let path = request.path().to_string();
            let response = dispatch(state, &request).await;
            (response, request.method, path)
        }
        Ok(None) => {
            debug!(%peer, "connection closed without a request");
            return Ok(());
        }
        Err(e) => (HttpResponse::from_error(&e), String::new(), String::new()),
    };

    write_response(&mut stream, &response).await?;

    info!(
        %request_id,
        %peer,
        %method,
        %path,
        status = response.status,
        bytes = response.body.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request complete"
    );
    Ok(())
}
