// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Digitize: photographed documents in, paginated PDFs out.
//
// Entry point. Initialises logging, loads configuration, builds the PDF writer
// and OCR client, and serves until Ctrl-C.

use std::process::ExitCode;

use digitize_core::AppConfig;
use digitize_core::error::{DigitizeError, Result};
use digitize_document::{FontResource, PdfWriter};
use digitize_ocr::MistralOcrClient;
use digitize_server::{AppState, DigitizeServer};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Digitize starting");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Digitize exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = AppConfig::load()?;

    let fonts = FontResource::from_config(&config)?;
    if matches!(fonts, FontResource::Builtin) {
        info!("No font configured; using built-in Courier");
    }
    let mut writer = PdfWriter::new(fonts)?;
    writer.set_paper_size(config.paper_size);

    let ocr = MistralOcrClient::new(&config.ocr)?;
    if !ocr.has_credentials() {
        warn!("MISTRAL_API_KEY is not set; every OCR request will fail");
    }

    let mut server = DigitizeServer::new(AppState::new(writer, ocr, config.upload));
    server.start(&config.bind_addr).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| DigitizeError::Server(format!("waiting for Ctrl-C: {e}")))?;
    info!("Shutdown requested");

    server.stop().await
}
