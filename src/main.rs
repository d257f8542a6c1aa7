// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Planner command: reads one mix request as JSON on stdin and prints the
//! resulting mixing plan as JSON on stdout.

use std::process::ExitCode;

use rand::rngs::OsRng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use relational_mixer::config::MixerConfig;
use relational_mixer::mixing::MixingPlanner;
use relational_mixer::models::MixRequest;
use relational_mixer::telemetry::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match MixerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_tracing(config.log_format) {
        eprintln!("Failed to initialize logging: {err}");
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Planning failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &MixerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let request: MixRequest = serde_json::from_str(&input)?;

    let planner = MixingPlanner::new(config);
    let plan = planner.create_plan(&mut OsRng, &request)?;

    let mut output = serde_json::to_vec_pretty(&plan)?;
    output.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&output).await?;
    stdout.flush().await?;
    Ok(())
}
