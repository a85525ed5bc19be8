// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod ingest;

use std::env;
use std::process::ExitCode;
use tokio::{io::BufReader, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use logstash_adapter::{
    adapter::LogstashAdapter, config::ForwarderConfig, transport::TransportRegistry,
};

pub fn main() -> ExitCode {
    let log_level = env::var("LOGSTASH_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("logstash_adapter={log_level},logstash_forwarder={log_level},warn");
    let filter = match EnvFilter::try_new(env_filter) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("could not parse log level '{log_level}': {e}");
            return ExitCode::FAILURE;
        }
    };

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    debug!("Logging subsystem enabled");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Unable to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let exit_code = runtime.block_on(run());
    // stdin is read on a blocking thread that never returns on its own
    runtime.shutdown_background();
    exit_code
}

async fn run() -> ExitCode {
    let config = match ForwarderConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error loading forwarder configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let registry = TransportRegistry::with_defaults();
    let adapter = match LogstashAdapter::new(config.route.clone(), &registry).await {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("Unable to create adapter for {}: {e}", config.route);
            return ExitCode::FAILURE;
        }
    };
    info!("logstash: forwarding to {}", adapter.route());

    let (tx, rx) = mpsc::channel(config.queue_capacity);
    let cancel_token = CancellationToken::new();

    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, draining queued messages");
            shutdown_token.cancel();
        }
    });

    let reader = tokio::spawn(ingest::read_messages(
        BufReader::new(tokio::io::stdin()),
        tx,
        cancel_token.clone(),
    ));

    let result = adapter.stream(rx).await;
    cancel_token.cancel();

    match result {
        Ok(()) => {
            match reader.await {
                Ok(queued) => info!("logstash: forwarded {queued} messages"),
                Err(e) => error!("Input reader failed: {e}"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("logstash: forwarder terminated: {e}");
            ExitCode::FAILURE
        }
    }
}
