// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Inbound side of the forwarder: router messages as JSON lines.

use logstash_adapter::container::LogMessage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Reads one JSON router message per line from `reader` into `tx`.
///
/// Stops on end of input, on cancellation, or once the forwarder has dropped its
/// receiver. Lines that do not parse are logged and skipped. Returns the number
/// of messages queued.
pub async fn read_messages<R>(
    reader: R,
    tx: mpsc::Sender<LogMessage>,
    cancel_token: CancellationToken,
) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut queued = 0;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = cancel_token.cancelled() => {
                debug!("ingest: cancelled");
                break;
            }
        };

        match line {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match serde_json::from_str::<LogMessage>(&line) {
                Ok(message) => {
                    if tx.send(message).await.is_err() {
                        debug!("ingest: forwarder stopped, no longer reading");
                        break;
                    }
                    queued += 1;
                }
                Err(e) => warn!("ingest: skipping malformed message: {}", e),
            },
            Ok(None) => {
                debug!("ingest: end of input");
                break;
            }
            Err(e) => {
                error!("ingest: failed to read input: {}", e);
                break;
            }
        }
    }

    queued
}
