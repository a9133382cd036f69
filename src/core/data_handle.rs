use axum::extract::ws::{Message, WebSocket};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::format::DecodedTable;

#[derive(Serialize)]
struct SignalPayload {
    timestamp: f64,
    value: f64,
    desc: String,
    seq: u64,
    end_flag: bool,
}

/// Streams one decoded channel sample by sample, then an end marker.
/// Text channels are sent with the event string in `desc`.
pub async fn handle_ws_fetch(mut socket: WebSocket, table: Arc<DecodedTable>, signal_name: String) {
    info!("ws_fetch streaming started: {}", signal_name);

    let payloads: Vec<SignalPayload> = if let Some(values) = table.int_column(&signal_name) {
        table
            .time
            .iter()
            .zip(values)
            .map(|(t, v)| (*t, *v as f64, String::new()))
            .enumerate()
            .map(|(seq, (timestamp, value, desc))| SignalPayload {
                timestamp,
                value,
                desc,
                seq: seq as u64,
                end_flag: false,
            })
            .collect()
    } else if let Some(values) = table.text_column(&signal_name) {
        table
            .time
            .iter()
            .zip(values)
            .filter(|(_, text)| !text.is_empty())
            .enumerate()
            .map(|(seq, (t, text))| SignalPayload {
                timestamp: *t,
                value: 1.0,
                desc: text.clone(),
                seq: seq as u64,
                end_flag: false,
            })
            .collect()
    } else {
        error!("signal not found: {}", signal_name);
        return;
    };

    let seq = payloads.len() as u64;
    for payload in payloads {
        let json = match serde_json::to_string(&payload) {
            Ok(j) => j,
            Err(e) => {
                error!("json serialize error: {}", e);
                return;
            }
        };

        if let Err(e) = socket.send(Message::Text(json.into())).await {
            warn!("ws send failed: {}", e);
            return;
        }
    }

    let end_payload = SignalPayload {
        timestamp: 0.0,
        value: 0.0,
        desc: String::new(),
        seq,
        end_flag: true,
    };

    if let Ok(json) = serde_json::to_string(&end_payload) {
        let _ = socket.send(Message::Text(json.into())).await;
    }

    info!("ws_fetch finished: {}", signal_name);
}
