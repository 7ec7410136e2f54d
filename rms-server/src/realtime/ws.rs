//! WebSocket 接入
//!
//! `/ws/kds`、`/ws/waiter`、`/ws/inventory` 三个端点，连接时用
//! `?token=<jwt>` 验证身份；令牌里的 restaurant_id 决定这条连接能
//! 收到哪个门店的帧。验证失败直接关闭连接。

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::Channel;
use crate::core::ServerState;
use crate::utils::AppError;

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    pub token: String,
}

pub async fn kds_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
    Query(query): Query<WsAuthQuery>,
) -> Result<impl IntoResponse, AppError> {
    upgrade(ws, state, query, Channel::Kitchen)
}

pub async fn waiter_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
    Query(query): Query<WsAuthQuery>,
) -> Result<impl IntoResponse, AppError> {
    upgrade(ws, state, query, Channel::Waiter)
}

pub async fn inventory_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
    Query(query): Query<WsAuthQuery>,
) -> Result<impl IntoResponse, AppError> {
    upgrade(ws, state, query, Channel::Inventory)
}

fn upgrade(
    ws: WebSocketUpgrade,
    state: ServerState,
    query: WsAuthQuery,
    channel: Channel,
) -> Result<impl IntoResponse, AppError> {
    let claims = state
        .jwt
        .validate_token(&query.token)
        .map_err(|_| AppError::InvalidToken)?;
    let restaurant_id = claims.restaurant_id;

    tracing::info!(
        channel = channel.as_str(),
        restaurant_id,
        username = %claims.username,
        "websocket client connected"
    );

    Ok(ws.on_upgrade(move |socket| forward_loop(socket, state, channel, restaurant_id)))
}

/// Forward channel frames to one socket until either side goes away.
/// Frames for other tenants are dropped here, not at the sender.
async fn forward_loop(socket: WebSocket, state: ServerState, channel: Channel, restaurant_id: i64) {
    use futures::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.fanout.subscribe(channel);

    loop {
        tokio::select! {
            frame = rx.recv() => {
                match frame {
                    Ok(message) => {
                        if message.restaurant_id != restaurant_id {
                            continue;
                        }
                        let text = match serde_json::to_string(&message) {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::error!(error = %e, "failed to serialize push frame");
                                continue;
                            }
                        };
                        if sender.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        // Slow client; best-effort means we skip, not buffer.
                        tracing::warn!(
                            channel = channel.as_str(),
                            restaurant_id,
                            skipped,
                            "websocket client lagged"
                        );
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    // Inbound frames are ignored, but a close (or error) ends the loop
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::info!(
        channel = channel.as_str(),
        restaurant_id,
        "websocket client disconnected"
    );
}
