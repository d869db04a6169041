use axum::extract::ws::{Message, WebSocket};
use futures_util::SinkExt;

pub type WsSink = futures_util::stream::SplitSink<WebSocket, Message>;

/// Serialize any value to JSON and send it over the WS connection.
pub async fn json<T: serde::Serialize>(tx: &mut WsSink, payload: &T) -> Result<(), axum::Error> {
    let json = serde_json::to_string(payload).unwrap_or_default();
    text(tx, json).await
}

/// Send an already-serialized frame.
pub async fn text(tx: &mut WsSink, frame: String) -> Result<(), axum::Error> {
    tx.send(Message::Text(frame.into()))
        .await
        .map_err(axum::Error::new)
}
