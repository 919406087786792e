use std::net::SocketAddr;
use std::sync::Arc;

use crosstrail_core::{decode_client_message, encode, Coordinator, Outbox, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use hyper_tungstenite::tungstenite::Message;
use log::{error, info, warn};
use tokio::sync::{mpsc, Mutex};

pub type SharedCoordinator = Arc<Mutex<Coordinator<WsOutbox>>>;

/// Queue feeding one connection's writer task.
#[derive(Clone)]
pub struct WsOutbox {
    tx: mpsc::UnboundedSender<Message>,
}

impl WsOutbox {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }
}

impl Outbox for WsOutbox {
    type Error = String;

    fn deliver(&self, msg: &ServerMessage) -> Result<(), Self::Error> {
        let json = encode(msg).map_err(|e| format!("failed to serialize: {}", e))?;
        self.tx
            .send(Message::Text(json))
            .map_err(|_| "connection closed".to_string())
    }
}

/// Runs one participant's connection until either side closes it.
pub async fn handle_connection(
    ws: hyper_tungstenite::WebSocketStream<hyper::upgrade::Upgraded>,
    addr: SocketAddr,
    coordinator: SharedCoordinator,
) {
    let (mut ws_sender, mut ws_receiver) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let id = coordinator.lock().await.connect(WsOutbox::new(tx.clone()));
    info!("participant {} connected from {}", id, addr);

    loop {
        tokio::select! {
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => match decode_client_message(&text) {
                        Ok(msg) => {
                            coordinator.lock().await.handle_message(&id, msg);
                        }
                        Err(e) => warn!("dropping frame from {}: {}", id, e),
                    },
                    Some(Ok(Message::Close(_))) => {
                        info!("participant {} closed connection", id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = tx.send(Message::Pong(data));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error from {} ({}): {}", id, addr, e);
                        break;
                    }
                    None => break,
                }
            }
            _ = &mut send_task => {
                break;
            }
        }
    }

    coordinator.lock().await.disconnect(&id);
    send_task.abort();
}
