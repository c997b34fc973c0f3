//! In-process DevTools WebSocket endpoint for driver tests.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Accepts one connection and records the method of every command it receives.
pub(crate) struct FakeDevTools {
    pub ws_url: String,
    pub methods: Arc<Mutex<Vec<String>>>,
}

impl FakeDevTools {
    /// With `reply` unset, commands are recorded but never answered.
    pub(crate) async fn spawn(reply: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let methods = Arc::new(Mutex::new(Vec::new()));

        let recorded = methods.clone();
        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else { return };
            let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else { return };

            while let Some(Ok(msg)) = ws.next().await {
                let Message::Text(text) = msg else { continue };
                let request: Value = serde_json::from_str(&text).unwrap();
                recorded
                    .lock()
                    .push(request["method"].as_str().unwrap_or_default().to_string());

                if reply {
                    let response = json!({"id": request["id"], "result": {}});
                    if ws.send(Message::Text(response.to_string().into())).await.is_err() {
                        break;
                    }
                }
            }
        });

        Self {
            ws_url: format!("ws://{}/devtools/browser/test", addr),
            methods,
        }
    }
}
