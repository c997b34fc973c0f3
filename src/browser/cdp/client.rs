//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use super::protocol::{BrowserVersion, CdpRequest, CdpResponse};
use crate::browser::BrowserError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, BrowserError>>>>>;

/// CDP client multiplexing browser and page sessions over one WebSocket.
pub struct CdpClient {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: PendingMap,
    call_timeout: Duration,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Resolves the browser WebSocket URL from a DevTools HTTP endpoint.
    pub async fn discover_ws_url(endpoint: &str) -> Result<String, BrowserError> {
        let version_url = format!("{}/json/version", endpoint.trim_end_matches('/'));
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| BrowserError::ConnectionFailed(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| BrowserError::ConnectionFailed(format!("{}: {}", endpoint, e)))?;

        debug!("Found browser: {}", version.browser);
        Ok(version.web_socket_debugger_url)
    }

    /// Connects to a browser WebSocket URL.
    pub async fn connect(ws_url: &str, call_timeout: Duration) -> Result<Self, BrowserError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| BrowserError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending).await;
            })
        };

        debug!("CDP client connected to {}", ws_url);

        Ok(Self {
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            request_id: AtomicU64::new(1),
            pending,
            call_timeout,
            recv_task,
        })
    }

    /// WebSocket receive loop. Events are not subscribed to and are dropped.
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    let resp = match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => resp,
                        Err(e) => {
                            warn!("Failed to parse CDP message: {}", e);
                            continue;
                        }
                    };

                    let Some(id) = resp.id else { continue };
                    let Some(tx) = pending.lock().remove(&id) else { continue };

                    let result = match resp.error {
                        Some(error) => Err(BrowserError::Protocol {
                            code: error.code,
                            message: error.message,
                        }),
                        None => Ok(resp.result.unwrap_or(Value::Null)),
                    };
                    let _ = tx.send(result);
                }
                Ok(Message::Close(_)) => {
                    debug!("CDP WebSocket closed");
                    break;
                }
                Err(e) => {
                    debug!("CDP WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Wake every caller still waiting; dropping the senders reports SessionClosed.
        pending.lock().clear();
    }

    /// Sends a CDP command and waits for its response.
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, BrowserError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        let _pending = PendingGuard {
            pending: &self.pending,
            id,
        };

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                return Err(BrowserError::WebSocket(e.to_string()));
            }
        }

        match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BrowserError::SessionClosed),
            Err(_) => Err(BrowserError::Timeout(format!("{} timed out", method))),
        }
    }
}

/// Drops a request's pending entry once its caller stops waiting, including on cancellation.
struct PendingGuard<'a> {
    pending: &'a PendingMap,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.id);
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
