//! CDP-backed page and browser sessions.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::process::Child;
use tracing::{debug, warn};

use super::client::CdpClient;
use super::protocol::DocumentResponse;
use crate::browser::{
    BrowserError, BrowserSession, NavigationOptions, NavigationResponse, PageHandle,
};

/// Reads the main-document status and type from inside the loaded page.
const DOCUMENT_RESPONSE_SCRIPT: &str = r#"(() => {
  const nav = performance.getEntriesByType('navigation')[0];
  return {
    status: nav && nav.responseStatus ? nav.responseStatus : 0,
    contentType: document.contentType || null,
    url: location.href
  };
})()"#;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A browser reached over CDP, optionally owning the launched process.
pub struct CdpBrowser {
    client: Arc<CdpClient>,
    child: tokio::sync::Mutex<Option<Child>>,
    profile_dir: Option<PathBuf>,
}

impl CdpBrowser {
    pub(crate) fn new(client: CdpClient, child: Option<Child>, profile_dir: Option<PathBuf>) -> Self {
        Self {
            client: Arc::new(client),
            child: tokio::sync::Mutex::new(child),
            profile_dir,
        }
    }
}

#[async_trait]
impl BrowserSession for CdpBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>, BrowserError> {
        let created = self
            .client
            .call(
                "Target.createTarget",
                Some(json!({"url": "about:blank"})),
                None,
            )
            .await?;

        let target_id = created["targetId"]
            .as_str()
            .ok_or_else(|| BrowserError::InvalidResponse("Missing targetId".to_string()))?
            .to_string();

        let attached = self
            .client
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
                None,
            )
            .await?;

        let session_id = attached["sessionId"]
            .as_str()
            .ok_or_else(|| BrowserError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        debug!("Opened page target {}", target_id);

        Ok(Box::new(CdpPage {
            client: self.client.clone(),
            target_id,
            session_id,
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        // A browser reached through an endpoint belongs to someone else and stays up.
        let Some(mut child) = self.child.lock().await.take() else {
            debug!("Disconnecting from externally managed browser");
            return Ok(());
        };

        let result = self.client.call("Browser.close", None, None).await;

        match tokio::time::timeout(Duration::from_secs(5), child.wait()).await {
            Ok(Ok(status)) => debug!("Browser exited with {}", status),
            _ => {
                warn!("Browser did not exit after Browser.close, killing it");
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill browser process: {}", e);
                }
            }
        }

        if let Some(dir) = &self.profile_dir {
            if let Err(e) = std::fs::remove_dir_all(dir) {
                debug!("Could not remove profile dir {}: {}", dir.display(), e);
            }
        }

        match result {
            // The browser may drop the socket before acknowledging Browser.close.
            Err(BrowserError::SessionClosed) => Ok(()),
            other => other.map(|_| ()),
        }
    }
}

/// One attached page target.
pub struct CdpPage {
    client: Arc<CdpClient>,
    target_id: String,
    session_id: String,
}

impl CdpPage {
    async fn call(&self, method: &str, params: Value) -> Result<Value, BrowserError> {
        self.client
            .call(method, Some(params), Some(&self.session_id))
            .await
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResponse, BrowserError> {
        let result = self.call("Page.navigate", json!({"url": url})).await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            if !error.is_empty() {
                return Err(BrowserError::NavigationFailed(error.to_string()));
            }
        }

        loop {
            let state = self.evaluate("document.readyState").await?;
            if state.as_str() == Some("complete") {
                break;
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }

        let doc: DocumentResponse =
            serde_json::from_value(self.evaluate(DOCUMENT_RESPONSE_SCRIPT).await?)?;

        // Older browsers do not expose responseStatus; a committed navigation loaded something.
        let status = if doc.status == 0 { 200 } else { doc.status };

        Ok(NavigationResponse {
            status,
            content_type: doc.content_type,
            url: if doc.url.is_empty() { url.to_string() } else { doc.url },
        })
    }
}

#[async_trait]
impl PageHandle for CdpPage {
    async fn goto(
        &self,
        url: &str,
        options: NavigationOptions,
    ) -> Result<NavigationResponse, BrowserError> {
        match tokio::time::timeout(options.timeout, self.navigate(url)).await {
            Ok(result) => result,
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigation to {} exceeded {}ms",
                url,
                options.timeout.as_millis()
            ))),
        }
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError> {
        let result = self
            .call(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            return Err(BrowserError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.client
            .call(
                "Target.closeTarget",
                Some(json!({"targetId": self.target_id})),
                None,
            )
            .await?;
        debug!("Closed page target {}", self.target_id);
        Ok(())
    }
}
