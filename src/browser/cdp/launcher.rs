//! Launching or connecting to Chrome.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use super::client::CdpClient;
use super::page::CdpBrowser;
use crate::browser::{BrowserError, BrowserLauncher, BrowserSession};
use crate::config::BrowserConfig;

/// Executables tried, in order, when none is configured
const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
];

const STARTUP_ATTEMPTS: u32 = 50;
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Launches Chrome (or connects to a running one) and exposes it as a [`BrowserSession`].
#[derive(Debug, Clone)]
pub struct CdpLauncher {
    config: BrowserConfig,
    call_timeout: Duration,
}

impl CdpLauncher {
    /// Creates a launcher; `call_timeout` bounds every individual CDP command
    pub fn new(config: BrowserConfig, call_timeout: Duration) -> Self {
        Self {
            config,
            call_timeout,
        }
    }

    fn launch_args(&self, profile_dir: &std::path::Path) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.config.debug_port),
            format!("--user-data-dir={}", profile_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-extensions".to_string(),
            "about:blank".to_string(),
        ];
        if self.config.headless {
            args.insert(0, "--headless=new".to_string());
        }
        args
    }

    fn spawn_chrome(&self, profile_dir: &std::path::Path) -> Result<Child, BrowserError> {
        let args = self.launch_args(profile_dir);

        let candidates: Vec<&str> = match &self.config.executable {
            Some(executable) => vec![executable.as_str()],
            None => CHROME_CANDIDATES.to_vec(),
        };

        for candidate in candidates {
            match Command::new(candidate)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
            {
                Ok(child) => {
                    info!("Launched browser {}", candidate);
                    return Ok(child);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Browser candidate {} not found", candidate);
                }
                Err(e) => {
                    return Err(BrowserError::LaunchFailed(format!("{}: {}", candidate, e)));
                }
            }
        }

        Err(BrowserError::LaunchFailed(
            "no Chrome/Chromium executable found; set [browser] executable".to_string(),
        ))
    }

    async fn wait_for_endpoint(
        &self,
        endpoint: &str,
        child: &mut Child,
    ) -> Result<String, BrowserError> {
        let mut last_error = None;
        for _ in 0..STARTUP_ATTEMPTS {
            if let Ok(Some(status)) = child.try_wait() {
                return Err(BrowserError::LaunchFailed(format!(
                    "browser exited during startup with {}",
                    status
                )));
            }

            match CdpClient::discover_ws_url(endpoint).await {
                Ok(ws_url) => return Ok(ws_url),
                Err(e) => last_error = Some(e),
            }
            tokio::time::sleep(STARTUP_POLL_INTERVAL).await;
        }

        Err(BrowserError::LaunchFailed(format!(
            "DevTools endpoint {} never came up: {}",
            endpoint,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

#[async_trait]
impl BrowserLauncher for CdpLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, BrowserError> {
        if let Some(endpoint) = &self.config.endpoint {
            info!("Connecting to running browser at {}", endpoint);
            let ws_url = CdpClient::discover_ws_url(endpoint).await?;
            let client = CdpClient::connect(&ws_url, self.call_timeout).await?;
            return Ok(Arc::new(CdpBrowser::new(client, None, None)));
        }

        let profile_dir: PathBuf = std::env::temp_dir().join(format!(
            "autositefix-profile-{}-{}",
            std::process::id(),
            self.config.debug_port
        ));
        std::fs::create_dir_all(&profile_dir)
            .map_err(|e| BrowserError::LaunchFailed(format!("profile dir: {}", e)))?;

        let mut child = match self.spawn_chrome(&profile_dir) {
            Ok(child) => child,
            Err(e) => {
                let _ = std::fs::remove_dir_all(&profile_dir);
                return Err(e);
            }
        };

        let endpoint = format!("http://127.0.0.1:{}", self.config.debug_port);
        let connected = match self.wait_for_endpoint(&endpoint, &mut child).await {
            Ok(ws_url) => CdpClient::connect(&ws_url, self.call_timeout).await,
            Err(e) => Err(e),
        };

        let client = match connected {
            Ok(client) => client,
            Err(e) => {
                // kill_on_drop reaps the process when `child` goes out of scope.
                let _ = std::fs::remove_dir_all(&profile_dir);
                return Err(e);
            }
        };

        Ok(Arc::new(CdpBrowser::new(
            client,
            Some(child),
            Some(profile_dir),
        )))
    }
}
