use serde::Deserialize;

/// Default page budget for a run
pub const DEFAULT_PAGES: usize = 5;

/// Default per-fetch / per-navigation timeout (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of pages audited at once
pub const DEFAULT_CONCURRENCY: usize = 2;

/// Main configuration structure for AutoSiteFix
///
/// Every section is optional; a missing file or section means defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audit: AuditConfig,
    pub browser: BrowserConfig,
    pub accessibility: AccessibilityConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Audit run configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum number of pages discovered and audited
    pub pages: usize,

    /// Per-fetch and per-navigation timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Maximum number of page audits running at once
    pub concurrency: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            pages: DEFAULT_PAGES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Browser launch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Chrome/Chromium executable; well-known names are tried when unset
    pub executable: Option<String>,

    /// DevTools HTTP endpoint of an already running browser (skips launching)
    pub endpoint: Option<String>,

    /// Remote debugging port for a launched browser
    #[serde(rename = "debug-port")]
    pub debug_port: u16,

    /// Whether a launched browser runs headless
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            endpoint: None,
            debug_port: 9222,
            headless: true,
        }
    }
}

/// Accessibility rule engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    /// Path to the rule engine source (e.g. axe.min.js) injected into each page
    #[serde(rename = "engine-script")]
    pub engine_script: Option<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the auditor
    pub name: String,

    /// Version of the auditor
    pub version: String,

    /// Optional URL with information about the auditor
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "AutoSiteFix".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.name, self.version, contact),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving report.json and summary.md
    #[serde(rename = "report-dir")]
    pub report_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: "autositefix-report".to_string(),
        }
    }
}
