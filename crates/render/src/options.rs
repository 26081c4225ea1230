use std::path::PathBuf;
use std::time::Duration;

/// Knobs for launching Chrome.
///
/// Durations are stored as plain integers so the struct (de)serializes cleanly
/// from environment variables when the `serde` feature is enabled.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ChromeOptions {
    /// Explicit executable; skips discovery on `PATH` and Flatpak.
    pub executable: Option<PathBuf>,
    /// Disabling the sandbox is required when running as root (containers).
    pub sandbox: bool,
    /// Wall-clock limit for a single Chrome invocation, in seconds.
    pub timeout: u64,
    /// Virtual time budget in milliseconds. Virtual time only advances while
    /// no network requests are pending, so this bounds how long the page may
    /// stay idle before it is considered loaded.
    pub idle_budget: u64,
    /// Inject `<base href>` so relative resources resolve against the page URL
    /// when printing captured HTML from a local file.
    pub base_href: bool,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self { executable: None, sandbox: true, timeout: 30, idle_budget: 5000, base_href: true }
    }
}

impl ChromeOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn idle_budget(&self) -> Duration {
        Duration::from_millis(self.idle_budget)
    }
}
