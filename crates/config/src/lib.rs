//! Runtime configuration for webpdf.
//!
//! Values are layered with [`figment`]: built-in defaults first, then
//! `WEBPDF_`-prefixed environment variables. Nested keys use a double
//! underscore, so `WEBPDF_CHROME__TIMEOUT=60` sets [`ChromeOptions::timeout`].
//! No configuration file is read; command-line flags are applied on top by
//! the binary.
//!
//! | Variable                      | Default  |
//! |-------------------------------|----------|
//! | `WEBPDF_OUTPUT_DIR`           | `output` |
//! | `WEBPDF_CHROME__EXECUTABLE`   | discover |
//! | `WEBPDF_CHROME__SANDBOX`      | `true`   |
//! | `WEBPDF_CHROME__TIMEOUT`      | `30`     |
//! | `WEBPDF_CHROME__IDLE_BUDGET`  | `5000`   |
//! | `WEBPDF_CHROME__BASE_HREF`    | `true`   |

pub mod error;

use crate::error::{Error, ErrorKind, Result};
use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
pub use webpdf_render::ChromeOptions;

/// Prefix shared by every environment variable this crate reads.
pub const ENV_PREFIX: &str = "WEBPDF_";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory derived PDF paths are placed in.
    pub output_dir: PathBuf,
    pub chrome: ChromeOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self { output_dir: PathBuf::from("output"), chrome: ChromeOptions::default() }
    }
}

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().map_err(|err| Error::from(ErrorKind::Invalid(err.to_string())))?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn defaults_without_environment() {
        Jail::expect_with(|_jail| {
            let config = Config::load().unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.output_dir, PathBuf::from("output"));
            assert!(config.chrome.sandbox);
            assert_eq!(config.chrome.timeout, 30);
            assert_eq!(config.chrome.executable, None);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("WEBPDF_OUTPUT_DIR", "pdfs");
            jail.set_env("WEBPDF_CHROME__EXECUTABLE", "/opt/chromium/chrome");
            jail.set_env("WEBPDF_CHROME__SANDBOX", "false");
            jail.set_env("WEBPDF_CHROME__TIMEOUT", "90");
            jail.set_env("WEBPDF_CHROME__IDLE_BUDGET", "250");
            let config = Config::load().unwrap();
            assert_eq!(config.output_dir, PathBuf::from("pdfs"));
            assert_eq!(config.chrome.executable, Some(PathBuf::from("/opt/chromium/chrome")));
            assert!(!config.chrome.sandbox);
            assert_eq!(config.chrome.timeout, 90);
            assert_eq!(config.chrome.idle_budget, 250);
            // Untouched keys keep their defaults.
            assert!(config.chrome.base_href);
            Ok(())
        });
    }

    #[rstest]
    #[case("WEBPDF_CHROME__TIMEOUT", "soon")]
    #[case("WEBPDF_CHROME__SANDBOX", "maybe")]
    #[case("WEBPDF_CHROME__IDLE_BUDGET", "-1")]
    fn invalid_values_are_rejected(#[case] key: &str, #[case] value: &str) {
        Jail::expect_with(|jail| {
            jail.set_env(key, value);
            let err = Config::load().unwrap_err();
            assert!(matches!(*err, ErrorKind::Invalid(_)));
            assert!((*err).to_string().starts_with("invalid configuration: "));
            Ok(())
        });
    }
}
