//! Configuration file handling.
//!
//! The configuration file is stored at `$SALES_HOME/config.json` and names the transactions file
//! to load along with reporting defaults.

use crate::model::{DataFormat, Transactions};
use crate::sales::{SalesStore, DEFAULT_CURRENCY};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "sales";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const TRANSACTIONS_STEM: &str = "transactions";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SALES_HOME` and from there it loads `$SALES_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and:
    /// - Copies `transactions_file` into it as `transactions.json` or `transactions.csv`
    /// - Creates an initial `config.json` pointing at the copy, with default settings
    ///
    /// # Errors
    /// - Returns an error if the directory already holds a `config.json`.
    /// - Returns an error if the transactions file is not `.json` or `.csv`, or does not parse.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, transactions_file: &Path) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the sales home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}', refusing to overwrite it",
                config_path.display()
            )
        }

        // Parse before copying so a bad file never lands in the home directory
        let format = DataFormat::from_path(transactions_file)?;
        let count = Transactions::load(transactions_file).await?.len();
        debug!("{count} transactions found in {}", transactions_file.display());

        let file_name = format!("{TRANSACTIONS_STEM}.{format}");
        utils::copy(transactions_file, root.join(&file_name)).await?;

        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            transactions_path: PathBuf::from(file_name),
            default_currency: DEFAULT_CURRENCY.to_string(),
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `sales_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(sales_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = sales_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Sales Home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the stored `transactions_path` if it is absolute, otherwise resolves it against the
    /// home directory.
    pub fn transactions_path(&self) -> PathBuf {
        let p = &self.config_file.transactions_path;
        if p.is_absolute() {
            return p.clone();
        }
        self.root.join(p)
    }

    pub fn default_currency(&self) -> &str {
        &self.config_file.default_currency
    }

    /// Loads the configured transactions file into a store with the configured default currency
    /// and no filter.
    pub async fn load_store(&self) -> Result<SalesStore> {
        let path = self.transactions_path();
        let transactions = Transactions::load(&path).await?;
        debug!("Loaded {} transactions from {}", transactions.len(), path.display());
        Ok(SalesStore::new(transactions).with_default_currency(self.default_currency()))
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "sales",
///   "config_version": 1,
///   "transactions_path": "transactions.json",
///   "default_currency": "USD"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "sales"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the transactions file, relative to the home directory or absolute
    transactions_path: PathBuf,

    /// Currency reported by KPIs when no transactions match
    #[serde(default = "default_currency")]
    default_currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or is not a config for this app
    /// version.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config version {} is unsupported. Is a newer version of sales available?",
            config.config_version
        );
        anyhow::ensure!(
            !config.default_currency.trim().is_empty(),
            "default_currency in the config file must not be empty"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
