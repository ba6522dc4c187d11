use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and:
/// - Copies `transactions_file` into it as its transactions file
/// - Creates an initial `config.json` with default settings
///
/// # Arguments
/// - `sales_home` - The directory that will be the root of data directory, e.g. `$HOME/sales`
/// - `transactions_file` - A `.json` or `.csv` file of sales transactions. It is validated by
///   parsing before it is copied.
///
/// # Errors
/// - Returns an error if the directory is already initialized, the file does not parse, or any file
///   operations fail.
pub async fn init(sales_home: &Path, transactions_file: &Path) -> Result<Out<()>> {
    let config = Config::create(sales_home, transactions_file)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the sales directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::write_sample_json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_creates_home() {
        let dir = TempDir::new().unwrap();
        let source = write_sample_json(dir.path());
        let home = dir.path().join("sales");
        let out = init(&home, &source).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert!(out.structure().is_none());
        assert!(home.join("config.json").is_file());
        assert!(home.join("transactions.json").is_file());
    }

    #[tokio::test]
    async fn init_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = init(&dir.path().join("sales"), &dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "There is a problem with the sales configuration"
        );
    }
}
