use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use market_infrastructure::storage::{SecretFileStatus, SecretStorage};
use market_infrastructure::{ConfigService, MarketPaths};

pub fn run(home: Option<&Path>) -> Result<()> {
    let config_service = ConfigService::new(home).context("Failed to locate config directory")?;
    let (config_path, created) = config_service
        .ensure_config_file()
        .context("Failed to write config.toml")?;
    report("config.toml", &config_path, created);

    let secrets = SecretStorage::new(&MarketPaths::new(home))?;
    let created = secrets
        .ensure_template()
        .context("Failed to write secret.json")?;
    report("secret.json", secrets.path(), created);

    if secrets.status()? != SecretFileStatus::Configured {
        println!();
        println!(
            "Preencha {} em {} ou defina {}.",
            "gemini.api_key".bold(),
            secrets.path().display(),
            "GEMINI_API_KEY".bold()
        );
    }
    Ok(())
}

fn report(name: &str, path: &Path, created: bool) {
    let status = if created {
        "criado".green()
    } else {
        "já existe".dimmed()
    };
    println!("{:<12} {} [{}]", name, path.display(), status);
}
