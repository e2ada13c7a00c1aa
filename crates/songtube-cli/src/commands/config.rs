use anyhow::Result;
use std::path::Path;
use songtube_core::config::{default_config_path, Config, TOKEN_ENV_VAR};

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load(config_path)?;

    // Never print the token itself
    if config.auth.potoken.is_some() {
        config.auth.potoken = Some("(set)".to_string());
    }

    println!("songtube configuration\n");
    print!("{}", toml::to_string_pretty(&config)?);

    if config.paths.yt_dlp.is_none() {
        println!("\n# paths.yt_dlp: auto-detect");
    }
    if config.download.temp_dir.is_none() {
        println!("# download.temp_dir: {}", config.temp_dir().display());
    }

    // Show config file locations
    println!("\nConfig sources (later entries override earlier ones):");
    if let Some(default_config) = default_config_path() {
        println!("  1. {}", default_config.display());
    }
    if let Some(p) = config_path {
        println!("  2. {} (specified)", p.display());
    }
    println!("  3. Environment variables (SONGTUBE_SECTION__KEY)");
    println!("  4. {} (token only)", TOKEN_ENV_VAR);

    Ok(())
}
