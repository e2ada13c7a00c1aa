use anyhow::Result;
use std::path::Path;

use super::apply_overrides;
use crate::args::{DownloadOptions, SearchOptions};
use songtube_core::{web_search::WebSearch, Config, Resolver};

pub async fn run(query: &str, options: &SearchOptions, config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load(config_path)?;
    apply_overrides(&mut config, options, &DownloadOptions::default());

    let search = WebSearch::new(&config.search.base_url)?;
    let resolver = Resolver::from_config(&config, search)?;

    let locator = resolver
        .search(query, config.thresholds(), config.search.search_count)
        .await?;

    println!("{}", locator);
    Ok(())
}
