//! The `cloze health` command.

use std::path::PathBuf;

use anyhow::Result;

use cloze_client::config::{create_service, load_config_from};

/// Reachability is advisory, so an unreachable service is not an error.
pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let service = create_service(&config, None)?;

    if service.check_health().await {
        println!("Service '{}' is reachable.", service.name());
    } else {
        println!("Service '{}' is NOT reachable.", service.name());
    }

    Ok(())
}
