//! Print the resolved configuration

use crate::config::CliConfigLoader;
use crate::output;
use anyhow::Result;

/// Show the configuration every command would run with
pub async fn config_command(config_loader: CliConfigLoader, json: bool) -> Result<()> {
    let config = config_loader.load().await?;
    if json {
        output::print_json(&config)?;
    } else {
        print!("{}", config.to_yaml_string()?);
    }
    Ok(())
}
