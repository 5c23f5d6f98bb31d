use anyhow::{Result, anyhow};
use citeflow_infrastructure::CiteflowPaths;

pub fn path() -> Result<()> {
    let config = CiteflowPaths::config_file().map_err(|e| anyhow!(e.to_string()))?;
    let secret = CiteflowPaths::secret_file().map_err(|e| anyhow!(e.to_string()))?;

    println!("config: {}{}", config.display(), marker(config.exists()));
    println!("secret: {}{}", secret.display(), marker(secret.exists()));
    Ok(())
}

fn marker(exists: bool) -> &'static str {
    if exists { "" } else { " (missing)" }
}
