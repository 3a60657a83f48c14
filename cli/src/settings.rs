//! CLI settings, layered from an optional `numrelay.toml` and environment
//! variables (`NUMRELAY_API__BASE_URL` and friends)

use config::{Config, Environment, File};
use serde::Deserialize;

use nr_shared::{ApiConfig, FlowConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiConfig,
    pub flow: FlowConfig,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("numrelay").required(false))
            .add_source(Environment::with_prefix("NUMRELAY").separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
