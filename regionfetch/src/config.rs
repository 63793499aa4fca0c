use std::collections::HashSet;

use regionfetch_sparql::RegionQuery;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::errors::ConfigError;


/// The region catalog processed by every run.
pub(crate) static CATALOG: &str = include_str!("../catalog.json");

const DEFAULT_BASE_URL: &str = "https://sophox.org/";
const DEFAULT_USER_AGENT: &str = "regionfetch/0.1";


#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Config {
    /// Root of the Sophox installation; both the regions service and the query browser live
    /// below it.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    pub regions: Vec<RegionRequest>,
}


#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct RegionRequest {
    /// Names both the output files and the manifest entry.
    pub name: String,

    #[serde(flatten)]
    pub query: RegionQuery,
}


fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL)
        .expect("default base URL is valid")
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_owned()
}


fn is_valid_region_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c: char| c == '/' || c == '\\' || c.is_control())
}


pub(crate) fn load_config(json: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(json)
        .map_err(|e| ConfigError::Loading(e))?;

    if config.regions.is_empty() {
        return Err(ConfigError::EmptyCatalog);
    }
    if !config.base_url.path().ends_with('/') {
        return Err(ConfigError::BaseUrlNotDirectory(config.base_url));
    }

    let mut seen_names = HashSet::new();
    for region in &config.regions {
        if !is_valid_region_name(&region.name) {
            return Err(ConfigError::InvalidRegionName(region.name.clone()));
        }
        if !seen_names.insert(region.name.as_str()) {
            return Err(ConfigError::DuplicateRegionName(region.name.clone()));
        }
    }

    debug!("loaded catalog with {} regions", config.regions.len());
    Ok(config)
}
