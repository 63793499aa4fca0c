use std::fmt;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::errors::FetchError;
use crate::links::{region_endpoint, region_url};


/// The formats offered by the regions service.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum OutputFormat {
    TopoJson,
    GeoJson,
}
impl OutputFormat {
    /// Every format, in the order in which they are downloaded.
    pub const ALL: [OutputFormat; 2] = [OutputFormat::TopoJson, OutputFormat::GeoJson];

    /// The name of the format as used in the service path, the output directory and the file
    /// extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::TopoJson => "topojson",
            OutputFormat::GeoJson => "geojson",
        }
    }
}
impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


#[async_trait]
pub(crate) trait RegionFetcher : Send + Sync {
    /// Runs `sparql` against the regions service and returns the response body in the given
    /// format. Responses with a non-success status code are returned as errors.
    async fn fetch(&self, format: OutputFormat, sparql: &str) -> Result<Vec<u8>, FetchError>;
}


pub(crate) struct SophoxFetcher {
    base_url: Url,
    user_agent: String,
    http_client: reqwest::Client,
}
impl SophoxFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::BuildingClient(e))?;
        Ok(Self::from_client(config, http_client))
    }

    pub fn from_client(config: &Config, http_client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.clone(),
            user_agent: config.user_agent.clone(),
            http_client,
        }
    }
}
#[async_trait]
impl RegionFetcher for SophoxFetcher {
    async fn fetch(&self, format: OutputFormat, sparql: &str) -> Result<Vec<u8>, FetchError> {
        // the full URL contains the whole query; report the endpoint instead
        let endpoint = region_endpoint(&self.base_url, format)
            .map_err(|e| FetchError::ConstructingUrl(e))?
            .to_string();
        let url = region_url(&self.base_url, format, sparql)
            .map_err(|e| FetchError::ConstructingUrl(e))?;

        debug!("requesting {} ({} bytes of query)", endpoint, sparql.len());
        let response = self.http_client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send().await
            .map_err(|e| {
                debug!("request to {} failed: {}", endpoint, e);
                FetchError::Http(endpoint.clone(), e)
            })?;
        if !response.status().is_success() {
            debug!("request to {} returned status code {}", endpoint, response.status());
            return Err(FetchError::ResponseCode(endpoint, response.status()));
        }

        let body = response
            .bytes().await
            .map_err(|e| FetchError::Bytes(endpoint.clone(), e))?;
        Ok(body.to_vec())
    }
}
