use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use url::Url;


#[derive(Debug)]
pub(crate) enum ConfigError {
    Loading(serde_json::Error),
    EmptyCatalog,
    InvalidRegionName(String),
    DuplicateRegionName(String),
    BaseUrlNotDirectory(Url),
}
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Loading(e)
                => write!(f, "error loading region catalog: {}", e),
            ConfigError::EmptyCatalog
                => write!(f, "region catalog is empty"),
            ConfigError::InvalidRegionName(name)
                => write!(f, "region name {:?} cannot be used as a file name", name),
            ConfigError::DuplicateRegionName(name)
                => write!(f, "region name {:?} appears more than once in the catalog", name),
            ConfigError::BaseUrlNotDirectory(url)
                => write!(f, "base URL {} does not end with a slash", url),
        }
    }
}
impl error::Error for ConfigError {
}


#[derive(Debug)]
pub(crate) enum FetchError {
    BuildingClient(reqwest::Error),
    ConstructingUrl(url::ParseError),
    Http(String, reqwest::Error),
    ResponseCode(String, reqwest::StatusCode),
    Bytes(String, reqwest::Error),
}
impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::BuildingClient(e)
                => write!(f, "error building HTTP client: {}", e),
            FetchError::ConstructingUrl(e)
                => write!(f, "error constructing URL: {}", e),
            FetchError::Http(endpoint, e)
                => write!(f, "error requesting {}: {}", endpoint, e),
            FetchError::ResponseCode(endpoint, status)
                => write!(f, "HTTP request to {} returned status code {}", endpoint, status),
            FetchError::Bytes(endpoint, e)
                => write!(f, "failed to obtain response body of {}: {}", endpoint, e),
        }
    }
}
impl error::Error for FetchError {
}


#[derive(Debug)]
pub(crate) enum OutputError {
    RemovingManifest(PathBuf, io::Error),
    CreatingManifest(PathBuf, io::Error),
    AppendingManifest(PathBuf, io::Error),
    ConstructingLink(url::ParseError),
    CreatingDirectory(PathBuf, io::Error),
    WritingArtifact(PathBuf, io::Error),
}
impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::RemovingManifest(path, e)
                => write!(f, "error removing previous manifest {}: {}", path.display(), e),
            OutputError::CreatingManifest(path, e)
                => write!(f, "error creating manifest {}: {}", path.display(), e),
            OutputError::AppendingManifest(path, e)
                => write!(f, "error appending to manifest {}: {}", path.display(), e),
            OutputError::ConstructingLink(e)
                => write!(f, "error constructing query link: {}", e),
            OutputError::CreatingDirectory(path, e)
                => write!(f, "error creating directory {}: {}", path.display(), e),
            OutputError::WritingArtifact(path, e)
                => write!(f, "error writing {}: {}", path.display(), e),
        }
    }
}
impl error::Error for OutputError {
}


#[derive(Debug)]
pub(crate) enum GeneralError {
    Config(ConfigError),
    Fetch(FetchError),
    Output(OutputError),
}
impl fmt::Display for GeneralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneralError::Config(e)
                => write!(f, "{}", e),
            GeneralError::Fetch(e)
                => write!(f, "{}", e),
            GeneralError::Output(e)
                => write!(f, "{}", e),
        }
    }
}
impl error::Error for GeneralError {
}
impl From<ConfigError> for GeneralError {
    fn from(e: ConfigError) -> Self {
        GeneralError::Config(e)
    }
}
impl From<FetchError> for GeneralError {
    fn from(e: FetchError) -> Self {
        GeneralError::Fetch(e)
    }
}
impl From<OutputError> for GeneralError {
    fn from(e: OutputError) -> Self {
        GeneralError::Output(e)
    }
}
