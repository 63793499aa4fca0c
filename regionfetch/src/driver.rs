use std::fs;
use std::path::{Path, PathBuf};

use regionfetch_sparql::build_query;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::{GeneralError, OutputError};
use crate::fetch::{OutputFormat, RegionFetcher};
use crate::links::deep_link;
use crate::manifest::{Manifest, MANIFEST_FILE_NAME};


/// Where the artifact of region `name` in the given format is stored.
pub(crate) fn artifact_path(output_dir: &Path, name: &str, format: OutputFormat) -> PathBuf {
    output_dir
        .join(format.as_str())
        .join(format!("{}.{}", name, format))
}


/// Downloads every region in the catalog in every format and records the queries in the manifest.
///
/// Regions are processed one after the other in catalog order. The first failure aborts the run;
/// artifacts written before it are left in place.
pub(crate) async fn run(config: &Config, output_dir: &Path, fetcher: &dyn RegionFetcher) -> Result<(), GeneralError> {
    let manifest = Manifest::recreate(output_dir.join(MANIFEST_FILE_NAME))?;
    debug!("recreated manifest {}", manifest.path().display());

    for format in OutputFormat::ALL {
        let format_dir = output_dir.join(format.as_str());
        fs::create_dir_all(&format_dir)
            .map_err(|e| OutputError::CreatingDirectory(format_dir.clone(), e))?;
    }

    for region in &config.regions {
        let sparql = build_query(&region.query);

        let link = deep_link(&config.base_url, &sparql)
            .map_err(|e| OutputError::ConstructingLink(e))?;
        manifest.append(&region.name, &link)?;

        for format in OutputFormat::ALL {
            let body = fetcher.fetch(format, &sparql).await?;

            let path = artifact_path(output_dir, &region.name, format);
            fs::write(&path, &body)
                .map_err(|e| OutputError::WritingArtifact(path.clone(), e))?;

            println!("Downloaded {} ({} bytes) => {}", region.name, body.len(), path.display());
        }
    }

    info!("downloaded {} regions", config.regions.len());
    Ok(())
}
