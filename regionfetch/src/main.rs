mod config;
mod driver;
mod errors;
mod fetch;
mod links;
mod manifest;


use std::path::Path;

use crate::config::{CATALOG, load_config};
use crate::errors::GeneralError;
use crate::fetch::SophoxFetcher;


async fn run() -> Result<(), GeneralError> {
    // set up tracing
    let (stderr_non_blocking, _guard) = tracing_appender::non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(stderr_non_blocking)
        .init();

    let config = load_config(CATALOG)?;
    let fetcher = SophoxFetcher::new(&config)?;

    // outputs land relative to the working directory
    driver::run(&config, Path::new("."), &fetcher).await
}

fn main() {
    // one request at a time; no need for more than one thread
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start runtime: {}", e);
            std::process::exit(1);
        },
    };
    let result = runtime.block_on(async {
        run().await
    });

    std::process::exit(
        match result {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{}", e);
                1
            },
        }
    )
}
