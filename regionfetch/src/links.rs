use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use url::Url;

use crate::fetch::OutputFormat;


/// Characters left unencoded when a query is embedded in a URL; everything else, including
/// spaces and newlines, is percent-encoded.
pub const QUERY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');


pub(crate) fn encode_query(sparql: &str) -> String {
    percent_encode(sparql.as_bytes(), QUERY_SAFE)
        .to_string()
}

/// The regions service endpoint for the given format, without a query.
pub(crate) fn region_endpoint(base_url: &Url, format: OutputFormat) -> Result<Url, url::ParseError> {
    base_url.join(&format!("regions/{}.json", format))
}

/// The URL from which the regions selected by `sparql` can be downloaded in the given format.
pub(crate) fn region_url(base_url: &Url, format: OutputFormat, sparql: &str) -> Result<Url, url::ParseError> {
    let mut url = region_endpoint(base_url, format)?;
    url.set_query(Some(&format!("sparql={}", encode_query(sparql))));
    Ok(url)
}

/// The URL opening `sparql` in the Sophox query browser.
pub(crate) fn deep_link(base_url: &Url, sparql: &str) -> Result<Url, url::ParseError> {
    let mut url = base_url.join("sophox/")?;
    url.set_fragment(Some(&encode_query(sparql)));
    Ok(url)
}
