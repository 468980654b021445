// Download of the source documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error, info, warn};
use reqwest::blocking::Client;
use serde_json::Value as JSValue;
use snafu::ResultExt;
use url::Url;

use crate::recon::io_common::output_file_name;
use crate::recon::*;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("election-recon/", env!("CARGO_PKG_VERSION"));

/// What a retrieval run did.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RetrievalSummary {
    /// The files written, in the order of the source list.
    pub saved: Vec<PathBuf>,
    /// The URLs that could not be saved.
    pub failed: Vec<String>,
}

/// Reads the list of URLs: one per line, surrounding whitespace removed,
/// blank lines skipped.
pub fn read_source_list(path: &Path) -> ReconResult<Vec<String>> {
    let contents = fs::read_to_string(path).context(ReadingSourceListSnafu {
        path: path.display().to_string(),
    })?;
    Ok(contents
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect())
}

pub fn build_client() -> ReconResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .context(HttpClientSnafu)
}

/// Downloads one URL and parses the body as JSON.
pub fn fetch_json(client: &Client, url: &str) -> ReconResult<JSValue> {
    let parsed = Url::parse(url).context(InvalidUrlSnafu { url })?;
    let response = client
        .get(parsed)
        .send()
        .context(FetchingSnafu { url })?;
    let status = response.status();
    if !status.is_success() {
        return HttpStatusSnafu {
            status: status.as_u16(),
            url,
        }
        .fail();
    }
    let body = response.text().context(FetchingSnafu { url })?;
    debug!("fetch_json: {} bytes from {}", body.len(), url);
    serde_json::from_str(&body).context(InvalidJsonSnafu { url })
}

/// Downloads every URL in turn and saves each document in `data_dir`.
///
/// A URL that fails is logged and skipped; the others are still retrieved.
/// Only the creation of the directory and of the HTTP client are fatal.
pub fn retrieve_all(urls: &[String], data_dir: &Path) -> ReconResult<RetrievalSummary> {
    fs::create_dir_all(data_dir).context(CreatingDataDirSnafu {
        path: data_dir.display().to_string(),
    })?;
    let client = build_client()?;

    let mut summary = RetrievalSummary::default();
    for (idx, url) in urls.iter().enumerate() {
        info!("Fetching data from {}", url);
        let path = data_dir.join(output_file_name(url, idx + 1));
        let saved = fetch_json(&client, url).and_then(|js| io_json::write_pretty_json(&path, &js));
        match saved {
            Ok(()) => {
                info!("Saved {}", path.display());
                summary.saved.push(path);
            }
            Err(e) => {
                error!("{}", e);
                summary.failed.push(url.clone());
            }
        }
    }
    Ok(summary)
}

/// Reads the source list and retrieves all the documents it names.
pub fn run_retrieval(sources: &Path, data_dir: &Path) -> ReconResult<RetrievalSummary> {
    let urls = read_source_list(sources)?;
    if urls.is_empty() {
        warn!("No URL found in {}", sources.display());
        return Ok(RetrievalSummary::default());
    }
    info!("Found {} URLs in {}", urls.len(), sources.display());
    let summary = retrieve_all(&urls, data_dir)?;
    info!(
        "Retrieved {} of {} documents",
        summary.saved.len(),
        urls.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn source_list_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list_source.txt");
        fs::write(&path, "  https://a.org/x.json \n\n\t\nhttps://b.org/y\n").unwrap();
        assert_eq!(
            read_source_list(&path).unwrap(),
            vec!["https://a.org/x.json", "https://b.org/y"]
        );

        let err = read_source_list(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ReconError::ReadingSourceList { .. }));
    }

    #[test]
    fn failures_do_not_stop_retrieval() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/results/foo.json");
            then.status(200)
                .json_body(json!({"result_province": [], "name": "ลำปาง"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/results/broken.json");
            then.status(500);
        });
        server.mock(|when, then| {
            when.method(GET).path("/results/garbage.json");
            then.status(200).body("<html>not json</html>");
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/latest");
            then.status(200).json_body(json!([1, 2, 3]));
        });

        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let urls = vec![
            server.url("/results/foo.json"),
            server.url("/results/broken.json"),
            server.url("/results/garbage.json"),
            server.url("/api/latest"),
        ];
        let summary = retrieve_all(&urls, &data_dir).unwrap();

        assert_eq!(
            summary.saved,
            vec![data_dir.join("foo.json"), data_dir.join("data_4.json")]
        );
        assert_eq!(summary.failed, vec![urls[1].clone(), urls[2].clone()]);
        assert!(!data_dir.join("broken.json").exists());
        assert!(!data_dir.join("garbage.json").exists());

        let foo = fs::read_to_string(data_dir.join("foo.json")).unwrap();
        assert!(foo.contains("ลำปาง"));
        let latest: JSValue =
            serde_json::from_str(&fs::read_to_string(data_dir.join("data_4.json")).unwrap())
                .unwrap();
        assert_eq!(latest, json!([1, 2, 3]));
    }

    #[test]
    fn fetch_errors_are_typed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.json");
            then.status(404);
        });
        let client = build_client().unwrap();
        let err = fetch_json(&client, &server.url("/missing.json")).unwrap_err();
        assert!(matches!(err, ReconError::HttpStatus { status: 404, .. }));

        let err = fetch_json(&client, "not a url").unwrap_err();
        assert!(matches!(err, ReconError::InvalidUrl { .. }));
    }

    #[test]
    fn empty_source_list_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sources = dir.path().join("list_source.txt");
        fs::write(&sources, "\n \n").unwrap();
        let summary = run_retrieval(&sources, &dir.path().join("data")).unwrap();
        assert_eq!(summary, RetrievalSummary::default());
    }
}
