//! Where RAP analyses come from.
//!
//! The production source asks a NetCDF Subset Service for the analysis at a
//! valid time; a local source reads a file that was fetched earlier.

use chrono::NaiveDateTime;
use ndarray::Array2;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::RapConfig;
use crate::data_loader::{open_netcdf, read_grid_plane, require_variable};
use crate::error::Result;
use crate::time::analysis_components;

/// An opened analysis file.
///
/// Keeps the downloaded temporary file alive for as long as the dataset is
/// open; it is removed when the dataset is dropped.
pub struct AnalysisDataset {
    file: netcdf::File,
    origin: String,
    _download: Option<NamedTempFile>,
}

impl AnalysisDataset {
    pub fn file(&self) -> &netcdf::File {
        &self.file
    }

    /// URL or path the data was read from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The analysis' own 2-D longitude and latitude
    pub fn lon_lat(&self) -> Result<(Array2<f64>, Array2<f64>)> {
        let lons = read_grid_plane(&require_variable(&self.file, "lon", &self.origin)?)?;
        let lats = read_grid_plane(&require_variable(&self.file, "lat", &self.origin)?)?;
        Ok((lons, lats))
    }
}

/// Something that can produce the RAP analysis valid at a given hour
pub trait AnalysisSource {
    fn fetch(&self, valid: NaiveDateTime) -> Result<AnalysisDataset>;
}

/// Fill the `{yyyy}`, `{mm}`, `{dd}` and `{hhmm}` placeholders of a URL template
pub fn dataset_url(template: &str, valid: NaiveDateTime) -> String {
    let (yyyy, mm, dd, hhmm) = analysis_components(valid, true);
    template
        .replace("{yyyy}", &yyyy)
        .replace("{mm}", &mm)
        .replace("{dd}", &dd)
        .replace("{hhmm}", &hhmm)
}

/// Analyses served over HTTP by a NetCDF Subset Service
pub struct RemoteRapSource {
    client: reqwest::blocking::Client,
    url_template: String,
    query: String,
}

impl RemoteRapSource {
    pub fn new(config: &RapConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()?;
        Ok(Self {
            client,
            url_template: config.url_template.clone(),
            query: config.query.clone(),
        })
    }

    /// Full request URL for a valid time
    pub fn request_url(&self, valid: NaiveDateTime) -> String {
        let url = dataset_url(&self.url_template, valid);
        if self.query.is_empty() {
            url
        } else {
            format!("{}?{}", url, self.query)
        }
    }
}

impl AnalysisSource for RemoteRapSource {
    fn fetch(&self, valid: NaiveDateTime) -> Result<AnalysisDataset> {
        let url = self.request_url(valid);
        info!(url = %url, "Requesting RAP analysis");

        let response = self.client.get(&url).send()?.error_for_status()?;
        let body = response.bytes()?;
        debug!(bytes = body.len(), "RAP analysis downloaded");

        let mut download = tempfile::Builder::new()
            .prefix("rap_")
            .suffix(".nc")
            .tempfile()?;
        download.write_all(&body)?;
        download.flush()?;

        let file = open_netcdf(download.path())?;
        Ok(AnalysisDataset {
            file,
            origin: url,
            _download: Some(download),
        })
    }
}

/// An analysis already on disk, whatever the requested time
pub struct LocalAnalysis {
    path: PathBuf,
}

impl LocalAnalysis {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnalysisSource for LocalAnalysis {
    fn fetch(&self, valid: NaiveDateTime) -> Result<AnalysisDataset> {
        debug!(path = %self.path.display(), valid = %valid, "Reading local RAP analysis");
        Ok(AnalysisDataset {
            file: open_netcdf(&self.path)?,
            origin: self.path.display().to_string(),
            _download: None,
        })
    }
}
