//! Reference data for the jurisdiction lookup: the EU airport dataset and the
//! list of EU member states. Providers load it from a stored copy; when the
//! copy is missing a minimal default document is synthesized and persisted so
//! that classification keeps working on the hardcoded fallback lists.

use crate::metrics_defs::REFERENCE_DATA_FALLBACK;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::counter;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const EU_COUNTRIES: &[&str] = &[
    "Austria",
    "Belgium",
    "Bulgaria",
    "Croatia",
    "Cyprus",
    "Czech Republic",
    "Denmark",
    "Estonia",
    "Finland",
    "France",
    "Germany",
    "Greece",
    "Hungary",
    "Ireland",
    "Italy",
    "Latvia",
    "Lithuania",
    "Luxembourg",
    "Malta",
    "Netherlands",
    "Poland",
    "Portugal",
    "Romania",
    "Slovakia",
    "Slovenia",
    "Spain",
    "Sweden",
];

const DATASET_VERSION: &str = "1.0.0";

#[derive(thiserror::Error, Debug)]
pub enum ReferenceDataError {
    #[error("reference data file not found: {0}")]
    Missing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid reference data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_size() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirportEntry {
    #[serde(default)]
    pub iata: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub is_eu: bool,
    // Relative passenger volume, used to rank airports.
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub is_hub: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub eu_countries: Vec<String>,
    #[serde(default)]
    pub airports: Vec<AirportEntry>,
}

impl ReferenceData {
    /// Minimal document used when no stored copy exists: no airports, so
    /// lookups rely on the hardcoded lists.
    pub fn default_document() -> Self {
        ReferenceData {
            metadata: Metadata {
                version: DATASET_VERSION.into(),
                last_updated: Some(Utc::now().format("%Y-%m-%d").to_string()),
                description: Some("EU airports database".into()),
            },
            eu_countries: EU_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            airports: Vec::new(),
        }
    }
}

pub trait ReferenceDataProvider: Send + Sync {
    fn load(&self) -> Result<ReferenceData, ReferenceDataError>;
    fn store(&self, data: &ReferenceData) -> Result<(), ReferenceDataError>;
}

/// Loads the reference data, synthesizing and persisting the default document
/// when the stored copy is missing. Any other failure falls back to the
/// in-memory default. Never fails.
pub fn load_or_initialize(provider: &dyn ReferenceDataProvider) -> ReferenceData {
    match provider.load() {
        Ok(data) => {
            tracing::debug!(
                airports = data.airports.len(),
                version = %data.metadata.version,
                "loaded EU reference data"
            );
            data
        }
        Err(ReferenceDataError::Missing(path)) => {
            tracing::warn!(path = %path.display(), "EU reference data not found, creating default dataset");
            counter!(REFERENCE_DATA_FALLBACK).increment(1);
            let data = ReferenceData::default_document();
            if let Err(err) = provider.store(&data) {
                tracing::warn!(error = %err, "could not persist default EU reference data");
            }
            data
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not load EU reference data, using built-in defaults");
            counter!(REFERENCE_DATA_FALLBACK).increment(1);
            ReferenceData::default_document()
        }
    }
}

/// Serves the built-in default document. Nothing is persisted.
pub struct BuiltinReferenceProvider;

impl ReferenceDataProvider for BuiltinReferenceProvider {
    fn load(&self) -> Result<ReferenceData, ReferenceDataError> {
        Ok(ReferenceData::default_document())
    }

    fn store(&self, _data: &ReferenceData) -> Result<(), ReferenceDataError> {
        Ok(())
    }
}

pub struct FilesystemReferenceProvider {
    path: PathBuf,
}

impl FilesystemReferenceProvider {
    pub fn new(base_dir: &str, filename: &str) -> Self {
        FilesystemReferenceProvider {
            path: Path::new(base_dir).join(filename),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceDataProvider for FilesystemReferenceProvider {
    fn load(&self) -> Result<ReferenceData, ReferenceDataError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ReferenceDataError::Missing(self.path.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        let data = serde_json::from_reader(BufReader::new(file))?;
        Ok(data)
    }

    fn store(&self, data: &ReferenceData) -> Result<(), ReferenceDataError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Create or overwrite file
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, data)?;
        writer.flush()?;

        tracing::info!(path = %self.path.display(), "stored EU reference data");
        Ok(())
    }
}
