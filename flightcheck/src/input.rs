use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("could not read flight data from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid flight data: {0}")]
    Json(#[from] serde_json::Error),
}

/// A bare list of flights, or the storage document that wraps one.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlightData {
    List(Vec<Value>),
    Document { flights: Vec<Value> },
}

pub fn load_flights(path: &Path) -> Result<Vec<Value>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let flights = match serde_json::from_reader(BufReader::new(file))? {
        FlightData::List(flights) => flights,
        FlightData::Document { flights } => flights,
    };

    tracing::info!(path = %path.display(), count = flights.len(), "loaded flight data");
    Ok(flights)
}
