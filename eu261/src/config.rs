use crate::batch::EligibleFlightQuery;
use crate::reference_data::{
    BuiltinReferenceProvider, FilesystemReferenceProvider, ReferenceDataProvider,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum ReferenceDataStoreType {
    Filesystem { base_dir: String, filename: String },
    Builtin,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct ReferenceDataStore {
    #[serde(flatten)]
    pub r#type: ReferenceDataStoreType,
}

impl Default for ReferenceDataStore {
    fn default() -> Self {
        ReferenceDataStore {
            r#type: ReferenceDataStoreType::Filesystem {
                base_dir: "data".into(),
                filename: "eu_airports.json".into(),
            },
        }
    }
}

impl ReferenceDataStore {
    pub fn provider(&self) -> Arc<dyn ReferenceDataProvider> {
        match &self.r#type {
            ReferenceDataStoreType::Filesystem { base_dir, filename } => {
                Arc::new(FilesystemReferenceProvider::new(base_dir, filename))
            }
            ReferenceDataStoreType::Builtin => Arc::new(BuiltinReferenceProvider),
        }
    }
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub reference_data_store: ReferenceDataStore,
    #[serde(default)]
    pub eligible_flights: EligibleFlightQuery,
}
