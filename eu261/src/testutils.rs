use crate::eligibility::EligibilityClassifier;
use crate::jurisdiction::EuJurisdiction;
use crate::reference_data::{AirportEntry, FilesystemReferenceProvider, ReferenceData, ReferenceDataProvider};
use std::collections::HashSet;
use std::sync::Arc;

/// Fixed jurisdiction table for classifier tests.
pub struct FakeJurisdiction {
    airports: HashSet<&'static str>,
    carriers: HashSet<&'static str>,
}

impl FakeJurisdiction {
    pub fn new(airports: &[&'static str], carriers: &[&'static str]) -> Self {
        FakeJurisdiction {
            airports: airports.iter().copied().collect(),
            carriers: carriers.iter().copied().collect(),
        }
    }
}

impl Default for FakeJurisdiction {
    fn default() -> Self {
        FakeJurisdiction::new(&["WAW", "KRK", "FRA", "CDG", "EPWA"], &["LO", "LH", "FR"])
    }
}

impl EuJurisdiction for FakeJurisdiction {
    fn is_airport_in_eu(&self, code: &str) -> bool {
        self.airports.contains(code)
    }

    fn is_eu_carrier(&self, code: &str) -> bool {
        self.carriers.contains(code)
    }
}

pub fn test_classifier() -> EligibilityClassifier {
    EligibilityClassifier::new(Arc::new(FakeJurisdiction::default()))
}

pub fn get_mock_provider() -> (tempfile::TempDir, FilesystemReferenceProvider) {
    let mut data = ReferenceData::default_document();
    data.airports = vec![
        AirportEntry {
            iata: "WAW".into(),
            icao: Some("EPWA".into()),
            name: Some("Warsaw Chopin".into()),
            country: Some("Poland".into()),
            is_eu: true,
            size: 5,
            is_hub: true,
        },
        AirportEntry {
            iata: "JFK".into(),
            icao: Some("KJFK".into()),
            name: Some("John F Kennedy International".into()),
            country: Some("United States".into()),
            is_eu: false,
            size: 9,
            is_hub: true,
        },
    ];

    let dir = tempfile::tempdir().unwrap();
    let provider =
        FilesystemReferenceProvider::new(dir.path().to_str().unwrap(), "eu_airports.json");
    provider.store(&data).unwrap();
    (dir, provider)
}
