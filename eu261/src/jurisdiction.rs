//! EU261 jurisdiction lookup.
//!
//! Answers whether an airport or an operating carrier falls under EU261. The
//! reference dataset is loaded lazily on first use and both answers are
//! memoized for the lifetime of the service. Codes are used exactly as given:
//! callers are responsible for normalizing case.

use crate::metrics_defs::{JURISDICTION_CACHE_HIT, JURISDICTION_CACHE_MISS};
use crate::reference_data::{ReferenceData, ReferenceDataProvider, load_or_initialize};
use moka::sync::Cache;
use shared::counter;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

const CACHE_SIZE: u64 = 10_000;

pub const EU_CARRIERS: &[(&str, &str)] = &[
    ("LH", "Lufthansa"),
    ("AF", "Air France"),
    ("BA", "British Airways"),
    ("KL", "KLM"),
    ("IB", "Iberia"),
    ("LO", "LOT Polish Airlines"),
    ("LX", "SWISS"),
    ("OS", "Austrian Airlines"),
    ("SK", "SAS"),
    ("AZ", "Alitalia"),
    ("TP", "TAP Air Portugal"),
    ("BT", "airBaltic"),
    ("A3", "Aegean Airlines"),
    ("FR", "Ryanair"),
    ("U2", "easyJet"),
    ("W6", "Wizz Air"),
    ("V7", "Volotea"),
];

/// Airports treated as EU when the reference dataset does not know them.
const MAJOR_EU_AIRPORTS: &[&str] = &[
    // Poland
    "WAW", "KRK", "GDN", "WRO", "POZ", "RZE", "KTW", "LUZ", "SZZ", "BZG", "LCJ", "IEG",
    // Germany
    "FRA", "MUC", "DUS", "TXL", "BER", "HAM", "STR", "CGN", "HAJ",
    // France
    "CDG", "ORY", "LYS", "MRS", "NCE", "TLS", "BVA", "NTE", "BOD",
    // Spain
    "MAD", "BCN", "PMI", "AGP", "ALC", "LPA", "TFS", "IBZ", "VLC", "BIO",
    // Italy
    "FCO", "MXP", "LIN", "VCE", "NAP", "CTA", "PSA", "BLQ", "BRI", "CAG",
    // Netherlands
    "AMS", "RTM", "EIN",
    // Belgium
    "BRU", "CRL",
    // Sweden
    "ARN", "GOT", "MMX",
    // Denmark
    "CPH", "BLL", "AAL",
    // Greece
    "ATH", "HER", "RHO", "SKG", "CFU", "JMK", "JTR",
    // Austria
    "VIE", "SZG", "INN", "GRZ",
    // Finland
    "HEL", "TMP", "OUL",
    // Ireland
    "DUB", "SNN", "ORK",
    // Portugal
    "LIS", "OPO", "FAO", "FNC",
    // Czech Republic
    "PRG", "BRQ",
    // Romania
    "OTP", "CLJ", "TSR", "IAS",
    // Hungary
    "BUD", "DEB",
    // Croatia
    "ZAG", "SPU", "DBV", "ZAD",
];

/// Ranked list served by `major_eu_airports` when the dataset has no EU
/// airports of its own.
const DEFAULT_MAJOR_AIRPORTS: &[&str] = &[
    "FRA", "CDG", "AMS", "MAD", "FCO", "MUC", "BCN", "LIS", "VIE", "WAW", "BRU", "CPH", "DUB",
    "HEL", "ATH", "PRG", "BUD", "ARN", "MXP", "ORY", "DUS", "HAM", "AGP", "PMI", "OTP", "ZAG",
    "SKG", "BLQ", "NAP", "BER",
];

pub trait EuJurisdiction: Send + Sync {
    fn is_airport_in_eu(&self, code: &str) -> bool;
    fn is_eu_carrier(&self, code: &str) -> bool;
}

pub fn eu_carrier_name(code: &str) -> Option<&'static str> {
    EU_CARRIERS
        .iter()
        .find(|(iata, _)| *iata == code)
        .map(|(_, name)| *name)
}

/// Airport flags from the reference dataset, indexed by IATA and ICAO code.
struct ReferenceIndex {
    data: ReferenceData,
    airports: HashMap<String, bool>,
}

impl ReferenceIndex {
    fn build(data: ReferenceData) -> Self {
        let mut airports = HashMap::with_capacity(data.airports.len());
        for airport in &data.airports {
            if !airport.iata.is_empty() {
                airports.insert(airport.iata.clone(), airport.is_eu);
            }
            if let Some(icao) = airport.icao.as_ref().filter(|icao| !icao.is_empty()) {
                airports.entry(icao.clone()).or_insert(airport.is_eu);
            }
        }

        ReferenceIndex { data, airports }
    }
}

/// Owned jurisdiction lookup service. Construct once and share it (behind an
/// `Arc`) with every classifier that needs it.
pub struct JurisdictionService {
    provider: Arc<dyn ReferenceDataProvider>,
    reference: OnceLock<ReferenceIndex>,
    airport_cache: Cache<String, bool>,
    carrier_cache: Cache<String, bool>,
}

impl JurisdictionService {
    pub fn new(provider: Arc<dyn ReferenceDataProvider>) -> Self {
        JurisdictionService {
            provider,
            reference: OnceLock::new(),
            airport_cache: Cache::new(CACHE_SIZE),
            carrier_cache: Cache::new(CACHE_SIZE),
        }
    }

    // Concurrent first calls block on the same initializer, so the dataset is
    // read once.
    fn reference(&self) -> &ReferenceIndex {
        self.reference
            .get_or_init(|| ReferenceIndex::build(load_or_initialize(self.provider.as_ref())))
    }

    pub fn reference_data(&self) -> &ReferenceData {
        &self.reference().data
    }

    /// EU airports from the dataset, hubs first, then by size. Falls back to
    /// a fixed list of major airports when the dataset has none.
    pub fn major_eu_airports(&self, limit: usize) -> Vec<String> {
        let mut airports: Vec<_> = self
            .reference_data()
            .airports
            .iter()
            .filter(|airport| airport.is_eu && !airport.iata.is_empty())
            .collect();

        if airports.is_empty() {
            return DEFAULT_MAJOR_AIRPORTS
                .iter()
                .take(limit)
                .map(|code| code.to_string())
                .collect();
        }

        airports.sort_by(|a, b| (b.is_hub, b.size).cmp(&(a.is_hub, a.size)));
        airports
            .into_iter()
            .take(limit)
            .map(|airport| airport.iata.clone())
            .collect()
    }

    fn memoized(cache: &Cache<String, bool>, code: &str, lookup: impl FnOnce() -> bool) -> bool {
        if let Some(hit) = cache.get(code) {
            counter!(JURISDICTION_CACHE_HIT).increment(1);
            return hit;
        }
        counter!(JURISDICTION_CACHE_MISS).increment(1);

        let result = lookup();
        cache.insert(code.to_string(), result);
        result
    }
}

impl EuJurisdiction for JurisdictionService {
    fn is_airport_in_eu(&self, code: &str) -> bool {
        if code.is_empty() {
            return false;
        }

        Self::memoized(&self.airport_cache, code, || {
            match self.reference().airports.get(code) {
                Some(is_eu) => *is_eu,
                None => MAJOR_EU_AIRPORTS.contains(&code),
            }
        })
    }

    fn is_eu_carrier(&self, code: &str) -> bool {
        if code.is_empty() {
            return false;
        }

        Self::memoized(&self.carrier_cache, code, || {
            eu_carrier_name(code).is_some()
        })
    }
}
