use chrono::{DateTime, Utc};
use serde::Serialize;

/// Flight status as reported by upstream APIs.
///
/// Upstream vocabularies differ ("Cancelled", "canceled", "Delayed - 190 minutes",
/// "Diverted", "en-route"), so the text is mapped by case-insensitive substring
/// matching rather than an exact table. Cancellation wins over diversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Scheduled,
    Active,
    Landed,
    Delayed,
    Cancelled,
    Diverted,
    #[default]
    Unknown,
}

impl FlightStatus {
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        let contains_any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if lower.contains("cancel") {
            FlightStatus::Cancelled
        } else if lower.contains("divert") {
            FlightStatus::Diverted
        } else if lower.contains("delay") {
            FlightStatus::Delayed
        } else if contains_any(&["land", "arrived"]) {
            FlightStatus::Landed
        } else if contains_any(&[
            "active", "enroute", "en route", "en-route", "airborne", "departed",
        ]) {
            FlightStatus::Active
        } else if contains_any(&["scheduled", "expected", "on time", "boarding"]) {
            FlightStatus::Scheduled
        } else {
            FlightStatus::Unknown
        }
    }

    pub fn is_cancelled(self) -> bool {
        self == FlightStatus::Cancelled
    }

    pub fn is_diverted(self) -> bool {
        self == FlightStatus::Diverted
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    pub name: Option<String>,
    pub iata_code: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightEndpoint {
    pub airport_iata: Option<String>,
    pub airport_icao: Option<String>,
    pub scheduled_time_utc: Option<DateTime<Utc>>,
    pub actual_time_utc: Option<DateTime<Utc>>,
}

impl FlightEndpoint {
    pub fn with_iata(code: &str) -> Self {
        FlightEndpoint {
            airport_iata: Some(code.to_string()),
            ..Default::default()
        }
    }

    /// IATA code if known, otherwise ICAO.
    pub fn airport_code(&self) -> Option<&str> {
        self.airport_iata
            .as_deref()
            .filter(|code| !code.is_empty())
            .or_else(|| self.airport_icao.as_deref().filter(|code| !code.is_empty()))
    }
}

/// Canonical flight record, independent of the source schema.
///
/// Built fresh from each API response or storage read and never mutated by
/// the classifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub flight_number: String,
    pub airline: Airline,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub status: FlightStatus,
    /// Status text exactly as the source reported it.
    pub status_text: Option<String>,
    pub delay_minutes: u32,
    pub distance_km: Option<u32>,
}

impl FlightRecord {
    /// Arrival time used for time-window queries: actual, else scheduled.
    pub fn arrival_time(&self) -> Option<DateTime<Utc>> {
        self.arrival
            .actual_time_utc
            .or(self.arrival.scheduled_time_utc)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityReason {
    Cancelled,
    Diverted,
    DelayedOverThreshold,
    NotDisrupted,
    OutsideJurisdiction,
}

impl EligibilityReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EligibilityReason::Cancelled => "CANCELLED",
            EligibilityReason::Diverted => "DIVERTED",
            EligibilityReason::DelayedOverThreshold => "DELAYED_OVER_THRESHOLD",
            EligibilityReason::NotDisrupted => "NOT_DISRUPTED",
            EligibilityReason::OutsideJurisdiction => "OUTSIDE_JURISDICTION",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub is_eligible: bool,
    pub reason: EligibilityReason,
    pub compensation_amount_eur: u32,
}

impl EligibilityResult {
    pub fn denied(reason: EligibilityReason) -> Self {
        EligibilityResult {
            is_eligible: false,
            reason,
            compensation_amount_eur: 0,
        }
    }
}
