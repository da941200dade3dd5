//! Flight payload normalization.
//!
//! AviationStack, AeroDataBox and the stored flight documents describe the same
//! flight with different field names and nesting. Every accepted shape is a
//! variant of one of the raw types below, and `FlightRecord::from_value` folds
//! them into the canonical record in a fixed precedence order. A field that is
//! present with an unexpected type is treated as absent.

use crate::types::{Airline, FlightEndpoint, FlightRecord, FlightStatus};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum NormalizeError {
    #[error("flight record must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("malformed flight record: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring malformed flight field");
            Ok(None)
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// Free text such as "Frankfurt International" also shows up where codes are
// expected; only 3 (IATA) or 4 (ICAO) alphanumerics count as a code.
fn looks_like_code(text: &str) -> bool {
    (3..=4).contains(&text.len()) && text.chars().all(|c| c.is_ascii_alphanumeric())
}

// Airline designators are 2 (IATA) or 3 (ICAO) characters.
fn looks_like_airline_code(text: &str) -> bool {
    (2..=3).contains(&text.len()) && text.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Default)]
struct AirportCodes<'a> {
    iata: Option<&'a str>,
    icao: Option<&'a str>,
}

impl<'a> AirportCodes<'a> {
    fn from_code(code: &'a str) -> Self {
        match code.len() {
            4 => AirportCodes {
                iata: None,
                icao: Some(code),
            },
            _ => AirportCodes {
                iata: Some(code),
                icao: None,
            },
        }
    }

    fn or(self, other: AirportCodes<'a>) -> Self {
        AirportCodes {
            iata: self.iata.or(other.iata),
            icao: self.icao.or(other.icao),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct AirportObject {
    #[serde(rename = "iataCode", deserialize_with = "lenient")]
    iata_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    iata: Option<String>,
    #[serde(rename = "icaoCode", deserialize_with = "lenient")]
    icao_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    icao: Option<String>,
}

impl AirportObject {
    fn codes(&self) -> AirportCodes<'_> {
        AirportCodes {
            iata: non_empty(&self.iata_code).or(non_empty(&self.iata)),
            icao: non_empty(&self.icao_code).or(non_empty(&self.icao)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AirportShape {
    Code(String),
    Object(AirportObject),
}

impl AirportShape {
    /// `strict` rejects strings that do not look like a code. Used for nested
    /// `airport` fields, where AviationStack puts the airport name.
    fn codes(&self, strict: bool) -> AirportCodes<'_> {
        match self {
            AirportShape::Code(code) if code.is_empty() => AirportCodes::default(),
            AirportShape::Code(code) if strict && !looks_like_code(code) => {
                AirportCodes::default()
            }
            AirportShape::Code(code) => AirportCodes::from_code(code),
            AirportShape::Object(airport) => airport.codes(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TimeObject {
    #[serde(deserialize_with = "lenient")]
    utc: Option<String>,
    #[serde(deserialize_with = "lenient")]
    local: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeShape {
    Text(String),
    Object(TimeObject),
}

impl TimeShape {
    fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            TimeShape::Text(text) => parse_timestamp(text),
            TimeShape::Object(time) => non_empty(&time.utc)
                .and_then(parse_timestamp)
                .or_else(|| non_empty(&time.local).and_then(parse_timestamp)),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct EndpointObject {
    #[serde(deserialize_with = "lenient")]
    airport: Option<AirportShape>,
    #[serde(rename = "iataCode", deserialize_with = "lenient")]
    iata_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    iata: Option<String>,
    #[serde(rename = "icaoCode", deserialize_with = "lenient")]
    icao_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    icao: Option<String>,
    #[serde(rename = "scheduledTime", deserialize_with = "lenient")]
    scheduled_time: Option<TimeShape>,
    #[serde(deserialize_with = "lenient")]
    scheduled: Option<TimeShape>,
    #[serde(rename = "actualTime", deserialize_with = "lenient")]
    actual_time: Option<TimeShape>,
    #[serde(deserialize_with = "lenient")]
    actual: Option<TimeShape>,
    #[serde(deserialize_with = "lenient")]
    delay: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointShape {
    Code(String),
    Object(EndpointObject),
}

impl EndpointShape {
    fn codes(&self) -> AirportCodes<'_> {
        match self {
            EndpointShape::Code(code) if code.is_empty() => AirportCodes::default(),
            EndpointShape::Code(code) => AirportCodes::from_code(code),
            EndpointShape::Object(endpoint) => {
                let nested = endpoint
                    .airport
                    .as_ref()
                    .map(|airport| airport.codes(true))
                    .unwrap_or_default();
                let own = AirportCodes {
                    iata: non_empty(&endpoint.iata_code).or(non_empty(&endpoint.iata)),
                    icao: non_empty(&endpoint.icao_code).or(non_empty(&endpoint.icao)),
                };
                nested.or(own)
            }
        }
    }

    fn object(&self) -> Option<&EndpointObject> {
        match self {
            EndpointShape::Object(endpoint) => Some(endpoint),
            EndpointShape::Code(_) => None,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct AirlineObject {
    #[serde(rename = "iataCode", deserialize_with = "lenient")]
    iata_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    iata: Option<String>,
    #[serde(deserialize_with = "lenient")]
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AirlineShape {
    Code(String),
    Object(AirlineObject),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FlightNumberObject {
    #[serde(deserialize_with = "lenient")]
    iata: Option<String>,
    #[serde(deserialize_with = "lenient")]
    icao: Option<String>,
    #[serde(deserialize_with = "lenient")]
    number: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlightNumberShape {
    Text(String),
    Object(FlightNumberObject),
}

impl FlightNumberShape {
    fn value(&self) -> Option<&str> {
        match self {
            FlightNumberShape::Text(text) => Some(text.as_str()).filter(|s| !s.is_empty()),
            FlightNumberShape::Object(flight) => non_empty(&flight.iata)
                .or(non_empty(&flight.icao))
                .or(non_empty(&flight.number)),
        }
    }
}

/// Every field name any source is known to use. Distinct names map to
/// distinct fields so that a payload carrying several of them still parses.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawFlight {
    #[serde(rename = "flightNumber", deserialize_with = "lenient")]
    flight_number_camel: Option<FlightNumberShape>,
    #[serde(deserialize_with = "lenient")]
    flight_number: Option<FlightNumberShape>,
    #[serde(deserialize_with = "lenient")]
    number: Option<FlightNumberShape>,
    #[serde(deserialize_with = "lenient")]
    flight: Option<FlightNumberShape>,

    #[serde(deserialize_with = "lenient")]
    airline: Option<AirlineShape>,
    #[serde(deserialize_with = "lenient")]
    airline_iata: Option<String>,
    #[serde(deserialize_with = "lenient")]
    airline_name: Option<String>,

    #[serde(deserialize_with = "lenient")]
    departure: Option<EndpointShape>,
    #[serde(deserialize_with = "lenient")]
    departure_airport: Option<AirportShape>,
    #[serde(deserialize_with = "lenient")]
    departure_airport_iata: Option<String>,
    #[serde(deserialize_with = "lenient")]
    scheduled_departure: Option<String>,
    #[serde(deserialize_with = "lenient")]
    departure_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    actual_departure: Option<String>,

    #[serde(deserialize_with = "lenient")]
    arrival: Option<EndpointShape>,
    #[serde(deserialize_with = "lenient")]
    arrival_airport: Option<AirportShape>,
    #[serde(deserialize_with = "lenient")]
    arrival_airport_iata: Option<String>,
    #[serde(rename = "scheduledArrivalTime", deserialize_with = "lenient")]
    scheduled_arrival_camel: Option<String>,
    #[serde(deserialize_with = "lenient")]
    scheduled_arrival: Option<String>,
    #[serde(deserialize_with = "lenient")]
    arrival_date: Option<String>,
    #[serde(rename = "actualArrivalTime", deserialize_with = "lenient")]
    actual_arrival_camel: Option<String>,
    #[serde(deserialize_with = "lenient")]
    actual_arrival: Option<String>,

    #[serde(deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(deserialize_with = "lenient")]
    flight_status: Option<String>,

    #[serde(rename = "delayMinutes", deserialize_with = "lenient")]
    delay_minutes_camel: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    delay_minutes: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    delay: Option<f64>,

    #[serde(rename = "distanceKm", deserialize_with = "lenient")]
    distance_km_camel: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    distance_km: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    distance: Option<f64>,
}

fn first_timestamp<'a>(
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> Option<DateTime<Utc>> {
    candidates
        .into_iter()
        .flatten()
        .filter(|text| !text.is_empty())
        .find_map(parse_timestamp)
}

fn endpoint_time(
    endpoint: Option<&EndpointObject>,
    pick: impl Fn(&EndpointObject) -> [Option<&TimeShape>; 2],
) -> Option<DateTime<Utc>> {
    endpoint
        .map(pick)
        .into_iter()
        .flatten()
        .flatten()
        .find_map(TimeShape::parse)
}

impl RawFlight {
    fn flight_number(&self) -> String {
        [
            &self.flight_number_camel,
            &self.flight_number,
            &self.number,
            &self.flight,
        ]
        .into_iter()
        .flatten()
        .find_map(FlightNumberShape::value)
        .unwrap_or_default()
        .to_string()
    }

    fn airline(&self) -> Airline {
        let (iata_code, name) = match &self.airline {
            Some(AirlineShape::Code(text)) if looks_like_airline_code(text) => {
                (Some(text.as_str()), None)
            }
            Some(AirlineShape::Code(text)) => (None, Some(text.as_str()).filter(|s| !s.is_empty())),
            Some(AirlineShape::Object(airline)) => (
                non_empty(&airline.iata_code).or(non_empty(&airline.iata)),
                non_empty(&airline.name),
            ),
            None => (None, None),
        };

        Airline {
            iata_code: iata_code
                .or(non_empty(&self.airline_iata))
                .map(String::from),
            name: name.or(non_empty(&self.airline_name)).map(String::from),
        }
    }

    fn departure(&self) -> FlightEndpoint {
        let object = self.departure.as_ref().and_then(EndpointShape::object);
        let codes = self
            .departure
            .as_ref()
            .map(EndpointShape::codes)
            .unwrap_or_default()
            .or(self
                .departure_airport
                .as_ref()
                .map(|airport| airport.codes(false))
                .unwrap_or_default())
            .or(AirportCodes {
                iata: non_empty(&self.departure_airport_iata),
                icao: None,
            });

        FlightEndpoint {
            airport_iata: codes.iata.map(String::from),
            airport_icao: codes.icao.map(String::from),
            scheduled_time_utc: endpoint_time(object, |e| {
                [e.scheduled_time.as_ref(), e.scheduled.as_ref()]
            })
            .or_else(|| {
                first_timestamp([
                    self.scheduled_departure.as_deref(),
                    self.departure_date.as_deref(),
                ])
            }),
            actual_time_utc: endpoint_time(object, |e| [e.actual_time.as_ref(), e.actual.as_ref()])
                .or_else(|| first_timestamp([self.actual_departure.as_deref()])),
        }
    }

    fn arrival(&self) -> FlightEndpoint {
        let object = self.arrival.as_ref().and_then(EndpointShape::object);
        let codes = self
            .arrival
            .as_ref()
            .map(EndpointShape::codes)
            .unwrap_or_default()
            .or(self
                .arrival_airport
                .as_ref()
                .map(|airport| airport.codes(false))
                .unwrap_or_default())
            .or(AirportCodes {
                iata: non_empty(&self.arrival_airport_iata),
                icao: None,
            });

        FlightEndpoint {
            airport_iata: codes.iata.map(String::from),
            airport_icao: codes.icao.map(String::from),
            scheduled_time_utc: endpoint_time(object, |e| {
                [e.scheduled_time.as_ref(), e.scheduled.as_ref()]
            })
            .or_else(|| {
                first_timestamp([
                    self.scheduled_arrival_camel.as_deref(),
                    self.scheduled_arrival.as_deref(),
                    self.arrival_date.as_deref(),
                ])
            }),
            actual_time_utc: endpoint_time(object, |e| [e.actual_time.as_ref(), e.actual.as_ref()])
                .or_else(|| {
                    first_timestamp([
                        self.actual_arrival_camel.as_deref(),
                        self.actual_arrival.as_deref(),
                    ])
                }),
        }
    }

    fn status_text(&self) -> Option<&str> {
        non_empty(&self.status).or(non_empty(&self.flight_status))
    }

    /// First explicit non-negative delay wins; the arrival endpoint's own
    /// `delay` (AviationStack) comes last.
    fn explicit_delay(&self) -> Option<f64> {
        let arrival_delay = endpoint_delay(self.arrival.as_ref());

        [
            self.delay_minutes_camel,
            self.delay_minutes,
            self.delay,
            arrival_delay,
        ]
        .into_iter()
        .flatten()
        .find(|delay| valid_delay(*delay))
    }

    /// AviationStack only reports a departure delay while the flight is
    /// still in the air.
    fn departure_delay(&self) -> Option<f64> {
        endpoint_delay(self.departure.as_ref()).filter(|delay| valid_delay(*delay))
    }

    fn distance_km(&self) -> Option<u32> {
        [self.distance_km_camel, self.distance_km, self.distance]
            .into_iter()
            .flatten()
            .find(|km| km.is_finite() && *km > 0.0)
            .map(|km| km.round() as u32)
    }
}

fn endpoint_delay(endpoint: Option<&EndpointShape>) -> Option<f64> {
    endpoint
        .and_then(EndpointShape::object)
        .and_then(|endpoint| endpoint.delay)
}

fn valid_delay(delay: f64) -> bool {
    delay.is_finite() && delay >= 0.0
}

/// Minutes between scheduled and actual arrival, floored at 0.
pub fn delay_between(scheduled: DateTime<Utc>, actual: DateTime<Utc>) -> u32 {
    let minutes = (actual - scheduled).num_minutes().max(0);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M:%S%z",
];

fn parse_naive(text: &str) -> Option<DateTime<Utc>> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// Parses the timestamp formats used by the flight APIs: RFC 3339,
/// AeroDataBox's `2025-05-22 10:00Z` / `2025-05-22 12:00+02:00`, and naive
/// ISO timestamps, which are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(body) = text.strip_suffix(['Z', 'z']) {
        return parse_naive(body.trim_end());
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(text, format).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|| parse_naive(text))
}

impl FlightRecord {
    /// Builds the canonical record from any supported source payload.
    ///
    /// Fails only when the payload is not a JSON object; malformed fields
    /// inside an object are dropped.
    pub fn from_value(value: &Value) -> Result<Self, NormalizeError> {
        if !value.is_object() {
            return Err(NormalizeError::NotAnObject(json_kind(value)));
        }

        let raw = RawFlight::deserialize(value)?;
        let arrival = raw.arrival();

        let delay_minutes = match (
            raw.explicit_delay(),
            arrival.scheduled_time_utc,
            arrival.actual_time_utc,
        ) {
            (Some(delay), _, _) => delay.floor() as u32,
            (None, Some(scheduled), Some(actual)) => delay_between(scheduled, actual),
            _ => raw
                .departure_delay()
                .map(|delay| delay.floor() as u32)
                .unwrap_or(0),
        };

        let status_text = raw.status_text();

        Ok(FlightRecord {
            flight_number: raw.flight_number(),
            airline: raw.airline(),
            departure: raw.departure(),
            arrival,
            status: status_text.map(FlightStatus::from_text).unwrap_or_default(),
            status_text: status_text.map(String::from),
            delay_minutes,
            distance_km: raw.distance_km(),
        })
    }
}

impl TryFrom<&Value> for FlightRecord {
    type Error = NormalizeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        FlightRecord::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = utc(2025, 5, 22, 10, 0);
        assert_eq!(parse_timestamp("2025-05-22T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-05-22T10:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-05-22T10:00:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-05-22 10:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-05-22 12:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-05-22T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-05-22 10:00"), Some(expected));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_delay_floor() {
        let scheduled = utc(2025, 5, 22, 10, 0);
        assert_eq!(delay_between(scheduled, utc(2025, 5, 22, 13, 10)), 190);
        assert_eq!(delay_between(scheduled, utc(2025, 5, 22, 9, 15)), 0);
        assert_eq!(delay_between(scheduled, scheduled), 0);
    }

    #[test]
    fn test_canonical_shape() {
        let flight = FlightRecord::from_value(&json!({
            "flightNumber": "LO135",
            "status": "Cancelled",
            "airline": {"name": "LOT Polish Airlines", "iataCode": "LO"},
            "departure": {"iataCode": "WAW"},
            "arrival": {"iataCode": "LHR"},
            "delayMinutes": 0,
            "distanceKm": 1450
        }))
        .unwrap();

        assert_eq!(flight.flight_number, "LO135");
        assert_eq!(flight.airline.iata_code.as_deref(), Some("LO"));
        assert_eq!(flight.airline.name.as_deref(), Some("LOT Polish Airlines"));
        assert_eq!(flight.departure.airport_code(), Some("WAW"));
        assert_eq!(flight.arrival.airport_code(), Some("LHR"));
        assert_eq!(flight.status, FlightStatus::Cancelled);
        assert_eq!(flight.status_text.as_deref(), Some("Cancelled"));
        assert_eq!(flight.delay_minutes, 0);
        assert_eq!(flight.distance_km, Some(1450));
    }

    #[test]
    fn test_aviationstack_shape() {
        let flight = FlightRecord::from_value(&json!({
            "flight_status": "landed",
            "flight": {"number": "135", "iata": "LO135", "icao": "LOT135"},
            "airline": {"name": "LOT - Polish Airlines", "iata": "LO", "icao": "LOT"},
            "departure": {
                "airport": "Frederic Chopin",
                "iata": "WAW",
                "icao": "EPWA",
                "scheduled": "2025-05-22T08:00:00+00:00",
                "actual": "2025-05-22T11:05:00+00:00",
                "delay": 185
            },
            "arrival": {
                "airport": "John F Kennedy International",
                "iata": "JFK",
                "icao": "KJFK",
                "scheduled": "2025-05-22T18:00:00+00:00",
                "actual": "2025-05-22T21:20:00+00:00",
                "delay": 200
            }
        }))
        .unwrap();

        assert_eq!(flight.flight_number, "LO135");
        assert_eq!(flight.airline.iata_code.as_deref(), Some("LO"));
        // The airport name is not mistaken for a code
        assert_eq!(flight.departure.airport_iata.as_deref(), Some("WAW"));
        assert_eq!(flight.departure.airport_icao.as_deref(), Some("EPWA"));
        assert_eq!(flight.arrival.airport_iata.as_deref(), Some("JFK"));
        assert_eq!(flight.status, FlightStatus::Landed);
        // Arrival delay, not departure delay
        assert_eq!(flight.delay_minutes, 200);
        assert_eq!(
            flight.arrival.scheduled_time_utc,
            Some(utc(2025, 5, 22, 18, 0))
        );
        assert_eq!(
            flight.departure.actual_time_utc,
            Some(utc(2025, 5, 22, 11, 5))
        );
    }

    #[test]
    fn test_aerodatabox_shape() {
        let flight = FlightRecord::from_value(&json!({
            "number": "LH 1615",
            "status": "Arrived",
            "airline": {"name": "Lufthansa"},
            "departure": {
                "airport": {"icao": "EDDF", "iata": "FRA", "name": "Frankfurt-am-Main"},
                "scheduledTime": {"utc": "2025-05-22 10:00Z", "local": "2025-05-22 12:00+02:00"}
            },
            "arrival": {
                "airport": {"icao": "EPWA", "name": "Warsaw"},
                "scheduledTime": {"utc": "2025-05-22 12:00Z"},
                "actualTime": {"local": "2025-05-22 17:30+02:00"}
            }
        }))
        .unwrap();

        assert_eq!(flight.flight_number, "LH 1615");
        assert_eq!(flight.airline.iata_code, None);
        assert_eq!(flight.departure.airport_code(), Some("FRA"));
        // ICAO fallback when IATA is absent
        assert_eq!(flight.arrival.airport_iata, None);
        assert_eq!(flight.arrival.airport_code(), Some("EPWA"));
        assert_eq!(flight.status, FlightStatus::Landed);
        // Derived from actual - scheduled arrival (15:30Z - 12:00Z)
        assert_eq!(flight.delay_minutes, 210);
    }

    #[test]
    fn test_flat_storage_shape() {
        let flight = FlightRecord::from_value(&json!({
            "flight_number": "FR1234",
            "airline": "FR",
            "airline_name": "Ryanair",
            "departure_airport": "KRK",
            "arrival_airport": "EGLL",
            "arrival_date": "2025-05-22T10:00:00Z",
            "actual_arrival": "2025-05-22T09:40:00Z",
            "status": "On Time",
            "distance_km": 1450.6
        }))
        .unwrap();

        assert_eq!(flight.flight_number, "FR1234");
        assert_eq!(flight.airline.iata_code.as_deref(), Some("FR"));
        assert_eq!(flight.airline.name.as_deref(), Some("Ryanair"));
        assert_eq!(flight.departure.airport_iata.as_deref(), Some("KRK"));
        assert_eq!(flight.arrival.airport_icao.as_deref(), Some("EGLL"));
        // Early arrival is not a delay
        assert_eq!(flight.delay_minutes, 0);
        assert_eq!(flight.status, FlightStatus::Scheduled);
        assert_eq!(flight.distance_km, Some(1451));
    }

    #[test]
    fn test_explicit_delay_precedence() {
        let flight = FlightRecord::from_value(&json!({
            "delayMinutes": -5,
            "delay_minutes": 190.7,
            "delay": 30,
            "arrival": {
                "scheduled": "2025-05-22T10:00:00Z",
                "actual": "2025-05-22T10:10:00Z"
            }
        }))
        .unwrap();
        assert_eq!(flight.delay_minutes, 190);

        // Negative explicit delays fall through to the timestamps
        let flight = FlightRecord::from_value(&json!({
            "delay": -20,
            "arrival": {
                "scheduled": "2025-05-22T10:00:00Z",
                "actual": "2025-05-22T10:10:00Z"
            }
        }))
        .unwrap();
        assert_eq!(flight.delay_minutes, 10);
    }

    #[test]
    fn test_departure_delay_fallback() {
        // In-flight AviationStack record: only the departure delay is known
        let flight = FlightRecord::from_value(&json!({
            "flight_status": "active",
            "airline": {"iata": "LO"},
            "departure": {"iata": "WAW", "delay": 200},
            "arrival": {"iata": "JFK", "delay": null}
        }))
        .unwrap();
        assert_eq!(flight.delay_minutes, 200);

        // Arrival data takes precedence over the departure delay
        let flight = FlightRecord::from_value(&json!({
            "departure": {"iata": "WAW", "delay": 200},
            "arrival": {
                "iata": "JFK",
                "scheduled": "2025-05-22T18:00:00+00:00",
                "actual": "2025-05-22T18:30:00+00:00"
            }
        }))
        .unwrap();
        assert_eq!(flight.delay_minutes, 30);

        let flight = FlightRecord::from_value(&json!({
            "departure": {"iata": "WAW", "delay": -15}
        }))
        .unwrap();
        assert_eq!(flight.delay_minutes, 0);
    }

    #[test]
    fn test_null_and_wrong_types() {
        let flight = FlightRecord::from_value(&json!({
            "airline": null,
            "departure": null,
            "arrival": null,
            "status": null
        }))
        .unwrap();
        assert_eq!(flight, FlightRecord::default());

        let flight = FlightRecord::from_value(&json!({
            "airline": 42,
            "departure": 17,
            "arrival": {"iataCode": 7, "icao": "EGLL"},
            "status": {"text": "Cancelled"},
            "delayMinutes": "lots",
            "distance": -100
        }))
        .unwrap();
        assert_eq!(flight.airline, Airline::default());
        assert_eq!(flight.departure.airport_code(), None);
        assert_eq!(flight.arrival.airport_code(), Some("EGLL"));
        assert_eq!(flight.status, FlightStatus::Unknown);
        assert_eq!(flight.delay_minutes, 0);
        assert_eq!(flight.distance_km, None);
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            FlightRecord::from_value(&json!(null)),
            Err(NormalizeError::NotAnObject("null"))
        ));
        assert!(matches!(
            FlightRecord::try_from(&json!([1, 2])),
            Err(NormalizeError::NotAnObject("an array"))
        ));
    }
}
