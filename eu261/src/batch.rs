//! Batch operations over lists of raw flight payloads.
//!
//! A malformed record never aborts a batch: it is annotated as not eligible,
//! counted, and skipped by the queries.

use crate::eligibility::EligibilityClassifier;
use crate::metrics_defs::{BATCH_SIZE, FLIGHT_RECORD_MALFORMED};
use crate::types::{EligibilityReason, EligibilityResult, FlightRecord, FlightStatus};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{counter, histogram};

fn default_lookback_hours() -> u32 {
    72
}

fn default_max_results() -> usize {
    50
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EligibleFlightQuery {
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,
    #[serde(default)]
    pub airline_filter: Option<String>,
    /// 0 means unlimited.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for EligibleFlightQuery {
    fn default() -> Self {
        EligibleFlightQuery {
            lookback_hours: default_lookback_hours(),
            airline_filter: None,
            max_results: default_max_results(),
        }
    }
}

impl EligibleFlightQuery {
    fn matches_airline(&self, flight: &FlightRecord) -> bool {
        let Some(filter) = self.airline_filter.as_deref().filter(|f| !f.is_empty()) else {
            return true;
        };
        let filter = filter.to_lowercase();

        let name_matches = flight
            .airline
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(&filter));
        let code_matches = flight
            .airline
            .iata_code
            .as_deref()
            .is_some_and(|code| code.to_lowercase() == filter);

        name_matches || code_matches
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub eligible: usize,
    pub cancelled: usize,
    pub diverted: usize,
    pub delayed: usize,
    pub malformed: usize,
    pub total_compensation_eur: u64,
}

/// Outcome of looking up one flight by number.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlightCheck {
    pub flight_number: String,
    pub matched_flights: usize,
    pub eligible: bool,
    /// `None` when no stored flight matched.
    pub reason: Option<EligibilityReason>,
    pub compensation_amount_eur: u32,
    /// First matching flight, annotated.
    pub flight: Option<Value>,
}

// "LH 1615" and "lh1615" name the same flight.
fn canonical_flight_number(number: &str) -> String {
    number
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

fn departs_on(flight: &FlightRecord, date: NaiveDate) -> bool {
    flight
        .departure
        .scheduled_time_utc
        .or(flight.arrival.scheduled_time_utc)
        .is_some_and(|time| time.date_naive() == date)
}

fn with_result(flight: &Value, result: &EligibilityResult) -> Value {
    let mut annotated = flight.clone();
    if let Value::Object(fields) = &mut annotated {
        fields.insert(
            "eligible_for_compensation".into(),
            Value::Bool(result.is_eligible),
        );
        fields.insert(
            "compensation_amount_eur".into(),
            Value::from(result.compensation_amount_eur),
        );
        fields.insert(
            "eligibility_reason".into(),
            Value::from(result.reason.as_str()),
        );
    }
    annotated
}

impl EligibilityClassifier {
    /// Copy of `flight` with the eligibility fields added. Values that are
    /// not JSON objects are returned unchanged.
    pub fn annotate(&self, flight: &Value) -> Value {
        with_result(flight, &self.classify_value(flight))
    }

    pub fn annotate_all(&self, flights: &[Value]) -> Vec<Value> {
        histogram!(BATCH_SIZE).record(flights.len() as f64);
        flights.iter().map(|flight| self.annotate(flight)).collect()
    }

    /// Eligible flights that arrived within the lookback window ending at
    /// `now`, longest delay first.
    pub fn eligible_flights(
        &self,
        flights: &[Value],
        query: &EligibleFlightQuery,
        now: DateTime<Utc>,
    ) -> Vec<Value> {
        histogram!(BATCH_SIZE).record(flights.len() as f64);
        let window_start = Duration::try_hours(i64::from(query.lookback_hours))
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut matches: Vec<(u32, Value)> = flights
            .iter()
            .filter_map(|flight| {
                let record = match FlightRecord::from_value(flight) {
                    Ok(record) => record,
                    Err(err) => {
                        counter!(FLIGHT_RECORD_MALFORMED).increment(1);
                        tracing::debug!(error = %err, "skipping malformed flight record");
                        return None;
                    }
                };

                let arrival = record.arrival_time()?;
                if arrival < window_start || arrival > now || !query.matches_airline(&record) {
                    return None;
                }

                let result = self.classify(&record);
                result
                    .is_eligible
                    .then(|| (record.delay_minutes, with_result(flight, &result)))
            })
            .collect();

        // Stable, so equal delays keep input order
        matches.sort_by(|a, b| b.0.cmp(&a.0));
        if query.max_results > 0 {
            matches.truncate(query.max_results);
        }

        tracing::debug!(
            candidates = flights.len(),
            matched = matches.len(),
            lookback_hours = query.lookback_hours,
            "eligible flight query"
        );
        matches.into_iter().map(|(_, flight)| flight).collect()
    }

    /// Looks a flight up by number, optionally on a given departure date, and
    /// classifies the first match.
    pub fn check_flight(
        &self,
        flights: &[Value],
        flight_number: &str,
        date: Option<NaiveDate>,
    ) -> FlightCheck {
        let wanted = canonical_flight_number(flight_number);

        let mut matched: Vec<(&Value, FlightRecord)> = Vec::new();
        if !wanted.is_empty() {
            for flight in flights {
                let Ok(record) = FlightRecord::from_value(flight) else {
                    counter!(FLIGHT_RECORD_MALFORMED).increment(1);
                    continue;
                };
                if canonical_flight_number(&record.flight_number) != wanted {
                    continue;
                }
                if date.is_some_and(|date| !departs_on(&record, date)) {
                    continue;
                }
                matched.push((flight, record));
            }
        }

        tracing::debug!(
            flight_number,
            ?date,
            matched = matched.len(),
            "flight check"
        );

        let Some((flight, record)) = matched.first() else {
            return FlightCheck {
                flight_number: flight_number.to_string(),
                matched_flights: 0,
                eligible: false,
                reason: None,
                compensation_amount_eur: 0,
                flight: None,
            };
        };

        let result = self.classify(record);
        FlightCheck {
            flight_number: flight_number.to_string(),
            matched_flights: matched.len(),
            eligible: result.is_eligible,
            reason: Some(result.reason),
            compensation_amount_eur: result.compensation_amount_eur,
            flight: Some(with_result(flight, &result)),
        }
    }

    pub fn summarize(&self, flights: &[Value]) -> BatchSummary {
        histogram!(BATCH_SIZE).record(flights.len() as f64);
        let mut summary = BatchSummary {
            total: flights.len(),
            ..Default::default()
        };

        for flight in flights {
            let record = match FlightRecord::from_value(flight) {
                Ok(record) => record,
                Err(err) => {
                    counter!(FLIGHT_RECORD_MALFORMED).increment(1);
                    tracing::debug!(error = %err, "counting malformed flight record");
                    summary.malformed += 1;
                    continue;
                }
            };

            match record.status {
                FlightStatus::Cancelled => summary.cancelled += 1,
                FlightStatus::Diverted => summary.diverted += 1,
                FlightStatus::Delayed => summary.delayed += 1,
                _ => {}
            }

            let result = self.classify(&record);
            if result.is_eligible {
                summary.eligible += 1;
                summary.total_compensation_eur += u64::from(result.compensation_amount_eur);
            }
        }

        summary
    }
}
