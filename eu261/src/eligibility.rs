use crate::compensation::calculate_compensation_amount;
use crate::jurisdiction::EuJurisdiction;
use crate::metrics_defs::{ELIGIBILITY_CHECKED, ELIGIBILITY_ELIGIBLE, FLIGHT_RECORD_MALFORMED};
use crate::types::{EligibilityReason, EligibilityResult, FlightRecord};
use serde_json::Value;
use shared::counter;
use std::sync::Arc;

/// EU261 Article 6: delays of three hours or more at arrival.
pub const DELAY_THRESHOLD_MINUTES: u32 = 180;

/// Intermediate facts the decision is derived from.
#[derive(Debug)]
struct Assessment {
    is_cancelled: bool,
    is_diverted: bool,
    is_delayed: bool,
    departs_from_eu: bool,
    arrives_in_eu: bool,
    is_eu_airline: bool,
}

impl Assessment {
    fn is_disrupted(&self) -> bool {
        self.is_cancelled || self.is_diverted || self.is_delayed
    }

    fn is_route_eligible(&self) -> bool {
        self.departs_from_eu || (self.arrives_in_eu && self.is_eu_airline)
    }

    fn is_eligible(&self) -> bool {
        self.is_disrupted() && self.is_route_eligible()
    }

    fn reason(&self) -> EligibilityReason {
        if !self.is_disrupted() {
            EligibilityReason::NotDisrupted
        } else if !self.is_route_eligible() {
            EligibilityReason::OutsideJurisdiction
        } else if self.is_cancelled {
            EligibilityReason::Cancelled
        } else if self.is_diverted {
            EligibilityReason::Diverted
        } else {
            EligibilityReason::DelayedOverThreshold
        }
    }
}

/// Decides EU261 eligibility against an injected jurisdiction table.
///
/// Classification is a total function: every input yields a result, and
/// anything that cannot be read as a flight is denied.
#[derive(Clone)]
pub struct EligibilityClassifier {
    jurisdiction: Arc<dyn EuJurisdiction>,
}

impl EligibilityClassifier {
    pub fn new(jurisdiction: Arc<dyn EuJurisdiction>) -> Self {
        EligibilityClassifier { jurisdiction }
    }

    pub fn jurisdiction(&self) -> &dyn EuJurisdiction {
        self.jurisdiction.as_ref()
    }

    fn assess(&self, flight: &FlightRecord) -> Assessment {
        let departs_from_eu = flight
            .departure
            .airport_code()
            .is_some_and(|code| self.jurisdiction.is_airport_in_eu(code));

        // Arrival only matters when departure did not already qualify
        let arrives_in_eu = !departs_from_eu
            && flight
                .arrival
                .airport_code()
                .is_some_and(|code| self.jurisdiction.is_airport_in_eu(code));

        let is_eu_airline = flight
            .airline
            .iata_code
            .as_deref()
            .filter(|code| !code.is_empty())
            .is_some_and(|code| self.jurisdiction.is_eu_carrier(code));

        Assessment {
            is_cancelled: flight.status.is_cancelled(),
            is_diverted: flight.status.is_diverted(),
            is_delayed: flight.delay_minutes >= DELAY_THRESHOLD_MINUTES,
            departs_from_eu,
            arrives_in_eu,
            is_eu_airline,
        }
    }

    pub fn is_eligible_for_eu261(&self, flight: &FlightRecord) -> bool {
        self.assess(flight).is_eligible()
    }

    pub fn classify(&self, flight: &FlightRecord) -> EligibilityResult {
        counter!(ELIGIBILITY_CHECKED).increment(1);

        let assessment = self.assess(flight);
        let reason = assessment.reason();
        tracing::debug!(
            flight_number = %flight.flight_number,
            ?assessment,
            reason = reason.as_str(),
            "classified flight"
        );

        if !assessment.is_eligible() {
            return EligibilityResult::denied(reason);
        }

        counter!(ELIGIBILITY_ELIGIBLE).increment(1);
        EligibilityResult {
            is_eligible: true,
            reason,
            compensation_amount_eur: calculate_compensation_amount(flight),
        }
    }

    /// Classifies a raw flight payload. Payloads that are not JSON objects
    /// are denied as `NOT_DISRUPTED`.
    pub fn classify_value(&self, flight: &Value) -> EligibilityResult {
        match FlightRecord::from_value(flight) {
            Ok(record) => self.classify(&record),
            Err(err) => {
                counter!(FLIGHT_RECORD_MALFORMED).increment(1);
                tracing::error!(error = %err, "could not classify flight record");
                EligibilityResult::denied(EligibilityReason::NotDisrupted)
            }
        }
    }
}
