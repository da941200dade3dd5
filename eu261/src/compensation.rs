use crate::types::FlightRecord;
use serde_json::Value;

/// Medium-haul assumption used when the flight APIs omit the distance.
pub const DEFAULT_DISTANCE_KM: u32 = 2000;

/// EU261 Article 7 compensation bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompensationTier {
    Short,
    Medium,
    Long,
}

impl CompensationTier {
    pub const fn amount_eur(self) -> u32 {
        match self {
            CompensationTier::Short => 250,
            CompensationTier::Medium => 400,
            CompensationTier::Long => 600,
        }
    }

    pub fn for_distance(distance_km: u32) -> Self {
        match distance_km {
            0..=1500 => CompensationTier::Short,
            1501..=3500 => CompensationTier::Medium,
            _ => CompensationTier::Long,
        }
    }

    /// Bands by delay duration alone. `None` below the 3 hour threshold.
    pub fn for_delay_only(delay_minutes: u32) -> Option<Self> {
        match delay_minutes {
            0..=179 => None,
            180..=239 => Some(CompensationTier::Short),
            240..=359 => Some(CompensationTier::Medium),
            _ => Some(CompensationTier::Long),
        }
    }
}

pub fn compensation_for_distance(distance_km: u32) -> u32 {
    CompensationTier::for_distance(distance_km).amount_eur()
}

/// Compensation for a flight the classifier already found eligible.
///
/// Always returns a non-zero amount: a missing or zero distance falls back to
/// [`DEFAULT_DISTANCE_KM`].
pub fn calculate_compensation_amount(flight: &FlightRecord) -> u32 {
    let distance_km = flight
        .distance_km
        .filter(|km| *km > 0)
        .unwrap_or(DEFAULT_DISTANCE_KM);
    compensation_for_distance(distance_km)
}

/// Last-resort heuristic for callers that only know the delay and choose
/// not to apply the default distance. Never used by the classifier.
pub fn estimate_compensation_from_delay_only(delay_minutes: u32) -> u32 {
    CompensationTier::for_delay_only(delay_minutes)
        .map(CompensationTier::amount_eur)
        .unwrap_or(0)
}

/// Compensation for a raw flight payload. A payload that cannot be read as a
/// flight yields the medium-haul amount.
pub fn calculate_compensation_for_value(flight: &Value) -> u32 {
    match FlightRecord::from_value(flight) {
        Ok(record) => calculate_compensation_amount(&record),
        Err(err) => {
            tracing::error!(error = %err, "could not compute compensation, using medium-haul amount");
            CompensationTier::Medium.amount_eur()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flight_with_distance(distance_km: Option<u32>) -> FlightRecord {
        FlightRecord {
            distance_km,
            ..Default::default()
        }
    }

    #[test]
    fn test_distance_tier_boundaries() {
        assert_eq!(compensation_for_distance(1), 250);
        assert_eq!(compensation_for_distance(1500), 250);
        assert_eq!(compensation_for_distance(1501), 400);
        assert_eq!(compensation_for_distance(3500), 400);
        assert_eq!(compensation_for_distance(3501), 600);
        assert_eq!(compensation_for_distance(12_000), 600);
    }

    #[test]
    fn test_default_distance() {
        assert_eq!(calculate_compensation_amount(&flight_with_distance(None)), 400);
        assert_eq!(
            calculate_compensation_amount(&flight_with_distance(Some(0))),
            400
        );
        assert_eq!(
            calculate_compensation_amount(&flight_with_distance(Some(1450))),
            250
        );
        assert_eq!(
            calculate_compensation_amount(&flight_with_distance(Some(7000))),
            600
        );
    }

    #[test]
    fn test_delay_only_estimate() {
        assert_eq!(estimate_compensation_from_delay_only(0), 0);
        assert_eq!(estimate_compensation_from_delay_only(179), 0);
        assert_eq!(estimate_compensation_from_delay_only(180), 250);
        assert_eq!(estimate_compensation_from_delay_only(239), 250);
        assert_eq!(estimate_compensation_from_delay_only(240), 400);
        assert_eq!(estimate_compensation_from_delay_only(359), 400);
        assert_eq!(estimate_compensation_from_delay_only(360), 600);
    }

    #[test]
    fn test_distance_is_authoritative() {
        // A long delay on a short flight is still the short-haul amount
        let flight = FlightRecord {
            delay_minutes: 400,
            distance_km: Some(900),
            ..Default::default()
        };
        assert_eq!(calculate_compensation_amount(&flight), 250);
    }

    #[test]
    fn test_compensation_for_value() {
        assert_eq!(
            calculate_compensation_for_value(&json!({"distanceKm": 4000})),
            600
        );
        assert_eq!(
            calculate_compensation_for_value(&json!({"distance": 1200.4})),
            250
        );
        assert_eq!(calculate_compensation_for_value(&json!({})), 400);
        assert_eq!(calculate_compensation_for_value(&json!("LO135")), 400);
    }
}
