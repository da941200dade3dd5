pub mod batch;
pub mod compensation;
pub mod config;
pub mod eligibility;
pub mod jurisdiction;
pub mod metrics_defs;
pub mod normalize;
pub mod reference_data;
pub mod types;

#[cfg(test)]
mod testutils;

pub use batch::{BatchSummary, EligibleFlightQuery};
pub use compensation::{
    calculate_compensation_amount, calculate_compensation_for_value,
    estimate_compensation_from_delay_only,
};
pub use eligibility::EligibilityClassifier;
pub use jurisdiction::{EuJurisdiction, JurisdictionService};
pub use types::{EligibilityReason, EligibilityResult, FlightRecord, FlightStatus};

use std::sync::Arc;

/// Jurisdiction service and classifier wired from config.
pub fn build(config: &config::Config) -> (Arc<JurisdictionService>, EligibilityClassifier) {
    let jurisdiction = Arc::new(JurisdictionService::new(
        config.reference_data_store.provider(),
    ));
    let classifier = EligibilityClassifier::new(jurisdiction.clone());
    (jurisdiction, classifier)
}
