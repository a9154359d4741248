//! Entry point of a quotation: validate, resolve, aggregate, select.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use tracing::{info, warn};

use super::entities::CalculationRequest;
use super::evaluation::{aggregate, select_best, AgentCostBreakdown, CostContext, Selection};
use super::route::{resolve_options, route_anomalies, RouteQuery};
use super::snapshot::RateSnapshot;
use super::warning::{push_unique, CalculationWarning};
use crate::util::dates::{self, iso_date};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("invalid request: {field} {reason}")]
    InvalidRequest { field: &'static str, reason: String },
}

impl CalculationError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }
}

/// Outcome of one calculation. An empty `breakdowns` list means no route is available.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(with = "iso_date")]
    pub reference_date: Date,
    /// Every option, cheapest first.
    pub breakdowns: Vec<AgentCostBreakdown>,
    pub best: Option<AgentCostBreakdown>,
    pub warnings: Vec<CalculationWarning>,
}

impl CalculationResult {
    pub fn is_route_available(&self) -> bool {
        !self.breakdowns.is_empty()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Rejects requests the calculator cannot price at all.
pub fn validate_request(request: &CalculationRequest) -> Result<(), CalculationError> {
    let required = [
        ("origin", &request.origin),
        ("destination", &request.destination),
        ("final_destination", &request.final_destination),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(CalculationError::invalid(field, "is required"));
        }
    }

    if !request.weight.is_finite() || request.weight <= 0.0 {
        return Err(CalculationError::invalid(
            "weight",
            format!("must be a positive number, got {}", request.weight),
        ));
    }

    for cost in &request.other_costs {
        if cost.label.trim().is_empty() {
            return Err(CalculationError::invalid("other_costs", "label is required"));
        }
        if !cost.amount.is_finite() {
            return Err(CalculationError::invalid(
                "other_costs",
                format!("amount of `{}` must be a finite number", cost.label),
            ));
        }
    }

    Ok(())
}

/// Prices a request against a snapshot. Reads the clock once, and only when the request
/// carries no reference date.
pub fn calculate(
    request: &CalculationRequest,
    snapshot: &RateSnapshot,
) -> Result<CalculationResult, CalculationError> {
    let today = request.reference_date.unwrap_or_else(dates::today);
    calculate_at(request, snapshot, today)
}

/// Same as [`calculate`] with "today" supplied by the caller.
pub fn calculate_at(
    request: &CalculationRequest,
    snapshot: &RateSnapshot,
    today: Date,
) -> Result<CalculationResult, CalculationError> {
    validate_request(request)?;
    let reference_date = request.reference_date.unwrap_or(today);

    let query = RouteQuery::from_request(request, reference_date);
    let mut warnings = route_anomalies(&query, snapshot);
    for warning in &warnings {
        warn!(%warning, "ignoring record with inverted validity window");
    }

    let ctx = CostContext::from_request(request, snapshot, reference_date);
    let breakdowns: Vec<AgentCostBreakdown> = resolve_options(&query, snapshot)
        .iter()
        .map(|option| aggregate(option, &ctx))
        .collect();

    if breakdowns.is_empty() {
        push_unique(
            &mut warnings,
            CalculationWarning::NoRouteAvailable {
                destination: request.destination.clone(),
                final_destination: request.final_destination.clone(),
            },
        );
    }
    for warning in breakdowns.iter().flat_map(|b| b.warnings.iter()) {
        push_unique(&mut warnings, warning.clone());
    }

    let Selection { ranked, cheapest } = select_best(breakdowns);

    info!(
        origin = %request.origin,
        destination = %request.destination,
        final_destination = %request.final_destination,
        reference_date = %dates::format_date(reference_date),
        options = ranked.len(),
        best_total = cheapest.as_ref().map(|b| b.total),
        warnings = warnings.len(),
        "calculated quotation"
    );

    Ok(CalculationResult {
        reference_date,
        breakdowns: ranked,
        best: cheapest,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CostCategory, RateTable};
    use crate::domain::fixtures::*;
    use assert_matches::assert_matches;
    use time::macros::date;

    fn snapshot() -> RateSnapshot {
        RateSnapshot {
            sea_freights: vec![sea("s1", "BUSAN", "QINGDAO", 400.0, Some(0.0))],
            dthc: vec![
                dthc("d1", "A", "BUSAN", "QINGDAO", None, 60.0),
                dthc("d2", "B", "BUSAN", "QINGDAO", None, 40.0),
            ],
            combined_freights: vec![
                combined("c1", "A", "QINGDAO", "OSH", 300.0),
                combined("c2", "B", "QINGDAO", "OSH", 280.0),
            ],
            rail_agents: vec!["A".into(), "B".into()],
            ..Default::default()
        }
    }

    #[test]
    fn rejects_missing_route_fields() {
        let request = CalculationRequest::new(" ", "QINGDAO", "OSH", 100.0);
        assert_matches!(
            calculate_at(&request, &snapshot(), REFERENCE),
            Err(CalculationError::InvalidRequest { field: "origin", .. })
        );

        let request = CalculationRequest::new("BUSAN", "QINGDAO", "", 100.0);
        assert_matches!(
            validate_request(&request),
            Err(CalculationError::InvalidRequest { field: "final_destination", .. })
        );
    }

    #[test]
    fn rejects_non_positive_or_nan_weight() {
        for weight in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let request = CalculationRequest::new("BUSAN", "QINGDAO", "OSH", weight);
            assert_matches!(
                validate_request(&request),
                Err(CalculationError::InvalidRequest { field: "weight", .. })
            );
        }
    }

    #[test]
    fn rejects_unusable_other_costs() {
        let request =
            CalculationRequest::new("BUSAN", "QINGDAO", "OSH", 100.0).with_other_cost("Customs", f64::NAN);
        assert_matches!(
            validate_request(&request),
            Err(CalculationError::InvalidRequest { field: "other_costs", .. })
        );
    }

    #[test]
    fn picks_cheapest_and_keeps_the_rest() {
        let request = CalculationRequest::new("BUSAN", "QINGDAO", "OSH", 5000.0).on(REFERENCE);
        let result = calculate_at(&request, &snapshot(), date!(2030 - 01 - 01)).unwrap();

        assert_eq!(result.reference_date, REFERENCE);
        assert_eq!(result.breakdowns.len(), 2);
        let best = result.best.as_ref().unwrap();
        assert_eq!(best.agent, "B");
        assert_eq!(best.total, 400.0 + 40.0 + 280.0);
        assert_eq!(&result.breakdowns[0], best);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn missing_reference_date_uses_supplied_today() {
        let request = CalculationRequest::new("BUSAN", "QINGDAO", "OSH", 5000.0);
        let result = calculate_at(&request, &snapshot(), date!(2024 - 06 - 01)).unwrap();
        assert_eq!(result.reference_date, date!(2024 - 06 - 01));
        assert!(!result.is_route_available());
        assert!(result.best.is_none());
    }

    #[test]
    fn no_route_is_a_warning_not_an_error() {
        let request = CalculationRequest::new("BUSAN", "QINGDAO", "BISHKEK", 5000.0).on(REFERENCE);
        let result = calculate_at(&request, &snapshot(), REFERENCE).unwrap();
        assert!(result.breakdowns.is_empty());
        assert_eq!(
            result.warning_messages(),
            vec!["no route available from QINGDAO to BISHKEK".to_string()]
        );
    }

    #[test]
    fn warnings_are_merged_without_duplicates() {
        let mut snapshot = snapshot();
        snapshot.dthc.clear();
        let mut broken = dp("dp-bad", "BUSAN", 30.0);
        broken.valid_from = date!(2025 - 12 - 31);
        broken.valid_to = date!(2025 - 01 - 01);
        snapshot.dp_costs = vec![broken];
        let request = CalculationRequest::new("BUSAN", "QINGDAO", "OSH", 5000.0)
            .on(REFERENCE)
            .with_dp(true);

        let result = calculate_at(&request, &snapshot, REFERENCE).unwrap();
        assert_eq!(
            result.warnings[0],
            CalculationWarning::InvertedValidity {
                table: RateTable::DpCost,
                record_id: "dp-bad".to_string(),
            }
        );
        let stale: Vec<_> = result.warnings.iter().filter(|w| w.is_stale()).collect();
        // DTHC and DP for each of the two agents.
        assert_eq!(stale.len(), 4);
        assert!(result.breakdowns.iter().all(|b| b.expired));
        assert!(result
            .breakdowns
            .iter()
            .all(|b| b.contribution_of(&CostCategory::DpCost) == 0.0));
    }

    #[test]
    fn identical_inputs_give_identical_results() {
        let request = CalculationRequest::new("BUSAN", "QINGDAO", "OSH", 5000.0)
            .on(REFERENCE)
            .with_other_cost("Customs", 12.5);
        let snapshot = snapshot();
        let first = calculate(&request, &snapshot).unwrap();
        let second = calculate(&request, &snapshot).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
