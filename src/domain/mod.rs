//! Freight cost calculation lives here: rate records, route resolution, aggregation.

pub mod audit;
pub mod calculator;
pub mod entities;
pub mod evaluation;
pub mod route;
pub mod snapshot;
pub mod validity;
pub mod warning;

#[cfg(test)]
pub(crate) mod fixtures;

pub use audit::{audit_snapshot, ValidityEntry, ValidityReport};
pub use calculator::{calculate, calculate_at, validate_request, CalculationError, CalculationResult};
pub use entities::{
    same_key, AgentName, AgentSeaFreight, BorderDestinationFreight, CalculationRequest,
    CombinedFreight, CostCategory, DpCost, Dthc, OtherCost, PortBorderFreight, RateId, RateRecord,
    RateTable, SeaFreight, UnknownCategory, WeightSurchargeRule,
};
pub use evaluation::{
    aggregate, compare_breakdowns, select_best, AgentCostBreakdown, ComponentStatus,
    CostComponent, CostContext, Selection,
};
pub use route::{resolve_options, route_anomalies, InlandLeg, RouteOption, RouteQuery, SeaLeg};
pub use snapshot::RateSnapshot;
pub use validity::{is_valid_on_date, Validity, ValidityStatus};
pub use warning::CalculationWarning;
