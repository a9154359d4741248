use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

use super::entities::{AgentName, CostCategory, RateId, RateTable};
use crate::util::dates::{format_date, iso_date};

/// Data-quality findings that degrade a result without failing it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationWarning {
    /// A category that should have contributed had no record valid on the reference date.
    StaleRate {
        agent: AgentName,
        category: CostCategory,
        #[serde(with = "iso_date")]
        reference_date: Date,
    },
    /// The sea freight used carries no local charge at all (as opposed to an entered zero).
    LocalChargeAbsent { sea_freight_id: RateId },
    /// A record on the route has `valid_from` after `valid_to` and never applies.
    InvertedValidity { table: RateTable, record_id: RateId },
    NoRouteAvailable {
        destination: String,
        final_destination: String,
    },
}

impl CalculationWarning {
    /// True for warnings that mark a breakdown as expired.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleRate { .. })
    }
}

impl fmt::Display for CalculationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleRate {
                agent,
                category,
                reference_date,
            } => write!(
                f,
                "{agent}: no {} rate valid on {}",
                category.label(),
                format_date(*reference_date)
            ),
            Self::LocalChargeAbsent { sea_freight_id } => {
                write!(f, "sea freight {sea_freight_id} has no local charge on record")
            }
            Self::InvertedValidity { table, record_id } => write!(
                f,
                "{table} record {record_id} has valid_from after valid_to and is ignored"
            ),
            Self::NoRouteAvailable {
                destination,
                final_destination,
            } => write!(f, "no route available from {destination} to {final_destination}"),
        }
    }
}

/// Appends `warning` unless an equal one is already present.
pub(crate) fn push_unique(warnings: &mut Vec<CalculationWarning>, warning: CalculationWarning) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}
