use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use super::validity::Validity;
use crate::util::dates::iso_date;

/// Opaque identifier of a rate record as issued by the rate store.
pub type RateId = String;

/// Name of a forwarding agent (rail agent, truck agent or sea agent).
pub type AgentName = String;

/// Compares two lookup keys (ports, agents, destinations, carriers).
/// Keys are typed by hand in the admin screens, so surrounding blanks and case are ignored.
pub fn same_key(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// The rate tables a snapshot is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateTable {
    SeaFreight,
    AgentSeaFreight,
    Dthc,
    CombinedFreight,
    PortBorderFreight,
    BorderDestinationFreight,
    WeightSurcharge,
    DpCost,
}

impl RateTable {
    /// Key of the table in a snapshot export.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::SeaFreight => "sea_freights",
            Self::AgentSeaFreight => "agent_sea_freights",
            Self::Dthc => "dthc",
            Self::CombinedFreight => "combined_freights",
            Self::PortBorderFreight => "port_border_freights",
            Self::BorderDestinationFreight => "border_destination_freights",
            Self::WeightSurcharge => "weight_surcharges",
            Self::DpCost => "dp_costs",
        }
    }
}

impl fmt::Display for RateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Common view over every dated rate record.
pub trait RateRecord {
    fn table(&self) -> RateTable;
    fn id(&self) -> &str;
    fn version(&self) -> u32;
    fn validity(&self) -> Validity;

    fn is_active_on(&self, reference: Date) -> bool {
        self.validity().contains(reference)
    }
}

macro_rules! rate_record {
    ($record:ty, $table:expr) => {
        impl RateRecord for $record {
            fn table(&self) -> RateTable {
                $table
            }

            fn id(&self) -> &str {
                &self.id
            }

            fn version(&self) -> u32 {
                self.version
            }

            fn validity(&self) -> Validity {
                Validity::new(self.valid_from, self.valid_to)
            }
        }
    };
}

/// Generic port-to-port ocean rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeaFreight {
    pub id: RateId,
    pub version: u32,
    pub origin: String,
    pub destination: String,
    pub carrier: String,
    pub rate: f64,
    /// `None` when no local charge was entered, which is not the same as an entered zero.
    pub local_charge: Option<f64>,
    #[serde(with = "iso_date")]
    pub valid_from: Date,
    #[serde(with = "iso_date")]
    pub valid_to: Date,
}

/// Ocean rate negotiated by one agent, optionally bundled with an L.LOCAL charge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSeaFreight {
    pub id: RateId,
    pub version: u32,
    pub agent: AgentName,
    pub origin: String,
    pub destination: String,
    pub carrier: String,
    pub rate: f64,
    pub local_charge: Option<f64>,
    #[serde(with = "iso_date")]
    pub valid_from: Date,
    #[serde(with = "iso_date")]
    pub valid_to: Date,
}

/// Destination terminal handling charge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dthc {
    pub id: RateId,
    pub version: u32,
    pub agent: AgentName,
    pub origin: String,
    pub destination: String,
    /// `None` applies to every carrier.
    pub carrier: Option<String>,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub valid_from: Date,
    #[serde(with = "iso_date")]
    pub valid_to: Date,
}

/// All-in rail+truck price from the destination port to the final destination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinedFreight {
    pub id: RateId,
    pub version: u32,
    pub agent: AgentName,
    pub destination_port: String,
    pub final_destination: String,
    pub rate: f64,
    #[serde(with = "iso_date")]
    pub valid_from: Date,
    #[serde(with = "iso_date")]
    pub valid_to: Date,
}

/// Rail leg from the destination port to the border crossing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortBorderFreight {
    pub id: RateId,
    pub version: u32,
    pub agent: AgentName,
    pub destination_port: String,
    pub rate: f64,
    #[serde(with = "iso_date")]
    pub valid_from: Date,
    #[serde(with = "iso_date")]
    pub valid_to: Date,
}

/// Truck leg from the border crossing to the final destination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BorderDestinationFreight {
    pub id: RateId,
    pub version: u32,
    pub agent: AgentName,
    pub final_destination: String,
    pub rate: f64,
    #[serde(with = "iso_date")]
    pub valid_from: Date,
    #[serde(with = "iso_date")]
    pub valid_to: Date,
}

/// Extra charge for shipments whose weight falls in `[min_weight, max_weight]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightSurchargeRule {
    pub id: RateId,
    pub version: u32,
    pub agent: AgentName,
    pub min_weight: f64,
    pub max_weight: f64,
    pub surcharge: f64,
    #[serde(with = "iso_date")]
    pub valid_from: Date,
    #[serde(with = "iso_date")]
    pub valid_to: Date,
}

impl WeightSurchargeRule {
    pub fn covers(&self, weight: f64) -> bool {
        self.min_weight <= weight && weight <= self.max_weight
    }
}

/// Fixed delivery-point cost of an origin port.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DpCost {
    pub id: RateId,
    pub version: u32,
    pub port: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub valid_from: Date,
    #[serde(with = "iso_date")]
    pub valid_to: Date,
}

rate_record!(SeaFreight, RateTable::SeaFreight);
rate_record!(AgentSeaFreight, RateTable::AgentSeaFreight);
rate_record!(Dthc, RateTable::Dthc);
rate_record!(CombinedFreight, RateTable::CombinedFreight);
rate_record!(PortBorderFreight, RateTable::PortBorderFreight);
rate_record!(BorderDestinationFreight, RateTable::BorderDestinationFreight);
rate_record!(WeightSurchargeRule, RateTable::WeightSurcharge);
rate_record!(DpCost, RateTable::DpCost);

/// Ad-hoc cost typed in by the user for one quotation. Not date-gated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtherCost {
    pub label: String,
    pub amount: f64,
}

/// Cost categories of a breakdown; also the unit of exclusion.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    SeaFreight,
    LocalCharge,
    Dthc,
    CombinedFreight,
    PortBorder,
    BorderDestination,
    WeightSurcharge,
    DpCost,
    Other(String),
}

impl CostCategory {
    pub fn label(&self) -> String {
        match self {
            Self::SeaFreight => "Sea freight".to_string(),
            Self::LocalCharge => "L.LOCAL".to_string(),
            Self::Dthc => "DTHC".to_string(),
            Self::CombinedFreight => "Combined freight".to_string(),
            Self::PortBorder => "Port → border".to_string(),
            Self::BorderDestination => "Border → destination".to_string(),
            Self::WeightSurcharge => "Weight surcharge".to_string(),
            Self::DpCost => "DP".to_string(),
            Self::Other(label) => label.clone(),
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeaFreight => f.write_str("sea_freight"),
            Self::LocalCharge => f.write_str("local_charge"),
            Self::Dthc => f.write_str("dthc"),
            Self::CombinedFreight => f.write_str("combined_freight"),
            Self::PortBorder => f.write_str("port_border"),
            Self::BorderDestination => f.write_str("border_destination"),
            Self::WeightSurcharge => f.write_str("weight_surcharge"),
            Self::DpCost => f.write_str("dp_cost"),
            Self::Other(label) => write!(f, "other:{label}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cost category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for CostCategory {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Some(label) = trimmed.strip_prefix("other:") {
            let label = label.trim();
            if label.is_empty() {
                return Err(UnknownCategory(raw.to_string()));
            }
            return Ok(Self::Other(label.to_string()));
        }

        match trimmed.to_ascii_lowercase().replace('-', "_").as_str() {
            "sea_freight" => Ok(Self::SeaFreight),
            "local_charge" | "l_local" => Ok(Self::LocalCharge),
            "dthc" => Ok(Self::Dthc),
            "combined_freight" => Ok(Self::CombinedFreight),
            "port_border" => Ok(Self::PortBorder),
            "border_destination" => Ok(Self::BorderDestination),
            "weight_surcharge" => Ok(Self::WeightSurcharge),
            "dp_cost" | "dp" => Ok(Self::DpCost),
            _ => Err(UnknownCategory(raw.to_string())),
        }
    }
}

fn default_true() -> bool {
    true
}

/// One quotation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub origin: String,
    pub destination: String,
    pub final_destination: String,
    pub weight: f64,
    #[serde(default)]
    pub include_dp: bool,
    #[serde(default = "default_true")]
    pub include_other_costs: bool,
    /// Historical query date; today when absent.
    #[serde(default, with = "iso_date::option")]
    pub reference_date: Option<Date>,
    /// Restricts the sea leg to these sea-freight ids when present.
    #[serde(default)]
    pub selected_sea_freights: Option<BTreeSet<RateId>>,
    #[serde(default)]
    pub excluded_categories: BTreeSet<CostCategory>,
    #[serde(default)]
    pub other_costs: Vec<OtherCost>,
}

impl CalculationRequest {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        final_destination: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            final_destination: final_destination.into(),
            weight,
            include_dp: false,
            include_other_costs: true,
            reference_date: None,
            selected_sea_freights: None,
            excluded_categories: BTreeSet::new(),
            other_costs: Vec::new(),
        }
    }

    pub fn on(mut self, reference_date: Date) -> Self {
        self.reference_date = Some(reference_date);
        self
    }

    pub fn with_dp(mut self, include_dp: bool) -> Self {
        self.include_dp = include_dp;
        self
    }

    pub fn excluding(mut self, category: CostCategory) -> Self {
        self.excluded_categories.insert(category);
        self
    }

    pub fn with_other_cost(mut self, label: impl Into<String>, amount: f64) -> Self {
        self.other_costs.push(OtherCost {
            label: label.into(),
            amount,
        });
        self
    }

    pub fn restrict_sea_freights<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RateId>,
    {
        self.selected_sea_freights = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_excluded(&self, category: &CostCategory) -> bool {
        self.excluded_categories.contains(category)
    }
}
