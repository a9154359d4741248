//! Record builders for unit tests. Every record is valid for the whole of 2025.

use time::{macros::date, Date};

use super::entities::{
    AgentSeaFreight, BorderDestinationFreight, CombinedFreight, DpCost, Dthc, PortBorderFreight,
    SeaFreight, WeightSurchargeRule,
};

pub const VALID_FROM: Date = date!(2025 - 01 - 01);
pub const VALID_TO: Date = date!(2025 - 12 - 31);
pub const REFERENCE: Date = date!(2025 - 06 - 01);

pub fn sea(id: &str, origin: &str, destination: &str, rate: f64, local: Option<f64>) -> SeaFreight {
    SeaFreight {
        id: id.to_string(),
        version: 1,
        origin: origin.to_string(),
        destination: destination.to_string(),
        carrier: "COSCO".to_string(),
        rate,
        local_charge: local,
        valid_from: VALID_FROM,
        valid_to: VALID_TO,
    }
}

pub fn agent_sea(
    id: &str,
    agent: &str,
    origin: &str,
    destination: &str,
    rate: f64,
    local: Option<f64>,
) -> AgentSeaFreight {
    AgentSeaFreight {
        id: id.to_string(),
        version: 1,
        agent: agent.to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        carrier: "COSCO".to_string(),
        rate,
        local_charge: local,
        valid_from: VALID_FROM,
        valid_to: VALID_TO,
    }
}

pub fn dthc(
    id: &str,
    agent: &str,
    origin: &str,
    destination: &str,
    carrier: Option<&str>,
    amount: f64,
) -> Dthc {
    Dthc {
        id: id.to_string(),
        version: 1,
        agent: agent.to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        carrier: carrier.map(str::to_string),
        amount,
        valid_from: VALID_FROM,
        valid_to: VALID_TO,
    }
}

pub fn combined(id: &str, agent: &str, port: &str, final_destination: &str, rate: f64) -> CombinedFreight {
    CombinedFreight {
        id: id.to_string(),
        version: 1,
        agent: agent.to_string(),
        destination_port: port.to_string(),
        final_destination: final_destination.to_string(),
        rate,
        valid_from: VALID_FROM,
        valid_to: VALID_TO,
    }
}

pub fn port_border(id: &str, agent: &str, port: &str, rate: f64) -> PortBorderFreight {
    PortBorderFreight {
        id: id.to_string(),
        version: 1,
        agent: agent.to_string(),
        destination_port: port.to_string(),
        rate,
        valid_from: VALID_FROM,
        valid_to: VALID_TO,
    }
}

pub fn border_destination(
    id: &str,
    agent: &str,
    final_destination: &str,
    rate: f64,
) -> BorderDestinationFreight {
    BorderDestinationFreight {
        id: id.to_string(),
        version: 1,
        agent: agent.to_string(),
        final_destination: final_destination.to_string(),
        rate,
        valid_from: VALID_FROM,
        valid_to: VALID_TO,
    }
}

pub fn surcharge(id: &str, agent: &str, min: f64, max: f64, amount: f64) -> WeightSurchargeRule {
    WeightSurchargeRule {
        id: id.to_string(),
        version: 1,
        agent: agent.to_string(),
        min_weight: min,
        max_weight: max,
        surcharge: amount,
        valid_from: VALID_FROM,
        valid_to: VALID_TO,
    }
}

pub fn dp(id: &str, port: &str, amount: f64) -> DpCost {
    DpCost {
        id: id.to_string(),
        version: 1,
        port: port.to_string(),
        amount,
        valid_from: VALID_FROM,
        valid_to: VALID_TO,
    }
}
