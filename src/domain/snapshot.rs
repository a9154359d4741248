//! Read-only views over the loaded rate tables.

use serde::{Deserialize, Serialize};

use super::entities::{
    AgentName, AgentSeaFreight, BorderDestinationFreight, CombinedFreight, DpCost, Dthc,
    PortBorderFreight, RateRecord, SeaFreight, WeightSurchargeRule,
};

/// Every rate table a calculation reads, plus the agent universe.
///
/// Snapshots are immutable inputs: the calculator only borrows them, so one snapshot can
/// serve any number of calculations at once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    #[serde(default)]
    pub sea_freights: Vec<SeaFreight>,
    #[serde(default)]
    pub agent_sea_freights: Vec<AgentSeaFreight>,
    #[serde(default)]
    pub dthc: Vec<Dthc>,
    #[serde(default)]
    pub combined_freights: Vec<CombinedFreight>,
    #[serde(default)]
    pub port_border_freights: Vec<PortBorderFreight>,
    #[serde(default)]
    pub border_destination_freights: Vec<BorderDestinationFreight>,
    #[serde(default)]
    pub weight_surcharges: Vec<WeightSurchargeRule>,
    #[serde(default)]
    pub dp_costs: Vec<DpCost>,
    #[serde(default)]
    pub rail_agents: Vec<AgentName>,
    #[serde(default)]
    pub truck_agents: Vec<AgentName>,
}

impl RateSnapshot {
    /// All dated records, table by table, in snapshot order.
    pub fn records(&self) -> impl Iterator<Item = &dyn RateRecord> + '_ {
        fn erase<T: RateRecord>(record: &T) -> &dyn RateRecord {
            record
        }

        self.sea_freights
            .iter()
            .map(erase)
            .chain(self.agent_sea_freights.iter().map(erase))
            .chain(self.dthc.iter().map(erase))
            .chain(self.combined_freights.iter().map(erase))
            .chain(self.port_border_freights.iter().map(erase))
            .chain(self.border_destination_freights.iter().map(erase))
            .chain(self.weight_surcharges.iter().map(erase))
            .chain(self.dp_costs.iter().map(erase))
    }

    pub fn record_count(&self) -> usize {
        self.records().count()
    }

    /// Rail agents without duplicates, first occurrence wins.
    pub fn unique_rail_agents(&self) -> Vec<&str> {
        dedup_agents(&self.rail_agents)
    }

    pub fn unique_truck_agents(&self) -> Vec<&str> {
        dedup_agents(&self.truck_agents)
    }

    /// Fills empty agent lists from the agents named in the inland tables.
    pub fn derive_agents_if_missing(&mut self) {
        if self.rail_agents.is_empty() {
            let names = self
                .combined_freights
                .iter()
                .map(|r| r.agent.as_str())
                .chain(self.port_border_freights.iter().map(|r| r.agent.as_str()));
            self.rail_agents = collect_agents(names);
        }
        if self.truck_agents.is_empty() {
            let names = self
                .border_destination_freights
                .iter()
                .map(|r| r.agent.as_str());
            self.truck_agents = collect_agents(names);
        }
    }
}

fn dedup_agents(agents: &[AgentName]) -> Vec<&str> {
    let mut unique: Vec<&str> = Vec::with_capacity(agents.len());
    for agent in agents {
        let agent = agent.trim();
        if agent.is_empty() || unique.iter().any(|seen| seen.eq_ignore_ascii_case(agent)) {
            continue;
        }
        unique.push(agent);
    }
    unique
}

fn collect_agents<'a>(names: impl Iterator<Item = &'a str>) -> Vec<AgentName> {
    let owned: Vec<AgentName> = names.map(str::to_string).collect();
    dedup_agents(&owned).into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::*;

    #[test]
    fn agent_lists_are_deduplicated_case_insensitively() {
        let snapshot = RateSnapshot {
            rail_agents: vec!["A".into(), " a ".into(), "B".into(), "".into()],
            truck_agents: vec!["T1".into(), "T1".into()],
            ..Default::default()
        };
        assert_eq!(snapshot.unique_rail_agents(), vec!["A", "B"]);
        assert_eq!(snapshot.unique_truck_agents(), vec!["T1"]);
    }

    #[test]
    fn derives_agent_universe_from_inland_tables() {
        let mut snapshot = RateSnapshot {
            combined_freights: vec![combined("c1", "A", "QINGDAO", "OSH", 300.0)],
            port_border_freights: vec![
                port_border("pb1", "B", "QINGDAO", 120.0),
                port_border("pb2", "A", "QINGDAO", 110.0),
            ],
            border_destination_freights: vec![border_destination("bd1", "T", "OSH", 90.0)],
            ..Default::default()
        };
        snapshot.derive_agents_if_missing();
        assert_eq!(snapshot.rail_agents, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(snapshot.truck_agents, vec!["T".to_string()]);
    }

    #[test]
    fn explicit_agent_lists_are_kept() {
        let mut snapshot = RateSnapshot {
            rail_agents: vec!["Z".into()],
            port_border_freights: vec![port_border("pb1", "B", "QINGDAO", 120.0)],
            ..Default::default()
        };
        snapshot.derive_agents_if_missing();
        assert_eq!(snapshot.rail_agents, vec!["Z".to_string()]);
    }

    #[test]
    fn records_walks_every_table() {
        let snapshot = RateSnapshot {
            sea_freights: vec![sea("s1", "BUSAN", "QINGDAO", 400.0, None)],
            dp_costs: vec![dp("dp1", "BUSAN", 30.0)],
            weight_surcharges: vec![surcharge("w1", "A", 0.0, 100.0, 5.0)],
            ..Default::default()
        };
        let ids: Vec<&str> = snapshot.records().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["s1", "w1", "dp1"]);
        assert_eq!(snapshot.record_count(), 3);
    }
}
