//! Route option resolution: which sea leg and inland leg combinations can serve a request.

use std::collections::BTreeSet;

use time::Date;
use tracing::debug;

use super::entities::{
    same_key, AgentSeaFreight, BorderDestinationFreight, CalculationRequest, CombinedFreight,
    PortBorderFreight, RateId, RateRecord, SeaFreight,
};
use super::snapshot::RateSnapshot;
use super::warning::CalculationWarning;

/// The lookup keys of one calculation, with the reference date already fixed.
#[derive(Clone, Copy, Debug)]
pub struct RouteQuery<'q> {
    pub origin: &'q str,
    pub destination: &'q str,
    pub final_destination: &'q str,
    pub reference_date: Date,
    pub selected_sea_freights: Option<&'q BTreeSet<RateId>>,
}

impl<'q> RouteQuery<'q> {
    pub fn from_request(request: &'q CalculationRequest, reference_date: Date) -> Self {
        Self {
            origin: &request.origin,
            destination: &request.destination,
            final_destination: &request.final_destination,
            reference_date,
            selected_sea_freights: request.selected_sea_freights.as_ref(),
        }
    }

    fn sea_selected(&self, id: &str) -> bool {
        self.selected_sea_freights
            .map(|ids| ids.contains(id))
            .unwrap_or(true)
    }
}

/// Ocean leg of an option.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeaLeg<'a> {
    Generic(&'a SeaFreight),
    Agent(&'a AgentSeaFreight),
}

impl<'a> SeaLeg<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            Self::Generic(record) => &record.id,
            Self::Agent(record) => &record.id,
        }
    }

    pub fn rate(&self) -> f64 {
        match self {
            Self::Generic(record) => record.rate,
            Self::Agent(record) => record.rate,
        }
    }

    pub fn local_charge(&self) -> Option<f64> {
        match self {
            Self::Generic(record) => record.local_charge,
            Self::Agent(record) => record.local_charge,
        }
    }

    pub fn carrier(&self) -> &'a str {
        match self {
            Self::Generic(record) => &record.carrier,
            Self::Agent(record) => &record.carrier,
        }
    }

    /// The negotiating agent, for agent-specific rates only.
    pub fn agent(&self) -> Option<&'a str> {
        match self {
            Self::Generic(_) => None,
            Self::Agent(record) => Some(&record.agent),
        }
    }
}

/// Inland leg of an option: one all-in price or a rail+truck pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InlandLeg<'a> {
    Combined(&'a CombinedFreight),
    Separate {
        rail: &'a PortBorderFreight,
        truck: &'a BorderDestinationFreight,
    },
}

impl<'a> InlandLeg<'a> {
    /// The rail agent, or the agent quoting the combined price.
    pub fn agent(&self) -> &'a str {
        match self {
            Self::Combined(record) => &record.agent,
            Self::Separate { rail, .. } => &rail.agent,
        }
    }

    pub fn truck_agent(&self) -> Option<&'a str> {
        match self {
            Self::Combined(_) => None,
            Self::Separate { truck, .. } => Some(&truck.agent),
        }
    }

    pub fn is_combined(&self) -> bool {
        matches!(self, Self::Combined(_))
    }
}

/// One candidate way of moving the shipment. `sea` is `None` when no sea freight could be
/// resolved for the inland leg; the aggregator reports that as a stale rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteOption<'a> {
    pub sea: Option<SeaLeg<'a>>,
    pub inland: InlandLeg<'a>,
}

impl<'a> RouteOption<'a> {
    pub fn agent(&self) -> &'a str {
        self.inland.agent()
    }
}

/// Picks the record to use among those matching a key: active on `reference`, latest
/// `valid_from` first, then highest version, then earliest in the snapshot.
pub(crate) fn latest_active<'a, T, I>(records: I, reference: Date) -> Option<&'a T>
where
    T: RateRecord + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<&'a T> = None;
    for record in records {
        if !record.is_active_on(reference) {
            continue;
        }
        let replace = match best {
            None => true,
            Some(current) => {
                (record.validity().valid_from, record.version())
                    > (current.validity().valid_from, current.version())
            }
        };
        if replace {
            best = Some(record);
        }
    }
    best
}

/// Enumerates every option for the query. Empty when no rail agent has a valid inland leg.
pub fn resolve_options<'a>(query: &RouteQuery<'_>, snapshot: &'a RateSnapshot) -> Vec<RouteOption<'a>> {
    let inland = inland_legs(query, snapshot);
    if inland.is_empty() {
        debug!(
            destination = query.destination,
            final_destination = query.final_destination,
            "no inland leg valid on reference date"
        );
        return Vec::new();
    }

    let sea = sea_legs(query, snapshot);
    let mut options = Vec::with_capacity(inland.len() * sea.len().max(1));

    for leg in &inland {
        let before = options.len();
        for sea_leg in &sea {
            let pairs = match sea_leg.agent() {
                None => true,
                Some(agent) => same_key(agent, leg.agent()),
            };
            if pairs {
                options.push(RouteOption {
                    sea: Some(*sea_leg),
                    inland: *leg,
                });
            }
        }
        if options.len() == before {
            options.push(RouteOption {
                sea: None,
                inland: *leg,
            });
        }
    }

    debug!(
        inland = inland.len(),
        sea = sea.len(),
        options = options.len(),
        "resolved route options"
    );
    options
}

fn inland_legs<'a>(query: &RouteQuery<'_>, snapshot: &'a RateSnapshot) -> Vec<InlandLeg<'a>> {
    let date = query.reference_date;

    let trucks: Vec<&'a BorderDestinationFreight> = snapshot
        .unique_truck_agents()
        .into_iter()
        .filter_map(|agent| {
            latest_active(
                snapshot.border_destination_freights.iter().filter(|r| {
                    same_key(&r.agent, agent) && same_key(&r.final_destination, query.final_destination)
                }),
                date,
            )
        })
        .collect();

    let mut legs = Vec::new();
    for agent in snapshot.unique_rail_agents() {
        let combined = latest_active(
            snapshot.combined_freights.iter().filter(|r| {
                same_key(&r.agent, agent)
                    && same_key(&r.destination_port, query.destination)
                    && same_key(&r.final_destination, query.final_destination)
            }),
            date,
        );
        if let Some(record) = combined {
            legs.push(InlandLeg::Combined(record));
        }

        let rail = latest_active(
            snapshot
                .port_border_freights
                .iter()
                .filter(|r| same_key(&r.agent, agent) && same_key(&r.destination_port, query.destination)),
            date,
        );
        if let Some(rail) = rail {
            legs.extend(trucks.iter().map(|&truck| InlandLeg::Separate { rail, truck }));
        }
    }
    legs
}

fn sea_legs<'a>(query: &RouteQuery<'_>, snapshot: &'a RateSnapshot) -> Vec<SeaLeg<'a>> {
    let date = query.reference_date;
    let on_route = |origin: &str, destination: &str| {
        same_key(origin, query.origin) && same_key(destination, query.destination)
    };

    let generic = snapshot
        .sea_freights
        .iter()
        .filter(|r| on_route(&r.origin, &r.destination))
        .filter(|r| r.is_active_on(date) && query.sea_selected(&r.id))
        .map(SeaLeg::Generic);
    let agent = snapshot
        .agent_sea_freights
        .iter()
        .filter(|r| on_route(&r.origin, &r.destination))
        .filter(|r| r.is_active_on(date) && query.sea_selected(&r.id))
        .map(SeaLeg::Agent);

    generic.chain(agent).collect()
}

/// Inverted validity windows among the records a calculation on this route could touch.
pub fn route_anomalies(query: &RouteQuery<'_>, snapshot: &RateSnapshot) -> Vec<CalculationWarning> {
    let on_route = |origin: &str, destination: &str| {
        same_key(origin, query.origin) && same_key(destination, query.destination)
    };
    let rail_agents = snapshot.unique_rail_agents();

    let mut relevant: Vec<&dyn RateRecord> = Vec::new();
    relevant.extend(
        snapshot
            .sea_freights
            .iter()
            .filter(|r| on_route(&r.origin, &r.destination))
            .map(|r| r as &dyn RateRecord),
    );
    relevant.extend(
        snapshot
            .agent_sea_freights
            .iter()
            .filter(|r| on_route(&r.origin, &r.destination))
            .map(|r| r as &dyn RateRecord),
    );
    relevant.extend(
        snapshot
            .dthc
            .iter()
            .filter(|r| on_route(&r.origin, &r.destination))
            .map(|r| r as &dyn RateRecord),
    );
    relevant.extend(
        snapshot
            .combined_freights
            .iter()
            .filter(|r| {
                same_key(&r.destination_port, query.destination)
                    && same_key(&r.final_destination, query.final_destination)
            })
            .map(|r| r as &dyn RateRecord),
    );
    relevant.extend(
        snapshot
            .port_border_freights
            .iter()
            .filter(|r| same_key(&r.destination_port, query.destination))
            .map(|r| r as &dyn RateRecord),
    );
    relevant.extend(
        snapshot
            .border_destination_freights
            .iter()
            .filter(|r| same_key(&r.final_destination, query.final_destination))
            .map(|r| r as &dyn RateRecord),
    );
    relevant.extend(
        snapshot
            .weight_surcharges
            .iter()
            .filter(|r| rail_agents.iter().any(|agent| same_key(&r.agent, agent)))
            .map(|r| r as &dyn RateRecord),
    );
    relevant.extend(
        snapshot
            .dp_costs
            .iter()
            .filter(|r| same_key(&r.port, query.origin))
            .map(|r| r as &dyn RateRecord),
    );

    relevant
        .into_iter()
        .filter(|record| record.validity().is_inverted())
        .map(|record| CalculationWarning::InvertedValidity {
            table: record.table(),
            record_id: record.id().to_string(),
        })
        .collect()
}
