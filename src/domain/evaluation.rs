//! Cost aggregation per route option and minimum-cost selection across options.

use std::{cmp::Ordering, collections::BTreeSet};

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::debug;

use super::entities::{
    same_key, AgentName, CalculationRequest, CostCategory, Dthc, OtherCost, RateId,
};
use super::route::{latest_active, InlandLeg, RouteOption, SeaLeg};
use super::snapshot::RateSnapshot;
use super::warning::{push_unique, CalculationWarning};

/// Everything aggregation needs besides the option itself.
#[derive(Clone, Copy, Debug)]
pub struct CostContext<'c> {
    pub snapshot: &'c RateSnapshot,
    pub origin: &'c str,
    pub destination: &'c str,
    pub reference_date: Date,
    pub weight: f64,
    pub include_dp: bool,
    pub include_other_costs: bool,
    pub excluded: &'c BTreeSet<CostCategory>,
    pub other_costs: &'c [OtherCost],
}

impl<'c> CostContext<'c> {
    pub fn from_request(
        request: &'c CalculationRequest,
        snapshot: &'c RateSnapshot,
        reference_date: Date,
    ) -> Self {
        Self {
            snapshot,
            origin: &request.origin,
            destination: &request.destination,
            reference_date,
            weight: request.weight,
            include_dp: request.include_dp,
            include_other_costs: request.include_other_costs,
            excluded: &request.excluded_categories,
            other_costs: &request.other_costs,
        }
    }
}

/// How a component's looked-up value relates to the total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Counted in the total.
    Applied,
    /// Excluded by the caller; the looked-up amount is still reported.
    Excluded,
    /// No record valid on the reference date.
    Missing,
    /// Nothing applies and nothing is expected to, e.g. no surcharge tier for the weight.
    NotApplicable,
    /// The record exists but carries no value for this optional field.
    Absent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostComponent {
    pub category: CostCategory,
    /// Looked-up value. `None` means no value exists, never "zero".
    pub amount: Option<f64>,
    pub source_id: Option<RateId>,
    pub status: ComponentStatus,
}

impl CostComponent {
    pub fn contribution(&self) -> f64 {
        match self.status {
            ComponentStatus::Applied => self.amount.unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

/// Cost breakdown of one route option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentCostBreakdown {
    /// Rail agent, or the agent quoting the combined freight.
    pub agent: AgentName,
    pub rail_agent: Option<AgentName>,
    pub truck_agent: Option<AgentName>,
    pub combined_agent: Option<AgentName>,
    pub sea_agent: Option<AgentName>,
    pub sea_freight_id: Option<RateId>,
    pub carrier: Option<String>,
    pub is_combined_freight: bool,
    pub components: Vec<CostComponent>,
    pub total: f64,
    /// Set when a category that should have contributed had no valid record.
    pub expired: bool,
    pub warnings: Vec<CalculationWarning>,
}

impl AgentCostBreakdown {
    pub fn component(&self, category: &CostCategory) -> Option<&CostComponent> {
        self.components.iter().find(|c| &c.category == category)
    }

    /// Contribution of a category to the total (0 when absent from the breakdown).
    pub fn contribution_of(&self, category: &CostCategory) -> f64 {
        self.components
            .iter()
            .filter(|c| &c.category == category)
            .map(CostComponent::contribution)
            .sum()
    }

    pub fn route_label(&self) -> String {
        match (&self.combined_agent, &self.rail_agent, &self.truck_agent) {
            (Some(agent), _, _) => format!("{agent} (combined)"),
            (None, Some(rail), Some(truck)) => format!("{rail} + {truck}"),
            _ => self.agent.clone(),
        }
    }

    pub fn sea_label(&self) -> String {
        match (&self.sea_freight_id, &self.sea_agent) {
            (Some(id), Some(agent)) => format!("{id} ({agent})"),
            (Some(id), None) => id.clone(),
            (None, _) => "-".to_string(),
        }
    }
}

enum Lookup {
    Found { amount: f64, source_id: Option<RateId> },
    Missing,
    NotApplicable,
    Absent { source_id: RateId },
}

impl Lookup {
    fn found(amount: f64, source_id: &str) -> Self {
        Self::Found {
            amount,
            source_id: Some(source_id.to_string()),
        }
    }
}

struct BreakdownBuilder<'c> {
    ctx: &'c CostContext<'c>,
    agent: &'c str,
    components: Vec<CostComponent>,
    warnings: Vec<CalculationWarning>,
}

impl<'c> BreakdownBuilder<'c> {
    fn add(&mut self, category: CostCategory, lookup: Lookup) {
        let excluded = self.ctx.excluded.contains(&category);
        let settle = |status: ComponentStatus| if excluded { ComponentStatus::Excluded } else { status };

        let component = match lookup {
            Lookup::Found { amount, source_id } => CostComponent {
                category,
                amount: Some(amount),
                source_id,
                status: settle(ComponentStatus::Applied),
            },
            Lookup::Missing => {
                if !excluded {
                    push_unique(
                        &mut self.warnings,
                        CalculationWarning::StaleRate {
                            agent: self.agent.to_string(),
                            category: category.clone(),
                            reference_date: self.ctx.reference_date,
                        },
                    );
                }
                CostComponent {
                    category,
                    amount: None,
                    source_id: None,
                    status: settle(ComponentStatus::Missing),
                }
            }
            Lookup::NotApplicable => CostComponent {
                category,
                amount: None,
                source_id: None,
                status: settle(ComponentStatus::NotApplicable),
            },
            Lookup::Absent { source_id } => {
                if !excluded {
                    push_unique(
                        &mut self.warnings,
                        CalculationWarning::LocalChargeAbsent {
                            sea_freight_id: source_id.clone(),
                        },
                    );
                }
                CostComponent {
                    category,
                    amount: None,
                    source_id: Some(source_id),
                    status: settle(ComponentStatus::Absent),
                }
            }
        };
        self.components.push(component);
    }
}

/// Sums the applicable categories of one option into a breakdown.
pub fn aggregate(option: &RouteOption<'_>, ctx: &CostContext<'_>) -> AgentCostBreakdown {
    let agent = option.agent();
    let mut builder = BreakdownBuilder {
        ctx,
        agent,
        components: Vec::with_capacity(8 + ctx.other_costs.len()),
        warnings: Vec::new(),
    };

    match option.sea {
        Some(leg) => {
            builder.add(CostCategory::SeaFreight, Lookup::found(leg.rate(), leg.id()));
            let local = match leg.local_charge() {
                Some(amount) => Lookup::found(amount, leg.id()),
                None => Lookup::Absent {
                    source_id: leg.id().to_string(),
                },
            };
            builder.add(CostCategory::LocalCharge, local);
        }
        None => builder.add(CostCategory::SeaFreight, Lookup::Missing),
    }

    builder.add(CostCategory::Dthc, lookup_dthc(option, ctx));

    match option.inland {
        InlandLeg::Combined(record) => {
            builder.add(CostCategory::CombinedFreight, Lookup::found(record.rate, &record.id));
        }
        InlandLeg::Separate { rail, truck } => {
            builder.add(CostCategory::PortBorder, Lookup::found(rail.rate, &rail.id));
            builder.add(CostCategory::BorderDestination, Lookup::found(truck.rate, &truck.id));
        }
    }

    // A tier that covers the weight but is not active on the date is a stale rate;
    // only the absence of any covering tier is "not applicable".
    let mut covering = ctx
        .snapshot
        .weight_surcharges
        .iter()
        .filter(|rule| same_key(&rule.agent, agent) && rule.covers(ctx.weight))
        .peekable();
    let has_covering_tier = covering.peek().is_some();
    builder.add(
        CostCategory::WeightSurcharge,
        match latest_active(covering, ctx.reference_date) {
            Some(rule) => Lookup::found(rule.surcharge, &rule.id),
            None if has_covering_tier => Lookup::Missing,
            None => Lookup::NotApplicable,
        },
    );

    if ctx.include_dp {
        let dp = latest_active(
            ctx.snapshot
                .dp_costs
                .iter()
                .filter(|record| same_key(&record.port, ctx.origin)),
            ctx.reference_date,
        );
        builder.add(
            CostCategory::DpCost,
            match dp {
                Some(record) => Lookup::found(record.amount, &record.id),
                None => Lookup::Missing,
            },
        );
    }

    if ctx.include_other_costs {
        for cost in ctx.other_costs {
            builder.add(
                CostCategory::Other(cost.label.clone()),
                Lookup::Found {
                    amount: cost.amount,
                    source_id: None,
                },
            );
        }
    }

    let BreakdownBuilder {
        components,
        warnings,
        ..
    } = builder;
    let total: f64 = components.iter().map(CostComponent::contribution).sum();
    let expired = warnings.iter().any(CalculationWarning::is_stale);

    let breakdown = AgentCostBreakdown {
        agent: agent.to_string(),
        rail_agent: match option.inland {
            InlandLeg::Separate { rail, .. } => Some(rail.agent.clone()),
            InlandLeg::Combined(_) => None,
        },
        truck_agent: option.inland.truck_agent().map(str::to_string),
        combined_agent: match option.inland {
            InlandLeg::Combined(record) => Some(record.agent.clone()),
            InlandLeg::Separate { .. } => None,
        },
        sea_agent: option.sea.and_then(|leg| leg.agent()).map(str::to_string),
        sea_freight_id: option.sea.map(|leg| leg.id().to_string()),
        carrier: option.sea.map(|leg| leg.carrier().to_string()),
        is_combined_freight: option.inland.is_combined(),
        components,
        total,
        expired,
        warnings,
    };

    debug!(
        agent = %breakdown.agent,
        route = %breakdown.route_label(),
        sea = %breakdown.sea_label(),
        total = breakdown.total,
        expired = breakdown.expired,
        "aggregated option"
    );
    breakdown
}

fn lookup_dthc(option: &RouteOption<'_>, ctx: &CostContext<'_>) -> Lookup {
    let agent = option
        .sea
        .and_then(|leg: SeaLeg<'_>| leg.agent())
        .unwrap_or_else(|| option.agent());
    let carrier = option.sea.map(|leg| leg.carrier());
    let on_key = |record: &&Dthc| {
        same_key(&record.agent, agent)
            && same_key(&record.origin, ctx.origin)
            && same_key(&record.destination, ctx.destination)
    };

    let carrier_specific = carrier.and_then(|carrier| {
        latest_active(
            ctx.snapshot.dthc.iter().filter(on_key).filter(|record| {
                record
                    .carrier
                    .as_deref()
                    .is_some_and(|own| same_key(own, carrier))
            }),
            ctx.reference_date,
        )
    });
    let record = carrier_specific.or_else(|| {
        latest_active(
            ctx.snapshot
                .dthc
                .iter()
                .filter(on_key)
                .filter(|record| record.carrier.is_none()),
            ctx.reference_date,
        )
    });

    match record {
        Some(record) => Lookup::found(record.amount, &record.id),
        None => Lookup::Missing,
    }
}

/// Ranked breakdowns plus the cheapest one.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub ranked: Vec<AgentCostBreakdown>,
    pub cheapest: Option<AgentCostBreakdown>,
}

/// Ascending total; at equal totals a non-expired option first, then agent name. An agent's
/// combined option ranks ahead of its separate rail + truck option at the same total.
pub fn compare_breakdowns(a: &AgentCostBreakdown, b: &AgentCostBreakdown) -> Ordering {
    a.total
        .total_cmp(&b.total)
        .then(a.expired.cmp(&b.expired))
        .then_with(|| a.agent.cmp(&b.agent))
        .then(b.is_combined_freight.cmp(&a.is_combined_freight))
}

/// Ranks every breakdown. Nothing is discarded; `cheapest` is `None` only for empty input.
pub fn select_best(mut breakdowns: Vec<AgentCostBreakdown>) -> Selection {
    breakdowns.sort_by(compare_breakdowns);
    let cheapest = breakdowns.first().cloned();
    Selection {
        ranked: breakdowns,
        cheapest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::*;
    use crate::domain::route::{resolve_options, RouteQuery};

    fn request() -> CalculationRequest {
        CalculationRequest::new("BUSAN", "QINGDAO", "OSH", 5000.0).on(REFERENCE)
    }

    fn breakdowns(request: &CalculationRequest, snapshot: &RateSnapshot) -> Vec<AgentCostBreakdown> {
        let query = RouteQuery::from_request(request, REFERENCE);
        let ctx = CostContext::from_request(request, snapshot, REFERENCE);
        resolve_options(&query, snapshot)
            .iter()
            .map(|option| aggregate(option, &ctx))
            .collect()
    }

    fn combined_snapshot(local: Option<f64>) -> RateSnapshot {
        RateSnapshot {
            sea_freights: vec![sea("s1", "BUSAN", "QINGDAO", 400.0, local)],
            dthc: vec![dthc("d1", "A", "BUSAN", "QINGDAO", None, 60.0)],
            combined_freights: vec![combined("c1", "A", "QINGDAO", "OSH", 300.0)],
            rail_agents: vec!["A".into()],
            ..Default::default()
        }
    }

    #[test]
    fn sums_every_applied_category() {
        let mut snapshot = combined_snapshot(Some(25.0));
        snapshot.weight_surcharges = vec![surcharge("w1", "A", 3000.0, 6000.0, 75.0)];
        snapshot.dp_costs = vec![dp("dp1", "BUSAN", 30.0)];
        let request = request().with_dp(true).with_other_cost("Customs", 15.0);

        let result = breakdowns(&request, &snapshot);
        assert_eq!(result.len(), 1);
        let breakdown = &result[0];
        assert_eq!(breakdown.total, 400.0 + 25.0 + 60.0 + 300.0 + 75.0 + 30.0 + 15.0);
        assert!(!breakdown.expired);
        assert!(breakdown.warnings.is_empty());
        assert!(breakdown.is_combined_freight);
        assert_eq!(breakdown.combined_agent.as_deref(), Some("A"));
        assert_eq!(breakdown.carrier.as_deref(), Some("COSCO"));
    }

    #[test]
    fn separate_path_adds_rail_and_truck() {
        let snapshot = RateSnapshot {
            sea_freights: vec![sea("s1", "BUSAN", "QINGDAO", 400.0, Some(0.0))],
            dthc: vec![dthc("d1", "B", "BUSAN", "QINGDAO", None, 60.0)],
            port_border_freights: vec![port_border("pb1", "B", "QINGDAO", 150.0)],
            border_destination_freights: vec![border_destination("bd1", "T", "OSH", 90.0)],
            rail_agents: vec!["B".into()],
            truck_agents: vec!["T".into()],
            ..Default::default()
        };

        let result = breakdowns(&request(), &snapshot);
        let breakdown = &result[0];
        assert!(!breakdown.is_combined_freight);
        assert_eq!(breakdown.rail_agent.as_deref(), Some("B"));
        assert_eq!(breakdown.truck_agent.as_deref(), Some("T"));
        assert_eq!(breakdown.route_label(), "B + T");
        assert_eq!(breakdown.total, 400.0 + 60.0 + 150.0 + 90.0);
    }

    #[test]
    fn explicit_zero_local_charge_differs_from_absent_one() {
        let zero = breakdowns(&request(), &combined_snapshot(Some(0.0))).remove(0);
        let absent = breakdowns(&request(), &combined_snapshot(None)).remove(0);

        let zero_local = zero.component(&CostCategory::LocalCharge).unwrap();
        assert_eq!(zero_local.amount, Some(0.0));
        assert_eq!(zero_local.status, ComponentStatus::Applied);

        let absent_local = absent.component(&CostCategory::LocalCharge).unwrap();
        assert_eq!(absent_local.amount, None);
        assert_eq!(absent_local.status, ComponentStatus::Absent);

        assert_eq!(zero.total, absent.total);
        assert_eq!(zero.contribution_of(&CostCategory::LocalCharge), 0.0);
        assert_eq!(absent.contribution_of(&CostCategory::LocalCharge), 0.0);
        assert!(zero.warnings.is_empty());
        assert_eq!(
            absent.warnings,
            vec![CalculationWarning::LocalChargeAbsent {
                sea_freight_id: "s1".to_string()
            }]
        );
        assert_ne!(zero.warnings, absent.warnings);
        assert!(!absent.expired);
    }

    #[test]
    fn missing_dthc_is_zero_with_a_stale_warning() {
        let mut snapshot = combined_snapshot(Some(0.0));
        snapshot.dthc.clear();

        let breakdown = breakdowns(&request(), &snapshot).remove(0);
        assert_eq!(breakdown.total, 700.0);
        assert!(breakdown.expired);
        assert_eq!(
            breakdown.component(&CostCategory::Dthc).map(|c| c.status),
            Some(ComponentStatus::Missing)
        );
        assert_eq!(
            breakdown.warnings,
            vec![CalculationWarning::StaleRate {
                agent: "A".to_string(),
                category: CostCategory::Dthc,
                reference_date: REFERENCE,
            }]
        );
    }

    #[test]
    fn excluded_categories_report_but_do_not_count() {
        let snapshot = combined_snapshot(Some(25.0));
        let request = request()
            .excluding(CostCategory::CombinedFreight)
            .excluding(CostCategory::LocalCharge)
            .with_other_cost("Customs", 15.0)
            .excluding(CostCategory::Other("Customs".to_string()));

        let breakdown = breakdowns(&request, &snapshot).remove(0);
        assert_eq!(breakdown.total, 400.0 + 60.0);
        let inland = breakdown.component(&CostCategory::CombinedFreight).unwrap();
        assert_eq!(inland.amount, Some(300.0));
        assert_eq!(inland.status, ComponentStatus::Excluded);
        assert_eq!(breakdown.contribution_of(&CostCategory::CombinedFreight), 0.0);
        let customs = breakdown
            .component(&CostCategory::Other("Customs".to_string()))
            .unwrap();
        assert_eq!(customs.amount, Some(15.0));
        assert_eq!(customs.status, ComponentStatus::Excluded);
    }

    #[test]
    fn excluding_a_missing_category_suppresses_its_warning() {
        let mut snapshot = combined_snapshot(Some(0.0));
        snapshot.dthc.clear();
        let request = request().excluding(CostCategory::Dthc);

        let breakdown = breakdowns(&request, &snapshot).remove(0);
        assert!(!breakdown.expired);
        assert!(breakdown.warnings.is_empty());
        assert_eq!(
            breakdown.component(&CostCategory::Dthc).map(|c| c.status),
            Some(ComponentStatus::Excluded)
        );
    }

    #[test]
    fn dp_cost_only_when_requested() {
        let snapshot = combined_snapshot(Some(0.0));

        let without = breakdowns(&request(), &snapshot).remove(0);
        assert!(without.component(&CostCategory::DpCost).is_none());
        assert!(!without.expired);

        let with = breakdowns(&request().with_dp(true), &snapshot).remove(0);
        assert_eq!(
            with.component(&CostCategory::DpCost).map(|c| c.status),
            Some(ComponentStatus::Missing)
        );
        assert!(with.expired);
    }

    #[test]
    fn other_costs_can_be_switched_off() {
        let snapshot = combined_snapshot(Some(0.0));
        let mut request = request().with_other_cost("Customs", 15.0);
        request.include_other_costs = false;

        let breakdown = breakdowns(&request, &snapshot).remove(0);
        assert_eq!(breakdown.total, 760.0);
        assert!(breakdown
            .component(&CostCategory::Other("Customs".to_string()))
            .is_none());
    }

    #[test]
    fn surcharge_tier_must_contain_the_weight() {
        let mut snapshot = combined_snapshot(Some(0.0));
        snapshot.weight_surcharges = vec![
            surcharge("w-light", "A", 0.0, 2999.0, 20.0),
            surcharge("w-heavy", "A", 6001.0, 20000.0, 150.0),
        ];

        let breakdown = breakdowns(&request(), &snapshot).remove(0);
        let component = breakdown.component(&CostCategory::WeightSurcharge).unwrap();
        assert_eq!(component.status, ComponentStatus::NotApplicable);
        assert!(breakdown.warnings.is_empty());

        let boundary = CalculationRequest::new("BUSAN", "QINGDAO", "OSH", 6001.0).on(REFERENCE);
        let breakdown = breakdowns(&boundary, &snapshot).remove(0);
        assert_eq!(breakdown.contribution_of(&CostCategory::WeightSurcharge), 150.0);
    }

    #[test]
    fn lapsed_covering_tier_is_stale_not_inapplicable() {
        let mut snapshot = combined_snapshot(Some(0.0));
        let mut lapsed = surcharge("w1", "A", 3000.0, 6000.0, 75.0);
        lapsed.valid_to = time::macros::date!(2025 - 05 - 31);
        snapshot.weight_surcharges = vec![lapsed, surcharge("w-light", "A", 0.0, 999.0, 20.0)];

        let breakdown = breakdowns(&request(), &snapshot).remove(0);
        let component = breakdown.component(&CostCategory::WeightSurcharge).unwrap();
        assert_eq!(component.status, ComponentStatus::Missing);
        assert_eq!(breakdown.total, 400.0 + 60.0 + 300.0);
        assert!(breakdown.expired);
        assert_eq!(
            breakdown.warnings,
            vec![CalculationWarning::StaleRate {
                agent: "A".to_string(),
                category: CostCategory::WeightSurcharge,
                reference_date: REFERENCE,
            }]
        );

        let light = CalculationRequest::new("BUSAN", "QINGDAO", "OSH", 500.0).on(REFERENCE);
        let breakdown = breakdowns(&light, &snapshot).remove(0);
        assert_eq!(breakdown.contribution_of(&CostCategory::WeightSurcharge), 20.0);
        assert!(!breakdown.expired);
    }

    #[test]
    fn carrier_specific_dthc_beats_generic_one() {
        let mut snapshot = combined_snapshot(Some(0.0));
        snapshot.dthc = vec![
            dthc("d-any", "A", "BUSAN", "QINGDAO", None, 60.0),
            dthc("d-cosco", "A", "BUSAN", "QINGDAO", Some("cosco"), 45.0),
            dthc("d-msc", "A", "BUSAN", "QINGDAO", Some("MSC"), 10.0),
        ];

        let breakdown = breakdowns(&request(), &snapshot).remove(0);
        let component = breakdown.component(&CostCategory::Dthc).unwrap();
        assert_eq!(component.source_id.as_deref(), Some("d-cosco"));
        assert_eq!(component.amount, Some(45.0));
    }

    #[test]
    fn agent_sea_freight_uses_its_own_agents_dthc() {
        let mut snapshot = combined_snapshot(Some(0.0));
        snapshot.sea_freights.clear();
        snapshot.agent_sea_freights = vec![agent_sea("as1", "A", "BUSAN", "QINGDAO", 420.0, Some(50.0))];

        let breakdown = breakdowns(&request(), &snapshot).remove(0);
        assert_eq!(breakdown.sea_agent.as_deref(), Some("A"));
        assert_eq!(breakdown.total, 420.0 + 50.0 + 60.0 + 300.0);
        assert_eq!(breakdown.sea_label(), "as1 (A)");
    }

    #[test]
    fn missing_sea_leg_is_stale() {
        let mut snapshot = combined_snapshot(Some(0.0));
        snapshot.sea_freights.clear();

        let breakdown = breakdowns(&request(), &snapshot).remove(0);
        assert!(breakdown.expired);
        assert_eq!(breakdown.total, 360.0);
        assert!(breakdown.component(&CostCategory::LocalCharge).is_none());
        assert_eq!(breakdown.sea_label(), "-");
    }

    fn ranked(agent: &str, total: f64, expired: bool) -> AgentCostBreakdown {
        AgentCostBreakdown {
            agent: agent.to_string(),
            rail_agent: None,
            truck_agent: None,
            combined_agent: Some(agent.to_string()),
            sea_agent: None,
            sea_freight_id: None,
            carrier: None,
            is_combined_freight: true,
            components: Vec::new(),
            total,
            expired,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn selection_orders_by_total_then_freshness_then_agent() {
        let selection = select_best(vec![
            ranked("C", 900.0, false),
            ranked("B", 700.0, true),
            ranked("Z", 700.0, false),
            ranked("A", 700.0, true),
        ]);
        let order: Vec<&str> = selection.ranked.iter().map(|b| b.agent.as_str()).collect();
        assert_eq!(order, vec!["Z", "A", "B", "C"]);
        assert_eq!(selection.cheapest.map(|b| b.agent), Some("Z".to_string()));
    }

    #[test]
    fn combined_option_ranks_ahead_of_separate_at_equal_total() {
        let mut snapshot = combined_snapshot(Some(0.0));
        snapshot.combined_freights = vec![combined("c1", "A", "QINGDAO", "OSH", 300.0)];
        snapshot.port_border_freights = vec![port_border("pb1", "A", "QINGDAO", 180.0)];
        snapshot.border_destination_freights = vec![border_destination("bd1", "T", "OSH", 120.0)];
        snapshot.truck_agents = vec!["T".into()];

        let mut options = breakdowns(&request(), &snapshot);
        assert_eq!(options.len(), 2);
        options.reverse();
        assert!(!options[0].is_combined_freight);
        assert_eq!(options[0].total, options[1].total);

        let selection = select_best(options);
        let routes: Vec<String> = selection.ranked.iter().map(|b| b.route_label()).collect();
        assert_eq!(routes, vec!["A (combined)".to_string(), "A + T".to_string()]);
        assert!(selection.cheapest.unwrap().is_combined_freight);
    }

    #[test]
    fn empty_selection_has_no_cheapest() {
        let selection = select_best(Vec::new());
        assert!(selection.ranked.is_empty());
        assert!(selection.cheapest.is_none());
    }
}
