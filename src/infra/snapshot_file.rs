//! Loads rate snapshot exports from disk.
//!
//! - Rows arrive loosely typed (snake_case or camelCase keys, numbers as strings).
//! - Every row is converted into its typed record; rows missing required fields are rejected,
//!   never dropped.
//! - Optional amounts keep their presence: `null`/missing/empty means `None`, `0` means zero.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{de, Deserialize, Deserializer};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, Date, OffsetDateTime};
use tracing::{info, warn};

use crate::domain::{
    AgentName, AgentSeaFreight, BorderDestinationFreight, CombinedFreight, DpCost, Dthc,
    PortBorderFreight, RateSnapshot, RateTable, SeaFreight, WeightSurchargeRule,
};
use crate::util::dates::parse_date;

const APP_DIR: &str = "freight-cost-calculator";
const SNAPSHOT_FILENAME: &str = "rates_snapshot.json";

#[derive(Debug, Error)]
pub enum SnapshotLoadError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{table} row {row}: missing required field `{field}`")]
    MissingField {
        table: RateTable,
        row: usize,
        field: &'static str,
    },
    #[error("{table} row {row}: invalid `{field}`: {reason}")]
    InvalidField {
        table: RateTable,
        row: usize,
        field: &'static str,
        reason: String,
    },
}

/// A snapshot plus where and when it was exported.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedSnapshot {
    pub path: Option<PathBuf>,
    pub exported_at: Option<OffsetDateTime>,
    pub snapshot: RateSnapshot,
}

impl LoadedSnapshot {
    /// Age of the export, `None` when the file carries no export timestamp.
    pub fn age(&self) -> Option<Duration> {
        self.age_at(OffsetDateTime::now_utc())
    }

    pub fn age_at(&self, now: OffsetDateTime) -> Option<Duration> {
        self.exported_at.map(|exported| {
            let secs = (now - exported).whole_seconds().max(0);
            Duration::from_secs(secs as u64)
        })
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        match self.age() {
            Some(age) => format_age(age),
            None => "unknown".to_string(),
        }
    }

    /// Exports without a timestamp count as stale.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age().map(|age| age > max_age).unwrap_or(true)
    }
}

pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

/// Snapshot location in the app data directory.
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(SNAPSHOT_FILENAME)
}

/// Reads and converts a snapshot export.
pub fn load_snapshot(path: &Path) -> Result<LoadedSnapshot, SnapshotLoadError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut loaded = parse_snapshot(&content)?;
    loaded.path = Some(path.to_path_buf());

    info!(
        path = %path.display(),
        records = loaded.snapshot.record_count(),
        rail_agents = loaded.snapshot.rail_agents.len(),
        truck_agents = loaded.snapshot.truck_agents.len(),
        age = %loaded.age_string(),
        "loaded rate snapshot"
    );
    Ok(loaded)
}

/// Converts snapshot JSON into typed records.
pub fn parse_snapshot(json: &str) -> Result<LoadedSnapshot, SnapshotLoadError> {
    let dto: SnapshotDto = serde_json::from_str(json)?;

    let exported_at = dto.exported_at.as_deref().and_then(|raw| {
        OffsetDateTime::parse(raw.trim(), &Rfc3339)
            .map_err(|err| warn!(exported_at = raw, %err, "ignoring unparsable export timestamp"))
            .ok()
    });

    let mut snapshot = RateSnapshot {
        sea_freights: convert_rows(dto.sea_freights)?,
        agent_sea_freights: convert_rows(dto.agent_sea_freights)?,
        dthc: convert_rows(dto.dthc)?,
        combined_freights: convert_rows(dto.combined_freights)?,
        port_border_freights: convert_rows(dto.port_border_freights)?,
        border_destination_freights: convert_rows(dto.border_destination_freights)?,
        weight_surcharges: convert_rows(dto.weight_surcharges)?,
        dp_costs: convert_rows(dto.dp_costs)?,
        rail_agents: agent_names(dto.rail_agents),
        truck_agents: agent_names(dto.truck_agents),
    };
    snapshot.derive_agents_if_missing();

    Ok(LoadedSnapshot {
        path: None,
        exported_at,
        snapshot,
    })
}

#[derive(Debug, Deserialize)]
struct SnapshotDto {
    #[serde(default, alias = "exportedAt")]
    exported_at: Option<String>,
    #[serde(default, alias = "railAgents")]
    rail_agents: Vec<AgentDto>,
    #[serde(default, alias = "truckAgents")]
    truck_agents: Vec<AgentDto>,
    #[serde(default, alias = "seaFreights")]
    sea_freights: Vec<SeaFreightRow>,
    #[serde(default, alias = "agentSeaFreights")]
    agent_sea_freights: Vec<AgentSeaFreightRow>,
    #[serde(default, alias = "dthcList")]
    dthc: Vec<DthcRow>,
    #[serde(default, alias = "combinedFreights")]
    combined_freights: Vec<CombinedFreightRow>,
    #[serde(default, alias = "portBorderFreights")]
    port_border_freights: Vec<PortBorderRow>,
    #[serde(default, alias = "borderDestinationFreights")]
    border_destination_freights: Vec<BorderDestinationRow>,
    #[serde(default, alias = "weightSurcharges", alias = "weightSurchargeRules")]
    weight_surcharges: Vec<WeightSurchargeRow>,
    #[serde(default, alias = "dpCosts")]
    dp_costs: Vec<DpCostRow>,
}

/// Agents are exported either as plain names or as rows of the agents table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AgentDto {
    Name(String),
    Row {
        #[serde(alias = "agent")]
        name: String,
    },
}

fn agent_names(agents: Vec<AgentDto>) -> Vec<AgentName> {
    agents
        .into_iter()
        .map(|agent| match agent {
            AgentDto::Name(name) | AgentDto::Row { name } => name.trim().to_string(),
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Position of a row, for error reporting.
struct RowContext {
    table: RateTable,
    row: usize,
}

impl RowContext {
    fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T, SnapshotLoadError> {
        value.ok_or(SnapshotLoadError::MissingField {
            table: self.table,
            row: self.row,
            field,
        })
    }

    fn invalid(&self, field: &'static str, reason: impl fmt::Display) -> SnapshotLoadError {
        SnapshotLoadError::InvalidField {
            table: self.table,
            row: self.row,
            field,
            reason: reason.to_string(),
        }
    }

    fn text(&self, value: Option<String>, field: &'static str) -> Result<String, SnapshotLoadError> {
        let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        self.require(value, field)
    }

    fn amount(&self, value: Option<f64>, field: &'static str) -> Result<f64, SnapshotLoadError> {
        let amount = self.require(value, field)?;
        self.finite(amount, field)
    }

    fn optional_amount(&self, value: Option<f64>, field: &'static str) -> Result<Option<f64>, SnapshotLoadError> {
        value.map(|amount| self.finite(amount, field)).transpose()
    }

    fn finite(&self, amount: f64, field: &'static str) -> Result<f64, SnapshotLoadError> {
        if amount.is_finite() {
            Ok(amount)
        } else {
            Err(self.invalid(field, "not a finite number"))
        }
    }

    fn date(&self, value: Option<String>, field: &'static str) -> Result<Date, SnapshotLoadError> {
        let raw = self.text(value, field)?;
        parse_date(&raw).map_err(|err| self.invalid(field, err))
    }

    /// Missing versions default to 1; present ones must be positive integers.
    fn version(&self, value: Option<f64>) -> Result<u32, SnapshotLoadError> {
        match value {
            None => Ok(1),
            Some(v) if v.fract() == 0.0 && v >= 1.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
            Some(v) => Err(self.invalid("version", format!("{v} is not a positive integer"))),
        }
    }
}

trait RowDto {
    type Record;
    const TABLE: RateTable;

    fn convert(self, ctx: &RowContext) -> Result<Self::Record, SnapshotLoadError>;
}

fn convert_rows<R: RowDto>(rows: Vec<R>) -> Result<Vec<R::Record>, SnapshotLoadError> {
    rows.into_iter()
        .enumerate()
        .map(|(row, dto)| {
            dto.convert(&RowContext {
                table: R::TABLE,
                row,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SeaFreightRow {
    #[serde(default, deserialize_with = "optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    version: Option<f64>,
    #[serde(default, alias = "pol", deserialize_with = "optional_string")]
    origin: Option<String>,
    #[serde(default, alias = "pod", deserialize_with = "optional_string")]
    destination: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    carrier: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    rate: Option<f64>,
    #[serde(
        default,
        alias = "localCharge",
        alias = "l_local",
        alias = "llocal",
        deserialize_with = "optional_number"
    )]
    local_charge: Option<f64>,
    #[serde(default, alias = "validFrom", deserialize_with = "optional_string")]
    valid_from: Option<String>,
    #[serde(default, alias = "validTo", deserialize_with = "optional_string")]
    valid_to: Option<String>,
}

impl RowDto for SeaFreightRow {
    type Record = SeaFreight;
    const TABLE: RateTable = RateTable::SeaFreight;

    fn convert(self, ctx: &RowContext) -> Result<SeaFreight, SnapshotLoadError> {
        Ok(SeaFreight {
            id: ctx.text(self.id, "id")?,
            version: ctx.version(self.version)?,
            origin: ctx.text(self.origin, "origin")?,
            destination: ctx.text(self.destination, "destination")?,
            carrier: ctx.text(self.carrier, "carrier")?,
            rate: ctx.amount(self.rate, "rate")?,
            local_charge: ctx.optional_amount(self.local_charge, "local_charge")?,
            valid_from: ctx.date(self.valid_from, "valid_from")?,
            valid_to: ctx.date(self.valid_to, "valid_to")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AgentSeaFreightRow {
    #[serde(default, deserialize_with = "optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    version: Option<f64>,
    #[serde(default, alias = "agentName", alias = "agent_name", deserialize_with = "optional_string")]
    agent: Option<String>,
    #[serde(default, alias = "pol", deserialize_with = "optional_string")]
    origin: Option<String>,
    #[serde(default, alias = "pod", deserialize_with = "optional_string")]
    destination: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    carrier: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    rate: Option<f64>,
    #[serde(
        default,
        alias = "localCharge",
        alias = "l_local",
        alias = "llocal",
        deserialize_with = "optional_number"
    )]
    local_charge: Option<f64>,
    #[serde(default, alias = "validFrom", deserialize_with = "optional_string")]
    valid_from: Option<String>,
    #[serde(default, alias = "validTo", deserialize_with = "optional_string")]
    valid_to: Option<String>,
}

impl RowDto for AgentSeaFreightRow {
    type Record = AgentSeaFreight;
    const TABLE: RateTable = RateTable::AgentSeaFreight;

    fn convert(self, ctx: &RowContext) -> Result<AgentSeaFreight, SnapshotLoadError> {
        Ok(AgentSeaFreight {
            id: ctx.text(self.id, "id")?,
            version: ctx.version(self.version)?,
            agent: ctx.text(self.agent, "agent")?,
            origin: ctx.text(self.origin, "origin")?,
            destination: ctx.text(self.destination, "destination")?,
            carrier: ctx.text(self.carrier, "carrier")?,
            rate: ctx.amount(self.rate, "rate")?,
            local_charge: ctx.optional_amount(self.local_charge, "local_charge")?,
            valid_from: ctx.date(self.valid_from, "valid_from")?,
            valid_to: ctx.date(self.valid_to, "valid_to")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DthcRow {
    #[serde(default, deserialize_with = "optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    version: Option<f64>,
    #[serde(default, alias = "agentName", alias = "agent_name", deserialize_with = "optional_string")]
    agent: Option<String>,
    #[serde(default, alias = "pol", deserialize_with = "optional_string")]
    origin: Option<String>,
    #[serde(default, alias = "pod", deserialize_with = "optional_string")]
    destination: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    carrier: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    amount: Option<f64>,
    #[serde(default, alias = "validFrom", deserialize_with = "optional_string")]
    valid_from: Option<String>,
    #[serde(default, alias = "validTo", deserialize_with = "optional_string")]
    valid_to: Option<String>,
}

impl RowDto for DthcRow {
    type Record = Dthc;
    const TABLE: RateTable = RateTable::Dthc;

    fn convert(self, ctx: &RowContext) -> Result<Dthc, SnapshotLoadError> {
        Ok(Dthc {
            id: ctx.text(self.id, "id")?,
            version: ctx.version(self.version)?,
            agent: ctx.text(self.agent, "agent")?,
            origin: ctx.text(self.origin, "origin")?,
            destination: ctx.text(self.destination, "destination")?,
            carrier: self
                .carrier
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            amount: ctx.amount(self.amount, "amount")?,
            valid_from: ctx.date(self.valid_from, "valid_from")?,
            valid_to: ctx.date(self.valid_to, "valid_to")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CombinedFreightRow {
    #[serde(default, deserialize_with = "optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    version: Option<f64>,
    #[serde(default, alias = "agentName", alias = "agent_name", deserialize_with = "optional_string")]
    agent: Option<String>,
    #[serde(default, alias = "pod", alias = "destinationPort", deserialize_with = "optional_string")]
    destination_port: Option<String>,
    #[serde(
        default,
        alias = "finalDestination",
        alias = "final_destination_id",
        alias = "finalDestinationId",
        deserialize_with = "optional_string"
    )]
    final_destination: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    rate: Option<f64>,
    #[serde(default, alias = "validFrom", deserialize_with = "optional_string")]
    valid_from: Option<String>,
    #[serde(default, alias = "validTo", deserialize_with = "optional_string")]
    valid_to: Option<String>,
}

impl RowDto for CombinedFreightRow {
    type Record = CombinedFreight;
    const TABLE: RateTable = RateTable::CombinedFreight;

    fn convert(self, ctx: &RowContext) -> Result<CombinedFreight, SnapshotLoadError> {
        Ok(CombinedFreight {
            id: ctx.text(self.id, "id")?,
            version: ctx.version(self.version)?,
            agent: ctx.text(self.agent, "agent")?,
            destination_port: ctx.text(self.destination_port, "destination_port")?,
            final_destination: ctx.text(self.final_destination, "final_destination")?,
            rate: ctx.amount(self.rate, "rate")?,
            valid_from: ctx.date(self.valid_from, "valid_from")?,
            valid_to: ctx.date(self.valid_to, "valid_to")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PortBorderRow {
    #[serde(default, deserialize_with = "optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    version: Option<f64>,
    #[serde(default, alias = "agentName", alias = "agent_name", deserialize_with = "optional_string")]
    agent: Option<String>,
    #[serde(default, alias = "pod", alias = "destinationPort", deserialize_with = "optional_string")]
    destination_port: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    rate: Option<f64>,
    #[serde(default, alias = "validFrom", deserialize_with = "optional_string")]
    valid_from: Option<String>,
    #[serde(default, alias = "validTo", deserialize_with = "optional_string")]
    valid_to: Option<String>,
}

impl RowDto for PortBorderRow {
    type Record = PortBorderFreight;
    const TABLE: RateTable = RateTable::PortBorderFreight;

    fn convert(self, ctx: &RowContext) -> Result<PortBorderFreight, SnapshotLoadError> {
        Ok(PortBorderFreight {
            id: ctx.text(self.id, "id")?,
            version: ctx.version(self.version)?,
            agent: ctx.text(self.agent, "agent")?,
            destination_port: ctx.text(self.destination_port, "destination_port")?,
            rate: ctx.amount(self.rate, "rate")?,
            valid_from: ctx.date(self.valid_from, "valid_from")?,
            valid_to: ctx.date(self.valid_to, "valid_to")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BorderDestinationRow {
    #[serde(default, deserialize_with = "optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    version: Option<f64>,
    #[serde(default, alias = "agentName", alias = "agent_name", deserialize_with = "optional_string")]
    agent: Option<String>,
    #[serde(
        default,
        alias = "finalDestination",
        alias = "final_destination_id",
        alias = "finalDestinationId",
        deserialize_with = "optional_string"
    )]
    final_destination: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    rate: Option<f64>,
    #[serde(default, alias = "validFrom", deserialize_with = "optional_string")]
    valid_from: Option<String>,
    #[serde(default, alias = "validTo", deserialize_with = "optional_string")]
    valid_to: Option<String>,
}

impl RowDto for BorderDestinationRow {
    type Record = BorderDestinationFreight;
    const TABLE: RateTable = RateTable::BorderDestinationFreight;

    fn convert(self, ctx: &RowContext) -> Result<BorderDestinationFreight, SnapshotLoadError> {
        Ok(BorderDestinationFreight {
            id: ctx.text(self.id, "id")?,
            version: ctx.version(self.version)?,
            agent: ctx.text(self.agent, "agent")?,
            final_destination: ctx.text(self.final_destination, "final_destination")?,
            rate: ctx.amount(self.rate, "rate")?,
            valid_from: ctx.date(self.valid_from, "valid_from")?,
            valid_to: ctx.date(self.valid_to, "valid_to")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WeightSurchargeRow {
    #[serde(default, deserialize_with = "optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    version: Option<f64>,
    #[serde(default, alias = "agentName", alias = "agent_name", deserialize_with = "optional_string")]
    agent: Option<String>,
    #[serde(default, alias = "minWeight", deserialize_with = "optional_number")]
    min_weight: Option<f64>,
    #[serde(default, alias = "maxWeight", deserialize_with = "optional_number")]
    max_weight: Option<f64>,
    #[serde(default, alias = "amount", deserialize_with = "optional_number")]
    surcharge: Option<f64>,
    #[serde(default, alias = "validFrom", deserialize_with = "optional_string")]
    valid_from: Option<String>,
    #[serde(default, alias = "validTo", deserialize_with = "optional_string")]
    valid_to: Option<String>,
}

impl RowDto for WeightSurchargeRow {
    type Record = WeightSurchargeRule;
    const TABLE: RateTable = RateTable::WeightSurcharge;

    fn convert(self, ctx: &RowContext) -> Result<WeightSurchargeRule, SnapshotLoadError> {
        let min_weight = ctx.amount(self.min_weight, "min_weight")?;
        let max_weight = ctx.amount(self.max_weight, "max_weight")?;
        if min_weight > max_weight {
            return Err(ctx.invalid(
                "max_weight",
                format!("{max_weight} is below min_weight {min_weight}"),
            ));
        }

        Ok(WeightSurchargeRule {
            id: ctx.text(self.id, "id")?,
            version: ctx.version(self.version)?,
            agent: ctx.text(self.agent, "agent")?,
            min_weight,
            max_weight,
            surcharge: ctx.amount(self.surcharge, "surcharge")?,
            valid_from: ctx.date(self.valid_from, "valid_from")?,
            valid_to: ctx.date(self.valid_to, "valid_to")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DpCostRow {
    #[serde(default, deserialize_with = "optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    version: Option<f64>,
    #[serde(default, alias = "pol", alias = "origin", deserialize_with = "optional_string")]
    port: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    amount: Option<f64>,
    #[serde(default, alias = "validFrom", deserialize_with = "optional_string")]
    valid_from: Option<String>,
    #[serde(default, alias = "validTo", deserialize_with = "optional_string")]
    valid_to: Option<String>,
}

impl RowDto for DpCostRow {
    type Record = DpCost;
    const TABLE: RateTable = RateTable::DpCost;

    fn convert(self, ctx: &RowContext) -> Result<DpCost, SnapshotLoadError> {
        Ok(DpCost {
            id: ctx.text(self.id, "id")?,
            version: ctx.version(self.version)?,
            port: ctx.text(self.port, "port")?,
            amount: ctx.amount(self.amount, "amount")?,
            valid_from: ctx.date(self.valid_from, "valid_from")?,
            valid_to: ctx.date(self.valid_to, "valid_to")?,
        })
    }
}

/// Accepts a string or a number; `null` gives `None`.
fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> de::Visitor<'de> for StringOrNumber {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, a number or null")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

/// Accepts a number or a numeric string. `null` and blank strings give `None`; `0` and
/// `"0"` give `Some(0.0)`.
fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberOrString;

    impl<'de> de::Visitor<'de> for NumberOrString {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, a numeric string or null")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let cleaned = value.trim().replace(',', "");
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(NumberOrString)
}
