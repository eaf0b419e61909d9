// src/process/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, trace};

use super::dataset::{NormalizedRecord, PositionDataset, Value};
use super::raw_table::{Header, RawTable};
use crate::error::{Result, ScrapeError};
use crate::position::PositionCode;

pub const PLAYER: &str = "player";
pub const PERCENT_ROSTERED: &str = "percent_rostered";

/// Source key → canonical key. Group-qualified and bare variants converge.
static CANONICAL_RENAMES: &[(&str, &str)] = &[
    ("misc_fl", "fumbles_lost"),
    ("misc_g", "games_played"),
    ("misc_fpts", "fantasy_points"),
    ("misc_fpts/g", "fantasy_points_per_game"),
    ("misc_rost", PERCENT_ROSTERED),
    ("fl", "fumbles_lost"),
    ("g", "games_played"),
    ("fpts", "fantasy_points"),
    ("fpts/g", "fantasy_points_per_game"),
    ("rost", PERCENT_ROSTERED),
];

/// Flattened keys that never reach the output.
static DROPPED_KEYS: &[&str] = &["rank", "position", "position_"];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

fn key_part(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), "_").to_lowercase()
}

/// `(category, field)` → `category_field`, lower-cased. A blank category
/// (the unnamed group over `Rank`/`Player`) yields just the field.
pub fn flatten_header(header: &Header) -> String {
    match header {
        Header::Single(field) => key_part(field),
        Header::Compound { category, field } if category.trim().is_empty() => key_part(field),
        Header::Compound { category, field } => {
            format!("{}_{}", key_part(category), key_part(field))
        }
    }
}

/// Map a flattened key to its canonical name; unknown keys pass through.
pub fn canonical_name(key: &str) -> &str {
    CANONICAL_RENAMES
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or(key)
}

fn is_dropped(header: &Header, key: &str) -> bool {
    DROPPED_KEYS.contains(&key)
        || DROPPED_KEYS.contains(&key_part(header.field()).as_str())
}

fn is_identity(header: &Header) -> bool {
    key_part(header.field()) == PLAYER
}

/// Strip a trailing `%` and parse. Blank cells are missing, not errors.
pub fn coerce_percent(raw: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    if digits.is_empty() {
        return Ok(None);
    }
    let value: f64 = digits
        .parse()
        .map_err(|_| ScrapeError::coercion(PERCENT_ROSTERED, raw))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ScrapeError::coercion(PERCENT_ROSTERED, raw));
    }
    Ok(Some(value))
}

/// Drop `,` thousands separators from a numeric cell (`"4,306"` → `"4306"`).
/// Anything that isn't a number once the commas are gone is returned as-is.
pub fn strip_thousands(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.contains(',') {
        return raw.to_string();
    }
    let digits: String = trimmed.chars().filter(|c| *c != ',').collect();
    if digits.parse::<f64>().is_ok() {
        digits
    } else {
        raw.to_string()
    }
}

/// Which source column feeds each output column, and under what name.
fn plan_columns(headers: &[Header], position: PositionCode) -> Result<Vec<(usize, String)>> {
    let mut plan = Vec::with_capacity(headers.len());
    let mut seen = HashSet::new();

    for (idx, header) in headers.iter().enumerate() {
        let key = flatten_header(header);
        if is_dropped(header, &key) {
            trace!(column = %key, "dropping column");
            continue;
        }

        let mut name = if is_identity(header) {
            PLAYER.to_string()
        } else {
            canonical_name(&key).to_string()
        };
        if position == PositionCode::DST && name == PLAYER {
            name = position.identity_column().to_string();
        }

        if !seen.insert(name.clone()) {
            return Err(ScrapeError::parse(format!(
                "{} table has more than one column named {}",
                position, name
            )));
        }
        plan.push((idx, name));
    }

    Ok(plan)
}

/// Canonicalize one raw table.
pub fn normalize(table: &RawTable) -> Result<PositionDataset> {
    let plan = plan_columns(&table.headers, table.position)?;
    let identity = table.position.identity_column();
    let columns: Vec<String> = plan.iter().map(|(_, name)| name.clone()).collect();
    let mut dataset = PositionDataset::new(table.position, columns);

    for row in &table.rows {
        let mut fields = Vec::with_capacity(plan.len());
        for (idx, name) in &plan {
            let value = match row.get(*idx) {
                None => Value::Null,
                Some(cell) if name == PERCENT_ROSTERED => {
                    coerce_percent(cell)?.map(Value::Number).unwrap_or(Value::Null)
                }
                Some(cell) if name == identity => Value::Text(cell.clone()),
                Some(cell) => Value::Text(strip_thousands(cell)),
            };
            fields.push((name.clone(), value));
        }
        dataset.records.push(NormalizedRecord::new(fields));
    }

    debug!(
        position = %table.position,
        rows = dataset.len(),
        columns = dataset.columns.len(),
        "normalized table"
    );
    Ok(dataset)
}

/// Normalize several tables for the same position and concatenate them in order.
pub fn normalize_all(position: PositionCode, tables: &[RawTable]) -> Result<PositionDataset> {
    let mut out: Option<PositionDataset> = None;

    for table in tables {
        if table.position != position {
            return Err(ScrapeError::parse(format!(
                "{} table passed while building {} dataset",
                table.position, position
            )));
        }
        let ds = normalize(table)?;
        match out.as_mut() {
            None => out = Some(ds),
            Some(acc) if acc.columns == ds.columns => acc.records.extend(ds.records),
            Some(acc) => {
                return Err(ScrapeError::parse(format!(
                    "{} tables disagree on columns: {:?} vs {:?}",
                    position, acc.columns, ds.columns
                )))
            }
        }
    }

    out.ok_or_else(|| ScrapeError::parse(format!("no tables for {}", position)))
}
