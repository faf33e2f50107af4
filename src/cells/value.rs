use std::fmt;
use std::net::IpAddr;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use ipnet::IpNet;

/// A field value as handed over by the model layer.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Cidr(IpNet),
    DateRange(NaiveDate, NaiveDate),
    Json(serde_json::Value),
}

impl FieldValue {
    /// Parses the textual form of a value of `field_type`.
    pub fn parse(field_type: &str, raw: &str) -> Result<Self> {
        let value = match field_type {
            "decimal" => {
                raw.trim()
                    .parse::<f64>()
                    .with_context(|| format!("invalid decimal '{raw}'"))?;
                FieldValue::Text(raw.trim().to_string())
            }
            "unsigned_bigint" => FieldValue::Unsigned(
                raw.trim()
                    .parse()
                    .with_context(|| format!("invalid unsigned bigint '{raw}'"))?,
            ),
            "unsigned_float" => FieldValue::Float(parse_unsigned_float(raw.trim())?),
            "cidr" => FieldValue::Cidr(parse_cidr(raw.trim())?),
            "daterange" => {
                let (from, to) = parse_daterange(raw.trim())?;
                FieldValue::DateRange(from, to)
            }
            "jsonb" | "json" => FieldValue::Json(
                serde_json::from_str(raw).with_context(|| format!("invalid json '{raw}'"))?,
            ),
            _ => FieldValue::Text(raw.to_string()),
        };
        Ok(value)
    }

    /// Numeric value as a float, text is parsed and falls back to zero.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Unsigned(u) => Some(*u as f64),
            FieldValue::Text(s) => Some(s.trim().parse().unwrap_or(0.0)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Unsigned(u) => write!(f, "{u}"),
            FieldValue::Float(v) => write!(f, "{v:?}"),
            FieldValue::Cidr(net) => write!(f, "{net}"),
            FieldValue::DateRange(from, to) => write!(f, "{from}...{to}"),
            FieldValue::Json(v) => write!(f, "{v}"),
        }
    }
}

fn parse_unsigned_float(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("invalid unsigned float '{raw}'"))?;
    if !value.is_finite() || value < 0.0 {
        bail!("invalid unsigned float '{raw}', expect a finite non-negative number");
    }
    Ok(value.abs())
}

/// Accepts `addr/prefix` or a bare address (a host network).
fn parse_cidr(raw: &str) -> Result<IpNet> {
    if let Ok(net) = raw.parse::<IpNet>() {
        return Ok(net);
    }
    let Ok(addr) = raw.parse::<IpAddr>() else {
        bail!("invalid cidr '{raw}'");
    };
    let prefix = if addr.is_ipv4() { 32 } else { 128 };
    IpNet::new(addr, prefix).with_context(|| format!("invalid cidr '{raw}'"))
}

/// Accepts `from...to` or `from..to` with ISO dates.
fn parse_daterange(raw: &str) -> Result<(NaiveDate, NaiveDate)> {
    let Some((from, to)) = raw.split_once("...").or_else(|| raw.split_once("..")) else {
        bail!("invalid date range '{raw}', expect 'from...to'");
    };
    let from = NaiveDate::parse_from_str(from.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid range start '{from}'"))?;
    let to = NaiveDate::parse_from_str(to.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid range end '{to}'"))?;
    if to < from {
        bail!("date range '{raw}' ends before it starts");
    }
    Ok((from, to))
}
