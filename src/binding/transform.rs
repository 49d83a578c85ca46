//! Pure data-shaping functions used by module transforms
//!
//! Nested lookup, field mapping, aggregation and display formatting over
//! `serde_json::Value`. Nothing here touches module state.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Bucket used by `group` when an item has no usable key.
pub const UNKNOWN_GROUP: &str = "unknown";

const DEFAULT_DATE_PATTERN: &str = "%Y/%m/%d %H:%M:%S";

/// `target_key -> source dot path`
pub type Mapping = BTreeMap<String, String>;
pub type AggregateRules = BTreeMap<String, AggregateRule>;
pub type FormatRules = BTreeMap<String, FormatRule>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AggregateRule {
    /// Number of items.
    Count,
    /// Sum of a numeric field; missing or non-numeric values count as 0.
    Sum { field: String },
    /// Items bucketed by the value of a field.
    Group { field: String },
    /// Items matching a condition.
    Filter { condition: Condition },
    /// Any other rule type: the items themselves.
    #[serde(other)]
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Equals,
    Contains,
    Greater,
    Less,
    /// Unknown operators match everything.
    #[serde(other)]
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormatRule {
    /// `round(value / total * 100)`
    Percentage { total: f64 },
    /// Yuan amount with thousands separators and two decimals.
    Currency,
    /// Local date-time string; `pattern` uses chrono's strftime syntax.
    Date {
        #[serde(default)]
        pattern: Option<String>,
    },
    /// Thousands separators, at most three decimals.
    Number,
    /// Any other rule type leaves the value unchanged.
    #[serde(other)]
    Unrecognized,
}

/// Resolves a dot-separated path. Objects are indexed by key, arrays by position.
///
/// Returns `None` at the first link that does not resolve.
pub fn get_nested_value<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Builds a new object from `mapping`; unresolved paths leave their key out.
pub fn map_data(data: &Value, mapping: Option<&Mapping>) -> Value {
    let Some(mapping) = mapping else {
        return data.clone();
    };

    let mut result = Map::new();
    for (target_key, source_path) in mapping {
        if let Some(value) = get_nested_value(data, source_path) {
            result.insert(target_key.clone(), value.clone());
        }
    }
    Value::Object(result)
}

/// Applies every named rule to `items`, producing one key per rule.
pub fn aggregate_data(items: &[Value], rules: Option<&AggregateRules>) -> Value {
    let Some(rules) = rules else {
        return Value::Array(items.to_vec());
    };

    let mut result = Map::new();
    for (key, rule) in rules {
        let value = match rule {
            AggregateRule::Count => Value::from(items.len()),
            AggregateRule::Sum { field } => number_value(
                items
                    .iter()
                    .map(|item| get_nested_value(item, field).and_then(as_number).unwrap_or(0.0))
                    .sum(),
            ),
            AggregateRule::Group { field } => group_by(items, field),
            AggregateRule::Filter { condition } => Value::Array(
                items
                    .iter()
                    .filter(|item| evaluate_condition(item, condition))
                    .cloned()
                    .collect(),
            ),
            AggregateRule::Passthrough => Value::Array(items.to_vec()),
        };
        result.insert(key.clone(), value);
    }
    Value::Object(result)
}

/// Buckets items by the value at `field`, in first-seen order.
pub fn group_by(items: &[Value], field: &str) -> Value {
    let mut groups: Map<String, Value> = Map::new();
    for item in items {
        let key = group_key(get_nested_value(item, field));
        match groups.get_mut(&key) {
            Some(Value::Array(bucket)) => bucket.push(item.clone()),
            _ => {
                groups.insert(key, Value::Array(vec![item.clone()]));
            }
        }
    }
    Value::Object(groups)
}

fn group_key(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN_GROUP.to_string(),
        Some(Value::String(s)) if s.is_empty() => UNKNOWN_GROUP.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn evaluate_condition(item: &Value, condition: &Condition) -> bool {
    let value = get_nested_value(item, &condition.field);
    match condition.operator {
        Operator::Equals => value.is_some_and(|v| values_equal(v, &condition.value)),
        Operator::Contains => stringify(value).contains(&display_text(&condition.value)),
        Operator::Greater => compare(value, &condition.value) == Some(Ordering::Greater),
        Operator::Less => compare(value, &condition.value) == Some(Ordering::Less),
        Operator::Any => true,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn compare(left: Option<&Value>, right: &Value) -> Option<Ordering> {
    match (left?, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// String form of a possibly-missing value; a missing value reads "undefined".
fn stringify(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(v) => display_text(v),
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Formats the listed keys of an object. Absent keys and non-object data pass through.
pub fn format_data(data: &Value, rules: Option<&FormatRules>) -> Value {
    let (Some(rules), Value::Object(object)) = (rules, data) else {
        return data.clone();
    };

    let mut result = object.clone();
    for (key, rule) in rules {
        let Some(current) = result.get(key) else {
            continue;
        };
        if let Some(formatted) = format_value(current, rule) {
            result.insert(key.clone(), formatted);
        }
    }
    Value::Object(result)
}

fn format_value(value: &Value, rule: &FormatRule) -> Option<Value> {
    match rule {
        FormatRule::Percentage { total } => {
            if *total == 0.0 {
                return None;
            }
            let ratio = as_number(value)? / total * 100.0;
            Some(number_value((ratio + 0.5).floor()))
        }
        FormatRule::Currency => as_number(value).map(|n| Value::String(format_currency(n))),
        FormatRule::Date { pattern } => {
            format_date(value, pattern.as_deref().unwrap_or(DEFAULT_DATE_PATTERN))
                .map(Value::String)
        }
        FormatRule::Number => as_number(value).map(|n| Value::String(format_number(n))),
        FormatRule::Unrecognized => None,
    }
}

/// Numeric reading of a value; numeric strings are accepted.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Integral floats become JSON integers so `3.0` compares equal to `3`.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}¥{}.{}", sign, group_thousands(int_part), frac_part)
}

pub fn format_number(n: f64) -> String {
    let sign = if n < 0.0 { "-" } else { "" };
    let fixed = format!("{:.3}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Accepts epoch milliseconds, RFC 3339, naive ISO date-times and plain dates.
/// Zoned inputs are shown in local time; naive inputs are taken as local already.
pub fn format_date(value: &Value, pattern: &str) -> Option<String> {
    parse_date(value).map(|date| date.format(pattern).to_string())
}

/// Reads a timestamp in any of the layouts `format_date` accepts.
pub fn parse_date(value: &Value) -> Option<DateTime<Local>> {
    match value {
        Value::Number(n) => {
            let millis = n.as_f64()? as i64;
            let utc = DateTime::from_timestamp_millis(millis)?;
            Some(utc.with_timezone(&Local))
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(zoned) = DateTime::parse_from_rfc3339(s) {
                return Some(zoned.with_timezone(&Local));
            }
            let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()?
                        .and_hms_opt(0, 0, 0)
                })?;
            Local.from_local_datetime(&naive).earliest()
        }
        _ => None,
    }
}
