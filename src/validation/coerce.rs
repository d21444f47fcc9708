/// Lax value coercion against generated input types
///
/// # Coercion Rules
///
/// - `Int` / `BigInt`: integral numbers or integer strings
/// - `Float`: numbers or numeric strings
/// - `Decimal`: numbers, or numeric strings kept as exact decimal text
/// - `String`: strings, numbers are stringified
/// - `Boolean`: booleans, `0` / `1` and the usual yes/no words
/// - `ID`: strings or integers, always produced as a string
/// - `Date` / `DateTime` / `Time` / `UUID`: strings in the scalar's format
/// - enums: a permitted value name, as string or enum
/// - lists element-wise, nested inputs recursively

use crate::mapper::scalars::{
    BIG_INT, BOOLEAN, DATE, DATE_TIME, DECIMAL, FLOAT, ID, INT, INTERVAL, JSON, STRING, TIME, UUID,
};
use crate::mapper::SchemaType;
use crate::schema::{is_date, is_datetime, is_integer_string, is_time, is_uuid};
use crate::validation::error::FieldError;
use crate::validation::model::ValidationSchema;

use async_graphql::{Name, Value};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Coerce `value` to `ty`, recording failures under `loc`
pub(crate) fn coerce(
    schema: &ValidationSchema,
    ty: &SchemaType,
    value: &Value,
    loc: &[String],
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    match (ty, value) {
        (SchemaType::Optional(_), Value::Null) => Some(Value::Null),
        (SchemaType::Optional(inner), value) => coerce(schema, inner, value, loc, errors),
        (_, Value::Null) => fail(errors, loc, "none is not an allowed value"),
        (SchemaType::List(inner), Value::List(items)) => {
            let mut coerced = Vec::with_capacity(items.len());
            let mut ok = true;
            for (index, item) in items.iter().enumerate() {
                let mut item_loc = loc.to_vec();
                item_loc.push(index.to_string());
                match coerce(schema, inner, item, &item_loc, errors) {
                    Some(value) => coerced.push(value),
                    None => ok = false,
                }
            }
            ok.then_some(Value::List(coerced))
        }
        (SchemaType::List(_), _) => fail(errors, loc, "value is not a valid list"),
        (SchemaType::Named(name), value) => coerce_named(schema, name, value, loc, errors),
        (SchemaType::Pending(reference), _) => fail(errors, loc, &format!("unresolved type {}", reference)),
    }
}

fn coerce_named(
    schema: &ValidationSchema,
    name: &str,
    value: &Value,
    loc: &[String],
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    if let Some(values) = schema.enum_values(name) {
        let candidate = match value {
            Value::String(s) => Some(s.as_str()),
            Value::Enum(e) => Some(e.as_str()),
            _ => None,
        };
        return match candidate {
            Some(candidate) if values.iter().any(|v| v == candidate) => Some(Value::Enum(Name::new(candidate))),
            _ => {
                let permitted = values
                    .iter()
                    .map(|v| format!("'{}'", v))
                    .collect::<Vec<_>>()
                    .join(", ");
                fail(
                    errors,
                    loc,
                    &format!("value is not a valid enumeration member; permitted: {}", permitted),
                )
            }
        };
    }

    if schema.model(name).is_some() {
        return match value {
            Value::Object(fields) => match schema.validate_fields(name, fields, loc) {
                Ok((values, _)) => Some(Value::Object(values)),
                Err(nested) => {
                    errors.extend(nested);
                    None
                }
            },
            _ => fail(errors, loc, &format!("value is not a valid {}", name)),
        };
    }

    let coerced = match name {
        INT | BIG_INT => as_integer(value),
        FLOAT => as_float(value),
        DECIMAL => as_decimal(value),
        STRING => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            _ => None,
        },
        BOOLEAN => as_boolean(value),
        ID => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Value::String(n.to_string())),
            _ => None,
        },
        DATE => string_matching(value, is_date),
        DATE_TIME => string_matching(value, is_datetime),
        TIME => string_matching(value, is_time),
        UUID => string_matching(value, is_uuid),
        INTERVAL => matches!(value, Value::String(_) | Value::Number(_)).then(|| value.clone()),
        JSON => Some(value.clone()),
        other => return fail(errors, loc, &format!("unknown type {}", other)),
    };

    match coerced {
        Some(value) => Some(value),
        None => fail(errors, loc, type_error(name)),
    }
}

fn as_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| Value::Number((f as i64).into())),
        Value::String(s) if is_integer_string(s.trim()) => s.trim().parse::<i64>().ok().map(|i| Value::Number(i.into())),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => Decimal::from_str(s.trim())
            .ok()
            .map(|d| Value::String(d.to_string())),
        _ => None,
    }
}

fn as_boolean(value: &Value) -> Option<Value> {
    let parsed = match value {
        Value::Boolean(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.map(Value::Boolean)
}

fn string_matching(value: &Value, check: fn(&str) -> bool) -> Option<Value> {
    match value {
        Value::String(s) if check(s) => Some(value.clone()),
        _ => None,
    }
}

fn type_error(name: &str) -> &'static str {
    match name {
        INT | BIG_INT => "value is not a valid integer",
        FLOAT => "value is not a valid float",
        DECIMAL => "value is not a valid decimal",
        STRING => "str type expected",
        BOOLEAN => "value could not be parsed to a boolean",
        ID => "value is not a valid identifier",
        DATE => "invalid date format",
        DATE_TIME => "invalid datetime format",
        TIME => "invalid time format",
        UUID => "value is not a valid uuid",
        _ => "value is not a valid duration",
    }
}

fn fail(errors: &mut Vec<FieldError>, loc: &[String], msg: &str) -> Option<Value> {
    errors.push(FieldError::new(loc.to_vec(), msg));
    None
}

/// Object fields as a name-keyed map
pub(crate) fn object_fields(value: &Value) -> Option<&IndexMap<Name, Value>> {
    match value {
        Value::Object(fields) => Some(fields),
        _ => None,
    }
}
