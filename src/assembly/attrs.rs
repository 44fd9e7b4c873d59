/// Decoding of auxiliary tag values into per-category statistics.
///
/// Attributes written by a different toolchain may come back as any integer
/// array width, or as a bare scalar for a single category, so the accessors
/// here accept all of them and fall back to zero for anything absent.
use noodles::sam::alignment::record_buf::data::field::value::Array;
use noodles::sam::alignment::record_buf::data::field::Value;

use crate::assembly::tags;

/// Decode an integer scalar-or-array value into a list. Absent or
/// non-numeric values decode as empty.
pub fn as_int_list(value: Option<&Value>) -> Vec<i32> {
    match value {
        Some(Value::Int8(v)) => vec![i32::from(*v)],
        Some(Value::UInt8(v)) => vec![i32::from(*v)],
        Some(Value::Int16(v)) => vec![i32::from(*v)],
        Some(Value::UInt16(v)) => vec![i32::from(*v)],
        Some(Value::Int32(v)) => vec![*v],
        Some(Value::UInt32(v)) => vec![*v as i32],
        Some(Value::Array(Array::Int8(v))) => v.iter().map(|&x| i32::from(x)).collect(),
        Some(Value::Array(Array::UInt8(v))) => v.iter().map(|&x| i32::from(x)).collect(),
        Some(Value::Array(Array::Int16(v))) => v.iter().map(|&x| i32::from(x)).collect(),
        Some(Value::Array(Array::UInt16(v))) => v.iter().map(|&x| i32::from(x)).collect(),
        Some(Value::Array(Array::Int32(v))) => v.clone(),
        Some(Value::Array(Array::UInt32(v))) => v.iter().map(|&x| x as i32).collect(),
        _ => Vec::new(),
    }
}

/// Decode a float scalar-or-array value into a list. Integer payloads are
/// widened; absent values decode as empty.
pub fn as_float_list(value: Option<&Value>) -> Vec<f32> {
    match value {
        Some(Value::Float(v)) => vec![*v],
        Some(Value::Array(Array::Float(v))) => v.clone(),
        Some(other) => as_int_list(Some(other)).iter().map(|&x| x as f32).collect(),
        None => Vec::new(),
    }
}

/// Element of an integer array attribute, or `default` when the attribute is
/// absent or shorter than `index + 1`.
pub fn as_int_at(value: Option<&Value>, index: usize, default: i32) -> i32 {
    as_int_list(value).get(index).copied().unwrap_or(default)
}

/// Element of a float array attribute, or `default` when absent or short.
pub fn as_float_at(value: Option<&Value>, index: usize, default: f32) -> f32 {
    as_float_list(value).get(index).copied().unwrap_or(default)
}

/// Scalar float attribute with default.
pub fn as_f64(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(Value::Float(v)) => f64::from(*v),
        Some(other) => as_int_list(Some(other))
            .first()
            .map(|&x| f64::from(x))
            .unwrap_or(default),
        None => default,
    }
}

/// Masked sum over an integer array attribute: entries are included where the
/// mask is true; entries beyond the mask length are excluded.
pub fn masked_int_sum(value: Option<&Value>, mask: &[bool]) -> i32 {
    as_int_list(value)
        .iter()
        .zip(mask.iter())
        .filter(|(_, &keep)| keep)
        .map(|(&x, _)| x)
        .sum()
}

/// Masked sum over a float array attribute, same semantics as
/// [`masked_int_sum`].
pub fn masked_float_sum(value: Option<&Value>, mask: &[bool]) -> f32 {
    as_float_list(value)
        .iter()
        .zip(mask.iter())
        .filter(|(_, &keep)| keep)
        .map(|(&x, _)| x)
        .sum()
}

/// Split an encoded ID string into per-category token lists, preserving
/// empty category slots.
pub fn split_categories(encoded: &str) -> Vec<Vec<&str>> {
    encoded
        .split(tags::ID_CATEGORY_SEPARATOR)
        .map(|category| {
            category
                .split(tags::ID_COMPONENT_SEPARATOR)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .collect()
}

/// Join per-category token lists into the encoded ID string. Tokens within a
/// category must already be in their final order.
pub fn join_categories<S: AsRef<str>>(categories: &[Vec<S>]) -> String {
    categories
        .iter()
        .map(|tokens| {
            tokens
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(tags::ID_COMPONENT_SEPARATOR)
        })
        .collect::<Vec<_>>()
        .join(tags::ID_CATEGORY_SEPARATOR)
}
