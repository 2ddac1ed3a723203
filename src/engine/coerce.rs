//! String-to-typed-value coercion

use std::str::FromStr;

use crate::model::{TypedValue, ValueKind};

/// Separates the elements of an array cell
pub const ELEMENT_DELIMITER: char = ',';

/// Separates the groups of an array-of-arrays cell
pub const GROUP_DELIMITER: char = ';';

/// Coerce a raw cell into a typed value.
///
/// Never fails: numeric or boolean text that does not parse becomes the
/// zero value of its kind.
pub fn coerce(kind: ValueKind, raw: &str) -> TypedValue {
    match kind.element_kind() {
        Some(element) if kind.is_array_array() => TypedValue::List(
            raw.split(GROUP_DELIMITER)
                .map(|group| split_elements(element, group))
                .collect(),
        ),
        Some(element) => split_elements(element, raw),
        None => coerce_scalar(kind, raw),
    }
}

fn split_elements(element: ValueKind, raw: &str) -> TypedValue {
    TypedValue::List(
        raw.split(ELEMENT_DELIMITER)
            .map(|piece| coerce_scalar(element, piece))
            .collect(),
    )
}

fn coerce_scalar(kind: ValueKind, raw: &str) -> TypedValue {
    match kind {
        ValueKind::Bool => TypedValue::Bool(parse_bool(raw)),
        ValueKind::Int8 => TypedValue::I8(parse_or_zero(raw)),
        ValueKind::Uint8 => TypedValue::U8(parse_or_zero(raw)),
        ValueKind::Int16 => TypedValue::I16(parse_or_zero(raw)),
        ValueKind::Uint16 => TypedValue::U16(parse_or_zero(raw)),
        ValueKind::Int32 => TypedValue::I32(parse_or_zero(raw)),
        ValueKind::Uint32 => TypedValue::U32(parse_or_zero(raw)),
        ValueKind::Int64 => TypedValue::I64(parse_or_zero(raw)),
        ValueKind::Uint64 => TypedValue::U64(parse_or_zero(raw)),
        ValueKind::Float32 => TypedValue::F32(parse_or_zero(raw)),
        ValueKind::Float64 => TypedValue::F64(parse_or_zero(raw)),
        _ => TypedValue::Str(raw.to_string()),
    }
}

/// `"0"` and `"1"` map directly; otherwise `true`/`false` in any case.
pub fn parse_bool(raw: &str) -> bool {
    match raw {
        "0" => false,
        "1" => true,
        other => other.trim().eq_ignore_ascii_case("true"),
    }
}

fn parse_or_zero<T>(raw: &str) -> T
where
    T: FromStr + Default,
{
    raw.trim().parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(coerce(ValueKind::Int32, "42"), TypedValue::I32(42));
        assert_eq!(coerce(ValueKind::Int8, " -7 "), TypedValue::I8(-7));
        assert_eq!(coerce(ValueKind::Uint64, "18446744073709551615"), TypedValue::U64(u64::MAX));
        assert_eq!(coerce(ValueKind::Float64, "2.5"), TypedValue::F64(2.5));
        assert_eq!(coerce(ValueKind::RawString, " keep "), TypedValue::from(" keep "));
    }

    #[test]
    fn test_malformed_numbers_zero_fill() {
        assert_eq!(coerce(ValueKind::Int32, "abc"), TypedValue::I32(0));
        assert_eq!(coerce(ValueKind::Uint8, "300"), TypedValue::U8(0));
        assert_eq!(coerce(ValueKind::Uint16, "-1"), TypedValue::U16(0));
        assert_eq!(coerce(ValueKind::Int32, "1.5"), TypedValue::I32(0));
        assert_eq!(coerce(ValueKind::Float32, ""), TypedValue::F32(0.0));
    }

    #[test]
    fn test_bool_rules() {
        assert_eq!(coerce(ValueKind::Bool, "1"), TypedValue::Bool(true));
        assert_eq!(coerce(ValueKind::Bool, "0"), TypedValue::Bool(false));
        assert_eq!(coerce(ValueKind::Bool, "True"), TypedValue::Bool(true));
        assert_eq!(coerce(ValueKind::Bool, "false"), TypedValue::Bool(false));
        assert_eq!(coerce(ValueKind::Bool, "yes"), TypedValue::Bool(false));
    }

    #[test]
    fn test_array() {
        assert_eq!(
            coerce(ValueKind::Int32Array, "1,2,3"),
            TypedValue::from(vec![1, 2, 3])
        );
        assert_eq!(
            coerce(ValueKind::StringArray, "a,,b"),
            TypedValue::from(vec!["a", "", "b"])
        );
        assert_eq!(
            coerce(ValueKind::Int16Array, "4,x"),
            TypedValue::List(vec![TypedValue::I16(4), TypedValue::I16(0)])
        );
    }

    #[test]
    fn test_empty_array_has_one_element() {
        assert_eq!(
            coerce(ValueKind::Int32Array, ""),
            TypedValue::List(vec![TypedValue::I32(0)])
        );
    }

    #[test]
    fn test_array_array() {
        assert_eq!(
            coerce(ValueKind::IntArrayArray, "1,2;3,4"),
            TypedValue::List(vec![
                TypedValue::from(vec![1i64, 2]),
                TypedValue::from(vec![3i64, 4]),
            ])
        );
        assert_eq!(
            coerce(ValueKind::StringArrayArray, "a;b,c"),
            TypedValue::List(vec![
                TypedValue::from(vec!["a"]),
                TypedValue::from(vec!["b", "c"]),
            ])
        );
        assert_eq!(
            coerce(ValueKind::Float64ArrayArray, "0.5;1"),
            TypedValue::List(vec![
                TypedValue::from(vec![0.5]),
                TypedValue::from(vec![1.0]),
            ])
        );
    }
}
