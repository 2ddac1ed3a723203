//! Typed cell values produced by coercion

/// A coerced cell value.
///
/// Scalars keep their declared width so encoders can lay them out
/// without consulting the field kind again.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Str(String),
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    List(Vec<TypedValue>),
}

impl TypedValue {
    /// Convert to a JSON value.
    ///
    /// `f32` goes through its shortest decimal text so `0.1` stays `0.1`
    /// instead of widening to `0.10000000149011612`. Non-finite floats
    /// become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            TypedValue::Str(s) => Value::String(s.clone()),
            TypedValue::Bool(b) => Value::Bool(*b),
            TypedValue::I8(v) => Value::from(*v),
            TypedValue::U8(v) => Value::from(*v),
            TypedValue::I16(v) => Value::from(*v),
            TypedValue::U16(v) => Value::from(*v),
            TypedValue::I32(v) => Value::from(*v),
            TypedValue::U32(v) => Value::from(*v),
            TypedValue::I64(v) => Value::from(*v),
            TypedValue::U64(v) => Value::from(*v),
            TypedValue::F32(v) => {
                let widened = v.to_string().parse::<f64>().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(widened)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            TypedValue::F64(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            TypedValue::List(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::Str(s.to_string())
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        TypedValue::Bool(b)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        TypedValue::I32(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::I64(v)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        TypedValue::F64(v)
    }
}

impl<T> From<Vec<T>> for TypedValue
where
    T: Into<TypedValue>,
{
    fn from(items: Vec<T>) -> Self {
        TypedValue::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_json_scalars() {
        assert_eq!(TypedValue::I8(-3).to_json(), json!(-3));
        assert_eq!(TypedValue::U64(u64::MAX).to_json(), json!(u64::MAX));
        assert_eq!(TypedValue::Bool(true).to_json(), json!(true));
        assert_eq!(TypedValue::from("abc").to_json(), json!("abc"));
    }

    #[test]
    fn test_f32_keeps_short_decimal() {
        assert_eq!(TypedValue::F32(0.1).to_json(), json!(0.1));
        assert_eq!(TypedValue::F32(f32::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_nested_list() {
        let value = TypedValue::List(vec![
            TypedValue::from(vec![1, 2]),
            TypedValue::from(vec![3]),
        ]);
        assert_eq!(value.to_json(), json!([[1, 2], [3]]));
    }
}
