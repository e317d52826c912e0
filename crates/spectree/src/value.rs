//! Literal argument values carried by table entries.

use std::fmt;
use std::ops::Deref;

/// A literal argument supplied by a table entry.
///
/// Entries only ever carry literals. Arguments a front-end cannot read as a
/// literal (a function call, a composite literal) are kept as [`Value::Expr`]
/// with their source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,
    /// A non-literal argument, kept verbatim.
    Expr(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Nil => f.write_str("nil"),
            Value::Expr(src) => f.write_str(src),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

// ============================================================================
// FromValue: typed access for bodies
// ============================================================================

/// Conversion from a bound [`Value`] back into a Rust type.
///
/// Returns `None` when the value has a different shape or does not fit.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(n) => <$t>::try_from(*n).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) | Value::Expr(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Nil => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// ============================================================================
// Arguments
// ============================================================================

/// The ordered argument list of one table entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Value>);

impl Arguments {
    pub fn new() -> Self {
        Arguments(Vec::new())
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Typed access to the argument at `index`.
    pub fn get<T: FromValue>(&self, index: usize) -> Option<T> {
        self.0.get(index).and_then(T::from_value)
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for Arguments {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Arguments(values)
    }
}

impl FromIterator<Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Arguments(iter.into_iter().collect())
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_go_verb_v() {
        let args = Arguments::from(vec![
            Value::from(-1),
            Value::from("two"),
            Value::from(true),
            Value::Nil,
            Value::from(2.5),
        ]);
        assert_eq!(args.to_string(), "-1, two, true, nil, 2.5");
    }

    #[test]
    fn test_typed_access() {
        let args = Arguments::from(vec![Value::from(100), Value::from("x")]);
        assert_eq!(args.get::<i32>(0), Some(100));
        assert_eq!(args.get::<u8>(0), Some(100));
        assert_eq!(args.get::<f64>(0), Some(100.0));
        assert_eq!(args.get::<String>(1), Some("x".to_string()));
        assert_eq!(args.get::<i32>(1), None);
        assert_eq!(args.get::<i32>(2), None);
    }

    #[test]
    fn test_out_of_range_int_does_not_convert() {
        assert_eq!(u8::from_value(&Value::Int(300)), None);
        assert_eq!(u32::from_value(&Value::Int(-1)), None);
    }

    #[test]
    fn test_option_maps_nil() {
        assert_eq!(Option::<i64>::from_value(&Value::Nil), Some(None));
        assert_eq!(Option::<i64>::from_value(&Value::Int(3)), Some(Some(3)));
        assert_eq!(Value::from(None::<i32>), Value::Nil);
    }
}
