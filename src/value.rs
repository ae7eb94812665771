use std::collections::BTreeMap;
use std::fmt::{ Display, Formatter, Result as FMTResult };

use crate::templ::library::Builtin;

/// A Lua flavoured dynamic value, used for lexer option tables and for the
/// data templates are rendered with.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Function(Builtin),
}

macro_rules! value_conversions {
    ($($convert:ident @ $for:ty => $code:expr;)*) => {
        $(
            impl From<$for> for Value {
                fn from($convert: $for) -> Self {
                    $code
                }
            }
        )*
    };
}

value_conversions! {
    b @ bool => Value::Boolean(b);
    i @ i32 => Value::Integer(i as i64);
    i @ i64 => Value::Integer(i);
    i @ u32 => Value::Integer(i as i64);
    f @ f64 => Value::Float(f);
    s @ &str => Value::String(s.to_string());
    s @ String => Value::String(s);
    list @ Vec<Value> => Value::List(list);
    map @ BTreeMap<String, Value> => Value::Map(map);
}

impl<K, V> FromIterator<(K, V)> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Value {
    /// Only `nil` and `false` are false.
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::List(_) | Value::Map(_) => "table",
            Value::Function(_) => "function",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integers, and floats with an exact integer representation.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(i) => Some(i),
            Value::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Some(f as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Integer(i) => Some(i as f64),
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Field lookup on maps.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Table indexing, lists are indexed from 1.
    pub fn index(&self, key: &Value) -> Option<&Value> {
        match (self, key) {
            (Value::Map(map), Value::String(key)) => map.get(key),
            (Value::Map(map), key) if key.as_float().is_some() => map.get(&key.to_string()),
            (Value::List(list), key) => {
                let i = key.as_integer()?;
                list.get(usize::try_from(i.checked_sub(1)?).ok()?)
            }

            _ => None,
        }
    }

    /// The `#` operator. For maps this is the border: the last `n` such that
    /// the keys `1` to `n` are all present.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.len()),
            Value::List(list) => Some(list.len()),
            Value::Map(map) => Some((1..).take_while(|n: &usize| map.contains_key(&n.to_string())).count()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => f.write_str(&format_float(*n)),
            Value::String(s) => f.write_str(s),
            Value::List(_) => f.write_str("list"),
            Value::Map(_) => f.write_str("map"),
            Value::Function(builtin) => write!(f, "function: {}", builtin),
        }
    }
}

// printf's %.14g, plus a ".0" when the result would read as an integer
fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }

    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    const PRECISION: i32 = 14;

    let sci = format!("{:.*e}", (PRECISION - 1) as usize, n);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp = exp.parse::<i32>().unwrap_or(0);

    let formatted = if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    }
    else {
        let decimals = (PRECISION - 1 - exp) as usize;
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    };

    if formatted.bytes().all(|c| c.is_ascii_digit() || c == b'-') {
        formatted + ".0"
    }
    else {
        formatted
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    }
    else {
        s
    }
}
