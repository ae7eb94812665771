//! The functions template code can call: `tostring`, `tonumber`, `type`
//! and parts of the `string`, `table` and `math` libraries. Strings also
//! reach the `string` functions as methods, as in `name:upper()`.

use std::fmt::{ Display, Formatter, Result as FMTResult };

use crate::value::Value;

type Result<T> = std::result::Result<T, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    ToString,
    ToNumber,
    Type,
    StringUpper,
    StringLower,
    StringLen,
    StringRep,
    StringSub,
    StringFormat,
    TableConcat,
    MathFloor,
    MathCeil,
    MathMax,
    MathMin,
    MathAbs,
}

const STRING: &[(&str, Builtin)] = &[
    ("format", Builtin::StringFormat),
    ("len", Builtin::StringLen),
    ("lower", Builtin::StringLower),
    ("rep", Builtin::StringRep),
    ("sub", Builtin::StringSub),
    ("upper", Builtin::StringUpper),
];

const TABLE: &[(&str, Builtin)] = &[
    ("concat", Builtin::TableConcat),
];

const MATH: &[(&str, Builtin)] = &[
    ("abs", Builtin::MathAbs),
    ("ceil", Builtin::MathCeil),
    ("floor", Builtin::MathFloor),
    ("max", Builtin::MathMax),
    ("min", Builtin::MathMin),
];

impl Builtin {
    /// The name used in argument errors.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::ToString => "tostring",
            Builtin::ToNumber => "tonumber",
            Builtin::Type => "type",
            Builtin::StringUpper => "upper",
            Builtin::StringLower => "lower",
            Builtin::StringLen => "len",
            Builtin::StringRep => "rep",
            Builtin::StringSub => "sub",
            Builtin::StringFormat => "format",
            Builtin::TableConcat => "concat",
            Builtin::MathFloor => "floor",
            Builtin::MathCeil => "ceil",
            Builtin::MathMax => "max",
            Builtin::MathMin => "min",
            Builtin::MathAbs => "abs",
        }
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
        write!(f, "builtin: {}", self.name())
    }
}

fn library(functions: &[(&str, Builtin)]) -> Value {
    functions
        .iter()
        .map(|(name, builtin)| (*name, Value::Function(*builtin)))
        .collect()
}

/// A global name that is not bound by the template or its arguments.
pub fn global(name: &str) -> Option<Value> {
    let value = match name {
        "tostring" => Value::Function(Builtin::ToString),
        "tonumber" => Value::Function(Builtin::ToNumber),
        "type" => Value::Function(Builtin::Type),
        "string" => library(STRING),
        "table" => library(TABLE),

        "math" => {
            let mut math = library(MATH);

            if let Value::Map(map) = &mut math {
                map.insert("huge".to_string(), Value::Float(f64::INFINITY));
                map.insert("pi".to_string(), Value::Float(std::f64::consts::PI));
            }

            math
        }

        _ => return None,
    };

    Some(value)
}

/// `s:name(...)` and `s.name` on a string.
pub fn string_method(name: &str) -> Option<Builtin> {
    STRING.iter().find(|(n, _)| *n == name).map(|(_, builtin)| *builtin)
}

/// Numbers as they are, and strings that read as numbers.
pub fn to_number(value: &Value) -> Option<Value> {
    match value {
        Value::Integer(_) | Value::Float(_) => Some(value.clone()),

        Value::String(s) => {
            let s = s.trim();

            // "inf" and "nan" are not numerals
            if !s.bytes().any(|c| c.is_ascii_digit()) {
                return None;
            }

            s.parse::<i64>()
                .map(Value::Integer)
                .or_else(|_| s.parse::<f64>().map(Value::Float))
                .ok()
        }

        _ => None,
    }
}

struct Args<'v> {
    function: Builtin,
    values: &'v [Value],
}

impl<'v> Args<'v> {
    fn bad(&self, n: usize, message: String) -> String {
        format!("bad argument #{} to '{}' ({})", n, self.function.name(), message)
    }

    fn got(&self, n: usize) -> &'static str {
        match self.values.get(n - 1) {
            Some(value) => value.type_name(),
            None => "no value",
        }
    }

    fn any(&self, n: usize) -> Result<&'v Value> {
        self.values.get(n - 1).ok_or_else(|| self.bad(n, "value expected".to_string()))
    }

    // numbers are accepted where strings are
    fn string(&self, n: usize) -> Result<String> {
        match self.values.get(n - 1) {
            Some(v @ (Value::String(_) | Value::Integer(_) | Value::Float(_))) => Ok(v.to_string()),
            _ => Err(self.bad(n, format!("string expected, got {}", self.got(n)))),
        }
    }

    fn number(&self, n: usize) -> Result<Value> {
        self.values
            .get(n - 1)
            .and_then(to_number)
            .ok_or_else(|| self.bad(n, format!("number expected, got {}", self.got(n))))
    }

    fn integer(&self, n: usize) -> Result<i64> {
        self.number(n)?
            .as_integer()
            .ok_or_else(|| self.bad(n, "number has no integer representation".to_string()))
    }

    fn opt_integer(&self, n: usize, default: i64) -> Result<i64> {
        match self.values.get(n - 1) {
            None | Some(Value::Nil) => Ok(default),
            Some(_) => self.integer(n),
        }
    }

    fn opt_string(&self, n: usize, default: &str) -> Result<String> {
        match self.values.get(n - 1) {
            None | Some(Value::Nil) => Ok(default.to_string()),
            Some(_) => self.string(n),
        }
    }
}

pub fn call(function: Builtin, values: &[Value]) -> Result<Value> {
    let args = Args { function, values };

    match function {
        Builtin::ToString => Ok(Value::String(args.any(1)?.to_string())),
        Builtin::ToNumber => Ok(to_number(args.any(1)?).unwrap_or_default()),
        Builtin::Type => Ok(Value::from(args.any(1)?.type_name())),

        Builtin::StringUpper => Ok(Value::String(args.string(1)?.to_ascii_uppercase())),
        Builtin::StringLower => Ok(Value::String(args.string(1)?.to_ascii_lowercase())),
        Builtin::StringLen => Ok(Value::Integer(args.string(1)?.len() as i64)),

        Builtin::StringRep => {
            let s = args.string(1)?;
            let n = args.integer(2)?;
            let sep = args.opt_string(3, "")?;

            let count = usize::try_from(n).unwrap_or(0);
            Ok(Value::String(vec![s; count].join(&sep)))
        }

        Builtin::StringSub => {
            let s = args.string(1)?;
            let len = s.len() as i64;

            let i = match args.opt_integer(2, 1)? {
                i if i < 0 => (len + i + 1).max(1),
                0 => 1,
                i => i,
            };

            let j = match args.opt_integer(3, -1)? {
                j if j < 0 => len + j + 1,
                j => j.min(len),
            };

            if i > j {
                return Ok(Value::from(""));
            }

            let bytes = &s.as_bytes()[(i - 1) as usize..j as usize];
            Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
        }

        Builtin::StringFormat => format(&args),

        Builtin::TableConcat => {
            let table = match values.first() {
                Some(table @ (Value::List(_) | Value::Map(_))) => table,
                _ => return Err(args.bad(1, format!("table expected, got {}", args.got(1)))),
            };

            let sep = args.opt_string(2, "")?;
            let first = args.opt_integer(3, 1)?;
            let last = args.opt_integer(4, table.len().unwrap_or(0) as i64)?;

            let mut pieces = Vec::new();

            for i in first..=last {
                match table.index(&Value::Integer(i)) {
                    Some(v @ (Value::String(_) | Value::Integer(_) | Value::Float(_))) => pieces.push(v.to_string()),
                    _ => return Err(format!("invalid value (at index {}) in table for 'concat'", i)),
                }
            }

            Ok(Value::String(pieces.join(&sep)))
        }

        Builtin::MathFloor | Builtin::MathCeil => match args.number(1)? {
            Value::Float(f) => {
                let rounded = if function == Builtin::MathFloor { f.floor() } else { f.ceil() };
                Ok(Value::Float(rounded).as_integer().map(Value::Integer).unwrap_or(Value::Float(rounded)))
            }

            n => Ok(n),
        },

        Builtin::MathAbs => match args.number(1)? {
            Value::Integer(i) => Ok(Value::Integer(i.wrapping_abs())),
            n => Ok(Value::Float(n.as_float().unwrap_or_default().abs())),
        },

        Builtin::MathMax | Builtin::MathMin => {
            let mut best = args.number(1)?;

            for n in 2..=values.len() {
                let candidate = args.number(n)?;
                let (a, b) = (candidate.as_float().unwrap_or_default(), best.as_float().unwrap_or_default());

                let better = if function == Builtin::MathMax { a > b } else { a < b };

                if better {
                    best = candidate;
                }
            }

            Ok(best)
        }
    }
}

// %d %i %u %c %x %X %o %f %F %s %%, with flags, width and precision
fn format(args: &Args<'_>) -> Result<Value> {
    let template = args.string(1)?;
    let mut out = String::new();
    let mut n = 1;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        if chars.next_if_eq(&'%').is_some() {
            out.push('%');
            continue;
        }

        let mut flags = String::new();
        while let Some(flag) = chars.next_if(|&c| matches!(c, '-' | '0' | '+' | ' ' | '#')) {
            flags.push(flag);
        }

        let mut width = 0;
        while let Some(d) = chars.next_if(|c| c.is_ascii_digit()) {
            width = width * 10 + d.to_digit(10).unwrap_or(0) as usize;
        }

        let mut precision = None;
        if chars.next_if_eq(&'.').is_some() {
            let mut p = 0;
            while let Some(d) = chars.next_if(|c| c.is_ascii_digit()) {
                p = p * 10 + d.to_digit(10).unwrap_or(0) as usize;
            }
            precision = Some(p);
        }

        n += 1;

        let conversion = chars.next().unwrap_or('%');
        let numeric = !matches!(conversion, 's' | 'c');

        let body = match conversion {
            'd' | 'i' | 'u' => signed(&flags, args.integer(n)?.to_string()),
            'x' => format!("{:x}", args.integer(n)?),
            'X' => format!("{:X}", args.integer(n)?),
            'o' => format!("{:o}", args.integer(n)?),

            'f' | 'F' => {
                let f = args.number(n)?.as_float().unwrap_or_default();
                signed(&flags, format!("{:.*}", precision.unwrap_or(6), f))
            }

            'c' => {
                let code = args.integer(n)?;
                u8::try_from(code).map(|b| (b as char).to_string()).unwrap_or_default()
            }

            's' => {
                let s = match args.any(n)? {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };

                match precision {
                    Some(p) => s.chars().take(p).collect(),
                    None => s,
                }
            }

            other => return Err(format!("invalid conversion '%{}' to 'format'", other)),
        };

        out.push_str(&pad(body, width, &flags, numeric));
    }

    Ok(Value::String(out))
}

fn signed(flags: &str, body: String) -> String {
    if body.starts_with('-') {
        body
    }
    else if flags.contains('+') {
        format!("+{}", body)
    }
    else if flags.contains(' ') {
        format!(" {}", body)
    }
    else {
        body
    }
}

fn pad(body: String, width: usize, flags: &str, numeric: bool) -> String {
    let len = body.chars().count();

    if len >= width {
        return body;
    }

    let fill = width - len;

    if flags.contains('-') {
        format!("{}{}", body, " ".repeat(fill))
    }
    else if flags.contains('0') && numeric {
        let sign = body.starts_with(['-', '+', ' ']) as usize;
        format!("{}{}{}", &body[..sign], "0".repeat(fill), &body[sign..])
    }
    else {
        format!("{}{}", " ".repeat(fill), body)
    }
}
