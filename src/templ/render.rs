use std::cmp::Ordering;
use std::collections::HashMap;

use either::Either;

use crate::templ::ast::{ BinaryOp, Expr, Iteration, Node, UnaryOp };
use crate::templ::library::{ self, to_number };
use crate::templ::{ Error, Result };
use crate::value::Value;

type EvalResult<T> = std::result::Result<T, String>;

/// Walks the nodes of a compiled template, evaluating code against `args`.
///
/// Names resolve to locals (innermost first), then `args` itself, then
/// globals assigned by the template, then fields of `args`, and finally the
/// builtin library.
pub struct Renderer<'a, F> {
    chunk: &'a str,
    args: &'a Value,
    // innermost last
    locals: Vec<(String, Value)>,
    globals: HashMap<String, Value>,
    emit: F,
}

impl<'a, F> Renderer<'a, F>
where
    F: FnMut(&str),
{
    pub fn new(chunk: &'a str, args: &'a Value, emit: F) -> Self {
        Renderer { chunk, args, locals: Vec::new(), globals: HashMap::new(), emit }
    }

    pub fn run(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            self.node(node)?;
        }

        Ok(())
    }

    // locals declared inside end with the block
    fn run_block(&mut self, nodes: &[Node]) -> Result<()> {
        let depth = self.locals.len();
        let result = self.run(nodes);
        self.locals.truncate(depth);
        result
    }

    fn node(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Text(text) => {
                (self.emit)(text.as_str());
            }

            Node::Emit { line, expr } => {
                let text = self.eval_at(*line, expr)?.to_string();
                (self.emit)(text.as_str());
            }

            Node::If { arms, otherwise } => {
                for (line, cond, body) in arms {
                    if self.eval_at(*line, cond)?.truthy() {
                        return self.run_block(body);
                    }
                }

                if let Some(body) = otherwise {
                    self.run_block(body)?;
                }
            }

            Node::ForIn { line, key, value, iteration, table, body } => {
                let table = self.eval_at(*line, table)?;

                let entries = entries(&table, *iteration)
                    .map_err(|message| Error::new(self.chunk, *line, message))?;

                for (k, v) in entries {
                    let depth = self.locals.len();

                    self.locals.push((key.clone(), k));

                    if let Some(value) = value {
                        self.locals.push((value.clone(), v.clone()));
                    }

                    let result = self.run(body);
                    self.locals.truncate(depth);
                    result?;
                }
            }

            Node::ForNum { line, var, start, limit, step, body } => {
                let start = self.eval_at(*line, start)?;
                let limit = self.eval_at(*line, limit)?;

                let step = match step {
                    Some(step) => self.eval_at(*line, step)?,
                    None => Value::Integer(1),
                };

                let range = NumericFor::new(&start, &limit, &step)
                    .map_err(|message| Error::new(self.chunk, *line, message))?;

                for i in range {
                    let depth = self.locals.len();

                    self.locals.push((var.clone(), i));

                    let result = self.run(body);
                    self.locals.truncate(depth);
                    result?;
                }
            }

            Node::Local { line, name, value } => {
                let value = match value {
                    Some(value) => self.eval_at(*line, value)?,
                    None => Value::Nil,
                };

                self.locals.push((name.clone(), value));
            }

            Node::Assign { line, name, value } => {
                let value = self.eval_at(*line, value)?;

                match self.locals.iter_mut().rev().find(|(local, _)| local == name) {
                    Some((_, slot)) => *slot = value,
                    None => {
                        self.globals.insert(name.clone(), value);
                    }
                }
            }

            Node::Eval { line, expr } => {
                self.eval_at(*line, expr)?;
            }
        }

        Ok(())
    }

    fn eval_at(&self, line: u32, expr: &Expr) -> Result<Value> {
        self.eval(expr).map_err(|message| Error::new(self.chunk, line, message))
    }

    fn lookup(&self, name: &str) -> Value {
        if let Some((_, value)) = self.locals.iter().rev().find(|(local, _)| local == name) {
            return value.clone();
        }

        if name == "args" {
            return self.args.clone();
        }

        if let Some(value) = self.globals.get(name) {
            return value.clone();
        }

        match self.args.get(name) {
            Some(value) if !value.is_nil() => value.clone(),
            _ => library::global(name).unwrap_or_default(),
        }
    }

    fn eval_all(&self, exprs: &[Expr]) -> EvalResult<Vec<Value>> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    fn eval(&self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Const(value) => Ok(value.clone()),

            Expr::Name(name) => Ok(self.lookup(name)),

            Expr::Field(table, field) => {
                let table = self.eval(table)?;
                index(&table, &Value::String(field.clone()))
            }

            Expr::Index(table, key) => {
                let table = self.eval(table)?;
                let key = self.eval(key)?;
                index(&table, &key)
            }

            Expr::Call(callee, args) => {
                let function = self.eval(callee)?;
                let args = self.eval_all(args)?;

                match function {
                    Value::Function(builtin) => library::call(builtin, &args),
                    other => Err(format!("attempt to call a {} value", other.type_name())),
                }
            }

            Expr::Method(object, method, args) => {
                let object = self.eval(object)?;
                let function = index(&object, &Value::String(method.clone()))?;

                let builtin = match function {
                    Value::Function(builtin) => builtin,
                    other => return Err(format!("attempt to call a {} value (method '{}')", other.type_name(), method)),
                };

                let mut values = vec![object];
                values.extend(self.eval_all(args)?);

                library::call(builtin, &values)
            }

            Expr::Unary(op, operand) => {
                let operand = self.eval(operand)?;
                unary(*op, &operand)
            }

            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                if lhs.truthy() { self.eval(rhs) } else { Ok(lhs) }
            }

            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                if lhs.truthy() { Ok(lhs) } else { self.eval(rhs) }
            }

            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                binary(*op, &lhs, &rhs)
            }
        }
    }
}

fn index(table: &Value, key: &Value) -> EvalResult<Value> {
    match table {
        Value::List(_) | Value::Map(_) => Ok(table.index(key).cloned().unwrap_or_default()),

        // strings index the string library
        Value::String(_) => Ok(key
            .as_str()
            .and_then(library::string_method)
            .map(Value::Function)
            .unwrap_or_default()),

        _ => Err(format!("attempt to index a {} value", table.type_name())),
    }
}

/// The `(key, value)` pairs a generic `for` loop visits.
fn entries(table: &Value, iteration: Iteration) -> EvalResult<impl Iterator<Item = (Value, &Value)>> {
    let function = match iteration {
        Iteration::Ipairs => "ipairs",
        Iteration::Pairs => "pairs",
    };

    match (table, iteration) {
        (Value::List(list), _) => Ok(Either::Left(
            list.iter()
                .enumerate()
                .map(|(i, v)| (Value::Integer(i as i64 + 1), v)),
        )),

        (Value::Map(map), Iteration::Pairs) => Ok(Either::Right(Either::Left(
            map.iter().map(|(k, v)| (Value::String(k.clone()), v)),
        ))),

        // the sequence part of a map: keys "1", "2", ... up to the border
        (Value::Map(map), Iteration::Ipairs) => Ok(Either::Right(Either::Right(
            (1..).map_while(move |i: i64| {
                map.get(&i.to_string())
                    .filter(|v| !v.is_nil())
                    .map(|v| (Value::Integer(i), v))
            }),
        ))),

        _ => Err(format!("bad argument #1 to '{}' (table expected, got {})", function, table.type_name())),
    }
}

/// The values a numeric `for` visits.
enum NumericFor {
    Integer { next: i64, limit: i64, step: i64, done: bool },
    Float { next: f64, limit: f64, step: f64 },
}

impl NumericFor {
    fn new(start: &Value, limit: &Value, step: &Value) -> EvalResult<Self> {
        let number = |value: &Value, what: &str| match value {
            Value::Integer(_) | Value::Float(_) => Ok(value.clone()),
            _ => Err(format!("'for' {} value must be a number", what)),
        };

        let start = number(start, "initial")?;
        let limit = number(limit, "limit")?;
        let step = number(step, "step")?;

        if step.as_float() == Some(0.0) {
            return Err("'for' step is zero".to_string());
        }

        match (start, step) {
            (Value::Integer(start), Value::Integer(step)) => {
                let (limit, done) = match limit {
                    Value::Integer(limit) => (limit, false),
                    limit => {
                        let f = limit.as_float().unwrap_or_default();
                        let rounded = if step > 0 { f.floor() } else { f.ceil() };

                        // `as` saturates out of range floats
                        (rounded as i64, f.is_nan())
                    }
                };

                Ok(NumericFor::Integer { next: start, limit, step, done })
            }

            (start, step) => Ok(NumericFor::Float {
                next: start.as_float().unwrap_or_default(),
                limit: limit.as_float().unwrap_or_default(),
                step: step.as_float().unwrap_or_default(),
            }),
        }
    }
}

impl Iterator for NumericFor {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            NumericFor::Integer { next, limit, step, done } => {
                let in_range = if *step > 0 { *next <= *limit } else { *next >= *limit };

                if *done || !in_range {
                    return None;
                }

                let current = *next;

                match next.checked_add(*step) {
                    Some(n) => *next = n,
                    None => *done = true,
                }

                Some(Value::Integer(current))
            }

            NumericFor::Float { next, limit, step } => {
                let in_range = if *step > 0.0 { *next <= *limit } else { *next >= *limit };

                if !in_range {
                    return None;
                }

                let current = *next;
                *next += *step;

                Some(Value::Float(current))
            }
        }
    }
}

fn arith_operand(value: &Value) -> EvalResult<Value> {
    to_number(value).ok_or_else(|| format!("attempt to perform arithmetic on a {} value", value.type_name()))
}

fn unary(op: UnaryOp, operand: &Value) -> EvalResult<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Boolean(!operand.truthy())),

        UnaryOp::Neg => match arith_operand(operand)? {
            Value::Integer(i) => Ok(Value::Integer(i.wrapping_neg())),
            n => Ok(Value::Float(-n.as_float().unwrap_or_default())),
        },

        UnaryOp::Len => operand
            .len()
            .map(|n| Value::Integer(n as i64))
            .ok_or_else(|| format!("attempt to get length of a {} value", operand.type_name())),
    }
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod =>
            arith(op, &arith_operand(lhs)?, &arith_operand(rhs)?),

        BinaryOp::Concat => {
            let piece = |v: &Value| match v {
                Value::String(_) | Value::Integer(_) | Value::Float(_) => Ok(v.to_string()),
                _ => Err(format!("attempt to concatenate a {} value", v.type_name())),
            };

            Ok(Value::String(piece(lhs)? + &piece(rhs)?))
        }

        BinaryOp::Eq => Ok(Value::Boolean(equals(lhs, rhs))),
        BinaryOp::Ne => Ok(Value::Boolean(!equals(lhs, rhs))),

        BinaryOp::Lt => Ok(Value::Boolean(matches!(compare(lhs, rhs)?, Some(Ordering::Less)))),
        BinaryOp::Le => Ok(Value::Boolean(matches!(compare(lhs, rhs)?, Some(Ordering::Less | Ordering::Equal)))),
        BinaryOp::Gt => Ok(Value::Boolean(matches!(compare(lhs, rhs)?, Some(Ordering::Greater)))),
        BinaryOp::Ge => Ok(Value::Boolean(matches!(compare(lhs, rhs)?, Some(Ordering::Greater | Ordering::Equal)))),

        // short circuited by the caller
        BinaryOp::And | BinaryOp::Or => Ok(Value::Nil),
    }
}

fn arith(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    if let (Value::Integer(a), Value::Integer(b)) = (lhs, rhs) {
        let (a, b) = (*a, *b);

        match op {
            BinaryOp::Add => return Ok(Value::Integer(a.wrapping_add(b))),
            BinaryOp::Sub => return Ok(Value::Integer(a.wrapping_sub(b))),
            BinaryOp::Mul => return Ok(Value::Integer(a.wrapping_mul(b))),

            BinaryOp::Mod => {
                if b == 0 {
                    return Err("attempt to perform 'n%%0'".to_string());
                }

                let r = a.wrapping_rem(b);
                let r = if r != 0 && (r ^ b) < 0 { r + b } else { r };
                return Ok(Value::Integer(r));
            }

            // division always yields a float
            _ => {}
        }
    }

    let a = lhs.as_float().unwrap_or_default();
    let b = rhs.as_float().unwrap_or_default();

    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => a - (a / b).floor() * b,
    };

    Ok(Value::Float(result))
}

fn equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs.as_float(), rhs.as_float()) {
        (Some(a), Some(b)) => a == b,
        _ => lhs == rhs,
    }
}

// `None` when a NaN is involved
fn compare(lhs: &Value, rhs: &Value) -> EvalResult<Option<Ordering>> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        _ => match (lhs.as_float(), rhs.as_float()) {
            (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
            _ => Err(format!("attempt to compare {} with {}", lhs.type_name(), rhs.type_name())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_follows_lua() {
        let int = |i| Value::Integer(i);

        assert_eq!(binary(BinaryOp::Add, &int(1), &int(2)), Ok(int(3)));
        assert_eq!(binary(BinaryOp::Div, &int(7), &int(2)), Ok(Value::Float(3.5)));
        assert_eq!(binary(BinaryOp::Mod, &int(-7), &int(3)), Ok(int(2)));
        assert_eq!(binary(BinaryOp::Mod, &Value::Float(5.5), &int(2)), Ok(Value::Float(1.5)));
        assert_eq!(binary(BinaryOp::Add, &Value::from("10"), &int(1)), Ok(int(11)));
        assert!(binary(BinaryOp::Mod, &int(1), &int(0)).is_err());
        assert_eq!(
            binary(BinaryOp::Sub, &Value::Nil, &int(1)),
            Err("attempt to perform arithmetic on a nil value".to_string())
        );
    }

    #[test]
    fn comparisons() {
        assert_eq!(binary(BinaryOp::Eq, &Value::Integer(1), &Value::Float(1.0)), Ok(Value::Boolean(true)));
        assert_eq!(binary(BinaryOp::Lt, &Value::from("a"), &Value::from("b")), Ok(Value::Boolean(true)));
        assert_eq!(
            binary(BinaryOp::Lt, &Value::Integer(1), &Value::from("2")),
            Err("attempt to compare number with string".to_string())
        );
    }

    #[test]
    fn numeric_ranges() {
        let collect = |start: Value, limit: Value, step: Value| -> Vec<Value> {
            NumericFor::new(&start, &limit, &step).unwrap().collect()
        };

        let ints = |items: &[i64]| items.iter().map(|&i| Value::Integer(i)).collect::<Vec<_>>();

        assert_eq!(collect(Value::from(1), Value::from(3), Value::from(1)), ints(&[1, 2, 3]));
        assert_eq!(collect(Value::from(3), Value::from(1), Value::from(-1)), ints(&[3, 2, 1]));
        assert_eq!(collect(Value::from(1), Value::from(2.5), Value::from(1)), ints(&[1, 2]));
        assert_eq!(collect(Value::from(1), Value::from(0), Value::from(1)), ints(&[]));
        assert_eq!(collect(Value::from(i64::MAX - 1), Value::from(i64::MAX), Value::from(5)), ints(&[i64::MAX - 1]));
        assert_eq!(
            collect(Value::from(0.5), Value::from(1.5), Value::from(0.5)),
            vec![Value::from(0.5), Value::from(1.0), Value::from(1.5)]
        );

        assert!(NumericFor::new(&Value::from(1), &Value::from(2), &Value::from(0)).is_err());
        assert_eq!(
            NumericFor::new(&Value::from("1"), &Value::from(2), &Value::from(1)).err(),
            Some("'for' initial value must be a number".to_string())
        );
    }

    #[test]
    fn ipairs_over_maps_stops_at_the_border() {
        let map: Value = [("1", "a"), ("2", "b"), ("4", "d")].into_iter().collect();
        let seen: Vec<Value> = entries(&map, Iteration::Ipairs).unwrap().map(|(k, _)| k).collect();

        assert_eq!(seen, vec![Value::from(1), Value::from(2)]);
    }

    #[test]
    fn concat_renders_numbers() {
        assert_eq!(
            binary(BinaryOp::Concat, &Value::from("x"), &Value::Float(2.0)),
            Ok(Value::from("x2.0"))
        );
        assert!(binary(BinaryOp::Concat, &Value::from("x"), &Value::Nil).is_err());
    }
}
