use crate::lex::error::ConfigError;
use crate::lex::lang::Syntax;
use crate::value::Value;

/// Everything a [`Lexer`](crate::lex::lexer::Lexer) is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options<'s> {
    pub source: &'s str,
    pub file: String,
    pub startline: u32,
    pub symbols: Vec<String>,
    pub syntax: Syntax,
    /// `(begin, at_start)` line directives, tried after the language's own
    /// blocks. With `at_start` the directive must open its line.
    pub directives: Vec<(String, bool)>,
    /// `(begin, end)` delimiter pairs, tried after the directives.
    pub freeform: Vec<(String, String)>,
}

impl<'s> Options<'s> {
    pub fn new(source: &'s str, file: impl Into<String>, syntax: Syntax) -> Self {
        Options {
            source,
            file: file.into(),
            startline: 1,
            symbols: Vec::new(),
            syntax,
            directives: Vec::new(),
            freeform: Vec::new(),
        }
    }

    pub fn startline(mut self, line: u32) -> Self {
        self.startline = line;
        self
    }

    pub fn symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn directive(mut self, begin: impl Into<String>, at_start: bool) -> Self {
        self.directives.push((begin.into(), at_start));
        self
    }

    pub fn freeform(mut self, begin: impl Into<String>, end: impl Into<String>) -> Self {
        self.freeform.push((begin.into(), end.into()));
        self
    }

    /// Reads an option table:
    ///
    /// ```text
    /// { source = "...", file = "...", language = "cpp", symbols = {...},
    ///   startline = 1, directives = {"#", {"%", true}, ...},
    ///   freeform = {{"<%", "%>"}, ...} }
    /// ```
    ///
    /// `symbols` is either a list of strings or a map whose keys with a
    /// truthy value are the symbols. A directive is its opening string, or a
    /// pair of the string and whether it must start the line.
    pub fn from_value(options: &'s Value) -> Result<Self, ConfigError> {
        let Value::Map(table) = options else {
            return Err(ConfigError::NotATable);
        };

        let source = required_string(options, "source")?;
        let file = required_string(options, "file")?;

        let syntax = required_string(options, "language")?.parse::<Syntax>()?;

        let startline = match table.get("startline") {
            None | Some(Value::Nil) => 1,
            Some(v) => v
                .as_integer()
                .and_then(|line| u32::try_from(line).ok())
                .filter(|&line| line > 0)
                .ok_or(ConfigError::WrongType { option: "startline", expected: "a positive integer" })?,
        };

        let symbols = match table.get("symbols") {
            None | Some(Value::Nil) => return Err(ConfigError::MissingOption("symbols")),
            Some(v) => symbol_list(v)?,
        };

        let directives = match table.get("directives") {
            None | Some(Value::Nil) => Vec::new(),
            Some(v) => directive_list(v)?,
        };

        let freeform = match table.get("freeform") {
            None | Some(Value::Nil) => Vec::new(),
            Some(v) => freeform_pairs(v)?,
        };

        Ok(Options {
            source,
            file: file.to_string(),
            startline,
            symbols,
            syntax,
            directives,
            freeform,
        })
    }
}

fn required_string<'v>(options: &'v Value, option: &'static str) -> Result<&'v str, ConfigError> {
    match options.get(option) {
        None | Some(Value::Nil) => Err(ConfigError::MissingOption(option)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ConfigError::WrongType { option, expected: "a string" }),
    }
}

fn symbol_list(symbols: &Value) -> Result<Vec<String>, ConfigError> {
    let wrong = ConfigError::WrongType { option: "symbols", expected: "a table of strings" };

    match symbols {
        Value::List(list) => list
            .iter()
            .map(|symbol| symbol.as_str().map(str::to_string).ok_or(wrong.clone()))
            .collect(),

        Value::Map(map) => Ok(map
            .iter()
            .filter(|(_, enabled)| enabled.truthy())
            .map(|(symbol, _)| symbol.clone())
            .collect()),

        _ => Err(wrong),
    }
}

fn directive_list(directives: &Value) -> Result<Vec<(String, bool)>, ConfigError> {
    let Value::List(list) = directives else {
        return Err(ConfigError::WrongType { option: "directives", expected: "an array" });
    };

    list.iter()
        .enumerate()
        .map(|(i, directive)| match directive {
            Value::String(begin) => Ok((begin.clone(), false)),

            Value::List(pair) => match (pair.first(), pair.get(1)) {
                (Some(Value::String(begin)), Some(Value::Boolean(at_start))) => Ok((begin.clone(), *at_start)),
                _ => Err(ConfigError::MalformedDirective(i + 1)),
            },

            _ => Err(ConfigError::MalformedDirective(i + 1)),
        })
        .collect()
}

fn freeform_pairs(freeform: &Value) -> Result<Vec<(String, String)>, ConfigError> {
    let Value::List(list) = freeform else {
        return Err(ConfigError::WrongType { option: "freeform", expected: "an array of pairs" });
    };

    if list.is_empty() {
        return Err(ConfigError::EmptyFreeform);
    }

    list.iter()
        .enumerate()
        .map(|(i, pair)| match pair {
            Value::List(pair) => match (pair.first(), pair.get(1)) {
                (Some(Value::String(begin)), Some(Value::String(end))) => Ok((begin.clone(), end.clone())),
                _ => Err(ConfigError::MalformedFreeform(i + 1)),
            },

            _ => Err(ConfigError::MalformedFreeform(i + 1)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(extra: Vec<(&str, Value)>) -> Value {
        let mut options: Vec<(&str, Value)> = vec![
            ("source", "x + y".into()),
            ("file", "input.c".into()),
            ("language", "cpp".into()),
            ("symbols", vec![Value::from("+")].into()),
        ];

        for (key, value) in extra {
            options.retain(|(k, _)| *k != key);
            options.push((key, value));
        }

        options.into_iter().collect()
    }

    #[test]
    fn reads_a_full_table() {
        let value = table(vec![
            ("startline", 10.into()),
            ("freeform", vec![Value::from(vec![Value::from("<%"), Value::from("%>")])].into()),
        ]);

        let options = Options::from_value(&value).unwrap();
        assert_eq!(options.source, "x + y");
        assert_eq!(options.file, "input.c");
        assert_eq!(options.startline, 10);
        assert_eq!(options.syntax, Syntax::Cpp);
        assert_eq!(options.symbols, ["+"]);
        assert_eq!(options.freeform, [("<%".to_string(), "%>".to_string())]);
    }

    #[test]
    fn symbols_may_be_a_set() {
        let symbols: Value = [("+", Value::from(true)), ("-", Value::from(false)), ("*", Value::from(1))]
            .into_iter()
            .collect();

        let value = table(vec![("symbols", symbols)]);
        let options = Options::from_value(&value).unwrap();
        assert_eq!(options.symbols, ["*", "+"]);
    }

    #[test]
    fn rejects_bad_tables() {
        assert_eq!(Options::from_value(&Value::from("x")), Err(ConfigError::NotATable));

        let value = table(vec![("language", "cobol".into())]);
        assert_eq!(Options::from_value(&value), Err(ConfigError::UnknownLanguage("cobol".to_string())));

        let value = table(vec![("symbols", Value::Nil)]);
        assert_eq!(Options::from_value(&value), Err(ConfigError::MissingOption("symbols")));

        let value = table(vec![("file", 3.into())]);
        assert!(matches!(Options::from_value(&value), Err(ConfigError::WrongType { option: "file", .. })));

        let value = table(vec![("startline", 0.into())]);
        assert!(matches!(Options::from_value(&value), Err(ConfigError::WrongType { option: "startline", .. })));

        let value = table(vec![("freeform", Value::List(Vec::new()))]);
        assert_eq!(Options::from_value(&value), Err(ConfigError::EmptyFreeform));

        let value = table(vec![("freeform", vec![Value::from(vec![Value::from("<%")])].into())]);
        assert_eq!(Options::from_value(&value), Err(ConfigError::MalformedFreeform(1)));

        let value = table(vec![("directives", vec![Value::from("#"), Value::from(1)].into())]);
        assert_eq!(Options::from_value(&value), Err(ConfigError::MalformedDirective(2)));

        let value = table(vec![("directives", "#".into())]);
        assert!(matches!(Options::from_value(&value), Err(ConfigError::WrongType { option: "directives", .. })));
    }
}
