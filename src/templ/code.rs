use crate::lex::cached_lexer::TokenStream;
use crate::lex::charclass::{ is_alnum, is_alpha, is_digit, is_space, is_xdigit };
use crate::lex::cursor::Cursor;
use crate::lex::symbol::SymbolTable;
use crate::templ::literals::parse_string_literal;
use crate::value::Value;

pub const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in", "local",
    "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

const SYMBOLS: &[&str] = &[
    "(", ")", "[", "]", ",", ".", "..", ":", "#", "=", "==", "~=", "<", "<=", ">", ">=", "+", "-", "*", "/",
    "%",
];

#[derive(Clone, Debug, PartialEq)]
pub enum CodeToken<'c> {
    Name(&'c str),
    Keyword(&'c str),
    Number(Value),
    Str(String),
    Symbol(&'c str),
    Eof,
}

/// A token of template code along with where it was found.
#[derive(Clone, Debug, PartialEq)]
pub struct Lexeme<'c> {
    pub token: CodeToken<'c>,
    pub text: &'c str,
    pub line: u32,
}

impl<'c> Lexeme<'c> {
    /// The token as shown in "near ..." diagnostics.
    pub fn describe(&self) -> String {
        match self.token {
            CodeToken::Eof => "<eof>".to_string(),
            _ => format!("'{}'", self.text),
        }
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self.token, CodeToken::Symbol(s) if s == symbol)
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.token, CodeToken::Keyword(k) if k == keyword)
    }
}

/// Splits the code of one tag into tokens, the last one being `Eof`.
/// `line` is the line the tag starts on.
pub fn tokenize(code: &str, line: u32) -> Result<Vec<Lexeme<'_>>, (u32, String)> {
    let mut lexer = CodeLexer::new(code, line);
    let mut out = Vec::new();

    loop {
        let lexeme = lexer.lex()?;
        let eof = lexeme.token == CodeToken::Eof;
        out.push(lexeme);

        if eof {
            return Ok(out);
        }
    }
}

/// Reads template code one token at a time, repeating `Eof` at the end.
pub struct CodeLexer<'c> {
    cursor: Cursor<'c>,
    line: u32,
    symbols: SymbolTable,
}

impl<'c> TokenStream for CodeLexer<'c> {
    type Token = Lexeme<'c>;
    type Error = (u32, String);

    fn next_token(&mut self) -> Result<Lexeme<'c>, (u32, String)> {
        self.lex()
    }
}

impl<'c> CodeLexer<'c> {
    /// `line` is the line the code starts on.
    pub fn new(code: &'c str, line: u32) -> Self {
        CodeLexer {
            cursor: Cursor::new(code, 0),
            line,
            symbols: SymbolTable::new(SYMBOLS),
        }
    }

    pub fn lex(&mut self) -> Result<Lexeme<'c>, (u32, String)> {
        loop {
            match self.cursor.get() {
                Some(b'\n') => {
                    self.cursor.inc();
                    self.line += 1;
                }

                Some(c) if is_space(c) => {
                    self.cursor.inc();
                }

                _ => break,
            }
        }

        let start = self.cursor;

        let token = match (self.cursor.get(), self.cursor.getn(1)) {
            (None, _) => CodeToken::Eof,

            (Some(c), _) if is_alpha(c) => {
                self.cursor.eat_while(is_alnum);
                let name = start.form_str(&self.cursor);

                if KEYWORDS.contains(&name) {
                    CodeToken::Keyword(name)
                }
                else {
                    CodeToken::Name(name)
                }
            }

            (Some(c), _) if is_digit(c) => self.number(start)?,
            (Some(b'.'), Some(c)) if is_digit(c) => self.number(start)?,

            (Some(q @ (b'"' | b'\'')), _) => self.string(start, q)?,

            _ => {
                let n = self.symbols.longest_match(self.cursor.rest());

                if n == 0 {
                    let c = self.cursor.input()[self.cursor.pos()..].chars().next().unwrap_or(' ');
                    return Err((self.line, format!("unexpected symbol near '{}'", c)));
                }

                self.cursor.advance(n);
                CodeToken::Symbol(start.form_str(&self.cursor))
            }
        };

        Ok(Lexeme { token, text: start.form_str(&self.cursor), line: self.line })
    }

    fn number(&mut self, start: Cursor<'c>) -> Result<CodeToken<'c>, (u32, String)> {
        let hex = self.cursor.is(b'0') && matches!(self.cursor.getn(1), Some(b'x' | b'X'));

        if hex {
            self.cursor.advance(2);
            self.cursor.eat_while(is_xdigit);
        }
        else {
            self.cursor.eat_while(is_digit);

            if self.cursor.is(b'.') && self.cursor.getn(1) != Some(b'.') {
                self.cursor.inc();
                self.cursor.eat_while(is_digit);
            }

            if matches!(self.cursor.get(), Some(b'e' | b'E')) {
                self.cursor.inc();

                if matches!(self.cursor.get(), Some(b'+' | b'-')) {
                    self.cursor.inc();
                }

                self.cursor.eat_while(is_digit);
            }
        }

        let trailing = self.cursor.eat_while(is_alnum);
        let text = start.form_str(&self.cursor);

        let value = if trailing > 0 {
            None
        }
        else if hex {
            // integer overflow wraps around
            u64::from_str_radix(&text[2..], 16).ok().map(|n| Value::Integer(n as i64))
        }
        else if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>().ok().map(Value::Float)
        }
        else {
            text.parse::<i64>()
                .map(Value::Integer)
                .or_else(|_| text.parse::<f64>().map(Value::Float))
                .ok()
        };

        value
            .map(CodeToken::Number)
            .ok_or_else(|| (self.line, format!("malformed number near '{}'", text)))
    }

    fn string(&mut self, start: Cursor<'c>, quote: u8) -> Result<CodeToken<'c>, (u32, String)> {
        self.cursor.inc();

        loop {
            match self.cursor.get() {
                Some(c) if c == quote => {
                    self.cursor.inc();
                    break;
                }

                Some(b'\\') => {
                    self.cursor.inc();

                    match self.cursor.get() {
                        Some(b'\n') => self.line += 1,

                        // \z skips the white space after it, line breaks included
                        Some(b'z') => {
                            self.cursor.inc();

                            while let Some(c) = self.cursor.get().filter(|&c| c == b'\n' || is_space(c)) {
                                if c == b'\n' {
                                    self.line += 1;
                                }

                                self.cursor.inc();
                            }

                            continue;
                        }

                        _ => {}
                    }

                    self.cursor.inc();
                }

                None | Some(b'\n') => {
                    return Err((self.line, format!("unfinished string near '{}'", start.form_str(&self.cursor))));
                }

                Some(_) => {
                    self.cursor.inc();
                }
            }
        }

        let text = start.form_str(&self.cursor);

        parse_string_literal(text)
            .map(CodeToken::Str)
            .map_err(|message| (self.line, message))
    }
}
