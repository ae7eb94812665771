use std::fmt::{ Display, Formatter, Result as FMTResult };
use std::str::FromStr;

use enum_dispatch::enum_dispatch;

use crate::lex::block::Block;
use crate::lex::charclass::{ is_alnum, is_digit, is_print };
use crate::lex::error::{ ConfigError, ErrorKind, Result };
use crate::lex::lexer::State;
use crate::lex::symbol::SymbolTable;
use crate::lex::token::Token;

pub mod asm;
pub mod bas;
pub mod cpp;
pub mod pas;

pub use asm::Assembly;
pub use bas::Basic;
pub use cpp::Cpp;
pub use pas::Pascal;

/// The per-language part of the lexer.
#[enum_dispatch]
pub trait Scan {
    /// Scans the token at the cursor, called once trivia, blocks and symbols
    /// did not match there.
    fn scan<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>>;

    /// Renders an offending byte for diagnostics, `None` being the end of input.
    fn format_byte(&self, c: Option<u8>) -> String;

    /// The blocks every lexer of this language starts with, in priority order.
    fn blocks(&self) -> Vec<Block>;

    /// Whether a literal starts at `rest` even though a symbol matches there,
    /// e.g. `.5` when `.` is a symbol.
    fn literal_ahead(&self, _rest: &[u8]) -> bool {
        false
    }
}

#[enum_dispatch(Scan)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Cpp(Cpp),
    Basic(Basic),
    Pascal(Pascal),
    Assembly(Assembly),
}

impl Language {
    pub fn new(syntax: Syntax, symbols: &SymbolTable) -> Self {
        match syntax {
            Syntax::Cpp => Cpp.into(),
            Syntax::Bas => Basic.into(),
            Syntax::Pas => Pascal::new(symbols.contains("..")).into(),
            Syntax::Asm => Assembly.into(),
        }
    }

    pub fn syntax(&self) -> Syntax {
        match self {
            Language::Cpp(_) => Syntax::Cpp,
            Language::Basic(_) => Syntax::Bas,
            Language::Pascal(_) => Syntax::Pas,
            Language::Assembly(_) => Syntax::Asm,
        }
    }
}

/// The language selector accepted by the lexer options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Syntax {
    Cpp,
    Bas,
    Pas,
    Asm,
}

impl Syntax {
    pub fn name(&self) -> &'static str {
        match self {
            Syntax::Cpp => "cpp",
            Syntax::Bas => "bas",
            Syntax::Pas => "pas",
            Syntax::Asm => "asm",
        }
    }
}

impl Display for Syntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
        f.write_str(self.name())
    }
}

impl FromStr for Syntax {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cpp" => Ok(Syntax::Cpp),
            "bas" => Ok(Syntax::Bas),
            "pas" => Ok(Syntax::Pas),
            "asm" => Ok(Syntax::Asm),
            _ => Err(ConfigError::UnknownLanguage(s.to_string())),
        }
    }
}

/// Printable bytes other than `'` are shown quoted, the rest goes through
/// `escaped`.
pub(crate) fn format_with(c: Option<u8>, escaped: impl Fn(u8) -> String) -> String {
    match c {
        Some(c) if is_print(c) && c != b'\'' => format!("'{}'", c as char),
        Some(c) => escaped(c),
        None => "eof".to_string(),
    }
}

/// Tries `suffixes` (longest first) without regard to case, rejecting a
/// match that runs into more identifier characters.
pub(crate) fn suffix(st: &mut State<'_>, suffixes: &[&str]) -> bool {
    let rest = st.cursor.rest();

    for suffix in suffixes {
        let n = suffix.len();

        if rest.len() >= n
            && rest[..n].eq_ignore_ascii_case(suffix.as_bytes())
            && !rest.get(n).is_some_and(|&c| is_alnum(c)) {

            st.cursor.advance(n);
            return true;
        }
    }

    false
}

/// Consumes a non-empty run of `valid` digits.
pub(crate) fn digits(st: &mut State<'_>, lang: &impl Scan, base: &'static str, valid: fn(u8) -> bool) -> Result<()> {
    if st.cursor.eat_while(valid) == 0 {
        return Err(invalid_digit(st, lang, base));
    }

    out_of_range(st, lang, base)
}

// a decimal digit right after the run does not belong to the base
pub(crate) fn out_of_range(st: &State<'_>, lang: &impl Scan, base: &'static str) -> Result<()> {
    match st.cursor.get() {
        Some(c) if is_digit(c) => Err(invalid_digit(st, lang, base)),
        _ => Ok(()),
    }
}

pub(crate) fn invalid_digit(st: &State<'_>, lang: &impl Scan, base: &'static str) -> crate::lex::error::Error {
    st.error(ErrorKind::InvalidDigit { digit: lang.format_byte(st.cursor.get()), base })
}

/// Numbers cannot run into identifier characters, `123abc` is an error and
/// not two tokens.
pub(crate) fn end_of_number(st: &State<'_>, constant: &'static str) -> Result<()> {
    let n = st.cursor.span(is_alnum);

    if n == 0 {
        return Ok(());
    }

    let suffix = String::from_utf8_lossy(&st.cursor.rest()[..n]).into_owned();
    Err(st.error(ErrorKind::InvalidSuffix { suffix, constant }))
}

pub(crate) fn invalid_character(st: &State<'_>, lang: &impl Scan) -> crate::lex::error::Error {
    st.error(ErrorKind::InvalidCharacter(lang.format_byte(st.cursor.get())))
}
