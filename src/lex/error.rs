use std::{
    error::Error as STDError,
    fmt::{ Display, Formatter, Result as FMTResult },
    result::Result as STDResult,
};

use crate::lex::block::DELIM_MAX;

pub type Result<T> = STDResult<T, Error>;

/// A malformed-input error, reported as `<file>:<line>: <description>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    file: String,
    line: u32,
    kind: ErrorKind,
}

impl Error {
    pub fn new(file: impl Into<String>, line: u32, kind: ErrorKind) -> Self {
        Error { file: file.into(), line, kind }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl STDError for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
        write!(f, "{}:{}: {}", self.file, self.line, self.kind)
    }
}

/// Byte renderings inside these variants are already formatted by the
/// active language (`'x'`, `Chr(9)`, `#9`, `09h`...).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    UnterminatedComment,
    UnterminatedFreeForm,
    UnterminatedString,
    UnterminatedChar,
    DirectiveNotAtStart,
    DirectiveNotAlone,
    StrayCarriageReturn,
    InvalidCharacter(String),
    InvalidDigit { digit: String, base: &'static str },
    InvalidSuffix { suffix: String, constant: &'static str },
    DigitSeparator,
    UnknownEscape(String),
    HexEscape,
    UniversalEscape { escape: char, digits: usize },
    RawDelimiterTooLong,
    RawDelimiterCharacter(String),
    RawUnterminated(String),
    IntegerPrefix(String),
    ControlString,
    CommentDelimiter(String),
    InvalidCharLiteral,
    MultibyteChar,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
        match self {
            Self::UnterminatedComment =>
                write!(f, "unterminated comment"),
            Self::UnterminatedFreeForm =>
                write!(f, "unterminated free-form block"),
            Self::UnterminatedString =>
                write!(f, "unterminated string"),
            Self::UnterminatedChar =>
                write!(f, "unterminated char"),
            Self::DirectiveNotAtStart =>
                write!(f, "directives must start at the beginning of the line"),
            Self::DirectiveNotAlone =>
                write!(f, "directives must be the only thing in a line"),
            Self::StrayCarriageReturn =>
                write!(f, "carriage return without a following line feed"),
            Self::InvalidCharacter(c) =>
                write!(f, "invalid character in input: {}", c),
            Self::InvalidDigit { digit, base } =>
                write!(f, "invalid digit {} in {} constant", digit, base),
            Self::InvalidSuffix { suffix, constant } =>
                write!(f, "invalid suffix \"{}\" on {} constant", suffix, constant),
            Self::DigitSeparator =>
                write!(f, "digit separator before any digits"),
            Self::UnknownEscape(c) =>
                write!(f, "unknown escape sequence: {}", c),
            Self::HexEscape =>
                write!(f, "\\x used with no following hex digits"),
            Self::UniversalEscape { escape, digits } =>
                write!(f, "\\{} needs {} hexadecimal digits", escape, digits),
            Self::RawDelimiterTooLong =>
                write!(f, "raw string delimiter longer than 16 characters"),
            Self::RawDelimiterCharacter(c) =>
                write!(f, "invalid character {} in raw string delimiter", c),
            Self::RawUnterminated(delim) =>
                write!(f, "missing raw string terminating delimiter {}", delim),
            Self::IntegerPrefix(c) =>
                write!(f, "invalid integer prefix \"&{}\"", c),
            Self::ControlString =>
                write!(f, "control string used with no following digits"),
            Self::CommentDelimiter(c) =>
                write!(f, "invalid comment delimiter: {}", c),
            Self::InvalidCharLiteral =>
                write!(f, "invalid character literal"),
            Self::MultibyteChar =>
                write!(f, "multibyte character literals are not supported"),
        }
    }
}

/// Rejected lexer configuration, raised before any scanning happens.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    NotATable,
    MissingOption(&'static str),
    WrongType { option: &'static str, expected: &'static str },
    UnknownLanguage(String),
    EmptyDelimiter,
    DelimiterTooLong(String),
    EmptyFreeform,
    MalformedFreeform(usize),
    MalformedDirective(usize),
    TooManyBlocks,
}

impl STDError for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
        match self {
            Self::NotATable =>
                write!(f, "lexer options must be a table"),
            Self::MissingOption(option) =>
                write!(f, "missing required option \"{}\"", option),
            Self::WrongType { option, expected } =>
                write!(f, "{} must be {}", option, expected),
            Self::UnknownLanguage(language) =>
                write!(f, "invalid language {}", language),
            Self::EmptyDelimiter =>
                write!(f, "delimiters cannot be empty"),
            Self::DelimiterTooLong(delim) =>
                write!(f, "delimiter \"{}\" is too big, maximum length is {}", delim, DELIM_MAX),
            Self::EmptyFreeform =>
                write!(f, "freeform array is empty"),
            Self::MalformedFreeform(index) =>
                write!(f, "freeform array element {} is not a pair of strings", index),
            Self::MalformedDirective(index) =>
                write!(f, "directives array element {} is not a string or a string and boolean pair", index),
            Self::TooManyBlocks =>
                write!(f, "freeform area exhausted"),
        }
    }
}
