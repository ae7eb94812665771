use crate::lex::block::{ Block, Delimiter };
use crate::lex::charclass::{ is_alnum, is_alpha, is_bdigit, is_digit, is_odigit, is_xdigit };
use crate::lex::error::{ ErrorKind, Result };
use crate::lex::lang::{ self, Scan };
use crate::lex::lexer::State;
use crate::lex::token::{ StringKind, Token, TokenKind };

// longest first
const INTEGER_SUFFIXES: &[&str] = &["ull", "llu", "ul", "lu", "ll", "u", "l", "f"];
const FLOAT_SUFFIXES: &[&str] = &["f", "l"];

const RAW_DELIM_MAX: usize = 16;

/// C and C++: `'` digit separators, user defined literal suffixes, encoding
/// prefixes and raw strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cpp;

impl Scan for Cpp {
    fn scan<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let k0 = st.cursor.get();
        let k1 = st.cursor.getn(1);
        let k2 = st.cursor.getn(2);

        match (k0, k1) {
            (Some(c), _) if is_digit(c) => return self.number(st),
            (Some(b'.'), Some(c)) if is_digit(c) => return self.number(st),
            (Some(q @ (b'"' | b'\'')), _) => return self.string(st, 0, q, ""),
            _ => {}
        }

        if let (Some(k0), Some(q @ (b'"' | b'\''))) = (k0, k1) {
            match k0 {
                b'L' => return self.string(st, 1, q, "wide"),
                b'u' => return self.string(st, 1, q, "utf16"),
                b'U' => return self.string(st, 1, q, "utf32"),
                b'R' if q == b'"' => return self.raw_string(st, 1, StringKind::RAWSTRING),
                _ => {}
            }
        }

        if let (Some(k0), Some(k1), Some(b'"')) = (k0, k1, k2) {
            match (k0, k1) {
                (b'u', b'8') => return self.string(st, 2, b'"', "utf8"),
                (b'L', b'R') | (b'R', b'L') => return self.raw_string(st, 2, StringKind::RAWWIDESTRING),
                (b'u', b'R') | (b'R', b'u') => return self.raw_string(st, 2, StringKind::RAWUTF16STRING),
                (b'U', b'R') | (b'R', b'U') => return self.raw_string(st, 2, StringKind::RAWUTF32STRING),
                _ => {}
            }
        }

        if (k0, k1, k2) == (Some(b'u'), Some(b'8'), Some(b'\'')) {
            return self.string(st, 2, b'\'', "utf8");
        }

        match k0 {
            Some(c) if is_alpha(c) => self.id(st),
            _ => Err(lang::invalid_character(st, self)),
        }
    }

    fn format_byte(&self, c: Option<u8>) -> String {
        lang::format_with(c, |c| format!("'\\{:03o}'", c))
    }

    fn blocks(&self) -> Vec<Block> {
        vec![
            Block::LineComment { begin: Delimiter::builtin("//") },
            Block::BlockComment { begin: Delimiter::builtin("/*"), end: Delimiter::builtin("*/") },
            Block::LineDirective { begin: Delimiter::builtin("#"), at_start: false },
        ]
    }

    fn literal_ahead(&self, rest: &[u8]) -> bool {
        rest.first() == Some(&b'.') && rest.get(1).is_some_and(|&c| is_digit(c))
    }
}

impl Cpp {
    fn id<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();
        st.cursor.eat_while(is_alnum);
        Ok(st.token(TokenKind::ID, start))
    }

    fn digits(&self, st: &mut State<'_>, base: &'static str, valid: fn(u8) -> bool) -> Result<()> {
        if st.cursor.is(b'\'') {
            return Err(st.error(ErrorKind::DigitSeparator));
        }

        let length = st.cursor.span(|c| valid(c) || c == b'\'');

        if length == 0 {
            return Err(lang::invalid_digit(st, self, base));
        }

        // a trailing separator is not part of the number
        if st.cursor.getn(length - 1) == Some(b'\'') {
            st.cursor.advance(length - 1);
        }
        else {
            st.cursor.advance(length);
        }

        lang::out_of_range(st, self, base)
    }

    fn user_defined_suffix(&self, st: &mut State<'_>) {
        st.cursor.eat_while(is_alnum);
    }

    fn integer_suffix(&self, st: &mut State<'_>) -> Result<()> {
        if st.cursor.is(b'_') {
            self.user_defined_suffix(st);
        }
        else {
            lang::suffix(st, INTEGER_SUFFIXES);
        }

        lang::end_of_number(st, "integer")
    }

    fn float_suffix(&self, st: &mut State<'_>) -> Result<()> {
        if st.cursor.is(b'_') {
            self.user_defined_suffix(st);
        }
        else {
            lang::suffix(st, FLOAT_SUFFIXES);
        }

        lang::end_of_number(st, "floating")
    }

    fn number<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();

        if !st.cursor.is(b'0') {
            return self.decimal_or_float(st, start);
        }

        let kind = match st.cursor.getn(1) {
            Some(b'x' | b'X') => {
                st.cursor.advance(2);
                self.digits(st, "hexadecimal", is_xdigit)?;
                TokenKind::HEXADECIMAL
            }

            Some(b'b' | b'B') => {
                st.cursor.advance(2);
                self.digits(st, "binary", is_bdigit)?;
                TokenKind::BINARY
            }

            _ => {
                let length = st.cursor.span(is_digit);

                // 0.5, 012e3
                if matches!(st.cursor.getn(length), Some(b'.' | b'e' | b'E')) {
                    return self.decimal_or_float(st, start);
                }

                self.digits(st, "octal", is_odigit)?;

                if st.pos() - start == 1 {
                    TokenKind::DECIMAL
                }
                else {
                    TokenKind::OCTAL
                }
            }
        };

        self.integer_suffix(st)?;
        Ok(st.token(kind, start))
    }

    fn decimal_or_float<'s>(&self, st: &mut State<'s>, start: usize) -> Result<Token<'s>> {
        if !st.cursor.is(b'.') {
            self.digits(st, "decimal", is_digit)?;

            if !matches!(st.cursor.get(), Some(b'.' | b'e' | b'E')) {
                self.integer_suffix(st)?;
                return Ok(st.token(TokenKind::DECIMAL, start));
            }
        }

        if st.cursor.is(b'.') {
            st.cursor.inc();

            if st.cursor.get().is_some_and(is_digit) {
                self.digits(st, "decimal", is_digit)?;
            }
        }

        if matches!(st.cursor.get(), Some(b'e' | b'E')) {
            st.cursor.inc();

            if matches!(st.cursor.get(), Some(b'+' | b'-')) {
                st.cursor.inc();
            }

            self.digits(st, "decimal", is_digit)?;
        }

        self.float_suffix(st)?;
        Ok(st.token(TokenKind::FLOAT, start))
    }

    fn unterminated(quote: u8) -> ErrorKind {
        if quote == b'"' {
            ErrorKind::UnterminatedString
        }
        else {
            ErrorKind::UnterminatedChar
        }
    }

    // `skip` is the length of the encoding prefix
    fn string<'s>(&self, st: &mut State<'s>, skip: usize, quote: u8, prefix: &str) -> Result<Token<'s>> {
        let start = st.pos();
        st.cursor.advance(skip + 1);

        loop {
            match st.cursor.get() {
                Some(c) if c == quote => {
                    st.cursor.inc();
                    break;
                }

                Some(b'\\') => {
                    st.cursor.inc();
                    self.escape(st)?;
                }

                None | Some(b'\n') => return Err(st.error(Self::unterminated(quote))),

                Some(_) => {
                    st.cursor.inc();
                }
            }
        }

        if st.cursor.is(b'_') {
            self.user_defined_suffix(st);
        }

        Ok(st.token(StringKind::quoted(prefix, quote).into(), start))
    }

    // the cursor is right after the backslash
    fn escape(&self, st: &mut State<'_>) -> Result<()> {
        let Some(c) = st.cursor.get() else {
            // the caller reports the unterminated literal
            return Ok(());
        };

        st.cursor.inc();

        match c {
            b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' | b'\'' | b'"' | b'?' => Ok(()),

            b'x' => {
                if st.cursor.eat_while(is_xdigit) == 0 {
                    return Err(st.error(ErrorKind::HexEscape));
                }

                Ok(())
            }

            b'u' => self.universal(st, 'u', 4),
            b'U' => self.universal(st, 'U', 8),

            b'0'..=b'7' => {
                let length = st.cursor.span(is_odigit).min(2);
                st.cursor.advance(length);
                Ok(())
            }

            _ => Err(st.error(ErrorKind::UnknownEscape(self.format_byte(Some(c))))),
        }
    }

    fn universal(&self, st: &mut State<'_>, escape: char, digits: usize) -> Result<()> {
        if st.cursor.span(is_xdigit) != digits {
            return Err(st.error(ErrorKind::UniversalEscape { escape, digits }));
        }

        st.cursor.advance(digits);
        Ok(())
    }

    fn raw_string<'s>(&self, st: &mut State<'s>, skip: usize, kind: StringKind) -> Result<Token<'s>> {
        let start = st.pos();
        st.cursor.advance(skip + 1);

        let count = st.cursor.span(|c| !matches!(c, b' ' | b'(' | b')' | b'\\' | b'\t' | b'\x0b' | b'\x0c' | b'\n'));

        if count > RAW_DELIM_MAX {
            return Err(st.error(ErrorKind::RawDelimiterTooLong));
        }

        let mut closing = Vec::with_capacity(count + 2);
        closing.push(b')');
        closing.extend_from_slice(&st.cursor.rest()[..count]);
        closing.push(b'"');

        st.cursor.advance(count);

        if !st.cursor.is(b'(') {
            let c = self.format_byte(st.cursor.get());
            return Err(st.error(ErrorKind::RawDelimiterCharacter(c)));
        }

        st.cursor.inc();

        let Some(length) = st.cursor.find(&closing) else {
            let delim = String::from_utf8_lossy(&closing[..count + 1]).into_owned();
            return Err(st.error(ErrorKind::RawUnterminated(delim)));
        };

        st.advance_lines(length + closing.len());

        if st.cursor.is(b'_') {
            self.user_defined_suffix(st);
        }

        Ok(st.token(kind.into(), start))
    }
}
