use crate::lex::block::{ self, Block, Delimiter };
use crate::lex::charclass::{ is_alnum, is_alpha, is_bdigit, is_digit, is_odigit, is_xdigit };
use crate::lex::error::{ ErrorKind, Result };
use crate::lex::lang::{ self, Scan };
use crate::lex::lexer::State;
use crate::lex::token::{ Token, TokenKind };

const INTEGER_SUFFIXES: &[&str] = &["us", "ui", "ul", "%", "&", "s", "i", "l"];
const FLOAT_SUFFIXES: &[&str] = &["@", "!", "#", "f", "r", "d"];

/// BASIC: `&H`/`&O`/`&B` prefixed integers, type suffixes, `""` inside
/// strings and `REM` comments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Basic;

impl Scan for Basic {
    fn scan<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        match (st.cursor.get(), st.cursor.getn(1)) {
            (Some(c), _) if is_alpha(c) => self.id(st),
            (Some(c), _) if is_digit(c) => self.number(st),
            (Some(b'.'), Some(c)) if is_digit(c) => self.number(st),
            (Some(b'&'), Some(c)) if is_alpha(c) => self.number(st),
            (Some(b'"'), _) => string(st),
            _ => Err(lang::invalid_character(st, self)),
        }
    }

    fn format_byte(&self, c: Option<u8>) -> String {
        lang::format_with(c, |c| format!("Chr({})", c))
    }

    fn blocks(&self) -> Vec<Block> {
        vec![Block::LineComment { begin: Delimiter::builtin("'") }]
    }

    fn literal_ahead(&self, rest: &[u8]) -> bool {
        match rest {
            [b'.', c, ..] => is_digit(*c),
            // a prefix counts only when a digit of its base follows
            [b'&', prefix, digit, ..] => match prefix {
                b'h' | b'H' => is_xdigit(*digit),
                b'o' | b'O' => is_odigit(*digit),
                b'b' | b'B' => is_bdigit(*digit),
                _ => false,
            },
            _ => false,
        }
    }
}

impl Basic {
    fn id<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();
        let length = st.cursor.span(is_alnum);

        if length == 3 && st.cursor.rest()[..3].eq_ignore_ascii_case(b"rem") {
            return block::line_comment(st, None);
        }

        st.cursor.advance(length);
        Ok(st.token(TokenKind::ID, start))
    }

    fn number<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();

        if st.cursor.is(b'&') {
            st.cursor.inc();

            let kind = match st.cursor.get() {
                Some(b'h' | b'H') => {
                    st.cursor.inc();
                    lang::digits(st, self, "hexadecimal", is_xdigit)?;
                    TokenKind::HEXADECIMAL
                }

                Some(b'o' | b'O') => {
                    st.cursor.inc();
                    lang::digits(st, self, "octal", is_odigit)?;
                    TokenKind::OCTAL
                }

                Some(b'b' | b'B') => {
                    st.cursor.inc();
                    lang::digits(st, self, "binary", is_bdigit)?;
                    TokenKind::BINARY
                }

                c => {
                    return Err(st.error(ErrorKind::IntegerPrefix(self.format_byte(c))));
                }
            };

            lang::suffix(st, INTEGER_SUFFIXES);
            lang::end_of_number(st, "integer")?;
            return Ok(st.token(kind, start));
        }

        if !st.cursor.is(b'.') {
            lang::digits(st, self, "decimal", is_digit)?;

            if !matches!(st.cursor.get(), Some(b'.' | b'e' | b'E')) {
                let mut kind = TokenKind::DECIMAL;

                if !lang::suffix(st, INTEGER_SUFFIXES) && lang::suffix(st, FLOAT_SUFFIXES) {
                    kind = TokenKind::FLOAT;
                }

                lang::end_of_number(st, "integer")?;
                return Ok(st.token(kind, start));
            }
        }

        if st.cursor.is(b'.') {
            st.cursor.inc();
            st.cursor.eat_while(is_digit);
        }

        if matches!(st.cursor.get(), Some(b'e' | b'E')) {
            st.cursor.inc();

            if matches!(st.cursor.get(), Some(b'+' | b'-')) {
                st.cursor.inc();
            }

            lang::digits(st, self, "decimal", is_digit)?;
        }

        lang::suffix(st, FLOAT_SUFFIXES);
        lang::end_of_number(st, "floating")?;
        Ok(st.token(TokenKind::FLOAT, start))
    }
}

/// A `"` string where `""` stands for a quote, shared with the assembler.
pub(crate) fn string<'s>(st: &mut State<'s>) -> Result<Token<'s>> {
    let start = st.pos();
    st.cursor.inc();

    loop {
        match st.cursor.get() {
            Some(b'"') if st.cursor.getn(1) == Some(b'"') => {
                st.cursor.advance(2);
            }

            Some(b'"') => {
                st.cursor.inc();
                return Ok(st.token(TokenKind::STRING, start));
            }

            None | Some(b'\n') => return Err(st.error(ErrorKind::UnterminatedString)),

            Some(_) => {
                st.cursor.inc();
            }
        }
    }
}
