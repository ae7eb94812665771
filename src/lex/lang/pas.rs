use crate::lex::block::{ Block, Delimiter };
use crate::lex::charclass::{ is_alnum, is_alpha, is_bdigit, is_digit, is_odigit, is_xdigit };
use crate::lex::error::{ ErrorKind, Result };
use crate::lex::lang::{ self, Scan };
use crate::lex::lexer::State;
use crate::lex::token::{ Token, TokenKind };

/// Pascal: `$`/`&`/`%` prefixed integers, `''` inside strings and `#13`
/// control characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pascal {
    // `..` is a symbol, so `1..2` is a range and not the float `1.`
    range_symbol: bool,
}

// which part of a string literal comes next
enum Part {
    Quoted,
    Control,
}

impl Pascal {
    pub fn new(range_symbol: bool) -> Self {
        Pascal { range_symbol }
    }

    fn id<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();
        st.cursor.eat_while(is_alnum);
        Ok(st.token(TokenKind::ID, start))
    }

    fn number<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();

        let prefixed = match st.cursor.get() {
            Some(b'$') => Some((TokenKind::HEXADECIMAL, "hexadecimal", is_xdigit as fn(u8) -> bool)),
            Some(b'&') => Some((TokenKind::OCTAL, "octal", is_odigit as fn(u8) -> bool)),
            Some(b'%') => Some((TokenKind::BINARY, "binary", is_bdigit as fn(u8) -> bool)),
            _ => None,
        };

        if let Some((kind, base, valid)) = prefixed {
            st.cursor.inc();
            lang::digits(st, self, base, valid)?;
            lang::end_of_number(st, "integer")?;
            return Ok(st.token(kind, start));
        }

        let mut kind = TokenKind::DECIMAL;
        lang::digits(st, self, "decimal", is_digit)?;

        if st.cursor.is(b'.') && (st.cursor.getn(1) != Some(b'.') || !self.range_symbol) {
            st.cursor.inc();
            kind = TokenKind::FLOAT;
            lang::digits(st, self, "decimal", is_digit)?;
        }

        if matches!(st.cursor.get(), Some(b'e' | b'E')) {
            st.cursor.inc();
            kind = TokenKind::FLOAT;

            if matches!(st.cursor.get(), Some(b'+' | b'-')) {
                st.cursor.inc();
            }

            lang::digits(st, self, "decimal", is_digit)?;
        }

        let constant = if kind == TokenKind::FLOAT { "floating" } else { "integer" };
        lang::end_of_number(st, constant)?;
        Ok(st.token(kind, start))
    }

    // 'it''s', #13#10, 'a'#9'b'
    fn string<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();

        let mut part = if st.cursor.is(b'#') { Part::Control } else { Part::Quoted };
        st.cursor.inc();

        loop {
            match part {
                Part::Quoted => match st.cursor.get() {
                    Some(b'\'') => {
                        st.cursor.inc();

                        match st.cursor.get() {
                            Some(b'\'') => {
                                st.cursor.inc();
                            }

                            Some(b'#') => {
                                st.cursor.inc();
                                part = Part::Control;
                            }

                            _ => break,
                        }
                    }

                    None | Some(b'\n') => return Err(st.error(ErrorKind::UnterminatedString)),

                    Some(_) => {
                        st.cursor.inc();
                    }
                },

                Part::Control => {
                    if st.cursor.eat_while(is_digit) == 0 {
                        return Err(st.error(ErrorKind::ControlString));
                    }

                    match st.cursor.get() {
                        Some(b'#') => {
                            st.cursor.inc();
                        }

                        Some(b'\'') => {
                            st.cursor.inc();
                            part = Part::Quoted;
                        }

                        _ => break,
                    }
                }
            }
        }

        Ok(st.token(TokenKind::STRING, start))
    }
}

impl Scan for Pascal {
    fn scan<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        match st.cursor.get() {
            Some(c) if is_alpha(c) => self.id(st),
            Some(c) if is_digit(c) || matches!(c, b'$' | b'&' | b'%') => self.number(st),
            Some(b'\'' | b'#') => self.string(st),
            _ => Err(lang::invalid_character(st, self)),
        }
    }

    fn format_byte(&self, c: Option<u8>) -> String {
        lang::format_with(c, |c| format!("#{}", c))
    }

    fn blocks(&self) -> Vec<Block> {
        vec![
            Block::LineComment { begin: Delimiter::builtin("//") },
            Block::BlockDirective { begin: Delimiter::builtin("(*$"), end: Delimiter::builtin("*)") },
            Block::BlockDirective { begin: Delimiter::builtin("{$"), end: Delimiter::builtin("}") },
            Block::BlockComment { begin: Delimiter::builtin("(*"), end: Delimiter::builtin("*)") },
            Block::BlockComment { begin: Delimiter::builtin("{"), end: Delimiter::builtin("}") },
        ]
    }

    fn literal_ahead(&self, rest: &[u8]) -> bool {
        match rest {
            [b'$', c, ..] => is_xdigit(*c),
            [b'&', c, ..] => is_odigit(*c),
            [b'%', c, ..] => is_bdigit(*c),
            [b'#', c, ..] => is_digit(*c),
            _ => false,
        }
    }
}
