use crate::lex::block::{ Block, Delimiter };
use crate::lex::charclass::{ is_asm_id_continue, is_asm_id_start, is_digit, is_print, is_space, is_xdigit };
use crate::lex::error::{ ErrorKind, Result };
use crate::lex::lang::{ self, bas, Scan };
use crate::lex::lexer::State;
use crate::lex::token::{ Token, TokenKind };

/// Intel style assembly: radix suffixes (`0FFh`, `17o`, `101b`), `@`/`?` in
/// identifiers and `COMMENT` blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Assembly;

impl Scan for Assembly {
    fn scan<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        match st.cursor.get() {
            Some(c) if is_asm_id_start(c) => self.id(st),
            Some(c) if is_digit(c) => self.number(st),
            Some(b'"') => bas::string(st),
            Some(b'\'') => self.char(st),
            _ => Err(lang::invalid_character(st, self)),
        }
    }

    fn format_byte(&self, c: Option<u8>) -> String {
        lang::format_with(c, |c| format!("{}{:02x}h", if c >= 0xa0 { "0" } else { "" }, c))
    }

    fn blocks(&self) -> Vec<Block> {
        vec![Block::LineComment { begin: Delimiter::builtin(";") }]
    }
}

impl Assembly {
    fn id<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();
        let length = st.cursor.eat_while(is_asm_id_continue);
        let lexeme = &st.input().as_bytes()[start..start + length];

        let comment = lexeme.eq_ignore_ascii_case(b"comment")
            && matches!(st.cursor.get(), Some(c) if is_space(c) || c == b'\n');

        if comment {
            return self.comment(st, start);
        }

        Ok(st.token(TokenKind::ID, start))
    }

    // COMMENT ! anything, newlines included, up to the next !
    fn comment<'s>(&self, st: &mut State<'s>, start: usize) -> Result<Token<'s>> {
        st.cursor.eat_while(is_space);

        let delim = match st.cursor.get() {
            Some(c) if is_print(c) && c != b' ' => c,
            c => return Err(st.error(ErrorKind::CommentDelimiter(self.format_byte(c)))),
        };

        st.cursor.inc();

        loop {
            match st.cursor.get() {
                None => return Err(st.error(ErrorKind::UnterminatedComment)),

                Some(b'\n') => st.newline(),

                Some(c) if c == delim => {
                    st.cursor.inc();
                    return Ok(st.token(TokenKind::BLOCKCOMMENT, start));
                }

                Some(_) => {
                    st.cursor.inc();
                }
            }
        }
    }

    fn number<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();
        let mut base: u32 = 2;

        while let Some(c) = st.cursor.get().filter(|&c| is_xdigit(c)) {
            // a b not followed by more digits is the binary suffix
            if matches!(c, b'b' | b'B') && !st.cursor.getn(1).is_some_and(is_xdigit) {
                break;
            }

            base = base.max(match c {
                b'0' | b'1' => 2,
                b'2'..=b'7' => 8,
                b'8' | b'9' => 10,
                _ => 16,
            });

            st.cursor.inc();
        }

        let (kind, constant, allowed) = match st.cursor.get() {
            Some(b'h' | b'H') => (TokenKind::HEXADECIMAL, "hexadecimal", 16),
            Some(b'o' | b'O') => (TokenKind::OCTAL, "octal", 8),
            Some(b'b' | b'B') => (TokenKind::BINARY, "binary", 2),
            _ => (TokenKind::DECIMAL, "decimal", 10),
        };

        if base > allowed {
            let digits = &st.input().as_bytes()[start..st.pos()];
            let offending = digits
                .iter()
                .copied()
                .find(|&c| (c as char).to_digit(16).is_some_and(|d| d >= allowed));

            return Err(st.error(ErrorKind::InvalidDigit { digit: self.format_byte(offending), base: constant }));
        }

        if kind != TokenKind::DECIMAL {
            st.cursor.inc();
        }

        lang::end_of_number(st, "integer")?;
        Ok(st.token(kind, start))
    }

    // 'c', exactly one printable byte
    fn char<'s>(&self, st: &mut State<'s>) -> Result<Token<'s>> {
        let start = st.pos();
        st.cursor.inc();

        if !st.cursor.get().is_some_and(is_print) {
            return Err(st.error(ErrorKind::InvalidCharLiteral));
        }

        st.cursor.inc();

        if !st.cursor.is(b'\'') {
            return Err(st.error(ErrorKind::MultibyteChar));
        }

        st.cursor.inc();
        Ok(st.token(TokenKind::CHAR, start))
    }
}
