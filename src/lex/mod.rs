pub mod block;
pub mod cached_lexer;
pub mod charclass;
pub mod cursor;
pub mod error;
pub mod lang;
pub mod lexer;
pub mod options;
pub mod symbol;
pub mod token;

pub use error::{ ConfigError, Error, ErrorKind };
pub use lang::Syntax;
pub use lexer::Lexer;
pub use options::Options;
pub use token::{ Token, TokenKind };

/// Lexes the whole input, the final `EOF` token included.
pub fn lex_all<'s>(lx: &mut Lexer<'s>) -> error::Result<Vec<Token<'s>>> {
    let mut out = Vec::new();

    loop {
        let tok = lx.lex()?;
        let eof = tok.is_eof();
        out.push(tok);

        if eof {
            break;
        }
    }

    Ok(out)
}
