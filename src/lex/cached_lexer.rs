use std::collections::VecDeque;

use crate::lex::error::Error;
use crate::lex::lexer::Lexer;
use crate::lex::token::Token;

/// A source of tokens that keeps returning its final token once the input
/// runs out.
pub trait TokenStream {
    type Token: Clone;
    type Error;

    fn next_token(&mut self) -> Result<Self::Token, Self::Error>;
}

impl<'s> TokenStream for Lexer<'s> {
    type Token = Token<'s>;
    type Error = Error;

    fn next_token(&mut self) -> Result<Token<'s>, Error> {
        self.lex()
    }
}

/// A token stream with unbounded lookahead.
pub struct CachedLexer<L: TokenStream> {
    lexer: L,
    cache: VecDeque<L::Token>,
}

impl<L: TokenStream> CachedLexer<L> {
    pub fn new(lexer: L) -> Self {
        CachedLexer {
            lexer,
            cache: VecDeque::new(),
        }
    }

    pub fn lexer(&self) -> &L {
        &self.lexer
    }

    pub fn ncached(&self) -> usize {
        self.cache.len()
    }

    pub fn lex(&mut self) -> Result<L::Token, L::Error> {
        if let Some(token) = self.cache.pop_front() {
            Ok(token)
        }
        else {
            self.lexer.next_token()
        }
    }

    // consumes n tokens and returns the last one
    pub fn eatn(&mut self, n: usize) -> Result<Option<L::Token>, L::Error> {
        let mut ret = None;
        for _ in 0..n {
            ret = Some(self.lex()?);
        }

        Ok(ret)
    }

    pub fn peek(&mut self) -> Result<&L::Token, L::Error> {
        self.peekn(0)
    }

    pub fn peekn(&mut self, n: usize) -> Result<&L::Token, L::Error> {
        while self.cache.len() <= n {
            let token = self.lexer.next_token()?;
            self.cache.push_back(token);
        }

        Ok(&self.cache[n])
    }
}

impl<'s> CachedLexer<Lexer<'s>> {
    pub fn ok(&self) -> bool {
        self.lexer.ok()
    }
}
