use crate::lex::block::{ self, Block, BlockRegistry };
use crate::lex::charclass::is_space;
use crate::lex::cursor::Cursor;
use crate::lex::error::{ ConfigError, Error, ErrorKind, Result };
use crate::lex::lang::{ Language, Scan, Syntax };
use crate::lex::options::Options;
use crate::lex::symbol::SymbolTable;
use crate::lex::token::{ Token, TokenKind };

/// Scanning position shared by the driver, the block scanners and the
/// language plugins.
pub struct State<'s> {
    pub(crate) cursor: Cursor<'s>,
    pub(crate) file: String,
    // line of the cursor
    pub(crate) line: u32,
    pub(crate) line_start: usize,
    // line where the token being scanned started
    pub(crate) la_line: u32,
}

impl<'s> State<'s> {
    fn new(input: &'s str, file: String, line: u32) -> Self {
        State {
            cursor: Cursor::new(input, 0),
            file,
            line,
            line_start: 0,
            la_line: line,
        }
    }

    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    pub fn input(&self) -> &'s str {
        self.cursor.input()
    }

    /// Steps over the `\n` under the cursor.
    pub(crate) fn newline(&mut self) {
        self.cursor.inc();
        self.line += 1;
        self.line_start = self.cursor.pos();
    }

    /// Advances `n` bytes, keeping track of the newlines stepped over.
    pub(crate) fn advance_lines(&mut self, n: usize) {
        for _ in 0..n {
            if self.cursor.is(b'\n') {
                self.newline();
            }
            else {
                self.cursor.inc();
            }
        }
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> Error {
        Error::new(self.file.clone(), self.line, kind)
    }

    pub(crate) fn token(&self, kind: TokenKind, start: usize) -> Token<'s> {
        let lexeme = &self.input()[start..self.pos()];
        Token::new(kind, lexeme, self.la_line, start)
    }
}

pub struct Lexer<'s> {
    state: State<'s>,
    language: Language,
    blocks: BlockRegistry,
    symbols: SymbolTable,
    errored: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(options: Options<'s>) -> std::result::Result<Self, ConfigError> {
        if options.startline == 0 {
            return Err(ConfigError::WrongType { option: "startline", expected: "a positive integer" });
        }

        let symbols = SymbolTable::new(&options.symbols);
        let language = Language::new(options.syntax, &symbols);

        let mut blocks = BlockRegistry::new();

        for builtin in language.blocks() {
            blocks.push(builtin)?;
        }

        for (begin, at_start) in &options.directives {
            blocks.push(Block::line_directive(begin, *at_start)?)?;
        }

        for (begin, end) in &options.freeform {
            blocks.push(Block::free_form(begin, end)?)?;
        }

        Ok(Lexer {
            state: State::new(options.source, options.file, options.startline),
            language,
            blocks,
            symbols,
            errored: false,
        })
    }

    pub fn file(&self) -> &str {
        &self.state.file
    }

    /// The line the cursor is on.
    pub fn line(&self) -> u32 {
        self.state.line
    }

    pub fn syntax(&self) -> Syntax {
        self.language.syntax()
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Whether no call to [`Lexer::lex`] has failed so far.
    pub fn ok(&self) -> bool {
        !self.errored
    }

    /// Produces the next token. Once the input is exhausted every call
    /// returns the same `EOF` token.
    pub fn lex(&mut self) -> Result<Token<'s>> {
        let result = self.next_token();

        if result.is_err() {
            self.errored = true;
        }

        result
    }

    fn next_token(&mut self) -> Result<Token<'s>> {
        self.skip_trivia()?;

        let st = &mut self.state;
        st.la_line = st.line;

        let rest = st.cursor.rest();

        if rest.is_empty() {
            return Ok(st.token(TokenKind::EOF, st.pos()));
        }

        if let Some(found) = self.blocks.find(rest) {
            return block::scan_block(st, found);
        }

        if !self.language.literal_ahead(rest) {
            let n = self.symbols.longest_match(rest);

            if n > 0 {
                let start = st.pos();
                st.cursor.advance(n);
                return Ok(st.token(TokenKind::SYMBOL, start));
            }
        }

        self.language.scan(st)
    }

    fn skip_trivia(&mut self) -> Result<()> {
        let st = &mut self.state;

        loop {
            match st.cursor.get() {
                Some(b'\n') => st.newline(),

                Some(b'\r') if st.cursor.getn(1) == Some(b'\n') => {
                    st.cursor.inc();
                    st.newline();
                }

                Some(b'\r') => {
                    st.cursor.inc();
                    return Err(st.error(ErrorKind::StrayCarriageReturn));
                }

                Some(c) if is_space(c) => {
                    st.cursor.inc();
                }

                _ => return Ok(()),
            }
        }
    }
}
