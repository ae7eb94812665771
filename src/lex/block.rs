use std::fmt::{ Display, Formatter, Result as FMTResult };

use crate::lex::charclass::is_space;
use crate::lex::error::{ ConfigError, ErrorKind, Result };
use crate::lex::lexer::State;
use crate::lex::token::{ Token, TokenKind };

/// Longest accepted block delimiter, in bytes.
pub const DELIM_MAX: usize = 15;

/// Most blocks a single lexer can register, built-in ones included.
pub const MAX_BLOCKS: usize = 16;

/// A non-empty block delimiter of at most [`DELIM_MAX`] bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delimiter(Box<str>);

impl Delimiter {
    pub fn new(delim: &str) -> std::result::Result<Self, ConfigError> {
        if delim.is_empty() {
            Err(ConfigError::EmptyDelimiter)
        }
        else if delim.len() > DELIM_MAX {
            Err(ConfigError::DelimiterTooLong(delim.to_string()))
        }
        else {
            Ok(Delimiter(delim.into()))
        }
    }

    // only for the delimiters the language plugins hard code
    pub(crate) fn builtin(delim: &'static str) -> Self {
        debug_assert!(!delim.is_empty() && delim.len() <= DELIM_MAX);
        Delimiter(delim.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Display for Delimiter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    LineComment { begin: Delimiter },
    BlockComment { begin: Delimiter, end: Delimiter },
    FreeForm { begin: Delimiter, end: Delimiter },
    LineDirective { begin: Delimiter, at_start: bool },
    BlockDirective { begin: Delimiter, end: Delimiter },
}

impl Block {
    pub fn line_comment(begin: &str) -> std::result::Result<Self, ConfigError> {
        Ok(Block::LineComment { begin: Delimiter::new(begin)? })
    }

    pub fn block_comment(begin: &str, end: &str) -> std::result::Result<Self, ConfigError> {
        Ok(Block::BlockComment { begin: Delimiter::new(begin)?, end: Delimiter::new(end)? })
    }

    pub fn free_form(begin: &str, end: &str) -> std::result::Result<Self, ConfigError> {
        Ok(Block::FreeForm { begin: Delimiter::new(begin)?, end: Delimiter::new(end)? })
    }

    pub fn line_directive(begin: &str, at_start: bool) -> std::result::Result<Self, ConfigError> {
        Ok(Block::LineDirective { begin: Delimiter::new(begin)?, at_start })
    }

    pub fn block_directive(begin: &str, end: &str) -> std::result::Result<Self, ConfigError> {
        Ok(Block::BlockDirective { begin: Delimiter::new(begin)?, end: Delimiter::new(end)? })
    }

    pub fn begin(&self) -> &Delimiter {
        match self {
            Block::LineComment { begin }
            | Block::BlockComment { begin, .. }
            | Block::FreeForm { begin, .. }
            | Block::LineDirective { begin, .. }
            | Block::BlockDirective { begin, .. } => begin,
        }
    }

    pub fn end(&self) -> Option<&Delimiter> {
        match self {
            Block::BlockComment { end, .. }
            | Block::FreeForm { end, .. }
            | Block::BlockDirective { end, .. } => Some(end),

            Block::LineComment { .. } | Block::LineDirective { .. } => None,
        }
    }
}

/// Blocks in priority order, the first one whose `begin` matches wins.
#[derive(Clone, Debug, Default)]
pub struct BlockRegistry {
    blocks: Vec<Block>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        BlockRegistry { blocks: Vec::new() }
    }

    pub fn push(&mut self, block: Block) -> std::result::Result<(), ConfigError> {
        if self.blocks.len() == MAX_BLOCKS {
            return Err(ConfigError::TooManyBlocks);
        }

        self.blocks.push(block);
        Ok(())
    }

    pub fn find(&self, rest: &[u8]) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|block| rest.starts_with(block.begin().as_bytes()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Consumes the whole block starting at the cursor.
pub(crate) fn scan_block<'s>(st: &mut State<'s>, block: &Block) -> Result<Token<'s>> {
    match block {
        Block::LineComment { .. } =>
            line_comment(st, None),

        Block::LineDirective { at_start, .. } =>
            line_comment(st, Some(*at_start)),

        Block::BlockComment { begin, end } =>
            block_comment(st, begin, end, TokenKind::BLOCKCOMMENT),

        Block::BlockDirective { begin, end } =>
            block_comment(st, begin, end, TokenKind::BLOCKDIRECTIVE),

        Block::FreeForm { begin, end } =>
            free_form(st, begin, end),
    }
}

// `directive` carries the at-start flag of line directives
pub(crate) fn line_comment<'s>(st: &mut State<'s>, directive: Option<bool>) -> Result<Token<'s>> {
    let mut start = st.pos();
    let kind = if directive.is_some() { TokenKind::LINEDIRECTIVE } else { TokenKind::LINECOMMENT };

    if let Some(at_start) = directive {
        if at_start && start != st.line_start {
            return Err(st.error(ErrorKind::DirectiveNotAtStart));
        }

        let leading = &st.input().as_bytes()[st.line_start..start];

        if !leading.iter().all(|&c| is_space(c)) {
            return Err(st.error(ErrorKind::DirectiveNotAlone));
        }

        // the directive lexeme spans the whole line
        start = st.line_start;
    }

    match st.cursor.find(b"\n") {
        Some(n) => {
            st.cursor.advance(n);
            st.newline();
        }

        None => {
            st.cursor.to_end();
        }
    }

    Ok(st.token(kind, start))
}

fn block_comment<'s>(st: &mut State<'s>, begin: &Delimiter, end: &Delimiter, kind: TokenKind) -> Result<Token<'s>> {
    let start = st.pos();
    st.cursor.advance(begin.len());

    loop {
        match st.cursor.get() {
            None => return Err(st.error(ErrorKind::UnterminatedComment)),

            Some(b'\n') => st.newline(),

            Some(_) if st.cursor.starts_with(end.as_bytes()) => {
                st.cursor.advance(end.len());
                return Ok(st.token(kind, start));
            }

            Some(_) => {
                st.cursor.inc();
            }
        }
    }
}

fn free_form<'s>(st: &mut State<'s>, begin: &Delimiter, end: &Delimiter) -> Result<Token<'s>> {
    let start = st.pos();
    st.cursor.advance(begin.len());

    // identical delimiters cannot nest
    let nestable = begin != end;
    let mut nested = 0usize;

    loop {
        match st.cursor.get() {
            None => return Err(st.error(ErrorKind::UnterminatedFreeForm)),

            Some(b'\n') => st.newline(),

            Some(_) if nestable && st.cursor.starts_with(begin.as_bytes()) => {
                st.cursor.advance(begin.len());
                nested += 1;
            }

            Some(_) if st.cursor.starts_with(end.as_bytes()) => {
                st.cursor.advance(end.len());

                if nested == 0 {
                    return Ok(st.token(TokenKind::FREEFORM, start));
                }

                nested -= 1;
            }

            Some(_) => {
                st.cursor.inc();
            }
        }
    }
}
