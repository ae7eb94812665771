use subenum::subenum;

#[subenum(NumberKind, StringKind, BlockKind)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    ID,

    // the lexeme is the tag
    SYMBOL,

    #[subenum(NumberKind)]
    DECIMAL,

    #[subenum(NumberKind)]
    HEXADECIMAL,

    #[subenum(NumberKind)]
    OCTAL,

    #[subenum(NumberKind)]
    BINARY,

    #[subenum(NumberKind)]
    FLOAT,

    #[subenum(StringKind)]
    STRING,

    #[subenum(StringKind)]
    CHAR,

    #[subenum(StringKind)]
    WIDESTRING,

    #[subenum(StringKind)]
    WIDECHAR,

    #[subenum(StringKind)]
    UTF8STRING,

    #[subenum(StringKind)]
    UTF8CHAR,

    #[subenum(StringKind)]
    UTF16STRING,

    #[subenum(StringKind)]
    UTF16CHAR,

    #[subenum(StringKind)]
    UTF32STRING,

    #[subenum(StringKind)]
    UTF32CHAR,

    #[subenum(StringKind)]
    RAWSTRING,

    #[subenum(StringKind)]
    RAWWIDESTRING,

    #[subenum(StringKind)]
    RAWUTF16STRING,

    #[subenum(StringKind)]
    RAWUTF32STRING,

    #[subenum(BlockKind)]
    LINECOMMENT,

    #[subenum(BlockKind)]
    BLOCKCOMMENT,

    #[subenum(BlockKind)]
    FREEFORM,

    #[subenum(BlockKind)]
    LINEDIRECTIVE,

    #[subenum(BlockKind)]
    BLOCKDIRECTIVE,

    EOF,
}

impl TokenKind {
    /// The tag reported to callers, `None` for symbols whose tag is the lexeme.
    pub fn tag(&self) -> Option<&'static str> {
        let tag = match self {
            TokenKind::ID => "<id>",
            TokenKind::SYMBOL => return None,
            TokenKind::DECIMAL => "<decimal>",
            TokenKind::HEXADECIMAL => "<hexadecimal>",
            TokenKind::OCTAL => "<octal>",
            TokenKind::BINARY => "<binary>",
            TokenKind::FLOAT => "<float>",
            TokenKind::STRING => "<string>",
            TokenKind::CHAR => "<char>",
            TokenKind::WIDESTRING => "<widestring>",
            TokenKind::WIDECHAR => "<widechar>",
            TokenKind::UTF8STRING => "<utf8string>",
            TokenKind::UTF8CHAR => "<utf8char>",
            TokenKind::UTF16STRING => "<utf16string>",
            TokenKind::UTF16CHAR => "<utf16char>",
            TokenKind::UTF32STRING => "<utf32string>",
            TokenKind::UTF32CHAR => "<utf32char>",
            TokenKind::RAWSTRING => "<rawstring>",
            TokenKind::RAWWIDESTRING => "<rawwidestring>",
            TokenKind::RAWUTF16STRING => "<rawutf16string>",
            TokenKind::RAWUTF32STRING => "<rawutf32string>",
            TokenKind::LINECOMMENT => "<linecomment>",
            TokenKind::BLOCKCOMMENT => "<blockcomment>",
            TokenKind::FREEFORM => "<freeform>",
            TokenKind::LINEDIRECTIVE => "<linedirective>",
            TokenKind::BLOCKDIRECTIVE => "<blockdirective>",
            TokenKind::EOF => "<eof>",
        };

        Some(tag)
    }

    pub fn is_number(&self) -> bool {
        NumberKind::try_from(*self).is_ok()
    }

    pub fn is_string(&self) -> bool {
        StringKind::try_from(*self).is_ok()
    }

    pub fn is_block(&self) -> bool {
        BlockKind::try_from(*self).is_ok()
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::LINECOMMENT | TokenKind::BLOCKCOMMENT)
    }
}

impl StringKind {
    /// Picks the literal kind from an encoding prefix (`""`, `"wide"`,
    /// `"utf8"`, `"utf16"`, `"utf32"`) and the quote character.
    pub fn quoted(prefix: &str, quote: u8) -> Self {
        let string = quote == b'"';

        match (prefix, string) {
            ("wide", true) => StringKind::WIDESTRING,
            ("wide", false) => StringKind::WIDECHAR,
            ("utf8", true) => StringKind::UTF8STRING,
            ("utf8", false) => StringKind::UTF8CHAR,
            ("utf16", true) => StringKind::UTF16STRING,
            ("utf16", false) => StringKind::UTF16CHAR,
            ("utf32", true) => StringKind::UTF32STRING,
            ("utf32", false) => StringKind::UTF32CHAR,
            (_, true) => StringKind::STRING,
            (_, false) => StringKind::CHAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'s> {
    kind: TokenKind,
    lexeme: &'s str,
    line: u32,
    offset: usize,
}

impl<'s> Token<'s> {
    pub fn new(kind: TokenKind, lexeme: &'s str, line: u32, offset: usize) -> Self {
        Token { kind, lexeme, line, offset }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn lexeme(&self) -> &'s str {
        self.lexeme
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn tag(&self) -> &'s str {
        self.kind.tag().unwrap_or(self.lexeme)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EOF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_tagged_by_lexeme() {
        let tok = Token::new(TokenKind::SYMBOL, "::", 3, 10);
        assert_eq!(tok.tag(), "::");
        assert_eq!(Token::new(TokenKind::ID, "x", 1, 0).tag(), "<id>");
    }

    #[test]
    fn subkinds() {
        assert!(TokenKind::HEXADECIMAL.is_number());
        assert!(TokenKind::RAWUTF16STRING.is_string());
        assert!(TokenKind::FREEFORM.is_block());
        assert!(!TokenKind::FREEFORM.is_comment());
        assert_eq!(TokenKind::from(StringKind::quoted("utf8", b'\'')), TokenKind::UTF8CHAR);
        assert_eq!(TokenKind::from(StringKind::quoted("", b'"')).tag(), Some("<string>"));
    }
}
