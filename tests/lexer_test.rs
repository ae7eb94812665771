use ddlt::lex::block::MAX_BLOCKS;
use ddlt::lex::error::{ ConfigError, ErrorKind };
use ddlt::lex::lang::Syntax;
use ddlt::lex::lexer::Lexer;
use ddlt::lex::options::Options;
use ddlt::lex::token::TokenKind::{ self, * };
use ddlt::lex::lex_all;
use ddlt::value::Value;

fn lexer<'s>(source: &'s str, syntax: Syntax, symbols: &[&str]) -> Lexer<'s> {
    let options = Options::new(source, "test", syntax).symbols(symbols.iter().copied());
    Lexer::new(options).unwrap()
}

// (tag, lexeme) of every token, EOF included
fn tags(source: &str, syntax: Syntax, symbols: &[&str]) -> Vec<(String, String)> {
    let mut lx = lexer(source, syntax, symbols);

    lex_all(&mut lx)
        .unwrap()
        .into_iter()
        .map(|tok| (tok.tag().to_string(), tok.lexeme().to_string()))
        .collect()
}

fn kinds(source: &str, syntax: Syntax, symbols: &[&str]) -> Vec<TokenKind> {
    let mut lx = lexer(source, syntax, symbols);

    lex_all(&mut lx)
        .unwrap()
        .into_iter()
        .map(|tok| *tok.kind())
        .collect()
}

// message of the first error
fn error(source: &str, syntax: Syntax, symbols: &[&str]) -> String {
    let mut lx = lexer(source, syntax, symbols);

    loop {
        match lx.lex() {
            Ok(tok) if tok.is_eof() => panic!("no error in {:?}", source),
            Ok(_) => continue,
            Err(e) => return e.to_string(),
        }
    }
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(tag, lexeme)| (tag.to_string(), lexeme.to_string()))
        .collect()
}

/* --- driver --- */

#[test]
fn symbols_and_identifiers() {
    let got = tags("int x = a->b;", Syntax::Cpp, &["=", "-", "->", ";"]);
    let exp = pairs(&[
        ("<id>", "int"),
        ("<id>", "x"),
        ("=", "="),
        ("<id>", "a"),
        ("->", "->"),
        ("<id>", "b"),
        (";", ";"),
        ("<eof>", ""),
    ]);
    assert_eq!(got, exp);
}

#[test]
fn longest_symbol_wins() {
    assert_eq!(
        kinds("a == b = c", Syntax::Cpp, &["=", "=="]),
        vec![ID, SYMBOL, ID, SYMBOL, ID, EOF],
    );

    let got = tags("a==b", Syntax::Cpp, &["=", "=="]);
    assert_eq!(got[1], ("==".to_string(), "==".to_string()));
}

#[test]
fn symbols_shadow_identifiers() {
    let got = tags("android", Syntax::Cpp, &["and"]);
    assert_eq!(got, pairs(&[("and", "and"), ("<id>", "roid"), ("<eof>", "")]));
}

#[test]
fn offsets_point_at_lexemes() {
    let mut lx = lexer("ab  cd", Syntax::Cpp, &[]);
    let toks = lex_all(&mut lx).unwrap();

    let offsets: Vec<usize> = toks.iter().map(|t| t.offset()).collect();
    assert_eq!(offsets, vec![0, 4, 6]);
}

#[test]
fn eof_is_idempotent() {
    let mut lx = lexer("x\n", Syntax::Cpp, &[]);
    lx.lex().unwrap();

    let first = lx.lex().unwrap();
    assert!(first.is_eof());

    for _ in 0..3 {
        assert_eq!(lx.lex().unwrap(), first);
    }

    assert_eq!((first.line(), first.offset()), (2, 2));
    assert!(lx.ok());
}

#[test]
fn lines_count_consumed_newlines() {
    let mut lx = Lexer::new(
        Options::new("a\nb\r\n\nc /* \n */ d", "test", Syntax::Cpp).startline(10)
    ).unwrap();

    let lines: Vec<(String, u32)> = lex_all(&mut lx)
        .unwrap()
        .into_iter()
        .map(|t| (t.lexeme().to_string(), t.line()))
        .collect();

    assert_eq!(lines, vec![
        ("a".to_string(), 10),
        ("b".to_string(), 11),
        ("c".to_string(), 13),
        ("/* \n */".to_string(), 13),
        ("d".to_string(), 14),
        ("".to_string(), 14),
    ]);
}

#[test]
fn errors_name_file_and_line() {
    let mut lx = lexer("a\n\n$", Syntax::Cpp, &[]);
    lx.lex().unwrap();

    let err = lx.lex().unwrap_err();
    assert_eq!(err.file(), "test");
    assert_eq!(err.line(), 3);
    assert_eq!(err.kind(), &ErrorKind::InvalidCharacter("'$'".to_string()));
    assert_eq!(err.to_string(), "test:3: invalid character in input: '$'");
    assert!(!lx.ok());
}

#[test]
fn stray_carriage_return() {
    assert_eq!(
        error("a\rb", Syntax::Cpp, &[]),
        "test:1: carriage return without a following line feed"
    );
}

/* --- blocks --- */

#[test]
fn comments_and_directives() {
    let mut lx = lexer("a // c\n/* x\ny */ b\n#include <x>\n", Syntax::Cpp, &[]);
    let toks = lex_all(&mut lx).unwrap();

    let got: Vec<(TokenKind, &str, u32)> = toks.iter().map(|t| (*t.kind(), t.lexeme(), t.line())).collect();
    assert_eq!(got, vec![
        (ID, "a", 1),
        (LINECOMMENT, "// c\n", 1),
        (BLOCKCOMMENT, "/* x\ny */", 2),
        (ID, "b", 3),
        (LINEDIRECTIVE, "#include <x>\n", 4),
        (EOF, "", 5),
    ]);
}

#[test]
fn directive_lexeme_starts_at_the_line() {
    let mut lx = lexer("x\n  #define X 1", Syntax::Cpp, &[]);
    let toks = lex_all(&mut lx).unwrap();

    assert_eq!(*toks[1].kind(), LINEDIRECTIVE);
    assert_eq!(toks[1].lexeme(), "  #define X 1");
    assert_eq!(toks[1].offset(), 2);
}

#[test]
fn directive_must_be_alone() {
    assert_eq!(
        error("  x = 1 # directive", Syntax::Cpp, &["="]),
        "test:1: directives must be the only thing in a line"
    );
}

#[test]
fn configured_directives() {
    let options = Options::new("#a\n  #b\nx", "test", Syntax::Bas).directive("#", false);
    let mut lx = Lexer::new(options).unwrap();
    let toks = lex_all(&mut lx).unwrap();

    let got: Vec<(TokenKind, &str)> = toks.iter().map(|t| (*t.kind(), t.lexeme())).collect();
    assert_eq!(got, vec![
        (LINEDIRECTIVE, "#a\n"),
        (LINEDIRECTIVE, "  #b\n"),
        (ID, "x"),
        (EOF, ""),
    ]);
}

#[test]
fn directives_at_the_start_of_the_line() {
    let options = Options::new("#x\n  #x", "test", Syntax::Bas).directive("#", true);
    let mut lx = Lexer::new(options).unwrap();

    assert_eq!(*lx.lex().unwrap().kind(), LINEDIRECTIVE);

    let err = lx.lex().unwrap_err();
    assert_eq!(*err.kind(), ErrorKind::DirectiveNotAtStart);
    assert_eq!(err.to_string(), "test:2: directives must start at the beginning of the line");
}

#[test]
fn unterminated_comment() {
    assert!(error("/* never closed", Syntax::Cpp, &[]).ends_with("unterminated comment"));
}

#[test]
fn freeform_blocks_nest() {
    let options = Options::new("{% {% x %} %} y", "test", Syntax::Cpp).freeform("{%", "%}");
    let mut lx = Lexer::new(options).unwrap();
    let toks = lex_all(&mut lx).unwrap();

    assert_eq!(*toks[0].kind(), FREEFORM);
    assert_eq!(toks[0].lexeme(), "{% {% x %} %}");
    assert_eq!(toks[1].lexeme(), "y");
}

#[test]
fn freeform_with_equal_delimiters_does_not_nest() {
    let options = Options::new("`` a `` b", "test", Syntax::Cpp).freeform("``", "``");
    let mut lx = Lexer::new(options).unwrap();
    let toks = lex_all(&mut lx).unwrap();

    assert_eq!(toks[0].lexeme(), "`` a ``");
    assert_eq!(toks[1].lexeme(), "b");
}

#[test]
fn unterminated_freeform() {
    let options = Options::new("{% {% %}", "test", Syntax::Cpp).freeform("{%", "%}");
    let mut lx = Lexer::new(options).unwrap();

    assert_eq!(lx.lex().unwrap_err().to_string(), "test:1: unterminated free-form block");
}

/* --- configuration --- */

#[test]
fn bad_delimiters_are_rejected() {
    let long = "x".repeat(16);

    let options = Options::new("", "test", Syntax::Cpp).freeform(long.as_str(), "}");
    assert!(matches!(Lexer::new(options), Err(ConfigError::DelimiterTooLong(_))));

    let options = Options::new("", "test", Syntax::Cpp).freeform("", "}");
    assert!(matches!(Lexer::new(options), Err(ConfigError::EmptyDelimiter)));
}

#[test]
fn startline_must_be_positive() {
    let options = Options::new("x", "test", Syntax::Cpp).startline(0);
    assert!(matches!(Lexer::new(options), Err(ConfigError::WrongType { option: "startline", .. })));
}

#[test]
fn block_registry_is_bounded() {
    // cpp brings three blocks of its own
    let mut options = Options::new("", "test", Syntax::Cpp);
    for _ in 0..MAX_BLOCKS - 3 {
        options = options.freeform("<<", ">>");
    }
    assert!(Lexer::new(options.clone()).is_ok());

    let options = options.freeform("<<", ">>");
    assert!(matches!(Lexer::new(options), Err(ConfigError::TooManyBlocks)));
}

#[test]
fn lexer_from_an_option_table() {
    let value: Value = [
        ("source", Value::from("begin x := 1 end")),
        ("file", Value::from("prog.pas")),
        ("language", Value::from("pas")),
        ("symbols", Value::from(vec![Value::from(":=")])),
    ]
    .into_iter()
    .collect();

    let mut lx = Lexer::new(Options::from_value(&value).unwrap()).unwrap();
    assert_eq!(lx.syntax(), Syntax::Pas);
    assert_eq!(lx.file(), "prog.pas");

    let toks = lex_all(&mut lx).unwrap();
    let got: Vec<&str> = toks.iter().map(|t| t.tag()).collect();
    assert_eq!(got, vec!["<id>", "<id>", ":=", "<decimal>", "<id>", "<eof>"]);
}

#[test]
fn directives_from_an_option_table() {
    let value: Value = [
        ("source", Value::from("  #x\n@y\n")),
        ("file", Value::from("a.bas")),
        ("language", Value::from("bas")),
        ("symbols", Value::List(Vec::new())),
        ("directives", Value::from(vec![
            Value::from("#"),
            Value::from(vec![Value::from("@"), Value::from(true)]),
        ])),
    ]
    .into_iter()
    .collect();

    let options = Options::from_value(&value).unwrap();
    assert_eq!(options.directives, [("#".to_string(), false), ("@".to_string(), true)]);

    let mut lx = Lexer::new(options).unwrap();
    let toks = lex_all(&mut lx).unwrap();
    let got: Vec<&str> = toks.iter().map(|t| t.lexeme()).collect();
    assert_eq!(got, vec!["  #x\n", "@y\n", ""]);
}

/* --- C family --- */

#[test]
fn cpp_numbers() {
    let got = kinds("0x1F 0b101 017 0 42 1'000 3.14 .5 1e10 2.f 10ul 7_km", Syntax::Cpp, &["."]);
    assert_eq!(got, vec![
        HEXADECIMAL, BINARY, OCTAL, DECIMAL, DECIMAL, DECIMAL,
        FLOAT, FLOAT, FLOAT, FLOAT, DECIMAL, DECIMAL, EOF,
    ]);

    let got = tags("1'000 10ul 7_km", Syntax::Cpp, &[]);
    assert_eq!(got[0].1, "1'000");
    assert_eq!(got[1].1, "10ul");
    assert_eq!(got[2].1, "7_km");
}

#[test]
fn cpp_number_errors() {
    assert_eq!(error("123abc", Syntax::Cpp, &[]), "test:1: invalid suffix \"abc\" on integer constant");
    assert_eq!(error("089", Syntax::Cpp, &[]), "test:1: invalid digit '8' in octal constant");
    assert_eq!(error("0x", Syntax::Cpp, &[]), "test:1: invalid digit eof in hexadecimal constant");
    assert_eq!(error("0x'1", Syntax::Cpp, &[]), "test:1: digit separator before any digits");
}

#[test]
fn cpp_strings() {
    let got = kinds(r#""a\"b" 'c' L"w" u8"x" u'y' U"z" R"(raw)" LR"d(x)d""#, Syntax::Cpp, &[]);
    assert_eq!(got, vec![
        STRING, CHAR, WIDESTRING, UTF8STRING, UTF16CHAR, UTF32STRING, RAWSTRING, RAWWIDESTRING, EOF,
    ]);

    let got = tags(r#"R"d(a)" b)d" x"#, Syntax::Cpp, &[]);
    assert_eq!(got[0], ("<rawstring>".to_string(), r#"R"d(a)" b)d""#.to_string()));
}

#[test]
fn cpp_raw_strings_count_lines() {
    let mut lx = lexer("R\"(a\nb)\" c", Syntax::Cpp, &[]);
    let toks = lex_all(&mut lx).unwrap();

    assert_eq!((toks[1].lexeme(), toks[1].line()), ("c", 2));
}

#[test]
fn cpp_string_errors() {
    assert_eq!(error(r#""\q""#, Syntax::Cpp, &[]), "test:1: unknown escape sequence: 'q'");
    assert_eq!(error(r#""\x""#, Syntax::Cpp, &[]), "test:1: \\x used with no following hex digits");
    assert_eq!(error(r#""\u12""#, Syntax::Cpp, &[]), "test:1: \\u needs 4 hexadecimal digits");
    assert_eq!(error("\"abc", Syntax::Cpp, &[]), "test:1: unterminated string");
    assert_eq!(error("'a\n'", Syntax::Cpp, &[]), "test:1: unterminated char");
    assert_eq!(
        error(r#"R"abc(x)ab""#, Syntax::Cpp, &[]),
        "test:1: missing raw string terminating delimiter )abc"
    );
}

#[test]
fn cpp_control_bytes_are_rendered_in_octal() {
    assert_eq!(error("\x01", Syntax::Cpp, &[]), "test:1: invalid character in input: '\\001'");
}

/* --- BASIC --- */

#[test]
fn bas_numbers() {
    let got = tags("X = &HFF + &O17 + &B101 + 10% + 1.5! + 3# + .5", Syntax::Bas, &["=", "+"]);
    let literals: Vec<(String, String)> = got.into_iter().filter(|(tag, _)| tag != "+").collect();

    assert_eq!(literals, pairs(&[
        ("<id>", "X"),
        ("=", "="),
        ("<hexadecimal>", "&HFF"),
        ("<octal>", "&O17"),
        ("<binary>", "&B101"),
        ("<decimal>", "10%"),
        ("<float>", "1.5!"),
        ("<float>", "3#"),
        ("<float>", ".5"),
        ("<eof>", ""),
    ]));
}

#[test]
fn bas_comments_and_strings() {
    let mut lx = lexer("REM a comment\nPRINT \"say \"\"hi\"\"\" ' done\nREMARK", Syntax::Bas, &[]);
    let toks = lex_all(&mut lx).unwrap();

    let got: Vec<(TokenKind, &str, u32)> = toks.iter().map(|t| (*t.kind(), t.lexeme(), t.line())).collect();
    assert_eq!(got, vec![
        (LINECOMMENT, "REM a comment\n", 1),
        (ID, "PRINT", 2),
        (STRING, "\"say \"\"hi\"\"\"", 2),
        (LINECOMMENT, "' done\n", 2),
        (ID, "REMARK", 3),
        (EOF, "", 3),
    ]);
}

#[test]
fn bas_ampersand_symbol_before_identifiers() {
    let got = tags("s &b &h1F &o9", Syntax::Bas, &["&"]);

    assert_eq!(got, pairs(&[
        ("<id>", "s"),
        ("&", "&"),
        ("<id>", "b"),
        ("<hexadecimal>", "&h1F"),
        ("&", "&"),
        ("<id>", "o9"),
        ("<eof>", ""),
    ]));
}

#[test]
fn bas_errors() {
    assert_eq!(error("&Z1", Syntax::Bas, &[]), "test:1: invalid integer prefix \"&'Z'\"");
    assert_eq!(error("\"open", Syntax::Bas, &[]), "test:1: unterminated string");
    assert_eq!(error("\t$", Syntax::Bas, &[]), "test:1: invalid character in input: '$'");
    assert_eq!(error("\x07", Syntax::Bas, &[]), "test:1: invalid character in input: Chr(7)");
}

/* --- Pascal --- */

#[test]
fn pas_numbers_and_ranges() {
    let got = tags("x := $FF + &17 + %101 + 1.5e3; a[1..2]", Syntax::Pas, &["..", ":=", ";", "[", "]", "+"]);
    let literals: Vec<(String, String)> = got.into_iter().filter(|(tag, _)| tag != "+").collect();

    assert_eq!(literals, pairs(&[
        ("<id>", "x"),
        (":=", ":="),
        ("<hexadecimal>", "$FF"),
        ("<octal>", "&17"),
        ("<binary>", "%101"),
        ("<float>", "1.5e3"),
        (";", ";"),
        ("<id>", "a"),
        ("[", "["),
        ("<decimal>", "1"),
        ("..", ".."),
        ("<decimal>", "2"),
        ("]", "]"),
        ("<eof>", ""),
    ]));
}

#[test]
fn pas_strings() {
    let got = tags("'it''s'#13#10 #9'tab'", Syntax::Pas, &[]);
    assert_eq!(got, pairs(&[
        ("<string>", "'it''s'#13#10"),
        ("<string>", "#9'tab'"),
        ("<eof>", ""),
    ]));

    assert_eq!(error("#x", Syntax::Pas, &[]), "test:1: control string used with no following digits");
    assert_eq!(error("'open", Syntax::Pas, &[]), "test:1: unterminated string");
}

#[test]
fn pas_blocks() {
    let got = kinds("{ c } (* d *) {$I x} (*$R+*) // e", Syntax::Pas, &[]);
    assert_eq!(got, vec![BLOCKCOMMENT, BLOCKCOMMENT, BLOCKDIRECTIVE, BLOCKDIRECTIVE, LINECOMMENT, EOF]);
}

/* --- assembly --- */

#[test]
fn asm_listing() {
    let source = "mov ax, 0FFh ; load\nmov bl, 'a'\ndb \"x\"\"y\", 101b, 17o, 42\nCOMMENT ! multi\nline ! nop";
    let mut lx = lexer(source, Syntax::Asm, &[","]);
    let toks = lex_all(&mut lx).unwrap();

    let got: Vec<(TokenKind, &str, u32)> = toks
        .iter()
        .filter(|t| *t.kind() != SYMBOL)
        .map(|t| (*t.kind(), t.lexeme(), t.line()))
        .collect();

    assert_eq!(got, vec![
        (ID, "mov", 1),
        (ID, "ax", 1),
        (HEXADECIMAL, "0FFh", 1),
        (LINECOMMENT, "; load\n", 1),
        (ID, "mov", 2),
        (ID, "bl", 2),
        (CHAR, "'a'", 2),
        (ID, "db", 3),
        (STRING, "\"x\"\"y\"", 3),
        (BINARY, "101b", 3),
        (OCTAL, "17o", 3),
        (DECIMAL, "42", 3),
        (BLOCKCOMMENT, "COMMENT ! multi\nline !", 4),
        (ID, "nop", 5),
        (EOF, "", 5),
    ]);
}

#[test]
fn asm_identifiers() {
    assert_eq!(kinds("@@loop ?tmp _x1", Syntax::Asm, &[]), vec![ID, ID, ID, EOF]);
}

#[test]
fn asm_errors() {
    assert_eq!(error("19o", Syntax::Asm, &[]), "test:1: invalid digit '9' in octal constant");
    assert_eq!(error("'ab'", Syntax::Asm, &[]), "test:1: multibyte character literals are not supported");
    assert_eq!(error("COMMENT !never", Syntax::Asm, &[]), "test:1: unterminated comment");
    assert_eq!(error("\u{1}", Syntax::Asm, &[]), "test:1: invalid character in input: 01h");
}
