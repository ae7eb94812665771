use std::fs;
use std::path::Path;

use tempfile::TempDir;

use ddlt::cli::driver::{ self, EXIT_CONFIG, EXIT_INPUT, EXIT_OK, EXIT_OUTPUT, EXIT_SOURCE, EXIT_USAGE };
use ddlt::templ::lua::PRELUDE;

fn run(args: &[&str]) -> (i32, String) {
    let mut argv = vec!["ddlt".to_string()];
    argv.extend(args.iter().map(|s| s.to_string()));

    let mut out = Vec::new();
    let code = driver::run(argv, &mut out);

    (code, String::from_utf8(out).unwrap())
}

fn source(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

/* --- lex --- */

#[test]
fn lex_lists_tokens() {
    let dir = TempDir::new().unwrap();
    let file = source(&dir, "a.c", "x = 1;\n");

    let (code, out) = run(&["lex", "-s", "=", "-s", ";", &file]);

    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "1:0\t<id>\tx\n1:2\t=\t=\n1:4\t<decimal>\t1\n1:5\t;\t;\n2:7\t<eof>\t\n");
}

#[test]
fn lex_escapes_lexemes_and_skips_comments() {
    let dir = TempDir::new().unwrap();
    let file = source(&dir, "a.c", "// note\nx\n");

    let (_, out) = run(&["lex", &file]);
    assert_eq!(out.lines().next(), Some("1:0\t<linecomment>\t// note\\n"));

    let (code, out) = run(&["lex", "--skip-comments", &file]);
    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "2:8\t<id>\tx\n3:10\t<eof>\t\n");
}

#[test]
fn lex_languages_and_freeform() {
    let dir = TempDir::new().unwrap();
    let file = source(&dir, "a.pas", "<< raw >> $FF");

    let (code, out) = run(&["lex", "-l", "pas", "--freeform", "<<", ">>", "--startline", "7", &file]);

    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "7:0\t<freeform>\t<< raw >>\n7:10\t<hexadecimal>\t$FF\n7:13\t<eof>\t\n");
}

#[test]
fn lex_writes_the_output_file() {
    let dir = TempDir::new().unwrap();
    let file = source(&dir, "a.c", "y");
    let output = dir.path().join("tokens.txt");

    let (code, out) = run(&["lex", "-o", &output.display().to_string(), &file]);

    assert_eq!(code, EXIT_OK);
    assert!(out.is_empty());
    assert_eq!(fs::read_to_string(&output).unwrap(), "1:0\t<id>\ty\n1:1\t<eof>\t\n");
}

#[test]
fn lex_exit_codes() {
    let dir = TempDir::new().unwrap();
    let good = source(&dir, "good.c", "x");
    let bad = source(&dir, "bad.c", "x $");
    let missing = dir.path().join("missing.c").display().to_string();

    assert_eq!(run(&["lex", &missing]).0, EXIT_INPUT);
    assert_eq!(run(&["lex", "-l", "cobol", &good]).0, EXIT_CONFIG);
    assert_eq!(run(&["lex", "--freeform", "", "}", &good]).0, EXIT_CONFIG);
    assert_eq!(run(&["lex", &bad]).0, EXIT_SOURCE);
    assert_eq!(run(&["lex", "--no-such-flag", &good]).0, EXIT_USAGE);
    assert_eq!(run(&["lex"]).0, EXIT_USAGE);

    let unwritable = dir.path().join("no/such/dir/out.txt").display().to_string();
    assert_eq!(run(&["lex", "-o", &unwritable, &good]).0, EXIT_OUTPUT);
}

/* --- template --- */

#[test]
fn template_renders_with_defines() {
    let dir = TempDir::new().unwrap();
    let file = source(&dir, "t.tpl", "Hello, <%= name %>! <%! if n > 1 then %><%= n * 2 %><%! end %>");

    let (code, out) = run(&["template", "-D", "name=World", "-D", "n=21", &file]);

    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "Hello, World! 42");
}

#[test]
fn template_custom_tags() {
    let dir = TempDir::new().unwrap();
    let file = source(&dir, "t.tpl", "[[= flag ]]");

    let (code, out) = run(&["template", "--open", "[[", "--close", "]]", "-D", "flag=true", &file]);

    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "true");
}

#[test]
fn template_prints_lua() {
    let dir = TempDir::new().unwrap();
    let file = source(&dir, "t.tpl", "a<%= x %>");

    let (code, out) = run(&["template", "--lua", &file]);

    assert_eq!(code, EXIT_OK);
    assert_eq!(out, format!("{}emit(1, [===[a]===]) emit(1, tostring( x )) end\n", PRELUDE));
}

#[test]
fn template_exit_codes() {
    let dir = TempDir::new().unwrap();
    let unbalanced = source(&dir, "bad.tpl", "<%! end %>");
    let failing = source(&dir, "fail.tpl", "<%= x.y %>");

    assert_eq!(run(&["template", &unbalanced]).0, EXIT_SOURCE);
    assert_eq!(run(&["template", "--chunk", "page", &failing]).0, EXIT_SOURCE);
    assert_eq!(run(&["template", "-D", "novalue", &failing]).0, EXIT_USAGE);
    assert_eq!(run(&["template", &Path::new("/nonexistent/t.tpl").display().to_string()]).0, EXIT_INPUT);
}

/* --- help --- */

#[test]
fn help_goes_to_the_output() {
    let (code, out) = run(&["--help"]);

    assert_eq!(code, EXIT_OK);
    assert!(out.contains("lex"));
    assert!(out.contains("template"));
}
