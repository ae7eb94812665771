use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::Path;

use clap::Parser as _;
use tempfile::NamedTempFile;

use crate::cli::cl::{ CLOpt, Command, LexOpt, TemplateOpt };
use crate::lex::{ Lexer, Options, Syntax };
use crate::templ;
use crate::value::Value;

pub const EXIT_OK: i32 = 0;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_INPUT: i32 = 3;
pub const EXIT_CONFIG: i32 = 4;
pub const EXIT_SOURCE: i32 = 5;
pub const EXIT_OUTPUT: i32 = 6;

/// Runs the command line in `args`, writing results to `out` unless `-o`
/// says otherwise. Returns the process exit code.
pub fn run<W: Write>(args: Vec<String>, out: &mut W) -> i32 {
    let args = match CLOpt::try_parse_from(args) {
        Ok(parsed_args) => parsed_args,
        Err(e) if !e.use_stderr() => {
            // --help and --version
            let _ = write!(out, "{}", e);
            return EXIT_OK;
        }
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_USAGE;
        }
    };

    match args.command() {
        Command::Lex(opt) => lex(opt, out),
        Command::Template(opt) => template(opt, out),
    }
}

fn read_input(file: &Path) -> Option<String> {
    match fs::read_to_string(file) {
        Ok(source) => Some(source),
        Err(e) => {
            eprintln!("Error reading file {}: {}", file.display(), e);
            None
        }
    }
}

fn lex<W: Write>(opt: &LexOpt, out: &mut W) -> i32 {
    let Some(source) = read_input(opt.file()) else {
        return EXIT_INPUT;
    };

    let syntax = match opt.language().parse::<Syntax>() {
        Ok(syntax) => syntax,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_CONFIG;
        }
    };

    let mut options = Options::new(&source, opt.file().display().to_string(), syntax)
        .startline(opt.startline())
        .symbols(opt.symbols().iter().cloned());

    for (begin, end) in opt.freeform() {
        options = options.freeform(begin, end);
    }

    let mut lexer = match Lexer::new(options) {
        Ok(lexer) => lexer,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_CONFIG;
        }
    };

    let mut listing = String::new();

    loop {
        let tok = match lexer.lex() {
            Ok(tok) => tok,
            Err(e) => {
                eprintln!("{}", e);
                return EXIT_SOURCE;
            }
        };

        if !(opt.skip_comments() && tok.kind().is_comment()) {
            let _ = writeln!(listing, "{}:{}\t{}\t{}", tok.line(), tok.offset(), tok.tag(), tok.lexeme().escape_debug());
        }

        if tok.is_eof() {
            break;
        }
    }

    write_output(opt.output().map(|p| p.as_path()), &listing, out)
}

fn template<W: Write>(opt: &TemplateOpt, out: &mut W) -> i32 {
    let Some(source) = read_input(opt.file()) else {
        return EXIT_INPUT;
    };

    let file_name = opt.file().display().to_string();
    let chunk = opt.chunk().unwrap_or(&file_name);

    let compiled = match templ::compile_chunk(&source, opt.open(), opt.close(), chunk) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_SOURCE;
        }
    };

    if opt.lua() {
        return write_output(opt.output().map(|p| p.as_path()), &compiled.to_lua(), out);
    }

    let args: BTreeMap<String, Value> = opt.defines()
        .iter()
        .map(|(key, value)| (key.clone(), define_value(value)))
        .collect();

    match compiled.render_to_string(&Value::Map(args)) {
        Ok(text) => write_output(opt.output().map(|p| p.as_path()), &text, out),
        Err(e) => {
            eprintln!("{}", e);
            EXIT_SOURCE
        }
    }
}

/// `-D` values: booleans and numbers are typed, anything else is a string.
pub fn define_value(value: &str) -> Value {
    match value {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => value.parse::<i64>()
            .map(Value::Integer)
            .or_else(|_| value.parse::<f64>().map(Value::Float))
            .ok()
            .filter(|_| value.bytes().any(|c| c.is_ascii_digit()))
            .unwrap_or_else(|| Value::String(value.to_string())),
    }
}

// goes through a temporary file next to the target, renamed over it at the end
fn write_output<W: Write>(path: Option<&Path>, contents: &str, out: &mut W) -> i32 {
    let Some(path) = path else {
        return match out.write_all(contents.as_bytes()).and_then(|_| out.flush()) {
            Ok(_) => EXIT_OK,
            Err(e) => {
                eprintln!("Error writing output: {}", e);
                EXIT_OUTPUT
            }
        };
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let Ok(mut file) = NamedTempFile::new_in(dir) else {
        eprintln!("Failed to create temporary file in {}", dir.display());
        return EXIT_OUTPUT;
    };

    if let Err(e) = file.write_all(contents.as_bytes()) {
        eprintln!("Error writing {}: {}", path.display(), e);
        return EXIT_OUTPUT;
    }

    if let Err(e) = file.persist(path) {
        eprintln!("Error writing {}: {}", path.display(), e);
        return EXIT_OUTPUT;
    }

    EXIT_OK
}
