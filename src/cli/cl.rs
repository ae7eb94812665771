use std::path::PathBuf;

use clap::{ Args, Parser, Subcommand };

#[derive(Debug, Parser)]
#[command(author, version, about = "Configurable lexer and text template toolkit")]
pub struct CLOpt {
    #[command(subcommand)]
    command: Command,
}

impl CLOpt {
    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints the tokens of a source file, one per line
    Lex(LexOpt),

    /// Renders a template, or prints it as a Lua function
    Template(TemplateOpt),
}

#[derive(Debug, Args)]
pub struct LexOpt {
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// One of cpp, bas, pas or asm
    #[arg(short, long, default_value = "cpp")]
    language: String,

    /// An operator or punctuation symbol, may be repeated
    #[arg(short, long = "symbol", value_name = "SYMBOL")]
    symbols: Vec<String>,

    /// A nestable free-form block, may be repeated
    #[arg(long, num_args = 2, value_names = ["BEGIN", "END"])]
    freeform: Vec<String>,

    #[arg(long, default_value_t = 1, value_name = "LINE")]
    startline: u32,

    /// Leaves line and block comments out of the listing
    #[arg(long)]
    skip_comments: bool,

    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

impl LexOpt {
    pub fn file(&self) -> &PathBuf {
        &self.file
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn symbols(&self) -> &Vec<String> {
        &self.symbols
    }

    /// The `--freeform` values as `(begin, end)` pairs.
    pub fn freeform(&self) -> Vec<(String, String)> {
        self.freeform
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }

    pub fn startline(&self) -> u32 {
        self.startline
    }

    pub fn skip_comments(&self) -> bool {
        self.skip_comments
    }

    pub fn output(&self) -> Option<&PathBuf> {
        self.output.as_ref()
    }
}

#[derive(Debug, Args)]
pub struct TemplateOpt {
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[arg(long, default_value = "<%", value_name = "TAG")]
    open: String,

    #[arg(long, default_value = "%>", value_name = "TAG")]
    close: String,

    /// Name used in error messages, defaults to the file name
    #[arg(long, value_name = "NAME")]
    chunk: Option<String>,

    /// Binds a value in `args`, may be repeated
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_define)]
    defines: Vec<(String, String)>,

    /// Prints the Lua source of the template instead of rendering it
    #[arg(long)]
    lua: bool,

    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

impl TemplateOpt {
    pub fn file(&self) -> &PathBuf {
        &self.file
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn chunk(&self) -> Option<&str> {
        self.chunk.as_deref()
    }

    pub fn defines(&self) -> &Vec<(String, String)> {
        &self.defines
    }

    pub fn lua(&self) -> bool {
        self.lua
    }

    pub fn output(&self) -> Option<&PathBuf> {
        self.output.as_ref()
    }
}

fn parse_define(define: &str) -> Result<(String, String), String> {
    match define.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, found \"{}\"", define)),
    }
}
