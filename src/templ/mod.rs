//! Text templates with embedded code.
//!
//! A template is literal text with tags in it. With the default `<%` and
//! `%>` tags:
//!
//! ```text
//! <%! for _, field in ipairs(args.fields) do %>
//!     <%= field.type %> <%= field.name %>;
//! <%! end %>
//! ```
//!
//! `<%=` opens an expression whose value is emitted as text and `<%!` opens
//! a statement. Any other occurrence of the open tag is plain text.
//!
//! The code inside tags is a subset of Lua: `if`/`elseif`/`else`, generic
//! `for` over `ipairs`/`pairs`, numeric `for`, `local`, assignment, and calls
//! into the functions of [`library`]. [`Template::to_lua`] exports the same
//! template as Lua source.

use std::{
    error::Error as STDError,
    fmt::{ Display, Formatter, Result as FMTResult },
    result::Result as STDResult,
};

pub mod ast;
pub mod code;
pub mod library;
pub mod literals;
pub mod lua;
pub mod parser;
pub mod render;
pub mod scan;

use crate::templ::ast::Node;
use crate::templ::parser::{ Builder, Parser };
use crate::value::Value;

pub const DEFAULT_CHUNK: &str = "template";

pub type Result<T> = STDResult<T, Error>;

/// A compile or render error, reported as `<chunk>:<line>: <message>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    chunk: String,
    line: u32,
    message: String,
}

impl Error {
    pub fn new(chunk: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Error { chunk: chunk.into(), line, message: message.into() }
    }

    pub fn chunk(&self) -> &str {
        &self.chunk
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl STDError for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
        write!(f, "{}:{}: {}", self.chunk, self.line, self.message)
    }
}

/// One piece of the template source, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, never spanning more than one line.
    Text { line: u32, text: String },
    Expression { line: u32, code: String },
    Statement { line: u32, code: String },
}

impl Segment {
    pub fn line(&self) -> u32 {
        match self {
            Segment::Text { line, .. }
            | Segment::Expression { line, .. }
            | Segment::Statement { line, .. } => *line,
        }
    }
}

/// A compiled template, ready to be rendered any number of times.
#[derive(Clone, Debug)]
pub struct Template {
    chunk: String,
    segments: Vec<Segment>,
    body: Vec<Node>,
}

pub fn compile(template: &str, open: &str, close: &str) -> Result<Template> {
    compile_chunk(template, open, close, DEFAULT_CHUNK)
}

/// Like [`compile`], with `chunk` naming the template in error messages.
pub fn compile_chunk(template: &str, open: &str, close: &str, chunk: &str) -> Result<Template> {
    if open.is_empty() || close.is_empty() {
        return Err(Error::new(chunk, 1, "template tags cannot be empty"));
    }

    let segments = scan::split(template, open, close)
        .map_err(|(line, message)| Error::new(chunk, line, message))?;

    let mut builder = Builder::new(chunk);

    for segment in &segments {
        match segment {
            Segment::Text { text, .. } => builder.text(text),

            Segment::Expression { line, code } => {
                let expr = Parser::new(code, *line, chunk).parse_expression_tag()?;
                builder.emit(*line, expr);
            }

            Segment::Statement { line, code } => {
                for (line, stmt) in Parser::new(code, *line, chunk).parse_statement_tag()? {
                    builder.statement(line, stmt)?;
                }
            }
        }
    }

    Ok(Template {
        chunk: chunk.to_string(),
        segments,
        body: builder.finish()?,
    })
}

impl Template {
    pub fn chunk(&self) -> &str {
        &self.chunk
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Runs the template against `args`, handing each piece of output to
    /// `emit` in order.
    pub fn render<F>(&self, args: &Value, emit: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        render::Renderer::new(&self.chunk, args, emit).run(&self.body)
    }

    pub fn render_to_string(&self, args: &Value) -> Result<String> {
        let mut out = String::new();
        self.render(args, |s| out.push_str(s))?;
        Ok(out)
    }

    /// The template as the source of a Lua function `(args, emit)`.
    pub fn to_lua(&self) -> String {
        lua::generate(&self.segments)
    }
}
