use std::fmt::Write;

use crate::templ::Segment;

const MIN_LEVEL: usize = 3;

/// Opens the generated function. Free names look in `args` before the
/// globals, the way the renderer resolves them, and assignments stay in the
/// function's own environment.
pub const PRELUDE: &str = "return function(args, emit) \
local _ENV = setmetatable({}, {__index = function(_, k) \
if type(args) == \"table\" and args[k] ~= nil then return args[k] end \
return _G[k] end}) ";

/// Lua source for a function `(args, emit)` that replays `segments`.
pub fn generate(segments: &[Segment]) -> String {
    let mut code = String::from(PRELUDE);

    for segment in segments {
        // writing into a String cannot fail
        let _ = match segment {
            Segment::Text { line, text } =>
                write!(code, "emit({}, {}) ", line, text_literal(text)),

            Segment::Expression { line, code: expr } =>
                write!(code, "emit({}, tostring({})) ", line, expr),

            Segment::Statement { code: stmt, .. } =>
                write!(code, "{} ", stmt),
        };
    }

    code.push_str("end\n");
    code
}

/// `text` as a Lua string literal that reads back byte for byte.
pub fn text_literal(text: &str) -> String {
    // long brackets drop a leading line break and turn any \r into \n
    if text.starts_with('\n') || text.contains('\r') {
        return quoted(text);
    }

    let level = long_bracket_level(text);
    let equals = "=".repeat(level);

    format!("[{}[{}]{}]", equals, text, equals)
}

/// The smallest level, starting at 3, whose closing bracket first shows up
/// right where the text ends.
pub fn long_bracket_level(text: &str) -> usize {
    (MIN_LEVEL..)
        .find(|&level| {
            let close = format!("]{}]", "=".repeat(level));
            let mut candidate = String::with_capacity(text.len() + close.len());
            candidate.push_str(text);
            candidate.push_str(&close);

            candidate.find(&close) == Some(text.len())
        })
        .unwrap_or(MIN_LEVEL)
}

fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');

    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\{:03}", c as u32);
            }

            c => out.push(c),
        }
    }

    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_a_free_level() {
        assert_eq!(long_bracket_level("plain"), 3);
        assert_eq!(long_bracket_level("a ]===] b"), 4);
        assert_eq!(long_bracket_level("a ]===] ]====] b"), 5);

        // the closing bracket must not start inside the text
        assert_eq!(long_bracket_level("x]"), 3);
        assert_eq!(long_bracket_level("x]==="), 4);
    }

    #[test]
    fn leading_line_breaks_are_quoted() {
        assert_eq!(text_literal("\n"), "\"\\n\"");
        assert_eq!(text_literal("\r\n"), "\"\\r\\n\"");
        assert_eq!(text_literal("a\n"), "[===[a\n]===]");
    }

    #[test]
    fn carriage_returns_are_quoted() {
        assert_eq!(text_literal("a\r\n"), "\"a\\r\\n\"");
        assert_eq!(text_literal("b\rc\n"), "\"b\\rc\\n\"");
    }

    #[test]
    fn generates_a_function() {
        let segments = vec![
            Segment::Text { line: 1, text: "Hi ".to_string() },
            Segment::Expression { line: 1, code: " name ".to_string() },
            Segment::Statement { line: 1, code: " if x then ".to_string() },
        ];

        assert_eq!(
            generate(&segments),
            format!("{}emit(1, [===[Hi ]===]) emit(1, tostring( name ))  if x then  end\n", PRELUDE)
        );
        assert!(PRELUDE.starts_with("return function(args, emit) local _ENV = setmetatable({}, "));
    }
}
