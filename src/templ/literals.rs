/// Decodes a quoted string literal of template code, quotes included.
///
/// Escapes follow Lua: `\a \b \f \n \r \t \v \\ \" \'`, an escaped line
/// break, `\xXX`, `\ddd`, `\z` and `\u{XXX}`. Byte escapes are limited to
/// ASCII so the result stays valid UTF-8.
pub fn parse_string_literal(input: &str) -> Result<String, String> {
    let mut chars = input.chars();

    let quote = chars.next().ok_or_else(|| "unfinished string".to_string())?;

    let mut result = String::new();
    let mut chars = chars.peekable();

    while let Some(c) = chars.next() {
        if c == quote {
            return Ok(result);
        }

        if c != '\\' {
            result.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            break;
        };

        match escape {
            'a' => result.push('\x07'),
            'b' => result.push('\x08'),
            'f' => result.push('\x0c'),
            'n' | '\n' => result.push('\n'),
            'r' => result.push('\r'),
            't' => result.push('\t'),
            'v' => result.push('\x0b'),
            '\\' | '"' | '\'' => result.push(escape),

            'x' => {
                let digits: String = (0..2).filter_map(|_| chars.next_if(char::is_ascii_hexdigit)).collect();

                if digits.len() != 2 {
                    return Err("hexadecimal digit expected".to_string());
                }

                result.push(ascii(u32::from_str_radix(&digits, 16).unwrap_or(u32::MAX))?);
            }

            'z' => {
                while chars.next_if(|c| c.is_ascii_whitespace()).is_some() {}
            }

            'u' => {
                if chars.next() != Some('{') {
                    return Err("missing '{' in \\u{xxxx}".to_string());
                }

                let digits: String = std::iter::from_fn(|| chars.next_if(char::is_ascii_hexdigit)).collect();

                if chars.next() != Some('}') || digits.is_empty() {
                    return Err("missing '}' in \\u{xxxx}".to_string());
                }

                let code = u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| "UTF-8 value too large".to_string())?;

                result.push(code);
            }

            d if d.is_ascii_digit() => {
                let mut digits = d.to_string();
                digits.extend((0..2).filter_map(|_| chars.next_if(char::is_ascii_digit)));

                result.push(ascii(digits.parse::<u32>().unwrap_or(u32::MAX))?);
            }

            _ => return Err(format!("invalid escape sequence '\\{}'", escape)),
        }
    }

    Err("unfinished string".to_string())
}

fn ascii(code: u32) -> Result<char, String> {
    char::from_u32(code)
        .filter(char::is_ascii)
        .ok_or_else(|| "escape sequence out of range".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_escapes() {
        assert_eq!(parse_string_literal(r#""a\tb\n""#), Ok("a\tb\n".to_string()));
        assert_eq!(parse_string_literal(r"'it\'s'"), Ok("it's".to_string()));
        assert_eq!(parse_string_literal(r#""\x41\66\u{e9}""#), Ok("ABé".to_string()));
        assert_eq!(parse_string_literal("\"a\\z  \n  b\""), Ok("ab".to_string()));
    }

    #[test]
    fn rejects_bad_escapes() {
        assert!(parse_string_literal(r#""\q""#).is_err());
        assert!(parse_string_literal(r#""\x4""#).is_err());
        assert!(parse_string_literal(r#""\200""#).is_err());
        assert!(parse_string_literal(r#""open"#).is_err());
    }
}
