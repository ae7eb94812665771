use crate::templ::Segment;

/// Splits `template` into text runs and tags. Errors carry the line of the
/// offending tag.
pub fn split(template: &str, open: &str, close: &str) -> Result<Vec<Segment>, (u32, String)> {
    let mut segments = Vec::new();
    let mut line = 1;
    let mut pos = 0;

    while let Some(start) = find_tag(template, pos, open) {
        push_text(&mut segments, &template[pos..start], &mut line);

        let marker = template.as_bytes()[start + open.len()];
        let code_start = start + open.len() + 1;

        let Some(length) = template[code_start..].find(close) else {
            return Err((line, "unterminated tag".to_string()));
        };

        let code = &template[code_start..code_start + length];

        let segment = if marker == b'=' {
            Segment::Expression { line, code: code.to_string() }
        }
        else {
            Segment::Statement { line, code: code.to_string() }
        };

        segments.push(segment);
        line += code.matches('\n').count() as u32;
        pos = code_start + length + close.len();
    }

    push_text(&mut segments, &template[pos..], &mut line);
    Ok(segments)
}

// an open tag followed by `=` or `!`
fn find_tag(template: &str, mut pos: usize, open: &str) -> Option<usize> {
    let step = open.chars().next().map_or(1, char::len_utf8);

    while let Some(found) = template[pos..].find(open) {
        let at = pos + found;

        if matches!(template.as_bytes().get(at + open.len()), Some(b'=' | b'!')) {
            return Some(at);
        }

        pos = at + step;
    }

    None
}

fn push_text(segments: &mut Vec<Segment>, text: &str, line: &mut u32) {
    for run in text.split_inclusive('\n') {
        segments.push(Segment::Text { line: *line, text: run.to_string() });

        if run.ends_with('\n') {
            *line += 1;
        }
    }
}
