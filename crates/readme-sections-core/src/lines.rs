#[derive(Debug, Clone, Copy)]
pub(crate) struct LineRecord<'a> {
    pub text: &'a str,
    pub start: usize,
}

/// Splits `content` into lines with their starting byte offsets. `text` has
/// the line ending (`\n` or `\r\n`) stripped.
pub(crate) fn split_lines(content: &str) -> Vec<LineRecord<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0usize;

    for raw in content.split_inclusive('\n') {
        let mut text = raw.strip_suffix('\n').unwrap_or(raw);
        text = text.strip_suffix('\r').unwrap_or(text);

        lines.push(LineRecord {
            text,
            start: offset,
        });

        offset += raw.len();
    }

    lines
}

/// Depth of the ATX heading on `line`, if it is one.
pub(crate) fn atx_depth(line: &str) -> Option<usize> {
    let (indent_width, rest) = split_indent(line);
    if indent_width > 3 {
        return None;
    }

    let pound_count = rest.chars().take_while(|ch| *ch == '#').count();
    if pound_count == 0 || pound_count > 6 {
        return None;
    }

    let after_hashes = &rest[pound_count..];
    if !after_hashes.is_empty() && !after_hashes.starts_with(char::is_whitespace) {
        return None;
    }

    Some(pound_count)
}

#[derive(Debug, Clone, Copy)]
struct FencedBlock {
    fence_char: char,
    fence_len: usize,
}

/// Marks the lines that belong to a closed fenced code block, fence lines
/// included. A fence that is never closed marks nothing, so a stray ``` can
/// not hide the headings after it.
pub(crate) fn fenced_lines(lines: &[LineRecord<'_>]) -> Vec<bool> {
    let mut fenced = vec![false; lines.len()];
    let mut open: Option<(usize, FencedBlock)> = None;

    for (idx, line) in lines.iter().enumerate() {
        match open {
            Some((opened_at, fence)) => {
                if is_closing_fence(line.text, fence) {
                    fenced[opened_at..=idx].fill(true);
                    open = None;
                }
            }
            None => open = detect_fence_start(line.text).map(|fence| (idx, fence)),
        }
    }

    fenced
}

fn detect_fence_start(line: &str) -> Option<FencedBlock> {
    let (indent_width, rest) = split_indent(line);
    if indent_width > 3 {
        return None;
    }

    let mut chars = rest.chars();
    let first = chars.next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = 1 + chars.take_while(|ch| *ch == first).count();
    if count < 3 {
        return None;
    }

    Some(FencedBlock {
        fence_char: first,
        fence_len: count,
    })
}

fn is_closing_fence(line: &str, fence: FencedBlock) -> bool {
    let (indent_width, rest) = split_indent(line);
    if indent_width > 3 {
        return false;
    }

    let trimmed = rest.trim_end();
    !trimmed.is_empty()
        && trimmed.chars().all(|ch| ch == fence.fence_char)
        && trimmed.chars().count() >= fence.fence_len
}

fn split_indent(line: &str) -> (usize, &str) {
    let mut width = 0usize;

    for (idx, ch) in line.char_indices() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => return (width, &line[idx..]),
        }
    }

    (width, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(content: &str) -> Vec<bool> {
        fenced_lines(&split_lines(content))
    }

    #[test]
    fn split_lines_tracks_offsets_and_crlf() {
        let lines = split_lines("a\r\nbb\nc");
        assert_eq!(lines.len(), 3);
        assert_eq!((lines[0].text, lines[0].start), ("a", 0));
        assert_eq!((lines[1].text, lines[1].start), ("bb", 3));
        assert_eq!((lines[2].text, lines[2].start), ("c", 6));
    }

    #[test]
    fn atx_depth_requires_space_after_hashes() {
        assert_eq!(atx_depth("# Title"), Some(1));
        assert_eq!(atx_depth("   ## Title"), Some(2));
        assert_eq!(atx_depth("##"), Some(2));
        assert_eq!(atx_depth("#hashtag"), None);
        assert_eq!(atx_depth("    # indented code"), None);
        assert_eq!(atx_depth("####### seven"), None);
    }

    #[test]
    fn closed_fence_covers_block_until_matching_close() {
        assert_eq!(
            mask("text\n````sh\n# comment\n```\n````\n# Heading\n"),
            vec![false, true, true, true, true, false]
        );
    }

    #[test]
    fn unclosed_fence_marks_nothing() {
        assert_eq!(
            mask("```sh\nold\n## Next\n```rust\n"),
            vec![false, false, false, false]
        );
    }
}
