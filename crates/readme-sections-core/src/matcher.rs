use std::ops::Range;

use crate::lines::{atx_depth, fenced_lines, split_lines, LineRecord};
use crate::section::HEADING_PREFIX;

/// Headings at or above this depth end a section block.
const BOUNDARY_DEPTH: usize = 2;

/// Byte span of a section block inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMatch<'a> {
    pub range: Range<usize>,
    pub text: &'a str,
}

impl SectionMatch<'_> {
    /// True when the block runs to the end of the document.
    pub fn reaches_end(&self, content: &str) -> bool {
        self.range.end == content.len()
    }
}

/// Locates the block for one title without parsing the markdown.
///
/// The block starts at a line reading exactly `## <title>` that is followed
/// by a blank line (or ends the document), and stops before the next `#` or
/// `##` heading. The heading line is compared as plain text, so characters
/// such as `(`, `[` or `*` in a title carry no meaning. Closed fenced code
/// blocks are skipped in both directions.
#[derive(Debug, Clone)]
pub struct SectionMatcher {
    heading: String,
}

impl SectionMatcher {
    pub fn new(title: &str) -> Self {
        Self {
            heading: format!("{HEADING_PREFIX}{title}"),
        }
    }

    /// Returns the first block for the title. Later duplicates are ignored.
    pub fn find<'a>(&self, content: &'a str) -> Option<SectionMatch<'a>> {
        let lines = split_lines(content);
        let fenced = fenced_lines(&lines);
        let mut start: Option<usize> = None;

        for (idx, line) in lines.iter().enumerate() {
            if fenced[idx] {
                continue;
            }

            match start {
                None => {
                    if line.text == self.heading && followed_by_blank(&lines, idx) {
                        start = Some(line.start);
                    }
                }
                Some(begin) => {
                    if is_boundary(line.text) {
                        return Some(span(content, begin..line.start));
                    }
                }
            }
        }

        start.map(|begin| span(content, begin..content.len()))
    }
}

pub fn find_section<'a>(content: &'a str, title: &str) -> Option<SectionMatch<'a>> {
    SectionMatcher::new(title).find(content)
}

/// Titles of every heading the matcher would accept as a section start, in
/// document order.
pub fn section_titles(content: &str) -> Vec<String> {
    let lines = split_lines(content);
    let fenced = fenced_lines(&lines);

    lines
        .iter()
        .enumerate()
        .filter(|(idx, _)| !fenced[*idx] && followed_by_blank(&lines, *idx))
        .filter_map(|(_, line)| line.text.strip_prefix(HEADING_PREFIX))
        .filter(|title| !title.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn followed_by_blank(lines: &[LineRecord<'_>], idx: usize) -> bool {
    lines
        .get(idx + 1)
        .map_or(true, |next| next.text.trim().is_empty())
}

fn is_boundary(line: &str) -> bool {
    atx_depth(line).is_some_and(|depth| depth <= BOUNDARY_DEPTH)
}

fn span(content: &str, range: Range<usize>) -> SectionMatch<'_> {
    SectionMatch {
        text: &content[range.clone()],
        range,
    }
}
