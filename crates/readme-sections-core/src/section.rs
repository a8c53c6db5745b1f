use serde::{Deserialize, Serialize};

use crate::error::{SectionError, SectionResult};

/// Heading prefix every managed section is rendered with.
pub const HEADING_PREFIX: &str = "## ";

/// A titled block of a markdown document. Two sections with the same title
/// are the same section, whatever their content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Builds a section whose content is a bullet list of `items`.
    pub fn with_items<I, S>(title: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(title, bullet_list(items))
    }

    /// The on-disk form: heading line, blank line, then the raw content.
    pub fn render(&self) -> String {
        let mut block =
            String::with_capacity(HEADING_PREFIX.len() + self.title.len() + 2 + self.content.len());
        block.push_str(HEADING_PREFIX);
        block.push_str(&self.title);
        block.push_str("\n\n");
        block.push_str(&self.content);
        block
    }

    /// A title has to fit on the heading line it is matched against.
    pub(crate) fn validate(&self) -> SectionResult<()> {
        let reason = if self.title.trim().is_empty() {
            "must not be empty"
        } else if self.title.contains(['\n', '\r']) {
            "must be a single line"
        } else {
            return Ok(());
        };

        Err(SectionError::InvalidTitle {
            title: self.title.clone(),
            reason,
        })
    }
}

/// Formats `items` as a markdown bullet list, one `- item` line each.
///
/// Items are written verbatim; an empty input yields an empty string.
pub fn bullet_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut list = String::new();
    for item in items {
        list.push_str("- ");
        list.push_str(item.as_ref());
        list.push('\n');
    }
    list
}
