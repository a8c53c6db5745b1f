use std::fmt;
use std::path::{Path, PathBuf};

use similar::{Algorithm, TextDiff};
use tracing::{debug, info};

use crate::error::{SectionError, SectionResult};
use crate::fs::{DocumentFs, DEFAULT_FILE_MODE};
use crate::matcher::SectionMatcher;
use crate::section::Section;

pub const DEFAULT_DOCUMENT: &str = "README.md";

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub path: PathBuf,
    pub file_mode: u32,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DOCUMENT),
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// The document did not exist and now holds only this section.
    Created,
    Appended,
    Replaced,
    /// The section already matched; nothing was written.
    Unchanged,
}

impl MergeAction {
    pub fn changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for MergeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Appended => "appended",
            Self::Replaced => "replaced",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Document text after merging one section, without touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub action: MergeAction,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub title: String,
    pub action: MergeAction,
    /// Document text before the merge; empty when it was created.
    pub previous: String,
    pub result: String,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        self.action.changed()
    }

    /// Unified diff of this merge with `a/<label>` and `b/<label>` headers.
    pub fn diff(&self, label: &str) -> Option<String> {
        document_diff(&self.previous, &self.result, label)
    }
}

/// `None` when the two texts are equal.
pub(crate) fn document_diff(before: &str, after: &str, label: &str) -> Option<String> {
    if before == after {
        return None;
    }

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(before, after);
    let rendered = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{label}"), &format!("b/{label}"))
        .to_string();
    Some(rendered)
}

/// Applies one desired section to an existing document's text.
///
/// A missing block is appended after a single blank line. A block whose
/// trimmed text equals the trimmed rendering is left alone. Anything else is
/// replaced in place, keeping a blank line before a following heading.
pub fn merge_section(current: &str, section: &Section) -> SectionResult<Merged> {
    section.validate()?;
    let rendered = section.render();

    let Some(found) = SectionMatcher::new(&section.title).find(current) else {
        return Ok(Merged {
            action: MergeAction::Appended,
            content: append_block(current, &rendered),
        });
    };

    if found.text.trim() == rendered.trim() {
        return Ok(Merged {
            action: MergeAction::Unchanged,
            content: current.to_string(),
        });
    }

    let replacement = if found.reaches_end(current) {
        rendered
    } else {
        separate_from_next(rendered)
    };

    let mut content = String::with_capacity(current.len() + replacement.len());
    content.push_str(&current[..found.range.start]);
    content.push_str(&replacement);
    content.push_str(&current[found.range.end..]);

    Ok(Merged {
        action: MergeAction::Replaced,
        content,
    })
}

fn append_block(current: &str, rendered: &str) -> String {
    let padding = if current.is_empty() || current.ends_with("\n\n") {
        ""
    } else if current.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };

    let mut content = String::with_capacity(current.len() + padding.len() + rendered.len());
    content.push_str(current);
    content.push_str(padding);
    content.push_str(rendered);
    content
}

fn separate_from_next(mut block: String) -> String {
    while block.ends_with('\n') {
        block.pop();
    }
    block.push_str("\n\n");
    block
}

/// Reads a document through a [`DocumentFs`], merges one section and writes
/// the result back when it changed.
#[derive(Debug)]
pub struct SectionMerger<F> {
    fs: F,
    options: MergeOptions,
}

impl<F: DocumentFs> SectionMerger<F> {
    pub fn new(fs: F) -> Self {
        Self::with_options(fs, MergeOptions::default())
    }

    pub fn with_options(fs: F, options: MergeOptions) -> Self {
        Self { fs, options }
    }

    pub fn path(&self) -> &Path {
        &self.options.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.options.path = path.into();
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn into_fs(self) -> F {
        self.fs
    }

    pub fn update_section(&self, section: &Section) -> SectionResult<MergeOutcome> {
        section.validate()?;
        let path = self.path();

        let current = match self.fs.read_file(path) {
            Ok(bytes) => decode(path, bytes)?,
            Err(err) if self.fs.is_not_exist(&err) => {
                debug!(path = %path.display(), "document missing, creating it");
                return self.create(section);
            }
            Err(err) => {
                return Err(SectionError::Read {
                    path: path.to_path_buf(),
                    source: Box::new(err),
                })
            }
        };

        let merged = merge_section(&current, section)?;
        if !merged.action.changed() {
            debug!(path = %path.display(), title = %section.title, "section up to date");
            return Ok(outcome(section, MergeAction::Unchanged, current, merged.content));
        }

        self.write(&merged.content)?;
        info!(
            path = %path.display(),
            title = %section.title,
            action = %merged.action,
            "section written"
        );
        Ok(outcome(section, merged.action, current, merged.content))
    }

    fn create(&self, section: &Section) -> SectionResult<MergeOutcome> {
        let content = section.render();
        self.write(&content)?;
        info!(path = %self.path().display(), title = %section.title, "document created");
        Ok(outcome(section, MergeAction::Created, String::new(), content))
    }

    fn write(&self, content: &str) -> SectionResult<()> {
        self.fs
            .write_file(self.path(), content.as_bytes(), self.options.file_mode)
            .map_err(|err| SectionError::Write {
                path: self.path().to_path_buf(),
                source: Box::new(err),
            })
    }
}

fn outcome(
    section: &Section,
    action: MergeAction,
    previous: String,
    result: String,
) -> MergeOutcome {
    MergeOutcome {
        title: section.title.clone(),
        action,
        previous,
        result,
    }
}

fn decode(path: &Path, bytes: Vec<u8>) -> SectionResult<String> {
    String::from_utf8(bytes).map_err(|err| SectionError::InvalidContent {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
