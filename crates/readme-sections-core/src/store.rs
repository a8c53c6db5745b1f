use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SectionResult;
use crate::fs::DocumentFs;
use crate::merger::{document_diff, MergeOptions, MergeOutcome, SectionMerger};
use crate::section::Section;

/// Desired sections for one document, flushed through a [`SectionMerger`].
///
/// Titles are unique: adding a known title replaces its content but keeps
/// the position where the title was first seen.
#[derive(Debug)]
pub struct SectionStore<F> {
    merger: SectionMerger<F>,
    sections: Vec<Section>,
}

#[derive(Debug, Default)]
pub struct FlushReport {
    pub outcomes: Vec<MergeOutcome>,
}

impl FlushReport {
    pub fn changed(&self) -> bool {
        self.outcomes.iter().any(MergeOutcome::changed)
    }

    /// Final document text, taken from the last merge.
    pub fn result(&self) -> Option<&str> {
        self.outcomes.last().map(|outcome| outcome.result.as_str())
    }

    /// One diff covering the whole flush, from the text the first merge read
    /// to the text the last merge produced.
    pub fn diff(&self, label: &str) -> Option<String> {
        let first = self.outcomes.first()?;
        let last = self.outcomes.last()?;
        document_diff(&first.previous, &last.result, label)
    }
}

impl<F: DocumentFs> SectionStore<F> {
    pub fn new(fs: F) -> Self {
        Self::from_merger(SectionMerger::new(fs))
    }

    pub fn with_options(fs: F, options: MergeOptions) -> Self {
        Self::from_merger(SectionMerger::with_options(fs, options))
    }

    pub fn from_merger(merger: SectionMerger<F>) -> Self {
        Self {
            merger,
            sections: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.merger.path()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.merger.set_path(path);
    }

    pub fn merger(&self) -> &SectionMerger<F> {
        &self.merger
    }

    pub fn add<I>(&mut self, sections: I)
    where
        I: IntoIterator<Item = Section>,
    {
        for section in sections {
            match self
                .sections
                .iter_mut()
                .find(|cached| cached.title == section.title)
            {
                Some(cached) => cached.content = section.content,
                None => self.sections.push(section),
            }
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Merges every cached section in order, stopping at the first error.
    ///
    /// Sections written before the error stay written.
    pub fn flush_all(&self) -> SectionResult<FlushReport> {
        let mut report = FlushReport::default();
        for section in &self.sections {
            debug!(title = %section.title, "flushing section");
            report.outcomes.push(self.merger.update_section(section)?);
        }
        Ok(report)
    }

    pub fn into_merger(self) -> SectionMerger<F> {
        self.merger
    }
}
