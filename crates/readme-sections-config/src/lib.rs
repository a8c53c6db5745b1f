//! Loader for the TOML manifest that lists the sections a document should
//! carry.
//!
//! The manifest is always named explicitly; nothing is discovered. Relative
//! paths inside it resolve against the manifest's own directory.
//!
//! ```toml
//! document = "README.md"
//!
//! [[section]]
//! title = "Supported Languages"
//! items = ["en", "es"]
//!
//! [[section]]
//! title = "Notes"
//! content_file = "docs/notes.md"
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use readme_sections_core::{bullet_list, Section, DEFAULT_DOCUMENT};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Sections resolved from a manifest file.
#[derive(Clone, Debug)]
pub struct Manifest {
    pub source: PathBuf,
    pub document: PathBuf,
    pub sections: Vec<Section>,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("manifest {path} is invalid:\n{errors}")]
    Validation {
        path: PathBuf,
        errors: ManifestValidationErrors,
    },
}

/// Validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ManifestValidationErrors(pub Vec<String>);

impl fmt::Display for ManifestValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ManifestValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    document: Option<PathBuf>,
    #[serde(default, rename = "section")]
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSection {
    title: String,
    #[serde(default)]
    items: Option<Vec<String>>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    content_file: Option<PathBuf>,
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parses manifest text as if it had been read from `source`.
    pub fn parse(contents: &str, source: &Path) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(contents).map_err(|err| ManifestError::Parse {
            path: source.to_path_buf(),
            source: err,
        })?;

        let base_dir = source.parent().unwrap_or_else(|| Path::new(""));
        let document = base_dir.join(
            raw.document
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT)),
        );

        let mut errors = Vec::new();
        let mut sections = Vec::with_capacity(raw.sections.len());
        let mut seen = HashSet::new();

        for (idx, raw_section) in raw.sections.into_iter().enumerate() {
            let title = raw_section.title.trim().to_string();
            if title.is_empty() {
                errors.push(format!("section #{} has an empty title", idx + 1));
                continue;
            }
            if title.contains(['\n', '\r']) {
                errors.push(format!("section #{} has a title spanning lines", idx + 1));
                continue;
            }

            if !seen.insert(title.clone()) {
                warn!(%title, manifest = %source.display(), "duplicate section title, last one wins");
            }

            let content = match (
                raw_section.items,
                raw_section.content,
                raw_section.content_file,
            ) {
                (Some(items), None, None) => bullet_list(items),
                (None, Some(content), None) => content,
                (None, None, Some(file)) => {
                    let file_path = base_dir.join(file);
                    fs::read_to_string(&file_path).map_err(|source| ManifestError::Io {
                        path: file_path.clone(),
                        source,
                    })?
                }
                (None, None, None) => {
                    errors.push(format!(
                        "section '{title}' needs one of items, content or content_file"
                    ));
                    continue;
                }
                _ => {
                    errors.push(format!(
                        "section '{title}' sets more than one of items, content and content_file"
                    ));
                    continue;
                }
            };

            sections.push(Section::new(title, content));
        }

        if !errors.is_empty() {
            return Err(ManifestError::Validation {
                path: source.to_path_buf(),
                errors: ManifestValidationErrors(errors),
            });
        }

        Ok(Self {
            source: source.to_path_buf(),
            document,
            sections,
        })
    }
}
