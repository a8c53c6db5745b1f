use std::io::{self, Read};
use std::path::{Path, PathBuf};

use readme_sections_core::{bullet_list, ExitCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("'set' requires --item, --with or --with-string")]
    Missing,
    #[error("--item, --with and --with-string cannot be used together")]
    Conflicting,
    #[error("failed to read content file '{path}': {source}")]
    File { path: PathBuf, source: io::Error },
    #[error("failed to read content from stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("bad escape at byte {offset} of --with-string: {detail}")]
    Escape { offset: usize, detail: String },
}

impl ContentError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Missing | Self::Conflicting | Self::Escape { .. } => ExitCode::InvalidArguments,
            Self::File { .. } | Self::Stdin(_) => ExitCode::Io,
        }
    }
}

/// Section body for `set`, taken from exactly one of the three flags.
/// `--with -` reads stdin.
pub fn section_body(
    items: &[String],
    with: Option<&Path>,
    with_string: Option<&str>,
) -> Result<String, ContentError> {
    match (items, with, with_string) {
        ([_, ..], None, None) => Ok(bullet_list(items)),
        ([], Some(path), None) if path == Path::new("-") => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .map_err(ContentError::Stdin)?;
            Ok(body)
        }
        ([], Some(path), None) => {
            std::fs::read_to_string(path).map_err(|source| ContentError::File {
                path: path.to_path_buf(),
                source,
            })
        }
        ([], None, Some(text)) => unescape(text),
        ([], None, None) => Err(ContentError::Missing),
        _ => Err(ContentError::Conflicting),
    }
}

/// Expands the `\n`, `\t`, `\\` and `\"` escapes a shell makes awkward to type.
fn unescape(text: &str) -> Result<String, ContentError> {
    let mut body = String::with_capacity(text.len());
    let mut rest = text;
    let mut consumed = 0usize;

    while let Some(slash) = rest.find('\\') {
        body.push_str(&rest[..slash]);
        let offset = consumed + slash;
        let escaped = rest[slash + 1..].chars().next();

        body.push(match escaped {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('\\') => '\\',
            Some('"') => '"',
            Some(other) => {
                return Err(ContentError::Escape {
                    offset,
                    detail: format!("unknown sequence \\{other}"),
                })
            }
            None => {
                return Err(ContentError::Escape {
                    offset,
                    detail: "trailing backslash".to_string(),
                })
            }
        });

        let step = slash + 1 + escaped.map_or(0, char::len_utf8);
        rest = &rest[step..];
        consumed += step;
    }

    body.push_str(rest);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn items_become_a_bullet_list() {
        let body = section_body(&strings(&["es", "en"]), None, None).unwrap();
        assert_eq!(body, "- es\n- en\n");
    }

    #[test]
    fn inline_text_expands_escapes() {
        let body = section_body(&[], None, Some(r#"- en\n- "es"\t\\ é\n"#)).unwrap();
        assert_eq!(body, "- en\n- \"es\"\t\\ é\n");
    }

    #[test]
    fn unknown_escape_reports_its_offset() {
        match unescape(r"ab\rc").unwrap_err() {
            ContentError::Escape { offset, detail } => {
                assert_eq!(offset, 2);
                assert!(detail.contains(r"\r"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            unescape(r"oops\"),
            Err(ContentError::Escape { offset: 4, .. })
        ));
    }

    #[test]
    fn flag_combinations_are_checked() {
        let missing = section_body(&[], None, None).unwrap_err();
        assert!(matches!(missing, ContentError::Missing));
        assert_eq!(missing.exit_code(), ExitCode::InvalidArguments);

        let both = section_body(&strings(&["a"]), None, Some("b")).unwrap_err();
        assert!(matches!(both, ContentError::Conflicting));
    }

    #[test]
    fn missing_content_file_is_an_io_error() {
        let err = section_body(&[], Some(Path::new("/nonexistent/body.md")), None).unwrap_err();
        assert!(matches!(err, ContentError::File { .. }));
        assert_eq!(err.exit_code(), ExitCode::Io);
    }
}
