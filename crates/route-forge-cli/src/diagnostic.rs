use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use route_forge_store::StoreError;

use crate::error::CliError;

/// A descriptor or input file that failed to decode, with the offending
/// line labelled.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ParseDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: SourceSpan,

    message: String,
    label: String,

    #[help]
    suggestion: Option<String>,
}

/// Byte span of the 1-based `line`/`column`, running to the end of the line.
fn line_span(source: &str, line: usize, column: usize) -> SourceSpan {
    let mut offset = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let body = text.trim_end_matches(['\n', '\r']);
            let col = column.saturating_sub(1).min(body.len());
            let start = if body.is_char_boundary(col) { col } else { 0 };
            return (offset + start, body.len() - start).into();
        }
        offset += text.len();
    }
    (source.len(), 0).into()
}

/// Strip serde's trailing " at line X column Y" so the label is not redundant.
fn short_message(message: &str) -> &str {
    message
        .rfind(" at line ")
        .map_or(message, |idx| &message[..idx])
}

/// Build a diagnostic from a file location, reading the file for context.
///
/// Returns `None` when the location is unknown or the file is unreadable.
pub fn parse_diagnostic(
    path: &Path,
    message: &str,
    line: Option<usize>,
    column: Option<usize>,
    suggestion: Option<&str>,
) -> Option<ParseDiagnostic> {
    let line = line?;
    let source = std::fs::read_to_string(path).ok()?;
    let span = line_span(&source, line, column.unwrap_or(1));
    Some(ParseDiagnostic {
        src: NamedSource::new(path.display().to_string(), source),
        span,
        message: format!("cannot parse {}", path.display()),
        label: short_message(message).to_string(),
        suggestion: suggestion.map(str::to_string),
    })
}

/// Rich rendering for errors that point into a file, when available.
pub fn diagnostic_for(err: &CliError) -> Option<miette::Report> {
    let diagnostic = match err {
        CliError::Input {
            path,
            message,
            line,
            column,
        } => parse_diagnostic(
            path,
            message,
            *line,
            *column,
            Some("Input files are YAML, or JSON when the name ends in .json."),
        ),
        CliError::Agent(agent) => match agent.store_error() {
            Some(StoreError::Parse {
                path,
                message,
                line,
                column,
            }) => parse_diagnostic(
                Path::new(path),
                message,
                *line,
                *column,
                Some("Route descriptors need `module`, `service`, `path` and a `routes` list."),
            ),
            _ => None,
        },
        _ => None,
    }?;
    Some(miette::Report::new(diagnostic))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_covers_rest_of_line() {
        let source = "module: app\nservice: users\npath: users\n";
        let span = line_span(source, 3, 7);
        assert_eq!(span.offset(), "module: app\nservice: users\n".len() + 6);
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn span_past_end_is_empty() {
        let span = line_span("a\n", 9, 1);
        assert_eq!(span.offset(), 2);
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn short_message_drops_location() {
        assert_eq!(
            short_message("invalid type: integer `1` at line 2 column 3"),
            "invalid type: integer `1`"
        );
        assert_eq!(short_message("missing field `path`"), "missing field `path`");
    }

    #[test]
    fn diagnostic_for_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deps.yaml");
        std::fs::write(&path, "- module: app\n  service: [\n").unwrap();
        let err = CliError::Input {
            path: path.clone(),
            message: "did not find expected node content at line 2 column 12".into(),
            line: Some(2),
            column: Some(12),
        };
        let report = diagnostic_for(&err).unwrap();
        assert!(report.to_string().contains("deps.yaml"));
    }

    #[test]
    fn no_diagnostic_without_location() {
        let err = CliError::Usage("no answers".into());
        assert!(diagnostic_for(&err).is_none());
    }
}
