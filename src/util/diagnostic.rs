//! User-friendly diagnostic messages.
//!
//! Fatal errors carry their root cause, the offending input and a suggested
//! fix. Syntax errors in the build matrix additionally point at the source
//! location through miette.

use std::fmt;
use std::ops::Range;

use miette::{Diagnostic as MietteDiagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no build matrix is found.
    pub const NO_MATRIX: &str =
        "Create builds.toml or pass `--builds <FILE>` to point at a build matrix";

    /// Suggestion when no release feed source is configured.
    pub const NO_RELEASES: &str =
        "Pass `--releases <FILE>`, `--repository <OWNER/NAME>` or set `net.repository`";

    /// Suggestion for fetch failures.
    pub const FETCH_FAILED: &str =
        "Check your network connection, or set GITHUB_TOKEN if rate limited";

    /// Suggestion when a build command fails.
    pub const BUILD_FAILED: &str = "Run `wheelyard build --verbose` for more details";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        for ctx in &self.context {
            output.push_str(&format!("  -> {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Syntax error in a build matrix document.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("{message}")]
#[diagnostic(
    code(wheelyard::matrix::syntax),
    help("Each `[[build]]` table needs `package`, `repository` and a list of `[[build.builds]]`")
)]
pub struct MatrixSyntaxError {
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl MatrixSyntaxError {
    pub fn new(name: &str, content: &str, message: &str, span: Option<Range<usize>>) -> Self {
        MatrixSyntaxError {
            message: message.trim().to_string(),
            src: NamedSource::new(name, content.to_string()),
            span: span.map(SourceSpan::from),
        }
    }

    /// Render with the offending source lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if GraphicalReportHandler::new()
            .render_report(&mut out, self)
            .is_err()
        {
            return self.message.clone();
        }
        out
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("unhandled platform `win_amd64`")
            .with_context("wheel: pkg-1.0-cp312-cp312-win_amd64.whl")
            .with_suggestion("Remove the asset from the release");

        let output = diag.format(false);
        assert!(output.contains("error: unhandled platform"));
        assert!(output.contains("-> wheel: pkg-1.0"));
        assert!(output.contains("consider:"));
        assert!(output.contains("1. Remove the asset"));
    }

    #[test]
    fn test_warning_severity() {
        let diag = Diagnostic::warning("skipped 2 assets");
        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.format(false).starts_with("warning: skipped"));
    }

    #[test]
    fn test_matrix_syntax_error_points_at_source() {
        let content = "[[build]]\npackage = \n";
        let err = MatrixSyntaxError::new("builds.toml", content, "expected a value\n", Some(20..21));

        assert_eq!(err.to_string(), "expected a value");
        let rendered = err.render();
        assert!(rendered.contains("builds.toml"));
        assert!(rendered.contains("package ="));
    }
}
