//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::core::matrix::MatrixError;
use crate::core::platform::{PlatformFamily, UnhandledPlatformError};
use crate::util::diagnostic::Diagnostic;

/// Fatal error while computing missing builds.
///
/// Unlike a bad release asset, these abort the run before any build unit is
/// produced.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid build matrix: {0}")]
    Matrix(#[from] MatrixError),

    #[error("`{filename}`: {source}")]
    UnhandledPlatform {
        filename: String,
        #[source]
        source: UnhandledPlatformError,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::Matrix(err) => {
                let mut diag = Diagnostic::error("invalid build matrix").with_context(err.to_string());

                diag = match err {
                    MatrixError::InvalidRevision { .. } => diag.with_suggestion(
                        "Use the full commit hash, e.g. `git rev-parse HEAD`".to_string(),
                    ),
                    MatrixError::UnknownTarget { .. } | MatrixError::UnknownAbi { .. } => diag
                        .with_suggestion(
                            "Use one of the known values listed above".to_string(),
                        ),
                    MatrixError::InvalidRepository { .. } => diag.with_suggestion(
                        "Use `owner/name` or a full repository URL".to_string(),
                    ),
                    _ => diag,
                };

                diag
            }

            ResolveError::UnhandledPlatform { filename, source } => {
                let known: Vec<&str> = PlatformFamily::ALL.iter().map(|f| f.prefix()).collect();

                Diagnostic::error(format!(
                    "unhandled platform `{}` in published wheel",
                    source.tag
                ))
                .with_context(format!("wheel: {}", filename))
                .with_context(format!("known platform families: {}", known.join(", ")))
                .with_suggestion(
                    "Remove the asset from the release or add support for its platform"
                        .to_string(),
                )
            }
        }
    }
}
