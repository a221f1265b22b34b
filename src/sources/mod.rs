//! Release and source repositories.
//!
//! Sources are responsible for everything that talks to the outside world
//! before planning (the release feed) and during execution (git checkouts).

pub mod git;
pub mod github;

pub use git::{infer_repository, GitCheckout};
pub use github::{fetch_releases, repository_slug};
