//! Source-control access.
//!
//! Only git is supported; the build needs nothing beyond the HEAD hash and
//! whether tracked files carry local modifications.

pub mod git;

pub use git::{GitError, GitManager, GitResult};
