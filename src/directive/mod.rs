//! Directive parsing.
//!
//! Turns block-structured directive text into [`RoutingConfig`](crate::RoutingConfig)s:
//!
//! ```text
//! compose <mount-path> [<upstream-url>] {
//!     fetch [<name>] <url> [<timeout>]
//!     except <path> [<path> ...]
//!     default_timeout <duration>
//! }
//! ```
//!
//! The pipeline is split into small pieces:
//!
//! - [`tokenizer`] - positioned tokens and line grouping
//! - [`statement`] - classification of one block line into a [`Statement`]
//! - [`normalize`] - URL normalization against the document root
//! - [`parser`] - the block state machine producing scopes
//!
//! Parsing is fail-fast: the first problem is reported as a [`DirectiveError`]
//! with its file, line and column, and nothing of the file is kept.

mod error;
mod normalize;
mod parser;
mod statement;
mod tokenizer;

pub use error::*;
pub use normalize::{local_root_url, normalize_url};
pub use parser::{ParseContext, parse_directives};
pub use statement::{ExceptStatement, FetchStatement, Statement};
pub use tokenizer::{Line, Token, split_lines, tokenize};
