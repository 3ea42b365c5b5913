//! Host integration: the composition middleware and its scope table.
//!
//! - [`scopes`] - `ScopeTable`, the atomically reloadable list of scopes
//! - [`compose`] - `ComposeLayer`/`ComposeService`, the tower middleware

mod compose;
mod scopes;

pub use compose::*;
pub use scopes::*;

#[cfg(test)]
mod tests;
