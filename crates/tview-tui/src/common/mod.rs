//! Helpers shared across render paths.

mod text;

pub use text::{clean_for_terminal, truncate_with_ellipsis};
