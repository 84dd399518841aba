//! Filesystem primitives for mpm
//!
//! Provides lexical path normalization, atomic text I/O and the
//! copy/link/remove operations the checkout pipeline is built on.

pub mod error;
pub mod io;
pub mod ops;
pub mod path;

pub use error::{Error, Result};
pub use path::{fix_separators, is_descendant, lexical_join, lexical_normalize};
