//! Static passes run before either backend.

pub mod analyze;
pub mod error;
pub mod symtab;
