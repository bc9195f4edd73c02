//! Direct interpreter for checked TINY programs.

pub mod error;
pub mod value;
pub mod vm;
