//! Types for reading and writing the object-literal text format
//!
//! See the top level module documentation for an overview of the format.
pub(crate) mod lexer;
mod reader;
mod writer;

pub use self::reader::Reader;
pub use self::writer::*;
