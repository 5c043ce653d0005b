//! Types and methods for reading input and writing output.

pub mod file;
pub mod tsv;

pub use file::{read_seqlens, InputFile, OutputFile};
pub use tsv::{AlterationRecord, AlterationsIterator};
