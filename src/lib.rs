//! Building, validating and submitting sequence alteration annotations
//! (insertions, deletions and substitutions) against a reference sequence.
//!

pub mod alteration;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod io;
pub mod ranges;
pub mod request;
pub mod sequences;
pub mod service;
pub mod store;
pub mod test_utilities;
pub mod traits;
pub mod translation;

/// 0-based genomic coordinate.
pub type Position = u32;

pub mod prelude {
    pub use crate::alteration::{AlterationInput, AlterationType, SequenceAlterationFeature};
    pub use crate::config::{EditorConfig, MirrorMode};
    pub use crate::editor::{AlterationDialog, InputField, KeyResponse, Keystroke, SequenceAlterationEditor};
    pub use crate::error::AlterationError;
    pub use crate::io::file::read_seqlens;
    pub use crate::request::{Operation, UpdateRequest};
    pub use crate::store::{AnnotationStore, StoredAlteration};
    pub use crate::traits::{FeatureCounter, GenericRange, TranslationTableSource, UpdateService};
    pub use crate::translation::CodonTable;
}
