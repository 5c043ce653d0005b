//! Editor configuration, read from an optional TOML file.
//!
//! ```toml
//! char_width = 15
//! mirror = "complement"          # or "reverse_complement"
//! annotation_prefix = "Annotations-"
//! context_path = "http://localhost:8080/apollo"
//! service = "AnnotationEditorService"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::{
    error::AlterationError,
    sequences::{complement, reverse_complement},
};

/// How the paired strand field mirrors the field being typed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MirrorMode {
    /// Complement each base without reversing the order.
    #[default]
    Complement,
    /// The opposite strand read 5' to 3'.
    ReverseComplement,
}

impl MirrorMode {
    pub fn mirror(&self, seq: &str) -> String {
        match self {
            MirrorMode::Complement => complement(seq),
            MirrorMode::ReverseComplement => reverse_complement(seq),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Visible width of a strand field, in characters. Past this the field
    /// scrolls and the paired field is hidden.
    pub char_width: usize,
    pub mirror: MirrorMode,
    /// Prefix of annotation track names, followed by the sequence name.
    pub annotation_prefix: String,
    /// Base URL of the annotation editor web application.
    pub context_path: String,
    pub service: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            char_width: 15,
            mirror: MirrorMode::Complement,
            annotation_prefix: "Annotations-".to_string(),
            context_path: "..".to_string(),
            service: "AnnotationEditorService".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load a configuration from a TOML file; missing keys take their defaults.
    pub fn from_toml_file(filepath: impl Into<PathBuf>) -> Result<Self, AlterationError> {
        let contents = fs::read_to_string(filepath.into())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// The annotation track name for a reference sequence.
    pub fn track_name(&self, seqname: &str) -> String {
        format!("{}{}", self.annotation_prefix, seqname)
    }

    /// The URL update and translation table requests are posted to.
    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.context_path.trim_end_matches('/'), self.service)
    }
}
