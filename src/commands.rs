//! Implementations of the `seqalter` command line subcommands.

use indexmap::IndexMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::{
    alteration::AlterationType,
    config::{EditorConfig, MirrorMode},
    editor::SequenceAlterationEditor,
    error::AlterationError,
    io::{read_seqlens, OutputFile},
    ranges::validate_range,
    request::{TranslationTableRequest, UpdateRequest},
    sequences::is_residue,
    service::AnnotationEditorClient,
    store::AnnotationStore,
    translation::{load_translation_table, CodonTable},
    Position,
};

fn output_stream(output: Option<&PathBuf>) -> OutputFile {
    output.map_or(OutputFile::new_stdout(), OutputFile::new)
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&PathBuf>) -> Result<(), AlterationError> {
    let mut writer = output_stream(output).writer()?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Build a sequence alteration, check it against the existing alterations
/// and either print its update request or post it to the annotation service.
///
/// `alterations` (a TSV file of existing alterations) requires `seqlens`.
#[allow(clippy::too_many_arguments)]
pub fn seqalter_add(
    alteration_type: AlterationType,
    seqname: &str,
    coordinate: Position,
    text: &str,
    alterations: Option<&PathBuf>,
    seqlens: Option<&PathBuf>,
    config: &EditorConfig,
    post: bool,
    output: Option<&PathBuf>,
) -> Result<UpdateRequest, AlterationError> {
    let genome = match seqlens {
        Some(path) => Some(read_seqlens(path)?),
        None => None,
    };

    let store = match (alterations, &genome) {
        (Some(path), Some(genome)) => {
            let store = AnnotationStore::from_alterations_file(path, genome)?;
            info!(alterations = store.len(), "loaded existing alterations");
            store
        }
        (Some(_), None) => {
            return Err(AlterationError::InvalidGenomeFile(
                "a genome file is required to load existing alterations".to_string(),
            ))
        }
        (None, Some(genome)) => AnnotationStore::new(genome),
        (None, None) => AnnotationStore::new(&IndexMap::new()),
    };

    if post {
        let client = AnnotationEditorClient::new(config, seqname)?;
        let mut editor = SequenceAlterationEditor::new(seqname, &store, client, config.clone());
        let request = editor.build_request(alteration_type, coordinate, text)?;
        check_bounds(&request, seqname, genome.as_ref())?;
        Ok(editor.submit_request(request))
    } else {
        let track = config.track_name(seqname);
        let editor = SequenceAlterationEditor::new(seqname, &store, TrackName(track), config.clone());
        let request = editor.build_request(alteration_type, coordinate, text)?;
        check_bounds(&request, seqname, genome.as_ref())?;
        write_json(&request, output)?;
        Ok(request)
    }
}

/// An update service that only names the track; used to build requests
/// that are printed instead of submitted.
struct TrackName(String);

impl crate::traits::UpdateService for TrackName {
    fn unique_track_name(&self) -> String {
        self.0.clone()
    }
    fn execute_update_operation(&mut self, _request: &UpdateRequest) {}
}

fn check_bounds(
    request: &UpdateRequest,
    seqname: &str,
    genome: Option<&IndexMap<String, Position>>,
) -> Result<(), AlterationError> {
    let Some(genome) = genome else {
        return Ok(());
    };
    let length = *genome
        .get(seqname)
        .ok_or(AlterationError::MissingSequence(seqname.to_string()))?;
    for feature in &request.features {
        validate_range(feature.location.fmin, feature.location.fmax, length)?;
    }
    Ok(())
}

/// Mirror a sequence the way the paired strand field does.
pub fn seqalter_complement(seq: &str, mode: MirrorMode) -> Result<String, AlterationError> {
    if !seq.chars().all(is_residue) {
        return Err(AlterationError::InvalidResidues);
    }
    Ok(mode.mirror(seq))
}

/// Load the translation table of `seqname` from the annotation service,
/// falling back to the standard code, and write it as JSON.
pub fn seqalter_translation_table(
    seqname: &str,
    config: &EditorConfig,
    output: Option<&PathBuf>,
) -> Result<CodonTable, AlterationError> {
    let client = AnnotationEditorClient::new(config, seqname)?;
    let request = TranslationTableRequest::new(&config.annotation_prefix, seqname);
    let codon_table = load_translation_table(&client, &request);
    write_json(&codon_table, output)?;
    Ok(codon_table)
}
