//! The sequence alteration editor.
//!
//! An [`AlterationDialog`] holds the text fields of one pending alteration
//! and filters keystrokes into them. The [`SequenceAlterationEditor`] owns
//! the collaborators: on confirmation it validates the dialog's text, builds
//! the [`SequenceAlterationFeature`], refuses it if it would overlap a stored
//! feature, and otherwise submits it to the [`UpdateService`].
//!
//! Deletions are entered as a length in a single numeric field. Insertions
//! and substitutions are entered in paired `+` / `-` strand fields; typing in
//! either one rewrites the other with its mirror image (see [`MirrorMode`]).
//! Once the active field holds more than `char_width` characters it scrolls,
//! and the paired field is hidden until it no longer does.

use tracing::{debug, info, warn};

use crate::{
    alteration::{AlterationInput, AlterationType, SequenceAlterationFeature},
    config::{EditorConfig, MirrorMode},
    error::AlterationError,
    request::UpdateRequest,
    sequences::is_residue,
    traits::{FeatureCounter, GenericRange, UpdateService},
    Position,
};

/// A single key press delivered to a dialog field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Backspace,
    Enter,
}

/// The text fields an alteration dialog may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputField {
    /// Deletion length.
    Length,
    /// Forward strand sequence.
    Plus,
    /// Reverse strand sequence.
    Minus,
}

/// What a dialog did with a keystroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// The keystroke edited the field.
    Accepted,
    /// The keystroke was filtered out; the field is unchanged.
    Rejected,
    /// Enter was pressed.
    Confirm,
}

/// What the editor did with a keystroke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyResponse {
    Accepted,
    Rejected,
    Submitted(UpdateRequest),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct StrandField {
    value: String,
    visible: bool,
}

impl StrandField {
    fn new() -> Self {
        Self {
            value: String::new(),
            visible: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum DialogFields {
    Length(String),
    Strands {
        plus: StrandField,
        minus: StrandField,
    },
}

/// The input fields of one pending alteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlterationDialog {
    alteration_type: AlterationType,
    coordinate: Position,
    fields: DialogFields,
    char_width: usize,
    mirror: MirrorMode,
}

impl AlterationDialog {
    /// Create the empty dialog for an alteration of `alteration_type` at `coordinate`.
    pub fn new(alteration_type: AlterationType, coordinate: Position, config: &EditorConfig) -> Self {
        let fields = if alteration_type.has_residues() {
            DialogFields::Strands {
                plus: StrandField::new(),
                minus: StrandField::new(),
            }
        } else {
            DialogFields::Length(String::new())
        };
        Self {
            alteration_type,
            coordinate,
            fields,
            char_width: config.char_width,
            mirror: config.mirror,
        }
    }

    pub fn alteration_type(&self) -> AlterationType {
        self.alteration_type
    }

    pub fn coordinate(&self) -> Position {
        self.coordinate
    }

    /// The fields this dialog shows, in display order.
    pub fn fields(&self) -> &'static [InputField] {
        match self.fields {
            DialogFields::Length(_) => &[InputField::Length],
            DialogFields::Strands { .. } => &[InputField::Plus, InputField::Minus],
        }
    }

    /// The current text of `field`, or `None` if this dialog has no such field.
    pub fn value(&self, field: InputField) -> Option<&str> {
        match (&self.fields, field) {
            (DialogFields::Length(value), InputField::Length) => Some(value),
            (DialogFields::Strands { plus, .. }, InputField::Plus) => Some(&plus.value),
            (DialogFields::Strands { minus, .. }, InputField::Minus) => Some(&minus.value),
            _ => None,
        }
    }

    /// Whether `field` is present and currently shown.
    pub fn is_visible(&self, field: InputField) -> bool {
        match (&self.fields, field) {
            (DialogFields::Length(_), InputField::Length) => true,
            (DialogFields::Strands { plus, .. }, InputField::Plus) => plus.visible,
            (DialogFields::Strands { minus, .. }, InputField::Minus) => minus.visible,
            _ => false,
        }
    }

    /// The text submitted on confirmation: the length for a deletion, the
    /// forward strand otherwise.
    pub fn confirmed_text(&self) -> &str {
        match &self.fields {
            DialogFields::Length(value) => value,
            DialogFields::Strands { plus, .. } => &plus.value,
        }
    }

    /// Validate the confirmed text.
    pub fn input(&self) -> Result<AlterationInput, AlterationError> {
        AlterationInput::parse(self.alteration_type, self.confirmed_text())
    }

    /// Apply a keystroke to `field`.
    ///
    /// Keystrokes to a field the dialog does not have, or to a hidden
    /// strand field, are rejected. The paired field's visibility is judged
    /// on the active field's length after this keystroke, so there is no
    /// one-keystroke lag: it hides on character `char_width + 1`.
    pub fn keydown(&mut self, field: InputField, key: Keystroke) -> KeyAction {
        if !self.is_visible(field) {
            return KeyAction::Rejected;
        }
        if key == Keystroke::Enter {
            return KeyAction::Confirm;
        }

        let char_width = self.char_width;
        let mirror = self.mirror;
        match &mut self.fields {
            DialogFields::Length(value) => match key {
                Keystroke::Char(c) if c.is_ascii_digit() => {
                    value.push(c);
                    KeyAction::Accepted
                }
                Keystroke::Backspace => {
                    value.pop();
                    KeyAction::Accepted
                }
                _ => KeyAction::Rejected,
            },
            DialogFields::Strands { plus, minus } => {
                let (active, paired) = match field {
                    InputField::Plus => (plus, minus),
                    _ => (minus, plus),
                };
                match key {
                    Keystroke::Char(c) if is_residue(c) => {
                        active.value.push(c);
                    }
                    Keystroke::Backspace => {
                        active.value.pop();
                    }
                    _ => return KeyAction::Rejected,
                }
                paired.value = mirror.mirror(&active.value);
                paired.visible = active.value.chars().count() <= char_width;
                KeyAction::Accepted
            }
        }
    }
}

/// Builds and submits sequence alterations on one reference sequence.
pub struct SequenceAlterationEditor<C, U> {
    seqname: String,
    counter: C,
    updater: U,
    config: EditorConfig,
}

impl<C: FeatureCounter, U: UpdateService> SequenceAlterationEditor<C, U> {
    /// Create an editor for alterations on `seqname`, checking overlaps against
    /// `counter` and submitting to `updater`.
    pub fn new(seqname: impl Into<String>, counter: C, updater: U, config: EditorConfig) -> Self {
        Self {
            seqname: seqname.into(),
            counter,
            updater,
            config,
        }
    }

    pub fn seqname(&self) -> &str {
        &self.seqname
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }

    pub fn updater(&self) -> &U {
        &self.updater
    }

    pub fn into_parts(self) -> (C, U) {
        (self.counter, self.updater)
    }

    /// Open the input dialog for a new alteration at `coordinate`.
    pub fn open_dialog(&self, alteration_type: AlterationType, coordinate: Position) -> AlterationDialog {
        AlterationDialog::new(alteration_type, coordinate, &self.config)
    }

    /// Deliver a keystroke to a dialog field; Enter confirms the dialog.
    pub fn handle_keydown(
        &mut self,
        dialog: &mut AlterationDialog,
        field: InputField,
        key: Keystroke,
    ) -> Result<KeyResponse, AlterationError> {
        match dialog.keydown(field, key) {
            KeyAction::Accepted => Ok(KeyResponse::Accepted),
            KeyAction::Rejected => Ok(KeyResponse::Rejected),
            KeyAction::Confirm => self.add_sequence_alteration(dialog).map(KeyResponse::Submitted),
        }
    }

    /// Confirm a dialog: validate, check overlap, submit and close it.
    pub fn add_sequence_alteration(
        &mut self,
        dialog: &AlterationDialog,
    ) -> Result<UpdateRequest, AlterationError> {
        self.submit(dialog.alteration_type(), dialog.coordinate(), dialog.confirmed_text())
    }

    /// Validate `text` as an alteration at `coordinate` and build the request,
    /// without submitting it.
    pub fn build_request(
        &self,
        alteration_type: AlterationType,
        coordinate: Position,
        text: &str,
    ) -> Result<UpdateRequest, AlterationError> {
        let input = AlterationInput::parse(alteration_type, text)?;
        let feature = SequenceAlterationFeature::new(coordinate, &input)?;

        let (start, end) = feature.occupied_range();
        let overlapping = self.counter.count_features(&self.seqname, start, end);
        if overlapping > 0 {
            return Err(AlterationError::OverlappingAlteration(start, end, overlapping));
        }

        let track = self.updater.unique_track_name();
        Ok(UpdateRequest::add_sequence_alteration(track, feature))
    }

    /// Build the request for `text` and, if it is valid and does not overlap a
    /// stored feature, submit it and close the dialog.
    ///
    /// Nothing is submitted on error.
    pub fn submit(
        &mut self,
        alteration_type: AlterationType,
        coordinate: Position,
        text: &str,
    ) -> Result<UpdateRequest, AlterationError> {
        let request = match self.build_request(alteration_type, coordinate, text) {
            Ok(request) => request,
            Err(e) => {
                warn!(%alteration_type, coordinate, "sequence alteration rejected: {}", e);
                return Err(e);
            }
        };
        Ok(self.submit_request(request))
    }

    /// Submit a request from [`SequenceAlterationEditor::build_request()`]
    /// and close the dialog.
    pub fn submit_request(&mut self, request: UpdateRequest) -> UpdateRequest {
        for feature in &request.features {
            info!(
                track = %request.track,
                alteration_type = %feature.alteration_type(),
                coordinate = feature.location.fmin,
                "submitting sequence alteration"
            );
        }
        self.updater.execute_update_operation(&request);
        self.updater.close_dialog();
        debug!("alteration dialog closed");
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{
        random_residues, FixedCounter, RecordingCounter, RecordingUpdateService,
    };

    type TestEditor<C> = SequenceAlterationEditor<C, RecordingUpdateService>;

    fn editor_with(count: usize) -> TestEditor<FixedCounter> {
        SequenceAlterationEditor::new(
            "chr1",
            FixedCounter(count),
            RecordingUpdateService::new("Annotations-chr1"),
            EditorConfig::default(),
        )
    }

    fn type_text<C: FeatureCounter>(
        editor: &mut TestEditor<C>,
        dialog: &mut AlterationDialog,
        field: InputField,
        text: &str,
    ) -> Vec<KeyResponse> {
        text.chars()
            .map(|c| {
                editor
                    .handle_keydown(dialog, field, Keystroke::Char(c))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_deletion_end_to_end() {
        let mut editor = editor_with(0);
        let mut dialog = editor.open_dialog(AlterationType::Deletion, 1000);
        assert_eq!(dialog.fields(), &[InputField::Length]);

        type_text(&mut editor, &mut dialog, InputField::Length, "5");
        let response = editor
            .handle_keydown(&mut dialog, InputField::Length, Keystroke::Enter)
            .unwrap();

        let request = match response {
            KeyResponse::Submitted(request) => request,
            other => panic!("expected submission, got {:?}", other),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "track": "Annotations-chr1",
                "features": [{
                    "location": {"fmin": 1000, "fmax": 1005, "strand": 1},
                    "type": {"name": "deletion", "cv": {"name": "sequence"}}
                }],
                "operation": "add_sequence_alteration"
            })
        );
        assert_eq!(editor.updater().requests, vec![request]);
        assert_eq!(editor.updater().dialogs_closed, 1);
    }

    #[test]
    fn test_deletion_field_filters_non_digits() {
        let mut editor = editor_with(0);
        let mut dialog = editor.open_dialog(AlterationType::Deletion, 0);
        let responses = type_text(&mut editor, &mut dialog, InputField::Length, "1a-2");
        assert_eq!(
            responses,
            vec![
                KeyResponse::Accepted,
                KeyResponse::Rejected,
                KeyResponse::Rejected,
                KeyResponse::Accepted
            ]
        );
        assert_eq!(dialog.value(InputField::Length), Some("12"));

        editor
            .handle_keydown(&mut dialog, InputField::Length, Keystroke::Backspace)
            .unwrap();
        assert_eq!(dialog.value(InputField::Length), Some("1"));
    }

    #[test]
    fn test_insertion_emits_zero_width_feature() {
        for coordinate in [0, 1, 500, 99_999] {
            let residues = random_residues(8);
            let mut editor = editor_with(0);
            let request = editor
                .submit(AlterationType::Insertion, coordinate, &residues)
                .unwrap();
            let feature = &request.features[0];
            assert_eq!(feature.location.fmin, coordinate);
            assert_eq!(feature.location.fmax, coordinate);
            assert_eq!(feature.residues.as_deref(), Some(residues.as_str()));
        }
    }

    #[test]
    fn test_substitution_spans_residues() {
        let mut editor = editor_with(0);
        let request = editor
            .submit(AlterationType::Substitution, 250, "acgtn")
            .unwrap();
        let feature = &request.features[0];
        assert_eq!(feature.location.fmin, 250);
        assert_eq!(feature.location.fmax, 255);
        assert_eq!(feature.residues.as_deref(), Some("ACGTN"));
    }

    #[test]
    fn test_empty_input_is_not_submitted() {
        for alteration_type in [
            AlterationType::Insertion,
            AlterationType::Deletion,
            AlterationType::Substitution,
        ] {
            let mut editor = editor_with(0);
            let dialog = editor.open_dialog(alteration_type, 10);
            let result = editor.add_sequence_alteration(&dialog);
            assert!(matches!(result, Err(AlterationError::EmptyInput(_))));
            assert!(editor.updater().requests.is_empty());
            assert_eq!(editor.updater().dialogs_closed, 0);
        }
    }

    #[test]
    fn test_invalid_text_is_not_submitted() {
        let mut editor = editor_with(0);
        assert!(editor.submit(AlterationType::Deletion, 10, "0").is_err());
        assert!(editor.submit(AlterationType::Deletion, 10, "x").is_err());
        assert!(editor.submit(AlterationType::Insertion, 10, "ACU").is_err());
        assert!(editor.updater().requests.is_empty());
    }

    #[test]
    fn test_overlap_blocks_submission() {
        let mut editor = editor_with(2);
        let result = editor.submit(AlterationType::Deletion, 100, "3");
        assert!(matches!(
            result,
            Err(AlterationError::OverlappingAlteration(100, 103, 2))
        ));
        assert!(editor.updater().requests.is_empty());
    }

    #[test]
    fn test_overlap_query_interval() {
        let mut editor = SequenceAlterationEditor::new(
            "chr7",
            RecordingCounter::default(),
            RecordingUpdateService::new("Annotations-chr7"),
            EditorConfig::default(),
        );
        editor.submit(AlterationType::Insertion, 40, "A").unwrap();
        editor.submit(AlterationType::Deletion, 40, "4").unwrap();
        editor.submit(AlterationType::Substitution, 40, "GG").unwrap();
        assert_eq!(
            editor.counter().queries(),
            vec![
                ("chr7".to_string(), 40, 41),
                ("chr7".to_string(), 40, 44),
                ("chr7".to_string(), 40, 42),
            ]
        );
    }

    #[test]
    fn test_strand_fields_mirror_complement() {
        let mut editor = editor_with(0);
        let mut dialog = editor.open_dialog(AlterationType::Insertion, 5);
        assert_eq!(dialog.fields(), &[InputField::Plus, InputField::Minus]);

        let responses = type_text(&mut editor, &mut dialog, InputField::Plus, "ACxGT");
        assert_eq!(responses[2], KeyResponse::Rejected);
        assert_eq!(dialog.value(InputField::Plus), Some("ACGT"));
        assert_eq!(dialog.value(InputField::Minus), Some("TGCA"));

        type_text(&mut editor, &mut dialog, InputField::Minus, "A");
        assert_eq!(dialog.value(InputField::Minus), Some("TGCAA"));
        assert_eq!(dialog.value(InputField::Plus), Some("ACGTT"));

        editor
            .handle_keydown(&mut dialog, InputField::Plus, Keystroke::Backspace)
            .unwrap();
        assert_eq!(dialog.value(InputField::Plus), Some("ACGT"));
        assert_eq!(dialog.value(InputField::Minus), Some("TGCA"));
    }

    #[test]
    fn test_strand_fields_mirror_reverse_complement() {
        let config = EditorConfig {
            mirror: MirrorMode::ReverseComplement,
            ..EditorConfig::default()
        };
        let mut dialog = AlterationDialog::new(AlterationType::Substitution, 0, &config);
        for c in "AAC".chars() {
            dialog.keydown(InputField::Plus, Keystroke::Char(c));
        }
        assert_eq!(dialog.value(InputField::Minus), Some("GTT"));

        let mut dialog = AlterationDialog::new(AlterationType::Substitution, 0, &config);
        for c in "ACGT".chars() {
            dialog.keydown(InputField::Plus, Keystroke::Char(c));
        }
        assert_eq!(dialog.value(InputField::Minus), Some("ACGT"));
    }

    #[test]
    fn test_enter_on_minus_submits_plus() {
        let mut editor = editor_with(0);
        let mut dialog = editor.open_dialog(AlterationType::Substitution, 3);
        type_text(&mut editor, &mut dialog, InputField::Minus, "tt");
        let response = editor
            .handle_keydown(&mut dialog, InputField::Minus, Keystroke::Enter)
            .unwrap();
        match response {
            KeyResponse::Submitted(request) => {
                assert_eq!(request.features[0].residues.as_deref(), Some("AA"));
                assert_eq!(request.features[0].location.fmax, 5);
            }
            other => panic!("expected submission, got {:?}", other),
        }
    }

    #[test]
    fn test_paired_field_hidden_past_width() {
        let config = EditorConfig {
            char_width: 3,
            ..EditorConfig::default()
        };
        let mut dialog = AlterationDialog::new(AlterationType::Insertion, 0, &config);
        for c in "ACG".chars() {
            dialog.keydown(InputField::Plus, Keystroke::Char(c));
        }
        assert!(dialog.is_visible(InputField::Minus));

        dialog.keydown(InputField::Plus, Keystroke::Char('T'));
        assert!(!dialog.is_visible(InputField::Minus));
        assert_eq!(dialog.value(InputField::Minus), Some("TGCA"));
        assert_eq!(
            dialog.keydown(InputField::Minus, Keystroke::Char('A')),
            KeyAction::Rejected
        );

        dialog.keydown(InputField::Plus, Keystroke::Backspace);
        assert!(dialog.is_visible(InputField::Minus));
    }

    #[test]
    fn test_missing_field_rejects_keystrokes() {
        let config = EditorConfig::default();
        let mut deletion = AlterationDialog::new(AlterationType::Deletion, 0, &config);
        assert_eq!(
            deletion.keydown(InputField::Plus, Keystroke::Char('A')),
            KeyAction::Rejected
        );
        assert_eq!(deletion.value(InputField::Plus), None);

        let mut insertion = AlterationDialog::new(AlterationType::Insertion, 0, &config);
        assert_eq!(
            insertion.keydown(InputField::Length, Keystroke::Char('1')),
            KeyAction::Rejected
        );
    }

    #[test]
    fn test_failed_confirmation_keeps_dialog() {
        let mut editor = editor_with(0);
        let mut dialog = editor.open_dialog(AlterationType::Deletion, 0);
        type_text(&mut editor, &mut dialog, InputField::Length, "0");
        let result = editor.handle_keydown(&mut dialog, InputField::Length, Keystroke::Enter);
        assert!(matches!(result, Err(AlterationError::LengthNotPositive)));
        assert_eq!(dialog.value(InputField::Length), Some("0"));
        assert_eq!(editor.updater().dialogs_closed, 0);
    }

    #[test]
    fn test_dialog_input() {
        let editor = editor_with(0);
        let mut dialog = editor.open_dialog(AlterationType::Substitution, 9);
        assert!(matches!(dialog.input(), Err(AlterationError::EmptyInput(_))));
        for c in "ggn".chars() {
            dialog.keydown(InputField::Plus, Keystroke::Char(c));
        }
        assert_eq!(
            dialog.input().unwrap(),
            AlterationInput::Substitution("GGN".to_string())
        );
    }

    #[test]
    fn test_into_parts() {
        let config = EditorConfig {
            annotation_prefix: "Edits-".to_string(),
            ..EditorConfig::default()
        };
        let mut editor = SequenceAlterationEditor::new(
            "chr2",
            FixedCounter(0),
            RecordingUpdateService::new("Edits-chr2"),
            config,
        );
        assert_eq!(editor.seqname(), "chr2");
        assert_eq!(editor.config().annotation_prefix, "Edits-");
        editor.submit(AlterationType::Deletion, 3, "2").unwrap();

        let (counter, updater) = editor.into_parts();
        assert_eq!(counter.0, 0);
        assert_eq!(updater.requests.len(), 1);
        assert_eq!(updater.requests[0].track, "Edits-chr2");
    }

    #[test]
    fn test_paired_field_hides_past_default_width() {
        let mut dialog = AlterationDialog::new(AlterationType::Insertion, 0, &EditorConfig::default());
        for (i, c) in "ACGTACGTACGTACGTA".chars().enumerate() {
            dialog.keydown(InputField::Minus, Keystroke::Char(c));
            assert_eq!(dialog.is_visible(InputField::Plus), i + 1 <= 15, "length {}", i + 1);
        }
    }

    #[test]
    fn test_submit_built_request() {
        let mut editor = editor_with(0);
        let request = editor
            .build_request(AlterationType::Insertion, 12, "AC")
            .unwrap();
        assert!(editor.updater().requests.is_empty());
        let submitted = editor.submit_request(request.clone());
        assert_eq!(submitted, request);
        assert_eq!(editor.updater().requests, vec![request]);
        assert_eq!(editor.updater().dialogs_closed, 1);
    }
}
