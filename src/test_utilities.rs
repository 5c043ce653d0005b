//! Test cases and test utility functions.
//!

use indexmap::IndexMap;
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::cell::RefCell;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use crate::{
    alteration::{AlterationInput, AlterationType, SequenceAlterationFeature},
    request::UpdateRequest,
    sequences::RESIDUES,
    store::StoredAlteration,
    traits::{FeatureCounter, UpdateService},
    Position,
};

// Stochastic test defaults
//
// This is the random number of alterations to use in tests and benches.
pub const NRANDOM_ALTERATIONS: usize = 10000;

// alteration span
pub const MIN_LEN: Position = 1;
pub const MAX_LEN: Position = 50;

// chromosome size
pub const CHROM_LEN: Position = 10_000_000;

/// Build a random sequence of `len` residues.
pub fn random_residues(len: usize) -> String {
    let mut rng = thread_rng();
    (0..len)
        .map(|_| *RESIDUES.choose(&mut rng).unwrap())
        .collect()
}

/// Build a random alteration on a sequence of length `chrom_len`.
pub fn random_alteration(chrom_len: Position) -> SequenceAlterationFeature {
    let mut rng = thread_rng();
    let len = rng.gen_range(MIN_LEN..MAX_LEN);
    let coordinate = rng.gen_range(0..chrom_len - len);
    let input = match rng.gen_range(0..3) {
        0 => AlterationInput::Insertion(random_residues(len as usize)),
        1 => AlterationInput::Deletion(len),
        _ => AlterationInput::Substitution(random_residues(len as usize)),
    };
    SequenceAlterationFeature::new(coordinate, &input).unwrap()
}

/// Build `n` random stored alterations on `seqname`, named `alt1`, `alt2`, ...
pub fn random_stored_alterations(seqname: &str, n: usize) -> Vec<StoredAlteration> {
    (1..=n)
        .map(|i| StoredAlteration {
            seqname: seqname.to_string(),
            uniquename: format!("alt{}", i),
            feature: random_alteration(CHROM_LEN),
        })
        .collect()
}

/// A stored alteration for tests.
pub fn stored(
    seqname: &str,
    uniquename: &str,
    alteration_type: AlterationType,
    coordinate: Position,
    text: &str,
) -> StoredAlteration {
    let input = AlterationInput::parse(alteration_type, text).unwrap();
    StoredAlteration {
        seqname: seqname.to_string(),
        uniquename: uniquename.to_string(),
        feature: SequenceAlterationFeature::new(coordinate, &input).unwrap(),
    }
}

/// Sequence lengths for tests.
pub fn test_seqlens() -> IndexMap<String, Position> {
    let mut seqlens = IndexMap::new();
    seqlens.insert("chr1".to_string(), 1000);
    seqlens.insert("chr2".to_string(), 500);
    seqlens
}

/// A [`FeatureCounter`] that always reports the same count.
#[derive(Clone, Copy, Debug)]
pub struct FixedCounter(pub usize);

impl FeatureCounter for FixedCounter {
    fn count_features(&self, _seqname: &str, _start: Position, _end: Position) -> usize {
        self.0
    }
}

/// A [`FeatureCounter`] that reports no features and records every query.
#[derive(Debug, Default)]
pub struct RecordingCounter {
    queries: RefCell<Vec<(String, Position, Position)>>,
}

impl RecordingCounter {
    pub fn queries(&self) -> Vec<(String, Position, Position)> {
        self.queries.borrow().clone()
    }
}

impl FeatureCounter for RecordingCounter {
    fn count_features(&self, seqname: &str, start: Position, end: Position) -> usize {
        self.queries
            .borrow_mut()
            .push((seqname.to_string(), start, end));
        0
    }
}

/// An [`UpdateService`] that keeps every submitted request.
#[derive(Debug, Default)]
pub struct RecordingUpdateService {
    pub track_name: String,
    pub requests: Vec<UpdateRequest>,
    pub dialogs_closed: usize,
}

impl RecordingUpdateService {
    pub fn new(track_name: &str) -> Self {
        Self {
            track_name: track_name.to_string(),
            ..Self::default()
        }
    }
}

impl UpdateService for RecordingUpdateService {
    fn unique_track_name(&self) -> String {
        self.track_name.clone()
    }
    fn execute_update_operation(&mut self, request: &UpdateRequest) {
        self.requests.push(request.clone());
    }
    fn close_dialog(&mut self) {
        self.dialogs_closed += 1;
    }
}

/// Serve a single HTTP response, returning the base URL and a handle
/// yielding the body of the request that was received.
pub fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
        }
        let mut request_body = vec![0; content_length];
        reader.read_exact(&mut request_body).unwrap();
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
        String::from_utf8(request_body).unwrap()
    });
    (url, handle)
}
