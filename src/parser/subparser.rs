use log::{debug, trace, warn};

use crate::error::{DecodeError, DocumentError};
use crate::models::Profile;
use crate::parser::explodes::explode;
use crate::parser::yaml::clash::{is_clash_document, ClashDocument};
use crate::utils::base64::decode_b64_if_valid;

/// Default bound on nested payload layers (base64 inside base64, lines of a
/// decoded block, ...).
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Receives the results of normalizing a payload, in source order.
pub trait CandidateSink {
    /// A candidate decoded into a profile.
    fn accept(&mut self, profile: Profile);

    /// A structured document could not be parsed at all. None of its records
    /// were passed to [`CandidateSink::accept`].
    fn document_failed(&mut self, error: DocumentError);
}

/// Sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct ProfileCollector {
    pub profiles: Vec<Profile>,
    pub failures: Vec<DocumentError>,
}

impl CandidateSink for ProfileCollector {
    fn accept(&mut self, profile: Profile) {
        self.profiles.push(profile);
    }

    fn document_failed(&mut self, error: DocumentError) {
        self.failures.push(error);
    }
}

/// Reduce an arbitrary payload to decoded profiles.
///
/// Checked in this order, first match wins:
/// 1. the trimmed input is Base64 that decodes to text: recurse on the text;
/// 2. the input contains the Clash signature: decode it as a document;
/// 3. the input has several lines: recurse on every non-empty trimmed line;
/// 4. otherwise the input is a single link.
///
/// Candidates that fail to decode are dropped; decoding continues with the next.
pub fn normalize<S: CandidateSink + ?Sized>(input: &str, sink: &mut S) {
    normalize_with_depth(input, DEFAULT_MAX_DEPTH, sink);
}

/// [`normalize`] with an explicit bound on nesting. Input nested deeper than
/// `max_depth` layers is dropped.
pub fn normalize_with_depth<S: CandidateSink + ?Sized>(input: &str, max_depth: usize, sink: &mut S) {
    update(input, max_depth, sink);
}

fn update<S: CandidateSink + ?Sized>(input: &str, depth_left: usize, sink: &mut S) {
    if depth_left == 0 {
        debug!("Payload nested too deeply, dropping {} bytes", input.len());
        return;
    }

    // Base64 encoded subscription
    if let Some(decoded) = decode_b64_if_valid(input) {
        trace!("Unwrapped base64 layer of {} bytes", input.len());
        update(&decoded, depth_left - 1, sink);
        return;
    }

    // Clash
    if is_clash_document(input) {
        match ClashDocument::parse(input) {
            Ok(document) => document.profiles().for_each(|profile| sink.accept(profile)),
            Err(err) => {
                warn!("Failed to parse Clash document: {}", err);
                sink.document_failed(err);
            }
        }
        return;
    }

    // Multi line
    if input.contains('\n') {
        for line in input.split('\n') {
            let line = line.trim();
            if !line.is_empty() {
                update(line, depth_left - 1, sink);
            }
        }
        return;
    }

    let candidate = input.trim();
    if candidate.is_empty() {
        return;
    }
    match explode(candidate) {
        Ok(profile) => sink.accept(profile),
        Err(DecodeError::UnknownScheme) => trace!("No decoder for candidate '{}'", candidate),
        Err(err) => debug!("Dropping candidate '{}': {}", candidate, err),
    }
}
