//! Character encoding detection for downloaded playlists.
//!
//! Detection strategy:
//! 1. BOM check
//! 2. Pure ASCII is read as UTF-8
//! 3. chardetng guess, scored by how cleanly the sample decodes
//! 4. Anything below [`MIN_CONFIDENCE`] falls back to UTF-8

use crate::error::{AppError, Result};
use chardetng::EncodingDetector as ChardetngDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// Guesses under this confidence are replaced by UTF-8.
pub const MIN_CONFIDENCE: f32 = 0.7;

/// A candidate encoding and how sure the classifier is about it, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharsetGuess {
    pub encoding: &'static Encoding,
    pub confidence: f32,
}

/// Statistical charset classifier used by [`EncodingDetector`].
pub trait CharsetClassifier: Send + Sync {
    fn classify(&self, bytes: &[u8]) -> Result<CharsetGuess>;
}

/// Classifier backed by chardetng.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChardetngClassifier;

impl CharsetClassifier for ChardetngClassifier {
    fn classify(&self, bytes: &[u8]) -> Result<CharsetGuess> {
        if bytes.is_empty() {
            return Err(AppError::Custom(String::from("no bytes to classify")));
        }

        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return Ok(CharsetGuess {
                encoding,
                confidence: 1.0,
            });
        }

        if bytes.is_ascii() {
            return Ok(CharsetGuess {
                encoding: UTF_8,
                confidence: 1.0,
            });
        }

        let mut detector = ChardetngDetector::new();
        detector.feed(bytes, true);
        let encoding = detector.guess(None, true);

        Ok(CharsetGuess {
            encoding,
            confidence: decode_score(bytes, encoding),
        })
    }
}

/// Share of printable characters after decoding, or 0 if decoding hit
/// malformed sequences.
fn decode_score(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return 0.0;
    }

    let mut total = 0usize;
    let mut control = 0usize;
    for ch in decoded.chars() {
        total += 1;
        if ch.is_control() && !matches!(ch, '\n' | '\r' | '\t') {
            control += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    (total - control) as f32 / total as f32
}

/// Picks a text encoding for raw playlist bytes and decodes them.
pub struct EncodingDetector {
    classifier: Box<dyn CharsetClassifier>,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self::new(ChardetngClassifier)
    }
}

impl EncodingDetector {
    pub fn new(classifier: impl CharsetClassifier + 'static) -> Self {
        Self {
            classifier: Box::new(classifier),
        }
    }

    /// Returns the guessed encoding, or UTF-8 when the guess is weak or fails.
    pub fn detect(&self, bytes: &[u8]) -> &'static Encoding {
        match self.classifier.classify(bytes) {
            Ok(guess) if guess.confidence < MIN_CONFIDENCE => {
                warn!(
                    encoding = guess.encoding.name(),
                    confidence = guess.confidence,
                    "Low encoding confidence, using UTF-8"
                );
                UTF_8
            }
            Ok(guess) => {
                debug!(
                    encoding = guess.encoding.name(),
                    confidence = guess.confidence,
                    "Detected encoding"
                );
                guess.encoding
            }
            Err(e) => {
                warn!(error = %e, "Encoding detection failed, using UTF-8");
                UTF_8
            }
        }
    }

    /// Decodes `bytes` with the detected encoding.
    ///
    /// If that decode reports malformed input, the bytes are decoded once more
    /// as UTF-8 with invalid sequences replaced, and that result is accepted.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self.detect(bytes);
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return text.into_owned();
        }

        warn!(
            encoding = encoding.name(),
            "Malformed input for detected encoding, decoding as lossy UTF-8"
        );
        let (text, _, _) = UTF_8.decode(bytes);
        text.into_owned()
    }
}
