//! Incremental decoding of a chunked response body.
//!
//! Every chunk is appended to a running buffer and the whole buffer is
//! re-parsed. A parse failure is expected while the document is incomplete
//! and is swallowed. Once a prefix parses, later chunks usually make the
//! buffer invalid again; those failures are swallowed too. If the server
//! streams several self-contained documents back to back, each successful
//! parse yields a payload and the caller re-renders each time.

use crate::models::ResultPayload;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    Accumulating,
    Emitted,
    Failed,
    Done,
}

#[derive(Debug)]
pub struct Accumulator {
    buffer: Vec<u8>,
    state: AccumulatorState,
    emitted: usize,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: AccumulatorState::Accumulating,
            emitted: 0,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Chunks pushed after a terminal state are ignored.
    pub fn push(&mut self, chunk: &[u8]) -> Option<ResultPayload> {
        if self.is_terminal() {
            return None;
        }

        // Parsing bytes rather than per-chunk strings keeps multi-byte
        // characters split across chunk boundaries intact.
        self.buffer.extend_from_slice(chunk);
        match serde_json::from_slice::<ResultPayload>(&self.buffer) {
            Ok(payload) => {
                self.state = AccumulatorState::Emitted;
                self.emitted += 1;
                Some(payload)
            }
            Err(err) => {
                debug!(
                    buffered = self.buffer.len(),
                    "accumulated body does not parse yet: {err}"
                );
                None
            }
        }
    }

    pub fn finish(&mut self) {
        if !self.is_terminal() {
            self.state = AccumulatorState::Done;
        }
    }

    pub fn fail(&mut self) {
        if !self.is_terminal() {
            self.state = AccumulatorState::Failed;
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self.state, AccumulatorState::Failed | AccumulatorState::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"analyses":{"merged":"a\nb"},"datasets":[{"data":[{"year":2020,"value":1}]}]}"#;

    #[test]
    fn emits_once_the_buffer_completes() {
        let mut acc = Accumulator::new();
        let (head, tail) = DOC.split_at(20);

        assert!(acc.push(head.as_bytes()).is_none());
        assert_eq!(acc.state(), AccumulatorState::Accumulating);

        let payload = acc.push(tail.as_bytes()).expect("complete document");
        assert_eq!(payload.analyses.merged, "a\nb");
        assert_eq!(acc.state(), AccumulatorState::Emitted);
        assert_eq!(acc.emitted(), 1);

        acc.finish();
        assert_eq!(acc.state(), AccumulatorState::Done);
    }

    #[test]
    fn chunks_that_never_form_a_payload_emit_nothing() {
        let mut acc = Accumulator::new();
        assert!(acc.push(br#"{"analyses":"#).is_none());
        // Valid JSON overall, but not a payload: datasets is missing.
        assert!(acc.push(br#"{"merged":"x"}}"#).is_none());
        acc.finish();
        assert_eq!(acc.emitted(), 0);
        assert_eq!(acc.state(), AccumulatorState::Done);
    }

    #[test]
    fn trailing_data_after_a_payload_is_swallowed() {
        let mut acc = Accumulator::new();
        assert!(acc.push(DOC.as_bytes()).is_some());
        assert!(acc.push(b"{").is_none());
        assert!(acc.push(DOC.as_bytes()).is_none());
        assert_eq!(acc.state(), AccumulatorState::Emitted);
        assert_eq!(acc.emitted(), 1);
    }

    #[test]
    fn whitespace_after_a_payload_parses_again() {
        let mut acc = Accumulator::new();
        assert!(acc.push(DOC.as_bytes()).is_some());
        assert!(acc.push(b"\n").is_some());
        assert_eq!(acc.emitted(), 2);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let doc = r#"{"analyses":{"merged":"Côte d'Ivoire"},"datasets":[]}"#;
        let bytes = doc.as_bytes();
        let split = doc.find('ô').unwrap() + 1;
        let mut acc = Accumulator::new();
        assert!(acc.push(&bytes[..split]).is_none());
        let payload = acc.push(&bytes[split..]).unwrap();
        assert_eq!(payload.analyses.merged, "Côte d'Ivoire");
    }

    #[test]
    fn terminal_states_ignore_further_chunks() {
        let mut acc = Accumulator::new();
        acc.push(br#"{"analyses":"#);
        acc.fail();
        assert_eq!(acc.state(), AccumulatorState::Failed);
        assert!(acc.push(br#"{"merged":"x"},"datasets":[]}"#).is_none());
        acc.finish();
        assert_eq!(acc.state(), AccumulatorState::Failed);
    }
}
