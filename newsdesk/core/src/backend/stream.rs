//! NDJSON fragment decoding
//!
//! The generation service replies with one JSON object per line, each
//! carrying a piece of text under `response`. Chunks from the transport do
//! not respect line boundaries (a line, or a multi-byte character, may be
//! split across chunks), so bytes are buffered until a full line is present.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde::Deserialize;

use super::traits::{GenerationError, GenerationResult};

/// One incremental piece of generated text
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Fragment {
    /// Text carried by this line; empty when the field is absent
    #[serde(default)]
    pub response: String,
    /// Service-side completion flag. End of body is what ends the stream.
    #[serde(default)]
    pub done: bool,
}

/// Splits a byte stream into trimmed, non-empty lines
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
    lines: VecDeque<Vec<u8>>,
}

impl LineBuffer {
    /// Only the new bytes are scanned; the buffer is split once per chunk.
    fn extend(&mut self, chunk: &[u8]) {
        let Some(last_newline) = chunk.iter().rposition(|&b| b == b'\n') else {
            self.pending.extend_from_slice(chunk);
            return;
        };

        let (complete, rest) = chunk.split_at(last_newline + 1);
        self.pending.extend_from_slice(complete);
        let block = std::mem::replace(&mut self.pending, rest.to_vec());

        for line in block.split(|&b| b == b'\n') {
            let trimmed = line.trim_ascii();
            if !trimmed.is_empty() {
                self.lines.push_back(trimmed.to_vec());
            }
        }
    }

    fn next_line(&mut self) -> Option<Vec<u8>> {
        self.lines.pop_front()
    }

    /// Flush the unterminated tail once the body has ended
    fn finish(&mut self) {
        let tail = std::mem::take(&mut self.pending);
        let trimmed = tail.trim_ascii();
        if !trimmed.is_empty() {
            self.lines.push_back(trimmed.to_vec());
        }
    }
}

fn parse_fragment(line: &[u8]) -> Result<Fragment, GenerationError> {
    serde_json::from_slice(line).map_err(|source| GenerationError::StreamDecode {
        line: String::from_utf8_lossy(line).into_owned(),
        source,
    })
}

struct DecodeState<S> {
    body: Pin<Box<S>>,
    lines: LineBuffer,
    finished: bool,
}

/// Decode a response body into a lazy stream of fragments.
///
/// Fragments are yielded in the order their lines arrive. The stream ends
/// after the body ends, or right after the first error (transport failure or
/// malformed line); it cannot be restarted.
pub fn decode_fragments<S, B, E>(body: S) -> impl Stream<Item = Result<Fragment, GenerationError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<GenerationError>,
{
    let state = DecodeState {
        body: Box::pin(body),
        lines: LineBuffer::default(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.lines.next_line() {
                let fragment = parse_fragment(&line);
                if fragment.is_err() {
                    state.finished = true;
                    state.lines = LineBuffer::default();
                }
                return Some((fragment, state));
            }

            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => state.lines.extend(chunk.as_ref()),
                Some(Err(e)) => {
                    state.finished = true;
                    state.lines = LineBuffer::default();
                    return Some((Err(e.into()), state));
                }
                None => {
                    state.finished = true;
                    state.lines.finish();
                }
            }
        }
    })
}

/// Concatenate fragment text in order and trim the result.
///
/// Stops at the first error; no partial text escapes on failure.
pub async fn accumulate<S>(fragments: S) -> GenerationResult
where
    S: Stream<Item = Result<Fragment, GenerationError>>,
{
    let text = fragments
        .try_fold(String::new(), |mut acc, fragment| async move {
            acc.push_str(&fragment.response);
            Ok(acc)
        })
        .await?;

    Ok(text.trim().to_string())
}
