//! JSON lines transcripts of runner callbacks.
//!
//! Each non-blank line holds one [`RunnerEvent`]. Lines starting with `#`
//! are comments.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::error::StoryError;
use crate::protocol::RunnerEvent;
use crate::visitor::{ResultVisitor, StructureVisitor};

/// Counts gathered while replaying a transcript.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Callbacks delivered to the visitor.
    pub events: usize,
    /// Callbacks the visitor rejected.
    pub rejected: usize,
}

fn decode_line(number: usize, line: &str) -> Option<Result<RunnerEvent, StoryError>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(
        serde_json::from_str(trimmed).map_err(|source| StoryError::Transcript {
            line: number,
            source,
        }),
    )
}

/// Decode every event of a transcript.
///
/// # Errors
///
/// Returns [`StoryError::Transcript`] for the first line that is not a
/// runner event and [`StoryError::Io`] when reading fails.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<RunnerEvent>, StoryError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(event) = decode_line(index + 1, &line) {
            events.push(event?);
        }
    }
    Ok(events)
}

/// Replay a transcript through `visitor`.
///
/// Callbacks rejected by the visitor are logged and counted; replay carries
/// on with the next line.
///
/// # Examples
/// ```
/// use rstest_bdd_story::protocol::EventCollector;
/// use rstest_bdd_story::transcript::replay;
///
/// let transcript = "# recorded run\n{\"event\":\"done\"}\n\n{\"event\":\"close\"}\n";
/// let mut collector = EventCollector::new();
/// let summary = replay(transcript.as_bytes(), &mut collector).unwrap();
/// assert_eq!(summary.events, 2);
/// assert_eq!(summary.rejected, 0);
/// ```
///
/// # Errors
///
/// Returns [`StoryError::Transcript`] when a line cannot be decoded and
/// [`StoryError::Io`] when reading fails.
pub fn replay<R, V>(reader: R, visitor: &mut V) -> Result<ReplaySummary, StoryError>
where
    R: BufRead,
    V: StructureVisitor + ResultVisitor + ?Sized,
{
    let mut summary = ReplaySummary::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(event) = decode_line(index + 1, &line) else {
            continue;
        };
        let event = event?;
        summary.events += 1;
        if let Err(error) = event.dispatch(visitor) {
            summary.rejected += 1;
            warn!(line = index + 1, callback = event.label(), %error, "callback rejected");
        }
    }
    debug!(
        events = summary.events,
        rejected = summary.rejected,
        "transcript replayed"
    );
    Ok(summary)
}

/// Write `events` as a transcript.
///
/// # Errors
///
/// Returns [`StoryError::Io`] when encoding or writing fails.
pub fn write_events<W: Write>(mut writer: W, events: &[RunnerEvent]) -> Result<(), StoryError> {
    for event in events {
        serde_json::to_writer(&mut writer, event).map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
