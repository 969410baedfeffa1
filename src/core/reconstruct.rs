// ScanTrail - core/reconstruct.rs
//
// Attempt reconstruction: folds decoded events, in arrival order, into
// closed attempt records.
//
// Events for several attempts interleave in one log, so live attempts are
// kept in a map keyed by attempt id. An attempt opens on `scanner_start`,
// collects history on every later event carrying its id, and closes on
// `scanner_finish`. Attempts still open at end of stream are discarded.
//
// Core layer: pure logic, no I/O. Data-quality problems never raise.

use crate::core::classify::classify_error;
use crate::core::model::{AttemptRecord, AttemptState, DecodedEvent, Label, StatusKind};
use crate::core::parser;
use crate::util::constants;
use std::collections::HashMap;

/// Configuration for a reconstruction pass.
#[derive(Debug, Clone)]
pub struct ReconstructConfig {
    /// Maximum characters of the last error kept on a record.
    pub max_error_chars: usize,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            max_error_chars: constants::DEFAULT_MAX_ERROR_CHARS,
        }
    }
}

/// Counters for one pass. Diagnostic only; never written to the outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconstructStats {
    /// Raw lines offered via `push_line`.
    pub lines_seen: u64,
    /// Lines that decoded into an event.
    pub lines_decoded: u64,
    /// Lines that did not match the line shape.
    pub lines_dropped: u64,
    /// Events with no attempt id, or for an id that was not live.
    pub events_ignored: u64,
    /// Start events that opened an attempt.
    pub attempts_opened: u64,
    /// Start events that replaced an attempt which was still live.
    pub attempts_reopened: u64,
    /// Attempts closed by a finish event (equals records emitted).
    pub attempts_closed: u64,
    /// Attempts still open at end of stream.
    pub attempts_discarded: u64,
}

/// Result of a complete reconstruction pass.
#[derive(Debug, Clone, Default)]
pub struct ReconstructOutput {
    /// Closed attempts in closing order.
    pub records: Vec<AttemptRecord>,
    pub stats: ReconstructStats,
}

/// Keyed state machine over decoded events.
#[derive(Debug, Default)]
pub struct Reconstructor {
    config: ReconstructConfig,
    live: HashMap<u64, AttemptState>,
    records: Vec<AttemptRecord>,
    stats: ReconstructStats,
}

impl Reconstructor {
    pub fn new(config: ReconstructConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Number of attempts currently open.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live state of an open attempt, if `id` is currently open.
    pub fn live_attempt(&self, id: u64) -> Option<&AttemptState> {
        self.live.get(&id)
    }

    /// Decode and apply one raw line. Malformed lines are dropped.
    pub fn push_line(&mut self, line: &str) {
        self.stats.lines_seen += 1;
        match parser::decode_line(line) {
            Some(event) => {
                self.stats.lines_decoded += 1;
                self.push_event(event);
            }
            None => {
                self.stats.lines_dropped += 1;
                tracing::trace!(line, "Line does not match scanner log shape; dropped");
            }
        }
    }

    /// Apply one decoded event.
    pub fn push_event(&mut self, event: DecodedEvent) {
        let attempt_id = event.attempt_id;

        if event.kind == StatusKind::Start {
            match attempt_id {
                Some(id) => self.open(id, event),
                None => {
                    self.stats.events_ignored += 1;
                    tracing::trace!(status = %event.status, "Start event without attempt id; ignored");
                }
            }
            return;
        }

        let Some((id, state)) =
            attempt_id.and_then(|id| self.live.get_mut(&id).map(|state| (id, state)))
        else {
            self.stats.events_ignored += 1;
            tracing::trace!(
                status = %event.status,
                attempt = ?attempt_id,
                "Event for no live attempt; ignored"
            );
            return;
        };

        if event.kind.is_success_like() {
            state.found = state.found.max(parser::extract_found_count(&event.payload));
        }
        if event.kind.is_error_like() {
            state.errors.push(event.payload.clone());
        }
        state.statuses.push(event.status);
        state.raw_messages.push(event.payload);

        if event.kind == StatusKind::Finish {
            self.close(id, event.timestamp);
        }
    }

    /// End the pass. Attempts still open are discarded.
    pub fn finish(mut self) -> ReconstructOutput {
        self.stats.attempts_discarded = self.live.len() as u64;
        if !self.live.is_empty() {
            let mut ids: Vec<u64> = self.live.keys().copied().collect();
            ids.sort_unstable();
            tracing::debug!(attempts = ?ids, "Unterminated attempts discarded at end of stream");
        }

        tracing::debug!(
            lines = self.stats.lines_seen,
            decoded = self.stats.lines_decoded,
            dropped = self.stats.lines_dropped,
            ignored = self.stats.events_ignored,
            opened = self.stats.attempts_opened,
            reopened = self.stats.attempts_reopened,
            closed = self.stats.attempts_closed,
            discarded = self.stats.attempts_discarded,
            "Reconstruction complete"
        );

        ReconstructOutput {
            records: self.records,
            stats: self.stats,
        }
    }

    fn open(&mut self, id: u64, event: DecodedEvent) {
        let payload = event.payload;
        let state = AttemptState {
            attempt_id: id,
            started_at: event.timestamp,
            query: parser::extract_query(&payload).unwrap_or_default(),
            provider: parser::extract_provider(&payload)
                .unwrap_or_else(|| constants::DEFAULT_PROVIDER.to_string()),
            mode: parser::extract_mode(&payload)
                .unwrap_or_else(|| constants::DEFAULT_MODE.to_string()),
            preset: parser::extract_preset(&payload)
                .unwrap_or_else(|| constants::DEFAULT_PRESET.to_string()),
            found: 0,
            errors: Vec::new(),
            statuses: vec![event.status],
            raw_messages: vec![payload],
        };

        self.stats.attempts_opened += 1;
        if self.live.insert(id, state).is_some() {
            // Earlier state for a still-open id is overwritten, not merged.
            self.stats.attempts_reopened += 1;
            tracing::debug!(attempt = id, "Attempt restarted before finish; earlier state replaced");
        } else {
            tracing::debug!(attempt = id, started_at = event.timestamp, "Attempt opened");
        }
    }

    fn close(&mut self, id: u64, finished_at: u64) {
        let Some(state) = self.live.remove(&id) else {
            return;
        };

        let label = Label::from_outcome(state.found, !state.errors.is_empty());
        let last_error = state.errors.last();
        let error_type = last_error.map(|e| classify_error(e));
        let error = last_error
            .map(|e| truncate_chars(e, self.config.max_error_chars))
            .unwrap_or_default();

        tracing::debug!(
            attempt = id,
            found = state.found,
            label = %label,
            errors = state.errors.len(),
            "Attempt closed"
        );
        for (status, message) in state.statuses.iter().zip(&state.raw_messages) {
            tracing::trace!(
                attempt = id,
                status = %status,
                message = %message,
                "Attempt history"
            );
        }

        self.stats.attempts_closed += 1;
        self.records.push(AttemptRecord {
            attempt_id: state.attempt_id,
            started_at: state.started_at,
            finished_at,
            query: state.query,
            provider: state.provider,
            mode: state.mode,
            preset: state.preset,
            found: state.found,
            label,
            error_type,
            error,
            statuses: state.statuses,
        });
    }
}

/// First `max` Unicode scalar values of `text`.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Run a complete pass over an ordered sequence of raw lines.
pub fn reconstruct_lines<I, S>(lines: I, config: &ReconstructConfig) -> ReconstructOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut reconstructor = Reconstructor::new(config.clone());
    for line in lines {
        reconstructor.push_line(line.as_ref());
    }
    reconstructor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ErrorCategory;

    fn run(lines: &[&str]) -> ReconstructOutput {
        reconstruct_lines(lines.iter().copied(), &ReconstructConfig::default())
    }

    #[test]
    fn test_success_attempt() {
        let out = run(&[
            "100|scanner_start|playlist=-|attempt=1, query=foo, provider=ALL, mode=AUTO",
            "200|scanner_finish|playlist=-|attempt=1, results=5",
        ]);
        assert_eq!(out.records.len(), 1);
        let rec = &out.records[0];
        assert_eq!(rec.attempt_id, 1);
        assert_eq!(rec.started_at, 100);
        assert_eq!(rec.finished_at, 200);
        assert_eq!(rec.query, "foo");
        assert_eq!(rec.found, 5);
        assert_eq!(rec.label, Label::Success);
        assert_eq!(rec.error_type, None);
        assert_eq!(rec.error, "");
        assert_eq!(rec.statuses, vec!["scanner_start", "scanner_finish"]);
    }

    #[test]
    fn test_failed_attempt_classifies_last_error() {
        let out = run(&[
            "100 | scanner_start | playlist=- | attempt=2, query=bar",
            "150 | scanner_fatal | playlist=- | attempt=2, throwable=UnknownHostException: x",
            "200 | scanner_finish | playlist=- | attempt=2, results=0",
        ]);
        let rec = &out.records[0];
        assert_eq!(rec.label, Label::Failed);
        assert_eq!(rec.error_type, Some(ErrorCategory::Dns));
        assert_eq!(rec.error, "attempt=2, throwable=UnknownHostException: x");
        assert_eq!(rec.provider, "ALL");
        assert_eq!(rec.mode, "AUTO");
        assert_eq!(rec.preset, "-");
    }

    #[test]
    fn test_last_error_wins() {
        let out = run(&[
            "1 | scanner_start | playlist=- | attempt=4",
            "2 | scanner_provider_timeout | playlist=- | attempt=4, provider timed out",
            "3 | scanner_step_error | playlist=- | attempt=4, HTTP 401",
            "4 | scanner_finish | playlist=- | attempt=4",
        ]);
        let rec = &out.records[0];
        assert_eq!(rec.error_type, Some(ErrorCategory::HttpUnauthorized));
        assert_eq!(rec.error, "attempt=4, HTTP 401");
    }

    #[test]
    fn test_empty_attempt() {
        let out = run(&[
            "1 | scanner_start | playlist=- | attempt=5, query=x",
            "2 | scanner_finish | playlist=- | attempt=5, results=0",
        ]);
        assert_eq!(out.records[0].label, Label::Empty);
        assert_eq!(out.records[0].error_type, None);
    }

    #[test]
    fn test_found_is_running_maximum_over_success_like() {
        let out = run(&[
            "1 | scanner_start | playlist=- | attempt=1",
            "2 | scanner_step_ok | playlist=- | attempt=1, results=7",
            "3 | scanner_ok | playlist=- | attempt=1, Найдено 3",
            "4 | scanner_error | playlist=- | attempt=1, results=50, timeout",
            "5 | scanner_finish | playlist=- | attempt=1, results=0",
        ]);
        let rec = &out.records[0];
        // Counts on error-like events are not considered.
        assert_eq!(rec.found, 7);
        // Positive results win over recorded errors, but the error is still
        // classified.
        assert_eq!(rec.label, Label::Success);
        assert_eq!(rec.error_type, Some(ErrorCategory::Timeout));
    }

    #[test]
    fn test_unterminated_attempt_discarded() {
        let out = run(&["1 | scanner_start | playlist=- | attempt=3, query=x"]);
        assert!(out.records.is_empty());
        assert_eq!(out.stats.attempts_discarded, 1);
    }

    #[test]
    fn test_interleaved_attempts() {
        let out = run(&[
            "1 | scanner_start | playlist=- | attempt=1, query=one, provider=GITHUB",
            "2 | scanner_start | playlist=- | attempt=2, query=two, provider=GITLAB",
            "3 | scanner_step_ok | playlist=- | attempt=1, results=4",
            "4 | scanner_error | playlist=- | attempt=2, SSLHandshakeException",
            "5 | scanner_finish | playlist=- | attempt=1",
            "6 | scanner_finish | playlist=- | attempt=2",
        ]);
        assert_eq!(out.records.len(), 2);
        let (a, b) = (&out.records[0], &out.records[1]);
        assert_eq!((a.attempt_id, a.found, a.label), (1, 4, Label::Success));
        assert_eq!(a.provider, "GITHUB");
        assert_eq!(a.statuses, vec!["scanner_start", "scanner_step_ok", "scanner_finish"]);
        assert_eq!((b.attempt_id, b.found, b.label), (2, 0, Label::Failed));
        assert_eq!(b.error_type, Some(ErrorCategory::TlsSsl));
        assert_eq!(b.statuses, vec!["scanner_start", "scanner_error", "scanner_finish"]);
    }

    #[test]
    fn test_events_without_live_attempt_ignored() {
        let out = run(&[
            "1 | scanner_finish | playlist=- | attempt=9, results=3",
            "2 | scanner_start | playlist=- | query=no id",
            "3 | scanner_error | playlist=- | no id at all",
        ]);
        assert!(out.records.is_empty());
        assert_eq!(out.stats.events_ignored, 3);
        assert_eq!(out.stats.attempts_opened, 0);
    }

    #[test]
    fn test_restart_overwrites_live_state() {
        let out = run(&[
            "1 | scanner_start | playlist=- | attempt=1, query=first",
            "2 | scanner_error | playlist=- | attempt=1, timeout",
            "3 | scanner_start | playlist=- | attempt=1, query=second",
            "4 | scanner_finish | playlist=- | attempt=1",
        ]);
        assert_eq!(out.records.len(), 1);
        let rec = &out.records[0];
        assert_eq!(rec.query, "second");
        assert_eq!(rec.started_at, 3);
        assert_eq!(rec.label, Label::Empty);
        assert_eq!(rec.statuses, vec!["scanner_start", "scanner_finish"]);
        assert_eq!(out.stats.attempts_reopened, 1);
    }

    #[test]
    fn test_id_reusable_after_close() {
        let out = run(&[
            "1 | scanner_start | playlist=- | attempt=1, query=a",
            "2 | scanner_finish | playlist=- | attempt=1, results=1",
            "3 | scanner_start | playlist=- | attempt=1, query=b",
            "4 | scanner_finish | playlist=- | attempt=1, results=0",
        ]);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].query, "a");
        assert_eq!(out.records[1].query, "b");
        assert_eq!(out.stats.attempts_reopened, 0);
    }

    #[test]
    fn test_garbage_lines_do_not_affect_records() {
        let clean = run(&[
            "1 | scanner_start | playlist=- | attempt=1, query=foo",
            "2 | scanner_finish | playlist=- | attempt=1, results=2",
        ]);
        let noisy = run(&[
            "garbage",
            "1 | scanner_start | playlist=- | attempt=1, query=foo",
            "| | |",
            "",
            "x | scanner_error | playlist=- | attempt=1, timeout",
            "2 | scanner_finish | playlist=- | attempt=1, results=2",
            "trailing junk",
        ]);
        assert_eq!(clean.records, noisy.records);
        assert_eq!(noisy.stats.lines_dropped, 5);
    }

    #[test]
    fn test_error_truncated_by_chars() {
        let long_error = format!("attempt=1, {}", "ж".repeat(2_000));
        let lines = vec![
            "1 | scanner_start | playlist=- | attempt=1".to_string(),
            format!("2 | scanner_error | playlist=- | {long_error}"),
            "3 | scanner_finish | playlist=- | attempt=1".to_string(),
        ];
        let out = reconstruct_lines(&lines, &ReconstructConfig::default());
        assert_eq!(out.records[0].error.chars().count(), 1_000);
        assert!(long_error.starts_with(&out.records[0].error));
    }

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 2), "ab");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_push_event_api_and_live_count() {
        let mut r = Reconstructor::new(ReconstructConfig::default());
        r.push_event(parser::decode_line("1 | scanner_start | playlist=- | attempt=8").unwrap());
        assert_eq!(r.live_count(), 1);
        r.push_event(parser::decode_line("2 | scanner_finish | playlist=- | attempt=8").unwrap());
        assert_eq!(r.live_count(), 0);
        let out = r.finish();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.stats.attempts_closed, 1);
        assert_eq!(out.stats.lines_seen, 0);
    }

    #[test]
    fn test_live_attempt_keeps_message_history() {
        let mut r = Reconstructor::new(ReconstructConfig::default());
        r.push_line("1 | scanner_start | playlist=- | attempt=4, query=x");
        r.push_line("2 | ui_tick | playlist=- | attempt=4, progress=50");
        r.push_line("3 | scanner_error | playlist=- | attempt=4, timeout");

        let state = r.live_attempt(4).unwrap();
        assert_eq!(state.statuses, vec!["scanner_start", "ui_tick", "scanner_error"]);
        assert_eq!(
            state.raw_messages,
            vec!["attempt=4, query=x", "attempt=4, progress=50", "attempt=4, timeout"]
        );
        assert!(r.live_attempt(5).is_none());

        r.push_line("4 | scanner_finish | playlist=- | attempt=4");
        assert!(r.live_attempt(4).is_none());
    }
}
