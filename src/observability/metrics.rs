//! Prometheus metrics for matches.
//!
//! Counters and gauges are recorded through the `metrics` facade; nothing
//! is exported unless [`init_metrics`] installed a recorder.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::GhostSweepError;
use crate::game::{CompletionKind, Outcome};

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Maximum length for script name labels.
const MAX_LABEL_LEN: usize = 64;

/// Initializes the global metrics recorder.
///
/// With `Some(port)` a Prometheus listener is bound on `127.0.0.1:<port>`;
/// with `None` the recorder is installed without an endpoint.
///
/// # Errors
///
/// Returns `GhostSweepError::Io` if the recorder or listener cannot be
/// installed.
pub fn init_metrics(port: Option<u16>) -> Result<(), GhostSweepError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| GhostSweepError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "ghostsweep_matches_total",
        "Matches finished, by outcome"
    );
    describe_counter!(
        "ghostsweep_extractions_total",
        "Extractions completed, by completion kind"
    );
    describe_counter!(
        "ghostsweep_shakes_total",
        "Shakes that shortened or forced an extraction"
    );
    describe_histogram!(
        "ghostsweep_extraction_seconds",
        "Extraction length at completion in seconds"
    );
    describe_gauge!(
        "ghostsweep_remaining_seconds",
        "Seconds left on the match clock"
    );
    describe_gauge!("ghostsweep_exterminated", "Ghosts exterminated this match");
}

/// Records a finished match.
pub fn record_match(outcome: Option<Outcome>, script: &str) {
    let label = outcome.map_or_else(|| "abandoned".to_owned(), |o| o.to_string());
    counter!(
        "ghostsweep_matches_total",
        "outcome" => label,
        "script" => sanitize_label(script),
    )
    .increment(1);
}

/// Records a completed extraction.
pub fn record_extraction(kind: CompletionKind, length_seconds: f64) {
    counter!("ghostsweep_extractions_total", "completion" => kind.as_str()).increment(1);
    histogram!("ghostsweep_extraction_seconds").record(length_seconds);
}

/// Records one accepted shake.
pub fn record_shake() {
    counter!("ghostsweep_shakes_total").increment(1);
}

/// Sets the match clock gauge.
pub fn set_remaining_seconds(seconds: u32) {
    gauge!("ghostsweep_remaining_seconds").set(f64::from(seconds));
}

/// Sets the exterminated gauge.
pub fn set_exterminated(count: u32) {
    gauge!("ghostsweep_exterminated").set(f64::from(count));
}

/// Sanitizes a user-supplied name for use as a metrics label.
///
/// Truncates to [`MAX_LABEL_LEN`] characters and replaces anything outside
/// `[A-Za-z0-9_-]` with an underscore.
fn sanitize_label(name: &str) -> String {
    name.chars()
        .take(MAX_LABEL_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_simple_names() {
        assert_eq!(sanitize_label("quick-win"), "quick-win");
        assert_eq!(sanitize_label("shake_rush2"), "shake_rush2");
    }

    #[test]
    fn sanitize_replaces_invalid_chars() {
        assert_eq!(sanitize_label("my script/v1"), "my_script_v1");
    }

    #[test]
    fn sanitize_truncates() {
        let long = "x".repeat(200);
        assert_eq!(sanitize_label(&long).len(), MAX_LABEL_LEN);
    }

    #[test]
    fn recording_without_recorder_is_a_noop() {
        record_match(Some(Outcome::Win), "quick-win");
        record_match(None, "quick-win");
        record_extraction(CompletionKind::Forced, 1.0);
        record_shake();
        set_remaining_seconds(12);
        set_exterminated(3);
    }
}
