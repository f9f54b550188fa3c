//! Every built-in scenario plays out to the outcome it describes.

mod common;

use std::sync::Arc;

use common::EventLog;
use ghostsweep::game::{MatchReport, Outcome};
use ghostsweep::scenarios::{list_scenario_names, load_scenario};
use ghostsweep::sim::ScriptRunner;
use ghostsweep::ui::RecordingUi;
use tokio_util::sync::CancellationToken;

async fn play(name: &str) -> (MatchReport, Arc<RecordingUi>, EventLog) {
    let loaded = load_scenario(name).unwrap();
    assert!(
        loaded.warnings.is_empty(),
        "{name} has warnings: {:?}",
        loaded.warnings
    );
    let runner = ScriptRunner::new(loaded.script).unwrap();
    let ui = Arc::new(RecordingUi::new());
    let events = EventLog::default();
    let report = runner
        .run(ui.clone(), events.emitter(), CancellationToken::new())
        .await
        .unwrap();
    (report, ui, events)
}

#[tokio::test(start_paused = true)]
async fn quick_win() {
    let (report, ui, events) = play("quick-win").await;
    assert_eq!(report.outcome, Some(Outcome::Win));
    assert_eq!(report.exterminated, 5);
    assert_eq!(report.forced_extractions, 0);
    assert!(report.shakes > 0);
    assert!(report.remaining_seconds > 0);
    assert_eq!(ui.banners(), vec![Outcome::Win]);
    assert_eq!(events.of_type("ExtractionCompleted").len(), 5);
}

#[tokio::test(start_paused = true)]
async fn shake_rush() {
    let (report, _, events) = play("shake-rush").await;
    assert_eq!(report.outcome, Some(Outcome::Win));
    assert_eq!(report.exterminated, 5);
    assert_eq!(report.forced_extractions, 5);
    for completed in events.of_type("ExtractionCompleted") {
        assert_eq!(completed["completion"], "forced");
        assert_eq!(completed["length_seconds"], 1.0);
    }
}

#[tokio::test(start_paused = true)]
async fn time_out() {
    let (report, ui, _) = play("time-out").await;
    assert_eq!(report.outcome, Some(Outcome::Lose));
    assert_eq!(report.exterminated, 1);
    assert_eq!(report.remaining_seconds, 0);
    assert_eq!(ui.banners(), vec![Outcome::Lose]);
}

#[tokio::test(start_paused = true)]
async fn flicker() {
    let (report, _, events) = play("flicker").await;
    assert_eq!(report.outcome, Some(Outcome::Lose));
    assert_eq!(report.exterminated, 2);
    assert_eq!(events.of_type("ExtractionStarted").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn no_motion_sensor() {
    let (report, _, events) = play("no-motion-sensor").await;
    assert_eq!(report.outcome, Some(Outcome::Win));
    assert_eq!(report.shakes, 0);
    assert!(events.of_type("ExtractionShortened").is_empty());
    for completed in events.of_type("ExtractionCompleted") {
        assert_eq!(completed["completion"], "natural");
        assert_eq!(completed["length_seconds"], 10.0);
    }
}

#[test]
fn every_scenario_is_covered() {
    let mut names = list_scenario_names();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "flicker",
            "no-motion-sensor",
            "quick-win",
            "shake-rush",
            "time-out"
        ]
    );
}
