//! Model Asset Integration Tests
//!
//! Loads model and label files from disk and drives a full session with the
//! resulting classifier.

use std::io::Write;

use kanji_core::{InkError, InteractionController, InteractionState, SessionConfig, TouchEvent};
use kanji_model::{
    load_classifier, ClassifierConfig, GlyphClassifier, ModelAssets, ModelError, ModelFile,
};
use tempfile::NamedTempFile;

/// A 2x2 model whose classes prefer the top row and the bottom row.
fn rows_model(labels: &[&str]) -> ModelFile {
    ModelFile {
        input_width: 2,
        input_height: 2,
        weights: vec![vec![6.0, 6.0, -6.0, -6.0], vec![-6.0, -6.0, 6.0, 6.0]],
        bias: vec![0.0, 0.0],
        labels: labels.iter().map(|l| (*l).to_string()).collect(),
    }
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

fn write_model(model: &ModelFile) -> NamedTempFile {
    write_temp(&serde_json::to_string(model).expect("serialize"))
}

#[test]
fn test_load_with_inline_labels() {
    let model = write_model(&rows_model(&["一", "二"]));
    let classifier = GlyphClassifier::initialize(
        &ModelAssets::new(model.path()),
        ClassifierConfig::default(),
    )
    .expect("load");
    assert_eq!(classifier.network().classes(), 2);
    assert_eq!(classifier.network().label(1), Some("二"));
}

#[test]
fn test_label_resource_overrides_inline() {
    let model = write_model(&rows_model(&["a", "b"]));
    let labels = write_temp("上\n下\n");
    let classifier = GlyphClassifier::initialize(
        &ModelAssets::new(model.path()).with_labels(labels.path()),
        ClassifierConfig::default(),
    )
    .expect("load");
    assert_eq!(classifier.network().label(0), Some("上"));
}

#[test]
fn test_missing_labels_fail() {
    let model = write_model(&rows_model(&[]));
    let err = GlyphClassifier::initialize(
        &ModelAssets::new(model.path()),
        ClassifierConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::MissingLabels));
}

#[test]
fn test_label_count_mismatch_fails() {
    let model = write_model(&rows_model(&["a"]));
    let labels = write_temp("上\n下\n左\n");
    let err = GlyphClassifier::initialize(
        &ModelAssets::new(model.path()).with_labels(labels.path()),
        ClassifierConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ModelError::LabelMismatch {
            labels: 3,
            classes: 2
        }
    ));
}

#[test]
fn test_malformed_model_fails_closed() {
    let model = write_temp("{ not json");
    let err = GlyphClassifier::initialize(
        &ModelAssets::new(model.path()),
        ClassifierConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::Parse(_)));

    let ink: InkError = err.into();
    assert!(matches!(ink, InkError::ModelLoad(_)));

    let slot = load_classifier(&ModelAssets::new(model.path()), ClassifierConfig::default());
    assert!(!slot.is_ready());
}

#[test]
fn test_session_with_loaded_model() {
    let model = write_model(&rows_model(&["上", "下"]));
    let slot = load_classifier(
        &ModelAssets::new(model.path()),
        ClassifierConfig { top_k: 2 },
    );
    assert!(slot.is_ready());

    let mut ctl = InteractionController::new(&SessionConfig::default(), slot);

    // Horizontal stroke across the top of a 400x400 canvas.
    ctl.handle_touch(&TouchEvent::start(20.0, 60.0, 0)).expect("start");
    ctl.handle_touch(&TouchEvent::moved(200.0, 60.0, 16)).expect("move");
    let ticket = ctl
        .handle_touch(&TouchEvent::end(380.0, 60.0, 32))
        .expect("end")
        .expect("auto-evaluate");
    ctl.run_ticket(ticket);

    assert_eq!(ctl.state(), InteractionState::ResultsShown);
    assert_eq!(ctl.candidates().len(), 2);
    assert_eq!(ctl.candidates()[0].label, "上");

    ctl.select_index(0).expect("select");
    assert_eq!(ctl.buffer().as_str(), "上");
    assert!(ctl.canvas().is_empty());
}

#[test]
fn test_unavailable_model_session_degrades() {
    let slot = load_classifier(
        &ModelAssets::new("/nonexistent/kanji_model.json"),
        ClassifierConfig::default(),
    );
    let mut ctl = InteractionController::new(&SessionConfig::default(), slot);

    ctl.handle_touch(&TouchEvent::start(20.0, 60.0, 0)).expect("start");
    if let Some(ticket) = ctl
        .handle_touch(&TouchEvent::end(380.0, 60.0, 32))
        .expect("end")
    {
        ctl.run_ticket(ticket);
    }

    assert!(ctl.evaluate().is_empty());
    assert!(ctl.buffer().is_empty());
}
