//! Recognition Flow Integration Tests
//!
//! Tests the complete handwriting flow including:
//! - Stroke capture through touch events
//! - Auto-evaluate and manual evaluate
//! - Candidate selection with and without auto-clear
//! - Degraded sessions without a classifier

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kanji_core::recognition::is_ranked;
use kanji_core::{
    Classifier, ClassifierSlot, ClipboardSink, InkError, InkResult, InteractionController,
    InteractionState, RasterImage, Recognition, SessionConfig, SessionFlags, TouchEvent,
    CLIP_LABEL,
};

/// Returns the same results for every image and counts invocations.
struct Scripted {
    results: Vec<Recognition>,
    calls: Arc<AtomicUsize>,
}

impl Classifier for Scripted {
    fn top_k(&self) -> usize {
        5
    }

    fn classify(&self, _image: &RasterImage) -> Vec<Recognition> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.clone()
    }
}

#[derive(Default)]
struct MemoryClipboard {
    contents: Option<(String, String)>,
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, label: &str, text: &str) -> InkResult<()> {
        self.contents = Some((label.to_string(), text.to_string()));
        Ok(())
    }
}

fn hon_ki() -> Vec<Recognition> {
    vec![Recognition::new("本", 0.9), Recognition::new("木", 0.4)]
}

fn session(
    flags: SessionFlags,
    results: Vec<Recognition>,
) -> (InteractionController, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let classifier = ClassifierSlot::ready(Scripted {
        results,
        calls: Arc::clone(&calls),
    });
    let config = SessionConfig {
        flags,
        ..SessionConfig::default()
    };
    (InteractionController::new(&config, classifier), calls)
}

/// Draw one stroke through raw touch events and run any auto-evaluation.
fn draw(ctl: &mut InteractionController, points: &[(f32, f32)]) {
    let (first, rest) = points.split_first().expect("at least one point");
    ctl.handle_touch(&TouchEvent::start(first.0, first.1, 0))
        .expect("touch start");
    let mut t = 0;
    for &(x, y) in rest {
        t += 16;
        ctl.handle_touch(&TouchEvent::moved(x, y, t)).expect("touch move");
    }
    let last = points.last().expect("at least one point");
    if let Some(ticket) = ctl
        .handle_touch(&TouchEvent::end(last.0, last.1, t + 16))
        .expect("touch end")
    {
        ctl.run_ticket(ticket);
    }
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_draw_auto_evaluate_select_auto_clear() {
    let (mut ctl, calls) = session(
        SessionFlags {
            auto_evaluate: true,
            auto_clear: true,
        },
        hon_ki(),
    );

    draw(&mut ctl, &[(100.0, 50.0), (100.0, 350.0)]);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctl.state(), InteractionState::ResultsShown);
    let labels: Vec<_> = ctl.candidates().iter().map(|c| c.label.clone()).collect();
    assert_eq!(labels, ["本", "木"]);

    let hon = ctl.candidates()[0].clone();
    ctl.select(&hon).expect("select");

    assert_eq!(ctl.buffer().as_str(), "本");
    assert!(ctl.canvas().is_empty());
    assert_eq!(ctl.state(), InteractionState::Idle);
}

#[test]
fn test_unavailable_classifier_manual_evaluate() {
    let mut ctl = InteractionController::new(
        &SessionConfig::default(),
        ClassifierSlot::unavailable("model asset missing"),
    );

    draw(&mut ctl, &[(10.0, 10.0), (200.0, 200.0)]);
    let candidates = ctl.evaluate();

    assert!(candidates.is_empty());
    assert_eq!(ctl.state(), InteractionState::ResultsShown);
}

#[test]
fn test_clear_text_is_idempotent() {
    let (mut ctl, _) = session(SessionFlags::default(), hon_ki());

    ctl.clear_text();
    assert!(ctl.buffer().is_empty());

    draw(&mut ctl, &[(10.0, 10.0), (200.0, 200.0)]);
    ctl.select_index(1).expect("select");
    assert_eq!(ctl.buffer().as_str(), "木");

    ctl.clear_text();
    ctl.clear_text();
    assert!(ctl.buffer().is_empty());
}

// ============================================================================
// Property Tests
// ============================================================================

#[test]
fn test_results_never_exceed_top_k_and_are_sorted() {
    let unsorted = vec![
        Recognition::new("a", 0.1),
        Recognition::new("b", 0.7),
        Recognition::new("c", 0.3),
        Recognition::new("d", 0.9),
        Recognition::new("e", 0.2),
        Recognition::new("f", 0.5),
        Recognition::new("g", 0.6),
    ];
    let (mut ctl, _) = session(
        SessionFlags {
            auto_evaluate: true,
            auto_clear: false,
        },
        unsorted,
    );

    draw(&mut ctl, &[(10.0, 10.0), (200.0, 200.0)]);

    let results = &ctl.last_evaluation().expect("evaluation").results;
    assert_eq!(results.len(), 5);
    assert!(is_ranked(results, 5));
    assert_eq!(results[0].label, "d");
}

#[test]
fn test_selection_appends_exactly_label() {
    let (mut ctl, _) = session(
        SessionFlags {
            auto_evaluate: true,
            auto_clear: false,
        },
        hon_ki(),
    );

    for _ in 0..3 {
        draw(&mut ctl, &[(10.0, 10.0), (200.0, 200.0)]);
        let before = ctl.buffer().len();
        let candidate = ctl.candidates()[0].clone();
        ctl.select(&candidate).expect("select");
        assert_eq!(ctl.buffer().len(), before + candidate.label.chars().count());
    }
    assert_eq!(ctl.buffer().as_str(), "本本本");
    // auto_clear off: all three strokes remain.
    assert_eq!(ctl.canvas().drawing().len(), 3);
}

#[test]
fn test_multi_stroke_character_reevaluates() {
    let (mut ctl, calls) = session(
        SessionFlags {
            auto_evaluate: true,
            auto_clear: true,
        },
        hon_ki(),
    );

    draw(&mut ctl, &[(50.0, 150.0), (350.0, 150.0)]);
    let first = ctl.candidates()[0].clone();
    draw(&mut ctl, &[(200.0, 50.0), (200.0, 350.0)]);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(ctl.canvas().drawing().len(), 2);
    assert!(matches!(
        ctl.select(&first),
        Err(InkError::StaleCandidate(_))
    ));
    assert!(ctl.buffer().is_empty());
}

#[test]
fn test_auto_evaluate_off_requires_manual_trigger() {
    let (mut ctl, calls) = session(
        SessionFlags {
            auto_evaluate: false,
            auto_clear: false,
        },
        hon_ki(),
    );

    draw(&mut ctl, &[(10.0, 10.0), (200.0, 200.0)]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctl.state(), InteractionState::Idle);

    assert_eq!(ctl.evaluate().len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_clear_canvas_drops_candidates() {
    let (mut ctl, _) = session(SessionFlags::default(), hon_ki());
    draw(&mut ctl, &[(10.0, 10.0), (200.0, 200.0)]);
    assert!(!ctl.candidates().is_empty());

    ctl.clear_canvas();

    assert!(ctl.candidates().is_empty());
    assert!(ctl.canvas().is_empty());
    assert_eq!(ctl.state(), InteractionState::Idle);
}

#[test]
fn test_copy_text_to_clipboard() {
    let (mut ctl, _) = session(SessionFlags::default(), hon_ki());
    let mut clipboard = MemoryClipboard::default();

    assert!(!ctl.copy_text(&mut clipboard).expect("copy"));
    assert!(clipboard.contents.is_none());

    draw(&mut ctl, &[(10.0, 10.0), (200.0, 200.0)]);
    ctl.select_index(0).expect("select");
    assert!(ctl.copy_text(&mut clipboard).expect("copy"));
    assert_eq!(
        clipboard.contents,
        Some((CLIP_LABEL.to_string(), "本".to_string()))
    );
}

#[test]
fn test_render_is_idempotent_after_strokes() {
    let (mut ctl, _) = session(
        SessionFlags {
            auto_evaluate: false,
            auto_clear: false,
        },
        hon_ki(),
    );
    draw(&mut ctl, &[(20.0, 20.0), (380.0, 380.0)]);
    draw(&mut ctl, &[(380.0, 20.0), (20.0, 380.0)]);
    draw(&mut ctl, &[(200.0, 200.0)]);

    let first = ctl.canvas().render().expect("render");
    let second = ctl.canvas().render().expect("render");
    assert_eq!(first, second);
    assert!(!first.is_blank());
}
