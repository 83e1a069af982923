use std::sync::Arc;

use super::*;
use crate::{choreography::ownership::OwnershipRegistry, foundation::error::VernissageError};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn test_config() -> EngineConfig {
    let mut cfg = EngineConfig::default();
    cfg.sprite.columns = 4;
    cfg.sprite.total_frames = 20;
    cfg.sprite.nominal_fps = crate::foundation::core::Fps::new(10, 1).unwrap();
    cfg.sprite.pause_after_secs = 1.0;
    cfg.handoff.fade_delay_ms = 1000.0;
    cfg
}

/// Five rows of four 10px cells; red encodes the frame number.
fn sheet() -> PreparedImage {
    let (width, height) = (40, 50);
    let mut data = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let frame = (y / 10) * 4 + x / 10;
            data.extend_from_slice(&[frame as u8, 0, 0, 255]);
        }
    }
    PreparedImage {
        width: width as u32,
        height: height as u32,
        rgba8_premul: Arc::new(data),
    }
}

fn engine_with(registry: &OwnershipRegistry) -> Engine {
    let art = (0..8).map(|i| format!("art-{i}.webp"));
    let mut engine = Engine::new(test_config(), art, Viewport::new(10, 10), registry.claim()).unwrap();
    assert!(engine.install_sheets(Ok(vec![sheet()])));
    engine
}

fn state_changes(events: &[EngineEvent]) -> Vec<ChoreographyState> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::StateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect()
}

fn shown_frame(engine: &Engine) -> u8 {
    engine.surface().pixel(5, 5).unwrap()[0]
}

#[test]
fn full_sequence_plays_both_timelines() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    assert_eq!(engine.pause_frame(), FrameIndex(10));
    assert_eq!(engine.last_usable_frame(), FrameIndex(19));

    let first = engine.frame(ms(0));
    assert!(first.contains(&EngineEvent::CarouselMeasured { length: 2080.0 }));
    assert_eq!(engine.state(), ChoreographyState::Idle);
    assert_eq!(shown_frame(&engine), 0);

    engine.push(EngineInput::SequenceStart);
    let events = engine.frame(ms(100));
    assert_eq!(state_changes(&events), vec![ChoreographyState::InitialPlay]);
    assert!(engine.carousel().is_running());

    engine.frame(ms(600));
    assert_eq!(engine.target_frame(), 5);
    assert_eq!(shown_frame(&engine), 5);

    let events = engine.frame(ms(1200));
    assert_eq!(engine.target_frame(), 10);
    assert!(!events.contains(&EngineEvent::HandoffComplete));

    engine.push(EngineInput::RevealHandoff);
    let events = engine.frame(ms(1300));
    assert!(events.contains(&EngineEvent::HandoffComplete));
    assert_eq!(engine.state(), ChoreographyState::InitialPlay);

    engine.push(EngineInput::Initialize);
    let events = engine.frame(ms(1400));
    assert_eq!(state_changes(&events), vec![ChoreographyState::PostTriggerPlay]);
    assert_eq!(engine.target_frame(), 10);
    assert_eq!(engine.carousel().mode(), CarouselMode::SinglePass);

    let events = engine.frame(ms(2600));
    assert_eq!(state_changes(&events), vec![ChoreographyState::Complete]);
    assert!(events.contains(&EngineEvent::SequenceVisuallyComplete));
    assert_eq!(engine.displayed_frame(), Some(FrameIndex(19)));
    assert_eq!(shown_frame(&engine), 19);
    assert!(!engine.carousel().is_running());

    // Complete is sticky and announces itself once.
    engine.push(EngineInput::Initialize);
    engine.push(EngineInput::SequenceStart);
    let events = engine.frame(ms(3000));
    assert!(events.is_empty());
    assert_eq!(engine.state(), ChoreographyState::Complete);
}

#[test]
fn queued_triggers_apply_before_timelines_advance() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    engine.push(EngineInput::SequenceStart);
    engine.frame(ms(0));
    assert_eq!(engine.timeline_progress(), Some((TimelineSlot::Initial, 0.0)));

    // Initialize lands on the same frame timeline #1 would have finished.
    engine.push(EngineInput::Initialize);
    let events = engine.frame(ms(1000));
    assert_eq!(state_changes(&events), vec![ChoreographyState::PostTriggerPlay]);
    assert_eq!(engine.timeline_progress(), Some((TimelineSlot::PostTrigger, 0.0)));
    assert_eq!(engine.target_frame(), 10);
}

#[test]
fn early_initialize_cancels_the_first_timeline() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    engine.push(EngineInput::SequenceStart);
    engine.frame(ms(0));
    engine.frame(ms(200));
    assert_eq!(engine.target_frame(), 2);

    engine.push(EngineInput::Initialize);
    engine.frame(ms(300));
    assert_eq!(engine.state(), ChoreographyState::PostTriggerPlay);

    // Past timeline #1's end nothing reverts; timeline #2 keeps scrubbing forward.
    engine.push(EngineInput::RevealHandoff);
    let events = engine.frame(ms(1100));
    assert!(!events.contains(&EngineEvent::HandoffComplete));
    assert_eq!(engine.state(), ChoreographyState::PostTriggerPlay);
    assert!(engine.target_frame() >= 10);
}

#[test]
fn reset_after_complete_restarts_from_frame_zero() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    assert!(engine.enter_from(Some("/collection")));
    engine.frame(ms(0));
    assert_eq!(engine.state(), ChoreographyState::Complete);
    assert_eq!(shown_frame(&engine), 19);

    engine.push(EngineInput::RouteReset);
    let events = engine.frame(ms(100));
    assert_eq!(state_changes(&events), vec![ChoreographyState::Idle]);
    assert_eq!(shown_frame(&engine), 0);

    engine.push(EngineInput::SequenceStart);
    engine.frame(ms(200));
    assert_eq!(engine.state(), ChoreographyState::InitialPlay);
    assert_eq!(engine.timeline_progress(), Some((TimelineSlot::Initial, 0.0)));
    assert_eq!(engine.displayed_frame(), Some(FrameIndex(0)));
}

#[test]
fn skip_depends_on_previous_route() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    assert!(!engine.enter_from(None));
    assert!(!engine.enter_from(Some("/")));
    assert_eq!(engine.state(), ChoreographyState::Idle);

    assert!(engine.enter_from(Some("/about")));
    let events = engine.frame(ms(0));
    assert!(events.contains(&EngineEvent::SequenceVisuallyComplete));
    assert_eq!(engine.displayed_frame(), Some(FrameIndex(19)));
}

#[test]
fn decode_failure_holds_and_still_advances_state() {
    let registry = OwnershipRegistry::new();
    let art = vec!["a".to_string(), "b".to_string()];
    let mut engine = Engine::new(test_config(), art, Viewport::new(8, 8), registry.claim()).unwrap();
    assert!(!engine.install_sheets(Err(VernissageError::asset("sheet 0: truncated"))));
    assert_eq!(engine.sheet_status(), SheetStatus::Failed);

    engine.push(EngineInput::SequenceStart);
    engine.frame(ms(0));
    engine.frame(ms(1500));
    assert_eq!(engine.state(), ChoreographyState::InitialPlay);
    assert_eq!(engine.displayed_frame(), None);
    assert!(engine.surface().data().iter().all(|&b| b == 0));
}

#[test]
fn resize_redraws_at_new_size() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    engine.push(EngineInput::SequenceStart);
    engine.frame(ms(0));
    engine.frame(ms(300));
    let frame = engine.displayed_frame();

    engine.push(EngineInput::Resize {
        width: 30,
        height: 20,
    });
    engine.frame(ms(300));
    assert_eq!(engine.surface().width(), 30);
    assert_eq!(engine.surface().height(), 20);
    assert_eq!(engine.displayed_frame(), frame);
    assert_eq!(engine.surface().pixel(29, 19).unwrap()[3], 255);
}

#[test]
fn superseded_engine_never_draws() {
    let registry = OwnershipRegistry::new();
    let mut old = engine_with(&registry);
    let mut new = engine_with(&registry);

    old.push(EngineInput::SequenceStart);
    assert!(old.frame(ms(0)).is_empty());
    assert_eq!(old.state(), ChoreographyState::Idle);
    assert!(old.surface().data().iter().all(|&b| b == 0));

    new.push(EngineInput::SequenceStart);
    new.frame(ms(0));
    assert_eq!(new.state(), ChoreographyState::InitialPlay);
}

#[test]
fn unmount_is_idempotent_and_final() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    engine.push(EngineInput::SequenceStart);
    engine.frame(ms(0));
    engine.frame(ms(300));
    let before = engine.surface().clone();

    engine.unmount();
    engine.unmount();
    assert!(engine.is_unmounted());
    assert!(!engine.carousel().is_running());
    assert_eq!(engine.timeline_progress(), None);

    engine.push(EngineInput::Initialize);
    assert!(engine.frame(ms(900)).is_empty());
    assert_eq!(engine.surface(), &before);
    assert_eq!(engine.state(), ChoreographyState::InitialPlay);
}

fn prewarmed(events: &[EngineEvent]) -> bool {
    events.iter().any(|e| matches!(e, EngineEvent::PreWarmed { .. }))
}

#[test]
fn prewarm_fires_ahead_of_the_expected_handoff() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    engine.push(EngineInput::SequenceStart);
    engine.frame(ms(100));

    // 0.9 of the 1000ms fade delay after the sequence starts.
    assert!(!prewarmed(&engine.frame(ms(900))));
    assert!(engine.prewarmed_strokes().is_none());

    let due = engine.frame(ms(1050));
    assert!(due.contains(&EngineEvent::PreWarmed { strokes: 40 }));
    assert_eq!(engine.prewarmed_strokes().map(<[Stroke]>::len), Some(40));

    // The handoff lands at the fade delay, after the strokes exist.
    engine.push(EngineInput::RevealHandoff);
    assert!(!prewarmed(&engine.frame(ms(1100))));

    engine.push(EngineInput::PreWarm);
    assert!(!prewarmed(&engine.frame(ms(1150))));
}

#[test]
fn early_handoff_flushes_a_pending_prewarm() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    engine.push(EngineInput::SequenceStart);
    engine.frame(ms(0));

    engine.push(EngineInput::RevealHandoff);
    let events = engine.frame(ms(200));
    let warm = events
        .iter()
        .position(|e| matches!(e, EngineEvent::PreWarmed { .. }));
    assert_eq!(warm, Some(0));
    assert!(!prewarmed(&engine.frame(ms(1000))));
}

#[test]
fn carousel_stops_once_the_single_pass_arrives() {
    let registry = OwnershipRegistry::new();
    let mut cfg = test_config();
    cfg.timeline.post_trigger_secs = Some(60.0);
    let art = (0..8).map(|i| format!("art-{i}.webp"));
    let mut engine = Engine::new(cfg, art, Viewport::new(10, 10), registry.claim()).unwrap();

    engine.push(EngineInput::SequenceStart);
    engine.frame(ms(0));
    engine.push(EngineInput::Initialize);
    engine.frame(ms(16));
    assert_eq!(engine.carousel().mode(), CarouselMode::SinglePass);

    let mut arrived_at = None;
    for step in 2..2000u64 {
        let events = engine.frame(ms(step * 16));
        if events.contains(&EngineEvent::CarouselArrived) {
            arrived_at = Some(step);
            break;
        }
    }
    assert!(arrived_at.is_some());
    assert!(!engine.carousel().is_running());
    assert_eq!(engine.state(), ChoreographyState::PostTriggerPlay);

    let camera = engine.carousel().camera();
    let later = engine.frame(ms(40_000));
    assert!(!later.contains(&EngineEvent::CarouselArrived));
    assert_eq!(engine.carousel().camera(), camera);
}

#[test]
fn oversized_resize_keeps_the_current_surface() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    engine.frame(ms(0));
    engine.push(EngineInput::Resize {
        width: 100_000,
        height: 10,
    });
    engine.frame(ms(16));
    assert_eq!(engine.surface().viewport(), Viewport::new(10, 10));
    assert_eq!(engine.displayed_frame(), Some(FrameIndex(0)));

    assert!(Engine::new(
        test_config(),
        vec!["a".to_string()],
        Viewport::new(70_000, 10),
        registry.claim(),
    )
    .is_err());
}

#[test]
fn hover_events_only_on_change() {
    let registry = OwnershipRegistry::new();
    let mut engine = engine_with(&registry);
    engine.frame(ms(0));
    engine.push(EngineInput::Hover {
        layer: 3,
        hovered: true,
    });
    engine.push(EngineInput::Hover {
        layer: 3,
        hovered: true,
    });
    let events = engine.frame(ms(16));
    let hovers: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::LayerHover { .. }))
        .collect();
    assert_eq!(hovers.len(), 1);
    assert_eq!(engine.carousel().focused(), Some(3));
}
