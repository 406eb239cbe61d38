use super::*;
use crate::page::{PointerKind, Rect, StyleSnapshot};
use crate::task::SliderTarget;
use crate::test_support::RecordingPage;
use parking_lot::Mutex;

#[derive(Default)]
struct CollectingObserver {
    events: Mutex<Vec<DragEvent>>,
}

impl CollectingObserver {
    fn events(&self) -> Vec<DragEvent> {
        self.events.lock().clone()
    }
}

impl DragObserver for CollectingObserver {
    fn on_event(&self, event: &DragEvent) {
        self.events.lock().push(event.clone());
    }
}

fn seeded_config() -> DragConfig {
    DragConfig {
        seed: Some(7),
        ..DragConfig::default()
    }
}

fn puzzle_page() -> (RecordingPage, SliderTarget) {
    let page = RecordingPage::new();
    let big = ElementRef::new("big");
    let small = ElementRef::new("small");
    let handle = ElementRef::new("handle");
    page.set_rect(
        &big,
        Rect {
            x: 10.0,
            y: 50.0,
            width: 300.0,
            height: 150.0,
        },
    );
    page.set_rect(
        &small,
        Rect {
            x: 12.0,
            y: 80.0,
            width: 40.0,
            height: 40.0,
        },
    );
    page.set_rect(
        &handle,
        Rect {
            x: 10.0,
            y: 220.0,
            width: 40.0,
            height: 30.0,
        },
    );
    (page, SliderTarget::puzzle(big, small, handle))
}

#[tokio::test(start_paused = true)]
async fn test_zero_distance_emits_nothing() {
    let (page, target) = puzzle_page();
    let controller = DragController::new(seeded_config());

    let err = controller
        .run(&page, DragRequest::new(target, 0.0))
        .await
        .unwrap_err();

    assert!(matches!(err, DragError::ZeroDistance));
    assert!(page.events().is_empty());
    assert!(!controller.lock().is_held());
}

#[tokio::test(start_paused = true)]
async fn test_busy_lock_rejects_new_task() {
    let (page, target) = puzzle_page();
    let controller = DragController::new(seeded_config());
    let other = TaskId::new();
    controller.lock().try_acquire(other).unwrap();

    let err = controller
        .run(&page, DragRequest::new(target, 80.0))
        .await
        .unwrap_err();

    match err {
        DragError::LockBusy(holder) => assert_eq!(holder, other),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(page.events().is_empty());
    assert_eq!(controller.lock().holder(), Some(other));
}

#[tokio::test(start_paused = true)]
async fn test_missing_element_at_arm_releases_lock() {
    let (page, target) = puzzle_page();
    *page.gone.lock() = true;
    let controller = DragController::new(seeded_config());

    let err = controller
        .run(&page, DragRequest::new(target, 80.0))
        .await
        .unwrap_err();

    assert!(err.is_element_gone());
    assert!(page.events().is_empty());
    assert!(!controller.lock().is_held());
}

#[tokio::test(start_paused = true)]
async fn test_motionless_slider_falls_back_then_times_out() {
    let (page, target) = puzzle_page();
    let observer = Arc::new(CollectingObserver::default());
    let controller = DragController::new(seeded_config()).with_observer(observer.clone());
    let request = DragRequest::new(target, 80.0)
        .with_completion_notice(Notice::new("done", Duration::from_secs(1)));

    let report = controller.run(&page, request).await.unwrap();

    assert_eq!(report.outcome, TaskOutcome::TimedOut);
    assert_eq!(report.task.phase, TaskPhase::Done);
    assert!(report.task.low_confidence);
    assert!(report.elapsed > Duration::from_secs(3));

    let events = page.events();
    assert_eq!(events.first().map(|(_, e)| e.kind), Some(PointerKind::Down));
    assert_eq!(events.last().map(|(_, e)| e.kind), Some(PointerKind::Up));
    let ups = events
        .iter()
        .filter(|(_, e)| e.kind == PointerKind::Up)
        .count();
    assert_eq!(ups, 1);

    let notices = page.notices.lock().clone();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.contains("timed out"));

    let events = observer.events();
    let fallbacks: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            DragEvent::LowConfidence {
                old_target,
                new_target,
                ..
            } => Some((*old_target, *new_target)),
            _ => None,
        })
        .collect();
    // Zero widths are not "narrow", so the target shrinks.
    assert_eq!(fallbacks, vec![(85.0, 82.5)]);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, DragEvent::LockExpired { .. }))
            .count(),
        1
    );
    assert!(matches!(
        events.last(),
        Some(DragEvent::Done {
            outcome: TaskOutcome::TimedOut,
            ..
        })
    ));
    assert!(!controller.lock().is_held());
}

#[tokio::test(start_paused = true)]
async fn test_narrow_tracked_element_adds_handle_offset() {
    let (page, target) = puzzle_page();
    page.styles
        .lock()
        .insert(target.small_image.clone(), sized("20px"));
    page.styles
        .lock()
        .insert(target.handle.clone(), sized("40px"));
    let observer = Arc::new(CollectingObserver::default());
    let controller = DragController::new(seeded_config()).with_observer(observer.clone());

    controller
        .run(&page, DragRequest::new(target, 80.0))
        .await
        .unwrap();

    let corrected = observer.events().into_iter().find_map(|event| match event {
        DragEvent::LowConfidence { new_target, .. } => Some(new_target),
        _ => None,
    });
    // Handle sits 2px left of the piece.
    assert_eq!(corrected, Some(83.0));
}

#[tokio::test(start_paused = true)]
async fn test_every_event_targets_the_handle() {
    let (page, target) = puzzle_page();
    let handle = target.handle.clone();
    let controller = DragController::new(seeded_config());

    controller
        .run(&page, DragRequest::new(target, 40.0))
        .await
        .unwrap();

    assert!(page.events().iter().all(|(element, _)| element == &handle));
}

fn sized(width: &str) -> StyleSnapshot {
    StyleSnapshot {
        width: width.to_string(),
        ..Default::default()
    }
}
