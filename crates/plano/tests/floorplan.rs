use plano::*;
use tracing_test::traced_test;

const COMPLEX: &str = "complex-1";

fn courts() -> Vec<Court> {
    vec![
        Court::new("A").with_meta(CourtMeta::new("Cancha A", "futbol_5", "disponible")),
        Court::new("B").with_meta(CourtMeta::new("Cancha B", "padel", "ocupada")),
        Court::new("C").with_meta(CourtMeta::new("Cancha C", "tenis", "mantenimiento")),
        Court::new("D").with_meta(CourtMeta::new("Cancha D", "basquet", "disponible")),
        Court::new("E").with_meta(CourtMeta::new("Cancha E", "voley", "fuera_servicio")),
    ]
}

fn plan() -> Floorplan<MemorySource, ManualFrames> {
    let source = MemorySource::new().with_container(COMPLEX, courts());
    let mut plan = Floorplan::new(ViewportConfig::default(), source, ManualFrames::new()).unwrap();
    plan.refresh(COMPLEX).unwrap();
    plan.mount(Point::ORIGIN);
    plan
}

/// Enter reposition mode for `id` and grab it 10px right and below its anchor.
fn grab(plan: &mut Floorplan<MemorySource, ManualFrames>, id: &str) -> Point {
    plan.enter_reposition_mode(id).unwrap();
    let anchor = plan.store().get(id).unwrap();
    let grab_at = anchor + Point::new(10.0, 10.0);
    assert!(plan.pointer_down(id, grab_at, PointerButton::Primary).unwrap());
    grab_at
}

#[test]
fn test_backfill_grid() {
    let plan = plan();
    assert_eq!(plan.store().get("A"), Some(Point::new(150.0, 100.0)));
    assert_eq!(plan.store().get("D"), Some(Point::new(600.0, 100.0)));
    assert_eq!(plan.store().get("E"), Some(Point::new(150.0, 220.0)));
}

#[test]
fn test_commit_uses_target_not_current() {
    let mut plan = plan();
    grab(&mut plan, "A");
    plan.pointer_move(Point::new(360.0, 310.0));
    // No frame ran, so the rendered position has not moved at all.
    assert_eq!(plan.display_position("A"), Some(Point::new(150.0, 100.0)));

    let committed = plan.pointer_up().unwrap();
    assert_eq!(committed, Some(Point::new(350.0, 300.0)));
    assert_eq!(
        plan.source().persisted(),
        &[("A".to_string(), Point::new(350.0, 300.0))]
    );
    assert_eq!(plan.store().get("A"), Some(Point::new(350.0, 300.0)));
    assert_eq!(
        plan.drain_events(),
        vec![FloorplanEvent::PositionCommitted {
            id: "A".to_string(),
            position: Point::new(350.0, 300.0),
        }]
    );
    assert!(!plan.is_dragging());
    assert_eq!(plan.phase(), DragPhase::Idle);
    assert_eq!(plan.reposition_target(), None);
    assert_eq!(plan.captures().active(), 0);
    assert_eq!(plan.frames().pending(), 0);
}

#[test]
fn test_last_move_wins() {
    let mut plan = plan();
    grab(&mut plan, "B");
    plan.pointer_move(Point::new(500.0, 500.0));
    plan.tick();
    plan.pointer_move(Point::new(410.0, 210.0));
    plan.tick();
    plan.tick();
    assert_eq!(plan.pointer_up().unwrap(), Some(Point::new(400.0, 200.0)));
}

#[test]
fn test_commit_under_zoom_and_pan() {
    let mut plan = plan();
    plan.zoom_in();
    plan.zoom_in();
    plan.pan_start(Point::new(0.0, 0.0));
    plan.pan_move(Point::new(40.0, -25.0));
    plan.pan_end();
    plan.mount(Point::new(120.0, 80.0));

    let anchor = plan.store().get("C").unwrap();
    let down = Point::new(300.0, 250.0);
    let up = Point::new(520.0, 410.0);
    let offset = plan.viewport().screen_to_logical(down) - anchor;
    let expected = plan.viewport().screen_to_logical(up) - offset;

    plan.enter_reposition_mode("C").unwrap();
    assert!(plan.pointer_down("C", down, PointerButton::Primary).unwrap());
    assert!(plan.session().unwrap().pointer_offset().approx_eq(offset, 1e-9));
    plan.pointer_move(up);
    let committed = plan.pointer_up().unwrap().unwrap();
    assert!(committed.approx_eq(expected, 1e-9));
    // The viewport is untouched by the drag.
    assert_eq!(plan.viewport().pan(), Point::new(40.0, -25.0));
}

#[test]
fn test_unmounted_container_uses_raw_pointer() {
    let source = MemorySource::new().with_container(COMPLEX, courts());
    let mut plan = Floorplan::new(ViewportConfig::default(), source, ManualFrames::new()).unwrap();
    plan.refresh(COMPLEX).unwrap();
    plan.zoom_in();

    plan.enter_reposition_mode("A").unwrap();
    plan.pointer_down("A", Point::new(160.0, 110.0), PointerButton::Primary)
        .unwrap();
    plan.pointer_move(Point::new(200.0, 200.0));
    assert_eq!(plan.pointer_up().unwrap(), Some(Point::new(190.0, 190.0)));
}

#[test]
fn test_escape_cancels_without_persisting() {
    let mut plan = plan();
    let before = plan.store().get("A").unwrap();
    grab(&mut plan, "A");
    plan.pointer_move(Point::new(700.0, 500.0));
    for _ in 0..5 {
        plan.tick();
    }
    assert_ne!(plan.display_position("A"), Some(before));

    assert!(plan.key_down(Key::Escape));
    assert!(plan.source().persisted().is_empty());
    assert_eq!(plan.store().get("A"), Some(before));
    assert_eq!(plan.display_position("A"), Some(before));
    assert_eq!(
        plan.drain_events(),
        vec![FloorplanEvent::RepositionCancelled {
            id: "A".to_string()
        }]
    );
    assert_eq!(plan.captures().active(), 0);
    assert_eq!(plan.frames().pending(), 0);
    assert!(!plan.tick());
}

#[test]
fn test_context_menu_cancels() {
    let mut plan = plan();
    grab(&mut plan, "D");
    plan.pointer_move(Point::new(0.0, 0.0));
    assert!(plan.context_menu());
    assert!(!plan.is_dragging());
    assert!(plan.source().persisted().is_empty());
    assert!(!plan.context_menu());
}

#[test]
fn test_secondary_press_during_drag_cancels() {
    let mut plan = plan();
    grab(&mut plan, "A");
    assert!(!plan
        .pointer_down("A", Point::new(0.0, 0.0), PointerButton::Secondary)
        .unwrap());
    assert!(!plan.is_dragging());
    assert_eq!(plan.reposition_target(), None);
    assert_eq!(plan.pointer_up().unwrap(), None);
    assert!(plan.source().persisted().is_empty());
}

#[test]
fn test_escape_outside_drag_leaves_mode() {
    let mut plan = plan();
    plan.enter_reposition_mode("B").unwrap();
    assert!(!plan.key_down(Key::Other));
    assert!(plan.key_down(Key::Escape));
    assert_eq!(plan.reposition_target(), None);
    assert!(!plan.key_down(Key::Escape));
}

#[test]
fn test_pan_suppressed_while_dragging() {
    let mut plan = plan();
    grab(&mut plan, "A");
    plan.pan_start(Point::new(0.0, 0.0));
    plan.pan_move(Point::new(100.0, 100.0));
    plan.pointer_move(Point::new(300.0, 300.0));
    plan.pan_end();
    assert_eq!(plan.viewport().pan(), Point::ORIGIN);
    assert!(!plan.viewport().is_panning());

    plan.pointer_up().unwrap();
    plan.pan_start(Point::new(0.0, 0.0));
    plan.pointer_move(Point::new(30.0, 40.0));
    assert_eq!(plan.viewport().pan(), Point::new(30.0, 40.0));
    assert_eq!(plan.pointer_up().unwrap(), None);
    assert!(!plan.viewport().is_panning());
}

#[test]
fn test_second_drag_is_rejected() {
    let mut plan = plan();
    grab(&mut plan, "A");
    let busy = PlanoError::SessionBusy {
        active: "A".to_string(),
    };
    assert_eq!(plan.enter_reposition_mode("B"), Err(busy.clone()));
    assert_eq!(
        plan.pointer_down("B", Point::new(300.0, 100.0), PointerButton::Primary),
        Err(busy.clone())
    );
    assert_eq!(plan.refresh(COMPLEX), Err(busy));
    // Same court again is fine.
    assert_eq!(plan.enter_reposition_mode("A"), Ok(()));
    assert_eq!(plan.session().unwrap().court_id(), "A");
    assert_eq!(plan.captures().active(), 1);
}

#[test]
fn test_pointer_down_outside_mode_does_nothing() {
    let mut plan = plan();
    assert!(!plan
        .pointer_down("A", Point::new(150.0, 100.0), PointerButton::Primary)
        .unwrap());
    plan.enter_reposition_mode("A").unwrap();
    assert!(!plan
        .pointer_down("B", Point::new(300.0, 100.0), PointerButton::Primary)
        .unwrap());
    assert!(!plan
        .pointer_down("A", Point::new(150.0, 100.0), PointerButton::Middle)
        .unwrap());
    assert!(!plan.is_dragging());
    assert_eq!(plan.frames().requested(), 0);
}

#[test]
fn test_unknown_court() {
    let mut plan = plan();
    assert_eq!(
        plan.enter_reposition_mode("Z"),
        Err(PlanoError::NotFound("Z".to_string()))
    );
}

#[test]
#[traced_test]
fn test_persist_failure_returns_to_idle() {
    let mut plan = plan();
    plan.source_mut().fail_persist_with("db down");
    grab(&mut plan, "A");
    plan.pointer_move(Point::new(260.0, 160.0));

    let err = plan.pointer_up().unwrap_err();
    assert_eq!(
        err,
        PlanoError::Persist {
            id: "A".to_string(),
            source: SourceError::new("db down"),
        }
    );
    assert!(!plan.is_dragging());
    assert_eq!(plan.phase(), DragPhase::Idle);
    assert_eq!(plan.store().get("A"), Some(Point::new(150.0, 100.0)));
    assert_eq!(plan.captures().active(), 0);
    assert_eq!(
        plan.drain_events(),
        vec![FloorplanEvent::PersistFailed {
            id: "A".to_string(),
            position: Point::new(250.0, 150.0),
            reason: "db down".to_string(),
        }]
    );
    assert!(logs_contain("persisting position failed"));
}

#[test]
fn test_interpolation_follows_target() {
    let mut plan = plan();
    grab(&mut plan, "A");
    plan.pointer_move(Point::new(260.0, 110.0));
    let target = plan.session().unwrap().target();
    assert_eq!(target, Point::new(250.0, 100.0));

    assert!(plan.tick());
    let first = plan.display_position("A").unwrap();
    assert!(first.approx_eq(Point::new(180.0, 100.0), 1e-9));

    let mut last_distance = first.distance(target);
    let mut steps = 1;
    while !plan.session().unwrap().is_settled() {
        assert!(plan.tick());
        assert!(plan.frames().pending() <= 1);
        let distance = plan.display_position("A").unwrap().distance(target);
        assert!(distance <= last_distance);
        last_distance = distance;
        steps += 1;
        assert!(steps < 40, "interpolation did not settle");
    }
    assert_eq!(plan.display_position("A"), Some(target));
    // Still dragging, so the loop keeps a frame queued.
    assert_eq!(plan.frames().pending(), 1);
    // The store is only written on commit.
    assert_eq!(plan.store().get("A"), Some(Point::new(150.0, 100.0)));
}

#[test]
fn test_stale_frame_ignored() {
    let mut plan = plan();
    grab(&mut plan, "A");
    plan.pointer_move(Point::new(400.0, 400.0));
    assert!(!plan.on_frame(FrameToken(9_999)));
    assert_eq!(plan.display_position("A"), Some(Point::new(150.0, 100.0)));
    assert_eq!(plan.frames().cancelled(), 0);
    plan.cancel_reposition();
    assert_eq!(plan.frames().cancelled(), 1);
}

#[test]
fn test_reload_reads_confirmed_positions() {
    let mut plan = plan();
    grab(&mut plan, "E");
    plan.pointer_move(Point::new(710.0, 510.0));
    plan.pointer_up().unwrap();
    assert_eq!(plan.reload().unwrap(), 5);
    assert_eq!(plan.store().get("E"), Some(Point::new(700.0, 500.0)));
    assert_eq!(plan.store().get("A"), Some(Point::new(150.0, 100.0)));
}

#[test]
fn test_refresh_drops_vanished_reposition_target() {
    let source = MemorySource::new()
        .with_container(COMPLEX, courts())
        .with_container("complex-2", vec![Court::new("X").at(10.0, 10.0)]);
    let mut plan = Floorplan::new(ViewportConfig::default(), source, ManualFrames::new()).unwrap();
    plan.refresh(COMPLEX).unwrap();
    plan.enter_reposition_mode("A").unwrap();
    assert_eq!(plan.refresh("complex-2").unwrap(), 1);
    assert_eq!(plan.reposition_target(), None);
    assert!(matches!(
        plan.refresh("nowhere"),
        Err(PlanoError::Fetch { .. })
    ));
    // A failed fetch keeps the previous set.
    assert!(plan.store().contains("X"));
}

#[test]
fn test_teardown_releases_capture() {
    let mut plan = plan();
    let captures = plan.captures().clone();
    grab(&mut plan, "A");
    assert_eq!(captures.active(), 1);
    drop(plan);
    assert_eq!(captures.active(), 0);
}

#[test]
fn test_unmount_mid_drag_cancels() {
    let mut plan = plan();
    grab(&mut plan, "A");
    plan.pointer_move(Point::new(400.0, 400.0));
    assert_eq!(plan.frames().pending(), 1);

    plan.unmount();
    assert!(!plan.is_dragging());
    assert_eq!(plan.captures().active(), 0);
    assert_eq!(plan.frames().pending(), 0);
    assert!(!plan.tick());
    assert_eq!(plan.reposition_target(), None);
    assert_eq!(plan.store().get("A"), Some(Point::new(150.0, 100.0)));
    assert!(plan.source().persisted().is_empty());
    assert_eq!(
        plan.drain_events(),
        vec![FloorplanEvent::RepositionCancelled {
            id: "A".to_string()
        }]
    );
}

#[test]
fn test_unmount_while_idle_keeps_reposition_mode() {
    let mut plan = plan();
    plan.enter_reposition_mode("B").unwrap();
    plan.unmount();
    assert_eq!(plan.reposition_target(), Some("B"));
    assert!(plan.drain_events().is_empty());
}

#[test]
fn test_invalid_zoom_bounds_rejected() {
    let config = ViewportConfig {
        min_zoom: 4.0,
        max_zoom: 0.3,
        ..Default::default()
    };
    let result = Floorplan::new(config, MemorySource::new(), ManualFrames::new());
    assert!(matches!(
        result.err(),
        Some(PlanoError::InvalidZoomBounds { .. })
    ));
}
