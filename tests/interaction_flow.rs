use egui::{Vec2, pos2};
use pagemark::annotation::{Annotation, ShapeKind};
use pagemark::interaction::{InteractionController, Tool};
use pagemark::layout;
use pagemark::session::EditingSession;

fn draw_shape(
    controller: &mut InteractionController,
    session: &mut EditingSession,
    page: u32,
    from: egui::Pos2,
    to: egui::Pos2,
) {
    controller.pointer_down(session, page, from);
    controller.pointer_move(session, page, to);
    controller.pointer_up(session, page, to);
}

#[test]
fn drawing_on_two_pages_keeps_stores_separate() {
    let mut session = EditingSession::new(3);
    let mut controller = InteractionController::new();
    session.toggle_tool(Tool::Shape(ShapeKind::Circle));

    draw_shape(&mut controller, &mut session, 1, pos2(50.0, 50.0), pos2(80.0, 50.0));
    draw_shape(&mut controller, &mut session, 3, pos2(10.0, 10.0), pos2(20.0, 20.0));

    assert_eq!(session.store().get(1).len(), 1);
    assert!(session.store().get(2).is_empty());
    assert_eq!(session.store().get(3).len(), 1);
    assert_eq!(session.active_page(), 3);
}

#[test]
fn undo_walks_gestures_back_in_order() {
    let mut session = EditingSession::new(1);
    let mut controller = InteractionController::new();
    session.toggle_tool(Tool::Shape(ShapeKind::Square));

    draw_shape(&mut controller, &mut session, 1, pos2(0.0, 0.0), pos2(10.0, 10.0));
    draw_shape(&mut controller, &mut session, 1, pos2(20.0, 20.0), pos2(30.0, 30.0));
    assert_eq!(session.store().get(1).len(), 2);

    assert!(session.undo());
    assert_eq!(session.store().get(1).len(), 1);
    assert!(session.undo());
    assert!(session.store().is_empty());
    assert!(!session.can_undo());
}

#[test]
fn gesture_after_undo_discards_the_redo_branch() {
    let mut session = EditingSession::new(1);
    let mut controller = InteractionController::new();
    session.toggle_tool(Tool::Shape(ShapeKind::Line));

    for x in [0.0f32, 20.0, 40.0] {
        draw_shape(&mut controller, &mut session, 1, pos2(x, 0.0), pos2(x + 10.0, 10.0));
    }
    session.undo(); // back to two lines
    assert!(session.can_redo());

    draw_shape(&mut controller, &mut session, 1, pos2(60.0, 0.0), pos2(70.0, 10.0));
    assert!(!session.can_redo());
    // baseline, one, two, and the new third line
    assert_eq!(session.history().len(), 4);
    assert_eq!(session.store().get(1).len(), 3);
}

#[test]
fn dragging_a_shape_is_one_history_step_and_preserves_size() {
    let mut session = EditingSession::new(1);
    let mut controller = InteractionController::new();
    session.toggle_tool(Tool::Shape(ShapeKind::Square));
    draw_shape(&mut controller, &mut session, 1, pos2(10.0, 10.0), pos2(40.0, 30.0));

    session.toggle_tool(Tool::Shape(ShapeKind::Square)); // back to select mode
    controller.pointer_down(&mut session, 1, pos2(12.0, 12.0));
    // Several intermediate moves still collapse into a single commit.
    controller.pointer_move(&mut session, 1, pos2(20.0, 20.0));
    controller.pointer_move(&mut session, 1, pos2(30.0, 25.0));
    controller.pointer_move(&mut session, 1, pos2(42.0, 37.0));
    controller.pointer_up(&mut session, 1, pos2(42.0, 37.0));

    match &session.store().get(1)[0] {
        Annotation::Shape { start, end, .. } => {
            assert_eq!(*end - *start, Vec2::new(30.0, 20.0));
            assert_eq!(*start, pos2(40.0, 35.0));
        }
        other => panic!("expected a shape, got {other:?}"),
    }
    assert_eq!(session.history().len(), 3); // baseline, draw, drag

    // One undo returns the square to where it was drawn.
    session.undo();
    match &session.store().get(1)[0] {
        Annotation::Shape { start, .. } => assert_eq!(*start, pos2(10.0, 10.0)),
        other => panic!("expected a shape, got {other:?}"),
    }
}

#[test]
fn pointer_coordinates_are_zoom_normalized_before_storage() {
    let mut session = EditingSession::new(1);
    let mut controller = InteractionController::new();
    session.toggle_tool(Tool::Shape(ShapeKind::Circle));
    for _ in 0..5 {
        session.adjust_zoom(1);
    }
    let zoom = session.zoom();
    assert!(zoom > 1.0);

    // Screen-space gesture on a page whose origin is at (100, 200).
    let origin = pos2(100.0, 200.0);
    let down = layout::to_content_coords(pos2(400.0, 500.0), origin, zoom);
    let up = layout::to_content_coords(pos2(445.0, 500.0), origin, zoom);
    controller.pointer_down(&mut session, 1, down);
    controller.pointer_up(&mut session, 1, up);

    match &session.store().get(1)[0] {
        Annotation::Shape { start, end, .. } => {
            assert_eq!(*start, pos2(300.0 / zoom, 300.0 / zoom));
            assert_eq!(*end, pos2(345.0 / zoom, 300.0 / zoom));
        }
        other => panic!("expected a shape, got {other:?}"),
    }

    // Changing zoom afterwards rescales the projection, not the store.
    let stored = session.store().get(1)[0].clone();
    session.adjust_zoom(-5);
    assert_eq!(session.store().get(1)[0], stored);
}

#[test]
fn text_flow_commits_once_and_undoes_cleanly() {
    let mut session = EditingSession::new(2);
    let mut controller = InteractionController::new();
    session.toggle_tool(Tool::Text);

    controller.pointer_down(&mut session, 2, pos2(30.0, 40.0));
    controller
        .text_buffer_mut()
        .expect("editor open")
        .push_str("first line\nsecond line");
    controller.commit_text(&mut session);

    assert_eq!(session.store().get(2).len(), 1);
    assert_eq!(session.history().len(), 2);

    session.undo();
    assert!(session.store().is_empty());
}
