//! Integration tests: user gestures driven through the Props API and the
//! event channel (dag-editor).

use dag_core::{ContainerRect, Edge, Features, GraphData, GraphModel, Id, Node, Point};
use dag_editor::reducers::{ReducerContext, ReducerPipeline};
use dag_editor::{Behavior, CanvasEvent, EdgeEvent, GraphEditor, GraphEvent, Modifiers, NodeEvent, RawInput};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn id(s: &str) -> Id {
    Id::intern(s)
}

fn graph() -> GraphModel {
    GraphModel::new()
        .insert_node(Node::new("A", 0.0, 0.0).sized(100.0, 40.0))
        .insert_node(Node::new("B", 200.0, 0.0).sized(100.0, 40.0))
        .insert_node(Node::new("C", 400.0, 0.0).sized(100.0, 40.0))
        .insert_edge(Edge::new("AB", "A", "B"))
}

fn measured(editor: GraphEditor) -> GraphEditor {
    let rect = ContainerRect {
        left: 0.0,
        top: 0.0,
        width: 800.0,
        height: 600.0,
    };
    editor.dispatch(CanvasEvent::ViewportResize {
        rect,
        visible_rect: None,
    });
    editor
}

fn editor_with(features: Features) -> GraphEditor {
    init_logger();
    let ctx = ReducerContext {
        features,
        ..ReducerContext::default()
    };
    measured(GraphEditor::with_context(graph(), ctx, ReducerPipeline::new()))
}

fn editor() -> GraphEditor {
    editor_with(Features::default_features())
}

fn position(editor: &GraphEditor, node: &str) -> (f32, f32) {
    let data = editor.get_data();
    let n = data.node(id(node)).unwrap();
    (n.x, n.y)
}

// ─── Drag ───────────────────────────────────────────────────────────────

#[test]
fn drag_commits_selected_nodes_once() {
    let editor = editor();
    editor.select_nodes(&[id("A"), id("B")]);
    editor.dispatch(NodeEvent::DragStart {
        node: id("A"),
        raw: RawInput::pointer(50.0, 20.0),
        is_multi_select: false,
    });
    assert_eq!(editor.state().behavior, Behavior::Dragging);
    editor.dispatch(NodeEvent::Drag {
        raw: RawInput::pointer(60.0, 25.0),
        dx: 10.0,
        dy: 5.0,
        is_visible: true,
    });
    // The overlay moves; the model does not.
    assert_eq!(position(&editor, "A"), (0.0, 0.0));
    editor.dispatch(NodeEvent::DragEnd {
        is_drag_canceled: false,
    });

    let state = editor.state();
    assert_eq!(state.behavior, Behavior::Default);
    assert_eq!(position(&editor, "A"), (10.0, 5.0));
    assert_eq!(position(&editor, "B"), (210.0, 5.0));
    assert_eq!(position(&editor, "C"), (400.0, 0.0));
    assert_eq!(state.data.past().len(), 1);
    assert_eq!(state.present().selected_nodes().count(), 0);
    assert!(state.dummy_nodes.is_empty());
}

#[test]
fn cancelled_drag_leaves_model_untouched() {
    let editor = editor();
    editor.dispatch(NodeEvent::DragStart {
        node: id("C"),
        raw: RawInput::pointer(450.0, 20.0),
        is_multi_select: false,
    });
    editor.dispatch(NodeEvent::Drag {
        raw: RawInput::pointer(480.0, 20.0),
        dx: 30.0,
        dy: 0.0,
        is_visible: true,
    });
    editor.dispatch(NodeEvent::DragEnd { is_drag_canceled: true });
    assert_eq!(position(&editor, "C"), (400.0, 0.0));
    assert!(!editor.can_undo());
    assert!(editor.state().dummy_nodes.is_empty());
}

// ─── Clipboard ──────────────────────────────────────────────────────────

#[test]
fn paste_lands_under_cursor_as_selection() {
    let editor = editor();
    editor.select_nodes(&[id("A")]);
    let data = GraphData {
        nodes: vec![Node::new("x", 0.0, 0.0)],
        ..GraphData::default()
    };
    editor.paste(data, Some(Point::new(100.0, 50.0)));

    let model = editor.get_data();
    let x = model.node(id("x")).unwrap();
    assert_eq!((x.x, x.y), (100.0, 50.0));
    assert!(x.state.is_selected());
    let selected: Vec<&str> = model.selected_nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(selected, vec!["x"]);
    assert!(editor.can_undo());
}

#[test]
fn copy_paste_shortcuts_fan_out() {
    let editor = editor();
    editor.select_nodes(&[id("A"), id("B")]);
    let meta = Modifiers {
        meta: true,
        ..Modifiers::default()
    };
    editor.handle_key_down(RawInput::key("c").with_modifiers(meta));
    editor.handle_key_up(RawInput::key("c"));
    editor.handle_key_down(RawInput::key("v").with_modifiers(meta));
    editor.handle_key_up(RawInput::key("v"));
    editor.handle_key_down(RawInput::key("v").with_modifiers(meta));

    let model = editor.get_data();
    assert_eq!(model.node_count(), 7);
    assert_eq!(model.edge_count(), 3);
    let mut xs: Vec<f32> = model.nodes().map(|n| n.x).collect();
    xs.sort_by(f32::total_cmp);
    assert_eq!(xs, vec![0.0, 50.0, 100.0, 200.0, 250.0, 300.0, 400.0]);
    assert_eq!(editor.state().data.past().len(), 2);
}

// ─── Delete ─────────────────────────────────────────────────────────────

#[test]
fn delete_removes_touching_edges() {
    let editor = editor();
    editor.select_nodes(&[id("A")]);
    editor.delete();
    let model = editor.get_data();
    assert!(model.node(id("A")).is_none());
    assert_eq!(model.edge_count(), 0);
    assert!(model.nodes().all(|n| n.state.is_empty()));
    editor.undo();
    assert_eq!(editor.get_data().edge_count(), 1);
    // The restored snapshot is not selected.
    assert_eq!(editor.get_data().selected_nodes().count(), 0);
}

#[test]
fn read_only_delete_is_identity() {
    let editor = editor_with(Features::data_readonly_mode());
    editor.select_nodes(&[id("A"), id("B")]);
    let before = editor.state();
    editor.delete();
    let after = editor.state();
    assert!(after.ptr_eq(&before));
    assert_eq!(after.present(), before.present());
}

// ─── Keys ───────────────────────────────────────────────────────────────

#[test]
fn repeated_key_down_keeps_key_set() {
    let editor = editor();
    editor.handle_key_down(RawInput::key("a"));
    let first = editor.state();
    editor.handle_key_down(RawInput::key("a"));
    let second = editor.state();
    assert!(std::sync::Arc::ptr_eq(&first.active_keys, &second.active_keys));
    assert_eq!(second.active_keys.iter().collect::<Vec<_>>(), vec!["a"]);
    editor.handle_key_up(RawInput::key("a"));
    assert!(editor.state().active_keys.is_empty());
}

#[test]
fn shortcuts_can_be_disabled() {
    let editor = editor_with(Features::default_features() - Features::KEYBOARD_SHORTCUTS);
    editor.select_nodes(&[id("A")]);
    assert_eq!(editor.handle_key_down(RawInput::key("Delete")), None);
    assert_eq!(editor.get_data().node_count(), 3);
}

// ─── Behavior ───────────────────────────────────────────────────────────

#[test]
fn last_gesture_start_wins() {
    let editor = editor();
    editor.dispatch(NodeEvent::DragStart {
        node: id("A"),
        raw: RawInput::pointer(10.0, 10.0),
        is_multi_select: false,
    });
    editor.dispatch(EdgeEvent::ConnectStart {
        node: id("B"),
        port: None,
        raw: RawInput::pointer(250.0, 20.0),
    });
    assert_eq!(editor.state().behavior, Behavior::Connecting);
    editor.dispatch(EdgeEvent::ConnectEnd { is_cancel: true });
    assert_eq!(editor.state().behavior, Behavior::Default);
}

// ─── Connect ────────────────────────────────────────────────────────────

#[test]
fn connect_gesture_adds_one_edge() {
    let editor = editor();
    editor.dispatch(EdgeEvent::ConnectStart {
        node: id("B"),
        port: None,
        raw: RawInput::pointer(250.0, 20.0).with_pointer_id(1),
    });
    editor.dispatch(EdgeEvent::ConnectMove {
        raw: RawInput::pointer(420.0, 20.0).with_pointer_id(1),
    });
    editor.dispatch(EdgeEvent::ConnectAttach {
        node: id("C"),
        port: None,
    });
    editor.dispatch(EdgeEvent::ConnectEnd { is_cancel: false });

    let model = editor.get_data();
    assert_eq!(model.edge_count(), 2);
    assert!(model.edges().any(|e| e.source == id("B") && e.target == id("C")));
    assert_eq!(editor.state().data.past().len(), 1);
    assert!(editor.state().connect_state.is_none());
}

#[test]
fn hover_from_other_pointer_is_ignored_while_connecting() {
    let editor = editor();
    editor.dispatch(EdgeEvent::ConnectStart {
        node: id("A"),
        port: None,
        raw: RawInput::pointer(50.0, 20.0).with_pointer_id(1),
    });
    let before = editor.state();
    editor.dispatch(NodeEvent::PointerEnter {
        node: id("C"),
        raw: RawInput::pointer(450.0, 20.0).with_pointer_id(2),
    });
    assert!(editor.state().ptr_eq(&before));

    editor.dispatch(NodeEvent::PointerEnter {
        node: id("C"),
        raw: RawInput::pointer(450.0, 20.0).with_pointer_id(1),
    });
    assert!(editor.get_data().node(id("C")).unwrap().state.is_activated());
}

// ─── Edge editing ───────────────────────────────────────────────────────

#[test]
fn edge_double_click_needs_edit_edge() {
    let editor = editor_with(Features::default_features() - Features::EDIT_EDGE);
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    editor.on_change(move |_, _| seen.set(seen.get() + 1));
    editor.dispatch(EdgeEvent::DoubleClick {
        edge: id("AB"),
        raw: RawInput::default(),
    });
    assert_eq!(calls.get(), 0);
}

// ─── Viewport ───────────────────────────────────────────────────────────

#[test]
fn zoom_is_clamped_through_props() {
    let editor = editor();
    for _ in 0..50 {
        editor.zoom(1.5);
    }
    assert!((editor.state().viewport.scale() - 3.0).abs() < 1e-5);
    for _ in 0..50 {
        editor.zoom(0.5);
    }
    let scale = editor.state().viewport.scale();
    assert!((0.1 - 1e-5..=3.0).contains(&scale));
    assert!((scale - 0.1).abs() < 1e-5);
}

#[test]
fn zoom_to_fit_frames_every_node() {
    let editor = editor();
    editor.zoom_to_fit();
    let viewport = editor.state().viewport;
    let model = editor.get_data();
    for node in model.nodes() {
        let p = viewport.to_screen_rect(&dag_core::Rect::new(node.x, node.y, 100.0, 40.0));
        assert!(p.x >= 0.0 && p.right() <= 800.0, "{} off screen", node.id);
    }
}

// ─── Extension ──────────────────────────────────────────────────────────

#[test]
fn custom_events_change_nothing_but_reach_subscribers() {
    let editor = editor();
    let seen = Rc::new(Cell::new(false));
    let flag = seen.clone();
    let _sub = editor.get_event_channel().subscribe(move |event| {
        if let GraphEvent::Custom { name, .. } = event {
            flag.set(name == "ping");
        }
    });
    let before = editor.state();
    editor.dispatch(GraphEvent::Custom {
        name: "ping".into(),
        payload: serde_json::Value::Null,
    });
    assert!(seen.get());
    assert!(editor.state().ptr_eq(&before));
}

#[test]
fn subscribers_observe_reduced_state() {
    let editor = Rc::new(editor());
    let weak = Rc::downgrade(&editor);
    let count = Rc::new(Cell::new(usize::MAX));
    let out = count.clone();
    let _sub = editor.get_event_channel().subscribe(move |event| {
        if let (GraphEvent::Node(NodeEvent::SelectAll), Some(editor)) = (event, weak.upgrade()) {
            out.set(editor.get_data().selected_nodes().count());
        }
    });
    editor.select_all();
    assert_eq!(count.get(), 3);
}
