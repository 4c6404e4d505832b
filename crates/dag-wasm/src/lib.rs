//! WASM bridge for the DAG editor: exposes the Props API to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Graph data and events cross
//! the boundary as JSON strings; drawing stays on the JS side.

use dag_core::{ContainerRect, EditorSettings, Features, GraphData, GraphModel, Id, Point, hit};
use dag_editor::events::{CanvasEvent, GraphEvent, Modifiers, RawInput};
use dag_editor::reducers::{ReducerContext, ReducerPipeline};
use dag_editor::shortcuts::ShortcutAction;
use dag_editor::{GraphEditor, GraphState};
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller.
#[wasm_bindgen]
pub struct DagEditor {
    editor: GraphEditor,
}

#[wasm_bindgen]
impl DagEditor {
    /// Create an editor. `features` is a `|`-separated flag list (empty for
    /// the defaults); `settings` is a partial `EditorSettings` JSON object
    /// (empty for the defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(features: &str, settings: &str) -> Result<DagEditor, JsValue> {
        console_error_panic_hook_setup();
        init_console_logger();

        let features = if features.trim().is_empty() {
            Features::default_features()
        } else {
            Features::parse(features).ok_or_else(|| JsValue::from_str(&format!("unknown features: {features}")))?
        };
        let settings: EditorSettings = if settings.trim().is_empty() {
            EditorSettings::default()
        } else {
            serde_json::from_str(settings).map_err(to_js)?
        };
        let ctx = ReducerContext {
            features,
            settings,
            ..ReducerContext::default()
        };
        Ok(Self {
            editor: GraphEditor::with_context(GraphModel::new(), ctx, ReducerPipeline::new()),
        })
    }

    // ─── Data ────────────────────────────────────────────────────────────

    /// Replace the graph with `{ nodes, edges, groups? }` JSON and reset history.
    pub fn set_data(&self, json: &str) -> Result<(), JsValue> {
        let model = GraphModel::from_json(json).map_err(to_js)?;
        self.editor.set_data(model);
        Ok(())
    }

    pub fn get_data(&self) -> Result<String, JsValue> {
        self.editor.get_data().to_json().map_err(to_js)
    }

    /// Feed one `{ "source": ..., "event": { "type": ... } }` event.
    /// Returns `false` (and warns) on malformed JSON.
    pub fn dispatch(&self, json: &str) -> bool {
        match serde_json::from_str::<GraphEvent>(json) {
            Ok(event) => {
                self.editor.dispatch(event);
                true
            }
            Err(e) => {
                log::warn!("ignoring malformed event: {e}");
                false
            }
        }
    }

    /// Report the container size after layout.
    pub fn resize(&self, left: f32, top: f32, width: f32, height: f32) {
        let rect = ContainerRect {
            left,
            top,
            width,
            height,
        };
        self.editor.dispatch(CanvasEvent::ViewportResize {
            rect,
            visible_rect: None,
        });
    }

    /// Call `callback()` after every change of the editor state.
    pub fn on_change(&self, callback: js_sys::Function) {
        self.editor.on_change(move |_, _| {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::warn!("change callback failed: {e:?}");
            }
        });
    }

    // ─── Edit ────────────────────────────────────────────────────────────

    pub fn delete(&self) {
        self.editor.delete();
    }

    pub fn undo(&self) {
        self.editor.undo();
    }

    pub fn redo(&self) {
        self.editor.redo();
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    pub fn reset_undo_stack(&self) {
        self.editor.reset_undo_stack();
    }

    /// Copy the selection. Returns the clipboard as graph JSON.
    pub fn copy(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.editor.copy()).map_err(to_js)
    }

    /// Paste graph JSON with its first node at the client point.
    pub fn paste(&self, json: &str, client_x: f32, client_y: f32) -> Result<(), JsValue> {
        let data: GraphData = serde_json::from_str(json).map_err(to_js)?;
        self.editor.paste(data, Some(Point::new(client_x, client_y)));
        Ok(())
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Exclusively select nodes from a JSON array of ids.
    pub fn select_nodes(&self, ids_json: &str) -> Result<(), JsValue> {
        let ids: Vec<Id> = serde_json::from_str(ids_json).map_err(to_js)?;
        self.editor.select_nodes(&ids);
        Ok(())
    }

    pub fn select_all(&self) {
        self.editor.select_all();
    }

    pub fn reset_selection(&self) {
        self.editor.reset_selection();
    }

    /// Topmost node under a client point, or an empty string.
    pub fn node_at(&self, client_x: f32, client_y: f32) -> String {
        let state = self.editor.state();
        let Some(p) = state.viewport.real_point_from_client(client_x, client_y) else {
            return String::new();
        };
        let ctx = self.editor.context();
        hit::hit_test(state.present(), &ctx.graph_config, p.x, p.y)
            .map(|id| id.as_str().to_owned())
            .unwrap_or_default()
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn scroll_into_view(&self, x: f32, y: f32) {
        self.editor.scroll_into_view(x, y);
    }

    pub fn zoom(&self, scale: f32) {
        self.editor.zoom(scale);
    }

    pub fn zoom_to(&self, value: f32) {
        self.editor.zoom_to(value);
    }

    pub fn zoom_to_fit(&self) {
        self.editor.zoom_to_fit();
    }

    pub fn reset_viewport(&self) {
        self.editor.reset_viewport();
    }

    /// Center the nodes named in a JSON array of ids.
    pub fn centralize(&self, ids_json: &str) -> Result<(), JsValue> {
        let ids: Vec<Id> = serde_json::from_str(ids_json).map_err(to_js)?;
        self.editor.centralize(ids);
        Ok(())
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a key press. Returns the triggered action name, or `"none"`.
    pub fn handle_key_down(&self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let raw = RawInput::key(key).with_modifiers(Modifiers { ctrl, shift, alt, meta });
        self.editor
            .handle_key_down(raw)
            .map_or("none", action_to_name)
            .to_owned()
    }

    pub fn handle_key_up(&self, key: &str) {
        self.editor.handle_key_up(RawInput::key(key));
    }

    // ─── State ───────────────────────────────────────────────────────────

    /// Everything a renderer needs besides the graph: behavior, viewport,
    /// overlays and the in-flight connection.
    pub fn get_state(&self) -> Result<String, JsValue> {
        serde_json::to_string(&state_json(&self.editor.state())).map_err(to_js)
    }
}

fn state_json(state: &GraphState) -> serde_json::Value {
    serde_json::json!({
        "behavior": state.behavior,
        "viewport": state.viewport,
        "dummyNodes": &*state.dummy_nodes,
        "alignmentLines": &*state.alignment_lines,
        "activeKeys": &*state.active_keys,
        "selectBox": state.select_box,
        "connectState": state.connect_state.as_deref(),
        "canUndo": state.data.can_undo(),
        "canRedo": state.data.can_redo(),
    })
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::SelectAll => "selectAll",
        ShortcutAction::Copy => "copy",
        ShortcutAction::Paste => "paste",
        ShortcutAction::ZoomIn => "zoomIn",
        ShortcutAction::ZoomOut => "zoomOut",
        ShortcutAction::ZoomToFit => "zoomToFit",
        ShortcutAction::Deselect => "deselect",
    }
}

// ─── Console plumbing ────────────────────────────────────────────────────

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format!("[{}] {}", record.target(), record.args());
        #[cfg(target_arch = "wasm32")]
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg.into()),
            log::Level::Warn => web_sys::console::warn_1(&msg.into()),
            _ => web_sys::console::log_1(&msg.into()),
        }
        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("{msg}");
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn init_console_logger() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("DAG editor WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone helpers (no editor needed) ───────────────────────────────

/// Validate graph JSON. Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(json: &str) -> String {
    match GraphModel::from_json(json) {
        Ok(_) => r#"{"ok":true}"#.to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}
