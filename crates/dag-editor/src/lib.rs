pub mod behavior;
pub mod channel;
pub mod editor;
pub mod events;
pub mod history;
pub mod reducers;
pub mod shortcuts;
pub mod state;

pub use behavior::next_behavior;
pub use channel::{EventChannel, Subscription};
pub use editor::GraphEditor;
pub use events::{CanvasEvent, EdgeEvent, GraphEvent, MinimapEvent, Modifiers, NodeEvent, RawInput, Updater};
pub use history::History;
pub use reducers::{Reducer, ReducerContext, ReducerPipeline};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use state::{Behavior, ConnectState, DummyNodes, GraphState, SelectBoxPosition};
