pub mod alignment;
pub mod config;
pub mod error;
pub mod features;
pub mod graph;
pub mod hit;
pub mod id;
pub mod model;
pub mod state;
pub mod viewport;

pub use config::{COPIED_NODE_SPACING, EditorSettings, GraphConfig, NodeShape, RectShape};
pub use error::GraphError;
pub use features::Features;
pub use graph::{GraphModel, NodePlacement};
pub use id::{Id, IdKind};
pub use model::*;
pub use state::ItemState;
pub use viewport::{ContainerRect, Point, Rect, Size, TransformMatrix, ViewPort};
