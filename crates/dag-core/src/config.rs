//! Graph configuration: the node shape registry and numeric editor settings.

use crate::model::{Node, Port};
use crate::viewport::{Point, Rect, Size};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_NODE_SHAPE: &str = "default";
pub const DEFAULT_EDGE_SHAPE: &str = "default";

/// Offset applied to copied nodes so repeated pastes fan out.
pub const COPIED_NODE_SPACING: f32 = 50.0;

/// A named node variant. The renderer draws it; the editor only asks it
/// for geometry.
pub trait NodeShape: Send + Sync {
    fn name(&self) -> &str;

    /// Size used when a node carries no explicit width/height.
    fn default_size(&self) -> Size;

    /// Port position relative to the node origin. Uses the port's ratio
    /// hint, otherwise spreads ports evenly along the bottom edge.
    fn port_offset(&self, size: Size, port: &Port, index: usize, count: usize) -> Point {
        match port.position {
            Some([rx, ry]) => Point::new(size.width * rx, size.height * ry),
            None => {
                let step = size.width / (count as f32 + 1.0);
                Point::new(step * (index as f32 + 1.0), size.height)
            }
        }
    }
}

/// Plain rectangle with a fixed default size.
#[derive(Debug, Clone)]
pub struct RectShape {
    name: String,
    size: Size,
}

impl RectShape {
    pub fn new(name: &str, width: f32, height: f32) -> Self {
        Self {
            name: name.to_owned(),
            size: Size { width, height },
        }
    }
}

impl NodeShape for RectShape {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_size(&self) -> Size {
        self.size
    }
}

/// Runtime registry of node shapes keyed by name.
#[derive(Clone)]
pub struct GraphConfig {
    node_shapes: IndexMap<String, Arc<dyn NodeShape>>,
    fallback: Arc<dyn NodeShape>,
    pub default_node_shape: String,
    pub default_edge_shape: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        let fallback: Arc<dyn NodeShape> = Arc::new(RectShape::new(DEFAULT_NODE_SHAPE, 200.0, 40.0));
        let mut node_shapes = IndexMap::new();
        node_shapes.insert(DEFAULT_NODE_SHAPE.to_owned(), fallback.clone());
        Self {
            node_shapes,
            fallback,
            default_node_shape: DEFAULT_NODE_SHAPE.to_owned(),
            default_edge_shape: DEFAULT_EDGE_SHAPE.to_owned(),
        }
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("node_shapes", &self.node_shapes.keys().collect::<Vec<_>>())
            .field("default_node_shape", &self.default_node_shape)
            .field("default_edge_shape", &self.default_edge_shape)
            .finish()
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a shape under its own name.
    pub fn register_node(mut self, shape: impl NodeShape + 'static) -> Self {
        self.node_shapes
            .insert(shape.name().to_owned(), Arc::new(shape));
        self
    }

    /// Names of every registered node shape, in registration order.
    pub fn shapes(&self) -> impl Iterator<Item = &str> {
        self.node_shapes.keys().map(String::as_str)
    }

    /// Lookup for the renderer. Unregistered names warn and render nothing.
    pub fn render_shape(&self, name: &str) -> Option<&Arc<dyn NodeShape>> {
        let found = self.node_shapes.get(name);
        if found.is_none() {
            log::warn!("no node shape registered as `{name}`, nothing rendered");
        }
        found
    }

    /// Shape used for geometry. Falls back to the default rectangle.
    fn geometry_shape(&self, node: &Node) -> &dyn NodeShape {
        let name = node.shape.as_deref().unwrap_or(&self.default_node_shape);
        match self.node_shapes.get(name) {
            Some(shape) => shape.as_ref(),
            None => {
                log::warn!("node `{}` uses unregistered shape `{name}`", node.id);
                self.fallback.as_ref()
            }
        }
    }

    /// Explicit size where given, shape default otherwise.
    pub fn node_size(&self, node: &Node) -> Size {
        match (node.width, node.height) {
            (Some(width), Some(height)) => Size { width, height },
            (w, h) => {
                let d = self.geometry_shape(node).default_size();
                Size {
                    width: w.unwrap_or(d.width),
                    height: h.unwrap_or(d.height),
                }
            }
        }
    }

    pub fn node_rect(&self, node: &Node) -> Rect {
        let size = self.node_size(node);
        Rect::new(node.x, node.y, size.width, size.height)
    }

    /// Canvas position of a port, or `None` if the node has no such port.
    pub fn port_position(&self, node: &Node, port_id: crate::id::Id) -> Option<Point> {
        let index = node.port_index(port_id)?;
        let size = self.node_size(node);
        let offset = self.geometry_shape(node).port_offset(
            size,
            &node.ports[index],
            index,
            node.ports.len(),
        );
        Some(Point::new(node.x + offset.x, node.y + offset.y))
    }
}

/// Numeric tuning of the editor. Every field has a default, so partial
/// JSON objects deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    pub paste_spacing: f32,
    pub auto_scroll_step: f32,
    pub auto_scroll_margin: f32,
    /// Auto-align only runs with fewer rendered nodes than this.
    pub auto_align_threshold: usize,
    pub boundary_padding: f32,
    /// Maximum undo depth. `None` keeps every entry.
    pub history_limit: Option<usize>,
    pub max_nesting: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 3.0,
            zoom_step: 0.1,
            paste_spacing: COPIED_NODE_SPACING,
            auto_scroll_step: 10.0,
            auto_scroll_margin: 0.0,
            auto_align_threshold: 30,
            boundary_padding: 30.0,
            history_limit: None,
            max_nesting: 64,
        }
    }
}
