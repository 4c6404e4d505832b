//! Hit testing: point → node lookup, box selection, on-screen culling.

use crate::config::GraphConfig;
use crate::graph::GraphModel;
use crate::id::Id;
use crate::model::Node;
use crate::viewport::{Rect, TransformMatrix, ViewPort};

/// Find the topmost node at canvas position (px, py).
/// Later nodes are painted on top, so walk in reverse.
pub fn hit_test(model: &GraphModel, config: &GraphConfig, px: f32, py: f32) -> Option<Id> {
    let nodes: Vec<&Node> = model.nodes().collect();
    nodes
        .into_iter()
        .rev()
        .find(|n| config.node_rect(n).contains(px, py))
        .map(|n| n.id)
}

/// Ids of nodes whose screen-space rect intersects `screen_box`
/// (coordinates local to the viewport).
pub fn hit_test_rect(
    model: &GraphModel,
    config: &GraphConfig,
    matrix: &TransformMatrix,
    screen_box: &Rect,
) -> Vec<Id> {
    let view = ViewPort::default().with_matrix(*matrix);
    model
        .nodes()
        .filter(|n| view.to_screen_rect(&config.node_rect(n)).intersects(screen_box))
        .map(|n| n.id)
        .collect()
}

/// Nodes visible in the viewport. An unmeasured viewport shows nothing.
pub fn rendered_nodes<'a>(
    model: &'a GraphModel,
    config: &GraphConfig,
    viewport: &ViewPort,
) -> Vec<&'a Node> {
    let Some(area) = viewport.visible_area() else {
        return Vec::new();
    };
    model
        .nodes()
        .filter(|n| config.node_rect(n).intersects(&area))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::ContainerRect;
    use pretty_assertions::assert_eq;

    fn model() -> GraphModel {
        GraphModel::new()
            .insert_node(Node::new("a", 0.0, 0.0).sized(100.0, 100.0))
            .insert_node(Node::new("b", 50.0, 50.0).sized(100.0, 100.0))
            .insert_node(Node::new("far", 5000.0, 5000.0).sized(10.0, 10.0))
    }

    #[test]
    fn topmost_node_wins() {
        let config = GraphConfig::new();
        let m = model();
        assert_eq!(hit_test(&m, &config, 75.0, 75.0), Some(Id::intern("b")));
        assert_eq!(hit_test(&m, &config, 10.0, 10.0), Some(Id::intern("a")));
        assert_eq!(hit_test(&m, &config, 400.0, 10.0), None);
    }

    #[test]
    fn box_uses_screen_space() {
        let config = GraphConfig::new();
        let m = model();
        let zoomed = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        // canvas (0..100) is screen (0..200), so a box at 160..170 hits only `a` and `b`
        let hits = hit_test_rect(&m, &config, &zoomed, &Rect::new(160.0, 160.0, 10.0, 10.0));
        assert_eq!(hits, vec![Id::intern("a"), Id::intern("b")]);
        let hits = hit_test_rect(&m, &config, &zoomed, &Rect::new(250.0, 250.0, 10.0, 10.0));
        assert_eq!(hits, vec![Id::intern("b")]);
    }

    #[test]
    fn culls_off_screen_nodes() {
        let config = GraphConfig::new();
        let m = model();
        assert!(rendered_nodes(&m, &config, &ViewPort::default()).is_empty());
        let vp = ViewPort {
            rect: Some(ContainerRect {
                left: 0.0,
                top: 0.0,
                width: 800.0,
                height: 600.0,
            }),
            ..ViewPort::default()
        };
        let ids: Vec<Id> = rendered_nodes(&m, &config, &vp).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![Id::intern("a"), Id::intern("b")]);
    }
}
