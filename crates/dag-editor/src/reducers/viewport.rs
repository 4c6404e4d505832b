//! View-port reducer: measurement, pan, zoom, fit and minimap navigation.

use super::ReducerContext;
use crate::events::{CanvasEvent, GraphEvent, MinimapEvent};
use crate::state::GraphState;
use dag_core::viewport::{IDENTITY_MATRIX, transform_point};
use dag_core::{Features, Point, ViewPort};

pub fn viewport_reducer(state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState {
    let s = &ctx.settings;
    let viewport = state.viewport;
    let next = match event {
        GraphEvent::Canvas(CanvasEvent::ViewportResize { rect, visible_rect }) => ViewPort {
            rect: Some(*rect),
            visible_rect: Some(visible_rect.unwrap_or(*rect)),
            ..viewport
        },
        GraphEvent::Canvas(CanvasEvent::Drag { dx, dy }) if ctx.has(Features::PAN_CANVAS) => {
            if !viewport.is_complete() {
                return state;
            }
            limit(&state, viewport.pan(*dx, *dy), ctx)
        }
        GraphEvent::Canvas(CanvasEvent::Zoom { scale, anchor }) if ctx.has(Features::ZOOM) => {
            let Some(rect) = viewport.rect else {
                return state;
            };
            let anchor = anchor
                .and_then(|a| viewport.relative_point(a.x, a.y))
                .unwrap_or(Point::new(rect.width / 2.0, rect.height / 2.0));
            limit(&state, viewport.zoom_clamped(*scale, anchor, s.min_zoom, s.max_zoom), ctx)
        }
        GraphEvent::Canvas(CanvasEvent::ZoomTo { value }) if ctx.has(Features::ZOOM) => {
            if !viewport.is_complete() {
                return state;
            }
            limit(&state, viewport.zoom_to(*value, s.min_zoom, s.max_zoom), ctx)
        }
        GraphEvent::Canvas(CanvasEvent::ZoomToFit) => {
            let Some(area) = state.present().content_area(&ctx.graph_config) else {
                return state;
            };
            viewport.focus_area(&area, s.boundary_padding, s.min_zoom, s.max_zoom)
        }
        GraphEvent::Canvas(CanvasEvent::ResetViewport) => viewport.with_matrix(IDENTITY_MATRIX),
        GraphEvent::Canvas(CanvasEvent::ScrollIntoView { x, y, position }) => {
            let local = transform_point(*x, *y, &viewport.transform_matrix);
            viewport.scroll_into_view(local.x, local.y, true, *position)
        }
        GraphEvent::Minimap(MinimapEvent::Pan { dx, dy }) => {
            if !viewport.is_complete() {
                return state;
            }
            let [a, _, _, d, _, _] = viewport.transform_matrix;
            limit(&state, viewport.pan(dx * a, dy * d), ctx)
        }
        _ => return state,
    };
    if next == viewport {
        return state;
    }
    state.with_viewport(next)
}

/// Keep content within reach when boundary limiting is on.
fn limit(state: &GraphState, viewport: ViewPort, ctx: &ReducerContext) -> ViewPort {
    if !ctx.has(Features::LIMIT_BOUNDARY) {
        return viewport;
    }
    let Some(content) = state.present().content_area(&ctx.graph_config) else {
        return viewport;
    };
    match viewport.offset_limit(&content, ctx.settings.boundary_padding) {
        Some(l) => viewport.with_matrix(l.clamp(viewport.transform_matrix)),
        None => viewport,
    }
}
