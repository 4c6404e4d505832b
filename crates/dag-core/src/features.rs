use bitflags::bitflags;

bitflags! {
    /// Capabilities that gate optional editing behavior.
    ///
    /// Passed to every reducer through the reducer context; there is no
    /// process-wide registry.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Features: u32 {
        const NODE_DRAGGABLE = 1 << 0;
        const NODE_RESIZABLE = 1 << 1;
        const NODE_HOVER_ACTIVATE = 1 << 2;
        const CLICK_NODE_TO_SELECT = 1 << 3;
        const EDGE_HOVER_ACTIVATE = 1 << 4;
        const EDIT_EDGE = 1 << 5;
        const ADD_NEW_NODES = 1 << 6;
        const ADD_NEW_EDGES = 1 << 7;
        const DELETE = 1 << 8;
        const UNDO_STACK = 1 << 9;
        const PAN_CANVAS = 1 << 10;
        const ZOOM = 1 << 11;
        const LASSO_SELECT = 1 << 12;
        const AUTO_ALIGN = 1 << 13;
        const LIMIT_BOUNDARY = 1 << 14;
        const EDGE_AUTO_SCROLL = 1 << 15;
        const KEYBOARD_SHORTCUTS = 1 << 16;
    }
}

/// Everything that writes to the graph data.
const DATA_MUTATION: Features = Features::NODE_DRAGGABLE
    .union(Features::NODE_RESIZABLE)
    .union(Features::EDIT_EDGE)
    .union(Features::ADD_NEW_NODES)
    .union(Features::ADD_NEW_EDGES)
    .union(Features::DELETE)
    .union(Features::UNDO_STACK);

impl Features {
    /// The out-of-the-box capability set: everything except lasso selection
    /// and boundary limiting.
    pub const fn default_features() -> Self {
        Self::all()
            .difference(Self::LASSO_SELECT)
            .difference(Self::LIMIT_BOUNDARY)
    }

    /// Navigation and selection only; every data mutation is disabled.
    pub const fn data_readonly_mode() -> Self {
        Self::default_features().difference(DATA_MUTATION)
    }

    /// Parse a `|`-separated flag list such as `"EDIT_EDGE | AUTO_ALIGN"`.
    pub fn parse(text: &str) -> Option<Self> {
        bitflags::parser::from_str(text).ok()
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::default_features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readonly_mode_disables_mutation() {
        let ro = Features::data_readonly_mode();
        assert!(!ro.contains(Features::DELETE));
        assert!(!ro.contains(Features::ADD_NEW_NODES));
        assert!(!ro.contains(Features::EDIT_EDGE));
        assert!(ro.contains(Features::ZOOM));
        assert!(ro.contains(Features::CLICK_NODE_TO_SELECT));
    }

    #[test]
    fn default_excludes_lasso() {
        assert!(!Features::default().contains(Features::LASSO_SELECT));
        assert!(Features::all().contains(Features::LASSO_SELECT));
    }

    #[test]
    fn parses_flag_names() {
        let parsed = Features::parse("EDIT_EDGE | AUTO_ALIGN");
        assert_eq!(parsed, Some(Features::EDIT_EDGE | Features::AUTO_ALIGN));
        assert_eq!(Features::parse("NOT_A_FLAG"), None);
    }
}
