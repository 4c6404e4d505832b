//! Composable interaction-state flags for nodes, ports and edges.
//!
//! Every facet is independent: a node can be `SELECTED | ACTIVATED` at the
//! same time. All helpers are `const fn` and return a new value.

use bitflags::bitflags;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Interaction state of a node, port or edge. The empty set is "default".
    ///
    /// Ports only use `SELECTED`, `ACTIVATED` and `CONNECTING`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ItemState: u8 {
        const SELECTED = 1 << 0;
        const ACTIVATED = 1 << 1;
        const EDITING = 1 << 2;
        const CONNECTED_TO_SELECTED = 1 << 3;
        const UNCONNECTED_TO_SELECTED = 1 << 4;
        const CONNECTING = 1 << 5;
    }
}

/// Symbolic names used in the JSON exchange layout.
const FLAG_NAMES: [(&str, ItemState); 6] = [
    ("selected", ItemState::SELECTED),
    ("activated", ItemState::ACTIVATED),
    ("editing", ItemState::EDITING),
    ("connectedToSelected", ItemState::CONNECTED_TO_SELECTED),
    ("unconnectedToSelected", ItemState::UNCONNECTED_TO_SELECTED),
    ("connecting", ItemState::CONNECTING),
];

static FLAG_NAME_LIST: [&str; FLAG_NAMES.len()] = {
    let mut names = [""; FLAG_NAMES.len()];
    let mut i = 0;
    while i < FLAG_NAMES.len() {
        names[i] = FLAG_NAMES[i].0;
        i += 1;
    }
    names
};

/// Every facet that selection bookkeeping owns.
const SELECTION_FACETS: ItemState = ItemState::SELECTED
    .union(ItemState::CONNECTED_TO_SELECTED)
    .union(ItemState::UNCONNECTED_TO_SELECTED);

impl ItemState {
    pub const fn with(self, flag: ItemState) -> Self {
        self.union(flag)
    }

    pub const fn without(self, flag: ItemState) -> Self {
        self.difference(flag)
    }

    pub const fn has(self, flag: ItemState) -> bool {
        self.intersects(flag)
    }

    pub const fn is_selected(self) -> bool {
        self.contains(ItemState::SELECTED)
    }

    pub const fn is_activated(self) -> bool {
        self.contains(ItemState::ACTIVATED)
    }

    /// Drop `selected` and both selection-relation facets.
    pub const fn unselected(self) -> Self {
        self.difference(SELECTION_FACETS)
    }

    /// Replace the selection facets with `relation`, keeping the rest.
    pub const fn with_selection(self, relation: ItemState) -> Self {
        self.difference(SELECTION_FACETS)
            .union(relation.intersection(SELECTION_FACETS))
    }

    /// Symbolic names of the set facets, in declaration order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        FLAG_NAMES
            .into_iter()
            .filter(move |(_, flag)| self.contains(*flag))
            .map(|(name, _)| name)
    }

    /// Inverse of [`names`](Self::names) for a single JSON facet name.
    pub fn from_state_name(name: &str) -> Option<Self> {
        FLAG_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, flag)| *flag)
    }
}

impl Serialize for ItemState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.bits().count_ones() as usize))?;
        for name in self.names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ItemState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagsVisitor;

        impl<'de> Visitor<'de> for FlagsVisitor {
            type Value = ItemState;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of state flag names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ItemState, A::Error> {
                let mut state = ItemState::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let flag = ItemState::from_state_name(&name).ok_or_else(|| {
                        de::Error::unknown_variant(&name, &FLAG_NAME_LIST)
                    })?;
                    state = state.with(flag);
                }
                Ok(state)
            }
        }

        deserializer.deserialize_seq(FlagsVisitor)
    }
}
