//! Interned ids shared by nodes, ports, edges and groups.
//!
//! Ids coming from user data keep their spelling. Ids the editor mints
//! (pasted copies, new connections) are `node_<n>` / `edge_<n>` and never
//! reuse a spelling that is already interned.

use lasso::{Spur, ThreadedRodeo};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// What a minted id is for. Selects the spelling prefix and the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Node,
    Port,
    Edge,
    Group,
}

impl IdKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            IdKind::Node => "node",
            IdKind::Port => "port",
            IdKind::Edge => "edge",
            IdKind::Group => "group",
        }
    }

    fn counter(self) -> &'static AtomicU64 {
        static COUNTERS: [AtomicU64; 4] = [const { AtomicU64::new(0) }; 4];
        &COUNTERS[self as usize]
    }
}

/// Copy handle to an interned string. Comparison and hashing never touch
/// the string itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(Spur);

impl Id {
    pub fn intern(s: &str) -> Self {
        Id(INTERNER.get_or_intern(s))
    }

    /// The id spelled `s`, if anything has interned it yet.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(Id)
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Mint an id of `kind` whose spelling has never been interned.
    pub fn fresh(kind: IdKind) -> Self {
        loop {
            let n = kind.counter().fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{}_{n}", kind.prefix());
            if Self::lookup(&candidate).is_none() {
                return Self::intern(&candidate);
            }
        }
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::intern(s)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Id, E> {
                Ok(Id::intern(v))
            }
        }

        deserializer.deserialize_str(IdVisitor)
    }
}
