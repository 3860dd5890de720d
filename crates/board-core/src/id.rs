use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for board ids. Interned ids compare by key.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $sigil:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing one.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $sigil, self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identifier of a content block on the board. 4 bytes, `Copy`, O(1) `Eq`/`Hash`.
    NodeId,
    "#"
);

interned_id!(
    /// Identifier of a connection between two nodes.
    EdgeId,
    "~"
);

/// Candidate text for the `attempt`-th try at a fresh id: `base`, then
/// `base_1`, `base_2`, ...
pub(crate) fn suffixed(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}_{attempt}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("md_1");
        let b = NodeId::intern("md_1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "md_1");
    }

    #[test]
    fn node_and_edge_ids_share_text_but_not_type() {
        let n = NodeId::intern("shared");
        let e = EdgeId::intern("shared");
        assert_eq!(n.as_str(), e.as_str());
        assert_eq!(format!("{n:?}"), "#shared");
        assert_eq!(format!("{e:?}"), "~shared");
    }

    #[test]
    fn suffixed_candidates() {
        assert_eq!(suffixed("img_42", 0), "img_42");
        assert_eq!(suffixed("img_42", 3), "img_42_3");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = NodeId::intern("iframe_7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"iframe_7\"");
        let back: NodeId = serde_json::from_str("\"iframe_7\"").unwrap();
        assert_eq!(back, id);
    }
}
