//! Board-local clipboard for copy/paste of nodes.

use board_core::model::Node;
use board_core::store::GraphStore;

/// Deep copies of the nodes selected at the last effective copy.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    nodes: Vec<Node>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current selection. With nothing selected the previous
    /// contents are kept. Returns the number of nodes copied.
    pub fn copy_selection(&mut self, store: &GraphStore) -> usize {
        let selected: Vec<Node> = store.selected_nodes().cloned().collect();
        if selected.is_empty() {
            return 0;
        }
        self.nodes = selected;
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Build one duplicate per copied node: fresh id `<type>_<stamp>_<i>`,
    /// shifted by `offset` on both axes, selected and not draggable.
    pub fn duplicates(&self, store: &mut GraphStore, stamp: u64, offset: f32) -> Vec<Node> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, orig)| {
                let id = store.reserve_node_id(&format!("{}_{stamp}_{i}", orig.kind().as_str()));
                Node {
                    id,
                    position: orig.position.offset(offset, offset),
                    size: orig.size,
                    draggable: false,
                    selected: true,
                    payload: orig.payload.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::id::NodeId;
    use board_core::model::{NodePatch, Payload, Point};

    #[test]
    fn empty_selection_keeps_previous_contents() {
        let mut store = GraphStore::new();
        let id = NodeId::intern("clip_keep");
        store.add_node(Node::new(id, Point::default(), Payload::markdown("x")));
        store.patch_node(id, &NodePatch::selected(true));

        let mut clip = Clipboard::new();
        assert_eq!(clip.copy_selection(&store), 1);
        store.select_all(false);
        assert_eq!(clip.copy_selection(&store), 0);
        assert_eq!(clip.len(), 1);
    }

    #[test]
    fn duplicates_are_offset_and_fresh() {
        let mut store = GraphStore::new();
        let id = NodeId::intern("clip_src");
        store.add_node(Node::new(id, Point::new(10.0, 20.0), Payload::image("a.png")));
        store.patch_node(id, &NodePatch::selected(true));
        let mut clip = Clipboard::new();
        clip.copy_selection(&store);

        let first = clip.duplicates(&mut store, 77, 40.0);
        let second = clip.duplicates(&mut store, 77, 40.0);
        assert_eq!(first[0].id.as_str(), "image_77_0");
        assert_eq!(second[0].id.as_str(), "image_77_0_1");
        assert_eq!(first[0].position, Point::new(50.0, 60.0));
        assert!(first[0].selected);
        assert!(!first[0].draggable);
    }
}
