//! Integration tests: graph store ↔ document codec.

use board_core::document::{BoardRecord, parse_document};
use board_core::id::NodeId;
use board_core::model::*;
use board_core::store::{Channel, GraphStore, StoreEvent};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

const BOARD: &str = r#"{
  "title": "Garden",
  "nodes": [
    {"id":"sd_a","type":"markdown","position":{"x":0,"y":0},"data":{"content":"tomatoes"}},
    {"id":"sd_b","type":"iframe","position":{"x":600,"y":0},"data":{"url":"https://example.com"}}
  ],
  "edges": [
    {"id":"sd_e","source":"sd_a","target":"sd_b","sourceHandle":"right-src","markerEnd":{"type":"arrow"}}
  ]
}"#;

fn capture(store: &mut GraphStore) -> Rc<RefCell<Vec<StoreEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    events
}

// ─── Replace document ───────────────────────────────────────────────────

#[test]
fn replace_publishes_only_changed_channels() {
    let mut store = GraphStore::new();
    let events = capture(&mut store);
    store.replace_document(parse_document(BOARD).unwrap());

    let first = events.borrow()[0].clone();
    assert_eq!(
        first.channels.as_slice(),
        &[Channel::Nodes, Channel::Edges, Channel::Title]
    );

    // Replacing with identical content is silent.
    store.replace_document(parse_document(BOARD).unwrap());
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn record_roundtrip_through_store() {
    let mut store = GraphStore::new();
    store.replace_document(parse_document(BOARD).unwrap());
    let record = BoardRecord::from(&store.document());
    let json = serde_json::to_string(&record).unwrap();

    let mut other = GraphStore::new();
    other.replace_document(parse_document(&json).unwrap());
    assert_eq!(other.document(), store.document());
}

#[test]
fn ids_from_loaded_documents_are_never_reissued() {
    let mut store = GraphStore::new();
    store.replace_document(parse_document(BOARD).unwrap());
    store.remove_node(NodeId::intern("sd_a"));
    let fresh = store.reserve_node_id("sd_a");
    assert_eq!(fresh.as_str(), "sd_a_1");
    assert!(store.edges().is_empty(), "edge followed its endpoint");
}
