use mindspace_core::{Graph, NodeUpdate, Point3};
use uuid::Uuid;

fn assert_symmetric(graph: &Graph) {
    for node in graph.nodes() {
        assert!(
            !node.connections.contains(&node.id),
            "node {} lists itself",
            node.id
        );
        for &other in &node.connections {
            let peer = graph.node(other).expect("connection target exists");
            assert!(
                peer.connections.contains(&node.id),
                "edge {} -> {} has no reverse",
                node.id,
                other
            );
        }
    }
}

#[test]
fn add_node_selects_it_and_assigns_defaults() {
    let mut graph = Graph::new();
    let id = graph.add_node(Some("first"), None);

    assert_eq!(graph.active_node_id(), Some(id));
    let node = graph.node(id).unwrap();
    assert_eq!(node.title, "first");
    assert_eq!(node.position, node.galaxy_position);
    assert!(node.orbit_radius.is_some());
    assert!(!node.is_seed_node);
}

#[test]
fn add_node_without_title_uses_the_default() {
    let mut graph = Graph::new();
    let id = graph.add_node(None, Some("/mars.jpg"));
    let node = graph.node(id).unwrap();
    assert_eq!(node.title, "New Idea");
    assert_eq!(node.texture_ref, "/mars.jpg");
}

#[test]
fn orbit_radii_grow_strictly_with_each_creation() {
    let mut graph = Graph::new();
    let ids: Vec<_> = (0..6).map(|_| graph.add_node(None, None)).collect();

    let radii: Vec<f64> = ids
        .iter()
        .map(|id| graph.node(*id).unwrap().orbit_radius.unwrap())
        .collect();
    for pair in radii.windows(2) {
        assert!(pair[0] < pair[1], "orbit radii not increasing: {radii:?}");
    }
}

#[test]
fn created_at_is_strictly_increasing() {
    let mut graph = Graph::new();
    let ids: Vec<_> = (0..5).map(|_| graph.add_node(None, None)).collect();
    let stamps: Vec<i64> = ids
        .iter()
        .map(|id| graph.node(*id).unwrap().created_at)
        .collect();
    for pair in stamps.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn linking_creates_one_symmetric_edge() {
    let mut graph = Graph::new();
    let a = graph.add_node(Some("Idea A"), None);
    let b = graph.add_node(Some("Idea B"), None);

    graph.start_linking(a);
    assert_eq!(graph.linking_from_id(), Some(a));
    assert!(graph.complete_link(b));
    assert_eq!(graph.linking_from_id(), None);

    assert_eq!(graph.node(a).unwrap().connections, vec![b]);
    assert_eq!(graph.node(b).unwrap().connections, vec![a]);
    assert_symmetric(&graph);
}

#[test]
fn self_link_and_duplicate_link_are_no_ops_on_the_edge_set() {
    let mut graph = Graph::new();
    let a = graph.add_node(None, None);
    let b = graph.add_node(None, None);

    graph.start_linking(a);
    assert!(!graph.complete_link(a));
    assert_eq!(graph.linking_from_id(), None);
    assert!(graph.node(a).unwrap().connections.is_empty());

    graph.start_linking(a);
    graph.complete_link(b);
    graph.start_linking(a);
    assert!(!graph.complete_link(b), "already-connected adds no edge");
    assert_eq!(graph.linking_from_id(), None);
    assert_eq!(graph.node(a).unwrap().connections.len(), 1);
}

#[test]
fn complete_link_without_linking_in_progress_is_a_no_op() {
    let mut graph = Graph::new();
    let a = graph.add_node(None, None);
    assert!(!graph.complete_link(a));
    assert!(graph.node(a).unwrap().connections.is_empty());
}

#[test]
fn retargeting_discards_the_prior_source() {
    let mut graph = Graph::new();
    let a = graph.add_node(None, None);
    let b = graph.add_node(None, None);
    let c = graph.add_node(None, None);

    graph.start_linking(a);
    graph.start_linking(b);
    assert!(graph.complete_link(c));

    assert!(graph.node(a).unwrap().connections.is_empty());
    assert_eq!(graph.node(b).unwrap().connections, vec![c]);
}

#[test]
fn cancel_linking_clears_the_state() {
    let mut graph = Graph::new();
    let a = graph.add_node(None, None);
    graph.start_linking(a);
    graph.cancel_linking();
    assert_eq!(graph.linking_from_id(), None);
}

#[test]
fn remove_connection_strips_both_endpoints() {
    let mut graph = Graph::new();
    let a = graph.add_node(None, None);
    let b = graph.add_node(None, None);
    graph.start_linking(a);
    graph.complete_link(b);

    assert!(graph.remove_connection(b, a));
    assert!(graph.node(a).unwrap().connections.is_empty());
    assert!(graph.node(b).unwrap().connections.is_empty());

    // Unknown endpoints are silent no-ops.
    assert!(!graph.remove_connection(a, Uuid::new_v4()));
}

#[test]
fn removing_a_node_strips_it_from_every_connection_list() {
    let mut graph = Graph::new();
    let hub = graph.add_node(Some("hub"), None);
    let spokes: Vec<_> = (0..3).map(|_| graph.add_node(None, None)).collect();
    for &spoke in &spokes {
        graph.start_linking(hub);
        graph.complete_link(spoke);
    }

    assert!(graph.remove_node(hub));
    assert!(graph.node(hub).is_none());
    for &spoke in &spokes {
        assert!(graph.node(spoke).unwrap().connections.is_empty());
    }
    assert_symmetric(&graph);
}

#[test]
fn removing_the_active_or_linking_node_clears_those_references() {
    let mut graph = Graph::new();
    let a = graph.add_node(None, None);
    graph.set_active_node(Some(a));
    graph.start_linking(a);

    graph.remove_node(a);
    assert_eq!(graph.active_node_id(), None);
    assert_eq!(graph.linking_from_id(), None);
}

#[test]
fn unknown_ids_are_silent_no_ops() {
    let mut graph = Graph::new();
    graph.add_node(None, None);
    let ghost = Uuid::new_v4();

    assert!(!graph.remove_node(ghost));
    assert!(!graph.update_node_position(ghost, Point3::new(1.0, 2.0, 3.0)));
    assert!(!graph.update_node(
        ghost,
        NodeUpdate {
            title: Some("x".to_string()),
            ..NodeUpdate::default()
        }
    ));
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn selecting_an_unknown_id_selects_none() {
    let mut graph = Graph::new();
    let a = graph.add_node(None, None);
    graph.set_active_node(Some(a));
    graph.set_active_node(Some(Uuid::new_v4()));
    assert_eq!(graph.active_node_id(), None);
}

#[test]
fn update_node_merges_only_the_provided_fields() {
    let mut graph = Graph::new();
    let id = graph.add_node(Some("title"), None);

    graph.update_node(
        id,
        NodeUpdate {
            body: Some("body text".to_string()),
            ..NodeUpdate::default()
        },
    );
    let node = graph.node(id).unwrap();
    assert_eq!(node.title, "title");
    assert_eq!(node.body, "body text");
}

#[test]
fn random_symmetry_holds_across_mixed_mutations() {
    let mut graph = Graph::new();
    let mut ids = Vec::new();
    for index in 0..12 {
        let id = graph.add_node(None, None);
        if index % 2 == 0 {
            if let Some(&prev) = ids.last() {
                graph.start_linking(prev);
                graph.complete_link(id);
            }
        }
        ids.push(id);
    }
    for (index, &id) in ids.iter().enumerate() {
        if index % 3 == 0 {
            graph.remove_node(id);
        }
    }
    assert_symmetric(&graph);
}
