use mindspace_core::{Graph, Point3, SpaceMode};

fn planar_distance(a: Point3, b: Point3) -> f64 {
    ((a.x - b.x).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

#[test]
fn solar_mode_rings_everyone_around_the_primary() {
    let mut graph = Graph::new();
    let primary = graph.add_node(Some("sun"), None);
    let others: Vec<_> = (0..4).map(|_| graph.add_node(None, None)).collect();
    let primary_position = graph.node(primary).unwrap().position;

    graph.set_mode(SpaceMode::Solar);

    assert_eq!(graph.mode(), SpaceMode::Solar);
    // The primary stays put; everyone else sits on the ring around it.
    assert_eq!(graph.node(primary).unwrap().position, primary_position);
    for &id in &others {
        let position = graph.node(id).unwrap().position;
        let ring = planar_distance(position, primary_position);
        assert!((ring - 10.0).abs() < 1e-9, "not on the ring: {ring}");
    }
}

#[test]
fn galaxy_round_trip_restores_positions_bit_for_bit() {
    let mut graph = Graph::new();
    let ids: Vec<_> = (0..5).map(|_| graph.add_node(None, None)).collect();
    let galaxy_positions: Vec<Point3> = ids
        .iter()
        .map(|id| graph.node(*id).unwrap().position)
        .collect();

    graph.set_mode(SpaceMode::Solar);
    graph.set_mode(SpaceMode::Galaxy);

    for (id, expected) in ids.iter().zip(&galaxy_positions) {
        assert_eq!(graph.node(*id).unwrap().position, *expected);
    }
}

#[test]
fn dragging_in_solar_mode_does_not_corrupt_the_galaxy_layout() {
    let mut graph = Graph::new();
    graph.add_node(Some("sun"), None);
    let planet = graph.add_node(Some("planet"), None);
    let remembered = graph.node(planet).unwrap().galaxy_position;

    graph.set_mode(SpaceMode::Solar);
    graph.update_node_position(planet, Point3::new(99.0, 99.0, 99.0));
    assert_eq!(graph.node(planet).unwrap().galaxy_position, remembered);

    graph.set_mode(SpaceMode::Galaxy);
    assert_eq!(graph.node(planet).unwrap().position, remembered);
}

#[test]
fn dragging_in_galaxy_mode_updates_the_remembered_layout() {
    let mut graph = Graph::new();
    let id = graph.add_node(None, None);
    let target = Point3::new(-3.0, 2.0, 8.0);

    graph.update_node_position(id, target);
    let node = graph.node(id).unwrap();
    assert_eq!(node.position, target);
    assert_eq!(node.galaxy_position, target);
}

#[test]
fn legacy_path_mode_behaves_like_galaxy() {
    let mut graph = Graph::new();
    let id = graph.add_node(None, None);

    graph.set_mode(SpaceMode::Path);
    let target = Point3::new(1.0, 1.0, 1.0);
    graph.update_node_position(id, target);

    // Path is galaxy-like: the drag lands in the remembered layout too.
    assert_eq!(graph.node(id).unwrap().galaxy_position, target);
}

#[test]
fn set_mode_on_an_empty_graph_just_switches() {
    let mut graph = Graph::new();
    graph.set_mode(SpaceMode::Solar);
    assert_eq!(graph.mode(), SpaceMode::Solar);
    assert_eq!(graph.node_count(), 0);
}
