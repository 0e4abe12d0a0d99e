use mindspace_core::db::{open_db, open_db_in_memory};
use mindspace_core::{
    Point3, SnapshotRepository, SpaceMode, SpaceService, SqliteSnapshotRepository, Theme,
    STORAGE_KEY,
};

#[test]
fn first_run_hydrates_to_the_seeded_collection_and_persists_it() {
    let conn = open_db_in_memory().unwrap();
    let service = SpaceService::hydrate(SqliteSnapshotRepository::new(&conn));

    assert!(service.graph().node_count() > 0);
    assert!(service.graph().nodes().all(|node| node.is_seed_node));

    // Hydration already wrote the seeded state to the store.
    let stored = SqliteSnapshotRepository::new(&conn)
        .get(STORAGE_KEY)
        .unwrap()
        .expect("snapshot written during hydration");
    assert!(stored.contains("isSeedNode"));
}

#[test]
fn durable_state_survives_a_full_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindspace.db");

    let (node_id, seed_count) = {
        let conn = open_db(&path).unwrap();
        let mut service = SpaceService::hydrate(SqliteSnapshotRepository::new(&conn));
        let seed_count = service.graph().node_count();
        let id = service.add_node(Some("persisted idea"), None).unwrap();
        service.set_theme(Theme::Ocean).unwrap();
        service.set_mode(SpaceMode::Solar).unwrap();
        (id, seed_count)
    };

    let conn = open_db(&path).unwrap();
    let service = SpaceService::hydrate(SqliteSnapshotRepository::new(&conn));

    assert_eq!(service.graph().node_count(), seed_count + 1);
    let node = service.graph().node(node_id).expect("node survived restart");
    assert_eq!(node.title, "persisted idea");
    assert_eq!(service.graph().theme(), Theme::Ocean);
    assert_eq!(service.graph().mode(), SpaceMode::Solar);
    // No double seeding on the second hydration.
    assert_eq!(
        service
            .graph()
            .nodes()
            .filter(|node| node.is_seed_node)
            .count(),
        seed_count
    );
}

#[test]
fn selection_linking_and_undo_state_are_session_transient() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindspace.db");

    let node_id = {
        let conn = open_db(&path).unwrap();
        let mut service = SpaceService::hydrate(SqliteSnapshotRepository::new(&conn));
        let keep = service.add_node(Some("keep"), None).unwrap();
        let gone = service.add_node(Some("gone"), None).unwrap();
        service.remove_node(gone).unwrap();
        assert!(service.can_undo());
        service.set_active_node(Some(keep));
        service.start_linking(keep);
        keep
    };

    let conn = open_db(&path).unwrap();
    let service = SpaceService::hydrate(SqliteSnapshotRepository::new(&conn));

    assert!(service.graph().node(node_id).is_some());
    assert_eq!(service.graph().active_node_id(), None);
    assert_eq!(service.graph().linking_from_id(), None);
    assert!(!service.can_undo());
}

#[test]
fn malformed_stored_snapshot_degrades_to_first_run() {
    let conn = open_db_in_memory().unwrap();
    SqliteSnapshotRepository::new(&conn)
        .put(STORAGE_KEY, "{ definitely not json")
        .unwrap();

    let service = SpaceService::hydrate(SqliteSnapshotRepository::new(&conn));

    // Usable state: freshly seeded instead of an error.
    assert!(service.graph().node_count() > 0);
    assert!(service.graph().nodes().all(|node| node.is_seed_node));
}

#[test]
fn reset_clears_the_store_and_the_graph() {
    let conn = open_db_in_memory().unwrap();
    let mut service = SpaceService::hydrate(SqliteSnapshotRepository::new(&conn));
    service.add_node(Some("doomed"), None).unwrap();

    service.reset().unwrap();

    assert_eq!(service.graph().node_count(), 0);
    assert_eq!(
        SqliteSnapshotRepository::new(&conn).get(STORAGE_KEY).unwrap(),
        None
    );
}

#[test]
fn every_durable_mutation_rewrites_the_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let mut service = SpaceService::hydrate(SqliteSnapshotRepository::new(&conn));

    let id = service.add_node(Some("before"), None).unwrap();
    service
        .update_node(
            id,
            mindspace_core::NodeUpdate {
                title: Some("after".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    service
        .update_node_position(id, Point3::new(7.0, 8.0, 9.0))
        .unwrap();

    let stored = SqliteSnapshotRepository::new(&conn)
        .get(STORAGE_KEY)
        .unwrap()
        .unwrap();
    assert!(stored.contains("after"));
    assert!(!stored.contains("before"));
}
