use rusqlite::Connection;
use taskboard_core::{
    open_db_in_memory, Assignment, BoardService, Conflict, CoreConfig, EntityId, EntityKind,
    ErrorKind, InvalidArgument, OrderingError, ProjectService,
};
use uuid::Uuid;

fn setup(conn: &Connection) -> (BoardService<'_>, EntityId) {
    let config = CoreConfig::default();
    let project = ProjectService::try_new(conn, &config)
        .unwrap()
        .create_project("Launch")
        .unwrap();
    (BoardService::try_new(conn, &config).unwrap(), project.uuid)
}

fn seed_boards(service: &BoardService<'_>, project_id: EntityId, count: usize) -> Vec<EntityId> {
    (0..count)
        .map(|index| {
            service
                .create_board(project_id, format!("Board {index}"), None)
                .unwrap()
                .uuid
        })
        .collect()
}

fn order_of(service: &BoardService<'_>, project_id: EntityId, board_id: EntityId) -> u32 {
    service.get_board(project_id, board_id).unwrap().sort_order
}

fn listed_ids(service: &BoardService<'_>, project_id: EntityId) -> Vec<EntityId> {
    service
        .list_boards(project_id)
        .unwrap()
        .into_iter()
        .map(|board| board.uuid)
        .collect()
}

fn assert_dense(service: &BoardService<'_>, project_id: EntityId) {
    let orders = service
        .list_boards(project_id)
        .unwrap()
        .into_iter()
        .map(|board| board.sort_order)
        .collect::<Vec<_>>();
    let expected = (0..orders.len() as u32).collect::<Vec<_>>();
    assert_eq!(orders, expected);
}

#[test]
fn append_assigns_scope_size() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);

    let first = service.create_board(project_id, "Todo", None).unwrap();
    assert_eq!(first.sort_order, 0);

    let ids = seed_boards(&service, project_id, 3);
    assert_eq!(order_of(&service, project_id, ids[2]), 3);
    assert_dense(&service, project_id);
}

#[test]
fn insert_at_shifts_later_boards_right() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 4);

    let inserted = service
        .create_board(project_id, "Review", Some(2))
        .unwrap();

    assert_eq!(inserted.sort_order, 2);
    assert_eq!(order_of(&service, project_id, ids[0]), 0);
    assert_eq!(order_of(&service, project_id, ids[1]), 1);
    assert_eq!(order_of(&service, project_id, ids[2]), 3);
    assert_eq!(order_of(&service, project_id, ids[3]), 4);
    assert_dense(&service, project_id);
}

#[test]
fn insert_past_end_degrades_to_append() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    seed_boards(&service, project_id, 2);

    let board = service
        .create_board(project_id, "Later", Some(40))
        .unwrap();
    assert_eq!(board.sort_order, 2);
}

#[test]
fn delete_closes_the_vacated_slot() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 5);

    service.delete_board(project_id, ids[2]).unwrap();

    assert_eq!(
        listed_ids(&service, project_id),
        vec![ids[0], ids[1], ids[3], ids[4]]
    );
    assert_eq!(order_of(&service, project_id, ids[3]), 2);
    assert_eq!(order_of(&service, project_id, ids[4]), 3);
    assert_dense(&service, project_id);

    let err = service.get_board(project_id, ids[2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn move_toward_front_shifts_between_boards_down() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 5);

    let order = service.move_board(project_id, ids[4], 1).unwrap();

    assert_eq!(order, 1);
    assert_eq!(
        listed_ids(&service, project_id),
        vec![ids[0], ids[4], ids[1], ids[2], ids[3]]
    );
    assert_dense(&service, project_id);
}

#[test]
fn move_toward_back_leaves_no_gap_at_old_slot() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 5);

    let order = service.move_board(project_id, ids[1], 4).unwrap();

    assert_eq!(order, 4);
    assert_eq!(
        listed_ids(&service, project_id),
        vec![ids[0], ids[2], ids[3], ids[4], ids[1]]
    );
    assert_dense(&service, project_id);
}

#[test]
fn move_past_end_clamps_to_last_position() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 3);

    assert_eq!(service.move_board(project_id, ids[0], 99).unwrap(), 2);
    assert_eq!(
        listed_ids(&service, project_id),
        vec![ids[1], ids[2], ids[0]]
    );
}

#[test]
fn move_and_move_back_restores_every_order() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 6);
    let before = listed_ids(&service, project_id);

    service.move_board(project_id, ids[2], 5).unwrap();
    service.move_board(project_id, ids[2], 2).unwrap();
    service.move_board(project_id, ids[4], 0).unwrap();
    service.move_board(project_id, ids[4], 4).unwrap();

    assert_eq!(listed_ids(&service, project_id), before);
}

#[test]
fn negative_move_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 2);

    let err = service.move_board(project_id, ids[1], -1).unwrap_err();
    assert!(matches!(
        err,
        OrderingError::InvalidArgument(InvalidArgument::NegativePosition { position: -1, .. })
    ));
    assert_eq!(listed_ids(&service, project_id), ids);
}

#[test]
fn batch_reorder_applies_assignments_in_target_order() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 4);

    let ordered = service
        .reorder_boards(
            project_id,
            &[Assignment::new(ids[0], 3), Assignment::new(ids[3], 0)],
        )
        .unwrap();

    let expected = vec![ids[3], ids[1], ids[2], ids[0]];
    assert_eq!(
        ordered.iter().map(|entity| entity.id).collect::<Vec<_>>(),
        expected
    );
    assert_eq!(listed_ids(&service, project_id), expected);
    assert_dense(&service, project_id);
}

#[test]
fn batch_reorder_with_full_permutation() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 4);

    let assignments = [
        Assignment::new(ids[2], 0),
        Assignment::new(ids[0], 1),
        Assignment::new(ids[3], 2),
        Assignment::new(ids[1], 3),
    ];
    service.reorder_boards(project_id, &assignments).unwrap();

    assert_eq!(
        listed_ids(&service, project_id),
        vec![ids[2], ids[0], ids[3], ids[1]]
    );
}

#[test]
fn batch_with_duplicate_targets_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 3);

    let err = service
        .reorder_boards(
            project_id,
            &[Assignment::new(ids[0], 1), Assignment::new(ids[2], 1)],
        )
        .unwrap_err();

    assert!(matches!(
        err,
        OrderingError::InvalidArgument(InvalidArgument::DuplicatePosition(1))
    ));
    assert_eq!(listed_ids(&service, project_id), ids);
}

#[test]
fn batch_targets_past_u32_range_move_to_end_in_request_order() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 3);

    service
        .reorder_boards(
            project_id,
            &[
                Assignment::new(ids[1], 5_000_000_001),
                Assignment::new(ids[0], 5_000_000_000),
            ],
        )
        .unwrap();

    assert_eq!(
        listed_ids(&service, project_id),
        vec![ids[2], ids[0], ids[1]]
    );
    assert_dense(&service, project_id);
}

#[test]
fn empty_batch_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);

    let err = service.reorder_boards(project_id, &[]).unwrap_err();
    assert!(matches!(
        err,
        OrderingError::InvalidArgument(InvalidArgument::EmptyBatch)
    ));
}

#[test]
fn batch_naming_board_of_other_project_is_conflict_and_rolls_back() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 3);

    let other_project = ProjectService::try_new(&conn, &CoreConfig::default())
        .unwrap()
        .create_project("Other")
        .unwrap();
    let foreign = service
        .create_board(other_project.uuid, "Foreign", None)
        .unwrap();

    let err = service
        .reorder_boards(
            project_id,
            &[Assignment::new(ids[2], 0), Assignment::new(foreign.uuid, 1)],
        )
        .unwrap_err();

    match err {
        OrderingError::Conflict(Conflict::ScopeMismatch {
            entity,
            claimed_parent,
            actual_parent,
        }) => {
            assert_eq!(entity.kind, EntityKind::Board);
            assert_eq!(claimed_parent, project_id);
            assert_eq!(actual_parent, other_project.uuid);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(listed_ids(&service, project_id), ids);
}

#[test]
fn operations_on_missing_project_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let (service, _) = setup(&conn);
    let missing = Uuid::new_v4();

    let err = service.create_board(missing, "Todo", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.kind().code(), "not_found");

    let err = service.list_boards(missing).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn moving_unknown_board_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    seed_boards(&service, project_id, 2);

    let err = service
        .move_board(project_id, Uuid::new_v4(), 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn rename_keeps_order_and_normalizes_title() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 3);

    service
        .rename_board(project_id, ids[1], "  In   progress ")
        .unwrap();

    let board = service.get_board(project_id, ids[1]).unwrap();
    assert_eq!(board.title, "In progress");
    assert_eq!(board.sort_order, 1);

    let err = service.rename_board(project_id, ids[1], "   ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn mixed_operation_sequence_keeps_density() {
    let conn = open_db_in_memory().unwrap();
    let (service, project_id) = setup(&conn);
    let ids = seed_boards(&service, project_id, 5);

    service.create_board(project_id, "Front", Some(0)).unwrap();
    service.move_board(project_id, ids[0], 5).unwrap();
    service.delete_board(project_id, ids[3]).unwrap();
    service.create_board(project_id, "Middle", Some(2)).unwrap();
    service
        .reorder_boards(
            project_id,
            &[Assignment::new(ids[4], 0), Assignment::new(ids[1], 4)],
        )
        .unwrap();
    service.delete_board(project_id, ids[4]).unwrap();

    assert_eq!(service.list_boards(project_id).unwrap().len(), 5);
    assert_dense(&service, project_id);
}
