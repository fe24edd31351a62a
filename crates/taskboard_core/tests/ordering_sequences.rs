//! Generated operation sequences checked step by step against a `Vec` model.

use proptest::prelude::*;
use rusqlite::Connection;
use std::collections::HashSet;
use taskboard_core::{
    open_db_in_memory, Assignment, BoardService, CoreConfig, EntityId, ProjectService,
};

#[derive(Clone, Debug)]
enum Op {
    Append,
    InsertAt(i64),
    Delete(usize),
    Move(usize, i64),
    Batch(Vec<(usize, i64)>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Append),
        (0i64..12).prop_map(Op::InsertAt),
        any::<usize>().prop_map(Op::Delete),
        (any::<usize>(), 0i64..12).prop_map(|(pick, position)| Op::Move(pick, position)),
        proptest::collection::vec((any::<usize>(), 0i64..12), 1..5).prop_map(Op::Batch),
    ]
}

fn setup(conn: &Connection) -> (BoardService<'_>, EntityId) {
    let config = CoreConfig::default();
    let project = ProjectService::try_new(conn, &config)
        .unwrap()
        .create_project("Generated")
        .unwrap();
    (BoardService::try_new(conn, &config).unwrap(), project.uuid)
}

/// Applies a batch to the model as sequential moves in ascending target order.
fn model_batch(model: &mut Vec<EntityId>, assignments: &[Assignment]) {
    let mut sorted = assignments.to_vec();
    sorted.sort_by_key(|assignment| assignment.position);
    let last = model.len() - 1;
    for assignment in sorted {
        let from = model
            .iter()
            .position(|id| *id == assignment.entity_id)
            .unwrap();
        let id = model.remove(from);
        model.insert((assignment.position as usize).min(last), id);
    }
}

/// Builds a batch with distinct entities and distinct targets.
fn pick_batch(model: &[EntityId], picks: &[(usize, i64)]) -> Vec<Assignment> {
    let mut entities = HashSet::new();
    let mut positions = HashSet::new();
    picks
        .iter()
        .map(|(pick, position)| (model[pick % model.len()], *position))
        .filter(|(id, position)| entities.insert(*id) && positions.insert(*position))
        .map(|(id, position)| Assignment::new(id, position))
        .collect()
}

fn persisted(service: &BoardService<'_>, project_id: EntityId) -> (Vec<EntityId>, Vec<u32>) {
    service
        .list_boards(project_id)
        .unwrap()
        .into_iter()
        .map(|board| (board.uuid, board.sort_order))
        .unzip()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]

    #[test]
    fn every_step_matches_model_and_stays_dense(
        ops in proptest::collection::vec(op_strategy(), 1..40)
    ) {
        let conn = open_db_in_memory().unwrap();
        let (service, project_id) = setup(&conn);
        let mut model = Vec::new();

        for (step, op) in ops.into_iter().enumerate() {
            match op {
                Op::Append => {
                    let board = service
                        .create_board(project_id, format!("step {step}"), None)
                        .unwrap();
                    prop_assert_eq!(board.sort_order as usize, model.len());
                    model.push(board.uuid);
                }
                Op::InsertAt(position) => {
                    let board = service
                        .create_board(project_id, format!("step {step}"), Some(position))
                        .unwrap();
                    let slot = (position as usize).min(model.len());
                    prop_assert_eq!(board.sort_order as usize, slot);
                    model.insert(slot, board.uuid);
                }
                Op::Delete(pick) => {
                    if model.is_empty() {
                        continue;
                    }
                    let id = model.remove(pick % model.len());
                    service.delete_board(project_id, id).unwrap();
                }
                Op::Move(pick, position) => {
                    if model.is_empty() {
                        continue;
                    }
                    let from = pick % model.len();
                    let id = model.remove(from);
                    let slot = (position as usize).min(model.len());
                    model.insert(slot, id);
                    let order = service.move_board(project_id, id, position).unwrap();
                    prop_assert_eq!(order as usize, slot);
                }
                Op::Batch(picks) => {
                    if model.is_empty() {
                        continue;
                    }
                    let assignments = pick_batch(&model, &picks);
                    model_batch(&mut model, &assignments);
                    let ordered = service.reorder_boards(project_id, &assignments).unwrap();
                    let returned = ordered.iter().map(|entity| entity.id).collect::<Vec<_>>();
                    prop_assert_eq!(&returned, &model);
                }
            }

            let (ids, orders) = persisted(&service, project_id);
            prop_assert_eq!(&ids, &model);
            let dense = (0..model.len() as u32).collect::<Vec<_>>();
            prop_assert_eq!(orders, dense);
        }
    }
}
