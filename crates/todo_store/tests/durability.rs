//! File-backed store behaviour across process-like reopen cycles.

use proptest::prelude::*;
use std::collections::BTreeMap;
use tempfile::tempdir;
use todo_store::{Item, ItemId, StoreError, TodoStore};

fn put(store: &TodoStore, item: &Item) {
    store
        .transaction(|txn| {
            txn.put(item.clone());
            Ok::<_, StoreError>(())
        })
        .unwrap();
}

#[test]
fn items_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.log");

    let first = Item::new("first", 1);
    let second = Item::new("second", 2);
    {
        let store = TodoStore::open(&path).unwrap();
        put(&store, &first);
        put(&store, &second);
    }

    let store = TodoStore::open(&path).unwrap();
    assert_eq!(store.list(), vec![first, second]);
    assert_eq!(store.max_order(), Some(2));
}

#[test]
fn open_twice_is_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.log");

    let _held = TodoStore::open(&path).unwrap();
    assert!(matches!(TodoStore::open(&path), Err(StoreError::Locked(_))));
}

#[test]
fn compaction_is_durable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.log");

    let mut item = Item::new("moving target", 1);
    {
        let store = TodoStore::open(&path).unwrap();
        for order in 1..=20 {
            item.order = order;
            put(&store, &item);
        }
        assert!(store.compact().unwrap() > 0);

        // Writes after compaction append to the snapshot.
        put(&store, &Item::new("after", 21));
    }

    let store = TodoStore::open(&path).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(item.id).unwrap().order, 20);
    assert_eq!(store.find_by_order(21).unwrap().value, "after");
}

#[test]
fn corrupt_frame_refuses_to_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.log");
    {
        let store = TodoStore::open(&path).unwrap();
        put(&store, &Item::new("doomed", 1));
    }

    let mut bytes = std::fs::read(&path).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    assert!(TodoStore::open(&path).is_err());
}

#[derive(Debug, Clone)]
enum Op {
    Put { slot: usize, order: i64 },
    Delete { slot: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..6, -3i64..10).prop_map(|(slot, order)| Op::Put { slot, order }),
        (0usize..6).prop_map(|slot| Op::Delete { slot }),
    ]
}

fn live_orders(store: &TodoStore) -> BTreeMap<ItemId, i64> {
    store.list().into_iter().map(|i| (i.id, i.order)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn replay_matches_model(batches in prop::collection::vec(prop::collection::vec(op_strategy(), 0..4), 0..12)) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("todos.log");
        let ids: Vec<ItemId> = (0..6u8).map(|i| ItemId::from_bytes([i; 16])).collect();
        let mut model: BTreeMap<ItemId, i64> = BTreeMap::new();

        {
            let store = TodoStore::open(&path).unwrap();
            for batch in &batches {
                store.transaction(|txn| {
                    for op in batch {
                        match *op {
                            Op::Put { slot, order } => {
                                let mut item = Item::new(format!("slot {}", slot), order);
                                item.id = ids[slot];
                                txn.put(item);
                            }
                            Op::Delete { slot } => {
                                txn.delete(ids[slot]);
                            }
                        }
                    }
                    Ok::<_, StoreError>(())
                }).unwrap();

                for op in batch {
                    match *op {
                        Op::Put { slot, order } => { model.insert(ids[slot], order); }
                        Op::Delete { slot } => { model.remove(&ids[slot]); }
                    }
                }
            }
            prop_assert_eq!(live_orders(&store), model.clone());
        }

        let store = TodoStore::open(&path).unwrap();
        prop_assert_eq!(live_orders(&store), model.clone());
        prop_assert_eq!(store.max_order(), model.values().copied().max());

        store.compact().unwrap();
        drop(store);
        let store = TodoStore::open(&path).unwrap();
        prop_assert_eq!(live_orders(&store), model);
    }
}

#[test]
fn snapshot_reads_without_touching_the_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.log");

    let kept = Item::new("kept", 1);
    {
        let store = TodoStore::open(&path).unwrap();
        put(&store, &kept);
        put(&store, &Item::new("torn", 2));
    }
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 3);
    std::fs::write(&path, &bytes).unwrap();

    let snapshot = TodoStore::open_snapshot(&path).unwrap();
    assert_eq!(snapshot.list(), vec![kept.clone()]);
    assert_eq!(std::fs::read(&path).unwrap(), bytes);

    // A live writer's lock does not block a snapshot.
    let _writer = TodoStore::open(&path).unwrap();
    let snapshot = TodoStore::open_snapshot(&path).unwrap();
    assert_eq!(snapshot.list(), vec![kept]);
}
