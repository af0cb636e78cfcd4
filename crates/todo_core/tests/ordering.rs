//! End-to-end ordering behaviour over a real store.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;
use todo_core::{ItemId, ItemPatch, SortDirection, TodoService};
use todo_store::TodoStore;

fn in_memory() -> TodoService {
    TodoService::new(Arc::new(TodoStore::open_in_memory().unwrap()))
}

fn order_of(service: &TodoService, id: ItemId) -> i64 {
    service.get(id).unwrap().order
}

#[test]
fn three_items_move_last_to_first() {
    let service = in_memory();
    let one = service.create("one").unwrap();
    let two = service.create("two").unwrap();
    let three = service.create("three").unwrap();
    assert_eq!((one.order, two.order, three.order), (1, 2, 3));

    service
        .update(three.id, ItemPatch::default().order(1))
        .unwrap();

    assert_eq!(order_of(&service, one.id), 3);
    assert_eq!(order_of(&service, two.id), 2);
    assert_eq!(order_of(&service, three.id), 1);
}

#[test]
fn single_item_moves_to_free_slot() {
    let service = in_memory();
    let only = service.create("only").unwrap();

    service.update(only.id, ItemPatch::default().order(5)).unwrap();

    assert_eq!(order_of(&service, only.id), 5);
    assert_eq!(service.list(SortDirection::Asc).len(), 1);
}

#[test]
fn moving_to_free_slot_twice_matches_once() {
    let service = in_memory();
    let a = service.create("a").unwrap();
    let b = service.create("b").unwrap();

    service.update(a.id, ItemPatch::default().order(9)).unwrap();
    let once = service.list(SortDirection::Asc);
    service.update(a.id, ItemPatch::default().order(9)).unwrap();
    let twice = service.list(SortDirection::Asc);

    assert_eq!(once, twice);
    assert_eq!(order_of(&service, b.id), 2);
}

#[test]
fn moves_survive_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.log");

    let (a, b) = {
        let service = TodoService::new(Arc::new(TodoStore::open(&path).unwrap()));
        let a = service.create("a").unwrap();
        let b = service.create("b").unwrap();
        service.update(a.id, ItemPatch::default().order(2).done(true)).unwrap();
        (a.id, b.id)
    };

    let service = TodoService::new(Arc::new(TodoStore::open(&path).unwrap()));
    assert_eq!(order_of(&service, a), 2);
    assert_eq!(order_of(&service, b), 1);
    assert!(service.get(a).unwrap().is_done());
    assert_eq!(service.create("c").unwrap().order, 3);
}

#[test]
fn concurrent_moves_keep_orders_unique() {
    const ITEMS: i64 = 8;
    const THREADS: usize = 8;
    const MOVES: usize = 50;

    let service = Arc::new(in_memory());
    let ids: Vec<ItemId> = (0..ITEMS)
        .map(|i| service.create(&format!("item {}", i)).unwrap().id)
        .collect();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let service = Arc::clone(&service);
            let ids = ids.clone();
            thread::spawn(move || {
                for m in 0..MOVES {
                    let mover = ids[(m * 5 + t) % ids.len()];
                    let target = ((m * 3 + t * 7) as i64 % ITEMS) + 1;
                    service
                        .update(mover, ItemPatch::default().order(target))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let orders: BTreeSet<i64> = service
        .list(SortDirection::Asc)
        .iter()
        .map(|item| item.order)
        .collect();
    assert_eq!(orders, (1..=ITEMS).collect::<BTreeSet<_>>());
}

#[test]
fn concurrent_creates_get_distinct_orders() {
    let service = Arc::new(in_memory());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for i in 0..25 {
                    service.create(&format!("t{} #{}", t, i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let orders: BTreeSet<i64> = service
        .list(SortDirection::Asc)
        .iter()
        .map(|item| item.order)
        .collect();
    assert_eq!(orders, (1..=100).collect::<BTreeSet<_>>());
}
