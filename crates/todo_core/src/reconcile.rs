//! Order reconciliation for moved items.
//!
//! Moving item A to a new order value swaps it with whichever item B held
//! that value: B takes A's old slot and A takes the requested one. When no
//! item holds the value A simply moves, which may leave a gap or share a
//! value with nothing; no renumbering of the rest of the list happens.
//!
//! The reconciler itself never validates the requested value beyond the
//! "zero means no move" rule. Negative and far-out-of-range values are stored
//! as given.

use todo_store::{Item, ItemId, WriteTxn};
use tracing::debug;

/// What a reconciliation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// No move requested, or the item already holds the requested value.
    Unchanged,
    /// The item moved into a free slot.
    Moved {
        /// Previous order value.
        from: i64,
        /// New order value.
        to: i64,
    },
    /// The item traded places with the previous occupant.
    Swapped {
        /// Previous order value of the moved item (now the occupant's).
        from: i64,
        /// New order value of the moved item.
        to: i64,
        /// The item that now holds `from`.
        with: ItemId,
    },
}

impl Reconciled {
    /// Returns true if anything was written.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !matches!(self, Reconciled::Unchanged)
    }
}

/// Lookup and write access to the order slots of a collection.
///
/// Implemented by the store's write transaction; tests may supply their own.
pub trait OrderSlots {
    /// Returns the item currently holding `order`, if any.
    fn occupant(&self, order: i64) -> Option<Item>;

    /// Persists `item`, replacing any previous version.
    fn persist(&mut self, item: Item);
}

impl OrderSlots for WriteTxn<'_> {
    fn occupant(&self, order: i64) -> Option<Item> {
        self.find_by_order(order)
    }

    fn persist(&mut self, item: Item) {
        self.put(item);
    }
}

/// Moves `item` to `new_order`, swapping with the current occupant.
///
/// `None` and `Some(0)` leave the order untouched. Otherwise the occupant
/// (if any) is persisted first with `item`'s old order, then `item` is
/// persisted with the new order. `item` is updated in place.
pub fn reconcile_order<S>(slots: &mut S, item: &mut Item, new_order: Option<i64>) -> Reconciled
where
    S: OrderSlots + ?Sized,
{
    let new_order = match new_order {
        Some(order) if order != 0 => order,
        _ => return Reconciled::Unchanged,
    };

    let old_order = item.order;
    if new_order == old_order {
        return Reconciled::Unchanged;
    }

    let occupant = slots
        .occupant(new_order)
        .filter(|other| other.id != item.id);

    let outcome = match occupant {
        Some(mut other) => {
            let with = other.id;
            other.order = old_order;
            slots.persist(other);
            Reconciled::Swapped {
                from: old_order,
                to: new_order,
                with,
            }
        }
        None => Reconciled::Moved {
            from: old_order,
            to: new_order,
        },
    };

    item.order = new_order;
    slots.persist(item.clone());

    debug!(item = %item.id, ?outcome, "reconciled order");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// A plain map standing in for the store.
    #[derive(Default)]
    struct Slots {
        items: BTreeMap<ItemId, Item>,
        writes: Vec<ItemId>,
    }

    impl Slots {
        fn with_orders(orders: &[i64]) -> (Self, Vec<ItemId>) {
            let mut slots = Slots::default();
            let mut ids = Vec::new();
            for &order in orders {
                let item = Item::new(format!("item {}", order), order);
                ids.push(item.id);
                slots.items.insert(item.id, item);
            }
            (slots, ids)
        }

        fn order_of(&self, id: ItemId) -> i64 {
            self.items[&id].order
        }
    }

    impl OrderSlots for Slots {
        fn occupant(&self, order: i64) -> Option<Item> {
            self.items.values().find(|i| i.order == order).cloned()
        }

        fn persist(&mut self, item: Item) {
            self.writes.push(item.id);
            self.items.insert(item.id, item);
        }
    }

    fn reconcile(slots: &mut Slots, id: ItemId, new_order: Option<i64>) -> Reconciled {
        let mut item = slots.items[&id].clone();
        reconcile_order(slots, &mut item, new_order)
    }

    #[test]
    fn swap_with_occupant() {
        let (mut slots, ids) = Slots::with_orders(&[1, 2, 3]);

        let outcome = reconcile(&mut slots, ids[2], Some(1));

        assert_eq!(
            outcome,
            Reconciled::Swapped {
                from: 3,
                to: 1,
                with: ids[0]
            }
        );
        assert_eq!(slots.order_of(ids[0]), 3);
        assert_eq!(slots.order_of(ids[1]), 2);
        assert_eq!(slots.order_of(ids[2]), 1);
        // Occupant is written before the mover.
        assert_eq!(slots.writes, vec![ids[0], ids[2]]);
    }

    #[test]
    fn move_into_free_slot() {
        let (mut slots, ids) = Slots::with_orders(&[1]);

        let outcome = reconcile(&mut slots, ids[0], Some(5));

        assert_eq!(outcome, Reconciled::Moved { from: 1, to: 5 });
        assert_eq!(slots.order_of(ids[0]), 5);
        assert_eq!(slots.writes, vec![ids[0]]);
    }

    #[test]
    fn absent_or_zero_is_a_no_op() {
        let (mut slots, ids) = Slots::with_orders(&[1, 2]);

        assert_eq!(reconcile(&mut slots, ids[0], None), Reconciled::Unchanged);
        assert_eq!(reconcile(&mut slots, ids[0], Some(0)), Reconciled::Unchanged);
        assert!(slots.writes.is_empty());
        assert_eq!(slots.order_of(ids[0]), 1);
    }

    #[test]
    fn same_slot_is_a_no_op() {
        let (mut slots, ids) = Slots::with_orders(&[1, 2]);
        assert_eq!(reconcile(&mut slots, ids[1], Some(2)), Reconciled::Unchanged);
        assert!(slots.writes.is_empty());
    }

    #[test]
    fn negative_orders_are_accepted() {
        let (mut slots, ids) = Slots::with_orders(&[1, 2]);
        assert_eq!(
            reconcile(&mut slots, ids[1], Some(-4)),
            Reconciled::Moved { from: 2, to: -4 }
        );
        assert_eq!(slots.order_of(ids[1]), -4);
    }

    #[test]
    fn repeat_move_to_free_slot_is_idempotent() {
        let (mut slots, ids) = Slots::with_orders(&[1, 2, 3]);

        reconcile(&mut slots, ids[1], Some(10));
        let once: Vec<i64> = ids.iter().map(|id| slots.order_of(*id)).collect();

        assert_eq!(reconcile(&mut slots, ids[1], Some(10)), Reconciled::Unchanged);
        let twice: Vec<i64> = ids.iter().map(|id| slots.order_of(*id)).collect();

        assert_eq!(once, twice);
        assert_eq!(once, vec![1, 10, 3]);
    }

    proptest! {
        #[test]
        fn swap_preserves_uniqueness(
            len in 1usize..12,
            pick in 0usize..12,
            target in -5i64..20,
        ) {
            let orders: Vec<i64> = (1..=len as i64).collect();
            let (mut slots, ids) = Slots::with_orders(&orders);
            let mover = ids[pick % len];
            let old = slots.order_of(mover);
            let occupant = slots.occupant(target).map(|i| i.id);
            let before: BTreeMap<ItemId, i64> =
                slots.items.values().map(|i| (i.id, i.order)).collect();

            reconcile(&mut slots, mover, Some(target));

            if target != 0 {
                prop_assert_eq!(slots.order_of(mover), target);
            } else {
                prop_assert_eq!(slots.order_of(mover), old);
            }

            match occupant {
                Some(other) if other != mover && target != 0 => {
                    prop_assert_eq!(slots.order_of(other), old);
                }
                _ => {}
            }

            // Nobody but the mover and the occupant changed.
            for (id, order) in &before {
                if *id != mover && Some(*id) != occupant {
                    prop_assert_eq!(slots.order_of(*id), *order);
                }
            }

            // Unique orders stay unique.
            let mut seen: Vec<i64> = slots.items.values().map(|i| i.order).collect();
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(seen.len(), len);
        }
    }
}
