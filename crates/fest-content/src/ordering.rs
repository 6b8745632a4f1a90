//! Ordered-list editing.
//!
//! Every operation leaves the list with `order` values exactly `1..=N`
//! matching slice position.

use serde::{Deserialize, Serialize};

use fest_state::{Ordered, repack};

/// One-step move direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Append `item` at position N+1. It gets a fresh time-based id when it
/// has none or its id is already taken in `items`.
pub fn push<T: Ordered>(items: &mut Vec<T>, mut item: T) -> &T {
    if item.entry_id().is_empty() || position(items, item.entry_id()).is_some() {
        item.set_entry_id(fest_core::time_id());
    }
    items.push(item);
    repack(items);
    &items[items.len() - 1]
}

/// Remove the entry with `id`.
pub fn remove<T: Ordered>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let index = position(items, id)?;
    let removed = items.remove(index);
    repack(items);
    Some(removed)
}

/// Swap the entry with its neighbour. Returns `None` when `id` is unknown,
/// `Some(false)` when it already sits at that edge.
pub fn move_entry<T: Ordered>(items: &mut [T], id: &str, direction: Direction) -> Option<bool> {
    let index = position(items, id)?;
    let target = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < items.len() => index + 1,
        _ => return Some(false),
    };
    items.swap(index, target);
    repack(items);
    Some(true)
}

/// Drag-and-drop: take the entry at `from` and insert it at `to`
/// (0-based). Returns `false` if either index is out of range.
pub fn reorder<T: Ordered>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    repack(items);
    true
}

/// Replace the entry with `id` in place, keeping its id and position.
pub fn replace<'a, T: Ordered>(items: &'a mut [T], id: &str, mut item: T) -> Option<&'a T> {
    let index = position(items, id)?;
    item.set_entry_id(items[index].entry_id().to_string());
    item.set_order(items[index].order());
    items[index] = item;
    Some(&items[index])
}

fn position<T: Ordered>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.entry_id() == id)
}
