//! Row-level differences between two history list snapshots.
//!
//! Rows are matched by [`DataItem::id`]. A matched pair whose contents differ
//! is a change; matched rows that fell out of relative order are moves. Rows
//! that keep their relative order are chosen as the longest increasing run of
//! new positions, so a single reordering costs a single move.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::DataItem;

/// One edit. Indices refer to positions in the old and new lists, not to a
/// list being edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Edit {
    Remove { old_index: usize },
    Insert { new_index: usize },
    Move { old_index: usize, new_index: usize },
    Change { old_index: usize, new_index: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    edits: Vec<Edit>,
}

impl DiffResult {
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }
}

/// Removes come first in old order, then inserts in new order, then moves
/// and changes in old order. Ids are expected to be unique within a list.
pub fn diff(old: &[DataItem], new: &[DataItem]) -> DiffResult {
    let new_positions: HashMap<i64, usize> = new
        .iter()
        .enumerate()
        .map(|(index, item)| (item.id(), index))
        .collect();
    let old_ids: HashSet<i64> = old.iter().map(DataItem::id).collect();

    let mut edits = Vec::new();
    let mut survivors = Vec::new();

    for (old_index, item) in old.iter().enumerate() {
        match new_positions.get(&item.id()) {
            Some(&new_index) => survivors.push((old_index, new_index)),
            None => edits.push(Edit::Remove { old_index }),
        }
    }

    for (new_index, item) in new.iter().enumerate() {
        if !old_ids.contains(&item.id()) {
            edits.push(Edit::Insert { new_index });
        }
    }

    let new_order: Vec<usize> = survivors.iter().map(|&(_, new_index)| new_index).collect();
    let in_place = longest_increasing_run(&new_order);

    for (&(old_index, new_index), stays) in survivors.iter().zip(in_place) {
        if !stays {
            edits.push(Edit::Move {
                old_index,
                new_index,
            });
        }
        if old[old_index] != new[new_index] {
            edits.push(Edit::Change {
                old_index,
                new_index,
            });
        }
    }

    DiffResult { edits }
}

/// Marks the members of one longest strictly increasing subsequence.
fn longest_increasing_run(values: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];

    for (index, &value) in values.iter().enumerate() {
        let slot = tails.partition_point(|&tail| values[tail] < value);
        if slot > 0 {
            previous[index] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(index);
        } else {
            tails[slot] = index;
        }
    }

    let mut members = vec![false; values.len()];
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        members[index] = true;
        cursor = previous[index];
    }
    members
}
