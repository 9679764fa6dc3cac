//! Parent-before-child evaluation order.

use std::collections::VecDeque;

/// Breadth-first topological order over a forest given as parent indices.
///
/// Siblings keep their declaration order. Returns `Err(index)` naming a body
/// that can never be reached from a root: one on or below a cycle, or one
/// whose parent index is out of range.
pub fn parent_first_order(parents: &[Option<usize>]) -> Result<Vec<usize>, usize> {
    let mut children = vec![Vec::new(); parents.len()];
    let mut ready = VecDeque::new();

    for (index, parent) in parents.iter().enumerate() {
        match *parent {
            Some(parent) if parent < parents.len() => children[parent].push(index),
            Some(_) => return Err(index),
            None => ready.push_back(index),
        }
    }

    let mut order = Vec::with_capacity(parents.len());
    while let Some(index) = ready.pop_front() {
        order.push(index);
        ready.extend(children[index].iter().copied());
    }

    if order.len() == parents.len() {
        return Ok(order);
    }

    let mut placed = vec![false; parents.len()];
    for &index in &order {
        placed[index] = true;
    }
    // A non-empty remainder always exists here.
    Err(placed.iter().position(|&p| !p).unwrap_or_default())
}
