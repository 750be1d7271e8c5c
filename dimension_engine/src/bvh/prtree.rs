//! Bulk-loaded Priority R-tree construction.
//!
//! Leaves are sorted along the six extreme dimensions. A pseudo-PR-tree
//! recursion then repeatedly peels off *priority leaves* (nodes of fanout
//! [`PRTREE_B`] holding the most extreme rectangles in each dimension) and
//! median-splits what remains, rebuilding the other five sort orders with a
//! stable scan. Each pass turns the current leaf list into a shorter list of
//! priority leaves; repeating until one node remains yields the root.

use crate::concurrent::threads::{execute_concurrently, hardware_concurrency};
use crate::core::error::fatal_error;
use crate::shared::aabb::Aabb;
use itertools::Itertools;
use static_assertions::const_assert;
use std::cmp::Ordering;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Number of children per PR-node
pub(crate) const PRTREE_B: usize = 8;
/// Number of priority leaves per pseudo-PR-node (twice the dimensions)
const PSEUDO_B: usize = 6;
const_assert!(PRTREE_B >= 2);
/// Sort the six dimensions on separate threads above this many leaves
const PARALLEL_SORT_THRESHOLD: usize = 1024;

/// The side of a split that a node ended up on
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Location {
    /// Consumed into a priority leaf
    PriorityLeaf,
    Left,
    Right,
}

/// A node of the tree under construction
#[derive(Clone, Debug)]
pub(crate) struct BuildNode {
    pub aabb: Aabb,
    /// Index of the referenced object, for leaf nodes
    pub object: Option<u32>,
    pub children: Vec<u32>,
    location: Location,
}

impl BuildNode {
    pub(crate) fn leaf(aabb: Aabb, object: u32) -> Self {
        Self {
            aabb,
            object: Some(object),
            children: Vec::new(),
            location: Location::Left, // mustn't start as PriorityLeaf
        }
    }

    /// An interior node collecting every given child under one root
    pub(crate) fn interior(nodes: &[BuildNode], children: Vec<u32>) -> Self {
        let mut aabb = nodes[children[0] as usize].aabb;
        for &child in &children[1..] {
            aabb = Aabb::encompass(&aabb, &nodes[child as usize].aabb);
        }
        Self {
            aabb,
            object: None,
            children,
            location: Location::Left,
        }
    }
}

/// The six extreme dimensions, in round-robin splitting order
#[derive(Copy, Clone, Debug, EnumIter)]
enum Extreme {
    XMin,
    YMin,
    ZMin,
    XMax,
    YMax,
    ZMax,
}

impl Extreme {
    /// Minima sort ascending, maxima descending, so the most extreme
    /// rectangles always sort first
    fn compare(self, a: &Aabb, b: &Aabb) -> Ordering {
        match self {
            Self::XMin => a.min().x.total_cmp(&b.min().x),
            Self::YMin => a.min().y.total_cmp(&b.min().y),
            Self::ZMin => a.min().z.total_cmp(&b.min().z),
            Self::XMax => b.max().x.total_cmp(&a.max().x),
            Self::YMax => b.max().y.total_cmp(&a.max().y),
            Self::ZMax => b.max().z.total_cmp(&a.max().z),
        }
    }
}

fn sort_leaf_list(nodes: &[BuildNode], mut leaves: Vec<u32>, extreme: Extreme) -> Vec<u32> {
    leaves.sort_unstable_by(|&l, &r| {
        extreme.compare(&nodes[l as usize].aabb, &nodes[r as usize].aabb)
    });
    leaves
}

/// Builds the PR-tree over the given leaf nodes, returning the root index.
/// `nodes` gains the interior nodes as a side effect.
pub(crate) fn build(nodes: &mut Vec<BuildNode>, initial_leaves: Vec<u32>) -> u32 {
    let nthreads = usize::min(hardware_concurrency(), PSEUDO_B);

    let mut leaves = initial_leaves;
    while leaves.len() > 1 {
        leaves = priority_leaves(nodes, &leaves, nthreads);
    }
    leaves[0]
}

/// Constructs an implicit pseudo-PR-tree over `leaves` and returns its
/// priority leaves, which form the next level up
fn priority_leaves(nodes: &mut Vec<BuildNode>, leaves: &[u32], nthreads: usize) -> Vec<u32> {
    let nleaves = leaves.len();

    let mut lists: Vec<Vec<u32>> = if nleaves >= PARALLEL_SORT_THRESHOLD && nthreads > 1 {
        let shared: &[BuildNode] = nodes;
        let tasks = Extreme::iter()
            .map(|extreme| {
                let leaves = leaves.to_vec();
                move |_thread: usize, _nthreads: usize| Ok(sort_leaf_list(shared, leaves, extreme))
            })
            .collect_vec();
        match execute_concurrently(None, tasks) {
            Ok(lists) => lists,
            Err(_) => fatal_error("couldn't sort PR-tree leaves"),
        }
    } else {
        Extreme::iter()
            .map(|extreme| sort_leaf_list(nodes, leaves.to_vec(), extreme))
            .collect()
    };

    let mut buffer = Vec::with_capacity(nleaves / 2);
    let mut new_leaves = Vec::new();
    priority_leaves_recursive(nodes, &mut lists, 0, nleaves, &mut buffer, &mut new_leaves, 0);
    new_leaves
}

fn priority_leaves_recursive(
    nodes: &mut Vec<BuildNode>,
    lists: &mut [Vec<u32>],
    lo: usize,
    len: usize,
    buffer: &mut Vec<u32>,
    new_leaves: &mut Vec<u32>,
    comparator: usize,
) {
    add_priority_leaves(nodes, lists, lo, len, new_leaves);

    let (left_len, right_len) = split_sorted_leaves(nodes, lists, lo, len, buffer, comparator);

    let next = (comparator + 1) % PSEUDO_B;
    if left_len > 0 {
        priority_leaves_recursive(nodes, lists, lo, left_len, buffer, new_leaves, next);
    }
    if right_len > 0 {
        priority_leaves_recursive(nodes, lists, lo + left_len, right_len, buffer, new_leaves, next);
    }
}

/// Peels up to [`PRTREE_B`] unconsumed extremes off each of the six sorted
/// lists into new priority leaves
fn add_priority_leaves(
    nodes: &mut Vec<BuildNode>,
    lists: &[Vec<u32>],
    lo: usize,
    len: usize,
    new_leaves: &mut Vec<u32>,
) {
    for list in lists {
        let mut leaf: Option<u32> = None;
        for &candidate in &list[lo..lo + len] {
            if leaf.is_some_and(|l| nodes[l as usize].children.len() >= PRTREE_B) {
                break;
            }
            // Skip nodes consumed by a previous pass
            if nodes[candidate as usize].location == Location::PriorityLeaf {
                continue;
            }

            let leaf_index = *leaf.get_or_insert_with(|| {
                nodes.push(BuildNode {
                    aabb: Aabb::ZERO,
                    object: None,
                    children: Vec::with_capacity(PRTREE_B),
                    location: Location::Left, // mustn't be PriorityLeaf
                });
                (nodes.len() - 1) as u32
            });

            nodes[candidate as usize].location = Location::PriorityLeaf;
            let child_aabb = nodes[candidate as usize].aabb;
            let parent = &mut nodes[leaf_index as usize];
            parent.aabb = if parent.children.is_empty() {
                child_aabb
            } else {
                Aabb::encompass(&parent.aabb, &child_aabb)
            };
            parent.children.push(candidate);
        }

        match leaf {
            Some(leaf) => new_leaves.push(leaf),
            // All leaves are consumed; the remaining lists have nothing left
            None => return,
        }
    }
}

/// Splits the sorted lists into the left and right subtrees, dropping the
/// entries consumed into priority leaves. Returns the two side lengths.
fn split_sorted_leaves(
    nodes: &mut [BuildNode],
    lists: &mut [Vec<u32>],
    lo: usize,
    len: usize,
    buffer: &mut Vec<u32>,
    comparator: usize,
) -> (usize, usize) {
    // Median-split the comparator's own list: compact the survivors, then
    // mark each half
    let (left_len, right_len) = {
        let list = &mut lists[comparator];
        let mut skip = 0;
        for j in lo..lo + len {
            let index = list[j];
            if nodes[index as usize].location == Location::PriorityLeaf {
                skip += 1;
            } else {
                list[j - skip] = index;
            }
        }
        let size = len - skip;

        let left_len = (size + 1) / 2;
        for &index in &list[lo..lo + left_len] {
            nodes[index as usize].location = Location::Left;
        }
        for &index in &list[lo + left_len..lo + size] {
            nodes[index as usize].location = Location::Right;
        }
        (left_len, size - left_len)
    };

    // Stable-partition the other five lists to match, preserving their sort
    // order on both sides
    for (j, list) in lists.iter_mut().enumerate() {
        if j == comparator {
            continue;
        }

        buffer.clear();
        let mut skip = 0;
        for k in lo..lo + len {
            let index = list[k];
            match nodes[index as usize].location {
                Location::Left => list[k - skip] = index,
                Location::PriorityLeaf => skip += 1,
                Location::Right => {
                    buffer.push(index);
                    skip += 1;
                }
            }
        }

        let left_size = len - skip;
        debug_assert_eq!(left_size, left_len);
        for (offset, &index) in buffer.iter().enumerate() {
            list[lo + left_size + offset] = index;
        }
    }

    (left_len, right_len)
}
