//! Integration tests for Bitset
//!
//! Tests the set algebra used by presence masks and exploration worksets.

use beanstalk_foundation::Bitset;

// =============================================================================
// Worklist Use
// =============================================================================

#[test]
fn drain_by_pop_is_ascending() {
    let mut set: Bitset = [130, 2, 64, 7].into_iter().collect();
    let mut drained = Vec::new();
    while let Some(member) = set.pop() {
        drained.push(member);
    }
    assert_eq!(drained, [2, 7, 64, 130]);
    assert!(set.is_empty());
}

#[test]
fn frontier_minus_visited() {
    let visited: Bitset = [0, 1, 2].into_iter().collect();
    let mut frontier: Bitset = [2, 3, 4].into_iter().collect();
    frontier.difference_with(&visited);
    assert_eq!(frontier.elems(), [3, 4]);
    assert!(frontier.is_disjoint(&visited));
}

#[test]
fn extend_and_iterate_by_reference() {
    let mut set = Bitset::with_capacity(256);
    set.extend([5, 200]);
    let members: Vec<u32> = (&set).into_iter().collect();
    assert_eq!(members, [5, 200]);
    assert_eq!(set.first(), Some(5));
}

// =============================================================================
// Algebra
// =============================================================================

#[test]
fn union_intersect_difference() {
    let a: Bitset = [1, 2, 3, 100].into_iter().collect();
    let b: Bitset = [3, 4, 100].into_iter().collect();
    assert_eq!(a.union(&b).elems(), [1, 2, 3, 4, 100]);
    assert_eq!(a.intersect(&b).elems(), [3, 100]);
    assert_eq!(a.difference(&b).elems(), [1, 2]);

    let mut c = a.clone();
    c.intersect_with(&b);
    assert!(c.is_subset(&a));
    assert!(c.is_subset(&b));
}

#[test]
fn complement_stays_inside_the_universe() {
    let set: Bitset = [0, 3].into_iter().collect();
    assert_eq!(set.complement(5).elems(), [1, 2, 4]);
    assert!(Bitset::new().complement(0).is_empty());
}

#[test]
fn cleared_sets_equal_new_ones() {
    let mut set: Bitset = [500].into_iter().collect();
    set.clear();
    assert_eq!(set, Bitset::new());
    assert_eq!(set.len(), 0);
}
