mod common;

use common::{keys, Checked};
use rb_bits::{Color, Error, RbSet};

#[test]
fn test_should_be_able_to_fill_tree() {
    common::check_scenario::<RbSet<i32>>();
}

#[test]
fn test_duplicates_are_ignored() {
    common::check_duplicates_are_ignored::<RbSet<i32>>();
}

#[test]
fn test_random_inserts_keep_invariants() {
    common::check_random_inserts::<RbSet<i32>>();
}

#[test]
fn test_sorted_input_stays_balanced() {
    common::check_sorted_input_stays_balanced::<RbSet<i32>>();
}

#[test]
fn test_empty_set() {
    let set = RbSet::<i32>::new();
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
    assert_eq!(set.iter().next(), None);
    assert!(!set.contains(&3));
    assert_eq!(set.root_color(), None);
    assert_eq!(set.check().height, 0);
}

#[test]
fn test_single_key_root_is_black() {
    let mut set = RbSet::new();
    assert_eq!(set.insert(42), Ok(true));
    assert_eq!(set.len(), 1);
    assert_eq!(set.root_color(), Some(Color::Black));
    let report = set.check();
    assert_eq!(report.height, 1);
    assert_eq!(report.black_height, 1);
}

#[test]
fn test_ascending_triple_rotates_once() {
    let mut set = RbSet::new();
    for k in [10, 20, 30] {
        set.insert(k).unwrap();
    }
    assert_eq!(set.rotations(), 1);
    let report = set.check();
    assert_eq!(report.height, 2);
    assert_eq!(report.black_height, 1);
    assert_eq!(set.root_color(), Some(Color::Black));
    assert_eq!(format!("{:?}", set), "{10, 20, 30}");
}

#[test]
fn test_red_uncle_only_recolors() {
    let mut set = RbSet::new();
    for k in [20, 10, 30] {
        set.insert(k).unwrap();
    }
    assert_eq!(set.rotations(), 0);
    set.insert(5).unwrap();
    assert_eq!(set.rotations(), 0);
    // 10 and 30 went black, the root stays black.
    assert_eq!(set.check().black_height, 2);
}

#[test]
fn test_inner_grandchild_rotates_twice() {
    let mut set = RbSet::new();
    for k in [30, 10, 20] {
        set.insert(k).unwrap();
    }
    assert_eq!(set.rotations(), 2);
    assert_eq!(set.check().height, 2);
    assert_eq!(keys(&set), vec![10, 20, 30]);
}

#[test]
fn test_contains_survives_later_inserts() {
    let mut set = RbSet::new();
    set.insert(7).unwrap();
    for k in (100..400).rev() {
        set.insert(k).unwrap();
        assert!(set.contains(&7));
    }
    assert!(!set.contains(&8));
}

#[test]
fn test_iter_is_restartable() {
    let mut set = RbSet::new();
    for k in [5, 3, 8, 1, 4] {
        set.insert(k).unwrap();
    }
    let iter = set.iter();
    assert_eq!(iter.len(), 5);
    let first: Vec<_> = iter.clone().collect();
    let second: Vec<_> = (&set).into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(first, vec![&1, &3, &4, &5, &8]);

    let mut iter = set.iter();
    iter.by_ref().for_each(drop);
    assert_eq!(iter.next(), None);
}

#[test]
fn test_nan_is_rejected() {
    let mut set = RbSet::new();
    set.insert(1.5).unwrap();
    set.insert(-2.0).unwrap();
    assert_eq!(set.insert(f64::NAN), Err(Error::Incomparable));
    assert_eq!(set.len(), 2);
    assert!(!set.contains(&f64::NAN));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![-2.0, 1.5]);
    assert!(set.verify().is_ok());
}

#[test]
fn test_owned_keys_are_dropped() {
    use std::rc::Rc;

    let marker = Rc::new(());
    {
        let mut set = RbSet::new();
        for i in 0..100 {
            set.insert((i, Rc::clone(&marker))).unwrap();
        }
        assert_eq!(Rc::strong_count(&marker), 101);
    }
    assert_eq!(Rc::strong_count(&marker), 1);
}

#[test]
fn test_iter_crosses_threads() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let mut set = RbSet::new();
    for k in 0..64 {
        set.insert(k).unwrap();
    }
    let iter = set.iter();
    assert_send_sync(&iter);
    let sum = std::thread::scope(|s| s.spawn(move || iter.sum::<i32>()).join().unwrap());
    assert_eq!(sum, (0..64).sum());
}
