#![allow(dead_code)]

use rb_bits::{verify::Report, OrderedSet, RbSet};
#[cfg(feature = "llrb")]
use rb_bits::LlrbSet;

pub const SCENARIO: [i32; 10] = [1, 10, 22, 31, 29, 18, 71, 44, 45, 60];
pub const SECOND_SCENARIO: [i32; 10] = [1, 2, 10, 11, 7, 3, 4, 5, 9, 12];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Sets whose structure can be checked from the outside.
pub trait Checked: OrderedSet<i32> + Default {
    fn check(&self) -> Report;
}

impl Checked for RbSet<i32> {
    fn check(&self) -> Report {
        match self.verify() {
            Ok(report) => report,
            Err(v) => panic!("broken tree {:?}: {v}", self),
        }
    }
}

#[cfg(feature = "llrb")]
impl Checked for LlrbSet<i32> {
    fn check(&self) -> Report {
        match self.verify() {
            Ok(report) => report,
            Err(v) => panic!("broken tree {:?}: {v}", self),
        }
    }
}

pub fn keys<S: Checked>(set: &S) -> Vec<i32> {
    set.iter().copied().collect()
}

/// Inserts `input` one key at a time, checking the tree after every step.
pub fn fill_checked<S: Checked>(input: &[i32]) -> S {
    let mut set = S::default();
    for &k in input {
        set.insert(k).expect("insert");
        let report = set.check();
        assert!(keys(&set).windows(2).all(|w| w[0] < w[1]));
        assert!(set.contains(&k));
        assert_eq!(report.len, set.len());
        assert!(height_within_bound(report));
    }
    set
}

pub fn height_within_bound(report: Report) -> bool {
    report.len == 0 || report.height as f64 <= 2.0 * ((report.len + 1) as f64).log2()
}

pub fn check_scenario<S: Checked>() {
    init_logger();
    let set: S = fill_checked(&SCENARIO);
    assert_eq!(keys(&set), vec![1, 10, 18, 22, 29, 31, 44, 45, 60, 71]);
    assert_eq!(set.len(), 10);

    let set: S = fill_checked(&SECOND_SCENARIO);
    assert_eq!(keys(&set), vec![1, 2, 3, 4, 5, 7, 9, 10, 11, 12]);
}

pub fn check_duplicates_are_ignored<S: Checked>() {
    init_logger();
    let mut set: S = fill_checked(&SCENARIO);
    let before = keys(&set);
    for k in SCENARIO {
        assert_eq!(set.insert(k), Ok(false));
    }
    assert_eq!(keys(&set), before);
    assert_eq!(set.len(), SCENARIO.len());
    set.check();
}

pub fn check_random_inserts<S: Checked>() {
    use rand::{seq::SliceRandom, thread_rng, Rng};

    init_logger();
    let mut rng = thread_rng();
    let mut input: Vec<i32> = (0..2000).collect();
    input.shuffle(&mut rng);
    let set: S = fill_checked(&input);
    assert_eq!(keys(&set), (0..2000).collect::<Vec<_>>());

    // Small key range so plenty of duplicates show up.
    let input: Vec<i32> = (0..3000).map(|_| rng.gen_range(-500..500)).collect();
    let set: S = fill_checked(&input);
    let mut expected = input.clone();
    expected.sort();
    expected.dedup();
    assert_eq!(keys(&set), expected);
    for k in &input {
        assert!(set.contains(k));
    }
    assert!(!set.contains(&500));
}

pub fn check_sorted_input_stays_balanced<S: Checked>() {
    init_logger();
    let ascending: Vec<i32> = (0..4096).collect();
    let set: S = fill_checked(&ascending);
    let report = set.check();
    assert!(height_within_bound(report));

    let descending: Vec<i32> = (0..4096).rev().collect();
    let set: S = fill_checked(&descending);
    assert_eq!(keys(&set), ascending);
}
