//! Property-based testing for the probe sequence generator
//!
//! Uses proptest to check normalization, chaining membership, open-addressing
//! search/insert agreement and the equivalence of staged and direct execution.

use proptest::prelude::*;
use std::collections::HashSet;

use hashviz::hash_map::{
    generate, normalize, Action, HashFunction, HashPair, Key, Mode, Operation, ProbeContext,
    SearchTermination, TableState,
};
use hashviz::{ManualClock, NullSink, Visualizer, VisualizerConfig};

// =============================================================================
// PROPERTY TEST GENERATORS
// =============================================================================

fn table_size_strategy() -> impl Strategy<Value = usize> {
    3usize..32
}

fn keys_strategy(max_len: usize) -> impl Strategy<Value = Vec<Key>> {
    prop::collection::vec(-1000i64..1000, 0..max_len)
}

fn distinct_keys_strategy(max_len: usize) -> impl Strategy<Value = Vec<Key>> {
    prop::collection::hash_set(-1000i64..1000, 0..max_len)
        .prop_map(|set| set.into_iter().collect())
}

fn open_mode_strategy() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Linear), Just(Mode::Quad), Just(Mode::Double)]
}

fn any_mode_strategy() -> impl Strategy<Value = Mode> {
    prop_oneof![
        Just(Mode::Chain),
        Just(Mode::Linear),
        Just(Mode::Quad),
        Just(Mode::Double)
    ]
}

fn insert_all(state: &mut TableState, mode: Mode, hashes: &HashPair, keys: &[Key]) -> Vec<Action> {
    let mut all = Vec::new();
    for &key in keys {
        let actions = state
            .execute(Operation::Insert, key, mode, hashes, SearchTermination::FullScan)
            .unwrap();
        all.extend(actions);
    }
    all
}

fn probe_indices(actions: &[Action]) -> Vec<usize> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Probe { idx, .. } => Some(*idx),
            _ => None,
        })
        .collect()
}

// =============================================================================
// NORMALIZATION
// =============================================================================

proptest! {
    #[test]
    fn prop_normalize_in_range(raw in any::<f64>(), m in table_size_strategy()) {
        prop_assert!(normalize(raw, m) < m);
    }

    #[test]
    fn prop_normalize_matches_euclidean_remainder(r in -1_000_000i64..1_000_000, m in table_size_strategy()) {
        prop_assert_eq!(normalize(r as f64, m), r.rem_euclid(m as i64) as usize);
    }
}

// =============================================================================
// SEPARATE CHAINING
// =============================================================================

proptest! {
    #[test]
    fn prop_chain_membership_equals_inserted_multiset(
        keys in keys_strategy(64),
        m in table_size_strategy()
    ) {
        let mut state = TableState::new(m).unwrap();
        let hashes = HashPair::default();
        let actions = insert_all(&mut state, Mode::Chain, &hashes, &keys);

        let any_failed = actions.iter().any(|a| matches!(a, Action::Fail { .. }));
        prop_assert!(!any_failed);

        let mut stored: Vec<Key> = (0..m)
            .flat_map(|idx| state.bucket(idx).unwrap().to_vec())
            .collect();
        let mut expected = keys.clone();
        stored.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(stored, expected);

        for &key in &keys {
            let home = normalize(key as f64 % m as f64, m);
            prop_assert!(state.bucket(home).unwrap().contains(&key));
        }
    }
}

// =============================================================================
// OPEN ADDRESSING
// =============================================================================

proptest! {
    #[test]
    fn prop_search_finds_every_placed_key(
        keys in distinct_keys_strategy(40),
        m in table_size_strategy(),
        mode in open_mode_strategy()
    ) {
        let mut state = TableState::new(m).unwrap();
        let hashes = HashPair::default();
        let mut placements = Vec::new();
        for &key in &keys {
            let actions = state
                .execute(Operation::Insert, key, mode, &hashes, SearchTermination::FullScan)
                .unwrap();
            if let Some(Action::Place { idx, .. }) = actions.last() {
                placements.push((key, *idx, probe_indices(&actions)));
            }
        }

        let ctx = ProbeContext::new(&state, &hashes);
        for (key, idx, insert_probes) in placements {
            prop_assert_eq!(state.slot(mode, idx).unwrap().and_then(|s| s.key()), Some(key));

            let search = generate(Operation::Search, key, mode, &ctx);
            prop_assert_eq!(search.last(), Some(&Action::SearchFound { idx, key }));
            // Nothing is deleted, so the search retraces the insertion
            prop_assert_eq!(probe_indices(&search), insert_probes);
        }
    }

    #[test]
    fn prop_failed_insert_leaves_table_unchanged(
        keys in keys_strategy(60),
        m in table_size_strategy(),
        mode in open_mode_strategy()
    ) {
        let mut state = TableState::new(m).unwrap();
        let hashes = HashPair::default();
        for &key in &keys {
            let before = state.clone();
            let actions = state
                .execute(Operation::Insert, key, mode, &hashes, SearchTermination::FullScan)
                .unwrap();
            let fails = actions.iter().filter(|a| matches!(a, Action::Fail { .. })).count();
            if fails > 0 {
                prop_assert_eq!(fails, 1);
                prop_assert_eq!(probe_indices(&actions).len(), m);
                prop_assert_eq!(&state, &before);
            } else {
                prop_assert_eq!(state.len(mode), before.len(mode) + 1);
            }
        }
    }

    #[test]
    fn prop_delete_then_search_misses(
        keys in distinct_keys_strategy(20),
        m in 20usize..32,
        mode in open_mode_strategy(),
        pick in any::<prop::sample::Index>()
    ) {
        prop_assume!(!keys.is_empty());
        let mut state = TableState::new(m).unwrap();
        let hashes = HashPair::default();
        insert_all(&mut state, mode, &hashes, &keys);

        let victim = keys[pick.index(keys.len())];
        let present = state.len(mode);
        let actions = state
            .execute(Operation::Delete, victim, mode, &hashes, SearchTermination::FullScan)
            .unwrap();

        if let Some(Action::DeletePlace { .. }) = actions.last() {
            prop_assert_eq!(state.len(mode), present - 1);
            let ctx = ProbeContext::new(&state, &hashes);
            let search = generate(Operation::Search, victim, mode, &ctx);
            prop_assert_eq!(search.last(), Some(&Action::SearchNotFound { key: victim, idx: None }));
        } else {
            // Quadratic probing may have failed to place the key in the first place
            prop_assert_eq!(state.len(mode), present);
        }
    }

    #[test]
    fn prop_zero_step_double_matches_linear(
        keys in keys_strategy(30),
        m in table_size_strategy()
    ) {
        let hashes = HashPair {
            primary: HashFunction::default_primary(),
            secondary: HashFunction::from_fn("0", |_, _| 0.0),
        };
        let mut linear = TableState::new(m).unwrap();
        let mut double = TableState::new(m).unwrap();
        let a = insert_all(&mut linear, Mode::Linear, &hashes, &keys);
        let b = insert_all(&mut double, Mode::Double, &hashes, &keys);

        prop_assert_eq!(probe_indices(&a), probe_indices(&b));
        prop_assert_eq!(linear.slots(Mode::Linear), double.slots(Mode::Double));
    }
}

// =============================================================================
// GENERATION AND PLAYBACK
// =============================================================================

proptest! {
    #[test]
    fn prop_generation_is_pure(
        keys in keys_strategy(20),
        probe_key in -1000i64..1000,
        m in table_size_strategy(),
        mode in any_mode_strategy()
    ) {
        let mut state = TableState::new(m).unwrap();
        let hashes = HashPair::default();
        insert_all(&mut state, mode, &hashes, &keys);
        let before = state.clone();

        let ctx = ProbeContext::new(&state, &hashes);
        for op in [Operation::Insert, Operation::Search, Operation::Delete] {
            let first = generate(op, probe_key, mode, &ctx);
            let second = generate(op, probe_key, mode, &ctx);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.last().map_or(false, Action::is_terminal));
            prop_assert_eq!(first.iter().filter(|a| a.is_terminal()).count(), 1);
        }
        prop_assert_eq!(&state, &before);
    }

    #[test]
    fn prop_staged_playback_matches_direct_execution(
        keys in keys_strategy(30),
        m in table_size_strategy(),
        mode in any_mode_strategy()
    ) {
        prop_assume!(!keys.is_empty());
        let config = VisualizerConfig::builder().table_size(m).build().unwrap();
        let mut viz = Visualizer::with_parts(config, ManualClock::new(), NullSink).unwrap();
        let queued = viz.request_insert(&keys, mode).unwrap();
        prop_assert_eq!(viz.drain().unwrap(), queued);

        let mut direct = TableState::new(m).unwrap();
        let direct_actions = insert_all(&mut direct, mode, &HashPair::default(), &keys);

        prop_assert_eq!(queued, direct_actions.len());
        prop_assert_eq!(viz.table(), &direct);
    }
}

#[test]
fn test_distinct_strategy_is_distinct() {
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    let mut runner = TestRunner::default();
    let keys = distinct_keys_strategy(40)
        .new_tree(&mut runner)
        .unwrap()
        .current();
    let unique: HashSet<Key> = keys.iter().copied().collect();
    assert_eq!(unique.len(), keys.len());
}
