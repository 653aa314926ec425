//! Property-based tests for the cascade aggregator and check states.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated channel forests.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use cascadework::core::check::CheckState;
use cascadework::core::model::ChannelSummary;
use cascadework::core::types::{ChannelId, SiteId};
use cascadework::engine::cascade::{build_cascade, Cascade};

/// Channels `1..=n`; channel 1 is the root, every other channel hangs below
/// an earlier one, so the forest is acyclic.
fn tree_channels() -> impl Strategy<Value = Vec<ChannelSummary>> {
    prop::collection::vec((any::<u32>(), -3i32..4), 1..40).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (seed, taxis))| ChannelSummary {
                id: ChannelId::new(i as u32 + 1),
                site_id: SiteId::new(1),
                parent_id: (i > 0).then(|| ChannelId::new(seed % i as u32 + 1)),
                name: format!("c{}", i + 1),
                taxis,
            })
            .collect()
    })
}

/// Channels `1..=n` with arbitrary parent links, cycles included.
fn tangled_channels() -> impl Strategy<Value = Vec<ChannelSummary>> {
    prop::collection::vec((any::<u32>(), 0i32..3), 1..30).prop_map(|specs| {
        let n = specs.len() as u32;
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (seed, taxis))| ChannelSummary {
                id: ChannelId::new(i as u32 + 1),
                site_id: SiteId::new(1),
                parent_id: (i > 0).then(|| ChannelId::new(seed % n + 1)),
                name: format!("c{}", i + 1),
                taxis,
            })
            .collect()
    })
}

/// Channels reachable from channel 1 by following child links.
fn reachable(channels: &[ChannelSummary]) -> HashSet<ChannelId> {
    let root = ChannelId::new(1);
    let mut seen = HashSet::from([root]);
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        for child in channels.iter().filter(|c| c.parent_id == Some(id)) {
            if seen.insert(child.id) {
                stack.push(child.id);
            }
        }
    }
    seen
}

fn build(channels: &[ChannelSummary], concurrency: usize) -> (Cascade<u32>, Vec<ChannelId>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);
    let tree = tokio_test::block_on(build_cascade(
        &channels[0],
        channels,
        concurrency,
        move |c: ChannelSummary| {
            recorded.lock().unwrap().push(c.id);
            async move { Ok::<_, Infallible>(c.id.get()) }
        },
    ))
    .unwrap();
    let calls = calls.lock().unwrap().clone();
    (tree, calls)
}

proptest! {
    /// Every channel of a tree appears exactly once.
    #[test]
    fn node_count_equals_channel_count(channels in tree_channels()) {
        let (tree, calls) = build(&channels, 1);
        prop_assert_eq!(tree.node_count(), channels.len());

        let mut ids: Vec<ChannelId> = tree.iter().map(|n| n.value).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), channels.len());
        prop_assert_eq!(calls.len(), channels.len());
    }

    /// Siblings are ordered by display order, then id.
    #[test]
    fn children_follow_display_order(channels in tree_channels()) {
        let taxis: HashMap<ChannelId, i32> = channels.iter().map(|c| (c.id, c.taxis)).collect();
        let (tree, _) = build(&channels, 1);

        for node in tree.iter() {
            let keys: Vec<(i32, ChannelId)> =
                node.children.iter().map(|c| (taxis[&c.value], c.value)).collect();
            let mut sorted = keys.clone();
            sorted.sort();
            prop_assert_eq!(keys, sorted);
        }
    }

    /// Metrics are computed once per node, in pre-order.
    #[test]
    fn metric_runs_once_per_node_in_preorder(channels in tree_channels()) {
        let (tree, calls) = build(&channels, 1);
        let order: Vec<ChannelId> = tree.iter().map(|n| n.value).collect();
        prop_assert_eq!(calls, order);
        for node in tree.iter() {
            prop_assert_eq!(node.metric, node.value.get());
        }
    }

    /// Bounded parallelism does not change the result.
    #[test]
    fn parallel_build_matches_sequential(channels in tree_channels(), concurrency in 2usize..8) {
        let (sequential, _) = build(&channels, 1);
        let (parallel, calls) = build(&channels, concurrency);
        prop_assert_eq!(sequential, parallel);
        prop_assert_eq!(calls.len(), channels.len());
    }

    /// With arbitrary (possibly cyclic) parent links the cascade holds
    /// exactly the channels reachable from the root.
    #[test]
    fn cascade_holds_reachable_channels(channels in tangled_channels()) {
        let (tree, calls) = build(&channels, 1);
        let expected = reachable(&channels);

        let visited: HashSet<ChannelId> = tree.iter().map(|n| n.value).collect();
        prop_assert_eq!(tree.node_count(), expected.len());
        prop_assert_eq!(&visited, &expected);
        prop_assert_eq!(calls.len(), expected.len());
    }

    /// Checked content is always in the checked state; labels never panic.
    #[test]
    fn check_state_is_total(checked in any::<bool>(), level in -200i32..200, site_level in 1u8..=5) {
        let state = CheckState::from_level(checked, level, site_level);
        if checked {
            prop_assert_eq!(state, CheckState::Checked);
        }
        prop_assert!(!state.label().is_empty());
    }
}
