//! engine::cascade
//!
//! Channel trees annotated with a per-node metric.
//!
//! # Algorithm
//!
//! 1. Group the channel summaries by parent, children sorted by
//!    `(taxis, id)`
//! 2. Walk depth-first from the root, parent before children, skipping any
//!    channel already visited (stored parent links may be cyclic)
//! 3. Invoke the metric function once per visited channel, in traversal
//!    order; with a concurrency above 1 up to that many calls are in flight
//!    and results are still consumed in traversal order
//! 4. Assemble the tree from the pre-order visits
//!
//! The metric function is never invoked for channels outside the subtree.
//!
//! # Example
//!
//! ```
//! use cascadework::core::model::ChannelSummary;
//! use cascadework::core::types::{ChannelId, SiteId};
//! use cascadework::engine::cascade::build_cascade;
//!
//! fn summary(id: u32, parent: Option<u32>, taxis: i32) -> ChannelSummary {
//!     ChannelSummary {
//!         id: ChannelId::new(id),
//!         site_id: SiteId::new(1),
//!         parent_id: parent.map(ChannelId::new),
//!         name: format!("c{}", id),
//!         taxis,
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let channels = vec![summary(1, None, 0), summary(2, Some(1), 2), summary(3, Some(1), 1)];
//! let tree = build_cascade(&channels[0], &channels, 1, |c: ChannelSummary| async move {
//!     Ok::<_, std::convert::Infallible>(c.id.get() * 10)
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(tree.node_count(), 3);
//! assert_eq!(tree.children[0].value, ChannelId::new(3));
//! assert_eq!(tree.children[1].metric, 20);
//! # });
//! ```

use std::collections::{HashMap, HashSet};
use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cancel::cancellable;
use super::{Caller, Engine, EngineError};
use crate::core::model::{ChannelSummary, Site};
use crate::core::types::ChannelId;

/// A channel paired with its metric and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cascade<T> {
    /// Channel id.
    pub value: ChannelId,
    /// Channel name.
    pub label: String,
    #[serde(flatten)]
    pub metric: T,
    pub children: Vec<Cascade<T>>,
}

impl<T> Cascade<T> {
    /// Number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Cascade::node_count).sum::<usize>()
    }

    /// Pre-order iteration (parent before children, children in order).
    pub fn iter(&self) -> impl Iterator<Item = &Cascade<T>> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Find a node by channel id.
    pub fn find(&self, id: ChannelId) -> Option<&Cascade<T>> {
        self.iter().find(|node| node.value == id)
    }
}

/// A channel reached by the traversal, with the number of children visited
/// directly below it.
struct Visit {
    summary: ChannelSummary,
    child_count: usize,
}

/// Build a cascade rooted at `root` over `channels`.
///
/// `concurrency` bounds the number of in-flight metric calls; values of 0
/// and 1 both mean sequential.
///
/// # Errors
///
/// The first metric error aborts the build and is returned as-is.
pub async fn build_cascade<T, E, F, Fut>(
    root: &ChannelSummary,
    channels: &[ChannelSummary],
    concurrency: usize,
    mut metric: F,
) -> Result<Cascade<T>, E>
where
    F: FnMut(ChannelSummary) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut children_of: HashMap<ChannelId, Vec<&ChannelSummary>> = HashMap::new();
    for channel in channels {
        if let Some(parent) = channel.parent_id {
            children_of.entry(parent).or_default().push(channel);
        }
    }
    for children in children_of.values_mut() {
        children.sort_by_key(|c| (c.taxis, c.id));
    }

    let mut seen = HashSet::from([root.id]);
    let mut visits = Vec::new();
    let root_children = visit_children(root.id, &children_of, &mut seen, &mut visits);

    let root_metric = metric(root.clone()).await?;

    let metrics: Vec<T> = if concurrency <= 1 {
        let mut metrics = Vec::with_capacity(visits.len());
        for visit in &visits {
            metrics.push(metric(visit.summary.clone()).await?);
        }
        metrics
    } else {
        stream::iter(visits.iter().map(|visit| metric(visit.summary.clone())))
            .buffered(concurrency)
            .try_collect()
            .await?
    };

    let mut entries = visits.into_iter().zip(metrics);
    Ok(Cascade {
        value: root.id,
        label: root.name.clone(),
        metric: root_metric,
        children: assemble(root_children, &mut entries),
    })
}

/// Record the pre-order visits below `parent`; returns how many direct
/// children were visited.
fn visit_children(
    parent: ChannelId,
    children_of: &HashMap<ChannelId, Vec<&ChannelSummary>>,
    seen: &mut HashSet<ChannelId>,
    visits: &mut Vec<Visit>,
) -> usize {
    let Some(children) = children_of.get(&parent) else {
        return 0;
    };

    let mut count = 0;
    for child in children {
        if !seen.insert(child.id) {
            continue;
        }
        let index = visits.len();
        visits.push(Visit {
            summary: (*child).clone(),
            child_count: 0,
        });
        visits[index].child_count = visit_children(child.id, children_of, seen, visits);
        count += 1;
    }
    count
}

/// Take `count` subtrees off the pre-order entry stream.
fn assemble<T, I>(count: usize, entries: &mut I) -> Vec<Cascade<T>>
where
    I: Iterator<Item = (Visit, T)>,
{
    let mut nodes = Vec::with_capacity(count);
    for _ in 0..count {
        let Some((visit, metric)) = entries.next() else {
            break;
        };
        let children = assemble(visit.child_count, entries);
        nodes.push(Cascade {
            value: visit.summary.id,
            label: visit.summary.name,
            metric,
            children,
        });
    }
    nodes
}

impl Engine {
    /// Build the cascade of a site's channel subtree.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the root channel does not exist or belongs to another
    ///   site
    /// - `Cancelled` if the caller cancels before the tree is complete
    /// - any error from the repositories or the metric function
    pub async fn cascade<T, E, F, Fut>(
        &self,
        caller: &Caller,
        site: &Site,
        root_id: ChannelId,
        metric: F,
    ) -> Result<Cascade<T>, EngineError>
    where
        F: FnMut(ChannelSummary) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        EngineError: From<E>,
    {
        let root = cancellable(&caller.cancel, self.services.channels.get_channel(root_id))
            .await??
            .filter(|channel| channel.site_id == site.id)
            .ok_or_else(|| EngineError::NotFound(format!("channel {}", root_id)))?;

        let channels = cancellable(
            &caller.cancel,
            self.services.channels.channel_tree(site, root.id),
        )
        .await??;

        let concurrency = self.settings.metric_concurrency;
        let tree = cancellable(
            &caller.cancel,
            build_cascade(&root.summary(), &channels, concurrency, metric),
        )
        .await?
        .map_err(EngineError::from)?;

        debug!(
            site_id = %site.id,
            root = %root.id,
            nodes = tree.node_count(),
            concurrency,
            "built cascade"
        );
        Ok(tree)
    }
}
