//! ui::output
//!
//! Terminal output for `cw`.
//!
//! Records print one per line with tab-separated fields so they can be piped
//! into `cut` or `awk`. `--quiet` silences records and warnings, never
//! errors. With `--json` the command prints one pretty JSON document on
//! stdout instead. Diagnostics go through `tracing` on stderr.

use std::fmt::Display;

use serde::Serialize;

use crate::engine::Cascade;

/// Whether records and warnings are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
}

impl Verbosity {
    pub fn from_quiet(quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a line unless quiet.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Normal {
        println!("{}", message);
    }
}

/// Print an error to stderr, even when quiet.
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning to stderr unless quiet.
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Normal {
        eprintln!("warning: {}", message);
    }
}

/// Print a value as pretty JSON, even when quiet.
pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Join record fields with tabs. Tabs and newlines inside a field become
/// spaces so each record stays on one line.
pub fn row(fields: &[&dyn Display]) -> String {
    fields
        .iter()
        .map(|field| field.to_string().replace(['\t', '\n', '\r'], " "))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Render a cascade as an indented outline, one node per line.
///
/// ```text
/// 首页 [1] 0
///   新闻 [2] 2
///     国际 [5] 0
/// ```
pub fn format_cascade<T>(tree: &Cascade<T>, metric: impl Fn(&T) -> String) -> String {
    let mut lines = Vec::with_capacity(tree.node_count());
    push_node(tree, 0, &metric, &mut lines);
    lines.join("\n")
}

fn push_node<T>(
    node: &Cascade<T>,
    depth: usize,
    metric: &impl Fn(&T) -> String,
    lines: &mut Vec<String>,
) {
    lines.push(format!(
        "{}{} [{}] {}",
        "  ".repeat(depth),
        node.label,
        node.value,
        metric(&node.metric)
    ));
    for child in &node.children {
        push_node(child, depth + 1, metric, lines);
    }
}
