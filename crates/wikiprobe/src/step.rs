//! Step reporting for composite page-object actions.
//!
//! [`step`] wraps an action future so that its run is recorded as a named,
//! nested step on the page's [`StepReporter`] and inside a `tracing` span.
//! The wrapped future's value and error come back untouched.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use tracing::Instrument;

use crate::handle::PageHandle;

/// Final state of a recorded step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step future has not completed (still running or dropped)
    Running,
    /// The step returned `Ok`
    Passed,
    /// The step returned `Err`; carries the error's display text
    Failed(String),
}

/// A recorded step and its nested children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step name, `Type.method`
    pub name: String,
    /// Nesting depth (0 = top level)
    pub depth: usize,
    /// Start offset from reporter creation
    pub started_at_ms: u64,
    /// Step duration
    pub duration_ms: u64,
    /// Outcome
    pub outcome: StepOutcome,
    /// Steps started while this one was open
    pub children: Vec<StepRecord>,
}

impl StepRecord {
    /// Whether this step or any descendant failed
    #[must_use]
    pub fn has_failure(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed(_))
            || self.children.iter().any(StepRecord::has_failure)
    }
}

#[derive(Debug)]
struct StepNode {
    name: String,
    depth: usize,
    parent: Option<usize>,
    started_at_ms: u64,
    duration_ms: u64,
    outcome: StepOutcome,
}

#[derive(Debug)]
struct StepLog {
    origin: Instant,
    nodes: Vec<StepNode>,
    open: Vec<usize>,
}

/// Handle for a step in progress
#[derive(Debug)]
#[must_use]
pub struct StepToken {
    index: usize,
    depth: usize,
}

impl StepToken {
    /// Nesting depth of the step
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}

/// Shared sink collecting the step hierarchy of one page handle.
///
/// Nesting follows the currently open step, so one reporter serves one
/// sequential flow of actions.
#[derive(Debug, Clone)]
pub struct StepReporter {
    log: Arc<Mutex<StepLog>>,
}

impl Default for StepReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl StepReporter {
    /// Create an empty reporter
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(StepLog {
                origin: Instant::now(),
                nodes: Vec::new(),
                open: Vec::new(),
            })),
        }
    }

    fn log(&self) -> MutexGuard<'_, StepLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a step nested under the current one
    pub fn begin(&self, name: &str) -> StepToken {
        let mut log = self.log();
        let parent = log.open.last().copied();
        let depth = log.open.len();
        let started_at_ms = millis(log.origin.elapsed());
        let index = log.nodes.len();
        log.nodes.push(StepNode {
            name: name.to_string(),
            depth,
            parent,
            started_at_ms,
            duration_ms: 0,
            outcome: StepOutcome::Running,
        });
        log.open.push(index);
        StepToken { index, depth }
    }

    /// Close a step with its outcome
    pub fn end(&self, token: StepToken, outcome: StepOutcome) {
        let mut log = self.log();
        let now_ms = millis(log.origin.elapsed());
        if let Some(pos) = log.open.iter().rposition(|&i| i == token.index) {
            log.open.truncate(pos);
        }
        if let Some(node) = log.nodes.get_mut(token.index) {
            node.duration_ms = now_ms.saturating_sub(node.started_at_ms);
            node.outcome = outcome;
        }
    }

    /// Number of steps recorded so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.log().nodes.len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recorded steps as a tree of top-level records
    #[must_use]
    pub fn records(&self) -> Vec<StepRecord> {
        let log = self.log();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); log.nodes.len()];
        let mut roots = Vec::new();
        for (i, node) in log.nodes.iter().enumerate() {
            match node.parent {
                Some(p) => children[p].push(i),
                None => roots.push(i),
            }
        }
        roots
            .into_iter()
            .map(|i| build_record(&log.nodes, &children, i))
            .collect()
    }

    /// Take the recorded tree and clear the log
    pub fn finish(&self) -> Vec<StepRecord> {
        let records = self.records();
        let mut log = self.log();
        log.nodes.clear();
        log.open.clear();
        records
    }

    /// Indented, one-step-per-line rendering of [`records`](Self::records)
    #[must_use]
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        for record in self.records() {
            render_record(&mut out, &record);
        }
        out
    }
}

fn build_record(nodes: &[StepNode], children: &[Vec<usize>], index: usize) -> StepRecord {
    let node = &nodes[index];
    StepRecord {
        name: node.name.clone(),
        depth: node.depth,
        started_at_ms: node.started_at_ms,
        duration_ms: node.duration_ms,
        outcome: node.outcome.clone(),
        children: children[index]
            .iter()
            .map(|&c| build_record(nodes, children, c))
            .collect(),
    }
}

fn render_record(out: &mut String, record: &StepRecord) {
    let indent = "  ".repeat(record.depth);
    let _ = match &record.outcome {
        StepOutcome::Passed => writeln!(out, "{indent}✓ {} ({}ms)", record.name, record.duration_ms),
        StepOutcome::Failed(message) => writeln!(
            out,
            "{indent}✗ {} ({}ms): {message}",
            record.name, record.duration_ms
        ),
        StepOutcome::Running => writeln!(out, "{indent}… {}", record.name),
    };
    for child in &record.children {
        render_record(out, child);
    }
}

/// Run `action` as a named step on `page`'s reporter.
///
/// Returns exactly what `action` returns. Errors are recorded by their
/// display text and passed through as-is.
pub async fn step<T, E, Fut>(page: &PageHandle, name: &str, action: Fut) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let reporter = page.steps();
    let token = reporter.begin(name);
    let span = tracing::info_span!("step", name = %name, depth = token.depth());
    let result = action.instrument(span).await;
    match &result {
        Ok(_) => {
            tracing::debug!(step = %name, "step passed");
            reporter.end(token, StepOutcome::Passed);
        }
        Err(e) => {
            tracing::debug!(step = %name, error = %e, "step failed");
            reporter.end(token, StepOutcome::Failed(e.to_string()));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakePage, FakeSite};
    use crate::result::ProbeError;

    fn handle() -> PageHandle {
        PageHandle::new(Arc::new(FakePage::new(Arc::new(FakeSite::new()))))
    }

    mod reporter_tests {
        use super::*;

        #[test]
        fn test_nesting_follows_open_step() {
            let reporter = StepReporter::new();
            let outer = reporter.begin("Outer.run");
            let inner = reporter.begin("Inner.run");
            assert_eq!(inner.depth(), 1);
            reporter.end(inner, StepOutcome::Passed);
            let sibling = reporter.begin("Inner.again");
            assert_eq!(sibling.depth(), 1);
            reporter.end(sibling, StepOutcome::Failed("boom".into()));
            reporter.end(outer, StepOutcome::Passed);

            let records = reporter.records();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].children.len(), 2);
            assert!(records[0].has_failure());
            assert_eq!(reporter.len(), 3);
        }

        #[test]
        fn test_finish_drains_log() {
            let reporter = StepReporter::new();
            let token = reporter.begin("A.one");
            reporter.end(token, StepOutcome::Passed);
            assert_eq!(reporter.finish().len(), 1);
            assert!(reporter.is_empty());
            let token = reporter.begin("A.two");
            assert_eq!(token.depth(), 0);
            reporter.end(token, StepOutcome::Passed);
        }

        #[test]
        fn test_unfinished_step_stays_running() {
            let reporter = StepReporter::new();
            let _token = reporter.begin("Dropped.step");
            assert_eq!(reporter.records()[0].outcome, StepOutcome::Running);
        }

        #[test]
        fn test_render_tree_indents_children() {
            let reporter = StepReporter::new();
            let outer = reporter.begin("A.outer");
            let inner = reporter.begin("A.inner");
            reporter.end(inner, StepOutcome::Failed("bad".into()));
            reporter.end(outer, StepOutcome::Passed);
            let text = reporter.render_tree();
            let lines: Vec<&str> = text.lines().collect();
            assert!(lines[0].starts_with("✓ A.outer"));
            assert!(lines[1].starts_with("  ✗ A.inner"));
            assert!(lines[1].ends_with(": bad"));
        }

        #[test]
        fn test_outcome_serializes_tagged() {
            let json = serde_json::to_string(&StepOutcome::Failed("x".into())).unwrap();
            assert_eq!(json, r#"{"status":"failed","message":"x"}"#);
        }
    }

    mod step_fn_tests {
        use super::*;

        #[tokio::test]
        async fn test_step_preserves_value() {
            let page = handle();
            let value = step(&page, "T.value", async { Ok::<_, ProbeError>(42) })
                .await
                .unwrap();
            assert_eq!(value, 42);
            assert_eq!(page.steps().records()[0].outcome, StepOutcome::Passed);
        }

        #[tokio::test]
        async fn test_step_preserves_error_unchanged() {
            let page = handle();
            let err = step(&page, "T.fail", async {
                Err::<(), _>(ProbeError::mismatch("m", "a", "b"))
            })
            .await
            .unwrap_err();
            assert!(matches!(
                err,
                ProbeError::AssertionMismatch { ref expected, .. } if expected == "a"
            ));
            assert_eq!(
                page.steps().records()[0].outcome,
                StepOutcome::Failed("m: expected a, got b".into())
            );
        }

        #[tokio::test]
        async fn test_nested_steps() {
            let page = handle();
            let inner_page = page.clone();
            step(&page, "Outer.go", async move {
                step(&inner_page, "Inner.go", async { Ok::<_, ProbeError>(()) }).await
            })
            .await
            .unwrap();
            let records = page.steps().records();
            assert_eq!(records[0].name, "Outer.go");
            assert_eq!(records[0].children[0].name, "Inner.go");
            assert_eq!(records[0].children[0].depth, 1);
        }
    }
}
