//! Cluster tree validation and health checking.
//!
//! Detects structural problems in a finished hierarchy:
//! - Childless nodes that carry no records
//! - Leaves reached twice (the same record in two places)
//! - Record indices outside the clustered input
//! - A leaf total that differs from the number of clustered records
//! - Non-finite heights
//!
//! Negative branch lengths, which height-mode centroid linkages produce on an
//! inversion, are reported as warnings and do not make a tree unhealthy.
//!
//! The agglomerator runs [`check_forest`] on every result and refuses to
//! return a forest that is not healthy.
//!
//! # Example
//!
//! ```rust,ignore
//! use grove::hierarchy::HealthCheck;
//!
//! let report = tree.health_check();
//! if !report.is_healthy() {
//!     for issue in &report.validation.issues {
//!         eprintln!("{issue}");
//!     }
//! }
//! ```

use std::collections::HashSet;

use super::{ClusterNode, ClusterTree};

/// How serious a [`ValidationIssue`] is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Worth knowing, not a defect.
    Info,
    /// The tree is usable but has a suspicious shape.
    Warning,
    /// The tree is structurally wrong.
    Error,
    /// Records are lost or duplicated.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        })
    }
}

/// One finding of [`check_forest`].
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// How serious the finding is.
    pub severity: Severity,
    /// What is wrong.
    pub message: String,
    /// Record index of the leaf involved, if any.
    pub record: Option<usize>,
    /// Observed values behind the finding.
    pub context: Option<String>,
}

impl ValidationIssue {
    /// An issue with no record or context attached.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            record: None,
            context: None,
        }
    }

    /// Attach the record index of the leaf involved.
    pub fn with_record(mut self, index: usize) -> Self {
        self.record = Some(index);
        self
    }

    /// Attach the observed values.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context = Some(ctx.into());
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(index) = self.record {
            write!(f, " at record {index}")?;
        }
        if let Some(ctx) = &self.context {
            write!(f, " ({ctx})")?;
        }
        Ok(())
    }
}

/// All findings of one check, in traversal order.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Findings.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Record a bare [`Severity::Error`] finding.
    pub fn error(&mut self, message: impl Into<String>) {
        self.add(ValidationIssue::new(Severity::Error, message));
    }

    /// The most severe finding, if any.
    pub fn worst(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }

    /// True unless some finding is [`Severity::Error`] or worse.
    pub fn is_healthy(&self) -> bool {
        self.worst().map_or(true, |s| s < Severity::Error)
    }

    /// Findings at `min_severity` or worse.
    pub fn issues_at_level(&self, min_severity: Severity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity >= min_severity)
            .collect()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.worst() {
            None => write!(f, "no issues"),
            Some(worst) => {
                write!(f, "{} issue(s), worst {worst}", self.issues.len())?;
                for issue in &self.issues {
                    write!(f, "; {issue}")?;
                }
                Ok(())
            }
        }
    }
}

/// Shape of a checked forest plus its [`ValidationReport`].
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Findings.
    pub validation: ValidationReport,
    /// Nodes visited.
    pub node_count: usize,
    /// Childless nodes visited.
    pub leaf_count: usize,
    /// Records carried by the childless nodes.
    pub record_count: usize,
    /// Deepest root.
    pub max_depth: usize,
}

impl HealthReport {
    /// See [`ValidationReport::is_healthy`].
    pub fn is_healthy(&self) -> bool {
        self.validation.is_healthy()
    }
}

impl std::fmt::Display for HealthReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes, {} leaves over {} records, depth {}: {}",
            self.node_count, self.leaf_count, self.record_count, self.max_depth, self.validation
        )
    }
}

/// Trait for types that can be health-checked.
pub trait HealthCheck {
    /// Perform a health check and return a report.
    fn health_check(&self) -> HealthReport;

    /// Quick check: returns true if healthy.
    fn is_healthy(&self) -> bool {
        self.health_check().is_healthy()
    }
}

impl HealthCheck for ClusterTree {
    fn health_check(&self) -> HealthReport {
        check_forest(std::slice::from_ref(self.root()), None)
    }
}

/// Check a forest of cluster roots.
///
/// With `expected_records`, also verifies that the forest covers exactly
/// that many records and that every leaf index is below it.
pub fn check_forest(roots: &[ClusterNode], expected_records: Option<usize>) -> HealthReport {
    let mut validation = ValidationReport::new();
    let mut seen: HashSet<usize> = HashSet::new();
    let mut node_count = 0;
    let mut leaf_count = 0;
    let mut record_count = 0;
    let mut stack: Vec<&ClusterNode> = roots.iter().collect();

    while let Some(node) = stack.pop() {
        node_count += 1;

        if !node.height().is_finite() {
            validation.error(format!("non-finite node height {}", node.height()));
        }
        for child in node.children() {
            if child.length() < 0.0 {
                let mut issue = ValidationIssue::new(Severity::Warning, "negative branch length")
                    .with_context(format!(
                        "length {}, parent height {}",
                        child.length(),
                        node.height()
                    ));
                if let Some(index) = child.index() {
                    issue = issue.with_record(index);
                }
                validation.add(issue);
            }
            if child.height() > node.height() {
                validation.add(
                    ValidationIssue::new(Severity::Info, "child is higher than its parent")
                        .with_context(format!(
                            "parent height {}, child height {}",
                            node.height(),
                            child.height()
                        )),
                );
            }
        }

        if !node.is_leaf() {
            stack.extend(node.children());
            continue;
        }

        leaf_count += 1;
        let records = node.data().map_or(0, |d| d.len());
        record_count += records;
        if records == 0 {
            validation.error("childless node carries no records");
        }

        if let Some(index) = node.index() {
            if !seen.insert(index) {
                validation.add(
                    ValidationIssue::new(Severity::Critical, "leaf reached twice")
                        .with_record(index),
                );
            }
            if let Some(expected) = expected_records {
                if index >= expected {
                    validation.add(
                        ValidationIssue::new(Severity::Error, "record index out of range")
                            .with_record(index)
                            .with_context(format!("{expected} records clustered")),
                    );
                }
            }
        }
    }

    if let Some(expected) = expected_records {
        if record_count != expected {
            validation.add(
                ValidationIssue::new(Severity::Error, "forest does not cover every record")
                    .with_context(format!("expected {expected}, found {record_count}")),
            );
        }
    }

    HealthReport {
        validation,
        node_count,
        leaf_count,
        record_count,
        max_depth: roots.iter().map(ClusterNode::max_depth).max().unwrap_or(0),
    }
}
