//! Tree validation and health checking utilities.
//!
//! Ownership already rules out cycles, orphans and shared subtrees, so the
//! checks here are about content:
//! - duplicate node ids
//! - empty leaves (a leaf holding no items, other than an empty root)
//! - unary internal nodes (usually left behind by aggregation)
//! - weight inversions (a child formed at lower similarity than its parent)
//! - clusters below a minimum size ([`check_min_items`])
//!
//! # Example
//!
//! ```rust
//! use arbor::hierarchy::{ClusterNode, HealthCheck};
//!
//! let tree = ClusterNode::merged(
//!     "r",
//!     -2.0,
//!     ClusterNode::leaf("a", 0.0, vec![1]),
//!     ClusterNode::leaf("b", 0.0, vec![2]),
//! );
//! let report = tree.health_check();
//! assert!(report.is_healthy(), "{}", report);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::model::HierarchicalClusterModel;
use super::node::ClusterNode;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational, not a problem.
    Info,
    /// Something unusual but not necessarily wrong.
    Warning,
    /// A problem that should be fixed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single validation issue found during health check.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity of the issue.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Optional node ID involved.
    pub node_id: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            node_id: None,
        }
    }

    /// Add a node ID to this issue.
    pub fn with_node(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(id) = &self.node_id {
            write!(f, " (node {})", id)?;
        }
        Ok(())
    }
}

/// Report from a validation/health check.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// All issues found.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Check if the report contains no errors.
    pub fn is_healthy(&self) -> bool {
        !self.issues.iter().any(|i| i.severity >= Severity::Error)
    }

    /// Check if there are any issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Get issues of a specific severity or higher.
    pub fn issues_at_level(&self, min_severity: Severity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity >= min_severity)
            .collect()
    }

    /// Count issues by severity.
    pub fn counts(&self) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for issue in &self.issues {
            *counts.entry(issue.severity).or_default() += 1;
        }
        counts
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "Validation passed: no issues found");
        }

        let counts = self.counts();
        write!(f, "Validation report: ")?;

        let parts: Vec<String> = [
            (Severity::Error, "errors"),
            (Severity::Warning, "warnings"),
            (Severity::Info, "info"),
        ]
        .iter()
        .filter_map(|(sev, name)| counts.get(sev).map(|c| format!("{} {}", c, name)))
        .collect();

        writeln!(f, "{}", parts.join(", "))?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// Health report with additional statistics.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Validation issues.
    pub validation: ValidationReport,
    /// Total number of nodes.
    pub node_count: usize,
    /// Number of leaf nodes.
    pub leaf_count: usize,
    /// Number of items in the tree.
    pub item_count: usize,
    /// Maximum depth of the tree.
    pub max_depth: usize,
    /// Average branching factor over internal nodes.
    pub avg_branching_factor: f64,
}

impl HealthReport {
    /// Check if the tree is healthy (no errors).
    pub fn is_healthy(&self) -> bool {
        self.validation.is_healthy()
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tree Health Report")?;
        writeln!(f, "==================")?;
        writeln!(f, "Nodes: {} ({} leaves)", self.node_count, self.leaf_count)?;
        writeln!(f, "Items: {}", self.item_count)?;
        writeln!(f, "Max depth: {}", self.max_depth)?;
        writeln!(f, "Avg branching factor: {:.2}", self.avg_branching_factor)?;
        writeln!(f)?;
        write!(f, "{}", self.validation)
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

impl<I> HealthCheck for ClusterNode<I> {
    fn health_check(&self) -> HealthReport {
        let mut validation = ValidationReport::new();

        let mut seen = HashSet::new();
        for node in self.iter() {
            if !seen.insert(node.id()) {
                validation.add(
                    ValidationIssue::new(Severity::Error, "duplicate node id").with_node(node.id()),
                );
            }
        }

        let is_root = |node: &ClusterNode<I>| std::ptr::eq(node, self);
        let mut internal = 0usize;
        let mut total_children = 0usize;
        for node in self.iter() {
            if node.is_leaf() {
                if node.local_items().is_empty() && !is_root(node) {
                    validation.add(
                        ValidationIssue::new(Severity::Warning, "leaf holds no items")
                            .with_node(node.id()),
                    );
                }
                continue;
            }

            internal += 1;
            total_children += node.children().len();
            if node.children().len() == 1 {
                validation.add(
                    ValidationIssue::new(Severity::Info, "internal node has a single child")
                        .with_node(node.id()),
                );
            }
            for child in node.children().iter().filter(|c| !c.is_leaf()) {
                if child.weight() < node.weight() {
                    validation.add(
                        ValidationIssue::new(
                            Severity::Warning,
                            format!(
                                "weight inversion: child {} ({}) below parent ({})",
                                child.id(),
                                child.weight(),
                                node.weight()
                            ),
                        )
                        .with_node(node.id()),
                    );
                }
            }
        }

        let leaf_count = self.leaves().len();
        HealthReport {
            validation,
            node_count: self.node_count(),
            leaf_count,
            item_count: self.subtree_item_count(),
            max_depth: self.depth(),
            avg_branching_factor: if internal == 0 {
                0.0
            } else {
                total_children as f64 / internal as f64
            },
        }
    }
}

impl<I> HealthCheck for HierarchicalClusterModel<I> {
    fn health_check(&self) -> HealthReport {
        self.root().health_check()
    }
}

/// Report every child subtree holding fewer than `min_items` items.
///
/// A tree produced with the same `min_items` by small-cluster aggregation
/// only fails this where a node's two children were both small and too few
/// together to be absorbed.
pub fn check_min_items<I>(root: &ClusterNode<I>, min_items: usize) -> ValidationReport {
    let mut report = ValidationReport::new();
    for node in root.iter() {
        for child in node.children() {
            let count = child.subtree_item_count();
            if count < min_items {
                report.add(
                    ValidationIssue::new(
                        Severity::Error,
                        format!("child {} holds {count} < {min_items} items", child.id()),
                    )
                    .with_node(node.id()),
                );
            }
        }
    }
    report
}
