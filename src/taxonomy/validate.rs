//! Structural validation and health checking for built taxonomies.
//!
//! Verifies the invariants the cache passes and path engines rely on:
//! - insertion order is topological (every parent precedes its children)
//! - parent/child adjacency is symmetric
//! - `depth(p) < depth(v)` for every parent p of v
//! - `anc(v) = {v} ∪ ⋃ anc(p)` for every cached ancestor set
//! - `subsumer_count(v) == |anc(v)|` when both caches exist
//!
//! Checks over caches that were not computed are skipped, not failed.

use std::collections::HashMap;

use crate::taxonomy::ancestors::union_many;
use crate::taxonomy::Taxonomy;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational, not a problem.
    Info,
    /// Something unusual but not necessarily wrong.
    Warning,
    /// A broken invariant; query results cannot be trusted.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single issue found during a health check.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity of the issue.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Vertex ID involved, if any.
    pub vertex: Option<u64>,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            vertex: None,
        }
    }

    /// Attach the vertex ID involved.
    pub fn with_vertex(mut self, id: u64) -> Self {
        self.vertex = Some(id);
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(id) = self.vertex {
            write!(f, " (vertex {})", id)?;
        }
        Ok(())
    }
}

/// Report from a taxonomy health check.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// All issues found.
    pub issues: Vec<ValidationIssue>,
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Number of roots (parentless vertices).
    pub root_count: usize,
    /// Number of leaves (childless vertices).
    pub leaf_count: usize,
    /// Maximum cached depth, when the attribute pass has run.
    pub max_depth: Option<usize>,
}

impl ValidationReport {
    fn error(&mut self, message: impl Into<String>, vertex: u64) {
        self.issues
            .push(ValidationIssue::new(Severity::Error, message).with_vertex(vertex));
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(Severity::Warning, message));
    }

    /// No error-level issues?
    pub fn is_healthy(&self) -> bool {
        !self.issues.iter().any(|i| i.severity >= Severity::Error)
    }

    /// No issues at all?
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues at or above a severity.
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

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Taxonomy: {} vertices ({} roots, {} leaves)",
            self.vertex_count, self.root_count, self.leaf_count
        )?;
        if let Some(d) = self.max_depth {
            writeln!(f, "Max depth: {}", d)?;
        }
        if self.is_clean() {
            return write!(f, "Validation passed: no issues found");
        }
        writeln!(f, "Issues: {}", self.issues.len())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

impl Taxonomy {
    /// Check the structural invariants of the taxonomy and its caches.
    pub fn health_check(&self) -> ValidationReport {
        let mut report = ValidationReport {
            issues: Vec::new(),
            vertex_count: self.verts.len(),
            root_count: self.verts.iter().filter(|v| v.parents.is_empty()).count(),
            leaf_count: self.verts.iter().filter(|v| v.children.is_empty()).count(),
            max_depth: self
                .attrs
                .as_ref()
                .map(|a| a.depth.iter().copied().max().unwrap_or(0) as usize),
        };

        if report.root_count > 1 {
            report.warn(format!(
                "{} roots: concepts under different roots share no subsumer",
                report.root_count
            ));
        }

        for (pos, rec) in self.verts.iter().enumerate() {
            for &p in &rec.parents {
                if p as usize >= pos {
                    report.error("parent does not precede vertex in insertion order", rec.id);
                }
                if !self.verts[p as usize].children.contains(&(pos as u32)) {
                    report.error("parent is missing the back-reference to this child", rec.id);
                }
            }
            for &c in &rec.children {
                if !self.verts[c as usize].parents.contains(&(pos as u32)) {
                    report.error("child is missing the back-reference to this parent", rec.id);
                }
            }
        }

        if let Some(attrs) = &self.attrs {
            for (pos, rec) in self.verts.iter().enumerate() {
                for &p in &rec.parents {
                    if attrs.depth[p as usize] >= attrs.depth[pos] {
                        report.error("parent depth is not strictly below vertex depth", rec.id);
                    }
                }
                if rec.children.is_empty() && attrs.leaf_count[pos] != 1 {
                    report.error("leaf vertex has a leaf count other than 1", rec.id);
                }
            }
        }

        if let Some(cache) = &self.ancestors {
            for (pos, rec) in self.verts.iter().enumerate() {
                let set = &cache.sets[pos];
                if set.binary_search(&(pos as u32)).is_err() {
                    report.error("vertex is missing from its own ancestor set", rec.id);
                }
                let expected = {
                    let mut e = union_many(
                        rec.parents.iter().map(|&p| cache.sets[p as usize].as_slice()),
                    );
                    e.push(pos as u32);
                    e
                };
                if set != &expected {
                    report.error(
                        "ancestor set is not {self} ∪ union of parent sets",
                        rec.id,
                    );
                }
                if let Some(attrs) = &self.attrs {
                    if attrs.subsumer_count[pos] != set.len() {
                        report.error("subsumer count disagrees with ancestor set size", rec.id);
                    }
                }
            }
        }

        report
    }
}
