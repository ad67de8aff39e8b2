//! Structural checks for dendrograms and linkage tables.
//!
//! A well-formed linkage table over `n` items has `n - 1` rows where row `i`:
//! - merges two distinct clusters with ids below `n + i` (no forward refs)
//! - consumes clusters nobody consumed before (each id merged at most once)
//! - records the combined size of its two inputs
//! - has a non-negative height no lower than the previous row's
//!
//! Together these imply every item is absorbed exactly once into a root that
//! covers all `n` items.
//!
//! # Example
//!
//! ```rust
//! use hclust::{Clusterer, DistanceMatrix, Linkage};
//!
//! let m = DistanceMatrix::from_fn(5, |i, j| (i as f64 - j as f64).abs()).unwrap();
//! let dendro = Clusterer::new(m, Linkage::Complete).unwrap().run().unwrap();
//! let report = dendro.health_check();
//! assert!(report.is_clean(), "{report}");
//! ```

use std::fmt;

use super::dendrogram::LinkageRow;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational, not a problem.
    Info,
    /// Something unusual but not necessarily wrong.
    Warning,
    /// The table does not describe a valid dendrogram.
    Error,
    /// The table is not even a tree (cycles, forward or repeated references).
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A single problem found in a linkage table.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Severity of the issue.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Row the issue was found on, if any.
    pub row: Option<usize>,
}

impl ValidationIssue {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            row: None,
        }
    }

    fn at(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(row) = self.row {
            write!(f, " (row {row})")?;
        }
        Ok(())
    }
}

/// Result of a health check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// All issues found, in discovery order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// No errors or critical issues.
    pub fn is_healthy(&self) -> bool {
        self.first_problem().is_none()
    }

    /// No issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// First issue at [`Severity::Error`] or above.
    pub fn first_problem(&self) -> Option<&ValidationIssue> {
        self.issues.iter().find(|i| i.severity >= Severity::Error)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "no issues");
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Check a linkage table over `n_items` items.
pub fn validate_linkage_table(n_items: usize, rows: &[LinkageRow]) -> ValidationReport {
    let mut report = ValidationReport::default();

    if n_items < 2 {
        report.add(ValidationIssue::new(
            Severity::Error,
            format!("{n_items} items cannot form a dendrogram"),
        ));
        return report;
    }
    if rows.len() != n_items - 1 {
        report.add(ValidationIssue::new(
            Severity::Error,
            format!("expected {} merges, found {}", n_items - 1, rows.len()),
        ));
    }

    let mut sizes: Vec<usize> = vec![1; n_items];
    let mut consumed = vec![false; n_items + rows.len()];
    let mut previous = 0.0_f64;

    for (i, row) in rows.iter().enumerate() {
        let new_id = n_items + i;
        let (a, b) = (row.cluster_a, row.cluster_b);

        if a == b {
            report.add(
                ValidationIssue::new(Severity::Critical, format!("cluster {a} merged with itself"))
                    .at(i),
            );
            sizes.push(row.size);
            continue;
        }

        let mut refs_ok = true;
        for id in [a, b] {
            if id >= new_id {
                report.add(
                    ValidationIssue::new(
                        Severity::Critical,
                        format!("cluster {id} referenced before it exists"),
                    )
                    .at(i),
                );
                refs_ok = false;
            } else if consumed[id] {
                report.add(
                    ValidationIssue::new(Severity::Critical, format!("cluster {id} merged twice"))
                        .at(i),
                );
                refs_ok = false;
            } else {
                consumed[id] = true;
            }
        }

        if refs_ok && sizes[a] + sizes[b] != row.size {
            report.add(
                ValidationIssue::new(
                    Severity::Error,
                    format!(
                        "size {} does not equal {} + {}",
                        row.size, sizes[a], sizes[b]
                    ),
                )
                .at(i),
            );
        }

        if !(row.distance >= 0.0) {
            report.add(
                ValidationIssue::new(Severity::Error, format!("invalid height {}", row.distance))
                    .at(i),
            );
        } else if row.distance < previous {
            report.add(
                ValidationIssue::new(
                    Severity::Error,
                    format!("height {} below previous {previous}", row.distance),
                )
                .at(i),
            );
        } else {
            previous = row.distance;
        }

        if a > b {
            report.add(
                ValidationIssue::new(Severity::Info, "cluster ids not in ascending order").at(i),
            );
        }

        sizes.push(row.size);
    }

    if rows.len() == n_items - 1 {
        if let Some(&root_size) = sizes.last() {
            if root_size != n_items {
                report.add(ValidationIssue::new(
                    Severity::Error,
                    format!("root covers {root_size} of {n_items} items"),
                ));
            }
        }
    }

    report
}
