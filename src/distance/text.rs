//! Labeled distance matrices in tab-delimited text.
//!
//! Two layouts are accepted.
//!
//! **Lower triangle.** A header naming the first `n-1` observations, then one
//! row per observation `2..=n` holding its distances to every earlier one:
//!
//! ```text
//! \tid1\tid2\tid3
//! id2\t2.0
//! id3\t1.5\t3.0
//! id4\t2.5\t1.0\t4.5
//! ```
//!
//! **Full matrix.** A title cell plus all `n` names, then `n` complete rows.
//! The matrix must be symmetric with a zero diagonal.
//!
//! ```text
//! title\tid1\tid2\tid3\tid4
//! id1\t0.0\t2.0\t1.5\t2.5
//! id2\t2.0\t0.0\t3.0\t1.0
//! id3\t1.5\t3.0\t0.0\t4.5
//! id4\t2.5\t1.0\t4.5\t0.0
//! ```

use std::collections::HashSet;

use super::DistanceMatrix;
use crate::error::{Error, Result};

/// A [`DistanceMatrix`] whose items carry names.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDistances {
    labels: Vec<String>,
    matrix: DistanceMatrix,
}

/// Non-blank lines with their 1-based line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end()))
        .filter(|(_, line)| !line.trim().is_empty())
}

fn parse_value(line: usize, field: &str) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::parse(line, format!("'{field}' is not a number")))
}

fn check_unique(labels: &[String], line: usize) -> Result<()> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if label.is_empty() {
            return Err(Error::parse(line, "empty observation name"));
        }
        if !seen.insert(label.as_str()) {
            return Err(Error::parse(line, format!("duplicate observation '{label}'")));
        }
    }
    Ok(())
}

impl LabeledDistances {
    /// Attach names to an existing matrix.
    pub fn new(labels: Vec<String>, matrix: DistanceMatrix) -> Result<Self> {
        if labels.len() != matrix.n_items() {
            return Err(Error::DimensionMismatch {
                expected: matrix.n_items(),
                found: labels.len(),
            });
        }
        Ok(Self { labels, matrix })
    }

    /// Parse the lower-triangle layout.
    pub fn parse_lower_triangle(text: &str) -> Result<Self> {
        let mut lines = content_lines(text);
        let (header_line, header) = lines.next().ok_or(Error::EmptyInput)?;
        if !header.starts_with('\t') {
            return Err(Error::parse(
                header_line,
                "header must start with a tab and list observation names",
            ));
        }
        let mut labels: Vec<String> = header
            .split('\t')
            .skip(1)
            .map(|s| s.trim().to_string())
            .collect();
        if labels.is_empty() {
            return Err(Error::parse(header_line, "header names no observations"));
        }

        let n = labels.len() + 1;
        let mut square = vec![vec![0.0; n]; n];
        let mut rows = 0;
        for (line, row) in lines {
            let fields: Vec<&str> = row.split_whitespace().collect();
            let item = rows + 1;
            if item >= n {
                return Err(Error::parse(line, "more rows than header observations"));
            }
            if fields.len() != item + 1 {
                return Err(Error::parse(
                    line,
                    format!("expected {item} distances, found {}", fields.len() - 1),
                ));
            }

            let name = fields[0];
            if item < labels.len() {
                if labels[item] != name {
                    return Err(Error::parse(
                        line,
                        format!("row '{name}' does not match header '{}'", labels[item]),
                    ));
                }
            } else {
                labels.push(name.to_string());
            }

            for (col, field) in fields[1..].iter().enumerate() {
                let d = parse_value(line, field)?;
                square[item][col] = d;
                square[col][item] = d;
            }
            rows += 1;
        }

        if rows != n - 1 {
            return Err(Error::parse(
                header_line,
                format!("expected {} rows, found {rows}", n - 1),
            ));
        }
        check_unique(&labels, header_line)?;

        let matrix = DistanceMatrix::from_square(&square)?;
        Ok(Self { labels, matrix })
    }

    /// Parse the full square layout.
    pub fn parse_full(text: &str) -> Result<Self> {
        let mut lines = content_lines(text);
        let (header_line, header) = lines.next().ok_or(Error::EmptyInput)?;
        let labels: Vec<String> = header
            .split('\t')
            .skip(1)
            .map(|s| s.trim().to_string())
            .collect();
        check_unique(&labels, header_line)?;

        let n = labels.len();
        let mut square = Vec::with_capacity(n);
        for (line, row) in lines {
            let fields: Vec<&str> = row.split('\t').collect();
            let item = square.len();
            if item >= n {
                return Err(Error::parse(line, "more rows than header observations"));
            }
            if fields[0].trim() != labels[item] {
                return Err(Error::parse(
                    line,
                    format!(
                        "row '{}' does not match header '{}'",
                        fields[0].trim(),
                        labels[item]
                    ),
                ));
            }
            if fields.len() != n + 1 {
                return Err(Error::parse(
                    line,
                    format!("expected {n} distances, found {}", fields.len() - 1),
                ));
            }
            let values = fields[1..]
                .iter()
                .map(|f| parse_value(line, f))
                .collect::<Result<Vec<f64>>>()?;
            square.push(values);
        }

        if square.len() != n {
            return Err(Error::parse(
                header_line,
                format!("expected {n} rows, found {}", square.len()),
            ));
        }

        let matrix = DistanceMatrix::from_square(&square)?;
        Ok(Self { labels, matrix })
    }

    /// Observation names, in item order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Name of item `i`.
    pub fn label(&self, i: usize) -> Option<&str> {
        self.labels.get(i).map(String::as_str)
    }

    /// Item index of a name.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// The underlying distances.
    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    /// Split into names and distances.
    pub fn into_parts(self) -> (Vec<String>, DistanceMatrix) {
        (self.labels, self.matrix)
    }

    /// Group names by a flat labeling, one group per cluster label.
    ///
    /// `assignment[i]` is the cluster label of item `i`, as returned by the
    /// dendrogram cuts.
    pub fn group_names(&self, assignment: &[usize]) -> Vec<Vec<&str>> {
        let k = assignment.iter().max().map_or(0, |m| m + 1);
        let mut groups = vec![Vec::new(); k];
        for (item, &label) in assignment.iter().enumerate() {
            if let Some(name) = self.label(item) {
                groups[label].push(name);
            }
        }
        groups
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LOWER: &str = "\tid1\tid2\tid3\nid2\t2.0\nid3\t1.5\t3.0\nid4\t2.5\t1.0\t4.5\n";
    const FULL: &str = "title\tid1\tid2\tid3\tid4\n\
                        id1\t0.0\t2.0\t1.5\t2.5\n\
                        id2\t2.0\t0.0\t3.0\t1.0\n\
                        id3\t1.5\t3.0\t0.0\t4.5\n\
                        id4\t2.5\t1.0\t4.5\t0.0\n";

    #[test]
    fn lower_triangle_reads_all_observations() {
        let d = LabeledDistances::parse_lower_triangle(LOWER).unwrap();
        assert_eq!(d.labels(), &["id1", "id2", "id3", "id4"]);
        assert_eq!(d.matrix().n_items(), 4);
        assert_eq!(d.matrix().get(0, 2), 1.5);
        assert_eq!(d.matrix().get(3, 1), 1.0);
        assert_eq!(d.index_of("id4"), Some(3));
    }

    #[test]
    fn full_matrix_matches_lower_triangle() {
        let full = LabeledDistances::parse_full(FULL).unwrap();
        let lower = LabeledDistances::parse_lower_triangle(LOWER).unwrap();
        assert_eq!(full, lower);
    }

    #[test]
    fn tolerates_crlf_and_trailing_blank_lines() {
        let text = LOWER.replace('\n', "\r\n") + "\r\n\r\n";
        let d = LabeledDistances::parse_lower_triangle(&text).unwrap();
        assert_eq!(d.matrix().n_items(), 4);
    }

    #[test]
    fn lower_triangle_row_count_is_checked() {
        let text = "\tid1\tid2\tid3\nid2\t2.0\nid3\t1.5\t3.0\n";
        let err = LabeledDistances::parse_lower_triangle(text).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn lower_triangle_row_width_is_checked() {
        let text = "\tid1\tid2\nid2\t2.0\t7.0\nid3\t1.5\t3.0\n";
        let err = LabeledDistances::parse_lower_triangle(text).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn bad_number_reports_line() {
        let text = "\tid1\tid2\nid2\tabc\nid3\t1.5\t3.0\n";
        let err = LabeledDistances::parse_lower_triangle(text).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn missing_header_tab_is_rejected() {
        let err = LabeledDistances::parse_lower_triangle("id1\tid2\nid2\t1.0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn full_matrix_must_be_symmetric() {
        let text = FULL.replace("id3\t1.5\t3.0", "id3\t1.6\t3.0");
        let err = LabeledDistances::parse_full(&text).unwrap_err();
        assert!(matches!(err, Error::Asymmetric { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let text = "title\ta\ta\na\t0\t1\na\t1\t0\n";
        assert!(matches!(
            LabeledDistances::parse_full(text),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn empty_text() {
        assert_eq!(
            LabeledDistances::parse_full("\n\n"),
            Err(Error::EmptyInput)
        );
    }

    #[test]
    fn group_names_follow_labels() {
        let d = LabeledDistances::parse_lower_triangle(LOWER).unwrap();
        let groups = d.group_names(&[0, 1, 0, 1]);
        assert_eq!(groups, vec![vec!["id1", "id3"], vec!["id2", "id4"]]);
    }
}
