//! Waypoint sets: files, built-in defaults and random draws.
//!
//! A waypoint file holds one set per line as comma-separated node ids.
//! Blank lines and lines starting with `#` are skipped.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ExperimentError;
use crate::graph::{GraphSize, NodeId};

/// Reads every waypoint set from `path`.
pub fn read_waypoint_sets(path: impl AsRef<Path>) -> Result<Vec<Vec<NodeId>>, ExperimentError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| ExperimentError::Input {
        path: path.to_path_buf(),
        line: 0,
        reason: e.to_string(),
    })?;
    parse_waypoint_sets(file, path)
}

/// Parses waypoint sets from `reader`. `path` only labels errors.
pub fn parse_waypoint_sets<R: Read>(
    reader: R,
    path: &Path,
) -> Result<Vec<Vec<NodeId>>, ExperimentError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut sets = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line());
        let set = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<NodeId>().map_err(|e| ExperimentError::Input {
                    path: path.to_path_buf(),
                    line,
                    reason: format!("`{field}`: {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !set.is_empty() {
            sets.push(set);
        }
    }
    Ok(sets)
}

/// The four reference waypoints of each size class.
pub fn default_input(size: GraphSize) -> Vec<NodeId> {
    match size {
        GraphSize::Tiny => vec![272, 329, 1640, 653],
        GraphSize::Small => vec![135_453, 388_326, 157_591, 439_506],
        GraphSize::Medium => vec![1_193_700, 229_003, 3_258_667, 2_512_448],
        GraphSize::Large | GraphSize::Eu => vec![17_238_825, 7_935_204, 13_620_123, 8_016_804],
    }
}

/// `len` ids drawn uniformly from `0..node_count`, reproducible per seed.
pub fn random_input(len: usize, node_count: u64, seed: u64) -> Vec<NodeId> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(0..node_count)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_lines_and_skip_blanks() {
        let text = "272,329,1640,653\n\n# comment\n 1 , 2,3,4,5\n";
        let sets = parse_waypoint_sets(text.as_bytes(), Path::new("inline")).unwrap();
        assert_eq!(sets, vec![vec![272, 329, 1640, 653], vec![1, 2, 3, 4, 5]]);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let text = "1,2,3,4\n5,six,7,8\n";
        let err = parse_waypoint_sets(text.as_bytes(), Path::new("inline")).unwrap_err();
        match err {
            ExperimentError::Input { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("six"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "10,20,30,40").unwrap();
        writeln!(file, "50,60,70,80").unwrap();
        let sets = read_waypoint_sets(file.path()).unwrap();
        assert_eq!(sets.len(), 2);
        assert!(read_waypoint_sets("/nonexistent/waypoints.csv").is_err());
    }

    #[test]
    fn test_defaults_and_random() {
        assert_eq!(default_input(GraphSize::Tiny), vec![272, 329, 1640, 653]);
        assert_eq!(default_input(GraphSize::Eu), default_input(GraphSize::Large));

        let a = random_input(6, 2_025, 9);
        assert_eq!(a, random_input(6, 2_025, 9));
        assert!(a.iter().all(|&id| id < 2_025));
    }
}
