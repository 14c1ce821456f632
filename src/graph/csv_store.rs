//! Edge-list CSV store with a per-source seek index.
//!
//! The file has a header row and `source,target,cost` records sorted by
//! source. Opening it scans the file once and remembers where each source's
//! first record starts; a fetch then seeks there and reads only that
//! node's rows.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Position, Reader, ReaderBuilder, StringRecord, Trim};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::store::{check_cost, tidy_edges, EdgeStore};
use super::types::{Edge, NodeId};
use crate::error::GraphError;

/// CSV-backed [`EdgeStore`].
pub struct CsvStore {
    path: PathBuf,
    reader: Reader<File>,
    index: FxHashMap<NodeId, Position>,
    record: StringRecord,
}

impl CsvStore {
    /// Opens and indexes `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref().to_path_buf();
        let mut reader = open_reader(&path)?;
        // Consume the header so recorded positions never point at it.
        reader.headers()?;
        let mut index = FxHashMap::default();
        let mut record = StringRecord::new();
        let mut previous: Option<NodeId> = None;

        loop {
            let position = reader.position().clone();
            if !reader.read_record(&mut record)? {
                break;
            }
            let (source, _) = parse_row(&path, &record)?;
            match previous {
                Some(prev) if source < prev => {
                    return Err(GraphError::Unsorted {
                        path,
                        previous: prev,
                        found: source,
                    });
                }
                Some(prev) if source == prev => {}
                _ => {
                    index.insert(source, position);
                }
            }
            previous = Some(source);
        }

        debug!(path = %path.display(), sources = index.len(), "indexed edge file");
        Ok(Self {
            path,
            reader,
            index,
            record,
        })
    }

    /// Number of distinct sources in the file.
    pub fn source_count(&self) -> usize {
        self.index.len()
    }

    /// The indexed file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for CsvStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvStore")
            .field("path", &self.path)
            .field("sources", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl EdgeStore for CsvStore {
    fn fetch(&mut self, id: NodeId) -> Result<Vec<Edge>, GraphError> {
        let Some(position) = self.index.get(&id).cloned() else {
            return Ok(Vec::new());
        };
        self.reader.seek(position)?;
        let mut edges = Vec::new();
        while self.reader.read_record(&mut self.record)? {
            let (source, edge) = parse_row(&self.path, &self.record)?;
            if source != id {
                break;
            }
            edges.push(edge);
        }
        tidy_edges(id, edges)
    }

    fn scan(&mut self, sink: &mut dyn FnMut(NodeId, Edge) -> bool) -> Result<(), GraphError> {
        let mut reader = open_reader(&self.path)?;
        let mut record = StringRecord::new();
        let mut current = None;
        let mut seen = FxHashSet::default();
        while reader.read_record(&mut record)? {
            let (source, edge) = parse_row(&self.path, &record)?;
            if current != Some(source) {
                current = Some(source);
                seen.clear();
            }
            if edge.target == source || !seen.insert(edge) {
                continue;
            }
            if !sink(source, edge) {
                break;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

fn open_reader(path: &Path) -> Result<Reader<File>, GraphError> {
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?)
}

fn parse_row(path: &Path, record: &StringRecord) -> Result<(NodeId, Edge), GraphError> {
    let line = record.position().map_or(0, Position::line);
    let malformed = |reason: String| GraphError::Malformed {
        path: path.to_path_buf(),
        line,
        reason,
    };
    let field = |i: usize, name: &str| {
        record
            .get(i)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed(format!("missing {name}")))
    };

    let source: NodeId = field(0, "source")?
        .parse()
        .map_err(|e| malformed(format!("source: {e}")))?;
    let target: NodeId = field(1, "target")?
        .parse()
        .map_err(|e| malformed(format!("target: {e}")))?;
    let cost: f64 = field(2, "cost")?
        .parse()
        .map_err(|e| malformed(format!("cost: {e}")))?;

    let edge = Edge::new(cost, target);
    check_cost(source, &edge)?;
    Ok((source, edge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AccessMode, CachedGraph, GraphAccess, GraphConfig};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "source,target,cost\n{body}").unwrap();
        file
    }

    #[test]
    fn test_fetch_by_seek() {
        let file = write_csv("1,2,1.5\n1,3,2.0\n2,3,0.5\n4,1,7\n");
        let mut store = CsvStore::open(file.path()).unwrap();
        assert_eq!(store.source_count(), 3);
        assert_eq!(
            store.fetch(1).unwrap(),
            vec![Edge::new(1.5, 2), Edge::new(2.0, 3)]
        );
        assert_eq!(store.fetch(4).unwrap(), vec![Edge::new(7.0, 1)]);
        // Out of order access exercises backwards seeks.
        assert_eq!(store.fetch(2).unwrap(), vec![Edge::new(0.5, 3)]);
        assert!(store.fetch(3).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_drops_self_loops_and_duplicates() {
        let file = write_csv("5,5,1\n5,6,2\n5,6,2\n");
        let mut store = CsvStore::open(file.path()).unwrap();
        assert_eq!(store.fetch(5).unwrap(), vec![Edge::new(2.0, 6)]);
    }

    #[test]
    fn test_unsorted_file_rejected() {
        let file = write_csv("2,1,1\n1,2,1\n");
        let err = CsvStore::open(file.path()).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Unsorted {
                previous: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let file = write_csv("1,2,1\n1,x,1\n");
        let err = CsvStore::open(file.path()).unwrap_err();
        match err {
            GraphError::Malformed { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.starts_with("target"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_cost_rejected() {
        let file = write_csv("1,2,-3\n");
        assert!(matches!(
            CsvStore::open(file.path()).unwrap_err(),
            GraphError::InvalidCost { .. }
        ));
    }

    #[test]
    fn test_scan_in_file_order() {
        let file = write_csv("1,2,1\n1,1,1\n2,1,3\n");
        let mut store = CsvStore::open(file.path()).unwrap();
        let mut rows = Vec::new();
        store
            .scan(&mut |source, edge| {
                rows.push((source, edge.target, edge.cost));
                true
            })
            .unwrap();
        assert_eq!(rows, vec![(1, 2, 1.0), (2, 1, 3.0)]);
    }

    #[test]
    fn test_scan_skips_duplicate_rows() {
        let file = write_csv("1,2,1\n1,2,1\n1,3,2\n2,1,1\n2,1,1\n2,1,4\n");
        let mut store = CsvStore::open(file.path()).unwrap();
        let mut rows = Vec::new();
        store
            .scan(&mut |source, edge| {
                rows.push((source, edge.target, edge.cost));
                true
            })
            .unwrap();
        assert_eq!(rows, vec![(1, 2, 1.0), (1, 3, 2.0), (2, 1, 1.0), (2, 1, 4.0)]);
    }

    #[test]
    fn test_preloaded_nodes_match_fetched_nodes() {
        let body = "1,2,1\n1,2,1\n1,3,2\n2,3,1\n2,3,1\n";
        let eager_file = write_csv(body);
        let lazy_file = write_csv(body);
        let config = GraphConfig::default().with_access_mode(AccessMode::All);
        let mut eager =
            CachedGraph::open(Box::new(CsvStore::open(eager_file.path()).unwrap()), &config)
                .unwrap();
        let mut lazy = CachedGraph::open(
            Box::new(CsvStore::open(lazy_file.path()).unwrap()),
            &GraphConfig::default(),
        )
        .unwrap();
        for id in [1, 2] {
            assert_eq!(eager.get_node(id).unwrap(), lazy.get_node(id).unwrap());
        }
        assert_eq!(eager.cache_size(), 5);
        assert_eq!(eager.cache_size(), lazy.cache_size());
        assert_eq!(eager.fetch_count(), 0);
    }
}
