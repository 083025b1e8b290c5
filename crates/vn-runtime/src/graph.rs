use std::collections::HashMap;

use thiserror::Error;
use vn_core::SceneRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Scene '{id}' not found.")]
pub struct SceneNotFound {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingTarget {
    pub from: String,
    pub target: String,
}

/// Immutable lookup over the loaded scenes.
///
/// Built once from parse output; ids are matched by exact string equality.
/// When an id repeats, the first row keeps it.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    records: Vec<SceneRecord>,
    by_id: HashMap<String, usize>,
}

impl SceneGraph {
    pub fn new(records: Vec<SceneRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if by_id.contains_key(record.id()) {
                tracing::warn!(id = record.id(), row = index, "duplicate scene id ignored");
                continue;
            }
            by_id.insert(record.id().to_string(), index);
        }
        Self { records, by_id }
    }

    pub fn resolve(&self, id: &str) -> Result<&SceneRecord, SceneNotFound> {
        self.by_id
            .get(id)
            .map(|index| &self.records[*index])
            .ok_or_else(|| SceneNotFound { id: id.to_string() })
    }

    /// First record in parse order.
    pub fn entry(&self) -> Option<&SceneRecord> {
        self.records.first()
    }

    pub fn records(&self) -> &[SceneRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Choice targets that name no scene. Reported only; the graph is never
    /// repaired.
    pub fn dangling_targets(&self) -> Vec<DanglingTarget> {
        self.records
            .iter()
            .flat_map(|record| {
                record
                    .choice_targets()
                    .into_iter()
                    .filter(|target| !self.by_id.contains_key(*target))
                    .map(|target| DanglingTarget {
                        from: record.id().to_string(),
                        target: target.to_string(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod graph_tests {
    use super::*;

    fn graph(raw: &str) -> SceneGraph {
        SceneGraph::new(vn_parser::parse(raw))
    }

    #[test]
    fn resolves_every_parsed_id() {
        let graph = graph("id,text\nstart,Hello\nmiddle,Mid\nend,Bye");
        for id in ["start", "middle", "end"] {
            assert_eq!(graph.resolve(id).expect("id should resolve").id(), id);
        }
        assert_eq!(graph.entry().map(SceneRecord::id), Some("start"));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn unknown_id_reports_not_found() {
        let graph = graph("id,text\nstart,Hello");
        let error = graph.resolve("nowhere").expect_err("missing id should fail");
        assert_eq!(error.id, "nowhere");
        assert!(error.to_string().contains("nowhere"));
        assert!(graph.resolve("Start").is_err());
    }

    #[test]
    fn first_duplicate_wins() {
        let graph = graph("id,text\nstart,First\nstart,Second");
        assert_eq!(graph.resolve("start").expect("resolve").text(), "First");
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn dangling_targets_are_listed() {
        let graph = graph(
            "id,text,option1,target1,option2,target2\nstart,Hi,Go,gone,Stay,start\ngone2,x,,,,",
        );
        assert_eq!(
            graph.dangling_targets(),
            vec![DanglingTarget {
                from: "start".to_string(),
                target: "gone".to_string()
            }]
        );
    }

    #[test]
    fn empty_graph_has_no_entry() {
        let graph = SceneGraph::new(Vec::new());
        assert!(graph.is_empty());
        assert!(graph.entry().is_none());
    }
}
