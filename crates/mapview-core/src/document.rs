//! The source map document and its loaded form.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::decode;
use crate::error::{LoadError, Result};
use crate::index::{ForwardIndex, InverseIndex};
use crate::record::MappingRecord;

/// The only supported document version.
pub const SUPPORTED_VERSION: i64 = 3;

/// Raw JSON document as supplied by the build tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDocument {
    #[serde(default)]
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub mappings: String,
}

impl MappingDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One original text and its records in original order.
#[derive(Debug)]
pub struct Source {
    name: String,
    content: String,
    inverse: InverseIndex,
}

impl Source {
    fn new(name: String, content: String) -> Self {
        Self {
            name,
            content,
            inverse: InverseIndex::new(),
        }
    }

    /// Display name, prefixed with the document's `sourceRoot`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn inverse_index(&self) -> &InverseIndex {
        &self.inverse
    }
}

/// A loaded source map: validated, decoded and indexed.
#[derive(Debug)]
pub struct SourceMap {
    file: Option<String>,
    sources: Vec<Source>,
    names: Vec<String>,
    forward: ForwardIndex,
}

impl SourceMap {
    /// Parse and load a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let document = MappingDocument::from_json(json)?;
        Self::load(document)
    }

    /// Read a JSON document from disk.
    ///
    /// I/O failures surface as a JSON error so callers only deal with
    /// [`LoadError`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())
            .map_err(|err| LoadError::Json(serde_json::Error::io(err)))?;
        let document: MappingDocument = serde_json::from_reader(std::io::BufReader::new(file))?;
        Self::load(document)
    }

    /// Validate, decode and index a document. All-or-nothing.
    pub fn load(document: MappingDocument) -> Result<Self> {
        if document.version != SUPPORTED_VERSION {
            warn!(found = document.version, "rejecting source map");
            return Err(LoadError::InvalidVersion {
                found: document.version,
            });
        }

        let started = Instant::now();
        let decoded = decode(
            &document.mappings,
            document.sources.len(),
            document.names.len(),
        )
        .inspect_err(|err| warn!(error = %err, "failed to decode mappings"))?;
        let unsorted_lines = decoded.unsorted_lines.len();
        let forward = ForwardIndex::from_decoded(decoded);

        let MappingDocument {
            file,
            source_root,
            sources,
            sources_content,
            names,
            ..
        } = document;
        let mut contents = sources_content.unwrap_or_default().into_iter();
        let mut sources: Vec<Source> = sources
            .into_iter()
            .map(|name| {
                let content = contents.next().flatten().unwrap_or_default();
                Source::new(join_source_root(source_root.as_deref(), &name), content)
            })
            .collect();

        for record in forward.records().iter() {
            if let Some(source) = record.source().and_then(|i| sources.get_mut(i)) {
                source.inverse.push(&record);
            }
        }

        debug!(
            records = forward.len(),
            sources = sources.len(),
            names = names.len(),
            unsorted_lines,
            elapsed_us = started.elapsed().as_micros() as u64,
            "loaded source map"
        );

        Ok(Self {
            file,
            sources,
            names,
            forward,
        })
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn forward_index(&self) -> &ForwardIndex {
        &self.forward
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn source(&self, index: usize) -> Option<&Source> {
        self.sources.get(index)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Name of a record's symbol, if it has one.
    pub fn name_of(&self, record: &MappingRecord) -> Option<&str> {
        record.name().and_then(|i| self.name(i))
    }

    /// Supply the text of a source whose content was absent from the
    /// document. Returns false when `index` addresses no source.
    pub fn set_source_content(&mut self, index: usize, content: impl Into<String>) -> bool {
        match self.sources.get_mut(index) {
            Some(source) => {
                source.content = content.into();
                true
            }
            None => false,
        }
    }

    /// The record covering a generated position; the last of any duplicates
    /// wins.
    pub fn original_for(&self, line: i32, column: i32) -> Option<MappingRecord> {
        let records = self.forward.records();
        records.lookup(line, column).map(|i| records.record(i))
    }

    /// The record covering a position in source `source`.
    pub fn generated_for(&self, source: usize, line: i32, column: i32) -> Option<MappingRecord> {
        let records = self.sources.get(source)?.inverse.records();
        records.lookup(line, column).map(|i| records.record(i))
    }
}

fn join_source_root(root: Option<&str>, name: &str) -> String {
    match root {
        Some(root) if !root.is_empty() => {
            if root.ends_with('/') {
                format!("{root}{name}")
            } else {
                format!("{root}/{name}")
            }
        }
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r#"{
        "version": 3,
        "file": "out.js",
        "sources": ["a.js", "b.js"],
        "sourcesContent": ["foo", null],
        "names": ["foo"],
        "mappings": "AAAA,GAAGA;ACAA"
    }"#;

    #[test]
    fn test_load_builds_both_indexes() {
        let map = SourceMap::from_json(SIMPLE).expect("loads");
        assert_eq!(map.file(), Some("out.js"));
        assert_eq!(map.forward_index().len(), 3);
        assert_eq!(map.sources().len(), 2);
        assert_eq!(map.source(0).map(Source::content), Some("foo"));
        assert_eq!(map.source(1).map(Source::content), Some(""));

        let a = map.source(0).expect("source a").inverse_index();
        assert_eq!(a.len(), 2);
        let b = map.source(1).expect("source b").inverse_index();
        assert_eq!(b.len(), 1);
        assert_eq!(b.records().record(0).generated_line, 1);
    }

    #[test]
    fn test_point_lookups() {
        let map = SourceMap::from_json(SIMPLE).expect("loads");

        let record = map.original_for(0, 4).expect("mapped");
        assert_eq!(record.generated_column, 3);
        assert_eq!(record.original_column, 3);
        assert_eq!(map.name_of(&record), Some("foo"));

        let back = map.generated_for(0, 0, 3).expect("mapped");
        assert_eq!(back.generated_column, 3);
        assert!(map.generated_for(5, 0, 0).is_none());
        assert!(map.original_for(7, 0).is_none());
    }

    #[test]
    fn test_version_rejected() {
        let err = SourceMap::from_json(r#"{"version": 2, "sources": [], "mappings": ""}"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidVersion { found: 2 }));
        assert!(err.is_full_panel());
    }

    #[test]
    fn test_source_root_prefix() {
        let map = SourceMap::from_json(
            r#"{"version": 3, "sourceRoot": "src", "sources": ["a.js"], "mappings": "AAAA"}"#,
        )
        .expect("loads");
        assert_eq!(map.source(0).map(Source::name), Some("src/a.js"));
    }

    #[test]
    fn test_set_source_content() {
        let mut map = SourceMap::from_json(SIMPLE).expect("loads");
        assert!(map.set_source_content(1, "bar"));
        assert_eq!(map.source(1).map(Source::content), Some("bar"));
        assert!(!map.set_source_content(9, "x"));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            SourceMap::from_json("{not json"),
            Err(LoadError::Json(_))
        ));
    }
}
