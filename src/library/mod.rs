//! Library provider: read-only access to the routes/blocks/program tables.
//!
//! The provider is pure plumbing. Column names are matched
//! case-insensitively and insensitive to separators/whitespace so the same
//! reader works against spreadsheets, CSV exports or JSON records.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::types::{ContentBlock, RouteTemplate};

/// A header row plus data rows, the lowest common denominator of every
/// tabular backend we read from.
#[derive(Debug, Clone, Default)]
pub struct RowTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Normalize a header for lookup: uppercase, strip whitespace and
/// punctuation.
fn norm_header(h: &str) -> String {
    h.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

impl RowTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Build a table from JSON records (array of flat objects). Non-string
    /// scalars are stringified; null becomes empty.
    pub fn from_records(records: &[Value]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for rec in records {
            if let Value::Object(map) = rec {
                for key in map.keys() {
                    if !columns.iter().any(|c| norm_header(c) == norm_header(key)) {
                        columns.push(key.clone());
                    }
                }
            }
        }
        let rows = records
            .iter()
            .filter_map(|rec| rec.as_object())
            .map(|map| {
                columns
                    .iter()
                    .map(|col| {
                        map.iter()
                            .find(|(k, _)| norm_header(k) == norm_header(col))
                            .map(|(_, v)| scalar_to_string(v))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, candidates: &[&str]) -> Option<usize> {
        for cand in candidates {
            let key = norm_header(cand);
            if let Some(idx) = self.columns.iter().position(|c| norm_header(c) == key) {
                return Some(idx);
            }
        }
        None
    }

    fn cell(&self, row: usize, col: Option<usize>) -> &str {
        col.and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Read a cell by column-name candidates, trimmed.
    pub fn get(&self, row: usize, candidates: &[&str]) -> String {
        self.cell(row, self.column_index(candidates)).trim().to_string()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the named column exists at all.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(&[name]).is_some()
    }
}

fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// An in-memory snapshot of the content library.
#[derive(Debug, Clone, Default)]
pub struct Library {
    pub routes: Vec<RouteTemplate>,
    pub blocks: HashMap<String, ContentBlock>,
}

impl Library {
    /// Build from the three tables. The program table is optional.
    pub fn from_tables(routes: &RowTable, blocks: &RowTable, program: Option<&RowTable>) -> Self {
        let routes = read_routes(routes);
        let mut blocks = read_blocks(blocks);
        if let Some(program) = program {
            apply_program_overrides(program, &mut blocks);
        }
        debug!(
            target: "itinera::library",
            routes = routes.len(),
            blocks = blocks.len(),
            "library loaded"
        );
        Self { routes, blocks }
    }

    /// Load from a JSON document: `{ "routes": [...], "blocks": [...],
    /// "program": [...] }` where each entry is an array of flat records.
    pub fn from_json(value: &Value) -> Result<Self> {
        let records = |key: &str| -> Result<Vec<Value>> {
            match value.get(key) {
                Some(Value::Array(items)) => Ok(items.clone()),
                Some(_) => Err(EngineError::Library(format!(
                    "library `{}` must be an array of records",
                    key
                ))),
                None => Ok(Vec::new()),
            }
        };
        let routes = RowTable::from_records(&records("routes")?);
        let blocks = RowTable::from_records(&records("blocks")?);
        if routes.is_empty() {
            warn!(target: "itinera::library", "library has no routes; generation will rely on fallbacks");
        }
        let program_records = records("program")?;
        let program = if program_records.is_empty() {
            None
        } else {
            Some(RowTable::from_records(&program_records))
        };
        Ok(Self::from_tables(&routes, &blocks, program.as_ref()))
    }

    /// Load from a JSON file on disk (CLI path).
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            EngineError::Library(format!("cannot read library {}: {}", path.display(), err))
        })?;
        let value: Value = serde_json::from_str(&raw)?;
        Self::from_json(&value)
    }
}

/// Read route templates. Day blocks come from DAY_1_BLOCK_ID.. columns,
/// stopping at the first absent column or empty cell, matching how route
/// rows are authored.
pub fn read_routes(table: &RowTable) -> Vec<RouteTemplate> {
    let mut out = Vec::new();
    for r in 0..table.row_count() {
        let route_id = table.get(r, &["ROUTE_ID"]);
        if route_id.is_empty() {
            continue;
        }
        let day_count = table
            .get(r, &["DAYS_COUNT", "DAYS"])
            .parse::<u32>()
            .unwrap_or(0);

        let mut block_ids = Vec::new();
        for d in 1..=crate::types::request::MAX_REQUEST_DAYS {
            let col = format!("DAY_{}_BLOCK_ID", d);
            if !table.has_column(&col) {
                break;
            }
            let id = table.get(r, &[col.as_str()]);
            if id.is_empty() {
                break;
            }
            block_ids.push(id);
        }

        out.push(RouteTemplate {
            route_id,
            city: table.get(r, &["CITY"]),
            season: table.get(r, &["SEASON"]),
            day_count,
            lang: {
                let lang = table.get(r, &["LANG"]);
                if lang.is_empty() {
                    "en".into()
                } else {
                    lang
                }
            },
            tags: table.get(r, &["TAGS"]),
            block_ids,
        });
    }
    out
}

/// Read content blocks keyed by BLOCK_ID.
pub fn read_blocks(table: &RowTable) -> HashMap<String, ContentBlock> {
    let mut map = HashMap::new();
    for r in 0..table.row_count() {
        let block_id = table.get(r, &["BLOCK_ID"]);
        if block_id.is_empty() {
            continue;
        }
        map.insert(
            block_id.clone(),
            ContentBlock {
                block_id,
                title: table.get(r, &["TITLE"]),
                suggested_time: table.get(r, &["SUGGESTED_TIME"]),
                what_it_covers: table.get(r, &["WHAT_IT_COVERS"]),
                output_template: table.get(r, &["OUTPUT_TEMPLATE", "TEXT"]),
                season: table.get(r, &["SEASON"]),
                city: table.get(r, &["CITY"]),
                tags: table.get(r, &["TAGS"]),
                program: None,
            },
        );
    }
    map
}

/// Apply per-block program overrides onto already-loaded blocks. Unknown
/// block ids are skipped.
pub fn apply_program_overrides(table: &RowTable, blocks: &mut HashMap<String, ContentBlock>) {
    for r in 0..table.row_count() {
        let block_id = table.get(r, &["BLOCK_ID"]);
        if block_id.is_empty() {
            continue;
        }
        let program = table.get(r, &["PROGRAM"]);
        if program.is_empty() {
            continue;
        }
        if let Some(block) = blocks.get_mut(&block_id) {
            block.program = Some(program);
        }
    }
}
