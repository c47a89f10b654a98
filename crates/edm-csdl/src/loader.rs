//! Schema document loader with reference support

use crate::memory::InMemoryProvider;
use crate::model::CsdlSchema;
use crate::{Error, Result};
use dashmap::DashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Loads schema documents from JSON or YAML files found in search paths
pub struct SchemaLoader {
    schema_paths: Vec<PathBuf>,
    cache: DashMap<String, CsdlSchema>,
}

impl SchemaLoader {
    /// Create a new schema loader with the given search paths
    pub fn new(schema_paths: Vec<PathBuf>) -> Self {
        Self {
            schema_paths,
            cache: DashMap::new(),
        }
    }

    /// Add a search path for schema files
    pub fn add_path(&mut self, path: PathBuf) {
        self.schema_paths.push(path);
    }

    pub fn schema_paths(&self) -> &[PathBuf] {
        &self.schema_paths
    }

    /// Load a schema by namespace
    /// First checks the cache, then searches the schema paths
    pub fn load(&self, namespace: &str) -> Result<CsdlSchema> {
        if let Some(cached) = self.cached(namespace) {
            debug!("Cache hit for schema: {}", namespace);
            return Ok(cached);
        }

        trace!("Cache miss for schema: {}", namespace);
        let schema = self.load_from_disk(namespace)?;
        if schema.namespace != namespace {
            return Err(Error::InvalidFormat(format!(
                "File for namespace {} declares namespace {}",
                namespace, schema.namespace
            )));
        }

        self.cache.insert(namespace.to_string(), schema.clone());
        Ok(schema)
    }

    /// Load a schema and, transitively, every schema it references
    /// Returns schemas in load order, the requested one first
    pub fn load_with_references(&self, namespace: &str) -> Result<Vec<CsdlSchema>> {
        info!("Loading schema with references: {}", namespace);

        let root = self.load(namespace)?;
        let mut visited = HashSet::from([root.namespace.clone()]);
        self.collect_references(root, &mut visited)
    }

    /// Load every schema referenced by already loaded documents
    pub fn resolve_references(&self, schemas: Vec<CsdlSchema>) -> Result<Vec<CsdlSchema>> {
        let mut visited: HashSet<String> = schemas.iter().map(|s| s.namespace.clone()).collect();
        let mut result = Vec::new();
        for schema in schemas {
            let mut loaded = self.collect_references(schema, &mut visited)?;
            result.append(&mut loaded);
        }
        Ok(result)
    }

    /// Load documents and their references into an in-memory provider
    pub fn load_provider(&self, files: &[PathBuf]) -> Result<InMemoryProvider> {
        let schemas = files
            .iter()
            .map(|path| self.load_from_file(path))
            .collect::<Result<Vec<_>>>()?;
        let schemas = self.resolve_references(schemas)?;
        Ok(InMemoryProvider::from_schemas(schemas))
    }

    /// Load a schema from a specific file path
    pub fn load_from_file(&self, path: &Path) -> Result<CsdlSchema> {
        trace!("Loading schema from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        {
            self.load_from_yaml(&content)
        } else {
            self.load_from_json(&content)
        }
    }

    /// Load a schema from JSON string
    pub fn load_from_json(&self, json: &str) -> Result<CsdlSchema> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {}", e)))
    }

    /// Load a schema from YAML string
    pub fn load_from_yaml(&self, yaml: &str) -> Result<CsdlSchema> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {}", e)))
    }

    fn cached(&self, namespace: &str) -> Option<CsdlSchema> {
        self.cache.get(namespace).map(|entry| entry.value().clone())
    }

    /// Walk the reference graph breadth first, loading each namespace once
    fn collect_references(
        &self,
        root: CsdlSchema,
        visited: &mut HashSet<String>,
    ) -> Result<Vec<CsdlSchema>> {
        let mut pending = vec![root];
        let mut loaded = Vec::new();

        while !pending.is_empty() {
            let current = pending.remove(0);
            for reference in &current.references {
                if !visited.insert(reference.clone()) {
                    continue;
                }
                let schema = match self.load(reference) {
                    Ok(schema) => schema,
                    Err(Error::NotFound(_)) => {
                        return Err(Error::Reference(format!(
                            "Referenced schema not found: {} (referenced by {})",
                            reference, current.namespace
                        )));
                    }
                    Err(e) => return Err(e),
                };
                pending.push(schema);
            }
            loaded.push(current);
        }

        trace!(
            "Resolved references: {:?}",
            loaded.iter().map(|s| s.namespace.as_str()).collect::<Vec<_>>()
        );
        Ok(loaded)
    }

    /// Find `<namespace>.json|yaml|yml` in the search paths
    ///
    /// File names match the namespace case-insensitively. Within one
    /// directory `json` beats `yaml` beats `yml`.
    fn load_from_disk(&self, namespace: &str) -> Result<CsdlSchema> {
        for path in &self.schema_paths {
            if let Some(file_path) = find_schema_file(path, namespace)? {
                trace!("Found schema file: {:?}", file_path);
                return self.load_from_file(&file_path);
            }
        }

        Err(Error::NotFound(format!(
            "Schema {} not found in search paths: {:?}",
            namespace, self.schema_paths
        )))
    }
}

fn find_schema_file(dir: &Path, namespace: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut best: Option<(usize, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let file_path = entry?.path();
        let (Some(stem), Some(extension)) = (
            file_path.file_stem().and_then(|s| s.to_str()),
            file_path.extension().and_then(|e| e.to_str()),
        ) else {
            continue;
        };
        if !stem.eq_ignore_ascii_case(namespace) || !file_path.is_file() {
            continue;
        }
        let Some(rank) = EXTENSIONS
            .iter()
            .position(|known| known.eq_ignore_ascii_case(extension))
        else {
            continue;
        };
        if best.as_ref().is_none_or(|(current, _)| rank < *current) {
            best = Some((rank, file_path));
        }
    }
    Ok(best.map(|(_, file_path)| file_path))
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }
}
