// crates/saltcheck-providers/src/states.rs
// ============================================================================
// Module: SLS State Catalog
// Description: State enumeration and plan compilation from local file roots.
// Purpose: Answer state listings, low-level plans, and top-file lookups.
// Dependencies: saltcheck-core, indexmap, serde_json, walkdir
// ============================================================================

//! ## Overview
//! States live in per-environment file roots as YAML `.sls` files. A state
//! named `a.b` is either `a/b.sls` or `a/b/init.sls` under the first root
//! that has it. Compiling a state yields one plan entry per state
//! declaration, with `include:` lists compiled first and each state compiled
//! at most once.
//!
//! Declarations that cannot be compiled become plain error strings in the
//! plan rather than errors, so callers can keep whatever compiled cleanly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use indexmap::IndexSet;
use saltcheck_core::CatalogError;
use saltcheck_core::StateCatalog;
use serde_json::Map;
use serde_json::Value;
use walkdir::WalkDir;

use crate::source::DEFAULT_MAX_FILE_BYTES;
use crate::source::read_yaml;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// State file extension.
const STATE_EXTENSION: &str = "sls";
/// Package entry file name stem.
const INIT_STEM: &str = "init";
/// Top file name at the root of a file root.
pub const TOP_FILE: &str = "top.sls";
/// Declaration key listing included states.
const INCLUDE_KEY: &str = "include";
/// Declaration key extending other states.
const EXTEND_KEY: &str = "extend";

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// State catalog backed by local file roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlsStateCatalog {
    /// State tree roots per environment.
    file_roots: BTreeMap<String, Vec<PathBuf>>,
    /// Maximum state file size, in bytes.
    max_bytes: usize,
}

impl SlsStateCatalog {
    /// Creates a catalog over the given file roots.
    #[must_use]
    pub fn new(file_roots: BTreeMap<String, Vec<PathBuf>>) -> Self {
        Self {
            file_roots,
            max_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    /// Overrides the maximum state file size.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Returns the file roots for an environment.
    #[must_use]
    pub fn roots(&self, saltenv: &str) -> &[PathBuf] {
        self.file_roots.get(saltenv).map(Vec::as_slice).unwrap_or_default()
    }

    /// Finds the source file for a state, if any root provides one.
    #[must_use]
    pub fn locate(&self, state: &str, saltenv: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = state.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty() || *segment == "..") {
            return None;
        }
        let relative: PathBuf = segments.iter().collect();
        self.roots(saltenv).iter().find_map(|root| {
            let module = root.join(&relative).with_extension(STATE_EXTENSION);
            if module.is_file() {
                return Some(module);
            }
            let package = root.join(&relative).join(INIT_STEM).with_extension(STATE_EXTENSION);
            package.is_file().then_some(package)
        })
    }

    /// Compiles a state and its includes into `plan`.
    fn compile(
        &self,
        state: &str,
        saltenv: &str,
        visited: &mut BTreeSet<String>,
        plan: &mut Vec<Value>,
    ) -> Result<(), CatalogError> {
        if !visited.insert(state.to_string()) {
            return Ok(());
        }
        let path =
            self.locate(state, saltenv).ok_or_else(|| CatalogError::NotFound(state.to_string()))?;
        let body = match read_yaml(&path, self.max_bytes)? {
            Value::Null => return Ok(()),
            Value::Object(body) => body,
            _ => {
                plan.push(Value::String(format!("SLS {state} does not render to a dictionary")));
                return Ok(());
            }
        };

        let package = if is_package_entry(&path) { state } else { parent_of(state) };
        match body.get(INCLUDE_KEY) {
            None => {}
            Some(Value::Array(items)) => {
                for item in items {
                    let Some(name) = include_name(item) else {
                        plan.push(Value::String(format!(
                            "Include Declaration in SLS {state} is not formed as a string"
                        )));
                        continue;
                    };
                    let target = resolve_include(package, name);
                    if self.locate(&target, saltenv).is_none() {
                        plan.push(Value::String(format!(
                            "Specified SLS {target} in saltenv {saltenv} is not available"
                        )));
                        continue;
                    }
                    self.compile(&target, saltenv, visited, plan)?;
                }
            }
            Some(_) => plan.push(Value::String(format!(
                "Include Declaration in SLS {state} is not formed as a list"
            ))),
        }

        for (id, declaration) in &body {
            if id == INCLUDE_KEY || id == EXTEND_KEY || id.starts_with("__") {
                continue;
            }
            let Value::Object(modules) = declaration else {
                plan.push(Value::String(format!("ID {id} in SLS {state} is not a dictionary")));
                continue;
            };
            for (module_key, arguments) in modules {
                if module_key.starts_with("__") {
                    continue;
                }
                let (module, function) = match module_key.split_once('.') {
                    Some((module, function)) => (module, Some(function.to_string())),
                    None => (module_key.as_str(), inline_function(arguments)),
                };
                let Some(function) = function else {
                    plan.push(Value::String(format!(
                        "No function declared for {module} in ID {id} of SLS {state}"
                    )));
                    continue;
                };
                plan.push(low_entry(state, id, module, &function));
            }
        }
        Ok(())
    }
}

impl StateCatalog for SlsStateCatalog {
    fn list_known_states(&self, saltenv: &str) -> Result<Vec<String>, CatalogError> {
        let mut states = BTreeSet::new();
        for root in self.roots(saltenv) {
            if !root.is_dir() {
                continue;
            }
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry.map_err(|err| CatalogError::Io(err.to_string()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(name) =
                    entry.path().strip_prefix(root).ok().and_then(state_name_for)
                {
                    states.insert(name);
                }
            }
        }
        Ok(states.into_iter().collect())
    }

    fn show_low_sls(&self, state: &str, saltenv: &str) -> Result<Vec<Value>, CatalogError> {
        let mut plan = Vec::new();
        let mut visited = BTreeSet::new();
        self.compile(state, saltenv, &mut visited, &mut plan)?;
        Ok(plan)
    }

    fn show_top(&self, saltenv: &str) -> Result<Vec<String>, CatalogError> {
        let mut roots = IndexSet::new();
        for root in self.file_roots.values().flatten() {
            roots.insert(root.as_path());
        }
        let mut found = false;
        let mut states = IndexSet::new();
        for root in roots {
            let path = root.join(TOP_FILE);
            if !path.is_file() {
                continue;
            }
            let environments = match read_yaml(&path, self.max_bytes)? {
                Value::Null => continue,
                Value::Object(environments) => environments,
                _ => {
                    return Err(CatalogError::Parse(format!(
                        "{} must be a mapping of environments",
                        path.display()
                    )));
                }
            };
            let Some(targets) = environments.get(saltenv) else {
                continue;
            };
            let Value::Object(targets) = targets else {
                return Err(CatalogError::Parse(format!(
                    "{}: environment {saltenv} must map targets to state lists",
                    path.display()
                )));
            };
            found = true;
            for entries in targets.values() {
                let Value::Array(entries) = entries else {
                    continue;
                };
                for entry in entries {
                    if let Value::String(state) = entry {
                        states.insert(state.clone());
                    }
                }
            }
        }
        if !found {
            return Err(CatalogError::NotFound(format!("no top file entries for {saltenv}")));
        }
        Ok(states.into_iter().collect())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds one plan entry.
fn low_entry(state: &str, id: &str, module: &str, function: &str) -> Value {
    let mut entry = Map::new();
    entry.insert("__sls__".to_string(), Value::String(state.to_string()));
    entry.insert("__id__".to_string(), Value::String(id.to_string()));
    entry.insert("name".to_string(), Value::String(id.to_string()));
    entry.insert("state".to_string(), Value::String(module.to_string()));
    entry.insert("fun".to_string(), Value::String(function.to_string()));
    Value::Object(entry)
}

/// Returns the first bare string in a declaration's argument list.
fn inline_function(arguments: &Value) -> Option<String> {
    let Value::Array(items) = arguments else {
        return None;
    };
    items.iter().find_map(|item| item.as_str().map(str::to_string))
}

/// Returns the state named by an include item.
fn include_name(item: &Value) -> Option<&str> {
    match item {
        Value::String(name) => Some(name),
        Value::Object(map) if map.len() == 1 => map.keys().next().map(String::as_str),
        _ => None,
    }
}

/// Resolves a relative include (`.sibling`, `..cousin`) against a package.
fn resolve_include(package: &str, name: &str) -> String {
    let rest = name.trim_start_matches('.');
    let dots = name.len() - rest.len();
    if dots == 0 {
        return name.to_string();
    }
    let mut segments: Vec<&str> = package.split('.').filter(|segment| !segment.is_empty()).collect();
    for _ in 1..dots {
        segments.pop();
    }
    if !rest.is_empty() {
        segments.push(rest);
    }
    segments.join(".")
}

/// Returns the parent package of a dotted state name.
fn parent_of(state: &str) -> &str {
    state.rsplit_once('.').map_or("", |(parent, _)| parent)
}

/// Returns true when the path is a package entry (`init.sls`).
fn is_package_entry(path: &Path) -> bool {
    path.file_stem().is_some_and(|stem| stem == INIT_STEM)
}

/// Maps a path relative to a file root onto a state name.
fn state_name_for(relative: &Path) -> Option<String> {
    if relative.extension()? != STATE_EXTENSION || relative == Path::new(TOP_FILE) {
        return None;
    }
    let mut segments = Vec::new();
    for component in relative.with_extension("").components() {
        let segment = component.as_os_str().to_str()?;
        if segment.is_empty() || segment.contains('.') {
            return None;
        }
        segments.push(segment.to_string());
    }
    if segments.last().is_some_and(|last| last == INIT_STEM) {
        segments.pop();
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("."))
}
