//! Unit and method registries.
//!
//! Phase one accumulates mutable builder records; once every module has
//! been processed the registry is materialized into immutable packages
//! for the emitter. Both tables are owned values threaded by reference
//! through the pass — never ambient state — and preserve insertion
//! order so reruns are byte-deterministic.

use crate::error::{ResolveError, Result};
use indexmap::IndexMap;
use splinter_ast::Stmt;

/// Category of a top-level unit, which also picks its output
/// subdirectory within the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Variable,
    Constant,
    Internal,
    /// Synthesized group bundling several build-constructed variables.
    BuildGroup,
}

impl UnitKind {
    /// Output subdirectory for this kind.
    pub fn dir(self) -> &'static str {
        match self {
            UnitKind::Variable | UnitKind::BuildGroup => "vars",
            UnitKind::Constant => "constants",
            UnitKind::Internal => "internal",
        }
    }
}

/// Export shape of a package. Exactly one of these holds at emission
/// time for every non-alias package.
#[derive(Debug, Clone, PartialEq)]
pub enum Exports {
    /// Pure side-effect package; nothing to export.
    None,
    /// A single name or property path.
    Single(String),
    /// A named group of values (always two or more).
    Multi(Vec<String>),
    /// Re-export the root library object package.
    Core,
}

impl Exports {
    pub fn is_none(&self) -> bool {
        matches!(self, Exports::None)
    }
}

/// Mutable record of one top-level unit during phase one.
#[derive(Debug, Clone)]
pub struct UnitBuilder {
    pub name: String,
    pub kind: UnitKind,
    pub module: String,
    /// Output directory, `<module>/<kind dir>`.
    pub path: String,
    /// References the root library object.
    pub core: bool,
    pub body: Option<String>,
    /// Executable call appended after the body at emission time.
    pub init: Option<String>,
    pub exports: Exports,
    pub dependencies: Vec<String>,
    /// Redirect target: when set, this unit is never emitted and all
    /// references to it resolve to the named group.
    pub alias: Option<String>,
    /// Declared at top level with no initializer — a hole a build call
    /// may later fill.
    pub unassigned: bool,
    /// Body statements, retained for internal functions so a build
    /// call can scan them for nested method definitions.
    pub fn_body: Option<Vec<Stmt>>,
}

impl UnitBuilder {
    /// Append `text` to an accumulated block, newline-separated.
    pub fn append_body(&mut self, text: &str) {
        append_block(&mut self.body, text);
    }

    pub fn append_init(&mut self, text: &str) {
        append_block(&mut self.init, text);
    }
}

fn append_block(slot: &mut Option<String>, text: &str) {
    match slot {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(text);
        }
        None => *slot = Some(text.to_string()),
    }
}

/// Mutable record of one public method during phase one.
///
/// Methods are always core (their export path hangs off the root
/// object), so no flag is carried.
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    pub name: String,
    pub namespace: String,
    pub module: String,
    /// Output directory: the lowercased namespace.
    pub path: String,
    /// Absent when the method exists only to be satisfied by a build
    /// group's side effect.
    pub body: Option<String>,
    pub dependencies: Vec<String>,
    /// Names required for side effect only, never bound: the package
    /// that defines this method, and for aliases the source method key.
    pub requires: Vec<String>,
    /// Exported path, `<Root>.<Namespace>.<name>`.
    pub exports: String,
}

/// One processed module, recorded for bundle emission.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub name: String,
    /// Whether an aggregate file requiring all of this module's
    /// methods is emitted.
    pub bundle: bool,
}

/// The two phase-one tables plus the processed-module list.
#[derive(Debug, Default)]
pub struct Registry {
    pub units: IndexMap<String, UnitBuilder>,
    /// Keyed `namespace|name` so same-named methods in different
    /// namespaces never collide.
    pub methods: IndexMap<String, MethodBuilder>,
    pub modules: Vec<ModuleRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit. Top-level names are global across the whole
    /// source set; a second registration is an error, never an
    /// overwrite.
    pub fn insert_unit(&mut self, unit: UnitBuilder) -> Result<()> {
        if self.units.contains_key(&unit.name) {
            return Err(ResolveError::DuplicateUnit {
                name: unit.name.clone(),
                module: unit.module.clone(),
            });
        }
        self.units.insert(unit.name.clone(), unit);
        Ok(())
    }

    /// Register a method under its namespaced key.
    pub fn insert_method(&mut self, key: String, method: MethodBuilder) -> Result<()> {
        if self.methods.contains_key(&key) {
            return Err(ResolveError::DuplicateMethod {
                key,
                module: method.module.clone(),
            });
        }
        self.methods.insert(key, method);
        Ok(())
    }

    /// Freeze phase-one state into immutable packages.
    pub fn materialize(self) -> Resolved {
        let units = self
            .units
            .into_iter()
            .map(|(name, b)| {
                (
                    name,
                    UnitPackage {
                        name: b.name,
                        kind: b.kind,
                        module: b.module,
                        path: b.path,
                        core: b.core,
                        body: b.body,
                        init: b.init,
                        exports: b.exports,
                        dependencies: b.dependencies,
                        alias: b.alias,
                    },
                )
            })
            .collect();
        let methods = self
            .methods
            .into_iter()
            .map(|(key, b)| {
                (
                    key,
                    MethodPackage {
                        name: b.name,
                        namespace: b.namespace,
                        module: b.module,
                        path: b.path,
                        body: b.body,
                        dependencies: b.dependencies,
                        requires: b.requires,
                        exports: b.exports,
                    },
                )
            })
            .collect();
        Resolved {
            units,
            methods,
            modules: self.modules,
        }
    }
}

/// Immutable unit package, the emitter's input.
#[derive(Debug, Clone)]
pub struct UnitPackage {
    pub name: String,
    pub kind: UnitKind,
    pub module: String,
    pub path: String,
    pub core: bool,
    pub body: Option<String>,
    pub init: Option<String>,
    pub exports: Exports,
    pub dependencies: Vec<String>,
    pub alias: Option<String>,
}

/// Immutable method package.
#[derive(Debug, Clone)]
pub struct MethodPackage {
    pub name: String,
    pub namespace: String,
    pub module: String,
    pub path: String,
    pub body: Option<String>,
    pub dependencies: Vec<String>,
    pub requires: Vec<String>,
    pub exports: String,
}

/// Fully resolved output of phase one.
#[derive(Debug)]
pub struct Resolved {
    pub units: IndexMap<String, UnitPackage>,
    pub methods: IndexMap<String, MethodPackage>,
    pub modules: Vec<ModuleRecord>,
}
