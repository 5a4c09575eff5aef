//! Package rendering.
//!
//! Turns one resolved package into the text of a self-contained
//! CommonJS module: requires, multi-export re-bindings, body, init
//! call, and export statement, joined as blank-line-separated blocks.

use crate::error::{EmitError, Result};
use crate::paths::{join_path, path_for_require, relative};
use indexmap::IndexSet;
use splinter_resolve::{Config, Exports, Resolved};
use std::path::PathBuf;

const TAB: &str = "  ";
const BLOCK_DELIMITER: &str = "\n\n";
const STRICT: &str = "\"use strict\";";

/// Marker placed above a hoisted function body so a reader of the
/// generated file understands the inverted layout.
const HOIST_PREAMBLE: &str = "// Exported function declaration was hoisted here\n\
                              // to avoid problems with circular dependencies.";

/// One generated output file, path relative to the output root.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Uniform view over unit, method, and bundle packages for rendering.
pub(crate) struct PackageView<'a> {
    pub name: &'a str,
    pub dir: &'a str,
    pub core: bool,
    /// Exported internal function: body and export hoist above the
    /// requires so two mutually recursive functions can require each
    /// other without a load-order cycle.
    pub hoist: bool,
    pub body: Option<&'a str>,
    pub init: Option<&'a str>,
    pub dependencies: &'a [String],
    pub requires: &'a [String],
    pub exports: ExportView<'a>,
}

pub(crate) enum ExportView<'a> {
    None,
    Single(&'a str),
    Multi(&'a [String]),
    Core,
}

pub(crate) fn render(
    view: &PackageView<'_>,
    resolved: &Resolved,
    config: &Config,
) -> Result<RenderedFile> {
    let deps = prepare_deps(view.dependencies, resolved);
    let requires = requires_block(view, &deps, resolved, config)?;
    let assigns = assigns_block(&deps, resolved);
    let exports = exports_block(view, config);
    let body = view.body.unwrap_or_default().to_string();
    let init = view.init.unwrap_or_default().to_string();

    let blocks = if view.hoist {
        let hoisted = format!("{}\n{}", HOIST_PREAMBLE, body);
        vec![STRICT.to_string(), hoisted, exports, requires, assigns, init]
    } else {
        vec![STRICT.to_string(), requires, assigns, body, init, exports]
    };

    let contents = blocks
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join(BLOCK_DELIMITER);

    Ok(RenderedFile {
        path: PathBuf::from(view.dir).join(format!("{}.js", view.name)),
        contents,
    })
}

/// Deduplicate, length-sort, and alias-collapse a dependency list.
///
/// Dependencies pointing at alias-marked units are replaced by their
/// group, appended after the sorted names so a group is required at
/// most once.
fn prepare_deps(dependencies: &[String], resolved: &Resolved) -> Vec<String> {
    let deduped: IndexSet<&String> = dependencies.iter().collect();
    let mut deps: Vec<String> = deduped.into_iter().cloned().collect();
    deps.sort_by_key(|d| d.len());

    let mut groups: Vec<String> = Vec::new();
    deps.retain(|dep| {
        if let Some(alias) = resolved.units.get(dep).and_then(|u| u.alias.clone()) {
            if !groups.contains(&alias) {
                groups.push(alias);
            }
            false
        } else {
            true
        }
    });
    deps.extend(groups);
    deps
}

fn requires_block(
    view: &PackageView<'_>,
    deps: &[String],
    resolved: &Resolved,
    config: &Config,
) -> Result<String> {
    let mut blocks = Vec::new();

    if view.core {
        blocks.push(format!(
            "var {} = require('{}');\n",
            config.root_object,
            core_require_path(view.dir, config)
        ));
    }

    if !deps.is_empty() {
        let named = deps
            .iter()
            .map(|dep| {
                Ok(format!(
                    "{} = require('{}')",
                    dep,
                    dependency_path(view, dep, resolved)?
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        blocks.push(format!(
            "var {};\n",
            named.join(&format!(",\n{}{}", TAB, TAB))
        ));
    }

    if !view.requires.is_empty() {
        let mut sorted = view.requires.to_vec();
        sorted.sort();
        let lines = sorted
            .iter()
            .map(|name| Ok(format!("require('{}');", dependency_path(view, name, resolved)?)))
            .collect::<Result<Vec<_>>>()?;
        blocks.push(lines.join("\n"));
    }

    Ok(blocks.join("\n"))
}

/// Extract each name of a multi-export dependency into a same-named
/// local, so folded-group members read like the originals.
fn assigns_block(deps: &[String], resolved: &Resolved) -> String {
    let mut assigns = Vec::new();
    for dep in deps {
        if let Some(unit) = resolved.units.get(dep) {
            if let Exports::Multi(names) = &unit.exports {
                if names.len() > 1 {
                    for token in names {
                        assigns.push(format!("{} = {}.{}", token, unit.name, token));
                    }
                }
            }
        }
    }
    if assigns.is_empty() {
        return String::new();
    }
    assigns.sort_by_key(|a| a.len());
    format!("var {};\n", assigns.join(&format!(",\n{}{}", TAB, TAB)))
}

fn exports_block(view: &PackageView<'_>, config: &Config) -> String {
    match &view.exports {
        ExportView::None => String::new(),
        ExportView::Single(value) => format!("module.exports = {};", value),
        ExportView::Core => format!(
            "module.exports = require('{}');",
            core_require_path(view.dir, config)
        ),
        ExportView::Multi(names) => {
            let mut mapped: Vec<String> = names
                .iter()
                .map(|name| format!("{}'{}': {}", TAB, name, name))
                .collect();
            mapped.sort_by_key(|m| m.len());
            format!("module.exports = {{\n{}\n}};", mapped.join(",\n"))
        }
    }
}

/// Require path of the root-object package from `dir`. A bare
/// specifier (no leading `.`) is used verbatim; a relative one is
/// recomputed per emitting directory.
fn core_require_path(dir: &str, config: &Config) -> String {
    if config.core_path.starts_with('.') {
        path_for_require(&relative(dir, &config.core_path))
    } else {
        config.core_path.clone()
    }
}

/// Resolve a dependency name against both registries and compute its
/// require path from the emitting package's directory.
fn dependency_path(view: &PackageView<'_>, name: &str, resolved: &Resolved) -> Result<String> {
    let (dir, file) = if let Some(unit) = resolved.units.get(name) {
        (unit.path.as_str(), unit.name.as_str())
    } else if let Some(method) = resolved.methods.get(name) {
        (method.path.as_str(), method.name.as_str())
    } else {
        return Err(EmitError::MissingDependency {
            package: view.name.to_string(),
            dependency: name.to_string(),
        });
    };
    Ok(path_for_require(&join_path(&relative(view.dir, dir), file)))
}
