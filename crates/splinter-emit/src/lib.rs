// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Phase two of the splinter pipeline: render every resolved package
//! into a self-contained CommonJS file.
//!
//! Emission is pure — it returns `(path, contents)` pairs and never
//! touches the filesystem — so byte-determinism is directly testable
//! and a failing package leaves nothing half-written on disk. Packages
//! are independent once phase one has resolved the graph; no cross-file
//! ordering constraint exists beyond what each file's own requires
//! encode.

mod error;
mod paths;
mod render;

pub use error::{EmitError, Result};
pub use render::RenderedFile;

use render::{ExportView, PackageView};
use splinter_resolve::{Config, Exports, Resolved, UnitKind};
use tracing::debug;

/// Render every non-alias unit, every method, and the per-module
/// bundles.
pub fn emit(resolved: &Resolved, config: &Config) -> Result<Vec<RenderedFile>> {
    let mut files = Vec::new();

    for unit in resolved.units.values() {
        if unit.alias.is_some() {
            // Alias units are redirect targets only; all references
            // already point at their group.
            continue;
        }
        let view = PackageView {
            name: &unit.name,
            dir: &unit.path,
            core: unit.core,
            hoist: unit.kind == UnitKind::Internal && !unit.exports.is_none(),
            body: unit.body.as_deref(),
            init: unit.init.as_deref(),
            dependencies: &unit.dependencies,
            requires: &[],
            exports: export_view(&unit.exports),
        };
        files.push(render::render(&view, resolved, config)?);
    }

    for method in resolved.methods.values() {
        let view = PackageView {
            name: &method.name,
            dir: &method.path,
            core: true,
            hoist: false,
            body: method.body.as_deref(),
            init: None,
            dependencies: &method.dependencies,
            requires: &method.requires,
            exports: ExportView::Single(&method.exports),
        };
        files.push(render::render(&view, resolved, config)?);
    }

    for module in &resolved.modules {
        if module.bundle {
            files.push(render_bundle(&module.name, resolved, config)?);
        }
    }

    debug!(files = files.len(), "rendered packages");
    Ok(files)
}

fn export_view(exports: &Exports) -> ExportView<'_> {
    match exports {
        Exports::None => ExportView::None,
        Exports::Single(value) => ExportView::Single(value),
        Exports::Multi(names) => ExportView::Multi(names),
        Exports::Core => ExportView::Core,
    }
}

/// The per-module aggregate: requires every public method the module
/// registered, and re-exports the root object for chaining.
fn render_bundle(module: &str, resolved: &Resolved, config: &Config) -> Result<RenderedFile> {
    let mut lines: Vec<String> = resolved
        .methods
        .values()
        .filter(|method| method.module == module)
        .map(|method| {
            let path = format!("{}/{}", method.path, method.name);
            format!("require('./{}');", path)
        })
        .collect();
    lines.sort();

    let body = lines.join("\n");
    let view = PackageView {
        name: module,
        dir: "",
        core: false,
        hoist: false,
        body: if body.is_empty() { None } else { Some(&body) },
        init: None,
        dependencies: &[],
        requires: &[],
        exports: ExportView::Core,
    };
    render::render(&view, resolved, config)
}
