//! Build-expression resolution.
//!
//! A top-level call to a `build`-prefixed function marks that function
//! as the lazy constructor of zero, one, or several forward-declared
//! variables. The call folds into the package that will own the
//! construction side effect, and the build function's body is scanned
//! for the method definitions it performs when run.
//!
//! The three cases:
//!
//! - **zero** unassigned dependencies: the build call exists purely for
//!   its method-definition side effects; the function package absorbs
//!   the call as its init block.
//! - **one**: the single held variable absorbs the function body, the
//!   call, and the function's remaining dependencies, staying
//!   exportable under its own name.
//! - **many**: a new group package (named by stripping the `build`
//!   prefix) bundles every held variable; the variables become aliases
//!   of the group and are never emitted standalone.
//!
//! In every case the build function's own package loses its export: the
//! call has been absorbed and the function no longer stands as an
//! independent exportable unit.

use crate::classify::{self, Shape};
use crate::error::{ResolveError, Result};
use crate::module::ModuleResolver;
use crate::registry::{Exports, Registry, UnitBuilder, UnitKind};
use splinter_ast::{Expr, Stmt};
use tracing::debug;

pub(crate) fn process_build(
    resolver: &ModuleResolver<'_>,
    registry: &mut Registry,
    stmt: &Stmt,
    call: &Expr,
) -> Result<()> {
    let line = resolver.line_of(stmt.span());
    let Some(callee) = call.bare_callee().map(str::to_string) else {
        return Err(resolver.unrecognized(stmt.span(), "build call requires a bare callee"));
    };
    let fn_call = resolver.node_body(stmt.span()).to_string();

    let Some(fn_pkg) = registry.units.get(&callee) else {
        return Err(ResolveError::UnknownUnit {
            module: resolver.module.to_string(),
            line,
            name: callee,
        });
    };
    if fn_pkg.kind != UnitKind::Internal {
        return Err(ResolveError::BuildNotFunction {
            module: resolver.module.to_string(),
            line,
            name: callee,
        });
    }
    let fn_body_text = fn_pkg.body.clone();
    let fn_core = fn_pkg.core;
    let fn_deps = fn_pkg.dependencies.clone();
    let fn_stmts = fn_pkg.fn_body.clone().unwrap_or_default();

    // Partition the build function's dependencies into the
    // forward-declared holes this call fills and everything already
    // satisfied.
    let mut unassigned = Vec::new();
    let mut satisfied = Vec::new();
    for dep in &fn_deps {
        let Some(pkg) = registry.units.get(dep) else {
            return Err(ResolveError::UnknownUnit {
                module: resolver.module.to_string(),
                line,
                name: dep.clone(),
            });
        };
        if pkg.unassigned {
            unassigned.push(dep.clone());
        } else {
            satisfied.push(dep.clone());
        }
    }
    // Folded variables keep their declaration order, not the order the
    // build function happens to reference them in.
    unassigned.sort_by_key(|name| registry.units.get_index_of(name).unwrap_or(usize::MAX));

    debug!(
        build = %callee,
        unassigned = unassigned.len(),
        "folding build expression"
    );

    let main_name = match unassigned.len() {
        0 => {
            // Method-definition side effects only.
            if let Some(fp) = registry.units.get_mut(&callee) {
                fp.append_init(&fn_call);
                fp.exports = Exports::None;
            }
            callee.clone()
        }
        1 => {
            let var_name = unassigned[0].clone();
            if let Some(vp) = registry.units.get_mut(&var_name) {
                let declared = vp.body.take();
                vp.body = join_blocks([declared, fn_body_text.clone()]);
                vp.append_init(&fn_call);
                vp.dependencies.extend(satisfied.iter().cloned());
                vp.core |= fn_core;
            }
            if let Some(fp) = registry.units.get_mut(&callee) {
                fp.exports = Exports::None;
            }
            var_name
        }
        _ => {
            let group_name = group_name_for(&callee);
            let mut names = Vec::new();
            let mut declares = Vec::new();
            for var in &unassigned {
                if let Some(vp) = registry.units.get_mut(var) {
                    vp.alias = Some(group_name.clone());
                    names.push(vp.name.clone());
                    if let Some(body) = &vp.body {
                        declares.push(body.clone());
                    }
                }
            }
            let body = join_blocks([Some(declares.join("\n")), fn_body_text.clone()]);
            let group = UnitBuilder {
                name: group_name.clone(),
                kind: UnitKind::BuildGroup,
                module: resolver.module.to_string(),
                path: format!("{}/{}", resolver.module, UnitKind::BuildGroup.dir()),
                core: fn_core,
                body,
                init: Some(fn_call.clone()),
                exports: Exports::Multi(names),
                dependencies: satisfied.clone(),
                alias: None,
                unassigned: false,
                fn_body: None,
            };
            // A folded variable may spell the same as the group (a
            // `buildX` function building `x`); the group then takes the
            // variable's place. Any other clash is a genuine duplicate.
            match registry.units.get(&group_name) {
                Some(existing) if existing.alias.as_deref() == Some(group_name.as_str()) => {
                    registry.units.insert(group_name.clone(), group);
                }
                Some(_) => {
                    return Err(ResolveError::DuplicateUnit {
                        name: group_name,
                        module: resolver.module.to_string(),
                    });
                }
                None => registry.insert_unit(group)?,
            }
            if let Some(fp) = registry.units.get_mut(&callee) {
                fp.exports = Exports::None;
            }
            group_name
        }
    };

    // The build function may define methods when run; register each so
    // requiring the method pulls in the owning package's side effect
    // first.
    for inner in &fn_stmts {
        match classify::classify(inner) {
            Some(Shape::MethodBlock { call, .. }) => {
                for property in resolver.method_block_properties(call)? {
                    let name = property.key.text();
                    let prop_line = resolver.line_of(property.span);
                    let namespace = resolver.namespace_at(prop_line, &name)?;
                    resolver.register_method(
                        registry,
                        &name,
                        &namespace,
                        None,
                        Vec::new(),
                        vec![main_name.clone()],
                    )?;
                }
            }
            Some(Shape::SimilarMethodBlock { call }) => {
                let names = resolver.similar_method_names(inner, call)?;
                let stmt_line = resolver.line_of(inner.span());
                for name in names {
                    let namespace = resolver.namespace_at(stmt_line, &name)?;
                    resolver.register_method(
                        registry,
                        &name,
                        &namespace,
                        None,
                        Vec::new(),
                        vec![main_name.clone()],
                    )?;
                }
            }
            Some(Shape::AliasCall { call }) => {
                let (name, source_name) = resolver.alias_args(call)?;
                let stmt_line = resolver.line_of(inner.span());
                let namespace = resolver.namespace_at(stmt_line, &name)?;
                resolver.register_method(
                    registry,
                    &name,
                    &namespace,
                    None,
                    Vec::new(),
                    vec![
                        format!("{}|{}", namespace, source_name),
                        main_name.clone(),
                    ],
                )?;
            }
            // Construction statements; only definitions interest the
            // scanner.
            _ => {}
        }
    }

    Ok(())
}

/// Group name for a multi-variable build: strip the `build` prefix and
/// lower the first letter.
fn group_name_for(build_name: &str) -> String {
    let stripped = build_name
        .strip_prefix(classify::BUILD_PREFIX)
        .unwrap_or(build_name);
    if stripped.is_empty() {
        return build_name.to_lowercase();
    }
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn join_blocks<const N: usize>(blocks: [Option<String>; N]) -> Option<String> {
    let joined: Vec<String> = blocks.into_iter().flatten().collect();
    if joined.is_empty() {
        None
    } else {
        Some(joined.join("\n\n"))
    }
}
