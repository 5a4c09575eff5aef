//! Per-module resolution pass.
//!
//! Walks one module's top-level statements in source order, dispatching
//! each recognized shape to its handler and writing into the shared
//! registries. Intra-module order is load-bearing (a build call needs
//! its build function registered first); inter-module order is not,
//! since units are named globally.

use crate::build;
use crate::classify::{self, Shape};
use crate::comments::{method_names_in_comment, CommentMap, NamespaceTracker};
use crate::config::Config;
use crate::deps;
use crate::error::{ResolveError, Result};
use crate::registry::{
    Exports, MethodBuilder, ModuleRecord, Registry, UnitBuilder, UnitKind,
};
use regex::Regex;
use splinter_ast::{Expr, Function, Literal, Property, SourceText, Span, Stmt, VarDeclarator};
use splinter_lexer::Comment;
use std::sync::LazyLock;
use tracing::debug;

static ASSIGN_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+=\s+").expect("assign spacing regex"));
static PROP_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.]+ = ([\w.]+)$").expect("property alias regex"));

/// One module's parsed inputs.
pub struct ModuleInput<'a> {
    pub name: &'a str,
    /// Whether to emit the aggregate bundle file for this module.
    pub bundle: bool,
    pub source: &'a str,
    pub program: &'a [Stmt],
    pub comments: &'a [Comment],
}

/// Resolve one module into the registries.
pub fn resolve_module(
    registry: &mut Registry,
    config: &Config,
    input: &ModuleInput<'_>,
) -> Result<()> {
    debug!(module = input.name, statements = input.program.len(), "resolving module");
    let source = SourceText::new(input.source);
    let resolver = ModuleResolver {
        config,
        module: input.name,
        comments: CommentMap::new(input.comments, source.index()),
        namespaces: NamespaceTracker::from_comments(input.comments, source.index()),
        source,
    };
    registry.modules.push(ModuleRecord {
        name: input.name.to_string(),
        bundle: input.bundle,
    });
    for stmt in input.program {
        resolver.top_level(registry, stmt)?;
    }
    Ok(())
}

/// Shared context for one module's handlers.
pub(crate) struct ModuleResolver<'a> {
    pub(crate) config: &'a Config,
    pub(crate) module: &'a str,
    pub(crate) source: SourceText<'a>,
    pub(crate) comments: CommentMap,
    pub(crate) namespaces: NamespaceTracker,
}

impl<'a> ModuleResolver<'a> {
    fn top_level(&self, registry: &mut Registry, stmt: &Stmt) -> Result<()> {
        match classify::classify(stmt) {
            Some(Shape::UseStrict) => Ok(()),
            Some(Shape::VarDeclaration(declarations)) => self.add_vars(registry, declarations),
            Some(Shape::FunctionDeclaration(function)) => self.add_internal(registry, function),
            Some(Shape::MethodBlock { definer, call }) => {
                self.process_method_block(registry, definer, call)
            }
            Some(Shape::SimilarMethodBlock { .. }) => Err(self.unrecognized(
                stmt.span(),
                "similar-definition calls are only legal inside a build function",
            )),
            Some(Shape::MemberAssignment { assignment }) => {
                self.process_member_assignment(registry, stmt, assignment)
            }
            Some(Shape::AliasCall { call }) => self.process_alias(registry, stmt, call),
            Some(Shape::BuildCall { call }) => build::process_build(self, registry, stmt, call),
            None => Err(self.unrecognized(stmt.span(), "statement matches no recognized shape")),
        }
    }

    // === Position and text helpers ===

    pub(crate) fn line_of(&self, span: Span) -> u32 {
        self.source.start_line(span)
    }

    /// Node text widened to its line start (keeps indentation).
    pub(crate) fn node_body(&self, span: Span) -> &'a str {
        self.source.slice_from_line_start(span)
    }

    pub(crate) fn unrecognized(&self, span: Span, detail: &str) -> ResolveError {
        ResolveError::UnrecognizedStatement {
            module: self.module.to_string(),
            line: self.line_of(span),
            detail: detail.to_string(),
        }
    }

    /// Namespace in effect at `line`, required for method registration.
    pub(crate) fn namespace_at(&self, line: u32, name: &str) -> Result<String> {
        self.namespaces
            .resolve(line)
            .map(str::to_string)
            .ok_or_else(|| ResolveError::MissingNamespace {
                module: self.module.to_string(),
                line,
                name: name.to_string(),
            })
    }

    /// Drop the root library object from a dependency list, reporting
    /// whether it was referenced (the core flag).
    fn strip_root(&self, dependencies: &mut Vec<String>) -> bool {
        if let Some(pos) = dependencies
            .iter()
            .position(|d| d == &self.config.root_object)
        {
            dependencies.remove(pos);
            true
        } else {
            false
        }
    }

    // === Handlers ===

    fn add_vars(&self, registry: &mut Registry, declarations: &[VarDeclarator]) -> Result<()> {
        for declarator in declarations {
            let name = declarator.id.name.clone();
            let kind = if is_constant_name(&name) {
                UnitKind::Constant
            } else {
                UnitKind::Variable
            };

            let inner = self.source.slice(declarator.span);
            let normalized = ASSIGN_SPACING.replace(inner, " = ");
            let (body, exports) = if let Some(caps) = PROP_ALIAS.captures(&normalized) {
                // A bare property-path initializer reduces to a
                // re-export of that path; no body is emitted at all.
                (None, Exports::Single(caps[1].to_string()))
            } else {
                (Some(format!("var {};", inner)), Exports::Single(name.clone()))
            };

            let mut dependencies = deps::declarator_deps(declarator, self.config);
            let core = self.strip_root(&mut dependencies);

            registry.insert_unit(UnitBuilder {
                path: format!("{}/{}", self.module, kind.dir()),
                name,
                kind,
                module: self.module.to_string(),
                core,
                body,
                init: None,
                exports,
                dependencies,
                alias: None,
                unassigned: declarator.init.is_none(),
                fn_body: None,
            })?;
        }
        Ok(())
    }

    fn add_internal(&self, registry: &mut Registry, function: &Function) -> Result<()> {
        let Some(ident) = &function.name else {
            return Err(self.unrecognized(function.span, "anonymous function at top level"));
        };
        let name = ident.name.clone();
        let mut dependencies = deps::function_deps(function, self.config);
        let core = self.strip_root(&mut dependencies);

        registry.insert_unit(UnitBuilder {
            path: format!("{}/{}", self.module, UnitKind::Internal.dir()),
            name: name.clone(),
            kind: UnitKind::Internal,
            module: self.module.to_string(),
            core,
            body: Some(self.node_body(function.span).to_string()),
            init: None,
            exports: Exports::Single(name),
            dependencies,
            alias: None,
            unassigned: false,
            fn_body: Some(function.body.clone()),
        })
    }

    fn process_method_block(
        &self,
        registry: &mut Registry,
        definer: &str,
        call: &Expr,
    ) -> Result<()> {
        for property in self.method_block_properties(call)? {
            let name = property.key.text();
            let line = self.line_of(property.span);
            let namespace = self.namespace_at(line, &name)?;

            let mut dependencies = deps::property_deps(property, self.config);
            self.strip_root(&mut dependencies);

            // The bare definer call becomes a namespaced call on the
            // root object, so the method file only needs the core
            // import.
            let body = format!(
                "{}.{}.{}({{\n\n{}\n\n}});",
                self.config.root_object,
                namespace,
                definer,
                self.node_body(property.span)
            );

            self.register_method(
                registry,
                &name,
                &namespace,
                Some(body),
                dependencies,
                Vec::new(),
            )?;
        }
        Ok(())
    }

    fn process_member_assignment(
        &self,
        registry: &mut Registry,
        stmt: &Stmt,
        assignment: &Expr,
    ) -> Result<()> {
        let Expr::Assignment { left, right, .. } = assignment else {
            return Err(self.unrecognized(stmt.span(), "expected member assignment"));
        };

        // Walk down to the root identifier of the property path.
        let mut object: &Expr = left;
        while let Expr::Member { object: inner, .. } = object {
            object = inner;
        }
        let Expr::Ident(root) = object else {
            return Err(self.unrecognized(
                stmt.span(),
                "member assignment with a non-identifier root",
            ));
        };

        let mut dependencies = deps::expr_deps(right, self.config);
        dependencies.retain(|d| d != &root.name);
        let core = self.strip_root(&mut dependencies);
        let body = self.node_body(stmt.span()).to_string();
        let line = self.line_of(stmt.span());

        let Some(unit) = registry.units.get_mut(&root.name) else {
            return Err(ResolveError::UnknownUnit {
                module: self.module.to_string(),
                line,
                name: root.name.clone(),
            });
        };
        unit.dependencies.extend(dependencies);
        unit.core |= core;
        unit.append_body(&body);
        Ok(())
    }

    fn process_alias(&self, registry: &mut Registry, stmt: &Stmt, call: &Expr) -> Result<()> {
        let (name, source_name) = self.alias_args(call)?;
        let line = self.line_of(stmt.span());
        let namespace = self.namespace_at(line, &name)?;

        let mut dependencies = deps::stmt_deps(stmt, self.config);
        self.strip_root(&mut dependencies);

        self.register_method(
            registry,
            &name,
            &namespace,
            Some(self.node_body(stmt.span()).to_string()),
            dependencies,
            vec![format!("{}|{}", namespace, source_name)],
        )
    }

    // === Shared registration plumbing ===

    pub(crate) fn register_method(
        &self,
        registry: &mut Registry,
        name: &str,
        namespace: &str,
        body: Option<String>,
        dependencies: Vec<String>,
        requires: Vec<String>,
    ) -> Result<()> {
        let key = format!("{}|{}", namespace, name);
        registry.insert_method(
            key,
            MethodBuilder {
                name: name.to_string(),
                namespace: namespace.to_string(),
                module: self.module.to_string(),
                path: namespace.to_lowercase(),
                body,
                dependencies,
                requires,
                exports: format!("{}.{}.{}", self.config.root_object, namespace, name),
            },
        )
    }

    /// The object-literal method table of a definer call (its second
    /// argument).
    pub(crate) fn method_block_properties<'b>(&self, call: &'b Expr) -> Result<&'b [Property]> {
        let Expr::Call { arguments, .. } = call else {
            return Err(self.unrecognized(call.span(), "expected a definer call"));
        };
        match arguments.get(1) {
            Some(Expr::Object { properties, .. }) => Ok(properties),
            _ => Err(self.unrecognized(
                call.span(),
                "definer call requires an object literal of methods",
            )),
        }
    }

    /// Name and source-name arguments of an alias call.
    pub(crate) fn alias_args(&self, call: &Expr) -> Result<(String, String)> {
        let Expr::Call { arguments, .. } = call else {
            return Err(self.unrecognized(call.span(), "expected an alias call"));
        };
        match (arguments.get(1), arguments.get(2)) {
            (
                Some(Expr::Literal {
                    value: Literal::String(name),
                    ..
                }),
                Some(Expr::Literal {
                    value: Literal::String(source),
                    ..
                }),
            ) => Ok((name.clone(), source.clone())),
            _ => Err(self.unrecognized(
                call.span(),
                "alias call requires literal name and source arguments",
            )),
        }
    }

    /// Method names of a similar-definition call: a literal
    /// comma-separated second argument, else the `@method`/`@set` tags
    /// of the nearest preceding comment.
    pub(crate) fn similar_method_names(&self, stmt: &Stmt, call: &Expr) -> Result<Vec<String>> {
        let Expr::Call { arguments, .. } = call else {
            return Err(self.unrecognized(call.span(), "expected a similar-definition call"));
        };
        if let Some(Expr::Literal {
            value: Literal::String(list),
            ..
        }) = arguments.get(1)
        {
            if !list.is_empty() {
                return Ok(list.split(',').map(str::to_string).collect());
            }
        }
        let line = self.line_of(stmt.span());
        let names = self
            .comments
            .nearest_above(line)
            .map(method_names_in_comment)
            .unwrap_or_default();
        if names.is_empty() {
            return Err(ResolveError::MissingMethodNames {
                module: self.module.to_string(),
                line,
            });
        }
        Ok(names)
    }
}

/// All-caps/underscore names are constants; everything else is a
/// variable.
fn is_constant_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '_')
}
