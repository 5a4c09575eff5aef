//! Free-variable dependency resolution.
//!
//! Given a syntax subtree, computes the ordered set of identifiers it
//! references but does not bind. The walk is a closed match over every
//! node kind the AST defines, mirroring the shape of the tree itself:
//! binding positions accumulate into `locals`, reference positions into
//! `deps`, and the final filter drops locals, language globals, and the
//! whitelist.
//!
//! Scope handling is deliberately flat: one `locals` set for the whole
//! analyzed unit, exclusion applied at the end. That is sufficient
//! because the source set never reuses one spelling for two different
//! bindings within a single top-level unit, and it keeps the walk a
//! single pass with no scope stack.

use crate::config::Config;
use indexmap::IndexSet;
use splinter_ast::{
    CatchClause, Expr, ForInTarget, ForInit, Function, MemberProp, Property, Stmt, SwitchCase,
    VarDeclarator,
};

/// Dependencies of a variable declarator: the name binds, the
/// initializer is walked.
pub fn declarator_deps(declarator: &VarDeclarator, config: &Config) -> Vec<String> {
    let mut collector = Collector::new();
    collector.declarator(declarator);
    collector.finish(config)
}

/// Dependencies of a function declaration: name and parameters bind,
/// the body is walked.
pub fn function_deps(function: &Function, config: &Config) -> Vec<String> {
    let mut collector = Collector::new();
    collector.function_decl(function);
    collector.finish(config)
}

/// Dependencies of an object literal property (the value side only;
/// the key is never a reference).
pub fn property_deps(property: &Property, config: &Config) -> Vec<String> {
    let mut collector = Collector::new();
    collector.expr(&property.value);
    collector.finish(config)
}

/// Dependencies of a bare expression.
pub fn expr_deps(expr: &Expr, config: &Config) -> Vec<String> {
    let mut collector = Collector::new();
    collector.expr(expr);
    collector.finish(config)
}

/// Dependencies of a statement.
pub fn stmt_deps(stmt: &Stmt, config: &Config) -> Vec<String> {
    let mut collector = Collector::new();
    collector.stmt(stmt);
    collector.finish(config)
}

/// Accumulates bindings and references over one walk.
struct Collector {
    locals: IndexSet<String>,
    deps: IndexSet<String>,
}

impl Collector {
    fn new() -> Self {
        Self {
            locals: IndexSet::new(),
            deps: IndexSet::new(),
        }
    }

    fn local(&mut self, name: &str) {
        self.locals.insert(name.to_string());
    }

    /// Record a reference; first occurrence fixes its position in the
    /// output ordering.
    fn dep(&mut self, name: &str) {
        self.deps.insert(name.to_string());
    }

    fn finish(self, config: &Config) -> Vec<String> {
        let Collector { locals, deps } = self;
        deps.into_iter()
            .filter(|d| !locals.contains(d) && !config.is_excluded(d))
            .collect()
    }

    fn declarator(&mut self, declarator: &VarDeclarator) {
        self.local(&declarator.id.name);
        if let Some(init) = &declarator.init {
            self.expr(init);
        }
    }

    fn function_decl(&mut self, function: &Function) {
        if let Some(name) = &function.name {
            self.local(&name.name);
        }
        for param in &function.params {
            self.local(&param.name);
        }
        self.stmts(&function.body);
    }

    fn catch_clause(&mut self, clause: &CatchClause) {
        self.local(&clause.param.name);
        self.stmts(&clause.body);
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr { expression, .. } => self.expr(expression),
            Stmt::VarDecl { declarations, .. } => {
                for declarator in declarations {
                    self.declarator(declarator);
                }
            }
            Stmt::FunctionDecl(function) => self.function_decl(function),
            Stmt::Block { body, .. } => self.stmts(body),
            Stmt::If {
                test,
                consequent,
                alternate,
                ..
            } => {
                self.expr(test);
                self.stmt(consequent);
                if let Some(alternate) = alternate {
                    self.stmt(alternate);
                }
            }
            Stmt::For {
                init,
                test,
                update,
                body,
                ..
            } => {
                match init {
                    Some(ForInit::Var(declarations)) => {
                        for declarator in declarations {
                            self.declarator(declarator);
                        }
                    }
                    Some(ForInit::Expr(expr)) => self.expr(expr),
                    None => {}
                }
                if let Some(test) = test {
                    self.expr(test);
                }
                if let Some(update) = update {
                    self.expr(update);
                }
                self.stmt(body);
            }
            Stmt::ForIn {
                left, right, body, ..
            } => {
                match left {
                    ForInTarget::Var(declarator) => self.declarator(declarator),
                    ForInTarget::Expr(expr) => self.expr(expr),
                }
                self.expr(right);
                self.stmt(body);
            }
            Stmt::While { test, body, .. } => {
                self.expr(test);
                self.stmt(body);
            }
            Stmt::DoWhile { body, test, .. } => {
                self.stmt(body);
                self.expr(test);
            }
            Stmt::Switch {
                discriminant,
                cases,
                ..
            } => {
                self.expr(discriminant);
                for SwitchCase { test, body, .. } in cases {
                    if let Some(test) = test {
                        self.expr(test);
                    }
                    self.stmts(body);
                }
            }
            Stmt::Try {
                block,
                handler,
                finalizer,
                ..
            } => {
                self.stmts(block);
                if let Some(handler) = handler {
                    self.catch_clause(handler);
                }
                if let Some(finalizer) = finalizer {
                    self.stmts(finalizer);
                }
            }
            Stmt::Throw { argument, .. } => self.expr(argument),
            Stmt::Return { argument, .. } => {
                if let Some(argument) = argument {
                    self.expr(argument);
                }
            }
            // No references inside.
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty { .. } => {}
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(id) => self.dep(&id.name),
            Expr::Literal { .. } | Expr::This { .. } => {}
            Expr::Array { elements, .. } => {
                for element in elements {
                    self.expr(element);
                }
            }
            Expr::Object { properties, .. } => {
                // Keys are labels, not references; only values count.
                for property in properties {
                    self.expr(&property.value);
                }
            }
            Expr::Function(function) => {
                // A function expression's own name is not visible
                // outside it and never becomes a dependency; parameters
                // shadow like any other binding.
                for param in &function.params {
                    self.local(&param.name);
                }
                self.stmts(&function.body);
            }
            Expr::Unary { argument, .. } | Expr::Update { argument, .. } => self.expr(argument),
            Expr::Binary { left, right, .. }
            | Expr::Logical { left, right, .. }
            | Expr::Assignment { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
                ..
            } => {
                self.expr(test);
                self.expr(consequent);
                self.expr(alternate);
            }
            Expr::Call {
                callee, arguments, ..
            }
            | Expr::New {
                callee, arguments, ..
            } => {
                self.expr(callee);
                for argument in arguments {
                    self.expr(argument);
                }
            }
            Expr::Member {
                object, property, ..
            } => {
                self.expr(object);
                // A static property name is never a free identifier;
                // only a computed subscript is live code.
                if let MemberProp::Computed(index) = property {
                    self.expr(index);
                }
            }
            Expr::Sequence { expressions, .. } => {
                for expression in expressions {
                    self.expr(expression);
                }
            }
        }
    }
}
