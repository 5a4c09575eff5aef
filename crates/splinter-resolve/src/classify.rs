//! Top-level statement classification.
//!
//! One centralized, total function maps a statement to a tagged shape;
//! every handler dispatches on the returned variant. The callee-name
//! marker sets below are configuration constants of the source
//! convention, not user input.

use splinter_ast::{Expr, Function, Literal, Stmt, VarDeclarator};

/// Callee names that define public methods from an object literal of
/// name/function pairs.
pub const DEFINER_NAMES: &[&str] = &[
    "defineStatic",
    "defineInstance",
    "defineInstanceAndStatic",
    "defineStaticWithArguments",
    "defineInstanceWithArguments",
    "defineInstanceAndStaticWithArguments",
];

/// Callee names that define a batch of similarly-shaped methods whose
/// name list comes from an argument or a preceding comment.
pub const SIMILAR_NAMES: &[&str] = &[
    "defineStaticSimilar",
    "defineInstanceSimilar",
    "defineInstanceAndStaticSimilar",
];

/// Callee name that registers one method as an alias of another.
pub const ALIAS_NAME: &str = "alias";

/// Prefix marking a lazy-construction function; a top-level call to one
/// hands off to the build-expression resolver.
pub const BUILD_PREFIX: &str = "build";

/// Recognized top-level statement shapes.
#[derive(Debug)]
pub enum Shape<'a> {
    /// `'use strict';` directive — ignored.
    UseStrict,
    VarDeclaration(&'a [VarDeclarator]),
    FunctionDeclaration(&'a Function),
    /// A definer call: its second argument is an object literal of
    /// method definitions.
    MethodBlock { definer: &'a str, call: &'a Expr },
    /// A similar-batch definer call. Only legal inside a build
    /// function's body.
    SimilarMethodBlock { call: &'a Expr },
    /// `root.path.prop = value;` — extends an existing unit.
    MemberAssignment { assignment: &'a Expr },
    /// `alias(namespace, name, source);`
    AliasCall { call: &'a Expr },
    /// `buildX();` — hand off to the build-expression resolver.
    BuildCall { call: &'a Expr },
}

/// Classify a top-level statement. `None` means the statement matches
/// no recognized shape and the module is structurally invalid.
pub fn classify(stmt: &Stmt) -> Option<Shape<'_>> {
    match stmt {
        Stmt::VarDecl { declarations, .. } => Some(Shape::VarDeclaration(declarations)),
        Stmt::FunctionDecl(function) => Some(Shape::FunctionDeclaration(function)),
        Stmt::Expr { expression, .. } => classify_expr(expression),
        _ => None,
    }
}

fn classify_expr(expr: &Expr) -> Option<Shape<'_>> {
    if let Expr::Literal {
        value: Literal::String(s),
        ..
    } = expr
    {
        if s == "use strict" {
            return Some(Shape::UseStrict);
        }
    }

    if let Some(name) = expr.bare_callee() {
        if DEFINER_NAMES.contains(&name) {
            return Some(Shape::MethodBlock {
                definer: name,
                call: expr,
            });
        }
        if SIMILAR_NAMES.contains(&name) {
            return Some(Shape::SimilarMethodBlock { call: expr });
        }
        if name == ALIAS_NAME {
            return Some(Shape::AliasCall { call: expr });
        }
        if name.starts_with(BUILD_PREFIX) {
            return Some(Shape::BuildCall { call: expr });
        }
    }

    if let Expr::Assignment { left, .. } = expr {
        if matches!(left.as_ref(), Expr::Member { .. }) {
            return Some(Shape::MemberAssignment { assignment: expr });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use splinter_parser::{lex, parse_program};

    fn first_stmt(source: &str) -> Stmt {
        let lexed = lex(source).unwrap();
        parse_program(&lexed.tokens).unwrap().remove(0)
    }

    #[test]
    fn classifies_all_shapes() {
        assert!(matches!(
            classify(&first_stmt("'use strict';")),
            Some(Shape::UseStrict)
        ));
        assert!(matches!(
            classify(&first_stmt("var a = 1, B_C;")),
            Some(Shape::VarDeclaration(d)) if d.len() == 2
        ));
        assert!(matches!(
            classify(&first_stmt("function helper() { return 1; }")),
            Some(Shape::FunctionDeclaration(_))
        ));
        assert!(matches!(
            classify(&first_stmt(
                "defineInstance(sugarString, { 'pad': function() {} });"
            )),
            Some(Shape::MethodBlock {
                definer: "defineInstance",
                ..
            })
        ));
        assert!(matches!(
            classify(&first_stmt("defineInstanceSimilar(sugarNumber, 'a,b', fn);")),
            Some(Shape::SimilarMethodBlock { .. })
        ));
        assert!(matches!(
            classify(&first_stmt("config.defaults.locale = 'en';")),
            Some(Shape::MemberAssignment { .. })
        ));
        assert!(matches!(
            classify(&first_stmt("alias(sugarDate, 'from', 'create');")),
            Some(Shape::AliasCall { .. })
        ));
        assert!(matches!(
            classify(&first_stmt("buildDateUnits();")),
            Some(Shape::BuildCall { .. })
        ));
    }

    #[test]
    fn unrecognized_shapes_are_none() {
        // Bare call to a non-marker function.
        assert!(classify(&first_stmt("setup();")).is_none());
        // Assignment to a plain identifier is not a member assignment.
        assert!(classify(&first_stmt("x = 1;")).is_none());
        // Control flow is never a top-level shape.
        assert!(classify(&first_stmt("if (a) { b(); }")).is_none());
    }

    #[test]
    fn compound_member_assignment_is_recognized() {
        assert!(matches!(
            classify(&first_stmt("counts.total += 1;")),
            Some(Shape::MemberAssignment { .. })
        ));
    }
}
