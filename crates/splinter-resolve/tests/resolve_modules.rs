//! Module resolution tests: classification handlers, registries, and
//! the build-expression folds.

use splinter_parser::{lex, parse_program};
use splinter_resolve::{
    resolve_module, Config, Exports, ModuleInput, Registry, ResolveError, Resolved, UnitKind,
};

fn config() -> Config {
    Config::new("Sugar", "../../../lib/core")
}

/// Resolve one module from source.
fn resolve_one(registry: &mut Registry, name: &str, source: &str) -> splinter_resolve::Result<()> {
    let lexed = lex(source).expect("lex failed");
    let program = parse_program(&lexed.tokens).expect("parse failed");
    resolve_module(
        registry,
        &config(),
        &ModuleInput {
            name,
            bundle: true,
            source,
            program: &program,
            comments: &lexed.comments,
        },
    )
}

fn resolved(name: &str, source: &str) -> Resolved {
    let mut registry = Registry::new();
    resolve_one(&mut registry, name, source).expect("resolve failed");
    registry.materialize()
}

#[test]
fn variables_and_constants_split_by_case() {
    let out = resolved(
        "common",
        "var HALF_WIDTH_PERIOD = '.';\nvar fullWidthNumberMap;\n",
    );
    let constant = &out.units["HALF_WIDTH_PERIOD"];
    assert_eq!(constant.kind, UnitKind::Constant);
    assert_eq!(constant.path, "common/constants");
    assert_eq!(constant.body.as_deref(), Some("var HALF_WIDTH_PERIOD = '.';"));
    assert_eq!(
        constant.exports,
        Exports::Single("HALF_WIDTH_PERIOD".to_string())
    );

    let variable = &out.units["fullWidthNumberMap"];
    assert_eq!(variable.kind, UnitKind::Variable);
    assert_eq!(variable.path, "common/vars");
}

#[test]
fn bare_literal_initializer_folds_to_direct_export() {
    // `var HALF_WIDTH_ZERO = 48;` reduces the same way a property path
    // does: no body, the initializer text becomes the export.
    let out = resolved("common", "var HALF_WIDTH_ZERO = 48;\n");
    let unit = &out.units["HALF_WIDTH_ZERO"];
    assert!(unit.body.is_none());
    assert_eq!(unit.exports, Exports::Single("48".to_string()));
    assert!(unit.dependencies.is_empty());
}

#[test]
fn property_path_initializer_becomes_re_export() {
    let out = resolved("common", "var trunc = Math.trunc;\nvar internalToString = mirror.toString;\n");
    // A true global path keeps no dependencies.
    let trunc = &out.units["trunc"];
    assert!(trunc.body.is_none());
    assert_eq!(trunc.exports, Exports::Single("Math.trunc".to_string()));
    assert!(trunc.dependencies.is_empty());
    // A unit-rooted path still depends on the unit it re-exports from.
    let unit = &out.units["internalToString"];
    assert_eq!(unit.exports, Exports::Single("mirror.toString".to_string()));
    assert_eq!(unit.dependencies, vec!["mirror"]);
}

#[test]
fn root_object_reference_sets_core_flag() {
    let out = resolved(
        "common",
        "function hasOwn(obj, key) { return Sugar.hasOwnProperty.call(obj, key); }\n",
    );
    let unit = &out.units["hasOwn"];
    assert!(unit.core);
    assert!(!unit.dependencies.contains(&"Sugar".to_string()));
}

#[test]
fn duplicate_top_level_names_raise() {
    let mut registry = Registry::new();
    resolve_one(&mut registry, "alpha", "var shared = 1;\n").unwrap();
    let err = resolve_one(&mut registry, "beta", "function shared() { return 2; }\n").unwrap_err();
    assert!(matches!(err, ResolveError::DuplicateUnit { name, .. } if name == "shared"));
}

#[test]
fn unrecognized_top_level_statement_raises() {
    let mut registry = Registry::new();
    let err = resolve_one(&mut registry, "alpha", "startEngine();\n").unwrap_err();
    assert!(matches!(err, ResolveError::UnrecognizedStatement { .. }));
}

#[test]
fn member_assignment_extends_existing_unit() {
    let out = resolved(
        "common",
        "var registry = {};\nregistry.defaults = baseDefaults;\nvar baseDefaults = {};\n",
    );
    let unit = &out.units["registry"];
    assert_eq!(unit.dependencies, vec!["baseDefaults"]);
    let body = unit.body.as_deref().unwrap();
    assert!(body.contains("var registry = {};"));
    assert!(body.contains("registry.defaults = baseDefaults;"));
}

#[test]
fn member_assignment_to_unknown_unit_raises() {
    let mut registry = Registry::new();
    let err = resolve_one(&mut registry, "alpha", "missing.prop = 1;\n").unwrap_err();
    assert!(matches!(err, ResolveError::UnknownUnit { name, .. } if name == "missing"));
}

#[test]
fn method_block_registers_namespaced_methods() {
    let source = "\
/* @namespace String */
defineInstance(sugarString, {
  'pad': function(str, n) {
    return repeatString(' ', n) + str;
  }
});
";
    let out = resolved("string", source);
    let method = &out.methods["String|pad"];
    assert_eq!(method.name, "pad");
    assert_eq!(method.path, "string");
    assert_eq!(method.exports, "Sugar.String.pad");
    assert_eq!(method.dependencies, vec!["repeatString"]);
    let body = method.body.as_deref().unwrap();
    assert!(body.starts_with("Sugar.String.defineInstance({"));
    assert!(body.contains("'pad': function(str, n)"));
}

#[test]
fn method_outside_namespace_raises() {
    let mut registry = Registry::new();
    let err = resolve_one(
        &mut registry,
        "string",
        "defineInstance(sugarString, { 'pad': function() {} });\n",
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::MissingNamespace { name, .. } if name == "pad"));
}

#[test]
fn top_level_alias_requires_source_method() {
    let source = "\
/* @namespace Date */
alias(sugarDate, 'since', 'from');
";
    let out = resolved("date", source);
    let method = &out.methods["Date|since"];
    assert_eq!(method.requires, vec!["Date|from"]);
    assert!(method.body.as_deref().unwrap().contains("alias(sugarDate, 'since', 'from');"));
    // The alias helper itself is a dependency of the statement.
    assert_eq!(method.dependencies, vec!["alias", "sugarDate"]);
}

// === Build folds ===

#[test]
fn build_with_no_unassigned_vars_keeps_side_effects_only() {
    let source = "\
/* @namespace Number */
var abbreviations = {};
var sugarNumber = {};
function defineInstance(target, methods) {
  attach(target, methods);
}
function attach(target, methods) {
  target.methods = methods;
}
function shorten(n) {
  return n;
}
function buildAbbreviations() {
  abbreviations.k = 1000;
  defineInstance(sugarNumber, {
    'abbr': function(n) {
      return shorten(n);
    }
  });
}
buildAbbreviations();
";
    let out = resolved("number", source);
    let build = &out.units["buildAbbreviations"];
    assert_eq!(build.init.as_deref(), Some("buildAbbreviations();"));
    assert_eq!(build.exports, Exports::None);

    // The method defined inside the build body requires the build
    // function package for its side effect and carries no body.
    let method = &out.methods["Number|abbr"];
    assert!(method.body.is_none());
    assert_eq!(method.requires, vec!["buildAbbreviations"]);
}

#[test]
fn build_with_one_unassigned_var_folds_into_it() {
    let source = "\
var fullWidthNumberMap;
var seedTable = {};
function createMap(seed) {
  return seed;
}
function buildFullWidthNumber() {
  fullWidthNumberMap = createMap(seedTable);
}
buildFullWidthNumber();
";
    let out = resolved("common", source);
    let unit = &out.units["fullWidthNumberMap"];
    let body = unit.body.as_deref().unwrap();
    assert!(body.starts_with("var fullWidthNumberMap;"));
    assert!(body.contains("function buildFullWidthNumber()"));
    assert_eq!(unit.init.as_deref(), Some("buildFullWidthNumber();"));
    // The variable stays independently exportable under its own name,
    // and inherits the build function's remaining dependencies.
    assert_eq!(unit.exports, Exports::Single("fullWidthNumberMap".to_string()));
    assert_eq!(unit.dependencies, vec!["createMap", "seedTable"]);
    assert!(unit.alias.is_none());

    // The absorbed build function no longer exports.
    assert_eq!(out.units["buildFullWidthNumber"].exports, Exports::None);
}

#[test]
fn build_with_many_unassigned_vars_synthesizes_group() {
    let source = "\
var unitNames, unitValues;
function listNames() {
  return [];
}
function listValues() {
  return [];
}
function buildDateUnits() {
  unitNames = listNames();
  unitValues = listValues();
}
buildDateUnits();
";
    let out = resolved("date", source);
    let group = &out.units["dateUnits"];
    assert_eq!(group.kind, UnitKind::BuildGroup);
    assert_eq!(group.path, "date/vars");
    assert_eq!(
        group.exports,
        Exports::Multi(vec!["unitNames".to_string(), "unitValues".to_string()])
    );
    assert_eq!(group.dependencies, vec!["listNames", "listValues"]);
    let body = group.body.as_deref().unwrap();
    assert!(body.contains("var unitNames;"));
    assert!(body.contains("var unitValues;"));
    assert!(body.contains("function buildDateUnits()"));
    assert_eq!(group.init.as_deref(), Some("buildDateUnits();"));

    // Folded variables redirect to the group and are never emitted.
    assert_eq!(out.units["unitNames"].alias.as_deref(), Some("dateUnits"));
    assert_eq!(out.units["unitValues"].alias.as_deref(), Some("dateUnits"));
}

#[test]
fn group_export_list_follows_declaration_order() {
    // The build function references the variables in reverse order;
    // the export list still follows declaration order.
    let source = "\
var first, second;
function one() {
  return 1;
}
function two() {
  return 2;
}
function buildPair() {
  second = two();
  first = one();
}
buildPair();
";
    let out = resolved("common", source);
    assert_eq!(
        out.units["pair"].exports,
        Exports::Multi(vec!["first".to_string(), "second".to_string()])
    );
}

#[test]
fn similar_block_names_from_literal_argument() {
    let source = "\
/* @namespace Number */
var mathAliases;
var sugarNumber = {};
function collect() {
  return {};
}
function wrapMath(name) {
  return name;
}
function defineInstanceSimilar(target, names, fn) {
  target.similar = fn(names);
}
function buildMathAliases() {
  mathAliases = collect();
  defineInstanceSimilar(sugarNumber, 'ceil,floor,round', wrapMath);
}
buildMathAliases();
";
    let out = resolved("number", source);
    for name in ["ceil", "floor", "round"] {
        let method = &out.methods[&format!("Number|{}", name)];
        assert!(method.body.is_none());
        assert_eq!(method.requires, vec!["mathAliases"]);
    }
}

#[test]
fn similar_block_names_from_preceding_comment() {
    let source = "\
/* @namespace Date */
var dateUnitTable;
var units = [];
var sugarDate = {};
function makeTable() {
  return {};
}
function makeRelative(name) {
  return name;
}
function defineInstanceSimilar(target, names, fn) {
  target.similar = fn(names);
}
function buildRelative() {
  dateUnitTable = makeTable();
  /***
   * @set
   *   hoursAgo
   *   daysAgo
   ***/
  defineInstanceSimilar(sugarDate, units, makeRelative);
}
buildRelative();
";
    let out = resolved("date", source);
    assert!(out.methods.contains_key("Date|hoursAgo"));
    assert!(out.methods.contains_key("Date|daysAgo"));
    assert_eq!(out.methods["Date|hoursAgo"].requires, vec!["dateUnitTable"]);
}

#[test]
fn similar_block_without_names_raises() {
    let source = "\
/* @namespace Date */
var t;
var units = [];
var sugarDate = {};
function makeTable() {
  return {};
}
function makeRelative(name) {
  return name;
}
function defineInstanceSimilar(target, names, fn) {
  target.similar = fn(names);
}
function buildT() {
  t = makeTable();
  defineInstanceSimilar(sugarDate, units, makeRelative);
}
buildT();
";
    let mut registry = Registry::new();
    let err = resolve_one(&mut registry, "date", source).unwrap_err();
    assert!(matches!(err, ResolveError::MissingMethodNames { .. }));
}

#[test]
fn alias_inside_build_group_requires_group_not_variable() {
    let source = "\
/* @namespace Date */
var formatShortcuts, formatTokens;
var sugarDate = {};
function shortcuts() {
  return {};
}
function tokens() {
  return {};
}
function stamp(d) {
  return d;
}
function defineInstance(target, methods) {
  target.methods = methods;
}
function alias(target, name, source) {
  target[name] = target[source];
}
function buildFormatUtil() {
  formatShortcuts = shortcuts();
  formatTokens = tokens();
  defineInstance(sugarDate, {
    'format': function(d) {
      return stamp(d);
    }
  });
  alias(sugarDate, 'strftime', 'format');
}
buildFormatUtil();
";
    let out = resolved("date", source);
    let method = &out.methods["Date|strftime"];
    // Exactly two requirement entries: the namespaced source method and
    // the group — never the pre-group variable names.
    assert_eq!(method.requires, vec!["Date|format", "formatUtil"]);
    assert_eq!(out.methods["Date|format"].requires, vec!["formatUtil"]);
    assert_eq!(
        out.units["formatShortcuts"].alias.as_deref(),
        Some("formatUtil")
    );
    assert_eq!(out.units["formatTokens"].alias.as_deref(), Some("formatUtil"));
}

#[test]
fn group_may_replace_its_own_same_named_variable() {
    // A `buildX` function whose held variables include `x` itself: the
    // synthesized group takes the variable's place instead of raising a
    // duplicate error.
    let source = "\
var formatTokens, formatShortcuts;
function makeTokens() {
  return {};
}
function buildFormatTokens() {
  formatTokens = makeTokens();
  formatShortcuts = makeTokens();
}
buildFormatTokens();
";
    let out = resolved("date", source);
    let group = &out.units["formatTokens"];
    assert_eq!(group.kind, UnitKind::BuildGroup);
    assert_eq!(
        group.exports,
        Exports::Multi(vec!["formatTokens".to_string(), "formatShortcuts".to_string()])
    );
    assert!(group.alias.is_none());
    assert_eq!(
        out.units["formatShortcuts"].alias.as_deref(),
        Some("formatTokens")
    );
}

#[test]
fn build_call_before_registration_raises() {
    let mut registry = Registry::new();
    let err = resolve_one(&mut registry, "date", "buildSomething();\n").unwrap_err();
    assert!(matches!(err, ResolveError::UnknownUnit { name, .. } if name == "buildSomething"));
}
