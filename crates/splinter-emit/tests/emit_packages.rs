//! Emission tests: block ordering, hoisting, alias collapsing, bundles.

use splinter_emit::{emit, EmitError, RenderedFile};
use splinter_parser::{lex, parse_program};
use splinter_resolve::{resolve_module, Config, ModuleInput, Registry, Resolved};
use std::path::Path;

fn config() -> Config {
    Config::new("Sugar", "../../../lib/core")
}

fn resolve_sources(sources: &[(&str, &str)]) -> Resolved {
    let mut registry = Registry::new();
    for (name, source) in sources {
        let lexed = lex(source).expect("lex failed");
        let program = parse_program(&lexed.tokens).expect("parse failed");
        resolve_module(
            &mut registry,
            &config(),
            &ModuleInput {
                name,
                bundle: true,
                source,
                program: &program,
                comments: &lexed.comments,
            },
        )
        .expect("resolve failed");
    }
    registry.materialize()
}

fn emit_sources(sources: &[(&str, &str)]) -> Vec<RenderedFile> {
    emit(&resolve_sources(sources), &config()).expect("emit failed")
}

fn file<'a>(files: &'a [RenderedFile], path: &str) -> &'a RenderedFile {
    files
        .iter()
        .find(|f| f.path == Path::new(path))
        .unwrap_or_else(|| {
            panic!(
                "no file {}; have {:?}",
                path,
                files.iter().map(|f| &f.path).collect::<Vec<_>>()
            )
        })
}

#[test]
fn plain_variable_package_layout() {
    let files = emit_sources(&[(
        "common",
        "var pad = { width: 4 };\nfunction padded(n) { return n + pad.width; }\n",
    )]);

    let var_file = file(&files, "common/vars/pad.js");
    assert_eq!(
        var_file.contents,
        "\"use strict\";\n\nvar pad = { width: 4 };\n\nmodule.exports = pad;"
    );

    // The function requires the variable from the sibling directory.
    let fn_file = file(&files, "common/internal/padded.js");
    assert!(fn_file
        .contents
        .contains("var pad = require('../vars/pad');"));
}

#[test]
fn exported_internal_function_hoists_body_and_export() {
    // Two mutually recursive internal functions: each file must emit
    // body + export before its own requires, so loading either first
    // never hits an undefined binding.
    let source = "\
function isEven(n) {
  return n === 0 ? true : isOdd(n - 1);
}
function isOdd(n) {
  return n === 0 ? false : isEven(n - 1);
}
";
    let files = emit_sources(&[("number", source)]);

    for (name, dep) in [("isEven", "isOdd"), ("isOdd", "isEven")] {
        let f = file(&files, &format!("number/internal/{}.js", name));
        let body_pos = f
            .contents
            .find(&format!("function {}", name))
            .expect("body present");
        let export_pos = f
            .contents
            .find("module.exports = ")
            .expect("export present");
        let require_pos = f
            .contents
            .find(&format!("{} = require('./{}')", dep, dep))
            .expect("require present");
        assert!(
            body_pos < export_pos && export_pos < require_pos,
            "{}: expected body < export < require, got {} {} {}",
            name,
            body_pos,
            export_pos,
            require_pos
        );
        assert!(f.contents.contains("hoisted here"));
    }
}

#[test]
fn requires_are_sorted_by_name_length() {
    let source = "\
var a = 1;
var longest = 2;
var mid = 3;
function use() {
  return longest + mid + a;
}
";
    let files = emit_sources(&[("common", source)]);
    let f = file(&files, "common/internal/use.js");
    let a = f.contents.find("a = require(").unwrap();
    let mid = f.contents.find("mid = require(").unwrap();
    let longest = f.contents.find("longest = require(").unwrap();
    assert!(a < mid && mid < longest);
}

#[test]
fn group_dependency_collapses_and_rebinds() {
    // `format` depends on both folded variables; the emitted file must
    // require the group once and re-bind each name from it.
    let source = "\
var tokens, shortcuts;
function makeTokens() {
  return {};
}
function buildTokenData() {
  tokens = makeTokens();
  shortcuts = makeTokens();
}
buildTokenData();
function format(d) {
  return tokens[d] + shortcuts[d];
}
";
    let files = emit_sources(&[("date", source)]);
    let f = file(&files, "date/internal/format.js");
    assert!(f
        .contents
        .contains("var tokenData = require('../vars/tokenData');"));
    assert!(f.contents.contains("tokens = tokenData.tokens"));
    assert!(f.contents.contains("shortcuts = tokenData.shortcuts"));
    // The folded variables are never emitted standalone.
    assert!(!files.iter().any(|f| f.path == Path::new("date/vars/tokens.js")));
    assert!(!files
        .iter()
        .any(|f| f.path == Path::new("date/vars/shortcuts.js")));

    // The group file exports the name map, init call last.
    let group = file(&files, "date/vars/tokenData.js");
    let init = group.contents.find("buildTokenData();").unwrap();
    let export = group.contents.find("module.exports = {").unwrap();
    assert!(init < export);
    assert!(group.contents.contains("'tokens': tokens"));
    assert!(group.contents.contains("'shortcuts': shortcuts"));
}

#[test]
fn method_package_requires_core_and_group() {
    let source = "\
/* @namespace Date */
var units;
function listUnits() {
  return [];
}
function defineInstanceSimilar(target, names, fn) {
  target.similar = fn(names);
}
var sugarDate = {};
function buildUnits() {
  units = listUnits();
  defineInstanceSimilar(sugarDate, 'hoursAgo,daysAgo', listUnits);
}
buildUnits();
";
    let files = emit_sources(&[("date", source)]);
    let f = file(&files, "date/hoursAgo.js");
    assert_eq!(
        f.contents,
        "\"use strict\";\n\n\
         var Sugar = require('../../../../lib/core');\n\n\
         require('./vars/units');\n\n\
         module.exports = Sugar.Date.hoursAgo;"
    );
}

#[test]
fn bundle_requires_every_module_method_sorted() {
    let source = "\
/* @namespace String */
var sugarString = {};
defineInstance(sugarString, {
  'pad': function(s) {
    return s;
  },
  'chop': function(s) {
    return s;
  }
});
";
    let files = emit_sources(&[("string", source)]);
    let bundle = file(&files, "string.js");
    assert_eq!(
        bundle.contents,
        "\"use strict\";\n\n\
         require('./string/chop');\n\
         require('./string/pad');\n\n\
         module.exports = require('../../../lib/core');"
    );
}

#[test]
fn missing_dependency_is_fatal() {
    // A method body referencing a name registered nowhere: resolution
    // records the dependency, emission must refuse to guess.
    let source = "\
/* @namespace String */
var sugarString = {};
defineInstance(sugarString, {
  'pad': function(s) {
    return phantomHelper(s);
  }
});
";
    let resolved = resolve_sources(&[("string", source)]);
    let err = emit(&resolved, &config()).unwrap_err();
    assert!(matches!(
        err,
        EmitError::MissingDependency { dependency, .. } if dependency == "phantomHelper"
    ));
}

#[test]
fn emission_is_deterministic() {
    let source = "\
/* @namespace Number */
var one = 1;
var two = 2;
function mix(a) {
  return a * one + two;
}
";
    let first = emit_sources(&[("number", source)]);
    let second = emit_sources(&[("number", source)]);
    assert_eq!(first, second);
}
