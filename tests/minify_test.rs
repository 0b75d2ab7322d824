//! End-to-end minification tests.
//!
//! Each test runs the public `minify` entry point over a small stylesheet
//! and checks the serialized result.

use trimcss::{OptimizationLevel, Options, minify};

fn level1(css: &str) -> String {
    minify(css, &Options::with_level(OptimizationLevel::One))
        .expect("default options are valid")
        .css
}

fn level2(css: &str) -> String {
    minify(css, &Options::with_level(OptimizationLevel::Two))
        .expect("default options are valid")
        .css
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_zero_collapse() {
    assert_eq!(level1("a{margin:0 0 0 0}"), "a{margin:0}");
    assert_eq!(level1("a{padding:0 0 0 0}"), "a{padding:0}");
    assert_eq!(level1("a{box-shadow:0 0 0 0}"), "a{box-shadow:0 0}");
}

#[test]
fn test_border_radius_symmetry() {
    assert_eq!(
        level1("a{border-radius:1em 2em 3em 4em / 1em 2em 3em 4em}"),
        "a{border-radius:1em 2em 3em 4em}"
    );
}

#[test]
fn test_color_canonicalization() {
    assert_eq!(level1("a{color:rgb(255,254,253)}"), "a{color:#fffefd}");
    assert_eq!(level1("a{color:#ff00ff}"), "a{color:#f0f}");
    assert_eq!(level1("a{color:#f00}"), "a{color:red}");
    assert_eq!(level1("a{color:white}"), "a{color:#fff}");
}

#[test]
fn test_whitespace_and_comments() {
    assert_eq!(
        level1("/* header */\na  >  b ,\n p {\n  color : red ;\n  top : 0px ;\n}\n"),
        "a>b,p{color:red;top:0}"
    );
    assert_eq!(level1("/*! license */a{top:0}"), "/*! license */a{top:0}");
}

// ============================================================================
// Rule merging
// ============================================================================

#[test]
fn test_adjacent_merge() {
    assert_eq!(level2("a{color:red}a{color:#fff}"), "a{color:#fff}");
}

#[test]
fn test_non_adjacent_duplicate() {
    assert_eq!(level2("a{color:red}p{color:blue}a{color:red}"), "p{color:#00f}a{color:red}");
}

#[test]
fn test_selector_merge_safety() {
    assert_eq!(
        level2("div:first-child{color:red}div:first-child{color:red}"),
        "div:first-child{color:red}"
    );
    assert_eq!(
        level2("div:nth-child(5){color:red}div:last-child{color:red}"),
        "div:nth-child(5){color:red}div:last-child{color:red}"
    );
}

#[test]
fn test_shorthand_longhand_override() {
    assert_eq!(
        level2("a{border-color:red}a{border-top:1px solid blue}"),
        "a{border-color:red;border-top:1px solid #00f}"
    );
    assert_eq!(
        level2("a{border-top:1px solid red}a{border:2px solid blue}"),
        "a{border:2px solid #00f}"
    );
}

#[test]
fn test_component_folding() {
    assert_eq!(level2("a{margin:0}a{margin-top:1px}"), "a{margin:1px 0 0}");
    assert_eq!(
        level2("a{margin-top:0;margin-right:0;margin-bottom:0;margin-left:0}"),
        "a{margin:0}"
    );
}

#[test]
fn test_media_blocks() {
    assert_eq!(
        level2("@media print{a{color:red}}@media print{a{color:red}}"),
        "@media print{a{color:red}}"
    );
    assert_eq!(
        level2("@media print{a{color:red}}p{top:0}@media print{b{top:0}}"),
        "p{top:0}@media print{a{color:red}b{top:0}}"
    );
}

#[test]
fn test_font_face_dedup() {
    assert_eq!(
        level2("@font-face{font-family:A;src:url(a.woff)}@font-face{font-family:A;src:url(a.woff)}"),
        "@font-face{font-family:A;src:url(a.woff)}"
    );
}

// ============================================================================
// Robustness
// ============================================================================

#[test]
fn test_stray_closing_brace() {
    let output = minify("a{display:block}}", &Options::default()).unwrap();
    assert_eq!(output.tokens.len(), 1);
    assert_eq!(output.css, "a{display:block}");
    assert_eq!(output.warnings.len(), 1);
}

#[test]
fn test_missing_closing_brace() {
    let output = minify("a{display:block", &Options::default()).unwrap();
    assert_eq!(output.tokens.len(), 1);
    assert_eq!(output.css, "a{display:block}");
    assert_eq!(output.warnings.len(), 1);
}

#[test]
fn test_empty_input() {
    let output = minify("", &Options::default()).unwrap();
    assert_eq!(output.css, "");
    assert!(output.warnings.is_empty());
    assert_eq!(output.stats.efficiency, 0.0);
}

#[test]
fn test_stats() {
    let css = "a { color : #ff0000 }";
    let output = minify(css, &Options::default()).unwrap();
    assert_eq!(output.stats.original_size, css.len());
    assert_eq!(output.stats.minified_size, output.css.len());
    assert!(output.stats.efficiency > 0.0);
}

#[test]
fn test_unterminated_color_functions() {
    assert_eq!(level1("a{color:rgb(}"), "a{color:rgb(}");
    assert_eq!(level1("a{color:hsl(}"), "a{color:hsl(}");
    assert_eq!(level2("a{color:rgba(}b{top:0}"), "a{color:rgba(}b{top:0}");
    assert_eq!(level2("a{color:hsl(}b{top:0}"), "a{color:hsl(}b{top:0}");
    assert_eq!(level1("a{background:linear-gradient(#ffffff}"), "a{background:linear-gradient(#ffffff}");
}

#[test]
fn test_huge_lengths() {
    let options = Options::from_json(
        r#"{"compatibility": "*,+properties.shorterLengthUnits,+units.pt,+units.in"}"#,
    )
    .unwrap();
    let output = minify("a{width:9223372036854775807px}", &options).unwrap();
    assert_eq!(output.css, "a{width:9223372036854775807px}");
    assert_eq!(level2("a{margin:99999999999999999999999px}"), "a{margin:99999999999999999999999px}");
}

#[test]
fn test_malformed_declarations() {
    assert_eq!(level1("a{color:red/*x*/blue}"), "a{color:red blue}");
    for css in [
        "a{color:\"}",
        "a{color:'red}b{top:0}",
        "a{width:calc(1px}",
        "a{background:url(}",
        "a{filter:progid:}",
        "a{margin:)}",
        "a{;;:;}",
    ] {
        assert!(minify(css, &Options::with_level(OptimizationLevel::Two)).is_ok(), "{css}");
    }
}
