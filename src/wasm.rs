//! WASM bindings for browser-based minification.
//!
//! This module exposes the minifier to JavaScript via wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::{Minifier, Options};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Minify a stylesheet.
///
/// `options` is the same JSON accepted by options files; pass `"{}"` for
/// defaults. Warnings are dropped; use [`minify_with_warnings`] to see them.
#[wasm_bindgen]
pub fn minify(css: &str, options: &str) -> Result<String, JsValue> {
    let minifier = build(options)?;
    Ok(minifier.minify(css).css)
}

/// Minify a stylesheet and return `[css, warning, warning, ...]`.
#[wasm_bindgen]
pub fn minify_with_warnings(css: &str, options: &str) -> Result<Vec<String>, JsValue> {
    let minifier = build(options)?;
    let output = minifier.minify(css);

    let mut result = Vec::with_capacity(output.warnings.len() + 1);
    result.push(output.css);
    result.extend(output.warnings.iter().map(ToString::to_string));
    Ok(result)
}

fn build(options: &str) -> Result<Minifier, JsValue> {
    let options = Options::from_json(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Minifier::new(options).map_err(|e| JsValue::from_str(&e.to_string()))
}
