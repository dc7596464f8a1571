//! WASM bindings for the Textile converter.
//!
//! Exposes `convert()` to JavaScript via wasm-bindgen. Options are a plain
//! object with any of `hard_breaks`, `link_aliases` and `sort_attributes`;
//! missing fields take their defaults.

use textile_html::Options;
use wasm_bindgen::prelude::*;

/// Convert Textile source to an HTML fragment.
///
/// `options` may be `undefined` or `null`. Throws a JS error on a syntax
/// error or malformed options.
#[wasm_bindgen]
pub fn convert(source: &str, options: JsValue) -> Result<String, JsError> {
    let options: Options = if options.is_undefined() || options.is_null() {
        Options::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsError::new(&e.to_string()))?
    };
    convert_with(source, &options).map_err(|e| JsError::new(&e))
}

/// Get the converter version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn convert_with(source: &str, options: &Options) -> Result<String, String> {
    textile_html::convert(source, options).map_err(|e| e.to_string())
}
