//! WASM bridge: builds scenes for a browser front-end that does the 3D display.

use js_sys::Float64Array;
use riemann_core::scene::{build_scene, Scene};
use riemann_core::surface::{RiemannSurface, SheetIndex, SurfaceSettings};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

fn parse_settings(settings: JsValue) -> Result<SurfaceSettings, JsValue> {
    if settings.is_undefined() || settings.is_null() {
        return Ok(SurfaceSettings::default());
    }
    from_value(settings).map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))
}

fn parse_sheet(sheet: &str) -> Result<SheetIndex, JsValue> {
    match sheet {
        "principal" => Ok(SheetIndex::Principal),
        "negated" => Ok(SheetIndex::Negated),
        _ => Err(JsValue::from_str("Unknown sheet")),
    }
}

fn compute_surface(settings: &SurfaceSettings) -> Result<RiemannSurface, JsValue> {
    RiemannSurface::compute(settings)
        .map_err(|e| JsValue::from_str(&format!("Surface computation failed: {}", e)))
}

pub(crate) fn scene_for(settings: &SurfaceSettings) -> Result<Scene, JsValue> {
    let surface = compute_surface(settings)?;
    build_scene(&surface, settings)
        .map_err(|e| JsValue::from_str(&format!("Scene construction failed: {}", e)))
}

#[wasm_bindgen]
pub fn default_surface_settings() -> Result<JsValue, JsValue> {
    to_value(&SurfaceSettings::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Serialized `Scene` for `settings`, or for the default constants when
/// `settings` is `undefined`/`null`.
#[wasm_bindgen]
pub fn compute_riemann_scene(settings: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let settings = parse_settings(settings)?;
    let scene = scene_for(&settings)?;
    to_value(&scene).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Row-major heights of one sheet (rows follow the angle samples).
#[wasm_bindgen]
pub fn sheet_heights(settings: JsValue, sheet: &str) -> Result<Float64Array, JsValue> {
    console_error_panic_hook::set_once();

    let settings = parse_settings(settings)?;
    let index = parse_sheet(sheet)?;
    let surface = compute_surface(&settings)?;
    // nalgebra stores column-major; the transpose's storage is z in row-major order.
    let row_major = surface.sheet(index).z.transpose();
    Ok(Float64Array::from(row_major.as_slice()))
}
