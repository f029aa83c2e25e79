//! WASM-compatible wrapper for deck export.
//!
//! Exposes placard extraction, slide planning and PPTX generation to
//! JavaScript so a page can build its deck without a server round trip.

use deck_core::{Exporter, PresentationMetadata, SlideLayout, SlideMapper, SlideSpec, Theme};
use deck_html::HtmlPlacardSource;
use deck_pptx::PptxWriter;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of exporting a page.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    /// Suggested download name, e.g. `cells.pptx`.
    pub file_name: String,
    /// Slides in the deck, title slide included.
    pub slide_count: usize,
    /// Placards left out because they lacked a title or content.
    pub skipped: usize,
    /// The .pptx package; handed to JavaScript as a `Uint8Array`.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Result of planning slides without writing a deck.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub slides: Vec<SlideSpec>,
    pub skipped: usize,
}

/// Build a .pptx deck from the placards in `html`.
///
/// # Arguments
/// * `html` - The rendered page
/// * `metadata` - `{ topic, gradeLevel, subject }`, any of which may be missing
/// * `theme` - `"classic"` (default) or `"modern"`
/// * `layout` - `"standard"` (default, 16:9) or `"wide"`
///
/// # Returns
/// `{ fileName, slideCount, skipped, bytes }`, or throws on error.
#[wasm_bindgen]
pub fn export_html_deck(
    html: &str,
    metadata: JsValue,
    theme: Option<String>,
    layout: Option<String>,
) -> Result<JsValue, JsValue> {
    let metadata = metadata_from_js(metadata)?;
    let result = export_html_deck_impl(html, &metadata, theme.as_deref(), layout.as_deref())
        .map_err(|e| JsValue::from_str(&e))?;

    let value = serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))?;
    let bytes = js_sys::Uint8Array::from(result.bytes.as_slice());
    js_sys::Reflect::set(&value, &JsValue::from_str("bytes"), &bytes)?;
    Ok(value)
}

/// Map the placards in `html` to slide specifications.
///
/// Returns `{ slides, skipped }` where `slides` includes the title slide.
#[wasm_bindgen]
pub fn plan_slides(
    html: &str,
    metadata: JsValue,
    theme: Option<String>,
) -> Result<JsValue, JsValue> {
    let metadata = metadata_from_js(metadata)?;
    let result =
        plan_slides_impl(html, &metadata, theme.as_deref()).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn metadata_from_js(value: JsValue) -> Result<PresentationMetadata, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(PresentationMetadata::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid metadata: {}", e)))
}

fn resolve_theme(name: Option<&str>) -> Result<Theme, String> {
    match name {
        None => Ok(Theme::default()),
        Some(name) => Theme::from_name(name).ok_or_else(|| format!("Unknown theme '{}'", name)),
    }
}

fn resolve_layout(name: Option<&str>) -> Result<SlideLayout, String> {
    match name {
        None => Ok(SlideLayout::default()),
        Some(name) => {
            SlideLayout::from_name(name).ok_or_else(|| format!("Unknown layout '{}'", name))
        }
    }
}

fn export_html_deck_impl(
    html: &str,
    metadata: &PresentationMetadata,
    theme: Option<&str>,
    layout: Option<&str>,
) -> Result<ExportResult, String> {
    let theme = resolve_theme(theme)?;
    let layout = resolve_layout(layout)?;

    let exporter = Exporter::new(SlideMapper::new().with_theme(theme.clone()));
    let source = HtmlPlacardSource::new(html);
    let writer = PptxWriter::new(layout).with_theme(&theme);

    // Nothing in a linked-thumbnail export suspends, so the future completes
    // on its first poll.
    let report = futures::executor::block_on(exporter.export(&source, metadata, writer))
        .map_err(|e| e.to_string())?;

    Ok(ExportResult {
        file_name: report.file_name,
        slide_count: report.slide_count,
        skipped: report.skipped,
        bytes: report.output.bytes,
    })
}

fn plan_slides_impl(
    html: &str,
    metadata: &PresentationMetadata,
    theme: Option<&str>,
) -> Result<PlanResult, String> {
    let exporter = Exporter::new(SlideMapper::new().with_theme(resolve_theme(theme)?));
    let (_, plan) = exporter
        .plan(&HtmlPlacardSource::new(html), metadata)
        .map_err(|e| format!("Extraction error: {}", e))?;

    Ok(PlanResult {
        slides: plan.slides,
        skipped: plan.skipped,
    })
}
