use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::layout::LayoutResult;
use crate::scanner::types::ImageEntry;
use crate::tree::arena::ImageId;

/// Build an HTML page placing every image at its tile with absolute positioning.
/// Each image links to its source file.
pub fn render_html(layout: &LayoutResult, entries: &[ImageEntry]) -> String {
    let by_id: HashMap<ImageId, &ImageEntry> = entries.iter().map(|e| (e.id, e)).collect();
    let (width, height) = layout.pixel_canvas();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Image Collage</title>\n</head>\n<body>\n");
    html.push_str("<h1 style=\"text-align:left\">Image Collage</h1>\n<hr>\n");
    html.push_str(&format!(
        "<div style=\"position:relative; width:{}px; height:{}px;\">\n",
        width, height
    ));

    for (id, px) in layout.pixel_tiles() {
        let Some(entry) = by_id.get(&id) else {
            tracing::warn!("No image entry for {:?}, leaving its tile empty", id);
            continue;
        };
        let src = escape_html(&entry.path.to_string_lossy());
        html.push_str(&format!("  <a href=\"{}\">\n", src));
        html.push_str(&format!(
            "    <img src=\"{}\" alt=\"{}\" style=\"position:absolute; width:{}px; height:{}px; left:{}px; top:{}px;\">\n",
            src,
            escape_html(&entry.name),
            px.width,
            px.height,
            px.x,
            px.y
        ));
        html.push_str("  </a>\n");
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

pub fn write_html(layout: &LayoutResult, entries: &[ImageEntry], path: &Path) -> Result<()> {
    std::fs::write(path, render_html(layout, entries))
        .with_context(|| format!("failed to write HTML page {}", path.display()))?;
    tracing::info!("HTML page written to {}", path.display());
    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
