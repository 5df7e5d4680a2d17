use super::info::PlacedElement;
use super::path_object::PathLayer;
use crate::workspace::Workspace;
use std::fmt::Write;

/// Writes the rendered workspace as a standalone SVG document.
///
/// Blocks that have not been rendered yet are skipped.
pub fn export(workspace: &Workspace) -> String {
    let view = workspace.options().view;
    let mut body = String::new();
    for root in workspace.top_block_ids() {
        for id in workspace.descendants(&root) {
            let (Some(block), Some(rendered)) = (workspace.get_block(&id), workspace.rendered(&id)) else {
                continue;
            };
            let position = block.position();
            let _ = writeln!(
                body,
                "  <g data-id=\"{}\" transform=\"translate({},{})\">",
                escape(id.as_str()),
                position.x,
                position.y
            );
            for layer in rendered.path.layers() {
                write_layer(&mut body, &layer);
            }
            for placement in rendered.info.element_placements() {
                if let PlacedElement::Field { text, .. } = &placement.element {
                    let _ = writeln!(
                        body,
                        "    <text x=\"{}\" y=\"{}\">{}</text>",
                        placement.x,
                        placement.y + placement.height,
                        escape(text)
                    );
                }
            }
            body.push_str("  </g>\n");
        }
    }
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\n{}</svg>\n",
        view.width, view.height, body
    )
}

fn write_layer(out: &mut String, layer: &PathLayer) {
    if !layer.visible || layer.d.is_empty() {
        return;
    }
    let mut attributes = format!("d=\"{}\" fill=\"{}\"", layer.d.trim(), layer.fill);
    if let Some(stroke) = &layer.stroke {
        let _ = write!(attributes, " stroke=\"{}\"", stroke);
    }
    if let Some(transform) = &layer.transform {
        let _ = write!(attributes, " transform=\"{}\"", transform);
    }
    if let Some(filter) = &layer.filter {
        let _ = write!(attributes, " filter=\"{}\"", filter);
    }
    let _ = writeln!(out, "    <path {}/>", attributes);
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
