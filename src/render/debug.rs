use super::info::RenderInfo;
use super::measurables::ElementKind;
use super::row::RowKind;
use std::fmt::Write;

/// Formats the rows and elements of a measured block for debugging.
pub fn visualize_render_info(info: &RenderInfo) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "======== RENDER INFO for Block: {} ========",
        info.block
    );
    let _ = writeln!(
        output,
        "width {} (with children {}), height {}, start ({}, {}), statement edge {}",
        info.width, info.width_with_children, info.height, info.start_x, info.start_y, info.statement_edge
    );

    for (i, row) in info.rows.iter().enumerate() {
        let _ = writeln!(
            output,
            "\n{:02}: {:<7} y={:<6} {}x{}",
            i,
            format!("{:?}", row.kind),
            row.y_pos,
            row.width,
            row.height
        );
        if row.kind == RowKind::Spacer {
            continue;
        }
        let count = row.elements.len();
        for (j, elem) in row.elements.iter().enumerate() {
            let branch = if j + 1 == count { "└──" } else { "├──" };
            let label = match &elem.kind {
                ElementKind::Field { text, .. } => format!("Field \"{}\"", text),
                ElementKind::InlineInput(shape) => format!("InlineInput '{}'", shape.input),
                ElementKind::ExternalValueInput(shape) => format!("ExternalInput '{}'", shape.input),
                ElementKind::StatementInput(shape) => format!("StatementInput '{}'", shape.input),
                other => format!("{:?}", other),
            };
            let _ = writeln!(
                output,
                "    {} {:<28} x={:<6} {}x{}",
                branch, label, elem.x_pos, elem.width, elem.height
            );
        }
    }

    let _ = writeln!(output, "\n================ END OF BLOCK ================");
    output
}
