use super::constants::ConstantProvider;
use super::info::RenderInfo;
use super::measurables::ElementKind;
use super::svg_paths;

/// Draws the light edge along the top and left sides of a block.
///
/// Notches and the output tab are skipped over rather than traced.
pub struct Highlighter<'a> {
    info: &'a RenderInfo,
    constants: &'a ConstantProvider,
}

impl<'a> Highlighter<'a> {
    pub fn new(info: &'a RenderInfo, constants: &'a ConstantProvider) -> Self {
        Self { info, constants }
    }

    pub fn draw(&self) -> String {
        let offset = self.constants.highlight_offset;
        let top = self.info.top_row();
        let left = top.x_pos + offset;
        let top_y = self.info.start_y + offset;

        let mut path = svg_paths::move_to(left, top_y);
        for elem in &top.elements {
            match elem.kind {
                ElementKind::PreviousConnection | ElementKind::Hat => {
                    path += &svg_paths::move_by(elem.width, 0.0);
                }
                ElementKind::Spacer | ElementKind::Corner { .. } => {
                    path += &svg_paths::line_on_axis("h", elem.width);
                }
                _ => {}
            }
        }
        path += &svg_paths::line_on_axis("H", top.x_pos + top.width - offset);

        let bottom = self.info.bottom_row().baseline - offset;
        path += &svg_paths::move_to(left, bottom);
        if let Some(tab) = &self.info.output {
            path += &svg_paths::line_on_axis("V", tab.offset_y + tab.height);
            path += &svg_paths::move_to(left, tab.offset_y);
        }
        path += &svg_paths::line_on_axis("V", top_y);
        path
    }
}
