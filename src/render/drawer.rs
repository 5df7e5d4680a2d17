use super::constants::ConstantProvider;
use super::info::RenderInfo;
use super::measurables::{ElementKind, Measurable, Side};
use super::row::Row;
use super::svg_paths;

/// Turns a measured block into SVG path data.
///
/// The outline is walked clockwise from the top-left corner: the top row left to
/// right, each middle row down the right side, the bottom row right to left and
/// finally up the left side past the output tab. Inline sockets are drawn as
/// separate closed sub-paths.
pub struct Drawer<'a> {
    info: &'a RenderInfo,
    constants: &'a ConstantProvider,
    outline: String,
    inline: String,
}

impl<'a> Drawer<'a> {
    pub fn new(info: &'a RenderInfo, constants: &'a ConstantProvider) -> Self {
        Self {
            info,
            constants,
            outline: String::new(),
            inline: String::new(),
        }
    }

    /// Returns the combined outline and inline socket path.
    pub fn draw(mut self) -> String {
        self.draw_outline();
        self.draw_internals();
        if self.inline.is_empty() {
            self.outline
        } else {
            format!("{}\n{}", self.outline, self.inline)
        }
    }

    fn draw_outline(&mut self) {
        self.draw_top();
        let info = self.info;
        let rows = &info.rows;
        for row in &rows[1..rows.len() - 1] {
            if row.has_jagged_edge {
                self.draw_jagged_edge(row);
            } else if row.has_statement {
                self.draw_statement_input(row);
            } else if row.has_external_input {
                self.draw_value_input(row);
            } else {
                self.draw_right_side_row(row);
            }
        }
        self.draw_bottom();
        self.draw_left();
    }

    fn draw_top(&mut self) {
        let info = self.info;
        let top = info.top_row();
        let corners = self.constants.outside_corners();
        self.outline += &svg_paths::move_by(top.x_pos, info.start_y);
        for elem in &top.elements {
            match elem.kind {
                ElementKind::Corner { round: true, side } => {
                    self.outline += if side == Side::Left {
                        &corners.top_left
                    } else {
                        &corners.top_right
                    };
                }
                ElementKind::PreviousConnection => self.outline += &self.constants.notch().path_left,
                ElementKind::Hat => self.outline += &self.constants.start_hat().path,
                ElementKind::Spacer => self.outline += &svg_paths::line_on_axis("h", elem.width),
                _ => {}
            }
        }
        self.outline += &svg_paths::line_on_axis("V", top.y_pos + top.height);
    }

    fn draw_jagged_edge(&mut self, row: &Row) {
        let teeth = self.constants.jagged_teeth();
        let remainder = row.height - teeth.height;
        self.outline += &teeth.path;
        self.outline += &svg_paths::line_on_axis("v", remainder);
    }

    fn draw_value_input(&mut self, row: &Row) {
        let Some(input) = row.last_input() else {
            return self.draw_right_side_row(row);
        };
        let Some(shape) = input.input_shape() else {
            return;
        };
        self.outline += &svg_paths::line_on_axis("H", input.x_pos + input.width);
        self.outline += &shape.tab.path_down;
        self.outline += &svg_paths::line_on_axis("v", row.height - shape.connection_height);
    }

    fn draw_statement_input(&mut self, row: &Row) {
        let Some(input) = row.last_input() else {
            return self.draw_right_side_row(row);
        };
        let Some(shape) = input.input_shape() else {
            return;
        };
        let notch = self.constants.notch();
        let inside = self.constants.inside_corners();
        let x = input.x_pos + shape.notch_offset + notch.width;
        let inner_height = row.height - 2.0 * inside.height;
        self.outline += &svg_paths::line_on_axis("H", x);
        self.outline += &notch.path_right;
        self.outline += &svg_paths::line_on_axis("h", -(shape.notch_offset - inside.width));
        self.outline += &inside.path_top;
        self.outline += &svg_paths::line_on_axis("v", inner_height);
        self.outline += &inside.path_bottom;
        self.outline += &svg_paths::line_on_axis("H", row.x_pos + row.width);
    }

    fn draw_right_side_row(&mut self, row: &Row) {
        self.outline += &svg_paths::line_on_axis("V", row.y_pos + row.height);
    }

    fn draw_bottom(&mut self) {
        let info = self.info;
        let bottom = info.bottom_row();
        let corners = self.constants.outside_corners();
        let mut right_corner_y_offset = 0.0;
        let mut path = String::new();
        for elem in bottom.elements.iter().rev() {
            if elem.is_next_connection() {
                path += &self.constants.notch().path_right;
            } else if elem.is_left_square_corner() {
                path += &svg_paths::line_on_axis("H", bottom.x_pos);
            } else if elem.is_left_round_corner() {
                path += &corners.bottom_left;
            } else if elem.is_right_round_corner() {
                path += &corners.bottom_right;
                right_corner_y_offset = corners.right_height;
            } else if elem.is_spacer() {
                path += &svg_paths::line_on_axis("h", -elem.width);
            }
        }
        self.outline += &svg_paths::line_on_axis("V", bottom.baseline - right_corner_y_offset);
        self.outline += &path;
    }

    fn draw_left(&mut self) {
        let info = self.info;
        if let Some(tab) = &info.output {
            let tab_bottom = tab.offset_y + tab.height;
            self.outline += &svg_paths::line_on_axis("V", tab_bottom);
            self.outline += &tab.path_up;
        }
        self.outline.push('z');
    }

    fn draw_internals(&mut self) {
        let info = self.info;
        for row in &info.rows {
            for elem in row.elements.iter().filter(|elem| elem.is_inline_input()) {
                self.draw_inline_input(elem);
            }
        }
    }

    fn draw_inline_input(&mut self, input: &Measurable) {
        let Some(shape) = input.input_shape() else {
            return;
        };
        let y_pos = input.top();
        let connection_top = shape.connection_offset_y;
        let connection_bottom = shape.connection_height + connection_top;
        let connection_right = input.x_pos + shape.connection_width;
        self.inline += &svg_paths::move_to(connection_right, y_pos);
        self.inline += &svg_paths::line_on_axis("v", connection_top);
        self.inline += &shape.tab.path_down;
        self.inline += &svg_paths::line_on_axis("v", input.height - connection_bottom);
        self.inline += &svg_paths::line_on_axis("h", input.width - shape.connection_width);
        self.inline += &svg_paths::line_on_axis("v", -input.height);
        self.inline.push('z');
    }
}
