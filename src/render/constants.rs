use super::svg_paths;
use crate::block::{FieldKind, OutputShape};
use crate::geometry::Size;
use serde::{Deserialize, Serialize};

/// Which outline a connection is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Notch,
    PuzzleTab,
    Round,
    Hexagonal,
    Square,
}

impl ShapeKind {
    /// Dynamic shapes size themselves from the height of the block they belong to.
    pub fn is_dynamic(self) -> bool {
        matches!(self, ShapeKind::Round | ShapeKind::Hexagonal | ShapeKind::Square)
    }
}

/// Notch drawn for previous and next connections.
#[derive(Debug, Clone, PartialEq)]
pub struct Notch {
    pub width: f64,
    pub height: f64,
    pub path_left: String,
    pub path_right: String,
}

/// Left-side tab or socket drawn for output and value input connections.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub kind: ShapeKind,
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the block (or socket) to the top of the tab.
    pub offset_y: f64,
    pub path_down: String,
    pub path_up: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutsideCorners {
    pub top_left: String,
    pub top_right: String,
    pub bottom_left: String,
    pub bottom_right: String,
    pub right_height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsideCorners {
    pub width: f64,
    pub height: f64,
    pub path_top: String,
    pub path_bottom: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleShape {
    pub width: f64,
    pub height: f64,
    pub path: String,
}

/// Sizes, paddings and shapes used to measure and draw blocks.
///
/// Every value can be overridden from the workspace options file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantProvider {
    pub no_padding: f64,
    pub small_padding: f64,
    pub medium_padding: f64,
    pub medium_large_padding: f64,
    pub large_padding: f64,

    pub tab_height: f64,
    pub tab_offset_from_top: f64,
    pub tab_width: f64,
    pub notch_width: f64,
    pub notch_height: f64,
    pub notch_offset_left: f64,
    pub corner_radius: f64,

    pub min_block_width: f64,
    pub min_block_height: f64,
    pub top_row_min_height: f64,
    pub top_row_precedes_statement_min_height: f64,
    pub bottom_row_min_height: f64,
    pub bottom_row_after_statement_min_height: f64,

    pub statement_input_padding_left: f64,
    pub statement_bottom_spacer: f64,
    pub empty_statement_input_height: f64,
    pub empty_inline_input_padding: f64,
    pub empty_inline_input_height: f64,
    pub external_value_input_padding: f64,
    pub dummy_input_min_height: f64,
    pub dummy_input_shadow_min_height: f64,

    pub add_start_hats: bool,
    pub start_hat_height: f64,
    pub start_hat_width: f64,
    pub jagged_teeth_height: f64,
    pub jagged_teeth_width: f64,

    pub field_text_height: f64,
    pub field_char_width: f64,
    pub field_border_rect_height: f64,
    pub field_border_rect_x_padding: f64,
    pub field_dropdown_arrow_width: f64,
    pub field_checkbox_size: f64,
    pub icon_size: f64,
    /// Collapsed blocks show at most this many characters.
    pub collapse_chars: usize,

    pub dark_path_offset: f64,
    pub highlight_offset: f64,

    /// When set, output and value input shapes follow the block's output shape.
    pub dynamic_shapes: bool,
    pub max_dynamic_connection_shape_width: f64,
}

impl Default for ConstantProvider {
    fn default() -> Self {
        let medium_padding = 5.0;
        let large_padding = 10.0;
        let tab_height = 15.0;
        Self {
            no_padding: 0.0,
            small_padding: 3.0,
            medium_padding,
            medium_large_padding: 8.0,
            large_padding,

            tab_height,
            tab_offset_from_top: 5.0,
            tab_width: 8.0,
            notch_width: 15.0,
            notch_height: 4.0,
            notch_offset_left: 15.0,
            corner_radius: 8.0,

            min_block_width: 12.0,
            min_block_height: 24.0,
            top_row_min_height: medium_padding,
            top_row_precedes_statement_min_height: large_padding,
            bottom_row_min_height: medium_padding,
            bottom_row_after_statement_min_height: large_padding,

            statement_input_padding_left: 20.0,
            statement_bottom_spacer: 0.0,
            empty_statement_input_height: 24.0,
            empty_inline_input_padding: 14.5,
            empty_inline_input_height: tab_height + 11.0,
            external_value_input_padding: 2.0,
            dummy_input_min_height: tab_height,
            dummy_input_shadow_min_height: tab_height,

            add_start_hats: false,
            start_hat_height: 15.0,
            start_hat_width: 100.0,
            jagged_teeth_height: 12.0,
            jagged_teeth_width: 6.0,

            field_text_height: 16.0,
            field_char_width: 7.0,
            field_border_rect_height: 16.0,
            field_border_rect_x_padding: 5.0,
            field_dropdown_arrow_width: 12.0,
            field_checkbox_size: 16.0,
            icon_size: 17.0,
            collapse_chars: 30,

            dark_path_offset: 1.0,
            highlight_offset: 0.5,

            dynamic_shapes: false,
            max_dynamic_connection_shape_width: 12.0,
        }
    }
}

impl ConstantProvider {
    /// Estimated rendered width of a run of text.
    pub fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.field_char_width
    }

    /// Size a field takes up on its block.
    pub fn field_size(&self, kind: &FieldKind, text: &str) -> Size {
        match kind {
            FieldKind::Label => Size::new(self.text_width(text), self.field_text_height),
            FieldKind::Checkbox => Size::new(self.field_checkbox_size, self.field_checkbox_size),
            FieldKind::Dropdown { .. } => Size::new(
                self.text_width(text)
                    + 2.0 * self.field_border_rect_x_padding
                    + self.field_dropdown_arrow_width,
                self.field_border_rect_height,
            ),
            FieldKind::Text | FieldKind::Number | FieldKind::Variable => Size::new(
                self.text_width(text) + 2.0 * self.field_border_rect_x_padding,
                self.field_border_rect_height,
            ),
        }
    }

    /// Shape used for a block's output connection.
    pub fn shape_for_output(&self, shape: Option<OutputShape>) -> ShapeKind {
        if !self.dynamic_shapes {
            return ShapeKind::PuzzleTab;
        }
        match shape {
            Some(OutputShape::Round) => ShapeKind::Round,
            Some(OutputShape::Hexagonal) => ShapeKind::Hexagonal,
            Some(OutputShape::Square) => ShapeKind::Square,
            Some(OutputShape::Puzzle) | None => ShapeKind::PuzzleTab,
        }
    }

    /// Shape used for an empty value input, chosen from its type check.
    pub fn shape_for_check(&self, check: &[String]) -> ShapeKind {
        if !self.dynamic_shapes {
            return ShapeKind::PuzzleTab;
        }
        let only = |tag: &str| check.len() == 1 && check[0] == tag;
        if only("Boolean") {
            ShapeKind::Hexagonal
        } else if check.iter().any(|t| t == "Number" || t == "String") {
            ShapeKind::Round
        } else {
            ShapeKind::PuzzleTab
        }
    }

    pub fn notch(&self) -> Notch {
        let width = self.notch_width;
        let height = self.notch_height;
        let inner_width = 3.0;
        let outer_width = (width - inner_width) / 2.0;
        let main_path = |dir: f64| {
            svg_paths::line(&[
                svg_paths::point(dir * outer_width, height),
                svg_paths::point(dir * inner_width, 0.0),
                svg_paths::point(dir * outer_width, -height),
            ])
        };
        Notch {
            width,
            height,
            path_left: main_path(1.0),
            path_right: main_path(-1.0),
        }
    }

    /// The tab for a value connection. `height` is the height of the block (or socket)
    /// the tab is drawn on; fixed shapes ignore it.
    pub fn tab(&self, kind: ShapeKind, height: f64) -> Tab {
        match kind {
            ShapeKind::Round => self.rounded_tab(height),
            ShapeKind::Hexagonal => self.hexagonal_tab(height),
            ShapeKind::Square => self.squared_tab(height),
            ShapeKind::Notch | ShapeKind::PuzzleTab => self.puzzle_tab(),
        }
    }

    fn puzzle_tab(&self) -> Tab {
        let width = self.tab_width;
        let height = self.tab_height;
        let main_path = |up: bool| {
            let forward = if up { -1.0 } else { 1.0 };
            let back = -forward;
            let overlap = 2.5;
            let half_height = height / 2.0;
            let control1_y = half_height + overlap;
            let control2_y = half_height + 0.5;
            let control3_y = overlap;
            let end_point1 = svg_paths::point(-width, forward * half_height);
            let end_point2 = svg_paths::point(width, forward * half_height);
            svg_paths::curve(
                "c",
                &[
                    svg_paths::point(0.0, forward * control1_y),
                    svg_paths::point(-width, back * control2_y),
                    end_point1,
                ],
            ) + &svg_paths::curve(
                "s",
                &[svg_paths::point(width, back * control3_y), end_point2],
            )
        };
        Tab {
            kind: ShapeKind::PuzzleTab,
            width,
            height,
            offset_y: self.tab_offset_from_top,
            path_down: main_path(false),
            path_up: main_path(true),
        }
    }

    fn dynamic_width(&self, height: f64) -> f64 {
        (height / 2.0).min(self.max_dynamic_connection_shape_width)
    }

    fn hexagonal_tab(&self, height: f64) -> Tab {
        let width = self.dynamic_width(height);
        let main_path = |up: bool| {
            let dy = if up { -height / 2.0 } else { height / 2.0 };
            svg_paths::line_to(-width, dy) + &svg_paths::line_to(width, dy)
        };
        Tab {
            kind: ShapeKind::Hexagonal,
            width,
            height,
            offset_y: 0.0,
            path_down: main_path(false),
            path_up: main_path(true),
        }
    }

    fn rounded_tab(&self, height: f64) -> Tab {
        let max_height = self.max_dynamic_connection_shape_width * 2.0;
        let remaining = (height - max_height).max(0.0);
        let radius = height.min(max_height) / 2.0;
        let main_path = |up: bool| {
            let dir = if up { -1.0 } else { 1.0 };
            let flags = if up { "0 0,1" } else { "0 0,0" };
            svg_paths::arc("a", flags, radius, &svg_paths::point(-radius, dir * radius))
                + &svg_paths::line_on_axis("v", dir * remaining)
                + &svg_paths::arc("a", flags, radius, &svg_paths::point(radius, dir * radius))
        };
        Tab {
            kind: ShapeKind::Round,
            width: radius,
            height,
            offset_y: 0.0,
            path_down: main_path(false),
            path_up: main_path(true),
        }
    }

    fn squared_tab(&self, height: f64) -> Tab {
        let radius = self.corner_radius.min(height / 2.0);
        let inner = height - radius * 2.0;
        let main_path = |up: bool| {
            let dir = if up { -1.0 } else { 1.0 };
            let flags = if up { "0 0,1" } else { "0 0,0" };
            svg_paths::arc("a", flags, radius, &svg_paths::point(-radius, dir * radius))
                + &svg_paths::line_on_axis("v", dir * inner)
                + &svg_paths::arc("a", flags, radius, &svg_paths::point(radius, dir * radius))
        };
        Tab {
            kind: ShapeKind::Square,
            width: radius,
            height,
            offset_y: 0.0,
            path_down: main_path(false),
            path_up: main_path(true),
        }
    }

    pub fn outside_corners(&self) -> OutsideCorners {
        let radius = self.corner_radius;
        OutsideCorners {
            top_left: svg_paths::move_by(0.0, radius)
                + &svg_paths::arc("a", "0 0,1", radius, &svg_paths::point(radius, -radius)),
            top_right: svg_paths::arc("a", "0 0,1", radius, &svg_paths::point(radius, radius)),
            bottom_left: svg_paths::arc("a", "0 0,1", radius, &svg_paths::point(-radius, -radius)),
            bottom_right: svg_paths::arc("a", "0 0,1", radius, &svg_paths::point(-radius, radius)),
            right_height: radius,
        }
    }

    pub fn inside_corners(&self) -> InsideCorners {
        let radius = self.corner_radius;
        InsideCorners {
            width: radius,
            height: radius,
            path_top: svg_paths::arc("a", "0 0,0 ", radius, &svg_paths::point(-radius, radius)),
            path_bottom: svg_paths::arc("a", "0 0,0 ", radius, &svg_paths::point(radius, radius)),
        }
    }

    pub fn start_hat(&self) -> SimpleShape {
        let height = self.start_hat_height;
        let width = self.start_hat_width;
        SimpleShape {
            width,
            height,
            path: svg_paths::curve(
                "c",
                &[
                    svg_paths::point(30.0, -height),
                    svg_paths::point(70.0, -height),
                    svg_paths::point(width, 0.0),
                ],
            ),
        }
    }

    pub fn jagged_teeth(&self) -> SimpleShape {
        let height = self.jagged_teeth_height;
        let width = self.jagged_teeth_width;
        SimpleShape {
            width,
            height,
            path: svg_paths::line(&[
                svg_paths::point(width, height / 4.0),
                svg_paths::point(-width * 2.0, height / 2.0),
                svg_paths::point(width, height / 4.0),
            ]),
        }
    }
}
