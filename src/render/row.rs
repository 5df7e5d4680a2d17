use super::measurables::Measurable;
use crate::block::Align;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Top,
    Bottom,
    Input,
    Spacer,
}

/// A horizontal band of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub elements: Vec<Measurable>,
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
    pub width_with_connected_blocks: f64,
    pub connected_block_widths: f64,
    pub x_pos: f64,
    pub y_pos: f64,
    pub align: Option<Align>,
    pub has_external_input: bool,
    pub has_statement: bool,
    pub has_inline_input: bool,
    pub has_dummy_input: bool,
    pub has_jagged_edge: bool,
    /// Statement rows share the x position their socket starts at.
    pub statement_edge: f64,
    /// Height above the top row's body taken by a hat.
    pub ascender_height: f64,
    /// Height below the bottom row's body taken by the next notch.
    pub descender_height: f64,
    /// Y of the block's bottom edge, set on the bottom row during finalization.
    pub baseline: f64,
}

impl Row {
    pub fn new(kind: RowKind) -> Self {
        Self {
            kind,
            elements: Vec::new(),
            width: 0.0,
            height: 0.0,
            min_width: 0.0,
            min_height: 0.0,
            width_with_connected_blocks: 0.0,
            connected_block_widths: 0.0,
            x_pos: 0.0,
            y_pos: 0.0,
            align: None,
            has_external_input: false,
            has_statement: false,
            has_inline_input: false,
            has_dummy_input: false,
            has_jagged_edge: false,
            statement_edge: 0.0,
            ascender_height: 0.0,
            descender_height: 0.0,
            baseline: 0.0,
        }
    }

    pub fn spacer(height: f64, width: f64) -> Self {
        let mut row = Self::new(RowKind::Spacer);
        row.height = height;
        row.width = width;
        row.elements.push(Measurable::spacer(width));
        row
    }

    pub fn starts_with_elem_spacer(&self) -> bool {
        self.kind == RowKind::Input
    }

    pub fn ends_with_elem_spacer(&self) -> bool {
        self.kind == RowKind::Input && !self.has_external_input && !self.has_statement
    }

    /// Sums element sizes into the row's own size.
    pub fn measure(&mut self) {
        match self.kind {
            RowKind::Spacer => {}
            RowKind::Top => {
                let mut width = 0.0;
                let mut height: f64 = 0.0;
                let mut ascender: f64 = 0.0;
                for elem in &self.elements {
                    width += elem.width;
                    if elem.is_spacer() {
                        continue;
                    }
                    if elem.is_hat() {
                        ascender = ascender.max(elem.height);
                    } else {
                        height = height.max(elem.height);
                    }
                }
                self.width = self.min_width.max(width);
                self.height = self.min_height.max(height) + ascender;
                self.ascender_height = ascender;
                self.width_with_connected_blocks = self.width;
            }
            RowKind::Bottom => {
                let mut width = 0.0;
                let mut height: f64 = 0.0;
                let mut descender: f64 = 0.0;
                for elem in &self.elements {
                    width += elem.width;
                    if elem.is_spacer() {
                        continue;
                    }
                    if elem.is_next_connection() {
                        descender = descender.max(elem.height);
                    } else {
                        height = height.max(elem.height);
                    }
                }
                self.width = self.min_width.max(width);
                self.height = self.min_height.max(height) + descender;
                self.descender_height = descender;
                self.width_with_connected_blocks = self.width;
            }
            RowKind::Input => {
                let mut width = 0.0;
                let mut connected_widths = 0.0;
                let mut height: f64 = 0.0;
                for elem in &self.elements {
                    width += elem.width;
                    if let Some(shape) = elem.input_shape() {
                        if elem.is_statement_input() && shape.connected_width > 0.0 {
                            connected_widths += shape.connected_width;
                        } else if elem.is_external_input() && shape.connected_width > 0.0 {
                            connected_widths += shape.connected_width - shape.connection_width;
                        }
                    }
                    if !elem.is_spacer() {
                        height = height.max(elem.height);
                    }
                }
                self.connected_block_widths = connected_widths;
                self.width = self.min_width.max(width);
                self.height = self.min_height.max(height);
                self.width_with_connected_blocks = self.width + connected_widths;
            }
        }
    }

    pub fn last_input(&self) -> Option<&Measurable> {
        self.elements.iter().rev().find(|elem| elem.is_input())
    }

    pub fn last_input_mut(&mut self) -> Option<&mut Measurable> {
        self.elements.iter_mut().rev().find(|elem| elem.is_input())
    }

    pub fn first_spacer_mut(&mut self) -> Option<&mut Measurable> {
        self.elements.iter_mut().find(|elem| elem.is_spacer())
    }

    pub fn last_spacer_mut(&mut self) -> Option<&mut Measurable> {
        self.elements.iter_mut().rev().find(|elem| elem.is_spacer())
    }

    pub fn is_top_or_bottom(&self) -> bool {
        matches!(self.kind, RowKind::Top | RowKind::Bottom)
    }
}
