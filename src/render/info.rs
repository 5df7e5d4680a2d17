//! Measurement of a single block into rows of positioned elements.
//!
//! Measuring happens in fixed stages: rows are created from the block's inputs,
//! spacers are inserted between elements and between rows, the rows are measured
//! and aligned to the widest one, and finally every row and element receives its
//! position. Children must have been measured first, since connected blocks size
//! the sockets they sit in.

use super::constants::{ConstantProvider, ShapeKind, Tab};
use super::measurables::{ElementKind, Measurable, Side};
use super::row::{Row, RowKind};
use crate::block::{Align, Block, BlockId, Connection, ConnectionSlot, Input, InputKind, OutputShape};
use crate::geometry::{Coordinate, Size};
use ahash::AHashMap;

/// What the measurement of a parent needs to know about an already measured child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectedBlock {
    /// Size of the child together with everything attached below it.
    pub size: Size,
    pub output_shape: Option<OutputShape>,
}

/// Where a field or icon ended up on its block.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementPlacement {
    pub element: PlacedElement,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacedElement {
    Field { name: Option<String>, text: String },
    Icon,
}

/// The measured layout of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInfo {
    pub block: BlockId,
    pub rtl: bool,
    pub is_inline: bool,
    pub is_collapsed: bool,
    /// Top row first, bottom row last, spacer rows in between every pair.
    pub rows: Vec<Row>,
    pub output: Option<Tab>,
    pub start_x: f64,
    pub start_y: f64,
    pub width: f64,
    pub height: f64,
    pub width_with_children: f64,
    pub statement_edge: f64,
}

impl RenderInfo {
    pub fn measure(
        block: &Block,
        constants: &ConstantProvider,
        rtl: bool,
        connected: &AHashMap<BlockId, ConnectedBlock>,
    ) -> Self {
        let collapsed = block.is_collapsed();
        let mut info = Self {
            block: block.id().clone(),
            rtl,
            is_inline: block.inputs_inline() && !collapsed,
            is_collapsed: collapsed,
            rows: Vec::new(),
            output: None,
            start_x: 0.0,
            start_y: 0.0,
            width: 0.0,
            height: 0.0,
            width_with_children: 0.0,
            statement_edge: 0.0,
        };
        info.create_rows(block, constants, connected);
        info.add_elem_spacing(constants);
        info.add_row_spacing(constants);
        let output_shape = block
            .output_connection()
            .map(|_| constants.shape_for_output(block.output_shape()));
        info.compute_bounds(constants, output_shape);
        info.align_row_elements();
        info.finalize();
        info
    }

    pub fn top_row(&self) -> &Row {
        &self.rows[0]
    }

    pub fn bottom_row(&self) -> &Row {
        &self.rows[self.rows.len() - 1]
    }

    /// Own height and the width including connected children.
    pub fn size(&self) -> Size {
        Size::new(self.width_with_children, self.height)
    }

    fn create_rows(
        &mut self,
        block: &Block,
        constants: &ConstantProvider,
        connected: &AHashMap<BlockId, ConnectedBlock>,
    ) {
        let has_output = block.output_connection().is_some();
        let has_previous = block.previous_connection().is_some();
        let has_hat = constants.add_start_hats && !has_output && !has_previous;
        let below_previous = block
            .previous_connection()
            .and_then(Connection::target)
            .is_some_and(|link| link.slot == ConnectionSlot::Next);

        let visible: Vec<(usize, &Input)> = block
            .inputs()
            .iter()
            .enumerate()
            .filter(|(_, input)| input.is_visible())
            .collect();
        let precedes_statement = !self.is_collapsed
            && visible
                .first()
                .is_some_and(|(_, input)| input.kind() == InputKind::Statement);
        let follows_statement = !self.is_collapsed
            && visible
                .last()
                .is_some_and(|(_, input)| input.kind() == InputKind::Statement);

        let mut top = Row::new(RowKind::Top);
        top.elements.push(Measurable::corner(
            constants,
            Side::Left,
            !(has_output || has_hat || below_previous),
        ));
        if has_hat {
            top.elements.push(Measurable::hat(constants));
        } else if has_previous {
            top.elements.push(Measurable::previous_connection(constants));
        }
        top.min_height = if precedes_statement {
            constants.top_row_precedes_statement_min_height
        } else {
            constants.top_row_min_height
        };
        top.elements.push(Measurable::corner(constants, Side::Right, false));
        self.rows.push(top);

        let mut active = Row::new(RowKind::Input);
        if block.comment().is_some() {
            active.elements.push(Measurable::icon(constants));
        }
        if self.is_collapsed {
            let text = truncate(block.collapsed_text(), constants.collapse_chars);
            active
                .elements
                .push(Measurable::collapsed_label(constants, text));
            active.elements.push(Measurable::jagged_edge(constants));
            active.has_jagged_edge = true;
        } else {
            let mut last_kind: Option<InputKind> = None;
            for (index, input) in visible {
                let starts_row = last_kind.is_some_and(|last| self.should_start_new_row(input.kind(), last));
                if starts_row {
                    self.rows
                        .push(std::mem::replace(&mut active, Row::new(RowKind::Input)));
                }
                for (field_index, field) in input.fields().iter().enumerate() {
                    active
                        .elements
                        .push(Measurable::field(constants, index, field_index, field));
                }
                self.add_input(&mut active, block, input, constants, connected);
                last_kind = Some(input.kind());
            }
        }
        if !active.elements.is_empty() || active.has_dummy_input {
            self.rows.push(active);
        }

        let mut bottom = Row::new(RowKind::Bottom);
        bottom.min_height = if follows_statement {
            constants.bottom_row_after_statement_min_height
        } else {
            constants.bottom_row_min_height
        };
        bottom.elements.push(Measurable::corner(
            constants,
            Side::Left,
            !(has_output || block.next_block().is_some()),
        ));
        if block.next_connection().is_some() {
            bottom.elements.push(Measurable::next_connection(constants));
        }
        bottom
            .elements
            .push(Measurable::corner(constants, Side::Right, false));
        self.rows.push(bottom);
    }

    fn should_start_new_row(&self, kind: InputKind, last: InputKind) -> bool {
        if kind == InputKind::Statement || last == InputKind::Statement {
            return true;
        }
        !self.is_inline
    }

    fn add_input(
        &self,
        row: &mut Row,
        block: &Block,
        input: &Input,
        constants: &ConstantProvider,
        connected: &AHashMap<BlockId, ConnectedBlock>,
    ) {
        let child = input
            .connection()
            .and_then(Connection::target)
            .and_then(|link| connected.get(&link.block).map(|info| (link.block.clone(), *info)));
        let check = input.connection().map(Connection::check).unwrap_or(&[]);
        let dims = child
            .as_ref()
            .map(|(id, info)| (id.clone(), info.size.width, info.size.height));
        let name = input.name().to_string();

        match input.kind() {
            InputKind::Value if self.is_inline => {
                let shape = child
                    .as_ref()
                    .and_then(|(_, info)| info.output_shape)
                    .map(|shape| constants.shape_for_output(Some(shape)))
                    .unwrap_or_else(|| constants.shape_for_check(check));
                row.elements
                    .push(Measurable::inline_input(constants, name, dims, shape));
                row.has_inline_input = true;
            }
            InputKind::Statement => {
                row.elements
                    .push(Measurable::statement_input(constants, name, dims));
                row.has_statement = true;
            }
            InputKind::Value => {
                let shape = constants.shape_for_check(check);
                row.elements
                    .push(Measurable::external_value_input(constants, name, dims, shape));
                row.has_external_input = true;
            }
            InputKind::Dummy => {
                let min_height = if block.is_shadow() {
                    constants.dummy_input_shadow_min_height
                } else {
                    constants.dummy_input_min_height
                };
                row.min_height = row.min_height.max(min_height);
                row.has_dummy_input = true;
            }
        }
        if row.align.is_none() {
            row.align = Some(input.align());
        }
    }

    fn add_elem_spacing(&mut self, constants: &ConstantProvider) {
        for row in &mut self.rows {
            let old = std::mem::take(&mut row.elements);
            if row.starts_with_elem_spacer() {
                row.elements
                    .push(Measurable::spacer(in_row_spacing(constants, None, old.first())));
            }
            if old.is_empty() {
                continue;
            }
            let between: Vec<f64> = old
                .windows(2)
                .map(|pair| in_row_spacing(constants, Some(&pair[0]), Some(&pair[1])))
                .collect();
            let trailing = row
                .ends_with_elem_spacer()
                .then(|| in_row_spacing(constants, old.last(), None));
            let gaps = between.into_iter().map(Some).chain(std::iter::once(trailing));
            for (elem, gap) in old.into_iter().zip(gaps) {
                row.elements.push(elem);
                if let Some(width) = gap {
                    row.elements.push(Measurable::spacer(width));
                }
            }
        }
    }

    fn add_row_spacing(&mut self, constants: &ConstantProvider) {
        let old = std::mem::take(&mut self.rows);
        let count = old.len();
        for (i, row) in old.into_iter().enumerate() {
            self.rows.push(row);
            if i + 1 < count {
                // Widened to the block width by `align_row_elements`.
                self.rows.push(Row::spacer(constants.medium_padding, 0.0));
            }
        }
    }

    fn compute_bounds(&mut self, constants: &ConstantProvider, output: Option<ShapeKind>) {
        let mut widest_statement_fields: f64 = 0.0;
        let mut block_width: f64 = 0.0;
        let mut widest_with_connected: f64 = 0.0;
        for row in &mut self.rows {
            row.measure();
            block_width = block_width.max(row.width);
            if row.has_statement {
                if let Some(input) = row.last_input() {
                    widest_statement_fields = widest_statement_fields.max(row.width - input.width);
                }
            }
            widest_with_connected = widest_with_connected.max(row.width_with_connected_blocks);
        }

        self.statement_edge = widest_statement_fields;
        self.width = block_width;
        for row in &mut self.rows {
            if row.has_statement {
                row.statement_edge = self.statement_edge;
            }
        }
        self.width_with_children = block_width.max(widest_with_connected);

        if let Some(kind) = output {
            let height: f64 = self.rows.iter().map(|row| row.height).sum();
            let tab = constants.tab(kind, height);
            self.start_x = tab.width;
            self.width += tab.width;
            self.width_with_children += tab.width;
            self.output = Some(tab);
        }
    }

    fn align_row_elements(&mut self) {
        let desired = self.width - self.start_x;
        let statement_edge = self.statement_edge;
        for row in &mut self.rows {
            if row.has_statement {
                align_statement_row(row, statement_edge, desired);
            } else {
                let missing = desired - row.width;
                if missing > 0.0 {
                    add_alignment_padding(row, missing);
                }
                if row.is_top_or_bottom() {
                    row.width_with_connected_blocks = row.width;
                }
            }
        }
    }

    fn finalize(&mut self) {
        let mut y_cursor = 0.0;
        let mut widest: f64 = 0.0;
        for row in &mut self.rows {
            row.y_pos = y_cursor;
            row.x_pos = self.start_x;
            y_cursor += row.height;
            widest = widest.max(row.width_with_connected_blocks);
            record_elem_positions(row);
        }
        self.width_with_children = widest + self.start_x;
        self.height = y_cursor;
        self.start_y = self.rows[0].ascender_height;
        if let Some(bottom) = self.rows.last_mut() {
            bottom.baseline = y_cursor - bottom.descender_height;
        }
    }

    /// Offset of every connection from the block origin. In RTL the x axis is mirrored.
    pub fn connection_offsets(&self) -> Vec<(ConnectionSlot, Coordinate)> {
        let flip = |x: f64| if self.rtl { -x } else { x };
        let mut offsets = Vec::new();

        if let Some(notch) = self
            .top_row()
            .elements
            .iter()
            .find(|elem| elem.is_previous_connection())
        {
            offsets.push((ConnectionSlot::Previous, Coordinate::new(flip(notch.x_pos), 0.0)));
        }
        let bottom = self.bottom_row();
        if let Some(notch) = bottom.elements.iter().find(|elem| elem.is_next_connection()) {
            offsets.push((
                ConnectionSlot::Next,
                Coordinate::new(flip(notch.x_pos), bottom.baseline),
            ));
        }
        if let Some(tab) = &self.output {
            offsets.push((
                ConnectionSlot::Output,
                Coordinate::new(flip(self.start_x), tab.offset_y),
            ));
        }

        for row in &self.rows {
            for elem in &row.elements {
                let (shape, offset) = match &elem.kind {
                    ElementKind::InlineInput(shape) => (
                        shape,
                        Coordinate::new(
                            flip(elem.x_pos + shape.connection_width),
                            elem.top() + shape.connection_offset_y,
                        ),
                    ),
                    ElementKind::ExternalValueInput(shape) => (
                        shape,
                        Coordinate::new(flip(row.x_pos + row.width), row.y_pos),
                    ),
                    ElementKind::StatementInput(shape) => (
                        shape,
                        Coordinate::new(
                            flip(row.x_pos + row.statement_edge + shape.notch_offset),
                            row.y_pos,
                        ),
                    ),
                    _ => continue,
                };
                offsets.push((ConnectionSlot::Input(shape.input.clone()), offset));
            }
        }
        offsets
    }

    /// Top-left corner and size of every field and icon, relative to the block origin.
    pub fn element_placements(&self) -> Vec<ElementPlacement> {
        self.rows
            .iter()
            .flat_map(|row| row.elements.iter())
            .filter_map(|elem| {
                let element = match &elem.kind {
                    ElementKind::Field { name, text, .. } => PlacedElement::Field {
                        name: name.clone(),
                        text: text.clone(),
                    },
                    ElementKind::Icon => PlacedElement::Icon,
                    _ => return None,
                };
                let x = if self.rtl {
                    -(elem.x_pos + elem.width)
                } else {
                    elem.x_pos
                };
                Some(ElementPlacement {
                    element,
                    x,
                    y: elem.top(),
                    width: elem.width,
                    height: elem.height,
                })
            })
            .collect()
    }
}

fn truncate(text: String, max: usize) -> String {
    if text.chars().count() <= max {
        return text;
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Horizontal gap between two neighbouring elements; `None` stands for a row edge.
fn in_row_spacing(
    constants: &ConstantProvider,
    prev: Option<&Measurable>,
    next: Option<&Measurable>,
) -> f64 {
    let Some(prev) = prev else {
        return match next {
            Some(next) if next.is_editable_field() => constants.medium_padding,
            Some(next) if next.is_inline_input() => constants.medium_large_padding,
            Some(next) if next.is_statement_input() => constants.statement_input_padding_left,
            _ => constants.large_padding,
        };
    };

    let Some(next) = next else {
        if prev.is_input() {
            return constants.medium_padding;
        }
        return if prev.is_editable_field() {
            constants.medium_padding
        } else if prev.is_icon() {
            constants.large_padding * 2.0 + 1.0
        } else if prev.is_hat() || prev.is_jagged_edge() {
            constants.no_padding
        } else if prev.is_previous_connection() || prev.is_next_connection() {
            constants.large_padding
        } else if prev.is_left_round_corner() {
            constants.min_block_width
        } else {
            constants.large_padding
        };
    };

    if !prev.is_input() && next.is_input() {
        if prev.is_editable_field() {
            if next.is_inline_input() || next.is_external_input() {
                return constants.small_padding;
            }
        } else if next.is_inline_input() || next.is_external_input() {
            return constants.medium_large_padding;
        } else if next.is_statement_input() {
            return constants.large_padding;
        }
        return constants.large_padding - 1.0;
    }

    if prev.is_icon() && !next.is_input() {
        return constants.large_padding;
    }

    if prev.is_inline_input() && next.is_field() {
        return if next.is_editable_field() {
            constants.medium_padding
        } else {
            constants.large_padding
        };
    }

    if prev.is_left_square_corner() {
        if next.is_hat() {
            return constants.no_padding;
        }
        if next.is_previous_connection() || next.is_next_connection() {
            return constants.notch_offset_left;
        }
    }

    if prev.is_left_round_corner()
        && (next.is_previous_connection() || next.is_next_connection())
    {
        return constants.notch_offset_left - prev.width;
    }

    if prev.is_field() && next.is_field() && prev.is_editable_field() == next.is_editable_field() {
        return constants.large_padding;
    }

    if next.is_jagged_edge() {
        return constants.large_padding;
    }

    constants.medium_padding
}

fn add_alignment_padding(row: &mut Row, missing: f64) {
    if row.has_external_input || row.has_statement {
        row.width_with_connected_blocks += missing;
    }
    let first = row.elements.iter().position(Measurable::is_spacer);
    let last = row.elements.iter().rposition(Measurable::is_spacer);
    match (row.align, first, last) {
        (Some(Align::Centre), Some(first), Some(last)) => {
            row.elements[first].width += missing / 2.0;
            row.elements[last].width += missing / 2.0;
        }
        (Some(Align::Right), Some(first), _) => row.elements[first].width += missing,
        (_, _, Some(last)) => row.elements[last].width += missing,
        _ => return,
    }
    row.width += missing;
}

fn align_statement_row(row: &mut Row, statement_edge: f64, desired: f64) {
    let Some(input_width) = row.last_input().map(|input| input.width) else {
        return;
    };
    let missing = statement_edge - (row.width - input_width);
    if missing > 0.0 {
        add_alignment_padding(row, missing);
    }
    let extra = desired - row.width;
    let row_height = row.height;
    if let Some(input) = row.last_input_mut() {
        input.width += extra;
        input.height = input.height.max(row_height);
    }
    row.width += extra;
    row.width_with_connected_blocks = row.width.max(statement_edge + row.connected_block_widths);
}

fn record_elem_positions(row: &mut Row) {
    let capline = row.y_pos + row.ascender_height;
    let baseline = row.y_pos + row.height - row.descender_height;
    let mut x_cursor = row.x_pos;
    for elem in row.elements.iter_mut() {
        if elem.is_spacer() {
            elem.height = row.height;
        }
        elem.x_pos = x_cursor;
        elem.centerline = if elem.is_spacer() {
            row.y_pos + elem.height / 2.0
        } else {
            match row.kind {
                RowKind::Bottom if elem.is_next_connection() => baseline + elem.height / 2.0,
                RowKind::Bottom => baseline - elem.height / 2.0,
                RowKind::Top if elem.is_hat() => capline - elem.height / 2.0,
                RowKind::Top => capline + elem.height / 2.0,
                _ => row.y_pos + row.height / 2.0,
            }
        };
        x_cursor += elem.width;
    }
}
