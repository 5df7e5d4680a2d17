//! The measurable elements a row of a block is made of.

use super::constants::{ConstantProvider, ShapeKind, Tab};
use crate::block::{BlockId, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// What an element of a row stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A field; `input` and `field` index into the block's inputs.
    Field {
        input: usize,
        field: usize,
        name: Option<String>,
        text: String,
        editable: bool,
    },
    Icon,
    Hat,
    Spacer,
    PreviousConnection,
    NextConnection,
    Corner {
        side: Side,
        round: bool,
    },
    JaggedEdge,
    InlineInput(InputShape),
    ExternalValueInput(InputShape),
    StatementInput(InputShape),
}

/// Connection details shared by the three input element kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct InputShape {
    pub input: String,
    pub connected: Option<BlockId>,
    pub connected_width: f64,
    pub connected_height: f64,
    pub tab: Tab,
    pub connection_width: f64,
    pub connection_height: f64,
    pub connection_offset_y: f64,
    pub notch_offset: f64,
}

/// One element of a row with its measured size and, once finalized, its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurable {
    pub kind: ElementKind,
    pub width: f64,
    pub height: f64,
    pub x_pos: f64,
    pub centerline: f64,
}

impl Measurable {
    fn sized(kind: ElementKind, width: f64, height: f64) -> Self {
        Self {
            kind,
            width,
            height,
            x_pos: 0.0,
            centerline: 0.0,
        }
    }

    pub fn spacer(width: f64) -> Self {
        Self::sized(ElementKind::Spacer, width, 0.0)
    }

    pub fn field(
        constants: &ConstantProvider,
        input: usize,
        field_index: usize,
        field: &Field,
    ) -> Self {
        let text = field.display_text();
        let size = constants.field_size(field.kind(), &text);
        Self::sized(
            ElementKind::Field {
                input,
                field: field_index,
                name: field.name().map(str::to_string),
                text,
                editable: field.is_editable(),
            },
            size.width,
            size.height,
        )
    }

    /// The single label shown on a collapsed block.
    pub fn collapsed_label(constants: &ConstantProvider, text: String) -> Self {
        let width = constants.text_width(&text);
        Self::sized(
            ElementKind::Field {
                input: usize::MAX,
                field: 0,
                name: None,
                text,
                editable: false,
            },
            width,
            constants.field_text_height,
        )
    }

    pub fn icon(constants: &ConstantProvider) -> Self {
        Self::sized(ElementKind::Icon, constants.icon_size, constants.icon_size)
    }

    pub fn hat(constants: &ConstantProvider) -> Self {
        let hat = constants.start_hat();
        Self::sized(ElementKind::Hat, hat.width, hat.height)
    }

    pub fn previous_connection(constants: &ConstantProvider) -> Self {
        let notch = constants.notch();
        Self::sized(ElementKind::PreviousConnection, notch.width, notch.height)
    }

    pub fn next_connection(constants: &ConstantProvider) -> Self {
        let notch = constants.notch();
        Self::sized(ElementKind::NextConnection, notch.width, notch.height)
    }

    pub fn corner(constants: &ConstantProvider, side: Side, round: bool) -> Self {
        let (width, height) = if round {
            (constants.corner_radius, constants.corner_radius / 2.0)
        } else {
            (constants.no_padding, constants.no_padding)
        };
        Self::sized(ElementKind::Corner { side, round }, width, height)
    }

    pub fn jagged_edge(constants: &ConstantProvider) -> Self {
        let teeth = constants.jagged_teeth();
        Self::sized(ElementKind::JaggedEdge, teeth.width, teeth.height)
    }

    /// A value input drawn as a socket inside its row.
    pub fn inline_input(
        constants: &ConstantProvider,
        input: String,
        connected: Option<(BlockId, f64, f64)>,
        shape: ShapeKind,
    ) -> Self {
        let (height, base_width) = match &connected {
            Some((_, width, height)) => (*height, *width),
            None => (
                constants.empty_inline_input_height,
                constants.empty_inline_input_padding,
            ),
        };
        let tab = constants.tab(shape, height);
        let connection_width = tab.width;
        let connection_height = tab.height;
        let connection_offset_y = tab.offset_y;
        let width = if connected.is_some() {
            base_width
        } else {
            let sides = if shape.is_dynamic() { 2.0 } else { 1.0 };
            base_width + connection_width * sides
        };
        let (connected, connected_width, connected_height) = split(connected);
        Self::sized(
            ElementKind::InlineInput(InputShape {
                input,
                connected,
                connected_width,
                connected_height,
                tab,
                connection_width,
                connection_height,
                connection_offset_y,
                notch_offset: 0.0,
            }),
            width,
            height,
        )
    }

    /// A value input whose connected block hangs off the right edge.
    pub fn external_value_input(
        constants: &ConstantProvider,
        input: String,
        connected: Option<(BlockId, f64, f64)>,
        shape: ShapeKind,
    ) -> Self {
        let tab = constants.tab(shape, constants.tab_height);
        let height = match &connected {
            Some((_, _, child_height)) => {
                child_height - constants.tab_offset_from_top - constants.medium_padding
            }
            None => tab.height,
        };
        let width = tab.width + constants.external_value_input_padding;
        let connection_width = tab.width;
        let connection_height = tab.height;
        let (connected, connected_width, connected_height) = split(connected);
        Self::sized(
            ElementKind::ExternalValueInput(InputShape {
                input,
                connected,
                connected_width,
                connected_height,
                tab,
                connection_width,
                connection_height,
                connection_offset_y: constants.tab_offset_from_top,
                notch_offset: 0.0,
            }),
            width,
            height,
        )
    }

    pub fn statement_input(
        constants: &ConstantProvider,
        input: String,
        connected: Option<(BlockId, f64, f64)>,
    ) -> Self {
        let notch = constants.notch();
        let height = match &connected {
            Some((_, _, child_height)) => child_height + constants.statement_bottom_spacer,
            None => constants.empty_statement_input_height,
        };
        let width = constants.notch_offset_left + notch.width;
        let tab = constants.tab(ShapeKind::Notch, constants.tab_height);
        let (connected, connected_width, connected_height) = split(connected);
        Self::sized(
            ElementKind::StatementInput(InputShape {
                input,
                connected,
                connected_width,
                connected_height,
                tab,
                connection_width: notch.width,
                connection_height: notch.height,
                connection_offset_y: 0.0,
                notch_offset: constants.notch_offset_left,
            }),
            width,
            height,
        )
    }

    pub fn is_spacer(&self) -> bool {
        matches!(self.kind, ElementKind::Spacer)
    }

    pub fn is_input(&self) -> bool {
        self.input_shape().is_some()
    }

    pub fn is_inline_input(&self) -> bool {
        matches!(self.kind, ElementKind::InlineInput(_))
    }

    pub fn is_external_input(&self) -> bool {
        matches!(self.kind, ElementKind::ExternalValueInput(_))
    }

    pub fn is_statement_input(&self) -> bool {
        matches!(self.kind, ElementKind::StatementInput(_))
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, ElementKind::Field { .. })
    }

    pub fn is_editable_field(&self) -> bool {
        matches!(self.kind, ElementKind::Field { editable: true, .. })
    }

    pub fn is_icon(&self) -> bool {
        matches!(self.kind, ElementKind::Icon)
    }

    pub fn is_hat(&self) -> bool {
        matches!(self.kind, ElementKind::Hat)
    }

    pub fn is_jagged_edge(&self) -> bool {
        matches!(self.kind, ElementKind::JaggedEdge)
    }

    pub fn is_previous_connection(&self) -> bool {
        matches!(self.kind, ElementKind::PreviousConnection)
    }

    pub fn is_next_connection(&self) -> bool {
        matches!(self.kind, ElementKind::NextConnection)
    }

    pub fn is_left_square_corner(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Corner {
                side: Side::Left,
                round: false
            }
        )
    }

    pub fn is_left_round_corner(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Corner {
                side: Side::Left,
                round: true
            }
        )
    }

    pub fn is_right_round_corner(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Corner {
                side: Side::Right,
                round: true
            }
        )
    }

    pub fn input_shape(&self) -> Option<&InputShape> {
        match &self.kind {
            ElementKind::InlineInput(shape)
            | ElementKind::ExternalValueInput(shape)
            | ElementKind::StatementInput(shape) => Some(shape),
            _ => None,
        }
    }

    /// Top edge of the element, derived from its centerline.
    pub fn top(&self) -> f64 {
        self.centerline - self.height / 2.0
    }
}

fn split(connected: Option<(BlockId, f64, f64)>) -> (Option<BlockId>, f64, f64) {
    match connected {
        Some((id, width, height)) => (Some(id), width, height),
        None => (None, 0.0, 0.0),
    }
}
