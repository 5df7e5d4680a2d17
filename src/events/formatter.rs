use super::{Event, EventPayload, Placement};

/// Formats events into one-line, human-readable descriptions.
pub struct EventFormatter;

impl EventFormatter {
    pub fn format(event: &Event) -> String {
        let body = match &event.payload {
            EventPayload::BlockCreate { block, ids, state } => {
                if ids.len() > 1 {
                    format!(
                        "created {} '{}' with {} descendant(s)",
                        state.block_type,
                        block,
                        ids.len() - 1
                    )
                } else {
                    format!("created {} '{}'", state.block_type, block)
                }
            }
            EventPayload::BlockDelete {
                block,
                old_state,
                was_shadow,
                ..
            } => {
                let shadow = if *was_shadow { " shadow" } else { "" };
                format!("deleted{} {} '{}'", shadow, old_state.block_type, block)
            }
            EventPayload::BlockMove {
                block,
                old,
                new,
                reason,
            } => {
                let mut line = format!(
                    "moved '{}' from {} to {}",
                    block,
                    Self::format_placement(old),
                    Self::format_placement(new)
                );
                if !reason.is_empty() {
                    line.push_str(&format!(" [{}]", reason.join(", ")));
                }
                line
            }
            EventPayload::BlockChange {
                block,
                element,
                name,
                old_value,
                new_value,
            } => {
                let target = match name {
                    Some(name) => format!("{:?} '{}'", element, name),
                    None => format!("{:?}", element),
                };
                format!(
                    "changed {} of '{}' from {} to {}",
                    target.to_lowercase(),
                    block,
                    old_value,
                    new_value
                )
            }
            EventPayload::ViewportChange {
                view_top,
                view_left,
                scale,
                old_scale,
            } => format!(
                "viewport scale {} -> {}, top {:.1}, left {:.1}",
                Self::format_number(*old_scale),
                Self::format_number(*scale),
                view_top,
                view_left
            ),
            EventPayload::FinishedLoading => "finished loading".to_string(),
        };

        match &event.group {
            Some(group) => format!("[{}] {}", group, body),
            None => body,
        }
    }

    fn format_placement(placement: &Placement) -> String {
        match (&placement.parent, &placement.coordinate) {
            (Some(parent), _) => match &placement.input {
                Some(input) => format!("input '{}' of '{}'", input, parent),
                None => format!("below '{}'", parent),
            },
            (None, Some(coordinate)) => coordinate.to_string(),
            (None, None) => "nowhere".to_string(),
        }
    }

    fn format_number(n: f64) -> String {
        if n.fract() == 0.0 {
            format!("{}", n as i64)
        } else {
            format!("{}", n)
        }
    }
}
