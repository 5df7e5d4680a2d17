use super::Workspace;
use crate::block::{Block, BlockId, ConnectionSlot};
use std::fmt;

/// Formats a workspace as a tree of stacks, one line per block.
pub struct DisplayWorkspace<'a> {
    pub workspace: &'a Workspace,
}

impl<'a> DisplayWorkspace<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }
}

impl fmt::Display for DisplayWorkspace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Workspace {}", self.workspace.id())?;
        let roots = self.workspace.top_block_ids();
        let count = roots.len();
        for (i, root) in roots.iter().enumerate() {
            self.fmt_as_tree(root, None, f, "", i + 1 == count)?;
        }
        Ok(())
    }
}

impl DisplayWorkspace<'_> {
    fn fmt_as_tree(
        &self,
        id: &BlockId,
        via: Option<&ConnectionSlot>,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;
        if let Some(slot) = via {
            write!(f, "[{}] ", slot)?;
        }

        let Some(block) = self.workspace.get_block(id) else {
            return writeln!(f, "<Missing block '{}'>", id);
        };
        writeln!(f, "{}", describe(block))?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        let children: Vec<(ConnectionSlot, BlockId)> = block
            .connections()
            .filter(|(_, connection)| connection.kind().is_superior())
            .filter_map(|(slot, connection)| connection.target().map(|t| (slot, t.block.clone())))
            .collect();
        let count = children.len();
        for (i, (slot, child)) in children.iter().enumerate() {
            self.fmt_as_tree(child, Some(slot), f, &child_prefix, i + 1 == count)?;
        }
        Ok(())
    }
}

fn describe(block: &Block) -> String {
    let mut line = format!("{} '{}'", block.block_type(), block.id());
    let fields: Vec<String> = block
        .fields()
        .filter(|field| field.is_serializable())
        .filter_map(|field| field.name().map(|name| format!("{}={}", name, field.value())))
        .collect();
    if !fields.is_empty() {
        line.push_str(&format!(" {{{}}}", fields.join(", ")));
    }
    if block.parent().is_none() {
        line.push_str(&format!(" @ {}", block.position()));
    }
    for (flag, set) in [
        ("shadow", block.is_shadow()),
        ("collapsed", block.is_collapsed()),
        ("disabled", !block.is_enabled()),
        ("immovable", !block.is_movable()),
    ] {
        if set {
            line.push_str(&format!(" ({})", flag));
        }
    }
    line
}
