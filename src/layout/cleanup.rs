use crate::block::BlockId;
use crate::events::{EventPayload, Placement, Task};
use crate::geometry::{Coordinate, Rect};
use crate::options::GridOptions;
use crate::workspace::Workspace;
use tracing::{info, warn};

/// Snaps `value` to the grid without ever going above `floor`.
fn snap_down_from(grid: &GridOptions, floor: f64) -> f64 {
    let snapped = grid.snap_value(floor);
    if snapped < floor {
        snapped + grid.spacing
    } else {
        snapped
    }
}

impl Workspace {
    /// Arranges the movable top-level stacks in one column.
    ///
    /// Stacks are taken top to bottom (then by x, then by creation order) and placed at
    /// x = 0, each below the previous one with a gap of `min_block_height`. Immovable
    /// stacks stay put and the column flows around them.
    pub fn cleanup(&mut self) {
        if self.disposed {
            warn!(workspace = %self.id, "cleanup called on a disposed workspace");
            return;
        }
        if self.top_blocks.is_empty() {
            return;
        }
        let grid = self.options.grid;
        // Rectangles sharing an edge intersect, so the gap must be positive.
        let gap = self.renderer.constants().min_block_height.max(1.0);

        let mut movable: Vec<(BlockId, Coordinate, u64)> = Vec::new();
        let mut obstacles: Vec<Rect> = Vec::new();
        for id in &self.top_blocks {
            let Some(block) = self.blocks.get(id) else {
                continue;
            };
            if block.is_movable() {
                movable.push((id.clone(), block.position(), block.sequence()));
            } else if let Some(bounds) = self.block_bounds(id) {
                obstacles.push(bounds);
            }
        }
        movable.sort_by(|(_, a, seq_a), (_, b, seq_b)| {
            a.y.total_cmp(&b.y)
                .then(a.x.total_cmp(&b.x))
                .then(seq_a.cmp(seq_b))
        });

        let opened = self.start_group();
        let column_x = grid.snap_value(0.0);
        let mut cursor_y = 0.0;
        let mut moved = 0;
        for (id, old, _) in movable {
            let Some(bounds) = self.block_bounds(&id) else {
                continue;
            };
            let mut y = snap_down_from(&grid, cursor_y);
            let mut placed = bounds.translate(column_x - old.x, y - old.y);
            while let Some(obstacle) = obstacles.iter().find(|rect| rect.intersects(&placed)) {
                y = snap_down_from(&grid, obstacle.bottom + gap);
                placed = bounds.translate(column_x - old.x, y - old.y);
            }

            let new = Coordinate::new(column_x, y);
            if new != old {
                self.translate_stack(&id, new.x - old.x, new.y - old.y);
                self.fire(EventPayload::BlockMove {
                    block: id.clone(),
                    old: Placement::top_level(old),
                    new: Placement::top_level(new),
                    reason: vec!["cleanup".to_string()],
                });
                moved += 1;
            }
            cursor_y = placed.bottom + gap;
        }
        if opened {
            self.end_group();
        }
        if moved > 0 {
            self.tasks.schedule(Task::ResizeContents);
        }
        info!(moved, "cleaned up workspace");
    }
}
