use crate::block::BlockId;
use crate::error::WorkspaceError;
use crate::events::{EventPayload, Task};
use crate::geometry::{Coordinate, Rect, Size};
use crate::options::ZoomOptions;
use crate::workspace::Workspace;
use tracing::trace;

/// Margin kept around the blocks by `zoom_to_fit`, in workspace units.
pub const ZOOM_TO_FIT_MARGIN: f64 = 20.0;

/// Scale and scroll offset of the visible area.
///
/// `scroll_x`/`scroll_y` are the pixel translation of the block canvas, so the
/// left edge of the view sits at `-scroll_x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Scale, top and left carried by the last viewport event.
    last_fired: (f64, f64, f64),
}

impl ViewportState {
    pub fn new(zoom: &ZoomOptions) -> Self {
        Self {
            scale: zoom.start_scale,
            scroll_x: 0.0,
            scroll_y: 0.0,
            last_fired: (zoom.start_scale, 0.0, 0.0),
        }
    }

    pub fn view_top(&self) -> f64 {
        -self.scroll_y
    }

    pub fn view_left(&self) -> f64 {
        -self.scroll_x
    }
}

/// A snapshot of the viewport geometry, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub scale: f64,
    /// The visible area.
    pub view: Rect,
    /// The blocks' bounding box, scaled.
    pub content: Rect,
    /// The area the view may scroll over: content padded by half a view each side.
    pub scroll: Rect,
}

impl Workspace {
    pub fn scale(&self) -> f64 {
        self.viewport.scale
    }

    pub fn view_top(&self) -> f64 {
        self.viewport.view_top()
    }

    pub fn view_left(&self) -> f64 {
        self.viewport.view_left()
    }

    pub fn metrics(&self) -> ViewportMetrics {
        let view = self.options.view;
        let content = self.scaled_content_bounds();
        let top = self.view_top();
        let left = self.view_left();
        ViewportMetrics {
            scale: self.viewport.scale,
            view: Rect::new(top, top + view.height, left, left + view.width),
            content,
            scroll: scroll_bounds(&content, view),
        }
    }

    /// Converts a point in view pixels to workspace units.
    pub fn view_to_workspace(&self, point: Coordinate) -> Coordinate {
        let scale = self.viewport.scale;
        Coordinate::new(
            (point.x - self.viewport.scroll_x) / scale,
            (point.y - self.viewport.scroll_y) / scale,
        )
    }

    fn scaled_content_bounds(&self) -> Rect {
        self.content_bounds()
            .map(|rect| rect.scale(self.viewport.scale))
            .unwrap_or_default()
    }

    /// Sets the zoom level, clamped to the configured limits.
    pub fn set_scale(&mut self, scale: f64) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let zoom = self.options.zoom;
        self.viewport.scale = scale.clamp(zoom.min_scale, zoom.max_scale);
        self.clamp_scroll();
        self.tasks.schedule(Task::ViewportCheck);
        Ok(())
    }

    /// Zooms by `amount` steps about a point given in view pixels. Negative amounts zoom out.
    pub fn zoom(&mut self, x: f64, y: f64, amount: f64) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let zoom = self.options.zoom;
        let old_scale = self.viewport.scale;
        let new_scale = (old_scale * zoom.scale_speed.powf(amount)).clamp(zoom.min_scale, zoom.max_scale);
        let change = new_scale / old_scale;
        // Keep the workspace point under (x, y) fixed.
        self.viewport.scroll_x += (x - self.viewport.scroll_x) * (1.0 - change);
        self.viewport.scroll_y += (y - self.viewport.scroll_y) * (1.0 - change);
        self.set_scale(new_scale)
    }

    pub fn zoom_center(&mut self, amount: f64) -> Result<(), WorkspaceError> {
        let view = self.options.view;
        self.zoom(view.width / 2.0, view.height / 2.0, amount)
    }

    /// Scales and scrolls so every block is visible and centred.
    pub fn zoom_to_fit(&mut self) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let Some(bounds) = self.content_bounds() else {
            return Ok(());
        };
        let view = self.options.view;
        let width = bounds.width() + ZOOM_TO_FIT_MARGIN * 2.0;
        let height = bounds.height() + ZOOM_TO_FIT_MARGIN * 2.0;
        if width <= 0.0 || height <= 0.0 {
            return Ok(());
        }
        self.set_scale((view.width / width).min(view.height / height))?;
        self.scroll_center()
    }

    /// Scrolls by a pixel offset.
    pub fn scroll(&mut self, dx: f64, dy: f64) -> Result<(), WorkspaceError> {
        let (x, y) = (self.viewport.scroll_x + dx, self.viewport.scroll_y + dy);
        self.scroll_to(x, y)
    }

    /// Sets the canvas translation, clamped to the scrollable area.
    pub fn scroll_to(&mut self, x: f64, y: f64) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        self.viewport.scroll_x = x;
        self.viewport.scroll_y = y;
        self.clamp_scroll();
        self.tasks.schedule(Task::ViewportCheck);
        Ok(())
    }

    /// Centres the view on the middle of the scrollable area.
    pub fn scroll_center(&mut self) -> Result<(), WorkspaceError> {
        let metrics = self.metrics();
        let view = self.options.view;
        let x = -(metrics.scroll.width() - view.width) / 2.0 - metrics.scroll.left;
        let y = -(metrics.scroll.height() - view.height) / 2.0 - metrics.scroll.top;
        self.scroll_to(x, y)
    }

    /// Scrolls so the centre of a block's stack is in the middle of the view.
    pub fn center_on_block(&mut self, id: &BlockId) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        self.block(id)?;
        let Some(bounds) = self.block_bounds(id) else {
            return Ok(());
        };
        let scale = self.viewport.scale;
        let view = self.options.view;
        let centre_x = (bounds.left + bounds.right) / 2.0 * scale;
        let centre_y = (bounds.top + bounds.bottom) / 2.0 * scale;
        self.scroll_to(view.width / 2.0 - centre_x, view.height / 2.0 - centre_y)
    }

    /// Changes the size of the visible area.
    pub fn resize_view(&mut self, width: f64, height: f64) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        self.options.view = Size::new(width, height);
        self.clamp_scroll();
        self.tasks.schedule(Task::ViewportCheck);
        Ok(())
    }

    pub(crate) fn clamp_scroll(&mut self) {
        let view = self.options.view;
        let scroll = scroll_bounds(&self.scaled_content_bounds(), view);
        let max_left = scroll.left + (scroll.width() - view.width).max(0.0);
        let max_top = scroll.top + (scroll.height() - view.height).max(0.0);
        let left = self.viewport.view_left().max(scroll.left).min(max_left);
        let top = self.viewport.view_top().max(scroll.top).min(max_top);
        self.viewport.scroll_x = -left;
        self.viewport.scroll_y = -top;
    }

    /// Queues a viewport event when scale or scroll moved since the last one.
    pub(crate) fn check_viewport(&mut self) {
        let state = self.viewport;
        let (old_scale, old_top, old_left) = state.last_fired;
        let (top, left) = (state.view_top(), state.view_left());
        if state.scale == old_scale && (top - old_top).abs() < 1.0 && (left - old_left).abs() < 1.0 {
            return;
        }
        self.viewport.last_fired = (state.scale, top, left);
        trace!(scale = state.scale, top, left, "viewport changed");
        self.fire(EventPayload::ViewportChange {
            view_top: top,
            view_left: left,
            scale: state.scale,
            old_scale,
        });
    }
}

fn scroll_bounds(content: &Rect, view: Size) -> Rect {
    let half_width = view.width / 2.0;
    let half_height = view.height / 2.0;
    Rect::new(
        (content.top - half_height).min(content.bottom - view.height),
        (content.bottom + half_height).max(content.top + view.height),
        (content.left - half_width).min(content.right - view.width),
        (content.right + half_width).max(content.left + view.width),
    )
}
