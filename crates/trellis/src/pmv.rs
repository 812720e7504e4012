//! Projection / model-view state threaded through the draw pass

use crate::geometry::{Point, Rect, Size};
use glam::{Mat4, Vec2, Vec3};

/// Projection, model-view translation stack and scissor box.
///
/// Widgets draw in local coordinates; containers [`push`](PmvMatrix::push)
/// each child's bounds before drawing it, which translates the model-view and
/// narrows the scissor box to the child.
#[derive(Debug, Clone)]
pub struct PmvMatrix {
    projection: Mat4,
    offset: Point,
    scissor_box: Rect,
    screen_size: Size,
    stack: Vec<(Point, Rect)>,
}

impl PmvMatrix {
    pub fn new() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            offset: Point::ZERO,
            scissor_box: Rect::default(),
            screen_size: Size::ZERO,
            stack: Vec::new(),
        }
    }

    /// Reset projection and model-view to identity
    pub fn identity(&mut self) {
        self.projection = Mat4::IDENTITY;
        self.offset = Point::ZERO;
        self.stack.clear();
    }

    /// Orthographic projection over `rect`, y growing downwards
    pub fn orthographic(&mut self, rect: Rect) {
        let [left, top, right, bottom] = rect.to_f32();
        self.projection = Mat4::orthographic_rh(left, right, bottom, top, -1.0, 1.0);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn model_view(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.offset.x as f32, self.offset.y as f32, 0.0))
    }

    /// The combined projection * model-view matrix
    pub fn pmv(&self) -> Mat4 {
        self.projection * self.model_view()
    }

    /// Map a local point to normalized device coordinates
    pub fn project(&self, point: Vec2) -> Vec2 {
        self.pmv().project_point3(point.extend(0.0)).truncate()
    }

    pub fn screen_size(&self) -> Size {
        self.screen_size
    }

    pub fn set_screen_size(&mut self, size: Size) {
        self.screen_size = size;
    }

    /// Current scissor box in window coordinates
    pub fn scissor_box(&self) -> Rect {
        self.scissor_box
    }

    pub fn set_scissor_box(&mut self, rect: Rect) {
        self.scissor_box = rect;
    }

    /// Accumulated translation of the local coordinate system
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Enter a child occupying `bounds` (in the current local coordinates)
    pub fn push(&mut self, bounds: Rect) {
        self.stack.push((self.offset, self.scissor_box));
        let screen_bounds = bounds.translate(self.offset);
        self.scissor_box = self.scissor_box.intersect(&screen_bounds);
        self.offset = screen_bounds.origin;
    }

    /// Leave the child entered by the matching [`push`](PmvMatrix::push)
    pub fn pop(&mut self) {
        match self.stack.pop() {
            Some((offset, scissor_box)) => {
                self.offset = offset;
                self.scissor_box = scissor_box;
            }
            None => log::warn!("PmvMatrix::pop called without a matching push"),
        }
    }
}

impl Default for PmvMatrix {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_orthographic_maps_window_corners() {
        let mut pmv = PmvMatrix::new();
        pmv.orthographic(Rect::new(0, 0, 800, 600));

        assert!(approx(pmv.project(Vec2::new(0.0, 0.0)), Vec2::new(-1.0, 1.0)));
        assert!(approx(pmv.project(Vec2::new(800.0, 600.0)), Vec2::new(1.0, -1.0)));
        assert!(approx(pmv.project(Vec2::new(400.0, 300.0)), Vec2::ZERO));
    }

    #[test]
    fn test_push_translates_and_clips() {
        let mut pmv = PmvMatrix::new();
        pmv.orthographic(Rect::new(0, 0, 100, 100));
        pmv.set_scissor_box(Rect::new(0, 0, 100, 100));

        pmv.push(Rect::new(10, 20, 50, 50));
        assert_eq!(pmv.offset(), Point::new(10, 20));
        assert_eq!(pmv.scissor_box(), Rect::new(10, 20, 50, 50));

        pmv.push(Rect::new(40, 0, 30, 10));
        assert_eq!(pmv.offset(), Point::new(50, 20));
        assert_eq!(pmv.scissor_box(), Rect::new(50, 20, 10, 10));

        pmv.pop();
        pmv.pop();
        assert_eq!(pmv.offset(), Point::ZERO);
        assert_eq!(pmv.scissor_box(), Rect::new(0, 0, 100, 100));
    }

    #[test]
    fn test_local_origin_projects_to_child_position() {
        let mut pmv = PmvMatrix::new();
        pmv.orthographic(Rect::new(0, 0, 200, 200));
        pmv.push(Rect::new(100, 100, 10, 10));
        assert!(approx(pmv.project(Vec2::ZERO), Vec2::ZERO));
    }
}
