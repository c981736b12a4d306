use crate::app::Vec3;

pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const DEFAULT_EYE_DISTANCE: f32 = 5.0;
const MIN_DEPTH: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; 1.0 for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Size in world units of the region the camera sees at one depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldExtent {
    pub width: f32,
    pub height: f32,
}

impl WorldExtent {
    /// Symmetric horizontal range `[-w/2 + margin, w/2 - margin]`. The margin
    /// is clamped so the range never inverts.
    pub fn horizontal_range(&self, margin: f32) -> (f32, f32) {
        let half = (self.width * 0.5).max(0.0);
        let margin = if margin.is_finite() {
            margin.clamp(0.0, half)
        } else {
            0.0
        };
        (-half + margin, half - margin)
    }
}

/// Camera on the +z axis looking toward the origin, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub eye_distance: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            eye_distance: DEFAULT_EYE_DISTANCE,
        }
    }
}

impl PerspectiveCamera {
    pub fn visible_extent(&self, viewport: Viewport, z: f32) -> WorldExtent {
        let distance = (self.eye_distance - z).max(MIN_DEPTH);
        let half_fov = self.fov_degrees.clamp(1.0, 179.0).to_radians() * 0.5;
        let height = 2.0 * half_fov.tan() * distance;
        WorldExtent {
            width: height * viewport.aspect(),
            height,
        }
    }

    /// Screen pixels covered by one world unit at depth `z`.
    pub fn pixels_per_world(&self, viewport: Viewport, z: f32) -> Option<f32> {
        if viewport.is_empty() || self.eye_distance - z <= MIN_DEPTH {
            return None;
        }
        let extent = self.visible_extent(viewport, z);
        Some(viewport.height as f32 / extent.height)
    }

    /// Projects a world point to fractional screen coordinates together with
    /// the pixel scale at its depth. `None` behind the eye.
    pub fn project(&self, world: Vec3, viewport: Viewport) -> Option<(f32, f32, f32)> {
        let pixels_per_world = self.pixels_per_world(viewport, world.z)?;
        let x = viewport.width as f32 * 0.5 + world.x * pixels_per_world;
        let y = viewport.height as f32 * 0.5 - world.y * pixels_per_world;
        Some((x, y, pixels_per_world))
    }
}

pub fn world_to_screen(
    world: Vec3,
    camera: &PerspectiveCamera,
    viewport: Viewport,
) -> Option<(i32, i32)> {
    let (x, y, _) = camera.project(world, viewport)?;
    Some((x.round() as i32, y.round() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn origin_maps_to_viewport_center() {
        let viewport = Viewport::new(800, 600);
        let camera = PerspectiveCamera::default();
        assert_eq!(
            world_to_screen(Vec3::new(0.0, 0.0, 0.0), &camera, viewport),
            Some((400, 300))
        );
    }

    #[test]
    fn visible_extent_follows_fov_and_aspect() {
        let camera = PerspectiveCamera::default();
        let extent = camera.visible_extent(Viewport::new(1600, 900), 0.0);
        let expected_height = 2.0 * (37.5f32).to_radians().tan() * 5.0;
        assert!(approx(extent.height, expected_height));
        assert!(approx(extent.width, expected_height * 16.0 / 9.0));
    }

    #[test]
    fn farther_planes_see_more_world() {
        let camera = PerspectiveCamera::default();
        let viewport = Viewport::new(800, 600);
        let near = camera.visible_extent(viewport, 0.0);
        let far = camera.visible_extent(viewport, -1.0);
        assert!(approx(far.height / near.height, 6.0 / 5.0));
        assert!(
            camera.pixels_per_world(viewport, -1.0) < camera.pixels_per_world(viewport, 0.0)
        );
    }

    #[test]
    fn visible_edge_projects_to_screen_edge() {
        let camera = PerspectiveCamera::default();
        let viewport = Viewport::new(800, 600);
        let extent = camera.visible_extent(viewport, 0.0);
        let (right, top) = (extent.width * 0.5, extent.height * 0.5);
        assert_eq!(
            world_to_screen(Vec3::new(right, top, 0.0), &camera, viewport),
            Some((800, 0))
        );
    }

    #[test]
    fn points_behind_the_eye_are_not_projected() {
        let camera = PerspectiveCamera::default();
        let viewport = Viewport::new(800, 600);
        assert_eq!(
            world_to_screen(Vec3::new(0.0, 0.0, 6.0), &camera, viewport),
            None
        );
        assert_eq!(
            world_to_screen(Vec3::new(0.0, 0.0, 0.0), &camera, Viewport::new(0, 600)),
            None
        );
    }

    #[test]
    fn horizontal_range_applies_margin_without_inverting() {
        let extent = WorldExtent {
            width: 20.0,
            height: 10.0,
        };
        assert_eq!(extent.horizontal_range(0.0), (-10.0, 10.0));
        assert_eq!(extent.horizontal_range(1.5), (-8.5, 8.5));
        assert_eq!(extent.horizontal_range(50.0), (0.0, 0.0));
        assert_eq!(extent.horizontal_range(f32::NAN), (-10.0, 10.0));
    }
}
