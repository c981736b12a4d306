use super::assets::AssetLoader;
use super::clock::FrameClock;
use super::input::{ActionStates, InputAction};
use super::rendering::{DrawList, PerspectiveCamera, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Input for one fixed update. `was_pressed` is edge-triggered: a held key
/// reports a press only on the first update after it went down.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    held: ActionStates,
    pressed: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        held: ActionStates,
        pressed: ActionStates,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            held,
            pressed,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn with_pressed(mut self, action: InputAction) -> Self {
        self.held.set(action, true);
        self.pressed.set(action, true);
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, end: Vec3, t: f32) -> Vec3 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        Vec3 {
            x: self.x + (end.x - self.x) * t,
            y: self.y + (end.y - self.y) * t,
            z: self.z + (end.z - self.z) * t,
        }
    }
}

/// What a scene may touch besides its own state.
pub struct SceneContext<'a> {
    pub assets: &'a mut AssetLoader,
    pub viewport: Viewport,
    pub camera: PerspectiveCamera,
}

pub trait Scene {
    fn load(&mut self, ctx: &mut SceneContext<'_>);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext<'_>,
    ) -> SceneCommand;
    fn render(&mut self, clock: &FrameClock, ctx: &mut SceneContext<'_>, draw_list: &mut DrawList);
    fn unload(&mut self, ctx: &mut SceneContext<'_>);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

pub(crate) struct SceneHost {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneHost {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self, ctx: &mut SceneContext<'_>) {
        if self.is_loaded {
            return;
        }
        self.scene.load(ctx);
        self.is_loaded = true;
    }

    pub(crate) fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext<'_>,
    ) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(fixed_dt_seconds, input, ctx)
    }

    pub(crate) fn render(
        &mut self,
        clock: &FrameClock,
        ctx: &mut SceneContext<'_>,
        draw_list: &mut DrawList,
    ) {
        draw_list.clear();
        if self.is_loaded {
            self.scene.render(clock, ctx, draw_list);
        }
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn shutdown(&mut self, ctx: &mut SceneContext<'_>) {
        if self.is_loaded {
            self.scene.unload(ctx);
            self.is_loaded = false;
        }
    }
}
