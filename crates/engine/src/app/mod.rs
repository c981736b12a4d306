mod assets;
mod clock;
mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use assets::{
    AssetHandle, AssetLoadError, AssetLoader, AssetPoll, AssetSource, DiskSpriteSource,
    SpriteImage,
};
pub use clock::FrameClock;
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    world_to_screen, Banner, Billboard, DrawList, Label, PanelLine, PerspectiveCamera, Renderer,
    Viewport, WorldExtent, DEFAULT_EYE_DISTANCE, DEFAULT_FOV_DEGREES,
};
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneContext, Vec2, Vec3};
