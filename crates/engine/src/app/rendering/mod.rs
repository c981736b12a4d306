mod canvas;
mod draw_list;
mod glyphs;
mod renderer;
mod transform;

pub use draw_list::{Banner, Billboard, DrawList, Label, PanelLine};
pub use renderer::Renderer;
pub use transform::{
    world_to_screen, PerspectiveCamera, Viewport, WorldExtent, DEFAULT_EYE_DISTANCE,
    DEFAULT_FOV_DEGREES,
};
