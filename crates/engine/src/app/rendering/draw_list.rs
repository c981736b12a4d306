use std::sync::Arc;

use crate::app::{SpriteImage, Vec2, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub color: [u8; 4],
}

impl Label {
    pub fn new(text: impl Into<String>, color: [u8; 4]) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// A camera-facing textured quad. `scale` is its size in world units.
#[derive(Debug, Clone)]
pub struct Billboard {
    pub image: Arc<SpriteImage>,
    pub position: Vec3,
    pub scale: Vec2,
    pub label: Option<Label>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelLine {
    pub text: String,
    pub color: [u8; 4],
}

/// Centered message drawn over everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub title: String,
    pub detail: Option<String>,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    backdrop: Option<Arc<SpriteImage>>,
    billboards: Vec<Billboard>,
    panel: Vec<PanelLine>,
    banner: Option<Banner>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.backdrop = None;
        self.billboards.clear();
        self.panel.clear();
        self.banner = None;
    }

    pub fn set_backdrop(&mut self, image: Arc<SpriteImage>) {
        self.backdrop = Some(image);
    }

    pub fn backdrop(&self) -> Option<&Arc<SpriteImage>> {
        self.backdrop.as_ref()
    }

    pub fn billboard(
        &mut self,
        image: Arc<SpriteImage>,
        position: Vec3,
        scale: Vec2,
        label: Option<Label>,
    ) {
        self.billboards.push(Billboard {
            image,
            position,
            scale,
            label,
        });
    }

    /// Billboards in submission order.
    pub fn billboards(&self) -> &[Billboard] {
        &self.billboards
    }

    /// Billboards farthest first. Equal depths keep submission order.
    pub fn back_to_front(&self) -> Vec<&Billboard> {
        let mut ordered: Vec<&Billboard> = self.billboards.iter().collect();
        ordered.sort_by(|a, b| a.position.z.total_cmp(&b.position.z));
        ordered
    }

    pub fn panel_line(&mut self, text: impl Into<String>, color: [u8; 4]) {
        self.panel.push(PanelLine {
            text: text.into(),
            color,
        });
    }

    pub fn panel(&self) -> &[PanelLine] {
        &self.panel
    }

    pub fn set_banner(&mut self, banner: Banner) {
        self.banner = Some(banner);
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }
}
