use std::sync::Arc;

use goldhop_engine::{
    Banner, DrawList, FrameClock, InputAction, InputSnapshot, Label, Scene, SceneCommand,
    SceneContext, Vec2,
};
use tracing::info;

use super::animation::AnimationMode;
use super::model::ActorId;
use super::scheduler::EndPolicy;
use super::session::{
    EntityVisual, PlaybackPosition, PlaybackSession, PlaybackStatus, RenderFrame,
};
use super::sprites::{SpriteBinding, BACKDROP_KEY};

const LABEL_COLOR: [u8; 4] = [240, 240, 232, 255];
const ROBBED_LABEL_COLOR: [u8; 4] = [236, 104, 88, 255];
const PANEL_HEADER_COLOR: [u8; 4] = [255, 214, 92, 255];
const PANEL_TEXT_COLOR: [u8; 4] = [220, 220, 220, 255];
const PANEL_TRANSFER_COLOR: [u8; 4] = [240, 196, 32, 255];
const BANNER_INFO_COLOR: [u8; 4] = [220, 220, 220, 255];
const BANNER_ERROR_COLOR: [u8; 4] = [236, 104, 88, 255];

pub(crate) struct PlaybackScene {
    session: PlaybackSession,
    backdrop: SpriteBinding,
    show_inspector: bool,
}

impl PlaybackScene {
    pub(crate) fn new(session: PlaybackSession) -> Self {
        Self {
            session,
            backdrop: SpriteBinding::without_placeholder(),
            show_inspector: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &PlaybackSession {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn inspector_visible(&self) -> bool {
        self.show_inspector
    }
}

impl Scene for PlaybackScene {
    fn load(&mut self, ctx: &mut SceneContext<'_>) {
        self.session.start(ctx.assets);
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext<'_>,
    ) -> SceneCommand {
        if input.quit_requested() || input.was_pressed(InputAction::Quit) {
            return SceneCommand::Quit;
        }
        if input.was_pressed(InputAction::ToggleInspector) {
            self.show_inspector = !self.show_inspector;
        }
        if input.was_pressed(InputAction::TogglePlayback) {
            self.session.toggle_mode();
        }
        if input.was_pressed(InputAction::Restart) {
            self.session.restart(ctx.assets);
        }
        if input.was_pressed(InputAction::StepForward) {
            self.session.step_forward();
        }
        if input.was_pressed(InputAction::StepBack) {
            self.session.step_back();
        }

        self.session.update(fixed_dt_seconds);
        SceneCommand::None
    }

    fn render(&mut self, clock: &FrameClock, ctx: &mut SceneContext<'_>, draw_list: &mut DrawList) {
        let backdrop = self.backdrop.want(BACKDROP_KEY, ctx.assets);
        let margin = self.session.config().horizontal_margin;
        let target = ctx
            .camera
            .visible_extent(ctx.viewport, 0.0)
            .horizontal_range(margin);
        let frame = self.session.render_tick(clock, target, ctx.assets);
        if let (Some(backdrop), PlaybackStatus::Playing(_)) = (backdrop, &frame.status) {
            draw_list.set_backdrop(backdrop);
        }

        for entity in &frame.entities {
            let Some(image) = &entity.image else {
                continue;
            };
            draw_list.billboard(
                Arc::clone(image),
                entity.position,
                Vec2::new(entity.scale, entity.scale),
                Some(entity_label(entity)),
            );
        }
        for marker in &frame.markers {
            if let Some(image) = &marker.image {
                draw_list.billboard(
                    Arc::clone(image),
                    marker.position,
                    Vec2::new(marker.scale, marker.scale),
                    None,
                );
            }
        }

        if let Some(banner) = status_banner(&frame.status) {
            draw_list.set_banner(banner);
        }
        if self.show_inspector {
            for (text, color) in inspector_lines(&frame) {
                draw_list.panel_line(text, color);
            }
        }
    }

    fn unload(&mut self, _ctx: &mut SceneContext<'_>) {
        info!("playback_scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        match self.session.status() {
            PlaybackStatus::Playing(position) => Some(format!(
                "Goldhop | iteration {}/{} | {} | {} entities",
                position.iteration,
                position.len.saturating_sub(1),
                position.mode.as_str(),
                self.session.active_entities().len()
            )),
            PlaybackStatus::Failed(_) => Some("Goldhop | dataset rejected".to_string()),
            PlaybackStatus::Awaiting => None,
        }
    }
}

fn entity_label(entity: &EntityVisual) -> Label {
    let color = if entity.robbed {
        ROBBED_LABEL_COLOR
    } else {
        LABEL_COLOR
    };
    Label::new(format!("#{} {:.0}", entity.id, entity.resource), color)
}

fn status_banner(status: &PlaybackStatus) -> Option<Banner> {
    match status {
        PlaybackStatus::Playing(_) => None,
        PlaybackStatus::Awaiting => Some(Banner {
            title: "Loading dataset".to_string(),
            detail: None,
            color: BANNER_INFO_COLOR,
        }),
        PlaybackStatus::Failed(message) => Some(Banner {
            title: "Cannot render dataset (press R to restart)".to_string(),
            detail: Some(message.clone()),
            color: BANNER_ERROR_COLOR,
        }),
    }
}

fn position_header(position: &PlaybackPosition) -> String {
    let policy = match position.end_policy {
        EndPolicy::Halt => "halt",
        EndPolicy::Wrap => "wrap",
    };
    let end_marker = if position.terminal { " end" } else { "" };
    format!(
        "iter {}/{} {} {}{}",
        position.iteration,
        position.len.saturating_sub(1),
        position.mode.as_str(),
        policy,
        end_marker
    )
}

fn format_ref(id: Option<ActorId>) -> String {
    id.map(|id| format!("#{id}"))
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn inspector_lines(frame: &RenderFrame) -> Vec<(String, [u8; 4])> {
    let PlaybackStatus::Playing(position) = &frame.status else {
        return Vec::new();
    };
    let mut lines = vec![(position_header(position), PANEL_HEADER_COLOR)];

    for row in &frame.inspector {
        let next = row
            .next_x
            .map(|x| format!("{x:.2}"))
            .unwrap_or_else(|| "gone".to_string());
        let state = match row.mode {
            AnimationMode::Idle => "idle",
            AnimationMode::Jumping => "jump",
        };
        let mut text = format!(
            "#{} {} gold={:.0} x={:.2} next={} from={} {}",
            row.id,
            row.kind.as_str(),
            row.resource,
            row.visual_x,
            next,
            format_ref(row.source_of_transfer),
            state
        );
        if row.eliminated_target.is_some() {
            text.push_str(&format!(" elim={}", format_ref(row.eliminated_target)));
        }
        lines.push((text, PANEL_TEXT_COLOR));
    }

    for marker in &frame.markers {
        lines.push((
            format!(
                "transfer #{}>#{} {:.0}%",
                marker.pair.source,
                marker.pair.destination,
                marker.progress * 100.0
            ),
            PANEL_TRANSFER_COLOR,
        ));
    }
    for (guardian, target) in &frame.eliminations {
        lines.push((
            format!("#{guardian} eliminated #{target}"),
            BANNER_ERROR_COLOR,
        ));
    }
    lines
}
