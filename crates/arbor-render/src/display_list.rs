//! Recorded paint commands.
//!
//! A [`DisplayList`] is immutable once recorded and shared through
//! [`DisplayListHandle`], so a parent can invoke a child's cached list without
//! copying it.

use std::rc::Rc;

use arbor_geometry::{Color, Point, Rect};

pub type DisplayListHandle = Rc<DisplayList>;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Fills `rect` in the current coordinate space.
    FillRect { rect: Rect, color: Color },
    /// Fills the entire current clip.
    Fill { color: Color },
    /// Replays another list in the current state.
    Invoke(DisplayListHandle),
    /// Pushes the current translation, clip and opacity.
    Save,
    /// Pushes the current state and starts a group composited at `alpha`.
    SaveLayer { alpha: f32 },
    /// Pops the state pushed by the matching `Save` or `SaveLayer`.
    Restore,
    Translate(Point),
    ClipRect(Rect),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(commands: Vec<DrawCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Resolves nested invocations into fills in absolute coordinates.
    pub fn flatten(&self) -> Vec<ScenePrimitive> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut state = FlattenState {
            origin: Point::ZERO,
            clip: Rect::LARGEST,
            opacity: 1.0,
        };
        self.flatten_into(&mut state, &mut stack, &mut out);
        out
    }

    fn flatten_into(
        &self,
        state: &mut FlattenState,
        stack: &mut Vec<FlattenState>,
        out: &mut Vec<ScenePrimitive>,
    ) {
        for command in &self.commands {
            match command {
                DrawCommand::FillRect { rect, color } => out.push(ScenePrimitive {
                    rect: rect.offset(state.origin),
                    clip: state.clip,
                    color: *color,
                    opacity: state.opacity,
                }),
                DrawCommand::Fill { color } => out.push(ScenePrimitive {
                    rect: state.clip,
                    clip: state.clip,
                    color: *color,
                    opacity: state.opacity,
                }),
                DrawCommand::Invoke(list) => list.flatten_into(state, stack, out),
                DrawCommand::Save => stack.push(*state),
                DrawCommand::SaveLayer { alpha } => {
                    stack.push(*state);
                    state.opacity *= alpha;
                }
                DrawCommand::Restore => {
                    if let Some(saved) = stack.pop() {
                        *state = saved;
                    }
                }
                DrawCommand::Translate(by) => state.origin += *by,
                DrawCommand::ClipRect(rect) => {
                    state.clip = state.clip.intersect(&rect.offset(state.origin));
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
struct FlattenState {
    origin: Point,
    clip: Rect,
    opacity: f32,
}

/// A single fill after all translations, clips and opacity groups are applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePrimitive {
    pub rect: Rect,
    pub clip: Rect,
    pub color: Color,
    pub opacity: f32,
}

impl ScenePrimitive {
    /// The part of the fill that survives clipping.
    pub fn visible_rect(&self) -> Rect {
        self.rect.intersect(&self.clip)
    }
}

/// Accumulates commands for one recording scope.
#[derive(Default)]
pub struct DisplayListBuilder {
    commands: Vec<DrawCommand>,
}

impl DisplayListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    pub fn fill(&mut self, color: Color) {
        self.push(DrawCommand::Fill { color });
    }

    /// Invokes `list` with its origin at `offset`.
    pub fn invoke_at(&mut self, offset: Point, list: DisplayListHandle) {
        if offset == Point::ZERO {
            self.push(DrawCommand::Invoke(list));
            return;
        }
        self.push(DrawCommand::Save);
        self.push(DrawCommand::Translate(offset));
        self.push(DrawCommand::Invoke(list));
        self.push(DrawCommand::Restore);
    }

    pub fn finish(self) -> DisplayListHandle {
        Rc::new(DisplayList::new(self.commands))
    }
}

#[cfg(test)]
#[path = "tests/display_list_tests.rs"]
mod tests;
