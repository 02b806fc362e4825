use crate::diagram::RayDiagram;
use crate::optics::OpticalType;

use std::path::PathBuf;

/// UI fields are whole numbers; the engine works in canvas units at ten
/// times that scale. Preserved from the original presentation layer so the
/// rendered diagram keeps the same visual scale.
pub const UI_UNIT: f32 = 10.0;

/// Commands the input layer can issue against the panel. Keeping the
/// key-binding side separate from the panel keeps both halves testable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SelectOptical(OpticalType),
    NudgeObjectDistance(i32),
    NudgeFocalLength(i32),
    NudgeObjectSize(i32),
    LoadObject(PathBuf),
}

/// Parameter/command facade over the engine: integer UI-unit parameters in,
/// integer read-backs of the derived image distance and size out.
pub struct ControlPanel {
    pub a: i32,
    pub f: i32,
    pub object_size: i32,
    /// derived read-backs, refreshed after each frame
    pub b: i32,
    pub image_size: i32,
}

impl ControlPanel {
    pub fn new(a: i32, f: i32, object_size: i32) -> ControlPanel {
        ControlPanel {
            a,
            f,
            object_size,
            b: 0,
            image_size: 0,
        }
    }

    /// Pushes every parameter into the engine, used once at startup.
    pub fn push(&self, diagram: &mut RayDiagram) {
        diagram.set_object_distance(self.a as f32 * UI_UNIT);
        diagram.set_focal_length(self.f as f32 * UI_UNIT);
        diagram.set_object_size(self.object_size as f32 * UI_UNIT);
    }

    /// Applies one command. Only a type switch can fail (missing icon
    /// asset), and that failure is fatal to the caller.
    pub fn apply(&mut self, command: Command, diagram: &mut RayDiagram) -> anyhow::Result<()> {
        match command {
            Command::SelectOptical(optical) => diagram.set_optical(optical)?,
            Command::NudgeObjectDistance(delta) => {
                self.a += delta;
                diagram.set_object_distance(self.a as f32 * UI_UNIT);
            }
            Command::NudgeFocalLength(delta) => {
                self.f += delta;
                diagram.set_focal_length(self.f as f32 * UI_UNIT);
            }
            Command::NudgeObjectSize(delta) => {
                self.object_size += delta;
                diagram.set_object_size(self.object_size as f32 * UI_UNIT);
            }
            Command::LoadObject(path) => diagram.set_object_path(path),
        }
        Ok(())
    }

    /// Reads the frame's derived values back into display units. Non-finite
    /// values saturate instead of panicking.
    pub fn refresh(&mut self, diagram: &RayDiagram) {
        self.b = (diagram.image_distance() / UI_UNIT) as i32;
        self.image_size = (diagram.image_size() / UI_UNIT) as i32;
    }
}
