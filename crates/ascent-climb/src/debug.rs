//! Debug shapes recorded by surface probes

use ascent_core::{Color, Vec3};
use ascent_physics::SurfaceHit;
use serde::{Deserialize, Serialize};

/// Oldest persistent shapes are dropped past this count
const MAX_PERSISTENT_SHAPES: usize = 4096;

/// How long probe shapes are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebugTrace {
    #[default]
    None,
    ForOneFrame,
    Persistent,
}

impl DebugTrace {
    pub fn from_flags(show: bool, persistent: bool) -> Self {
        match (show, persistent) {
            (false, _) => Self::None,
            (true, false) => Self::ForOneFrame,
            (true, true) => Self::Persistent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DebugShapeKind {
    Line {
        start: Vec3,
        end: Vec3,
    },
    Capsule {
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
    },
}

/// One probe, drawn green if it found something and red otherwise
#[derive(Debug, Clone, PartialEq)]
pub struct DebugShape {
    pub kind: DebugShapeKind,
    pub color: Color,
    pub hit_points: Vec<Vec3>,
    pub persistent: bool,
}

#[derive(Debug, Default)]
pub struct DebugDraw {
    mode: DebugTrace,
    shapes: Vec<DebugShape>,
}

impl DebugDraw {
    pub fn new(mode: DebugTrace) -> Self {
        Self {
            mode,
            shapes: Vec::new(),
        }
    }

    pub fn shapes(&self) -> &[DebugShape] {
        &self.shapes
    }

    /// Drop the shapes that only live for one frame
    pub fn begin_frame(&mut self) {
        self.shapes.retain(|shape| shape.persistent);
    }

    pub fn record_line(&mut self, hit: &SurfaceHit) {
        let hit_points = if hit.blocking {
            vec![hit.impact_point]
        } else {
            Vec::new()
        };
        self.push(
            DebugShapeKind::Line {
                start: hit.trace_start,
                end: hit.trace_end,
            },
            hit_points,
        );
    }

    pub fn record_capsule(
        &mut self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        hits: &[SurfaceHit],
    ) {
        self.push(
            DebugShapeKind::Capsule {
                start,
                end,
                radius,
                half_height,
            },
            hits.iter().map(|hit| hit.impact_point).collect(),
        );
    }

    fn push(&mut self, kind: DebugShapeKind, hit_points: Vec<Vec3>) {
        let persistent = match self.mode {
            DebugTrace::None => return,
            DebugTrace::ForOneFrame => false,
            DebugTrace::Persistent => true,
        };

        let color = if hit_points.is_empty() {
            Color::RED
        } else {
            Color::GREEN
        };

        if persistent && self.shapes.len() >= MAX_PERSISTENT_SHAPES {
            self.shapes.remove(0);
        }

        self.shapes.push(DebugShape {
            kind,
            color,
            hit_points,
            persistent,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::blocking_hit;

    #[test]
    fn test_from_flags() {
        assert_eq!(DebugTrace::from_flags(false, true), DebugTrace::None);
        assert_eq!(DebugTrace::from_flags(true, false), DebugTrace::ForOneFrame);
        assert_eq!(DebugTrace::from_flags(true, true), DebugTrace::Persistent);
    }

    #[test]
    fn test_disabled_records_nothing() {
        let mut draw = DebugDraw::default();
        draw.record_line(&SurfaceHit::miss(Vec3::ZERO, Vec3::X));
        assert!(draw.shapes().is_empty());
    }

    #[test]
    fn test_one_frame_shapes_are_cleared() {
        let mut draw = DebugDraw::new(DebugTrace::ForOneFrame);
        draw.record_line(&SurfaceHit::miss(Vec3::ZERO, Vec3::X));
        draw.record_capsule(Vec3::ZERO, Vec3::Z, 1.0, 2.0, &[blocking_hit(Vec3::Z, Vec3::X)]);

        assert_eq!(draw.shapes()[0].color, Color::RED);
        assert_eq!(draw.shapes()[1].color, Color::GREEN);

        draw.begin_frame();
        assert!(draw.shapes().is_empty());
    }

    #[test]
    fn test_persistent_shapes_survive_frames() {
        let mut draw = DebugDraw::new(DebugTrace::Persistent);
        draw.record_line(&blocking_hit(Vec3::Y, Vec3::Y));
        draw.begin_frame();
        assert_eq!(draw.shapes().len(), 1);
        assert_eq!(draw.shapes()[0].hit_points, vec![Vec3::Y]);
    }
}
