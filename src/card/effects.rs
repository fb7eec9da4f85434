//! Decorative particle effects.
//!
//! Purely visual; nothing here influences stage transitions. Every set has a
//! fixed size so an effect can never grow unbounded.

use rand::Rng;
use serde::Serialize;

pub const BURST_HEART_COUNT: usize = 12;
pub const CONFETTI_COUNT: usize = 120;
pub const FLOATING_HEART_COUNT: usize = 18;
pub const WILTING_PETAL_COUNT: usize = 8;

const CONFETTI_COLORS: [&str; 7] = [
    "#f9a8d4", "#fbbf24", "#c084fc", "#f87171", "#34d399", "#60a5fa", "#fff",
];
const BURST_GLYPHS: [&str; 5] = ["❤️", "💕", "💗", "🌹", "✨"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle,
    Rect,
}

/// One confetti piece falling from the top edge.
#[derive(Debug, Clone, Serialize)]
pub struct Confetti {
    /// Horizontal position, percent of width.
    pub left: f32,
    pub size: f32,
    pub rotation: f32,
    pub color: &'static str,
    pub shape: Shape,
    pub delay_secs: f32,
    pub duration_secs: f32,
}

/// A heart drifting up from the bottom edge.
#[derive(Debug, Clone, Serialize)]
pub struct FloatingHeart {
    pub left: f32,
    pub size: f32,
    pub opacity: f32,
    pub delay_secs: f32,
    pub duration_secs: f32,
}

/// A glyph thrown outward from the envelope as it opens.
#[derive(Debug, Clone, Serialize)]
pub struct BurstHeart {
    /// Direction in radians.
    pub angle: f32,
    pub distance: f32,
    pub glyph: &'static str,
    pub delay_secs: f32,
}

/// A petal around the wilting flower, evenly spaced.
#[derive(Debug, Clone, Serialize)]
pub struct Petal {
    /// Rotation in degrees.
    pub angle: f32,
}

/// All transient effects currently on screen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Effects {
    pub burst: Vec<BurstHeart>,
    pub confetti: Vec<Confetti>,
    pub floating_hearts: Vec<FloatingHeart>,
    pub petals: Vec<Petal>,
}

impl Effects {
    pub fn is_empty(&self) -> bool {
        self.burst.is_empty()
            && self.confetti.is_empty()
            && self.floating_hearts.is_empty()
            && self.petals.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Hearts thrown while the envelope opens.
    pub fn open_burst(&mut self) {
        let mut rng = rand::thread_rng();
        self.burst = (0..BURST_HEART_COUNT)
            .map(|i| BurstHeart {
                angle: i as f32 / BURST_HEART_COUNT as f32 * std::f32::consts::TAU,
                distance: rng.gen_range(80.0..200.0),
                glyph: BURST_GLYPHS[i % BURST_GLYPHS.len()],
                delay_secs: i as f32 * 0.06,
            })
            .collect();
    }

    pub fn end_burst(&mut self) {
        self.burst.clear();
    }

    /// Confetti and floating hearts for an accepted card.
    pub fn celebrate(&mut self) {
        let mut rng = rand::thread_rng();
        self.confetti = (0..CONFETTI_COUNT)
            .map(|i| Confetti {
                left: rng.gen_range(0.0..100.0),
                size: rng.gen_range(6.0..16.0),
                rotation: rng.gen_range(-360.0..360.0),
                color: CONFETTI_COLORS[rng.gen_range(0..CONFETTI_COLORS.len())],
                shape: if rng.gen_bool(0.5) {
                    Shape::Circle
                } else {
                    Shape::Rect
                },
                delay_secs: i as f32 * 0.01,
                duration_secs: rng.gen_range(1.5..3.5),
            })
            .collect();
        self.floating_hearts = (0..FLOATING_HEART_COUNT)
            .map(|i| FloatingHeart {
                left: rng.gen_range(5.0..95.0),
                size: rng.gen_range(14.0..38.0),
                opacity: rng.gen_range(0.4..0.9),
                delay_secs: i as f32 * 0.15,
                duration_secs: rng.gen_range(2.0..5.0),
            })
            .collect();
    }

    /// Petals for a declined card.
    pub fn wilt(&mut self) {
        self.petals = (0..WILTING_PETAL_COUNT)
            .map(|i| Petal {
                angle: i as f32 / WILTING_PETAL_COUNT as f32 * 360.0,
            })
            .collect();
    }
}
