// Dream depth table. Index = depth level.
use crate::theme::Gradient;

#[derive(Clone, Copy, Debug)]
pub struct DreamLevel {
    pub level: u8,
    pub name: &'static str,
    pub description: &'static str,
    /// Subjective seconds per real second at this depth.
    pub time_multiplier: u32,
    /// Probability (0..=1) that a drawn word gets distorted.
    pub word_distortion: f64,
    pub accent: Gradient,
    pub effects: &'static [&'static str],
}

pub static DREAM_LEVELS: [DreamLevel; 5] = [
    DreamLevel {
        level: 0,
        name: "Realidad",
        description: "El mundo consciente donde todo es claro",
        time_multiplier: 1,
        word_distortion: 0.0,
        accent: Gradient::new("#2563eb", "#1d8ad6", "#0891b2"),
        effects: &["clarity", "logic"],
    },
    DreamLevel {
        level: 1,
        name: "Primer Sueño",
        description: "Las palabras comienzan a cambiar sutilmente",
        time_multiplier: 5,
        word_distortion: 0.2,
        accent: Gradient::new("#9333ea", "#5e4be9", "#2563eb"),
        effects: &["subtle-shift", "mild-distortion"],
    },
    DreamLevel {
        level: 2,
        name: "Sueño Profundo",
        description: "La realidad se vuelve más fluida y simbólica",
        time_multiplier: 20,
        word_distortion: 0.5,
        accent: Gradient::new("#4f46e5", "#713fe8", "#9333ea"),
        effects: &["fluid-reality", "symbolic-thinking"],
    },
    DreamLevel {
        level: 3,
        name: "Limbo Onírico",
        description: "Las palabras se transforman completamente",
        time_multiplier: 100,
        word_distortion: 0.8,
        accent: Gradient::new("#7c3aed", "#6640e9", "#4f46e5"),
        effects: &["complete-transformation", "time-dilation"],
    },
    DreamLevel {
        level: 4,
        name: "Limbo Profundo",
        description: "Realidad fragmentada, palabras como símbolos puros",
        time_multiplier: 500,
        word_distortion: 1.0,
        accent: Gradient::new("#db2777", "#ab31b2", "#7c3aed"),
        effects: &["fragmented-reality", "pure-symbols"],
    },
];

/// Deepest index in [`DREAM_LEVELS`].
pub const MAX_LEVEL: u8 = 4;

pub fn dream_level(level: u8) -> Option<&'static DreamLevel> {
    DREAM_LEVELS.get(level as usize)
}
