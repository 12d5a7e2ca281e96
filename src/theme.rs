//! Colour themes for the session backgrounds and menus.

use serde::{Deserialize, Serialize};

/// Three-stop background gradient (from / via / to).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gradient {
    pub from: &'static str,
    pub via: &'static str,
    pub to: &'static str,
}

impl Gradient {
    pub const fn new(from: &'static str, via: &'static str, to: &'static str) -> Self {
        Self { from, via, to }
    }

    pub fn css(&self) -> String {
        format!(
            "linear-gradient(to bottom right, {}, {}, {})",
            self.from, self.via, self.to
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Cosmic,
    Ocean,
    Forest,
    Sunset,
    Aurora,
}

// Palette (tailwind 800/900 shades)
const INDIGO: &str = "#312e81";
const PURPLE: &str = "#581c87";
const PINK: &str = "#831843";
const BLUE: &str = "#1e3a8a";
const VIOLET: &str = "#4c1d95";
const CYAN: &str = "#164e63";
const TEAL: &str = "#134e4a";
const GREEN: &str = "#14532d";
const EMERALD: &str = "#064e3b";
const ORANGE: &str = "#7c2d12";
const RED: &str = "#7f1d1d";
const BLUE_800: &str = "#1e40af";
const CYAN_800: &str = "#155e75";
const TEAL_800: &str = "#115e59";
const GREEN_800: &str = "#166534";
const EMERALD_800: &str = "#065f46";
const ORANGE_800: &str = "#9a3412";
const RED_800: &str = "#991b1b";
const PINK_800: &str = "#9d174d";

const COSMIC: [Gradient; 4] = [
    Gradient::new(INDIGO, PURPLE, PINK),
    Gradient::new(BLUE, PURPLE, INDIGO),
    Gradient::new(PURPLE, INDIGO, BLUE),
    Gradient::new(VIOLET, PURPLE, INDIGO),
];
const OCEAN: [Gradient; 4] = [
    Gradient::new(BLUE, CYAN, TEAL),
    Gradient::new(CYAN, BLUE, INDIGO),
    Gradient::new(TEAL, CYAN, BLUE),
    Gradient::new(BLUE_800, CYAN_800, TEAL_800),
];
const FOREST: [Gradient; 4] = [
    Gradient::new(GREEN, EMERALD, TEAL),
    Gradient::new(EMERALD, GREEN, CYAN),
    Gradient::new(TEAL, GREEN, EMERALD),
    Gradient::new(GREEN_800, EMERALD_800, TEAL_800),
];
const SUNSET: [Gradient; 4] = [
    Gradient::new(ORANGE, RED, PINK),
    Gradient::new(RED, PINK, PURPLE),
    Gradient::new(PINK, ORANGE, RED),
    Gradient::new(ORANGE_800, RED_800, PINK_800),
];
const AURORA: [Gradient; 4] = [
    Gradient::new(GREEN, BLUE, PURPLE),
    Gradient::new(BLUE, PURPLE, GREEN),
    Gradient::new(PURPLE, GREEN, BLUE),
    Gradient::new(CYAN, PURPLE, PINK),
];

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Cosmic,
        Theme::Ocean,
        Theme::Forest,
        Theme::Sunset,
        Theme::Aurora,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Cosmic => "Cósmico",
            Theme::Ocean => "Océano",
            Theme::Forest => "Bosque",
            Theme::Sunset => "Atardecer",
            Theme::Aurora => "Aurora",
        }
    }

    pub fn gradients(self) -> &'static [Gradient; 4] {
        match self {
            Theme::Cosmic => &COSMIC,
            Theme::Ocean => &OCEAN,
            Theme::Forest => &FOREST,
            Theme::Sunset => &SUNSET,
            Theme::Aurora => &AURORA,
        }
    }

    pub fn primary(self) -> Gradient {
        self.gradients()[0]
    }

    pub fn as_attr(self) -> &'static str {
        match self {
            Theme::Cosmic => "cosmic",
            Theme::Ocean => "ocean",
            Theme::Forest => "forest",
            Theme::Sunset => "sunset",
            Theme::Aurora => "aurora",
        }
    }

    pub fn from_attr(s: &str) -> Option<Theme> {
        Theme::ALL.into_iter().find(|t| t.as_attr() == s)
    }
}
