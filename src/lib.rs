//! Hypnagogic Quest core crate.
//!
//! A browser companion for exploring the drowsy edge of sleep: guided word
//! sessions, a dream recorder with live audio analysis, a hypnagogic interval
//! timer and the layered "inception" word game. `start_quest()` mounts the
//! whole app into the page; the word datasets below are shared by the session
//! and its tests.

use wasm_bindgen::prelude::*;

pub mod app;
pub mod config;
pub mod error;
pub mod inception;
pub mod menu;
pub mod recorder;
pub mod rng;
pub mod session;
pub mod storage;
pub mod theme;
pub mod timer;

pub use app::start_quest;
pub use error::{QuestError, QuestResult};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Trace).is_err() {
        return;
    }
    let level = storage::LocalStore::open()
        .map(|store| config::Preferences::load(&store).level())
        .unwrap_or(log::Level::Info);
    log::set_max_level(level.to_level_filter());
}

// -----------------------------------------------------------------------------
// Word datasets
// -----------------------------------------------------------------------------

/// Words streamed during free sessions and as the guided fallback.
pub const HYPNAGOGIC_WORDS: &[&str] = &[
    "luz", "sueño", "idea", "fluir", "crear", "música", "arte", "escribir", "explorar",
    "descubrir", "imaginar", "sentir", "respirar", "flotar", "volar", "colores", "formas",
    "sonidos", "texturas", "memorias", "futuro", "presente", "infinito", "conexión", "armonía",
    "balance", "energía", "transformar", "evolucionar", "crecer", "expandir", "profundo", "suave",
    "brillante", "misterioso", "serenidad", "contemplar", "meditar", "visualizar", "intuición",
    "sabiduría", "claridad", "paz",
];

/// Keyword → responses for guided sessions, matched in table order.
pub const CREATIVE_RESPONSES: &[(&str, &[&str])] = &[
    ("arte", &["pincel", "lienzo", "colores", "expresión", "belleza", "forma", "creatividad", "inspiración"]),
    ("música", &["melodía", "ritmo", "armonía", "sonido", "vibración", "composición", "sinfonía", "resonancia"]),
    ("negocio", &["innovación", "oportunidad", "valor", "solución", "crecimiento", "visión", "estrategia", "liderazgo"]),
    ("escritura", &["palabras", "historia", "narrativa", "personaje", "trama", "inspiración", "prosa", "verso"]),
    ("ciencia", &["descubrimiento", "experimento", "hipótesis", "observación", "análisis", "comprensión", "teoría", "investigación"]),
    ("amor", &["conexión", "ternura", "compasión", "unión", "calidez", "abrazo", "corazón", "alma"]),
    ("naturaleza", &["bosque", "océano", "montaña", "río", "viento", "tierra", "cielo", "estrella"]),
];

/// Milliseconds since page load; 0 outside a browser.
pub(crate) fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
