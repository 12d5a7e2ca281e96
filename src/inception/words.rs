// Word pool for the inception game and the per-word dream substitutions.

pub const START_WORD: &str = "realidad";

pub static BASE_WORDS: [&str; 40] = [
    "realidad", "tiempo", "espacio", "memoria", "identidad", "verdad", "ilusión", "percepción",
    "conciencia", "subconsciente", "despertar", "dormir", "soñar", "existir", "pensar", "sentir",
    "crear", "destruir", "construir", "imaginar", "recordar", "olvidar", "conocer", "ignorar",
    "luz", "sombra", "color", "forma", "sonido", "silencio", "movimiento", "quietud",
    "amor", "miedo", "esperanza", "desesperación", "alegría", "tristeza", "paz", "caos",
];

pub static WORD_TRANSFORMATIONS: [(&str, [&str; 5]); 8] = [
    ("realidad", ["ilusión", "espejismo", "ficción", "simulacro", "fantasía"]),
    ("tiempo", ["eternidad", "instante", "bucle", "fragmento", "eco"]),
    ("memoria", ["olvido", "nostalgia", "fantasma", "huella", "reflejo"]),
    ("despertar", ["hundirse", "flotar", "disolverse", "fragmentarse", "multiplicarse"]),
    ("verdad", ["mentira", "misterio", "enigma", "paradoja", "contradicción"]),
    ("luz", ["penumbra", "destello", "brillo", "resplandor", "fulgor"]),
    ("amor", ["anhelo", "vacío", "eco", "susurro", "latido"]),
    ("miedo", ["vértigo", "abismo", "laberinto", "espiral", "caída"]),
];

pub fn transformations_of(word: &str) -> Option<&'static [&'static str; 5]> {
    WORD_TRANSFORMATIONS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, t)| t)
}
