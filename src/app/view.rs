//! Screen markup. Every view is a pure function from state to an HTML string;
//! the shell installs it with `innerHTML` and later patches the `hq-*` live
//! nodes in place on each tick.

use std::fmt::Write;

use crate::config::Preferences;
use crate::inception::{DREAM_LEVELS, Dive, InceptionGame, MAX_LEVEL, Phase, format_dream_time};
use crate::menu::{Action, GameMode};
use crate::recorder::{
    DreamType, RecorderState, RecorderTab, RecordingRecord, draw, format_duration,
};
use crate::session::{SessionKind, SessionState, format_session_time};
use crate::theme::Theme;
use crate::timer::{
    DURATION_MAX, DURATION_MIN, DURATION_STEP, REMINDER_MAX, REMINDER_MIN, REMINDER_STEP, Timer,
    TimerTheme, format_clock,
};

pub const ROOT_ID: &str = "hq-root";
pub const PAGE_ID: &str = "hq-page";

pub const SESSION_WORD: &str = "hq-session-word";
pub const SESSION_TIME: &str = "hq-session-time";
pub const SESSION_BITS: &str = "hq-session-bits";
pub const SESSION_DEPTH: &str = "hq-session-depth";
pub const SESSION_DEPTH_BAR: &str = "hq-session-depth-bar";
pub const SESSION_HYDRATE: &str = "hq-hydrate";
pub const SESSION_NOTE: &str = "hq-session-note";
pub const JOURNAL_ENTRY: &str = "hq-journal-entry";
pub const QUESTION_INPUT: &str = "hq-question";

pub const REC_STATUS: &str = "hq-rec-status";
pub const REC_ELAPSED: &str = "hq-rec-elapsed";
pub const REC_NOTES: &str = "hq-rec-notes";
pub const REC_TAGS: &str = "hq-rec-tags";
pub const REC_DREAM_TYPE: &str = "hq-rec-dream-type";
pub const LIVE_AMPLITUDE: &str = "hq-live-amp";
pub const LIVE_FREQUENCY: &str = "hq-live-freq";
pub const LIVE_NOISE: &str = "hq-live-noise";
pub const LIVE_CLARITY: &str = "hq-live-clarity";

pub const TIMER_CLOCK: &str = "hq-timer-clock";
pub const TIMER_PHASE: &str = "hq-timer-phase";
pub const TIMER_PROGRESS: &str = "hq-timer-progress";
pub const TIMER_REMINDERS: &str = "hq-timer-reminders";

pub const INCEPTION_WORD: &str = "hq-inception-word";
pub const INCEPTION_TIME: &str = "hq-inception-time";
pub const INCEPTION_DREAM_TIME: &str = "hq-inception-dream-time";
pub const INCEPTION_HISTORY: &str = "hq-inception-history";
pub const ANSWER_INPUT: &str = "hq-answer";

/// Value of `data-setting` on inputs that change preferences or form state.
pub mod setting {
    pub const QUESTION: &str = "session-question";
    pub const LOG_LEVEL: &str = "log-level";
    pub const TIMER_DURATION: &str = "timer-duration";
    pub const TIMER_REMINDER: &str = "timer-reminder";
    pub const TIMER_SOUND: &str = "timer-sound";
    pub const TIMER_VIBRATION: &str = "timer-vibration";
    pub const TIMER_AUTO_START: &str = "timer-auto-start";
}

/// Session seconds after which the hydration reminder shows.
pub const HYDRATE_AFTER_S: u32 = 300;

const BTN: &str = "display:block;width:100%;margin:8px 0;padding:12px 16px;border:none;\
border-radius:10px;color:#fff;font-size:16px;cursor:pointer;background:rgba(255,255,255,0.15);";
const SMALL_BTN: &str = "display:inline-block;margin:4px;padding:8px 12px;border:1px solid \
rgba(255,255,255,0.2);border-radius:8px;color:#fff;font-size:14px;cursor:pointer;\
background:rgba(255,255,255,0.1);";
const CARD: &str = "background:rgba(0,0,0,0.25);border:1px solid rgba(255,255,255,0.1);\
border-radius:14px;padding:18px;margin:12px 0;";
const FIELD: &str = "width:100%;box-sizing:border-box;padding:8px;border-radius:8px;\
border:1px solid rgba(255,255,255,0.2);background:rgba(255,255,255,0.1);color:#fff;";
const MUTED: &str = "color:rgba(255,255,255,0.7);";

pub fn hydrate_style(seconds: u32) -> String {
    let display = if seconds > HYDRATE_AFTER_S { "block" } else { "none" };
    format!("display:{display};text-align:center;{CARD}")
}

/// Escape text for element content and double-quoted attributes.
pub fn esc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `1234567` -> `1.234.567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

fn button(action: &Action, label: &str, extra: &str) -> String {
    format!(
        "<button data-action=\"{}\" style=\"{BTN}{extra}\">{label}</button>",
        esc(&action.as_attr())
    )
}

fn small_button(action: &Action, label: &str, selected: bool) -> String {
    let ring = if selected {
        "border-color:#fff;background:rgba(255,255,255,0.3);"
    } else {
        ""
    };
    format!(
        "<button data-action=\"{}\" style=\"{SMALL_BTN}{ring}\">{label}</button>",
        esc(&action.as_attr())
    )
}

fn back(to: GameMode, label: &str) -> String {
    small_button(&Action::Go(to), &format!("← {label}"), false)
}

fn card(title: &str, body: &str) -> String {
    format!("<div style=\"{CARD}\"><h2 style=\"margin:0 0 10px 0;\">{title}</h2>{body}</div>")
}

pub fn page_style(background: &str) -> String {
    format!(
        "min-height:100vh;padding:24px;box-sizing:border-box;color:#fff;\
font-family:system-ui,sans-serif;background:{background};transition:background 10s;"
    )
}

fn page(background: &str, body: &str) -> String {
    format!(
        "<div id=\"{PAGE_ID}\" style=\"{}\"><div style=\"max-width:960px;margin:0 auto;\">{body}</div></div>",
        page_style(background)
    )
}

fn themed(theme: Theme, body: &str) -> String {
    page(&theme.primary().css(), body)
}

fn progress_bar(id: &str, percent: f64, color: &str) -> String {
    format!(
        "<div style=\"height:8px;border-radius:4px;background:rgba(255,255,255,0.2);overflow:hidden;\">\
<div id=\"{id}\" style=\"{}\"></div></div>",
        bar_style(percent, color)
    )
}

pub fn bar_style(percent: f64, color: &str) -> String {
    format!(
        "height:100%;width:{:.1}%;background:{color};",
        percent.clamp(0.0, 100.0)
    )
}

// --- Menus -----------------------------------------------------------------

pub fn main_menu(theme: Theme) -> String {
    let mut body = String::from(
        "<div style=\"text-align:center;\"><h1 style=\"font-size:56px;margin:16px 0 8px;\">\
Hypnagogic Quest</h1><p style=\"font-size:20px;\">Explora los misterios de tu mente \
subconsciente</p><p style=\"opacity:0.8;\">Tu subconsciente procesa <b style=\"color:#fde047;\">\
11 millones de bits</b> por segundo</p></div>",
    );
    let experiences = [
        (GameMode::GameSelect, "Experiencia Hipnagógica", "Explora tu subconsciente"),
        (GameMode::InceptionGame, "INCEPTION Game", "Sueños dentro de sueños"),
        (GameMode::Timer, "Temporizador", "Sesiones con recordatorios"),
    ];
    let tools = [
        (GameMode::DreamRecorder, "Grabador de Sueños", "Graba y analiza tu voz"),
        (GameMode::Journal, "Diario", "Tus ideas guardadas"),
        (GameMode::Stats, "Estadísticas", "Tu progreso"),
    ];
    let more = [
        (GameMode::LearnMore, "Aprende Más", "La ciencia del estado hipnagógico"),
        (GameMode::Settings, "Configuración", "Temas y preferencias"),
    ];
    for (title, group) in [
        ("Experiencias Principales", &experiences[..]),
        ("Herramientas", &tools[..]),
        ("Información", &more[..]),
    ] {
        let mut buttons = String::new();
        for (mode, label, hint) in group {
            buttons += &button(
                &Action::Go(*mode),
                &format!("<b>{label}</b><br><small>{hint}</small>"),
                "text-align:left;",
            );
        }
        body += &card(title, &buttons);
    }
    themed(theme, &body)
}

pub fn learn_more(theme: Theme) -> String {
    let sections = [
        (
            "¿Qué es el estado hipnagógico?",
            "La transición entre la vigilia y el sueño. La mente consciente se relaja \
mientras el subconsciente sigue asociando imágenes, palabras y sonidos.",
        ),
        (
            "Neurociencia",
            "Durante la transición predominan las ondas theta. La corteza prefrontal \
reduce su control y aparecen conexiones inesperadas entre ideas.",
        ),
        (
            "Casos históricos",
            "Edison y Dalí dormitaban con un objeto en la mano para despertar justo al \
entrar en el sueño y anotar lo que veían.",
        ),
        (
            "Cómo practicar",
            "Busca una postura cómoda, respira despacio, deja pasar las palabras sin \
retenerlas y anota lo que surja al volver.",
        ),
    ];
    let mut body = back(GameMode::MainMenu, "Menú");
    for (title, text) in sections {
        body += &card(title, &format!("<p style=\"{MUTED}\">{text}</p>"));
    }
    themed(theme, &body)
}

pub fn settings(prefs: &Preferences) -> String {
    let mut themes = String::new();
    for t in Theme::ALL {
        themes += &small_button(&Action::SetTheme(t), t.name(), t == prefs.theme);
    }
    let mut levels = String::new();
    for level in ["error", "warn", "info", "debug", "trace"] {
        let selected = if prefs.log_level == level { " selected" } else { "" };
        let _ = write!(levels, "<option value=\"{level}\"{selected}>{level}</option>");
    }
    let preview = prefs
        .theme
        .gradients()
        .iter()
        .map(|g| {
            format!(
                "<span style=\"display:inline-block;width:48px;height:32px;margin:4px;\
border-radius:6px;background:{};\"></span>",
                g.css()
            )
        })
        .collect::<String>();
    let body = format!(
        "{}{}{}{}",
        back(GameMode::MainMenu, "Menú"),
        card("Tema visual", &themes),
        card("Vista previa del tema", &preview),
        card(
            "Registro en consola",
            &format!(
                "<select data-setting=\"{}\" style=\"{FIELD}\">{levels}</select>",
                setting::LOG_LEVEL
            )
        ),
    );
    themed(prefs.theme, &body)
}

pub fn game_select(theme: Theme) -> String {
    let classic = button(&Action::Go(GameMode::Intro), "Comenzar experiencia clásica", "");
    let infinite = format!(
        "{}{}",
        button(
            &Action::SessionStart(SessionKind::InfiniteGuided),
            SessionKind::InfiniteGuided.label(),
            ""
        ),
        button(
            &Action::SessionStart(SessionKind::InfiniteFree),
            SessionKind::InfiniteFree.label(),
            ""
        ),
    );
    let body = format!(
        "{}<h1>Elige tu Experiencia</h1>{}{}",
        back(GameMode::MainMenu, "Menú"),
        card("Experiencia Clásica", &classic),
        card("Modo Infinito", &infinite),
    );
    themed(theme, &body)
}

pub fn intro(theme: Theme) -> String {
    let body = format!(
        "{}{}{}",
        back(GameMode::GameSelect, "Experiencias"),
        card(
            "Experiencia Clásica",
            &format!(
                "<p style=\"{MUTED}\">Tu mente consciente procesa unos 40 bits por segundo; \
tu subconsciente, once millones. Deja que las palabras fluyan y observa qué despiertan.</p>"
            )
        ),
        button(&Action::Go(GameMode::Tutorial), "Continuar", ""),
    );
    themed(theme, &body)
}

pub fn tutorial(theme: Theme) -> String {
    let steps = [
        "Relájate y respira profundamente.",
        "Observa la palabra en el centro sin forzar ningún pensamiento.",
        "Cada diez segundos aparece una palabra nueva y la profundidad aumenta.",
        "Anota cualquier idea que surja en el diario rápido.",
    ];
    let list: String = steps.iter().map(|s| format!("<li>{s}</li>")).collect();
    let body = format!(
        "{}{}{}",
        back(GameMode::Intro, "Introducción"),
        card("Tutorial Rápido", &format!("<ol>{list}</ol>")),
        button(&Action::Go(GameMode::ModeSelect), "Elegir modo", ""),
    );
    themed(theme, &body)
}

pub fn mode_select(theme: Theme, question: &str) -> String {
    let guided = format!(
        "<p style=\"{MUTED}\">Plantea una pregunta y recibe palabras relacionadas.</p>\
<input id=\"{QUESTION_INPUT}\" data-setting=\"{}\" value=\"{}\" \
placeholder=\"¿Sobre qué quieres inspirarte? (arte, música, ciencia...)\" style=\"{FIELD}\">{}",
        setting::QUESTION,
        esc(question),
        button(&Action::SessionStart(SessionKind::Guided), "Iniciar guiado", ""),
    );
    let free = format!(
        "<p style=\"{MUTED}\">Palabras al azar, sin rumbo fijo.</p>{}",
        button(&Action::SessionStart(SessionKind::Free), "Iniciar libre", ""),
    );
    let body = format!(
        "{}<h1>Elige tu Modo</h1>{}{}{}{}",
        back(GameMode::Tutorial, "Tutorial"),
        card("Modo Guiado", &guided),
        card("Modo Libre", &free),
        small_button(&Action::Go(GameMode::Journal), "Diario", false),
        small_button(&Action::Go(GameMode::Stats), "Estadísticas", false),
    );
    themed(theme, &body)
}

// --- Session, journal, stats -------------------------------------------------

pub fn session(s: &SessionState) -> String {
    let kind = s.kind().unwrap_or(SessionKind::Free);
    let restart = if kind.is_infinite() {
        GameMode::GameSelect
    } else {
        GameMode::ModeSelect
    };
    let toggle = if s.is_active() { "⏸ Pausar" } else { "▶ Reanudar" };
    let question = if kind.is_guided() && !s.question.is_empty() {
        format!(
            "<p style=\"font-style:italic;{MUTED}\">\"{}\"</p>",
            esc(&s.question)
        )
    } else {
        String::new()
    };
    let badge = if kind.is_infinite() {
        "<p><span style=\"padding:4px 10px;border-radius:10px;background:rgba(255,255,255,0.2);\">\
∞ Modo Infinito</span></p>"
    } else {
        ""
    };
    let hydrate = hydrate_style(s.time());
    let body = format!(
        "<div style=\"display:flex;justify-content:space-between;align-items:center;\">\
<div><p>Tiempo: <span id=\"{SESSION_TIME}\">{}</span></p>\
<p>Bits: <span id=\"{SESSION_BITS}\">{}</span></p></div>\
<div>{}{}{}</div></div>\
<div style=\"display:flex;justify-content:space-between;{MUTED}\"><span>Profundidad Hipnagógica</span>\
<span id=\"{SESSION_DEPTH}\">{}%</span></div>{}\
<div style=\"display:grid;grid-template-columns:1fr 1fr;gap:12px;text-align:center;margin-top:12px;\">\
<div style=\"{CARD}\"><small style=\"color:#93c5fd;\">Mente Consciente</small><br><b>40-50 bits/seg</b></div>\
<div style=\"{CARD}\"><small style=\"color:#fde047;\">Subconsciente</small><br><b>11M bits/seg</b></div></div>\
<div style=\"text-align:center;margin:48px 0;\"><h1 id=\"{SESSION_WORD}\" \
style=\"font-size:88px;font-weight:300;margin:0;\">{}</h1>{question}{badge}</div>\
<div style=\"max-width:420px;margin:0 auto;{CARD}\"><textarea id=\"{SESSION_NOTE}\" rows=\"2\" \
placeholder=\"Anota una idea rápida...\" style=\"{FIELD}\"></textarea>{}</div>\
<div id=\"{SESSION_HYDRATE}\" style=\"{hydrate}\">\
💧 ¡Recuerda hidratarte y seguir explorando!</div>",
        format_session_time(s.time()),
        group_thousands(s.bits()),
        small_button(&Action::SessionToggle, toggle, false),
        small_button(&Action::Go(restart), "↺", false),
        small_button(&Action::Go(GameMode::MainMenu), "⌂", false),
        s.depth(),
        progress_bar(SESSION_DEPTH_BAR, s.depth() as f64, "#fff"),
        esc(s.current_word()),
        button(&Action::SessionSaveJournal, "Guardar Idea", ""),
    );
    page(&s.gradient().css(), &body)
}

pub fn journal(s: &SessionState) -> String {
    let entries = if s.journal().is_empty() {
        format!("<p style=\"{MUTED}\">Aún no hay ideas guardadas.</p>")
    } else {
        s.journal()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                format!(
                    "<div style=\"{CARD}\"><small style=\"{MUTED}\">Idea #{}</small><p>{}</p></div>",
                    i + 1,
                    esc(e)
                )
            })
            .collect()
    };
    let body = format!(
        "{}{}{}{}",
        back(GameMode::MainMenu, "Menú"),
        small_button(&Action::Go(GameMode::Stats), "Estadísticas", false),
        card(
            "Diario de Ideas",
            &format!(
                "<textarea id=\"{JOURNAL_ENTRY}\" rows=\"3\" placeholder=\"Escribe una idea...\" \
style=\"{FIELD}\"></textarea>{}{entries}",
                button(&Action::SessionSaveJournal, "Guardar", "")
            )
        ),
        button(&Action::Go(GameMode::GameSelect), "Nueva sesión", ""),
    );
    themed(s.theme(), &body)
}

pub fn stats(s: &SessionState) -> String {
    let words = if s.discoveries().is_empty() {
        format!("<p style=\"{MUTED}\">Completa una sesión para descubrir palabras.</p>")
    } else {
        s.discoveries()
            .iter()
            .map(|w| {
                format!(
                    "<span style=\"display:inline-block;margin:3px;padding:4px 10px;border-radius:10px;\
background:rgba(255,255,255,0.2);\">{}</span>",
                    esc(w)
                )
            })
            .collect()
    };
    let body = format!(
        "{}{}\
<div style=\"display:grid;grid-template-columns:repeat(3,1fr);gap:12px;text-align:center;\">\
<div style=\"{CARD}\"><small style=\"color:#d8b4fe;\">Total de Bits Procesados</small><h2>{}</h2></div>\
<div style=\"{CARD}\"><small style=\"color:#93c5fd;\">Tiempo Total</small><h2>{}</h2></div>\
<div style=\"{CARD}\"><small style=\"color:#86efac;\">Ideas Guardadas</small><h2>{}</h2></div></div>\
{}{}{}",
        back(GameMode::MainMenu, "Menú"),
        small_button(&Action::Go(GameMode::Journal), "Diario", false),
        group_thousands(s.bits()),
        format_session_time(s.time()),
        s.journal().len(),
        card("Palabras Descubiertas", &words),
        card(
            "Progreso de Exploración",
            &format!(
                "<p>{}% de profundidad</p>{}",
                s.depth(),
                progress_bar("hq-stats-depth", s.depth() as f64, "#a855f7")
            )
        ),
        button(&Action::Go(GameMode::GameSelect), "Nueva sesión", ""),
    );
    themed(s.theme(), &body)
}

// --- Dream recorder ------------------------------------------------------------

pub struct RecorderView<'a> {
    pub theme: Theme,
    pub state: &'a RecorderState,
    pub records: &'a [RecordingRecord],
    /// Ids whose audio blob is still held in memory.
    pub playable: &'a [String],
}

pub fn recorder(v: &RecorderView<'_>) -> String {
    let st = v.state;
    let mut tabs = String::new();
    for t in RecorderTab::ALL {
        tabs += &small_button(&Action::RecorderTab(t), t.label(), t == st.tab);
    }
    let status = format!(
        "<p id=\"{REC_STATUS}\" style=\"color:{};\">{}</p>",
        st.status.color(),
        st.status.message()
    );
    let content = match st.tab {
        RecorderTab::Record => record_tab(v),
        RecorderTab::Live => live_tab(st),
        RecorderTab::Journal => journal_tab(v),
    };
    let body = format!(
        "{}<h1>Grabador de Sueños</h1>{status}<div>{tabs}</div>{content}",
        back(GameMode::MainMenu, "Menú"),
    );
    themed(v.theme, &body)
}

fn record_tab(v: &RecorderView<'_>) -> String {
    let st = v.state;
    let mut out = String::new();
    let controls = if st.is_recording() {
        format!(
            "<p style=\"font-size:48px;text-align:center;margin:8px;\" id=\"{REC_ELAPSED}\">{}</p>{}",
            format_duration(st.elapsed()),
            button(&Action::RecorderStop, "⏹ Detener", "background:#dc2626;")
        )
    } else {
        format!(
            "{}{}",
            button(&Action::RecorderStart, "⏺ Iniciar grabación", "background:#7c3aed;"),
            small_button(&Action::RecorderTestMic, "Probar micrófono", false)
        )
    };
    out += &card("Grabación", &controls);

    if let (false, Some(draft)) = (st.is_recording(), st.draft()) {
        let types: String = DreamType::ALL
            .iter()
            .map(|t| format!("<option value=\"{}\">{}</option>", t.as_attr(), t.label()))
            .collect();
        let form = format!(
            "<p style=\"{MUTED}\">Duración {} · amplitud media {:.3} · silencio {:.0}%</p>\
<textarea id=\"{REC_NOTES}\" rows=\"3\" placeholder=\"¿Qué soñaste?\" style=\"{FIELD}\"></textarea>\
<select id=\"{REC_DREAM_TYPE}\" style=\"{FIELD}\">{types}</select>\
<input id=\"{REC_TAGS}\" placeholder=\"Etiquetas separadas por comas\" style=\"{FIELD}\">{}{}",
            format_duration(draft.duration),
            draft.average_amplitude,
            draft.silence_percentage,
            button(&Action::RecorderSave, "Guardar en el diario", "background:#059669;"),
            small_button(&Action::RecorderDiscard, "Descartar", false),
        );
        out += &card("Nueva grabación", &form);
    }
    out
}

fn live_tab(st: &RecorderState) -> String {
    let latest = st.session().and_then(|s| s.latest());
    let metric = |id: &str, label: &str, value: String| {
        format!(
            "<div style=\"{CARD}text-align:center;\"><small style=\"{MUTED}\">{label}</small>\
<h3 id=\"{id}\" style=\"margin:4px 0;\">{value}</h3></div>"
        )
    };
    let (amp, freq, noise, clarity) = latest.map_or(
        ("-".to_string(), "-".to_string(), "-".to_string(), "-".to_string()),
        |f| live_metrics(f.amplitude, f.dominant_freq, f.noise_level, f.clarity),
    );
    let toggles = format!(
        "{}{}",
        small_button(&Action::RecorderToggleGraphs, "Gráficos", st.show_graphs),
        small_button(&Action::RecorderToggleAdvanced, "Avanzado", st.advanced),
    );
    let mut out = card(
        "Tiempo Real",
        &format!(
            "{toggles}<div style=\"display:grid;grid-template-columns:repeat(4,1fr);gap:8px;\">{}{}{}{}</div>",
            metric(LIVE_AMPLITUDE, "Amplitud", amp),
            metric(LIVE_FREQUENCY, "Frecuencia dominante", freq),
            metric(LIVE_NOISE, "Ruido", noise),
            metric(LIVE_CLARITY, "Claridad", clarity),
        ),
    );
    if st.show_graphs {
        let canvas = |id: &str, h: u32| {
            format!(
                "<canvas id=\"{id}\" width=\"800\" height=\"{h}\" \
style=\"width:100%;border-radius:8px;background:#000;margin:6px 0;\"></canvas>"
            )
        };
        let mut graphs = canvas(draw::WAVEFORM_CANVAS, 160);
        graphs += &canvas(draw::SPECTRUM_CANVAS, 160);
        if st.advanced {
            graphs += &canvas(draw::NOISE_CANVAS, 120);
        }
        out += &card("Señal", &graphs);
    }
    if !st.is_recording() {
        out += &format!("<p style=\"{MUTED}\">Inicia una grabación para ver la señal.</p>");
    }
    out
}

/// Formatted (amplitude, dominant frequency, noise, clarity) for the live cards.
pub fn live_metrics(amplitude: f64, freq: f64, noise: f64, clarity: f64) -> (String, String, String, String) {
    (
        format!("{:.1}%", amplitude * 100.0),
        format!("{freq:.0} Hz"),
        format!("{:.1}%", noise * 100.0),
        format!("{:.1}%", clarity * 100.0),
    )
}

fn journal_tab(v: &RecorderView<'_>) -> String {
    if v.records.is_empty() {
        return card(
            "Análisis",
            &format!("<p style=\"{MUTED}\">No hay grabaciones guardadas.</p>"),
        );
    }
    let mut out = String::new();
    for r in v.records.iter().rev() {
        let tags: String = r
            .tags
            .iter()
            .map(|t| format!("<span style=\"{SMALL_BTN}cursor:default;\">#{}</span>", esc(t)))
            .collect();
        let download = if v.playable.iter().any(|id| id == &r.id) {
            small_button(&Action::RecorderDownload(r.id.clone()), "Descargar", false)
        } else {
            format!("<small style=\"{MUTED}\">Audio no disponible en esta sesión</small>")
        };
        let body = format!(
            "<p style=\"{MUTED}\">{} · {} · {}</p>\
<p>Amplitud media {:.3} · máxima {:.3} · silencio {:.0}% · {} eventos de ruido</p>\
<p>{}</p><div>{tags}</div>{download}{}",
            esc(&r.date),
            format_duration(r.duration),
            r.dream_type.label(),
            r.average_amplitude,
            r.max_amplitude,
            r.silence_percentage,
            r.noise_points.len(),
            esc(&r.notes),
            small_button(&Action::RecorderDelete(r.id.clone()), "Eliminar", false),
        );
        out += &card("Sueño", &body);
    }
    out
}

// --- Timer -------------------------------------------------------------------

pub fn timer(t: &Timer) -> String {
    let s = t.settings();
    let mut themes = String::new();
    for th in TimerTheme::ALL {
        themes += &small_button(&Action::TimerTheme(th), th.name(), th == s.theme);
    }
    let primary = if !t.is_active() {
        "▶ Iniciar"
    } else if t.is_paused() {
        "▶ Continuar"
    } else {
        "⏸ Pausar"
    };
    let check = |name: &str, label: &str, on: bool| {
        let checked = if on { " checked" } else { "" };
        format!("<label style=\"display:block;margin:6px 0;\"><input type=\"checkbox\" data-setting=\"{name}\"{checked}> {label}</label>")
    };
    let range = |name: &str, label: String, min: u32, max: u32, step: u32, value: u32| {
        format!(
            "<label style=\"display:block;margin:6px 0;\">{label}<input type=\"range\" \
data-setting=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" \
style=\"width:100%;\"></label>"
        )
    };
    let settings = format!(
        "{}{}{}{}{}",
        range(
            setting::TIMER_DURATION,
            format!("Duración: {} min", s.duration / 60),
            DURATION_MIN,
            DURATION_MAX,
            DURATION_STEP,
            s.duration
        ),
        range(
            setting::TIMER_REMINDER,
            format!("Recordatorio cada {} s", s.reminder_interval),
            REMINDER_MIN,
            REMINDER_MAX,
            REMINDER_STEP,
            s.reminder_interval
        ),
        check(setting::TIMER_SOUND, "Sonido", s.sound_enabled),
        check(setting::TIMER_VIBRATION, "Vibración", s.vibration_enabled),
        check(setting::TIMER_AUTO_START, "Inicio automático", s.auto_start),
    );
    let phase = t.phase();
    let body = format!(
        "{}<h1>Temporizador Hipnagógico</h1>\
<div style=\"{CARD}text-align:center;\">\
<p id=\"{TIMER_PHASE}\" style=\"color:{};\">{}</p>\
<p id=\"{TIMER_CLOCK}\" style=\"font-size:72px;margin:8px 0;font-variant-numeric:tabular-nums;\">{}</p>\
{}<p style=\"{MUTED}\">Recordatorios: <span id=\"{TIMER_REMINDERS}\">{}</span></p>\
<div>{}{}{}</div></div>{}{}",
        back(GameMode::MainMenu, "Menú"),
        phase.color(),
        phase.label(),
        format_clock(t.remaining()),
        progress_bar(TIMER_PROGRESS, t.progress(), phase.color()),
        t.reminder_count(),
        small_button(&Action::TimerToggle, primary, false),
        small_button(&Action::TimerStop, "⏹ Detener", false),
        small_button(&Action::TimerReset, "↺ Reiniciar", false),
        card(
            "Tema",
            &format!("{themes}<p style=\"{MUTED}\">{}</p>", s.theme.description())
        ),
        card("Configuración", &settings),
    );
    page(&s.theme.accent().css(), &body)
}

// --- Inception -------------------------------------------------------------------

pub fn inception(g: &InceptionGame, feedback: Option<bool>) -> String {
    let dream = g.dream();
    let header = format!(
        "<div style=\"display:flex;justify-content:space-between;align-items:center;\">{}\
<span style=\"padding:4px 10px;border-radius:10px;background:rgba(255,255,255,0.2);\">\
Nivel {}: {}</span></div>",
        back(GameMode::MainMenu, "Menú"),
        dream.level,
        dream.name
    );
    let content = match g.phase() {
        Phase::Intro => inception_intro(),
        Phase::Transition(dive) => {
            let title = match dive {
                Dive::Sinking => "Descendiendo...",
                Dive::Waking => "¡KICK! Despertando...",
            };
            card(
                title,
                &format!(
                    "<p>Entrando en: {}</p><p style=\"{MUTED}\">{}</p>",
                    dream.name, dream.description
                ),
            )
        }
        Phase::Playing | Phase::Limbo => inception_board(g, feedback),
    };
    page(&dream.accent.css(), &format!("{header}{content}"))
}

fn inception_intro() -> String {
    let levels: String = DREAM_LEVELS
        .iter()
        .map(|l| format!("<p>{}: {} ({}x tiempo)</p>", l.level, l.name, l.time_multiplier))
        .collect();
    card(
        "INCEPTION",
        &format!(
            "<p>Desciende por niveles de sueño donde las palabras se distorsionan y el tiempo se dilata.</p>\
<div style=\"display:grid;grid-template-columns:1fr 1fr;gap:12px;\">\
<div style=\"{CARD}\"><h3>Controles</h3><p>• Escribe la palabra que ves</p>\
<p>• ↓ Ir más profundo en el sueño</p><p>• ↑ Despertar (kick)</p>\
<p>• El tiempo se dilata en cada nivel</p></div>\
<div style=\"{CARD}\"><h3>Niveles</h3>{levels}</div></div>{}",
            button(&Action::InceptionStart, "Entrar al sueño", "background:#9333ea;")
        ),
    )
}

fn inception_board(g: &InceptionGame, feedback: Option<bool>) -> String {
    let dream = g.dream();
    let stat = |label: &str, id: Option<&str>, value: String| {
        let id = id.map(|i| format!(" id=\"{i}\"")).unwrap_or_default();
        format!("<div><small style=\"{MUTED}\">{label}</small><h3{id} style=\"margin:4px 0;\">{value}</h3></div>")
    };
    let stats = format!(
        "<div style=\"{CARD}display:grid;grid-template-columns:repeat(4,1fr);text-align:center;\">{}{}{}{}</div>",
        stat("Puntuación", None, group_thousands(g.score())),
        stat("Tiempo Real", Some(INCEPTION_TIME), format!("{}s", g.time_in_level())),
        stat(
            "Tiempo Sueño",
            Some(INCEPTION_DREAM_TIME),
            format_dream_time(g.time_in_level(), g.level())
        ),
        stat("Kicks", None, g.kicks().to_string()),
    );
    let tilt = if g.level() >= 2 { "transform:rotate(1deg);" } else { "" };
    let effects: String = dream
        .effects
        .iter()
        .map(|e| format!("<span style=\"{SMALL_BTN}cursor:default;\">{e}</span>"))
        .collect();
    let limbo = if g.phase() == Phase::Limbo {
        "<p style=\"color:#f9a8d4;\">Estás en el Limbo. Solo un kick te devolverá arriba.</p>"
    } else {
        ""
    };
    let word = format!(
        "<div style=\"{CARD}text-align:center;\"><h1 id=\"{INCEPTION_WORD}\" \
style=\"font-size:64px;margin:16px 0;{tilt}\">{}</h1><p style=\"{MUTED}\">{}</p>{limbo}<div>{effects}</div></div>",
        esc(g.current_word()),
        dream.description,
    );
    let verdict = match feedback {
        Some(true) => "<p style=\"color:#86efac;\">¡Correcto!</p>",
        Some(false) => "<p style=\"color:#fca5a5;\">Inténtalo de nuevo</p>",
        None => "",
    };
    let history = history_chips(g.history());
    let controls = format!(
        "<div style=\"display:flex;gap:8px;\"><input id=\"{ANSWER_INPUT}\" \
placeholder=\"Escribe la palabra que ves...\" style=\"{FIELD}\">{}</div>{verdict}\
<div style=\"text-align:center;\">{}{}{}{}</div>\
<p style=\"{MUTED}\">Historial de Palabras:</p><div id=\"{INCEPTION_HISTORY}\">{history}</div>",
        small_button(&Action::InceptionSubmit, "✓", false),
        if g.level() < MAX_LEVEL {
            small_button(&Action::InceptionDeeper, "↓ Más profundo", false)
        } else {
            String::new()
        },
        if g.level() > 0 {
            small_button(&Action::InceptionKick, "↑ Kick", false)
        } else {
            String::new()
        },
        small_button(&Action::InceptionStop, "⏸ Salir", false),
        small_button(&Action::InceptionReset, "↺ Reiniciar", false),
    );
    let depth: String = DREAM_LEVELS
        .iter()
        .map(|l| {
            let here = if l.level == g.level() { "background:#fff;color:#000;" } else { "" };
            format!(
                "<span style=\"display:inline-block;width:28px;margin:2px;border-radius:6px;\
text-align:center;border:1px solid rgba(255,255,255,0.3);{here}\">{}</span>",
                l.level
            )
        })
        .collect();
    format!(
        "{stats}{word}<div style=\"{CARD}\">{controls}</div>\
<div style=\"{CARD}\"><small style=\"{MUTED}\">Profundidad máxima {} · niveles</small><div>{depth}</div></div>",
        g.max_depth()
    )
}

pub fn history_chips(words: &[String]) -> String {
    words
        .iter()
        .map(|w| {
            format!(
                "<span style=\"display:inline-block;margin:2px;padding:2px 8px;border-radius:8px;\
background:rgba(255,255,255,0.2);\">{}</span>",
                esc(w)
            )
        })
        .collect()
}

/// Markup for the active view.
pub struct Screen<'a> {
    pub mode: GameMode,
    pub prefs: &'a Preferences,
    pub session: &'a SessionState,
    pub recorder: RecorderView<'a>,
    pub timer: &'a Timer,
    pub inception: &'a InceptionGame,
    pub inception_feedback: Option<bool>,
}

pub fn render(s: &Screen<'_>) -> String {
    let theme = s.prefs.theme;
    match s.mode {
        GameMode::MainMenu => main_menu(theme),
        GameMode::LearnMore => learn_more(theme),
        GameMode::Settings => settings(s.prefs),
        GameMode::GameSelect => game_select(theme),
        GameMode::Intro => intro(theme),
        GameMode::Tutorial => tutorial(theme),
        GameMode::ModeSelect => mode_select(theme, &s.session.question),
        GameMode::Session(_) => session(s.session),
        GameMode::Journal => journal(s.session),
        GameMode::Stats => stats(s.session),
        GameMode::DreamRecorder => recorder(&s.recorder),
        GameMode::Timer => timer(s.timer),
        GameMode::InceptionGame => inception(s.inception, s.inception_feedback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;
    use crate::timer::TimerSettings;

    fn actions_in(html: &str) -> Vec<Action> {
        html.split("data-action=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(|raw| Action::parse(raw).unwrap_or_else(|| panic!("unparseable action {raw}")))
            .collect()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(esc("<b>\"hola\" & 'adiós'</b>"), "&lt;b&gt;&quot;hola&quot; &amp; &#39;adiós&#39;&lt;/b&gt;");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(40), "40");
        assert_eq!(group_thousands(1_000), "1.000");
        assert_eq!(group_thousands(12_345_678), "12.345.678");
    }

    #[test]
    fn main_menu_links_every_top_level_view() {
        let acts = actions_in(&main_menu(Theme::Cosmic));
        for mode in [
            GameMode::GameSelect,
            GameMode::InceptionGame,
            GameMode::Timer,
            GameMode::DreamRecorder,
            GameMode::Journal,
            GameMode::Stats,
            GameMode::LearnMore,
            GameMode::Settings,
        ] {
            assert!(acts.contains(&Action::Go(mode)), "missing {mode:?}");
        }
    }

    #[test]
    fn every_rendered_action_parses() {
        let prefs = Preferences::default();
        let mut rng = Rng::seeded(1);
        let mut session = SessionState::new(Theme::Cosmic);
        session.start(SessionKind::InfiniteGuided, &mut rng);
        let recorder = RecorderState::default();
        let timer = Timer::new(TimerSettings::default());
        let mut game = InceptionGame::new();
        game.start(&mut rng);
        let modes = [
            GameMode::MainMenu,
            GameMode::LearnMore,
            GameMode::Settings,
            GameMode::GameSelect,
            GameMode::Intro,
            GameMode::Tutorial,
            GameMode::ModeSelect,
            GameMode::Session(SessionKind::InfiniteGuided),
            GameMode::Journal,
            GameMode::Stats,
            GameMode::DreamRecorder,
            GameMode::Timer,
            GameMode::InceptionGame,
        ];
        for mode in modes {
            let screen = Screen {
                mode,
                prefs: &prefs,
                session: &session,
                recorder: RecorderView {
                    theme: prefs.theme,
                    state: &recorder,
                    records: &[],
                    playable: &[],
                },
                timer: &timer,
                inception: &game,
                inception_feedback: None,
            };
            let html = render(&screen);
            assert!(html.contains(PAGE_ID));
            actions_in(&html);
        }
    }

    #[test]
    fn session_view_escapes_question_and_shows_live_nodes() {
        let mut rng = Rng::seeded(2);
        let mut s = SessionState::new(Theme::Ocean);
        s.question = "<script>arte</script>".into();
        s.start(SessionKind::Guided, &mut rng);
        let html = session(&s);
        assert!(!html.contains("<script>"));
        for id in [SESSION_WORD, SESSION_TIME, SESSION_BITS, SESSION_DEPTH, SESSION_NOTE] {
            assert!(html.contains(id));
        }
        assert!(html.contains("display:none"));
    }

    #[test]
    fn recorder_offers_download_only_for_held_audio() {
        let prefs = Preferences::default();
        let mut state = RecorderState::default();
        state.tab = RecorderTab::Journal;
        let records = vec![
            RecordingRecord::empty("a".into(), "2025-01-01T00:00:00Z".into()),
            RecordingRecord::empty("b".into(), "2025-01-02T00:00:00Z".into()),
        ];
        let playable = vec!["b".to_string()];
        let html = recorder(&RecorderView {
            theme: prefs.theme,
            state: &state,
            records: &records,
            playable: &playable,
        });
        let acts = actions_in(&html);
        assert!(acts.contains(&Action::RecorderDownload("b".into())));
        assert!(!acts.contains(&Action::RecorderDownload("a".into())));
        assert!(acts.contains(&Action::RecorderDelete("a".into())));
    }

    #[test]
    fn inception_controls_follow_depth() {
        let mut rng = Rng::seeded(3);
        let mut g = InceptionGame::new();
        assert!(actions_in(&inception(&g, None)).contains(&Action::InceptionStart));
        g.start(&mut rng);
        let acts = actions_in(&inception(&g, Some(true)));
        assert!(acts.contains(&Action::InceptionDeeper));
        assert!(!acts.contains(&Action::InceptionKick));
        for _ in 0..4 {
            g.go_deeper(&mut rng);
            g.finish_transition();
        }
        let html = inception(&g, None);
        let acts = actions_in(&html);
        assert!(!acts.contains(&Action::InceptionDeeper));
        assert!(acts.contains(&Action::InceptionKick));
        assert!(html.contains("Limbo"));
    }

    #[test]
    fn timer_button_label_tracks_state() {
        let mut t = Timer::new(TimerSettings::default());
        assert!(timer(&t).contains("Iniciar"));
        t.start();
        assert!(timer(&t).contains("Pausar"));
        t.toggle_pause();
        assert!(timer(&t).contains("Continuar"));
        assert!(timer(&t).contains("05:00"));
    }

    #[test]
    fn bar_width_is_clamped() {
        assert_eq!(bar_style(140.0, "#fff"), "height:100%;width:100.0%;background:#fff;");
        assert_eq!(bar_style(-3.0, "#fff"), "height:100%;width:0.0%;background:#fff;");
    }
}
