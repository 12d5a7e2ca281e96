//! View routing and the click actions wired into the markup.
//!
//! Every button carries a `data-action` attribute; [`Action::parse`] turns it
//! back into a typed action for the shell to dispatch.

use crate::recorder::RecorderTab;
use crate::session::SessionKind;
use crate::theme::Theme;
use crate::timer::TimerTheme;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GameMode {
    #[default]
    MainMenu,
    LearnMore,
    Settings,
    GameSelect,
    Intro,
    Tutorial,
    ModeSelect,
    Session(SessionKind),
    Journal,
    Stats,
    DreamRecorder,
    Timer,
    InceptionGame,
}

impl GameMode {
    const SIMPLE: [GameMode; 12] = [
        GameMode::MainMenu,
        GameMode::LearnMore,
        GameMode::Settings,
        GameMode::GameSelect,
        GameMode::Intro,
        GameMode::Tutorial,
        GameMode::ModeSelect,
        GameMode::Journal,
        GameMode::Stats,
        GameMode::DreamRecorder,
        GameMode::Timer,
        GameMode::InceptionGame,
    ];

    pub fn as_attr(self) -> &'static str {
        match self {
            GameMode::MainMenu => "main-menu",
            GameMode::LearnMore => "learn-more",
            GameMode::Settings => "settings",
            GameMode::GameSelect => "game-select",
            GameMode::Intro => "intro",
            GameMode::Tutorial => "tutorial",
            GameMode::ModeSelect => "mode-select",
            GameMode::Session(kind) => kind.as_attr(),
            GameMode::Journal => "journal",
            GameMode::Stats => "stats",
            GameMode::DreamRecorder => "dream-recorder",
            GameMode::Timer => "timer",
            GameMode::InceptionGame => "inception-game",
        }
    }

    pub fn from_attr(s: &str) -> Option<GameMode> {
        Self::SIMPLE
            .into_iter()
            .find(|m| m.as_attr() == s)
            .or_else(|| SessionKind::from_attr(s).map(GameMode::Session))
    }

    pub fn is_session(self) -> bool {
        matches!(self, GameMode::Session(_))
    }
}

/// Holds the one view currently on screen.
#[derive(Debug, Default)]
pub struct Router {
    mode: GameMode,
}

impl Router {
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Switch views, returning the one being left.
    pub fn go(&mut self, mode: GameMode) -> GameMode {
        let prev = self.mode;
        self.mode = mode;
        if prev != mode {
            log::debug!("view {} -> {}", prev.as_attr(), mode.as_attr());
        }
        prev
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Go(GameMode),
    SetTheme(Theme),

    SessionStart(SessionKind),
    SessionToggle,
    SessionSaveJournal,

    RecorderTestMic,
    RecorderStart,
    RecorderStop,
    RecorderSave,
    RecorderDiscard,
    RecorderTab(RecorderTab),
    RecorderToggleGraphs,
    RecorderToggleAdvanced,
    RecorderDownload(String),
    RecorderDelete(String),

    TimerToggle,
    TimerStop,
    TimerReset,
    TimerTheme(TimerTheme),

    InceptionStart,
    InceptionDeeper,
    InceptionKick,
    InceptionSubmit,
    InceptionStop,
    InceptionReset,
}

impl Action {
    pub fn parse(s: &str) -> Option<Action> {
        let (head, rest) = s.split_once(':')?;
        let (verb, arg) = match rest.split_once(':') {
            Some((v, a)) => (v, Some(a)),
            None => (rest, None),
        };
        let action = match (head, verb, arg) {
            ("go", mode, None) => Action::Go(GameMode::from_attr(mode)?),
            ("theme", t, None) => Action::SetTheme(Theme::from_attr(t)?),
            ("session", "start", Some(k)) => Action::SessionStart(SessionKind::from_attr(k)?),
            ("session", "toggle", None) => Action::SessionToggle,
            ("session", "journal", None) => Action::SessionSaveJournal,
            ("recorder", "test", None) => Action::RecorderTestMic,
            ("recorder", "start", None) => Action::RecorderStart,
            ("recorder", "stop", None) => Action::RecorderStop,
            ("recorder", "save", None) => Action::RecorderSave,
            ("recorder", "discard", None) => Action::RecorderDiscard,
            ("recorder", "tab", Some(t)) => Action::RecorderTab(RecorderTab::from_attr(t)?),
            ("recorder", "graphs", None) => Action::RecorderToggleGraphs,
            ("recorder", "advanced", None) => Action::RecorderToggleAdvanced,
            ("recorder", "download", Some(id)) if !id.is_empty() => {
                Action::RecorderDownload(id.to_string())
            }
            ("recorder", "delete", Some(id)) if !id.is_empty() => {
                Action::RecorderDelete(id.to_string())
            }
            ("timer", "toggle", None) => Action::TimerToggle,
            ("timer", "stop", None) => Action::TimerStop,
            ("timer", "reset", None) => Action::TimerReset,
            ("timer", "theme", Some(t)) => Action::TimerTheme(TimerTheme::from_attr(t)?),
            ("inception", "start", None) => Action::InceptionStart,
            ("inception", "deeper", None) => Action::InceptionDeeper,
            ("inception", "kick", None) => Action::InceptionKick,
            ("inception", "submit", None) => Action::InceptionSubmit,
            ("inception", "stop", None) => Action::InceptionStop,
            ("inception", "reset", None) => Action::InceptionReset,
            _ => return None,
        };
        Some(action)
    }

    pub fn as_attr(&self) -> String {
        match self {
            Action::Go(mode) => format!("go:{}", mode.as_attr()),
            Action::SetTheme(t) => format!("theme:{}", t.as_attr()),
            Action::SessionStart(k) => format!("session:start:{}", k.as_attr()),
            Action::SessionToggle => "session:toggle".into(),
            Action::SessionSaveJournal => "session:journal".into(),
            Action::RecorderTestMic => "recorder:test".into(),
            Action::RecorderStart => "recorder:start".into(),
            Action::RecorderStop => "recorder:stop".into(),
            Action::RecorderSave => "recorder:save".into(),
            Action::RecorderDiscard => "recorder:discard".into(),
            Action::RecorderTab(t) => format!("recorder:tab:{}", t.as_attr()),
            Action::RecorderToggleGraphs => "recorder:graphs".into(),
            Action::RecorderToggleAdvanced => "recorder:advanced".into(),
            Action::RecorderDownload(id) => format!("recorder:download:{id}"),
            Action::RecorderDelete(id) => format!("recorder:delete:{id}"),
            Action::TimerToggle => "timer:toggle".into(),
            Action::TimerStop => "timer:stop".into(),
            Action::TimerReset => "timer:reset".into(),
            Action::TimerTheme(t) => format!("timer:theme:{}", t.as_attr()),
            Action::InceptionStart => "inception:start".into(),
            Action::InceptionDeeper => "inception:deeper".into(),
            Action::InceptionKick => "inception:kick".into(),
            Action::InceptionSubmit => "inception:submit".into(),
            Action::InceptionStop => "inception:stop".into(),
            Action::InceptionReset => "inception:reset".into(),
        }
    }
}
