//! Browser shell: global state, event delegation and the interval timers that
//! drive the active view.
//!
//! All clicks land on one document listener that reads `data-action`; inputs
//! carrying `data-setting` report through a single `change` listener. Views
//! are re-rendered wholesale on actions, while per-second ticks only patch the
//! live text nodes so typed input survives.

mod dom;
pub mod view;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, Document, Element, Event, EventTarget, HtmlInputElement, KeyboardEvent};

use crate::config::{Preferences, parse_level};
use crate::error::{QuestError, QuestResult};
use crate::inception::{InceptionGame, format_dream_time};
use crate::menu::{Action, GameMode, Router};
use crate::recorder::capture::{self, Capture};
use crate::recorder::{
    DreamType, MicrophoneStatus, RecorderState, RecorderTab, draw, export_file_name,
    format_duration, tags_from_input,
};
use crate::rng::Rng;
use crate::session::{SessionState, WORD_TICK_MS, format_session_time};
use crate::storage::{JournalStore, LocalStore};
use crate::timer::sound::CuePlayer;
use crate::timer::{AUTO_START_DELAY_MS, Cue, Timer, TimerPhase, format_clock};
use dom::Ticker;

const SECOND_MS: i32 = 1000;
const MICROPHONE_DENIED: &str =
    "No se pudo acceder al micrófono. Verifica los permisos del navegador.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Tick {
    SessionSecond,
    SessionWord,
    TimerSecond,
    TimerAutoStart,
    InceptionSecond,
    InceptionWord,
    InceptionTransition,
    RecorderSecond,
}

/// Audio blobs of this page session, keyed by recording id. Shared with the
/// recorder's `onstop` callback, which fires outside any state borrow.
type SharedBlobs = Rc<RefCell<HashMap<String, Blob>>>;

struct AppState {
    router: Router,
    prefs: Preferences,
    prefs_store: LocalStore,
    journal: JournalStore<LocalStore>,
    rng: Rng,
    session: SessionState,
    recorder: RecorderState,
    capture: Option<Capture>,
    blobs: SharedBlobs,
    timer: Timer,
    cues: CuePlayer,
    inception: InceptionGame,
    inception_feedback: Option<bool>,
    tickers: HashMap<Tick, Ticker>,
}

thread_local! {
    static STATE: RefCell<Option<AppState>> = RefCell::new(None);
}

fn with_state<R>(f: impl FnOnce(&mut AppState) -> R) -> Option<R> {
    STATE.with(|cell| {
        let Ok(mut guard) = cell.try_borrow_mut() else {
            log::warn!("state busy, event dropped");
            return None;
        };
        guard.as_mut().map(f)
    })
}

/// Run a fallible state update, logging the error.
fn run(f: impl FnOnce(&mut AppState) -> QuestResult<()>) {
    if let Some(Err(err)) = with_state(f) {
        log::error!("{err}");
    }
}

fn dispatch(action: Action) {
    log::debug!("action {}", action.as_attr());
    run(|st| handle(st, action));
}

// --- Entry point ---------------------------------------------------------------

#[wasm_bindgen]
pub fn start_quest() -> Result<(), JsValue> {
    if STATE.with(|s| s.borrow().is_some()) {
        log::warn!("start_quest called twice; ignoring");
        return Ok(());
    }
    let doc = dom::document()?;
    if doc.get_element_by_id(view::ROOT_ID).is_none() {
        let body = doc.body().ok_or(QuestError::MissingElement("body"))?;
        let root = doc.create_element("div")?;
        root.set_id(view::ROOT_ID);
        body.append_child(&root)?;
    }

    let prefs_store = LocalStore::open()?;
    let prefs = Preferences::load(&prefs_store);
    let journal = JournalStore::load(LocalStore::open()?);
    let state = AppState {
        router: Router::default(),
        session: SessionState::new(prefs.theme),
        timer: Timer::new(prefs.timer.clone()),
        prefs,
        prefs_store,
        journal,
        rng: Rng::from_entropy(),
        recorder: RecorderState::default(),
        capture: None,
        blobs: Rc::new(RefCell::new(HashMap::new())),
        cues: CuePlayer::new(),
        inception: InceptionGame::new(),
        inception_feedback: None,
        tickers: HashMap::new(),
    };
    STATE.with(|s| s.replace(Some(state)));

    install_listeners(&doc)?;
    if let Some(result) = with_state(|st| render(st)) {
        result?;
    }
    log::info!("hypnagogic quest ready");
    Ok(())
}

fn install_listeners(doc: &Document) -> QuestResult<()> {
    let on_click = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
        let Some(raw) = action_attr(evt.target()) else {
            return;
        };
        match Action::parse(&raw) {
            Some(action) => dispatch(action),
            None => log::warn!("unknown action `{raw}`"),
        }
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(QuestError::from_js)?;
    on_click.forget();

    let on_change = Closure::wrap(Box::new(move |evt: Event| {
        let Some(el) = evt.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Some(name) = el.get_attribute("data-setting") else {
            return;
        };
        let value = dom::value_of(&el).unwrap_or_default();
        let checked = el
            .dyn_ref::<HtmlInputElement>()
            .is_some_and(|input| input.checked());
        run(|st| apply_setting(st, &name, &value, checked));
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
        .map_err(QuestError::from_js)?;
    on_change.forget();

    let on_key = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
        if evt.key() != "Enter" {
            return;
        }
        let on_answer = evt
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .is_some_and(|el| el.id() == view::ANSWER_INPUT);
        if on_answer {
            evt.prevent_default();
            dispatch(Action::InceptionSubmit);
        }
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())
        .map_err(QuestError::from_js)?;
    on_key.forget();
    Ok(())
}

fn action_attr(target: Option<EventTarget>) -> Option<String> {
    let el: Element = target?.dyn_into().ok()?;
    el.closest("[data-action]").ok()??.get_attribute("data-action")
}

// --- Rendering -----------------------------------------------------------------

fn render(st: &AppState) -> QuestResult<()> {
    let doc = dom::document()?;
    let root = doc
        .get_element_by_id(view::ROOT_ID)
        .ok_or(QuestError::MissingElement(view::ROOT_ID))?;
    let playable: Vec<String> = st.blobs.borrow().keys().cloned().collect();
    let screen = view::Screen {
        mode: st.router.mode(),
        prefs: &st.prefs,
        session: &st.session,
        recorder: view::RecorderView {
            theme: st.prefs.theme,
            state: &st.recorder,
            records: st.journal.records(),
            playable: &playable,
        },
        timer: &st.timer,
        inception: &st.inception,
        inception_feedback: st.inception_feedback,
    };
    root.set_inner_html(&view::render(&screen));
    if st.router.mode() == GameMode::InceptionGame && st.inception.accepts_answers() {
        dom::focus(&doc, view::ANSWER_INPUT);
    }
    Ok(())
}

fn save_prefs(st: &AppState) {
    if let Err(err) = st.prefs.save(&st.prefs_store) {
        log::error!("saving preferences: {err}");
    }
}

/// Keep a repeating ticker alive while `running`, drop it otherwise.
fn keep_ticking(
    st: &mut AppState,
    tick: Tick,
    running: bool,
    ms: i32,
    f: fn(&mut AppState) -> QuestResult<()>,
) -> QuestResult<()> {
    if !running {
        st.tickers.remove(&tick);
    } else if !st.tickers.contains_key(&tick) {
        st.tickers.insert(tick, Ticker::every(ms, move || run(f))?);
    }
    Ok(())
}

fn schedule_once(
    st: &mut AppState,
    tick: Tick,
    ms: i32,
    f: fn(&mut AppState) -> QuestResult<()>,
) -> QuestResult<()> {
    st.tickers.insert(tick, Ticker::after(ms, move || run(f))?);
    Ok(())
}

// --- Actions -------------------------------------------------------------------

fn handle(st: &mut AppState, action: Action) -> QuestResult<()> {
    match action {
        Action::Go(mode) => navigate(st, mode),
        Action::SetTheme(theme) => {
            st.session.change_theme(theme);
            st.prefs.theme = theme;
            save_prefs(st);
        }

        Action::SessionStart(kind) => {
            if let Some(q) = dom::field_value(&dom::document()?, view::QUESTION_INPUT) {
                st.session.question = q.trim().to_string();
            }
            navigate(st, GameMode::Session(kind));
            st.session.start(kind, &mut st.rng);
            sync_session(st)?;
        }
        Action::SessionToggle => {
            st.session.toggle(&mut st.rng);
            sync_session(st)?;
        }
        Action::SessionSaveJournal => {
            let field = if st.router.mode() == GameMode::Journal {
                view::JOURNAL_ENTRY
            } else {
                view::SESSION_NOTE
            };
            let text = dom::field_value(&dom::document()?, field).unwrap_or_default();
            if st.session.save_journal(&text) {
                log::info!("journal idea #{} saved", st.session.journal().len());
            }
        }

        Action::RecorderTestMic => test_microphone(st),
        Action::RecorderStart => {
            if st.capture.is_some() || !st.recorder.request_start() {
                log::debug!("capture already opening or running");
                return Ok(());
            }
            wasm_bindgen_futures::spawn_local(async {
                let opened = Capture::open().await;
                run(move |st| begin_recording(st, opened));
            });
        }
        Action::RecorderStop => stop_recording(st),
        Action::RecorderSave => save_recording(st)?,
        Action::RecorderDiscard => st.recorder.discard(),
        Action::RecorderTab(tab) => st.recorder.tab = tab,
        Action::RecorderToggleGraphs => st.recorder.show_graphs = !st.recorder.show_graphs,
        Action::RecorderToggleAdvanced => st.recorder.advanced = !st.recorder.advanced,
        Action::RecorderDownload(id) => {
            let Some(record) = st.journal.get(&id) else {
                return Ok(());
            };
            let name = export_file_name(record);
            match st.blobs.borrow().get(&id) {
                Some(blob) => dom::download_blob(blob, &name)?,
                None => dom::alert("El audio de esta grabación ya no está disponible."),
            }
            return Ok(());
        }
        Action::RecorderDelete(id) => {
            if st.journal.delete(&id)? {
                st.blobs.borrow_mut().remove(&id);
                log::info!("recording {id} deleted");
            }
        }

        Action::TimerToggle => {
            if st.timer.is_active() {
                st.timer.toggle_pause();
            } else {
                let cues = st.timer.start();
                play_cues(st, &cues);
                log::info!("timer started for {}s", st.timer.settings().duration);
            }
            sync_timer(st)?;
        }
        Action::TimerStop => {
            st.tickers.remove(&Tick::TimerAutoStart);
            let cues = st.timer.stop();
            play_cues(st, &cues);
            sync_timer(st)?;
        }
        Action::TimerReset => {
            st.tickers.remove(&Tick::TimerAutoStart);
            let cues = st.timer.reset();
            play_cues(st, &cues);
            sync_timer(st)?;
        }
        Action::TimerTheme(theme) => {
            let mut settings = st.timer.settings().clone();
            settings.theme = theme;
            st.timer.update_settings(settings);
            st.prefs.timer = st.timer.settings().clone();
            save_prefs(st);
        }

        Action::InceptionStart => {
            st.inception.start(&mut st.rng);
            st.inception_feedback = None;
            sync_inception(st, true)?;
        }
        Action::InceptionDeeper => {
            if let Some(ms) = st.inception.go_deeper(&mut st.rng) {
                begin_transition(st, ms)?;
            }
        }
        Action::InceptionKick => {
            if let Some(ms) = st.inception.kick(&mut st.rng) {
                begin_transition(st, ms)?;
            }
        }
        Action::InceptionSubmit => {
            let answer = dom::field_value(&dom::document()?, view::ANSWER_INPUT).unwrap_or_default();
            match st.inception.check_answer(&answer, &mut st.rng) {
                Some(ok) => st.inception_feedback = Some(ok),
                None => return Ok(()),
            }
        }
        Action::InceptionStop => {
            st.inception.stop();
            sync_inception(st, false)?;
        }
        Action::InceptionReset => {
            st.inception.reset();
            st.inception_feedback = None;
            sync_inception(st, false)?;
        }
    }
    render(st)
}

fn navigate(st: &mut AppState, mode: GameMode) {
    let prev = st.router.go(mode);
    if prev == mode {
        return;
    }
    match prev {
        GameMode::Session(_) => {
            st.session.deactivate();
            st.tickers.remove(&Tick::SessionSecond);
            st.tickers.remove(&Tick::SessionWord);
        }
        GameMode::Timer => {
            st.tickers.remove(&Tick::TimerSecond);
            st.tickers.remove(&Tick::TimerAutoStart);
            let _ = st.timer.stop();
            st.cues.close();
        }
        GameMode::InceptionGame => {
            st.inception.reset();
            st.inception_feedback = None;
            st.tickers.remove(&Tick::InceptionSecond);
            st.tickers.remove(&Tick::InceptionWord);
            st.tickers.remove(&Tick::InceptionTransition);
        }
        GameMode::DreamRecorder => stop_recording(st),
        _ => {}
    }
    if mode == GameMode::DreamRecorder {
        test_microphone(st);
    }
}

fn apply_setting(st: &mut AppState, name: &str, value: &str, checked: bool) -> QuestResult<()> {
    let mut settings = st.timer.settings().clone();
    match name {
        view::setting::QUESTION => {
            st.session.question = value.trim().to_string();
            return Ok(());
        }
        view::setting::LOG_LEVEL => {
            if let Some(level) = parse_level(value) {
                log::set_max_level(level.to_level_filter());
                st.prefs.log_level = value.to_string();
                save_prefs(st);
            }
            return Ok(());
        }
        view::setting::TIMER_DURATION => match value.parse() {
            Ok(v) => settings.duration = v,
            Err(_) => return Ok(()),
        },
        view::setting::TIMER_REMINDER => match value.parse() {
            Ok(v) => settings.reminder_interval = v,
            Err(_) => return Ok(()),
        },
        view::setting::TIMER_SOUND => settings.sound_enabled = checked,
        view::setting::TIMER_VIBRATION => settings.vibration_enabled = checked,
        view::setting::TIMER_AUTO_START => {
            settings.auto_start = checked;
            if checked && !st.timer.is_active() {
                schedule_once(st, Tick::TimerAutoStart, AUTO_START_DELAY_MS, auto_start_timer)?;
            } else {
                st.tickers.remove(&Tick::TimerAutoStart);
            }
        }
        other => {
            log::debug!("unhandled setting `{other}`");
            return Ok(());
        }
    }
    st.timer.update_settings(settings);
    st.prefs.timer = st.timer.settings().clone();
    save_prefs(st);
    render(st)
}

// --- Session -------------------------------------------------------------------

fn sync_session(st: &mut AppState) -> QuestResult<()> {
    let active = st.session.is_active();
    keep_ticking(st, Tick::SessionSecond, active, SECOND_MS, session_second)?;
    keep_ticking(st, Tick::SessionWord, active, WORD_TICK_MS, session_word)
}

fn session_second(st: &mut AppState) -> QuestResult<()> {
    st.session.tick_second();
    let doc = dom::document()?;
    dom::set_text(&doc, view::SESSION_TIME, &format_session_time(st.session.time()));
    dom::set_style(&doc, view::SESSION_HYDRATE, &view::hydrate_style(st.session.time()));
    Ok(())
}

fn session_word(st: &mut AppState) -> QuestResult<()> {
    st.session.tick_word(&mut st.rng);
    let doc = dom::document()?;
    let s = &st.session;
    dom::set_text(&doc, view::SESSION_WORD, s.current_word());
    dom::set_text(&doc, view::SESSION_BITS, &view::group_thousands(s.bits()));
    dom::set_text(&doc, view::SESSION_DEPTH, &format!("{}%", s.depth()));
    dom::set_style(&doc, view::SESSION_DEPTH_BAR, &view::bar_style(s.depth() as f64, "#fff"));
    dom::set_style(&doc, view::PAGE_ID, &view::page_style(&s.gradient().css()));
    Ok(())
}

// --- Timer -----------------------------------------------------------------------

fn play_cues(st: &mut AppState, cues: &[Cue]) {
    for &cue in cues {
        st.cues.play(cue, st.timer.settings());
    }
}

fn sync_timer(st: &mut AppState) -> QuestResult<()> {
    let running = st.timer.is_running();
    keep_ticking(st, Tick::TimerSecond, running, SECOND_MS, timer_second)
}

fn timer_second(st: &mut AppState) -> QuestResult<()> {
    let cues = st.timer.tick();
    play_cues(st, &cues);
    if st.timer.phase() == TimerPhase::Completed {
        log::info!(
            "timer completed with {} reminders",
            st.timer.reminder_count()
        );
        sync_timer(st)?;
        return render(st);
    }
    let doc = dom::document()?;
    let phase = st.timer.phase();
    dom::set_text(&doc, view::TIMER_CLOCK, &format_clock(st.timer.remaining()));
    dom::set_text(&doc, view::TIMER_PHASE, phase.label());
    dom::set_style(&doc, view::TIMER_PHASE, &format!("color:{};", phase.color()));
    dom::set_style(
        &doc,
        view::TIMER_PROGRESS,
        &view::bar_style(st.timer.progress(), phase.color()),
    );
    dom::set_text(&doc, view::TIMER_REMINDERS, &st.timer.reminder_count().to_string());
    Ok(())
}

fn auto_start_timer(st: &mut AppState) -> QuestResult<()> {
    st.tickers.remove(&Tick::TimerAutoStart);
    if st.router.mode() != GameMode::Timer
        || !st.timer.settings().auto_start
        || st.timer.is_active()
    {
        return Ok(());
    }
    log::info!("timer auto-start");
    let cues = st.timer.start();
    play_cues(st, &cues);
    sync_timer(st)?;
    render(st)
}

// --- Inception -----------------------------------------------------------------

fn sync_inception(st: &mut AppState, restart_words: bool) -> QuestResult<()> {
    let active = st.inception.is_active();
    if !active {
        st.tickers.remove(&Tick::InceptionTransition);
    }
    if restart_words {
        st.tickers.remove(&Tick::InceptionWord);
    }
    let interval = st.inception.word_interval_ms() as i32;
    keep_ticking(st, Tick::InceptionSecond, active, SECOND_MS, inception_second)?;
    keep_ticking(st, Tick::InceptionWord, active, interval, inception_word)
}

fn begin_transition(st: &mut AppState, ms: u32) -> QuestResult<()> {
    log::info!(
        "dream level {} ({})",
        st.inception.level(),
        st.inception.dream().name
    );
    st.inception_feedback = None;
    schedule_once(st, Tick::InceptionTransition, ms as i32, end_transition)?;
    sync_inception(st, true)
}

fn end_transition(st: &mut AppState) -> QuestResult<()> {
    st.tickers.remove(&Tick::InceptionTransition);
    st.inception.finish_transition();
    render(st)
}

fn inception_second(st: &mut AppState) -> QuestResult<()> {
    st.inception.tick_second();
    let doc = dom::document()?;
    let g = &st.inception;
    dom::set_text(&doc, view::INCEPTION_TIME, &format!("{}s", g.time_in_level()));
    dom::set_text(
        &doc,
        view::INCEPTION_DREAM_TIME,
        &format_dream_time(g.time_in_level(), g.level()),
    );
    Ok(())
}

fn inception_word(st: &mut AppState) -> QuestResult<()> {
    st.inception.new_word(&mut st.rng);
    let doc = dom::document()?;
    dom::set_text(&doc, view::INCEPTION_WORD, st.inception.current_word());
    if let Some(el) = doc.get_element_by_id(view::INCEPTION_HISTORY) {
        el.set_inner_html(&view::history_chips(st.inception.history()));
    }
    Ok(())
}

// --- Recorder --------------------------------------------------------------------

/// Ask for the microphone once and release it, reporting the outcome.
fn test_microphone(st: &mut AppState) {
    if !st.recorder.can_probe() {
        return;
    }
    st.recorder.status = MicrophoneStatus::Testing;
    wasm_bindgen_futures::spawn_local(async {
        let probe = capture::probe_microphone().await;
        run(move |st| {
            if !st.recorder.can_probe() {
                return Ok(());
            }
            match probe {
                Ok(()) => st.recorder.status = MicrophoneStatus::Working,
                Err(err) => {
                    // keeps any unsaved draft
                    log::error!("{err}");
                    st.recorder.status = MicrophoneStatus::Failed;
                    dom::alert(MICROPHONE_DENIED);
                }
            }
            render(st)
        });
    });
}

fn microphone_failed(st: &mut AppState, err: &QuestError) {
    log::error!("{err}");
    st.recorder.fail();
    dom::alert(MICROPHONE_DENIED);
}

fn begin_recording(st: &mut AppState, opened: QuestResult<Capture>) -> QuestResult<()> {
    let capture = match opened {
        Ok(c) => c,
        Err(err) => {
            microphone_failed(st, &err);
            return render(st);
        }
    };
    if st.router.mode() != GameMode::DreamRecorder {
        log::debug!("recorder view left while opening the microphone");
        st.recorder.cancel_open();
        capture.stop(|_| {});
        return Ok(());
    }
    if st.capture.is_some() {
        log::warn!("a capture is already running; releasing the new one");
        st.recorder.cancel_open();
        capture.stop(|_| {});
        return Ok(());
    }
    if let Err(err) = capture.start() {
        log::error!("{err}");
        capture.stop(|_| {});
        st.recorder.fail();
        return render(st);
    }
    let id = format!("rec-{}", js_sys::Date::now() as u64);
    let date: String = js_sys::Date::new_0().to_iso_string().into();
    log::info!("recording {id} started");
    st.recorder.begin(id, date, crate::performance_now());
    st.capture = Some(capture);
    keep_ticking(st, Tick::RecorderSecond, true, SECOND_MS, recorder_second)?;
    start_frame_loop();
    render(st)
}

fn recorder_second(st: &mut AppState) -> QuestResult<()> {
    st.recorder.tick_second();
    let doc = dom::document()?;
    dom::set_text(&doc, view::REC_ELAPSED, &format_duration(st.recorder.elapsed()));
    Ok(())
}

/// Tear down the capture (if any) and keep its draft for annotation.
fn stop_recording(st: &mut AppState) {
    st.tickers.remove(&Tick::RecorderSecond);
    let Some(capture) = st.capture.take() else {
        return;
    };
    let Some(draft) = st.recorder.finish() else {
        capture.stop(|_| {});
        return;
    };
    let id = draft.id.clone();
    log::info!("recording {id} stopped after {}s", draft.duration);
    let blobs = st.blobs.clone();
    capture.stop(move |blob| match blob {
        Some(blob) => {
            blobs.borrow_mut().insert(id, blob);
        }
        None => log::warn!("recording {id} produced no audio"),
    });
}

fn save_recording(st: &mut AppState) -> QuestResult<()> {
    let doc = dom::document()?;
    let notes = dom::field_value(&doc, view::REC_NOTES).unwrap_or_default();
    let tags = tags_from_input(&dom::field_value(&doc, view::REC_TAGS).unwrap_or_default());
    let dream_type = dom::field_value(&doc, view::REC_DREAM_TYPE)
        .and_then(|v| DreamType::from_attr(&v))
        .unwrap_or_default();
    let Some(record) = st.recorder.take_for_save(&notes, dream_type, tags) else {
        return Ok(());
    };
    let id = record.id.clone();
    match st.journal.append(record) {
        Ok(()) => {
            log::info!("recording {id} saved");
            st.recorder.tab = RecorderTab::Journal;
        }
        Err(err) => {
            log::error!("saving recording {id}: {err}");
            dom::alert("No se pudo guardar la grabación.");
        }
    }
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let keep_going = with_state(|st| frame_tick(st, ts)).unwrap_or(false);
        if !keep_going {
            // breaks the Rc cycle; the closure is freed once this call returns
            let _ = f.borrow_mut().take();
            return;
        }
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(f: &FrameCallback) {
    if let (Some(w), Some(cb)) = (web_sys::window(), f.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// One analyser frame. Returns false once the capture is gone.
fn frame_tick(st: &mut AppState, ts: f64) -> bool {
    let Some(capture) = st.capture.as_mut() else {
        return false;
    };
    let frame = capture.sample(ts);
    log::trace!(
        "frame amp {:.3} freq {:.0} noise {:.3}",
        frame.amplitude,
        frame.dominant_freq,
        frame.noise_level
    );
    let (amp, freq, noise, clarity) =
        view::live_metrics(frame.amplitude, frame.dominant_freq, frame.noise_level, frame.clarity);
    st.recorder.push_frame(frame);

    let Ok(doc) = dom::document() else {
        return true;
    };
    let status = st.recorder.status;
    dom::set_text(&doc, view::REC_STATUS, status.message());
    dom::set_style(&doc, view::REC_STATUS, &format!("color:{};", status.color()));
    if st.router.mode() != GameMode::DreamRecorder || st.recorder.tab != RecorderTab::Live {
        return true;
    }
    dom::set_text(&doc, view::LIVE_AMPLITUDE, &amp);
    dom::set_text(&doc, view::LIVE_FREQUENCY, &freq);
    dom::set_text(&doc, view::LIVE_NOISE, &noise);
    dom::set_text(&doc, view::LIVE_CLARITY, &clarity);
    if st.recorder.show_graphs {
        let points = st.recorder.session().into_iter().flat_map(|s| s.noise_points());
        draw::draw_all(&doc, capture.waveform(), capture.spectrum(), points, ts);
    }
    true
}
