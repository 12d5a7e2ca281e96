// Integration tests (native) for the `hypnagogic-quest` crate.
// These tests avoid wasm-specific functionality and exercise pure Rust logic so
// they can run under `cargo test` on the host.

use hypnagogic_quest::config::Preferences;
use hypnagogic_quest::inception::{InceptionGame, MAX_LEVEL, Phase};
use hypnagogic_quest::menu::{Action, GameMode, Router};
use hypnagogic_quest::recorder::analysis::analyze_frame;
use hypnagogic_quest::recorder::{DreamType, RecorderState, export_file_name, tags_from_input};
use hypnagogic_quest::rng::Rng;
use hypnagogic_quest::session::{SessionKind, SessionState};
use hypnagogic_quest::storage::{JournalStore, KeyValueStore, MemoryStore, RECORDINGS_KEY};
use hypnagogic_quest::theme::Theme;
use hypnagogic_quest::timer::{Cue, Timer, TimerPhase, TimerSettings};

fn loud_frame(ts: f64) -> hypnagogic_quest::recorder::AudioAnalysis {
    let time: Vec<u8> = (0..64).map(|i| if i % 2 == 0 { 250 } else { 6 }).collect();
    let freq: Vec<u8> = (0..32).map(|i| if i == 4 { 200 } else { 10 }).collect();
    analyze_frame(&freq, &time, 44_100.0, ts)
}

// Record, annotate, save, then reload the journal from what was persisted.
#[test]
fn recording_survives_a_journal_reload() {
    let mut rec = RecorderState::default();
    rec.begin("rec-1".into(), "2024-05-01T03:12:00.000Z".into(), 0.0);
    for i in 0..10 {
        rec.push_frame(loud_frame(i as f64 * 16.0));
    }
    rec.tick_second();
    rec.tick_second();
    let draft = rec.finish().expect("draft after finish");
    assert_eq!(draft.duration, 2);
    assert!(draft.max_amplitude > 0.9);

    let record = rec
        .take_for_save("caía por una escalera", DreamType::Lucid, tags_from_input("caída, escalera,"))
        .expect("finished draft can be saved");
    assert_eq!(export_file_name(&record), "dream-2024-05-01.webm");

    let mut journal = JournalStore::load(MemoryStore::new());
    journal.append(record).unwrap();
    let raw = journal.store().get(RECORDINGS_KEY).expect("journal persisted");

    let copy = MemoryStore::new();
    copy.set(RECORDINGS_KEY, &raw).unwrap();
    let reloaded = JournalStore::load(copy);
    let r = reloaded.get("rec-1").expect("record reloaded");
    assert_eq!(r.dream_type, DreamType::Lucid);
    assert_eq!(r.tags, vec!["caída".to_string(), "escalera".to_string()]);
    assert_eq!(r.notes, "caía por una escalera");
}

#[test]
fn recorder_cannot_save_while_recording() {
    let mut rec = RecorderState::default();
    rec.begin("rec-2".into(), "2024-05-02T00:00:00.000Z".into(), 0.0);
    assert!(rec.take_for_save("", DreamType::Normal, Vec::new()).is_none());
    rec.fail();
    assert!(!rec.is_recording());
    assert!(rec.draft().is_none());
}

#[test]
fn preferences_round_trip_through_a_store() {
    let store = MemoryStore::new();
    let mut prefs = Preferences::load(&store);
    assert_eq!(prefs, Preferences::default());
    prefs.theme = Theme::Aurora;
    prefs.log_level = "debug".into();
    prefs.save(&store).unwrap();
    let loaded = Preferences::load(&store);
    assert_eq!(loaded.theme, Theme::Aurora);
    assert_eq!(loaded.level(), log::Level::Debug);
}

#[test]
fn timer_runs_to_completion_with_one_reminder() {
    let settings = TimerSettings {
        duration: 60,
        reminder_interval: 30,
        ..TimerSettings::default()
    };
    let mut t = Timer::new(settings);
    assert_eq!(t.start(), vec![Cue::Start]);
    let mut last = Vec::new();
    for _ in 0..60 {
        last = t.tick();
    }
    assert_eq!(last, vec![Cue::Complete]);
    assert_eq!(t.phase(), TimerPhase::Completed);
    assert_eq!(t.reminder_count(), 1);
    assert!(!t.is_running());
}

#[test]
fn inception_dive_and_kick_back_to_reality() {
    let mut rng = Rng::seeded(42);
    let mut g = InceptionGame::new();
    g.start(&mut rng);
    for depth in 1..=MAX_LEVEL {
        assert!(g.go_deeper(&mut rng).is_some());
        g.finish_transition();
        assert_eq!(g.level(), depth);
    }
    assert_eq!(g.phase(), Phase::Limbo);
    assert!(g.go_deeper(&mut rng).is_none());
    while g.level() > 0 {
        assert!(g.kick(&mut rng).is_some());
        g.finish_transition();
    }
    assert_eq!(g.max_depth(), MAX_LEVEL);
    assert!(g.kick(&mut rng).is_none());
}

#[test]
fn session_flow_from_menu_to_discovery() {
    let mut router = Router::default();
    let action = Action::parse("session:start:guided").unwrap();
    let Action::SessionStart(kind) = action else {
        panic!("expected a session start");
    };
    router.go(GameMode::Session(kind));
    assert!(router.mode().is_session());

    let mut rng = Rng::seeded(9);
    let mut s = SessionState::new(Theme::Ocean);
    s.question = "quiero componer música".into();
    s.start(SessionKind::Guided, &mut rng);
    for _ in 0..3 {
        s.tick_second();
    }
    s.tick_word(&mut rng);
    s.stop();
    assert_eq!(s.time(), 3);
    assert_eq!(s.discoveries().len(), 1);
}
