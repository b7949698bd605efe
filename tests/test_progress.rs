use std::fs;
use std::path::PathBuf;

use recovery_arcade::catalog;
use recovery_arcade::events::GameEvent;
use recovery_arcade::progress::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "recovery_arcade_test_{}_{}.json",
        name,
        std::process::id()
    ))
}

#[test]
fn fresh_progression_starts_at_level_one() {
    let p = Progression::new();
    assert_eq!(p.level, 1);
    assert_eq!(p.total_score, 0);
    assert!(p.tools.is_empty());
    assert!(p.achievements.is_empty());
    assert_eq!(p.streak, 0);
}

#[test]
fn points_raise_level_every_thousand() {
    let mut p = Progression::new();
    p.add_points(999);
    assert_eq!(p.level, 1);
    p.add_points(1);
    assert_eq!(p.level, 2);
    p.add_points(3000);
    assert_eq!(p.level, 5);
    assert!(p.has_achievement(RISING_STAR));
    assert!(!p.has_achievement(FIRST_VICTORY));
}

#[test]
fn first_victory_needs_a_finished_session() {
    let mut p = Progression::new();
    p.add_points(150);
    p.collect_tool("Therapy");
    assert!(p.has_achievement(FIRST_TOOL));
    assert!(!p.has_achievement(FIRST_VICTORY));

    p.record_abandoned();
    assert!(!p.has_achievement(FIRST_VICTORY));

    p.record_session(400);
    assert!(p.has_achievement(FIRST_VICTORY));
}

#[test]
fn tools_are_deduplicated() {
    let mut p = Progression::new();
    assert!(p.collect_tool("Meditation"));
    assert!(!p.collect_tool("Meditation"));
    assert_eq!(p.tools.len(), 1);
    assert!(p.has_achievement(FIRST_TOOL));
    assert!(!p.has_achievement(FULL_TOOLKIT));
}

#[test]
fn full_toolkit_needs_every_benefit() {
    let mut p = Progression::new();
    for entry in catalog::BENEFITS {
        assert!(!p.has_full_toolkit());
        p.collect_tool(entry.name);
    }
    assert!(p.has_full_toolkit());
    assert!(p.has_achievement(FULL_TOOLKIT));
}

#[test]
fn streak_counts_completed_sessions() {
    let mut p = Progression::new();
    p.record_session(500);
    p.record_session(900);
    assert_eq!(p.streak, 2);
    assert!(!p.has_achievement(THREE_IN_A_ROW));
    p.record_session(700);
    assert_eq!(p.streak, 3);
    assert_eq!(p.sessions_completed, 3);
    assert_eq!(p.best_session_bonus, 900);
    assert!(p.has_achievement(THREE_IN_A_ROW));

    p.record_abandoned();
    assert_eq!(p.streak, 0);
    assert_eq!(p.sessions_completed, 3);
}

#[test]
fn engine_events_feed_progression() {
    let mut p = Progression::new();
    let events = [
        GameEvent::ToolCollected {
            name: "Meditation".to_string(),
        },
        GameEvent::ChallengeCompleted {
            label: "Collected Meditation (Level 3)".to_string(),
            points: 115,
        },
        GameEvent::ToolCollected {
            name: "Meditation".to_string(),
        },
        GameEvent::SessionCompleted {
            label: "Recovery session complete (Level 4)".to_string(),
            bonus: 940,
            difficulty_level: 4,
        },
    ];
    for event in &events {
        event.dispatch(&mut p);
    }
    assert_eq!(p.tools.len(), 1);
    assert_eq!(p.total_score, 115 + 940);
    assert_eq!(p.level, 2);
    assert_eq!(p.streak, 1);
    assert_eq!(p.best_session_bonus, 940);
    assert!(p.has_achievement(FIRST_VICTORY));
}

#[test]
fn save_then_load_restores_progression() {
    let path = temp_path("roundtrip");
    let mut p = Progression::new();
    p.add_points(1234);
    p.collect_tool("Journaling");
    p.record_session(1234);
    p.save(&path).expect("save");

    let loaded = Progression::load(&path).expect("load");
    let _ = fs::remove_file(&path);
    assert_eq!(loaded, p);
}

#[test]
fn missing_file_loads_default() {
    let path = temp_path("missing");
    let _ = fs::remove_file(&path);
    let loaded = Progression::load(&path).expect("load");
    assert_eq!(loaded, Progression::default());
}

#[test]
fn partial_file_fills_defaults() {
    let path = temp_path("partial");
    fs::write(&path, r#"{ "total_score": 42, "tools": ["Therapy"] }"#).expect("write");
    let loaded = Progression::load(&path).expect("load");
    let _ = fs::remove_file(&path);
    assert_eq!(loaded.total_score, 42);
    assert_eq!(loaded.level, 1);
    assert!(loaded.tools.contains("Therapy"));
}

#[test]
fn corrupt_file_is_an_error() {
    let path = temp_path("corrupt");
    fs::write(&path, "not json").expect("write");
    let result = Progression::load(&path);
    let _ = fs::remove_file(&path);
    assert!(matches!(result, Err(ProgressError::Json(_))));
}
