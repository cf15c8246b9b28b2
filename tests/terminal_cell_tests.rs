//! Concurrency tests for the terminal configuration cell.

use std::sync::Arc;
use std::thread;
use termgate_config::{Config, TerminalConfig, TerminalConfigCell};

#[test]
fn concurrent_updates_then_get_observes_exactly_one_snapshot() {
    let cell = Arc::new(TerminalConfigCell::new());
    let writers: u64 = 16;

    thread::scope(|scope| {
        for n in 0..writers {
            let cell = Arc::clone(&cell);
            scope.spawn(move || {
                cell.update(TerminalConfig {
                    max_idle_time: n,
                    session_keep_duration: n,
                    ..TerminalConfig::default()
                });
            });
        }
    });

    // Whichever writer landed last, the snapshot must be internally
    // consistent: both fields from the same update, never a mix.
    let conf = cell.get().expect("at least one update completed");
    assert!(conf.max_idle_time < writers);
    assert_eq!(conf.max_idle_time, conf.session_keep_duration);
}

#[test]
fn readers_and_writers_interleave_without_torn_reads() {
    let cell = Arc::new(TerminalConfigCell::new());
    cell.update(TerminalConfig {
        heartbeat_duration: 0,
        max_idle_time: 0,
        ..TerminalConfig::default()
    });

    thread::scope(|scope| {
        for n in 1..=8u64 {
            let cell = Arc::clone(&cell);
            scope.spawn(move || {
                cell.update(TerminalConfig {
                    heartbeat_duration: n,
                    max_idle_time: n,
                    ..TerminalConfig::default()
                });
            });
        }
        for _ in 0..8 {
            let cell = Arc::clone(&cell);
            scope.spawn(move || {
                for _ in 0..100 {
                    let conf = cell.get().unwrap();
                    assert_eq!(conf.heartbeat_duration, conf.max_idle_time);
                }
            });
        }
    });
}

#[test]
fn config_passthrough_shares_one_slot_across_clones() {
    let config = Config::default();
    assert!(config.terminal_conf().is_none());

    let shared = config.clone();
    shared.update_terminal_conf(TerminalConfig {
        password_auth: true,
        ..TerminalConfig::default()
    });

    // The clone and the original observe the same slot.
    assert!(config.terminal_conf().unwrap().password_auth);
}
