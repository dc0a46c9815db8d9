//! Process-wide counters for the server loop and the game world.
//! Read through [`snapshot`] for status logging.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

static TICKS: AtomicU64 = AtomicU64::new(0);
static TICK_OVERRUNS: AtomicU64 = AtomicU64::new(0);
static SESSIONS_OPENED: AtomicU64 = AtomicU64::new(0);
static SESSIONS_CLOSED: AtomicU64 = AtomicU64::new(0);

static GAME_COUNTER: OnceLock<Mutex<GameCounter>> = OnceLock::new();

pub fn inc_ticks() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

/// A tick body took longer than the tick period; the next tick is delayed.
pub fn inc_tick_overruns() {
    TICK_OVERRUNS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_sessions_opened() {
    SESSIONS_OPENED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_sessions_closed() {
    SESSIONS_CLOSED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameCounter {
    pub entries: u64,
    pub exits: u64,
    pub currently_active: u64,
    pub concurrent_peak: u64,
}

fn game_counter_lock() -> &'static Mutex<GameCounter> {
    GAME_COUNTER.get_or_init(|| Mutex::new(GameCounter::default()))
}

fn with_game_counter(f: impl FnOnce(&mut GameCounter)) -> GameCounter {
    // A poisoned lock only means another thread panicked mid-update; the
    // counters themselves are still usable.
    let mut guard = match game_counter_lock().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    f(&mut guard);
    *guard
}

pub fn record_game_entry() -> GameCounter {
    with_game_counter(|counter| {
        counter.entries = counter.entries.saturating_add(1);
        counter.currently_active = counter.currently_active.saturating_add(1);
        if counter.currently_active > counter.concurrent_peak {
            counter.concurrent_peak = counter.currently_active;
        }
    })
}

pub fn record_game_exit() -> GameCounter {
    with_game_counter(|counter| {
        counter.exits = counter.exits.saturating_add(1);
        counter.currently_active = counter.currently_active.saturating_sub(1);
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub ticks: u64,
    pub tick_overruns: u64,
    pub sessions_opened: u64,
    pub sessions_closed: u64,
    pub game: GameCounter,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        ticks: TICKS.load(Ordering::Relaxed),
        tick_overruns: TICK_OVERRUNS.load(Ordering::Relaxed),
        sessions_opened: SESSIONS_OPENED.load(Ordering::Relaxed),
        sessions_closed: SESSIONS_CLOSED.load(Ordering::Relaxed),
        game: with_game_counter(|_| {}),
    }
}
