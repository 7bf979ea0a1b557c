use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

pub fn http_port() -> u16 {
    env_parse("GAME_SERVER_PORT").unwrap_or(3001)
}

pub fn tick_interval() -> Duration {
    Duration::from_millis(env_parse::<u64>("ROOM_TICK_MS").unwrap_or(5).max(1))
}

pub fn spawn_interval() -> Duration {
    Duration::from_millis(env_parse::<u64>("ROOM_SPAWN_MS").unwrap_or(8700).max(1))
}

pub fn snapshot_every_ticks() -> u64 {
    env_parse::<u64>("ROOM_SNAPSHOT_EVERY_TICKS")
        .unwrap_or(1)
        .max(1)
}

pub fn mob_target_population() -> usize {
    env_parse("MOB_TARGET_POPULATION").unwrap_or(800)
}

pub fn mob_spawn_batch() -> usize {
    env_parse("MOB_SPAWN_BATCH").unwrap_or(100)
}

// Unset or empty disables kill crediting.
pub fn progress_service_url() -> Option<String> {
    env::var("PROGRESS_SERVICE_URL")
        .ok()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

// Rooms created over HTTP and never joined stop after this long.
pub fn room_idle_timeout() -> Duration {
    Duration::from_millis(env_parse::<u64>("ROOM_IDLE_TIMEOUT_MS").unwrap_or(60_000))
}

pub fn progress_timeout() -> Duration {
    Duration::from_millis(env_parse::<u64>("PROGRESS_TIMEOUT_MS").unwrap_or(1500))
}

pub const DEFAULT_GAMEMODE: &str = "ffa";
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const UPDATE_BROADCAST_CAPACITY: usize = 128;
pub const PROGRESS_CHANNEL_CAPACITY: usize = 1024;
pub const PROGRESS_LEDGER_CAPACITY: usize = 65_536;
