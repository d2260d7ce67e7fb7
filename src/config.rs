use crate::reveal::DEFAULT_MIN_VIEW;
use crate::round::AllImpostorPolicy;
use crate::types::MAX_ALL_IMPOSTOR_COOLDOWN;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for the binary and the controller
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Directory holding the `<key>.json` files
    pub data_dir: PathBuf,
    /// How long a revealed card stays up before "next" is enabled
    pub reveal_delay: Duration,
    pub all_impostor: AllImpostorPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            reveal_delay: DEFAULT_MIN_VIEW,
            all_impostor: AllImpostorPolicy::default(),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an env var, falling back to `default` with a warning on garbage
fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env_value(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let data_dir = env_value("IMPOSTOR_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let reveal_delay = Duration::from_millis(env_parsed(
            "IMPOSTOR_REVEAL_DELAY_MS",
            defaults.reveal_delay.as_millis() as u64,
        ));

        let mut chance = env_parsed("IMPOSTOR_ALL_IMPOSTOR_CHANCE", defaults.all_impostor.chance);
        if !(0.0..=1.0).contains(&chance) {
            tracing::warn!(
                "IMPOSTOR_ALL_IMPOSTOR_CHANCE must be between 0 and 1, got {}",
                chance
            );
            chance = defaults.all_impostor.chance;
        }

        let mut cooldown_max = env_parsed(
            "IMPOSTOR_ALL_IMPOSTOR_COOLDOWN",
            defaults.all_impostor.cooldown_max,
        );
        if cooldown_max > MAX_ALL_IMPOSTOR_COOLDOWN {
            tracing::warn!(
                "IMPOSTOR_ALL_IMPOSTOR_COOLDOWN capped at {}",
                MAX_ALL_IMPOSTOR_COOLDOWN
            );
            cooldown_max = MAX_ALL_IMPOSTOR_COOLDOWN;
        }

        let config = Self {
            data_dir,
            reveal_delay,
            all_impostor: AllImpostorPolicy {
                chance,
                cooldown_max,
            },
        };
        tracing::info!(
            data_dir = %config.data_dir.display(),
            reveal_delay_ms = config.reveal_delay.as_millis() as u64,
            all_impostor_chance = config.all_impostor.chance,
            all_impostor_cooldown = config.all_impostor.cooldown_max,
            "Game configuration loaded"
        );
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 4] = [
        "IMPOSTOR_DATA_DIR",
        "IMPOSTOR_REVEAL_DELAY_MS",
        "IMPOSTOR_ALL_IMPOSTOR_CHANCE",
        "IMPOSTOR_ALL_IMPOSTOR_COOLDOWN",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = GameConfig::from_env();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.reveal_delay, Duration::from_millis(1200));
        assert_eq!(config.all_impostor.chance, 0.05);
        assert_eq!(config.all_impostor.cooldown_max, 9);
    }

    #[test]
    #[serial]
    fn test_reads_env_values() {
        clear_env();
        std::env::set_var("IMPOSTOR_DATA_DIR", " /tmp/impostor ");
        std::env::set_var("IMPOSTOR_REVEAL_DELAY_MS", "300");
        std::env::set_var("IMPOSTOR_ALL_IMPOSTOR_CHANCE", "0.5");
        std::env::set_var("IMPOSTOR_ALL_IMPOSTOR_COOLDOWN", "3");

        let config = GameConfig::from_env();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/impostor"));
        assert_eq!(config.reveal_delay, Duration::from_millis(300));
        assert_eq!(config.all_impostor.chance, 0.5);
        assert_eq!(config.all_impostor.cooldown_max, 3);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back() {
        clear_env();
        std::env::set_var("IMPOSTOR_REVEAL_DELAY_MS", "soon");
        std::env::set_var("IMPOSTOR_ALL_IMPOSTOR_CHANCE", "1.5");
        std::env::set_var("IMPOSTOR_ALL_IMPOSTOR_COOLDOWN", "40");

        let config = GameConfig::from_env();
        assert_eq!(config.reveal_delay, DEFAULT_MIN_VIEW);
        assert_eq!(config.all_impostor.chance, 0.05);
        assert_eq!(config.all_impostor.cooldown_max, MAX_ALL_IMPOSTOR_COOLDOWN);
        clear_env();
    }
}
