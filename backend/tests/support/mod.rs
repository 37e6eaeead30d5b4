use std::env;

use parking_lot::{Mutex, MutexGuard};

/// Every variable read by `AppSettings::from_env` and repository selection.
pub const CONFIG_VARS: [&str; 7] = [
    "INSTRUCTOR_RECRUITMENT_ENABLED",
    "ALLOWED_HOSTS",
    "NEW_INSTRUCTOR_DELAY_SEC",
    "RECRUITMENT_SUCCESS_URL",
    "REPOSITORY_TYPE",
    "DATABASE_URL",
    "PG_DATABASE_URL",
];

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with every [`CONFIG_VARS`] entry unset except the given overrides.
///
/// Holds a process-wide lock for the duration and restores the previous values
/// on drop, including when `f` panics.
pub fn with_config_env<F, R>(overrides: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _env = ConfigEnv::apply(overrides);
    f()
}

struct ConfigEnv {
    _lock: MutexGuard<'static, ()>,
    saved: Vec<(&'static str, Option<String>)>,
}

impl ConfigEnv {
    fn apply(overrides: &[(&str, &str)]) -> Self {
        let lock = ENV_LOCK.lock();
        let saved = CONFIG_VARS
            .iter()
            .map(|key| (*key, env::var(key).ok()))
            .collect();

        for key in CONFIG_VARS {
            env::remove_var(key);
        }
        for (key, value) in overrides {
            assert!(
                CONFIG_VARS.contains(key),
                "{} is not a configuration variable",
                key
            );
            env::set_var(key, value);
        }

        Self { _lock: lock, saved }
    }
}

impl Drop for ConfigEnv {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}
