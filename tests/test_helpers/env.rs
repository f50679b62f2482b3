//! Scoped process environment changes for integration tests.

use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Process environment overrides that are undone on drop.
///
/// Holding the guard serialises environment changes across tests in the
/// same binary.
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
    _serial: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Applies `overrides`; `None` removes the variable.
    #[must_use]
    pub fn apply(overrides: &[(String, Option<String>)]) -> Self {
        static SERIAL: OnceLock<Mutex<()>> = OnceLock::new();
        let serial = SERIAL
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let saved = overrides
            .iter()
            .map(|(key, value)| {
                let previous = env::var(key).ok();
                write_var(key, value.as_deref());
                (key.clone(), previous)
            })
            .collect();
        Self {
            saved,
            _serial: serial,
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..).rev() {
            write_var(&key, value.as_deref());
        }
    }
}

fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers hold the serialising mutex for the whole mutation.
    unsafe {
        match value {
            Some(text) => env::set_var(key, text),
            None => env::remove_var(key),
        }
    }
}
