use crate::config;

/// Load settings, falling back to defaults. The second value carries the
/// reason when the fallback was taken, so it can be logged once logging is up.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("cadenza: invalid config, using defaults: {msg}");
                (config::Settings::default(), Some(msg))
            } else {
                (s, None)
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("cadenza: failed to load config, using defaults: {e}");
            (config::Settings::default(), Some(e.to_string()))
        }
    }
}
