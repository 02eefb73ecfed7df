use crate::config;

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("tubeloop: ignoring config ({msg}); starting with default service, fetch and storage settings");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("tubeloop: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
