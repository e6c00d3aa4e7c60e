// Copyright 2026
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::env;

use once_cell::sync::Lazy;

/// Process-wide configuration, read once at startup. Environment
/// variables are prefixed `ALERTCORR_`.
#[derive(Clone, Debug)]
pub struct Settings {
    pub bind_addr: String,
    pub database_path: String,
    pub pager_create_url: String,
    pub pager_note_url: String,
    pub pager_close_url: String,
    pub webhook_timeout_secs: u64,
    pub log_level: String,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Settings {
    pub fn load() -> Settings {
        Settings {
            bind_addr: env_or("ALERTCORR_BIND_ADDR", "0.0.0.0:8080"),
            database_path: env_or("ALERTCORR_DATABASE_PATH", "alertcorr.db"),
            pager_create_url: env_or("ALERTCORR_PAGER_CREATE_URL", "http://localhost:9000/incidents"),
            pager_note_url: env_or("ALERTCORR_PAGER_NOTE_URL", "http://localhost:9000/incidents/notes"),
            pager_close_url: env_or("ALERTCORR_PAGER_CLOSE_URL", "http://localhost:9000/incidents/close"),
            webhook_timeout_secs: env_or("ALERTCORR_WEBHOOK_TIMEOUT_SECS", "10")
                .parse()
                .unwrap_or(10),
            log_level: env_or("ALERTCORR_LOG_LEVEL", "info"),
        }
    }
}

pub static SETTINGS: Lazy<Settings> = Lazy::new(Settings::load);

/// Loads `.env` if present, then forces the lazy settings to initialize so
/// startup failures surface immediately instead of on first use.
pub fn init() -> &'static Settings {
    dotenvy::dotenv().ok();
    Lazy::force(&SETTINGS)
}
