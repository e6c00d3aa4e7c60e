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

pub mod cli;
pub mod config;
pub mod errors;
pub mod handler;
pub mod infra;
pub mod meta;
pub mod rules_engine;
pub mod service;
pub mod state;
pub mod util;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::infra::pager::HttpPagerBridge;
use crate::infra::sqlite_store::SqliteStore;
use crate::state::AppState;

pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();
}

pub async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let settings = config::init();
    init_tracing(cli.log_level.as_deref().unwrap_or(&settings.log_level));

    let addr = cli.addr.clone().unwrap_or_else(|| settings.bind_addr.clone());

    let store: Arc<dyn infra::store::AlertStore> =
        Arc::new(SqliteStore::connect(&settings.database_path).await?);
    let pager: Arc<dyn infra::pager::PagerBridge> = Arc::new(HttpPagerBridge::new(
        settings.pager_create_url.clone(),
        settings.pager_note_url.clone(),
        settings.pager_close_url.clone(),
        Duration::from_secs(settings.webhook_timeout_secs),
    ));

    let state = AppState::new(store, pager);
    let router = handler::http::router::build_router(state);

    tracing::info!(%addr, "starting alertcorr ingestion server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
