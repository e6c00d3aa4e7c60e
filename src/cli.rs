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

use clap::Parser;

/// Command-line overrides for the alert correlation engine. Settings not
/// passed here fall back to `ALERTCORR_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "alertcorr", about = "Alert correlation and incident-grouping engine")]
pub struct Cli {
    /// Bind address, overrides ALERTCORR_BIND_ADDR.
    #[arg(long)]
    pub addr: Option<String>,

    /// Log level filter, overrides ALERTCORR_LOG_LEVEL.
    #[arg(long)]
    pub log_level: Option<String>,
}
