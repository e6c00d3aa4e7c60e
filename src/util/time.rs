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

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Parses the ingress `alertTime` layout, `"YYYY-MM-DD HH:MM:SS"` (§3),
/// interpreted as UTC.
pub fn parse_alert_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_expected_layout() {
        let parsed = parse_alert_time("2026-07-30 12:00:00").unwrap();
        assert_eq!(parsed.to_string(), "2026-07-30 12:00:00 UTC");
    }

    #[test]
    fn rejects_other_layouts() {
        assert!(parse_alert_time("2026-07-30T12:00:00Z").is_none());
        assert!(parse_alert_time("not a time").is_none());
    }
}
