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

/// Default ordinal for an unparseable or absent priority (§3: "NORMAL"/P4).
pub const DEFAULT_PRIORITY_ORDINAL: i64 = 4;

/// Parses "P<n>" or a bare integer into an ordinal; falls back to the
/// default on anything else. Lower ordinal means higher priority.
pub fn priority_to_int(p: &str) -> i64 {
    let trimmed = p.trim().to_ascii_uppercase();
    if let Some(rest) = trimmed.strip_prefix('P') {
        if let Ok(n) = rest.parse::<i64>() {
            return n;
        }
    }
    trimmed.parse::<i64>().unwrap_or(DEFAULT_PRIORITY_ORDINAL)
}

pub fn int_to_priority(n: i64) -> String {
    format!("P{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_p_prefixed() {
        assert_eq!(priority_to_int("P1"), 1);
        assert_eq!(priority_to_int("p3"), 3);
        assert_eq!(priority_to_int(" P0 "), 0);
    }

    #[test]
    fn parses_bare_integer() {
        assert_eq!(priority_to_int("2"), 2);
    }

    #[test]
    fn defaults_on_garbage() {
        assert_eq!(priority_to_int("NORMAL"), DEFAULT_PRIORITY_ORDINAL);
        assert_eq!(priority_to_int(""), DEFAULT_PRIORITY_ORDINAL);
    }

    #[test]
    fn round_trips() {
        assert_eq!(int_to_priority(priority_to_int("P2")), "P2");
    }
}
