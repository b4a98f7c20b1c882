//! Bookmaker API Adapters
//!
//! HTTP adapters for the bookmakers that quote handicap ladders. Each
//! one turns its bookmaker's event document into normalized
//! [`LineRecord`](crate::domain::line::LineRecord)s on the home axis.
//!
//! Sub-modules:
//! - `client`: shared HTTP client with rate limiting and retries
//! - `tab`: TAB lines and same-game-multi pricing enquiries
//! - `pointsbet`: PointsBet lines
//! - `neds`: Neds event-card lines
//! - `types`: API request/response type definitions

pub mod client;
pub mod neds;
pub mod pointsbet;
pub mod tab;
pub mod types;

/// Split "Team Name +3.5" into the team name and its line.
///
/// The line is the last whitespace-separated token. Returns `None` when
/// there is no such token or it is not a number.
pub(crate) fn split_team_line(name: &str) -> Option<(&str, f64)> {
  let (team, line) = name.trim().rsplit_once(char::is_whitespace)?;
  let line = line.parse().ok()?;
  Some((team.trim_end(), line))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_split_team_line() {
    assert_eq!(split_team_line("Charlotte Hornets +3.5"), Some(("Charlotte Hornets", 3.5)));
    assert_eq!(split_team_line("Toronto -12.5"), Some(("Toronto", -12.5)));
    assert_eq!(split_team_line("Toronto"), None);
    assert_eq!(split_team_line("Over Under"), None);
  }
}
