use crate::color::team_color;
use crate::models::Player;
use chrono::{DateTime, Utc};

/// A row of the reference table players are bootstrapped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlayer {
    pub id: u64,
    pub name: &'static str,
    pub team: &'static str,
    pub assists: u64,
    pub tracked: bool,
}

pub const TRACKED_PLAYER_ID: u64 = 1;

pub const REFERENCE_PLAYERS: [SeedPlayer; 11] = [
    SeedPlayer { id: 1, name: "Braden", team: "Wildcats", assists: 758, tracked: true },
    SeedPlayer { id: 2, name: "John Stockton", team: "Utah Jazz", assists: 15806, tracked: false },
    SeedPlayer { id: 3, name: "Chris Paul", team: "Phoenix Suns", assists: 12499, tracked: false },
    SeedPlayer { id: 4, name: "Jason Kidd", team: "New Jersey Nets", assists: 12091, tracked: false },
    SeedPlayer { id: 5, name: "LeBron James", team: "Los Angeles Lakers", assists: 11584, tracked: false },
    SeedPlayer { id: 6, name: "Steve Nash", team: "Phoenix Suns", assists: 10335, tracked: false },
    SeedPlayer { id: 7, name: "Mark Jackson", team: "New York Knicks", assists: 10334, tracked: false },
    SeedPlayer { id: 8, name: "Magic Johnson", team: "Los Angeles Lakers", assists: 10141, tracked: false },
    SeedPlayer { id: 9, name: "Oscar Robertson", team: "Cincinnati Royals", assists: 9887, tracked: false },
    SeedPlayer { id: 10, name: "Russell Westbrook", team: "Oklahoma City Thunder", assists: 9767, tracked: false },
    SeedPlayer { id: 11, name: "Isiah Thomas", team: "Detroit Pistons", assists: 9061, tracked: false },
];

/// Materializes the reference table as players stamped with `now`.
pub fn players_at(now: DateTime<Utc>) -> Vec<Player> {
    REFERENCE_PLAYERS
        .iter()
        .map(|seed| Player {
            id: seed.id,
            name: seed.name.to_string(),
            assists: seed.assists,
            team: seed.team.to_string(),
            color: team_color(seed.team, seed.name),
            is_tracked: seed.tracked,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

/// Static dataset shown when the server cannot be reached.
pub fn demo_players() -> Vec<Player> {
    players_at(DateTime::<Utc>::UNIX_EPOCH)
}
