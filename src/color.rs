const PALETTE: [&str; 10] = [
    "#ff6b4a", "#2f4858", "#33658a", "#86bbd8", "#f6ae2d", "#f26419", "#6a994e", "#bc4749",
    "#7b2cbf", "#2a9d8f",
];

const TEAM_COLORS: [(&str, &str); 10] = [
    ("jazz", "#002b5c"),
    ("suns", "#e56020"),
    ("lakers", "#552583"),
    ("nets", "#000000"),
    ("knicks", "#f58426"),
    ("pistons", "#c8102e"),
    ("royals", "#5a2d81"),
    ("thunder", "#007ac1"),
    ("clippers", "#c8102e"),
    ("rockets", "#ce1141"),
];

/// Display color for a player. Known franchises get their own color; anything
/// else is hashed into the fallback palette so the result never changes
/// between runs.
pub fn team_color(team: &str, name: &str) -> String {
    let key = team.trim().to_ascii_lowercase();
    if let Some((_, color)) = TEAM_COLORS.iter().find(|(team, _)| key.contains(team)) {
        return (*color).to_string();
    }

    let hash = fnv1a(format!("{key}/{}", name.trim().to_ascii_lowercase()).as_bytes());
    PALETTE[(hash % PALETTE.len() as u64) as usize].to_string()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}
