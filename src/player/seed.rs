//! Bundled default dataset, used on first run and by detached stores.

use super::{GameMode, ModeStat, PlayerRecord, Stats, Tier};

fn player(id: &str, name: &str, overall_points: u32, rated: &[(GameMode, Tier, u32)]) -> PlayerRecord {
    PlayerRecord {
        id: id.to_string(),
        name: name.to_string(),
        overall_points,
        stats: rated
            .iter()
            .map(|&(mode, tier, points)| (mode, ModeStat::new(tier, points)))
            .collect::<Stats>(),
    }
}

/// The eight example players. Together they cover every tier.
pub fn default_players() -> Vec<PlayerRecord> {
    use GameMode::*;
    use Tier::*;

    vec![
        player("1", "Marlowww", 5200, &[(Sword, HT1, 60), (Nethpot, LT1, 45), (Uhc, HT2, 30)]),
        player("2", "ItzRealMe", 5100, &[(Crystal, HT1, 60), (Smp, LT2, 24), (Nethpot, HT3, 16)]),
        player("3", "Swight", 4800, &[(Uhc, HT1, 60), (Sword, LT2, 24), (Crystal, LT3, 6)]),
        player("4", "coldified", 4600, &[(Smp, HT1, 60), (Crystal, HT2, 30), (Uhc, LT4, 3)]),
        player("5", "BlvckWlf", 4300, &[(Nethpot, HT2, 30), (Smp, HT4, 10), (Sword, LT5, 1)]),
        player("6", "Lurrn", 3900, &[(Sword, HT3, 16), (Uhc, HT5, 5)]),
        player("7", "Kylaz", 3500, &[(Crystal, HT4, 10), (Smp, LT3, 6)]),
        player("8", "yMiau", 3100, &[(Nethpot, HT5, 5), (Smp, LT5, 1)]),
    ]
}
