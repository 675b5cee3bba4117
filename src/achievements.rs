use crate::model::Stats;

/// One catalog entry. The catalog is data: the unlock checker walks it in
/// declaration order, which also decides which unlock gets announced when
/// several fire on the same evaluation.
pub(crate) struct Achievement {
    pub(crate) id: &'static str,
    pub(crate) description: &'static str,
    pub(crate) earned: fn(&Stats, u64) -> bool,
}

pub(crate) static CATALOG: [Achievement; 8] = [
    Achievement {
        id: "feed1",
        description: "First Meal",
        earned: |s, _| s.hunger >= 90,
    },
    Achievement {
        id: "play1",
        description: "First Playtime",
        earned: |s, _| s.happiness >= 95,
    },
    Achievement {
        id: "clean1",
        description: "Sparkly Clean",
        earned: |s, _| s.cleanliness == 100,
    },
    Achievement {
        id: "healthy",
        description: "Top Health",
        earned: |s, _| s.health >= 90,
    },
    Achievement {
        id: "energized",
        description: "Fully Rested",
        earned: |s, _| s.energy == 100,
    },
    Achievement {
        id: "careful",
        description: "All Stats Over 80",
        earned: |s, _| s.all_at_least(80),
    },
    Achievement {
        id: "survivor5",
        description: "Survived 5 Days",
        earned: |_, age| age >= 5,
    },
    Achievement {
        id: "survivor10",
        description: "Survived 10 Days",
        earned: |_, age| age >= 10,
    },
];

/// Entries satisfied now but not yet in `unlocked`, in catalog order.
/// Does not mutate `unlocked`; the session controller applies the union,
/// so an unlock is never lost even if its condition later turns false.
pub(crate) fn evaluate(
    unlocked: &[String],
    stats: &Stats,
    age_days: u64,
) -> Vec<&'static Achievement> {
    CATALOG
        .iter()
        .filter(|a| !unlocked.iter().any(|u| u == a.id) && (a.earned)(stats, age_days))
        .collect()
}
