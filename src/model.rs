use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) const STAT_MAX: u8 = 100;

/// The five pet meters. Declaration order is the display order; every
/// mutation clamps each field to [0, 100].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Stats {
    pub(crate) hunger: u8,
    pub(crate) energy: u8,
    pub(crate) happiness: u8,
    pub(crate) health: u8,
    pub(crate) cleanliness: u8,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hunger: 80,
            energy: 65,
            happiness: 90,
            health: 75,
            cleanliness: 60,
        }
    }
}

impl Stats {
    /// (label, value) pairs in display order.
    pub(crate) fn fields(&self) -> [(&'static str, u8); 5] {
        [
            ("hunger", self.hunger),
            ("energy", self.energy),
            ("happiness", self.happiness),
            ("health", self.health),
            ("cleanliness", self.cleanliness),
        ]
    }

    pub(crate) fn all_at_least(&self, floor: u8) -> bool {
        self.fields().iter().all(|&(_, v)| v >= floor)
    }

    /// Restores the [0,100] invariant. Persisted data can carry anything
    /// a u8 holds, so every load goes through here.
    pub(crate) fn clamped(self) -> Self {
        Self {
            hunger: self.hunger.min(STAT_MAX),
            energy: self.energy.min(STAT_MAX),
            happiness: self.happiness.min(STAT_MAX),
            health: self.health.min(STAT_MAX),
            cleanliness: self.cleanliness.min(STAT_MAX),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum GrowthStage {
    Baby,
    Child,
    Teen,
    Adult,
}

impl GrowthStage {
    pub(crate) fn label(self) -> &'static str {
        match self {
            GrowthStage::Baby => "baby",
            GrowthStage::Child => "child",
            GrowthStage::Teen => "teen",
            GrowthStage::Adult => "adult",
        }
    }
}

pub(crate) struct AgeBand {
    pub(crate) stage: GrowthStage,
    pub(crate) min_days: u64,
    /// Inclusive upper bound; `None` means unbounded (the last band).
    pub(crate) max_days: Option<u64>,
}

/// Contiguous, exhaustive age bands over [0, ∞) virtual days.
pub(crate) const AGE_BANDS: [AgeBand; 4] = [
    AgeBand {
        stage: GrowthStage::Baby,
        min_days: 0,
        max_days: Some(5),
    },
    AgeBand {
        stage: GrowthStage::Child,
        min_days: 6,
        max_days: Some(10),
    },
    AgeBand {
        stage: GrowthStage::Teen,
        min_days: 11,
        max_days: Some(20),
    },
    AgeBand {
        stage: GrowthStage::Adult,
        min_days: 21,
        max_days: None,
    },
];

/// Checked at startup so a bad table aborts construction instead of
/// misreporting the stage later.
pub(crate) fn validate_bands() -> Result<()> {
    if AGE_BANDS[0].min_days != 0 {
        bail!("age band table must start at day 0");
    }
    for pair in AGE_BANDS.windows(2) {
        match pair[0].max_days {
            Some(max) if pair[1].min_days == max + 1 => {}
            Some(_) => bail!(
                "age bands {:?} and {:?} are not contiguous",
                pair[0].stage,
                pair[1].stage
            ),
            None => bail!("only the last age band may be unbounded"),
        }
    }
    if AGE_BANDS[AGE_BANDS.len() - 1].max_days.is_some() {
        bail!("last age band must be unbounded");
    }
    Ok(())
}

/// First band containing `age_days`. Total because the table is validated
/// contiguous with an unbounded tail.
pub(crate) fn stage_for(age_days: u64) -> GrowthStage {
    for band in &AGE_BANDS {
        let above = age_days >= band.min_days;
        let below = band.max_days.map_or(true, |max| age_days <= max);
        if above && below {
            return band.stage;
        }
    }
    AGE_BANDS[AGE_BANDS.len() - 1].stage
}

/// Elapsed whole virtual days since birth. One virtual day is `day_secs`
/// of wall-clock time (deliberately compressed; see `Settings::day_secs`).
pub(crate) fn age_in_days(now: DateTime<Utc>, birth: DateTime<Utc>, day_secs: u64) -> u64 {
    let elapsed = (now - birth).num_seconds().max(0) as u64;
    elapsed / day_secs.max(1)
}

/// Everything the session controller owns about one pet. `birth` is set
/// once on first run and reloaded verbatim afterwards; `unlocked` only
/// ever grows.
#[derive(Clone, Debug)]
pub(crate) struct PetState {
    pub(crate) stats: Stats,
    pub(crate) birth: DateTime<Utc>,
    pub(crate) sleeping: bool,
    pub(crate) unlocked: Vec<String>,
}

impl PetState {
    pub(crate) fn new(birth: DateTime<Utc>) -> Self {
        Self {
            stats: Stats::default(),
            birth,
            sleeping: false,
            unlocked: Vec::new(),
        }
    }

    pub(crate) fn age_days(&self, now: DateTime<Utc>, day_secs: u64) -> u64 {
        age_in_days(now, self.birth, day_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn band_table_is_valid() {
        validate_bands().unwrap();
    }

    #[test]
    fn band_lookup_is_total_and_unambiguous() {
        for age in 0..1000u64 {
            let matches = AGE_BANDS
                .iter()
                .filter(|b| age >= b.min_days && b.max_days.map_or(true, |max| age <= max))
                .count();
            assert_eq!(matches, 1, "age {age} matched {matches} bands");
        }
    }

    #[test]
    fn stage_boundaries() {
        assert_eq!(stage_for(0), GrowthStage::Baby);
        assert_eq!(stage_for(5), GrowthStage::Baby);
        assert_eq!(stage_for(6), GrowthStage::Child);
        assert_eq!(stage_for(10), GrowthStage::Child);
        assert_eq!(stage_for(11), GrowthStage::Teen);
        assert_eq!(stage_for(20), GrowthStage::Teen);
        assert_eq!(stage_for(21), GrowthStage::Adult);
        assert_eq!(stage_for(10_000), GrowthStage::Adult);
    }

    #[test]
    fn age_floors_and_never_goes_negative() {
        let birth = Utc::now();
        assert_eq!(age_in_days(birth + Duration::seconds(59), birth, 60), 0);
        assert_eq!(age_in_days(birth + Duration::seconds(60), birth, 60), 1);
        assert_eq!(age_in_days(birth + Duration::seconds(359), birth, 60), 5);
        // Clock skew: a birth in the future still reads as age 0.
        assert_eq!(age_in_days(birth, birth + Duration::seconds(90), 60), 0);
    }

    #[test]
    fn fresh_pet_is_a_baby_with_documented_defaults() {
        let s = Stats::default();
        assert_eq!(
            (s.hunger, s.energy, s.happiness, s.health, s.cleanliness),
            (80, 65, 90, 75, 60)
        );
        assert_eq!(stage_for(0), GrowthStage::Baby);
    }
}
