use crate::model::{PetState, Stats, STAT_MAX};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PetAction {
    Feed,
    Play,
    Clean,
    SleepToggle,
}

fn raise(v: u8, by: u8) -> u8 {
    v.saturating_add(by).min(STAT_MAX)
}

fn lower(v: u8, by: u8) -> u8 {
    v.saturating_sub(by)
}

impl Stats {
    /// One decay tick. Asleep only restores energy; awake drains every
    /// meter by one point.
    pub(crate) fn decayed(self, sleeping: bool) -> Self {
        if sleeping {
            return Self {
                energy: raise(self.energy, 2),
                ..self
            };
        }
        Self {
            hunger: lower(self.hunger, 1),
            energy: lower(self.energy, 1),
            happiness: lower(self.happiness, 1),
            health: lower(self.health, 1),
            cleanliness: lower(self.cleanliness, 1),
        }
    }

    pub(crate) fn fed(self) -> Self {
        Self {
            hunger: raise(self.hunger, 20),
            energy: raise(self.energy, 5),
            ..self
        }
    }

    pub(crate) fn played(self) -> Self {
        Self {
            happiness: raise(self.happiness, 15),
            energy: lower(self.energy, 10),
            hunger: lower(self.hunger, 5),
            ..self
        }
    }

    /// A bath always ends at spotless, never past it.
    pub(crate) fn cleaned(self) -> Self {
        Self {
            cleanliness: STAT_MAX,
            happiness: lower(self.happiness, 5),
            ..self
        }
    }
}

impl PetState {
    /// Applies a user action. Feed/play/clean are rejected while the pet
    /// sleeps; the sleep toggle is always accepted. Returns whether the
    /// action took effect.
    pub(crate) fn apply(&mut self, action: PetAction) -> bool {
        match action {
            PetAction::SleepToggle => {
                self.sleeping = !self.sleeping;
                true
            }
            _ if self.sleeping => false,
            PetAction::Feed => {
                self.stats = self.stats.fed();
                true
            }
            PetAction::Play => {
                self.stats = self.stats.played();
                true
            }
            PetAction::Clean => {
                self.stats = self.stats.cleaned();
                true
            }
        }
    }

    pub(crate) fn tick(&mut self) {
        self.stats = self.stats.decayed(self.sleeping);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn flat(v: u8) -> Stats {
        Stats {
            hunger: v,
            energy: v,
            happiness: v,
            health: v,
            cleanliness: v,
        }
    }

    #[test]
    fn awake_decay_drains_every_meter_by_one() {
        let s = Stats::default().decayed(false);
        assert_eq!(
            (s.hunger, s.energy, s.happiness, s.health, s.cleanliness),
            (79, 64, 89, 74, 59)
        );
        assert_eq!(flat(0).decayed(false), flat(0));
    }

    #[test]
    fn asleep_decay_only_restores_energy() {
        let before = Stats::default();
        let after = before.decayed(true);
        assert_eq!(after.energy, before.energy + 2);
        assert_eq!(after.hunger, before.hunger);
        assert_eq!(after.happiness, before.happiness);
        assert_eq!(after.health, before.health);
        assert_eq!(after.cleanliness, before.cleanliness);

        let rested = flat(99).decayed(true);
        assert_eq!(rested.energy, 100);
    }

    #[test]
    fn feeding_a_fresh_pet_caps_hunger() {
        let s = Stats::default().fed();
        assert_eq!(s.hunger, 100); // 80 + 20, clamped
        assert_eq!(s.energy, 70);
        assert_eq!(s.happiness, 90);
    }

    #[test]
    fn play_trades_energy_and_hunger_for_happiness() {
        let s = flat(50).played();
        assert_eq!(s.happiness, 65);
        assert_eq!(s.energy, 40);
        assert_eq!(s.hunger, 45);
        assert_eq!(s.health, 50);

        let tired = Stats {
            energy: 3,
            hunger: 2,
            ..flat(50)
        }
        .played();
        assert_eq!(tired.energy, 0);
        assert_eq!(tired.hunger, 0);
    }

    #[test]
    fn clean_is_not_additive() {
        let once = flat(50).cleaned();
        assert_eq!(once.cleanliness, 100);
        assert_eq!(once.happiness, 45);
        let twice = once.cleaned();
        assert_eq!(twice.cleanliness, 100);
        assert_eq!(twice.happiness, 40);
    }

    #[test]
    fn actions_are_rejected_while_asleep() {
        let mut pet = PetState::new(Utc::now());
        assert!(pet.apply(PetAction::SleepToggle));
        assert!(pet.sleeping);

        let frozen = pet.stats;
        assert!(!pet.apply(PetAction::Feed));
        assert!(!pet.apply(PetAction::Play));
        assert!(!pet.apply(PetAction::Clean));
        assert_eq!(pet.stats, frozen);
        assert!(pet.sleeping);

        assert!(pet.apply(PetAction::SleepToggle));
        assert!(!pet.sleeping);
        assert!(pet.apply(PetAction::Feed));
    }

    proptest! {
        #[test]
        fn every_operation_stays_in_range(
            hunger in 0u8..=100,
            energy in 0u8..=100,
            happiness in 0u8..=100,
            health in 0u8..=100,
            cleanliness in 0u8..=100,
            sleeping: bool,
        ) {
            let s = Stats { hunger, energy, happiness, health, cleanliness };
            for out in [s.decayed(sleeping), s.fed(), s.played(), s.cleaned()] {
                for (name, v) in out.fields() {
                    prop_assert!(v <= 100, "{name} left range: {v}");
                }
            }
        }
    }
}
