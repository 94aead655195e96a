//! Round definitions: one-shot loot and creature events keyed by progress.

use thiserror::Error;

/// Reasons a round definition may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RoundError {
    /// Rounds trigger on progress ticks starting at 1.
    #[error("round tick cannot be less than 1")]
    TickTooLow,
    /// The loot range is empty.
    #[error("minimum loot amount {min} is greater than maximum loot amount {max}")]
    InvertedLootRange {
        /// Requested minimum loot amount.
        min: u32,
        /// Requested maximum loot amount.
        max: u32,
    },
}

/// One-shot event that drops loot and optionally summons creatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Round {
    tick: u32,
    min_loot: u32,
    max_loot: u32,
    spawns_creatures: bool,
}

impl Round {
    /// Validates and creates a round.
    pub const fn new(
        tick: u32,
        min_loot: u32,
        max_loot: u32,
        spawns_creatures: bool,
    ) -> Result<Self, RoundError> {
        if tick < 1 {
            return Err(RoundError::TickTooLow);
        }
        if min_loot > max_loot {
            return Err(RoundError::InvertedLootRange {
                min: min_loot,
                max: max_loot,
            });
        }
        Ok(Self {
            tick,
            min_loot,
            max_loot,
            spawns_creatures,
        })
    }

    /// Progress tick that triggers the round.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Smallest number of loot items dropped.
    #[must_use]
    pub const fn min_loot(&self) -> u32 {
        self.min_loot
    }

    /// Largest number of loot items dropped.
    #[must_use]
    pub const fn max_loot(&self) -> u32 {
        self.max_loot
    }

    /// Whether the round tries to summon creatures.
    #[must_use]
    pub const fn spawns_creatures(&self) -> bool {
        self.spawns_creatures
    }

    /// Reports whether the round fires at the provided progress tick.
    #[must_use]
    pub const fn can_start(&self, current_tick: u32) -> bool {
        self.tick == current_tick
    }
}

// (tick, min loot, max loot, spawns creatures)
const DEFAULT_ROUNDS: [(u32, u32, u32, bool); 9] = [
    (40, 2, 4, false),
    (120, 3, 5, false),
    (200, 3, 6, true),
    (260, 3, 6, true),
    (380, 3, 6, true),
    (500, 3, 6, true),
    (640, 2, 5, false),
    (780, 2, 5, false),
    (900, 1, 3, false),
];

/// Round table used when the structure configuration does not declare one.
#[must_use]
pub fn default_rounds() -> Vec<Round> {
    DEFAULT_ROUNDS
        .iter()
        .map(|&(tick, min_loot, max_loot, spawns_creatures)| Round {
            tick,
            min_loot,
            max_loot,
            spawns_creatures,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_tick_zero() {
        assert_eq!(Round::new(0, 0, 0, false), Err(RoundError::TickTooLow));
    }

    #[test]
    fn rejects_inverted_loot_range() {
        assert_eq!(
            Round::new(3, 5, 2, false),
            Err(RoundError::InvertedLootRange { min: 5, max: 2 })
        );
    }

    #[test]
    fn starts_only_on_its_own_tick() {
        let round = Round::new(1, 0, 0, false).expect("valid round");
        assert!(round.can_start(1));
        assert!(!round.can_start(2));
    }

    #[test]
    fn default_table_passes_validation() {
        for round in default_rounds() {
            let validated = Round::new(
                round.tick(),
                round.min_loot(),
                round.max_loot(),
                round.spawns_creatures(),
            );
            assert_eq!(validated, Ok(round));
        }
    }
}
