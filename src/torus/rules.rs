//! Transition rule table for B3/S23.

/// Largest possible Moore-neighborhood count.
pub const MAX_NEIGHBORS: u8 = 8;

/// Next state of a single cell given its current state (0 or 1) and the
/// number of live neighbors.
#[inline(always)]
pub fn next_state(state: u8, neighbors: u8) -> u8 {
    match (state, neighbors) {
        (1, n) if !(2..=3).contains(&n) => 0,
        (0, 3) => 1,
        (s, _) => s,
    }
}

/// `next_state` flattened into a lookup indexed by `state * 9 + neighbors`.
pub struct RuleTable {
    table: [u8; 18],
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTable {
    pub const fn new() -> Self {
        let mut table = [0u8; 18];
        // Birth on exactly three.
        table[3] = 1;
        // Survival on two or three.
        table[9 + 2] = 1;
        table[9 + 3] = 1;
        Self { table }
    }

    #[inline(always)]
    pub fn lookup(&self, state: u8, neighbors: u8) -> u8 {
        self.table[state as usize * 9 + neighbors as usize]
    }
}

pub(crate) static RULES: RuleTable = RuleTable::new();

#[cfg(test)]
mod tests {
    use super::{MAX_NEIGHBORS, RuleTable, next_state};

    fn expected(state: u8, neighbors: u8) -> u8 {
        let alive = state == 1;
        let next_alive = if alive {
            neighbors == 2 || neighbors == 3
        } else {
            neighbors == 3
        };
        next_alive as u8
    }

    #[test]
    fn rule_matches_reference_for_every_pair() {
        for state in 0..=1u8 {
            for n in 0..=MAX_NEIGHBORS {
                assert_eq!(
                    next_state(state, n),
                    expected(state, n),
                    "state={state} neighbors={n}"
                );
            }
        }
    }

    #[test]
    fn table_agrees_with_scalar_rule() {
        let table = RuleTable::new();
        for state in 0..=1u8 {
            for n in 0..=MAX_NEIGHBORS {
                assert_eq!(table.lookup(state, n), next_state(state, n));
            }
        }
    }

    #[test]
    fn still_life_and_birth_cases() {
        assert_eq!(next_state(1, 2), 1);
        assert_eq!(next_state(1, 3), 1);
        assert_eq!(next_state(0, 3), 1);
        assert_eq!(next_state(0, 2), 0);
        assert_eq!(next_state(1, 1), 0);
        assert_eq!(next_state(1, 4), 0);
        assert_eq!(next_state(0, 8), 0);
    }
}
