//! Role assignment for a single round
//!
//! Everything here is a pure function of its inputs and the random source,
//! so a seeded `StdRng` reproduces a round exactly.

use crate::banks::name_key;
use crate::types::*;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::{BTreeSet, HashSet};

/// Tuning for the rare round where every player is an impostor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllImpostorPolicy {
    /// Probability of firing when the cooldown has run out
    pub chance: f64,
    /// Cooldown value set after the event fires
    pub cooldown_max: u32,
}

impl Default for AllImpostorPolicy {
    fn default() -> Self {
        Self {
            chance: 0.05,
            cooldown_max: MAX_ALL_IMPOSTOR_COOLDOWN,
        }
    }
}

impl AllImpostorPolicy {
    /// Policy that never fires, for tests and setups that disable the event
    pub fn disabled() -> Self {
        Self {
            chance: 0.0,
            ..Self::default()
        }
    }
}

/// Preconditions the caller must uphold before starting a round
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("At least two players are required, got {0}")]
    NotEnoughPlayers(usize),

    #[error("Impostor count {impostors} must be between 1 and {max}")]
    InvalidImpostorCount { impostors: usize, max: usize },

    #[error("The word pool is empty")]
    EmptyPool,
}

/// A round's roles plus the cooldown to persist for the next round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub result: RoundResult,
    pub next_cooldown: u32,
}

/// Union of the given words, trimmed and de-duplicated case-insensitively
pub fn build_word_pool<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut pool = Vec::new();
    for word in words {
        let trimmed = word.as_ref().trim();
        if !trimmed.is_empty() && seen.insert(name_key(trimmed)) {
            pool.push(trimmed.to_string());
        }
    }
    pool
}

/// Cooldown after a round; firing resets it, otherwise it counts down to zero
pub fn next_cooldown(current: u32, fired: bool, policy: &AllImpostorPolicy) -> u32 {
    if fired {
        policy.cooldown_max
    } else {
        current.saturating_sub(1)
    }
}

/// Pick the word, the impostors and the starting player for one round
pub fn assign_round<R: Rng + ?Sized>(
    rng: &mut R,
    players: &[Player],
    impostor_count: usize,
    word_pool: &[String],
    cooldown: u32,
    policy: &AllImpostorPolicy,
) -> Result<Assignment, AssignmentError> {
    let n = players.len();
    if n < MIN_PLAYERS {
        return Err(AssignmentError::NotEnoughPlayers(n));
    }
    if impostor_count == 0 || impostor_count >= n {
        return Err(AssignmentError::InvalidImpostorCount {
            impostors: impostor_count,
            max: n - 1,
        });
    }
    let word = word_pool
        .choose(rng)
        .cloned()
        .ok_or(AssignmentError::EmptyPool)?;

    let chance = if policy.chance.is_finite() {
        policy.chance.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let all_impostors = cooldown == 0 && rng.random_bool(chance);

    let mut ids: Vec<PlayerIdx> = (0..n).collect();
    let impostor_ids: BTreeSet<PlayerIdx> = if all_impostors {
        ids.iter().copied().collect()
    } else {
        ids.shuffle(rng);
        ids.iter().take(impostor_count).copied().collect()
    };

    let starting_player_id = rng.random_range(0..n);

    Ok(Assignment {
        result: RoundResult {
            word,
            impostor_ids,
            starting_player_id,
            all_impostors,
        },
        next_cooldown: next_cooldown(cooldown, all_impostors, policy),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                id: i,
                name: default_player_name(i),
            })
            .collect()
    }

    fn pool(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_assignment_shape_for_every_setup() {
        let mut rng = StdRng::seed_from_u64(42);
        let words = pool(&["APPLE", "PEAR"]);

        for n in MIN_PLAYERS..=MAX_PLAYERS {
            for k in 1..n {
                let assignment =
                    assign_round(&mut rng, &players(n), k, &words, 0, &AllImpostorPolicy::default())
                        .unwrap();
                let result = assignment.result;

                let expected = if result.all_impostors { n } else { k };
                assert_eq!(result.impostor_ids.len(), expected);
                assert!(result.impostor_ids.iter().all(|&id| id < n));
                assert!(result.starting_player_id < n);
                assert!(words.contains(&result.word));
            }
        }
    }

    #[test]
    fn test_all_impostors_never_fires_during_cooldown() {
        let mut rng = StdRng::seed_from_u64(7);
        let always = AllImpostorPolicy {
            chance: 1.0,
            cooldown_max: 9,
        };

        for cooldown in 1..=9 {
            let assignment =
                assign_round(&mut rng, &players(5), 2, &pool(&["X"]), cooldown, &always).unwrap();
            assert!(!assignment.result.all_impostors);
            assert_eq!(assignment.result.impostor_ids.len(), 2);
            assert_eq!(assignment.next_cooldown, cooldown - 1);
        }
    }

    #[test]
    fn test_all_impostors_fires_and_resets_cooldown() {
        let mut rng = StdRng::seed_from_u64(7);
        let always = AllImpostorPolicy {
            chance: 1.0,
            cooldown_max: 9,
        };

        let assignment = assign_round(&mut rng, &players(6), 1, &pool(&["X"]), 0, &always).unwrap();
        assert!(assignment.result.all_impostors);
        assert_eq!(assignment.result.impostor_ids.len(), 6);
        assert_eq!(assignment.next_cooldown, 9);
    }

    #[test]
    fn test_non_finite_chance_never_fires() {
        let mut rng = StdRng::seed_from_u64(3);
        for chance in [f64::NAN, f64::INFINITY] {
            let broken = AllImpostorPolicy {
                chance,
                cooldown_max: 9,
            };
            let assignment =
                assign_round(&mut rng, &players(4), 1, &pool(&["X"]), 0, &broken).unwrap();
            assert!(!assignment.result.all_impostors);
            assert_eq!(assignment.result.impostor_ids.len(), 1);
        }
    }

    #[test]
    fn test_cooldown_floors_at_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let assignment = assign_round(
            &mut rng,
            &players(3),
            1,
            &pool(&["X"]),
            0,
            &AllImpostorPolicy::disabled(),
        )
        .unwrap();
        assert_eq!(assignment.next_cooldown, 0);
        assert_eq!(next_cooldown(0, false, &AllImpostorPolicy::default()), 0);
        assert_eq!(next_cooldown(4, true, &AllImpostorPolicy::default()), 9);
    }

    #[test]
    fn test_impostor_selection_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(2024);
        let names = ["A", "B", "C", "D"];
        let players: Vec<Player> = names
            .iter()
            .enumerate()
            .map(|(id, name)| Player {
                id,
                name: name.to_string(),
            })
            .collect();
        let words = pool(&["APPLE"]);
        let mut counts = [0usize; 4];
        let mut starters = [0usize; 4];

        for _ in 0..1000 {
            // cooldown held above zero keeps the all-impostor branch out
            let assignment = assign_round(
                &mut rng,
                &players,
                1,
                &words,
                5,
                &AllImpostorPolicy::default(),
            )
            .unwrap();
            assert_eq!(assignment.result.word, "APPLE");
            assert_eq!(assignment.result.impostor_ids.len(), 1);
            for &id in &assignment.result.impostor_ids {
                counts[id] += 1;
            }
            starters[assignment.result.starting_player_id] += 1;
        }

        for count in counts.iter().chain(starters.iter()) {
            assert!((150..=350).contains(count), "skewed counts: {counts:?} {starters:?}");
        }
    }

    #[test]
    fn test_precondition_errors() {
        let mut rng = StdRng::seed_from_u64(0);
        let policy = AllImpostorPolicy::default();

        assert_eq!(
            assign_round(&mut rng, &players(4), 1, &[], 3, &policy),
            Err(AssignmentError::EmptyPool)
        );
        assert_eq!(
            assign_round(&mut rng, &players(1), 1, &pool(&["X"]), 3, &policy),
            Err(AssignmentError::NotEnoughPlayers(1))
        );
        assert_eq!(
            assign_round(&mut rng, &players(3), 3, &pool(&["X"]), 3, &policy),
            Err(AssignmentError::InvalidImpostorCount {
                impostors: 3,
                max: 2
            })
        );
    }

    #[test]
    fn test_build_word_pool_dedupes_across_sources() {
        let builtin: &[&str] = &["Dog", "Cat"];
        let custom = vec![" dog ".to_string(), "Moose".to_string(), "  ".to_string()];

        let pool = build_word_pool(
            builtin
                .iter()
                .map(|w| w.to_string())
                .chain(custom.into_iter()),
        );
        assert_eq!(pool, vec!["Dog", "Cat", "Moose"]);
    }
}
