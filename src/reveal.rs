//! Pass-and-reveal sequencing
//!
//! Each player gets the device once, in seat order:
//!
//! ```text
//! AwaitingPass(i) --ready--> AwaitingReveal(i) --commit_reveal--> (viewing)
//!     --min view delay--> Revealed(i) --next--> AwaitingPass(i+1) | AllRevealed
//! ```
//!
//! There is no way back, and at most one player's card is visible at a time.
//! Time is passed in by the caller; nothing here sleeps.

use crate::types::*;
use std::time::{Duration, Instant};

/// Minimum time a revealed card stays up before "next" is enabled
pub const DEFAULT_MIN_VIEW: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// Device is being handed to player i
    AwaitingPass(PlayerIdx),
    /// Player i holds the device; `revealed_at` is set once the card is shown
    AwaitingReveal {
        player: PlayerIdx,
        revealed_at: Option<Instant>,
    },
    /// Player i has seen their card long enough to move on
    Revealed(PlayerIdx),
    /// Everyone has seen their card
    AllRevealed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevealError {
    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error("Card for player {0} was already revealed")]
    AlreadyRevealed(PlayerIdx),

    #[error("Card must stay visible for another {0:?}")]
    TooEarly(Duration),
}

impl RevealPhase {
    fn describe(&self) -> &'static str {
        match self {
            RevealPhase::AwaitingPass(_) => "waiting for the device to be passed",
            RevealPhase::AwaitingReveal { .. } => "waiting for the reveal",
            RevealPhase::Revealed(_) => "showing a revealed card",
            RevealPhase::AllRevealed => "every card has been revealed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RevealSequencer {
    players: Vec<Player>,
    result: RoundResult,
    phase: RevealPhase,
    reveal_index: usize,
    min_view: Duration,
}

impl RevealSequencer {
    pub fn new(players: Vec<Player>, result: RoundResult, min_view: Duration) -> Self {
        let phase = if players.is_empty() {
            RevealPhase::AllRevealed
        } else {
            RevealPhase::AwaitingPass(0)
        };
        Self {
            players,
            result,
            phase,
            reveal_index: 0,
            min_view,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    /// Number of players who have finished their turn; equals N when done
    pub fn reveal_index(&self) -> usize {
        self.reveal_index
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn result(&self) -> &RoundResult {
        &self.result
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RevealPhase::AllRevealed
    }

    /// Player whose turn it is, if any
    pub fn current_player(&self) -> Option<&Player> {
        if self.is_complete() {
            return None;
        }
        self.players.get(self.reveal_index)
    }

    pub fn is_last_player(&self) -> bool {
        !self.is_complete() && self.reveal_index + 1 == self.players.len()
    }

    /// Who opens the discussion
    pub fn starting_player(&self) -> Option<&Player> {
        self.players.get(self.result.starting_player_id)
    }

    fn invalid(&self, action: &'static str) -> RevealError {
        RevealError::InvalidTransition {
            action,
            phase: self.phase.describe(),
        }
    }

    /// Current holder confirms they have the device
    pub fn ready(&mut self) -> Result<(), RevealError> {
        match self.phase {
            RevealPhase::AwaitingPass(player) => {
                self.phase = RevealPhase::AwaitingReveal {
                    player,
                    revealed_at: None,
                };
                Ok(())
            }
            _ => Err(self.invalid("confirm the pass")),
        }
    }

    /// Reveal gesture fired: show the card and start the viewing delay
    pub fn commit_reveal(&mut self, now: Instant) -> Result<(), RevealError> {
        match self.phase {
            RevealPhase::AwaitingReveal {
                player,
                revealed_at: None,
            } => {
                self.phase = RevealPhase::AwaitingReveal {
                    player,
                    revealed_at: Some(now),
                };
                Ok(())
            }
            RevealPhase::AwaitingReveal {
                player,
                revealed_at: Some(_),
            } => Err(RevealError::AlreadyRevealed(player)),
            _ => Err(self.invalid("reveal")),
        }
    }

    /// Time left before "next" is enabled; zero once it is
    pub fn remaining_view_time(&self, now: Instant) -> Option<Duration> {
        match self.phase {
            RevealPhase::AwaitingReveal {
                revealed_at: Some(at),
                ..
            } => Some(self.min_view.saturating_sub(now.saturating_duration_since(at))),
            RevealPhase::Revealed(_) => Some(Duration::ZERO),
            _ => None,
        }
    }

    pub fn can_advance(&self, now: Instant) -> bool {
        self.remaining_view_time(now) == Some(Duration::ZERO)
    }

    /// Promote a card that has been visible long enough to `Revealed`
    pub fn poll(&mut self, now: Instant) -> RevealPhase {
        if let RevealPhase::AwaitingReveal {
            player,
            revealed_at: Some(_),
        } = self.phase
        {
            if self.can_advance(now) {
                self.phase = RevealPhase::Revealed(player);
            }
        }
        self.phase
    }

    /// Hide the card and hand over to the next player
    pub fn next(&mut self, now: Instant) -> Result<RevealPhase, RevealError> {
        self.poll(now);
        match self.phase {
            RevealPhase::Revealed(player) => {
                self.reveal_index = player + 1;
                self.phase = if self.reveal_index >= self.players.len() {
                    RevealPhase::AllRevealed
                } else {
                    RevealPhase::AwaitingPass(self.reveal_index)
                };
                Ok(self.phase)
            }
            RevealPhase::AwaitingReveal {
                revealed_at: Some(_),
                ..
            } => Err(RevealError::TooEarly(
                self.remaining_view_time(now).unwrap_or(self.min_view),
            )),
            _ => Err(self.invalid("advance")),
        }
    }

    /// The card the current holder may see, only after their reveal
    pub fn visible_card(&self) -> Option<RoleCard> {
        match self.phase {
            RevealPhase::AwaitingReveal {
                player,
                revealed_at: Some(_),
            }
            | RevealPhase::Revealed(player) => Some(self.result.card_for(player)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn sequencer(n: usize, impostors: &[PlayerIdx]) -> RevealSequencer {
        let players = (0..n)
            .map(|i| Player {
                id: i,
                name: default_player_name(i),
            })
            .collect();
        let result = RoundResult {
            word: "APPLE".to_string(),
            impostor_ids: impostors.iter().copied().collect::<BTreeSet<_>>(),
            starting_player_id: n - 1,
            all_impostors: false,
        };
        RevealSequencer::new(players, result, DEFAULT_MIN_VIEW)
    }

    #[test]
    fn test_full_cycle_takes_exactly_n_turns() {
        let n = 5;
        let mut seq = sequencer(n, &[2]);
        let start = Instant::now();
        let mut cycles = 0;

        while !seq.is_complete() {
            assert!(seq.reveal_index() < n);
            let t = start + Duration::from_secs(10 * cycles as u64);
            seq.ready().unwrap();
            seq.commit_reveal(t).unwrap();
            seq.next(t + DEFAULT_MIN_VIEW).unwrap();
            cycles += 1;
            assert!(seq.reveal_index() <= n);
        }

        assert_eq!(cycles, n);
        assert_eq!(seq.reveal_index(), n);
        assert_eq!(seq.phase(), RevealPhase::AllRevealed);
        assert!(seq.current_player().is_none());
        assert_eq!(seq.starting_player().unwrap().id, n - 1);
    }

    #[test]
    fn test_card_hidden_until_reveal_and_after_next() {
        let mut seq = sequencer(3, &[1]);
        let t = Instant::now();

        assert!(seq.visible_card().is_none());
        seq.ready().unwrap();
        assert!(seq.visible_card().is_none());
        seq.commit_reveal(t).unwrap();
        assert_eq!(seq.visible_card(), Some(RoleCard::Word("APPLE".to_string())));

        seq.next(t + Duration::from_secs(2)).unwrap();
        assert_eq!(seq.phase(), RevealPhase::AwaitingPass(1));
        assert!(seq.visible_card().is_none());

        seq.ready().unwrap();
        seq.commit_reveal(t).unwrap();
        assert_eq!(seq.visible_card(), Some(RoleCard::Impostor));
    }

    #[test]
    fn test_next_blocked_until_min_view_elapsed() {
        let mut seq = sequencer(2, &[0]);
        let t = Instant::now();
        seq.ready().unwrap();
        seq.commit_reveal(t).unwrap();

        assert!(!seq.can_advance(t + Duration::from_millis(500)));
        let err = seq.next(t + Duration::from_millis(500)).unwrap_err();
        assert_eq!(err, RevealError::TooEarly(Duration::from_millis(700)));
        assert_eq!(seq.reveal_index(), 0);

        assert_eq!(seq.poll(t + DEFAULT_MIN_VIEW), RevealPhase::Revealed(0));
        assert!(seq.can_advance(t + DEFAULT_MIN_VIEW));
        assert_eq!(
            seq.next(t + DEFAULT_MIN_VIEW).unwrap(),
            RevealPhase::AwaitingPass(1)
        );
    }

    #[test]
    fn test_out_of_order_actions_are_rejected() {
        let mut seq = sequencer(2, &[0]);
        let t = Instant::now();

        assert!(seq.commit_reveal(t).is_err());
        assert!(seq.next(t).is_err());
        seq.ready().unwrap();
        assert!(seq.ready().is_err());
        assert!(seq.next(t).is_err());

        seq.commit_reveal(t).unwrap();
        assert_eq!(seq.commit_reveal(t), Err(RevealError::AlreadyRevealed(0)));
        assert_eq!(
            seq.phase(),
            RevealPhase::AwaitingReveal {
                player: 0,
                revealed_at: Some(t)
            }
        );
    }

    #[test]
    fn test_nothing_to_do_after_all_revealed() {
        let mut seq = sequencer(2, &[1]);
        let t = Instant::now();
        for _ in 0..2 {
            assert!(!seq.is_complete());
            seq.ready().unwrap();
            seq.commit_reveal(t).unwrap();
            seq.next(t + DEFAULT_MIN_VIEW).unwrap();
        }

        assert!(seq.is_complete());
        assert!(seq.ready().is_err());
        assert!(seq.commit_reveal(t).is_err());
        assert!(seq.next(t + DEFAULT_MIN_VIEW).is_err());
        assert!(seq.visible_card().is_none());
        assert_eq!(seq.reveal_index(), 2);
    }

    #[test]
    fn test_is_last_player() {
        let mut seq = sequencer(2, &[1]);
        let t = Instant::now();
        assert!(!seq.is_last_player());
        seq.ready().unwrap();
        seq.commit_reveal(t).unwrap();
        seq.next(t + DEFAULT_MIN_VIEW).unwrap();
        assert!(seq.is_last_player());
    }
}
