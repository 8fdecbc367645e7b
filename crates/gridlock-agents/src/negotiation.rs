//! One-shot negotiation between two cars contesting the same cell.
//!
//! Actions follow from the two personalities alone:
//!
//! | self \ other | cooperative      | competitive      | neutral          |
//! |--------------|------------------|------------------|------------------|
//! | cooperative  | Yield / Advance  | Yield / Advance  | Yield / Advance  |
//! | competitive  | Advance / Yield  | Advance / Advance| Yield / Yield    |
//! | neutral      | Advance / Yield  | Yield / Yield    | Yield / Yield    |
//!
//! A mutual yield without a cooperative party leaves the initiator angry.
//! Rewards are read from the initiator's side of the payoff table and
//! nothing carries over between contests.

use gridlock_types::{NegotiationAction, NegotiationOutcome, Personality};

/// Result of a single negotiation, seen from the initiating car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    /// The initiator's action.
    pub mine: NegotiationAction,
    /// The counterpart's action.
    pub theirs: NegotiationAction,
    /// The initiator's payoff.
    pub reward: i64,
    /// Whether the contest left the initiator angry.
    pub frustrated: bool,
}

impl Negotiation {
    /// Collapse the action pair into the summary kept on the car.
    pub const fn outcome(&self) -> NegotiationOutcome {
        match (self.mine, self.theirs) {
            (NegotiationAction::Advance, NegotiationAction::Advance) => {
                NegotiationOutcome::Stalemate
            }
            (NegotiationAction::Advance, NegotiationAction::Yield) => NegotiationOutcome::Advanced,
            (NegotiationAction::Yield, _) => NegotiationOutcome::Yielded,
        }
    }
}

/// Payoff for the acting car given both actions.
pub const fn reward(mine: NegotiationAction, theirs: NegotiationAction) -> i64 {
    match (mine, theirs) {
        (NegotiationAction::Yield, NegotiationAction::Yield) => 3,
        (NegotiationAction::Yield, NegotiationAction::Advance) => 2,
        (NegotiationAction::Advance, NegotiationAction::Yield) => 5,
        (NegotiationAction::Advance, NegotiationAction::Advance) => 1,
    }
}

/// Resolve a contest between a car with personality `me` and one with
/// personality `other`.
pub const fn negotiate(me: Personality, other: Personality) -> Negotiation {
    let (mine, theirs, frustrated) = match (me, other) {
        (Personality::Competitive, Personality::Competitive) => {
            (NegotiationAction::Advance, NegotiationAction::Advance, false)
        }
        (Personality::Cooperative, _) => {
            (NegotiationAction::Yield, NegotiationAction::Advance, false)
        }
        (_, Personality::Cooperative) => {
            (NegotiationAction::Advance, NegotiationAction::Yield, false)
        }
        _ => (NegotiationAction::Yield, NegotiationAction::Yield, true),
    };
    Negotiation {
        mine,
        theirs,
        reward: reward(mine, theirs),
        frustrated,
    }
}

/// The intention a car announces to its neighbours.
pub const fn announced_intention(personality: Personality) -> NegotiationAction {
    match personality {
        Personality::Competitive => NegotiationAction::Advance,
        Personality::Cooperative | Personality::Neutral => NegotiationAction::Yield,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gridlock_types::NegotiationAction::{Advance, Yield};
    use gridlock_types::Personality::{Competitive, Cooperative, Neutral};

    #[test]
    fn cooperative_always_yields() {
        for other in Personality::ALL {
            let deal = negotiate(Cooperative, other);
            assert_eq!((deal.mine, deal.theirs), (Yield, Advance));
            assert_eq!(deal.reward, 2);
            assert!(!deal.frustrated);
        }
    }

    #[test]
    fn non_cooperative_advances_on_cooperative() {
        for me in [Competitive, Neutral] {
            let deal = negotiate(me, Cooperative);
            assert_eq!((deal.mine, deal.theirs), (Advance, Yield));
            assert_eq!(deal.reward, 5);
            assert_eq!(deal.outcome(), NegotiationOutcome::Advanced);
        }
    }

    #[test]
    fn competitive_pair_is_a_stalemate() {
        let deal = negotiate(Competitive, Competitive);
        assert_eq!((deal.mine, deal.theirs), (Advance, Advance));
        assert_eq!(deal.reward, 1);
        assert_eq!(deal.outcome(), NegotiationOutcome::Stalemate);
    }

    #[test]
    fn neutral_mixes_end_in_mutual_yield_and_anger() {
        for (me, other) in [(Neutral, Neutral), (Competitive, Neutral), (Neutral, Competitive)] {
            let deal = negotiate(me, other);
            assert_eq!((deal.mine, deal.theirs), (Yield, Yield));
            assert_eq!(deal.reward, 3);
            assert!(deal.frustrated);
            assert_eq!(deal.outcome(), NegotiationOutcome::Yielded);
        }
    }

    #[test]
    fn perspective_is_fixed_to_the_initiator() {
        // Cooperative facing competitive yields for 2; the competitive car,
        // when it is the one acting, advances for 5.
        assert_eq!(negotiate(Cooperative, Competitive).reward, 2);
        assert_eq!(negotiate(Competitive, Cooperative).reward, 5);
    }

    #[test]
    fn competitive_announces_advance() {
        assert_eq!(announced_intention(Competitive), Advance);
        assert_eq!(announced_intention(Neutral), Yield);
    }
}
