//! The double-credit offer shown before a session is settled.

use serde::Serialize;

/// Seconds the bonus choice stays locked, standing in for an ad view.
pub const BONUS_DELAY_SECS: u32 = 5;

/// How the session reached settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferOrigin {
    /// The countdown reached zero.
    Completed,
    /// The user stopped the session early.
    Stopped,
}

/// Accept-or-skip choice with a locked accept button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusOffer {
    origin: OfferOrigin,
    gate_remaining_secs: u32,
}

impl BonusOffer {
    /// A fresh offer with the accept choice locked.
    #[must_use]
    pub const fn new(origin: OfferOrigin) -> Self {
        Self {
            origin,
            gate_remaining_secs: BONUS_DELAY_SECS,
        }
    }

    /// Advance the gate by one second.
    ///
    /// Returns true on the tick that unlocks the bonus.
    pub fn tick(&mut self) -> bool {
        if self.gate_remaining_secs == 0 {
            return false;
        }
        self.gate_remaining_secs -= 1;
        self.gate_remaining_secs == 0
    }

    /// Whether "accept bonus" may be chosen.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.gate_remaining_secs == 0
    }

    /// Seconds until the bonus unlocks.
    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.gate_remaining_secs
    }

    #[must_use]
    pub const fn origin(&self) -> OfferOrigin {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_starts_locked() {
        let offer = BonusOffer::new(OfferOrigin::Completed);
        assert!(!offer.is_ready());
        assert_eq!(offer.remaining_secs(), 5);
        assert_eq!(offer.origin(), OfferOrigin::Completed);
    }

    #[test]
    fn test_offer_unlocks_after_five_ticks() {
        let mut offer = BonusOffer::new(OfferOrigin::Stopped);

        for expected in [4, 3, 2, 1] {
            assert!(!offer.tick());
            assert_eq!(offer.remaining_secs(), expected);
            assert!(!offer.is_ready());
        }

        assert!(offer.tick());
        assert!(offer.is_ready());

        // Further ticks do nothing
        assert!(!offer.tick());
        assert!(offer.is_ready());
    }
}
