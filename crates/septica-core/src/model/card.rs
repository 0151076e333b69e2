use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Tens and aces are worth one point each when captured.
    pub const fn is_point_card(self) -> bool {
        matches!(self.rank, Rank::Ten | Rank::Ace)
    }

    pub const fn point_value(self) -> u32 {
        if self.is_point_card() { 1 } else { 0 }
    }

    /// Sevens cut unconditionally.
    pub const fn is_wild(self) -> bool {
        matches!(self.rank, Rank::Seven)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}
