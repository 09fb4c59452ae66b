//! cards: card representation, the play-value ladder, and deck construction

use serde::{Deserialize, Serialize};

/// Comparison value of a rank for play legality. Normal ranks climb
/// monotonically from 3 to Ace; 2 and 10 sit above everything so they are
/// playable on any pile.
pub type PlayValue = u8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

impl Rank {
    /// The canonical VALUES table: 3..9 map to themselves, the face cards
    /// continue the ladder up to Ace=13, and the two special ranks take the
    /// top slots (2=14, 10=15).
    pub fn play_value(self) -> PlayValue {
        match self {
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Jack => 10,
            Rank::Queen => 11,
            Rank::King => 12,
            Rank::Ace => 13,
            Rank::Two => 14,
            Rank::Ten => 15,
        }
    }

    /// 2 resets the pile and 10 bombs it; both may be played on anything.
    pub fn is_special(self) -> bool {
        matches!(self, Rank::Two | Rank::Ten)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub fn as_str(self) -> &'static str {
        match self {
            Suit::Clubs => "clubs",
            Suit::Diamonds => "diamonds",
            Suit::Hearts => "hearts",
            Suit::Spades => "spades",
        }
    }
}

/// Wire shape for a card: `[rank, suit, faceUp, isBottomCard]`.
type CardWire = (Rank, Suit, bool, bool);

/// A zone-tagged card. Suit is cosmetic and never affects legality; the two
/// flags track where the card currently lives (`face_up` = identity visible,
/// `bottom` = sitting in the face-down row).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "CardWire", into = "CardWire")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    pub face_up: bool,
    pub bottom: bool,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            face_up: false,
            bottom: false,
        }
    }

    /// Identity comparison ignoring zone flags.
    pub fn same_card(&self, other: &Card) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }
}

impl From<CardWire> for Card {
    fn from((rank, suit, face_up, bottom): CardWire) -> Self {
        Self {
            rank,
            suit,
            face_up,
            bottom,
        }
    }
}

impl From<Card> for CardWire {
    fn from(card: Card) -> Self {
        (card.rank, card.suit, card.face_up, card.bottom)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.rank.as_str(), self.suit.as_str())
    }
}

/// Is `candidate` legal on top of `pile_top`?
///
/// Total and pure. A pile top of rank 2 counts as lowest: a played 2 resets
/// the ordering without clearing the pile. While the seven-switch is active
/// only rank <= 7 or a special card may follow.
pub fn compare_for_play(candidate: &Card, pile_top: Option<&Card>, seven_active: bool) -> bool {
    if seven_active {
        return candidate.rank.play_value() <= Rank::Seven.play_value()
            || candidate.rank.is_special();
    }
    let top = match pile_top {
        Some(top) => top,
        None => return true,
    };
    if candidate.rank.is_special() {
        return true;
    }
    // reset: a 2 on top counts as the lowest rank, not its play value
    let top_value = if top.rank == Rank::Two {
        2
    } else {
        top.rank.play_value()
    };
    candidate.rank.play_value() >= top_value
}

/// Full 52-card deck, all four suits.
pub fn standard_deck() -> Vec<Card> {
    let suits = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
    let mut deck = Vec::with_capacity(52);
    for &suit in &suits {
        for &rank in &ALL_RANKS {
            deck.push(Card::new(rank, suit));
        }
    }
    deck
}

/// The 26-card two-suit deck the two-player network game deals from.
pub fn short_deck() -> Vec<Card> {
    let suits = [Suit::Clubs, Suit::Spades];
    let mut deck = Vec::with_capacity(26);
    for &rank in &ALL_RANKS {
        for &suit in &suits {
            deck.push(Card::new(rank, suit));
        }
    }
    deck
}
