//! Cards, faces, and the board
//!
//! The board is dealt once per session and only ever grows: consuming the
//! special card appends its armed twin so the armed identity forms a pair.

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::Sound;

/// Face identity of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    Papyrus,
    Toriel,
    Asgore,
    Sans,
    /// The special card: flipping it starts the fight
    Flowey,
    /// The armed identity left behind once the special card is consumed
    EvilFlowey,
}

impl Character {
    /// Faces that occupy a normal pair-slot
    pub const PAIRS: [Character; 4] = [
        Character::Papyrus,
        Character::Toriel,
        Character::Asgore,
        Character::Sans,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Character::Papyrus => "papyrus",
            Character::Toriel => "toriel",
            Character::Asgore => "asgore",
            Character::Sans => "sans",
            Character::Flowey => "flowey",
            Character::EvilFlowey => "flowey-evil",
        }
    }

    /// Voice line played when this face is matched
    pub fn match_voice(&self) -> Sound {
        match self {
            Character::Papyrus => Sound::PapyrusVoice,
            Character::Toriel => Sound::TorielVoice,
            Character::Asgore => Sound::AsgoreVoice,
            Character::Sans => Sound::SansVoice,
            Character::Flowey => Sound::FloweyTaunt,
            Character::EvilFlowey => Sound::FloweyFound,
        }
    }

    /// Dialogue shown in the speech frame when this face speaks
    pub fn dialogue(&self) -> Option<&'static str> {
        match self {
            Character::Papyrus => Some(
                "HEY! YOU FOUND ME\nAFTER ALL THIS WE NEED SOME SPAGHETTI ON OUR SECOND DATE\nNYEHEHEHEHEHEHE",
            ),
            Character::Toriel => Some("My child, you found me!, Be careful!"),
            Character::Asgore => Some(
                "You found me, my child! Toriel will be so happy, we can finally be a family again.",
            ),
            Character::Sans => Some("Heh, you found me, human. Nice j*b!"),
            Character::Flowey => Some(
                "You worthless insect. You thought you could defeat me? I'll tear your world apart piece by piece. \
                 I'll crush every hope, poison every moment, and rip you down to the last cell. No escape. No peace. \
                 Just pain, slow, personal, and endless. I will enjoy every second of your suffering.",
            ),
            Character::EvilFlowey => None,
        }
    }
}

/// A single card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub index: usize,
    pub face: Character,
    pub face_up: bool,
    /// Matched cards are disabled for the rest of the session
    pub matched: bool,
    /// Transient red flash after a mismatch
    pub wrong: bool,
}

impl Card {
    pub fn new(index: usize, face: Character) -> Self {
        Self {
            index,
            face,
            face_up: false,
            matched: false,
            wrong: false,
        }
    }
}

/// Ordered set of cards, addressed by position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub cards: Vec<Card>,
}

impl Board {
    /// The stock deck: four pairs plus the single special card
    pub fn standard_deck() -> Vec<Character> {
        let mut deck = Vec::with_capacity(Character::PAIRS.len() * 2 + 1);
        for face in Character::PAIRS {
            deck.push(face);
            deck.push(face);
        }
        deck.push(Character::Flowey);
        deck
    }

    /// Deal a freshly shuffled stock deck
    pub fn shuffled(rng: &mut Pcg32) -> Self {
        let mut deck = Self::standard_deck();
        deck.shuffle(rng);
        Self::from_faces(deck)
    }

    /// Lay out cards face-down in the given order
    pub fn from_faces(faces: impl IntoIterator<Item = Character>) -> Self {
        Self {
            cards: faces
                .into_iter()
                .enumerate()
                .map(|(index, face)| Card::new(index, face))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    pub fn count_face(&self, face: Character) -> usize {
        self.cards.iter().filter(|c| c.face == face).count()
    }

    pub fn face_up_count(&self) -> usize {
        self.cards.iter().filter(|c| c.face_up).count()
    }

    /// Replace the consumed special card with the armed identity and deal
    /// its twin face-down at the end of the board.
    ///
    /// Returns the twin's index, or `None` if `index` is not the special card.
    pub fn arm_special(&mut self, index: usize) -> Option<usize> {
        let card = self.cards.get_mut(index)?;
        if card.face != Character::Flowey {
            return None;
        }
        card.face = Character::EvilFlowey;

        let twin = self.cards.len();
        self.cards.push(Card::new(twin, Character::EvilFlowey));
        Some(twin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_standard_deck_composition() {
        let deck = Board::standard_deck();
        assert_eq!(deck.len(), 9);
        for face in Character::PAIRS {
            assert_eq!(deck.iter().filter(|&&f| f == face).count(), 2);
        }
        assert_eq!(deck.iter().filter(|&&f| f == Character::Flowey).count(), 1);
        assert!(!deck.contains(&Character::EvilFlowey));
    }

    #[test]
    fn test_arm_special_rewrites_board() {
        let mut board = Board::from_faces(Board::standard_deck());
        let special = board
            .cards
            .iter()
            .position(|c| c.face == Character::Flowey)
            .unwrap();

        let twin = board.arm_special(special).unwrap();
        assert_eq!(twin, 9);
        assert_eq!(board.len(), 10);
        assert_eq!(board.count_face(Character::Flowey), 0);
        assert_eq!(board.count_face(Character::EvilFlowey), 2);
        assert!(!board.cards[twin].face_up);
        assert_eq!(board.cards[twin].index, twin);

        // Already consumed
        assert_eq!(board.arm_special(special), None);
        assert_eq!(board.len(), 10);
    }

    #[test]
    fn test_arm_special_rejects_other_faces() {
        let mut board = Board::from_faces(Board::standard_deck());
        assert_eq!(board.arm_special(0), None);
        assert_eq!(board.arm_special(99), None);
        assert_eq!(board.len(), 9);
    }

    #[test]
    fn test_every_pair_face_speaks() {
        for face in Character::PAIRS {
            assert!(face.dialogue().is_some());
        }
    }

    proptest! {
        #[test]
        fn shuffle_preserves_one_special(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut board = Board::shuffled(&mut rng);

            prop_assert_eq!(board.len(), 9);
            prop_assert_eq!(board.count_face(Character::Flowey), 1);
            prop_assert_eq!(board.count_face(Character::EvilFlowey), 0);
            for (i, card) in board.cards.iter().enumerate() {
                prop_assert_eq!(card.index, i);
                prop_assert!(!card.face_up);
            }

            let special = board.cards.iter().position(|c| c.face == Character::Flowey).unwrap();
            prop_assert!(board.arm_special(special).is_some());
            prop_assert_eq!(board.count_face(Character::Flowey), 0);
            prop_assert_eq!(board.count_face(Character::EvilFlowey), 2);
        }
    }
}
