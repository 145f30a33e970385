use std::{fmt, str::FromStr, sync::Arc};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Source of upcoming pieces.
///
/// A supplier is a value, not a handle: drawing a piece leaves `self`
/// untouched and returns the supplier state to use for the following draw.
/// The engine stores the returned state and calls this exactly once every
/// time it needs a new piece.
pub trait PieceSupplier: Clone {
    #[must_use]
    fn next_piece(&self) -> (PieceKind, Self);
}

/// Supplies pieces using the 7-bag randomization algorithm.
///
/// # 7-Bag System
///
/// 1. Creating a "bag" containing all 7 piece types
/// 2. Shuffling the bag randomly
/// 3. Drawing pieces from the bag until it is empty
/// 4. Refilling with a new shuffled bag
///
/// Every kind therefore appears exactly once in each run of 7 draws starting
/// at a multiple of 7, which bounds droughts and repeats.
///
/// # Example
///
/// ```
/// use blockfall_engine::{BagSupplier, PieceSeed, PieceSupplier};
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// let supplier = BagSupplier::with_seed(seed);
///
/// let (first, supplier) = supplier.next_piece();
/// let (second, _) = supplier.next_piece();
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Clone)]
pub struct BagSupplier {
    rng: Pcg32,
    bag: ArrayVec<PieceKind, { PieceKind::LEN }>,
}

impl Default for BagSupplier {
    fn default() -> Self {
        Self::new()
    }
}

impl BagSupplier {
    /// Creates a new bag supplier with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            bag: ArrayVec::new(),
        }
    }

    fn fill_bag(&mut self) {
        if self.bag.is_empty() {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Pieces left in the current bag, in draw order.
    pub fn remaining(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().rev().copied()
    }
}

impl PieceSupplier for BagSupplier {
    fn next_piece(&self) -> (PieceKind, Self) {
        let mut next = self.clone();
        next.fill_bag();
        let Some(kind) = next.bag.pop() else {
            unreachable!("bag is refilled before drawing");
        };
        (kind, next)
    }
}

/// Supplies a fixed list of pieces, starting over when it runs out.
///
/// Useful for tests and scripted sessions where every piece must be known in
/// advance.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceKind, PieceSupplier, SequenceSupplier};
///
/// let supplier = SequenceSupplier::new([PieceKind::L, PieceKind::O]).unwrap();
/// let (a, supplier) = supplier.next_piece();
/// let (b, supplier) = supplier.next_piece();
/// let (c, _) = supplier.next_piece();
/// assert_eq!([a, b, c], [PieceKind::L, PieceKind::O, PieceKind::L]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSupplier {
    kinds: Arc<[PieceKind]>,
    position: usize,
}

impl SequenceSupplier {
    /// Returns `None` if `kinds` is empty.
    #[must_use]
    pub fn new<I>(kinds: I) -> Option<Self>
    where
        I: IntoIterator<Item = PieceKind>,
    {
        let kinds: Arc<[PieceKind]> = kinds.into_iter().collect();
        (!kinds.is_empty()).then_some(Self { kinds, position: 0 })
    }
}

impl PieceSupplier for SequenceSupplier {
    fn next_piece(&self) -> (PieceKind, Self) {
        let kind = self.kinds[self.position];
        let next = Self {
            kinds: Arc::clone(&self.kinds),
            position: (self.position + 1) % self.kinds.len(),
        };
        (kind, next)
    }
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed used to initialize the random number
/// generator of a [`BagSupplier`]. Using the same seed will produce the same
/// sequence of pieces. Its text form is 32 hex digits.
///
/// # Example
///
/// ```
/// use blockfall_engine::{BagSupplier, PieceSeed, PieceSupplier};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
///
/// let (a, _) = BagSupplier::with_seed(seed).next_piece();
/// let (b, _) = BagSupplier::with_seed(seed).next_piece();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: {reason}")]
pub struct ParseSeedError {
    reason: String,
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(ParseSeedError {
                reason: format!("expected 32 characters, got {}", hex_str.len()),
            });
        }
        let num = u128::from_str_radix(hex_str, 16).map_err(|e| ParseSeedError {
            reason: format!("{hex_str} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values using the standard random distribution.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw<S: PieceSupplier>(supplier: &S, n: usize) -> Vec<PieceKind> {
        let mut supplier = supplier.clone();
        let mut kinds = Vec::with_capacity(n);
        for _ in 0..n {
            let (kind, next) = supplier.next_piece();
            kinds.push(kind);
            supplier = next;
        }
        kinds
    }

    #[test]
    fn test_bag_contains_every_kind_once() {
        let supplier = BagSupplier::new();
        let kinds = draw(&supplier, PieceKind::LEN * 3);
        for bag in kinds.chunks(PieceKind::LEN) {
            let mut bag = bag.to_vec();
            bag.sort();
            assert_eq!(bag, PieceKind::ALL.to_vec());
        }
    }

    #[test]
    fn test_next_piece_does_not_change_state() {
        let supplier = BagSupplier::with_seed(PieceSeed([7; 16]));
        let (a, _) = supplier.next_piece();
        let (b, _) = supplier.next_piece();
        assert_eq!(a, b);
    }

    #[test]
    fn test_remaining_matches_draw_order() {
        let (first, supplier) = BagSupplier::with_seed(PieceSeed([3; 16])).next_piece();
        let remaining: Vec<_> = supplier.remaining().collect();
        assert_eq!(remaining.len(), PieceKind::LEN - 1);
        assert!(!remaining.contains(&first));
        assert_eq!(draw(&supplier, remaining.len()), remaining);
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let seed = PieceSeed([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ]);
        assert_eq!(
            draw(&BagSupplier::with_seed(seed), 20),
            draw(&BagSupplier::with_seed(seed), 20)
        );
    }

    #[test]
    fn test_sequence_supplier_cycles() {
        let supplier = SequenceSupplier::new([PieceKind::I, PieceKind::T, PieceKind::S]).unwrap();
        assert_eq!(
            draw(&supplier, 7),
            vec![
                PieceKind::I,
                PieceKind::T,
                PieceKind::S,
                PieceKind::I,
                PieceKind::T,
                PieceKind::S,
                PieceKind::I,
            ]
        );
    }

    #[test]
    fn test_sequence_supplier_rejects_empty() {
        assert_eq!(SequenceSupplier::new(Vec::<PieceKind>::new()), None);
    }

    mod piece_seed_serialization {
        use super::*;

        #[test]
        fn test_roundtrip_random_seed() {
            let seed: PieceSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn test_known_value_sequential_bytes() {
            // Big-endian: bytes appear in order as hex pairs
            let seed = PieceSeed([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
            assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
        }

        #[test]
        fn test_known_value_all_zeros() {
            let seed = PieceSeed([0; 16]);
            assert_eq!(
                serde_json::to_string(&seed).unwrap(),
                "\"00000000000000000000000000000000\""
            );
        }

        #[test]
        fn test_parse_uppercase_hex() {
            let seed: PieceSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
            assert_eq!(
                seed.0,
                [
                    0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76,
                    0x54, 0x32, 0x10
                ]
            );
        }

        #[test]
        fn test_error_cases() {
            for json in [
                "\"ghijklmnopqrstuvwxyzghijklmnopqr\"",
                "\"0123456789abcdef0123456789abcde\"",
                "\"0123456789abcdef0123456789abcdef0\"",
                "\"\"",
            ] {
                let result: Result<PieceSeed, _> = serde_json::from_str(json);
                let err_msg = result.unwrap_err().to_string();
                assert!(err_msg.contains("invalid hex"), "{json}: {err_msg}");
            }
        }
    }
}
