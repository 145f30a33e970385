use blockfall_engine::{BagSupplier, PieceSeed, PieceSupplier as _};
use rand::Rng as _;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ReplaySeedArg {
    /// Seed to replay (32 hex digits); a random one is used if omitted
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Number of pieces to print
    #[clap(long, default_value_t = 14)]
    count: usize,
}

pub(crate) fn run(arg: &ReplaySeedArg) {
    let ReplaySeedArg { seed, count } = arg;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let pieces = piece_sequence(seed, *count);
    println!("seed: {seed}");
    println!("{pieces}");
}

/// The first `count` pieces of the bag seeded with `seed`, one character each.
fn piece_sequence(seed: PieceSeed, count: usize) -> String {
    let mut supplier = BagSupplier::with_seed(seed);
    let mut pieces = String::with_capacity(count);
    for _ in 0..count {
        let (kind, next) = supplier.next_piece();
        pieces.push(kind.as_char());
        supplier = next;
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_sequence_is_deterministic() {
        let seed: PieceSeed = "00112233445566778899aabbccddeeff".parse().unwrap();
        let a = piece_sequence(seed, 21);
        assert_eq!(a.len(), 21);
        assert_eq!(a, piece_sequence(seed, 21));
        assert!(a.starts_with(&piece_sequence(seed, 7)));
    }

    #[test]
    fn test_each_bag_has_every_piece() {
        let seed: PieceSeed = "ffeeddccbbaa99887766554433221100".parse().unwrap();
        let pieces: Vec<char> = piece_sequence(seed, 14).chars().collect();
        for bag in pieces.chunks(7) {
            let mut bag = bag.to_vec();
            bag.sort_unstable();
            assert_eq!(bag, vec!['I', 'J', 'L', 'O', 'S', 'T', 'Z']);
        }
    }
}
