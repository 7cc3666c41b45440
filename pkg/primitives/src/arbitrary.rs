use ::proptest::{arbitrary::StrategyFor, prelude::*, strategy::Map};

use crate::Hash;

impl Arbitrary for Hash {
    type Strategy = Map<StrategyFor<[u8; 32]>, fn([u8; 32]) -> Self>;
    type Parameters = ();

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        any::<[u8; 32]>().prop_map(Hash)
    }
}
