use ::proptest::{
    arbitrary::StrategyFor,
    collection::{vec, VecStrategy},
    prelude::*,
    strategy::Map,
};

use crate::{Hash, Mmr};

impl Arbitrary for Mmr {
    /// The maximum number of leaves, `0` meaning the default of 64
    type Parameters = usize;
    type Strategy = Map<VecStrategy<StrategyFor<Hash>>, fn(Vec<Hash>) -> Self>;

    fn arbitrary_with(max_width: Self::Parameters) -> Self::Strategy {
        let max_width = match max_width {
            0 => 64,
            n => n,
        };

        vec(any::<Hash>(), 0..=max_width).prop_map(|values| values.into_iter().collect())
    }
}
