/// Helper macro to create an [`Mmr`]
///
/// Each expression is converted with [`Hash::from_u64`] and appended in order
///
/// ```rust
/// # use mmr::*;
/// let mmr = mmr![1, 2, 3];
///
/// assert_eq!(mmr.width(), 3);
/// assert_eq!(mmr.leaf_value(4), Ok(Hash::from_u64(3)));
///
/// let empty = mmr![];
/// assert!(empty.is_empty());
/// ```
///
/// [`Mmr`]: crate::Mmr
/// [`Hash::from_u64`]: crate::Hash::from_u64
#[macro_export]
macro_rules! mmr {
    [] => {{ $crate::Mmr::new() }};
    [ $($e:expr),+ $(,)? ] => {{
        let mut mmr = $crate::Mmr::new();
        $( mmr.append($crate::Hash::from_u64($e)); )+
        mmr
    }};
}
