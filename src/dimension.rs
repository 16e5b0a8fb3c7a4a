use std::fmt;
use std::iter;

use num_traits::{AsPrimitive, PrimInt, Zero};

use crate::error::{MResult, MultiArrayError};

pub(crate) fn zip<I, J>(i: I, j: J) -> iter::Zip<I::IntoIter, J::IntoIter>
where
    I: IntoIterator,
    J: IntoIterator,
{
    i.into_iter().zip(j)
}

/// Integer type used for extents, offsets and coordinates.
///
/// The cartesian product of extents is always computed in `usize`; choosing
/// a type wide enough for it is up to the caller.
pub trait Integer:
    PrimInt + AsPrimitive<usize> + Default + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    fn from_usize(n: usize) -> Self;
}

macro_rules! impl_integer {
    ($($e:ident),*) => {
        $(impl Integer for $e {
            #[inline]
            fn from_usize(n: usize) -> Self {
                n as $e
            }
        })*
    };
}

impl_integer!(i32, i64, isize, u32, u64, usize);

/// Traversal order of a multi-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Axis 0 varies fastest (column-major).
    Fortran,
    /// The last axis varies fastest (row-major).
    C,
}

/// A tuple of integers: coordinates, extents or offsets.
///
/// `[I; N]` is the inline, fixed-rank form; `Vec<I>` is the heap-backed,
/// dynamic-rank form. Entries are read and written through `as_slice` /
/// `as_slice_mut` or directly with `[]`.
pub trait MultiIndex: Clone + PartialEq + fmt::Debug {
    type Int: Integer;

    /// `Some(rank)` when the rank is part of the type.
    const STATIC_RANK: Option<usize>;

    fn as_slice(&self) -> &[Self::Int];

    fn as_slice_mut(&mut self) -> &mut [Self::Int];

    fn from_slice(s: &[Self::Int]) -> MResult<Self>;

    #[inline]
    fn rank(&self) -> usize {
        self.as_slice().len()
    }

    /// Same rank as `self`, every entry zero.
    fn zeroed(&self) -> Self {
        let mut z = self.clone();
        z.as_slice_mut()
            .iter_mut()
            .for_each(|x| *x = Self::Int::zero());
        z
    }

    fn is_zero(&self) -> bool {
        self.as_slice().iter().all(|x| x.is_zero())
    }

    fn to_usize_vec(&self) -> Vec<usize> {
        self.as_slice().iter().map(|x| x.as_()).collect()
    }
}

impl<I: Integer, const N: usize> MultiIndex for [I; N] {
    type Int = I;

    const STATIC_RANK: Option<usize> = Some(N);

    #[inline]
    fn as_slice(&self) -> &[I] {
        self
    }

    #[inline]
    fn as_slice_mut(&mut self) -> &mut [I] {
        self
    }

    fn from_slice(s: &[I]) -> MResult<Self> {
        <[I; N]>::try_from(s).map_err(|_| MultiArrayError::RankMismatch {
            expected: N,
            got: s.len(),
        })
    }
}

impl<I: Integer> MultiIndex for Vec<I> {
    type Int = I;

    const STATIC_RANK: Option<usize> = None;

    #[inline]
    fn as_slice(&self) -> &[I] {
        self
    }

    #[inline]
    fn as_slice_mut(&mut self) -> &mut [I] {
        self
    }

    fn from_slice(s: &[I]) -> MResult<Self> {
        Ok(s.to_vec())
    }
}

/// Rejects negative entries of a signed multi-index.
pub(crate) fn check_non_negative<I: Integer>(extents: &[I]) -> MResult<()> {
    for (axis, &e) in extents.iter().enumerate() {
        if e < I::zero() {
            return Err(MultiArrayError::NegativeExtent {
                axis,
                value: e.to_i128().unwrap_or(i128::MIN),
            });
        }
    }
    Ok(())
}

/// Number of elements of a shape with these extents. `1` for rank 0.
#[inline]
pub fn cartesian_product_size<I: Integer>(extents: &[I]) -> usize {
    extents.iter().fold(1, |s, &a| s * a.as_())
}

#[inline]
fn increment_along<I, A>(extents: &[I], indices: &mut [I], axes: A) -> usize
where
    I: Integer,
    A: Iterator<Item = usize>,
{
    let rank = extents.len();
    debug_assert_eq!(indices.len(), rank);
    if rank == 0 {
        return 1;
    }
    if extents.iter().any(|e| e.is_zero()) {
        return rank;
    }
    let mut carries = 0;
    for ax in axes {
        indices[ax] = indices[ax] + I::one();
        if indices[ax] != extents[ax] {
            return carries;
        }
        indices[ax] = I::zero();
        carries += 1;
    }
    carries
}

/// Advances `indices` to the next coordinate with axis 0 varying fastest.
///
/// Returns the number of axes that wrapped around. A return value equal to
/// the rank means the whole range was exhausted and `indices` is back at the
/// origin. Rank 0 always returns 1.
pub fn increment_fortran_order<I: Integer>(extents: &[I], indices: &mut [I]) -> usize {
    increment_along(extents, indices, 0..extents.len())
}

/// Same as [`increment_fortran_order`], with the last axis varying fastest.
pub fn increment_c_order<I: Integer>(extents: &[I], indices: &mut [I]) -> usize {
    increment_along(extents, indices, (0..extents.len()).rev())
}

/// Generalization of the two above: `order[0]` is the fastest axis,
/// `order[rank-1]` the slowest. `order` must be a permutation of the axes.
pub fn increment_with_order<I: Integer>(extents: &[I], indices: &mut [I], order: &[usize]) -> usize {
    debug_assert_eq!(order.len(), extents.len());
    increment_along(extents, indices, order.iter().copied())
}

pub fn increment<I: Integer>(extents: &[I], indices: &mut [I], order: Order) -> usize {
    match order {
        Order::Fortran => increment_fortran_order(extents, indices),
        Order::C => increment_c_order(extents, indices),
    }
}

/// Flat position of `coords` in a Fortran-ordered block of `extents`.
pub fn linearize_fortran_order<I: Integer>(extents: &[I], coords: &[I]) -> usize {
    debug_assert_eq!(extents.len(), coords.len());
    zip(extents, coords)
        .rev()
        .fold(0, |acc, (&e, &c)| acc * e.as_() + c.as_())
}

/// Flat position of `coords` in a C-ordered block of `extents`.
pub fn linearize_c_order<I: Integer>(extents: &[I], coords: &[I]) -> usize {
    debug_assert_eq!(extents.len(), coords.len());
    zip(extents, coords).fold(0, |acc, (&e, &c)| acc * e.as_() + c.as_())
}

/// Inverse of [`linearize_fortran_order`]: repeated division by the extents
/// taken from axis 0 upwards.
pub fn delinearize_fortran_order<M: MultiIndex>(extents: &M, linear: usize) -> M {
    let mut res = extents.zeroed();
    let mut rest = linear;
    for (&e, r) in zip(extents.as_slice(), res.as_slice_mut()) {
        let div = e.as_();
        debug_assert!(div > 0, "cannot delinearize over a zero extent");
        *r = M::Int::from_usize(rest % div);
        rest /= div;
    }
    res
}

/// Inverse of [`linearize_c_order`].
pub fn delinearize_c_order<M: MultiIndex>(extents: &M, linear: usize) -> M {
    let mut res = extents.zeroed();
    let mut rest = linear;
    for (&e, r) in zip(extents.as_slice(), res.as_slice_mut()).rev() {
        let div = e.as_();
        debug_assert!(div > 0, "cannot delinearize over a zero extent");
        *r = M::Int::from_usize(rest % div);
        rest /= div;
    }
    res
}

/// Iterator over every coordinate of `extents`.
///
/// Rank 0 yields a single empty coordinate; any zero extent yields nothing.
#[derive(Clone, Debug)]
pub struct MultiIndexRange<M> {
    extents: M,
    current: M,
    remaining: usize,
    order: Order,
}

impl<M: MultiIndex> MultiIndexRange<M> {
    pub fn new(extents: M, order: Order) -> MultiIndexRange<M> {
        let remaining = cartesian_product_size(extents.as_slice());
        let current = extents.zeroed();
        Self {
            extents,
            current,
            remaining,
            order,
        }
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

impl<M: MultiIndex> Iterator for MultiIndexRange<M> {
    type Item = M;

    fn next(&mut self) -> Option<M> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.current.clone();
        self.remaining -= 1;
        if self.remaining > 0 {
            increment(
                self.extents.as_slice(),
                self.current.as_slice_mut(),
                self.order,
            );
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<M: MultiIndex> ExactSizeIterator for MultiIndexRange<M> {}

pub fn fortran_multi_index_range<M: MultiIndex>(extents: M) -> MultiIndexRange<M> {
    MultiIndexRange::new(extents, Order::Fortran)
}

pub fn c_multi_index_range<M: MultiIndex>(extents: M) -> MultiIndexRange<M> {
    MultiIndexRange::new(extents, Order::C)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_increment_fortran_order() {
        let dims = [2usize, 3];
        let mut is = [0usize, 0];
        assert_eq!(increment_fortran_order(&dims, &mut is), 0);
        assert_eq!(is, [1, 0]);
        assert_eq!(increment_fortran_order(&dims, &mut is), 1);
        assert_eq!(is, [0, 1]);

        let mut is = [1usize, 2];
        assert_eq!(increment_fortran_order(&dims, &mut is), 2);
        assert_eq!(is, [0, 0]);
    }

    #[test]
    fn test_increment_c_order() {
        let dims = [2i32, 3];
        let mut is = [0i32, 2];
        assert_eq!(increment_c_order(&dims, &mut is), 1);
        assert_eq!(is, [1, 0]);
        assert_eq!(increment_c_order(&dims, &mut is), 0);
        assert_eq!(is, [1, 1]);
    }

    #[test]
    fn test_increment_custom_order() {
        let dims = [2usize, 3, 4];
        let mut is = [1usize, 0, 3];
        // axis 2 fastest, then axis 0, then axis 1
        assert_eq!(increment_with_order(&dims, &mut is, &[2, 0, 1]), 2);
        assert_eq!(is, [0, 1, 0]);
    }

    #[test]
    fn test_increment_edge_cases() {
        let mut scalar: [usize; 0] = [];
        assert_eq!(increment_fortran_order(&[], &mut scalar), 1);
        assert_eq!(increment_c_order(&[], &mut scalar), 1);

        let dims = [3usize, 0, 2];
        let mut is = [0usize; 3];
        assert_eq!(increment_fortran_order(&dims, &mut is), 3);
    }

    #[test]
    fn test_delinearize() {
        let dims = [3usize, 2];
        assert_eq!(delinearize_fortran_order(&dims, 4), [1, 1]);
        assert_eq!(delinearize_fortran_order(&dims, 2), [2, 0]);
        assert_eq!(delinearize_c_order(&dims, 4), [2, 0]);
        assert_eq!(delinearize_c_order(&dims, 1), [0, 1]);

        let dyn_dims: Vec<u32> = vec![4, 3, 2];
        assert_eq!(delinearize_fortran_order(&dyn_dims, 17), vec![1, 1, 1]);
    }

    #[test]
    fn test_from_slice() {
        assert_eq!(<[usize; 2]>::from_slice(&[3, 4]).unwrap(), [3, 4]);
        assert_eq!(
            <[usize; 2]>::from_slice(&[3, 4, 5]),
            Err(MultiArrayError::RankMismatch {
                expected: 2,
                got: 3
            })
        );
        assert_eq!(Vec::<i64>::from_slice(&[1, 2, 3]).unwrap().rank(), 3);
    }

    #[test]
    fn test_check_non_negative() {
        assert!(check_non_negative(&[2i32, 0, 5]).is_ok());
        assert_eq!(
            check_non_negative(&[2i32, -1]),
            Err(MultiArrayError::NegativeExtent { axis: 1, value: -1 })
        );
    }

    #[test]
    fn test_range() {
        let all: Vec<[usize; 2]> = fortran_multi_index_range([2usize, 3]).collect();
        assert_eq!(all, vec![[0, 0], [1, 0], [0, 1], [1, 1], [0, 2], [1, 2]]);

        let all: Vec<[usize; 2]> = c_multi_index_range([2usize, 2]).collect();
        assert_eq!(all, vec![[0, 0], [0, 1], [1, 0], [1, 1]]);

        let scalar: Vec<[usize; 0]> = fortran_multi_index_range([]).collect();
        assert_eq!(scalar.len(), 1);

        assert_eq!(fortran_multi_index_range(vec![4usize, 0]).count(), 0);
        assert_eq!(fortran_multi_index_range(vec![4usize, 3, 2]).len(), 24);
    }

    proptest! {
        #[test]
        fn prop_fortran_round_trip(dims in prop::collection::vec(1usize..=5, 0..=4), seed in any::<usize>()) {
            let size = cartesian_product_size(&dims);
            let linear = seed % size;
            let coords = delinearize_fortran_order(&dims, linear);
            prop_assert_eq!(linearize_fortran_order(&dims, &coords), linear);
            for (c, d) in coords.iter().zip(dims.iter()) {
                prop_assert!(c < d);
            }
        }

        #[test]
        fn prop_c_round_trip(dims in prop::collection::vec(1usize..=5, 0..=4), seed in any::<usize>()) {
            let size = cartesian_product_size(&dims);
            let coords = delinearize_c_order(&dims, seed % size);
            prop_assert_eq!(delinearize_c_order(&dims, linearize_c_order(&dims, &coords)), coords);
        }

        #[test]
        fn prop_range_follows_linear_order(dims in prop::collection::vec(0usize..=4, 0..=4)) {
            let size = cartesian_product_size(&dims);
            let mut n = 0;
            for (i, is) in fortran_multi_index_range(dims.clone()).enumerate() {
                prop_assert_eq!(linearize_fortran_order(&dims, &is), i);
                n += 1;
            }
            prop_assert_eq!(n, size);
        }
    }
}
