use std::fmt;
use std::marker::PhantomData;

use num_traits::{AsPrimitive, Zero};

use crate::dimension::{cartesian_product_size, check_non_negative, zip, Integer, MultiIndex};
use crate::error::{MResult, MultiArrayError};

/// Extents (and offset) of a multi-array, defining the coordinate to
/// linear-index mapping.
///
/// The layout is always Fortran order: axis 0 varies fastest, and the stride
/// of axis `i` is the product of the extents of axes `0..i`. A coordinate
/// `c` maps to `sum((c[i] + offset[i]) * stride[i])`.
pub trait Shape: Clone + fmt::Debug {
    type Int: Integer;
    type Index: MultiIndex<Int = Self::Int>;

    /// `Some(rank)` when the rank is known at compile time.
    const STATIC_RANK: Option<usize>;

    fn rank(&self) -> usize;

    fn extents(&self) -> Self::Index;

    fn offsets(&self) -> Self::Index;

    fn extent(&self, axis: usize) -> Self::Int;

    fn offset(&self, axis: usize) -> Self::Int;

    /// Cartesian product of the extents.
    fn size(&self) -> usize {
        (0..self.rank()).fold(1, |s, i| s * self.extent(i).as_())
    }

    fn is_at_origin(&self) -> bool {
        (0..self.rank()).all(|i| self.offset(i).is_zero())
    }

    fn to_linear(&self, coords: &[Self::Int]) -> usize {
        debug_assert_eq!(coords.len(), self.rank(), "wrong number of coordinates");
        let mut stride = 1;
        let mut linear = 0;
        for (axis, &c) in coords.iter().enumerate() {
            let extent = self.extent(axis);
            debug_assert!(
                c >= Self::Int::zero() && c < extent,
                "coordinate {} out of range for axis {} of extent {}",
                c,
                axis,
                extent
            );
            linear += (c.as_() + self.offset(axis).as_()) * stride;
            stride *= extent.as_();
        }
        linear
    }

    /// Length of storage needed to hold every addressed element. Equal to
    /// `size()` when the shape is at the origin.
    fn required_len(&self) -> usize {
        if self.size() == 0 {
            return 0;
        }
        let mut stride = 1;
        let mut last = 0;
        for axis in 0..self.rank() {
            let extent: usize = self.extent(axis).as_();
            last += (extent - 1 + self.offset(axis).as_()) * stride;
            stride *= extent;
        }
        last + 1
    }

    /// Replaces the extents and resets the offset to the origin.
    ///
    /// Fails with `ShiftedReshape` when the offset is not at the origin:
    /// reshaping a window would silently change what it looks at.
    fn reshape(&mut self, extents: Self::Index) -> MResult<()>;
}

/// Shape whose extents are decided at run time.
///
/// With `M = [I; R]` the rank is fixed at compile time; with `M = Vec<I>`
/// the rank is dynamic too.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DynShape<M> {
    extent: M,
    offset: M,
}

impl<M: MultiIndex> DynShape<M> {
    pub fn new(extent: M) -> MResult<Self> {
        check_non_negative(extent.as_slice())?;
        let offset = extent.zeroed();
        Ok(Self { extent, offset })
    }

    pub fn with_offset(extent: M, offset: M) -> MResult<Self> {
        if extent.rank() != offset.rank() {
            return Err(MultiArrayError::RankMismatch {
                expected: extent.rank(),
                got: offset.rank(),
            });
        }
        check_non_negative(extent.as_slice())?;
        check_non_negative(offset.as_slice())?;
        Ok(Self { extent, offset })
    }

    /// Extents already known to be non-negative.
    pub(crate) fn from_valid(extent: M) -> Self {
        let offset = extent.zeroed();
        Self { extent, offset }
    }

    pub fn extent_index(&self) -> &M {
        &self.extent
    }

    pub fn offset_index(&self) -> &M {
        &self.offset
    }
}

impl<M: MultiIndex> Shape for DynShape<M> {
    type Int = M::Int;
    type Index = M;

    const STATIC_RANK: Option<usize> = M::STATIC_RANK;

    #[inline]
    fn rank(&self) -> usize {
        self.extent.rank()
    }

    fn extents(&self) -> M {
        self.extent.clone()
    }

    fn offsets(&self) -> M {
        self.offset.clone()
    }

    #[inline]
    fn extent(&self, axis: usize) -> M::Int {
        self.extent.as_slice()[axis]
    }

    #[inline]
    fn offset(&self, axis: usize) -> M::Int {
        self.offset.as_slice()[axis]
    }

    fn size(&self) -> usize {
        cartesian_product_size(self.extent.as_slice())
    }

    fn is_at_origin(&self) -> bool {
        self.offset.is_zero()
    }

    fn to_linear(&self, coords: &[M::Int]) -> usize {
        debug_assert_eq!(coords.len(), self.rank(), "wrong number of coordinates");
        let mut stride = 1;
        let mut linear = 0;
        for ((&c, &e), &o) in zip(zip(coords, self.extent.as_slice()), self.offset.as_slice()) {
            debug_assert!(
                c >= M::Int::zero() && c < e,
                "coordinate {} out of range for extent {}",
                c,
                e
            );
            linear += (c.as_() + o.as_()) * stride;
            stride *= e.as_();
        }
        linear
    }

    fn reshape(&mut self, extents: M) -> MResult<()> {
        if !self.is_at_origin() {
            return Err(MultiArrayError::ShiftedReshape);
        }
        check_non_negative(extents.as_slice())?;
        tracing::trace!(
            "reshape {:?} -> {:?}",
            self.extent.as_slice(),
            extents.as_slice()
        );
        self.offset = extents.zeroed();
        self.extent = extents;
        Ok(())
    }
}

/// Compile-time extents of a [`FixedShape`].
///
/// `Buffer<T>` is the inline storage for one array of these extents, laid
/// out in Fortran order (`Dims2<A, B>` stores `[[T; A]; B]`).
pub trait FixedDims: Copy + Default + fmt::Debug + 'static {
    const RANK: usize;
    const EXTENTS: &'static [usize];
    const SIZE: usize;

    type Index: MultiIndex<Int = usize>;
    type Buffer<T>;

    fn index() -> Self::Index;

    /// Builds a buffer, `f` receiving the flat position of each element.
    fn buffer_from_fn<T, F: FnMut(usize) -> T>(f: F) -> Self::Buffer<T>;

    fn flatten<T>(buf: &Self::Buffer<T>) -> &[T];

    fn flatten_mut<T>(buf: &mut Self::Buffer<T>) -> &mut [T];
}

/// Rank 0: a scalar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dims0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dims1<const A: usize>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dims2<const A: usize, const B: usize>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dims3<const A: usize, const B: usize, const C: usize>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dims4<const A: usize, const B: usize, const C: usize, const D: usize>;

impl FixedDims for Dims0 {
    const RANK: usize = 0;
    const EXTENTS: &'static [usize] = &[];
    const SIZE: usize = 1;

    type Index = [usize; 0];
    type Buffer<T> = [T; 1];

    fn index() -> [usize; 0] {
        []
    }

    fn buffer_from_fn<T, F: FnMut(usize) -> T>(mut f: F) -> [T; 1] {
        [f(0)]
    }

    fn flatten<T>(buf: &[T; 1]) -> &[T] {
        buf
    }

    fn flatten_mut<T>(buf: &mut [T; 1]) -> &mut [T] {
        buf
    }
}

impl<const A: usize> FixedDims for Dims1<A> {
    const RANK: usize = 1;
    const EXTENTS: &'static [usize] = &[A];
    const SIZE: usize = A;

    type Index = [usize; 1];
    type Buffer<T> = [T; A];

    fn index() -> [usize; 1] {
        [A]
    }

    fn buffer_from_fn<T, F: FnMut(usize) -> T>(f: F) -> [T; A] {
        std::array::from_fn(f)
    }

    fn flatten<T>(buf: &[T; A]) -> &[T] {
        buf
    }

    fn flatten_mut<T>(buf: &mut [T; A]) -> &mut [T] {
        buf
    }
}

impl<const A: usize, const B: usize> FixedDims for Dims2<A, B> {
    const RANK: usize = 2;
    const EXTENTS: &'static [usize] = &[A, B];
    const SIZE: usize = A * B;

    type Index = [usize; 2];
    type Buffer<T> = [[T; A]; B];

    fn index() -> [usize; 2] {
        [A, B]
    }

    fn buffer_from_fn<T, F: FnMut(usize) -> T>(mut f: F) -> [[T; A]; B] {
        std::array::from_fn(|j| std::array::from_fn(|i| f(i + A * j)))
    }

    fn flatten<T>(buf: &[[T; A]; B]) -> &[T] {
        buf.as_flattened()
    }

    fn flatten_mut<T>(buf: &mut [[T; A]; B]) -> &mut [T] {
        buf.as_flattened_mut()
    }
}

impl<const A: usize, const B: usize, const C: usize> FixedDims for Dims3<A, B, C> {
    const RANK: usize = 3;
    const EXTENTS: &'static [usize] = &[A, B, C];
    const SIZE: usize = A * B * C;

    type Index = [usize; 3];
    type Buffer<T> = [[[T; A]; B]; C];

    fn index() -> [usize; 3] {
        [A, B, C]
    }

    fn buffer_from_fn<T, F: FnMut(usize) -> T>(mut f: F) -> [[[T; A]; B]; C] {
        std::array::from_fn(|k| {
            std::array::from_fn(|j| std::array::from_fn(|i| f(i + A * (j + B * k))))
        })
    }

    fn flatten<T>(buf: &[[[T; A]; B]; C]) -> &[T] {
        buf.as_flattened().as_flattened()
    }

    fn flatten_mut<T>(buf: &mut [[[T; A]; B]; C]) -> &mut [T] {
        buf.as_flattened_mut().as_flattened_mut()
    }
}

impl<const A: usize, const B: usize, const C: usize, const D: usize> FixedDims
    for Dims4<A, B, C, D>
{
    const RANK: usize = 4;
    const EXTENTS: &'static [usize] = &[A, B, C, D];
    const SIZE: usize = A * B * C * D;

    type Index = [usize; 4];
    type Buffer<T> = [[[[T; A]; B]; C]; D];

    fn index() -> [usize; 4] {
        [A, B, C, D]
    }

    fn buffer_from_fn<T, F: FnMut(usize) -> T>(mut f: F) -> [[[[T; A]; B]; C]; D] {
        std::array::from_fn(|l| {
            std::array::from_fn(|k| {
                std::array::from_fn(|j| {
                    std::array::from_fn(|i| f(i + A * (j + B * (k + C * l))))
                })
            })
        })
    }

    fn flatten<T>(buf: &[[[[T; A]; B]; C]; D]) -> &[T] {
        buf.as_flattened().as_flattened().as_flattened()
    }

    fn flatten_mut<T>(buf: &mut [[[[T; A]; B]; C]; D]) -> &mut [T] {
        buf.as_flattened_mut()
            .as_flattened_mut()
            .as_flattened_mut()
    }
}

/// Shape whose rank and extents are compile-time constants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FixedShape<E> {
    _dims: PhantomData<E>,
}

impl<E: FixedDims> FixedShape<E> {
    pub const RANK: usize = E::RANK;
    pub const SIZE: usize = E::SIZE;

    pub const fn new() -> Self {
        Self { _dims: PhantomData }
    }
}

impl<E: FixedDims> Shape for FixedShape<E> {
    type Int = usize;
    type Index = E::Index;

    const STATIC_RANK: Option<usize> = Some(E::RANK);

    #[inline]
    fn rank(&self) -> usize {
        E::RANK
    }

    fn extents(&self) -> E::Index {
        E::index()
    }

    fn offsets(&self) -> E::Index {
        E::index().zeroed()
    }

    #[inline]
    fn extent(&self, axis: usize) -> usize {
        E::EXTENTS[axis]
    }

    #[inline]
    fn offset(&self, _axis: usize) -> usize {
        0
    }

    #[inline]
    fn size(&self) -> usize {
        E::SIZE
    }

    #[inline]
    fn is_at_origin(&self) -> bool {
        true
    }

    #[inline]
    fn required_len(&self) -> usize {
        E::SIZE
    }

    fn reshape(&mut self, extents: E::Index) -> MResult<()> {
        if extents.as_slice() == E::EXTENTS {
            Ok(())
        } else {
            Err(MultiArrayError::FixedReshape {
                current: E::EXTENTS.to_vec(),
                requested: extents.to_usize_vec(),
            })
        }
    }
}
