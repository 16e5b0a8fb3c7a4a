use std::fmt;
use std::ops::{Index, IndexMut};
use std::slice;

use num_traits::{AsPrimitive, ToPrimitive, Zero};

use crate::dimension::{fortran_multi_index_range, Integer, MultiIndex};
use crate::error::{MResult, MultiArrayError};
use crate::shape::{DynShape, Dims2, FixedDims, FixedShape, Shape};
use crate::storage::{
    DynSizeStorage, FixedSizeStorage, Inline, Resize, Storage, StorageKind, StorageMut,
};

/// A dense N-dimensional array: a flat [`Storage`] interpreted through a
/// [`Shape`].
///
/// Elements are laid out in Fortran order: `ma.at(&[i, j])` of a 2×3 array
/// lives at flat position `i + 2 * j`. Outside of shifted views,
/// `storage.len() == shape.size()` holds after every operation.
///
/// Only views may carry a shifted shape. Their flat accessors (`as_slice`,
/// `iter`, `[]`, `Debug`) cover the whole borrowed buffer from the origin,
/// while `at` and equality only see the window.
#[derive(Clone)]
pub struct MultiArray<S, Sh> {
    data: S,
    shape: Sh,
}

fn check_fits<Sh: Shape>(kind: StorageKind, len: usize, shape: &Sh) -> MResult<()> {
    if !shape.is_at_origin() && kind != StorageKind::View {
        return Err(MultiArrayError::ShiftedOwner);
    }
    if shape.is_at_origin() {
        if len != shape.size() {
            return Err(MultiArrayError::SizeMismatch {
                storage: len,
                shape: shape.size(),
            });
        }
    } else if shape.required_len() > len {
        return Err(MultiArrayError::WindowOutOfBounds {
            required: shape.required_len(),
            storage: len,
        });
    }
    Ok(())
}

impl<S, Sh> MultiArray<S, Sh>
where
    S: Storage,
    Sh: Shape,
{
    /// Pairs a storage with a shape. The storage must hold exactly
    /// `shape.size()` elements. A shifted shape is only accepted over a view,
    /// which must reach every element the shape addresses.
    pub fn from_parts(data: S, shape: Sh) -> MResult<Self> {
        check_fits(S::KIND, data.len(), &shape)?;
        Ok(Self { data, shape })
    }

    pub fn into_parts(self) -> (S, Sh) {
        (self.data, self.shape)
    }

    pub fn into_storage(self) -> S {
        self.data
    }

    pub fn storage(&self) -> &S {
        &self.data
    }

    pub fn shape(&self) -> &Sh {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn size(&self) -> usize {
        self.shape.size()
    }

    pub fn extent(&self, axis: usize) -> Sh::Int {
        self.shape.extent(axis)
    }

    pub fn extents(&self) -> Sh::Index {
        self.shape.extents()
    }

    pub fn offset(&self, axis: usize) -> Sh::Int {
        self.shape.offset(axis)
    }

    pub fn as_slice(&self) -> &[S::Elem] {
        self.data.as_slice()
    }

    pub fn as_ptr(&self) -> *const S::Elem {
        self.data.as_ptr()
    }

    pub fn iter(&self) -> slice::Iter<'_, S::Elem> {
        self.data.iter()
    }

    /// Element at `coords`. Coordinates are range-checked in debug builds
    /// only.
    #[inline]
    pub fn at(&self, coords: &[Sh::Int]) -> &S::Elem {
        &self.data.as_slice()[self.shape.to_linear(coords)]
    }

    /// Checked variant of [`at`](Self::at).
    pub fn get(&self, coords: &[Sh::Int]) -> Option<&S::Elem> {
        if self.contains(coords) {
            self.data.as_slice().get(self.shape.to_linear(coords))
        } else {
            None
        }
    }

    fn contains(&self, coords: &[Sh::Int]) -> bool {
        coords.len() == self.rank()
            && coords
                .iter()
                .enumerate()
                .all(|(axis, &c)| c >= Sh::Int::zero() && c < self.extent(axis))
    }

    /// Read-only view over the same elements.
    pub fn view(&self) -> MultiArray<&[S::Elem], Sh> {
        MultiArray {
            data: self.data.as_slice(),
            shape: self.shape.clone(),
        }
    }

    /// Storage position and length of the block left when the trailing
    /// `fixed.len()` coordinates are fixed.
    fn sub_block(&self, fixed: &[Sh::Int]) -> MResult<(usize, usize)> {
        let rank = self.rank();
        if fixed.len() > rank {
            return Err(MultiArrayError::RankMismatch {
                expected: rank,
                got: fixed.len(),
            });
        }
        let kept = rank - fixed.len();
        let mut start = 0;
        let mut stride = 1;
        for axis in 0..rank {
            let extent: usize = self.extent(axis).as_();
            let c = if axis < kept {
                0
            } else {
                let c = fixed[axis - kept];
                if c < Sh::Int::zero() || c.as_() >= extent {
                    return Err(MultiArrayError::CoordinateOutOfRange {
                        axis,
                        coordinate: c.to_i128().unwrap_or(i128::MAX),
                        extent,
                    });
                }
                c.as_()
            };
            start += (c + self.offset(axis).as_()) * stride;
            stride *= extent;
        }
        let len = (0..kept).fold(1, |s, axis| s * self.extent(axis).as_());
        Ok((start, len))
    }

    fn sub_shape<M>(&self, kept: usize) -> MResult<DynShape<M>>
    where
        M: MultiIndex<Int = Sh::Int>,
    {
        let extents = self.shape.extents();
        DynShape::new(M::from_slice(&extents.as_slice()[..kept])?)
    }

    /// Read-only array of rank `rank - fixed.len()` obtained by fixing the
    /// trailing coordinates to `fixed`.
    ///
    /// The trailing axes vary slowest, so the remaining block is contiguous
    /// and shares storage with `self`. `M` picks the multi-index type of the
    /// result (`[I; K]` or `Vec<I>`).
    pub fn sub_array<M>(&self, fixed: &[Sh::Int]) -> MResult<MultiArray<&[S::Elem], DynShape<M>>>
    where
        M: MultiIndex<Int = Sh::Int>,
    {
        let (start, len) = self.sub_block(fixed)?;
        let shape = self.sub_shape(self.rank() - fixed.len())?;
        Ok(MultiArray {
            data: &self.data.as_slice()[start..start + len],
            shape,
        })
    }

    /// Contiguous elements along axis 0 once every other coordinate is
    /// fixed (`fixed` holds coordinates for axes `1..rank`).
    pub fn span(&self, fixed: &[Sh::Int]) -> MResult<&[S::Elem]> {
        check_span_rank(self.rank(), fixed.len())?;
        let (start, len) = self.sub_block(fixed)?;
        Ok(&self.data.as_slice()[start..start + len])
    }
}

fn check_span_rank(rank: usize, n_fixed: usize) -> MResult<()> {
    if rank == 0 {
        return Err(MultiArrayError::RankMismatch {
            expected: 1,
            got: 0,
        });
    }
    if n_fixed + 1 != rank {
        return Err(MultiArrayError::RankMismatch {
            expected: rank - 1,
            got: n_fixed,
        });
    }
    Ok(())
}

impl<S, Sh> MultiArray<S, Sh>
where
    S: StorageMut,
    Sh: Shape,
{
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [S::Elem] {
        self.data.as_mut_slice()
    }

    pub fn as_mut_ptr(&mut self) -> *mut S::Elem {
        self.data.as_mut_ptr()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, S::Elem> {
        self.data.iter_mut()
    }

    #[inline]
    pub fn at_mut(&mut self, coords: &[Sh::Int]) -> &mut S::Elem {
        let i = self.shape.to_linear(coords);
        &mut self.data.as_mut_slice()[i]
    }

    pub fn get_mut(&mut self, coords: &[Sh::Int]) -> Option<&mut S::Elem> {
        if self.contains(coords) {
            let i = self.shape.to_linear(coords);
            self.data.as_mut_slice().get_mut(i)
        } else {
            None
        }
    }

    pub fn fill(&mut self, value: S::Elem)
    where
        S::Elem: Clone,
    {
        self.data.as_mut_slice().fill(value)
    }

    /// Mutable view over the same elements. Writes through it land in
    /// `self`.
    pub fn view_mut(&mut self) -> MultiArray<&mut [S::Elem], Sh> {
        MultiArray {
            data: self.data.as_mut_slice(),
            shape: self.shape.clone(),
        }
    }

    /// Mutable counterpart of [`sub_array`](Self::sub_array).
    pub fn sub_array_mut<M>(
        &mut self,
        fixed: &[Sh::Int],
    ) -> MResult<MultiArray<&mut [S::Elem], DynShape<M>>>
    where
        M: MultiIndex<Int = Sh::Int>,
    {
        let (start, len) = self.sub_block(fixed)?;
        let shape = self.sub_shape(self.rank() - fixed.len())?;
        Ok(MultiArray {
            data: &mut self.data.as_mut_slice()[start..start + len],
            shape,
        })
    }

    pub fn span_mut(&mut self, fixed: &[Sh::Int]) -> MResult<&mut [S::Elem]> {
        check_span_rank(self.rank(), fixed.len())?;
        let (start, len) = self.sub_block(fixed)?;
        Ok(&mut self.data.as_mut_slice()[start..start + len])
    }
}

impl<S, Sh> MultiArray<S, Sh>
where
    S: Resize,
    Sh: Shape,
{
    /// Changes the extents and resizes the storage to match.
    ///
    /// Either both change or neither does: a shifted shape, a negative
    /// extent, a fixed shape asked for other extents or a view asked to grow
    /// leave the array untouched. Resizing owning storage invalidates raw
    /// pointers previously taken from it.
    pub fn reshape(&mut self, extents: Sh::Index) -> MResult<()> {
        let mut shape = self.shape.clone();
        if let Err(e) = shape.reshape(extents) {
            tracing::debug!("reshape rejected: {}", e);
            return Err(e);
        }
        self.data.resize(shape.size())?;
        self.shape = shape;
        Ok(())
    }
}

impl<'a, T, Sh: Shape> MultiArray<&'a mut [T], Sh> {
    /// Wraps memory owned outside of Rust without copying.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `shape.required_len()`
    /// elements for `'a`, properly aligned, and not accessed through any
    /// other pointer while the view is alive.
    pub unsafe fn from_raw_parts(ptr: *mut T, shape: Sh) -> Self {
        let data = slice::from_raw_parts_mut(ptr, shape.required_len());
        Self { data, shape }
    }
}

impl<S, M> MultiArray<S, DynShape<M>>
where
    S: DynSizeStorage,
    S::Elem: Clone + Default,
    M: MultiIndex,
{
    /// Owning array of the given extents, every element `Default`.
    ///
    /// Rank 0 allocates its single element.
    pub fn new(extents: M) -> MResult<Self> {
        Self::from_elem(S::Elem::default(), extents)
    }

    pub fn from_elem(elem: S::Elem, extents: M) -> MResult<Self> {
        let shape = DynShape::new(extents)?;
        tracing::trace!("allocate {} elements", shape.size());
        Ok(Self {
            data: S::from_elem(elem, shape.size()),
            shape,
        })
    }

    pub fn zeros(extents: M) -> MResult<Self>
    where
        S::Elem: Zero,
    {
        Self::from_elem(S::Elem::zero(), extents)
    }
}

impl<T, M: MultiIndex> MultiArray<Vec<T>, DynShape<M>> {
    /// Takes ownership of `v`, already in Fortran order.
    pub fn from_vec(v: Vec<T>, extents: M) -> MResult<Self> {
        Self::from_parts(v, DynShape::new(extents)?)
    }
}

impl<T: Clone, I: Integer> MultiArray<Vec<T>, DynShape<[I; 2]>> {
    /// Builds a matrix from its rows: `rows[i][j]` becomes element `(i, j)`.
    /// Rows of unequal length are rejected.
    pub fn from_rows(rows: Vec<Vec<T>>) -> MResult<Self> {
        let n_j = rows.first().map_or(0, Vec::len);
        for (row, r) in rows.iter().enumerate() {
            if r.len() != n_j {
                return Err(MultiArrayError::JaggedRows {
                    row,
                    expected: n_j,
                    got: r.len(),
                });
            }
        }
        let mut data = Vec::with_capacity(rows.len() * n_j);
        for j in 0..n_j {
            data.extend(rows.iter().map(|r| r[j].clone()));
        }
        Self::from_vec(data, [I::from_usize(rows.len()), I::from_usize(n_j)])
    }
}

impl<T> MultiArray<Vec<T>, DynShape<[usize; 1]>> {
    pub fn from_nested(v: Vec<T>) -> Self {
        let shape = DynShape::from_valid([v.len()]);
        Self { data: v, shape }
    }
}

impl<T: Clone> MultiArray<Vec<T>, DynShape<[usize; 2]>> {
    /// `rows[i][j]` becomes element `(i, j)`. Row lengths are equal by
    /// construction.
    pub fn from_nested<const N: usize>(rows: Vec<[T; N]>) -> Self {
        let mut data = Vec::with_capacity(rows.len() * N);
        for j in 0..N {
            data.extend(rows.iter().map(|r| r[j].clone()));
        }
        let shape = DynShape::from_valid([rows.len(), N]);
        Self { data, shape }
    }
}

impl<T: Clone> MultiArray<Vec<T>, DynShape<[usize; 3]>> {
    /// `blocks[i][j][k]` becomes element `(i, j, k)`.
    pub fn from_nested<const B: usize, const C: usize>(blocks: Vec<[[T; C]; B]>) -> Self {
        let mut data = Vec::with_capacity(blocks.len() * B * C);
        for k in 0..C {
            for j in 0..B {
                data.extend(blocks.iter().map(|b| b[j][k].clone()));
            }
        }
        let shape = DynShape::from_valid([blocks.len(), B, C]);
        Self { data, shape }
    }
}

impl<T, E: FixedDims> MultiArray<Inline<T, E>, FixedShape<E>> {
    pub const RANK: usize = E::RANK;
    pub const SIZE: usize = E::SIZE;

    pub const fn static_extent(axis: usize) -> usize {
        E::EXTENTS[axis]
    }

    /// `f` receives the flat (Fortran-order) position of each element.
    pub fn from_fn<F: FnMut(usize) -> T>(f: F) -> Self {
        Self {
            data: Inline::from_fn(f),
            shape: FixedShape::new(),
        }
    }

    pub fn from_elem(elem: T) -> Self
    where
        T: Clone,
    {
        Self::from_fn(|_| elem.clone())
    }
}

impl<T: Clone, const A: usize, const B: usize> MultiArray<Inline<T, Dims2<A, B>>, FixedShape<Dims2<A, B>>> {
    /// `rows[i][j]` becomes element `(i, j)`.
    pub fn from_rows(rows: [[T; B]; A]) -> Self {
        Self::from_fn(|flat| rows[flat % A][flat / A].clone())
    }
}

impl<T: Default, E: FixedDims> Default for MultiArray<Inline<T, E>, FixedShape<E>> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<S: Storage, Sh: Shape> Index<usize> for MultiArray<S, Sh> {
    type Output = S::Elem;

    #[inline]
    fn index(&self, i: usize) -> &S::Elem {
        &self.data.as_slice()[i]
    }
}

impl<S: StorageMut, Sh: Shape> IndexMut<usize> for MultiArray<S, Sh> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut S::Elem {
        &mut self.data.as_mut_slice()[i]
    }
}

impl<'a, S: Storage, Sh: Shape> IntoIterator for &'a MultiArray<S, Sh> {
    type Item = &'a S::Elem;
    type IntoIter = slice::Iter<'a, S::Elem>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<'a, S: StorageMut, Sh: Shape> IntoIterator for &'a mut MultiArray<S, Sh> {
    type Item = &'a mut S::Elem;
    type IntoIter = slice::IterMut<'a, S::Elem>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter_mut()
    }
}

/// Arrays are equal when their extents match and they hold equal elements
/// at every coordinate, whatever their storage or offset.
impl<S1, Sh1, S2, Sh2> PartialEq<MultiArray<S2, Sh2>> for MultiArray<S1, Sh1>
where
    S1: Storage,
    S2: Storage,
    Sh1: Shape,
    Sh2: Shape,
    S1::Elem: PartialEq<S2::Elem>,
{
    fn eq(&self, other: &MultiArray<S2, Sh2>) -> bool {
        let rank = self.rank();
        if rank != other.rank() {
            return false;
        }
        if (0..rank).any(|i| self.extent(i).as_() != other.extent(i).as_()) {
            return false;
        }
        if self.shape.is_at_origin() && other.shape.is_at_origin() {
            return self.as_slice() == other.as_slice();
        }
        let mut theirs = other.shape.extents().zeroed();
        fortran_multi_index_range(self.shape.extents()).all(|ours| {
            for (t, &o) in theirs.as_slice_mut().iter_mut().zip(ours.as_slice()) {
                *t = Sh2::Int::from_usize(o.as_());
            }
            *self.at(ours.as_slice()) == *other.at(theirs.as_slice())
        })
    }
}

impl<S, Sh> Eq for MultiArray<S, Sh>
where
    S: Storage,
    Sh: Shape,
    S::Elem: Eq,
{
}

impl<S, Sh> fmt::Debug for MultiArray<S, Sh>
where
    S: Storage,
    Sh: Shape,
    S::Elem: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("MultiArray");
        d.field("extents", &self.shape.extents().as_slice());
        if !self.shape.is_at_origin() {
            d.field("offsets", &self.shape.offsets().as_slice());
        }
        d.field("data", &self.as_slice()).finish()
    }
}
