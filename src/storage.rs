use std::fmt;
use std::mem;
use std::slice;

use crate::error::{MResult, MultiArrayError};
use crate::shape::FixedDims;

/// Capability class of a storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Length fixed at compile time, elements held inline.
    FixedSize,
    /// Owning, length chosen at construction and by `resize`.
    DynSize,
    /// Borrowed memory owned by someone else.
    View,
}

/// Flat, contiguous element buffer behind a multi-array.
///
/// Storage types opt into the capabilities they have by implementing
/// [`StorageMut`], [`Resize`], [`FixedSizeStorage`] or [`DynSizeStorage`].
pub trait Storage {
    type Elem;

    const KIND: StorageKind;

    fn as_slice(&self) -> &[Self::Elem];

    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn as_ptr(&self) -> *const Self::Elem {
        self.as_slice().as_ptr()
    }

    #[inline]
    fn iter(&self) -> slice::Iter<'_, Self::Elem> {
        self.as_slice().iter()
    }
}

pub trait StorageMut: Storage {
    fn as_mut_slice(&mut self) -> &mut [Self::Elem];

    #[inline]
    fn as_mut_ptr(&mut self) -> *mut Self::Elem {
        self.as_mut_slice().as_mut_ptr()
    }

    #[inline]
    fn iter_mut(&mut self) -> slice::IterMut<'_, Self::Elem> {
        self.as_mut_slice().iter_mut()
    }
}

/// Changing the number of elements.
///
/// Growing or shrinking owning storage invalidates raw pointers taken from
/// it. Views can only shrink; fixed-size storage only accepts its own length.
pub trait Resize: Storage {
    fn resize(&mut self, n: usize) -> MResult<()>;
}

pub trait FixedSizeStorage: StorageMut {
    const CAPACITY: usize;

    /// `f` receives the flat position of each element.
    fn from_fn<F: FnMut(usize) -> Self::Elem>(f: F) -> Self;
}

pub trait DynSizeStorage: StorageMut + Resize {
    fn from_elem(elem: Self::Elem, n: usize) -> Self;
}

pub fn is_fixed_size<S: Storage>() -> bool {
    S::KIND == StorageKind::FixedSize
}

pub fn is_dyn_size<S: Storage>() -> bool {
    S::KIND == StorageKind::DynSize
}

pub fn is_view<S: Storage>() -> bool {
    S::KIND == StorageKind::View
}

fn check_fixed_len(capacity: usize, n: usize) -> MResult<()> {
    if n == capacity {
        Ok(())
    } else {
        tracing::debug!("fixed storage of {} elements cannot hold {}", capacity, n);
        Err(MultiArrayError::SizeMismatch {
            storage: capacity,
            shape: n,
        })
    }
}

// Vec: owning, dynamic size

impl<T> Storage for Vec<T> {
    type Elem = T;

    const KIND: StorageKind = StorageKind::DynSize;

    #[inline]
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T> StorageMut for Vec<T> {
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl<T: Clone + Default> Resize for Vec<T> {
    fn resize(&mut self, n: usize) -> MResult<()> {
        tracing::trace!("resize storage {} -> {}", self.len(), n);
        Vec::resize(self, n, T::default());
        Ok(())
    }
}

impl<T: Clone + Default> DynSizeStorage for Vec<T> {
    fn from_elem(elem: T, n: usize) -> Self {
        vec![elem; n]
    }
}

// [T; N]: inline, fixed size

impl<T, const N: usize> Storage for [T; N] {
    type Elem = T;

    const KIND: StorageKind = StorageKind::FixedSize;

    #[inline]
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize> StorageMut for [T; N] {
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl<T, const N: usize> Resize for [T; N] {
    fn resize(&mut self, n: usize) -> MResult<()> {
        check_fixed_len(N, n)
    }
}

impl<T, const N: usize> FixedSizeStorage for [T; N] {
    const CAPACITY: usize = N;

    fn from_fn<F: FnMut(usize) -> T>(f: F) -> Self {
        std::array::from_fn(f)
    }
}

/// Inline buffer sized by compile-time extents `E`.
pub struct Inline<T, E: FixedDims> {
    buf: E::Buffer<T>,
}

impl<T, E: FixedDims> Inline<T, E> {
    pub fn into_inner(self) -> E::Buffer<T> {
        self.buf
    }
}

impl<T, E: FixedDims> Storage for Inline<T, E> {
    type Elem = T;

    const KIND: StorageKind = StorageKind::FixedSize;

    #[inline]
    fn as_slice(&self) -> &[T] {
        E::flatten(&self.buf)
    }
}

impl<T, E: FixedDims> StorageMut for Inline<T, E> {
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        E::flatten_mut(&mut self.buf)
    }
}

impl<T, E: FixedDims> Resize for Inline<T, E> {
    fn resize(&mut self, n: usize) -> MResult<()> {
        check_fixed_len(E::SIZE, n)
    }
}

impl<T, E: FixedDims> FixedSizeStorage for Inline<T, E> {
    const CAPACITY: usize = E::SIZE;

    fn from_fn<F: FnMut(usize) -> T>(f: F) -> Self {
        Self {
            buf: E::buffer_from_fn(f),
        }
    }
}

impl<T: Default, E: FixedDims> Default for Inline<T, E> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T: Clone, E: FixedDims> Clone for Inline<T, E> {
    fn clone(&self) -> Self {
        let src = self.as_slice();
        Self::from_fn(|i| src[i].clone())
    }
}

impl<T: PartialEq, E: FixedDims> PartialEq for Inline<T, E> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, E: FixedDims> Eq for Inline<T, E> {}

impl<T: fmt::Debug, E: FixedDims> fmt::Debug for Inline<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// Borrowed slices: non-owning views

/// Mutable, non-owning storage over memory owned elsewhere.
pub type MemoryView<'a, T> = &'a mut [T];

fn shrink_view(len: usize, n: usize) -> MResult<()> {
    if n > len {
        tracing::debug!("memory view of {} elements cannot grow to {}", len, n);
        return Err(MultiArrayError::ViewCapacityExceeded {
            capacity: len,
            requested: n,
        });
    }
    Ok(())
}

impl<'a, T> Storage for &'a [T] {
    type Elem = T;

    const KIND: StorageKind = StorageKind::View;

    #[inline]
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<'a, T> Resize for &'a [T] {
    fn resize(&mut self, n: usize) -> MResult<()> {
        shrink_view(self.len(), n)?;
        let whole: &'a [T] = *self;
        *self = &whole[..n];
        Ok(())
    }
}

impl<'a, T> Storage for &'a mut [T] {
    type Elem = T;

    const KIND: StorageKind = StorageKind::View;

    #[inline]
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<'a, T> StorageMut for &'a mut [T] {
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl<'a, T> Resize for &'a mut [T] {
    fn resize(&mut self, n: usize) -> MResult<()> {
        shrink_view(self.len(), n)?;
        let whole = mem::take(self);
        *self = &mut whole[..n];
        Ok(())
    }
}
