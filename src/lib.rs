//! Dense N-dimensional arrays over pluggable storage.
//!
//! A [`MultiArray`] pairs a flat [`Storage`] with a [`Shape`]. Storage may be
//! inline and sized at compile time ([`Inline`]), an owned `Vec`, or memory
//! borrowed from elsewhere (`&[T]`, [`MemoryView`]). Shapes carry their rank
//! and extents either in the type ([`FixedShape`]) or at run time
//! ([`DynShape`]). Elements are always laid out in Fortran order.
//!
//! ```
//! use multiarray::{multi_array, utils};
//!
//! let mut m = multi_array![[1, 2, 3], [4, 5, 6]];
//! assert_eq!(*m.at(&[1, 2]), 6);
//! assert_eq!(utils::column(&m, 1).unwrap(), &[2, 5]);
//!
//! m.reshape([2, 4]).unwrap();
//! assert_eq!(m.size(), 8);
//! ```

#[macro_use]
mod macros;

pub mod array;
pub mod dimension;
pub mod error;
pub mod shape;
pub mod storage;
pub mod utils;

pub use array::MultiArray;
pub use dimension::{
    c_multi_index_range, cartesian_product_size, delinearize_c_order, delinearize_fortran_order,
    fortran_multi_index_range, increment, increment_c_order, increment_fortran_order,
    increment_with_order, linearize_c_order, linearize_fortran_order, Integer, MultiIndex,
    MultiIndexRange, Order,
};
pub use error::{MResult, MultiArrayError};
pub use shape::{Dims0, Dims1, Dims2, Dims3, Dims4, DynShape, FixedDims, FixedShape, Shape};
pub use storage::{
    is_dyn_size, is_fixed_size, is_view, DynSizeStorage, FixedSizeStorage, Inline, MemoryView,
    Resize, Storage, StorageKind, StorageMut,
};

/// Array whose rank and extents are compile-time constants, stored inline.
pub type FixedMultiArray<T, E> = MultiArray<Inline<T, E>, FixedShape<E>>;

/// Owning array of rank `R` with run-time extents of type `I`.
pub type DynMultiArray<T, const R: usize, I = usize> = MultiArray<Vec<T>, DynShape<[I; R]>>;

/// Mutable view of rank `R` over memory owned elsewhere.
pub type DynMultiArrayView<'a, T, const R: usize, I = usize> =
    MultiArray<MemoryView<'a, T>, DynShape<[I; R]>>;

pub type DynMultiArrayRef<'a, T, const R: usize, I = usize> =
    MultiArray<&'a [T], DynShape<[I; R]>>;

/// Owning array whose rank is decided at run time.
pub type DynRankMultiArray<T, I = usize> = MultiArray<Vec<T>, DynShape<Vec<I>>>;

pub type Array<T> = DynMultiArray<T, 1>;

pub type Matrix<T> = DynMultiArray<T, 2>;

pub type Cube<T> = DynMultiArray<T, 3>;
