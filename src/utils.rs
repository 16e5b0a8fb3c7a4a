//! Free functions layered on top of [`MultiArray`].

use std::fmt;

use num_traits::AsPrimitive;

use crate::array::MultiArray;
use crate::dimension::{Integer, MultiIndex};
use crate::error::{MResult, MultiArrayError};
use crate::shape::{DynShape, Shape};
use crate::storage::{Resize, Storage, StorageMut};

/// Read-only array sharing storage and shape with `ma`.
pub fn make_view<S: Storage, Sh: Shape>(ma: &MultiArray<S, Sh>) -> MultiArray<&[S::Elem], Sh> {
    ma.view()
}

pub fn make_view_mut<S: StorageMut, Sh: Shape>(
    ma: &mut MultiArray<S, Sh>,
) -> MultiArray<&mut [S::Elem], Sh> {
    ma.view_mut()
}

/// Lower-rank array aliasing the block of `ma` whose trailing coordinates
/// are `fixed`.
pub fn make_sub_array<'a, M, S, Sh>(
    ma: &'a MultiArray<S, Sh>,
    fixed: &[Sh::Int],
) -> MResult<MultiArray<&'a [S::Elem], DynShape<M>>>
where
    S: Storage,
    Sh: Shape,
    M: MultiIndex<Int = Sh::Int>,
{
    ma.sub_array(fixed)
}

pub fn make_sub_array_mut<'a, M, S, Sh>(
    ma: &'a mut MultiArray<S, Sh>,
    fixed: &[Sh::Int],
) -> MResult<MultiArray<&'a mut [S::Elem], DynShape<M>>>
where
    S: StorageMut,
    Sh: Shape,
    M: MultiIndex<Int = Sh::Int>,
{
    ma.sub_array_mut(fixed)
}

/// Elements along axis 0 with axes `1..rank` fixed to `fixed`.
pub fn make_span<'a, S: Storage, Sh: Shape>(
    ma: &'a MultiArray<S, Sh>,
    fixed: &[Sh::Int],
) -> MResult<&'a [S::Elem]> {
    ma.span(fixed)
}

pub fn make_span_mut<'a, S: StorageMut, Sh: Shape>(
    ma: &'a mut MultiArray<S, Sh>,
    fixed: &[Sh::Int],
) -> MResult<&'a mut [S::Elem]> {
    ma.span_mut(fixed)
}

fn check_matrix(rank: usize) -> MResult<()> {
    if rank != 2 {
        return Err(MultiArrayError::RankMismatch {
            expected: 2,
            got: rank,
        });
    }
    Ok(())
}

/// Column `j` of a matrix.
pub fn column<S: Storage, Sh: Shape>(ma: &MultiArray<S, Sh>, j: Sh::Int) -> MResult<&[S::Elem]> {
    check_matrix(ma.rank())?;
    ma.span(&[j])
}

pub fn column_mut<S: StorageMut, Sh: Shape>(
    ma: &mut MultiArray<S, Sh>,
    j: Sh::Int,
) -> MResult<&mut [S::Elem]> {
    check_matrix(ma.rank())?;
    ma.span_mut(&[j])
}

pub fn reshape<S: Resize, Sh: Shape>(ma: &mut MultiArray<S, Sh>, extents: Sh::Index) -> MResult<()> {
    ma.reshape(extents)
}

/// `true` when `ma` holds no element. Rank 0 arrays are never empty.
pub fn is_empty<S: Storage, Sh: Shape>(ma: &MultiArray<S, Sh>) -> bool {
    ma.size() == 0
}

/// Renders rank 0 as `[x]`, rank 1 as `[a,b,c]` and rank 2 row by row as
/// `[a,b;c,d]`. Arrays without elements render as `[]`.
///
/// Higher ranks are not supported and return `NotImplemented`.
pub fn to_string<S, Sh>(ma: &MultiArray<S, Sh>) -> MResult<String>
where
    S: Storage,
    Sh: Shape,
    S::Elem: fmt::Display,
{
    let rank = ma.rank();
    if rank > 2 {
        return Err(format!(
            "to_string implemented only for rank 0, 1 and 2, not for rank {}",
            rank
        )
        .into());
    }
    // rows along axis 0 for a matrix, a single row otherwise
    let (n_i, n_j): (usize, usize) = match rank {
        0 => (1, 1),
        1 => (1, ma.extent(0).as_()),
        _ => (ma.extent(0).as_(), ma.extent(1).as_()),
    };
    let mut s = String::from("[");
    if ma.size() > 0 {
        let mut coords = ma.extents().zeroed();
        for i in 0..n_i {
            if i > 0 {
                s.push(';');
            }
            for j in 0..n_j {
                if j > 0 {
                    s.push(',');
                }
                let c = coords.as_slice_mut();
                match rank {
                    0 => {}
                    1 => c[0] = Sh::Int::from_usize(j),
                    _ => {
                        c[0] = Sh::Int::from_usize(i);
                        c[1] = Sh::Int::from_usize(j);
                    }
                }
                s.push_str(&ma.at(coords.as_slice()).to_string());
            }
        }
    }
    s.push(']');
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::fortran_multi_index_range;
    use crate::shape::{Dims0, Dims2};
    use crate::{DynMultiArray, DynRankMultiArray, FixedMultiArray};

    fn matrix() -> DynMultiArray<i32, 2> {
        multi_array![[1, 2, 3], [4, 5, 6]]
    }

    fn cube() -> DynMultiArray<f64, 3> {
        let mut ma: DynMultiArray<f64, 3> = MultiArray::new([4, 3, 2]).unwrap();
        for is in fortran_multi_index_range(ma.extents()) {
            *ma.at_mut(&is) = (100 * is[0] + 10 * is[1] + is[2]) as f64;
        }
        ma
    }

    #[test]
    fn test_make_view() {
        let mut ma = matrix();
        {
            let v = make_view(&ma);
            assert_eq!(v.extents(), [2, 3]);
            assert_eq!(v, ma);
        }
        {
            let mut v = make_view_mut(&mut ma);
            *v.at_mut(&[1, 1]) = 50;
        }
        assert_eq!(*ma.at(&[1, 1]), 50);
    }

    #[test]
    fn test_make_sub_array() {
        let ma = matrix();
        for j in 0..3 {
            let sub: MultiArray<&[i32], DynShape<[usize; 1]>> = make_sub_array(&ma, &[j]).unwrap();
            assert_eq!(sub.size(), 2);
            assert_eq!(*sub.at(&[0]), *ma.at(&[0, j]));
            assert_eq!(*sub.at(&[1]), *ma.at(&[1, j]));
        }

        let ma = cube();
        let sub_11: MultiArray<&[f64], DynShape<[usize; 1]>> = make_sub_array(&ma, &[1, 1]).unwrap();
        assert_eq!(sub_11.as_slice(), &[11., 111., 211., 311.]);
    }

    #[test]
    fn test_make_sub_array_mut() {
        let mut ma = cube();
        {
            let mut plane: MultiArray<&mut [f64], DynShape<[usize; 2]>> =
                make_sub_array_mut(&mut ma, &[0]).unwrap();
            plane.fill(0.);
        }
        assert!(ma.span(&[2, 0]).unwrap().iter().all(|&x| x == 0.));
        assert_eq!(ma.span(&[2, 1]).unwrap(), &[21., 121., 221., 321.]);
    }

    #[test]
    fn test_make_span() {
        let mut ma = cube();
        assert_eq!(make_span(&ma, &[0, 1]).unwrap(), &[1., 101., 201., 301.]);
        make_span_mut(&mut ma, &[0, 1]).unwrap()[0] = -1.;
        assert_eq!(*ma.at(&[0, 0, 1]), -1.);

        let scalar: DynMultiArray<f64, 0> = MultiArray::new([]).unwrap();
        assert_eq!(
            make_span(&scalar, &[]).unwrap_err(),
            MultiArrayError::RankMismatch {
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn test_column() {
        let mut ma = matrix();
        assert_eq!(column(&ma, 1).unwrap(), &[2, 5]);
        column_mut(&mut ma, 2).unwrap()[1] = 60;
        assert_eq!(*ma.at(&[1, 2]), 60);
        assert_eq!(
            column(&cube(), 0).unwrap_err(),
            MultiArrayError::RankMismatch {
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn test_reshape() {
        let mut ma: DynMultiArray<i32, 2> = MultiArray::new([3, 4]).unwrap();
        reshape(&mut ma, [3, 6]).unwrap();
        assert_eq!(ma.size(), 18);

        let mut dyn_rank: DynRankMultiArray<i32> = MultiArray::new(vec![3, 4]).unwrap();
        reshape(&mut dyn_rank, vec![2, 2, 2]).unwrap();
        assert_eq!(dyn_rank.rank(), 3);
        assert_eq!(dyn_rank.as_slice().len(), 8);
    }

    #[test]
    fn test_is_empty() {
        let ma: DynMultiArray<i32, 2> = MultiArray::new([3, 0]).unwrap();
        assert!(is_empty(&ma));
        assert!(!is_empty(&matrix()));
        assert!(!is_empty(&FixedMultiArray::<i32, Dims0>::default()));
    }

    #[test]
    fn test_to_string() {
        assert_eq!(to_string(&matrix()).unwrap(), "[1,2,3;4,5,6]");

        let v = multi_array![7, 8, 9];
        assert_eq!(to_string(&v).unwrap(), "[7,8,9]");

        let mut s = FixedMultiArray::<i32, Dims0>::default();
        *s.at_mut(&[]) = 42;
        assert_eq!(to_string(&s).unwrap(), "[42]");

        let f = FixedMultiArray::<i32, Dims2<2, 2>>::from_rows([[1, 2], [3, 4]]);
        assert_eq!(to_string(&f).unwrap(), "[1,2;3,4]");

        let empty: DynMultiArray<i32, 2> = MultiArray::new([2, 0]).unwrap();
        assert_eq!(to_string(&empty).unwrap(), "[]");

        let single = multi_array![5];
        assert_eq!(to_string(&single).unwrap(), "[5]");

        let backing = [1, 2, 3, 4, 5];
        let window: MultiArray<&[i32], DynShape<[usize; 1]>> =
            MultiArray::from_parts(&backing[..], DynShape::with_offset([3], [1]).unwrap()).unwrap();
        assert_eq!(to_string(&window).unwrap(), "[2,3,4]");

        assert_eq!(
            to_string(&cube()).unwrap_err(),
            MultiArrayError::NotImplemented(
                "to_string implemented only for rank 0, 1 and 2, not for rank 3".to_string()
            )
        );
    }
}
