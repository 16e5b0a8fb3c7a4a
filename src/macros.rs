/// Builds an owning array from a nested literal of rank 1, 2 or 3.
///
/// `multi_array![[a, b, c], [d, e, f]]` is the 2×3 matrix whose element
/// `(i, j)` is row `i`, column `j` of the literal. Rows must have equal
/// length: a jagged literal does not type-check.
#[macro_export]
macro_rules! multi_array {
    ($([$([$($x:expr),* $(,)*]),+ $(,)*]),+ $(,)*) => {{
        $crate::Cube::from_nested(vec![$([$([$($x,)*],)*],)*])
    }};
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {{
        $crate::Matrix::from_nested(vec![$([$($x,)*],)*])
    }};
    ($($x:expr),* $(,)*) => {{
        $crate::Array::from_nested(vec![$($x,)*])
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_multi_array_macro() {
        let v = multi_array![1, 2, 3];
        assert_eq!(v.extents(), [3]);
        assert_eq!(*v.at(&[2]), 3);

        let m = multi_array![[1, 2, 3], [4, 5, 6]];
        assert_eq!(m.extents(), [2, 3]);
        assert_eq!(*m.at(&[1, 0]), 4);
        assert_eq!(m.as_slice(), &[1, 4, 2, 5, 3, 6]);

        let c = multi_array![[[1, 2], [3, 4], [5, 6]], [[7, 8], [9, 10], [11, 12]]];
        assert_eq!(c.extents(), [2, 3, 2]);
        assert_eq!(*c.at(&[0, 0, 1]), 2);
        assert_eq!(*c.at(&[1, 2, 0]), 11);
        assert_eq!(c.span(&[1, 1]).unwrap(), &[4, 10]);
    }
}
