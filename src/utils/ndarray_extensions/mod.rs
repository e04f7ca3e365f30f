pub(crate) mod boolean;
pub(crate) mod shift;

use ndarray::*;
use ndarray_linalg::Norm;

/// L2 norm of every lane along `axis`.
pub fn norm(a: ArrayView2<f32>, axis: Axis) -> Array1<f32> {
    a.axis_iter(Axis(1 - axis.0)).map(|x| x.norm()).collect()
}

#[cfg(test)]
mod tests {
    use crate::utils::ndarray_extensions::norm;
    use ndarray::{arr1, arr2, Axis};
    use ndarray_linalg::close_l1;

    #[test]
    fn row_norms() {
        let a = arr2(&[[3., 4., 0.], [0., 0., 2.]]);
        close_l1(&norm(a.view(), Axis(1)), &arr1(&[5., 2.]), 1e-6);
        close_l1(&norm(a.view(), Axis(0)), &arr1(&[3., 4., 2.]), 1e-6);
    }
}
