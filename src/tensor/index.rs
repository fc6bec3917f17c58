use super::Tensor;
use crate::utils::traits::float::GruFloat;
use std::ops::Index;

// 引用式索引：`tensor[[t, d, b, h]]`
impl<T: GruFloat, const N: usize> Index<[usize; N]> for Tensor<T> {
    type Output = T;

    fn index(&self, indices: [usize; N]) -> &Self::Output {
        &self.data[&indices[..]]
    }
}
