use ndarray::{Array, ArrayD, IxDyn};
use rand::distributions::uniform::SampleUniform;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::utils::traits::float::GruFloat;

mod index;
mod print;
mod property;


/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 元素类型`T`为`f32`或`f64`（见`GruFloat`），默认`f32`。
/// 注：内部数据始终为标准（行优先、连续）布局。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor<T = f32> {
    data: ArrayD<T>,
}

impl<T: GruFloat> Tensor<T> {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则会panic。
    pub fn new(data: &[T], shape: &[usize]) -> Self {
        let expected: usize = shape.iter().product();
        assert!(
            data.len() == expected,
            "数据长度{}与形状{:?}（元素数{}）不一致",
            data.len(),
            shape,
            expected
        );
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec())
            .unwrap_or_else(|_| unreachable!("数据长度已校验"));
        Self { data }
    }

    /// 创建一个全零张量
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    /// 创建一个随机张量，其值在[min, max]的闭区间
    pub fn new_random(min: T, max: T, shape: &[usize]) -> Self
    where
        T: SampleUniform,
    {
        let mut rng = rand::thread_rng();
        let uniform = Uniform::new_inclusive(min, max);
        let data = (0..shape.iter().product::<usize>())
            .map(|_| uniform.sample(&mut rng))
            .collect::<Vec<_>>();
        Self::new(&data, shape)
    }

    /// 由`ndarray`数组构建张量，非标准布局的数组会被整理为标准布局
    pub fn from_array(array: ArrayD<T>) -> Self {
        let data = if array.is_standard_layout() {
            array
        } else {
            array.as_standard_layout().into_owned()
        };
        Self { data }
    }

    /// 以行优先顺序拷贝出所有元素
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().copied().collect()
    }
}
