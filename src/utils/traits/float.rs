use ndarray::LinalgScalar;
use num_traits::{Float, NumAssign};
use std::fmt::{Debug, Display};

/// GRU 内核支持的元素类型（目前为`f32`与`f64`），两者共用同一份算法实现。
///
/// 激活函数参数、clip 阈值等配置项统一以`f32`保存，计算时再经`from_param`转为元素类型。
pub trait GruFloat:
    Float + NumAssign + LinalgScalar + Default + Debug + Display + Send + Sync
{
    fn from_param(value: f32) -> Self;

    /// 把数值限制在`[-bound, bound]`内
    fn clip(self, bound: Self) -> Self {
        self.max(-bound).min(bound)
    }
}

impl GruFloat for f32 {
    fn from_param(value: f32) -> Self {
        value
    }
}

impl GruFloat for f64 {
    fn from_param(value: f32) -> Self {
        f64::from(value)
    }
}
