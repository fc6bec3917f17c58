use super::sequence::DirectionState;
use crate::tensor::Tensor;
use crate::utils::traits::float::GruFloat;
use ndarray::{Array3, Array4, Axis};

/// 需要输出哪些张量。递推本身总会完整执行（最终状态依赖每一步）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GruOutputRequest {
    /// 完整输出序列`Y`
    pub y: bool,
    /// 最终隐藏状态`Y_h`
    pub y_h: bool,
}

impl Default for GruOutputRequest {
    fn default() -> Self {
        Self { y: true, y_h: true }
    }
}

impl GruOutputRequest {
    pub const fn final_state_only() -> Self {
        Self { y: false, y_h: true }
    }

    pub const fn sequence_only() -> Self {
        Self { y: true, y_h: false }
    }
}

/// GRU 的输出
#[derive(Debug, Clone, PartialEq)]
pub struct GruOutput<T> {
    /// [T, num_directions, batch, hidden]
    pub y: Option<Tensor<T>>,
    /// [num_directions, batch, hidden]
    pub y_h: Option<Tensor<T>>,
}

/// 把各方向的 [T, batch, hidden] 序列交织为 [T, direction, batch, hidden]，
/// 方向槽位顺序即`states`的顺序
pub(crate) fn write_sequence<T: GruFloat>(
    states: &[DirectionState<T>],
    seq_len: usize,
    batch_size: usize,
    hidden_size: usize,
) -> Tensor<T> {
    let mut y = Array4::zeros((seq_len, states.len(), batch_size, hidden_size));
    for (slot, state) in states.iter().enumerate() {
        if let Some(sequence) = &state.sequence {
            y.index_axis_mut(Axis(1), slot).assign(sequence);
        }
    }
    Tensor::from_array(y.into_dyn())
}

/// 各方向的最终隐藏状态叠成 [direction, batch, hidden]
pub(crate) fn write_final_hidden<T: GruFloat>(
    states: &[DirectionState<T>],
    batch_size: usize,
    hidden_size: usize,
) -> Tensor<T> {
    let mut y_h = Array3::zeros((states.len(), batch_size, hidden_size));
    for (slot, state) in states.iter().enumerate() {
        y_h.index_axis_mut(Axis(0), slot).assign(&state.final_hidden);
    }
    Tensor::from_array(y_h.into_dyn())
}
