use crate::errors::GruError;
use crate::utils::traits::float::GruFloat;
use ndarray::{ArrayView1, ArrayView2, Axis, s};

/// 门在权重矩阵（按行）与偏置向量中的顺序：更新门、重置门、候选状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Update = 0,
    Reset = 1,
    Candidate = 2,
}

/// 单个方向的权重（只读借用调用方的张量，不拷贝）
///
/// - `w`: [3·hidden, input]
/// - `r`: [3·hidden, hidden]
/// - `bias`: [6·hidden]，前半为输入侧偏置`Wb[zrh]`，后半为循环侧偏置`Rb[zrh]`；缺省视为全零
#[derive(Debug, Clone)]
pub struct WeightSet<'a, T> {
    w: ArrayView2<'a, T>,
    r: ArrayView2<'a, T>,
    bias: Option<ArrayView1<'a, T>>,
    hidden_size: usize,
}

impl<'a, T: GruFloat> WeightSet<'a, T> {
    pub fn new(
        w: ArrayView2<'a, T>,
        r: ArrayView2<'a, T>,
        bias: Option<ArrayView1<'a, T>>,
        hidden_size: usize,
    ) -> Result<Self, GruError> {
        let input_size = w.ncols();
        if w.nrows() != 3 * hidden_size {
            return Err(GruError::shape_mismatch(
                "W",
                &[3 * hidden_size, input_size],
                w.shape(),
            ));
        }
        if r.dim() != (3 * hidden_size, hidden_size) {
            return Err(GruError::shape_mismatch(
                "R",
                &[3 * hidden_size, hidden_size],
                r.shape(),
            ));
        }
        if let Some(b) = &bias {
            if b.len() != 6 * hidden_size {
                return Err(GruError::shape_mismatch("B", &[6 * hidden_size], b.shape()));
            }
        }
        Ok(Self {
            w,
            r,
            bias,
            hidden_size,
        })
    }

    pub fn input_size(&self) -> usize {
        self.w.ncols()
    }

    pub const fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn gate_rows(&self, gate: Gate) -> (usize, usize) {
        let start = gate as usize * self.hidden_size;
        (start, start + self.hidden_size)
    }

    /// 该门的输入权重块 [hidden, input]
    pub(crate) fn w_gate(&self, gate: Gate) -> ArrayView2<'_, T> {
        let (start, end) = self.gate_rows(gate);
        self.w.slice(s![start..end, ..])
    }

    /// 该门的循环权重块 [hidden, hidden]
    pub(crate) fn r_gate(&self, gate: Gate) -> ArrayView2<'_, T> {
        let (start, end) = self.gate_rows(gate);
        self.r.slice(s![start..end, ..])
    }

    pub(crate) fn w_bias(&self, gate: Gate) -> Option<ArrayView1<'_, T>> {
        let (start, end) = self.gate_rows(gate);
        self.bias.as_ref().map(|b| b.slice(s![start..end]))
    }

    pub(crate) fn r_bias(&self, gate: Gate) -> Option<ArrayView1<'_, T>> {
        let (start, end) = self.gate_rows(gate);
        let offset = 3 * self.hidden_size;
        self.bias
            .as_ref()
            .map(|b| b.slice(s![offset + start..offset + end]))
    }
}

/// 从 [D, 3H, I] / [D, 3H, H] / [D, 6H] 中取出第`direction`个方向的权重
pub(crate) fn weights_for_direction<'a, T: GruFloat>(
    w: ndarray::ArrayView3<'a, T>,
    r: ndarray::ArrayView3<'a, T>,
    bias: Option<ArrayView2<'a, T>>,
    direction: usize,
    hidden_size: usize,
) -> Result<WeightSet<'a, T>, GruError> {
    WeightSet::new(
        w.index_axis_move(Axis(0), direction),
        r.index_axis_move(Axis(0), direction),
        bias.map(|b| b.index_axis_move(Axis(0), direction)),
        hidden_size,
    )
}
