/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : GRU 单元的单步计算（单个 batch 行、单个时间步）
 *
 * 公式（与 ONNX GRU 算子一致，clip 缺省时不截断）:
 *   z_t = f(clip(x_t·Wz + h_{t-1}·Rz + Wbz + Rbz))                 # 更新门
 *   r_t = f(clip(x_t·Wr + h_{t-1}·Rr + Wbr + Rbr))                 # 重置门
 *   linear_before_reset = 0:
 *     n_t = g(clip(x_t·Wh + (r_t ⊙ h_{t-1})·Rh + Rbh + Wbh))       # 候选状态
 *   linear_before_reset = 1:
 *     n_t = g(clip(x_t·Wh + r_t ⊙ (h_{t-1}·Rh + Rbh) + Wbh))
 *   h_t = (1 - z_t) ⊙ n_t + z_t ⊙ h_{t-1}                          # 隐藏状态
 */

use super::activation::{ActivationFunc, TraitActivation};
use super::weights::{Gate, WeightSet};
use crate::utils::traits::float::GruFloat;
use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

pub(crate) struct GruCell<'w, T> {
    weights: WeightSet<'w, T>,
    gate_activation: ActivationFunc,
    candidate_activation: ActivationFunc,
    clip: Option<T>,
    linear_before_reset: bool,
}

impl<'w, T: GruFloat> GruCell<'w, T> {
    pub(crate) fn new(
        weights: WeightSet<'w, T>,
        gate_activation: ActivationFunc,
        candidate_activation: ActivationFunc,
        clip: Option<f32>,
        linear_before_reset: bool,
    ) -> Self {
        Self {
            weights,
            gate_activation,
            candidate_activation,
            clip: clip.map(T::from_param),
            linear_before_reset,
        }
    }

    pub(crate) const fn hidden_size(&self) -> usize {
        self.weights.hidden_size()
    }

    pub(crate) fn input_size(&self) -> usize {
        self.weights.input_size()
    }

    fn clip(&self, values: &mut Array1<T>) {
        if let Some(bound) = self.clip {
            values.mapv_inplace(|v| v.clip(bound));
        }
    }

    /// 更新门/重置门：`act_gate(clip(W·x + R·h + Wb + Rb))`
    fn gate(&self, gate: Gate, x: ArrayView1<'_, T>, h_prev: ArrayView1<'_, T>) -> Array1<T> {
        let mut pre = self.weights.w_gate(gate).dot(&x);
        pre += &self.weights.r_gate(gate).dot(&h_prev);
        if let Some(wb) = self.weights.w_bias(gate) {
            pre += &wb;
        }
        if let Some(rb) = self.weights.r_bias(gate) {
            pre += &rb;
        }
        self.clip(&mut pre);
        self.gate_activation.apply_inplace(pre.view_mut());
        pre
    }

    /// 候选状态的循环部分，重置门与循环偏置的先后取决于`linear_before_reset`
    fn candidate_recurrence(&self, reset: &Array1<T>, h_prev: ArrayView1<'_, T>) -> Array1<T> {
        let rh = self.weights.r_gate(Gate::Candidate);
        let rb = self.weights.r_bias(Gate::Candidate);
        if self.linear_before_reset {
            let mut recurrent = rh.dot(&h_prev);
            if let Some(rb) = rb {
                recurrent += &rb;
            }
            recurrent *= reset;
            recurrent
        } else {
            let gated = reset * &h_prev;
            let mut recurrent = rh.dot(&gated);
            if let Some(rb) = rb {
                recurrent += &rb;
            }
            recurrent
        }
    }

    /// 由`h_prev`与`x`计算下一时刻的隐藏状态，写入`h_next`。
    /// 维度已在内核入口校验过，此处不再检查。
    pub(crate) fn step(
        &self,
        x: ArrayView1<'_, T>,
        h_prev: ArrayView1<'_, T>,
        h_next: ArrayViewMut1<'_, T>,
    ) {
        let update = self.gate(Gate::Update, x, h_prev);
        let reset = self.gate(Gate::Reset, x, h_prev);

        let mut candidate = self.weights.w_gate(Gate::Candidate).dot(&x);
        if let Some(wb) = self.weights.w_bias(Gate::Candidate) {
            candidate += &wb;
        }
        candidate += &self.candidate_recurrence(&reset, h_prev);
        self.clip(&mut candidate);
        self.candidate_activation.apply_inplace(candidate.view_mut());

        Zip::from(h_next)
            .and(&update)
            .and(&candidate)
            .and(h_prev)
            .for_each(|h, &z, &n, &hp| {
                *h = (T::one() - z) * n + z * hp;
            });
    }

    pub(crate) fn gate_activation(&self) -> &ActivationFunc {
        &self.gate_activation
    }

    pub(crate) fn candidate_activation(&self) -> &ActivationFunc {
        &self.candidate_activation
    }
}

impl<T: GruFloat> std::fmt::Debug for GruCell<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GruCell")
            .field("input_size", &self.input_size())
            .field("hidden_size", &self.hidden_size())
            .field("gate_activation", &self.gate_activation.name())
            .field("candidate_activation", &self.candidate_activation.name())
            .field("clip", &self.clip)
            .field("linear_before_reset", &self.linear_before_reset)
            .finish()
    }
}
