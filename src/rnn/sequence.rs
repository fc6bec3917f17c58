/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : 单个方向的时间步驱动
 *
 * 正向按 t = 0..T 遍历，反向按 t = T-1..0 遍历。每个时间步、每个 batch 行:
 * - t < sequence_lens[b]：用 GRU 单元更新 h_b，并把 h_b 写入输出 y[t, b]
 * - 否则：h_b 保持不变，y[t, b] 置零
 * 因此循环结束后 h_b 即为该行最后一次有效更新的结果（正向为 t = len-1，反向为 t = 0）。
 *
 * batch 行按`rows_per_task`切块后并行计算；块之间不共享可写数据，
 * 而`run_tasks`返回前所有块都已完成，t+1 步读取到的一定是完整的 h(t)。
 */

use super::activation::TraitActivation;
use super::cell::GruCell;
use super::direction::Direction;
use super::pool::PoolSession;
use crate::utils::traits::float::GruFloat;
use ndarray::{Array1, Array2, Array3, ArrayView2, ArrayView3, ArrayViewMut2, Axis};
use tracing::{debug, trace};

/// 单个方向遍历结束后的结果
#[derive(Debug)]
pub(crate) struct DirectionState<T> {
    /// [T, batch, hidden]，仅在需要完整输出序列时保留
    pub(crate) sequence: Option<Array3<T>>,
    /// [batch, hidden]
    pub(crate) final_hidden: Array2<T>,
}

pub(crate) struct SequenceDriver<'c, 'w, T> {
    cell: &'c GruCell<'w, T>,
    direction: Direction,
    sequence_lens: &'c [usize],
}

impl<'c, 'w, T: GruFloat> SequenceDriver<'c, 'w, T> {
    /// `direction`只能是单向（`Forward`或`Reverse`）
    pub(crate) fn new(
        cell: &'c GruCell<'w, T>,
        direction: Direction,
        sequence_lens: &'c [usize],
    ) -> Self {
        debug_assert!(direction != Direction::Bidirectional);
        Self {
            cell,
            direction,
            sequence_lens,
        }
    }

    fn time_order(&self, seq_len: usize) -> Vec<usize> {
        match self.direction {
            Direction::Reverse => (0..seq_len).rev().collect(),
            Direction::Forward | Direction::Bidirectional => (0..seq_len).collect(),
        }
    }

    /// - `x`: [T, batch, input]
    /// - `initial_hidden`: [batch, hidden]，缺省为零
    pub(crate) fn run(
        &self,
        session: &PoolSession<'_>,
        x: ArrayView3<'_, T>,
        initial_hidden: Option<ArrayView2<'_, T>>,
        keep_sequence: bool,
    ) -> DirectionState<T> {
        let (seq_len, batch_size, _) = x.dim();
        let hidden_size = self.cell.hidden_size();
        let rows_per_task = session.rows_per_task(batch_size);

        let mut hidden = match initial_hidden {
            Some(h0) => h0.to_owned(),
            None => Array2::zeros((batch_size, hidden_size)),
        };
        let mut sequence = keep_sequence.then(|| Array3::zeros((seq_len, batch_size, hidden_size)));

        debug!(
            direction = %self.direction,
            seq_len,
            batch_size,
            rows_per_task,
            gate_activation = self.cell.gate_activation().name(),
            candidate_activation = self.cell.candidate_activation().name(),
            "开始单向遍历"
        );

        for t in self.time_order(seq_len) {
            let y_t = sequence.as_mut().map(|y| y.index_axis_mut(Axis(0), t));
            self.step_all_rows(
                session,
                t,
                x.index_axis(Axis(0), t),
                hidden.view_mut(),
                y_t,
                rows_per_task,
            );
            trace!(direction = %self.direction, t, "时间步完成");
        }

        DirectionState {
            sequence,
            final_hidden: hidden,
        }
    }

    /// 一个时间步：切块、提交、等待全部完成
    fn step_all_rows(
        &self,
        session: &PoolSession<'_>,
        t: usize,
        x_t: ArrayView2<'_, T>,
        mut hidden: ArrayViewMut2<'_, T>,
        mut y_t: Option<ArrayViewMut2<'_, T>>,
        rows_per_task: usize,
    ) {
        let num_blocks = hidden.nrows().div_ceil(rows_per_task);
        let y_blocks: Vec<Option<ArrayViewMut2<'_, T>>> = match y_t.as_mut() {
            Some(y) => y.axis_chunks_iter_mut(Axis(0), rows_per_task).map(Some).collect(),
            None => (0..num_blocks).map(|_| None).collect(),
        };

        let tasks: Vec<_> = hidden
            .axis_chunks_iter_mut(Axis(0), rows_per_task)
            .zip(y_blocks)
            .enumerate()
            .map(|(block, (h_block, y_block))| {
                let row_start = block * rows_per_task;
                move || self.step_rows(t, row_start, x_t, h_block, y_block)
            })
            .collect();

        session.run_tasks(tasks);
    }

    /// 处理一个连续行块：`h_block`/`y_block`的第 0 行对应 batch 中的第`row_start`行
    fn step_rows(
        &self,
        t: usize,
        row_start: usize,
        x_t: ArrayView2<'_, T>,
        mut h_block: ArrayViewMut2<'_, T>,
        mut y_block: Option<ArrayViewMut2<'_, T>>,
    ) {
        let mut h_next = Array1::zeros(self.cell.hidden_size());
        for (local, mut h_row) in h_block.outer_iter_mut().enumerate() {
            let row = row_start + local;
            if t < self.sequence_lens[row] {
                self.cell.step(x_t.row(row), h_row.view(), h_next.view_mut());
                h_row.assign(&h_next);
                if let Some(y) = y_block.as_mut() {
                    y.row_mut(local).assign(&h_row);
                }
            } else if let Some(y) = y_block.as_mut() {
                // 超出有效长度：状态保持，输出置零
                y.row_mut(local).fill(T::zero());
            }
        }
    }
}
