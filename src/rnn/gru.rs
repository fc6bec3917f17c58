/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : GRU 前向推理内核（对应 ONNX GRU 算子的 CPU 实现）
 *
 * 输入:
 *   X              [T, batch, input]
 *   W              [D, 3·hidden, input]     # 门顺序：更新门、重置门、候选状态
 *   R              [D, 3·hidden, hidden]
 *   B              [D, 6·hidden]            # 可选，缺省为零
 *   sequence_lens  [batch]                  # 可选，缺省每行均为 T
 *   initial_h      [D, batch, hidden]       # 可选，缺省为零
 * 输出:
 *   Y              [T, D, batch, hidden]    # 超出有效长度的位置为零
 *   Y_h            [D, batch, hidden]       # 每行最后一次有效更新后的隐藏状态
 *
 * 双向时正向、反向两次遍历互不共享可写状态，在同一次调用内依次执行，
 * 各自内部按 batch 并行；正向占方向槽位 0，反向占槽位 1。
 *
 * 并发调用约定：同一`DeepGru`实例（或共享同一`WorkerPool`的多个实例）上的多次`compute`
 * 整体串行执行，见`WorkerPool::session`。
 */

use super::cell::GruCell;
use super::config::GruConfig;
use super::output::{GruOutput, GruOutputRequest, write_final_hidden, write_sequence};
use super::pool::WorkerPool;
use super::sequence::SequenceDriver;
use super::weights::weights_for_direction;
use crate::errors::{ComparisonOperator, GruError};
use crate::tensor::Tensor;
use crate::utils::traits::float::GruFloat;
use ndarray::{ArrayViewD, Axis, Dimension, Ix2, Ix3};
use tracing::debug;

/// 一次调用的输入，全部只读借用调用方的数据
#[derive(Debug, Clone, Copy)]
pub struct GruInputs<'a, T> {
    pub x: &'a Tensor<T>,
    pub w: &'a Tensor<T>,
    pub r: &'a Tensor<T>,
    pub b: Option<&'a Tensor<T>>,
    pub sequence_lens: Option<&'a [i64]>,
    pub initial_h: Option<&'a Tensor<T>>,
}

impl<'a, T> GruInputs<'a, T> {
    pub fn new(x: &'a Tensor<T>, w: &'a Tensor<T>, r: &'a Tensor<T>) -> Self {
        Self {
            x,
            w,
            r,
            b: None,
            sequence_lens: None,
            initial_h: None,
        }
    }

    pub fn with_bias(mut self, b: &'a Tensor<T>) -> Self {
        self.b = Some(b);
        self
    }

    pub fn with_sequence_lens(mut self, sequence_lens: &'a [i64]) -> Self {
        self.sequence_lens = Some(sequence_lens);
        self
    }

    pub fn with_initial_h(mut self, initial_h: &'a Tensor<T>) -> Self {
        self.initial_h = Some(initial_h);
        self
    }
}

/// 由`X`推出的维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InputDims {
    seq_len: usize,
    batch_size: usize,
    input_size: usize,
}

/// GRU 前向推理内核。配置在构建时校验完毕，线程池在实例的整个生命周期内复用
#[derive(Debug)]
pub struct DeepGru {
    config: GruConfig,
    pool: WorkerPool,
}

impl DeepGru {
    pub fn new(config: GruConfig, pool: WorkerPool) -> Self {
        debug!(
            direction = %config.direction(),
            hidden_size = config.hidden_size(),
            linear_before_reset = config.linear_before_reset(),
            clip = ?config.clip(),
            activations = ?config.activations().names(),
            num_threads = pool.num_threads(),
            "构建 GRU 内核"
        );
        Self { config, pool }
    }

    /// 使用默认线程池（每个可用核一个线程）
    pub fn with_default_pool(config: GruConfig) -> Result<Self, GruError> {
        Ok(Self::new(config, WorkerPool::with_defaults()?))
    }

    pub const fn config(&self) -> &GruConfig {
        &self.config
    }

    pub const fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// 执行一次前向计算。任何输入错误都会在提交任务前返回，不产生部分输出
    pub fn compute<T: GruFloat>(
        &self,
        inputs: &GruInputs<'_, T>,
        request: GruOutputRequest,
    ) -> Result<GruOutput<T>, GruError> {
        let dims = self.validate_shapes(inputs)?;
        let sequence_lens = Self::resolve_sequence_lens(inputs.sequence_lens, dims)?;

        let hidden_size = self.config.hidden_size();
        let x = to_fixed::<T, Ix3>("X", inputs.x.view())?;
        let w = to_fixed::<T, Ix3>("W", inputs.w.view())?;
        let r = to_fixed::<T, Ix3>("R", inputs.r.view())?;
        let b = inputs
            .b
            .map(|b| to_fixed::<T, Ix2>("B", b.view()))
            .transpose()?;
        let initial_h = inputs
            .initial_h
            .map(|h| to_fixed::<T, Ix3>("initial_h", h.view()))
            .transpose()?;

        debug!(
            direction = %self.config.direction(),
            seq_len = dims.seq_len,
            batch_size = dims.batch_size,
            input_size = dims.input_size,
            hidden_size,
            "开始 GRU 前向计算"
        );

        let session = self.pool.session();
        let mut states = Vec::with_capacity(self.config.num_directions());
        for (slot, &pass) in self.config.direction().passes().iter().enumerate() {
            let weights = weights_for_direction(w, r, b, slot, hidden_size)?;
            let (gate, candidate) = self.config.activations().for_direction(slot).ok_or_else(
                || GruError::invalid_attribute("activations", format!("缺少方向{slot}的激活函数")),
            )?;
            let cell = GruCell::new(
                weights,
                *gate,
                *candidate,
                self.config.clip(),
                self.config.linear_before_reset(),
            );
            let driver = SequenceDriver::new(&cell, pass, &sequence_lens);
            let h0 = initial_h.map(|h| h.index_axis_move(Axis(0), slot));
            states.push(driver.run(&session, x, h0, request.y));
        }
        drop(session);

        Ok(GruOutput {
            y: request
                .y
                .then(|| write_sequence(&states, dims.seq_len, dims.batch_size, hidden_size)),
            y_h: request
                .y_h
                .then(|| write_final_hidden(&states, dims.batch_size, hidden_size)),
        })
    }

    fn validate_shapes<T: GruFloat>(&self, inputs: &GruInputs<'_, T>) -> Result<InputDims, GruError> {
        let x_shape = inputs.x.shape();
        if x_shape.len() != 3 {
            return Err(GruError::RankMismatch {
                name: "X".to_string(),
                expected: 3,
                got: x_shape.to_vec(),
            });
        }
        let dims = InputDims {
            seq_len: x_shape[0],
            batch_size: x_shape[1],
            input_size: x_shape[2],
        };

        let num_directions = self.config.num_directions();
        let hidden_size = self.config.hidden_size();
        check_shape(
            "W",
            inputs.w,
            &[num_directions, 3 * hidden_size, dims.input_size],
        )?;
        check_shape("R", inputs.r, &[num_directions, 3 * hidden_size, hidden_size])?;
        if let Some(b) = inputs.b {
            check_shape("B", b, &[num_directions, 6 * hidden_size])?;
        }
        if let Some(h) = inputs.initial_h {
            check_shape("initial_h", h, &[num_directions, dims.batch_size, hidden_size])?;
        }
        Ok(dims)
    }

    /// 缺省时每行均为`T`；否则长度须等于 batch，且每个值都在`1..=T`内
    fn resolve_sequence_lens(
        sequence_lens: Option<&[i64]>,
        dims: InputDims,
    ) -> Result<Vec<usize>, GruError> {
        let Some(lens) = sequence_lens else {
            return Ok(vec![dims.seq_len; dims.batch_size]);
        };
        if lens.len() != dims.batch_size {
            return Err(GruError::shape_mismatch(
                "sequence_lens",
                &[dims.batch_size],
                &[lens.len()],
            ));
        }
        lens.iter()
            .enumerate()
            .map(|(batch_index, &length)| {
                if length < 1 {
                    return Err(GruError::InvalidSequenceLength {
                        batch_index,
                        length,
                        operator: ComparisonOperator::GreaterOrEqual,
                        bound: 1,
                    });
                }
                match usize::try_from(length) {
                    Ok(len) if len <= dims.seq_len => Ok(len),
                    _ => Err(GruError::InvalidSequenceLength {
                        batch_index,
                        length,
                        operator: ComparisonOperator::LessOrEqual,
                        bound: dims.seq_len,
                    }),
                }
            })
            .collect()
    }
}

fn check_shape<T: GruFloat>(name: &str, tensor: &Tensor<T>, expected: &[usize]) -> Result<(), GruError> {
    if tensor.shape() == expected {
        Ok(())
    } else if tensor.dimension() != expected.len() {
        Err(GruError::RankMismatch {
            name: name.to_string(),
            expected: expected.len(),
            got: tensor.shape().to_vec(),
        })
    } else {
        Err(GruError::shape_mismatch(name, expected, tensor.shape()))
    }
}

fn to_fixed<'a, T, D: Dimension>(
    name: &str,
    view: ArrayViewD<'a, T>,
) -> Result<ndarray::ArrayView<'a, T, D>, GruError> {
    let shape = view.shape().to_vec();
    view.into_dimensionality::<D>().map_err(|_| GruError::RankMismatch {
        name: name.to_string(),
        expected: D::NDIM.unwrap_or(0),
        got: shape,
    })
}
