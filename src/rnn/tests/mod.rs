/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : rnn 模块单元测试
 *
 * `reference_gru`是逐元素三重循环的朴素实现，不做切块、不并行，
 * 用来与内核的输出逐位置比较。
 */

mod gru_errors;

use super::{ActivationFunc, DeepGru, Direction, GruConfig, PoolConfig, TraitActivation, WorkerPool};
use crate::tensor::Tensor;

/// 构建一个指定线程数与切块粒度的内核
fn kernel(config: GruConfig, num_threads: usize, rows_per_task: Option<usize>) -> DeepGru {
    let pool = WorkerPool::new(PoolConfig {
        num_threads,
        rows_per_task,
        ..Default::default()
    })
    .unwrap();
    DeepGru::new(config, pool)
}

/// 参考实现的全部输入（f64）
struct ReferenceCase<'a> {
    x: &'a Tensor<f64>,
    w: &'a Tensor<f64>,
    r: &'a Tensor<f64>,
    b: Option<&'a Tensor<f64>>,
    initial_h: Option<&'a Tensor<f64>>,
    sequence_lens: &'a [usize],
    config: &'a GruConfig,
}

/// 返回 (Y[t][d][b][h], Y_h[d][b][h])
#[allow(clippy::type_complexity)]
fn reference_gru(case: &ReferenceCase<'_>) -> (Vec<Vec<Vec<Vec<f64>>>>, Vec<Vec<Vec<f64>>>) {
    let shape = case.x.shape();
    let (seq_len, batch_size, input_size) = (shape[0], shape[1], shape[2]);
    let hs = case.config.hidden_size();
    let num_directions = case.config.num_directions();
    let clip = |v: f64| match case.config.clip() {
        Some(c) => v.max(-f64::from(c)).min(f64::from(c)),
        None => v,
    };

    let mut y = vec![vec![vec![vec![0.0; hs]; batch_size]; num_directions]; seq_len];
    let mut y_h = vec![vec![vec![0.0; hs]; batch_size]; num_directions];

    for (d, pass) in case.config.direction().passes().iter().enumerate() {
        let (gate, cand): (&ActivationFunc, &ActivationFunc) =
            case.config.activations().for_direction(d).unwrap();
        let bias = |i: usize| case.b.map_or(0.0, |b| b[[d, i]]);
        let order: Vec<usize> = match pass {
            Direction::Reverse => (0..seq_len).rev().collect(),
            _ => (0..seq_len).collect(),
        };

        for b in 0..batch_size {
            let mut h: Vec<f64> = (0..hs)
                .map(|j| case.initial_h.map_or(0.0, |h0| h0[[d, b, j]]))
                .collect();
            for &t in &order {
                if t >= case.sequence_lens[b] {
                    continue;
                }
                let wx = |row: usize| -> f64 {
                    (0..input_size)
                        .map(|i| case.w[[d, row, i]] * case.x[[t, b, i]])
                        .sum()
                };
                let rh = |row: usize, hv: &[f64]| -> f64 {
                    (0..hs).map(|k| case.r[[d, row, k]] * hv[k]).sum()
                };

                let z: Vec<f64> = (0..hs)
                    .map(|j| gate.activate(clip(wx(j) + rh(j, h.as_slice()) + bias(j) + bias(3 * hs + j))))
                    .collect();
                let rg: Vec<f64> = (0..hs)
                    .map(|j| {
                        gate.activate(clip(
                            wx(hs + j) + rh(hs + j, h.as_slice()) + bias(hs + j) + bias(4 * hs + j),
                        ))
                    })
                    .collect();
                let gated_h: Vec<f64> = (0..hs).map(|k| rg[k] * h[k]).collect();

                let next: Vec<f64> = (0..hs)
                    .map(|j| {
                        let row = 2 * hs + j;
                        let recurrent = if case.config.linear_before_reset() {
                            rg[j] * (rh(row, h.as_slice()) + bias(3 * hs + row))
                        } else {
                            rh(row, gated_h.as_slice()) + bias(3 * hs + row)
                        };
                        let n = cand.activate(clip(wx(row) + bias(row) + recurrent));
                        (1.0 - z[j]) * n + z[j] * h[j]
                    })
                    .collect();
                h = next;
                y[t][d][b] = h.clone();
            }
            y_h[d][b] = h;
        }
    }
    (y, y_h)
}

/// 逐元素比较内核输出与参考实现
fn assert_close_to_reference(
    y: &Tensor<f64>,
    y_h: &Tensor<f64>,
    expected: &(Vec<Vec<Vec<Vec<f64>>>>, Vec<Vec<Vec<f64>>>),
    epsilon: f64,
) {
    let (exp_y, exp_y_h) = expected;
    for (t, per_t) in exp_y.iter().enumerate() {
        for (d, per_d) in per_t.iter().enumerate() {
            for (b, per_b) in per_d.iter().enumerate() {
                for (j, &v) in per_b.iter().enumerate() {
                    approx::assert_abs_diff_eq!(y[[t, d, b, j]], v, epsilon = epsilon);
                }
            }
        }
    }
    for (d, per_d) in exp_y_h.iter().enumerate() {
        for (b, per_b) in per_d.iter().enumerate() {
            for (j, &v) in per_b.iter().enumerate() {
                approx::assert_abs_diff_eq!(y_h[[d, b, j]], v, epsilon = epsilon);
            }
        }
    }
}
