/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 负责循环层（GRU）的前向推理
 */

mod activation;
mod cell;
mod config;
mod direction;
mod gru;
mod output;
mod pool;
mod sequence;
mod weights;

pub use activation::{
    ActivationFunc, ActivationFuncs, Affine, Elu, HardSigmoid, LeakyRelu, Relu, ScaledTanh,
    Sigmoid, Softplus, Softsign, Tanh, ThresholdedRelu, TraitActivation,
};
pub use config::{GruAttributes, GruConfig};
pub use direction::Direction;
pub use gru::{DeepGru, GruInputs};
pub use output::{GruOutput, GruOutputRequest};
pub use pool::{PoolConfig, PoolSession, WorkerPool};
pub use weights::{Gate, WeightSet};

#[cfg(test)]
mod tests;
