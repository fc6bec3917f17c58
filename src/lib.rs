//! # Only GRU
//!
//! `only_gru`用纯rust实现了[ONNX GRU](https://onnx.ai/onnx/operators/onnx__GRU.html)算子的CPU前向推理：
//! 支持正向、反向与双向遍历，每个方向可单独配置门激活与候选激活函数，
//! 支持`linear_before_reset`、门预激活截断（clip）、变长序列，并在 batch 维度上并行，
//! 结果与线程数、任务划分方式无关。
//!

pub mod errors;
pub mod rnn;
pub mod tensor;
pub mod utils;
