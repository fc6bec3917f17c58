/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : GRU 内核的错误类型
 *                 配置期错误（属性、激活函数）与调用期错误（形状、序列长度）统一由`GruError`表达，
 *                 任一错误都会让整次调用失败，不产生任何部分输出
 */

use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GruError {
    // 配置期：属性缺失或取值非法
    #[error("属性`{name}`非法：{reason}")]
    InvalidAttribute { name: String, reason: String },

    // 配置期：不在封闭集合内的激活函数名
    #[error("无法识别的激活函数：`{0}`")]
    UnknownActivation(String),

    // 调用期：输入张量形状与配置不一致
    #[error("张量`{name}`形状不匹配：期望{expected:?}，实际{got:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    // 调用期：输入张量阶数不对
    #[error("张量`{name}`须为{expected}阶，实际形状为{got:?}")]
    RankMismatch {
        name: String,
        expected: usize,
        got: Vec<usize>,
    },

    // 调用期：某行的有效序列长度越界
    #[error("sequence_lens[{batch_index}]={length}非法：须{operator}{bound}")]
    InvalidSequenceLength {
        batch_index: usize,
        length: i64,
        operator: ComparisonOperator,
        bound: usize,
    },

    #[error("线程池构建失败：{0}")]
    ThreadPool(String),
}

impl GruError {
    pub(crate) fn invalid_attribute(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn shape_mismatch(name: &str, expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            name: name.to_string(),
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for GruError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}
