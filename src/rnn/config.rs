/*
 * @Author       : 老董
 * @Date         : 2026-02-04
 * @Description  : GRU 的配置：原始属性（可由 JSON 反序列化）与校验后的`GruConfig`
 *
 * 所有配置期错误（缺失属性、非法方向、hidden_size/clip 非正、激活函数个数不符、
 * 未知激活函数）都在此处一次性报出，内核构建后不再重复检查。
 */

use super::activation::ActivationFuncs;
use super::direction::Direction;
use crate::errors::GruError;
use serde::{Deserialize, Serialize};

/// 未经校验的 GRU 属性，字段与 ONNX GRU 算子的属性同名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GruAttributes {
    pub direction: String,
    pub hidden_size: Option<i64>,
    pub linear_before_reset: i64,
    pub activations: Vec<String>,
    pub activation_alpha: Vec<f32>,
    pub activation_beta: Vec<f32>,
    /// 缺省表示不截断
    pub clip: Option<f32>,
}

impl Default for GruAttributes {
    fn default() -> Self {
        Self {
            direction: Direction::Forward.as_str().to_string(),
            hidden_size: None,
            linear_before_reset: 0,
            activations: Vec::new(),
            activation_alpha: Vec::new(),
            activation_beta: Vec::new(),
            clip: None,
        }
    }
}

impl GruAttributes {
    pub fn from_json(json: &str) -> Result<Self, GruError> {
        serde_json::from_str(json)
            .map_err(|e| GruError::invalid_attribute("<json>", e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, GruError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GruError::invalid_attribute("<json>", e.to_string()))
    }
}

/// 校验后的 GRU 配置
#[derive(Debug, Clone, PartialEq)]
pub struct GruConfig {
    direction: Direction,
    hidden_size: usize,
    linear_before_reset: bool,
    clip: Option<f32>,
    activations: ActivationFuncs,
}

impl GruConfig {
    /// 使用默认激活函数（每个方向`sigmoid`、`tanh`）、不截断、`linear_before_reset = false`
    pub fn new(direction: Direction, hidden_size: usize) -> Result<Self, GruError> {
        if hidden_size == 0 {
            return Err(GruError::invalid_attribute("hidden_size", "须为正整数"));
        }
        // 偏置长度为 6·hidden_size，须能用 usize 表示
        if hidden_size.checked_mul(6).is_none() {
            return Err(GruError::invalid_attribute(
                "hidden_size",
                format!("{hidden_size}过大，6·hidden_size 溢出"),
            ));
        }
        Ok(Self {
            direction,
            hidden_size,
            linear_before_reset: false,
            clip: None,
            activations: ActivationFuncs::default_for(direction.num_directions()),
        })
    }

    pub fn with_linear_before_reset(mut self, linear_before_reset: bool) -> Self {
        self.linear_before_reset = linear_before_reset;
        self
    }

    pub fn with_clip(mut self, clip: f32) -> Result<Self, GruError> {
        if clip.is_nan() || clip <= 0.0 {
            return Err(GruError::invalid_attribute(
                "clip",
                format!("须为正数，实际为{clip}"),
            ));
        }
        self.clip = Some(clip);
        Ok(self)
    }

    /// 激活函数个数须为`2 × num_directions`
    pub fn with_activations(mut self, activations: ActivationFuncs) -> Result<Self, GruError> {
        let expected = 2 * self.num_directions();
        if activations.len() != expected {
            return Err(GruError::invalid_attribute(
                "activations",
                format!("须恰好有{expected}个，实际为{}个", activations.len()),
            ));
        }
        self.activations = activations;
        Ok(self)
    }

    pub fn try_from_attributes(attrs: &GruAttributes) -> Result<Self, GruError> {
        let direction: Direction = attrs.direction.parse()?;

        let hidden_size = attrs
            .hidden_size
            .ok_or_else(|| GruError::invalid_attribute("hidden_size", "缺失必需属性"))?;
        if hidden_size <= 0 {
            return Err(GruError::invalid_attribute(
                "hidden_size",
                format!("须为正整数，实际为{hidden_size}"),
            ));
        }
        let hidden_size = usize::try_from(hidden_size)
            .map_err(|e| GruError::invalid_attribute("hidden_size", e.to_string()))?;

        let linear_before_reset = match attrs.linear_before_reset {
            0 => false,
            1 => true,
            other => {
                return Err(GruError::invalid_attribute(
                    "linear_before_reset",
                    format!("须为0或1，实际为{other}"),
                ));
            }
        };

        let mut config =
            Self::new(direction, hidden_size)?.with_linear_before_reset(linear_before_reset);
        if let Some(clip) = attrs.clip {
            config = config.with_clip(clip)?;
        }
        if !attrs.activations.is_empty() {
            let activations = ActivationFuncs::from_names(
                &attrs.activations,
                &attrs.activation_alpha,
                &attrs.activation_beta,
            )?;
            config = config.with_activations(activations)?;
        }
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, GruError> {
        Self::try_from_attributes(&GruAttributes::from_json(json)?)
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub const fn num_directions(&self) -> usize {
        self.direction.num_directions()
    }

    pub const fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub const fn linear_before_reset(&self) -> bool {
        self.linear_before_reset
    }

    pub const fn clip(&self) -> Option<f32> {
        self.clip
    }

    pub const fn activations(&self) -> &ActivationFuncs {
        &self.activations
    }
}
