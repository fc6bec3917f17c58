/*
 * @Author       : 老董
 * @Date         : 2026-02-04
 * @Description  : 循环层的激活函数分发
 *
 * 激活函数在配置期按名字解析一次，得到封闭枚举`ActivationFunc`；
 * 时间步循环中只通过 enum_dispatch 直接调用，不再按名字查找。
 *
 * 支持的函数（名字大小写不敏感，参数缺省值见各结构体）:
 *   sigmoid, tanh, relu, affine, leakyrelu, thresholdedrelu,
 *   scaledtanh, hardsigmoid, elu, softsign, softplus
 */

use crate::errors::GruError;
use crate::utils::traits::float::GruFloat;
use enum_dispatch::enum_dispatch;
use ndarray::ArrayViewMut1;

#[enum_dispatch]
pub trait TraitActivation {
    fn name(&self) -> &'static str;

    /// 对单个元素求值
    fn activate<T: GruFloat>(&self, x: T) -> T;
}

#[enum_dispatch(TraitActivation)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivationFunc {
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    Relu(Relu),
    Affine(Affine),
    LeakyRelu(LeakyRelu),
    ThresholdedRelu(ThresholdedRelu),
    ScaledTanh(ScaledTanh),
    HardSigmoid(HardSigmoid),
    Elu(Elu),
    Softsign(Softsign),
    Softplus(Softplus),
}

impl ActivationFunc {
    /// 按名字（大小写不敏感）解析激活函数，`alpha`/`beta`缺省时使用该函数的默认参数；
    /// 不需要参数的函数会忽略传入的`alpha`/`beta`
    pub fn resolve(name: &str, alpha: Option<f32>, beta: Option<f32>) -> Result<Self, GruError> {
        let func: ActivationFunc = match name.to_lowercase().as_str() {
            "sigmoid" => Sigmoid.into(),
            "tanh" => Tanh.into(),
            "relu" => Relu.into(),
            "affine" => Affine {
                alpha: alpha.unwrap_or(1.0),
                beta: beta.unwrap_or(0.0),
            }
            .into(),
            "leakyrelu" => LeakyRelu {
                alpha: alpha.unwrap_or(0.01),
            }
            .into(),
            "thresholdedrelu" => ThresholdedRelu {
                alpha: alpha.unwrap_or(1.0),
            }
            .into(),
            "scaledtanh" => ScaledTanh {
                alpha: alpha.unwrap_or(1.0),
                beta: beta.unwrap_or(1.0),
            }
            .into(),
            "hardsigmoid" => HardSigmoid {
                alpha: alpha.unwrap_or(0.2),
                beta: beta.unwrap_or(0.5),
            }
            .into(),
            "elu" => Elu {
                alpha: alpha.unwrap_or(1.0),
            }
            .into(),
            "softsign" => Softsign.into(),
            "softplus" => Softplus.into(),
            _ => return Err(GruError::UnknownActivation(name.to_string())),
        };
        Ok(func)
    }

    /// 该函数消耗的参数个数：(是否用 alpha, 是否用 beta)
    fn param_usage(name: &str) -> (bool, bool) {
        match name.to_lowercase().as_str() {
            "affine" | "scaledtanh" | "hardsigmoid" => (true, true),
            "leakyrelu" | "thresholdedrelu" | "elu" => (true, false),
            _ => (false, false),
        }
    }

    /// 原地逐元素应用到向量上
    pub fn apply_inplace<T: GruFloat>(&self, mut values: ArrayViewMut1<'_, T>) {
        values.mapv_inplace(|x| self.activate(x));
    }
}

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓无参数↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sigmoid;
impl TraitActivation for Sigmoid {
    fn name(&self) -> &'static str {
        "sigmoid"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        T::one() / (T::one() + (-x).exp())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tanh;
impl TraitActivation for Tanh {
    fn name(&self) -> &'static str {
        "tanh"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        x.tanh()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Relu;
impl TraitActivation for Relu {
    fn name(&self) -> &'static str {
        "relu"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        x.max(T::zero())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Softsign;
impl TraitActivation for Softsign {
    fn name(&self) -> &'static str {
        "softsign"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        x / (T::one() + x.abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Softplus;
impl TraitActivation for Softplus {
    fn name(&self) -> &'static str {
        "softplus"
    }
    /// `ln(1 + e^x)`，改写为`max(x, 0) + ln(1 + e^{-|x|})`，x 很大时不会溢出为 inf
    fn activate<T: GruFloat>(&self, x: T) -> T {
        x.max(T::zero()) + (-x.abs()).exp().ln_1p()
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑无参数↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓带参数↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
/// `alpha * x + beta`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub alpha: f32,
    pub beta: f32,
}
impl TraitActivation for Affine {
    fn name(&self) -> &'static str {
        "affine"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        T::from_param(self.alpha) * x + T::from_param(self.beta)
    }
}

/// `x >= 0 ? x : alpha * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakyRelu {
    pub alpha: f32,
}
impl TraitActivation for LeakyRelu {
    fn name(&self) -> &'static str {
        "leakyrelu"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        if x >= T::zero() {
            x
        } else {
            T::from_param(self.alpha) * x
        }
    }
}

/// `x > alpha ? x : 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdedRelu {
    pub alpha: f32,
}
impl TraitActivation for ThresholdedRelu {
    fn name(&self) -> &'static str {
        "thresholdedrelu"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        if x > T::from_param(self.alpha) {
            x
        } else {
            T::zero()
        }
    }
}

/// `alpha * tanh(beta * x)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledTanh {
    pub alpha: f32,
    pub beta: f32,
}
impl TraitActivation for ScaledTanh {
    fn name(&self) -> &'static str {
        "scaledtanh"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        T::from_param(self.alpha) * (T::from_param(self.beta) * x).tanh()
    }
}

/// `max(0, min(1, alpha * x + beta))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardSigmoid {
    pub alpha: f32,
    pub beta: f32,
}
impl TraitActivation for HardSigmoid {
    fn name(&self) -> &'static str {
        "hardsigmoid"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        let y = T::from_param(self.alpha) * x + T::from_param(self.beta);
        y.min(T::one()).max(T::zero())
    }
}

/// `x >= 0 ? x : alpha * (exp(x) - 1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elu {
    pub alpha: f32,
}
impl TraitActivation for Elu {
    fn name(&self) -> &'static str {
        "elu"
    }
    fn activate<T: GruFloat>(&self, x: T) -> T {
        if x >= T::zero() {
            x
        } else {
            T::from_param(self.alpha) * x.exp_m1()
        }
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑带参数↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/// 一个 GRU 实例所用的全部激活函数，每个方向一对：(门激活, 候选激活)
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationFuncs {
    entries: Vec<ActivationFunc>,
}

impl ActivationFuncs {
    /// 解析一组激活函数名。
    ///
    /// `alphas`/`betas`按出现顺序被"需要该参数"的激活函数依次取用（而非按下标对齐），
    /// 取完后其余函数使用默认值。例如`["leakyrelu", "tanh", "affine"]`与`alphas=[0.1, 2.0]`
    /// 会得到`leakyrelu(0.1)`、`tanh`、`affine(2.0, 默认beta)`。
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        alphas: &[f32],
        betas: &[f32],
    ) -> Result<Self, GruError> {
        let mut alpha_iter = alphas.iter().copied();
        let mut beta_iter = betas.iter().copied();
        let entries = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let (uses_alpha, uses_beta) = ActivationFunc::param_usage(name);
                let alpha = if uses_alpha { alpha_iter.next() } else { None };
                let beta = if uses_beta { beta_iter.next() } else { None };
                ActivationFunc::resolve(name, alpha, beta)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// 每个方向均为`sigmoid`、`tanh`
    pub fn default_for(num_directions: usize) -> Self {
        let entries = (0..num_directions)
            .flat_map(|_| [ActivationFunc::from(Sigmoid), ActivationFunc::from(Tanh)])
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 第`direction`个方向的(门激活, 候选激活)
    pub fn for_direction(&self, direction: usize) -> Option<(&ActivationFunc, &ActivationFunc)> {
        let gate = self.entries.get(direction * 2)?;
        let candidate = self.entries.get(direction * 2 + 1)?;
        Some((gate, candidate))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|f| f.name()).collect()
    }
}
