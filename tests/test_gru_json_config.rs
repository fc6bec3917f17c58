/*
 * @Author       : 老董
 * @Date         : 2026-02-08
 * @Description  : 从 JSON 读取 GRU 属性与输入张量，构建内核并计算
 *                 属性字段与 ONNX GRU 算子同名，张量经 serde 序列化后可原样还原
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-08
 */
use only_gru::errors::GruError;
use only_gru::rnn::{DeepGru, Direction, GruAttributes, GruConfig, GruInputs, GruOutputRequest};
use only_gru::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// 一次计算的全部输入
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct GruCase {
    attributes: GruAttributes,
    x: Tensor<f64>,
    w: Tensor<f64>,
    r: Tensor<f64>,
    b: Option<Tensor<f64>>,
    sequence_lens: Option<Vec<i64>>,
}

const ATTRIBUTES: &str = r#"{
    "direction": "reverse",
    "hidden_size": 2,
    "activations": ["HardSigmoid", "Tanh"],
    "activation_alpha": [0.25],
    "activation_beta": [0.4],
    "clip": 3.0
}"#;

fn sample_case() -> Result<GruCase, GruError> {
    Ok(GruCase {
        attributes: GruAttributes::from_json(ATTRIBUTES)?,
        x: Tensor::new_random(-1.0, 1.0, &[3, 2, 2]),
        w: Tensor::new_random(-1.0, 1.0, &[1, 6, 2]),
        r: Tensor::new_random(-1.0, 1.0, &[1, 6, 2]),
        b: Some(Tensor::new_random(-0.2, 0.2, &[1, 12])),
        sequence_lens: Some(vec![3, 2]),
    })
}

fn run(case: &GruCase) -> Result<(GruConfig, Tensor<f64>), GruError> {
    let config = GruConfig::try_from_attributes(&case.attributes)?;
    let gru = DeepGru::with_default_pool(config.clone())?;
    let mut inputs = GruInputs::new(&case.x, &case.w, &case.r);
    if let Some(b) = &case.b {
        inputs = inputs.with_bias(b);
    }
    if let Some(lens) = &case.sequence_lens {
        inputs = inputs.with_sequence_lens(lens);
    }
    let output = gru.compute(&inputs, GruOutputRequest::final_state_only())?;
    Ok((config, output.y_h.unwrap()))
}

#[test]
fn test_config_from_json() -> Result<(), GruError> {
    let config = GruConfig::from_json(ATTRIBUTES)?;
    assert_eq!(config.direction(), Direction::Reverse);
    assert_eq!(config.hidden_size(), 2);
    assert_eq!(config.clip(), Some(3.0));
    assert!(!config.linear_before_reset());
    assert_eq!(config.activations().names(), vec!["hardsigmoid", "tanh"]);
    Ok(())
}

#[test]
fn test_case_survives_json_round_trip() -> Result<(), GruError> {
    let case = sample_case()?;
    let json = serde_json::to_string(&case).expect("序列化失败");
    let restored: GruCase = serde_json::from_str(&json).expect("反序列化失败");
    assert_eq!(restored, case);

    let (config, y_h) = run(&case)?;
    let (restored_config, restored_y_h) = run(&restored)?;
    assert_eq!(config, restored_config);
    assert_eq!(y_h.shape(), &[1, 2, 2]);
    assert_eq!(y_h, restored_y_h);
    Ok(())
}

#[test]
fn test_invalid_json_attributes() {
    let missing_hidden = r#"{"direction": "forward"}"#;
    assert!(matches!(
        GruConfig::from_json(missing_hidden),
        Err(GruError::InvalidAttribute { name, .. }) if name == "hidden_size"
    ));

    let bad_direction = r#"{"direction": "sideways", "hidden_size": 2}"#;
    assert!(matches!(
        GruConfig::from_json(bad_direction),
        Err(GruError::InvalidAttribute { name, .. }) if name == "direction"
    ));

    let unknown_activation = r#"{"hidden_size": 2, "activations": ["sigmoid", "gelu"]}"#;
    assert_eq!(
        GruConfig::from_json(unknown_activation),
        Err(GruError::UnknownActivation("gelu".to_string()))
    );
}
