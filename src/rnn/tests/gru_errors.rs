use super::kernel;
use crate::assert_err;
use crate::errors::{ComparisonOperator, GruError};
use crate::rnn::{DeepGru, Direction, GruConfig, GruInputs, GruOutputRequest};
use crate::tensor::Tensor;

// T=3、batch=2、input=4、hidden=5
fn forward_gru() -> DeepGru {
    kernel(GruConfig::new(Direction::Forward, 5).unwrap(), 2, None)
}

fn valid_tensors() -> (Tensor, Tensor, Tensor) {
    (
        Tensor::zeros(&[3, 2, 4]),
        Tensor::zeros(&[1, 15, 4]),
        Tensor::zeros(&[1, 15, 5]),
    )
}

#[test]
fn test_valid_inputs_succeed() {
    let (x, w, r) = valid_tensors();
    let gru = forward_gru();
    let output = gru
        .compute(&GruInputs::new(&x, &w, &r), GruOutputRequest::default())
        .unwrap();
    assert!(output.y.unwrap().is_all_zero());
}

#[test]
fn test_x_rank() {
    let (_, w, r) = valid_tensors();
    let x = Tensor::zeros(&[3, 8]);
    assert_err!(
        forward_gru().compute(&GruInputs::new(&x, &w, &r), GruOutputRequest::default()),
        GruError::RankMismatch { name, expected: 3, .. } if name == "X"
    );
}

#[test]
fn test_w_shape() {
    let (x, _, r) = valid_tensors();
    // input_size 与 X 不一致
    let w = Tensor::zeros(&[1, 15, 3]);
    assert_err!(
        forward_gru().compute(&GruInputs::new(&x, &w, &r), GruOutputRequest::default()),
        GruError::ShapeMismatch("W", [1, 15, 4], [1, 15, 3])
    );
    // 方向数与配置不一致
    let w = Tensor::zeros(&[2, 15, 4]);
    assert_err!(
        forward_gru().compute(&GruInputs::new(&x, &w, &r), GruOutputRequest::default()),
        GruError::ShapeMismatch("W", [1, 15, 4], [2, 15, 4])
    );
    let w = Tensor::zeros(&[15, 4]);
    assert_err!(
        forward_gru().compute(&GruInputs::new(&x, &w, &r), GruOutputRequest::default()),
        GruError::RankMismatch { name, expected: 3, got } if name == "W" && got == &[15, 4]
    );
}

#[test]
fn test_r_shape() {
    let (x, w, _) = valid_tensors();
    let r = Tensor::zeros(&[1, 15, 4]);
    assert_err!(
        forward_gru().compute(&GruInputs::new(&x, &w, &r), GruOutputRequest::default()),
        GruError::ShapeMismatch("R", [1, 15, 5], [1, 15, 4])
    );
}

#[test]
fn test_bias_shape() {
    let (x, w, r) = valid_tensors();
    let b = Tensor::zeros(&[1, 15]);
    assert_err!(
        forward_gru().compute(
            &GruInputs::new(&x, &w, &r).with_bias(&b),
            GruOutputRequest::default()
        ),
        GruError::ShapeMismatch("B", [1, 30], [1, 15])
    );
}

#[test]
fn test_initial_h_shape() {
    let (x, w, r) = valid_tensors();
    let h0 = Tensor::zeros(&[1, 3, 5]);
    assert_err!(
        forward_gru().compute(
            &GruInputs::new(&x, &w, &r).with_initial_h(&h0),
            GruOutputRequest::default()
        ),
        GruError::ShapeMismatch("initial_h", [1, 2, 5], [1, 3, 5])
    );
}

#[test]
fn test_bidirectional_requires_two_directions() {
    let gru = kernel(GruConfig::new(Direction::Bidirectional, 5).unwrap(), 2, None);
    let (x, w, r) = valid_tensors();
    assert_err!(
        gru.compute(&GruInputs::new(&x, &w, &r), GruOutputRequest::default()),
        GruError::ShapeMismatch("W", [2, 15, 4], [1, 15, 4])
    );
}

// ==================== sequence_lens ====================

#[test]
fn test_sequence_lens_length() {
    let (x, w, r) = valid_tensors();
    assert_err!(
        forward_gru().compute(
            &GruInputs::new(&x, &w, &r).with_sequence_lens(&[3, 3, 3]),
            GruOutputRequest::default()
        ),
        GruError::ShapeMismatch("sequence_lens", [2], [3])
    );
}

#[test]
fn test_sequence_lens_too_long() {
    let (x, w, r) = valid_tensors();
    assert_err!(
        forward_gru().compute(
            &GruInputs::new(&x, &w, &r).with_sequence_lens(&[3, 4]),
            GruOutputRequest::default()
        ),
        GruError::InvalidSequenceLength {
            batch_index: 1,
            length: 4,
            operator: ComparisonOperator::LessOrEqual,
            bound: 3,
        }
    );
}

#[test]
fn test_sequence_lens_non_positive() {
    let (x, w, r) = valid_tensors();
    for bad in [0, -2] {
        let lens = [bad, 3];
        assert_err!(
            forward_gru().compute(
                &GruInputs::new(&x, &w, &r).with_sequence_lens(&lens),
                GruOutputRequest::default()
            ),
            GruError::InvalidSequenceLength {
                batch_index: 0,
                operator: ComparisonOperator::GreaterOrEqual,
                bound: 1,
                ..
            }
        );
    }
}

#[test]
fn test_error_message() {
    let (x, w, r) = valid_tensors();
    let err = forward_gru()
        .compute(
            &GruInputs::new(&x, &w, &r).with_sequence_lens(&[3, 9]),
            GruOutputRequest::default(),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "sequence_lens[1]=9非法：须≤3");
}
