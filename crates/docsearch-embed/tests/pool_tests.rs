use candle_core::{DType, Device, Tensor};
use docsearch_embed::masked_mean_l2;
use docsearch_embed::tokenize::pad_rows;

#[test]
fn masked_mean_l2_basic() {
    let dev = Device::Cpu;
    // Two tokens with hidden dim 4; second token is masked out.
    let h = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], (1, 2, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1i64, 0i64], (1, 2), &dev).unwrap().to_dtype(DType::F32).unwrap();
    let out = masked_mean_l2(&h, &mask).unwrap();
    let v: Vec<Vec<f32>> = out.to_vec2().unwrap();
    let v = &v[0];
    let norm: f32 = (1.0f32 + 4.0 + 9.0 + 16.0).sqrt();
    let expected = [1.0 / norm, 2.0 / norm, 3.0 / norm, 4.0 / norm];
    for (a, b) in v.iter().cloned().zip(expected) {
        assert!((a - b).abs() < 1e-5, "a={} b={}", a, b);
    }
}

#[test]
fn masked_mean_l2_batches_rows_independently() {
    let dev = Device::Cpu;
    let h = Tensor::from_slice(&[3.0f32, 0.0, 0.0, 4.0, 1.0, 1.0, 9.0, 9.0], (2, 2, 2), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 1, 1, 0], (2, 2), &dev).unwrap();
    let v: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();
    // row 0: mean [1.5, 2.0] -> [0.6, 0.8]; row 1: only [1, 1]
    assert!((v[0][0] - 0.6).abs() < 1e-5 && (v[0][1] - 0.8).abs() < 1e-5);
    let s = 1.0 / 2f32.sqrt();
    assert!((v[1][0] - s).abs() < 1e-5 && (v[1][1] - s).abs() < 1e-5);
}

#[test]
fn pad_rows_right_pads_to_longest() {
    let (ids, mask, width) = pad_rows(&[&[0, 5, 2], &[0, 2]], 1);
    assert_eq!(width, 3);
    assert_eq!(ids, vec![0, 5, 2, 0, 2, 1]);
    assert_eq!(mask, vec![1, 1, 1, 1, 1, 0]);
}
