//! The literal byte-level end-to-end scenarios.

use streamvx::channel::{combine, extract, PackedLayout};
use streamvx::depth::{convert_elem, DepthConfig, ShiftDir};
use streamvx::element::Elem;
use streamvx::fixed::OverflowPolicy;
use streamvx::keypoint::{gather, GatherMode, Keypoint, SENTINEL};
use streamvx::pixelwise::{add, magnitude};
use streamvx::scale::{nearest_neighbor, ScaleConfig};
use streamvx::softmax::softmax;
use std::collections::VecDeque;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn scenario_1_bit_depth_u8_to_u16_shift8_saturate() {
    init_tracing();
    let cfg = DepthConfig::new(8, ShiftDir::Widen, OverflowPolicy::Saturate).unwrap();
    let input = [0x00u8, 0x7F, 0x80, 0xFF];
    let expect = [0x0000u16, 0x7F00, 0x8000, 0xFF00];
    for (v, want) in input.iter().zip(expect.iter()) {
        let out = convert_elem::<u8, u16, 1>(&cfg, Elem::new([*v]));
        assert_eq!(out.lanes[0], *want);
    }
}

#[test]
fn scenario_2_bit_depth_s16_to_u8_shift8_saturate() {
    let cfg = DepthConfig::new(8, ShiftDir::Narrow, OverflowPolicy::Saturate).unwrap();
    let input = [-32768i16, -1, 0, 32767];
    let expect = [0u8, 0, 0, 127];
    for (v, want) in input.iter().zip(expect.iter()) {
        let out = convert_elem::<i16, u8, 1>(&cfg, Elem::new([*v]));
        assert_eq!(out.lanes[0], *want);
    }
}

#[test]
fn scenario_3_pixel_wise_add_u8_saturate_and_wrap() {
    let a = [10u8, 200, 250, 255];
    let b = [20u8, 100, 10, 1];
    let saturated: Vec<u8> = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| add(x, y, OverflowPolicy::Saturate))
        .collect();
    assert_eq!(saturated, vec![30, 255, 255, 255]);

    let wrapped: Vec<u8> = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| add(x, y, OverflowPolicy::Wrap))
        .collect();
    assert_eq!(wrapped, vec![30, 44, 4, 0]);
}

#[test]
fn scenario_4_magnitude_u8_saturate_round_nearest() {
    assert_eq!(magnitude(3u8, 4u8), 5);
    assert_eq!(magnitude(255u8, 255u8), 255);
}

#[test]
fn scenario_5_channel_combine_then_extract_channel0() {
    let r: Vec<u8> = (1..=16).collect();
    let g: Vec<u8> = (16..32).collect();
    let b: Vec<u8> = (31..47).collect();
    let mk = |v: &[u8]| -> Vec<Elem<u8, 1>> {
        let n = v.len();
        v.iter()
            .enumerate()
            .map(|(i, x)| Elem::with_flags([*x], i == 0, i == n - 1))
            .collect()
    };
    let planes = [mk(&r), mk(&g), mk(&b)];
    let packed = combine(PackedLayout::Rgb, &planes);
    let extracted = extract(PackedLayout::Rgb, 0, &packed);
    let got: Vec<u8> = extracted.iter().map(|e| e.lanes[0]).collect();
    assert_eq!(got, r);
}

#[test]
fn scenario_6_scale_down_4x4_to_2x2_nearest() {
    let cfg = ScaleConfig {
        rows_in: 4,
        cols_in: 4,
        rows_out: 2,
        cols_out: 2,
    };
    let input: Vec<[u16; 1]> = vec![
        [10], [20], [30], [40],
        [50], [60], [70], [80],
        [90], [100], [110], [120],
        [130], [140], [150], [160],
    ];
    let out = nearest_neighbor::<u16, 1>(&cfg, &input);
    let values: Vec<u16> = out.iter().map(|p| p[0]).collect();
    assert_eq!(values, vec![10, 30, 90, 110]);
}

#[test]
fn scenario_7_softmax_over_all_zero_in_q16() {
    let batch = [0i32, 0, 0, 0];
    let out = softmax(16, &batch);
    assert_eq!(out, [0x4000, 0x4000, 0x4000, 0x4000]);
}

#[test]
fn scenario_8_keypoint_gather_cyclic_of_two_streams() {
    let kp = |x: u16, y: u16| {
        Keypoint {
            x,
            y,
            response: 0,
            scale: 0,
            orientation: 0,
        }
        .pack()
    };
    let s0: VecDeque<u64> = VecDeque::from([kp(1, 1), kp(2, 2), SENTINEL]);
    let s1: VecDeque<u64> = VecDeque::from([kp(3, 3), SENTINEL]);
    let out = gather(GatherMode::Cyclic, [s0, s1], 4);
    let values: Vec<u64> = out.iter().map(|e| e.lanes[0]).collect();
    assert_eq!(values, vec![kp(1, 1), kp(3, 3), kp(2, 2), SENTINEL]);
}
