//! Property-style tests for the post-processing stages.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stereomatch::{cross_check, normalize, occlusion_fill, OwnedImage};

fn random_map(width: usize, height: usize, seed: u64) -> OwnedImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height).map(|_| rng.random()).collect();
    OwnedImage::new(data, width, height).unwrap()
}

#[test]
fn cross_check_is_idempotent_for_any_threshold() {
    let map = random_map(12, 9, 7);
    for threshold in [0u8, 1, 3, 255] {
        let out = cross_check(&map, &map, threshold).unwrap();
        assert_eq!(out.data(), map.data());
    }
}

#[test]
fn cross_check_keeps_the_right_map_values() {
    let left = OwnedImage::new(vec![4, 4, 4, 4], 4, 1).unwrap();
    let right = OwnedImage::new(vec![4, 6, 2, 9], 4, 1).unwrap();
    let out = cross_check(&left, &right, 2).unwrap();
    assert_eq!(out.data(), &[4, 6, 2, 0]);
}

#[test]
fn fill_output_has_no_zeros_when_a_neighbor_is_reachable() {
    let mut rng = StdRng::seed_from_u64(99);
    let width = 20;
    let height = 15;
    let data: Vec<u8> = (0..width * height)
        .map(|_| {
            if rng.random_range(0..4) == 0 {
                0
            } else {
                rng.random_range(1..=255)
            }
        })
        .collect();
    let map = OwnedImage::new(data, width, height).unwrap();

    let filled = occlusion_fill(&map, 75).unwrap();
    assert!(filled.data().iter().all(|&v| v != 0));

    // Non-zero pixels must survive unchanged.
    for (out, src) in filled.data().iter().zip(map.data()) {
        if *src != 0 {
            assert_eq!(out, src);
        }
    }
}

#[test]
fn fill_fails_fast_on_an_all_zero_map() {
    let map = OwnedImage::new(vec![0u8; 100], 10, 10).unwrap();
    assert!(occlusion_fill(&map, 75).is_err());
}

#[test]
fn normalize_stays_within_byte_range_and_converges() {
    let map = random_map(16, 16, 11);
    let once = normalize(&map).unwrap();
    assert_eq!(once.data().iter().min(), Some(&0));
    assert_eq!(once.data().iter().max(), Some(&255));

    let twice = normalize(&once).unwrap();
    assert_eq!(once.data(), twice.data());
}
