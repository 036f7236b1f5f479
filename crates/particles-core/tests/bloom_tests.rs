// Bloom chain sizing and the CPU reference passes.

use particles_core::bloom::{composite_pixel, kawase_pass, reference_bloom, threshold_pixel, Image};
use particles_core::*;

#[test]
fn threshold_cuts_dim_pixels() {
    for v in [0.0, 0.2, 0.5, 0.7] {
        assert_eq!(threshold_pixel([v, v, v, 1.0], 0.7)[..3], [0.0; 3]);
    }
}

#[test]
fn threshold_is_monotonic_above_the_cut() {
    let mut last = 0.0;
    for i in 0..=40 {
        let v = 0.7 + i as f32 * 0.05;
        let out = threshold_pixel([v, v * 0.5, 0.0, 1.0], 0.7)[0];
        assert!(out >= last, "{} < {} at {}", out, last, v);
        last = out;
    }
    assert!(last > 0.0);
}

#[test]
fn black_frame_composites_to_itself() {
    let frame = Image::filled(32, 18, [0.0, 0.0, 0.0, 1.0]);
    let out = reference_bloom(&frame, &BloomSettings::default()).unwrap();
    assert_eq!(out, frame);
}

#[test]
fn frame_below_threshold_is_untouched() {
    let frame = Image::from_fn(24, 24, |x, y| {
        let v = (x + y) as f32 / 48.0 * 0.6;
        [v, v, v, 1.0]
    });
    let out = reference_bloom(&frame, &BloomSettings::default()).unwrap();
    for (a, b) in out.pixels.iter().zip(frame.pixels.iter()) {
        for k in 0..4 {
            assert!((a[k] - b[k]).abs() < 1e-6);
        }
    }
}

#[test]
fn bright_spot_glows_into_neighbours() {
    let frame = Image::from_fn(32, 32, |x, y| {
        if (14..18).contains(&x) && (14..18).contains(&y) {
            [4.0, 4.0, 4.0, 1.0]
        } else {
            [0.0, 0.0, 0.0, 1.0]
        }
    });
    let out = reference_bloom(&frame, &BloomSettings::default()).unwrap();
    let neighbour = out.get(12, 16);
    assert!(neighbour[0] > 0.0);
    // the tint pulls bloom toward red
    assert!(neighbour[0] > neighbour[1]);
}

#[test]
fn composite_with_zero_strength_is_identity() {
    let settings = BloomSettings {
        bloom_strength: 0.0,
        ..BloomSettings::default()
    };
    let px = [0.3, 0.4, 0.5, 1.0];
    assert_eq!(composite_pixel(px, [9.0; 4], &settings), px);
}

#[test]
fn resize_round_trip_restores_mip_sizes() {
    let settings = BloomSettings::default();
    let full = Viewport::new(1920, 1080).unwrap();
    let half = Viewport::new(960, 540).unwrap();
    let before = BloomChainPlan::new(full, &settings).unwrap();
    let during = BloomChainPlan::new(half, &settings).unwrap();
    let after = BloomChainPlan::new(full, &settings).unwrap();
    assert_ne!(before, during);
    assert_eq!(before, after);
}

#[test]
fn resolution_scales_the_base_target() {
    let vp = Viewport::new(800, 600).unwrap();
    let full = BloomSettings {
        resolution: 1.0,
        ..BloomSettings::default()
    };
    let quarter = BloomSettings {
        resolution: 0.25,
        ..BloomSettings::default()
    };
    assert_eq!(
        BloomChainPlan::new(vp, &full).unwrap().base,
        MipSize {
            width: 800,
            height: 600
        }
    );
    assert_eq!(
        BloomChainPlan::new(vp, &quarter).unwrap().base,
        MipSize {
            width: 200,
            height: 150
        }
    );
}

#[test]
fn blur_uniforms_use_the_base_resolution_at_every_level() {
    let settings = BloomSettings::default();
    let vp = Viewport::new(1280, 720).unwrap();
    let plan = BloomChainPlan::new(vp, &settings).unwrap();
    for (i, _level) in plan.levels.iter().enumerate() {
        let u = BloomUniforms::for_pass(&settings, plan.base, particles_core::bloom::blur_offset(i));
        assert_eq!(u.resolution, [640.0, 360.0]);
        assert_eq!(u.blur, (i as f32 + 1.0) * 2.0);
        assert_eq!(u.tint[3], 1.0);
    }
    // level 2: 6 base texels is 0.009375 in uv
    let u = BloomUniforms::for_pass(&settings, plan.base, particles_core::bloom::blur_offset(2));
    assert!((u.blur / u.resolution[0] - 0.009375).abs() < 1e-7);
}

#[test]
fn deep_mip_blur_stays_within_a_few_level_texels() {
    let base = MipSize {
        width: 320,
        height: 180,
    };
    let level = MipSize {
        width: base.width >> 2,
        height: base.height >> 2,
    };
    let (cx, cy) = (40u32, 22u32);
    let impulse = Image::from_fn(level.width, level.height, |x, y| {
        if (x, y) == (cx, cy) {
            [1.0, 1.0, 1.0, 1.0]
        } else {
            [0.0; 4]
        }
    });
    let out = kawase_pass(&impulse, level, particles_core::bloom::blur_offset(2), base);

    let mut total = 0.0;
    for y in 0..level.height {
        for x in 0..level.width {
            let v = out.get(x as i64, y as i64)[0];
            if v > 0.0 {
                let (dx, dy) = (x as i64 - cx as i64, y as i64 - cy as i64);
                assert!(dx.abs() <= 2 && dy.abs() <= 2, "spread to ({}, {})", x, y);
            }
            total += v;
        }
    }
    assert!((total - 1.0).abs() < 1e-4, "energy {}", total);
}
