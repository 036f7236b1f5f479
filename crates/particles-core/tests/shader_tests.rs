// The web renderer binds these entry points by name.

use particles_core::{BLOOM_WGSL, PARTICLES_WGSL, SIMULATION_WGSL, TRIANGLES_WGSL};

fn has_entry(src: &str, name: &str) -> bool {
    src.contains(&format!("fn {}(", name))
}

#[test]
fn entry_points_exist() {
    assert!(has_entry(SIMULATION_WGSL, "vs_fullscreen"));
    assert!(has_entry(SIMULATION_WGSL, "fs_simulate"));
    assert!(has_entry(PARTICLES_WGSL, "vs_points"));
    assert!(has_entry(PARTICLES_WGSL, "fs_points"));
    assert!(has_entry(TRIANGLES_WGSL, "vs_triangles"));
    assert!(has_entry(TRIANGLES_WGSL, "fs_triangles"));
    for entry in ["vs_fullscreen", "fs_threshold", "fs_blur", "fs_composite"] {
        assert!(has_entry(BLOOM_WGSL, entry), "missing {}", entry);
    }
}

#[test]
fn simulation_shader_uses_the_same_relaxation() {
    assert!(SIMULATION_WGSL.contains("RELAX_BASE: f32 = 0.08"));
    assert!(SIMULATION_WGSL.contains("RELAX_BASS_COEFF: f32 = 0.12"));
    assert_eq!(particles_core::RELAX_BASE, 0.08);
    assert_eq!(particles_core::RELAX_BASS_COEFF, 0.12);
}
