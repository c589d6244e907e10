//! WGSL program for the snow field.
//!
//! One instance per particle, six vertices per instance forming a
//! camera-facing quad the size of the attenuated point. The vertex stage is
//! the same kernel as `formation_core::snow::kernel`; keep the two in sync.

pub const SNOW_WGSL: &str = r#"
struct SnowUniforms {
    attractor: vec3<f32>,
    time: f32,
    fall_height: f32,
    influence_radius: f32,
    repulsion_strength: f32,
    breeze: f32,
    point_scale: f32,
    twinkle_base: f32,
    twinkle_amplitude: f32,
    sprite_opacity: f32,
    sprite_falloff: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

struct Camera {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    viewport: vec2<f32>,
    _pad: vec2<f32>,
};

struct Particle {
    position: vec3<f32>,
    size: f32,
    drift: f32,
    fall_speed: f32,
    phase: f32,
    _pad: f32,
};

@group(0) @binding(0) var<uniform> snow: SnowUniforms;
@group(0) @binding(1) var<uniform> camera: Camera;
@group(0) @binding(2) var<storage, read> particles: array<Particle>;

struct VertexOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) alpha: f32,
};

var<private> CORNERS: array<vec2<f32>, 6> = array<vec2<f32>, 6>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>(1.0, -1.0),
    vec2<f32>(1.0, 1.0),
    vec2<f32>(-1.0, -1.0),
    vec2<f32>(1.0, 1.0),
    vec2<f32>(-1.0, 1.0),
);

fn euclid_mod(x: f32, m: f32) -> f32 {
    return x - m * floor(x / m);
}

fn displace(p: Particle) -> vec3<f32> {
    var pos = p.position;

    let speed = p.fall_speed * 5.0 + 2.0;
    pos.y -= euclid_mod(snow.time * speed, snow.fall_height);
    if (pos.y < -snow.fall_height * 0.5) {
        pos.y += snow.fall_height;
    }

    let freq = p.drift * 2.0 + 1.0;
    let amp = p.drift * 2.0 + 0.5;
    pos.x += sin(snow.time * freq + p.phase) * amp;
    pos.z += cos(snow.time * freq * 0.8 + p.phase) * amp;

    let sep = pos - snow.attractor;
    let dist = length(sep);
    if (dist < snow.influence_radius) {
        var dir = vec3<f32>(0.0, 1.0, 0.0);
        if (dist > 1e-5) {
            dir = sep / dist;
        }
        let falloff = 1.0 - dist / snow.influence_radius;
        let force = falloff * falloff * snow.repulsion_strength;
        pos += dir * force;
        pos.y += force * snow.breeze;
    }
    return pos;
}

@vertex
fn vs_main(@builtin(vertex_index) vi: u32, @builtin(instance_index) ii: u32) -> VertexOut {
    let p = particles[ii];
    let world = displace(p);
    let view_pos = camera.view * vec4<f32>(world, 1.0);
    let depth = -view_pos.z;

    var size = 0.0;
    if (depth > 1e-4) {
        size = p.size * (snow.point_scale / depth);
    }

    let corner = CORNERS[vi];
    var clip = camera.proj * view_pos;
    clip = vec4<f32>(clip.xy + corner * (size / camera.viewport) * clip.w, clip.zw);

    var out: VertexOut;
    out.clip = clip;
    out.uv = corner * 0.5 + vec2<f32>(0.5);
    out.alpha = snow.twinkle_base + snow.twinkle_amplitude * sin(snow.time + p.phase);
    return out;
}

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let r = length(in.uv - vec2<f32>(0.5));
    if (r > 0.5) {
        discard;
    }
    let edge = pow((0.5 - r) * 2.0, snow.sprite_falloff);
    return vec4<f32>(1.0, 1.0, 1.0, edge * in.alpha * snow.sprite_opacity);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_declares_entry_points() {
        assert!(SNOW_WGSL.contains("fn vs_main"));
        assert!(SNOW_WGSL.contains("fn fs_main"));
        assert!(SNOW_WGSL.contains("var<storage, read> particles"));
    }
}
