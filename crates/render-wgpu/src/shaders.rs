/// WGSL for scene meshes: ambient Lambert plus emission, faded into the fog
/// color by view depth.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    fog_color: vec4<f32>,
    // x = near, y = far
    fog_range: vec4<f32>,
    // rgb = ambient color * intensity
    ambient: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
};

struct InstanceInput {
    @location(1) model_0: vec4<f32>,
    @location(2) model_1: vec4<f32>,
    @location(3) model_2: vec4<f32>,
    @location(4) model_3: vec4<f32>,
    @location(5) color: vec4<f32>,
    @location(6) emissive: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) emissive: vec3<f32>,
    @location(2) fog_depth: f32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let view_pos = uniforms.view * world_pos;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.color = instance.color;
    out.emissive = instance.emissive.rgb;
    out.fog_depth = -view_pos.z;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let lit = in.color.rgb * uniforms.ambient.rgb + in.emissive;
    let fog = smoothstep(uniforms.fog_range.x, uniforms.fog_range.y, in.fog_depth);
    let rgb = mix(lit, uniforms.fog_color.rgb, fog);
    return vec4<f32>(rgb, in.color.a);
}
"#;
