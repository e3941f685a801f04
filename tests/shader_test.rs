use flow_forward::resources::shader::validate_wgsl;

const BLEND: &str = include_str!("../assets/forwardshaders/blend.wgsl");
const DIFFUSE: &str = include_str!("../assets/forwardshaders/diffuse.wgsl");
const DIFFUSE_TEX_BUMPED_SHADOWS: &str =
    include_str!("../assets/forwardshaders/diffuse_texbumped_shadows.wgsl");
const SHADOWMAP_GENERATOR: &str = include_str!("../assets/forwardshaders/shadowmap_generator.wgsl");

#[test]
fn colour_programs_validate_with_a_fragment_stage() {
    for (name, source) in [
        ("blend", BLEND),
        ("diffuse", DIFFUSE),
        ("diffuse_texbumped_shadows", DIFFUSE_TEX_BUMPED_SHADOWS),
    ] {
        match validate_wgsl(source) {
            Ok(has_fragment) => assert!(has_fragment, "{name} has no fs_main"),
            Err(e) => panic!("{name} failed to validate:\n{e}"),
        }
    }
}

#[test]
fn shadow_map_generator_is_depth_only() {
    assert!(!validate_wgsl(SHADOWMAP_GENERATOR).unwrap());
}

#[test]
fn syntax_errors_are_reported() {
    let err = validate_wgsl("fn vs_main( -> {").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn type_errors_are_reported() {
    let source = r#"
@vertex
fn vs_main() -> @builtin(position) vec4<f32> {
    let x: f32 = vec2<f32>(1.0, 2.0);
    return vec4<f32>(x);
}
"#;
    assert!(validate_wgsl(source).is_err());
}

#[test]
fn programs_need_a_vertex_entry_point() {
    let source = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
    let err = validate_wgsl(source).unwrap_err();
    assert!(err.to_string().contains("vs_main"));
}
