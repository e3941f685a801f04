use cgmath::{Vector3, Vector4, Zero};
use flow_forward::{
    data_structures::light::{Light, LightSet, MAX_FORWARD_LIGHTS},
    renderer::AtlasShape,
};

fn point_light(x: f32, y: f32, z: f32) -> Light {
    Light {
        position: Vector3::new(x, y, z),
        ..Light::default()
    }
}

fn caster(size: u32) -> Light {
    let mut light = point_light(5.0, 3.0, 5.0);
    light.create_shadow_map(size, 0.5, 50.0, Vector3::new(-5.0, -3.0, -5.0));
    light
}

#[test]
fn default_light_is_a_white_point_light() {
    let light = Light::default();
    assert!(!light.is_directional());
    assert_eq!(light.diffuse_color, Vector4::new(1.0, 1.0, 1.0, 1.0));
    assert_eq!(light.ambient_intensity, 0.0);
    assert!(light.shadow_map.is_none());
}

#[test]
fn a_direction_makes_a_light_directional() {
    let light = Light {
        direction: Vector3::new(1.0, -0.5, -1.0),
        ..Light::default()
    };
    assert!(light.is_directional());
    let raw = light.to_raw(None);
    assert_eq!(raw.position[3], 0.0);
    assert!((raw.direction[0] - 2.0 / 3.0).abs() < 1e-5);
}

#[test]
fn point_lights_pack_their_position() {
    let raw = point_light(5.0, 3.0, 5.0).to_raw(None);
    assert_eq!(raw.position, [5.0, 3.0, 5.0, 1.0]);
    assert_eq!(raw.shadow[0], -1.0);
}

#[test]
fn light_without_shadow_map_has_no_shadow_frustum() {
    let light = point_light(0.0, 1.0, 0.0);
    assert!(light.shadow_view().is_none());
    assert!(light.shadow_view_projection().is_none());
    // a layer is only honoured when there is a map to sample
    assert_eq!(light.to_raw(Some(0)).shadow[0], -1.0);
}

#[test]
fn point_light_shadow_frustum_sees_its_target() {
    let light = caster(1024);
    let clip = light.shadow_view_projection().unwrap() * Vector4::new(0.0, 0.0, 0.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < 1e-4);
    assert!(ndc.y.abs() < 1e-4);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}

#[test]
fn directional_shadow_box_is_centred_on_the_origin() {
    let mut light = Light {
        direction: Vector3::new(1.0, -0.5, -1.0),
        ..Light::default()
    };
    light.create_shadow_map(2048, 0.1, 20.0, Vector3::zero());
    let clip = light.shadow_view_projection().unwrap() * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert!((clip.w - 1.0).abs() < 1e-5);
    assert!(clip.x.abs() < 1e-4);
    assert!(clip.y.abs() < 1e-4);
    assert!(clip.z > 0.0 && clip.z < 1.0);
}

#[test]
fn empty_set_has_no_lights() {
    let lights = LightSet::new();
    assert_eq!(lights.active_count(), 0);
    assert_eq!(lights.shadow_casters().count(), 0);
    assert_eq!(lights.max_shadow_size(), None);
    assert_eq!(lights.to_uniform().count[0], 0);
}

#[test]
fn replacing_a_slot_returns_the_previous_light() {
    let mut lights = LightSet::new();
    assert!(lights.set(1, point_light(1.0, 0.0, 0.0)).is_none());
    let previous = lights.set(1, point_light(2.0, 0.0, 0.0));
    assert_eq!(previous.map(|l| l.position.x), Some(1.0));
    assert_eq!(lights.active_count(), 1);
    assert!(lights.clear(1).is_some());
    assert!(lights.clear(1).is_none());
    assert!(lights.clear(MAX_FORWARD_LIGHTS).is_none());
}

#[test]
#[should_panic]
fn slots_past_the_last_panic() {
    LightSet::new().set(MAX_FORWARD_LIGHTS, Light::default());
}

#[test]
fn each_caster_gets_one_layer_in_slot_order() {
    let mut lights = LightSet::new();
    lights.set(0, caster(1024));
    lights.set(1, point_light(0.0, 0.0, 0.0));
    lights.set(3, caster(4096));

    let casters: Vec<usize> = lights.shadow_casters().map(|(slot, _)| slot).collect();
    assert_eq!(casters, vec![0, 3]);
    assert_eq!(lights.shadow_layers(), [Some(0), None, None, Some(1)]);
    assert_eq!(lights.max_shadow_size(), Some(4096));
}

#[test]
fn uniform_packs_active_lights_contiguously() {
    let mut lights = LightSet::new();
    lights.set(1, point_light(1.0, 0.0, 0.0));
    lights.set(3, caster(512));

    let uniform = lights.to_uniform();
    assert_eq!(uniform.count[0], 2);
    assert_eq!(uniform.lights[0].position[0], 1.0);
    assert_eq!(uniform.lights[0].shadow[0], -1.0);
    assert_eq!(uniform.lights[1].position[0], 5.0);
    assert_eq!(uniform.lights[1].shadow[0], 0.0);
    assert!(uniform.lights[1].shadow[1] > 0.0);
}

#[test]
fn atlas_is_a_placeholder_without_casters() {
    let mut lights = LightSet::new();
    assert_eq!(AtlasShape::for_lights(&lights, true, 8192), AtlasShape::PLACEHOLDER);
    lights.set(0, caster(1024));
    assert_eq!(AtlasShape::for_lights(&lights, false, 8192), AtlasShape::PLACEHOLDER);
}

#[test]
fn atlas_is_sized_for_the_largest_map_within_device_limits() {
    let mut lights = LightSet::new();
    lights.set(0, caster(1024));
    lights.set(2, caster(4096));
    assert_eq!(
        AtlasShape::for_lights(&lights, true, 8192),
        AtlasShape {
            size: 4096,
            layers: 2
        }
    );
    assert_eq!(
        AtlasShape::for_lights(&lights, true, 2048),
        AtlasShape {
            size: 2048,
            layers: 2
        }
    );
}
