//! The bare minimum: one window, one light, an orbit camera and a cube.
//!
//! Space toggles the cube on and off, Escape closes the window.

use std::{f32::consts::PI, sync::Arc};

use anyhow::Context as _;
use cgmath::{Rad, Vector3, Vector4};
use clap::Parser;
use flow_forward::{
    Color, Duration, KeyCode, SurfaceError, WindowEvent,
    camera::{OrbitCamera, Projection},
    config::{Args, RendererSettings, WindowConfig},
    context::{Context, InitContext},
    data_structures::{model::Mesh, renderable::Renderable},
    flow::{self, GraphicsFlow, flow_constructor},
    input::KeyboardModel,
    render::Render,
    renderer::{ForwardRenderer, ScenePass},
    resources::shader::ShaderProgram,
};

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;
const DIFFUSE_SHADER_PATH: &str = "forwardshaders/diffuse";

const CLEAR_COLOUR: Color = Color {
    r: 0.25,
    g: 0.25,
    b: 0.25,
    a: 1.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Close,
    ToggleModel,
}

fn keyboard() -> KeyboardModel<Action> {
    let mut keyboard = KeyboardModel::new();
    keyboard
        .bind_trigger(KeyCode::Escape, Action::Close)
        .bind_trigger(KeyCode::Space, Action::ToggleModel);
    keyboard
}

/// Empty `objects` if it holds anything, otherwise add the one built by `make`.
fn toggle<T>(objects: &mut Vec<T>, make: impl FnOnce() -> T) {
    if objects.is_empty() {
        objects.push(make());
    } else {
        objects.clear();
    }
}

struct CubeBreak {
    renderer: ForwardRenderer,
    keyboard: KeyboardModel<Action>,
    diffuse_shader: Arc<ShaderProgram>,
    cube: Arc<Mesh>,
    objects: Vec<Renderable>,
    camera: OrbitCamera,
}

impl CubeBreak {
    async fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let diffuse_shader = ShaderProgram::from_file(&ctx.device, &ctx.assets, DIFFUSE_SHADER_PATH)
            .await
            .context("Failed to compile and link the diffuse shader program")?;

        let mut renderer = ForwardRenderer::new(&ctx, RendererSettings::default());
        renderer.change_resolution(WINDOW_WIDTH, WINDOW_HEIGHT);

        let mut light = renderer.new_light();
        light.diffuse_color = Vector4::new(1.0, 1.0, 1.0, 1.0);
        light.direction = Vector3::new(1.0, -0.5, -1.0);
        light.diffuse_intensity = 0.7;
        light.specular_intensity = 0.1;
        light.ambient_intensity = 0.2;
        light.attenuation = 1.0;
        renderer.lights.set(0, light);

        Ok(Self {
            renderer,
            keyboard: keyboard(),
            diffuse_shader: Arc::new(diffuse_shader),
            cube: Arc::new(Mesh::cube(&ctx.device, "cube", [-1.0; 3], [1.0; 3])),
            objects: Vec::new(),
            camera: OrbitCamera::new((0.0, 0.0, 0.0), Rad(PI / 2.0), 5.0, Rad(PI / 2.0)),
        })
    }

    /// Toggle the cube, building a fresh one only when it is added.
    fn toggle_cube(&mut self) {
        let Self {
            objects,
            cube,
            diffuse_shader,
            ..
        } = self;
        toggle(objects, || make_cube(cube, diffuse_shader));
    }
}

fn make_cube(mesh: &Arc<Mesh>, shader: &Arc<ShaderProgram>) -> Renderable {
    let mut object = Renderable::new(mesh.clone());
    object.material.shader = Some(shader.clone());
    object.material.diffuse_color = Vector4::new(0.9, 0.05, 0.05, 1.0);
    object.material.specular_color = Vector4::new(1.0, 1.0, 1.0, 1.0);
    object
}

impl GraphicsFlow for CubeBreak {
    fn on_init(&mut self, _ctx: &mut Context) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_window_events(&mut self, _ctx: &mut Context, event: &WindowEvent) {
        self.keyboard.handle_window_event(event);
    }

    fn on_resize(&mut self, _ctx: &Context, width: u32, height: u32) {
        self.renderer.change_resolution(width, height);
    }

    fn on_update(&mut self, ctx: &mut Context, _dt: Duration) {
        for action in self.keyboard.check_key_presses() {
            match action {
                Action::Close => ctx.set_should_close(true),
                Action::ToggleModel => {
                    self.toggle_cube();
                    log::info!("{} object(s) active", self.objects.len());
                }
            }
        }
    }

    fn on_render(&mut self, ctx: &Context) -> Result<(), SurfaceError> {
        let mut frame = self.renderer.begin_frame(ctx)?;

        let (width, height) = self.renderer.resolution();
        let projection = Projection::new(width, height, Rad(PI / 3.0), 1.0, 100.0);
        let scene = ScenePass::new(CLEAR_COLOUR, &self.camera, &projection);
        self.renderer
            .render_scene(&mut frame, &scene, &Render::from(&self.objects));

        frame.present(ctx);
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let window = WindowConfig::new("Simple Cube", WINDOW_WIDTH, WINDOW_HEIGHT)
        .with_vsync(false)
        .with_args(&args);
    flow::run(window, flow_constructor(CubeBreak::new))
}

#[cfg(test)]
mod tests {
    use flow_forward::ElementState;

    use super::*;

    #[test]
    fn toggling_alternates_between_empty_and_one_object() {
        let mut objects = Vec::new();
        toggle(&mut objects, || 1);
        assert_eq!(objects, vec![1]);
        toggle(&mut objects, || 2);
        assert!(objects.is_empty());
        toggle(&mut objects, || 3);
        assert_eq!(objects, vec![3]);
    }

    #[test]
    fn clearing_does_not_build_a_new_object() {
        let mut objects = vec![1];
        toggle(&mut objects, || -> i32 { panic!("built while clearing") });
        assert!(objects.is_empty());
    }

    #[test]
    fn escape_closes_and_space_toggles() {
        let mut keyboard = keyboard();
        keyboard.handle_key(KeyCode::Space, ElementState::Pressed, false);
        keyboard.handle_key(KeyCode::Space, ElementState::Released, false);
        keyboard.handle_key(KeyCode::Escape, ElementState::Pressed, false);
        assert_eq!(
            keyboard.check_key_presses(),
            vec![Action::ToggleModel, Action::Close]
        );
    }

    #[test]
    fn holding_space_toggles_once() {
        let mut keyboard = keyboard();
        keyboard.handle_key(KeyCode::Space, ElementState::Pressed, false);
        keyboard.handle_key(KeyCode::Space, ElementState::Pressed, true);
        keyboard.handle_key(KeyCode::Space, ElementState::Pressed, true);
        assert_eq!(keyboard.check_key_presses(), vec![Action::ToggleModel]);
        assert!(keyboard.check_key_presses().is_empty());
    }
}
