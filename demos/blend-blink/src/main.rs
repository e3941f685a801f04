//! Alpha-blended smoke billboard in front of a normal-mapped cube and floor,
//! lit by one shadow-casting point light.

use std::sync::Arc;

use anyhow::Context as _;
use cgmath::{Deg, Vector3, Vector4};
use clap::Parser;
use flow_forward::{
    Color, Duration, SurfaceError, WindowEvent,
    camera::{Projection, YawPitchCamera},
    config::{Args, RendererSettings, WindowConfig},
    context::{Context, InitContext},
    data_structures::{model::Mesh, renderable::Renderable},
    flow::{self, GraphicsFlow, flow_constructor},
    render::Render,
    renderer::{ForwardRenderer, ScenePass},
    resources::{
        shader::ShaderProgram,
        texture::{TextureManager, TextureRequest},
    },
};

const WINDOW_WIDTH: u32 = 640;
const WINDOW_HEIGHT: u32 = 480;

const BLEND_SHADER_PATH: &str = "forwardshaders/blend";
const DIFFUSE_TEX_BUMPED_SHADER_PATH: &str = "forwardshaders/diffuse_texbumped_shadows";
const SHADOWMAP_SHADER_PATH: &str = "forwardshaders/shadowmap_generator";

const EXPLOSION_PATH: &str = "textures/explosion00.png";
const TEST_DIFFUSE_PATH: &str = "textures/TestCube_D.png";
const TEST_NORMALS_PATH: &str = "textures/TestCube_N.png";

const CLEAR_COLOUR: Color = Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 0.9,
};

struct BlendBlink {
    renderer: ForwardRenderer,
    // Keeps the loaded textures addressable by key for the flow's lifetime.
    _textures: TextureManager,
    shadowmap_shader: Arc<ShaderProgram>,
    smoke: Renderable,
    floor_plane: Renderable,
    test_cube: Renderable,
    camera: YawPitchCamera,
    projection: Projection,
}

impl BlendBlink {
    async fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let device = &ctx.device;

        let blend_shader = ShaderProgram::from_file(device, &ctx.assets, BLEND_SHADER_PATH)
            .await
            .context("Failed to compile and link the color shader program")?;
        let diffuse_tex_bumped_shader =
            ShaderProgram::from_file(device, &ctx.assets, DIFFUSE_TEX_BUMPED_SHADER_PATH)
                .await
                .context("Failed to compile and link the diffuse shader program")?;
        let shadowmap_shader = ShaderProgram::from_file(device, &ctx.assets, SHADOWMAP_SHADER_PATH)
            .await
            .context("Failed to compile and link the shadowmap generator shader program")?;
        let blend_shader = Arc::new(blend_shader);
        let diffuse_tex_bumped_shader = Arc::new(diffuse_tex_bumped_shader);

        let mut textures = TextureManager::new(ctx.assets.clone());
        let loaded = textures
            .load_textures(
                device,
                &ctx.queue,
                &[
                    TextureRequest {
                        key: "explosion",
                        file_name: EXPLOSION_PATH,
                        is_normal_map: false,
                    },
                    TextureRequest {
                        key: "cube_diffuse",
                        file_name: TEST_DIFFUSE_PATH,
                        is_normal_map: false,
                    },
                    TextureRequest {
                        key: "cube_normals",
                        file_name: TEST_NORMALS_PATH,
                        is_normal_map: true,
                    },
                ],
            )
            .await?;
        let [explosion_tex, diffuse_tex, normals_tex] = <[_; 3]>::try_from(loaded)
            .map_err(|_| anyhow::anyhow!("expected three loaded textures"))?;

        let plane = Arc::new(Mesh::plane_xy(device, "plane", -0.5, 0.5, 0.5, -0.5));
        let cube = Arc::new(Mesh::cube(device, "test cube", [-0.5; 3], [0.5; 3]));

        let mut smoke = Renderable::new(plane.clone());
        smoke.transform.scale = Vector3::new(10.0, 10.0, 10.0);
        smoke.material.diffuse_color = Vector4::new(1.0, 0.0, 0.0, 0.5);
        smoke.material.shininess = 3.0;
        smoke.material.tex0 = Some(explosion_tex);
        smoke.material.shader = Some(blend_shader);
        smoke.transform.location = Vector3::new(0.0, 0.0, 0.0);

        let mut floor_plane = Renderable::new(plane);
        floor_plane.transform.scale = Vector3::new(10.0, 10.0, 10.0);
        floor_plane.material.diffuse_color = Vector4::new(1.0, 1.0, 1.0, 1.0);
        floor_plane.material.specular_color = Vector4::new(0.3, 0.3, 0.3, 1.0);
        floor_plane.material.shininess = 3.0;
        floor_plane.material.tex0 = Some(diffuse_tex.clone());
        floor_plane.material.tex1 = Some(normals_tex.clone());
        floor_plane.material.shader = Some(diffuse_tex_bumped_shader.clone());
        floor_plane.transform.location = Vector3::new(0.0, 0.0, -2.0);

        let mut test_cube = Renderable::new(cube);
        test_cube.material.diffuse_color = Vector4::new(1.0, 1.0, 1.0, 1.0);
        test_cube.material.specular_color = Vector4::new(0.3, 0.3, 0.3, 1.0);
        test_cube.material.shininess = 6.0;
        test_cube.material.tex0 = Some(diffuse_tex);
        test_cube.material.tex1 = Some(normals_tex);
        test_cube.material.shader = Some(diffuse_tex_bumped_shader);

        let mut renderer = ForwardRenderer::new(&ctx, RendererSettings {
            alpha_blending: true,
        });
        renderer.setup_shadow_map_rendering();

        let mut light = renderer.new_light();
        light.position = Vector3::new(5.0, 3.0, 5.0);
        light.diffuse_color = Vector4::new(0.9, 0.9, 0.9, 1.0);
        light.diffuse_intensity = 30.0;
        light.ambient_intensity = 0.5;
        light.attenuation = 0.2;
        renderer.lights.set(0, light);
        if let Some(light) = renderer.lights.get_mut(0) {
            light.create_shadow_map(4096, 0.5, 50.0, Vector3::new(-5.0, -3.0, -5.0));
        }

        let mut camera = YawPitchCamera::new((0.0, -10.0, 10.0));
        camera.set_yaw_and_pitch(Deg(0.0), Deg(-45.0));
        let projection = Projection::new(WINDOW_WIDTH, WINDOW_HEIGHT, Deg(60.0), 0.1, 50.0);

        Ok(Self {
            renderer,
            _textures: textures,
            shadowmap_shader: Arc::new(shadowmap_shader),
            smoke,
            floor_plane,
            test_cube,
            camera,
            projection,
        })
    }
}

impl GraphicsFlow for BlendBlink {
    fn on_init(&mut self, _ctx: &mut Context) -> anyhow::Result<()> {
        log::info!(
            "{} light(s), {} casting shadows",
            self.renderer.lights.active_count(),
            self.renderer.lights.shadow_casters().count()
        );
        Ok(())
    }

    fn on_window_events(&mut self, _ctx: &mut Context, _event: &WindowEvent) {}

    fn on_update(&mut self, _ctx: &mut Context, _dt: Duration) {}

    fn on_render(&mut self, ctx: &Context) -> Result<(), SurfaceError> {
        let mut frame = self.renderer.begin_frame(ctx)?;

        let casters = Render::Defaults(vec![&self.test_cube, &self.floor_plane]);
        self.renderer
            .render_shadow_maps(&mut frame, &self.shadowmap_shader, &casters);

        let scene = ScenePass::new(CLEAR_COLOUR, &self.camera, &self.projection);
        let objects = Render::Defaults(vec![&self.smoke, &self.test_cube, &self.floor_plane]);
        self.renderer.render_scene(&mut frame, &scene, &objects);

        frame.present(ctx);
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let window = WindowConfig::new("go", WINDOW_WIDTH, WINDOW_HEIGHT)
        .with_vsync(true)
        .with_args(&args);
    flow::run(window, flow_constructor(BlendBlink::new))
}
