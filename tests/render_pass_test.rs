#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod gpu {
    use std::sync::Arc;

    use cgmath::{Deg, Vector3};
    use flow_forward::{
        Color,
        camera::{Projection, YawPitchCamera},
        config::RendererSettings,
        context::InitContext,
        data_structures::{model::Mesh, renderable::Renderable},
        render::Render,
        renderer::{ForwardRenderer, Frame, ScenePass},
        resources::shader::ShaderProgram,
    };

    use crate::common::{
        HEIGHT, WIDTH, colour_target, depth_target, headless_context, read_pixels,
    };

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(future)
    }

    fn shader(ctx: &InitContext, path: &str) -> Arc<ShaderProgram> {
        Arc::new(block_on(ShaderProgram::from_file(&ctx.device, &ctx.assets, path)).unwrap())
    }

    fn offscreen_frame(
        ctx: &InitContext,
        renderer: &mut ForwardRenderer,
    ) -> (wgpu::Texture, Frame) {
        let colour = colour_target(ctx);
        let depth = depth_target(ctx);
        let view = colour.create_view(&wgpu::TextureViewDescriptor::default());
        let frame = renderer.begin_offscreen_frame(view, depth.view.clone());
        (colour, frame)
    }

    fn scene(clear_colour: Color) -> ScenePass {
        let camera = YawPitchCamera::new((0.0, 0.0, 5.0));
        let projection = Projection::new(WIDTH, HEIGHT, Deg(60.0), 0.1, 50.0);
        ScenePass::new(clear_colour, &camera, &projection)
    }

    /// A cube drawn with `shader`.
    fn cube(ctx: &InitContext, shader: &Arc<ShaderProgram>) -> Renderable {
        let mesh = Arc::new(Mesh::cube(&ctx.device, "cube", [-0.5; 3], [0.5; 3]));
        let mut cube = Renderable::new(mesh);
        cube.material.shader = Some(shader.clone());
        cube
    }

    #[test]
    fn shadow_pass_runs_once_per_caster() {
        let Some(ctx) = block_on(headless_context()) else {
            eprintln!("no adapter, skipping");
            return;
        };
        let generator = shader(&ctx, "forwardshaders/shadowmap_generator");
        let diffuse = shader(&ctx, "forwardshaders/diffuse");
        let cube = cube(&ctx, &diffuse);
        let casters = Render::from(&cube);

        let mut renderer = ForwardRenderer::new(&ctx, RendererSettings::default());
        let mut caster = renderer.new_light();
        caster.position = Vector3::new(0.0, 5.0, 0.0);
        caster.create_shadow_map(256, 0.1, 20.0, Vector3::new(0.0, -1.0, 0.0));
        renderer.lights.set(0, caster);
        let mut fill = renderer.new_light();
        fill.direction = Vector3::new(0.0, 0.0, -1.0);
        renderer.lights.set(2, fill);

        let (_, mut frame) = offscreen_frame(&ctx, &mut renderer);
        assert_eq!(
            renderer.render_shadow_maps(&mut frame, &generator, &casters),
            0,
            "shadow rendering is not set up yet"
        );
        frame.submit(&ctx.queue);

        renderer.setup_shadow_map_rendering();
        for _ in 0..2 {
            let (_, mut frame) = offscreen_frame(&ctx, &mut renderer);
            assert_eq!(
                renderer.render_shadow_maps(&mut frame, &generator, &casters),
                1
            );
            renderer.render_scene(&mut frame, &scene(Color::BLACK), &casters);
            frame.submit(&ctx.queue);
        }
        assert_eq!(renderer.cached_objects(), 1);

        renderer.lights.clear(0);
        let (_, mut frame) = offscreen_frame(&ctx, &mut renderer);
        assert_eq!(
            renderer.render_shadow_maps(&mut frame, &generator, &casters),
            0
        );
        frame.submit(&ctx.queue);
    }

    #[test]
    fn scene_pass_clears_to_the_given_colour() {
        let Some(ctx) = block_on(headless_context()) else {
            return;
        };
        let mut renderer = ForwardRenderer::new(&ctx, RendererSettings::default());
        let (colour, mut frame) = offscreen_frame(&ctx, &mut renderer);
        let clear = Color {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        };
        renderer.render_scene(&mut frame, &scene(clear), &Render::None);
        frame.submit(&ctx.queue);

        let pixels = block_on(read_pixels(&ctx, &colour));
        for pixel in pixels.pixels() {
            assert_eq!(*pixel, image::Rgba([255, 0, 0, 255]));
        }
    }

    #[test]
    fn scene_pass_draws_shaded_objects_over_the_clear_colour() {
        let Some(ctx) = block_on(headless_context()) else {
            return;
        };
        let diffuse = shader(&ctx, "forwardshaders/diffuse");
        let mut cube = cube(&ctx, &diffuse);
        cube.material.diffuse_color = cgmath::Vector4::new(1.0, 1.0, 1.0, 1.0);
        let unshaded = Renderable::new(cube.mesh.clone());

        let mut renderer = ForwardRenderer::new(&ctx, RendererSettings::default());
        let mut light = renderer.new_light();
        light.direction = Vector3::new(0.0, 0.0, -1.0);
        light.ambient_intensity = 1.0;
        renderer.lights.set(0, light);

        let (colour, mut frame) = offscreen_frame(&ctx, &mut renderer);
        let objects = Render::Defaults(vec![&cube, &unshaded]);
        renderer.render_scene(&mut frame, &scene(Color::BLACK), &objects);
        frame.submit(&ctx.queue);
        // the unshaded renderable is skipped and holds no GPU state
        assert_eq!(renderer.cached_objects(), 1);

        let pixels = block_on(read_pixels(&ctx, &colour));
        let centre = pixels.get_pixel(WIDTH / 2, HEIGHT / 2);
        let corner = pixels.get_pixel(0, 0);
        assert_ne!(centre.0[..3], [0, 0, 0]);
        assert_eq!(*corner, image::Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn zero_resolutions_are_ignored() {
        let Some(ctx) = block_on(headless_context()) else {
            return;
        };
        let mut renderer = ForwardRenderer::new(&ctx, RendererSettings::default());
        renderer.change_resolution(0, 600);
        renderer.change_resolution(800, 0);
        assert_eq!(renderer.resolution(), (WIDTH, HEIGHT));
    }
}
