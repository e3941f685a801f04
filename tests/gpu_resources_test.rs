#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod gpu {
    use std::sync::Arc;

    use flow_forward::{
        config::RendererSettings,
        data_structures::{model::Mesh, renderable::Renderable},
        render::Render,
        renderer::ForwardRenderer,
        resources::{
            shader::ShaderProgram,
            texture::{TextureManager, TextureRequest},
        },
    };

    use crate::common::{HEIGHT, WIDTH, headless_context};

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(future)
    }

    #[test]
    fn bundled_shaders_load() {
        let Some(ctx) = block_on(headless_context()) else {
            eprintln!("no adapter, skipping");
            return;
        };
        for (path, colour) in [
            ("forwardshaders/blend", true),
            ("forwardshaders/diffuse", true),
            ("forwardshaders/diffuse_texbumped_shadows", true),
            ("forwardshaders/shadowmap_generator", false),
        ] {
            let program = block_on(ShaderProgram::from_file(&ctx.device, &ctx.assets, path)).unwrap();
            assert_eq!(program.has_fragment(), colour, "{path}");
        }
    }

    #[test]
    fn missing_shader_names_the_file() {
        let Some(ctx) = block_on(headless_context()) else {
            return;
        };
        let err = block_on(ShaderProgram::from_file(&ctx.device, &ctx.assets, "forwardshaders/nope"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("nope.wgsl"));
    }

    #[test]
    fn textures_are_cached_by_key() {
        let Some(ctx) = block_on(headless_context()) else {
            return;
        };
        let mut textures = TextureManager::new(ctx.assets.clone());
        let loaded = block_on(textures.load_textures(
            &ctx.device,
            &ctx.queue,
            &[
                TextureRequest {
                    key: "explosion",
                    file_name: "textures/explosion00.png",
                    is_normal_map: false,
                },
                TextureRequest {
                    key: "cube_normals",
                    file_name: "textures/TestCube_N.png",
                    is_normal_map: true,
                },
            ],
        ))
        .unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(textures.len(), 2);
        assert!(Arc::ptr_eq(&loaded[0], &textures.get("explosion").unwrap()));

        assert!(textures.destroy("explosion"));
        assert!(!textures.destroy("explosion"));
        assert!(textures.get("explosion").is_none());
        // materials holding the handle keep the texture alive
        assert_eq!(Arc::strong_count(&loaded[0]), 1);
    }

    #[test]
    fn loading_into_a_used_key_replaces_the_texture() {
        let Some(ctx) = block_on(headless_context()) else {
            return;
        };
        let mut textures = TextureManager::new(ctx.assets.clone());
        let first = block_on(textures.load_texture(
            &ctx.device,
            &ctx.queue,
            "cube",
            "textures/TestCube_D.png",
            false,
        ))
        .unwrap();
        let second = block_on(textures.load_texture(
            &ctx.device,
            &ctx.queue,
            "cube",
            "textures/TestCube_N.png",
            true,
        ))
        .unwrap();

        assert_eq!(textures.len(), 1);
        let cached = textures.get("cube").unwrap();
        assert!(Arc::ptr_eq(&cached, &second));
        assert!(!Arc::ptr_eq(&cached, &first));
        assert_eq!(second.texture.format(), wgpu::TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn a_missing_texture_fails_the_whole_batch() {
        let Some(ctx) = block_on(headless_context()) else {
            return;
        };
        let mut textures = TextureManager::new(ctx.assets.clone());
        let result = block_on(textures.load_textures(
            &ctx.device,
            &ctx.queue,
            &[
                TextureRequest {
                    key: "explosion",
                    file_name: "textures/explosion00.png",
                    is_normal_map: false,
                },
                TextureRequest {
                    key: "missing",
                    file_name: "textures/missing.png",
                    is_normal_map: false,
                },
            ],
        ));
        assert!(result.is_err());
        assert!(textures.is_empty());
    }

    #[test]
    fn composed_renders_flatten_in_submission_order() {
        let Some(ctx) = block_on(headless_context()) else {
            return;
        };
        let plane = Arc::new(Mesh::plane_xy(&ctx.device, "plane", -0.5, 0.5, 0.5, -0.5));
        let cube = Arc::new(Mesh::cube(&ctx.device, "cube", [-0.5; 3], [0.5; 3]));
        assert_eq!(plane.num_elements, 6);
        assert_eq!(cube.num_elements, 36);

        let smoke = Renderable::new(plane.clone());
        let floor = Renderable::new(plane);
        let boxes = vec![Renderable::new(cube.clone()), Renderable::new(cube)];
        assert_ne!(smoke.id(), floor.id());

        let render = Render::Composed(vec![
            Render::from(&smoke),
            Render::None,
            Render::from(&boxes),
            Render::Defaults(vec![&floor]),
        ]);
        let ids: Vec<u32> = render.flatten().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![smoke.id(), boxes[0].id(), boxes[1].id(), floor.id()]);
        assert!(!render.is_empty());
        assert!(Render::Composed(vec![Render::None, Render::Defaults(vec![])]).is_empty());
    }

    #[test]
    fn renderer_starts_without_shadows_at_the_surface_size() {
        let Some(ctx) = block_on(headless_context()) else {
            return;
        };
        let mut renderer = ForwardRenderer::new(&ctx, RendererSettings {
            alpha_blending: true,
        });
        assert!(!renderer.shadows_enabled());
        assert!(renderer.settings().alpha_blending);
        assert_eq!(renderer.resolution(), (WIDTH, HEIGHT));
        assert_eq!(renderer.cached_objects(), 0);
        assert_eq!(renderer.lights.active_count(), 0);

        renderer.setup_shadow_map_rendering();
        renderer.change_resolution(800, 600);
        assert!(renderer.shadows_enabled());
        assert!((renderer.aspect() - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(renderer.new_light(), Default::default());
    }
}
