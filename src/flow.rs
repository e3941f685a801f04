//! Flow control and the application event loop.
//!
//! A "flow" is the program running inside the window: it loads its
//! resources, reacts to window events and renders once per frame. [`run`]
//! owns the window, the GPU [`Context`] and the flow, and drives them from
//! winit's event loop on the main thread.
//!
//! # Lifecycle
//!
//! 1. the window and [`Context`] are created
//! 2. the [`FlowConstructor`] is awaited with an [`InitContext`]
//! 3. [`GraphicsFlow::on_init`] is called once
//! 4. every window event goes to [`GraphicsFlow::on_window_events`]
//! 5. every frame calls [`GraphicsFlow::on_update`] then [`GraphicsFlow::on_render`]
//! 6. the loop ends on a close request or once [`Context::should_close`] is set

use std::{pin::Pin, sync::Arc};

use anyhow::Context as _;
use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window},
};

use crate::{
    config::{WindowConfig, select_monitor},
    context::{Context, InitContext},
};

/// The program running inside the window.
pub trait GraphicsFlow {
    /// Called once after construction, with the live context.
    fn on_init(&mut self, ctx: &mut Context) -> anyhow::Result<()>;

    /// Handle a window event (keyboard, resize, focus, ...). Called before
    /// the loop's own handling of the event.
    fn on_window_events(&mut self, ctx: &mut Context, event: &WindowEvent);

    /// The surface was resized to a non-zero size and has already been
    /// reconfigured.
    fn on_resize(&mut self, _ctx: &Context, _width: u32, _height: u32) {}

    /// Update state every frame with the time elapsed since the last one.
    fn on_update(&mut self, ctx: &mut Context, dt: Duration);

    /// Record and present one frame.
    fn on_render(&mut self, ctx: &Context) -> Result<(), wgpu::SurfaceError>;
}

pub type FlowFuture = Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn GraphicsFlow>>>>>;

/// Asynchronously builds the flow once the GPU is available.
pub type FlowConstructor = Box<dyn FnOnce(InitContext) -> FlowFuture>;

/// Wrap an async builder such as `MyFlow::new` into a [`FlowConstructor`].
pub fn flow_constructor<F, Fut, G>(build: F) -> FlowConstructor
where
    F: FnOnce(InitContext) -> Fut + 'static,
    Fut: Future<Output = anyhow::Result<G>> + 'static,
    G: GraphicsFlow + 'static,
{
    Box::new(move |ctx: InitContext| -> FlowFuture {
        Box::pin(async move {
            let flow: Box<dyn GraphicsFlow> = Box::new(build(ctx).await?);
            Ok(flow)
        })
    })
}

struct AppState {
    ctx: Context,
    flow: Box<dyn GraphicsFlow>,
}

impl AppState {
    fn redraw(&mut self, dt: Duration) {
        self.flow.on_update(&mut self.ctx, dt);
        match self.flow.on_render(&self.ctx) {
            Ok(()) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.window().inner_size();
                self.ctx.resize(size.width, size.height);
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }
    }
}

struct App {
    async_runtime: tokio::runtime::Runtime,
    window_config: WindowConfig,
    constructor: Option<FlowConstructor>,
    state: Option<AppState>,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(window_config: WindowConfig, constructor: FlowConstructor) -> anyhow::Result<Self> {
        let async_runtime =
            tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
        Ok(Self {
            async_runtime,
            window_config,
            constructor: Some(constructor),
            state: None,
            last_time: Instant::now(),
            error: None,
        })
    }

    fn window_attributes(&self, event_loop: &ActiveEventLoop) -> winit::window::WindowAttributes {
        let config = &self.window_config;
        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(config.width, config.height));

        let monitors: Vec<_> = event_loop.available_monitors().collect();
        match select_monitor(config.desktop, monitors.len()) {
            Some(index) => {
                log::info!("Opening the window on desktop {index}");
                attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(
                    monitors[index].clone(),
                ))))
            }
            None => {
                if config.desktop >= 0 {
                    log::warn!(
                        "Desktop {} not found ({} connected), opening a regular window",
                        config.desktop,
                        monitors.len()
                    );
                }
                attributes
            }
        }
    }

    fn init(
        &self,
        event_loop: &ActiveEventLoop,
        constructor: FlowConstructor,
    ) -> anyhow::Result<AppState> {
        let window = event_loop
            .create_window(self.window_attributes(event_loop))
            .context("Failed to create the main window")?;
        let window = Arc::new(window);
        let window_config = &self.window_config;

        let (mut ctx, mut flow) = self.async_runtime.block_on(async move {
            let ctx = Context::new(window, window_config)
                .await
                .context("App initialization failed. Cannot create the main context")?;
            let flow = constructor(InitContext::from(&ctx)).await?;
            anyhow::Ok((ctx, flow))
        })?;
        flow.on_init(&mut ctx)?;
        Ok(AppState { ctx, flow })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error.get_or_insert(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructor) = self.constructor.take() else {
            return;
        };
        match self.init(event_loop, constructor) {
            Ok(state) => {
                self.last_time = Instant::now();
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.flow.on_window_events(&mut state.ctx, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    state.ctx.resize(size.width, size.height);
                    state.flow.on_resize(&state.ctx, size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.redraw(dt);
            }
            _ => {}
        }

        if state.ctx.should_close() {
            log::info!("Close requested by the flow");
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.ctx.window().request_redraw();
        }
    }
}

/// Open the window described by `window_config` and run the flow built by
/// `constructor` until the window closes.
///
/// Blocks the calling thread, which must be the main thread. Returns the
/// first setup error, if any.
pub fn run(window_config: WindowConfig, constructor: FlowConstructor) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new().context("Failed to create an event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(window_config, constructor)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
