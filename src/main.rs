//! Pipe Dream entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent};

    use pipe_dream::audio::WebAudioSink;
    use pipe_dream::consts::{BACKGROUND_LATERAL_MULTIPLIER, FLOATING_LATERAL_MULTIPLIER};
    use pipe_dream::sim::GameEvent;
    use pipe_dream::{Session, Settings};

    struct Game {
        session: Session,
        audio: WebAudioSink,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        show_fps: bool,
        /// Outline the wrap and controller rectangles
        debug: bool,
    }

    impl Game {
        /// Client coordinates to simulation pixels
        fn to_sim(&self, client_x: f64, client_y: f64) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
            let scale = self.session.state().layout.pixel_scale as f64;
            Vec2::new(
                ((client_x - rect.left()) * dpr / scale) as f32,
                ((client_y - rect.top()) * dpr / scale) as f32,
            )
        }

        fn tap(&mut self) {
            self.audio.resume();
            self.session.tap();
        }

        fn render(&self) {
            let state = self.session.state();
            let layout = &state.layout;
            let ctx = &self.ctx;

            ctx.save();
            let scale = layout.pixel_scale as f64;
            let _ = ctx.scale(scale, scale);

            ctx.set_fill_style_str(&state.palette.bg_color.to_css(1.0));
            ctx.fill_rect(0.0, 0.0, layout.canvas.width() as f64, layout.canvas.height() as f64);

            let lateral_offset = state.controller.lateral_offset;
            for obstacle in state.store.iter().filter(|o| !o.is_deleted) {
                let Some(color) = obstacle.color else { continue };
                let pos = layout.display_position(obstacle, lateral_offset);
                let opacity = if obstacle.is_exploding() { 0.5 } else { 1.0 };
                circle(ctx, pos, obstacle.radius, &color.to_css(opacity));
            }

            if self.debug {
                self.draw_rects();
            }

            let player = &state.player;
            if player.drawn_radius > 0.0 && !state.is_front_page() {
                let color = player.eaten_color.unwrap_or(player.color);
                let pos = Vec2::new(player.pos.x + lateral_offset + layout.game_area_offset_lateral, player.pos.y);
                circle(ctx, pos, player.drawn_radius, &color.to_css(1.0));
            }

            if state.text.opacity > 0.0 {
                if let Ok(level) = state.current_level() {
                    ctx.set_fill_style_str(&state.palette.text_color.to_css(state.text.opacity));
                    ctx.set_font("bold 32px sans-serif");
                    ctx.set_text_align("center");
                    let cx = layout.canvas.width() as f64 / 2.0;
                    let cy = layout.canvas.height() as f64 / 3.0;
                    let _ = ctx.fill_text(&level.data.id.to_uppercase(), cx, cy);
                    if let Some(tip) = &level.data.tip {
                        ctx.set_font("18px sans-serif");
                        let _ = ctx.fill_text(tip, cx, cy + 36.0);
                    }
                }
            }

            ctx.set_fill_style_str(&state.palette.text_color.to_css(1.0));
            ctx.set_font("16px monospace");
            ctx.set_text_align("left");
            if state.time_allowed > 0 {
                let _ = ctx.fill_text(&format!("{}s  {}", state.time_remaining, state.score), 10.0, 24.0);
            }
            if self.show_fps {
                let _ = ctx.fill_text(&format!("{:.0} fps", self.session.clock().current_fps()), 10.0, 44.0);
            }
            ctx.restore();
        }
    }

    impl Game {
        /// Wrap rectangles, shifted the way their obstacles are drawn
        fn draw_rects(&self) {
            let state = self.session.state();
            let layout = &state.layout;
            let lateral_offset = state.controller.lateral_offset;
            let rects = [
                (&layout.background, lateral_offset * BACKGROUND_LATERAL_MULTIPLIER, "rgba(0, 128, 255, 0.6)"),
                (&layout.floating, lateral_offset * FLOATING_LATERAL_MULTIPLIER, "rgba(0, 255, 128, 0.6)"),
                (&layout.gameplay, lateral_offset + layout.game_area_offset_lateral, "rgba(255, 64, 64, 0.8)"),
                (&layout.controller, 0.0, "rgba(255, 255, 0, 0.6)"),
            ];
            self.ctx.set_line_width(1.0);
            for (rect, dx, css) in rects {
                self.ctx.set_stroke_style_str(css);
                self.ctx.stroke_rect(
                    (rect.left + dx) as f64,
                    rect.top as f64,
                    rect.width() as f64,
                    rect.height() as f64,
                );
            }
        }
    }

    fn circle(ctx: &CanvasRenderingContext2d, pos: Vec2, radius: f32, css: &str) {
        ctx.begin_path();
        let _ = ctx.arc(pos.x as f64, pos.y as f64, radius.max(0.5) as f64, 0.0, TAU);
        ctx.set_fill_style_str(css);
        ctx.fill();
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let settings = Settings::load();
        let level = if settings.debug { log::Level::Debug } else { log::Level::Info };
        if console_log::init_with_level(level).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Pipe Dream starting...");

        if let Err(e) = start(settings) {
            log::error!("Startup failed: {:?}", e);
        }
    }

    fn start(mut settings: Settings) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d")?.ok_or("no 2d context")?.dyn_into()?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = *settings.seed.get_or_insert_with(rand::random::<u64>);
        log::info!("Replay with {}", settings.to_hash());
        let session = Session::new(&settings, width as f32, height as f32, dpr as f32, seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let mut audio = WebAudioSink::new();
        audio.set_muted(settings.mute);

        let game = Rc::new(RefCell::new(Game {
            session,
            audio,
            canvas: canvas.clone(),
            ctx,
            show_fps: settings.show_fps,
            debug: settings.debug,
        }));
        // Same timebase as the animation-frame timestamps
        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        game.borrow_mut()
            .session
            .start(now)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        setup_input_handlers(&canvas, game.clone());
        setup_resize(game.clone());

        request_animation_frame(game);
        log::info!("Pipe Dream running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.to_sim(event.client_x() as f64, event.client_y() as f64);
                g.session.set_pointer(pos);
            });
            let _ = canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.to_sim(event.client_x() as f64, event.client_y() as f64);
                g.session.set_pointer(pos);
                g.tap();
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let pos = g.to_sim(touch.client_x() as f64, touch.client_y() as f64);
                    g.session.set_pointer(pos);
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if let Some(touch) = event.touches().get(0) {
                    let pos = g.to_sim(touch.client_x() as f64, touch.client_y() as f64);
                    g.session.set_pointer(pos);
                }
                g.tap();
            });
            let _ = canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut()>::new(move || {
            let Some(window) = web_sys::window() else { return };
            let mut g = game.borrow_mut();
            let dpr = window.device_pixel_ratio();
            let width = (g.canvas.client_width() as f64 * dpr) as u32;
            let height = (g.canvas.client_height() as f64 * dpr) as u32;
            g.canvas.set_width(width);
            g.canvas.set_height(height);
            if let Err(e) = g.session.resize(width as f32, height as f32, dpr as f32) {
                log::error!("Resize failed: {e}");
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut guard = game.borrow_mut();
            let g = &mut *guard;
            match g.session.on_repaint(time) {
                Ok(_) => {
                    for event in g.session.drain_events(&mut g.audio) {
                        match event {
                            GameEvent::PlaySound(_) => {}
                            other => log::info!("{:?}", other),
                        }
                    }
                    g.render();
                }
                Err(e) => log::error!("Frame failed: {e}"),
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Headless run: a minute of synthetic repaints with a wandering pointer
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use pipe_dream::audio::NullSink;
    use pipe_dream::sim::GameEvent;
    use pipe_dream::{Session, Settings};

    let mut settings = Settings::load();
    let mut logger = env_logger::Builder::from_default_env();
    if settings.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();
    log::info!("Pipe Dream (native) starting...");

    let seed = *settings.seed.get_or_insert_with(rand::random::<u64>);
    log::info!("Replay with {}", settings.to_hash());
    let mut session = match Session::new(&settings, 400.0, 800.0, 1.0, seed) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to create session: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = session.start(0.0) {
        log::error!("Failed to start: {e}");
        std::process::exit(1);
    }

    let repaint_ms = 1000.0 / 60.0;
    let mut sink = NullSink;
    let mut frames = 0u64;
    let mut events = 0usize;

    for i in 1..=3600u32 {
        let t = i as f64 * repaint_ms;
        let x = 200.0 + 150.0 * (t / 1500.0).sin() as f32;
        session.set_pointer(Vec2::new(x, 700.0));
        if i % 600 == 0 {
            session.tap();
        }

        match session.on_repaint(t) {
            Ok(n) => frames += n as u64,
            Err(e) => log::error!("Frame failed: {e}"),
        }
        for event in session.drain_events(&mut sink) {
            events += 1;
            if !matches!(event, GameEvent::PlaySound(_)) {
                log::info!("{:?}", event);
            }
        }
    }

    let state = session.state();
    println!(
        "seed {seed}: {frames} frames, {events} events, level {} ({:?}), score {}",
        state.level_index, state.phase, state.score
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
