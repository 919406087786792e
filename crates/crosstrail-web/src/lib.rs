#![cfg(target_arch = "wasm32")]
pub mod audio;
pub mod constants;
pub mod dom;
pub mod input;
pub mod net;
pub mod render;
pub mod style;

use std::cell::RefCell;
use std::rc::Rc;

use crosstrail_core::{ClientSession, SessionConfig, Viewport};
use instant::Instant;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use crate::audio::WebAudioEngine;
use crate::constants::{FLASH_FRAMES, WS_PATH};
use crate::render::Flash;

/// Everything one browser tab owns.
pub struct App {
    pub session: ClientSession<WebAudioEngine>,
    pub socket: web::WebSocket,
    pub url: String,
    pub reconnect_attempts: u32,
    pub flashes: Vec<Flash>,
    pub frame: u64,
    pub clock: Instant,
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("crosstrail-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let (window, document) =
        dom::window_document().ok_or_else(|| anyhow::anyhow!("no window/document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let ctx2d: web::CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?
        .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let (w, h) = dom::sync_canvas_backing_size(&canvas);

    let location = window.location();
    let url = style::websocket_url(
        &location.protocol().unwrap_or_default(),
        &location.host().unwrap_or_default(),
        WS_PATH,
    );
    let socket = net::open_socket(&url)?;

    let app = Rc::new(RefCell::new(App {
        session: ClientSession::new(
            WebAudioEngine::new(),
            Viewport::new(w as f32, h as f32),
            SessionConfig::default(),
            rand::random(),
        ),
        socket: socket.clone(),
        url,
        reconnect_attempts: 0,
        flashes: Vec::new(),
        frame: 0,
        clock: Instant::now(),
    }));
    net::wire_socket(&socket, app.clone());

    // Resize: keep backing store and viewport in step
    {
        let app = app.clone();
        let canvas = canvas.clone();
        dom::listen(&window, "resize", move |_: web::Event| {
            let (w, h) = dom::sync_canvas_backing_size(&canvas);
            app.borrow_mut()
                .session
                .set_viewport(Viewport::new(w as f32, h as f32));
        })?;
    }

    // First press starts audio (browsers require a gesture)
    {
        let app = app.clone();
        dom::listen(&canvas, "pointerdown", move |_: web::PointerEvent| {
            let mut app = app.borrow_mut();
            if app.session.audio_started() {
                return;
            }
            if let Err(e) = app.session.engine_mut().resume() {
                log::error!("[gesture] audio start failed: {:?}", e);
                return;
            }
            log::info!("[gesture] audio started");
            app.session.start_audio();
        })?;
    }

    // Pointer sampling: local trail + crossing feedback, throttled network move
    {
        let app = app.clone();
        let canvas_for_move = canvas.clone();
        dom::listen(&canvas, "pointermove", move |ev: web::PointerEvent| {
            let mut app = app.borrow_mut();
            let p = input::pointer_canvas_px(&ev, &canvas_for_move);
            let now = app.clock.elapsed();
            let outcome = app.session.pointer_moved(p, now);
            if let Some(msg) = &outcome.outbound {
                net::send(&app.socket, msg);
            }
            if let Some(id) = outcome.crossed {
                app.flashes.push(Flash {
                    id,
                    frames_left: FLASH_FRAMES,
                });
            }
        })?;
    }

    // Render loop
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        {
            let mut guard = app.borrow_mut();
            let app = &mut *guard;
            app.frame = app.frame.wrapping_add(1);
            render::draw_frame(&ctx2d, &app.session, &mut app.flashes, app.frame);
        }
        if let Some(w) = web::window() {
            if let Some(cb) = tick_clone.borrow().as_ref() {
                let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut()>));
    if let Some(cb) = tick.borrow().as_ref() {
        window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    }

    Ok(())
}
