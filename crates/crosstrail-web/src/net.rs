use std::cell::RefCell;
use std::rc::Rc;

use crosstrail_core::{decode_server_message, encode, ClientMessage};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::{RECONNECT_BASE_MS, RECONNECT_MAX_MS};
use crate::style::reconnect_delay_ms;
use crate::App;

/// Opens the coordinator socket and feeds every decoded frame to the session.
pub fn open_socket(url: &str) -> anyhow::Result<web::WebSocket> {
    let socket = web::WebSocket::new(url).map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    log::info!("[net] connecting to {}", url);
    Ok(socket)
}

pub fn wire_socket(socket: &web::WebSocket, app: Rc<RefCell<App>>) {
    let on_message = {
        let app = app.clone();
        Closure::wrap(Box::new(move |ev: web::MessageEvent| {
            let Some(text) = ev.data().as_string() else {
                log::warn!("[net] ignoring non-text frame");
                return;
            };
            match decode_server_message(&text) {
                Ok(msg) => app.borrow_mut().session.apply(msg),
                Err(e) => log::warn!("[net] dropping frame: {}", e),
            }
        }) as Box<dyn FnMut(web::MessageEvent)>)
    };
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    let on_open = {
        let app = app.clone();
        Closure::wrap(Box::new(move || {
            log::info!("[net] connected");
            app.borrow_mut().reconnect_attempts = 0;
        }) as Box<dyn FnMut()>)
    };
    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    on_open.forget();

    let on_close = Closure::wrap(Box::new(move |ev: web::CloseEvent| {
        log::warn!("[net] disconnected (code {})", ev.code());
        app.borrow_mut().session.reset();
        schedule_reconnect(app.clone());
    }) as Box<dyn FnMut(web::CloseEvent)>);
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
    on_close.forget();
}

/// Reopens the socket after a backoff delay; a fresh `init` repopulates the session.
fn schedule_reconnect(app: Rc<RefCell<App>>) {
    let delay = {
        let mut guard = app.borrow_mut();
        let delay =
            reconnect_delay_ms(guard.reconnect_attempts, RECONNECT_BASE_MS, RECONNECT_MAX_MS);
        guard.reconnect_attempts = guard.reconnect_attempts.saturating_add(1);
        delay
    };
    let Some(window) = web::window() else {
        log::error!("[net] no window; not reconnecting");
        return;
    };
    log::info!("[net] reconnecting in {} ms", delay);
    let retry = Closure::once_into_js(move || {
        let url = app.borrow().url.clone();
        match open_socket(&url) {
            Ok(socket) => {
                app.borrow_mut().socket = socket.clone();
                wire_socket(&socket, app);
            }
            Err(e) => {
                log::warn!("[net] reconnect failed: {}", e);
                schedule_reconnect(app);
            }
        }
    });
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        retry.unchecked_ref(),
        delay as i32,
    ) {
        log::error!("[net] could not schedule reconnect: {:?}", e);
    }
}

/// Sends `msg` if the socket is open; drops it otherwise.
pub fn send(socket: &web::WebSocket, msg: &ClientMessage) {
    if socket.ready_state() != web::WebSocket::OPEN {
        return;
    }
    match encode(msg) {
        Ok(text) => {
            if let Err(e) = socket.send_with_str(&text) {
                log::warn!("[net] send failed: {:?}", e);
            }
        }
        Err(e) => log::warn!("[net] encode failed: {}", e),
    }
}
