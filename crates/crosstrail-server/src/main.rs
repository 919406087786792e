mod config;
mod ws;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use crosstrail_core::Coordinator;
use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use log::{error, info};
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::ws::{handle_connection, SharedCoordinator};

async fn handle_request(
    mut req: Request<Body>,
    addr: SocketAddr,
    coordinator: SharedCoordinator,
) -> Result<Response<Body>, Infallible> {
    if req.method() == Method::GET && req.uri().path() == "/health" {
        return Ok(text_response(StatusCode::OK, "ok"));
    }

    if hyper_tungstenite::is_upgrade_request(&req) {
        return match hyper_tungstenite::upgrade(&mut req, None) {
            Ok((response, websocket)) => {
                tokio::spawn(async move {
                    match websocket.await {
                        Ok(ws) => handle_connection(ws, addr, coordinator).await,
                        Err(e) => error!("WebSocket handshake with {} failed: {}", addr, e),
                    }
                });
                Ok(response)
            }
            Err(e) => {
                error!("WebSocket upgrade error: {}", e);
                Ok(text_response(
                    StatusCode::BAD_REQUEST,
                    "Invalid WebSocket upgrade request",
                ))
            }
        };
    }

    Ok(text_response(
        StatusCode::NOT_FOUND,
        "Not found. Use /health for health check or upgrade to WebSocket.",
    ))
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut resp = Response::new(Body::from(body));
    *resp.status_mut() = status;
    resp
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    // Healthcheck mode: exit 0 if the port is taken (server running), 1 if it is free.
    if std::env::args().any(|a| a == "--healthcheck") {
        let probe = SocketAddr::from(([127, 0, 0, 1], config.port));
        match std::net::TcpListener::bind(probe) {
            Ok(_) => std::process::exit(1),
            Err(_) => std::process::exit(0),
        }
    }

    env_logger::init();

    let addr = config.addr();
    let coordinator: SharedCoordinator = Arc::new(Mutex::new(Coordinator::new(rand::random())));

    let make_svc = make_service_fn(move |conn: &AddrStream| {
        let coordinator = coordinator.clone();
        let remote = conn.remote_addr();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                handle_request(req, remote, coordinator.clone())
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("failed to bind {}", addr))?
        .serve(make_svc);

    info!("Server listening on port: {}", addr.port());
    info!("WebSocket endpoint: ws://{}", addr);
    info!("Health check: http://{}/health", addr);

    server.await.context("server error")?;
    Ok(())
}
