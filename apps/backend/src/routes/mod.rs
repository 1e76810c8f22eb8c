use actix_web::web;

pub mod games;
pub mod health;
pub mod realtime;

/// Configure application routes for the server and for test harnesses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check: /health
    cfg.configure(health::configure_routes);

    // Games routes: /api/games/**
    cfg.service(web::scope("/api/games").configure(games::configure_routes));

    // Realtime upgrade: /ws
    cfg.service(web::scope("/ws").configure(realtime::configure_routes));
}
