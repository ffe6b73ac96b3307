use super::Arbiter;
use super::handlers;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;

pub struct Server;

impl Server {
    pub async fn run(arbiter: web::Data<Arbiter>, bind: &str) -> Result<(), std::io::Error> {
        log::info!("starting arbiter server on {}", bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(arbiter.clone())
                .route("/", web::get().to(handlers::index))
                .route("/pr", web::post().to(handlers::submit_pr))
                .route("/vote/{proposal_id}", web::post().to(handlers::submit_vote))
                .route("/turn-failed", web::post().to(handlers::turn_failed))
        })
        .workers(4)
        .bind(bind)?
        .run()
        .await
    }
}
