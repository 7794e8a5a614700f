//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod health;
mod page;
mod posts;
mod profile;


use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            ),
    )
    .route("/", web::get().to(posts::index))
    .route("/category/{slug}/", web::get().to(categories::category_posts))
    .service(
        web::resource("/profile/edit/")
            .route(web::get().to(profile::edit_form))
            .route(web::post().to(profile::edit)),
    )
    .route("/profile/{username}/", web::get().to(profile::profile))
    .service(
        web::resource("/posts/create/")
            .route(web::get().to(posts::create_form))
            .route(web::post().to(posts::create)),
    )
    .route("/posts/{id}/", web::get().to(posts::detail))
    .service(
        web::resource("/posts/{id}/edit/")
            .route(web::get().to(posts::edit_form))
            .route(web::post().to(posts::edit)),
    )
    .route("/posts/{id}/delete/", web::post().to(posts::delete))
    .route("/posts/{id}/comment/", web::post().to(comments::add))
    .route(
        "/posts/{id}/edit_comment/{comment_id}/",
        web::post().to(comments::edit),
    )
    .route(
        "/posts/{id}/delete_comment/{comment_id}/",
        web::post().to(comments::delete),
    );
}
