//! Authentication route handlers
//!
//! - Registration, login, logout and token refresh
//! - Email verification and password reset by emailed code
//! - Profile, password, 2FA, sessions and account deletion

pub mod account;
pub mod email;
pub mod session;

use actix_web::web;

use crate::middleware::JwtAuth;

/// Mounts the `/auth` scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register/", web::post().to(session::register))
            .route("/login/", web::post().to(session::login))
            .route("/token/refresh/", web::post().to(session::refresh))
            .route("/email/verify/", web::post().to(email::verify_email))
            .route("/email/resend/", web::post().to(email::resend_verification))
            .route("/email/check/", web::post().to(email::check_email))
            .route("/username/check/", web::post().to(email::check_username))
            .route("/password/reset/", web::post().to(email::request_password_reset))
            .route("/password/reset/confirm/", web::post().to(email::confirm_password_reset))
            .service(
                web::resource("/logout/")
                    .wrap(JwtAuth::new())
                    .route(web::post().to(session::logout)),
            )
            .service(
                web::resource("/profile/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(account::get_profile))
                    .route(web::patch().to(account::update_profile)),
            )
            .service(
                web::resource("/password/change/")
                    .wrap(JwtAuth::new())
                    .route(web::post().to(account::change_password)),
            )
            .service(
                web::resource("/2fa/toggle/")
                    .wrap(JwtAuth::new())
                    .route(web::post().to(account::toggle_two_factor)),
            )
            .service(
                web::resource("/stats/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(account::stats)),
            )
            .service(
                web::resource("/security/log/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(account::security_log)),
            )
            .service(
                web::resource("/sessions/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(account::list_sessions)),
            )
            .service(
                web::resource("/sessions/{id}/")
                    .wrap(JwtAuth::new())
                    .route(web::delete().to(account::revoke_session)),
            )
            .service(
                web::resource("/delete/")
                    .wrap(JwtAuth::new())
                    .route(web::delete().to(account::delete_account)),
            ),
    );
}
