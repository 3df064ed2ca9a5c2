pub mod health_handler;
pub mod quiz_handler;

use actix_web::web;

pub use health_handler::{health_check, health_check_ready};
pub use quiz_handler::{delete_quiz, generate_quiz, get_quiz, get_quiz_history};

/// Registers every route. History is registered before `{id}` so it is not
/// captured as an id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(generate_quiz)
        .service(get_quiz_history)
        .service(get_quiz)
        .service(delete_quiz);
}
