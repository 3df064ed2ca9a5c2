use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::{
        request::{GenerateQuizRequest, HistoryParams},
        response::{MessageResponse, QuizBundleResponse, QuizHistoryResponse},
    },
};

#[post("/api/quiz/generate")]
pub async fn generate_quiz(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<GenerateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let request_id = get_request_id(&req);
    log::info!(
        "[{}] Generating {} questions for {}",
        request_id,
        request.num_questions(),
        request.url
    );

    let bundle = state
        .quiz_service
        .generate(&request.url, request.num_questions())
        .await
        .inspect_err(|e| log::warn!("[{}] Generation for {} failed: {}", request_id, request.url, e))?;

    Ok(HttpResponse::Ok().json(QuizBundleResponse::from(bundle)))
}

#[get("/api/quiz/history")]
pub async fn get_quiz_history(
    state: web::Data<AppState>,
    params: web::Query<HistoryParams>,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();
    params.validate()?;

    let (page, limit) = (params.page(), params.limit());
    let (bundles, total) = state
        .quiz_service
        .list_history(page, limit, params.search())
        .await?;

    Ok(HttpResponse::Ok().json(QuizHistoryResponse::new(bundles, total, page, limit)))
}

#[get("/api/quiz/{id}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let bundle = state.quiz_service.get_quiz(&id).await?;
    Ok(HttpResponse::Ok().json(QuizBundleResponse::from(bundle)))
}

#[delete("/api/quiz/{id}")]
pub async fn delete_quiz(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    state.quiz_service.delete_quiz(&id).await?;
    log::info!("[{}] Deleted quiz {}", get_request_id(&req), id);

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Quiz {} deleted successfully", id),
    }))
}
