use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpResponse};

use crate::dtos::post_dtos::{MessageOut, PostOut};
use crate::errors::ApiResult;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::services::post_service::PostService;
use crate::services::upload_service::UploadService;

/// GET /api/post
#[get("/post")]
pub async fn list_posts(
    svc: web::Data<PostService>,
    _user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let posts = svc.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /api/post
/// multipart/form-data: `thumbnail` file plus `title`, `description`, `content`
#[post("/post")]
pub async fn create_post(
    svc: web::Data<PostService>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let form = UploadService::read_post_form(payload).await?;
    let post = svc.create(user.user_id, form).await?;
    Ok(HttpResponse::Ok().json(PostOut { post }))
}

/// GET /api/post/{post_id}
#[get("/post/{post_id}")]
pub async fn get_post(
    svc: web::Data<PostService>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let post = svc.get(&path).await?;
    Ok(HttpResponse::Ok().json(PostOut { post }))
}

/// DELETE /api/post/{post_id}
#[delete("/post/{post_id}")]
pub async fn delete_post(
    svc: web::Data<PostService>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    svc.delete(&path, user.user_id).await?;
    Ok(HttpResponse::Ok().json(MessageOut {
        message: "Post deleted".to_string(),
    }))
}
