use super::auth_context;
use crate::models::*;
use crate::services::ParticipantService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/participants",
    tag = "participant",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "未中奖人员列表", body = [ParticipantResponse]),
        (status = 403, description = "仅管理员可查看")
    )
)]
pub async fn list_eligible(
    service: web::Data<ParticipantService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.list_eligible(&ctx).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/participants/all",
    tag = "participant",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部人员 (含中奖信息)", body = [ParticipantDetailResponse]),
        (status = 403, description = "仅管理员可查看")
    )
)]
pub async fn list_all(
    service: web::Data<ParticipantService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.list_all(&ctx).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/participants",
    tag = "participant",
    request_body = CreateParticipantRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "登记成功", body = CreatedResponse),
        (status = 400, description = "姓名为空")
    )
)]
pub async fn create(
    service: web::Data<ParticipantService>,
    req: HttpRequest,
    request: web::Json<CreateParticipantRequest>,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.add(&ctx, request.into_inner()).await {
        Ok(created) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": created }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/participants/bulk",
    tag = "participant",
    request_body = BulkParticipantsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "批量登记成功, 空白行已跳过", body = BulkParticipantsResponse),
        (status = 403, description = "仅管理员可操作")
    )
)]
pub async fn create_bulk(
    service: web::Data<ParticipantService>,
    req: HttpRequest,
    request: web::Json<BulkParticipantsRequest>,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.add_bulk(&ctx, &request.names).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/participants/{id}",
    tag = "participant",
    params(
        ("id" = i32, Path, description = "人员ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "人员不存在")
    )
)]
pub async fn delete(
    service: web::Data<ParticipantService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.delete(&ctx, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Participant deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn participant_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/participants")
            .route("", web::get().to(list_eligible))
            .route("", web::post().to(create))
            .route("/all", web::get().to(list_all))
            .route("/bulk", web::post().to(create_bulk))
            .route("/{id}", web::delete().to(delete)),
    );
}
