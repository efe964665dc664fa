use super::auth_context;
use crate::models::*;
use crate::services::PrizeService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/prizes",
    tag = "prize",
    params(PrizeQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "奖品列表", body = [PrizeResponse]),
        (status = 403, description = "仅管理员可查看")
    )
)]
/// 奖品列表, 可按大奖 / 是否仍有名额过滤
pub async fn list(
    service: web::Data<PrizeService>,
    req: HttpRequest,
    query: web::Query<PrizeQuery>,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.list(&ctx, &query.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/prizes",
    tag = "prize",
    request_body = CreatePrizeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建成功", body = CreatedResponse),
        (status = 400, description = "名称为空或数量不合法")
    )
)]
pub async fn create(
    service: web::Data<PrizeService>,
    req: HttpRequest,
    request: web::Json<CreatePrizeRequest>,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.create(&ctx, request.into_inner()).await {
        Ok(created) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": created }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/prizes/{id}",
    tag = "prize",
    params(
        ("id" = i32, Path, description = "奖品ID")
    ),
    request_body = UpdatePrizeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = PrizeResponse),
        (status = 400, description = "数量低于已抽出名额"),
        (status = 404, description = "奖品不存在")
    )
)]
pub async fn update(
    service: web::Data<PrizeService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdatePrizeRequest>,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service
        .update(&ctx, path.into_inner(), request.into_inner())
        .await
    {
        Ok(prize) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": prize }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/prizes/{id}",
    tag = "prize",
    params(
        ("id" = i32, Path, description = "奖品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 400, description = "已有中奖者, 需先重置"),
        (status = 404, description = "奖品不存在")
    )
)]
pub async fn delete(
    service: web::Data<PrizeService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.delete(&ctx, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Prize deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn prize_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/prizes")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete)),
    );
}
