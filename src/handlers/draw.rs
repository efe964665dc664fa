use super::auth_context;
use crate::models::*;
use crate::services::DrawService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/draw/spin",
    tag = "draw",
    request_body = SpinRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖成功", body = SpinResponse),
        (status = 400, description = "参数错误、奖品不存在、名额或人员不足"),
        (status = 401, description = "未授权"),
        (status = 403, description = "仅管理员可抽奖"),
        (status = 409, description = "并发冲突, 可重试")
    )
)]
/// 从指定奖品抽取 count 名中奖者:
/// 1. 校验奖品存在且剩余名额足够
/// 2. 从未中奖人员中无放回等概率抽取
/// 3. 同一事务内扣减名额、标记中奖、写入历史
pub async fn spin(
    service: web::Data<DrawService>,
    req: HttpRequest,
    request: web::Json<SpinRequest>,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.spin(&ctx, &request).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draw/reset",
    tag = "draw",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已撤销所有中奖, 人员与奖品保留", body = ResetSummary),
        (status = 403, description = "仅管理员可操作")
    )
)]
pub async fn reset(service: web::Data<DrawService>, req: HttpRequest) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.reset(&ctx).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": summary }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draw/clear-all",
    tag = "draw",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "人员、奖品、历史全部清空", body = ClearSummary),
        (status = 403, description = "仅管理员可操作")
    )
)]
pub async fn clear_all(service: web::Data<DrawService>, req: HttpRequest) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.clear_all(&ctx).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": summary }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draw/clear-participants",
    tag = "draw",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "人员与历史已清空, 奖品名额归零", body = ClearSummary),
        (status = 403, description = "仅管理员可操作")
    )
)]
pub async fn clear_participants(
    service: web::Data<DrawService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.clear_participants(&ctx).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": summary }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draw/clear-prizes",
    tag = "draw",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "奖品与历史已清空, 人员恢复为未中奖", body = ClearSummary),
        (status = 403, description = "仅管理员可操作")
    )
)]
pub async fn clear_prizes(
    service: web::Data<DrawService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.clear_prizes(&ctx).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": summary }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draw/board",
    tag = "draw",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖页数据", body = SpinBoardResponse),
        (status = 403, description = "仅管理员可查看")
    )
)]
pub async fn get_board(service: web::Data<DrawService>, req: HttpRequest) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.spin_board(&ctx).await {
        Ok(board) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": board }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draw/results",
    tag = "draw",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "中奖结果、未中奖人员与剩余奖品", body = ResultsResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_results(
    service: web::Data<DrawService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.results(&ctx).await {
        Ok(results) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": results }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draw/history",
    tag = "draw",
    params(HistoryQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取抽奖历史成功", body = HistoryPageResponse),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取抽奖历史（倒序）
pub async fn get_history(
    service: web::Data<DrawService>,
    req: HttpRequest,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse> {
    let ctx = auth_context(&req)?;
    match service.list_history(&ctx, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/draw")
            .route("/spin", web::post().to(spin))
            .route("/reset", web::post().to(reset))
            .route("/clear-all", web::post().to(clear_all))
            .route("/clear-participants", web::post().to(clear_participants))
            .route("/clear-prizes", web::post().to(clear_prizes))
            .route("/board", web::get().to(get_board))
            .route("/results", web::get().to(get_results))
            .route("/history", web::get().to(get_history)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::{insert_participants, insert_prize, setup_db};
    use crate::entities::UserRole;
    use crate::middlewares::AuthMiddleware;
    use crate::utils::JwtService;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_spin_over_http_and_guest_is_forbidden() {
        let db = setup_db().await;
        let prize = insert_prize(&db, "Bike", 2, true).await;
        insert_participants(&db, &["A", "B", "C"]).await;

        let jwt = JwtService::new("test", 60);
        let admin_token = jwt
            .generate_access_token("1", "admin", UserRole::Admin)
            .unwrap();
        let guest_token = jwt
            .generate_access_token("guest", "Guest", UserRole::Guest)
            .unwrap();

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .app_data(web::Data::new(DrawService::new(db.clone(), 3)))
                .service(web::scope("/api/v1").configure(draw_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/draw/spin")
            .insert_header(("Authorization", format!("Bearer {guest_token}")))
            .set_json(json!({ "prize_id": prize.id, "count": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/v1/draw/spin")
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .set_json(json!({ "prize_id": prize.id, "count": 2 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["winners"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["prize_remaining"], 0);

        let req = test::TestRequest::post()
            .uri("/api/v1/draw/spin")
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .set_json(json!({ "prize_id": prize.id, "count": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INSUFFICIENT_PRIZE_STOCK");

        let req = test::TestRequest::get()
            .uri("/api/v1/draw/history?page=1&per_page=10")
            .insert_header(("Authorization", format!("Bearer {guest_token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["total"], 2);
    }
}
