use super::error::*;
use crate::application_port::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ApiError) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = auth_service
        .login(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(session)))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    body: RegisterRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = auth_service
        .register(RegisterInput {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(session)))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

pub async fn logout(
    ctx: AuthContext,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_service
        .logout(Some(ctx.account_id), &ctx.bearer)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse {
        message: "You've been logged out.".to_string(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub account_id: crate::domain_model::AccountId,
    pub refresh_token: String,
}

pub async fn refresh_token(
    body: RefreshTokenRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = auth_service
        .rotate_refresh_token(body.account_id, &body.refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(session)))
}

pub async fn list_users(
    query: AccountPageQuery,
    _ctx: AuthContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let page = user_service
        .list_accounts(query)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(page)))
}

// region assistant

#[derive(Debug, Deserialize)]
pub struct AdvancedQuery {
    pub advanced: Option<bool>,
}

fn assistant_reply(result: Result<Value, AssistantError>) -> Result<impl warp::Reply, warp::Rejection> {
    let value = result.map_err(ApiErrorCode::from).map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(value)))
}

pub async fn industries(
    _ctx: AuthContext,
    assistant_service: Arc<dyn AssistantService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    assistant_reply(assistant_service.industries().await)
}

#[derive(Debug, Deserialize)]
pub struct JobRolesRequest {
    pub industry: String,
}

pub async fn job_roles(
    body: JobRolesRequest,
    _ctx: AuthContext,
    assistant_service: Arc<dyn AssistantService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    assistant_reply(assistant_service.job_roles(&body.industry).await)
}

pub async fn skillset(
    body: SkillsetInput,
    _ctx: AuthContext,
    assistant_service: Arc<dyn AssistantService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    assistant_reply(assistant_service.skillset(&body).await)
}

pub async fn quiz(
    query: AdvancedQuery,
    body: QuizInput,
    _ctx: AuthContext,
    assistant_service: Arc<dyn AssistantService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    assistant_reply(
        assistant_service
            .quiz(&body, query.advanced.unwrap_or(false))
            .await,
    )
}

pub async fn evaluate_quiz(
    query: AdvancedQuery,
    body: EvaluationInput,
    _ctx: AuthContext,
    assistant_service: Arc<dyn AssistantService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let evaluation = assistant_service
        .evaluate_quiz(body, query.advanced.unwrap_or(false))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(evaluation)))
}

pub async fn platforms(
    body: PlatformsInput,
    _ctx: AuthContext,
    assistant_service: Arc<dyn AssistantService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    assistant_reply(assistant_service.platforms(&body).await)
}

pub async fn learning_path(
    body: LearningPathInput,
    _ctx: AuthContext,
    assistant_service: Arc<dyn AssistantService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    assistant_reply(assistant_service.learning_path(&body).await)
}

// endregion
