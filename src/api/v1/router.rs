use super::error::*;
use super::handler;
use crate::application_port::*;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{http, reject, Filter};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // region auth

    let login = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let register = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("register"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::register);

    let logout = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let refresh_token = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("refresh-token"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh_token);

    // endregion

    let users = warp::get()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(warp::query::<AccountPageQuery>())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.user_service.clone()))
        .and_then(handler::list_users);

    // region assistant

    let industries = warp::get()
        .and(warp::path("assistant"))
        .and(warp::path("industries"))
        .and(warp::path::end())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.assistant_service.clone()))
        .and_then(handler::industries);

    let job_roles = warp::post()
        .and(warp::path("assistant"))
        .and(warp::path("job-roles"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.assistant_service.clone()))
        .and_then(handler::job_roles);

    let skillset = warp::post()
        .and(warp::path("assistant"))
        .and(warp::path("skillset"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.assistant_service.clone()))
        .and_then(handler::skillset);

    let quiz = warp::post()
        .and(warp::path("assistant"))
        .and(warp::path("quiz"))
        .and(warp::path::end())
        .and(warp::query::<handler::AdvancedQuery>())
        .and(warp::body::json())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.assistant_service.clone()))
        .and_then(handler::quiz);

    let evaluate_quiz = warp::post()
        .and(warp::path("assistant"))
        .and(warp::path("quiz-evaluation"))
        .and(warp::path::end())
        .and(warp::query::<handler::AdvancedQuery>())
        .and(warp::body::json())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.assistant_service.clone()))
        .and_then(handler::evaluate_quiz);

    let platforms = warp::post()
        .and(warp::path("assistant"))
        .and(warp::path("platforms"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.assistant_service.clone()))
        .and_then(handler::platforms);

    let learning_path = warp::post()
        .and(warp::path("assistant"))
        .and(warp::path("learning-path"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.assistant_service.clone()))
        .and_then(handler::learning_path);

    // endregion

    login
        .or(register)
        .or(logout)
        .or(refresh_token)
        .or(users)
        .or(industries)
        .or(job_roles)
        .or(skillset)
        .or(quiz)
        .or(evaluate_quiz)
        .or(platforms)
        .or(learning_path)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// The request gate. Missing header surfaces as warp's MissingHeader
/// rejection (mapped to 401); a header without the Bearer scheme is 401; a
/// denylisted, expired or otherwise invalid token is 403. Nothing here
/// mutates state.
fn with_authentication(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (AuthContext,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |header: String| {
        let auth_service = auth_service.clone();
        async move {
            let Some(token) = header.strip_prefix("Bearer ") else {
                return Err(reject::custom(ApiErrorCode::AuthenticationError));
            };
            auth_service
                .authenticate(token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}
