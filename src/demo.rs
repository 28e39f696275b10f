//! Sample application served by the `routegraph` binary.
//!
//! ```text
//! /api                      logger
//!   /user ?lang             requireLang, auth
//!     GET /:name/:surname/details → userDetailsWithQuery
//! /status
//!   GET /ping               → ping
//! ```

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path, Query},
    http::{header::AUTHORIZATION, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::registry::{EntryMeta, GroupOptions, Manifest};
use crate::routing::{Context, Dispatcher, Handler};

/// Token the `auth` middleware expects in `Authorization`.
pub const DEMO_TOKEN: &str = "123";

/// Languages accepted by `requireLang`.
pub const LANGUAGES: [&str; 2] = ["tr", "en"];

pub fn logger() -> Handler {
    Handler::classic(|request, next| async move {
        tracing::info!(method = %request.method(), uri = %request.uri(), "Incoming request");
        next.run(request).await
    })
}

pub fn auth() -> Handler {
    Handler::classic(|request, next| async move {
        let authorized = request
            .headers()
            .get(AUTHORIZATION)
            .is_some_and(|value| value.as_bytes() == DEMO_TOKEN.as_bytes());
        if !authorized {
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
        next.run(request).await
    })
}

pub fn require_lang() -> Handler {
    Handler::classic(|request, next| async move {
        let lang = Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(query)| query.get("lang").cloned());
        match lang {
            Some(lang) if LANGUAGES.contains(&lang.as_str()) => next.run(request).await,
            _ => (StatusCode::BAD_REQUEST, "Invalid lang query parameter").into_response(),
        }
    })
}

pub fn user_details_with_query() -> Handler {
    Handler::contextual(|ctx: Context| async move {
        let (mut parts, _body) = ctx.request.into_parts();
        let params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &()).await;
        let params = match params {
            Ok(Path(params)) => params,
            Err(rejection) => return rejection.into_response(),
        };
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();

        let name = params.get("name").map(String::as_str).unwrap_or_default();
        let surname = params.get("surname").map(String::as_str).unwrap_or_default();
        Json(json!({
            "message": format!("Hello {name} {surname}"),
            "query": query,
        }))
        .into_response()
    })
}

pub fn ping() -> Handler {
    Handler::classic(|_request, _next| async { "Pong!" })
}

/// Manifest registering the sample application.
pub fn manifest<D: Dispatcher + 'static>() -> Manifest<D> {
    Manifest::new()
        .controllers("users", |ctx| {
            ctx.define_controller(
                "userDetailsWithQuery",
                vec![user_details_with_query()],
                EntryMeta::new()
                    .description("Greets a user by name and echoes the query")
                    .expected_params(["name", "surname"]),
            )
        })
        .controllers("status", |ctx| {
            let meta = EntryMeta::new().description("Liveness probe");
            ctx.define_controller("ping", vec![ping()], meta)
        })
        .middlewares("logger", |ctx| {
            ctx.define_middleware(
                "logger",
                logger(),
                true,
                EntryMeta::new().description("Logs every request"),
            )
        })
        .middlewares("auth", |ctx| {
            ctx.define_middleware(
                "auth",
                auth(),
                false,
                EntryMeta::new().description("Checks the Authorization header"),
            )
        })
        .validations("requireLang", |ctx| {
            ctx.define_validation(
                "requireLang",
                require_lang(),
                false,
                EntryMeta::new()
                    .description("lang query parameter is required and must be tr or en")
                    .expected_query(["lang"]),
            )
        })
        .routes("api", |ctx| {
            let logger = ctx.middleware("logger")?;
            let auth = ctx.middleware("auth")?;
            let require_lang = ctx.validation("requireLang")?;
            let details = ctx.controller("userDetailsWithQuery")?;

            let api = GroupOptions::new().description("API root group").middlewares(logger);
            ctx.group("/api", api, |api| {
                let user = GroupOptions::new()
                    .description("User group")
                    .expected_query(["lang"])
                    .validations(require_lang)
                    .middlewares(auth);
                api.group("/user", user, |user| user.get("/:name/:surname/details", details))
            })
        })
        .routes("status", |ctx| {
            let ping = ctx.controller("ping")?;
            ctx.group("/status", GroupOptions::new(), |status| status.get("/ping", ping))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistrationContext;
    use crate::routing::{RecordingDispatcher, RouteMethod};

    #[test]
    fn test_manifest_registers_sample_routes() {
        let mut ctx = RegistrationContext::new(RecordingDispatcher::new());
        assert_eq!(manifest().load(&mut ctx).unwrap(), 7);

        assert_eq!(
            ctx.dispatcher().routes(),
            vec![
                (RouteMethod::Get, "/api/user/:name/:surname/details", 1),
                (RouteMethod::Get, "/status/ping", 1),
            ]
        );
        assert_eq!(ctx.global_chain().len(), 1);

        let auth = ctx.store(crate::registry::EntryKind::Middleware).get("auth").unwrap();
        assert!(auth.used_in.contains("/api/user"));
    }
}
