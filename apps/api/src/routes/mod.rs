pub mod conversations;
pub mod cv;
pub mod dashboard;
pub mod generate;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Completion + interaction log
        .route("/api/generate", post(generate::handle_generate))
        .route(
            "/api/dashboard-insights",
            get(dashboard::handle_dashboard_insights),
        )
        // Conversation API
        .route("/api/conversations/new", post(conversations::handle_new))
        .route("/api/conversations", get(conversations::handle_list))
        .route(
            "/api/conversations/:id",
            get(conversations::handle_get).delete(conversations::handle_delete),
        )
        .route(
            "/api/conversations/:id/message",
            post(conversations::handle_message),
        )
        // CV API
        .route(
            "/api/cv/parse-and-structure",
            post(cv::handle_parse_and_structure),
        )
        .route(
            "/api/cv/last-structured-data",
            get(cv::handle_last_structured),
        )
        .route("/api/cv/calculate-value", post(cv::handle_calculate_value))
        .route("/api/cv/render-html", post(cv::handle_render_html))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::{CompletionBackend, LlmError};
    use crate::models::conversation::ChatMessage;
    use crate::scoring::profile::ScoringProfile;
    use crate::store::Store;

    /// Completion backend that returns a fixed reply without touching the
    /// network.
    struct CannedCompletion(String);

    #[async_trait]
    impl CompletionBackend for CannedCompletion {
        async fn complete(
            &self,
            _system: &str,
            _messages: &[ChatMessage],
        ) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }

    async fn test_router_with_reply(dir: &std::path::Path, reply: &str) -> Router {
        let state = AppState {
            store: Arc::new(Store::load(dir).await.unwrap()),
            llm: Arc::new(CannedCompletion(reply.to_string())),
            profile: Arc::new(ScoringProfile::default()),
        };
        build_router(state)
    }

    async fn test_router(dir: &std::path::Path) -> Router {
        test_router_with_reply(dir, "Réponse de test").await
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(json_body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json_body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let (status, body) = send(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_new_conversation_seeds_system_message() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let (status, body) = send(&router, "POST", "/api/conversations/new", None).await;
        assert_eq!(status, StatusCode::OK);
        // Fresh UUID-like id
        let id = body["id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
        let messages = body["conversation"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "system");
    }

    #[tokio::test]
    async fn test_delete_unknown_conversation_is_404_with_message() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let uri = format!("/api/conversations/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&router, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]["message"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_conversation_message_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;

        let (_, created) = send(&router, "POST", "/api/conversations/new", None).await;
        let id = created["id"].as_str().unwrap().to_string();

        let uri = format!("/api/conversations/{id}/message");
        let (status, body) = send(
            &router,
            "POST",
            &uri,
            Some(json!({ "message": "Comment valoriser mon CV ?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Réponse de test");
        // system + user + assistant
        let messages = body["conversation"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");

        // The exchange was scored into the interaction log.
        let (_, insights) = send(&router, "GET", "/api/dashboard-insights", None).await;
        assert_eq!(insights["totalInteractions"], 1);
        assert!(insights["totalUtmi"].as_f64().unwrap() > 0.0);

        // And the conversation shows up in listings, titled from the user
        // message.
        let (_, list) = send(&router, "GET", "/api/conversations", None).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["title"], "Comment valoriser mon CV ?");
        assert_eq!(list[0]["messageCount"], 3);
    }

    #[tokio::test]
    async fn test_message_to_unknown_conversation_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let uri = format!("/api/conversations/{}/message", uuid::Uuid::new_v4());
        let (status, _) = send(&router, "POST", &uri, Some(json!({ "message": "salut" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_message_requires_body_field() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let (_, created) = send(&router, "POST", "/api/conversations/new", None).await;
        let uri = format!(
            "/api/conversations/{}/message",
            created["id"].as_str().unwrap()
        );
        let (status, body) = send(&router, "POST", &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_requires_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let (status, body) = send(&router, "POST", "/api/generate", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_scores_the_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let (status, body) = send(
            &router,
            "POST",
            "/api/generate",
            Some(json!({ "prompt": "Écris un résumé de mon profil", "creativity": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Réponse de test");
        assert!(body["utmi"].as_f64().unwrap() > 0.0);
        assert_eq!(body["utmi"], body["totalUtmi"]);
    }

    #[tokio::test]
    async fn test_cv_parse_value_and_last_data_flow() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;

        let (status, parsed) = send(
            &router,
            "POST",
            "/api/cv/parse-and-structure",
            Some(json!({
                "cvContent": "Développeur Python, 5 ans d'expérience, diplômé d'un Master."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parsed["skills"], json!(["Python"]));
        assert_eq!(parsed["experienceYears"], 5);
        assert_eq!(parsed["diplomas"], json!(["Master"]));
        assert_eq!(parsed["hasRareSkill"], false);

        let (status, last) = send(&router, "GET", "/api/cv/last-structured-data", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(last, parsed);

        let (status, value) =
            send(&router, "POST", "/api/cv/calculate-value", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["cvnuValue"], 75.0);
        assert_eq!(value["level"], "Junior");
        assert!(value["monthlyUniversalIncome"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_cv_parse_requires_content() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let (status, _) = send(&router, "POST", "/api/cv/parse-and-structure", Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_last_structured_data_before_any_parse_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let (status, _) = send(&router, "GET", "/api/cv/last-structured-data", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_calculate_value_without_any_cv_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let (status, _) =
            send(&router, "POST", "/api/cv/calculate-value", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_render_html_strips_code_fences() {
        let dir = tempfile::tempdir().unwrap();
        let router =
            test_router_with_reply(dir.path(), "```html\n<section>CV</section>\n```").await;
        let (status, body) = send(
            &router,
            "POST",
            "/api/cv/render-html",
            Some(json!({ "cv": { "skills": ["Rust"], "experienceYears": 2,
                                  "diplomas": [], "hasRareSkill": false } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["html"], "<section>CV</section>");
    }

    #[tokio::test]
    async fn test_dashboard_insights_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(dir.path()).await;
        let (status, body) = send(&router, "GET", "/api/dashboard-insights", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalUtmi"], 0.0);
        assert_eq!(body["totalInteractions"], 0);
        assert_eq!(body["totalConversations"], 0);
        assert!(body["cv"].is_null());
    }
}
