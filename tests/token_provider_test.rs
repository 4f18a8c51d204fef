use anyhow::Result;
use crm_gateway::adapters::{TokenEndpointConfig, TokenInjector, TokenProvider};
use crm_gateway::TokenError;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn endpoint(server: &MockServer) -> TokenEndpointConfig {
    TokenEndpointConfig {
        token_url: Some(server.url("/oauth/token")),
        client_id: Some("gateway-client".to_string()),
        client_secret: Some("client-secret".to_string()),
        scope: Some("crm.read".to_string()),
        username: Some("svc-user".to_string()),
        password: Some("svc-password".to_string()),
    }
}

/// 取得 token 後應快取，第二次呼叫不再打 token endpoint
#[tokio::test]
async fn test_token_is_cached_until_refresh_window() -> Result<()> {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .x_www_form_urlencoded_tuple("grant_type", "password")
                .x_www_form_urlencoded_tuple("client_id", "gateway-client")
                .x_www_form_urlencoded_tuple("client_secret", "client-secret")
                .x_www_form_urlencoded_tuple("scope", "crm.read")
                .x_www_form_urlencoded_tuple("username", "svc-user")
                .x_www_form_urlencoded_tuple("password", "svc-password");
            then.status(200).json_body(json!({
                "access_token": "dyn-token-1",
                "token_type": "Bearer",
                "expires_in": 3600
            }));
        })
        .await;

    let provider = TokenProvider::new(reqwest::Client::new(), endpoint(&server));

    assert_eq!(provider.get_token().await?, "dyn-token-1");
    assert_eq!(provider.get_token().await?, "dyn-token-1");

    token_mock.assert_async().await;
    Ok(())
}

/// expires_in 落在五分鐘內的 token 每次都要重新取得
#[tokio::test]
async fn test_token_inside_refresh_skew_is_refetched() -> Result<()> {
    let server = MockServer::start_async().await;
    let mut first = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(json!({
                "access_token": "short-lived",
                "expires_in": 300
            }));
        })
        .await;

    let provider = TokenProvider::new(reqwest::Client::new(), endpoint(&server));
    assert_eq!(provider.get_token().await?, "short-lived");
    assert_eq!(first.hits_async().await, 1);
    first.delete_async().await;

    let second = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(json!({
                "access_token": "renewed",
                "expires_in": 3600
            }));
        })
        .await;

    assert_eq!(provider.get_token().await?, "renewed");
    assert_eq!(provider.get_token().await?, "renewed");
    assert_eq!(second.hits_async().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_invalidate_forces_new_request() -> Result<()> {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200)
                .json_body(json!({ "access_token": "abc", "expires_in": 3600 }));
        })
        .await;

    let provider = TokenProvider::new(reqwest::Client::new(), endpoint(&server));
    provider.get_token().await?;
    provider.invalidate().await;
    provider.get_token().await?;

    assert_eq!(token_mock.hits_async().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() -> Result<()> {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200)
                .delay(Duration::from_millis(200))
                .json_body(json!({ "access_token": "shared", "expires_in": 3600 }));
        })
        .await;

    let provider = Arc::new(TokenProvider::new(
        reqwest::Client::new(),
        endpoint(&server),
    ));

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let provider = provider.clone();
        tasks.spawn(async move { provider.get_token().await });
    }

    while let Some(joined) = tasks.join_next().await {
        assert_eq!(joined??, "shared");
    }

    assert_eq!(token_mock.hits_async().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_response_without_access_token_fails() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200)
                .json_body(json!({ "token_type": "Bearer", "expires_in": 3600 }));
        })
        .await;

    let provider = TokenProvider::new(reqwest::Client::new(), endpoint(&server));
    let result = provider.get_token().await;
    assert!(matches!(result, Err(TokenError::MissingAccessToken)));
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_reported_and_not_cached() -> Result<()> {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(500).body("token service down");
        })
        .await;

    let provider = TokenProvider::new(reqwest::Client::new(), endpoint(&server));

    match provider.get_token().await {
        Err(TokenError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "token service down");
        }
        other => panic!("expected Status error, got {:?}", other),
    }
    assert!(provider.get_token().await.is_err());
    assert_eq!(token_mock.hits_async().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_credentials_fail_without_network_call() -> Result<()> {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200)
                .json_body(json!({ "access_token": "never", "expires_in": 3600 }));
        })
        .await;

    let config = TokenEndpointConfig {
        username: None,
        ..endpoint(&server)
    };
    let provider = TokenProvider::new(reqwest::Client::new(), config);

    assert!(matches!(
        provider.get_token().await,
        Err(TokenError::MissingConfiguration("CRM_USERNAME"))
    ));
    assert_eq!(token_mock.hits_async().await, 0);
    Ok(())
}

/// expires_in 超出範圍或為負值時回傳錯誤，不可讓請求崩潰
#[tokio::test]
async fn test_unusable_expires_in_is_an_error() -> Result<()> {
    for expires_in in [json!(9_000_000_000_000_000_000_i64), json!(-60)] {
        let body = json!({ "access_token": "x", "expires_in": expires_in.clone() });
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200).json_body(body);
            })
            .await;

        let provider = TokenProvider::new(reqwest::Client::new(), endpoint(&server));

        assert!(
            matches!(provider.get_token().await, Err(TokenError::InvalidExpiry(_))),
            "expires_in {}",
            expires_in
        );
        // Not cached: the next call asks again.
        assert!(provider.get_token().await.is_err());
        assert_eq!(token_mock.hits_async().await, 2);
    }
    Ok(())
}

#[tokio::test]
async fn test_unusable_expires_in_falls_back_to_static_token() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(json!({
                "access_token": "x",
                "expires_in": 9_000_000_000_000_000_000_i64
            }));
        })
        .await;

    let provider = TokenProvider::new(reqwest::Client::new(), endpoint(&server));
    let injector = TokenInjector::dynamic(Arc::new(provider), "static_token_123");

    assert_eq!(injector.bearer_token().await, "static_token_123");
    Ok(())
}
