use super::*;

#[tokio::test]
async fn test_verify() {
    let mut server = mockito::Server::new_async().await;
    let handler = server
        .mock("GET", "/auth/v1/user")
        .match_header("Authorization", "Bearer good_token")
        .match_header("apikey", "anon")
        .with_status(200)
        .with_body(r#"{"id":"user-1","email":"someone@example.com","aud":"authenticated"}"#)
        .expect(1)
        .create_async()
        .await;

    let identity = GoTrue::default()
        .with_endpoint(&server.url())
        .with_api_key("anon");

    let user = identity.verify("good_token").await.expect("valid token");
    assert_eq!(user.id(), "user-1");
    assert_eq!(user.email(), Some("someone@example.com"));
    handler.assert_async().await;
}

#[tokio::test]
async fn test_verify_rejected_token() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/v1/user")
        .with_status(401)
        .with_body(r#"{"msg":"invalid JWT"}"#)
        .create_async()
        .await;

    let identity = GoTrue::default().with_endpoint(&server.url());
    let err = identity.verify("bad_token").await.unwrap_err();
    assert!(matches!(err, IdentityError::InvalidToken));
}

#[tokio::test]
async fn test_verify_provider_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/v1/user")
        .with_status(500)
        .create_async()
        .await;

    let identity = GoTrue::default().with_endpoint(&server.url());
    let err = identity.verify("token").await.unwrap_err();
    assert!(matches!(err, IdentityError::Provider(500)));
}

#[tokio::test]
async fn test_verify_empty_token_skips_provider() {
    let mut server = mockito::Server::new_async().await;
    let handler = server
        .mock("GET", "/auth/v1/user")
        .expect(0)
        .create_async()
        .await;

    let identity = GoTrue::default().with_endpoint(&server.url());
    let err = identity.verify("  ").await.unwrap_err();
    assert!(matches!(err, IdentityError::InvalidToken));
    handler.assert_async().await;
}
