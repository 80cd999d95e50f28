use reqwest::StatusCode;

#[tokio::test]
async fn returns_200_ok() {
    let app = crate::helpers::spawn_app().await;
    let response = app
        .client
        .get(format!("{}/health-check", app.address))
        .send()
        .await
        .expect("failed request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = crate::helpers::spawn_app().await;
    let response = app
        .client
        .get(format!("{}/health-check", app.address))
        .send()
        .await
        .expect("failed request");
    assert!(response.headers().contains_key("x-request-id"));
}
