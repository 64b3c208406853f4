//! End-to-end tests for services CRUD.
//!
//! These tests verify:
//! 1. Services are created and listed for the token's account
//! 2. A `user_id` in the body never changes the owner
//! 3. One account cannot read, edit or delete another's services

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::e2e_tests::helpers::{TestApp, bearer};

#[tokio::test]
async fn test_create_and_list_services() {
    let app = TestApp::new();
    let (id, token) = app.sign_up("ana@example.com").await;

    let (status, body) = app
        .post(
            "/api/servicos",
            Some(&token),
            json!({
                "nome": "Corte",
                "descricao": "Corte masculino",
                "preco": 45.0,
                "duracao_minutos": 30,
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Service created");
    assert_eq!(body["data"]["nome"], "Corte");
    assert_eq!(body["data"]["descricao"], "Corte masculino");
    assert_eq!(body["data"]["preco"], 45.0);
    assert_eq!(body["data"]["duracao_minutos"], 30);
    assert_eq!(body["data"]["user_id"], id.as_str());

    let (status, body) = app.get("/api/servicos", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Services retrieved");
    assert_eq!(body["data"].as_array().expect("service list").len(), 1);
}

#[tokio::test]
async fn test_create_requires_name() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("ana@example.com").await;

    let (status, body) = app
        .post("/api/servicos", Some(&token), json!({ "preco": 10.0 }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Field 'nome' is required" })
    );
}

#[tokio::test]
async fn test_body_user_id_is_ignored() {
    let app = TestApp::new();
    let (ana, ana_token) = app.sign_up("ana@example.com").await;
    let (bruno, bruno_token) = app.sign_up("bruno@example.com").await;

    let (status, body) = app
        .post(
            "/api/servicos",
            Some(&ana_token),
            json!({ "nome": "Escova", "user_id": bruno }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], ana.as_str());

    let (_, bruno_services) = app.get("/api/servicos", Some(&bruno_token)).await;
    assert_eq!(bruno_services["data"], json!([]));
}

#[tokio::test]
async fn test_show_update_delete_round() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("ana@example.com").await;
    let (_, created) = app
        .post("/api/servicos", Some(&token), json!({ "nome": "Corte" }))
        .await;
    let service_id = created["data"]["id"].as_str().expect("service id").to_string();
    let uri = format!("/api/servicos/{service_id}");
    let authorization = bearer(&token);

    let (status, body) = app.get(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nome"], "Corte");

    let (status, body) = app
        .send(
            Method::PUT,
            &uri,
            Some(&authorization),
            Some(json!({ "nome": "Corte + barba", "preco": 70.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Service updated");
    assert_eq!(body["data"]["id"], service_id.as_str());
    assert_eq!(body["data"]["nome"], "Corte + barba");
    assert_eq!(body["data"]["preco"], 70.0);

    let (status, body) = app
        .send(Method::DELETE, &uri, Some(&authorization), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Service deleted");

    let (status, body) = app.get(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Service not found");
}

#[tokio::test]
async fn test_other_accounts_services_are_invisible() {
    let app = TestApp::new();
    let (_, ana_token) = app.sign_up("ana@example.com").await;
    let (_, bruno_token) = app.sign_up("bruno@example.com").await;
    let (_, created) = app
        .post("/api/servicos", Some(&ana_token), json!({ "nome": "Corte" }))
        .await;
    let uri = format!(
        "/api/servicos/{}",
        created["data"]["id"].as_str().expect("service id")
    );
    let bruno = bearer(&bruno_token);

    let (status, _) = app.get(&uri, Some(&bruno_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::PUT,
            &uri,
            Some(&bruno),
            Some(json!({ "nome": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&bruno), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&uri, Some(&ana_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nome"], "Corte");
}

#[tokio::test]
async fn test_create_without_body_requires_name() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("ana@example.com").await;
    let authorization = bearer(&token);

    let (status, body) = app
        .send_raw(
            Method::POST,
            "/api/servicos",
            Some(&authorization),
            None,
            String::new(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Field 'nome' is required" })
    );
}

#[tokio::test]
async fn test_create_malformed_body_is_json_bad_request() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("ana@example.com").await;
    let authorization = bearer(&token);

    let (status, body) = app
        .send_raw(
            Method::POST,
            "/api/servicos",
            Some(&authorization),
            Some("application/json"),
            "{not json".to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Request body must be valid JSON" })
    );

    let (_, listed) = app.get("/api/servicos", Some(&token)).await;
    assert_eq!(listed["data"], json!([]));
}

#[tokio::test]
async fn test_whitespace_name_is_accepted() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("ana@example.com").await;

    let (status, body) = app
        .post("/api/servicos", Some(&token), json!({ "nome": "   " }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nome"], "   ");
}
