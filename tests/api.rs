use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use country_upload::{app::build_app, state::AppState};
use rust_xlsxwriter::Workbook;
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "XBOUNDARYX";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn app() -> Router {
    build_app(AppState::fake())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.expect("router responds");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn upload_request(
    token: Option<&str>,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/countries/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Header row first; empty strings leave the cell blank.
fn workbook(rows: &[[&str; 4]]) -> Vec<u8> {
    let mut wb = Workbook::new();
    let sheet = wb.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
    }
    wb.save_to_buffer().unwrap()
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        post_json(
            "/api/auth/register",
            json!({"username": username, "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        post_json(
            "/api/auth/login",
            json!({"username": username, "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn register_then_login() {
    let app = app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/register",
            json!({"username": "alice", "password": "secret1", "email": "a@example.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["username"], "alice");
    let user_id = body["userId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({"username": "alice", "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["userId"], user_id.as_str());
    assert_eq!(body["expiresIn"], 60);

    let token = body["token"].as_str().unwrap();
    let (status, me) = send(&app, get_with_token("/api/me", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["email"], "a@example.com");
}

#[tokio::test]
async fn duplicate_registration_is_a_bad_request() {
    let app = app();
    let req = || {
        post_json(
            "/api/auth/register",
            json!({"username": "bob", "password": "secret1"}),
        )
    };
    assert_eq!(send(&app, req()).await.0, StatusCode::OK);

    let (status, body) = send(&app, req()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Username already exists");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized_and_generic() {
    let app = app();
    register_and_login(&app, "carol").await;

    let (status, wrong_pw) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({"username": "carol", "password": "nope-nope"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({"username": "nobody", "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
    assert_eq!(unknown["message"], "Invalid username or password");
}

#[tokio::test]
async fn malformed_json_gets_structured_error() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn upload_persists_valid_rows_and_reports_skips() {
    let app = app();
    let token = register_and_login(&app, "dave").await;

    let data = workbook(&[
        ["Name", "Capital", "Region", "Population"],
        [" india ", " New Delhi ", "Asia", "1.4B"],
        ["", "Nowhere", "", ""],
    ]);
    let (status, body) = send(
        &app,
        upload_request(Some(token.as_str()), "countries.xlsx", XLSX_MIME, &data),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["countriesUploaded"], 1);
    assert!(body["message"].as_str().unwrap().contains("1 rows skipped"));
    assert!(body["uploadedAt"].is_string());
    assert!(body["uploadedByUserId"].is_string());

    let (status, list) = send(&app, get_with_token("/api/countries", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
    assert_eq!(list["countries"][0]["name"], "india");
    assert_eq!(list["countries"][0]["capital"], "New Delhi");
    assert_eq!(list["countries"][0]["uploadedByUserId"], body["uploadedByUserId"]);
}

#[tokio::test]
async fn uploads_are_listed_per_owner() {
    let app = app();
    let first = register_and_login(&app, "erin").await;
    let second = register_and_login(&app, "frank").await;

    let data = workbook(&[
        ["Name", "Capital", "Region", "Population"],
        ["Japan", "Tokyo", "Asia", "125M"],
    ]);
    for token in [&first, &second] {
        let (status, _) = send(
            &app,
            upload_request(Some(token.as_str()), "c.xlsx", XLSX_MIME, &data),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, mine) = send(&app, get_with_token("/api/countries", &first)).await;
    assert_eq!(mine["count"], 1);
    let (_, all) = send(&app, get_with_token("/api/countries/all", &first)).await;
    assert_eq!(all["count"], 2);
}

#[tokio::test]
async fn upload_with_only_invalid_rows_fails() {
    let app = app();
    let token = register_and_login(&app, "gina").await;

    let mut rows = vec![["Name", "Capital", "Region", "Population"]];
    for _ in 0..7 {
        rows.push(["Atlantis", "Poseidonia", "Ocean", "0"]);
    }
    let data = workbook(&rows);

    let (status, body) = send(
        &app,
        upload_request(Some(token.as_str()), "c.xlsx", XLSX_MIME, &data),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let msg = body["message"].as_str().unwrap();
    assert!(msg.contains("Row 2: 'Atlantis' is not a valid country"));
    assert!(msg.contains("and 2 more..."));

    let (_, all) = send(&app, get_with_token("/api/countries/all", &token)).await;
    assert_eq!(all["count"], 0);
}

#[tokio::test]
async fn upload_rejects_non_spreadsheet() {
    let app = app();
    let token = register_and_login(&app, "hank").await;

    let (status, body) = send(
        &app,
        upload_request(Some(token.as_str()), "notes.txt", "text/plain", b"India,New Delhi"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "File must be an Excel file (.xlsx or .xls)");
}

#[tokio::test]
async fn upload_rejects_empty_file() {
    let app = app();
    let token = register_and_login(&app, "ivy").await;

    let (status, body) = send(
        &app,
        upload_request(Some(token.as_str()), "c.xlsx", XLSX_MIME, b""),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "File is empty");
}

#[tokio::test]
async fn upload_requires_token() {
    let app = app();
    let data = workbook(&[["Name", "Capital", "Region", "Population"]]);

    let (status, body) = send(&app, upload_request(None, "c.xlsx", XLSX_MIME, &data)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        upload_request(Some("forged.token.value"), "c.xlsx", XLSX_MIME, &data),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_open() {
    let app = app();
    let res = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_without_file_part_is_a_bad_request() {
    let app = app();
    let token = register_and_login(&app, "jack").await;

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/countries/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No file selected");
}

#[tokio::test]
async fn upload_with_non_multipart_body_is_a_bad_request() {
    let app = app();
    let token = register_and_login(&app, "kate").await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/countries/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(r#"{"file":"countries.xlsx"}"#))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No file selected");
}
