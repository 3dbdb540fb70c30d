mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{app, send, FakePlatform, TestResponse};
use ringproxy::legacy::fax::Resolution;
use std::sync::Arc;

const BOUNDARY: &str = "LEGACYFAXBOUNDARY";

fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for (name, file_name, contents) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
             filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n{contents}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::post("/faxout.asp")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn fax(platform: &Arc<FakePlatform>, password: &str, format: &str) -> TestResponse {
    let req = multipart(
        &[
            ("Username", "u"),
            ("Extension", "101"),
            ("Password", password),
            ("Recipient", "+15551234567|John Doe"),
            ("Recipient", "+15557654321"),
            ("Coverpage", "Confidential"),
            ("Coverpagetext", "Please sign"),
            ("Resolution", "high"),
            ("Sendtime", "not a time"),
            ("Format", format),
        ],
        &[("Attachment", "letter.txt", "Dear customer")],
    );
    send(app(platform), req).await
}

#[tokio::test]
async fn fax_is_submitted() {
    let platform = Arc::new(FakePlatform::default());
    let res = fax(&platform, "p", "").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "0");

    let faxes = platform.faxes.lock().unwrap();
    assert_eq!(faxes.len(), 1);
    let sent = &faxes[0];
    assert_eq!(sent.recipients, vec!["+15551234567", "+15557654321"]);
    assert_eq!(sent.cover_index, Some(6));
    assert_eq!(sent.cover_page_text, "Please sign");
    assert_eq!(sent.resolution, Some(Resolution::High));
    assert_eq!(sent.send_time, None);
    assert_eq!(sent.attachments.len(), 1);
    assert_eq!(sent.attachments[0].file_name.as_deref(), Some("letter.txt"));
    assert_eq!(&sent.attachments[0].data[..], b"Dear customer");
}

#[tokio::test]
async fn fax_json_passes_payload_through() {
    let platform = Arc::new(FakePlatform::default());
    let res = fax(&platform, "p", "JSON").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["messageStatus"], "Queued");
}

#[tokio::test]
async fn rejected_credentials_are_unauthorized() {
    let platform = Arc::new(FakePlatform::default());
    let res = fax(&platform, "wrong", "").await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, "1");
    assert!(platform.faxes.lock().unwrap().is_empty());

    let res = fax(&platform, "wrong", "json").await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["statusCode"], 401);
}

#[tokio::test]
async fn downstream_failures_map_to_codes() {
    for (downstream, local, code) in [
        (401, StatusCode::BAD_REQUEST, "1"),
        (403, StatusCode::BAD_REQUEST, "5"),
        (503, StatusCode::INTERNAL_SERVER_ERROR, "5"),
        (307, StatusCode::INTERNAL_SERVER_ERROR, "5"),
    ] {
        let platform = Arc::new(FakePlatform::with_status(downstream));
        let res = fax(&platform, "p", "").await;
        assert_eq!(res.status, local, "{downstream}");
        assert_eq!(res.body, code, "{downstream}");
    }
}

#[tokio::test]
async fn non_multipart_body_is_rejected() {
    let platform = Arc::new(FakePlatform::default());
    let req = Request::post("/faxout.asp")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("Username=u"))
        .unwrap();
    let res = send(app(&platform), req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(platform.authorizations.lock().unwrap().is_empty());
}
