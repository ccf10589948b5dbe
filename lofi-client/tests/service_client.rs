use lofi_client::{JobTransport, ServiceClient, TransportError};
use lofi_core::{JobId, JobStatus, NewJob, VideoAsset, parse_sources};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn client(server: &MockServer) -> ServiceClient {
    ServiceClient::new(server.uri(), TOKEN)
}

#[tokio::test]
async fn list_jobs_sends_bearer_token_and_keeps_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [
                {"id": "J2", "status": "processing", "video_input": "rain.mp4", "created_at": "2026-03-01T12:00:00Z"},
                {"id": "J1", "status": "completed", "filename": "out_J1.mp4", "created_at": "2026-02-28T09:30:00Z"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let jobs = client(&server).list_jobs().await.expect("list ok");

    let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["J2", "J1"]);
    assert_eq!(jobs[0].status(), JobStatus::Processing);
    assert_eq!(jobs[0].result_locator(), None);
    assert_eq!(jobs[1].result_locator(), Some("out_J1.mp4"));
}

#[tokio::test]
async fn list_jobs_skips_invalid_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [
                {"id": "J1", "status": "completed", "created_at": "2026-02-28T09:30:00Z"},
                {"id": "J2", "status": "failed", "created_at": "2026-02-28T09:31:00Z"}
            ]
        })))
        .mount(&server)
        .await;

    let jobs = client(&server).list_jobs().await.expect("list ok");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, JobId::from("J2"));
}

#[tokio::test]
async fn list_jobs_failure_is_an_error_not_empty_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let err = client(&server).list_jobs().await.unwrap_err();
    match err {
        TransportError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid token");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn create_job_posts_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-music"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"bg.mp4\""))
        .and(body_string_contains("name=\"urls\""))
        .and(body_string_contains("urlA,urlB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Processing started.",
            "job_id": "J1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let job = NewJob::new(
        VideoAsset::new("bg.mp4", b"fake video bytes".to_vec()),
        parse_sources("urlA,urlB"),
    )
    .unwrap();

    let id = client(&server).create_job(&job).await.expect("create ok");
    assert_eq!(id, JobId::from("J1"));
}

#[tokio::test]
async fn create_job_rejection_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-music"))
        .respond_with(ResponseTemplate::new(422).set_body_string("field required"))
        .mount(&server)
        .await;

    let job = NewJob::new(
        VideoAsset::new("bg.mp4", b"fake".to_vec()),
        vec!["urlA".into()],
    )
    .unwrap();

    let err = client(&server).create_job(&job).await.unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn get_job_status_maps_404_to_unknown_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_job_status(&JobId::from("gone"))
        .await
        .unwrap_err();
    assert!(err.is_unknown_job());
}

#[tokio::test]
async fn get_job_status_reads_single_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/J1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "J1", "status": "completed", "filename": "out_J1.mp4", "created_at": "2026-02-28T09:30:00Z"
        })))
        .mount(&server)
        .await;

    let job = client(&server)
        .get_job_status(&JobId::from("J1"))
        .await
        .expect("status ok");
    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.result_locator(), Some("out_J1.mp4"));
}

#[tokio::test]
async fn get_job_status_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/J1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_job_status(&JobId::from("J1"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Parse(_)));
}

#[tokio::test]
async fn completed_locator_resolves_via_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/J1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "J1", "status": "completed", "filename": "out_J1.mp4", "created_at": "2026-02-28T09:30:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/out_J1.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4 data".to_vec()))
        .mount(&server)
        .await;

    let client = client(&server);
    let job = client.get_job_status(&JobId::from("J1")).await.unwrap();
    let locator = job.result_locator().expect("completed job has a locator");

    let bytes = client.fetch_result(locator).await.expect("download ok");
    assert_eq!(bytes, b"mp4 data");
    assert_eq!(
        client.result_url(locator),
        format!("{}/download/out_J1.mp4", server.uri())
    );
}

#[tokio::test]
async fn list_outputs_reads_video_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "videos": ["job_a_final.mp4", "job_b_final.mp4"]
        })))
        .mount(&server)
        .await;

    let videos = client(&server).list_outputs().await.expect("outputs ok");
    assert_eq!(videos, vec!["job_a_final.mp4", "job_b_final.mp4"]);
}

#[tokio::test]
async fn get_job_status_flags_completed_job_without_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/J1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "J1", "status": "completed", "created_at": "2026-02-28T09:30:00Z"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_job_status(&JobId::from("J1"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_record());
}

#[tokio::test]
async fn download_encodes_locator_as_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/rain%20mix%3F%2301.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4 data".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let bytes = client
        .fetch_result("rain mix?#01.mp4")
        .await
        .expect("download ok");
    assert_eq!(bytes, b"mp4 data");
    assert_eq!(
        client.result_url("rain mix?#01.mp4"),
        format!("{}/download/rain%20mix%3F%2301.mp4", server.uri())
    );
}
