mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{complete_stage, create_application, send, setup_app};

#[tokio::test]
async fn new_application_fans_out_six_pending_stages() {
    let app = setup_app();
    let candidate_id = Uuid::new_v4();
    let job_id = Uuid::new_v4();
    let payload = json!({ "candidate_id": candidate_id, "job_id": job_id });

    let (status, body) = send(&app, "POST", "/api/applications", Some(payload.clone()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "applied");
    assert_eq!(body["current_stage"], "resume_upload");
    assert_eq!(body["progress_percentage"], 10);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, stages) = send(&app, "GET", &format!("/api/applications/{}/stages", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let stages = stages.as_array().unwrap();
    let names: Vec<&str> = stages.iter().map(|s| s["stage_name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "resume_upload",
            "aptitude_test",
            "group_discussion",
            "technical_test",
            "hr_round",
            "personality_test"
        ]
    );
    for stage in stages {
        assert_eq!(stage["status"], "pending");
        assert_eq!(stage["score"], 0);
        assert!(stage["completed_at"].is_null());
    }

    // Applying again to the same job returns the same application.
    let (status, again) = send(&app, "POST", "/api/applications", Some(payload), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"].as_str(), Some(id.as_str()));

    let (status, listed) = send(
        &app,
        "GET",
        &format!("/api/candidates/{}/applications", candidate_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn passing_resume_advances_to_aptitude_test() {
    let app = setup_app();
    let id = create_application(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/applications/{}/resume", id),
        Some(json!({
            "resume_url": "https://files.example.com/resumes/alice.pdf",
            "qualification_score": 80,
            "summary": "Backend engineer, 5 years of Rust"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["passed"], true);
    assert_eq!(body["threshold"], 75);
    assert_eq!(body["stage"]["status"], "completed");
    assert_eq!(body["stage"]["score"], 80);
    assert!(body["stage"]["completed_at"].is_string());

    let application = &body["application"];
    assert_eq!(application["status"], "applied");
    assert_eq!(application["current_stage"], "aptitude_test");
    assert_eq!(application["progress_percentage"], 17);
    assert_eq!(application["qualification_score"], 80);
    assert_eq!(application["resume_summary"], "Backend engineer, 5 years of Rust");
}

#[tokio::test]
async fn failing_resume_blocks_progression() {
    let app = setup_app();
    let id = create_application(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/applications/{}/resume", id),
        Some(json!({
            "resume_url": "https://files.example.com/resumes/bob.pdf",
            "qualification_score": 60,
            "summary": "Graduate profile"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["passed"], false);
    assert_eq!(body["stage"]["status"], "failed");
    assert!(body["stage"]["feedback"].as_str().unwrap().contains("below"));

    let (_, detail) = send(&app, "GET", &format!("/api/applications/{}", id), None, None).await;
    assert_eq!(detail["application"]["current_stage"], "resume_upload");
    assert_eq!(detail["application"]["status"], "applied");
    assert_eq!(detail["application"]["progress_percentage"], 10);
    assert_eq!(detail["application"]["qualification_score"], 60);
    assert_eq!(detail["next_stage"], "resume_upload");
}

#[tokio::test]
async fn walking_the_pipeline_updates_derived_fields() {
    let app = setup_app();
    let id = create_application(&app).await;

    let body = complete_stage(&app, &id, "resume_upload", 90).await;
    assert_eq!(body["progress_synced"], true);

    let body = complete_stage(&app, &id, "aptitude_test", 72).await;
    assert_eq!(body["application"]["status"], "aptitude_test");
    assert_eq!(body["application"]["current_stage"], "group_discussion");
    assert_eq!(body["application"]["progress_percentage"], 33);

    complete_stage(&app, &id, "group_discussion", 65).await;

    let body = complete_stage(&app, &id, "technical_test", 81).await;
    assert_eq!(body["application"]["progress_percentage"], 67);
    assert_eq!(body["application"]["status"], "technical_test");
    assert_eq!(body["application"]["current_stage"], "hr_round");

    let body = complete_stage(&app, &id, "hr_round", 100).await;
    assert_eq!(body["application"]["progress_percentage"], 83);

    let body = complete_stage(&app, &id, "personality_test", 70).await;
    assert_eq!(body["application"]["status"], "completed");
    assert_eq!(body["application"]["current_stage"], "completed");
    assert_eq!(body["application"]["progress_percentage"], 100);
}

#[tokio::test]
async fn recording_same_outcome_twice_upserts_one_row() {
    let app = setup_app();
    let id = create_application(&app).await;

    let first = complete_stage(&app, &id, "aptitude_test", 77).await;
    let second = complete_stage(&app, &id, "aptitude_test", 77).await;
    assert_eq!(first["stage"]["stage_name"], second["stage"]["stage_name"]);

    let (_, stages) = send(&app, "GET", &format!("/api/applications/{}/stages", id), None, None).await;
    let stages = stages.as_array().unwrap();
    assert_eq!(stages.len(), 6);
    let aptitude: Vec<_> = stages
        .iter()
        .filter(|s| s["stage_name"] == "aptitude_test")
        .collect();
    assert_eq!(aptitude.len(), 1);
    assert_eq!(aptitude[0]["status"], "completed");
    assert_eq!(aptitude[0]["score"], 77);
}

#[tokio::test]
async fn out_of_order_completion_waits_for_earlier_stages() {
    let app = setup_app();
    let id = create_application(&app).await;

    let body = complete_stage(&app, &id, "technical_test", 90).await;
    assert_eq!(body["progress_synced"], false);
    assert_eq!(body["stage"]["status"], "completed");

    let (_, detail) = send(&app, "GET", &format!("/api/applications/{}", id), None, None).await;
    assert_eq!(detail["application"]["current_stage"], "resume_upload");
    assert_eq!(detail["application"]["progress_percentage"], 10);

    complete_stage(&app, &id, "resume_upload", 90).await;
    complete_stage(&app, &id, "aptitude_test", 90).await;
    // Closing the gap picks up the technical test recorded earlier.
    let body = complete_stage(&app, &id, "group_discussion", 90).await;
    assert_eq!(body["application"]["current_stage"], "hr_round");
    assert_eq!(body["application"]["status"], "technical_test");
    assert_eq!(body["application"]["progress_percentage"], 67);

    let (_, detail) = send(&app, "GET", &format!("/api/applications/{}", id), None, None).await;
    assert_eq!(detail["next_stage"], "hr_round");
    assert_eq!(detail["stages"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn reopening_an_earlier_stage_never_moves_application_backward() {
    let app = setup_app();
    let id = create_application(&app).await;
    complete_stage(&app, &id, "resume_upload", 90).await;
    complete_stage(&app, &id, "aptitude_test", 90).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/applications/{}/stages/aptitude_test", id),
        Some(json!({ "status": "failed", "score": 20 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress_synced"], false);

    // Re-deriving now points at an earlier stage, which is refused.
    let body = complete_stage(&app, &id, "resume_upload", 90).await;
    assert_eq!(body["progress_synced"], false);

    let (_, detail) = send(&app, "GET", &format!("/api/applications/{}", id), None, None).await;
    assert_eq!(detail["application"]["current_stage"], "group_discussion");
    assert_eq!(detail["application"]["progress_percentage"], 33);
}

#[tokio::test]
async fn failed_resume_cannot_be_bypassed_by_later_stages() {
    let app = setup_app();
    let id = create_application(&app).await;

    let (_, resume) = send(
        &app,
        "POST",
        &format!("/api/applications/{}/resume", id),
        Some(json!({
            "resume_url": "https://files.example.com/resumes/dan.pdf",
            "qualification_score": 60,
            "summary": "Career switcher"
        })),
        None,
    )
    .await;
    assert_eq!(resume["passed"], false);

    let body = complete_stage(&app, &id, "aptitude_test", 90).await;
    assert_eq!(body["progress_synced"], false);
    assert!(body["application"].is_null());

    let (_, detail) = send(&app, "GET", &format!("/api/applications/{}", id), None, None).await;
    assert_eq!(detail["application"]["current_stage"], "resume_upload");
    assert_eq!(detail["application"]["status"], "applied");
    assert_eq!(detail["application"]["progress_percentage"], 10);

    // A later passing evaluation reopens the pipeline and counts the aptitude result.
    let (status, resume) = send(
        &app,
        "POST",
        &format!("/api/applications/{}/resume", id),
        Some(json!({
            "resume_url": "https://files.example.com/resumes/dan-v2.pdf",
            "qualification_score": 82,
            "summary": "Career switcher, bootcamp finished"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resume["passed"], true);
    assert_eq!(resume["application"]["current_stage"], "group_discussion");
    assert_eq!(resume["application"]["progress_percentage"], 33);
    assert_eq!(resume["application"]["qualification_score"], 82);
}

#[tokio::test]
async fn malformed_bodies_return_json_errors() {
    let app = setup_app();
    let id = create_application(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/applications/{}/stages/aptitude_test", id),
        Some(json!({ "status": "done", "score": 90 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{}", body);

    let (status, body) = send(
        &app,
        "POST",
        "/api/applications",
        Some(json!({ "candidate_id": "not-a-uuid" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{}", body);

    let (_, detail) = send(&app, "GET", &format!("/api/applications/{}", id), None, None).await;
    assert_eq!(detail["stages"][1]["status"], "pending");
}

#[tokio::test]
async fn in_progress_outcome_does_not_touch_application() {
    let app = setup_app();
    let id = create_application(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/applications/{}/stages/group_discussion", id),
        Some(json!({ "status": "in_progress", "score": 0, "feedback": "Slot booked" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress_synced"], false);
    assert_eq!(body["stage"]["status"], "in_progress");
    assert_eq!(body["stage"]["feedback"], "Slot booked");
    assert!(body["stage"]["completed_at"].is_null());
}

#[tokio::test]
async fn unknown_stage_name_is_a_validation_error() {
    let app = setup_app();
    let id = create_application(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/applications/{}/stages/coding_marathon", id),
        Some(json!({ "status": "completed", "score": 90 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("coding_marathon"));

    let (_, detail) = send(&app, "GET", &format!("/api/applications/{}", id), None, None).await;
    assert_eq!(detail["application"]["progress_percentage"], 10);
}

#[tokio::test]
async fn out_of_range_scores_are_rejected() {
    let app = setup_app();
    let id = create_application(&app).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/applications/{}/stages/aptitude_test", id),
        Some(json!({ "status": "completed", "score": 150 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/applications/{}/resume", id),
        Some(json!({
            "resume_url": "https://files.example.com/resumes/c.pdf",
            "qualification_score": -1,
            "summary": "x"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_application_handling() {
    let app = setup_app();
    let missing = Uuid::new_v4();

    let (status, stages) = send(&app, "GET", &format!("/api/applications/{}/stages", missing), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stages, json!([]));

    let (status, _) = send(&app, "GET", &format!("/api/applications/{}", missing), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/applications/{}/stages/aptitude_test", missing),
        Some(json!({ "status": "completed", "score": 50 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pipeline_order_is_published() {
    let app = setup_app();
    let (status, body) = send(&app, "GET", "/api/pipeline/stages", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let stages = body["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 6);
    assert_eq!(stages[0]["stage_name"], "resume_upload");
    assert_eq!(stages[5]["stage_name"], "personality_test");
    assert_eq!(stages[5]["position"], 5);

    let (status, health) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
}
