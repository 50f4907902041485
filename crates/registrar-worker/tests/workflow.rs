use migration::{Migrator, MigratorTrait};
use serde_json::json;

use registrar_worker::api::{self, ApiReply, Verb, APPROVED_MESSAGE, SUBMITTED_MESSAGE};
use registrar_worker::config::DEFAULT_REGISTRATION_URL;
use registrar_worker::notify::MemoryMailer;
use registrar_worker::service::VerificationService;
use registrar_worker::store::{SeaOrmStore, VerificationStore};

async fn sqlite_service() -> VerificationService<SeaOrmStore, MemoryMailer> {
    let db = registrar_worker::db::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    VerificationService::new(SeaOrmStore::new(db), MemoryMailer::new(), DEFAULT_REGISTRATION_URL)
}

fn ana() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "first_name": "Ana",
        "last_name": "Lee",
        "institution_name": "Acme Lab",
        "institution_address": "1 Main St",
        "role": "researcher",
        "email": "ana@acme.org",
    }))
    .unwrap()
}

#[tokio::test]
async fn submit_list_approve_round() {
    let svc = sqlite_service().await;

    let reply = api::handle(&svc, Verb::Post, "/submit-verification/", &ana()).await;
    assert_eq!(reply, ApiReply::message(SUBMITTED_MESSAGE));

    let reply = api::handle(&svc, Verb::Get, "/get-users/", b"").await;
    assert_eq!(reply.status, 200);
    let listed = reply.body.unwrap();
    let entries = listed.as_array().unwrap();
    assert_eq!(entries.len(), 1);

    let id = entries[0]["id"].as_i64().unwrap();
    assert_eq!(
        entries[0],
        json!({
            "id": id,
            "name": "Ana Lee",
            "institution": "Acme Lab",
            "role": "researcher",
            "email": "ana@acme.org",
        })
    );

    let path = format!("/approve-user/{id}/");
    let reply = api::handle(&svc, Verb::Post, &path, b"").await;
    assert_eq!(reply, ApiReply::message(APPROVED_MESSAGE));

    let reply = api::handle(&svc, Verb::Get, "/get-users/", b"").await;
    assert_eq!(reply.body, Some(json!([])));

    let sent = svc.mailer().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ana@acme.org");
    assert_eq!(sent[0].subject, "Verification Approved");

    let stored = svc.store().get_by_id(id as i32).await.unwrap();
    assert!(stored.is_verified);
    assert_eq!(stored.institution_address, "1 Main St");
}

#[tokio::test]
async fn prefixed_routes_reach_the_same_handlers() {
    let svc = sqlite_service().await;

    let reply = api::handle(
        &svc,
        Verb::Post,
        "/api/verification/submit-verification/",
        &ana(),
    )
    .await;
    assert_eq!(reply.status, 200);

    let reply = api::handle(&svc, Verb::Get, "/api/verification/get-users/", b"").await;
    assert_eq!(reply.body.unwrap().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_submission_persists_nothing() {
    let svc = sqlite_service().await;
    let body = serde_json::to_vec(&json!({
        "first_name": "Ana",
        "last_name": "Lee",
        "institution_name": "Acme Lab",
        "institution_address": "1 Main St",
        "role": "researcher",
        "email": "ana-at-acme",
    }))
    .unwrap();

    let reply = api::handle(&svc, Verb::Post, "/submit-verification/", &body).await;
    assert_eq!(reply.status, 400);
    assert!(svc.store().list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_approval_is_a_server_error_without_effects() {
    let svc = sqlite_service().await;
    api::handle(&svc, Verb::Post, "/submit-verification/", &ana()).await;

    let reply = api::handle(&svc, Verb::Post, "/approve-user/999/", b"").await;
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body.unwrap()["error"]["code"], "internal_error");

    assert!(svc.mailer().sent().is_empty());
    assert_eq!(svc.store().list_pending().await.unwrap().len(), 1);
}
