use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use entity::waitlist::{self, Entity as Waitlist};

use crate::helpers::spawn_app;

#[tokio::test]
async fn subscribe_returns_a_200_for_valid_form_data() {
    let app = spawn_app().await;
    let body = "email=ursula_le_guin%40gmail.com";

    let response = app.post_subscriptions(body.into()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "joined");
}

#[tokio::test]
async fn subscribe_persists_the_new_waitlist_entry() {
    let app = spawn_app().await;
    let body = "email=ursula_le_guin%40gmail.com";

    app.post_subscriptions(body.into()).await;

    let saved = Waitlist::find()
        .filter(waitlist::Column::Email.eq("ursula_le_guin@gmail.com"))
        .one(&app.db_pool)
        .await
        .expect("Failed to fetch saved waitlist entry.")
        .expect("No waitlist entry was saved.");
    assert_eq!(saved.email, "ursula_le_guin@gmail.com");
    // Supplied by the column default, not by the application.
    assert_eq!(saved.status, "subscribed");
}

#[tokio::test]
async fn subscribing_twice_reports_already_on_waitlist_and_inserts_once() {
    let app = spawn_app().await;
    let body = "email=ursula_le_guin%40gmail.com";

    app.post_subscriptions(body.into()).await;
    let response = app.post_subscriptions(body.into()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "already_on_waitlist");

    let count = Waitlist::find()
        .count(&app.db_pool)
        .await
        .expect("Failed to count waitlist entries.");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn subscribe_returns_a_400_when_the_email_is_invalid() {
    let app = spawn_app().await;
    let test_cases = vec![
        ("email=", "an empty email"),
        ("email=definitely-not-an-email", "a malformed email"),
        ("email=ursula%40", "an email missing its domain"),
    ];

    for (body, description) in test_cases {
        let response = app.post_subscriptions(body.into()).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload was {}.",
            description
        );
    }
}

#[tokio::test]
async fn subscribe_returns_a_422_when_the_email_field_is_missing() {
    let app = spawn_app().await;

    let response = app.post_subscriptions("".into()).await;

    assert_eq!(422, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_fails_gracefully_if_there_is_a_fatal_database_error() {
    let app = spawn_app().await;
    // Sabotage the lookup (and any insert that might follow).
    app.db_pool
        .execute_unprepared("ALTER TABLE waitlist DROP COLUMN email;")
        .await
        .unwrap();

    let response = app.post_subscriptions("email=ursula_le_guin%40gmail.com".into()).await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "We couldn't add you to the waitlist. Please try again later."
    );
}
