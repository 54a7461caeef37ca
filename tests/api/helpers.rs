use once_cell::sync::Lazy;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use time::OffsetDateTime;
use uuid::Uuid;
use wiremock::MockServer;

use entity::waitlist;
use smartrisk::{
    configuration::{configure_database, get_configuration},
    email_client::EmailClient,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub address: String,
    pub db_pool: DatabaseConnection,
    pub email_server: MockServer,
    /// An email client pointed at `email_server`, for driving campaigns.
    pub email_client: EmailClient,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_subscriptions(&self, body: String) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/subscriptions", &self.address))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_home_html(&self) -> String {
        self.api_client
            .get(&format!("{}/", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
            .text()
            .await
            .unwrap()
    }

    pub async fn seed_waitlist_entry(&self, email: &str, status: &str) {
        let entry = waitlist::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            status: Set(status.to_string()),
            subscribed_at: Set(OffsetDateTime::now_utc()),
        };
        entry
            .insert(&self.db_pool)
            .await
            .expect("Failed to seed waitlist entry.");
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.database.database_name = Uuid::new_v4().to_string();
        c.application.port = 0;
        c.email_client.base_url = email_server.uri();
        c
    };

    configure_database(&configuration.database).await;

    let email_client = configuration
        .email_client
        .clone()
        .client()
        .expect("Failed to build the email client.");

    let application = Application::build(configuration.clone())
        .await
        .expect("Failed to build application.");
    let address = format!("http://127.0.0.1:{}", application.port());
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address,
        db_pool: sea_orm::Database::connect(configuration.database.with_db())
            .await
            .expect("Failed to connect to the database."),
        email_server,
        email_client,
        api_client: reqwest::Client::new(),
    }
}
