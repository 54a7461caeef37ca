use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use entity::waitlist::{self, Entity as Waitlist};

use crate::{domain::SubscriberEmail, startup::AppState};

use super::error_chain_fmt;

#[derive(serde::Deserialize, Debug)]
pub struct FormData {
    email: String,
}

#[tracing::instrument(
    name = "Adding a new waitlist entry",
    skip(state, form),
    fields(subscriber_email = %form.email)
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Form(form): Form<FormData>,
) -> Result<SubscribeOutcome, SubscribeError> {
    let email = SubscriberEmail::parse(form.email)?;
    let existing = find_waitlist_entry(&state.connection, &email)
        .await
        .map_err(SubscribeError::LookupError)?;
    if existing.is_some() {
        return Ok(SubscribeOutcome::AlreadyOnWaitlist);
    }
    match insert_waitlist_entry(&state.connection, &email).await {
        Ok(_) => Ok(SubscribeOutcome::Joined),
        // Two signups can race between the lookup and the insert; the unique
        // index on `email` turns the loser into a duplicate, not an error.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Ok(SubscribeOutcome::AlreadyOnWaitlist)
        }
        Err(e) => Err(SubscribeError::InsertError(e)),
    }
}

#[tracing::instrument(name = "Looking up a waitlist entry by email", skip(conn, email))]
pub async fn find_waitlist_entry(
    conn: &DatabaseConnection,
    email: &SubscriberEmail,
) -> Result<Option<waitlist::Model>, DbErr> {
    Waitlist::find()
        .filter(waitlist::Column::Email.eq(email.as_ref()))
        .one(conn)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })
}

#[tracing::instrument(name = "Saving a new waitlist entry in the database", skip(conn, email))]
pub async fn insert_waitlist_entry(
    conn: &DatabaseConnection,
    email: &SubscriberEmail,
) -> Result<Uuid, DbErr> {
    let id = Uuid::new_v4();
    let entry = waitlist::ActiveModel {
        id: Set(id),
        email: Set(email.as_ref().to_owned()),
        subscribed_at: Set(OffsetDateTime::now_utc()),
        // `status` stays unset so the column default applies.
        ..Default::default()
    };
    entry.insert(conn).await.map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        err
    })?;
    Ok(id)
}

pub enum SubscribeOutcome {
    Joined,
    AlreadyOnWaitlist,
}

impl IntoResponse for SubscribeOutcome {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct OutcomeResponse {
            status: &'static str,
            message: &'static str,
        }

        let body = match self {
            SubscribeOutcome::Joined => OutcomeResponse {
                status: "joined",
                message: "You're officially on the waitlist! \
                    We'll notify you as soon as we launch.",
            },
            SubscribeOutcome::AlreadyOnWaitlist => OutcomeResponse {
                status: "already_on_waitlist",
                message: "This email is already registered. \
                    We'll notify you when we launch!",
            },
        };

        (StatusCode::OK, Json(body)).into_response()
    }
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to look up the waitlist for an existing entry.")]
    LookupError(#[source] DbErr),
    #[error("Failed to insert the new waitlist entry in the database.")]
    InsertError(#[source] DbErr),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<String> for SubscribeError {
    fn from(e: String) -> Self {
        Self::ValidationError(e)
    }
}

impl IntoResponse for SubscribeError {
    fn into_response(self) -> Response {
        // How we want errors responses to be serialized
        #[derive(Serialize)]
        struct ErrorResponse {
            message: String,
        }

        tracing::error!(exception.details = ?self, exception.message = %self);

        // Database details are logged, never shown; the generic message
        // mirrors the landing page toast.
        let (status, message) = match self {
            SubscribeError::ValidationError(e) => (StatusCode::BAD_REQUEST, e),
            SubscribeError::LookupError(_) | SubscribeError::InsertError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "We couldn't add you to the waitlist. Please try again later.".to_string(),
            ),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
