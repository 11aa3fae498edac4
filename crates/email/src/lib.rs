//! Sends emails.
//!
//! Sending happens in two steps: [`queue_mail`] records the message in the
//! `emails` table inside the caller's transaction, and [`dispatch`] delivers
//! it once that transaction has committed.

use chrono::Utc;
use db::schema::emails;
use diesel::{prelude::*, sqlite::Sqlite};
use lettre::{address::AddressError, message::Mailbox};
use uuid::Uuid;

/// A message that has been recorded but not yet delivered.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub message_id: String,
    pub to: Vec<(String, String)>,
    pub subject: String,
    pub html_contents: String,
    pub text_contents: String,
}

impl OutgoingEmail {
    /// Recipients formatted as `Name <address>`, comma separated.
    pub fn recipients(&self) -> String {
        self.to
            .iter()
            .map(|(name, email)| format!("{name} <{email}>"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Recipients as lettre mailboxes. Display names are quoted as needed,
    /// so names containing commas or angle brackets are kept intact.
    pub fn mailboxes(&self) -> Result<Vec<Mailbox>, AddressError> {
        self.to
            .iter()
            .map(|(name, address)| {
                Ok(Mailbox::new(Some(name.clone()), address.parse()?))
            })
            .collect()
    }
}

fn message_domain() -> String {
    std::env::var("SMTP_DOMAIN").unwrap_or_else(|_| "localhost".to_string())
}

/// Records an email in the `emails` table and returns it for delivery.
pub fn queue_mail(
    to: Vec<(&str, &str)>,
    subject: &str,
    html_contents: &str,
    text_contents: &str,
    conn: &mut impl Connection<Backend = Sqlite>,
) -> QueryResult<OutgoingEmail> {
    let outgoing = OutgoingEmail {
        message_id: format!("{}@{}", Uuid::now_v7(), message_domain()),
        to: to
            .into_iter()
            .map(|(name, email)| (name.to_string(), email.to_string()))
            .collect(),
        subject: subject.to_string(),
        html_contents: html_contents.to_string(),
        text_contents: text_contents.to_string(),
    };

    diesel::insert_into(emails::table)
        .values((
            emails::message_id.eq(&outgoing.message_id),
            emails::recipients.eq(outgoing.recipients()),
            emails::subject.eq(&outgoing.subject),
            emails::contents.eq(Some(&outgoing.text_contents)),
            emails::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    Ok(outgoing)
}

#[cfg(debug_assertions)]
pub async fn dispatch(outgoing: Vec<OutgoingEmail>) {
    for email in outgoing {
        tracing::info!(
            "not delivering email {} to {} in a debug build (subject: {})",
            email.message_id,
            email.recipients(),
            email.subject
        );
    }
}

/// Delivers the messages over SMTP in the background. Failures are logged;
/// the request that produced the email has already succeeded.
#[cfg(not(debug_assertions))]
pub async fn dispatch(outgoing: Vec<OutgoingEmail>) {
    if outgoing.is_empty() {
        return;
    }

    rocket::tokio::spawn(async move {
        let mailer = match smtp::mailer() {
            Ok(mailer) => mailer,
            Err(e) => {
                tracing::error!("could not configure SMTP transport: {e}");
                return;
            }
        };

        for email in outgoing {
            if let Err(e) = smtp::send(&mailer, &email).await {
                tracing::error!(
                    "failed to deliver email {}: {e}",
                    email.message_id
                );
            }
        }
    });
}

#[cfg(not(debug_assertions))]
mod smtp {
    use lettre::{
        message::{header::ContentType, MultiPart, SinglePart},
        transport::smtp::authentication::Credentials,
        AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    };

    use super::OutgoingEmail;

    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn env(name: &str) -> Result<String, Error> {
        std::env::var(name).map_err(|e| format!("{name}: {e}").into())
    }

    pub(super) fn mailer() -> Result<AsyncSmtpTransport<Tokio1Executor>, Error>
    {
        let creds =
            Credentials::new(env("SMTP_USERNAME")?, env("SMTP_PASSWORD")?);
        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&env("SMTP_HOST")?)?
            .credentials(creds)
            .build())
    }

    pub(super) async fn send(
        mailer: &AsyncSmtpTransport<Tokio1Executor>,
        email: &OutgoingEmail,
    ) -> Result<(), Error> {
        let mut msg = Message::builder().from(env("SMTP_FROM")?.parse()?);
        for mailbox in email.mailboxes()? {
            msg = msg.to(mailbox);
        }

        let msg = msg
            .subject(&email.subject)
            .message_id(Some(email.message_id.clone()))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .content_type(ContentType::TEXT_PLAIN)
                            .body(email.text_contents.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .content_type(ContentType::TEXT_HTML)
                            .body(email.html_contents.clone()),
                    ),
            )?;

        mailer.send(msg).await?;
        tracing::info!("delivered email {}", email.message_id);
        Ok(())
    }
}
