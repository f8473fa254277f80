//! Email service for sending one-time codes.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Dispatch is
//! fire-and-forget from the workflow's point of view: callers log failures
//! and do not roll back the state change that triggered the send.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the account activation email.
#[derive(Template)]
#[template(path = "email/activation_code.html")]
struct ActivationCodeHtml<'a> {
    code: &'a str,
}

/// Plain text template for the account activation email.
#[derive(Template)]
#[template(path = "email/activation_code.txt")]
struct ActivationCodeText<'a> {
    code: &'a str,
}

/// HTML template for the email-change confirmation email.
#[derive(Template)]
#[template(path = "email/email_change_code.html")]
struct EmailChangeCodeHtml<'a> {
    code: &'a str,
}

/// Plain text template for the email-change confirmation email.
#[derive(Template)]
#[template(path = "email/email_change_code.txt")]
struct EmailChangeCodeText<'a> {
    code: &'a str,
}

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset_code.html")]
struct PasswordResetCodeHtml<'a> {
    code: &'a str,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset_code.txt")]
struct PasswordResetCodeText<'a> {
    code: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay configuration is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the account activation code.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_activation_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let html = ActivationCodeHtml { code }.render()?;
        let text = ActivationCodeText { code }.render()?;

        self.send_multipart_email(to, "Activate your Pomelo account", &text, &html)
            .await
    }

    /// Send the email-change confirmation code to the proposed new address.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_email_change_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let html = EmailChangeCodeHtml { code }.render()?;
        let text = EmailChangeCodeText { code }.render()?;

        self.send_multipart_email(to, "Confirm your new Pomelo email address", &text, &html)
            .await
    }

    /// Send the password reset code.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_password_reset_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let html = PasswordResetCodeHtml { code }.render()?;
        let text = PasswordResetCodeText { code }.render()?;

        self.send_multipart_email(to, "Reset your Pomelo password", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
