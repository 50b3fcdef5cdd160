//! Report delivery over authenticated SMTP
//!
//! One message per run: an HTML body plus the PDF attachment, addressed to
//! every recipient at once and submitted over STARTTLS.

use crate::config::SmtpConfig;
use crate::errors::{AppError, AppResult};
use crate::report::RenderedReport;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

const PDF_CONTENT_TYPE: &str = "application/pdf";

pub struct EmailSender {
    config: SmtpConfig,
}

impl EmailSender {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build the message and submit it to the configured server
    pub async fn send_report(
        &self,
        recipients: &[String],
        subject: &str,
        report: &RenderedReport,
    ) -> AppResult<()> {
        let message = build_message(&self.config.sender_email, recipients, subject, report)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        info!(
            "Sending report via {}:{} to {} recipient(s)",
            self.config.server,
            self.config.port,
            recipients.len()
        );
        transport.send(message).await?;
        info!("Report email sent to: {}", recipients.join(", "));

        Ok(())
    }
}

/// Assemble the multipart message: HTML body first, PDF attachment second
pub fn build_message(
    sender: &str,
    recipients: &[String],
    subject: &str,
    report: &RenderedReport,
) -> AppResult<Message> {
    if recipients.is_empty() {
        return Err(AppError::Delivery("no recipients configured".to_string()));
    }

    let mut builder = Message::builder()
        .from(sender.parse::<Mailbox>()?)
        .subject(subject);
    for recipient in recipients {
        builder = builder.to(recipient.parse::<Mailbox>()?);
    }

    let content_type = ContentType::parse(PDF_CONTENT_TYPE)
        .map_err(|e| AppError::Delivery(format!("invalid content type: {}", e)))?;
    let attachment =
        Attachment::new(report.pdf_filename.clone()).body(report.pdf_bytes.clone(), content_type);

    let message = builder.multipart(
        MultiPart::mixed()
            .singlepart(SinglePart::html(report.html_body.clone()))
            .singlepart(attachment),
    )?;

    Ok(message)
}
