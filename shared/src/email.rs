use aws_sdk_sesv2::types::{Body as EmailBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use std::env;

fn notify_address() -> String {
    env::var("CONTACT_NOTIFY_EMAIL").unwrap_or_else(|_| "hello@coriumleather.com".to_string())
}

fn from_address() -> String {
    env::var("FROM_EMAIL").unwrap_or_else(|_| "no-reply@coriumleather.com".to_string())
}

/// Notify the shop inbox about a new contact lead.
pub async fn send_contact_email(
    ses_client: &SesClient,
    lead_name: &str,
    lead_email: &str,
    lead_phone: Option<&str>,
    lead_message: &str,
) -> Result<(), String> {
    let subject = Content::builder()
        .data(format!("New enquiry from {}", lead_name))
        .build()
        .map_err(|e| format!("SES content error: {}", e))?;

    let text = Content::builder()
        .data(format!(
            "Name: {}\nEmail: {}\nPhone: {}\n\n{}",
            lead_name,
            lead_email,
            lead_phone.unwrap_or("-"),
            lead_message
        ))
        .build()
        .map_err(|e| format!("SES content error: {}", e))?;

    let message = Message::builder()
        .subject(subject)
        .body(EmailBody::builder().text(text).build())
        .build();

    ses_client
        .send_email()
        .from_email_address(from_address())
        .destination(Destination::builder().to_addresses(notify_address()).build())
        .reply_to_addresses(lead_email)
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await
        .map_err(|e| format!("SES send_email error: {}", e))?;

    Ok(())
}
