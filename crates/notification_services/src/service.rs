use std::env;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ses::Client as SesClient;
use aws_sdk_sns::Client as SnsClient;

use crate::types::NotificationError;

/// Trait for email transports.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Send an email, returning the transport's message id.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, NotificationError>;
}

/// Trait for SMS transports.
#[async_trait]
pub trait SmsService: Send + Sync {
    /// Send a text message, returning the transport's message id.
    async fn send_sms(&self, to: &str, message: &str) -> Result<String, NotificationError>;
}

/// AWS SNS SMS transport.
pub struct AwsSnsSmsService {
    sns_client: SnsClient,
}

impl AwsSnsSmsService {
    /// Create an SNS transport from the ambient AWS configuration.
    pub async fn new() -> Result<Self, NotificationError> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        Ok(Self {
            sns_client: SnsClient::new(&config),
        })
    }
}

#[async_trait]
impl SmsService for AwsSnsSmsService {
    async fn send_sms(&self, to: &str, message: &str) -> Result<String, NotificationError> {
        // SNS requires E.164 phone numbers.
        let formatted_phone = if to.starts_with('+') {
            to.to_string()
        } else {
            format!("+{}", to.replace(['(', ')', '-', ' ', '.'], ""))
        };

        let output = self
            .sns_client
            .publish()
            .phone_number(&formatted_phone)
            .message(message)
            .send()
            .await
            .map_err(|e| NotificationError::SnsError(e.to_string()))?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        log::info!("SMS sent to {} (message id: {})", formatted_phone, message_id);
        Ok(message_id)
    }
}

/// AWS SES email transport.
pub struct AwsSesEmailService {
    ses_client: SesClient,
    from_email: String,
}

impl AwsSesEmailService {
    /// Create an SES transport from the ambient AWS configuration and the
    /// `FROM_EMAIL` environment variable.
    pub async fn new() -> Result<Self, NotificationError> {
        let from_email = env::var("FROM_EMAIL").map_err(|_| {
            NotificationError::ConfigError("FROM_EMAIL environment variable not set".to_string())
        })?;

        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        Ok(Self {
            ses_client: SesClient::new(&config),
            from_email,
        })
    }
}

#[async_trait]
impl EmailService for AwsSesEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, NotificationError> {
        let subject_content = aws_sdk_ses::types::Content::builder()
            .data(subject)
            .build()
            .map_err(|e| NotificationError::SesError(format!("Failed to build subject: {}", e)))?;

        let text_content = aws_sdk_ses::types::Content::builder()
            .data(body)
            .build()
            .map_err(|e| NotificationError::SesError(format!("Failed to build body: {}", e)))?;

        let body = aws_sdk_ses::types::Body::builder().text(text_content).build();

        let message = aws_sdk_ses::types::Message::builder()
            .subject(subject_content)
            .body(body)
            .build();

        let destination = aws_sdk_ses::types::Destination::builder()
            .to_addresses(to)
            .build();

        let output = self
            .ses_client
            .send_email()
            .source(&self.from_email)
            .destination(destination)
            .message(message)
            .send()
            .await
            .map_err(|e| NotificationError::SesError(e.to_string()))?;

        let message_id = output.message_id().to_string();
        log::info!("Email sent to {} (message id: {})", to, message_id);
        Ok(message_id)
    }
}

/// Mock SMS transport for development and tests.
pub struct MockSmsService;

#[async_trait]
impl SmsService for MockSmsService {
    async fn send_sms(&self, to: &str, message: &str) -> Result<String, NotificationError> {
        log::info!("[MOCK SMS] To: {}", to);
        log::info!("[MOCK SMS] Message: {}", message);
        Ok("mock-sms".to_string())
    }
}

/// Mock email transport for development and tests.
pub struct MockEmailService;

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, NotificationError> {
        log::info!("[MOCK EMAIL] To: {}", to);
        log::info!("[MOCK EMAIL] Subject: {}", subject);
        log::info!("[MOCK EMAIL] Body:\n{}", body);
        Ok("mock-email".to_string())
    }
}
