use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Outbound messaging collaborator. Transport mechanics (SMTP, SMS gateway)
/// live outside the core; every call site treats delivery as fire-and-forget
/// through [`crate::attempt::attempt`].
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification_code(&self, address: &str, code: &str, recipient: &str) -> Result<(), NotifyError>;
    async fn send_login_alert(&self, address: &str, recipient: &str, at: DateTime<Utc>) -> Result<(), NotifyError>;
    /// SMS channel; present on the interface, not used by the request flow today.
    async fn send_verification_sms(&self, mobile: &str, code: &str, recipient: &str) -> Result<(), NotifyError>;
}

/// Writes every message through the log instead of a mail transport, keeping
/// the service usable without SMTP configuration.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification_code(&self, address: &str, code: &str, recipient: &str) -> Result<(), NotifyError> {
        info!(%address, %recipient, %code, "verification code issued");
        Ok(())
    }

    async fn send_login_alert(&self, address: &str, recipient: &str, at: DateTime<Utc>) -> Result<(), NotifyError> {
        info!(%address, %recipient, at = %at.to_rfc3339(), "login notification");
        Ok(())
    }

    async fn send_verification_sms(&self, mobile: &str, code: &str, recipient: &str) -> Result<(), NotifyError> {
        info!(%mobile, %recipient, %code, "verification sms issued");
        Ok(())
    }
}

/// In-memory double capturing every message, for tests and doc examples.
pub mod recording {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingNotifier {
        /// (address, code) pairs in send order.
        pub codes: Mutex<Vec<(String, String)>>,
        /// Addresses that received a login alert.
        pub alerts: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub fn last_code(&self) -> Option<String> {
            self.codes.lock().unwrap().last().map(|(_, code)| code.clone())
        }

        pub fn alert_count(&self) -> usize {
            self.alerts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_verification_code(&self, address: &str, code: &str, _recipient: &str) -> Result<(), NotifyError> {
            self.codes.lock().unwrap().push((address.to_string(), code.to_string()));
            Ok(())
        }

        async fn send_login_alert(&self, address: &str, _recipient: &str, _at: DateTime<Utc>) -> Result<(), NotifyError> {
            self.alerts.lock().unwrap().push(address.to_string());
            Ok(())
        }

        async fn send_verification_sms(&self, mobile: &str, code: &str, _recipient: &str) -> Result<(), NotifyError> {
            self.codes.lock().unwrap().push((mobile.to_string(), code.to_string()));
            Ok(())
        }
    }

    /// Double whose sends always fail; exercises the degraded paths.
    pub struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send_verification_code(&self, _address: &str, _code: &str, _recipient: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("mail transport unavailable".into()))
        }

        async fn send_login_alert(&self, _address: &str, _recipient: &str, _at: DateTime<Utc>) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("mail transport unavailable".into()))
        }

        async fn send_verification_sms(&self, _mobile: &str, _code: &str, _recipient: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("sms transport unavailable".into()))
        }
    }
}
