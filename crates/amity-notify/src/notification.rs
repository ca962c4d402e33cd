//! The notification payloads and the delivery seam.

use std::future::Future;

use amity_core::otp::OtpPurpose;

/// A mail the lifecycle engine wants delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
  /// First provider login: the account was provisioned with a temporary
  /// credential the user has to exchange.
  TempPassword {
    email:         String,
    username:      String,
    temp_password: String,
  },
  /// A one-time code for registration or password reset.
  OtpCode {
    email:   String,
    code:    String,
    purpose: OtpPurpose,
  },
}

impl Notification {
  pub fn email(&self) -> &str {
    match self {
      Self::TempPassword { email, .. } | Self::OtpCode { email, .. } => email,
    }
  }

  pub fn subject(&self) -> &'static str {
    match self {
      Self::TempPassword { .. } => "Your temporary password",
      Self::OtpCode { purpose: OtpPurpose::Register, .. } => {
        "Your verification code"
      }
      Self::OtpCode { purpose: OtpPurpose::Forgot, .. } => {
        "Your password reset code"
      }
    }
  }

  pub fn html(&self) -> String {
    match self {
      Self::TempPassword { username, temp_password, .. } => format!(
        "<p>Hi {username},</p>\
         <p>Your account is ready. Sign in with the temporary password \
         <strong>{temp_password}</strong> and choose your own right away.</p>"
      ),
      Self::OtpCode { code, .. } => format!(
        "<p>Your one-time code is <strong>{code}</strong>. \
         It expires in a few minutes.</p>"
      ),
    }
  }
}

/// Delivery backend. Returns whether the notification went out; failures are
/// reported through the return value and logging, never as errors.
pub trait Notifier: Send + Sync {
  fn send(
    &self,
    notification: Notification,
  ) -> impl Future<Output = bool> + Send + '_;
}
