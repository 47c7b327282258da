/**
 * Email Templates
 *
 * HTML bodies for the three verification emails. Codes are rendered large
 * and spaced; every template states the 5-minute validity window.
 */

use crate::auth::verification::{CODE_TTL_MINUTES, MAX_ATTEMPTS};

fn code_block(code: &str) -> String {
    format!(
        r#"<div style="margin: 25px 0;">
      <span style="font-size: 42px; letter-spacing: 10px; background: #ffffff; padding: 20px 35px; border-radius: 12px; display: inline-block; color: #27ae60; font-weight: bold; border: 1px solid #e0e0e0;">
        {code}
      </span>
    </div>"#
    )
}

fn wrap(heading: &str, intro: &str, code: &str, extra: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; text-align: center; padding: 40px; background: #f5f7fa; max-width: 520px; margin: auto; border-radius: 16px;">
    <h1 style="color: #e74c3c;">{heading}</h1>
    <p>{intro}</p>
    {code_block}
    <p style="font-size: 14px; color: #666;">The code is valid for <strong>{ttl} minutes</strong>.</p>
    {extra}
    <p style="font-size: 13px; color: #888; margin-top: 20px;">If you didn't request this, ignore this email.</p>
  </div>"#,
        code_block = code_block(code),
        ttl = CODE_TTL_MINUTES,
    )
}

/// Body for the registration verification email
pub fn registration(platform: &str, code: &str) -> String {
    wrap(
        "Registration Verification",
        &format!("Welcome to {platform}! Your verification code:"),
        code,
        &format!(
            r#"<p style="font-size: 14px; color: #e74c3c; font-weight: bold;">You have <strong>{MAX_ATTEMPTS} attempts</strong>.</p>"#
        ),
    )
}

/// Body for the password reset email
pub fn password_reset(_platform: &str, code: &str) -> String {
    wrap(
        "Password Reset",
        "You requested a password reset.",
        code,
        "",
    )
}

/// Body for the email change verification email
pub fn email_change(_platform: &str, code: &str) -> String {
    wrap(
        "Email Change Verification",
        "You requested to change your email.",
        code,
        "",
    )
}
