//! Auth subcommand implementations.

mod change_password;
mod forgot_password;
mod login;
mod logout;
mod refresh;
mod resend_verification;
mod reset_password;
mod signup;
mod status;
mod verify_email;
mod verify_reset;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Create an account and log in
    Signup(signup::SignupArgs),

    /// Log in with email and password
    Login(login::LoginArgs),

    /// Log out and forget the stored session
    Logout(logout::LogoutArgs),

    /// Confirm an email address with the emailed code
    VerifyEmail(verify_email::VerifyEmailArgs),

    /// Send the verification email again
    ResendVerification(resend_verification::ResendVerificationArgs),

    /// Request a password reset code
    ForgotPassword(forgot_password::ForgotPasswordArgs),

    /// Check a password reset code
    VerifyReset(verify_reset::VerifyResetArgs),

    /// Set a new password with a reset code
    ResetPassword(reset_password::ResetPasswordArgs),

    /// Change the password of the logged-in user
    ChangePassword(change_password::ChangePasswordArgs),

    /// Display the logged-in user
    Whoami(whoami::WhoamiArgs),

    /// Exchange the refresh token for a new token pair
    Refresh(refresh::RefreshArgs),

    /// Show token expiry for the stored session
    Status(status::StatusArgs),
}

pub async fn handle(cmd: AuthCommand, session: &CliSession) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Signup(args) => signup::run(args, session).await,
        AuthSubcommand::Login(args) => login::run(args, session).await,
        AuthSubcommand::Logout(args) => logout::run(args, session).await,
        AuthSubcommand::VerifyEmail(args) => verify_email::run(args, session).await,
        AuthSubcommand::ResendVerification(args) => resend_verification::run(args, session).await,
        AuthSubcommand::ForgotPassword(args) => forgot_password::run(args, session).await,
        AuthSubcommand::VerifyReset(args) => verify_reset::run(args, session).await,
        AuthSubcommand::ResetPassword(args) => reset_password::run(args, session).await,
        AuthSubcommand::ChangePassword(args) => change_password::run(args, session).await,
        AuthSubcommand::Whoami(args) => whoami::run(args, session).await,
        AuthSubcommand::Refresh(args) => refresh::run(args, session).await,
        AuthSubcommand::Status(args) => status::run(args, session).await,
    }
}
