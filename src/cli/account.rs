//! `login`, `signup`, `logout` and `whoami`.

use super::common::{print_info, print_success, print_warning, prompt_password, prompt_string, CliContext};
use crate::backend::SignUpOutcome;
use crate::services::{validate_sign_in, validate_sign_up, AccountService};
use anyhow::{Context, Result};

pub fn login(ctx: &mut CliContext, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_string("Email", None)?,
    };
    let password = prompt_password("Password")?;
    validate_sign_in(&email, &password)?;

    let auth = ctx.auth();
    let session = ctx
        .block_on(AccountService::sign_in(auth.as_ref(), &email, &password))
        .context("Sign-in failed")?;
    ctx.provider
        .establish(session)
        .context("Failed to save session")?;
    print_success(&format!("Signed in as {}", email.trim()));
    Ok(())
}

pub fn signup(ctx: &mut CliContext, email: Option<String>, name: Option<String>) -> Result<()> {
    let full_name = match name {
        Some(name) => name,
        None => prompt_string("Full name", None)?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt_string("Email", None)?,
    };
    let password = prompt_password("Password")?;
    validate_sign_up(&email, &password, &full_name)?;

    let auth = ctx.auth();
    let outcome = ctx
        .block_on(AccountService::sign_up(
            auth.as_ref(),
            &email,
            &password,
            &full_name,
        ))
        .context("Sign-up failed")?;
    match outcome {
        SignUpOutcome::SignedIn(session) => {
            ctx.provider
                .establish(session)
                .context("Failed to save session")?;
            print_success(&format!("Account created, signed in as {}", email.trim()));
        }
        SignUpOutcome::ConfirmationRequired => {
            print_info("Account created. Confirm your email, then run 'barberbook login'.");
        }
    }
    Ok(())
}

pub fn logout(ctx: &mut CliContext) -> Result<()> {
    // The CLI never resolved the session, so read the token from disk
    let saved = ctx.provider.store().load().ok().flatten();
    let (_, cleared) = ctx.provider.tear_down();
    match saved {
        Some(session) => {
            let auth = ctx.auth();
            ctx.block_on(AccountService::sign_out(auth.as_ref(), &session));
            cleared.context("Signed out, but the saved session could not be removed")?;
            print_success("Signed out");
        }
        None => {
            cleared.context("Failed to remove saved session")?;
            print_info("Not signed in");
        }
    }
    Ok(())
}

pub fn whoami(ctx: &mut CliContext) -> Result<()> {
    let Some(session) = ctx.current_session() else {
        print_warning("Not signed in");
        return Ok(());
    };
    let backend = ctx.booking(Some(&session));
    let profile = ctx.block_on(backend.get_profile(session.user_id()));

    println!(
        "Email: {}",
        session.user.email.as_deref().unwrap_or("-")
    );
    println!("User:  {}", session.user_id());
    match profile {
        Ok(profile) => println!("Name:  {}", profile.full_name.as_deref().unwrap_or("-")),
        Err(e) => print_warning(&format!("Could not load profile: {}", e)),
    }
    Ok(())
}
