use jotter_core::auth::SignUpOutcome;
use jotter_core::config::BackendConfig;
use jotter_core::remote::{SupabaseProfileClient, UserProfile};

use crate::auth::{clear_stored_session, load_stored_session, SupabaseAuthService};
use crate::cli::AuthCommands;
use crate::config_profiles::{resolve_backend_config, CliProfilesConfig};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login {
            profile,
            email,
            password,
        } => {
            let (profile_name, service) =
                require_auth_service(profile.as_deref().or(global_profile))?;
            let session = service.sign_in(&email, &password).await?;
            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Signed in profile '{profile_name}' as {email_label}");
            Ok(())
        }
        AuthCommands::Signup {
            profile,
            email,
            password,
        } => {
            let (profile_name, service) =
                require_auth_service(profile.as_deref().or(global_profile))?;
            match service.sign_up(&email, &password).await? {
                SignUpOutcome::SignedIn(session) => {
                    let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                    println!("Created account and signed in profile '{profile_name}' as {email_label}");
                }
                SignUpOutcome::ConfirmationRequired => {
                    println!(
                        "Account created. Confirm the email sent to {email}, then run `jotter auth login`."
                    );
                }
            }
            Ok(())
        }
        AuthCommands::Status { profile } => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(profile.as_deref().or(global_profile));

            let session = match resolve_backend_config(config.profile(&profile_name))? {
                Some(backend) => {
                    SupabaseAuthService::new(&profile_name, &backend)?
                        .restore_session()
                        .await?
                }
                None => load_stored_session(&profile_name)?,
            };

            if let Some(session) = session {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                println!(
                    "Profile '{}' is signed in as {} (expires_at={})",
                    profile_name, email_label, session.expires_at
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout { profile } => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(profile.as_deref().or(global_profile));
            let stored_session = load_stored_session(&profile_name)?;

            match (resolve_backend_config(config.profile(&profile_name))?, stored_session) {
                (Some(backend), Some(session)) => {
                    SupabaseAuthService::new(&profile_name, &backend)?
                        .sign_out(&session.access_token)
                        .await?;
                }
                _ => clear_stored_session(&profile_name)?,
            }

            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
        AuthCommands::Profile {
            profile,
            display_name,
        } => run_profile(profile.as_deref().or(global_profile), display_name.as_deref()).await,
    }
}

async fn run_profile(
    explicit_profile: Option<&str>,
    display_name: Option<&str>,
) -> Result<(), CliError> {
    let (profile_name, backend) = require_backend(explicit_profile)?;
    let session = SupabaseAuthService::new(&profile_name, &backend)?
        .shared_session()
        .await?;
    if !session.is_signed_in() {
        return Err(CliError::Config(format!(
            "Profile '{profile_name}' is not signed in. Run `jotter auth login` first."
        )));
    }

    let client = SupabaseProfileClient::new(&backend, session)?;
    let account = match display_name {
        Some(display_name) => {
            let account = client.update_display_name(display_name).await?;
            println!("Profile updated successfully");
            account
        }
        None => client.fetch().await?,
    };

    for line in format_profile_lines(&account) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_profile_lines(account: &UserProfile) -> Vec<String> {
    vec![
        format!("user:         {}", account.id),
        format!(
            "display name: {}",
            account.display_name.as_deref().unwrap_or("(not set)")
        ),
    ]
}

fn require_auth_service(
    explicit_profile: Option<&str>,
) -> Result<(String, SupabaseAuthService), CliError> {
    let (profile_name, backend) = require_backend(explicit_profile)?;
    let service = SupabaseAuthService::new(&profile_name, &backend)?;
    Ok((profile_name, service))
}

fn require_backend(explicit_profile: Option<&str>) -> Result<(String, BackendConfig), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(explicit_profile);
    let backend = resolve_backend_config(config.profile(&profile_name))?.ok_or_else(|| {
        CliError::Config(format!(
            "Profile '{profile_name}' missing Supabase config. Run `jotter config init --profile {profile_name} --supabase-url <URL> --supabase-anon-key <KEY>`."
        ))
    })?;
    Ok((profile_name, backend))
}
