use std::env;

use jotter_core::config::{ConfigError, SUPABASE_ANON_KEY_ENV, SUPABASE_URL_ENV};
use jotter_core::util::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            ProfileInput {
                supabase_url: normalize_text_option(supabase_url)
                    .or_else(|| normalize_text_option(env::var(SUPABASE_URL_ENV).ok())),
                supabase_anon_key: normalize_text_option(supabase_anon_key)
                    .or_else(|| normalize_text_option(env::var(SUPABASE_ANON_KEY_ENV).ok())),
            },
            no_activate,
        ),
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Default)]
pub struct ProfileInput {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
}

fn run_config_init(
    profile_name: Option<&str>,
    input: ProfileInput,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let missing = init_profile(&mut config, &profile_name, input, no_activate)?;
    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    if missing.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `jotter auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing.join(", ")
        );
    }
    Ok(())
}

/// Merge `input` over the stored profile and validate the result.
///
/// Returns the fields still missing for sync.
pub fn init_profile(
    config: &mut CliProfilesConfig,
    profile_name: &str,
    input: ProfileInput,
    no_activate: bool,
) -> Result<Vec<&'static str>, CliError> {
    let profile = config.profile_mut_or_default(profile_name);
    if let Some(value) = input.supabase_url {
        profile.supabase_url = Some(value);
    }
    if let Some(value) = input.supabase_anon_key {
        profile.supabase_anon_key = Some(value);
    }

    if profile.supabase_url().is_some_and(|url| !is_http_url(&url)) {
        return Err(ConfigError::NotHttp("supabase_url").into());
    }
    let missing = profile.missing_fields();

    if !no_activate {
        config.active_profile = Some(profile_name.to_string());
    }
    Ok(missing)
}
