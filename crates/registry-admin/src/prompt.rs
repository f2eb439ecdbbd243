use anyhow::{anyhow, Result};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "LIBRARY_REGISTRY_PASSWORD";
pub const NEW_PASSWORD_ENV: &str = "LIBRARY_REGISTRY_NEW_PASSWORD";
pub const PASSWORD_CONFIRM_ENV: &str = "LIBRARY_REGISTRY_PASSWORD_CONFIRM";

fn from_env(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

fn ask(prompt: &str) -> Result<Zeroizing<String>> {
    rpassword::prompt_password(format!("{prompt}: "))
        .map(Zeroizing::new)
        .map_err(|e| anyhow!("password prompt: {e}"))
}

/// Password for an already-configured store.
pub fn existing_password(prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = from_env(PASSWORD_ENV) {
        return Ok(pw);
    }
    ask(prompt)
}

/// A password about to be stored, entered twice unless `env_var` supplies it.
pub fn new_password(prompt: &str, env_var: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = from_env(env_var) {
        if let Some(confirm) = from_env(PASSWORD_CONFIRM_ENV) {
            if *confirm != *pw {
                return Err(anyhow!("password confirmation mismatch"));
            }
        }
        return Ok(pw);
    }
    let first = ask(prompt)?;
    let second = ask("Confirm password")?;
    if *first != *second {
        return Err(anyhow!("passwords do not match"));
    }
    Ok(first)
}
