/// Where approved requesters are sent to finish registering.
pub const DEFAULT_REGISTRATION_URL: &str = "https://your-app.vercel.app/register";

/// Native server defaults; the Worker binds its database as `DB` instead.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://registrar.db?mode=rwc";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

/// Strips surrounding whitespace and one level of matching quotes.
///
/// Dashboard-managed variables frequently end up stored as `"value"`.
pub fn normalize_env_value(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return inner.trim().to_string();
    }
    if let Some(inner) = trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        return inner.trim().to_string();
    }

    trimmed.to_string()
}

/// Brevo transactional email credentials and sender identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `DATABASE_URL`, native server only.
    pub database_url: String,

    /// `LISTEN_ADDR`, native server only.
    pub listen_addr: String,

    /// `REGISTRATION_URL`, falling back to [`DEFAULT_REGISTRATION_URL`].
    pub registration_url: String,

    /// Present only when both `BREVO_API_KEY` and `BREVO_SENDER_EMAIL` are set.
    pub mail: Option<MailSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            registration_url: DEFAULT_REGISTRATION_URL.to_string(),
            mail: None,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from a variable lookup (the Worker `Env`, or a map in tests).
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| normalize_env_value(&v))
                .filter(|v| !v.is_empty())
        };

        let mail = match (get("BREVO_API_KEY"), get("BREVO_SENDER_EMAIL")) {
            (Some(api_key), Some(sender_email)) => Some(MailSettings {
                api_key,
                sender_email,
                sender_name: get("BREVO_SENDER_NAME"),
            }),
            _ => None,
        };

        Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            listen_addr: get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            registration_url: get("REGISTRATION_URL")
                .unwrap_or_else(|| DEFAULT_REGISTRATION_URL.to_string()),
            mail,
        }
    }
}
