use worker::Env;

use crate::config::AppConfig;

pub fn env_string(env: &Env, key: &str) -> Option<String> {
    env.var(key).ok().map(|v| v.to_string())
}

pub fn app_config(env: &Env) -> AppConfig {
    AppConfig::from_lookup(|key| env_string(env, key))
}
