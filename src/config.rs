use lazy_static::lazy_static;
use std::env;

/// Application configuration, read from the environment exactly once.
///
/// The admin allow-list is parsed here and handed to user creation as plain
/// data, so role assignment never reaches back into ambient process state.
pub struct Config {
    pub admin_emails: Vec<String>,
    pub secret: String,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            admin_emails: parse_admin_emails(
                &env::var("ADMIN_EMAILS").unwrap_or_default(),
            ),
            secret: env::var("SECRET_TOKEN").expect("Secret Token not set"),
        }
    }
}

pub fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect()
}

lazy_static! {
    static ref CONFIG: Config = Config::from_env();
}

pub fn get() -> &'static Config {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_emails() {
        let emails = parse_admin_emails("admin@vibebench.ai,ops@vibebench.ai");

        assert_eq!(emails, vec!["admin@vibebench.ai", "ops@vibebench.ai"]);
    }

    #[test]
    fn drops_empty_entries_and_trims() {
        let emails = parse_admin_emails(" admin@vibebench.ai , ,,ops@vibebench.ai,");

        assert_eq!(emails, vec!["admin@vibebench.ai", "ops@vibebench.ai"]);
    }

    #[test]
    fn empty_list_for_empty_input() {
        assert!(parse_admin_emails("").is_empty());
    }
}
