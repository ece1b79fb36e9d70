//! Endpoint rules shared by the parser and the differ.
//!
//! Hostnames follow `<id>-<stack>.<env>.<tld>` or `<sh>.<stack>.<base>`,
//! where `<env>` is one of `stg`, `companyworks`, `companycloud` and
//! `<tld>` one of `companycloud`, `com`, `lol`.

use regex::Regex;

/// Path appended to every monitored host.
pub const LOGIN_PATH: &str = "/en-US/account/login?loginType=company";

/// Host fragments of staging and ephemeral environments. Never monitored.
pub const NON_PRODUCTION_MARKERS: [&str; 2] = ["stg.companycloud.com", "companyworks.lol"];

const ENV_SUFFIX: &str = r"\.(?:stg|companyworks|companycloud)?\.(?:companycloud|com|lol)?";

/// `https://<host>/en-US/account/login?loginType=company`
pub fn login_url(host: &str) -> String {
    format!("https://{host}{LOGIN_PATH}")
}

/// Whether `host` belongs to a staging or ephemeral environment.
pub fn is_non_production(host: &str) -> bool {
    NON_PRODUCTION_MARKERS.iter().any(|m| host.contains(m))
}

/// Extracts the sub-identifier from `<id>-<stack>.<env>.<tld>` domains.
///
/// Capture group 1 holds the sub-identifier.
pub fn identifier_pattern(stack: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(.+)-{}{ENV_SUFFIX}", regex::escape(stack)))
}

/// Matches any vendor test URL that belongs to `stack`.
pub fn stack_url_pattern(stack: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(".*{}{ENV_SUFFIX}", regex::escape(stack)))
}

/// Fallback host for a search-head without a CNAME record.
pub fn synthesized_host(search_head: &str, stack: &str, base_domain: &str) -> String {
    format!("{search_head}.{stack}.{base_domain}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_shape() {
        assert_eq!(
            login_url("a.companycloud.com"),
            "https://a.companycloud.com/en-US/account/login?loginType=company"
        );
    }

    #[test]
    fn non_production_hosts() {
        assert!(is_non_production("sh1.mystack.stg.companycloud.com"));
        assert!(is_non_production("aqueduct-1ke-test.companyworks.lol"));
        assert!(!is_non_production("foo-mystack.companycloud.com"));
    }

    #[test]
    fn identifier_extracted_from_domain() {
        let pattern = identifier_pattern("mystack").unwrap();
        let caps = pattern.captures("foo-mystack.companycloud.com").unwrap();
        assert_eq!(&caps[1], "foo");

        let caps = pattern.captures("es-mystack.stg.companycloud.com").unwrap();
        assert_eq!(&caps[1], "es");
    }

    #[test]
    fn identifier_requires_env_suffix() {
        let pattern = identifier_pattern("mystack").unwrap();
        assert!(pattern.captures("mystack.companycloud.com").is_none());
        assert!(pattern.captures("foo-mystack.example").is_none());
    }

    #[test]
    fn stack_name_is_literal() {
        let pattern = stack_url_pattern("my.stack").unwrap();
        assert!(pattern.is_match("https://sh1.my.stack.companycloud.com/"));
        assert!(!pattern.is_match("https://sh1.myxstack.companycloud.com/"));
    }

    #[test]
    fn synthesized_fallback() {
        assert_eq!(
            synthesized_host("sh2", "mystack", "companycloud.com"),
            "sh2.mystack.companycloud.com"
        );
    }
}
