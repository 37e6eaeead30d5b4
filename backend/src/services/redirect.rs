//! Guard for user-supplied redirect targets.

use url::Url;

use crate::config::AppSettings;

/// Whether `target` may be redirected to.
///
/// Accepted are absolute paths on this site (`/x`, but not `//x` which is
/// scheme-relative) and absolute `http`/`https` URLs whose host, with or
/// without port, is in `allowed_hosts`.
pub fn is_safe_redirect(target: &str, allowed_hosts: &[String]) -> bool {
    let target = target.trim();
    if target.is_empty() || target.chars().any(|c| c.is_control() || c == '\\') {
        return false;
    }

    if target.starts_with('/') {
        return !target.starts_with("//");
    }

    let Ok(url) = Url::parse(target) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let with_port = url.port().map(|port| format!("{}:{}", host, port));
    allowed_hosts.iter().any(|allowed| {
        allowed.eq_ignore_ascii_case(host)
            || with_port
                .as_deref()
                .is_some_and(|hp| allowed.eq_ignore_ascii_case(hp))
    })
}

/// `next` when safe, else the configured success URL.
pub fn success_redirect(next: Option<&str>, settings: &AppSettings) -> String {
    match next.map(str::trim) {
        Some(target) if is_safe_redirect(target, &settings.allowed_hosts) => target.to_string(),
        Some(target) => {
            log::warn!("Ignoring unsafe redirect target {:?}", target);
            settings.success_url.clone()
        }
        None => settings.success_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SUCCESS_URL;

    fn hosts() -> Vec<String> {
        vec!["localhost".to_string(), "amy.carpentries.org".to_string()]
    }

    #[test]
    fn test_relative_paths() {
        assert!(is_safe_redirect("/dashboard/", &hosts()));
        assert!(is_safe_redirect("/recruitment/processes/?status=o", &hosts()));
        assert!(!is_safe_redirect("//evil.com/", &hosts()));
        assert!(!is_safe_redirect("/\\evil.com", &hosts()));
        assert!(!is_safe_redirect("dashboard/", &hosts()));
        assert!(!is_safe_redirect("", &hosts()));
    }

    #[test]
    fn test_absolute_urls() {
        assert!(is_safe_redirect("https://amy.carpentries.org/x", &hosts()));
        assert!(is_safe_redirect("http://localhost:8000/", &hosts()));
        assert!(!is_safe_redirect("https://evil.com/", &hosts()));
        assert!(!is_safe_redirect("javascript:alert(1)", &hosts()));
        assert!(!is_safe_redirect("ftp://localhost/", &hosts()));
    }

    #[test]
    fn test_success_redirect_fallback() {
        let settings = AppSettings::default();
        assert_eq!(success_redirect(None, &settings), DEFAULT_SUCCESS_URL);
        assert_eq!(
            success_redirect(Some("https://evil.com/"), &settings),
            DEFAULT_SUCCESS_URL
        );
        assert_eq!(success_redirect(Some("/dashboard/"), &settings), "/dashboard/");
    }
}
