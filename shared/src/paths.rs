//! Query strings and policy target paths

use std::collections::BTreeMap;

/// Parse `?a=1&b=x%20y` into a map; the leading `?` is optional
///
/// Keys and values are percent-decoded. A key without `=` maps to an empty
/// string. Undecodable input is kept verbatim.
pub fn parse_query(query: &str) -> BTreeMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// Whether `path` is absolute on either Unix or Windows
pub fn is_absolute_path(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with("\\\\") {
        return true;
    }

    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// What a new policy would apply to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyTarget {
    /// Absolute path on the local host
    Path(String),
    /// `@host`
    Host { host: String },
    /// `user@host`
    User { user: String, host: String },
    /// `user@host:/absolute/path`
    UserPath { user: String, host: String, path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyPathError {
    #[error("Cannot create the global policy, it already exists.")]
    GlobalExists,

    #[error("Policies can not be defined for relative paths.")]
    RelativePath,
}

/// Classify a policy target typed by the user
///
/// Accepted forms are an absolute path, `@host`, `user@host` and
/// `user@host:/absolute/path`. `user@host:relative` is rejected even though
/// `user@host` alone is accepted; this mirrors the backend console's long
/// standing behaviour and is kept until the backend decides otherwise.
pub fn check_policy_path(path: &str) -> Result<PolicyTarget, PolicyPathError> {
    if path == "(global)" {
        return Err(PolicyPathError::GlobalExists);
    }

    if is_absolute_path(path) {
        return Ok(PolicyTarget::Path(path.to_string()));
    }

    if let Some(host) = path.strip_prefix('@') {
        if !host.is_empty() && !host.contains(':') {
            return Ok(PolicyTarget::Host { host: host.to_string() });
        }
        return Err(PolicyPathError::RelativePath);
    }

    let Some((user, rest)) = path.split_once('@') else {
        return Err(PolicyPathError::RelativePath);
    };

    match rest.split_once(':') {
        None if !user.is_empty() && !rest.is_empty() => Ok(PolicyTarget::User {
            user: user.to_string(),
            host: rest.to_string(),
        }),
        Some((host, target)) if !user.is_empty() && !host.is_empty() => {
            if is_absolute_path(target) {
                Ok(PolicyTarget::UserPath {
                    user: user.to_string(),
                    host: host.to_string(),
                    path: target.to_string(),
                })
            } else {
                Err(PolicyPathError::RelativePath)
            }
        }
        _ => Err(PolicyPathError::RelativePath),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let q = parse_query("?a=1&b=x%20y&c");
        assert_eq!(q.get("a").map(String::as_str), Some("1"));
        assert_eq!(q.get("b").map(String::as_str), Some("x y"));
        assert_eq!(q.get("c").map(String::as_str), Some(""));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_parse_query_without_question_mark() {
        let q = parse_query("path=%2Fhome%2Falice&host=laptop");
        assert_eq!(q["path"], "/home/alice");
        assert_eq!(q["host"], "laptop");
        assert!(parse_query("").is_empty());
        assert!(parse_query("?").is_empty());
    }

    #[test]
    fn test_is_absolute_path() {
        assert!(is_absolute_path("/home"));
        assert!(is_absolute_path("C:\\data"));
        assert!(is_absolute_path("d:/data"));
        assert!(is_absolute_path("\\\\server\\share"));
        assert!(!is_absolute_path("data"));
        assert!(!is_absolute_path("C:"));
        assert!(!is_absolute_path(""));
    }

    #[test]
    fn test_check_policy_path_accepts_valid_targets() {
        assert_eq!(
            check_policy_path("/home"),
            Ok(PolicyTarget::Path("/home".to_string()))
        );
        assert_eq!(
            check_policy_path("C:\\data"),
            Ok(PolicyTarget::Path("C:\\data".to_string()))
        );
        assert_eq!(
            check_policy_path("@host"),
            Ok(PolicyTarget::Host { host: "host".to_string() })
        );
        assert_eq!(
            check_policy_path("user@host"),
            Ok(PolicyTarget::User { user: "user".to_string(), host: "host".to_string() })
        );
        assert_eq!(
            check_policy_path("user@host:/p"),
            Ok(PolicyTarget::UserPath {
                user: "user".to_string(),
                host: "host".to_string(),
                path: "/p".to_string(),
            })
        );
        assert!(check_policy_path("user@host:C:\\data").is_ok());
    }

    #[test]
    fn test_check_policy_path_rejects() {
        assert_eq!(check_policy_path("(global)"), Err(PolicyPathError::GlobalExists));
        assert_eq!(check_policy_path("foo"), Err(PolicyPathError::RelativePath));
        assert_eq!(check_policy_path(""), Err(PolicyPathError::RelativePath));
        assert_eq!(check_policy_path("@"), Err(PolicyPathError::RelativePath));
        assert_eq!(check_policy_path("@host:x"), Err(PolicyPathError::RelativePath));
        assert_eq!(check_policy_path("@host"), Ok(PolicyTarget::Host { host: "host".into() }));
    }

    /// `user@host` passes while `user@host:relative` fails. Possibly a
    /// defect, kept as observed.
    #[test]
    fn test_check_policy_path_user_host_relative_is_rejected() {
        assert!(check_policy_path("user@host").is_ok());
        assert_eq!(
            check_policy_path("user@host:foo"),
            Err(PolicyPathError::RelativePath)
        );
    }
}
