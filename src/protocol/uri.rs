//! Launch URI assembly
//!
//! Builds `scheme:[//[userinfo@]host[:port]]path[?query][#fragment]` from the
//! message parts. Characters that are not legal in a component are
//! percent-encoded as UTF-8 (including `%` itself); structural problems are
//! reported as [`LinkError::InvalidUri`] carrying the unescaped input.

use std::fmt::Write;
use std::net::Ipv4Addr;

use crate::{LinkError, Result};

#[derive(Debug, Clone, Copy)]
pub(crate) struct UriParts<'a> {
    pub scheme: &'a str,
    pub userinfo: &'a str,
    pub host: &'a str,
    pub port: i32,
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

impl UriParts<'_> {
    fn has_authority(&self) -> bool {
        !self.host.is_empty() || !self.userinfo.is_empty() || self.port != -1
    }

    /// Concatenation without escaping or validation
    pub fn raw(&self) -> String {
        let mut out = format!("{}:", self.scheme);
        if self.has_authority() {
            out.push_str("//");
            if !self.userinfo.is_empty() {
                out.push_str(self.userinfo);
                out.push('@');
            }
            out.push_str(self.host);
            if self.port != -1 {
                let _ = write!(out, ":{}", self.port);
            }
        }
        out.push_str(self.path);
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(self.query);
        }
        if !self.fragment.is_empty() {
            out.push('#');
            out.push_str(self.fragment);
        }
        out
    }

    /// Validate and escape into a URI string
    pub fn build(&self) -> Result<String> {
        let fail = |reason: &str| LinkError::invalid_uri(self.raw(), reason);

        if !valid_scheme(self.scheme) {
            return Err(fail("Illegal character in scheme name"));
        }
        if !(-1..=65535).contains(&self.port) {
            return Err(fail("Illegal port number"));
        }

        let mut out = format!("{}:", self.scheme);
        if self.has_authority() {
            if self.host.is_empty() {
                return Err(fail("Expected host"));
            }
            if !valid_host(self.host) {
                return Err(fail("Illegal character in hostname"));
            }
            out.push_str("//");
            if !self.userinfo.is_empty() {
                quote_into(&mut out, self.userinfo, is_userinfo_byte);
                out.push('@');
            }
            out.push_str(self.host);
            if self.port != -1 {
                let _ = write!(out, ":{}", self.port);
            }
        } else if self.path.is_empty() && self.query.is_empty() {
            return Err(fail("Expected scheme-specific part"));
        }

        // A scheme makes the URI absolute, so the path must be too
        if !self.path.is_empty() && !self.path.starts_with('/') {
            return Err(fail("Relative path in absolute URI"));
        }

        quote_into(&mut out, self.path, is_path_byte);
        if !self.query.is_empty() {
            out.push('?');
            quote_into(&mut out, self.query, is_query_byte);
        }
        if !self.fragment.is_empty() {
            out.push('#');
            quote_into(&mut out, self.fragment, is_query_byte);
        }
        Ok(out)
    }
}

fn valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn valid_host(host: &str) -> bool {
    if let Some(inner) = host.strip_prefix('[') {
        return inner.strip_suffix(']').is_some_and(|addr| {
            addr.contains(':') && addr.chars().all(|c| c.is_ascii_hexdigit() || c == ':' || c == '.')
        });
    }
    if host.parse::<Ipv4Addr>().is_ok() {
        return true;
    }

    // Hostname: the rightmost label starts with a letter
    let host = host.strip_suffix('.').unwrap_or(host);
    let labels_valid = !host.is_empty()
        && host.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    labels_valid
        && host
            .rsplit('.')
            .next()
            .and_then(|label| label.chars().next())
            .is_some_and(|c| c.is_ascii_alphabetic())
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn is_sub_delim(b: u8) -> bool {
    matches!(b, b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=')
}

fn is_userinfo_byte(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b) || b == b':'
}

fn is_path_byte(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b) || matches!(b, b':' | b'@' | b'/')
}

fn is_query_byte(b: u8) -> bool {
    is_path_byte(b) || b == b'?'
}

fn quote_into(out: &mut String, component: &str, allowed: fn(u8) -> bool) {
    for b in component.bytes() {
        if allowed(b) {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{:02X}", b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts<'a>(host: &'a str, port: i32, path: &'a str) -> UriParts<'a> {
        UriParts { scheme: "mumble", userinfo: "", host, port, path, query: "", fragment: "" }
    }

    #[test]
    fn full_uri_is_assembled_in_order() {
        let uri = UriParts {
            scheme: "mumble",
            userinfo: "Steve",
            host: "voice.example.com",
            port: 64738,
            path: "/Minecraft/overworld",
            query: "version=1.2.0",
            fragment: "top",
        }
        .build()
        .expect("valid");
        assert_eq!(uri, "mumble://Steve@voice.example.com:64738/Minecraft/overworld?version=1.2.0#top");
    }

    #[test]
    fn unspecified_port_is_omitted() {
        let uri = parts("voice.example.com", -1, "/").build().expect("valid");
        assert_eq!(uri, "mumble://voice.example.com/");
    }

    #[test]
    fn illegal_characters_are_escaped() {
        let uri = parts("127.0.0.1", 64738, "/Team Red/100%").build().expect("valid");
        assert_eq!(uri, "mumble://127.0.0.1:64738/Team%20Red/100%25");

        let uri = parts("localhost", -1, "/Überwelt").build().expect("valid");
        assert_eq!(uri, "mumble://localhost/%C3%9Cberwelt");
    }

    #[test]
    fn ipv6_hosts_are_accepted() {
        let uri = parts("[::1]", 64738, "").build().expect("valid");
        assert_eq!(uri, "mumble://[::1]:64738");
    }

    #[test]
    fn bad_hostname_reports_raw_input() {
        let err = parts("bad host!", 64738, "/lobby").build().expect_err("invalid host");
        match err {
            LinkError::InvalidUri { input, reason } => {
                assert_eq!(input, "mumble://bad host!:64738/lobby");
                assert!(reason.contains("hostname"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn numeric_top_label_is_rejected() {
        let err = parts("voice.123", 64738, "/").build().expect_err("numeric top label");
        assert!(err.to_string().contains("voice.123"));
    }

    #[test]
    fn port_without_host_is_rejected() {
        assert!(parts("", 64738, "/").build().is_err());
    }

    #[test]
    fn relative_path_with_authority_is_rejected() {
        let err = parts("voice.example.com", -1, "lobby").build().expect_err("relative");
        assert!(err.to_string().contains("Relative path"));
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        assert!(parts("voice.example.com", 70000, "/").build().is_err());
        assert!(parts("voice.example.com", -2, "/").build().is_err());
    }

    #[test]
    fn empty_scheme_specific_part_is_rejected() {
        assert!(parts("", -1, "").build().is_err());
    }

    #[test]
    fn relative_path_without_authority_is_rejected() {
        let err = parts("", -1, "lobby").build().expect_err("relative");
        match err {
            LinkError::InvalidUri { input, reason } => {
                assert_eq!(input, "mumble:lobby");
                assert!(reason.contains("Relative path"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn absolute_path_without_authority_is_kept() {
        let uri = parts("", -1, "/lobby").build().expect("valid");
        assert_eq!(uri, "mumble:/lobby");
    }

    #[test]
    fn hostname_rules() {
        assert!(valid_host("voice.example.com"));
        assert!(valid_host("voice.example.com."));
        assert!(valid_host("10.0.0.1"));
        assert!(valid_host("localhost"));
        assert!(valid_host("mc1.example2.net"));
        assert!(!valid_host("voice.123"));
        assert!(!valid_host("1.2.3"));
        assert!(!valid_host("10.0.0.256"));
        assert!(!valid_host("-voice.example.com"));
        assert!(!valid_host("voice..example.com"));
        assert!(!valid_host("voice_example.com"));
        assert!(!valid_host("[::1"));
    }
}
