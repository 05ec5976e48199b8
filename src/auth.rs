//! Kerberos username detection.
//!
//! When no username is configured, the default principal of the current
//! ticket cache can stand in. Detection shells out to `klist` once per
//! process; the result, available or not, is cached for the process
//! lifetime and never refreshed, even if a ticket is acquired later.
//!
//! Detection never fails the caller: a missing tool, a nonzero exit, or
//! output we cannot parse all degrade to "no username available" with a
//! diagnostic log line.

use std::process::Command;
use std::sync::OnceLock;

use tracing::debug;

/// The default principal split into its two usable spellings.
#[derive(Debug, Clone)]
struct KerberosUsername {
    with_realm: String,
    without_realm: String,
}

static DETECTED: OnceLock<Option<KerberosUsername>> = OnceLock::new();

/// The default Kerberos principal for this process, if one can be detected.
///
/// With `include_realm` the full `principal@REALM` spelling is returned,
/// otherwise just the principal part. Concurrent first callers converge on
/// a single `klist` invocation.
pub fn default_kerberos_username(include_realm: bool) -> Option<String> {
    DETECTED.get_or_init(detect).as_ref().map(|username| {
        if include_realm {
            username.with_realm.clone()
        } else {
            username.without_realm.clone()
        }
    })
}

fn detect() -> Option<KerberosUsername> {
    let output = match Command::new("klist").output() {
        Ok(output) => output,
        Err(e) => {
            debug!("klist not available: {}", e);
            return None;
        }
    };

    if !output.status.success() {
        debug!("klist exited with {}", output.status);
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let username = parse_klist_output(&stdout);
    if username.is_none() {
        debug!("could not parse principal from klist output");
    }
    username
}

/// Pull the default principal out of `klist` output.
///
/// The second line reads `Default principal: name@REALM`; anything that
/// does not match that shape yields `None`.
fn parse_klist_output(output: &str) -> Option<KerberosUsername> {
    let line = output.lines().nth(1)?;

    let mut parts = line.splitn(2, ':');
    let _label = parts.next()?;
    let principal = parts.next()?.trim();

    let (name, realm) = principal.split_once('@')?;
    if name.is_empty() || realm.is_empty() {
        return None;
    }

    Some(KerberosUsername {
        with_realm: principal.to_string(),
        without_realm: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_klist_output() {
        let output = "Ticket cache: FILE:/tmp/krb5cc_1000\n\
                      Default principal: alice@EXAMPLE.COM\n\
                      \n\
                      Valid starting     Expires            Service principal\n";
        let username = parse_klist_output(output).unwrap();
        assert_eq!(username.with_realm, "alice@EXAMPLE.COM");
        assert_eq!(username.without_realm, "alice");
    }

    #[test]
    fn test_parse_rejects_missing_realm() {
        let output = "Ticket cache: FILE:/tmp/krb5cc_1000\nDefault principal: alice\n";
        assert!(parse_klist_output(output).is_none());
    }

    #[test]
    fn test_parse_rejects_short_output() {
        assert!(parse_klist_output("").is_none());
        assert!(parse_klist_output("Ticket cache: FILE:/tmp/krb5cc_1000\n").is_none());
    }
}
