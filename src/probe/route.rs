//! Parser for captured traceroute output.
//!
//! Expected shape, with `-n` so hops are numeric addresses:
//!
//! ```text
//! traceroute to 8.8.8.8 (8.8.8.8), 10 hops max, 40 byte packets
//!  1  * * *
//!  2  10.0.0.254  0.417 ms  0.459 ms  0.670 ms
//!  3  172.16.0.254  0.967 ms  1.031 ms  1.544 ms
//!  4  8.8.8.8  28.339 ms  28.566 ms  28.791 ms
//! ```

/// Parse hop addresses out of raw traceroute lines.
///
/// The first line is the banner and is discarded. On every following
/// line the second whitespace-delimited token is the hop value: a token
/// with exactly 3 dots is taken as an address (structural check only,
/// matching the tool's output shape), `*` means no answer, and anything
/// else is reported as an invalid line and skipped.
///
/// Returns the hop sequence in hop order, or a diagnostic message when
/// the output is too short or contains no usable route at all.
pub fn parse_routes(
    host: &str,
    lines: &[String],
    silent: bool,
) -> Result<Vec<Option<String>>, String> {
    if lines.len() < 2 {
        if !silent {
            log::error!("{}: {}", host, lines.join(" "));
        }
        return Err(format!(
            "The output of traceroute seems truncated:\n{}",
            lines.join("")
        ));
    }

    let mut routes: Vec<Option<String>> = Vec::new();
    for line in &lines[1..] {
        let Some(route) = line.split_whitespace().nth(1) else {
            if !silent {
                log::error!("{}: invalid output line from traceroute: '{}'", host, line);
            }
            continue;
        };
        if route.matches('.').count() == 3 {
            routes.push(Some(route.to_string()));
        } else if route == "*" {
            routes.push(None);
        } else if !silent {
            log::error!("{}: invalid output line from traceroute: '{}'", host, line);
        }
    }

    if routes.is_empty() {
        let error = "incomplete output from traceroute. No routes found.".to_string();
        if !silent {
            log::error!("{}: {}", host, error);
        }
        return Err(error);
    }

    Ok(routes)
}
