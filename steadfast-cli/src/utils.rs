/// Replaces the password of a connection URL with `***`. Unparseable input is
/// returned unchanged.
pub fn redact_url_password(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut u) if u.password().is_some() => {
            if u.set_password(Some("***")).is_ok() {
                u.to_string()
            } else {
                raw.to_string()
            }
        }
        _ => raw.to_string(),
    }
}

/// Parses repeated `NAME=N` flags; malformed entries are returned as errors.
pub fn parse_limits(entries: &[String]) -> Result<Vec<(String, usize)>, String> {
    entries
        .iter()
        .map(|s| {
            let (name, n) = s
                .split_once('=')
                .ok_or_else(|| format!("expected NAME=N, got {s:?}"))?;
            let n: usize = n
                .trim()
                .parse()
                .map_err(|_| format!("invalid limit in {s:?}"))?;
            Ok((name.trim().to_string(), n))
        })
        .collect()
}
