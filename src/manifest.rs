//! Parser for the IOV manifest text format: newline-separated records
//! `<since-uint64><SP><child-token>`, one per line, in file order.
//!
//! Grounded on `examples/original_source/src/iov_helpers.h`
//! (`get_key_iov`, `parse_IOVs_keys`).

use crate::errors::GitCondDbError;
use crate::iov::{IOV, TimePoint};

/// Result of picking the manifest entry valid at a time-point: the child
/// token to descend into, and the narrowed `[since, until)` for that
/// choice. An invalid `IOV` means "no entry applies" (see
/// [`pick_entry`]'s doc comment) — this is the soft "not found" signal
/// from spec §7, not an error.
pub type PickedEntry = (String, IOV);

/// One manifest record after boundary propagation: its own IOV (derived
/// from its `since` and the following record's `since`, or `IOV::max()`
/// for the last record) and its child token.
pub type ManifestEntry = (IOV, String);

fn parse_line(line: &str) -> Result<Option<(TimePoint, &str)>, GitCondDbError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let since_str = parts.next().unwrap_or("");
    let token = parts.next().map(str::trim_start).unwrap_or("");
    if token.is_empty() {
        tracing::warn!("missing child token in manifest line {line:?}");
        return Err(GitCondDbError::ManifestParseError(format!(
            "missing child token in line {line:?}"
        )));
    }
    let since: TimePoint = since_str.parse().map_err(|_| {
        tracing::warn!("invalid since value in manifest line {line:?}");
        GitCondDbError::ManifestParseError(format!("invalid since value in line {line:?}"))
    })?;
    tracing::trace!("parsed manifest entry since={since} token={token:?}");
    Ok(Some((since, token)))
}

/// Pick the entry valid at `t` under `bounds`, optionally merging runs of
/// consecutive entries that share an identical child token (`reduce`).
///
/// Returns `("", IOV::invalid())` if `t` falls outside `bounds`, or the
/// manifest has no entry covering `t` at all.
pub fn pick_entry(
    data: &str,
    t: TimePoint,
    bounds: IOV,
    reduce: bool,
) -> Result<PickedEntry, GitCondDbError> {
    tracing::debug!("pick_entry t={t} bounds={bounds:?} reduce={reduce}");
    if t < bounds.since || t >= bounds.until {
        return Ok((String::new(), IOV::invalid()));
    }

    let mut key = String::new();
    let mut since: TimePoint = 0;
    let mut until: Option<TimePoint> = None;

    for line in data.lines() {
        let Some((current, tmp_key)) = parse_line(line)? else {
            continue;
        };

        if reduce && tmp_key == key {
            continue;
        }

        if current > t {
            until = Some(current);
            break;
        }

        key = tmp_key.to_string();
        since = current;
    }

    let mut iov = IOV {
        since,
        until: until.unwrap_or(IOV::max()),
    };
    iov.cut(&bounds);
    Ok((key, iov))
}

/// Parse the full ordered sequence of `(IOV, child_token)` entries: each
/// entry's `until` is the next entry's `since`, the last entry's `until`
/// is `IOV::max()`.
pub fn parse_entries(data: &str) -> Result<Vec<ManifestEntry>, GitCondDbError> {
    let mut out: Vec<ManifestEntry> = Vec::new();

    for line in data.lines() {
        let Some((bound, key)) = parse_line(line)? else {
            continue;
        };
        if let Some(last) = out.last_mut() {
            last.0.until = bound;
        }
        out.push((
            IOV {
                since: bound,
                until: IOV::max(),
            },
            key.to_string(),
        ));
    }

    Ok(out)
}
