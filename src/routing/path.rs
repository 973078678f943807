//! Url pattern handling.
//!
//! Patterns are accepted in axum form (`/users/{id}`, `/files/{*rest}`) or
//! Express form (`/users/:id`, `/files/*rest`) and stored in axum form.

/// One segment of a normalised pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Static(&'a str),
    Param(&'a str),
    CatchAll(&'a str),
}

/// Why a pattern was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathError {
    MissingLeadingSlash,
    BadParameter(String),
    CatchAllNotLast(String),
}

impl PathError {
    pub(crate) fn reason(&self) -> String {
        match self {
            PathError::MissingLeadingSlash => "must start with '/'".to_string(),
            PathError::BadParameter(segment) => format!("invalid parameter segment '{}'", segment),
            PathError::CatchAllNotLast(segment) => {
                format!("catch-all segment '{}' must be last", segment)
            }
        }
    }
}

/// Rewrite `url` into axum form.
pub(crate) fn normalize(url: &str) -> Result<String, PathError> {
    if !url.starts_with('/') {
        return Err(PathError::MissingLeadingSlash);
    }

    let segments: Vec<&str> = url[1..].split('/').collect();
    let last = segments.len() - 1;
    let mut out = String::with_capacity(url.len() + 4);

    for (i, raw) in segments.iter().enumerate() {
        out.push('/');
        match parse_segment(raw)? {
            Segment::Static(s) => out.push_str(s),
            Segment::Param(name) => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
            Segment::CatchAll(name) => {
                if i != last {
                    return Err(PathError::CatchAllNotLast(raw.to_string()));
                }
                out.push_str("{*");
                out.push_str(name);
                out.push('}');
            }
        }
    }

    Ok(out)
}

fn parse_segment(raw: &str) -> Result<Segment<'_>, PathError> {
    let param = if let Some(name) = raw.strip_prefix(':') {
        Some((name, false))
    } else if let Some(name) = raw.strip_prefix('*') {
        Some((if name.is_empty() { "wildcard" } else { name }, true))
    } else if let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        match inner.strip_prefix('*') {
            Some(name) => Some((name, true)),
            None => Some((inner, false)),
        }
    } else if raw.contains(['{', '}']) {
        return Err(PathError::BadParameter(raw.to_string()));
    } else {
        None
    };

    match param {
        None => Ok(Segment::Static(raw)),
        Some((name, _)) if !is_identifier(name) => Err(PathError::BadParameter(raw.to_string())),
        Some((name, true)) => Ok(Segment::CatchAll(name)),
        Some((name, false)) => Ok(Segment::Param(name)),
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether two normalised patterns cannot share one router.
///
/// Walking both patterns segment by segment, the first position where both
/// are dynamic must hold the same kind of parameter under the same name. A
/// static segment on either side ends the walk: static routes take priority
/// over parameters at the same position.
pub(crate) fn conflicts(a: &str, b: &str) -> bool {
    for (left, right) in a[1..].split('/').zip(b[1..].split('/')) {
        match (dynamic(left), dynamic(right)) {
            (None, None) if left == right => continue,
            (None, _) | (_, None) => return false,
            (Some(l), Some(r)) if l == r => continue,
            _ => return true,
        }
    }
    false
}

/// `(catch_all, name)` of a parameter segment.
fn dynamic(segment: &str) -> Option<(bool, &str)> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    Some(match inner.strip_prefix('*') {
        Some(name) => (true, name),
        None => (false, inner),
    })
}

/// Parameter names of a normalised pattern, in order.
pub fn param_names(normalized: &str) -> Vec<&str> {
    normalized
        .split('/')
        .filter_map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map(|s| s.trim_start_matches('*'))
        })
        .collect()
}

/// Join a mount path and a child segment without doubling slashes.
pub(crate) fn join(base: &str, child: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), child.trim_start_matches('/'))
}
