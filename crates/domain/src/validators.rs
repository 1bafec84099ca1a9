/// Lowercases a domain name and strips the trailing root dot.
///
/// The root zone itself (`.` or the empty string) normalizes to `""`.
pub fn normalize_domain(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

pub fn validate_domain_name(name: &str) -> Result<(), String> {
    let normalized = normalize_domain(name);
    if normalized.is_empty() {
        return Ok(());
    }
    if normalized.len() > 253 {
        return Err(format!("domain '{name}' cannot exceed 253 characters"));
    }
    for label in normalized.split('.') {
        if label.is_empty() {
            return Err(format!("domain '{name}' contains an empty label"));
        }
        if label.len() > 63 {
            return Err(format!("label '{label}' in '{name}' exceeds 63 characters"));
        }
    }
    Ok(())
}

/// True when `name` equals `zone` or sits below it. The root zone contains everything.
pub fn is_subdomain_of(name: &str, zone: &str) -> bool {
    let name = normalize_domain(name);
    let zone = normalize_domain(zone);
    if zone.is_empty() || name == zone {
        return true;
    }
    name.len() > zone.len()
        && name.ends_with(zone.as_str())
        && name.as_bytes()[name.len() - zone.len() - 1] == b'.'
}
