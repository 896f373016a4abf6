use super::{ServiceError, ServiceResult};

pub const MIN_LEN: usize = 2;
pub const MAX_LEN: usize = 64;

/// Slugs are lowercase ASCII words joined by single hyphens.
pub fn validate_slug(slug: &str) -> ServiceResult<()> {
    if slug.len() < MIN_LEN || slug.len() > MAX_LEN {
        return Err(ServiceError::invalid(
            "slug",
            format!("must be between {} and {} characters", MIN_LEN, MAX_LEN),
        ));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(ServiceError::invalid(
            "slug",
            "may only contain lowercase letters, digits and hyphens",
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(ServiceError::invalid(
            "slug",
            "hyphens must separate words",
        ));
    }
    Ok(())
}

/// Derive a slug from a display name: "Café Dupont & Fils" -> "cafe-dupont-fils".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let c = fold_accent(c);
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
        if slug.len() >= MAX_LEN {
            break;
        }
    }

    slug.truncate(MAX_LEN);
    slug.trim_end_matches('-').to_string()
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_slugs() {
        for slug in ["acme", "jean-dupont", "studio-42", "a1"] {
            assert!(validate_slug(slug).is_ok(), "{slug} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_slugs() {
        for slug in ["a", "Acme", "acme_co", "-acme", "acme-", "ac--me", "café", ""] {
            assert!(validate_slug(slug).is_err(), "{slug} should be invalid");
        }
        assert!(validate_slug(&"a".repeat(MAX_LEN + 1)).is_err());
    }

    #[test]
    fn slugify_folds_and_collapses() {
        assert_eq!(slugify("Café Dupont & Fils"), "cafe-dupont-fils");
        assert_eq!(slugify("  Élodie   Martin "), "elodie-martin");
        assert_eq!(slugify("Studio 42!!"), "studio-42");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn slugify_output_is_valid() {
        let slug = slugify(&"Très Long Nom ".repeat(20));
        assert!(slug.len() <= MAX_LEN);
        assert!(validate_slug(&slug).is_ok());
    }
}
