use std::sync::LazyLock;

use regex::Regex;

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+(\d+)$").expect("valid street number regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetParts {
    pub street: Option<String>,
    pub street_number: Option<String>,
}

/// Split a free-form address line into street and trailing street number.
///
/// `"Avenida Álvaro Obregón 45"` becomes `("Avenida Álvaro Obregón", "45")`.
/// Lines without a trailing number are kept whole; blank lines yield no street.
#[must_use]
pub fn split_street_number(line: Option<&str>) -> StreetParts {
    let Some(line) = line.map(str::trim).filter(|l| !l.is_empty()) else {
        return StreetParts {
            street: None,
            street_number: None,
        };
    };

    match TRAILING_NUMBER.captures(line) {
        Some(caps) => StreetParts {
            street: Some(caps[1].trim().to_string()),
            street_number: Some(caps[2].to_string()),
        },
        None => StreetParts {
            street: Some(line.to_string()),
            street_number: None,
        },
    }
}
