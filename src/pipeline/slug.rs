use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Normalize a classroom display name into its URL slug.
///
/// Lower-cases, strips diacritics (NFD then drop combining marks), turns each
/// whitespace run into one `-` and drops anything outside `[a-z0-9-]`.
/// The output contains no whitespace and nothing outside the allowed set, so
/// `to_slug(&to_slug(x)) == to_slug(x)`.
pub fn to_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;

        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    slug
}

/// Best-effort display name for a slug, used only when the real name is not
/// available. Diacritics and original casing are lost, so this is approximate.
pub fn name_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
