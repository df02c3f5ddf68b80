//! Identifier case conversions used for problem types and schema names.

/// `CreateResource` → `create-resource`
pub fn camel_to_kebab(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for (i, c) in value.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push('-');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// `create_resource` → `createResource`
pub fn snake_to_camel(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('_', Some(next)) if next.is_ascii_alphabetic() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    lower_first(&out)
}

/// `create_resource` → `create-resource`
pub fn snake_to_kebab(value: &str) -> String {
    value.replace('_', "-")
}

/// `createResource` → `CreateResource`
pub fn camel_to_pascal(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// English plural for resource names: `box` → `boxes`, `city` → `cities`.
pub fn pluralize(value: &str) -> String {
    if ["ch", "sh", "x", "s", "z", "o"]
        .iter()
        .any(|suffix| value.ends_with(suffix))
    {
        return format!("{value}es");
    }

    if let Some(stem) = value.strip_suffix('y') {
        if stem
            .chars()
            .last()
            .is_some_and(|c| !"aeiou".contains(c))
        {
            return format!("{stem}ies");
        }
    }

    if let Some(stem) = value.strip_suffix("fe") {
        return format!("{stem}ves");
    }

    if let Some(stem) = value.strip_suffix('f') {
        return format!("{stem}ves");
    }

    format!("{value}s")
}

fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
