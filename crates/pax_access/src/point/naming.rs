//! Getter and setter naming conventions.
//!
//! Both the Rust style (`get_name`, `set_name`, `is_active`, bare `name`)
//! and the camel style (`getName`, `setName`, `isActive`) are understood.

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

const SNAKE_PREFIXES: [&str; 3] = ["get_", "set_", "is_"];
const CAMEL_PREFIXES: [&str; 3] = ["get", "set", "is"];

/// Returns the property a getter or setter name refers to.
///
/// # Examples
///
/// ```
/// use pax_access::point::naming::property_name;
///
/// assert_eq!(property_name("get_number"), "number");
/// assert_eq!(property_name("is_active"), "active");
/// assert_eq!(property_name("setFirstName"), "firstName");
/// assert_eq!(property_name("city"), "city");
/// assert_eq!(property_name("getaway"), "getaway");
/// ```
pub fn property_name(method: &str) -> Cow<'_, str> {
    for prefix in SNAKE_PREFIXES {
        if let Some(rest) = method.strip_prefix(prefix)
            && !rest.is_empty()
        {
            return Cow::Borrowed(rest);
        }
    }
    for prefix in CAMEL_PREFIXES {
        if let Some(rest) = method.strip_prefix(prefix) {
            let mut chars = rest.chars();
            if let Some(first) = chars.next()
                && first.is_uppercase()
            {
                let mut name: String = first.to_lowercase().collect();
                name.push_str(chars.as_str());
                return Cow::Owned(name);
            }
        }
    }
    Cow::Borrowed(method)
}

fn capitalize(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Candidate getter names for a property, most conventional first.
pub fn getter_names(property: &str) -> Vec<String> {
    let upper = capitalize(property);
    vec![
        format!("get_{property}"),
        format!("is_{property}"),
        String::from(property),
        format!("get{upper}"),
        format!("is{upper}"),
    ]
}

/// Candidate setter names for a property, most conventional first.
pub fn setter_names(property: &str) -> Vec<String> {
    vec![format!("set_{property}"), format!("set{}", capitalize(property))]
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{getter_names, property_name, setter_names};

    #[test]
    fn strips_prefixes() {
        assert_eq!(property_name("set_city"), "city");
        assert_eq!(property_name("getNumber"), "number");
        assert_eq!(property_name("isActive"), "active");
        // a prefix alone is a name
        assert_eq!(property_name("get_"), "get_");
        assert_eq!(property_name("is"), "is");
        assert_eq!(property_name("settle"), "settle");
    }

    #[test]
    fn candidates() {
        assert_eq!(
            getter_names("number"),
            ["get_number", "is_number", "number", "getNumber", "isNumber"]
        );
        assert_eq!(setter_names("number"), ["set_number", "setNumber"]);
    }
}
