//! Catalog Keys
//!
//! String-backed identifiers for catalog entries. Keys are stable across catalog
//! reloads, so they are what callers send back in selections.

/// Declare a string-backed key type.
macro_rules! string_key {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Default,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        $vis struct $name(String);

        impl $name {
            /// Create a key from anything string-like.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the key is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_string())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_key! {
    /// Base product identifier
    pub struct ProductId;
}

string_key! {
    /// Option group key (e.g. `HEATING_BASE`)
    pub struct GroupKey;
}

string_key! {
    /// Option key, unique within a catalog
    pub struct OptionKey;
}

string_key! {
    /// Compatibility rule key
    pub struct RuleKey;
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;

    use super::*;

    #[test]
    fn keys_borrow_as_str_for_map_lookups() {
        let mut map = FxHashMap::default();
        map.insert(OptionKey::from("led-basic"), 3);

        assert_eq!(map.get("led-basic"), Some(&3));
    }

    #[test]
    fn blank_keys_are_detected() {
        assert!(GroupKey::new("  ").is_blank());
        assert!(!GroupKey::new("LID").is_blank());
    }
}
