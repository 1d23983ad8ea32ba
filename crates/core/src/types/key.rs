//! Normalized string keys for entity references.
//!
//! Server snapshots and mutation responses are inconsistent about whether
//! identifiers arrive as JSON numbers or strings. Every key type here
//! deserializes both shapes into one normalized string form, so `42` and
//! `"42"` compare equal after coercion. Use the `define_key!` macro to
//! create new key types that cannot be mixed up with each other.

use serde::Serialize;

/// Macro to define a normalized string key wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string
/// - `Deserialize` accepting either a string or a JSON number
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
///
/// # Example
///
/// ```rust
/// # use vitrine_core::define_key;
/// define_key!(WidgetKey);
///
/// let a = WidgetKey::new("42");
/// let b: WidgetKey = serde_json::from_str("42").unwrap();
/// assert_eq!(a, b);
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new key from a string value.
            #[must_use]
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                struct KeyVisitor;

                impl<'de> ::serde::de::Visitor<'de> for KeyVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        f: &mut ::core::fmt::Formatter<'_>,
                    ) -> ::core::fmt::Result {
                        f.write_str("a string or numeric identifier")
                    }

                    fn visit_str<E: ::serde::de::Error>(
                        self,
                        v: &str,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_owned()))
                    }

                    fn visit_string<E: ::serde::de::Error>(
                        self,
                        v: String,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v))
                    }

                    fn visit_u64<E: ::serde::de::Error>(
                        self,
                        v: u64,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_string()))
                    }

                    fn visit_i64<E: ::serde::de::Error>(
                        self,
                        v: i64,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_string()))
                    }

                    fn visit_f64<E: ::serde::de::Error>(
                        self,
                        v: f64,
                    ) -> ::core::result::Result<Self::Value, E> {
                        Ok($name(v.to_string()))
                    }
                }

                deserializer.deserialize_any(KeyVisitor)
            }
        }
    };
}

// Standard entity keys
define_key!(VariantKey);
define_key!(AttributeKey);
define_key!(ProductKey);
define_key!(LineKey);

/// Fulfillment-location key with a three-shape derivation.
///
/// Variant snapshots carry the location in one of three shapes; the first
/// present wins: an explicit `store_key` field, a numeric `store_id`, or a
/// human-readable store name. Name-derived keys are prefixed with `name:`
/// so they can never collide with raw ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocationKey(String);

impl LocationKey {
    /// Create a location key from an explicit key or stringified id.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive a location key from a store name.
    ///
    /// Returns `None` when the name is empty after trimming.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.to_lowercase().trim().to_owned();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(format!("name:{normalized}")))
        }
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for LocationKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct LocationVisitor;

        impl serde::de::Visitor<'_> for LocationVisitor {
            type Value = LocationKey;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a string or numeric location key")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(LocationKey(v.to_owned()))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(LocationKey(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(LocationKey(v.to_string()))
            }
        }

        deserializer.deserialize_any(LocationVisitor)
    }
}
