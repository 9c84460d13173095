//! The `auto` sentinel: fields whose concrete value depends on the build profile.
//!
//! An auto-capable field holds either a concrete value or `Auto`, which the
//! profile resolver replaces with the profile-specific concrete value. This is
//! a real sum type, not an `Option` — "unset in every layer" falls through to
//! the compiled default (`auto` for these fields), while an explicit `auto` in
//! a config file means the same thing on purpose. After resolution no `Auto`
//! remains anywhere in the configuration.
//!
//! All auto-capable payloads are keyword-valued enums, so the wire format is a
//! plain string: `"auto"`, or the payload's own spelling (`"full"`, `"on"`, ...).

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, IntoDeserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A profile-dependent setting: concrete, or `Auto` until resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting<T> {
    /// Resolve per build profile (the `"auto"` wire value).
    Auto,
    /// An explicitly chosen concrete value.
    Value(T),
}

impl<T> Setting<T> {
    pub fn is_auto(&self) -> bool {
        matches!(self, Setting::Auto)
    }

    /// Replace `Auto` with `concrete`; an already-concrete value is untouched.
    /// This is what makes profile resolution idempotent.
    pub fn or_resolve(self, concrete: T) -> Setting<T> {
        match self {
            Setting::Auto => Setting::Value(concrete),
            resolved => resolved,
        }
    }

    /// The concrete value after profile resolution.
    ///
    /// # Panics
    ///
    /// Panics if the field still holds `Auto`. Resolution runs before any
    /// consumer reads a setting; a leak here is a defect in the calling code,
    /// not user input.
    pub fn expect_resolved(&self, field: &str) -> &T {
        match self {
            Setting::Value(v) => v,
            Setting::Auto => {
                panic!("vcplan: internal invariant violated — '{field}' is still auto after profile resolution")
            }
        }
    }
}

impl<T: Serialize> Serialize for Setting<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Setting::Auto => serializer.serialize_str("auto"),
            Setting::Value(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Setting<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeywordVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> de::Visitor<'de> for KeywordVisitor<T> {
            type Value = Setting<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "\"auto\" or a concrete keyword")
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<Setting<T>, E> {
                if s == "auto" {
                    return Ok(Setting::Auto);
                }
                T::deserialize(s.into_deserializer()).map(Setting::Value)
            }
        }

        deserializer.deserialize_str(KeywordVisitor(PhantomData))
    }
}

/// Two-state payload for the linker's auto-capable switches.
///
/// Spelled `"off"`/`"on"` on disk so `lto = "auto"` and `lto = "on"` read the
/// same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Off,
    On,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}
