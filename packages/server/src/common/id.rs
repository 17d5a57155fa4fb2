//! Typed, prefixed string ids for compile-time type safety.
//!
//! Marketplace records are keyed by text ids of the form `{prefix}_{suffix}`
//! (`sel_…`, `city_…`, `nbhd_…`). `Id<T>` wraps such a string and ties it to
//! an entity marker so a `NeighborhoodId` can never be passed where a
//! `CityId` was expected.
//!
//! ```rust
//! use b2c_core::common::id::{Id, IdPrefix};
//!
//! pub struct Shelf;
//! impl IdPrefix for Shelf {
//!     const PREFIX: &'static str = "shelf";
//! }
//!
//! let id: Id<Shelf> = Id::new();
//! assert!(id.as_str().starts_with("shelf_"));
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Entity markers declare the prefix used when minting new ids.
pub trait IdPrefix {
    const PREFIX: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must not contain whitespace: {0:?}")]
    Whitespace(String),
}

#[repr(transparent)]
pub struct Id<T>(String, PhantomData<fn() -> T>);

// ============================================================================
// Core implementations
// ============================================================================

impl<T: IdPrefix> Id<T> {
    /// Mints a new id from a time-ordered UUID, so ids sort by creation time.
    pub fn new() -> Self {
        let suffix = Uuid::now_v7().simple().to_string().to_ascii_uppercase();
        Self(format!("{}_{}", T::PREFIX, suffix), PhantomData)
    }
}

impl<T: IdPrefix> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Id<T> {
    /// Parses an id coming from a request or an event payload.
    ///
    /// The prefix is not enforced: rows imported from older systems carry
    /// foreign ids and must still be addressable.
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdParseError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(IdParseError::Whitespace(s.to_string()));
        }
        Ok(Self(trimmed.to_string(), PhantomData))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

// ============================================================================
// Standard trait implementations
// ============================================================================

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone(), PhantomData)
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Id<{}>", std::any::type_name::<T>()))
            .field(&self.0)
            .finish()
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<T> From<Id<T>> for String {
    fn from(id: Id<T>) -> Self {
        id.0
    }
}

// ============================================================================
// Serde support
// ============================================================================

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// sqlx support (text columns)
// ============================================================================

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type};

impl<T> Type<Postgres> for Id<T> {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<T> PgHasArrayType for Id<T> {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}

impl<T> Encode<'_, Postgres> for Id<T> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <String as Encode<Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<T> Decode<'_, Postgres> for Id<T> {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        let raw = <String as Decode<Postgres>>::decode(value)?;
        Ok(Self(raw, PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shelf;

    impl IdPrefix for Shelf {
        const PREFIX: &'static str = "shelf";
    }

    type ShelfId = Id<Shelf>;

    #[test]
    fn new_ids_carry_prefix_and_are_unique() {
        let a = ShelfId::new();
        let b = ShelfId::new();
        assert!(a.as_str().starts_with("shelf_"));
        assert_ne!(a, b);
    }

    #[test]
    fn new_ids_sort_by_creation_time() {
        let a = ShelfId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = ShelfId::new();
        assert!(a < b);
    }

    #[test]
    fn parse_rejects_blank_and_whitespace() {
        assert_eq!(ShelfId::parse("  "), Err(IdParseError::Empty));
        assert!(matches!(
            ShelfId::parse("shelf 1"),
            Err(IdParseError::Whitespace(_))
        ));
        assert_eq!(ShelfId::parse(" shelf_1 ").unwrap().as_str(), "shelf_1");
    }

    #[test]
    fn deserialize_validates() {
        let parsed: ShelfId = serde_json::from_str("\"shelf_9\"").unwrap();
        assert_eq!(parsed.to_string(), "shelf_9");
        assert!(serde_json::from_str::<ShelfId>("\"\"").is_err());
    }

    #[test]
    fn debug_includes_type_name() {
        let debug = format!("{:?}", ShelfId::parse("shelf_1").unwrap());
        assert!(debug.contains("Shelf"));
    }
}
