//! Strongly-typed identifiers used across the domain.
//!
//! Domain crates declare their own record ids with [`uuid_newtype!`] so that a
//! `TemplateId` can never be passed where a `VariantId` is expected.

/// Declare a UUID-backed record identifier.
///
/// The generated type is `Copy`, ordered, serializes transparently as the
/// UUID string and parses from it via `FromStr`.
#[macro_export]
macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($crate::Uuid);

        impl $name {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self($crate::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: $crate::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &$crate::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$crate::Uuid> for $name {
            fn from(value: $crate::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $crate::Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = <$crate::Uuid as core::str::FromStr>::from_str(s).map_err(|e| {
                    $crate::DomainError::invalid_id(format!("{}: {}", stringify!($name), e))
                })?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_newtype!(
    /// Identifier of a customer (loyalty card holder).
    PartnerId
);

uuid_newtype!(
    /// Identifier of a company (multi-company boundary for catalog records).
    CompanyId
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;

    #[test]
    fn parses_its_own_display_form() {
        let id = PartnerId::new();
        let parsed: PartnerId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_uuid_with_type_name() {
        let err = "not-a-uuid".parse::<CompanyId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.starts_with("CompanyId")),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }
}
