/// Defines a newtype ID wrapper around a UUID and generates:
/// - derives (Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)
/// - `Display`
/// - `From<Uuid> for $name` and `From<$name> for Uuid`
/// - `generate()` for a fresh v4 id
///
/// Usage:
///   define_id_type!(MasterTimetableId);
#[macro_export]
macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(pub ::uuid::Uuid);

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}", self.0)
            }
        }

        impl ::std::convert::From<::uuid::Uuid> for $name {
            fn from(v: ::uuid::Uuid) -> Self {
                $name(v)
            }
        }

        impl ::std::convert::From<$name> for ::uuid::Uuid {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl $name {
            pub fn new(value: ::uuid::Uuid) -> Self {
                $name(value)
            }

            pub fn generate() -> Self {
                $name(::uuid::Uuid::new_v4())
            }

            pub fn value(&self) -> ::uuid::Uuid {
                self.0
            }
        }
    };
}
