use serde::{Deserialize, Serialize};

/// Declares a database row identifier.
///
/// Rows use `BIGSERIAL` keys, so every identifier wraps an `i64`. Wrapping
/// them keeps a product id from being passed where a user id is expected.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw row key.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw row key.
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

row_id!(
    /// Identifier of a registered user.
    UserId
);

row_id!(
    /// Identifier of a placed order.
    OrderId
);

row_id!(
    /// Identifier of a catalogue product.
    ProductId
);

row_id!(
    /// Identifier of a notification row.
    NotificationId
);
