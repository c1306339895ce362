//! Closed enumerations with a fixed textual form
//!
//! Every enumerated column is declared once with this macro. The same list of
//! names drives parsing at the API boundary, encoding at the storage boundary
//! and the schema's `CHECK (... IN (...))` constraints.

macro_rules! domain_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every member of the domain, in declaration order
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Textual names accepted by [`std::str::FromStr`]
            pub const NAMES: &'static [&'static str] = &[ $( $text ),+ ];

            /// Name of the column this enumeration populates
            pub const FIELD: &'static str = $field;

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = core_kernel::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(core_kernel::CoreError::out_of_domain($field, other, Self::NAMES)),
                }
            }
        }
    };
}
