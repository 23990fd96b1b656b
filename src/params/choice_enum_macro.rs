/// Declares a closed set of allowed parameter values.
///
/// Each variant maps to the exact value accepted on the input surface, a
/// display name, and optional aliases. Unlike open identifiers there is no
/// catch-all variant: anything outside the set is rejected.
#[macro_export]
macro_rules! define_choice_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $value:literal : $display_name:literal
                $( | $alias:literal )*
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.value())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::from_value(&s).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "'{}' is not one of [{}]",
                        s,
                        Self::allowed_values().join(", ")
                    ))
                })
            }
        }

        impl $enum_name {
            /// Value as written in parameter files and templates
            pub fn value(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $value,
                    )*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $display_name,
                    )*
                }
            }

            pub fn from_value(raw: &str) -> Option<Self> {
                match raw.trim() {
                    $(
                        $value | $display_name $(| $alias)* => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }

            pub fn allowed_values() -> Vec<&'static str> {
                vec![$($value),*]
            }

            /// Display names and aliases paired with the value they stand for
            pub fn aliases() -> Vec<(&'static str, &'static str)> {
                vec![
                    $(
                        ($display_name, $value)
                        $(, ($alias, $value))*
                    ),*
                ]
            }

            pub fn all_variants() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    };
}
