// Generates a single-byte wire constant newtype with named values, a shadow enum
// for name lookup, conversions, Display and serde impls.
#[macro_export]
macro_rules! protocol_constants {
    (   $(#[$outer:meta])*
        $type_name:ident:
        $( $(#[$default:ident])? $const_name:ident = $val:literal; )+
    ) => {
        paste::paste! {
            #[doc = concat!("A newtype wrapper around a `u8` representing a ", stringify!($type_name), ".")]
            ///
            /// Well-known values are exposed as associated constants and `Display`
            /// prints their kebab-case name, or the value in hex when unknown.
            $(#[$outer])*
            #[repr(transparent)]
            #[derive(
                Clone,
                Copy,
                PartialEq,
                Eq,
                Hash,
                Debug,
                zerocopy::FromBytes,
                zerocopy::IntoBytes,
                zerocopy::Immutable,
                zerocopy::KnownLayout,
                zerocopy::Unaligned,
            )]
            pub struct $type_name(pub u8);

            impl $type_name {
                $(
                    pub const $const_name: $type_name = $type_name($val);
                )+

                /// Returns true if the value has a registered name
                pub fn is_valid(&self) -> bool {
                    <[< $type_name Name >] as std::convert::TryFrom<u8>>::try_from(self.0).is_ok()
                }

                /// Returns the registered name, if any
                pub fn name(&self) -> Option<&'static str> {
                    <[< $type_name Name >] as std::convert::TryFrom<u8>>::try_from(self.0)
                        .ok()
                        .map(Into::into)
                }
            }

            impl Default for $type_name {
                fn default() -> Self {
                    $( $(if stringify!($default) == "default" {
                            return Self::$const_name;
                        })?
                    )+
                    Self(0)
                }
            }

            #[derive(Debug, PartialEq, strum::EnumString, strum::IntoStaticStr, Clone, Copy)]
            #[strum(serialize_all = "kebab-case")]
            #[allow(non_camel_case_types)]
            enum [< $type_name Name >] {
                $(
                    $const_name,
                )+
            }

            impl From<[< $type_name Name >]> for u8 {
                fn from(v: [< $type_name Name >]) -> Self {
                    match v {
                        $(
                            [< $type_name Name >]::$const_name => $val,
                        )+
                    }
                }
            }

            impl TryFrom<u8> for [< $type_name Name >] {
                type Error = ();
                fn try_from(v: u8) -> Result<Self, Self::Error> {
                    match v {
                        $(
                            $val => Ok([< $type_name Name >]::$const_name),
                        )+
                        _ => Err(()),
                    }
                }
            }

            impl From<u8> for $type_name {
                fn from(v: u8) -> Self {
                    Self(v)
                }
            }

            impl From<$type_name> for u8 {
                fn from(v: $type_name) -> Self {
                    v.0
                }
            }

            impl std::str::FromStr for $type_name {
                type Err = String;

                /// Accepts a registered name, a `0x` hex value or a decimal value
                fn from_str(value: &str) -> Result<Self, Self::Err> {
                    if let Ok(variant) = <[< $type_name Name >] as std::str::FromStr>::from_str(value) {
                        return Ok($type_name(variant.into()));
                    }

                    if let Some(no_prefix) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
                        return u8::from_str_radix(no_prefix, 16)
                            .map($type_name)
                            .map_err(|_| format!("invalid hex: {}", value));
                    }

                    value
                        .parse::<u8>()
                        .map($type_name)
                        .map_err(|_| format!("unknown {}: {}", stringify!($type_name), value))
                }
            }

            impl std::fmt::Display for $type_name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    match self.name() {
                        Some(s) => f.write_str(s),
                        None => write!(f, "0x{:x}", self.0),
                    }
                }
            }

            #[cfg(feature = "protocol_names")]
            impl serde::Serialize for $type_name {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    match self.name() {
                        Some(s) => serializer.serialize_str(s),
                        None => serializer.serialize_str(&format!("0x{:x}", self.0)),
                    }
                }
            }

            #[cfg(feature = "protocol_names")]
            impl<'de> serde::Deserialize<'de> for $type_name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                    <$type_name as std::str::FromStr>::from_str(&s).map_err(serde::de::Error::custom)
                }
            }

            #[cfg(not(feature = "protocol_names"))]
            impl serde::Serialize for $type_name {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serializer.serialize_u8(self.0)
                }
            }

            #[cfg(not(feature = "protocol_names"))]
            impl<'de> serde::Deserialize<'de> for $type_name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    let val = <u8 as serde::Deserialize>::deserialize(deserializer)?;
                    Ok($type_name(val))
                }
            }
        }
    };
}
