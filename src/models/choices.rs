//! Enumerated listing fields. Each variant has a stable wire code (stored in
//! the database and used in query strings) and a Spanish display name.

use serde::{Deserialize, Serialize};

macro_rules! choices {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident => ($code:literal, $label:literal) ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choices! {
    /// Kind of property
    Category {
        House => ("casa", "Casa"),
        Apartment => ("apartamento", "Apartamento"),
        Land => ("terreno", "Terreno"),
        Commercial => ("local_comercial", "Local Comercial"),
        Office => ("oficina", "Oficina"),
        Warehouse => ("galpon", "Galpón"),
        Storage => ("deposito", "Depósito"),
        Other => ("otro", "Otro"),
    }
}

choices! {
    TransactionType {
        Sale => ("venta", "Venta"),
        Rental => ("alquiler", "Alquiler"),
    }
}

choices! {
    PetType {
        Unspecified => ("no_especificado", "No especificado"),
        Dogs => ("perros", "Perros"),
        Cats => ("gatos", "Gatos"),
        Others => ("otros", "Otros"),
    }
}

choices! {
    /// Only `Published` listings are visible on public pages
    PublicationState {
        Draft => ("borrador", "Borrador"),
        Published => ("publicada", "Publicada"),
        Archived => ("archivada", "Archivada"),
    }
}

/// Display name for a category code, falling back to the raw code
pub fn category_label(code: &str) -> String {
    Category::from_code(code)
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Display name for a transaction code, falling back to the raw code
pub fn transaction_label(code: &str) -> String {
    TransactionType::from_code(code)
        .map(|t| t.label().to_string())
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_code(category.code()), Some(*category));
        }
        assert_eq!(PublicationState::from_code("publicada"), Some(PublicationState::Published));
        assert_eq!(TransactionType::from_code("permuta"), None);
    }

    #[test]
    fn unknown_codes_keep_raw_label() {
        assert_eq!(category_label("galpon"), "Galpón");
        assert_eq!(category_label("castillo"), "castillo");
        assert_eq!(transaction_label("alquiler"), "Alquiler");
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&Category::Commercial).unwrap();
        assert_eq!(json, "\"local_comercial\"");
    }
}
