//! Place-type allow-list and the Placy categories POIs are filed under.
//!
//! Google place types are the only categories an admin can request. Entur
//! stop places and Bysykkel stations arrive with their own fixed transport
//! categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category a POI is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoiCategory {
    /// Stable slug, also the primary key in storage.
    pub id: String,
    /// Display name (Norwegian).
    pub name: String,
    /// Icon identifier understood by the map UI.
    pub icon: String,
    /// Hex color used for markers.
    pub color: String,
}

impl PoiCategory {
    fn of(id: &str, name: &str, icon: &str, color: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            icon: icon.to_owned(),
            color: color.to_owned(),
        }
    }
}

macro_rules! place_types {
    ($( $variant:ident => ($slug:literal, $name:literal, $icon:literal, $color:literal) ),+ $(,)?) => {
        /// Google place types accepted by the import endpoint.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum PlaceType {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl PlaceType {
            /// Every accepted place type.
            pub const ALL: &'static [PlaceType] = &[$(PlaceType::$variant),+];

            /// Google place-type identifier, also used as the category id.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(PlaceType::$variant => $slug,)+
                }
            }

            /// Category POIs of this type are filed under.
            #[must_use]
            pub fn category(self) -> PoiCategory {
                match self {
                    $(PlaceType::$variant => PoiCategory::of($slug, $name, $icon, $color),)+
                }
            }
        }
    };
}

place_types! {
    Restaurant => ("restaurant", "Restaurant", "utensils", "#ef4444"),
    Cafe => ("cafe", "Kafé", "coffee", "#f59e0b"),
    Bar => ("bar", "Bar", "wine", "#a855f7"),
    Bakery => ("bakery", "Bakeri", "croissant", "#d97706"),
    Supermarket => ("supermarket", "Dagligvare", "shopping-cart", "#22c55e"),
    Pharmacy => ("pharmacy", "Apotek", "pill", "#10b981"),
    Gym => ("gym", "Treningssenter", "dumbbell", "#f97316"),
    Park => ("park", "Park", "trees", "#16a34a"),
    Museum => ("museum", "Museum", "landmark", "#8b5cf6"),
    Library => ("library", "Bibliotek", "book-open", "#6366f1"),
    ShoppingMall => ("shopping_mall", "Kjøpesenter", "shopping-bag", "#ec4899"),
    MovieTheater => ("movie_theater", "Kino", "clapperboard", "#db2777"),
    Hospital => ("hospital", "Sykehus", "hospital", "#dc2626"),
    Doctor => ("doctor", "Lege", "stethoscope", "#0ea5e9"),
    Dentist => ("dentist", "Tannlege", "smile", "#06b6d4"),
    HairCare => ("hair_care", "Frisør", "scissors", "#f472b6"),
    Bank => ("bank", "Bank", "landmark", "#64748b"),
    PostOffice => ("post_office", "Post", "mail", "#eab308"),
    Lodging => ("lodging", "Overnatting", "bed", "#0284c7"),
    TouristAttraction => ("tourist_attraction", "Severdighet", "camera", "#7c3aed"),
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string is not in the place-type allow-list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported place type: {0}")]
pub struct UnknownPlaceType(pub String);

impl FromStr for PlaceType {
    type Err = UnknownPlaceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownPlaceType(s.to_owned()))
    }
}

/// Public-transport modes Entur stop places are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitMode {
    /// Bus and coach stops.
    Bus,
    /// Tram stops.
    Tram,
    /// Railway stations.
    Train,
    /// Metro stations.
    Metro,
    /// Ferry and boat quays.
    Ferry,
}

impl TransitMode {
    /// Category POIs served by this mode are filed under.
    #[must_use]
    pub fn category(self) -> PoiCategory {
        match self {
            Self::Bus => PoiCategory::of("bus", "Buss", "bus", "#3b82f6"),
            Self::Tram => PoiCategory::of("tram", "Trikk", "tram-front", "#0891b2"),
            Self::Train => PoiCategory::of("train", "Tog", "train-front", "#1d4ed8"),
            Self::Metro => PoiCategory::of("metro", "T-bane", "train-track", "#f43f5e"),
            Self::Ferry => PoiCategory::of("ferry", "Ferje", "ship", "#0369a1"),
        }
    }
}

/// Category for city-bike docking stations.
#[must_use]
pub fn bike_category() -> PoiCategory {
    PoiCategory::of("bike", "Bysykkel", "bike", "#059669")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    fn allow_list_has_twenty_unique_entries() {
        let slugs: HashSet<_> = PlaceType::ALL.iter().map(|kind| kind.as_str()).collect();
        assert_eq!(PlaceType::ALL.len(), 20);
        assert_eq!(slugs.len(), 20);
    }

    #[rstest]
    #[case("cafe", PlaceType::Cafe)]
    #[case("shopping_mall", PlaceType::ShoppingMall)]
    #[case("tourist_attraction", PlaceType::TouristAttraction)]
    fn parses_google_type_identifiers(#[case] raw: &str, #[case] expected: PlaceType) {
        assert_eq!(raw.parse::<PlaceType>(), Ok(expected));
    }

    #[rstest]
    #[case("casino")]
    #[case("Cafe")]
    #[case("")]
    fn rejects_types_outside_the_allow_list(#[case] raw: &str) {
        assert_eq!(
            raw.parse::<PlaceType>(),
            Err(UnknownPlaceType(raw.to_owned()))
        );
    }

    #[rstest]
    fn category_id_matches_place_type() {
        for kind in PlaceType::ALL {
            assert_eq!(kind.category().id, kind.as_str());
        }
    }

    #[rstest]
    fn serde_uses_snake_case_identifiers() {
        let value = serde_json::to_value(PlaceType::MovieTheater).expect("serialise");
        assert_eq!(value, serde_json::json!("movie_theater"));
    }
}
