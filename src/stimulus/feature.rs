//! Closed feature vocabulary and its dimension table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A category partitioning the feature vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// circle / square
    Shape,
    /// red / blue
    Color,
    /// solid / striped
    Fill,
    /// big / small
    Size,
}

impl Dimension {
    /// All dimensions in object-field order.
    pub const ALL: [Self; 4] = [Self::Shape, Self::Color, Self::Fill, Self::Size];

    /// Position of this dimension in an object's feature array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Shape => 0,
            Self::Color => 1,
            Self::Fill => 2,
            Self::Size => 3,
        }
    }

    /// Field name used in stimulus files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shape => "shape",
            Self::Color => "color",
            Self::Fill => "fill",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic categorical value belonging to exactly one [`Dimension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// Shape: circle
    Circle,
    /// Shape: square
    Square,
    /// Color: red
    Red,
    /// Color: blue
    Blue,
    /// Fill: solid
    Solid,
    /// Fill: striped
    Striped,
    /// Size: big
    Big,
    /// Size: small
    Small,
}

impl Feature {
    /// The full vocabulary, in the order proposals enumerate it.
    pub const ALL: [Self; 8] = [
        Self::Circle,
        Self::Square,
        Self::Red,
        Self::Blue,
        Self::Solid,
        Self::Striped,
        Self::Big,
        Self::Small,
    ];

    /// Dimension this feature belongs to.
    #[must_use]
    pub const fn dimension(self) -> Dimension {
        match self {
            Self::Circle | Self::Square => Dimension::Shape,
            Self::Red | Self::Blue => Dimension::Color,
            Self::Solid | Self::Striped => Dimension::Fill,
            Self::Big | Self::Small => Dimension::Size,
        }
    }

    /// Lowercase name as it appears in stimulus and response files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Solid => "solid",
            Self::Striped => "striped",
            Self::Big => "big",
            Self::Small => "small",
        }
    }

    /// Look up the dimension of a feature by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFeature`] if the name is not in the vocabulary.
    pub fn dimension_of(name: &str) -> crate::Result<Dimension> {
        name.parse::<Self>().map(Self::dimension)
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::UnknownFeature(s.to_string()))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_dimension_has_two_features() {
        for dim in Dimension::ALL {
            let count = Feature::ALL.iter().filter(|f| f.dimension() == dim).count();
            assert_eq!(count, 2, "dimension {dim}");
        }
    }

    #[test]
    fn test_parse_round_trip_names() {
        for feature in Feature::ALL {
            assert_eq!(feature.as_str().parse::<Feature>().unwrap(), feature);
        }
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let err = "purple".parse::<Feature>().unwrap_err();
        assert!(matches!(err, Error::UnknownFeature(ref name) if name == "purple"));
        assert!(Feature::dimension_of("triangle").is_err());
        assert_eq!(Feature::dimension_of("striped").unwrap(), Dimension::Fill);
    }
}
