//! Conjunctive hypothesis: at most one feature per dimension

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Dimension, Feature};
use crate::{Error, Result};

/// A conjunctive concept, kept in insertion order.
///
/// No two features share a [`Dimension`]. The empty hypothesis places no
/// constraint and is satisfied by every object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Feature>", into = "Vec<Feature>")]
pub struct Hypothesis {
    features: Vec<Feature>,
}

impl Hypothesis {
    /// The unconstrained hypothesis.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    /// Build a hypothesis, rejecting duplicate dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if two features share a dimension.
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Result<Self> {
        let mut hypothesis = Self::empty();
        for feature in features {
            if let Some(existing) = hypothesis.feature_on(feature.dimension()) {
                return Err(Error::InvalidInput(format!(
                    "Hypothesis has two {} features: {existing} and {feature}",
                    feature.dimension()
                )));
            }
            hypothesis.features.push(feature);
        }
        Ok(hypothesis)
    }

    /// Parse feature names into a hypothesis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFeature`] for names outside the vocabulary and
    /// [`Error::InvalidInput`] for dimension clashes.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let features = names
            .iter()
            .map(|name| name.as_ref().parse::<Feature>())
            .collect::<Result<Vec<_>>>()?;
        Self::new(features)
    }

    /// Features in insertion order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True for the unconstrained hypothesis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// True if the feature is part of this hypothesis.
    #[must_use]
    pub fn contains(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// The feature constraining `dimension`, if any.
    #[must_use]
    pub fn feature_on(&self, dimension: Dimension) -> Option<Feature> {
        self.features
            .iter()
            .copied()
            .find(|f| f.dimension() == dimension)
    }

    /// Dimensions already constrained.
    pub fn used_dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.features.iter().map(|f| f.dimension())
    }

    /// Features of `self` absent from `other`, in `self`'s order.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Vec<Feature> {
        self.features
            .iter()
            .copied()
            .filter(|f| !other.contains(*f))
            .collect()
    }

    /// Copy with `feature` appended. The caller guarantees its dimension is free.
    pub(crate) fn with_feature(&self, feature: Feature) -> Self {
        debug_assert!(self.feature_on(feature.dimension()).is_none());
        let mut features = self.features.clone();
        features.push(feature);
        Self { features }
    }

    /// Copy with `feature` removed.
    pub(crate) fn without_feature(&self, feature: Feature) -> Self {
        Self {
            features: self
                .features
                .iter()
                .copied()
                .filter(|f| *f != feature)
                .collect(),
        }
    }

    /// Features joined with `;` for tabular storage.
    #[must_use]
    pub fn joined(&self) -> String {
        self.features
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl TryFrom<Vec<Feature>> for Hypothesis {
    type Error = Error;

    fn try_from(features: Vec<Feature>) -> Result<Self> {
        Self::new(features)
    }
}

impl From<Hypothesis> for Vec<Feature> {
    fn from(hypothesis: Hypothesis) -> Self {
        hypothesis.features
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.joined().replace(';', ", "))
    }
}
