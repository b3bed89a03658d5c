//! Stimulus store: objects, trials and the closed feature table
//!
//! ## Input Format
//!
//! ```text
//! {
//!   "objects": [{"id": 1, "shape": "circle", "color": "red", "fill": "solid", "size": "big"}],
//!   "trials":  [{"id": "t1", "type": "subtractive", "hypothesis": ["red"],
//!                "examples": [{"object_id": 1, "label": 1}]}]
//! }
//! ```
//!
//! Everything is validated on load. After that the set is read-only and
//! examples carry a copy of the object they reference, so evaluation never
//! performs a lookup that can fail.

mod feature;
mod hypothesis;

pub use feature::{Dimension, Feature};
pub use hypothesis::Hypothesis;

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Stable object identifier.
pub type ObjectId = u32;

/// An entity with exactly one feature per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StimulusObject {
    id: ObjectId,
    features: [Feature; 4],
}

impl StimulusObject {
    /// Build an object from one feature per dimension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a feature is given for the wrong dimension.
    pub fn new(
        id: ObjectId,
        shape: Feature,
        color: Feature,
        fill: Feature,
        size: Feature,
    ) -> Result<Self> {
        let features = [shape, color, fill, size];
        for (dim, feature) in Dimension::ALL.iter().zip(features) {
            if feature.dimension() != *dim {
                return Err(Error::InvalidInput(format!(
                    "Object {id}: '{feature}' is not a {dim} value"
                )));
            }
        }
        Ok(Self { id, features })
    }

    /// Object ID.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Value on the given dimension.
    #[must_use]
    pub const fn feature(&self, dimension: Dimension) -> Feature {
        self.features[dimension.index()]
    }

    /// True if the object carries `feature`.
    #[must_use]
    pub fn has(&self, feature: Feature) -> bool {
        self.feature(feature.dimension()) == feature
    }
}

/// A labeled reference to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    object: StimulusObject,
    member: bool,
}

impl Example {
    /// Label an object as concept member (`true`) or non-member.
    #[must_use]
    pub const fn new(object: StimulusObject, member: bool) -> Self {
        Self { object, member }
    }

    /// ID of the labeled object.
    #[must_use]
    pub const fn object_id(&self) -> ObjectId {
        self.object.id
    }

    /// The labeled object.
    #[must_use]
    pub const fn object(&self) -> &StimulusObject {
        &self.object
    }

    /// True if labeled as a concept member.
    #[must_use]
    pub const fn is_member(&self) -> bool {
        self.member
    }
}

/// A revision problem: a starting hypothesis and the evidence shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    id: String,
    trial_type: String,
    hypothesis: Hypothesis,
    examples: Vec<Example>,
}

impl Trial {
    /// Build a trial.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyExamples`] if `examples` is empty.
    pub fn new(
        id: impl Into<String>,
        trial_type: impl Into<String>,
        hypothesis: Hypothesis,
        examples: Vec<Example>,
    ) -> Result<Self> {
        let id = id.into();
        if examples.is_empty() {
            return Err(Error::EmptyExamples { trial_id: id });
        }
        Ok(Self {
            id,
            trial_type: trial_type.into(),
            hypothesis,
            examples,
        })
    }

    /// Trial ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Trial type tag.
    #[must_use]
    pub fn trial_type(&self) -> &str {
        &self.trial_type
    }

    /// Initial hypothesis.
    #[must_use]
    pub const fn hypothesis(&self) -> &Hypothesis {
        &self.hypothesis
    }

    /// Labeled examples (never empty).
    #[must_use]
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }
}

#[derive(Deserialize)]
struct RawStimuli {
    objects: Vec<RawObject>,
    trials: Vec<RawTrial>,
}

#[derive(Deserialize)]
struct RawObject {
    id: ObjectId,
    shape: String,
    color: String,
    fill: String,
    size: String,
}

#[derive(Deserialize)]
struct RawTrial {
    id: String,
    #[serde(rename = "type")]
    trial_type: String,
    hypothesis: Vec<String>,
    examples: Vec<RawExample>,
}

#[derive(Deserialize)]
struct RawExample {
    object_id: ObjectId,
    label: u8,
}

/// Validated objects and trials, read-only after load.
#[derive(Debug, Clone, Default)]
pub struct StimulusSet {
    objects: Vec<StimulusObject>,
    by_id: HashMap<ObjectId, usize>,
    trials: Vec<Trial>,
}

impl StimulusSet {
    /// Load a stimulus file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::StorageError(format!(
                "Failed to read stimuli {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate stimuli from JSON text.
    ///
    /// # Errors
    ///
    /// Returns error for missing fields, unknown features, out-of-domain
    /// labels, duplicate IDs, dangling object references or empty trials.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawStimuli = serde_json::from_str(text)?;

        let mut set = Self::default();
        for obj in raw.objects {
            let object = StimulusObject::new(
                obj.id,
                obj.shape.parse()?,
                obj.color.parse()?,
                obj.fill.parse()?,
                obj.size.parse()?,
            )?;
            set.add_object(object)?;
        }

        for raw_trial in raw.trials {
            let hypothesis = Hypothesis::parse(&raw_trial.hypothesis)?;
            let examples = raw_trial
                .examples
                .iter()
                .map(|ex| set.example(&raw_trial.id, ex))
                .collect::<Result<Vec<_>>>()?;
            set.add_trial(Trial::new(
                raw_trial.id,
                raw_trial.trial_type,
                hypothesis,
                examples,
            )?)?;
        }

        Ok(set)
    }

    /// Build a set directly from validated parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] on duplicate object or trial IDs, or
    /// when an example labels an object that is not in `objects`.
    pub fn from_parts(objects: Vec<StimulusObject>, trials: Vec<Trial>) -> Result<Self> {
        let mut set = Self::default();
        for object in objects {
            set.add_object(object)?;
        }
        for trial in trials {
            set.add_trial(trial)?;
        }
        Ok(set)
    }

    fn add_object(&mut self, object: StimulusObject) -> Result<()> {
        if self.by_id.contains_key(&object.id()) {
            return Err(Error::InvalidInput(format!(
                "Duplicate object id {}",
                object.id()
            )));
        }
        self.by_id.insert(object.id(), self.objects.len());
        self.objects.push(object);
        Ok(())
    }

    fn add_trial(&mut self, trial: Trial) -> Result<()> {
        if self.trial(trial.id()).is_some() {
            return Err(Error::InvalidInput(format!(
                "Duplicate trial id '{}'",
                trial.id()
            )));
        }
        // Examples carry their own copy of the object; it must match the set's
        for ex in trial.examples() {
            if self.object(ex.object_id()) != Some(ex.object()) {
                return Err(Error::InvalidInput(format!(
                    "Trial '{}' references unknown object {}",
                    trial.id(),
                    ex.object_id()
                )));
            }
        }
        self.trials.push(trial);
        Ok(())
    }

    fn example(&self, trial_id: &str, raw: &RawExample) -> Result<Example> {
        let object = self.object(raw.object_id).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Trial '{trial_id}' references unknown object {}",
                raw.object_id
            ))
        })?;
        let member = match raw.label {
            0 => false,
            1 => true,
            other => {
                return Err(Error::InvalidInput(format!(
                    "Trial '{trial_id}': label must be 0 or 1, got {other}"
                )))
            }
        };
        Ok(Example::new(*object, member))
    }

    /// Look up an object by ID.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&StimulusObject> {
        self.by_id.get(&id).map(|&idx| &self.objects[idx])
    }

    /// All objects in load order.
    #[must_use]
    pub fn objects(&self) -> &[StimulusObject] {
        &self.objects
    }

    /// All trials in load order.
    #[must_use]
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Look up a trial by ID.
    #[must_use]
    pub fn trial(&self, id: &str) -> Option<&Trial> {
        self.trials.iter().find(|t| t.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STIMULI: &str = r#"{
        "objects": [
            {"id": 1, "shape": "circle", "color": "red", "fill": "solid", "size": "big"},
            {"id": 2, "shape": "square", "color": "blue", "fill": "striped", "size": "small"}
        ],
        "trials": [
            {"id": "t1", "type": "subtractive", "hypothesis": ["red", "big"],
             "examples": [{"object_id": 1, "label": 1}, {"object_id": 2, "label": 0}]}
        ]
    }"#;

    #[test]
    fn test_load_valid_stimuli() {
        let set = StimulusSet::from_json_str(STIMULI).unwrap();
        assert_eq!(set.objects().len(), 2);
        assert_eq!(set.trials().len(), 1);

        let trial = set.trial("t1").unwrap();
        assert_eq!(trial.trial_type(), "subtractive");
        assert_eq!(trial.hypothesis().features(), &[Feature::Red, Feature::Big]);
        assert_eq!(trial.examples()[0].object_id(), 1);
        assert!(trial.examples()[0].is_member());
        assert!(!trial.examples()[1].is_member());
        assert_eq!(set.object(2).unwrap().feature(Dimension::Fill), Feature::Striped);
    }

    #[test]
    fn test_object_feature_on_wrong_dimension() {
        let text = STIMULI.replace(r#""shape": "circle""#, r#""shape": "red""#);
        let err = StimulusSet::from_json_str(&text).unwrap_err();
        assert!(err.to_string().contains("not a shape value"));
    }

    #[test]
    fn test_unknown_feature_in_hypothesis() {
        let text = STIMULI.replace(r#"["red", "big"]"#, r#"["green"]"#);
        let err = StimulusSet::from_json_str(&text).unwrap_err();
        assert!(matches!(err, Error::UnknownFeature(_)));
    }

    #[test]
    fn test_label_domain() {
        let text = STIMULI.replace(r#""label": 0"#, r#""label": 2"#);
        let err = StimulusSet::from_json_str(&text).unwrap_err();
        assert!(err.to_string().contains("label must be 0 or 1"));
    }

    #[test]
    fn test_dangling_object_reference() {
        let text = STIMULI.replace(r#""object_id": 2"#, r#""object_id": 9"#);
        let err = StimulusSet::from_json_str(&text).unwrap_err();
        assert!(err.to_string().contains("unknown object 9"));
    }

    #[test]
    fn test_trial_without_examples() {
        let text = r#"{"objects": [], "trials": [
            {"id": "t0", "type": "x", "hypothesis": [], "examples": []}]}"#;
        let err = StimulusSet::from_json_str(text).unwrap_err();
        assert!(matches!(err, Error::EmptyExamples { ref trial_id } if trial_id == "t0"));
    }

    #[test]
    fn test_duplicate_trial_id() {
        let text = STIMULI.replace(
            r#"{"object_id": 2, "label": 0}]}"#,
            r#"{"object_id": 2, "label": 0}]},
            {"id": "t1", "type": "again", "hypothesis": [],
             "examples": [{"object_id": 1, "label": 1}]}"#,
        );
        let err = StimulusSet::from_json_str(&text).unwrap_err();
        assert!(err.to_string().contains("Duplicate trial id 't1'"));
    }

    fn parts() -> (Vec<StimulusObject>, Trial) {
        let set = StimulusSet::from_json_str(STIMULI).unwrap();
        (set.objects().to_vec(), set.trial("t1").unwrap().clone())
    }

    #[test]
    fn test_from_parts_accepts_consistent_parts() {
        let (objects, trial) = parts();
        let set = StimulusSet::from_parts(objects, vec![trial]).unwrap();
        assert_eq!(set.trials().len(), 1);
        assert_eq!(set.object(1).unwrap().feature(Dimension::Color), Feature::Red);
    }

    #[test]
    fn test_from_parts_rejects_duplicate_trials() {
        let (objects, trial) = parts();
        let err = StimulusSet::from_parts(objects, vec![trial.clone(), trial]).unwrap_err();
        assert!(err.to_string().contains("Duplicate trial id 't1'"));
    }

    #[test]
    fn test_from_parts_rejects_foreign_objects() {
        let (objects, trial) = parts();

        // Object 2 left out of the set
        let err = StimulusSet::from_parts(objects[..1].to_vec(), vec![trial.clone()]).unwrap_err();
        assert!(err.to_string().contains("unknown object 2"));

        // Same id, different features
        let impostor = StimulusObject::new(
            2,
            Feature::Circle,
            Feature::Blue,
            Feature::Striped,
            Feature::Small,
        )
        .unwrap();
        let err = StimulusSet::from_parts(vec![objects[0], impostor], vec![trial]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let text = r#"{"objects": [{"id": 1, "shape": "circle"}], "trials": []}"#;
        assert!(matches!(
            StimulusSet::from_json_str(text),
            Err(Error::Json(_))
        ));
    }
}
