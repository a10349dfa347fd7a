//! CICS system initialization (SIT) parameter rendering.
//!
//! SIT overrides are supplied as an ordered map. Most values are scalars;
//! a few parameters are component-indexed (`STNTRxx`, `SPCTRxx`, `SKRxxxx`,
//! ...) and take a nested map whose keys replace the trailing `x`
//! placeholders. Rendering flattens the indexed parameters, adds `APPLID`,
//! formats `KEY=VALUE` card images and wraps long free-text values to the
//! 80-column SYSIN card width.
//!
//! # Examples
//!
//! ```
//! use cics_provision_core::*;
//!
//! let params = SitParameters::new()
//!     .with_indexed("stntrxx", [("ap", "1"), ("aq", "2")])
//!     .with_scalar("aicons", "AUTO");
//!
//! assert_eq!(
//!     render_sit_parameters(&params, Some("CICSA")).unwrap(),
//!     vec!["AICONS=AUTO", "APPLID=CICSA", "STNTRAP=1", "STNTRAQ=2"]
//! );
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::format::{CARD_IMAGE_LENGTH, Parameters, parameter_pairs, wrap_card_image};
use crate::jcl::check_instream_content;
use crate::validate::ValidationError;

/// Parameters whose rendered card may be cut into 80-column pieces.
pub const WRAPPABLE_SIT_PARAMETERS: &[&str] = &[
    "CRLPROFILE",
    "USSHOME",
    "GMTEXT",
    "USSCONFIG",
    "HTTPSERVERHDR",
    "HTTPUSRAGENTHDR",
    "INFOCENTER",
    "JVMPROFILEDIR",
];

const SKR_PLACEHOLDER: &str = "SKRXXXX";

/// A SIT parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitValue {
    Scalar(String),
    /// Component overrides keyed by the placeholder substitution.
    Indexed(Vec<(String, String)>),
}

/// Ordered SIT parameter overrides.
///
/// Deserializes from a map, keeping document order. Null values are
/// dropped, booleans become `YES`/`NO` and numbers are kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitParameters(Vec<(String, SitValue)>);

impl SitParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scalar(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key.into(), SitValue::Scalar(value.into()));
        self
    }

    pub fn with_indexed<K, V>(mut self, key: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.insert(key.into(), SitValue::Indexed(entries));
        self
    }

    /// Inserts or replaces (case-insensitively) in place.
    pub fn insert(&mut self, key: String, value: SitValue) {
        match self
            .0
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
        {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SitValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattens indexed parameters into concrete keys.
    ///
    /// Scalars keep their order; expanded keys follow them in the order
    /// their indexed parameter appeared.
    pub fn expand(&self) -> Result<Parameters, ValidationError> {
        let mut scalars = Parameters::new();
        let mut expanded = Vec::new();
        for (key, value) in &self.0 {
            match value {
                SitValue::Scalar(value) => scalars.push(key.as_str(), value.as_str()),
                SitValue::Indexed(entries) => {
                    let prefix = key.trim_end_matches(['x', 'X']);
                    for (subkey, value) in entries {
                        validate_indexed_key(key, subkey)?;
                        expanded.push((format!("{prefix}{subkey}"), value.clone()));
                    }
                }
            }
        }
        for (key, value) in expanded {
            scalars.push(key, value);
        }
        Ok(scalars)
    }
}

/// Checks that an indexed subkey fills the placeholder of `placeholder`.
///
/// `SKRxxxx` accepts 3 or 4 character keys; every other indexed parameter
/// needs exactly as many characters as it has trailing `x`s.
pub fn validate_indexed_key(placeholder: &str, key: &str) -> Result<(), ValidationError> {
    let width = placeholder.len() - placeholder.trim_end_matches(['x', 'X']).len();
    let length = key.chars().count();
    if placeholder.eq_ignore_ascii_case(SKR_PLACEHOLDER) {
        if length != 3 && length != 4 {
            return Err(ValidationError::SkrKeyLength(key.to_string()));
        }
    } else if length != width {
        return Err(ValidationError::IndexedKeyLength {
            key: key.to_string(),
            placeholder: placeholder.to_string(),
        });
    }
    Ok(())
}

/// Renders SIT overrides as SYSIN card images.
///
/// `applid` replaces an `APPLID` override in place, or is added after the
/// other scalar parameters. Content that would open a nested in-stream DD
/// is rejected.
pub fn render_sit_parameters(
    params: &SitParameters,
    applid: Option<&str>,
) -> Result<Vec<String>, ValidationError> {
    let mut params = params.clone();
    if let Some(applid) = applid {
        params.insert("APPLID".to_string(), SitValue::Scalar(applid.to_string()));
    }
    let cards = parameter_pairs(&params.expand()?);
    check_instream_content(&cards)?;
    Ok(wrap_sit_cards(&cards))
}

/// Cuts over-long wrappable cards into 80-column pieces.
pub fn wrap_sit_cards(cards: &[String]) -> Vec<String> {
    cards
        .iter()
        .flat_map(|card| {
            let key = card.split_once('=').map(|(key, _)| key.trim());
            let wrappable = key.is_some_and(|key| WRAPPABLE_SIT_PARAMETERS.contains(&key));
            if wrappable {
                wrap_card_image(card, CARD_IMAGE_LENGTH)
            } else {
                vec![card.clone()]
            }
        })
        .collect()
}

impl Serialize for SitParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            match value {
                SitValue::Scalar(value) => map.serialize_entry(key, value)?,
                SitValue::Indexed(entries) => map.serialize_entry(key, &IndexedEntries(entries))?,
            }
        }
        map.end()
    }
}

struct IndexedEntries<'a>(&'a [(String, String)]);

impl Serialize for IndexedEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SitParameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SitParametersVisitor)
    }
}

struct SitParametersVisitor;

impl<'de> Visitor<'de> for SitParametersVisitor {
    type Value = SitParameters;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of SIT parameter overrides")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut params = SitParameters::new();
        while let Some((key, value)) = access.next_entry::<String, RawSitValue>()? {
            let value = match value {
                RawSitValue::Scalar(scalar) => match scalar.into_text() {
                    Some(text) => SitValue::Scalar(text),
                    None => continue,
                },
                RawSitValue::Indexed(entries) => SitValue::Indexed(entries.into_pairs()),
            };
            params.insert(key, value);
        }
        Ok(params)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSitValue {
    Scalar(ScalarValue),
    Indexed(OrderedScalars),
}

/// A YAML or JSON scalar as it appears in option maps.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ScalarValue {
    Null(()),
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// Text form; `None` for null. Booleans become `YES`/`NO`.
    pub(crate) fn into_text(self) -> Option<String> {
        match self {
            Self::Null(()) => None,
            Self::Flag(true) => Some("YES".to_string()),
            Self::Flag(false) => Some("NO".to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Text(value) => Some(value),
        }
    }
}

/// A map of scalars kept in document order.
pub(crate) struct OrderedScalars(Vec<(String, ScalarValue)>);

impl OrderedScalars {
    /// Text pairs with null entries dropped.
    pub(crate) fn into_pairs(self) -> Vec<(String, String)> {
        self.0
            .into_iter()
            .filter_map(|(key, value)| value.into_text().map(|value| (key, value)))
            .collect()
    }
}

impl<'de> Deserialize<'de> for OrderedScalars {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = OrderedScalars;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of component overrides")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = access.next_entry::<String, ScalarValue>()? {
                    entries.push(entry);
                }
                Ok(OrderedScalars(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
