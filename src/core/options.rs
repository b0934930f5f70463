//! Request options for the Static Maps API
//!
//! [`StaticMapOptions`] is the parameter mapping a caller hands to the client.
//! Values are passed through as-is: `markers`, `path` and `style` keep their
//! `|`/`:` delimited syntax and are only percent-encoded when the URL is built.
//! `markers`, `path`, `visible` and `style` may repeat, each value becoming
//! its own query pair.
//! See <https://developers.google.com/maps/documentation/maps-static/start>
//! for what each parameter means.

use crate::core::constants::{DEFAULT_SIZE, DEFAULT_ZOOM};
use crate::core::geo::LatLng;
use crate::{Result, StaticMapError};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Parameters of a single static map request.
///
/// Every field is optional. `center` is required by the API itself but is
/// not enforced unless the client is configured to do so.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticMapOptions {
    /// `"lat,lng"` or a street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<String>,
    /// 0 shows the entire world, 21 shows streets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u32>,
    /// Pixel size as `"WxH"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Pixel density, 2 for high-dpi screens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maptype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// ccTLD country code deciding which borders to display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// One entry per marker group
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub markers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub path: Vec<String>,
    /// Locations that must stay visible on the rendered map
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub visible: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub style: Vec<String>,
    /// Google API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Parameters this crate has no field for, sent verbatim
    #[serde(flatten, deserialize_with = "extra_parameters")]
    pub extra: BTreeMap<String, Vec<String>>,
}

impl StaticMapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a JSON object such as
    /// `{"center": "Toronto", "zoom": 12, "markers": ["color:blue|A", "color:red|B"]}`.
    ///
    /// Repeatable parameters take a string or an array of strings. Numbers
    /// and booleans are accepted wherever text is, and sent as written.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn center(mut self, center: impl Into<String>) -> Self {
        self.center = Some(center.into());
        self
    }

    pub fn zoom(mut self, zoom: u32) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Set the size from pixel dimensions.
    pub fn dimensions(self, width: u32, height: u32) -> Self {
        self.size(format!("{}x{}", width, height))
    }

    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn maptype(mut self, maptype: impl Into<String>) -> Self {
        self.maptype = Some(maptype.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Replace all marker groups with one, e.g.
    /// `"color:blue|label:S|11211|11206|11222"`.
    pub fn markers(mut self, markers: impl Into<String>) -> Self {
        self.markers = vec![markers.into()];
        self
    }

    /// Add another marker group; each is sent as its own `markers=` pair.
    pub fn add_markers(mut self, markers: impl Into<String>) -> Self {
        self.markers.push(markers.into());
        self
    }

    /// e.g. `"color:0x0000ff|weight:5|40.737102,-73.990318|40.749825,-73.987963"`
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = vec![path.into()];
        self
    }

    pub fn add_path(mut self, path: impl Into<String>) -> Self {
        self.path.push(path.into());
        self
    }

    pub fn visible(mut self, visible: impl Into<String>) -> Self {
        self.visible = vec![visible.into()];
        self
    }

    pub fn add_visible(mut self, visible: impl Into<String>) -> Self {
        self.visible.push(visible.into());
        self
    }

    /// e.g. `"feature:administrative|element:labels|weight:3.9|visibility:on"`
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = vec![style.into()];
        self
    }

    pub fn add_style(mut self, style: impl Into<String>) -> Self {
        self.style.push(style.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set a parameter by name. Known names go to their field, anything
    /// else is kept in [`extra`](Self::extra). A later call for the same
    /// name replaces every earlier value.
    ///
    /// `zoom` and `scale` must be integers.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        match name {
            "zoom" => self.zoom = Some(parse_integer(name, &value)?),
            "scale" => self.scale = Some(parse_integer(name, &value)?),
            _ => {
                if let Some(field) = self.single_field_mut(name) {
                    *field = Some(value);
                } else {
                    *self.values_mut(name) = vec![value];
                }
            }
        }
        Ok(())
    }

    /// Append a value for `name`. Repeatable and extra parameters gain
    /// another pair; single-valued parameters behave as in [`set`](Self::set).
    pub fn push(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        if matches!(name, "zoom" | "scale") || self.single_field_mut(name).is_some() {
            return self.set(name, value);
        }
        self.values_mut(name).push(value.into());
        Ok(())
    }

    /// Look up a parameter by name, formatted the way it is sent. For a
    /// repeated parameter this is the first value.
    pub fn get(&self, name: &str) -> Option<String> {
        self.get_all(name).into_iter().next()
    }

    /// Every value sent for `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<String> {
        match name {
            "zoom" => self.zoom.iter().map(u32::to_string).collect(),
            "scale" => self.scale.iter().map(u32::to_string).collect(),
            _ => match self.single_field(name) {
                Some(field) => field.iter().cloned().collect(),
                None => self.values(name).to_vec(),
            },
        }
    }

    /// Fails with `"<name> is required"` when the parameter is absent.
    pub fn require(&self, name: &str) -> Result<()> {
        if self.get(name).is_none() {
            return Err(StaticMapError::MissingParameter(name.to_string()));
        }
        Ok(())
    }

    /// The center as coordinates, when it was given as `"lat,lng"`.
    pub fn center_coordinates(&self) -> Option<LatLng> {
        self.center.as_deref().and_then(LatLng::parse)
    }

    /// A copy with `zoom` and `size` filled in. `size` is replaced when it
    /// is unset or empty; no other field is touched.
    pub fn with_defaults(&self) -> Self {
        let mut merged = self.clone();
        if merged.zoom.is_none() {
            merged.zoom = Some(DEFAULT_ZOOM);
        }
        if merged.size.as_deref().map_or(true, str::is_empty) {
            merged.size = Some(DEFAULT_SIZE.to_string());
        }
        merged
    }

    /// All set parameters as name/value pairs: known parameters first in a
    /// fixed order, then extra parameters sorted by name. A repeated
    /// parameter yields one pair per value.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for name in KNOWN_PARAMETERS {
            for value in self.get_all(name) {
                pairs.push((name.to_string(), value));
            }
        }
        for (name, values) in &self.extra {
            pairs.extend(values.iter().map(|v| (name.clone(), v.clone())));
        }
        pairs
    }

    fn single_field(&self, name: &str) -> Option<&Option<String>> {
        let field = match name {
            "center" => &self.center,
            "size" => &self.size,
            "format" => &self.format,
            "maptype" => &self.maptype,
            "language" => &self.language,
            "region" => &self.region,
            "key" => &self.key,
            _ => return None,
        };
        Some(field)
    }

    fn single_field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        let field = match name {
            "center" => &mut self.center,
            "size" => &mut self.size,
            "format" => &mut self.format,
            "maptype" => &mut self.maptype,
            "language" => &mut self.language,
            "region" => &mut self.region,
            "key" => &mut self.key,
            _ => return None,
        };
        Some(field)
    }

    /// Values of a repeatable or extra parameter. Unknown names read as empty.
    fn values(&self, name: &str) -> &[String] {
        match name {
            "markers" => &self.markers,
            "path" => &self.path,
            "visible" => &self.visible,
            "style" => &self.style,
            _ => self.extra.get(name).map_or(&[][..], Vec::as_slice),
        }
    }

    fn values_mut(&mut self, name: &str) -> &mut Vec<String> {
        match name {
            "markers" => &mut self.markers,
            "path" => &mut self.path,
            "visible" => &mut self.visible,
            "style" => &mut self.style,
            _ => self.extra.entry(name.to_string()).or_default(),
        }
    }
}

const KNOWN_PARAMETERS: [&str; 13] = [
    "center", "zoom", "size", "scale", "format", "maptype", "language", "region", "markers",
    "path", "visible", "style", "key",
];

fn parse_integer(name: &str, value: &str) -> Result<u32> {
    value.trim().parse().map_err(|_| {
        StaticMapError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    })
}

/// Flatten a JSON value into query values: scalars become one value, arrays
/// one value per element, `null` none at all.
fn query_values(value: Value) -> std::result::Result<Vec<String>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) | Value::Null => {
                    Err(format!("expected a string, number or boolean, found {}", item))
                }
                scalar => Ok(scalar_text(scalar)),
            })
            .collect(),
        Value::Object(_) => Err(format!("expected a parameter value, found {}", value)),
        scalar => Ok(vec![scalar_text(scalar)]),
    }
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    query_values(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

fn extra_parameters<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, Value>::deserialize(deserializer)?
        .into_iter()
        .map(|(name, value)| {
            query_values(value)
                .map(|values| (name.clone(), values))
                .map_err(|e| D::Error::custom(format!("{}: {}", name, e)))
        })
        .collect()
}

/// Map types understood by the `maptype` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    Roadmap,
    Satellite,
    Hybrid,
    Terrain,
}

impl MapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roadmap => "roadmap",
            Self::Satellite => "satellite",
            Self::Hybrid => "hybrid",
            Self::Terrain => "terrain",
        }
    }
}

/// Image formats understood by the `format` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    #[serde(rename = "png8")]
    Png8,
    #[serde(rename = "png32")]
    Png32,
    #[serde(rename = "gif")]
    Gif,
    #[serde(rename = "jpg")]
    Jpg,
    #[serde(rename = "jpg-baseline")]
    JpgBaseline,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png8 => "png8",
            Self::Png32 => "png32",
            Self::Gif => "gif",
            Self::Jpg => "jpg",
            Self::JpgBaseline => "jpg-baseline",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MapType> for String {
    fn from(value: MapType) -> Self {
        value.as_str().to_string()
    }
}

impl From<ImageFormat> for String {
    fn from(value: ImageFormat) -> Self {
        value.as_str().to_string()
    }
}
