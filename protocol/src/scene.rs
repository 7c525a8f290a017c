//! Declarative scene-graph schema produced by the generation service.
//!
//! Decoding never rejects a node for a bad field: a wrong-typed or malformed
//! value is treated as absent, non-object children are dropped, and an
//! unrecognised `type` decodes to [`ShapeKind::Unknown`].

use common::lenient::{value_as_f64, value_as_string};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Primitive a scene node renders as.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Sphere,
    Cylinder,
    Cone,
    Torus,
    #[serde(rename = "torusknot")]
    TorusKnot,
    Dodecahedron,
    Icosahedron,
    Octahedron,
    Tetrahedron,
    Ring,
    Plane,
    Group,
    /// Anything else; builds as a unit box.
    #[default]
    Unknown,
}

impl ShapeKind {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "box" | "cube" => Self::Box,
            "sphere" => Self::Sphere,
            "cylinder" => Self::Cylinder,
            "cone" => Self::Cone,
            "torus" => Self::Torus,
            "torusknot" | "torus-knot" | "torus_knot" => Self::TorusKnot,
            "dodecahedron" => Self::Dodecahedron,
            "icosahedron" => Self::Icosahedron,
            "octahedron" => Self::Octahedron,
            "tetrahedron" => Self::Tetrahedron,
            "ring" => Self::Ring,
            "plane" => Self::Plane,
            "group" => Self::Group,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn is_group(self) -> bool {
        matches!(self, Self::Group)
    }
}

/// One primitive or group of the character description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneNode {
    #[serde(rename = "type", deserialize_with = "shape")]
    pub shape: ShapeKind,
    #[serde(deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        rename = "emissive",
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub emissive_color: Option<String>,
    #[serde(deserialize_with = "number", skip_serializing_if = "Option::is_none")]
    pub emissive_intensity: Option<f32>,
    #[serde(deserialize_with = "vec3", skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(deserialize_with = "scale", skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
    #[serde(deserialize_with = "vec3", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(deserialize_with = "number", skip_serializing_if = "Option::is_none")]
    pub metalness: Option<f32>,
    #[serde(deserialize_with = "number", skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f32>,
    #[serde(deserialize_with = "number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(rename = "doubleSide", deserialize_with = "flag")]
    pub double_sided: bool,
    #[serde(deserialize_with = "flag")]
    pub wireframe: bool,
    #[serde(
        rename = "part",
        deserialize_with = "text",
        skip_serializing_if = "Option::is_none"
    )]
    pub part_tag: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub raw_scale: bool,
    #[serde(deserialize_with = "children", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Decodes a node from an already parsed JSON value.
    ///
    /// Returns `None` only when the value is not a JSON object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Visits every node of the subtree depth-first, parents first.
    pub fn visit_mut(&mut self, visitor: &mut impl FnMut(&mut SceneNode)) {
        visitor(self);
        for child in &mut self.children {
            child.visit_mut(visitor);
        }
    }
}

fn shape<'de, D>(deserializer: D) -> Result<ShapeKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(name)) => ShapeKind::from_name(&name),
        _ => ShapeKind::Unknown,
    })
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_string))
}

fn number<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64).map(|number| number as f32))
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

/// Accepts `[x, y, z]` (extra entries ignored) or a bare number meaning
/// `[n, n, n]`. Anything else is absent.
fn vec3<'de, D>(deserializer: D) -> Result<Option<[f32; 3]>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(vec3_from_value))
}

/// Like [`vec3`], but a two-entry `[x, y]` is accepted with z = 1. Planes
/// and cylinders are often sized with only their first two components.
fn scale<'de, D>(deserializer: D) -> Result<Option<[f32; 3]>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) if items.len() == 2 => {
            let x = value_as_f64(&items[0]);
            let y = value_as_f64(&items[1]);
            x.zip(y).map(|(x, y)| [x as f32, y as f32, 1.0])
        }
        other => other.as_ref().and_then(vec3_from_value),
    })
}

fn vec3_from_value(value: &Value) -> Option<[f32; 3]> {
    match value {
        Value::Array(items) if items.len() >= 3 => {
            let x = value_as_f64(&items[0])?;
            let y = value_as_f64(&items[1])?;
            let z = value_as_f64(&items[2])?;
            Some([x as f32, y as f32, z as f32])
        }
        Value::Number(_) => value_as_f64(value).map(|n| [n as f32; 3]),
        _ => None,
    }
}

fn children<'de, D>(deserializer: D) -> Result<Vec<SceneNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.into_iter().filter_map(SceneNode::from_value).collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_names() {
        let node: SceneNode = serde_json::from_str(
            r##"{"type":"sphere","color":"#ffe0bd","emissive":"#ff2200","emissiveIntensity":2,
                "position":[0,1,0],"scale":[0.5,0.6,0.5],"doubleSide":true,"part":"head",
                "rawScale":true,"animate":{"bob":1}}"##,
        )
        .unwrap();

        assert_eq!(node.shape, ShapeKind::Sphere);
        assert_eq!(node.emissive_color.as_deref(), Some("#ff2200"));
        assert_eq!(node.emissive_intensity, Some(2.0));
        assert_eq!(node.position, Some([0.0, 1.0, 0.0]));
        assert!(node.double_sided);
        assert!(node.raw_scale);
        assert_eq!(node.part_tag.as_deref(), Some("head"));
    }

    #[test]
    fn malformed_fields_become_absent() {
        let node: SceneNode = serde_json::from_str(
            r#"{"type":"hexagon","position":[1,2],"scale":"big","rotation":{"x":1},
                "metalness":"0.7","opacity":null,"wireframe":"yes",
                "children":[3,{"type":"torus-knot"},"bad",{"type":"GROUP","children":{}}]}"#,
        )
        .unwrap();

        assert_eq!(node.shape, ShapeKind::Unknown);
        assert_eq!(node.position, None);
        assert_eq!(node.scale, None);
        assert_eq!(node.rotation, None);
        assert_eq!(node.metalness, Some(0.7));
        assert_eq!(node.opacity, None);
        assert!(!node.wireframe);
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].shape, ShapeKind::TorusKnot);
        assert_eq!(node.children[1].shape, ShapeKind::Group);
        assert!(node.children[1].children.is_empty());
    }

    #[test]
    fn two_entry_scale_keeps_width_and_height() {
        let node: SceneNode =
            serde_json::from_str(r#"{"type":"plane","scale":[2.0,0.5],"position":[1,2]}"#)
                .unwrap();
        assert_eq!(node.scale, Some([2.0, 0.5, 1.0]));
        assert_eq!(node.position, None);

        let node: SceneNode = serde_json::from_str(r#"{"type":"plane","scale":[2.0,"wide"]}"#).unwrap();
        assert_eq!(node.scale, None);
    }

    #[test]
    fn bare_number_scale_is_uniform() {
        let node: SceneNode = serde_json::from_str(r#"{"type":"box","scale":0.5}"#).unwrap();
        assert_eq!(node.scale, Some([0.5, 0.5, 0.5]));
    }

    #[test]
    fn counts_nodes() {
        let node: SceneNode = serde_json::from_str(
            r#"{"type":"group","children":[{"type":"box"},{"type":"group","children":[{}]}]}"#,
        )
        .unwrap();
        assert_eq!(node.node_count(), 4);
        assert_eq!(node.children[1].children[0].shape, ShapeKind::Unknown);
    }
}
