// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::scene::Scene;
use crate::emitters::sphere::SphereLight;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "io error: {}", e),
            SceneLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            SceneLoadError::MissingField(field) => write!(f, "missing field: {}", field),
        }
    }
}

impl std::error::Error for SceneLoadError {}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneLoadError> {
    let result = load_scene_with_settings(path)?;
    Ok(result.scene)
}

/// A scene plus whatever run settings the file carries. Settings left out of
/// the file stay `None` so the caller can fall back to flags or defaults.
pub struct SceneLoadResult {
    pub scene: Scene,
    pub cache_resolution: Option<usize>,
    pub grid: Option<(usize, usize)>,
    pub frames: Option<u32>,
    pub time_step: Option<Float>,
    pub intensity: Option<Float>,
    pub bounce_count: Option<u32>,
}

pub fn load_scene_with_settings<P: AsRef<Path>>(path: P) -> Result<SceneLoadResult, SceneLoadError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let result = parse_scene(&xml)?;
    log::info!("Loaded scene {}: {} boxes, light at {:?} (r = {}).",
               path.display(), result.scene.len(),
               result.scene.light().center, result.scene.light().radius);
    Ok(result)
}

pub fn parse_scene(xml: &str) -> Result<SceneLoadResult, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();

    let mut in_shape = false;
    let mut in_emitter = false;

    let mut cache_resolution: Option<usize> = None;
    let mut grid_width: Option<usize> = None;
    let mut grid_height: Option<usize> = None;
    let mut frames: Option<u32> = None;
    let mut time_step: Option<Float> = None;
    let mut intensity: Option<Float> = None;
    let mut bounce_count: Option<u32> = None;

    let mut boxes: Vec<AABB> = Vec::new();
    let mut current_shape_id: Option<String> = None;
    let mut current_box_min: Option<Vector3f> = None;
    let mut current_box_max: Option<Vector3f> = None;

    let mut light: Option<SphereLight> = None;
    let mut current_light_center: Option<Vector3f> = None;
    let mut current_light_radius: Option<Float> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.name().as_ref() {
                    b"default" => {
                        let mut key: Option<String> = None;
                        let mut value: Option<String> = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => key = Some(attr.unescape_value().unwrap_or_default().to_string()),
                                b"value" => value = Some(attr.unescape_value().unwrap_or_default().to_string()),
                                _ => {}
                            }
                        }
                        if let (Some(k), Some(v)) = (key, value) {
                            defaults.insert(k, v);
                        }
                    }
                    b"cache" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"resolution" {
                                let value = resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults);
                                let res = parse_usize(&value)?;
                                if res == 0 {
                                    return Err(SceneLoadError::Parse("cache resolution must be positive".to_string()));
                                }
                                cache_resolution = Some(res);
                            }
                        }
                    }
                    b"kernel" => {
                        for attr in e.attributes().flatten() {
                            let value = resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults);
                            match attr.key.as_ref() {
                                b"intensity" => intensity = Some(parse_float(&value)?),
                                b"bounces" => bounce_count = Some(parse_u32(&value)?),
                                _ => {}
                            }
                        }
                    }
                    b"dispatch" => {
                        for attr in e.attributes().flatten() {
                            let value = resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults);
                            match attr.key.as_ref() {
                                b"width" => grid_width = Some(parse_usize(&value)?),
                                b"height" => grid_height = Some(parse_usize(&value)?),
                                b"frames" => frames = Some(parse_u32(&value)?),
                                b"time_step" => time_step = Some(parse_float(&value)?),
                                _ => {}
                            }
                        }
                    }
                    b"shape" => {
                        let mut shape_type: Option<String> = None;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"type" {
                                shape_type = Some(resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults));
                            } else if attr.key.as_ref() == b"id" {
                                current_shape_id = Some(attr.unescape_value().unwrap_or_default().to_string());
                            }
                        }
                        match shape_type.as_deref() {
                            Some("box") => in_shape = true,
                            Some(other) => return Err(SceneLoadError::Parse(format!("unsupported shape: {}", other))),
                            None => return Err(SceneLoadError::MissingField("shape.type")),
                        }
                    }
                    b"emitter" => {
                        let mut emitter_type: Option<String> = None;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"type" {
                                emitter_type = Some(resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults));
                            }
                        }
                        match emitter_type.as_deref() {
                            Some("sphere") => in_emitter = true,
                            Some(other) => return Err(SceneLoadError::Parse(format!("unsupported emitter: {}", other))),
                            None => return Err(SceneLoadError::MissingField("emitter.type")),
                        }
                    }
                    b"point" => {
                        let mut name_attr: Option<String> = None;
                        let mut value_attr: Option<String> = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => name_attr = Some(attr.unescape_value().unwrap_or_default().to_string()),
                                b"value" => value_attr = Some(resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults)),
                                _ => {}
                            }
                        }
                        if let (Some(name_attr), Some(value_attr)) = (name_attr, value_attr) {
                            if in_shape && name_attr == "min" {
                                current_box_min = Some(parse_vec3(&value_attr)?);
                            } else if in_shape && name_attr == "max" {
                                current_box_max = Some(parse_vec3(&value_attr)?);
                            } else if in_emitter && name_attr == "center" {
                                current_light_center = Some(parse_vec3(&value_attr)?);
                            }
                        }
                    }
                    b"float" => {
                        let mut name_attr: Option<String> = None;
                        let mut value_attr: Option<String> = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => name_attr = Some(attr.unescape_value().unwrap_or_default().to_string()),
                                b"value" => value_attr = Some(resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults)),
                                _ => {}
                            }
                        }
                        if let (Some(name_attr), Some(value_attr)) = (name_attr, value_attr) {
                            if in_emitter && name_attr == "radius" {
                                current_light_radius = Some(parse_float(&value_attr)?);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"shape" => {
                        if in_shape {
                            let p_min = current_box_min.take().ok_or(SceneLoadError::MissingField("shape.min"))?;
                            let p_max = current_box_max.take().ok_or(SceneLoadError::MissingField("shape.max"))?;
                            let bbox = AABB { p_min, p_max };
                            let name = current_shape_id.take().unwrap_or_else(|| format!("box{}", boxes.len()));
                            if !bbox.is_valid() {
                                return Err(SceneLoadError::Parse(
                                    format!("box {} needs min < max on every axis", name)));
                            }
                            log::debug!("box {} ({}): {:?} .. {:?}", boxes.len(), name, p_min, p_max);
                            boxes.push(bbox);
                        }
                        in_shape = false;
                        current_shape_id = None;
                        current_box_min = None;
                        current_box_max = None;
                    }
                    b"emitter" => {
                        if in_emitter {
                            let center = current_light_center.take().ok_or(SceneLoadError::MissingField("emitter.center"))?;
                            let radius = current_light_radius.take().unwrap_or(1.0);
                            if !(radius > 0.0) {
                                return Err(SceneLoadError::Parse(format!("invalid light radius: {}", radius)));
                            }
                            light = Some(SphereLight::new(center, radius));
                        }
                        in_emitter = false;
                        current_light_center = None;
                        current_light_radius = None;
                    }
                    _ => {}
                }
            }
            Err(e) => {
                return Err(SceneLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    let light = light.ok_or(SceneLoadError::MissingField("emitter"))?;
    let scene = Scene::with_boxes(boxes, light);

    let grid = match (grid_width, grid_height) {
        (Some(w), Some(h)) => Some((w, h)),
        (None, None) => None,
        (Some(w), None) => Some((w, w)),
        (None, Some(h)) => Some((h, h)),
    };

    Ok(SceneLoadResult {
        scene,
        cache_resolution,
        grid,
        frames,
        time_step,
        intensity,
        bounce_count,
    })
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32, SceneLoadError> {
    value.trim().parse::<u32>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, SceneLoadError> {
    value.trim().parse::<usize>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}
