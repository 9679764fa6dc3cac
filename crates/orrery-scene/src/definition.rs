//! Serializable scene definitions and their validation into a [`Scene`].

use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;
use orrery_materials::{
    ChannelFlags, DEFAULT_DISPLACEMENT_SCALE, MaterialDescriptor, TextureLoader, resolve,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::body::{Body, BodyId, Geometry};
use crate::error::SceneError;
use crate::orbit::OrbitParams;
use crate::ordering::parent_first_order;
use crate::scene::Scene;

/// A whole scene as data. Bodies may be listed in any order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDef {
    pub bodies: Vec<BodyDef>,
}

/// One body as data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub geometry: Geometry,
    /// Construction-time position; fixed for root bodies.
    #[serde(default)]
    pub position: [f32; 3],
    /// Required for bodies with a parent, forbidden for roots.
    #[serde(default)]
    pub orbit: Option<OrbitParams>,
    /// Radians per second about +Y.
    #[serde(default)]
    pub spin_rate: f32,
    #[serde(default)]
    pub material: MaterialDef,
}

/// Material inputs of a body as data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDef {
    pub base_color: [f32; 4],
    pub tint: Option<[f32; 4]>,
    pub channels: ChannelFlags,
    /// Directory holding the channel images, relative to the texture root.
    pub texture_dir: Option<String>,
    pub displacement_scale: f32,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            tint: None,
            channels: ChannelFlags::none(),
            texture_dir: None,
            displacement_scale: DEFAULT_DISPLACEMENT_SCALE,
        }
    }
}

impl SceneDef {
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        Ok(ron::from_str(text)?)
    }

    pub fn from_ron_file(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Validate the definition and build a live scene.
    ///
    /// Texture requests are issued only after the whole definition has been
    /// validated, once per enabled channel of each body that names a
    /// `texture_dir`. Paths are `texture_root/texture_dir/<channel file>`.
    pub fn build<L>(&self, loader: &L, texture_root: &str) -> Result<Scene, SceneError>
    where
        L: TextureLoader + ?Sized,
    {
        if self.bodies.is_empty() {
            return Err(SceneError::Empty);
        }

        let mut ids = HashMap::with_capacity(self.bodies.len());
        for (index, body) in self.bodies.iter().enumerate() {
            if ids.insert(body.name.as_str(), index).is_some() {
                return Err(SceneError::DuplicateName(body.name.clone()));
            }
        }

        let mut parents = Vec::with_capacity(self.bodies.len());
        for body in &self.bodies {
            body.validate()?;
            let parent = match &body.parent {
                Some(name) => match ids.get(name.as_str()) {
                    Some(&index) => Some(index),
                    None => {
                        return Err(SceneError::UnknownParent {
                            body: body.name.clone(),
                            parent: name.clone(),
                        });
                    }
                },
                None => None,
            };
            parents.push(parent);
        }

        let order = match parent_first_order(&parents) {
            Ok(order) => order,
            Err(index) => {
                let body = self.bodies[index].name.clone();
                return Err(SceneError::ParentCycle { body });
            }
        };

        let mut bodies = Vec::with_capacity(self.bodies.len());
        for (index, (def, parent)) in self.bodies.iter().zip(&parents).enumerate() {
            let material = def
                .material
                .descriptor(loader, texture_root)
                .map_err(|source| SceneError::Material {
                    body: def.name.clone(),
                    source,
                })?;
            bodies.push(Body::new(
                BodyId(index as u32),
                def.name.clone(),
                parent.map(|p| BodyId(p as u32)),
                def.geometry,
                material,
                def.orbit,
                def.spin_rate,
                Vec3::from_array(def.position),
            ));
        }

        info!(bodies = bodies.len(), "scene built");
        Ok(Scene::new(bodies, order))
    }

    /// Serialize as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new().depth_limit(4))
    }
}

impl BodyDef {
    fn validate(&self) -> Result<(), SceneError> {
        let non_finite = |field| SceneError::NonFinite {
            body: self.name.clone(),
            field,
        };

        let size = self.geometry.size();
        if !size.is_finite() {
            return Err(non_finite("size"));
        }
        if size <= 0.0 {
            return Err(SceneError::InvalidGeometry {
                body: self.name.clone(),
            });
        }
        if self.position.iter().any(|c| !c.is_finite()) {
            return Err(non_finite("position"));
        }
        if !self.spin_rate.is_finite() {
            return Err(non_finite("spin_rate"));
        }

        match (&self.parent, &self.orbit) {
            (Some(_), None) => Err(SceneError::MissingOrbit {
                body: self.name.clone(),
            }),
            (None, Some(_)) => Err(SceneError::OrbitWithoutParent {
                body: self.name.clone(),
            }),
            (Some(_), Some(orbit)) => match orbit.first_non_finite() {
                Some(field) => Err(non_finite(field)),
                None => Ok(()),
            },
            (None, None) => Ok(()),
        }
    }
}

impl MaterialDef {
    fn descriptor<L>(
        &self,
        loader: &L,
        texture_root: &str,
    ) -> Result<MaterialDescriptor, orrery_materials::MaterialError>
    where
        L: TextureLoader + ?Sized,
    {
        let channel_textures = match &self.texture_dir {
            Some(dir) => {
                let base = join_texture_path(texture_root, dir);
                resolve(loader, &base, &self.channels)
            }
            None => Default::default(),
        };

        MaterialDescriptor {
            base_color: self.base_color,
            base_color_override: self.tint,
            channel_flags: self.channels,
            channel_textures,
            displacement_scale: self.displacement_scale,
        }
        .validated()
    }
}

fn join_texture_path(root: &str, dir: &str) -> String {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        dir.to_string()
    } else {
        format!("{root}/{dir}")
    }
}
