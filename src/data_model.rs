use std::sync::Arc;

use glam::{Quat, Vec3};
use parking_lot::RwLock;

use crate::character::Transform;
use crate::scene::SceneObject;

/// Thread-safe container mirroring the mutable state of the scene graph.
#[derive(Debug, Default)]
pub struct DataModel {
    objects: Arc<RwLock<Vec<SceneObject>>>,
}

impl Clone for DataModel {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
        }
    }
}

impl DataModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: Vec<SceneObject>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(objects)),
        }
    }

    /// Appends an object; returns false if the name is already taken.
    pub fn insert(&self, object: SceneObject) -> bool {
        let mut guard = self.objects.write();
        if guard.iter().any(|existing| existing.name == object.name) {
            return false;
        }
        guard.push(object);
        true
    }

    /// Removes and returns every object of the given type.
    pub fn remove_by_type(&self, object_type: &str) -> Vec<SceneObject> {
        let mut guard = self.objects.write();
        let (removed, kept) = guard
            .drain(..)
            .partition(|object| object.object_type == object_type);
        *guard = kept;
        removed
    }

    /// Returns a snapshot of all stored objects.
    pub fn all_objects(&self) -> Vec<SceneObject> {
        self.objects.read().clone()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn get(&self, name: &str) -> Option<SceneObject> {
        self.objects
            .read()
            .iter()
            .find(|object| object.name == name)
            .cloned()
    }

    /// Applies a mutation to the requested object.
    pub fn update<F, R>(&self, name: &str, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut SceneObject) -> R,
    {
        let mut guard = self.objects.write();
        let object = guard.iter_mut().find(|object| object.name == name)?;
        Some(updater(object))
    }

    pub fn set_position(&self, name: &str, position: Vec3) -> bool {
        self.update(name, |obj| obj.position = position).is_some()
    }

    pub fn set_rotation(&self, name: &str, rotation: Quat) -> bool {
        self.update(name, |obj| obj.rotation = rotation).is_some()
    }

    /// Copies a controller transform onto the named object.
    pub fn set_transform(&self, name: &str, transform: &Transform) -> bool {
        self.update(name, |obj| {
            obj.position = transform.position;
            obj.rotation = transform.rotation;
        })
        .is_some()
    }

    pub fn set_color(&self, name: &str, color: Vec3) -> bool {
        self.update(name, |obj| obj.color = color).is_some()
    }
}
