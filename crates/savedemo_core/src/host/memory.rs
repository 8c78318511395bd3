//! In-process host used by the smoke CLI and tests.
//!
//! Models just enough of a CAD host: one active document at a time, a
//! named "disk" of saved documents, an object table and a string table.

use crate::host::{DocumentObject, HostDocument, HostError, HostResult, ObjectId};
use crate::model::state::Sphere;
use std::collections::BTreeMap;

/// One host document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDocument {
    pub name: String,
    pub objects: BTreeMap<ObjectId, DocumentObject>,
    pub strings: BTreeMap<(String, String), String>,
}

impl MemoryDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Spheres currently in the object table, in insertion order.
    pub fn spheres(&self) -> Vec<Sphere> {
        self.objects
            .values()
            .filter_map(|object| match object {
                DocumentObject::Sphere(sphere) => Some(*sphere),
                DocumentObject::Foreign(_) => None,
            })
            .collect()
    }
}

/// Host with a single active document slot.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    active: Option<MemoryDocument>,
    disk: BTreeMap<String, MemoryDocument>,
    next_object_id: u64,
    redraw_count: u64,
    string_writes: u64,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active document with an empty one.
    pub fn new_document(&mut self, name: impl Into<String>) {
        self.active = Some(MemoryDocument::new(name));
    }

    /// Loads a previously saved document. Returns `false` when `name` is unknown.
    pub fn open_document(&mut self, name: &str) -> bool {
        match self.disk.get(name) {
            Some(document) => {
                self.active = Some(document.clone());
                true
            }
            None => false,
        }
    }

    /// Puts a document on disk without opening it.
    pub fn store_document(&mut self, document: MemoryDocument) {
        self.disk.insert(document.name.clone(), document);
    }

    /// Saves the active document under its name.
    pub fn save_document(&mut self) -> HostResult<()> {
        let document = self.active.as_ref().ok_or(HostError::NoActiveDocument)?;
        self.disk.insert(document.name.clone(), document.clone());
        Ok(())
    }

    /// Closes the active document without saving.
    pub fn close_document(&mut self) -> Option<MemoryDocument> {
        self.active.take()
    }

    pub fn active_document(&self) -> Option<&MemoryDocument> {
        self.active.as_ref()
    }

    /// Adds an object that does not belong to the plugin.
    pub fn add_foreign_object(&mut self, label: impl Into<String>) -> HostResult<ObjectId> {
        let id = self.allocate_id();
        let document = self.active.as_mut().ok_or(HostError::NoActiveDocument)?;
        document
            .objects
            .insert(id, DocumentObject::Foreign(label.into()));
        Ok(id)
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraw_count
    }

    /// Number of successful `set_string` calls since construction.
    pub fn string_writes(&self) -> u64 {
        self.string_writes
    }

    fn allocate_id(&mut self) -> ObjectId {
        self.next_object_id += 1;
        ObjectId(self.next_object_id)
    }
}

impl HostDocument for InMemoryHost {
    fn has_active_document(&self) -> bool {
        self.active.is_some()
    }

    fn get_string(&self, owner: &str, key: &str) -> Option<String> {
        self.active
            .as_ref()?
            .strings
            .get(&(owner.to_string(), key.to_string()))
            .cloned()
    }

    fn set_string(&mut self, owner: &str, key: &str, value: &str) -> HostResult<()> {
        let document = self.active.as_mut().ok_or(HostError::NoActiveDocument)?;
        document
            .strings
            .insert((owner.to_string(), key.to_string()), value.to_string());
        self.string_writes += 1;
        Ok(())
    }

    fn clear_objects(&mut self) -> HostResult<()> {
        let document = self.active.as_mut().ok_or(HostError::NoActiveDocument)?;
        document.objects.clear();
        Ok(())
    }

    fn add_sphere(&mut self, sphere: &Sphere) -> HostResult<ObjectId> {
        if !self.has_active_document() {
            return Err(HostError::NoActiveDocument);
        }
        if !(sphere.radius.is_finite() && sphere.radius > 0.0) {
            return Err(HostError::Rejected(format!(
                "invalid sphere radius {}",
                sphere.radius
            )));
        }
        let id = self.allocate_id();
        let document = self.active.as_mut().ok_or(HostError::NoActiveDocument)?;
        document.objects.insert(id, DocumentObject::Sphere(*sphere));
        Ok(id)
    }

    fn delete_object(&mut self, id: ObjectId) -> HostResult<bool> {
        let document = self.active.as_mut().ok_or(HostError::NoActiveDocument)?;
        Ok(document.objects.remove(&id).is_some())
    }

    fn redraw_views(&mut self) {
        if self.active.is_some() {
            self.redraw_count += 1;
        }
    }
}
