/// The mapper: registration of generated types and two-phase finalize
///
/// Registration builds each type from the caller's `TypeSkeleton` plus the
/// synthesized fields. References to other generated types stay as pending
/// tokens until `finalize` resolves them against the completed registry.

use crate::error::{RelgraphError, Result};
use crate::mapper::connection::ConnectionCache;
use crate::mapper::convert::is_scalar;
use crate::mapper::fields::synthesize_fields;
use crate::mapper::naming::{connection_name, edge_name, NamingPolicy};
use crate::mapper::polymorphism::{base_model_for, is_interface, is_polymorphic};
use crate::mapper::types::{GeneratedType, PendingRef, TypeKind, TypeSkeleton};
use crate::orm::{Catalog, ColumnType, EnumDescriptor, ModelDescriptor};

use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Maps ORM models to generated schema types
#[derive(Debug)]
pub struct Mapper {
    catalog: Catalog,
    naming: NamingPolicy,
    /// Object and interface types by name
    types: IndexMap<String, GeneratedType>,
    /// Create and update inputs by name
    inputs: IndexMap<String, GeneratedType>,
    cache: ConnectionCache,
    enums: IndexMap<String, EnumDescriptor>,
    /// (model, kind) -> type name
    model_types: IndexMap<(String, TypeKind), String>,
    /// type name -> (model, kind)
    type_models: IndexMap<String, (Option<String>, TypeKind)>,
    finalized: bool,
}

impl Mapper {
    pub fn new(catalog: Catalog, naming: NamingPolicy) -> Self {
        Self {
            catalog,
            naming,
            types: IndexMap::new(),
            inputs: IndexMap::new(),
            cache: ConnectionCache::default(),
            enums: IndexMap::new(),
            model_types: IndexMap::new(),
            type_models: IndexMap::new(),
            finalized: false,
        }
    }

    /// Mapper with the default naming policy
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self::new(catalog, NamingPolicy::default())
    }

    /// Register the output type of `model`
    ///
    /// Interface models (a discriminator and no parent, or `make_interface`)
    /// register both the interface and a concrete object implementing it. Models
    /// inheriting from a polymorphic root make sure the root's interface exists.
    /// Subclasses of any mapped interface implement it on `finalize`.
    ///
    /// # Returns
    ///
    /// The name of the registered type (the interface name for interface models)
    pub fn type_(&mut self, model: &str, skeleton: TypeSkeleton) -> Result<String> {
        let model = Arc::clone(self.catalog.get(model)?);
        self.finalized = false;
        self.register_output(&model, &skeleton, true)
    }

    /// Register the create input of `model`
    pub fn create_input(&mut self, model: &str, skeleton: TypeSkeleton) -> Result<String> {
        let model = Arc::clone(self.catalog.get(model)?);
        self.register_input(&model, &skeleton, TypeKind::CreateInput)
    }

    /// Register the update input of `model`
    ///
    /// # Errors
    ///
    /// `MissingPrimaryKey` when the model has no primary key column
    pub fn update_input(&mut self, model: &str, skeleton: TypeSkeleton) -> Result<String> {
        let model = Arc::clone(self.catalog.get(model)?);
        if self.catalog.primary_key(&model)?.is_empty() {
            return Err(RelgraphError::MissingPrimaryKey(model.name.clone()));
        }
        self.register_input(&model, &skeleton, TypeKind::UpdateInput)
    }

    /// Register a create input, or an update input when the skeleton is `optional`
    pub fn input(&mut self, model: &str, skeleton: TypeSkeleton) -> Result<String> {
        if skeleton.optional {
            self.update_input(model, skeleton)
        } else {
            self.create_input(model, skeleton)
        }
    }

    fn register_output(&mut self, model: &ModelDescriptor, skeleton: &TypeSkeleton, explicit: bool) -> Result<String> {
        if skeleton.make_interface || is_interface(model) {
            let interface = self.naming.interface_name(model);
            self.insert_type(model, TypeKind::Interface, &interface, skeleton, explicit)?;

            let object = self.naming.type_name(model);
            self.insert_type(model, TypeKind::Object, &object, skeleton, explicit)?;

            tracing::info!("Mapped {} as interface {} with object {}", model.name, interface, object);
            return Ok(interface);
        }

        if model.parent.is_some() && is_polymorphic(&self.catalog, model)? {
            let base = base_model_for(&self.catalog, model)?;
            if !self.model_types.contains_key(&(base.name.clone(), TypeKind::Interface)) {
                tracing::warn!(
                    "Model {} inherits from unmapped {}, generating its interface",
                    model.name,
                    base.name
                );
                self.register_output(&base, &TypeSkeleton::default(), false)?;
            }
        }

        let name = self.naming.type_name(model);
        self.insert_type(model, TypeKind::Object, &name, skeleton, explicit)?;
        tracing::info!("Mapped {} as type {}", model.name, name);
        Ok(name)
    }

    fn register_input(&mut self, model: &ModelDescriptor, skeleton: &TypeSkeleton, kind: TypeKind) -> Result<String> {
        let name = self.naming.input_name(model, kind);
        self.finalized = false;
        self.insert_type(model, kind, &name, skeleton, true)?;
        tracing::info!("Mapped {} as {} {}", model.name, kind, name);
        Ok(name)
    }

    /// Build and store one type, enforcing name uniqueness
    ///
    /// An engine-generated entry of the same model and kind is replaced; an
    /// explicit one is a duplicate.
    fn insert_type(
        &mut self,
        model: &ModelDescriptor,
        kind: TypeKind,
        name: &str,
        skeleton: &TypeSkeleton,
        explicit: bool,
    ) -> Result<()> {
        let key = (model.name.clone(), kind);

        if let Some(existing) = self.model_types.get(&key) {
            let existing_explicit = self.lookup(existing).map(|t| t.is_explicit()).unwrap_or(false);
            if existing_explicit || !explicit {
                return Err(RelgraphError::DuplicateMapping(format!(
                    "{} of model '{}' is already mapped as '{}'",
                    kind, model.name, existing
                )));
            }
            if existing != name {
                let stale = existing.clone();
                self.types.shift_remove(&stale);
                self.type_models.shift_remove(&stale);
            }
            tracing::debug!("Extending engine-generated {} {}", kind, name);
        }

        if let Some((owner, owner_kind)) = self.type_models.get(name) {
            if owner.as_deref() != Some(model.name.as_str()) || *owner_kind != kind {
                return Err(RelgraphError::DuplicateMapping(format!(
                    "Type name '{}' is already used by {} of '{}'",
                    name,
                    owner_kind,
                    owner.as_deref().unwrap_or("<generated>")
                )));
            }
        }
        if self.enums.contains_key(name) {
            return Err(RelgraphError::DuplicateMapping(format!(
                "Type name '{}' is already used by an enum",
                name
            )));
        }

        let mut ty = GeneratedType::new(name, Some(model.name.clone()), kind);
        ty.fields = skeleton.fields.clone();
        ty.exclude = skeleton.exclude.clone();
        ty.description = skeleton.description.clone();
        ty.explicit = explicit;

        let declared: Vec<&str> = skeleton.fields.keys().map(String::as_str).collect();
        for field in synthesize_fields(&self.catalog, model, &skeleton.exclude, &declared, kind)? {
            ty.push_generated(field);
        }

        if kind.is_input() {
            self.inputs.insert(name.to_string(), ty);
        } else {
            self.types.insert(name.to_string(), ty);
        }
        self.model_types.insert(key, name.to_string());
        self.type_models
            .insert(name.to_string(), (Some(model.name.clone()), kind));
        Ok(())
    }

    /// Resolve every pending reference and check the completed type graph
    ///
    /// Object references to unmapped models map those models with
    /// engine-generated types; input references must name a registered input of
    /// the same kind. Calling it again is harmless.
    ///
    /// # Errors
    ///
    /// `ForwardReference` for any reference that names neither a scalar, an enum
    /// nor a registered type.
    pub fn finalize(&mut self) -> Result<()> {
        let mut worklist: VecDeque<String> = self
            .types
            .keys()
            .chain(self.inputs.keys())
            .cloned()
            .collect();

        while let Some(type_name) = worklist.pop_front() {
            let Some(ty) = self.lookup(&type_name) else {
                continue;
            };
            if !ty.has_pending() {
                continue;
            }

            let pending: Vec<(String, PendingRef)> = ty
                .fields()
                .filter_map(|f| f.ty.pending().map(|p| (f.name.clone(), p.clone())))
                .collect();

            let mut resolved = IndexMap::new();
            for (field, reference) in pending {
                let name = self.resolve_reference(&type_name, &field, &reference, &mut worklist)?;
                resolved.insert(reference, name);
            }

            let Some(ty) = self.lookup_mut(&type_name) else {
                continue;
            };
            for field in ty.fields.values_mut() {
                let field_name = field.name.clone();
                field.ty.resolve_pending(&mut |reference| {
                    resolved.get(reference).cloned().ok_or_else(|| RelgraphError::ForwardReference {
                        type_name: type_name.clone(),
                        field: field_name.clone(),
                        reference: reference.to_string(),
                    })
                })?;
            }
        }

        self.collect_enums()?;
        self.link_interfaces()?;
        self.check_references()?;

        self.finalized = true;
        tracing::info!(
            "Finalized mapper: {} types, {} inputs, {} connections, {} enums",
            self.types.len(),
            self.inputs.len(),
            self.cache.connections().count(),
            self.enums.len()
        );
        Ok(())
    }

    fn resolve_reference(
        &mut self,
        type_name: &str,
        field: &str,
        reference: &PendingRef,
        worklist: &mut VecDeque<String>,
    ) -> Result<String> {
        let unresolved = || RelgraphError::ForwardReference {
            type_name: type_name.to_string(),
            field: field.to_string(),
            reference: reference.to_string(),
        };

        let unknown_model = |err: RelgraphError| match err {
            RelgraphError::UnknownModel(_) => unresolved(),
            other => other,
        };

        match reference {
            PendingRef::Object { model } => self.output_type_for(model, worklist).map_err(unknown_model),
            PendingRef::Connection { model } => {
                let node = self.output_type_for(model, worklist).map_err(unknown_model)?;
                let connection = self.connection_type_for(&node)?;
                Ok(connection.name().to_string())
            }
            PendingRef::Input { model, kind } => self
                .model_types
                .get(&(model.clone(), *kind))
                .cloned()
                .ok_or_else(unresolved),
        }
    }

    /// Name under which values of `model` are exposed, mapping it on demand
    fn output_type_for(&mut self, model: &str, worklist: &mut VecDeque<String>) -> Result<String> {
        if let Some(name) = self.output_name(model) {
            return Ok(name);
        }

        let descriptor = Arc::clone(self.catalog.get(model)?);
        tracing::warn!("Model {} is referenced but not mapped, generating its type", model);
        let before: Vec<String> = self.types.keys().cloned().collect();
        self.register_output(&descriptor, &TypeSkeleton::default(), false)?;
        worklist.extend(self.types.keys().filter(|k| !before.contains(k)).cloned());

        self.output_name(model)
            .ok_or_else(|| RelgraphError::UnknownModel(model.to_string()))
    }

    /// Interface name for interface models, object name otherwise
    fn output_name(&self, model: &str) -> Option<String> {
        self.model_types
            .get(&(model.to_string(), TypeKind::Interface))
            .or_else(|| self.model_types.get(&(model.to_string(), TypeKind::Object)))
            .cloned()
    }

    /// Cached `{name}Connection` for a registered object or interface type
    ///
    /// # Errors
    ///
    /// `DuplicateMapping` when the connection or edge name is taken by another type
    pub fn connection_type_for(&mut self, type_name: &str) -> Result<Arc<GeneratedType>> {
        let model = self.model_for(type_name).map(String::from);
        self.edge_type_for(type_name)?;
        self.claim_name(&connection_name(type_name), model.as_deref(), TypeKind::Connection)?;
        Ok(self.cache.connection_type_for(type_name, model.as_deref()))
    }

    /// Cached `{name}Edge` for a registered object or interface type
    pub fn edge_type_for(&mut self, type_name: &str) -> Result<Arc<GeneratedType>> {
        let model = self.model_for(type_name).map(String::from);
        self.claim_name(&edge_name(type_name), model.as_deref(), TypeKind::Edge)?;
        Ok(self.cache.edge_type_for(type_name, model.as_deref()))
    }

    /// Reserve a wrapper type name for `model` and `kind`
    ///
    /// Claiming the same name again for the same owner is a no-op.
    fn claim_name(&mut self, name: &str, model: Option<&str>, kind: TypeKind) -> Result<()> {
        if self.lookup(name).is_some() || self.enums.contains_key(name) {
            return Err(RelgraphError::DuplicateMapping(format!(
                "Generated {} name '{}' is already used by another type",
                kind, name
            )));
        }

        match self.type_models.get(name) {
            Some((owner, owner_kind)) if owner.as_deref() != model || *owner_kind != kind => {
                Err(RelgraphError::DuplicateMapping(format!(
                    "Generated {} name '{}' is already used by {} of '{}'",
                    kind,
                    name,
                    owner_kind,
                    owner.as_deref().unwrap_or("<generated>")
                )))
            }
            Some(_) => Ok(()),
            None => {
                self.type_models
                    .insert(name.to_string(), (model.map(String::from), kind));
                Ok(())
            }
        }
    }

    /// Register the enum types used by mapped columns
    fn collect_enums(&mut self) -> Result<()> {
        let mut found = Vec::new();
        for ty in self.types.values().chain(self.inputs.values()) {
            let Some(model) = ty.model().and_then(|m| self.catalog.find(m)) else {
                continue;
            };
            for column in self.catalog.all_columns(model)? {
                if ty.field(&column.name).map(|f| f.generated).unwrap_or(false) {
                    if let Some(descriptor) = enum_of(&column.column_type) {
                        found.push(descriptor.clone());
                    }
                }
            }
        }

        for descriptor in found {
            if self.type_models.contains_key(&descriptor.name) {
                return Err(RelgraphError::DuplicateMapping(format!(
                    "Enum '{}' collides with a generated type",
                    descriptor.name
                )));
            }
            if let Some(existing) = self.enums.get(&descriptor.name) {
                if existing.values != descriptor.values {
                    return Err(RelgraphError::DuplicateMapping(format!(
                        "Enum '{}' is declared with different values",
                        descriptor.name
                    )));
                }
                continue;
            }
            tracing::debug!("Registered enum {}", descriptor.name);
            self.enums.insert(descriptor.name.clone(), descriptor);
        }
        Ok(())
    }

    /// Fill `implements` of objects belonging to an interface hierarchy
    ///
    /// Each object implements the interface of its own model or of its nearest
    /// ancestor mapped as an interface, with or without a discriminator.
    /// Implementers also receive any interface field they lack, since an object
    /// must expose every field of the interfaces it implements.
    fn link_interfaces(&mut self) -> Result<()> {
        let mut links = Vec::new();
        for ty in self.types.values().filter(|t| t.kind() == TypeKind::Object) {
            let Some(model) = ty.model().and_then(|m| self.catalog.find(m)) else {
                continue;
            };
            if let Some(interface) = self.inherited_interface(model)? {
                links.push((ty.name().to_string(), interface));
            }
        }

        for (object, interface) in links {
            let Some(interface_fields) = self.types.get(&interface).map(|t| t.fields.clone()) else {
                continue;
            };
            let Some(ty) = self.types.get_mut(&object) else {
                continue;
            };
            for (name, field) in interface_fields {
                if !ty.fields.contains_key(&name) {
                    ty.fields.insert(name, field);
                }
            }
            ty.implements = vec![interface];
        }
        Ok(())
    }

    /// Interface of `model` or of its nearest ancestor that has one
    fn inherited_interface(&self, model: &ModelDescriptor) -> Result<Option<String>> {
        Ok(self
            .catalog
            .ancestry(model)?
            .iter()
            .rev()
            .find_map(|m| self.model_types.get(&(m.name.clone(), TypeKind::Interface)).cloned()))
    }

    /// Every named reference must be a scalar, an enum or a registered type of
    /// the matching side (inputs reference inputs, outputs reference outputs)
    fn check_references(&self) -> Result<()> {
        let outputs = self
            .types
            .values()
            .chain(self.cache.edges().map(|t| t.as_ref()))
            .chain(self.cache.connections().map(|t| t.as_ref()));

        for ty in outputs {
            for field in ty.fields() {
                self.check_reference(ty, &field.name, field.ty.named_type(), |name| {
                    self.types.contains_key(name) || self.cache.contains_name(name)
                })?;
            }
        }

        for ty in self.inputs.values() {
            for field in ty.fields() {
                self.check_reference(ty, &field.name, field.ty.named_type(), |name| {
                    self.inputs.contains_key(name)
                })?;
            }
        }
        Ok(())
    }

    fn check_reference<F>(&self, ty: &GeneratedType, field: &str, reference: Option<&str>, registered: F) -> Result<()>
    where
        F: Fn(&str) -> bool,
    {
        match reference {
            Some(name) if is_scalar(name) || self.enums.contains_key(name) || registered(name) => Ok(()),
            other => Err(RelgraphError::ForwardReference {
                type_name: ty.name().to_string(),
                field: field.to_string(),
                reference: other.unwrap_or("<pending>").to_string(),
            }),
        }
    }

    fn lookup(&self, name: &str) -> Option<&GeneratedType> {
        self.types.get(name).or_else(|| self.inputs.get(name))
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut GeneratedType> {
        if self.types.contains_key(name) {
            self.types.get_mut(name)
        } else {
            self.inputs.get_mut(name)
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn naming(&self) -> &NamingPolicy {
        &self.naming
    }

    /// Object or interface type by name
    pub fn object_type(&self, name: &str) -> Option<&GeneratedType> {
        self.types.get(name)
    }

    pub fn input_type(&self, name: &str) -> Option<&GeneratedType> {
        self.inputs.get(name)
    }

    /// Any generated type by name, wrappers included
    pub fn generated_type(&self, name: &str) -> Option<&GeneratedType> {
        self.lookup(name)
            .or_else(|| self.cache.find(name).map(|t| t.as_ref()))
    }

    pub fn types(&self) -> impl Iterator<Item = &GeneratedType> {
        self.types.values()
    }

    pub fn inputs(&self) -> impl Iterator<Item = &GeneratedType> {
        self.inputs.values()
    }

    pub fn connections(&self) -> impl Iterator<Item = &Arc<GeneratedType>> {
        self.cache.connections()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Arc<GeneratedType>> {
        self.cache.edges()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.enums.values()
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    /// Name of the type registered for `model` and `kind`
    pub fn type_name_for(&self, model: &str, kind: TypeKind) -> Option<&str> {
        self.model_types
            .get(&(model.to_string(), kind))
            .map(String::as_str)
    }

    /// Owning model of a generated type
    pub fn model_for(&self, type_name: &str) -> Option<&str> {
        self.type_models
            .get(type_name)
            .and_then(|(model, _)| model.as_deref())
    }
}

fn enum_of(column_type: &ColumnType) -> Option<&EnumDescriptor> {
    match column_type {
        ColumnType::Enum(descriptor) => Some(descriptor),
        ColumnType::Array(element) => enum_of(element),
        _ => None,
    }
}
