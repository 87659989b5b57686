//! Type Descriptors and the Type Registry
//!
//! The foreign library exposes one concrete class per (dtype, dimensionality)
//! pair of each role: `Extent2I`, `Extent3D`, `ExposureF`, ... The registry
//! turns that family into an explicit, enumerable table:
//!
//! ```text
//! role "extent":  (int32,   2) -> Extent2I  -> class Extent2I
//!                 (float64, 2) -> Extent2D  -> class Extent2D
//!                 ...
//! role "exposure": (float32, 2) -> ExposureF -> class Exposure
//!                  (float64, 2) -> ExposureD -> class Exposure
//! ```
//!
//! Each role also records how its key is inferred from construction arguments
//! ([`DTypeRule`], [`DimsRule`]) and which dispatch policy it follows
//! ([`DispatchPolicy`]). Registries are assembled once through
//! [`RegistryBuilder`] and are read-only afterwards.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::class::AdapterClass;
use crate::dtype::DType;
use crate::error::{AdapterError, AdapterResult};

/// The (dtype, dimensionality) axis of resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    /// Scalar or pixel type
    pub dtype: DType,
    /// Number of dimensions
    pub dims: usize,
}

impl TypeKey {
    /// Create a key
    pub const fn new(dtype: DType, dims: usize) -> Self {
        Self { dtype, dims }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}-D", self.dtype, self.dims)
    }
}

/// The immutable tag carried by every wrapped object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTag {
    /// Role name
    pub role: SmolStr,
    /// Resolved key
    pub key: TypeKey,
}

impl TypeTag {
    pub fn new(role: impl Into<SmolStr>, key: TypeKey) -> Self {
        Self {
            role: role.into(),
            key,
        }
    }

    pub fn dtype(&self) -> DType {
        self.key.dtype
    }

    pub fn dims(&self) -> usize {
        self.key.dims
    }
}

/// Which adapter class wraps a role's foreign objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// One class for the whole role; the tag records the concrete type
    Generic,
    /// One class per (dtype, dims)
    Typed,
}

/// How the dtype is chosen when the caller does not name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DTypeRule {
    /// All-integer arguments select `integer`; any floating argument (or an
    /// adapter argument tagged with a floating dtype) selects `float`
    Infer {
        /// Dtype for integer-only arguments
        integer: DType,
        /// Dtype when a float is present
        float: DType,
    },
    /// Configured default, else the dtype of a pixel-array argument, else the
    /// first registered dtype
    Keyword,
}

/// How the dimensionality is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimsRule {
    /// Count of positional coordinates, or the length of a single sequence
    Coordinates,
    /// Always this many dimensions
    Fixed(usize),
}

/// One registered concrete foreign type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    role: SmolStr,
    key: TypeKey,
    constructor: SmolStr,
    class: Rc<AdapterClass>,
}

impl TypeDescriptor {
    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Foreign constructor (and foreign type) name
    pub fn constructor(&self) -> &str {
        &self.constructor
    }

    /// Adapter class wrapping this foreign type
    pub fn class(&self) -> &Rc<AdapterClass> {
        &self.class
    }

    /// Tag for objects of this type
    pub fn tag(&self) -> TypeTag {
        TypeTag::new(self.role.clone(), self.key)
    }
}

/// Registration and resolution rules of a single role.
#[derive(Debug)]
pub struct RoleEntry {
    name: SmolStr,
    policy: DispatchPolicy,
    dtype_rule: DTypeRule,
    dims_rule: DimsRule,
    seeds: Vec<SmolStr>,
    descriptors: IndexMap<TypeKey, TypeDescriptor>,
}

impl RoleEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn dtype_rule(&self) -> DTypeRule {
        self.dtype_rule
    }

    pub fn dims_rule(&self) -> DimsRule {
        self.dims_rule
    }

    /// Whether an adapter of `role` may seed construction of this role
    pub fn is_seeded_by(&self, role: &str) -> bool {
        self.seeds.iter().any(|s| s == role)
    }

    /// Find the descriptor for a key
    pub fn lookup(&self, key: TypeKey) -> Option<&TypeDescriptor> {
        self.descriptors.get(&key)
    }

    /// Dtype of the first registration
    pub fn default_dtype(&self) -> Option<DType> {
        self.descriptors.keys().next().map(|k| k.dtype)
    }

    /// Registered keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.descriptors.keys().copied()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.descriptors.values()
    }
}

/// Declares one role before it is added to a registry.
pub struct RoleBuilder {
    entry: RoleEntry,
    generic_class: Option<Rc<AdapterClass>>,
    error: Option<AdapterError>,
}

impl RoleBuilder {
    /// Role whose classes are specific to each (dtype, dims)
    pub fn typed(name: impl Into<SmolStr>) -> Self {
        Self::with_policy(name.into(), DispatchPolicy::Typed, None)
    }

    /// Role served by a single class
    pub fn generic(name: impl Into<SmolStr>, class: Rc<AdapterClass>) -> Self {
        Self::with_policy(name.into(), DispatchPolicy::Generic, Some(class))
    }

    fn with_policy(name: SmolStr, policy: DispatchPolicy, generic_class: Option<Rc<AdapterClass>>) -> Self {
        let error = match &generic_class {
            Some(class) if class.role() != name => Some(AdapterError::ambiguous(
                name.as_str(),
                format!("class {} belongs to role '{}'", class.name(), class.role()),
            )),
            _ => None,
        };
        Self {
            entry: RoleEntry {
                name,
                policy,
                dtype_rule: DTypeRule::Keyword,
                dims_rule: DimsRule::Fixed(2),
                seeds: Vec::new(),
                descriptors: IndexMap::new(),
            },
            generic_class,
            error,
        }
    }

    /// Set the dtype inference rule
    pub fn dtype_rule(mut self, rule: DTypeRule) -> Self {
        self.entry.dtype_rule = rule;
        self
    }

    /// Set the dimensionality rule
    pub fn dims_rule(mut self, rule: DimsRule) -> Self {
        self.entry.dims_rule = rule;
        self
    }

    /// Allow adapters of `role` as a single seeding argument
    pub fn seeded_by(mut self, role: impl Into<SmolStr>) -> Self {
        self.entry.seeds.push(role.into());
        self
    }

    /// Register a key on a generic role
    pub fn register(self, key: TypeKey, constructor: &str) -> Self {
        match self.generic_class.clone() {
            Some(class) => self.insert(key, constructor, class),
            None => self.fail(format!(
                "typed role needs a class for {} ({})",
                key, constructor
            )),
        }
    }

    /// Register a key with its own class on a typed role
    pub fn register_typed(self, key: TypeKey, constructor: &str, class: Rc<AdapterClass>) -> Self {
        if self.entry.policy == DispatchPolicy::Generic {
            return self.fail(format!("generic role cannot take class {}", class.name()));
        }
        self.insert(key, constructor, class)
    }

    fn insert(mut self, key: TypeKey, constructor: &str, class: Rc<AdapterClass>) -> Self {
        if self.error.is_some() {
            return self;
        }
        if class.role() != self.entry.name {
            return self.fail(format!("class {} belongs to role '{}'", class.name(), class.role()));
        }
        if let Some(existing) = self.entry.descriptors.get(&key) {
            let reason = format!(
                "{} is already registered to {}, cannot also map to {}",
                key, existing.constructor, constructor
            );
            return self.fail(reason);
        }
        let descriptor = TypeDescriptor {
            role: self.entry.name.clone(),
            key,
            constructor: SmolStr::new(constructor),
            class,
        };
        self.entry.descriptors.insert(key, descriptor);
        self
    }

    fn fail(mut self, reason: String) -> Self {
        if self.error.is_none() {
            self.error = Some(AdapterError::ambiguous(self.entry.name.as_str(), reason));
        }
        self
    }
}

/// Read-only mapping from roles to their registered foreign types.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    roles: IndexMap<SmolStr, RoleEntry>,
    by_foreign: FxHashMap<SmolStr, (SmolStr, TypeKey)>,
}

impl TypeRegistry {
    /// Start building a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a role
    pub fn role(&self, name: &str) -> Option<&RoleEntry> {
        self.roles.get(name)
    }

    /// Registered role names
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(|k| k.as_str())
    }

    /// Find the descriptor for a foreign type name
    pub fn descriptor_for_foreign(&self, type_name: &str) -> Option<&TypeDescriptor> {
        let (role, key) = self.by_foreign.get(type_name)?;
        self.roles.get(role)?.lookup(*key)
    }

    /// Find the descriptor for a role and key
    pub fn descriptor(&self, role: &str, key: TypeKey) -> Option<&TypeDescriptor> {
        self.roles.get(role)?.lookup(key)
    }
}

/// Collects roles and validates them into a [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: TypeRegistry,
}

impl RegistryBuilder {
    /// Add a role; rejects duplicate roles, duplicate keys and foreign names
    /// claimed by more than one descriptor
    pub fn role(mut self, role: RoleBuilder) -> AdapterResult<Self> {
        if let Some(err) = role.error {
            return Err(err);
        }
        let entry = role.entry;
        if self.registry.roles.contains_key(&entry.name) {
            return Err(AdapterError::ambiguous(entry.name.as_str(), "role registered twice"));
        }
        for descriptor in entry.descriptors.values() {
            if let Some((other, _)) = self.registry.by_foreign.get(&descriptor.constructor) {
                return Err(AdapterError::ambiguous(
                    entry.name.as_str(),
                    format!(
                        "foreign type {} is already registered for role '{}'",
                        descriptor.constructor, other
                    ),
                ));
            }
        }
        for descriptor in entry.descriptors.values() {
            self.registry
                .by_foreign
                .insert(descriptor.constructor.clone(), (entry.name.clone(), descriptor.key));
        }
        self.registry.roles.insert(entry.name.clone(), entry);
        Ok(self)
    }

    /// Finish the registry
    pub fn build(self) -> TypeRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyBinder;

    fn class(name: &str, role: &str) -> Rc<AdapterClass> {
        PropertyBinder::new(name, role).build().unwrap()
    }

    fn extent_role() -> RoleBuilder {
        RoleBuilder::typed("extent")
            .dtype_rule(DTypeRule::Infer {
                integer: DType::Int32,
                float: DType::Float64,
            })
            .dims_rule(DimsRule::Coordinates)
            .seeded_by("point")
            .register_typed(TypeKey::new(DType::Int32, 2), "Extent2I", class("Extent2I", "extent"))
            .register_typed(TypeKey::new(DType::Float64, 2), "Extent2D", class("Extent2D", "extent"))
    }

    #[test]
    fn test_typed_registration() {
        let registry = TypeRegistry::builder().role(extent_role()).unwrap().build();
        let role = registry.role("extent").unwrap();

        assert_eq!(role.policy(), DispatchPolicy::Typed);
        assert_eq!(role.default_dtype(), Some(DType::Int32));
        assert!(role.is_seeded_by("point"));
        assert!(!role.is_seeded_by("extent"));

        let d = role.lookup(TypeKey::new(DType::Float64, 2)).unwrap();
        assert_eq!(d.constructor(), "Extent2D");
        assert_eq!(d.class().name(), "Extent2D");
        assert!(role.lookup(TypeKey::new(DType::Float64, 3)).is_none());
    }

    #[test]
    fn test_generic_registration_shares_class() {
        let exposure = class("Exposure", "exposure");
        let registry = TypeRegistry::builder()
            .role(
                RoleBuilder::generic("exposure", exposure)
                    .register(TypeKey::new(DType::Float32, 2), "ExposureF")
                    .register(TypeKey::new(DType::Float64, 2), "ExposureD"),
            )
            .unwrap()
            .build();

        let f = registry.descriptor_for_foreign("ExposureF").unwrap();
        let d = registry.descriptor_for_foreign("ExposureD").unwrap();
        assert!(Rc::ptr_eq(f.class(), d.class()));
        assert_eq!(f.tag(), TypeTag::new("exposure", TypeKey::new(DType::Float32, 2)));
        assert_eq!(registry.role("exposure").unwrap().default_dtype(), Some(DType::Float32));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let role = extent_role().register_typed(
            TypeKey::new(DType::Int32, 2),
            "Extent2L",
            class("Extent2L", "extent"),
        );
        let err = TypeRegistry::builder().role(role).unwrap_err();
        assert!(matches!(err, AdapterError::AmbiguousRegistration { .. }));
    }

    #[test]
    fn test_duplicate_foreign_name_rejected() {
        let other = RoleBuilder::typed("size")
            .register_typed(TypeKey::new(DType::Int32, 2), "Extent2I", class("Size2I", "size"));
        let err = TypeRegistry::builder()
            .role(extent_role())
            .and_then(|b| b.role(other))
            .unwrap_err();
        assert!(err.to_string().contains("already registered for role 'extent'"));
    }

    #[test]
    fn test_policy_misuse_rejected() {
        let typed_without_class = RoleBuilder::typed("point").register(TypeKey::new(DType::Int32, 2), "Point2I");
        assert!(TypeRegistry::builder().role(typed_without_class).is_err());

        let wrong_role = RoleBuilder::generic("image", class("Exposure", "exposure"));
        assert!(TypeRegistry::builder().role(wrong_role).is_err());
    }

    #[test]
    fn test_type_key_display() {
        assert_eq!(TypeKey::new(DType::Int32, 2).to_string(), "int32/2-D");
    }
}
