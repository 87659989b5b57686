//! Construction Dispatch
//!
//! The [`Dispatcher`] turns a construction request for a role into exactly one
//! foreign constructor call:
//!
//! 1. an explicit dtype wins;
//! 2. otherwise the role's [`DTypeRule`] infers one from the arguments;
//! 3. the dimensionality comes from an explicit request, a seeding adapter,
//!    the role's [`DimsRule`] (argument count or sequence length), in that
//!    order;
//! 4. the (dtype, dims) key is looked up in the role's table, failing with
//!    [`AdapterError::UnsupportedType`] when absent;
//! 5. arguments are reduced to raw handles, the foreign constructor is
//!    invoked, and the result is wrapped in the descriptor's class.
//!
//! Nothing observable is created unless every step succeeds.

use std::rc::Rc;

use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::dtype::DType;
use crate::error::{AdapterError, AdapterResult};
use crate::extract::{extract_all, extract_keywords};
use crate::handle::{ForeignLibrary, Keywords, NativeHandle};
use crate::registry::{DTypeRule, DimsRule, RoleEntry, TypeDescriptor, TypeKey, TypeRegistry, TypeTag};
use crate::repr::summarize_args;
use crate::value::Value;
use crate::wrapper::WrappedObject;

// ============================================================================
// Args - construction request
// ============================================================================

/// Positional and keyword arguments of a construction request.
#[derive(Debug, Clone, Default)]
pub struct Args {
    positional: Vec<Value>,
    keywords: Keywords,
    dtype: Option<DType>,
    dims: Option<usize>,
}

impl Args {
    /// Empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append several positional arguments
    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.positional.extend(values.into_iter().map(Into::into));
        self
    }

    /// Add a keyword argument forwarded to the foreign constructor
    pub fn keyword(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.keywords.insert(SmolStr::new(name), value.into());
        self
    }

    /// Request a dtype explicitly
    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Request a dimensionality explicitly
    pub fn dims(mut self, dims: usize) -> Self {
        self.dims = Some(dims);
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    pub fn requested_dtype(&self) -> Option<DType> {
        self.dtype
    }

    pub fn requested_dims(&self) -> Option<usize> {
        self.dims
    }
}

// ============================================================================
// Runtime - state shared by the dispatcher and every wrapped object
// ============================================================================

/// Foreign library, registry and configuration, built once and then
/// read-only.
pub struct Runtime {
    library: Rc<dyn ForeignLibrary>,
    registry: TypeRegistry,
    config: BridgeConfig,
}

impl Runtime {
    pub fn library(&self) -> &dyn ForeignLibrary {
        self.library.as_ref()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Wrap a handle whose foreign type is registered
    pub fn wrap(self: &Rc<Self>, handle: NativeHandle) -> AdapterResult<WrappedObject> {
        let descriptor = self
            .registry
            .descriptor_for_foreign(handle.type_name())
            .ok_or_else(|| AdapterError::conversion("registered foreign type", handle.type_name()))?;
        Ok(WrappedObject::new(
            handle,
            descriptor.tag(),
            descriptor.class().clone(),
            Rc::clone(self),
        ))
    }

    /// Wrap every recognised handle in a foreign return value
    pub fn adopt(self: &Rc<Self>, value: Value) -> Value {
        match value {
            Value::Handle(handle) => match self.wrap(handle.clone()) {
                Ok(obj) => Value::Object(obj),
                Err(_) => Value::Handle(handle),
            },
            Value::List(items) => Value::List(items.into_iter().map(|v| self.adopt(v)).collect()),
            Value::Map(map) => Value::Map(map.into_iter().map(|(k, v)| (k, self.adopt(v))).collect()),
            other => other,
        }
    }
}

/// Resolved construction target
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Matched descriptor
    pub descriptor: &'a TypeDescriptor,
    /// Positional arguments after sequence flattening
    pub positional: Vec<Value>,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Resolves construction requests and wraps foreign objects.
#[derive(Clone)]
pub struct Dispatcher {
    runtime: Rc<Runtime>,
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration
    pub fn new(library: Rc<dyn ForeignLibrary>, registry: TypeRegistry) -> Self {
        Self {
            runtime: Rc::new(Runtime {
                library,
                registry,
                config: BridgeConfig::default(),
            }),
        }
    }

    /// Create a dispatcher with an explicit configuration
    pub fn with_config(
        library: Rc<dyn ForeignLibrary>,
        registry: TypeRegistry,
        config: BridgeConfig,
    ) -> AdapterResult<Self> {
        config.validate()?;
        Ok(Self {
            runtime: Rc::new(Runtime {
                library,
                registry,
                config,
            }),
        })
    }

    pub fn runtime(&self) -> &Rc<Runtime> {
        &self.runtime
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.runtime.registry()
    }

    pub fn config(&self) -> &BridgeConfig {
        self.runtime.config()
    }

    fn role(&self, role: &str) -> AdapterResult<&RoleEntry> {
        self.registry()
            .role(role)
            .ok_or_else(|| AdapterError::unsupported_type(role, None, None))
    }

    /// Work out which foreign type a request resolves to, without calling it
    pub fn resolve<'a>(&'a self, role: &str, args: &Args) -> AdapterResult<Resolution<'a>> {
        let entry = self.role(role)?;
        let mut positional = args.positional.clone();

        let seed = match positional.as_slice() {
            [single] => match adapter_tag(single, self.registry()) {
                Some(tag) if entry.is_seeded_by(&tag.role) => Some(tag),
                Some(tag) if tag.role == role => {
                    return Err(AdapterError::invalid_arguments(
                        role,
                        format!(
                            "cannot infer the target type from another {}; use an explicitly typed constructor or deep_copy",
                            role
                        ),
                    ))
                }
                _ => None,
            },
            _ => None,
        };

        if entry.dims_rule() == DimsRule::Coordinates && seed.is_none() {
            if let [Value::List(items)] = positional.as_slice() {
                positional = items.clone();
            }
        }

        let dims = match (args.dims, &seed, entry.dims_rule()) {
            (Some(dims), _, _) => dims,
            (None, Some(tag), _) => tag.dims(),
            (None, None, DimsRule::Coordinates) => positional.len(),
            (None, None, DimsRule::Fixed(n)) => n,
        };

        let dtype = match (args.dtype, &seed) {
            (Some(dtype), _) => Some(dtype),
            (None, Some(tag)) => Some(tag.dtype()),
            (None, None) => match entry.dtype_rule() {
                DTypeRule::Infer { integer, float } => {
                    Some(infer_dtype(role, &positional, integer, float, self.registry())?)
                }
                DTypeRule::Keyword => self
                    .config()
                    .default_dtype(role)
                    .or_else(|| positional.iter().find_map(|v| v.as_array().map(|a| a.dtype())))
                    .or_else(|| entry.default_dtype()),
            },
        };

        let dtype = dtype.ok_or_else(|| AdapterError::unsupported_type(role, None, Some(dims)))?;
        let key = TypeKey::new(dtype, dims);
        let descriptor = entry
            .lookup(key)
            .ok_or_else(|| AdapterError::unsupported_type(role, Some(dtype), Some(dims)))?;

        Ok(Resolution { descriptor, positional })
    }

    /// Construct an object of `role`, inferring its concrete type
    pub fn construct(&self, role: &str, args: Args) -> AdapterResult<WrappedObject> {
        let resolution = self.resolve(role, &args)?;
        debug!(
            role,
            key = %resolution.descriptor.key(),
            constructor = resolution.descriptor.constructor(),
            "resolved construction"
        );
        self.invoke(resolution.descriptor, &resolution.positional, args.keywords())
    }

    /// Construct a specific (dtype, dims) of `role`, skipping inference
    pub fn construct_exact(&self, role: &str, key: TypeKey, args: Args) -> AdapterResult<WrappedObject> {
        let descriptor = self
            .role(role)?
            .lookup(key)
            .ok_or_else(|| AdapterError::unsupported_type(role, Some(key.dtype), Some(key.dims)))?;
        debug!(role, key = %key, constructor = descriptor.constructor(), "exact construction");
        self.invoke(descriptor, args.positional(), args.keywords())
    }

    fn invoke(
        &self,
        descriptor: &TypeDescriptor,
        positional: &[Value],
        keywords: &Keywords,
    ) -> AdapterResult<WrappedObject> {
        let raw_args = extract_all(positional);
        let raw_keywords = extract_keywords(keywords);
        let handle = self
            .runtime
            .library()
            .construct(descriptor.constructor(), &raw_args, &raw_keywords)
            .map_err(|e| {
                warn!(constructor = descriptor.constructor(), error = %e, "foreign constructor failed");
                AdapterError::foreign_call(descriptor.role(), descriptor.constructor(), summarize_args(positional), e)
            })?;
        Ok(WrappedObject::new(
            handle,
            descriptor.tag(),
            descriptor.class().clone(),
            Rc::clone(&self.runtime),
        ))
    }

    /// Wrap a handle returned by some other foreign call
    pub fn wrap(&self, handle: NativeHandle) -> AdapterResult<WrappedObject> {
        self.runtime.wrap(handle)
    }

    /// Call a foreign free function; arguments are extracted, results adopted
    pub fn call_function(&self, name: &str, args: &[Value]) -> AdapterResult<Value> {
        let raw = extract_all(args);
        let result = self.runtime.library().call_function(name, &raw).map_err(|e| {
            warn!(function = name, error = %e, "foreign function failed");
            AdapterError::foreign_call("<function>", name, summarize_args(args), e)
        })?;
        Ok(self.runtime.adopt(result))
    }
}

/// Tag of an adapter or registered raw handle
fn adapter_tag(value: &Value, registry: &TypeRegistry) -> Option<TypeTag> {
    match value {
        Value::Object(obj) => Some(obj.tag().clone()),
        Value::Adapter(adapter) => registry
            .descriptor_for_foreign(adapter.extract_handle().type_name())
            .map(|d| d.tag()),
        Value::Handle(handle) => registry.descriptor_for_foreign(handle.type_name()).map(|d| d.tag()),
        _ => None,
    }
}

fn infer_dtype(
    role: &str,
    args: &[Value],
    integer: DType,
    float: DType,
    registry: &TypeRegistry,
) -> AdapterResult<DType> {
    let mut dtype = integer;
    for arg in args {
        let is_float = match arg {
            Value::Int(_) => false,
            Value::Float(_) => true,
            Value::Array(arr) => arr.dtype().is_float(),
            Value::Object(_) | Value::Adapter(_) | Value::Handle(_) => match adapter_tag(arg, registry) {
                Some(tag) => tag.dtype().is_float(),
                None => {
                    return Err(AdapterError::invalid_arguments(
                        role,
                        format!("unregistered foreign object {}", arg.type_name()),
                    ))
                }
            },
            other => {
                return Err(AdapterError::invalid_arguments(
                    role,
                    format!("unsupported argument type {}", other.type_name()),
                ))
            }
        };
        if is_float {
            dtype = float;
            break;
        }
    }
    Ok(dtype)
}
