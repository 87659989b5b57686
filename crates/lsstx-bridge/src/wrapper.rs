//! Wrapped Objects
//!
//! A [`WrappedObject`] is the adapter instance handed to callers. It holds
//! exactly one foreign handle for its whole life, the immutable [`TypeTag`]
//! it was resolved to, and the shared [`AdapterClass`] describing its
//! attributes.
//!
//! Attribute access goes through the class's property table first. Names the
//! table does not know are forwarded to the foreign object when delegation is
//! enabled; returned handles are wrapped again so callers keep working with
//! adapters.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::array::{PixelArray, Region};
use crate::class::{AdapterClass, BufferAccess, Equality};
use crate::convert::FromValue;
use crate::dispatch::Runtime;
use crate::dtype::DType;
use crate::error::{AdapterError, AdapterResult, ForeignError};
use crate::extract::{extract_all, ExtractHandle};
use crate::handle::NativeHandle;
use crate::registry::TypeTag;
use crate::repr::{render, summarize_args};
use crate::value::Value;

/// Adapter around one foreign object.
#[derive(Clone)]
pub struct WrappedObject {
    handle: NativeHandle,
    tag: TypeTag,
    class: Rc<AdapterClass>,
    runtime: Rc<Runtime>,
}

impl WrappedObject {
    pub(crate) fn new(handle: NativeHandle, tag: TypeTag, class: Rc<AdapterClass>, runtime: Rc<Runtime>) -> Self {
        trace!(class = class.name(), foreign = handle.type_name(), "wrapped foreign object");
        Self {
            handle,
            tag,
            class,
            runtime,
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// The held foreign handle
    pub fn handle(&self) -> &NativeHandle {
        &self.handle
    }

    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub fn class(&self) -> &Rc<AdapterClass> {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn role(&self) -> &str {
        &self.tag.role
    }

    pub fn dtype(&self) -> DType {
        self.tag.dtype()
    }

    pub fn dims(&self) -> usize {
        self.tag.dims()
    }

    /// Whether both adapters hold the same foreign object
    pub fn same_object(&self, other: &WrappedObject) -> bool {
        self.handle.same_object(&other.handle)
    }

    fn foreign_error(&self, target: &str, args: &[Value], source: ForeignError) -> AdapterError {
        warn!(class = self.class_name(), target, error = %source, "foreign call failed");
        AdapterError::foreign_call(self.class_name(), target, summarize_args(args), source)
    }

    fn property_error(&self, write: bool, attribute: &str, source: ForeignError) -> AdapterError {
        warn!(class = self.class_name(), attribute, write, error = %source, "property accessor failed");
        AdapterError::property_access(write, self.role(), self.class_name(), attribute, source)
    }

    fn call_raw(&self, method: &str, args: &[Value]) -> AdapterResult<Value> {
        self.handle
            .call(method, &extract_all(args))
            .map_err(|e| self.foreign_error(method, args, e))
    }

    // ========================================================================
    // Attribute access
    // ========================================================================

    /// Read an attribute.
    ///
    /// Bound properties call their getter (and read conversion). Other names
    /// fall through to a zero-argument foreign method of the same name when
    /// delegation is enabled.
    pub fn get(&self, name: &str) -> AdapterResult<Value> {
        if let Some(spec) = self.class.property(name) {
            trace!(class = self.class_name(), attribute = name, "property read");
            let raw = self
                .handle
                .call(spec.getter, &[])
                .map_err(|e| self.property_error(false, name, e))?;
            let value = match spec.on_read {
                Some(convert) => convert(raw)?,
                None => raw,
            };
            return Ok(self.runtime.adopt(value));
        }
        self.delegate(name, &[])
    }

    /// Read an attribute and convert it to a Rust type
    pub fn get_as<T: FromValue>(&self, name: &str) -> AdapterResult<T> {
        T::from_value(self.get(name)?)
    }

    /// Write an attribute through its bound setter
    pub fn set(&self, name: &str, value: impl Into<Value>) -> AdapterResult<()> {
        let spec = self
            .class
            .property(name)
            .ok_or_else(|| AdapterError::attribute_not_found(name, self.class_name()))?;
        let setter = spec
            .setter
            .ok_or_else(|| AdapterError::immutable_attribute(name, self.class_name()))?;

        let value = value.into();
        let value = match spec.on_write {
            Some(convert) => convert(value)?,
            None => value,
        };
        trace!(class = self.class_name(), attribute = name, "property write");
        self.handle
            .call(setter, &extract_all(std::slice::from_ref(&value)))
            .map_err(|e| self.property_error(true, name, e))?;
        Ok(())
    }

    /// Invoke a foreign method by name
    pub fn call(&self, method: &str, args: &[Value]) -> AdapterResult<Value> {
        self.delegate(method, args)
    }

    fn delegate(&self, name: &str, args: &[Value]) -> AdapterResult<Value> {
        if !self.runtime.config().delegation || !self.handle.has_method(name) {
            return Err(AdapterError::attribute_not_found(name, self.class_name()));
        }
        debug!(class = self.class_name(), method = name, "delegating to foreign method");
        let result = self.call_raw(name, args)?;
        Ok(self.runtime.adopt(result))
    }

    /// Whether `name` resolves to a property or a delegated method
    pub fn has_attribute(&self, name: &str) -> bool {
        self.class.property(name).is_some() || (self.runtime.config().delegation && self.handle.has_method(name))
    }

    // ========================================================================
    // Copy and comparison
    // ========================================================================

    /// Independent foreign copy, wrapped in the same class
    pub fn deep_copy(&self) -> AdapterResult<WrappedObject> {
        if !self.handle.has_method("clone") {
            return Err(AdapterError::not_supported(self.class_name(), "deep copy"));
        }
        match self.call_raw("clone", &[])? {
            Value::Handle(handle) => Ok(WrappedObject::new(
                handle,
                self.tag.clone(),
                Rc::clone(&self.class),
                Rc::clone(&self.runtime),
            )),
            other => Err(AdapterError::conversion("foreign handle", other.type_name())),
        }
    }

    /// Compare using the class's equality policy
    pub fn equals(&self, other: &WrappedObject) -> AdapterResult<bool> {
        match self.class.equality() {
            Equality::Identity => Ok(self.same_object(other)),
            Equality::Foreign(_) if self.tag.role != other.tag.role => Ok(false),
            Equality::Foreign(method) => {
                let result = self.call_raw(method, &[Value::Object(other.clone())])?;
                result
                    .as_bool()
                    .ok_or_else(|| AdapterError::conversion("bool", result.type_name()))
            }
        }
    }

    // ========================================================================
    // Sequence protocol
    // ========================================================================

    fn require_sequence(&self) -> AdapterResult<()> {
        if self.class.is_sequence() {
            Ok(())
        } else {
            Err(AdapterError::not_supported(self.class_name(), "indexing"))
        }
    }

    /// Number of elements
    pub fn len(&self) -> AdapterResult<usize> {
        self.require_sequence()?;
        let result = self.call_raw("len", &[])?;
        result
            .as_int()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| AdapterError::conversion("length", result.type_name()))
    }

    pub fn is_empty(&self) -> AdapterResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Element at `index`
    pub fn get_index(&self, index: usize) -> AdapterResult<Value> {
        self.require_sequence()?;
        let result = self.call_raw("getitem", &[Value::from(index)])?;
        Ok(self.runtime.adopt(result))
    }

    /// Overwrite the element at `index`
    pub fn set_index(&self, index: usize, value: impl Into<Value>) -> AdapterResult<()> {
        self.require_sequence()?;
        self.call_raw("setitem", &[Value::from(index), value.into()])?;
        Ok(())
    }

    /// All elements in order
    pub fn to_list(&self) -> AdapterResult<Vec<Value>> {
        (0..self.len()?).map(|i| self.get_index(i)).collect()
    }

    // ========================================================================
    // Pixel buffer access
    // ========================================================================

    fn buffer(&self) -> AdapterResult<&BufferAccess> {
        self.class
            .buffer()
            .ok_or_else(|| AdapterError::not_supported(self.class_name(), "pixel buffer access"))
    }

    fn plane_handles(&self, planes: &[&str]) -> AdapterResult<Vec<NativeHandle>> {
        planes
            .iter()
            .map(|getter| match self.call_raw(getter, &[])? {
                Value::Handle(handle) => Ok(handle),
                other => Err(AdapterError::conversion("plane object", other.type_name())),
            })
            .collect()
    }

    fn read_plane(&self, plane: &NativeHandle, read: &str, region: &Region) -> AdapterResult<PixelArray> {
        match plane.call(read, &[]).map_err(|e| self.foreign_error(read, &[], e))? {
            Value::Array(array) => array.slice(region),
            other => Err(AdapterError::conversion("pixel array", other.type_name())),
        }
    }

    /// Copy of the pixels in `region`.
    ///
    /// Single-plane classes return an array; multi-plane classes return a list
    /// with one array per plane.
    pub fn get_item(&self, region: &Region) -> AdapterResult<Value> {
        match self.buffer()? {
            BufferAccess::Single { read, .. } => {
                Ok(Value::Array(self.read_plane(&self.handle, read, region)?))
            }
            BufferAccess::Planes { planes, read, .. } => {
                let arrays = self
                    .plane_handles(planes)?
                    .iter()
                    .map(|plane| self.read_plane(plane, read, region).map(Value::Array))
                    .collect::<AdapterResult<Vec<_>>>()?;
                Ok(Value::List(arrays))
            }
        }
    }

    /// Overwrite the pixels in `region` in place.
    ///
    /// The value is a scalar (broadcast over the region) or an array of the
    /// region's shape; multi-plane classes take a list with one such value per
    /// plane. Each plane coerces the written values to its own pixel type. The write is a single foreign assignment per plane, so it is
    /// visible through every adapter sharing the handle.
    pub fn set_item(&self, region: &Region, value: impl Into<Value>) -> AdapterResult<()> {
        if !region.is_ordered() {
            return Err(AdapterError::out_of_range(format!("reversed slice {}", region)));
        }
        let value = value.into();
        match self.buffer()? {
            BufferAccess::Single { write, .. } => {
                let block = self.to_block(region, &value)?;
                self.write_plane(&self.handle, write, region, block)
            }
            BufferAccess::Planes { planes, write, .. } => {
                let values = match &value {
                    Value::List(items) if items.len() == planes.len() => items,
                    other => {
                        return Err(AdapterError::conversion(
                            format!("list of {} plane values", planes.len()),
                            other.type_name(),
                        ))
                    }
                };
                let blocks = values
                    .iter()
                    .map(|v| self.to_block(region, v))
                    .collect::<AdapterResult<Vec<_>>>()?;
                let handles = self.plane_handles(planes)?;
                for (plane, block) in handles.iter().zip(blocks) {
                    self.write_plane(plane, write, region, block)?;
                }
                Ok(())
            }
        }
    }

    fn to_block(&self, region: &Region, value: &Value) -> AdapterResult<PixelArray> {
        match value {
            Value::Array(array) => {
                if array.shape() != (region.height(), region.width()) {
                    return Err(AdapterError::out_of_range(format!(
                        "cannot assign a {}x{} block to region {}",
                        array.rows(),
                        array.cols(),
                        region
                    )));
                }
                Ok(array.clone())
            }
            Value::Int(_) | Value::Float(_) => {
                let scalar = value.as_float().unwrap_or_default();
                Ok(PixelArray::filled(region.height(), region.width(), DType::Float64, scalar))
            }
            other => Err(AdapterError::conversion("pixel array or scalar", other.type_name())),
        }
    }

    fn write_plane(&self, plane: &NativeHandle, write: &str, region: &Region, block: PixelArray) -> AdapterResult<()> {
        let args = [
            Value::from(region.rows.start),
            Value::from(region.cols.start),
            Value::Array(block),
        ];
        debug!(class = self.class_name(), region = %region, "assigning pixel block");
        plane
            .call(write, &args)
            .map_err(|e| self.foreign_error(write, &args, e))?;
        Ok(())
    }

    // ========================================================================
    // Representation
    // ========================================================================

    /// Readable representation built from bound properties
    pub fn repr(&self) -> AdapterResult<String> {
        render(self, self.runtime.config().repr_max_len)
    }
}

impl ExtractHandle for WrappedObject {
    fn extract_handle(&self) -> NativeHandle {
        self.handle.clone()
    }
}

impl fmt::Display for WrappedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "<{}>", self.class_name()),
        }
    }
}

impl fmt::Debug for WrappedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedObject")
            .field("class", &self.class_name())
            .field("tag", &self.tag)
            .field("handle", &self.handle)
            .finish()
    }
}

impl PartialEq for WrappedObject {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

impl From<&WrappedObject> for NativeHandle {
    fn from(obj: &WrappedObject) -> Self {
        obj.handle.clone()
    }
}
