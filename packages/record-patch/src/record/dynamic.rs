//! `Record` implementations for JSON documents and reference indirection.

use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{FieldSpec, Record, Shape};

/// A stored JSON document. Objects are key-addressable merge sources; every
/// other JSON value is opaque.
impl Record for Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Object(_) => "json object",
            Value::Array(_) => "json array",
            Value::Null => "json null",
            _ => "json scalar",
        }
    }

    fn shape(&self) -> Shape {
        if self.is_object() {
            Shape::Map
        } else {
            Shape::Opaque
        }
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        self.as_object()?.get(name).cloned()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Record for Map<String, Value> {
    fn type_name(&self) -> &'static str {
        "json object"
    }

    fn shape(&self) -> Shape {
        Shape::Map
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

macro_rules! forward_record {
    ($($wrapper:ty),* $(,)?) => {
        $(
            impl<R: Record + ?Sized> Record for $wrapper {
                fn type_name(&self) -> &'static str {
                    (**self).type_name()
                }

                fn shape(&self) -> Shape {
                    (**self).shape()
                }

                fn describe(&self) -> Option<Vec<FieldSpec>> {
                    (**self).describe()
                }

                fn field_value(&self, name: &str) -> Option<Value> {
                    (**self).field_value(name)
                }

                fn as_any(&self) -> &dyn Any {
                    (**self).as_any()
                }
            }
        )*
    };
}

forward_record!(&R, Box<R>, Arc<R>, Rc<R>);
