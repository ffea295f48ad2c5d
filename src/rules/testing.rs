//! Domain objects shared by the rule tests

use crate::invoke::{Invocable, InvokeError, MethodSignature, ObjectRef, Value, ValueType};

const CATALOG_METHODS: &[MethodSignature] = &[
    MethodSignature::new("set_name", &[ValueType::Str]),
    MethodSignature::new("add_item", &[ValueType::Object("Item")]),
    MethodSignature::new("add_note", &[ValueType::Str, ValueType::Int]),
    MethodSignature::new("adopt", &[ValueType::Any]),
];

#[derive(Debug, Default)]
pub struct Catalog {
    pub name: String,
    pub items: Vec<ObjectRef>,
    pub notes: Vec<(String, i64)>,
    pub adopted: Vec<String>,
}

impl Invocable for Catalog {
    fn type_name(&self) -> &'static str {
        "Catalog"
    }

    fn methods(&self) -> &[MethodSignature] {
        CATALOG_METHODS
    }

    fn invoke(&mut self, signature: &MethodSignature, args: Vec<Value>) -> Result<Option<Value>, InvokeError> {
        let mut args = args.into_iter();
        match signature.name {
            "set_name" => {
                self.name = args.next().and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
            }
            "add_item" => {
                let item = args
                    .next()
                    .and_then(Value::into_object)
                    .ok_or_else(|| InvokeError::failed("expected an item"))?;
                self.items.push(item);
            }
            "add_note" => {
                let text = args.next().and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
                let rank = args.next().and_then(|v| v.as_int()).unwrap_or_default();
                self.notes.push((text, rank));
            }
            "adopt" => {
                let value = args.next().map(|v| v.to_string()).unwrap_or_default();
                self.adopted.push(value);
            }
            other => return Err(InvokeError::NoSuchMethod(other.to_string())),
        }
        Ok(None)
    }
}

const ITEM_METHODS: &[MethodSignature] = &[
    MethodSignature::new("set_id", &[ValueType::Int]),
    MethodSignature::new("set_title", &[ValueType::Str]),
    MethodSignature::new("set_price", &[ValueType::Float]),
    MethodSignature::new("set_available", &[ValueType::Bool]),
    MethodSignature::new("set_catalog", &[ValueType::Object("Catalog")]),
];

#[derive(Debug, Default)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub available: bool,
    pub catalog: Option<String>,
}

impl Invocable for Item {
    fn type_name(&self) -> &'static str {
        "Item"
    }

    fn methods(&self) -> &[MethodSignature] {
        ITEM_METHODS
    }

    fn invoke(&mut self, signature: &MethodSignature, args: Vec<Value>) -> Result<Option<Value>, InvokeError> {
        let arg = args
            .into_iter()
            .next()
            .ok_or_else(|| InvokeError::failed("missing argument"))?;
        match signature.name {
            "set_id" => self.id = arg.as_int().unwrap_or_default(),
            "set_title" => self.title = arg.as_str().unwrap_or_default().to_string(),
            "set_price" => self.price = arg.as_float().unwrap_or_default(),
            "set_available" => self.available = arg.as_bool().unwrap_or_default(),
            "set_catalog" => {
                let name = arg
                    .as_object()
                    .and_then(|o| o.with(|c: &Catalog| c.name.clone()))
                    .ok_or_else(|| InvokeError::failed("expected a catalog"))?;
                self.catalog = Some(name);
            }
            other => return Err(InvokeError::NoSuchMethod(other.to_string())),
        }
        Ok(None)
    }
}

/// Items linked into a catalog, in order
pub fn items_of(catalog: &ObjectRef) -> Vec<ObjectRef> {
    catalog
        .with(|c: &Catalog| c.items.clone())
        .unwrap_or_default()
}
