//! Property introspection
//!
//! Derives an entity's properties from its accessor methods:
//! `get<Name>()`/`is<Name>()` read accessors and `set<Name>(value)` write
//! accessors, visible from the entity or inherited from an ancestor.

use crate::model::{decapitalize, EntityType, MethodDecl, MethodRef};
use tabula_core::HostType;

/// A named, typed property with optional accessors
#[derive(Debug, Clone)]
pub struct PropertyDescriptor<'a> {
    /// Property name
    pub name: String,

    /// Host value type
    pub host_type: HostType,

    /// Read accessor
    pub read: Option<MethodRef<'a>>,

    /// Write accessor
    pub write: Option<MethodRef<'a>>,
}

enum Accessor<'m> {
    Read(String, &'m HostType),
    Write(String, &'m HostType),
}

fn classify(method: &MethodDecl) -> Option<Accessor<'_>> {
    let name = method.name.as_str();

    if method.params.is_empty() {
        let returns = method.returns.as_ref()?;
        if let Some(rest) = name.strip_prefix("get").filter(|r| !r.is_empty()) {
            return Some(Accessor::Read(decapitalize(rest), returns));
        }
        if let Some(rest) = name.strip_prefix("is").filter(|r| !r.is_empty()) {
            if *returns == HostType::Bool {
                return Some(Accessor::Read(decapitalize(rest), returns));
            }
        }
        return None;
    }

    if method.params.len() == 1 {
        if let Some(rest) = name.strip_prefix("set").filter(|r| !r.is_empty()) {
            return Some(Accessor::Write(decapitalize(rest), &method.params[0]));
        }
    }

    None
}

/// Visible methods, root ancestor first; overrides replace inherited methods
fn visible_methods(entity: &EntityType) -> Vec<MethodRef<'_>> {
    let mut chain: Vec<&EntityType> = entity.hierarchy().collect();
    chain.reverse();

    let mut methods: Vec<MethodRef<'_>> = Vec::new();
    for declaring in chain {
        for method in declaring.methods() {
            let method_ref = MethodRef { declaring, method };
            match methods
                .iter_mut()
                .find(|m| m.method.same_signature(&method.name, &method.params))
            {
                Some(existing) => *existing = method_ref,
                None => methods.push(method_ref),
            }
        }
    }
    methods
}

/// Properties of an entity in order of first appearance
///
/// Root ancestor first, then declaration order within each entity. The list
/// is not sorted by name, so column order follows the entity source.
pub fn properties(entity: &EntityType) -> Vec<PropertyDescriptor<'_>> {
    let methods = visible_methods(entity);
    let mut props: Vec<PropertyDescriptor<'_>> = Vec::new();

    // Read accessors first so setters can be checked against the getter type
    for method_ref in &methods {
        if let Some(Accessor::Read(name, host_type)) = classify(method_ref.method) {
            match props.iter_mut().find(|p| p.name == name) {
                // `getX` wins over `isX`
                Some(existing) if method_ref.method.name.starts_with("get") => {
                    existing.read = Some(*method_ref);
                    existing.host_type = host_type.clone();
                }
                Some(_) => {}
                None => props.push(PropertyDescriptor {
                    name,
                    host_type: host_type.clone(),
                    read: Some(*method_ref),
                    write: None,
                }),
            }
        }
    }

    for method_ref in &methods {
        if let Some(Accessor::Write(name, host_type)) = classify(method_ref.method) {
            match props.iter_mut().find(|p| p.name == name) {
                Some(existing) => {
                    if existing.host_type == *host_type && existing.write.is_none() {
                        existing.write = Some(*method_ref);
                    }
                }
                None => props.push(PropertyDescriptor {
                    name,
                    host_type: host_type.clone(),
                    read: None,
                    write: Some(*method_ref),
                }),
            }
        }
    }

    props
}

/// Find one property by name
pub fn property<'a>(entity: &'a EntityType, name: &str) -> Option<PropertyDescriptor<'a>> {
    properties(entity).into_iter().find(|p| p.name == name)
}
