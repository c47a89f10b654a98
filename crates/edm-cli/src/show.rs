//! `edm show`

use edm_core::{Edm, EntityContainer, Operation, StructuredType};
use edm_csdl::QualifiedName;
use std::fmt::Write;
use std::process::ExitCode;
use std::sync::Arc;

pub fn run(edm: &Edm, name: &str) -> anyhow::Result<ExitCode> {
    match describe(edm, name)? {
        Some(text) => {
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No element named {name}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Kind and resolved shape of the element `name` denotes
///
/// Named types win over terms, terms over containers, containers over
/// operations. Every overload of an operation name is printed.
fn describe(edm: &Edm, name: &str) -> anyhow::Result<Option<String>> {
    let name = edm.resolve_alias(&QualifiedName::parse(name)?)?;
    let mut out = String::new();

    if let Some(entity_type) = edm.entity_type(&name)? {
        writeln!(out, "EntityType {name}")?;
        write_structured(edm, entity_type.as_ref(), &mut out)?;
        writeln!(out, "  key: {}", entity_type.key_predicate_names(edm)?.join(", "))?;
        write_properties(edm, entity_type.as_ref(), &mut out)?;
    } else if let Some(complex_type) = edm.complex_type(&name)? {
        writeln!(out, "ComplexType {name}")?;
        write_structured(edm, complex_type.as_ref(), &mut out)?;
        write_properties(edm, complex_type.as_ref(), &mut out)?;
    } else if let Some(enum_type) = edm.enum_type(&name)? {
        writeln!(out, "EnumType {name}")?;
        writeln!(out, "  underlying: {}", enum_type.underlying_type())?;
        if enum_type.is_flags() {
            writeln!(out, "  flags")?;
        }
        for member in enum_type.members() {
            writeln!(out, "  member {} = {}", member.name(), member.value())?;
        }
    } else if let Some(definition) = edm.type_definition(&name)? {
        writeln!(out, "TypeDefinition {name}")?;
        writeln!(out, "  underlying: {}", definition.underlying_type())?;
        if let Some(max_length) = definition.max_length() {
            writeln!(out, "  max_length: {max_length}")?;
        }
        if let Some(precision) = definition.precision() {
            writeln!(out, "  precision: {precision}")?;
        }
        if let Some(scale) = definition.scale() {
            writeln!(out, "  scale: {scale}")?;
        }
    } else if let Some(term) = edm.term(&name)? {
        writeln!(out, "Term {name}")?;
        writeln!(out, "  type: {}", term.type_info())?;
        if !term.applies_to().is_empty() {
            writeln!(out, "  applies_to: {}", term.applies_to().join(", "))?;
        }
        if let Some(base) = term.base_term(edm)? {
            writeln!(out, "  base: {}", base.name())?;
        }
    } else if let Some(container) = edm.entity_container(Some(&name))? {
        write_container(edm, &container, &mut out)?;
    } else {
        let mut operations = edm.actions(&name)?;
        operations.extend(edm.functions(&name)?);
        if operations.is_empty() {
            return Ok(None);
        }
        for operation in &operations {
            write_operation(operation, &mut out)?;
        }
    }
    Ok(Some(out))
}

fn write_structured<T: StructuredType>(edm: &Edm, ty: &T, out: &mut String) -> anyhow::Result<()> {
    if ty.is_abstract() {
        writeln!(out, "  abstract")?;
    }
    if ty.is_open_type() {
        writeln!(out, "  open")?;
    }
    if let Some(base) = ty.base_type(edm)? {
        writeln!(out, "  base: {}", base.name())?;
    }
    Ok(())
}

/// Structural then navigation properties, inherited ones first
fn write_properties<T: StructuredType>(edm: &Edm, ty: &T, out: &mut String) -> anyhow::Result<()> {
    for name in ty.property_names(edm)? {
        if let Some(property) = ty.structural_property(edm, &name)? {
            let null = if property.is_nullable() { "" } else { " not null" };
            writeln!(out, "  property {name}: {}{null}", property.type_info())?;
        }
    }
    for name in ty.navigation_property_names(edm)? {
        if let Some(navigation) = ty.navigation_property(edm, &name)? {
            write!(out, "  navigation {name}: {}", navigation.type_info())?;
            if let Some(partner) = navigation.partner_path() {
                write!(out, " (partner {partner})")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_container(
    edm: &Edm,
    container: &Arc<EntityContainer>,
    out: &mut String,
) -> anyhow::Result<()> {
    writeln!(out, "EntityContainer {}", container.name())?;
    if let Some(parent) = container.parent_name() {
        writeln!(out, "  extends: {parent}")?;
    }

    // Children inherited from a parent container name their origin
    let origin = |owner: &QualifiedName| {
        if owner == container.name() {
            String::new()
        } else {
            format!(" (from {owner})")
        }
    };
    for entity_set in container.entity_sets(edm)? {
        writeln!(
            out,
            "  entity_set {}: {}{}",
            entity_set.name(),
            entity_set.entity_type_name(),
            origin(entity_set.container_name())
        )?;
    }
    for singleton in container.singletons(edm)? {
        writeln!(
            out,
            "  singleton {}: {}{}",
            singleton.name(),
            singleton.entity_type_name(),
            origin(singleton.container_name())
        )?;
    }
    for import in container.action_imports(edm)? {
        writeln!(
            out,
            "  action_import {}: {}{}",
            import.name(),
            import.action_name(),
            origin(import.container_name())
        )?;
    }
    for import in container.function_imports(edm)? {
        writeln!(
            out,
            "  function_import {}: {}{}",
            import.name(),
            import.function_name(),
            origin(import.container_name())
        )?;
    }
    Ok(())
}

fn write_operation(operation: &Operation, out: &mut String) -> anyhow::Result<()> {
    let kind = if operation.is_action() { "Action" } else { "Function" };
    let mut flags = Vec::new();
    if operation.is_bound() {
        flags.push("bound");
    }
    if operation.is_composable() {
        flags.push("composable");
    }
    write!(out, "{kind} {}", operation.name())?;
    if !flags.is_empty() {
        write!(out, " ({})", flags.join(", "))?;
    }
    writeln!(out)?;

    for parameter in operation.parameters() {
        writeln!(out, "  parameter {}: {}", parameter.name(), parameter.type_info())?;
    }
    if let Some(return_type) = operation.return_type() {
        writeln!(out, "  returns: {}", return_type.type_info())?;
    }
    if let Some(path) = operation.entity_set_path() {
        writeln!(out, "  entity_set_path: {path}")?;
    }
    Ok(())
}
