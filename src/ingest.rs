//! Phase 1: walk one Doxygen XML file and populate the resolution context.
//!
//! Compounds contribute metadata and an id→qualified-name alias; function,
//! variable, enum and namespace members become [`MemberDefinition`] records;
//! typedefs only feed the alias table. All type spellings are captured raw
//! here and rewritten later in one global pass.

use tracing::trace;

use crate::model::{CompoundMetadata, MemberDefinition, MemberId, MemberKind, ParamDoc, Parameter};
use crate::registry::ResolutionContext;
use crate::xml::{Element, ParseError, parse_document};

/// Ingest one documentation file. A malformed file fails as a whole and
/// leaves other files unaffected.
pub fn ingest_file(content: &str, context: &mut ResolutionContext) -> Result<(), ParseError> {
    let root = parse_document(content)?;
    for compound in root.children_named("compounddef") {
        ingest_compound(compound, context)?;
    }
    Ok(())
}

fn ingest_compound(compound: &Element, context: &mut ResolutionContext) -> Result<(), ParseError> {
    let name = compound
        .child("compoundname")
        .and_then(Element::text)
        .ok_or(ParseError::MissingElement("compoundname"))?
        .to_string();
    let kind = compound
        .attr("kind")
        .ok_or(ParseError::MissingAttribute("kind"))?
        .to_string();
    let id = compound
        .attr("id")
        .ok_or(ParseError::MissingAttribute("id"))?
        .to_string();

    trace!(compound = %name, kind = %kind, "ingesting compound");

    context.aliases_mut().register(id.clone(), name.clone());
    context.register_compound(CompoundMetadata {
        id,
        kind: kind.clone(),
        name: name.clone(),
        brief: first_para_text(compound.child("briefdescription")),
    });

    for member in compound.find_all("sectiondef/memberdef") {
        ingest_member(member, &name, &kind, context)?;
    }

    // Classes and structs list every member, inherited ones included, in a
    // dedicated section; namespaces have no such section and were already
    // recorded per memberdef above.
    for reference in compound.find_all("listofallmembers/member") {
        if let Some(refid) = reference.attr("refid") {
            context.push_compound_member(&name, MemberId(refid.to_string()));
        }
    }

    Ok(())
}

fn ingest_member(
    member: &Element,
    compound_name: &str,
    compound_kind: &str,
    context: &mut ResolutionContext,
) -> Result<(), ParseError> {
    let Some(kind) = member.attr("kind").and_then(MemberKind::parse) else {
        return Ok(());
    };
    let id = MemberId(
        member
            .attr("id")
            .ok_or(ParseError::MissingAttribute("id"))?
            .to_string(),
    );

    if kind == MemberKind::Typedef {
        if let Some(underlying) = resolve_type(member) {
            context.aliases_mut().register(id.0, underlying);
        }
        return Ok(());
    }

    let name = member
        .child("name")
        .and_then(Element::text)
        .ok_or(ParseError::MissingElement("name"))?
        .to_string();

    let definition = MemberDefinition {
        kind,
        name,
        ty: resolve_type(member),
        params: member.children_named("param").map(parse_param).collect(),
        brief: first_para_text(member.child("briefdescription")),
        param_docs: parse_param_docs(member),
        verbatim: member
            .find("detaileddescription/para/verbatim")
            .map(|block| block.text_raw().to_string()),
        returns: return_description(member),
    };

    if compound_kind == "namespace" {
        context.push_compound_member(compound_name, id.clone());
    }
    context.register_member(id, definition);

    Ok(())
}

/// Decide whether a node's `<type>` is a cross-reference or a literal
/// spelling: a `<ref>` child yields its Symbol Id, anything else yields the
/// text as written. No canonicalization happens here.
pub fn resolve_type(node: &Element) -> Option<String> {
    let type_node = node.child("type")?;
    if let Some(reference) = type_node.child("ref") {
        return reference.attr("refid").map(str::to_string);
    }
    type_node.text().map(str::to_string)
}

fn parse_param(param: &Element) -> Parameter {
    // declname is the name from the declaration; forward-declared parameters
    // only carry a defname from the definition.
    let declared = param.child("declname").and_then(Element::text);
    let defined = param.child("defname").and_then(Element::text);
    Parameter {
        ty: resolve_type(param),
        name: declared.or(defined).map(str::to_string),
        default: param.child("defval").and_then(Element::text).map(str::to_string),
    }
}

fn parse_param_docs(member: &Element) -> Vec<ParamDoc> {
    member
        .find_all("detaileddescription/para/parameterlist/parameteritem")
        .into_iter()
        .filter_map(|item| {
            let name = item.find("parameternamelist/parametername")?.text()?;
            let description = item.find("parameterdescription/para")?.text()?;
            Some(ParamDoc {
                name: name.to_string(),
                description: description.to_string(),
            })
        })
        .collect()
}

fn return_description(member: &Element) -> Option<String> {
    member
        .find_all("detaileddescription/para/simplesect")
        .into_iter()
        .find(|sect| sect.attr("kind") == Some("return"))
        .and_then(|sect| sect.child("para"))
        .and_then(Element::text)
        .map(str::to_string)
}

fn first_para_text(description: Option<&Element>) -> Option<String> {
    description?
        .child("para")
        .and_then(Element::text)
        .map(str::to_string)
}
